//! `SeaORM` Entity for the company_accounts table.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq, Serialize, Deserialize)]
#[sea_orm(table_name = "company_accounts")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub name: String,
    /// External identifier (bank account number, wallet number).
    pub account_number: Option<String>,
    #[sea_orm(column_type = "Decimal(Some((15, 2)))")]
    pub balance: Decimal,
    pub is_active: bool,
    pub created_at: DateTimeWithTimeZone,
    pub updated_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::account_transactions::Entity")]
    AccountTransactions,
}

impl Related<super::account_transactions::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::AccountTransactions.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

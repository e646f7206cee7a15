//! `SeaORM` Entity for the account_transactions table (the append-only ledger).

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq, Serialize, Deserialize)]
#[sea_orm(table_name = "account_transactions")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub company_account_id: Uuid,
    /// Money direction: "IN" or "OUT".
    pub direction: String,
    /// Business origin of the entry, e.g. "loan_disbursement".
    pub source_type: String,
    /// Row id of the originating record, when one exists.
    pub source_id: Option<Uuid>,
    pub tx_date: Date,
    pub description: String,
    #[sea_orm(column_type = "Decimal(Some((15, 2)))")]
    pub amount: Decimal,
    #[sea_orm(column_type = "Decimal(Some((15, 2)))")]
    pub balance_before: Decimal,
    #[sea_orm(column_type = "Decimal(Some((15, 2)))")]
    pub balance_after: Decimal,
    /// Entries are never deleted; corrections are new offsetting entries.
    pub is_active: bool,
    pub created_by: Option<Uuid>,
    pub created_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::company_accounts::Entity",
        from = "Column::CompanyAccountId",
        to = "super::company_accounts::Column::Id"
    )]
    CompanyAccounts,
}

impl Related<super::company_accounts::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::CompanyAccounts.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

//! `SeaORM` Entity for the loan_repayments table.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq, Serialize, Deserialize)]
#[sea_orm(table_name = "loan_repayments")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub loan_id: Uuid,
    pub company_account_id: Uuid,
    pub payment_date: Date,
    #[sea_orm(column_type = "Decimal(Some((15, 2)))")]
    pub amount: Decimal,
    /// Portion of `amount` allocated to cycle interest.
    #[sea_orm(column_type = "Decimal(Some((15, 2)))")]
    pub interest_amount: Decimal,
    /// Portion of `amount` allocated to principal.
    #[sea_orm(column_type = "Decimal(Some((15, 2)))")]
    pub principal_amount: Decimal,
    /// Outstanding principal after this payment was applied.
    #[sea_orm(column_type = "Decimal(Some((15, 2)))")]
    pub principal_balance_after: Decimal,
    /// "interest_only", "full" or "partial".
    pub mode: String,
    /// "cash", "bank" or "mobile".
    pub method: String,
    pub notes: Option<String>,
    pub created_by: Option<Uuid>,
    pub created_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::loans::Entity",
        from = "Column::LoanId",
        to = "super::loans::Column::Id"
    )]
    Loans,
    #[sea_orm(
        belongs_to = "super::company_accounts::Entity",
        from = "Column::CompanyAccountId",
        to = "super::company_accounts::Column::Id"
    )]
    CompanyAccounts,
}

impl Related<super::loans::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Loans.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

//! `SeaORM` Entity for the loans table.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq, Serialize, Deserialize)]
#[sea_orm(table_name = "loans")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub member_id: Uuid,
    pub loan_product_id: Option<Uuid>,
    pub interest_product_id: Uuid,
    #[sea_orm(column_type = "Decimal(Some((15, 2)))")]
    pub principal_amount: Decimal,
    pub term_periods: i32,
    /// "monthly" or "daily".
    pub period_type: String,
    /// Informational flat-schedule figure; feeds no calculation.
    #[sea_orm(column_type = "Decimal(Some((15, 2)))")]
    pub payment_per_period: Option<Decimal>,
    /// Current cycle start; set at disbursement, renewed by interest-only payments.
    pub release_date: Option<Date>,
    /// Current cycle due date.
    pub first_payment_date: Option<Date>,
    /// "cash", "company_account" or "mobile_wallet".
    pub disburse_method: String,
    /// Funding account; set at disbursement.
    pub company_account_id: Option<Uuid>,
    pub purpose: Option<String>,
    pub remarks: Option<String>,
    /// "pending", "approved", "disbursed", "closed" or "cancelled".
    pub status: String,
    pub created_by: Option<Uuid>,
    pub approved_by: Option<Uuid>,
    pub created_at: DateTimeWithTimeZone,
    pub updated_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::members::Entity",
        from = "Column::MemberId",
        to = "super::members::Column::Id"
    )]
    Members,
    #[sea_orm(
        belongs_to = "super::interest_products::Entity",
        from = "Column::InterestProductId",
        to = "super::interest_products::Column::Id"
    )]
    InterestProducts,
    #[sea_orm(
        belongs_to = "super::loan_products::Entity",
        from = "Column::LoanProductId",
        to = "super::loan_products::Column::Id"
    )]
    LoanProducts,
    #[sea_orm(has_many = "super::loan_disbursements::Entity")]
    LoanDisbursements,
    #[sea_orm(has_many = "super::loan_repayments::Entity")]
    LoanRepayments,
}

impl Related<super::members::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Members.def()
    }
}

impl Related<super::interest_products::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::InterestProducts.def()
    }
}

impl Related<super::loan_products::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::LoanProducts.def()
    }
}

impl Related<super::loan_disbursements::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::LoanDisbursements.def()
    }
}

impl Related<super::loan_repayments::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::LoanRepayments.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

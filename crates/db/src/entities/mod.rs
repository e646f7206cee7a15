//! `SeaORM` entity definitions.

pub mod account_transactions;
pub mod company_accounts;
pub mod interest_products;
pub mod loan_disbursements;
pub mod loan_products;
pub mod loan_repayments;
pub mod loans;
pub mod members;

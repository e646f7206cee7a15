//! Core business logic for Salama.
//!
//! This crate contains pure business logic with ZERO web or database dependencies.
//! All domain types, validation rules, and calculations live here.
//!
//! # Modules
//!
//! - `ledger` - Append-only account ledger and balance bookkeeping
//! - `loan` - Loan lifecycle, interest accrual, and repayment allocation

pub mod ledger;
pub mod loan;

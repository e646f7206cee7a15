//! Loan lifecycle, interest accrual, and repayment allocation.
//!
//! This module implements the loan ledger engine:
//! - Loan status state machine with one central transition table
//! - Cycle-based flat interest accrual (pure quote computation)
//! - Three-mode repayment allocator with exact-amount contracts
//! - Disbursement validation and first-cycle anchoring
//! - Error types for loan operations

pub mod accrual;
pub mod disbursement;
pub mod error;
pub mod repayment;
pub mod status;
pub mod types;

#[cfg(test)]
mod accrual_props;
#[cfg(test)]
mod repayment_props;

pub use accrual::{AccrualCalculator, CycleQuote};
pub use disbursement::DisbursementHandler;
pub use error::LoanError;
pub use repayment::{RepaymentAllocation, RepaymentAllocator};
pub use status::LoanStatus;
pub use types::{
    CycleDates, DisburseMethod, LoanTerms, PaymentMethod, PeriodType, RepaymentMode,
    RepaymentRecord,
};

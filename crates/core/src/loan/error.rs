//! Loan error types.
//!
//! Business-rule errors are computed after the correct expected value is
//! known, so callers can surface it to the operator (the exact-amount
//! repayment contract depends on this).

use rust_decimal::Decimal;
use thiserror::Error;

use super::status::LoanStatus;

/// Errors that can occur during loan operations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LoanError {
    /// Amount must be strictly positive.
    #[error("Amount must be greater than zero")]
    InvalidAmount,

    /// Term must be a strictly positive number of periods.
    #[error("Term must be at least one period")]
    InvalidTerm,

    /// The requested status transition is not in the transition table.
    #[error("Invalid status transition from {from} to {to}")]
    InvalidStateTransition {
        /// The loan's current status.
        from: LoanStatus,
        /// The requested status.
        to: LoanStatus,
    },

    /// The loan already has a disbursement recorded.
    #[error("This loan has already been disbursed")]
    AlreadyDisbursed,

    /// The funding account cannot cover the disbursement.
    #[error("Insufficient funds: requested {requested}, account balance {available}")]
    InsufficientFunds {
        /// The disbursement amount requested.
        requested: Decimal,
        /// The funding account's current balance.
        available: Decimal,
    },

    /// The loan has no outstanding principal to repay.
    #[error("This loan has no outstanding principal balance")]
    NoOutstandingPrincipal,

    /// Nothing left to collect for the current cycle.
    #[error("No interest remaining to collect for the current cycle")]
    NothingToCollect,

    /// The paid amount must equal the computed value exactly.
    #[error("Amount must be exactly {expected}, got {actual}")]
    AmountMismatch {
        /// The exact amount the mode requires.
        expected: Decimal,
        /// The amount the caller entered.
        actual: Decimal,
    },

    /// The paid amount is outside the allowed range for a partial payment.
    #[error("Amount {amount} is outside the allowed range [{min}, {max}]")]
    OutOfRange {
        /// The amount the caller entered.
        amount: Decimal,
        /// Minimum accepted amount (interest remaining).
        min: Decimal,
        /// Maximum accepted amount (outstanding principal + interest remaining).
        max: Decimal,
    },
}

impl LoanError {
    /// Returns the error code for API responses.
    #[must_use]
    pub const fn error_code(&self) -> &'static str {
        match self {
            Self::InvalidAmount => "INVALID_AMOUNT",
            Self::InvalidTerm => "INVALID_TERM",
            Self::InvalidStateTransition { .. } => "INVALID_STATE_TRANSITION",
            Self::AlreadyDisbursed => "ALREADY_DISBURSED",
            Self::InsufficientFunds { .. } => "INSUFFICIENT_FUNDS",
            Self::NoOutstandingPrincipal => "NO_OUTSTANDING_PRINCIPAL",
            Self::NothingToCollect => "NOTHING_TO_COLLECT",
            Self::AmountMismatch { .. } => "AMOUNT_MISMATCH",
            Self::OutOfRange { .. } => "AMOUNT_OUT_OF_RANGE",
        }
    }

    /// Returns the HTTP status code for this error.
    #[must_use]
    pub const fn http_status_code(&self) -> u16 {
        match self {
            // 400 Bad Request - malformed input, rejected before any state is read
            Self::InvalidAmount | Self::InvalidTerm => 400,

            // 422 Unprocessable - business rule violations
            Self::InvalidStateTransition { .. }
            | Self::AlreadyDisbursed
            | Self::InsufficientFunds { .. }
            | Self::NoOutstandingPrincipal
            | Self::NothingToCollect
            | Self::AmountMismatch { .. }
            | Self::OutOfRange { .. } => 422,
        }
    }
}

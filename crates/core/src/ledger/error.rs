//! Ledger error types.

use rust_decimal::Decimal;
use thiserror::Error;

/// Errors that can occur during ledger operations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LedgerError {
    /// Entry amount cannot be zero.
    #[error("Entry amount cannot be zero")]
    ZeroAmount,

    /// Entry amount cannot be negative.
    #[error("Entry amount cannot be negative")]
    NegativeAmount,

    /// Replay found an entry whose balance_before does not continue the walk.
    #[error(
        "Ledger chain broken at entry {index}: balance_before {found} does not match previous balance_after {expected}"
    )]
    BrokenChain {
        /// Zero-based index of the offending entry.
        index: usize,
        /// The previous entry's balance_after.
        expected: Decimal,
        /// The offending entry's balance_before.
        found: Decimal,
    },

    /// Replay found an entry whose balance_after is not before ± amount.
    #[error(
        "Ledger arithmetic wrong at entry {index}: expected balance_after {expected}, found {found}"
    )]
    BadArithmetic {
        /// Zero-based index of the offending entry.
        index: usize,
        /// The recomputed balance_after.
        expected: Decimal,
        /// The stored balance_after.
        found: Decimal,
    },
}

impl LedgerError {
    /// Returns the error code for API responses.
    #[must_use]
    pub const fn error_code(&self) -> &'static str {
        match self {
            Self::ZeroAmount => "ZERO_AMOUNT",
            Self::NegativeAmount => "NEGATIVE_AMOUNT",
            Self::BrokenChain { .. } => "LEDGER_CHAIN_BROKEN",
            Self::BadArithmetic { .. } => "LEDGER_ARITHMETIC_WRONG",
        }
    }

    /// Returns the HTTP status code for this error.
    #[must_use]
    pub const fn http_status_code(&self) -> u16 {
        match self {
            Self::ZeroAmount | Self::NegativeAmount => 400,
            // A broken chain means persisted state is corrupt, not caller error.
            Self::BrokenChain { .. } | Self::BadArithmetic { .. } => 500,
        }
    }
}

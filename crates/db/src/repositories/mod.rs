//! Repository abstractions for data access.
//!
//! Repositories provide a clean interface for database operations,
//! hiding the `SeaORM` implementation details from the rest of the application.

pub mod account;
pub mod loan;
pub mod member;
pub mod product;

mod recorder;

pub use account::{AccountRepository, AdjustBalanceInput, CreateAccountInput};
pub use loan::{
    CreateLoanInput, DisburseLoanInput, LoanFilter, LoanRepository, LoanWithQuote,
    RepayLoanInput,
};
pub use member::{CreateMemberInput, MemberRepository};
pub use product::{CreateInterestProductInput, CreateLoanProductInput, ProductRepository};

use sea_orm::DbErr;
use uuid::Uuid;

use salama_core::ledger::LedgerError;
use salama_core::loan::LoanError;

/// Error type shared by all repositories.
#[derive(Debug, thiserror::Error)]
pub enum RepoError {
    /// Loan not found.
    #[error("Loan not found: {0}")]
    LoanNotFound(Uuid),

    /// Member not found.
    #[error("Member not found: {0}")]
    MemberNotFound(Uuid),

    /// Interest product not found.
    #[error("Interest product not found: {0}")]
    InterestProductNotFound(Uuid),

    /// Funding account not found.
    #[error("Funding account not found: {0}")]
    AccountNotFound(Uuid),

    /// Funding account exists but is deactivated.
    #[error("Funding account is inactive: {0}")]
    AccountInactive(Uuid),

    /// A stored value could not be interpreted.
    #[error("Corrupt stored value in {table}.{column}: {value:?}")]
    CorruptValue {
        /// Table holding the bad value.
        table: &'static str,
        /// Column holding the bad value.
        column: &'static str,
        /// The offending stored string.
        value: String,
    },

    /// Business rule violated by a loan operation.
    #[error(transparent)]
    Loan(#[from] LoanError),

    /// Ledger primitive rejected the entry.
    #[error(transparent)]
    Ledger(#[from] LedgerError),

    /// Concurrent writers collided; the operation can be retried.
    #[error("Concurrent modification detected, please retry: {0}")]
    Conflict(String),

    /// Database error.
    #[error("Database error: {0}")]
    Database(#[from] DbErr),
}

impl RepoError {
    /// Stable machine-readable error code.
    #[must_use]
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::LoanNotFound(_) => "LOAN_NOT_FOUND",
            Self::MemberNotFound(_) => "MEMBER_NOT_FOUND",
            Self::InterestProductNotFound(_) => "INTEREST_PRODUCT_NOT_FOUND",
            Self::AccountNotFound(_) => "ACCOUNT_NOT_FOUND",
            Self::AccountInactive(_) => "ACCOUNT_INACTIVE",
            Self::CorruptValue { .. } => "CORRUPT_STORED_VALUE",
            Self::Loan(err) => err.error_code(),
            Self::Ledger(err) => err.error_code(),
            Self::Conflict(_) => "CONCURRENT_MODIFICATION",
            Self::Database(_) => "DATABASE_ERROR",
        }
    }

    /// HTTP status code this error maps to.
    #[must_use]
    pub fn http_status_code(&self) -> u16 {
        match self {
            Self::LoanNotFound(_)
            | Self::MemberNotFound(_)
            | Self::InterestProductNotFound(_)
            | Self::AccountNotFound(_) => 404,
            Self::AccountInactive(_) => 422,
            Self::CorruptValue { .. } | Self::Database(_) => 500,
            Self::Loan(err) => err.http_status_code(),
            Self::Ledger(err) => err.http_status_code(),
            Self::Conflict(_) => 409,
        }
    }

    /// Whether retrying the same request may succeed.
    #[must_use]
    pub const fn is_retryable(&self) -> bool {
        matches!(self, Self::Conflict(_))
    }

    /// Classify a commit-time database error.
    ///
    /// Serialization failures and deadlocks surface as retryable conflicts;
    /// everything else stays a database error.
    pub(crate) fn from_commit(err: DbErr) -> Self {
        let message = err.to_string();
        if message.contains("could not serialize access") || message.contains("deadlock detected")
        {
            Self::Conflict(message)
        } else {
            Self::Database(err)
        }
    }
}

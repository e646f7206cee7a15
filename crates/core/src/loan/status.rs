//! Loan status state machine.
//!
//! Status was a loosely-typed string in earlier renditions of this system;
//! here it is a closed enum with a single transition table, enforced
//! centrally instead of re-checked ad hoc per handler.

use serde::{Deserialize, Serialize};

use super::error::LoanError;

/// Loan lifecycle status.
///
/// Legal transitions:
///
/// ```text
/// pending ──► approved ──► disbursed ──► closed
///    │
///    └──► cancelled
/// ```
///
/// `closed` and `cancelled` are terminal. `approved → disbursed` happens only
/// via the disbursement handler; `disbursed → closed` only via the repayment
/// allocator when outstanding principal reaches zero.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LoanStatus {
    /// Awaiting approval (initial state).
    Pending,
    /// Approved, not yet disbursed.
    Approved,
    /// Funds released; accruing interest.
    Disbursed,
    /// Fully repaid (terminal).
    Closed,
    /// Rejected before approval (terminal).
    Cancelled,
}

impl LoanStatus {
    /// Parse a status from its stored string form.
    #[must_use]
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "pending" => Some(Self::Pending),
            "approved" => Some(Self::Approved),
            "disbursed" => Some(Self::Disbursed),
            "closed" => Some(Self::Closed),
            "cancelled" => Some(Self::Cancelled),
            _ => None,
        }
    }

    /// Returns the stored string form.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Approved => "approved",
            Self::Disbursed => "disbursed",
            Self::Closed => "closed",
            Self::Cancelled => "cancelled",
        }
    }

    /// Returns true if no further transitions are possible.
    #[must_use]
    pub const fn is_terminal(&self) -> bool {
        matches!(self, Self::Closed | Self::Cancelled)
    }

    /// The central transition table.
    ///
    /// # Errors
    ///
    /// Returns `LoanError::InvalidStateTransition` carrying both states when
    /// the requested transition is not in the table.
    pub fn validate_transition(self, to: Self) -> Result<(), LoanError> {
        let legal = matches!(
            (self, to),
            (Self::Pending, Self::Approved)
                | (Self::Pending, Self::Cancelled)
                | (Self::Approved, Self::Disbursed)
                | (Self::Disbursed, Self::Closed)
        );

        if legal {
            Ok(())
        } else {
            Err(LoanError::InvalidStateTransition { from: self, to })
        }
    }
}

impl std::fmt::Display for LoanStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

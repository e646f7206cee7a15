//! Ledger entry domain types.
//!
//! Every balance mutation on a funding account is recorded as one immutable
//! entry pairing the movement with its before/after balances. Corrections are
//! new offsetting entries; entries are never updated or deleted.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Direction of a ledger entry relative to the account.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum TxDirection {
    /// Money entering the account (repayment, income, lease payment).
    In,
    /// Money leaving the account (disbursement, expense).
    Out,
}

impl TxDirection {
    /// Parse a direction from its stored string form.
    #[must_use]
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_uppercase().as_str() {
            "IN" => Some(Self::In),
            "OUT" => Some(Self::Out),
            _ => None,
        }
    }

    /// Returns the stored string form.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::In => "IN",
            Self::Out => "OUT",
        }
    }
}

/// The operation kind that produced a ledger entry.
///
/// Collaborator flows outside the loan core (expenses, incomes, lease
/// payments) are required to route their balance changes through the same
/// recorder, so all of their source kinds are representable here.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TxSource {
    /// Loan disbursement (OUT).
    LoanDisbursement,
    /// Loan repayment (IN).
    LoanRepayment,
    /// Company expense (OUT).
    Expense,
    /// Company income (IN).
    Income,
    /// Vehicle lease payment (IN).
    VehicleLeasePayment,
    /// Tuktuk lease payment (IN).
    TuktukLease,
    /// Manual balance correction from the account-edit flow.
    BalanceAdjustment,
}

impl TxSource {
    /// Parse a source kind from its stored string form.
    #[must_use]
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "loan_disbursement" => Some(Self::LoanDisbursement),
            "loan_repayment" => Some(Self::LoanRepayment),
            "expense" => Some(Self::Expense),
            "income" => Some(Self::Income),
            "vehicle_lease_payment" => Some(Self::VehicleLeasePayment),
            "tuktuk_lease" => Some(Self::TuktukLease),
            "balance_adjustment" => Some(Self::BalanceAdjustment),
            _ => None,
        }
    }

    /// Returns the stored string form.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::LoanDisbursement => "loan_disbursement",
            Self::LoanRepayment => "loan_repayment",
            Self::Expense => "expense",
            Self::Income => "income",
            Self::VehicleLeasePayment => "vehicle_lease_payment",
            Self::TuktukLease => "tuktuk_lease",
            Self::BalanceAdjustment => "balance_adjustment",
        }
    }
}

/// Result of applying one movement to a balance.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Posting {
    /// Account balance immediately before the movement.
    pub balance_before: Decimal,
    /// Account balance immediately after the movement.
    pub balance_after: Decimal,
}

/// A persisted ledger entry as needed for replay verification.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RecordedEntry {
    /// Direction of the movement.
    pub direction: TxDirection,
    /// Movement amount (always positive).
    pub amount: Decimal,
    /// Balance before the movement.
    pub balance_before: Decimal,
    /// Balance after the movement.
    pub balance_after: Decimal,
}

//! Loan domain types shared by the accrual calculator and the allocator.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Billing period unit for a loan term.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PeriodType {
    /// Monthly installments.
    Monthly,
    /// Daily installments.
    Daily,
}

impl PeriodType {
    /// Parse a period type from its stored string form.
    #[must_use]
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "monthly" => Some(Self::Monthly),
            "daily" => Some(Self::Daily),
            _ => None,
        }
    }

    /// Returns the stored string form.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Monthly => "monthly",
            Self::Daily => "daily",
        }
    }
}

/// How a repayment or disbursement was settled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PaymentMethod {
    /// Cash over the counter.
    Cash,
    /// Bank account transfer.
    Bank,
    /// Mobile wallet.
    Mobile,
}

impl PaymentMethod {
    /// Parse a method from its stored string form.
    #[must_use]
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "cash" => Some(Self::Cash),
            "bank" => Some(Self::Bank),
            "mobile" => Some(Self::Mobile),
            _ => None,
        }
    }

    /// Returns the stored string form.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Cash => "cash",
            Self::Bank => "bank",
            Self::Mobile => "mobile",
        }
    }
}

/// How the borrower receives disbursed funds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DisburseMethod {
    /// Cash over the counter.
    Cash,
    /// Transfer from a company account.
    CompanyAccount,
    /// Mobile wallet.
    MobileWallet,
}

impl DisburseMethod {
    /// Parse a method from its stored string form.
    #[must_use]
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "cash" => Some(Self::Cash),
            "company_account" => Some(Self::CompanyAccount),
            "mobile_wallet" => Some(Self::MobileWallet),
            _ => None,
        }
    }

    /// Returns the stored string form.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Cash => "cash",
            Self::CompanyAccount => "company_account",
            Self::MobileWallet => "mobile_wallet",
        }
    }
}

/// Repayment mode chosen by the operator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RepaymentMode {
    /// Pay exactly the cycle's remaining interest; principal untouched,
    /// cycle renewed.
    InterestOnly,
    /// Pay exactly outstanding principal + remaining interest; closes the
    /// loan.
    Full,
    /// Pay at least the remaining interest, at most the full settlement;
    /// interest first, remainder to principal.
    Partial,
}

impl RepaymentMode {
    /// Parse a mode from its stored string form.
    #[must_use]
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "interest_only" => Some(Self::InterestOnly),
            "full" => Some(Self::Full),
            "partial" => Some(Self::Partial),
            _ => None,
        }
    }

    /// Returns the stored string form.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::InterestOnly => "interest_only",
            Self::Full => "full",
            Self::Partial => "partial",
        }
    }
}

/// The slice of a loan the accrual calculator and allocator need.
///
/// `release_date` and `first_payment_date` bound the current billing cycle.
/// Both are `None` until the loan is disbursed; `release_date` is renewed at
/// each interest-only payment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LoanTerms {
    /// Original principal (2 fractional digits).
    pub principal_amount: Decimal,
    /// Flat cycle interest rate in percent (e.g. `30.0000` for 30%).
    pub interest_rate: Decimal,
    /// Start of the current billing cycle.
    pub release_date: Option<NaiveDate>,
    /// Due date bounding the current billing cycle.
    pub first_payment_date: Option<NaiveDate>,
}

/// One historical repayment, as the accrual calculator consumes it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RepaymentRecord {
    /// Date the payment was made.
    pub payment_date: NaiveDate,
    /// Total amount paid.
    pub amount: Decimal,
    /// Portion allocated to interest.
    pub interest_amount: Decimal,
    /// Portion allocated to principal.
    pub principal_amount: Decimal,
    /// Mode the payment was made under. An interest-only payment dated on
    /// the current cycle start is the renewal that opened the cycle.
    pub mode: RepaymentMode,
}

/// A billing cycle's anchor dates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CycleDates {
    /// Cycle start.
    pub release_date: NaiveDate,
    /// Cycle due date.
    pub first_payment_date: NaiveDate,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_period_type_roundtrip() {
        assert_eq!(PeriodType::parse("monthly"), Some(PeriodType::Monthly));
        assert_eq!(PeriodType::parse("DAILY"), Some(PeriodType::Daily));
        assert_eq!(PeriodType::parse("weekly"), None);
    }

    #[test]
    fn test_payment_method_roundtrip() {
        for method in [PaymentMethod::Cash, PaymentMethod::Bank, PaymentMethod::Mobile] {
            assert_eq!(PaymentMethod::parse(method.as_str()), Some(method));
        }
    }

    #[test]
    fn test_repayment_mode_roundtrip() {
        for mode in [
            RepaymentMode::InterestOnly,
            RepaymentMode::Full,
            RepaymentMode::Partial,
        ] {
            assert_eq!(RepaymentMode::parse(mode.as_str()), Some(mode));
        }
        assert_eq!(RepaymentMode::parse("overpay"), None);
    }

    #[test]
    fn test_disburse_method_roundtrip() {
        for method in [
            DisburseMethod::Cash,
            DisburseMethod::CompanyAccount,
            DisburseMethod::MobileWallet,
        ] {
            assert_eq!(DisburseMethod::parse(method.as_str()), Some(method));
        }
        assert_eq!(DisburseMethod::parse("cheque"), None);
    }
}

//! Disbursement validation and first-cycle anchoring.
//!
//! A loan is disbursed at most once, from an approved state, out of a funding
//! account that can cover the amount. There is no overdraft: the caller funds
//! the account first.

use chrono::{Days, NaiveDate};
use rust_decimal::Decimal;

use super::error::LoanError;
use super::repayment::CYCLE_RENEWAL_DAYS;
use super::status::LoanStatus;
use super::types::CycleDates;

/// Stateless disbursement validation.
pub struct DisbursementHandler;

impl DisbursementHandler {
    /// Validate a disbursement request before any state is touched.
    ///
    /// # Errors
    ///
    /// - `InvalidAmount` when `amount <= 0`
    /// - `InvalidStateTransition` when the loan is not approved
    /// - `AlreadyDisbursed` when a disbursement already exists
    /// - `InsufficientFunds` when the account cannot cover the amount
    pub fn validate(
        status: LoanStatus,
        has_disbursement: bool,
        amount: Decimal,
        account_balance: Decimal,
    ) -> Result<(), LoanError> {
        if amount <= Decimal::ZERO {
            return Err(LoanError::InvalidAmount);
        }

        status.validate_transition(LoanStatus::Disbursed)?;

        if has_disbursement {
            return Err(LoanError::AlreadyDisbursed);
        }

        if amount > account_balance {
            return Err(LoanError::InsufficientFunds {
                requested: amount,
                available: account_balance,
            });
        }

        Ok(())
    }

    /// The cycle anchors the disbursement establishes.
    ///
    /// `release_date` is always the disbursement date. The due date entered
    /// at loan intake is kept when present; otherwise the first cycle gets
    /// the standard 30-day window so it is bounded from day one.
    #[must_use]
    pub fn first_cycle(
        disburse_date: NaiveDate,
        intake_first_payment_date: Option<NaiveDate>,
    ) -> CycleDates {
        CycleDates {
            release_date: disburse_date,
            first_payment_date: intake_first_payment_date
                .unwrap_or_else(|| disburse_date + Days::new(CYCLE_RENEWAL_DAYS)),
        }
    }
}

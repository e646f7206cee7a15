//! Three-mode repayment allocation.
//!
//! The operator picks a mode and enters the amount by hand; interest-only
//! and full settlement require the exact computed amount. This is a
//! deliberate audit contract - the operator acknowledges the precise figure -
//! and must not be "fixed" to auto-accept any amount.

use chrono::{Days, NaiveDate};
use rust_decimal::Decimal;

use super::accrual::{AccrualCalculator, CycleQuote};
use super::error::LoanError;
use super::status::LoanStatus;
use super::types::{CycleDates, LoanTerms, RepaymentMode, RepaymentRecord};

/// Days added to the payment date when an interest-only payment renews the
/// billing cycle. A literal contract: the renewal window does not follow the
/// loan's period type.
pub const CYCLE_RENEWAL_DAYS: u64 = 30;

/// The allocator's decision for one repayment.
///
/// Pure output; the repository persists the repayment row, credits the
/// funding account through the ledger recorder, and applies the status and
/// cycle changes in a single atomic unit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RepaymentAllocation {
    /// Portion of the paid amount allocated to interest.
    pub interest_amount: Decimal,
    /// Portion of the paid amount allocated to principal.
    pub principal_amount: Decimal,
    /// Outstanding principal immediately after this payment.
    pub principal_balance_after: Decimal,
    /// The loan transitions to `closed` (principal reached zero).
    pub closes_loan: bool,
    /// New cycle anchors when an interest-only payment renews the cycle.
    pub renews_cycle: Option<CycleDates>,
    /// The quote the allocation was validated against.
    pub quote: CycleQuote,
}

/// Stateless repayment allocator.
pub struct RepaymentAllocator;

impl RepaymentAllocator {
    /// Validate a requested payment and split it into interest/principal.
    ///
    /// `repayments` must be the loan's full history ordered by
    /// `(payment_date, id)`, filtered to payments on or before
    /// `payment_date`.
    ///
    /// # Errors
    ///
    /// - `InvalidAmount` when `amount <= 0`
    /// - `InvalidStateTransition` when the loan is not disbursed
    /// - `NoOutstandingPrincipal` when nothing is owed
    /// - `NothingToCollect` for interest-only with no interest remaining
    /// - `AmountMismatch` for interest-only/full with the wrong amount
    /// - `OutOfRange` for partial outside `[interest_remaining, total]`
    pub fn allocate(
        status: LoanStatus,
        terms: &LoanTerms,
        repayments: &[RepaymentRecord],
        amount: Decimal,
        mode: RepaymentMode,
        payment_date: NaiveDate,
    ) -> Result<RepaymentAllocation, LoanError> {
        if amount <= Decimal::ZERO {
            return Err(LoanError::InvalidAmount);
        }

        // Repayments only make sense on the disbursed -> closed edge.
        if status != LoanStatus::Disbursed {
            return Err(LoanError::InvalidStateTransition {
                from: status,
                to: LoanStatus::Closed,
            });
        }

        let quote = AccrualCalculator::quote(terms, repayments);
        if quote.outstanding_principal <= Decimal::ZERO {
            return Err(LoanError::NoOutstandingPrincipal);
        }

        match mode {
            RepaymentMode::InterestOnly => Self::allocate_interest_only(quote, amount, payment_date),
            RepaymentMode::Full => Self::allocate_full(quote, amount),
            RepaymentMode::Partial => Self::allocate_partial(quote, amount),
        }
    }

    fn allocate_interest_only(
        quote: CycleQuote,
        amount: Decimal,
        payment_date: NaiveDate,
    ) -> Result<RepaymentAllocation, LoanError> {
        if quote.interest_remaining <= Decimal::ZERO {
            return Err(LoanError::NothingToCollect);
        }
        if amount != quote.interest_remaining {
            return Err(LoanError::AmountMismatch {
                expected: quote.interest_remaining,
                actual: amount,
            });
        }

        Ok(RepaymentAllocation {
            interest_amount: quote.interest_remaining,
            principal_amount: Decimal::ZERO,
            principal_balance_after: quote.outstanding_principal,
            closes_loan: false,
            renews_cycle: Some(Self::renewed_cycle(payment_date)),
            quote,
        })
    }

    fn allocate_full(quote: CycleQuote, amount: Decimal) -> Result<RepaymentAllocation, LoanError> {
        let total = quote.outstanding_principal + quote.interest_remaining;
        if amount != total {
            return Err(LoanError::AmountMismatch {
                expected: total,
                actual: amount,
            });
        }

        Ok(RepaymentAllocation {
            interest_amount: quote.interest_remaining,
            principal_amount: quote.outstanding_principal,
            principal_balance_after: Decimal::ZERO,
            closes_loan: true,
            renews_cycle: None,
            quote,
        })
    }

    fn allocate_partial(
        quote: CycleQuote,
        amount: Decimal,
    ) -> Result<RepaymentAllocation, LoanError> {
        let min = quote.interest_remaining;
        let max = quote.outstanding_principal + quote.interest_remaining;
        if amount < min || amount > max {
            return Err(LoanError::OutOfRange { amount, min, max });
        }

        // Interest is settled first; the remainder amortizes principal.
        let interest_amount = amount.min(quote.interest_remaining);
        let principal_amount = amount - interest_amount;
        let principal_balance_after =
            (quote.outstanding_principal - principal_amount).max(Decimal::ZERO);

        Ok(RepaymentAllocation {
            interest_amount,
            principal_amount,
            principal_balance_after,
            closes_loan: principal_balance_after == Decimal::ZERO,
            renews_cycle: None,
            quote,
        })
    }

    /// The cycle anchors after an interest-only renewal.
    #[must_use]
    pub fn renewed_cycle(payment_date: NaiveDate) -> CycleDates {
        CycleDates {
            release_date: payment_date,
            first_payment_date: payment_date + Days::new(CYCLE_RENEWAL_DAYS),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    /// Principal 10000 at 10%: interest_remaining 1000, full settlement 11000.
    fn standard_terms() -> LoanTerms {
        LoanTerms {
            principal_amount: dec!(10000.00),
            interest_rate: dec!(10.0000),
            release_date: Some(date(2026, 1, 1)),
            first_payment_date: Some(date(2026, 1, 31)),
        }
    }

    fn allocate(
        amount: Decimal,
        mode: RepaymentMode,
    ) -> Result<RepaymentAllocation, LoanError> {
        RepaymentAllocator::allocate(
            LoanStatus::Disbursed,
            &standard_terms(),
            &[],
            amount,
            mode,
            date(2026, 1, 15),
        )
    }

    #[test]
    fn test_rejects_non_positive_amount() {
        assert_eq!(
            allocate(dec!(0), RepaymentMode::Partial),
            Err(LoanError::InvalidAmount)
        );
        assert_eq!(
            allocate(dec!(-5), RepaymentMode::Full),
            Err(LoanError::InvalidAmount)
        );
    }

    #[test]
    fn test_rejects_undisbursed_loan() {
        let err = RepaymentAllocator::allocate(
            LoanStatus::Approved,
            &standard_terms(),
            &[],
            dec!(1000.00),
            RepaymentMode::Partial,
            date(2026, 1, 15),
        )
        .unwrap_err();
        assert_eq!(
            err,
            LoanError::InvalidStateTransition {
                from: LoanStatus::Approved,
                to: LoanStatus::Closed,
            }
        );
    }

    #[test]
    fn test_rejects_fully_repaid_loan() {
        let history = [RepaymentRecord {
            payment_date: date(2026, 1, 10),
            amount: dec!(11000.00),
            interest_amount: dec!(1000.00),
            principal_amount: dec!(10000.00),
            mode: RepaymentMode::Full,
        }];
        let err = RepaymentAllocator::allocate(
            LoanStatus::Disbursed,
            &standard_terms(),
            &history,
            dec!(100.00),
            RepaymentMode::Partial,
            date(2026, 1, 15),
        )
        .unwrap_err();
        assert_eq!(err, LoanError::NoOutstandingPrincipal);
    }

    #[test]
    fn test_interest_only_requires_exact_amount() {
        let err = allocate(dec!(999.99), RepaymentMode::InterestOnly).unwrap_err();
        assert_eq!(
            err,
            LoanError::AmountMismatch {
                expected: dec!(1000.00),
                actual: dec!(999.99),
            }
        );
    }

    #[test]
    fn test_interest_only_renews_cycle() {
        let allocation = allocate(dec!(1000.00), RepaymentMode::InterestOnly).unwrap();
        assert_eq!(allocation.interest_amount, dec!(1000.00));
        assert_eq!(allocation.principal_amount, dec!(0));
        assert_eq!(allocation.principal_balance_after, dec!(10000.00));
        assert!(!allocation.closes_loan);
        assert_eq!(
            allocation.renews_cycle,
            Some(CycleDates {
                release_date: date(2026, 1, 15),
                first_payment_date: date(2026, 2, 14),
            })
        );
    }

    #[test]
    fn test_interest_only_with_nothing_left() {
        // Cycle interest already paid in full this cycle.
        let history = [RepaymentRecord {
            payment_date: date(2026, 1, 5),
            amount: dec!(1000.00),
            interest_amount: dec!(1000.00),
            principal_amount: dec!(0.00),
            mode: RepaymentMode::Partial,
        }];
        let err = RepaymentAllocator::allocate(
            LoanStatus::Disbursed,
            &standard_terms(),
            &history,
            dec!(1000.00),
            RepaymentMode::InterestOnly,
            date(2026, 1, 20),
        )
        .unwrap_err();
        assert_eq!(err, LoanError::NothingToCollect);
    }

    #[test]
    fn test_full_requires_exact_total() {
        let err = allocate(dec!(11000.01), RepaymentMode::Full).unwrap_err();
        assert_eq!(
            err,
            LoanError::AmountMismatch {
                expected: dec!(11000.00),
                actual: dec!(11000.01),
            }
        );
    }

    #[test]
    fn test_full_closes_loan() {
        let allocation = allocate(dec!(11000.00), RepaymentMode::Full).unwrap();
        assert_eq!(allocation.interest_amount, dec!(1000.00));
        assert_eq!(allocation.principal_amount, dec!(10000.00));
        assert_eq!(allocation.principal_balance_after, dec!(0));
        assert!(allocation.closes_loan);
        assert_eq!(allocation.renews_cycle, None);
    }

    #[test]
    fn test_partial_splits_interest_first() {
        // 1500 -> 1000 interest, 500 principal, balance 9500.
        let allocation = allocate(dec!(1500.00), RepaymentMode::Partial).unwrap();
        assert_eq!(allocation.interest_amount, dec!(1000.00));
        assert_eq!(allocation.principal_amount, dec!(500.00));
        assert_eq!(allocation.principal_balance_after, dec!(9500.00));
        assert!(!allocation.closes_loan);
        assert_eq!(allocation.renews_cycle, None);
    }

    #[test]
    fn test_partial_below_interest_rejected() {
        // 900 < interest_remaining 1000 -> OutOfRange(1000, 11000).
        let err = allocate(dec!(900.00), RepaymentMode::Partial).unwrap_err();
        assert_eq!(
            err,
            LoanError::OutOfRange {
                amount: dec!(900.00),
                min: dec!(1000.00),
                max: dec!(11000.00),
            }
        );
    }

    #[test]
    fn test_partial_above_total_rejected() {
        let err = allocate(dec!(11000.01), RepaymentMode::Partial).unwrap_err();
        assert!(matches!(err, LoanError::OutOfRange { .. }));
    }

    #[test]
    fn test_partial_at_exact_total_closes_loan() {
        let allocation = allocate(dec!(11000.00), RepaymentMode::Partial).unwrap();
        assert_eq!(allocation.principal_balance_after, dec!(0));
        assert!(allocation.closes_loan);
    }

    #[test]
    fn test_partial_at_exact_interest_behaves_like_interest_only_without_renewal() {
        let allocation = allocate(dec!(1000.00), RepaymentMode::Partial).unwrap();
        assert_eq!(allocation.interest_amount, dec!(1000.00));
        assert_eq!(allocation.principal_amount, dec!(0));
        assert_eq!(allocation.principal_balance_after, dec!(10000.00));
        // Partial never renews the cycle, even when it only covers interest.
        assert_eq!(allocation.renews_cycle, None);
    }

    #[test]
    fn test_allocation_conserves_amount() {
        for amount in [dec!(1000.00), dec!(1500.00), dec!(11000.00)] {
            let allocation = allocate(amount, RepaymentMode::Partial).unwrap();
            assert_eq!(
                allocation.interest_amount + allocation.principal_amount,
                amount
            );
        }
    }
}

//! Cycle-based flat interest accrual.
//!
//! Interest accrues once per billing cycle as a fixed percentage of the
//! cycle's base principal, not compounded. The cycle is bounded by the loan's
//! `release_date` (renewed at each interest-only payment) and
//! `first_payment_date`.

use rust_decimal::{Decimal, RoundingStrategy};
use serde::Serialize;

use super::types::{LoanTerms, RepaymentMode, RepaymentRecord};

/// Snapshot of a loan's current billing cycle.
///
/// Pure output of [`AccrualCalculator::quote`]; safe to recompute for
/// display, validation, or both - two calls with the same inputs return
/// identical results.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct CycleQuote {
    /// Original principal minus all principal repaid, floored at zero.
    pub outstanding_principal: Decimal,
    /// Interest charged for the current cycle.
    pub cycle_interest_total: Decimal,
    /// Cycle interest not yet covered by in-cycle payments.
    pub interest_remaining: Decimal,
}

/// Stateless interest accrual calculator.
pub struct AccrualCalculator;

impl AccrualCalculator {
    /// Convert a percent rate to a fraction, fixed at 4 decimal places.
    ///
    /// `30.0000` becomes `0.3000`.
    #[must_use]
    pub fn rate_fraction(rate_percent: Decimal) -> Decimal {
        (rate_percent / Decimal::ONE_HUNDRED).round_dp(4)
    }

    /// Compute the current cycle quote for a loan.
    ///
    /// The repayment history must be the loan's full history ordered by
    /// `(payment_date, id)`; callers quoting "as of" a date filter the
    /// history to payments on or before that date first.
    ///
    /// Algorithm:
    /// 1. The cycle runs from `release_date` to `first_payment_date`
    ///    (unbounded above when the due date is unset).
    /// 2. The cycle's base principal is the original principal minus
    ///    principal repaid before the cycle started, floored at zero.
    /// 3. Cycle interest is `base × rate_fraction`, rounded half-up to 2
    ///    decimal places.
    /// 4. Interest already paid within the cycle window (start through the
    ///    due date) reduces what remains. The one exception is the
    ///    interest-only renewal dated on the cycle start: that payment
    ///    settled the cycle it closed, not the one it opened.
    #[must_use]
    pub fn quote(terms: &LoanTerms, repayments: &[RepaymentRecord]) -> CycleQuote {
        let cycle_start = terms.release_date;
        let cycle_due = terms.first_payment_date;

        let principal_paid_before_cycle: Decimal = repayments
            .iter()
            .filter(|r| cycle_start.is_some_and(|start| r.payment_date < start))
            .map(|r| r.principal_amount)
            .sum();

        let cycle_base_principal =
            (terms.principal_amount - principal_paid_before_cycle).max(Decimal::ZERO);

        let rate_fraction = Self::rate_fraction(terms.interest_rate);
        let cycle_interest_total = (cycle_base_principal * rate_fraction)
            .round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero);

        // An interest-only payment renews the cycle to its own date, so an
        // interest-only record dated on the start is the renewal and settles
        // the cycle it closed. Any other payment on the start day (a partial
        // on the disbursement day, say) pays this cycle.
        let interest_paid_in_cycle: Decimal = repayments
            .iter()
            .filter(|r| {
                let in_window = cycle_start.is_none_or(|start| {
                    r.payment_date > start
                        || (r.payment_date == start && r.mode != RepaymentMode::InterestOnly)
                });
                let before_due = cycle_due.is_none_or(|due| r.payment_date <= due);
                in_window && before_due
            })
            .map(|r| r.interest_amount)
            .sum();

        let interest_remaining = (cycle_interest_total - interest_paid_in_cycle).max(Decimal::ZERO);

        let principal_paid_total: Decimal = repayments.iter().map(|r| r.principal_amount).sum();
        let outstanding_principal =
            (terms.principal_amount - principal_paid_total).max(Decimal::ZERO);

        CycleQuote {
            outstanding_principal,
            cycle_interest_total,
            interest_remaining,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use rust_decimal_macros::dec;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn terms(principal: Decimal, rate: Decimal) -> LoanTerms {
        LoanTerms {
            principal_amount: principal,
            interest_rate: rate,
            release_date: Some(date(2026, 1, 1)),
            first_payment_date: Some(date(2026, 1, 31)),
        }
    }

    fn repayment(d: NaiveDate, interest: Decimal, principal: Decimal) -> RepaymentRecord {
        RepaymentRecord {
            payment_date: d,
            amount: interest + principal,
            interest_amount: interest,
            principal_amount: principal,
            mode: RepaymentMode::Partial,
        }
    }

    #[test]
    fn test_rate_fraction_quantized() {
        assert_eq!(AccrualCalculator::rate_fraction(dec!(30.0000)), dec!(0.3000));
        assert_eq!(AccrualCalculator::rate_fraction(dec!(10)), dec!(0.1));
        // 3 1/3 percent rounds at the 4th decimal place
        assert_eq!(
            AccrualCalculator::rate_fraction(dec!(3.3333)),
            dec!(0.0333)
        );
    }

    #[test]
    fn test_fresh_loan_quote() {
        let quote = AccrualCalculator::quote(&terms(dec!(10000.00), dec!(10)), &[]);
        assert_eq!(quote.outstanding_principal, dec!(10000.00));
        assert_eq!(quote.cycle_interest_total, dec!(1000.00));
        assert_eq!(quote.interest_remaining, dec!(1000.00));
    }

    #[test]
    fn test_interest_rounds_half_up() {
        // 333.33 * 0.015 = 4.99995 -> 5.00 under half-up
        let t = terms(dec!(333.33), dec!(1.5));
        let quote = AccrualCalculator::quote(&t, &[]);
        assert_eq!(quote.cycle_interest_total, dec!(5.00));
    }

    #[test]
    fn test_principal_paid_before_cycle_shrinks_base() {
        // Principal repaid before the current cycle started no longer accrues.
        let t = terms(dec!(10000.00), dec!(10));
        let history = [repayment(date(2025, 12, 15), dec!(1000.00), dec!(4000.00))];
        let quote = AccrualCalculator::quote(&t, &history);
        assert_eq!(quote.outstanding_principal, dec!(6000.00));
        assert_eq!(quote.cycle_interest_total, dec!(600.00));
        assert_eq!(quote.interest_remaining, dec!(600.00));
    }

    #[test]
    fn test_in_cycle_interest_reduces_remaining() {
        let t = terms(dec!(10000.00), dec!(10));
        let history = [repayment(date(2026, 1, 10), dec!(400.00), dec!(0.00))];
        let quote = AccrualCalculator::quote(&t, &history);
        assert_eq!(quote.cycle_interest_total, dec!(1000.00));
        assert_eq!(quote.interest_remaining, dec!(600.00));
        assert_eq!(quote.outstanding_principal, dec!(10000.00));
    }

    #[test]
    fn test_partial_on_cycle_start_pays_cycle_interest() {
        // A partial on the disbursement day is an in-cycle payment; its
        // interest portion must not be charged again.
        let t = terms(dec!(10000.00), dec!(10));
        let history = [repayment(date(2026, 1, 1), dec!(1000.00), dec!(2000.00))];
        let quote = AccrualCalculator::quote(&t, &history);
        assert_eq!(quote.cycle_interest_total, dec!(1000.00));
        assert_eq!(quote.interest_remaining, dec!(0.00));
        assert_eq!(quote.outstanding_principal, dec!(8000.00));
    }

    #[test]
    fn test_renewal_payment_excluded_from_the_cycle_it_opened() {
        // The interest-only renewal is dated on the start of the cycle it
        // created; the fresh cycle still owes its full interest.
        let t = LoanTerms {
            release_date: Some(date(2026, 1, 31)),
            first_payment_date: Some(date(2026, 3, 2)),
            ..terms(dec!(10000.00), dec!(10))
        };
        let renewal = RepaymentRecord {
            mode: RepaymentMode::InterestOnly,
            ..repayment(date(2026, 1, 31), dec!(1000.00), dec!(0.00))
        };
        let quote = AccrualCalculator::quote(&t, &[renewal]);
        assert_eq!(quote.interest_remaining, dec!(1000.00));
        assert_eq!(quote.outstanding_principal, dec!(10000.00));
    }

    #[test]
    fn test_payment_after_due_date_ignored_for_cycle_interest() {
        let t = terms(dec!(10000.00), dec!(10));
        let history = [repayment(date(2026, 2, 5), dec!(300.00), dec!(0.00))];
        let quote = AccrualCalculator::quote(&t, &history);
        // Outside the window it neither shrinks the base nor pays the cycle.
        assert_eq!(quote.interest_remaining, dec!(1000.00));
    }

    #[test]
    fn test_unset_due_date_is_unbounded_above() {
        let t = LoanTerms {
            first_payment_date: None,
            ..terms(dec!(10000.00), dec!(10))
        };
        let history = [repayment(date(2026, 6, 1), dec!(1000.00), dec!(0.00))];
        let quote = AccrualCalculator::quote(&t, &history);
        assert_eq!(quote.interest_remaining, dec!(0.00));
    }

    #[test]
    fn test_outstanding_clamped_at_zero() {
        let t = terms(dec!(1000.00), dec!(10));
        let history = [
            repayment(date(2026, 1, 5), dec!(100.00), dec!(600.00)),
            repayment(date(2026, 1, 20), dec!(0.00), dec!(500.00)),
        ];
        let quote = AccrualCalculator::quote(&t, &history);
        assert_eq!(quote.outstanding_principal, dec!(0.00));
    }

    #[test]
    fn test_quote_is_idempotent() {
        let t = terms(dec!(7500.00), dec!(12.5));
        let history = [repayment(date(2026, 1, 10), dec!(500.00), dec!(1000.00))];
        assert_eq!(
            AccrualCalculator::quote(&t, &history),
            AccrualCalculator::quote(&t, &history)
        );
    }
}

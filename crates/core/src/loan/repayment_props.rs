//! Property-based tests for the repayment allocator.
//!
//! - Conservation: interest + principal always equals the paid amount
//! - Partial acceptance exactly matches the [min, max] range
//! - Principal balance is non-increasing across a payment sequence and
//!   reaches zero iff the loan closes
//! - Interest-only renewal yields a fresh, fully-owing cycle

use chrono::NaiveDate;
use proptest::prelude::*;
use rust_decimal::Decimal;

use super::accrual::AccrualCalculator;
use super::error::LoanError;
use super::repayment::RepaymentAllocator;
use super::status::LoanStatus;
use super::types::{LoanTerms, RepaymentMode, RepaymentRecord};

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

/// Strategy to generate principal amounts (10.00 to 100,000.00).
fn principal() -> impl Strategy<Value = Decimal> {
    (1_000i64..10_000_000i64).prop_map(|cents| Decimal::new(cents, 2))
}

/// Strategy to generate percent rates (0.01 to 60.00).
fn rate_percent() -> impl Strategy<Value = Decimal> {
    (1i64..600_000i64).prop_map(|v| Decimal::new(v, 4))
}

fn terms_for(principal_amount: Decimal, interest_rate: Decimal) -> LoanTerms {
    LoanTerms {
        principal_amount,
        interest_rate,
        release_date: Some(date(2026, 1, 1)),
        first_payment_date: Some(date(2026, 1, 31)),
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(200))]

    /// Any accepted partial amount splits without loss.
    #[test]
    fn prop_partial_conserves_amount(
        principal in principal(),
        rate in rate_percent(),
        fraction_bps in 0u32..=10_000u32,
    ) {
        let terms = terms_for(principal, rate);
        let quote = AccrualCalculator::quote(&terms, &[]);
        let min = quote.interest_remaining;
        let max = quote.outstanding_principal + quote.interest_remaining;

        // Pick an amount inside [min, max] at a rounded cent position.
        let span = max - min;
        let amount = (min + span * Decimal::new(i64::from(fraction_bps), 4)).round_dp(2);
        prop_assume!(amount >= min && amount <= max && amount > Decimal::ZERO);

        let allocation = RepaymentAllocator::allocate(
            LoanStatus::Disbursed,
            &terms,
            &[],
            amount,
            RepaymentMode::Partial,
            date(2026, 1, 15),
        )
        .unwrap();

        prop_assert_eq!(
            allocation.interest_amount + allocation.principal_amount,
            amount
        );
        prop_assert_eq!(
            allocation.principal_balance_after,
            quote.outstanding_principal - allocation.principal_amount
        );
        prop_assert_eq!(
            allocation.closes_loan,
            allocation.principal_balance_after == Decimal::ZERO
        );
    }

    /// Amounts below the remaining interest are rejected with both bounds.
    #[test]
    fn prop_partial_below_min_rejected(
        principal in principal(),
        rate in (100_000i64..600_000i64).prop_map(|v| Decimal::new(v, 4)),
        shortfall_cents in 1i64..100_000i64,
    ) {
        let terms = terms_for(principal, rate);
        let quote = AccrualCalculator::quote(&terms, &[]);
        let amount = quote.interest_remaining - Decimal::new(shortfall_cents, 2);
        prop_assume!(amount > Decimal::ZERO);

        let err = RepaymentAllocator::allocate(
            LoanStatus::Disbursed,
            &terms,
            &[],
            amount,
            RepaymentMode::Partial,
            date(2026, 1, 15),
        )
        .unwrap_err();

        prop_assert_eq!(
            err,
            LoanError::OutOfRange {
                amount,
                min: quote.interest_remaining,
                max: quote.outstanding_principal + quote.interest_remaining,
            }
        );
    }

    /// Full settlement accepts exactly one amount.
    #[test]
    fn prop_full_accepts_only_exact_total(
        principal in principal(),
        rate in rate_percent(),
        offset_cents in 1i64..10_000i64,
    ) {
        let terms = terms_for(principal, rate);
        let quote = AccrualCalculator::quote(&terms, &[]);
        let total = quote.outstanding_principal + quote.interest_remaining;

        let exact = RepaymentAllocator::allocate(
            LoanStatus::Disbursed,
            &terms,
            &[],
            total,
            RepaymentMode::Full,
            date(2026, 1, 15),
        )
        .unwrap();
        prop_assert!(exact.closes_loan);
        prop_assert_eq!(exact.principal_balance_after, Decimal::ZERO);

        for wrong in [
            total + Decimal::new(offset_cents, 2),
            total - Decimal::new(offset_cents, 2),
        ] {
            prop_assume!(wrong > Decimal::ZERO);
            let err = RepaymentAllocator::allocate(
                LoanStatus::Disbursed,
                &terms,
                &[],
                wrong,
                RepaymentMode::Full,
                date(2026, 1, 15),
            )
            .unwrap_err();
            prop_assert!(
                matches!(err, LoanError::AmountMismatch { .. }),
                "expected AmountMismatch, got {err:?}"
            );
        }
    }

    /// After an interest-only renewal the new cycle owes its full interest
    /// again and the outstanding principal is unchanged.
    #[test]
    fn prop_interest_only_renewal_resets_cycle(
        principal in principal(),
        rate in (10_000i64..600_000i64).prop_map(|v| Decimal::new(v, 4)),
    ) {
        let terms = terms_for(principal, rate);
        let quote = AccrualCalculator::quote(&terms, &[]);
        prop_assume!(quote.interest_remaining > Decimal::ZERO);

        let payment_date = date(2026, 1, 20);
        let allocation = RepaymentAllocator::allocate(
            LoanStatus::Disbursed,
            &terms,
            &[],
            quote.interest_remaining,
            RepaymentMode::InterestOnly,
            payment_date,
        )
        .unwrap();

        let cycle = allocation.renews_cycle.unwrap();
        prop_assert_eq!(cycle.release_date, payment_date);
        prop_assert_eq!(
            cycle.first_payment_date,
            payment_date + chrono::Days::new(30)
        );

        // Re-quote with the renewed anchors and the payment on record.
        let renewed_terms = LoanTerms {
            release_date: Some(cycle.release_date),
            first_payment_date: Some(cycle.first_payment_date),
            ..terms
        };
        let history = [RepaymentRecord {
            payment_date,
            amount: allocation.interest_amount,
            interest_amount: allocation.interest_amount,
            principal_amount: Decimal::ZERO,
            mode: RepaymentMode::InterestOnly,
        }];
        let fresh = AccrualCalculator::quote(&renewed_terms, &history);
        prop_assert_eq!(fresh.outstanding_principal, quote.outstanding_principal);
        prop_assert_eq!(fresh.interest_remaining, fresh.cycle_interest_total);
    }

    /// Across any sequence of in-range partial payments the principal
    /// balance is non-increasing and hits zero exactly when the loan closes.
    #[test]
    fn prop_principal_balance_monotone(
        principal in principal(),
        rate in rate_percent(),
        fractions in prop::collection::vec(1u32..=10_000u32, 1..8),
    ) {
        let mut terms = terms_for(principal, rate);
        let mut history: Vec<RepaymentRecord> = Vec::new();
        let mut previous_balance = principal;
        let mut closed = false;
        let payment_date = date(2026, 1, 15);

        for fraction_bps in fractions {
            if closed {
                break;
            }
            let quote = AccrualCalculator::quote(&terms, &history);
            if quote.outstanding_principal == Decimal::ZERO {
                break;
            }
            let min = quote.interest_remaining;
            let max = quote.outstanding_principal + quote.interest_remaining;
            let span = max - min;
            let amount = (min + span * Decimal::new(i64::from(fraction_bps), 4)).round_dp(2);
            if amount < min || amount > max || amount <= Decimal::ZERO {
                continue;
            }

            let allocation = RepaymentAllocator::allocate(
                LoanStatus::Disbursed,
                &terms,
                &history,
                amount,
                RepaymentMode::Partial,
                payment_date,
            )
            .unwrap();

            prop_assert!(allocation.principal_balance_after <= previous_balance);
            previous_balance = allocation.principal_balance_after;
            closed = allocation.closes_loan;

            history.push(RepaymentRecord {
                payment_date,
                amount,
                interest_amount: allocation.interest_amount,
                principal_amount: allocation.principal_amount,
                mode: RepaymentMode::Partial,
            });
            if let Some(cycle) = allocation.renews_cycle {
                terms.release_date = Some(cycle.release_date);
                terms.first_payment_date = Some(cycle.first_payment_date);
            }
        }

        prop_assert_eq!(closed, previous_balance == Decimal::ZERO);
    }
}

#[cfg(test)]
mod unit_tests {
    use super::*;
    use rust_decimal_macros::dec;

    /// The aggregate conservation property over a concrete mixed history.
    #[test]
    fn test_history_sums_conserve() {
        let mut terms = terms_for(dec!(10000.00), dec!(10.0000));
        let mut history: Vec<RepaymentRecord> = Vec::new();

        // interest-only, then partial, then full settlement.
        let steps = [
            (RepaymentMode::InterestOnly, dec!(1000.00), date(2026, 1, 31)),
            (RepaymentMode::Partial, dec!(5000.00), date(2026, 2, 10)),
            (RepaymentMode::Full, dec!(6000.00), date(2026, 2, 20)),
        ];

        for (mode, amount, when) in steps {
            let allocation = RepaymentAllocator::allocate(
                LoanStatus::Disbursed,
                &terms,
                &history,
                amount,
                mode,
                when,
            )
            .unwrap();
            history.push(RepaymentRecord {
                payment_date: when,
                amount,
                interest_amount: allocation.interest_amount,
                principal_amount: allocation.principal_amount,
                mode,
            });
            if let Some(cycle) = allocation.renews_cycle {
                terms.release_date = Some(cycle.release_date);
                terms.first_payment_date = Some(cycle.first_payment_date);
            }
        }

        let paid: Decimal = history.iter().map(|r| r.amount).sum();
        let interest: Decimal = history.iter().map(|r| r.interest_amount).sum();
        let principal: Decimal = history.iter().map(|r| r.principal_amount).sum();
        assert_eq!(interest + principal, paid);
        assert_eq!(principal, dec!(10000.00));
    }
}

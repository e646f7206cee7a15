//! Property-based tests for the accrual calculator.
//!
//! - Quote outputs are non-negative and internally consistent
//! - Quoting is idempotent (pure computation)
//! - Cycle interest matches the documented rounding rule

use chrono::NaiveDate;
use proptest::prelude::*;
use rust_decimal::{Decimal, RoundingStrategy};

use super::accrual::AccrualCalculator;
use super::types::{LoanTerms, RepaymentMode, RepaymentRecord};

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

/// Strategy to generate principal amounts (1.00 to 1,000,000.00).
fn principal() -> impl Strategy<Value = Decimal> {
    (100i64..100_000_000i64).prop_map(|cents| Decimal::new(cents, 2))
}

/// Strategy to generate percent rates (0.0000 to 100.0000).
fn rate_percent() -> impl Strategy<Value = Decimal> {
    (0i64..1_000_000i64).prop_map(|v| Decimal::new(v, 4))
}

fn mode() -> impl Strategy<Value = RepaymentMode> {
    prop_oneof![
        Just(RepaymentMode::InterestOnly),
        Just(RepaymentMode::Full),
        Just(RepaymentMode::Partial),
    ]
}

/// Strategy to generate a repayment on a day offset from 2025-12-01.
fn repayment() -> impl Strategy<Value = RepaymentRecord> {
    (0u64..120u64, 0i64..1_000_000i64, 0i64..1_000_000i64, mode()).prop_map(
        |(day_offset, interest_cents, principal_cents, mode)| {
            let interest = Decimal::new(interest_cents, 2);
            let principal = Decimal::new(principal_cents, 2);
            RepaymentRecord {
                payment_date: date(2025, 12, 1) + chrono::Days::new(day_offset),
                amount: interest + principal,
                interest_amount: interest,
                principal_amount: principal,
                mode,
            }
        },
    )
}

fn history() -> impl Strategy<Value = Vec<RepaymentRecord>> {
    prop::collection::vec(repayment(), 0..12)
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

    /// All quote components are non-negative and bounded by their bases.
    #[test]
    fn prop_quote_is_consistent(
        principal in principal(),
        rate in rate_percent(),
        history in history(),
    ) {
        let terms = terms_for(principal, rate);
        let quote = AccrualCalculator::quote(&terms, &history);

        prop_assert!(quote.outstanding_principal >= Decimal::ZERO);
        prop_assert!(quote.outstanding_principal <= principal);
        prop_assert!(quote.cycle_interest_total >= Decimal::ZERO);
        prop_assert!(quote.interest_remaining >= Decimal::ZERO);
        prop_assert!(quote.interest_remaining <= quote.cycle_interest_total);
    }

    /// Two calls with identical inputs return identical quotes.
    #[test]
    fn prop_quote_is_idempotent(
        principal in principal(),
        rate in rate_percent(),
        history in history(),
    ) {
        let terms = terms_for(principal, rate);
        prop_assert_eq!(
            AccrualCalculator::quote(&terms, &history),
            AccrualCalculator::quote(&terms, &history)
        );
    }

    /// With no repayment history, cycle interest is exactly the rounded
    /// principal * rate_fraction.
    #[test]
    fn prop_fresh_cycle_interest_matches_formula(
        principal in principal(),
        rate in rate_percent(),
    ) {
        let terms = terms_for(principal, rate);
        let quote = AccrualCalculator::quote(&terms, &[]);

        let expected = (principal * AccrualCalculator::rate_fraction(rate))
            .round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero);
        prop_assert_eq!(quote.cycle_interest_total, expected);
        prop_assert_eq!(quote.interest_remaining, expected);
        prop_assert_eq!(quote.outstanding_principal, principal);
    }

    /// Interest paid strictly before the cycle start never reduces the
    /// current cycle's remaining interest.
    #[test]
    fn prop_pre_cycle_interest_does_not_pay_cycle(
        principal in principal(),
        rate in rate_percent(),
        interest_cents in 1i64..1_000_000i64,
    ) {
        let terms = terms_for(principal, rate);
        let before_cycle = RepaymentRecord {
            payment_date: date(2025, 12, 15),
            amount: Decimal::new(interest_cents, 2),
            interest_amount: Decimal::new(interest_cents, 2),
            principal_amount: Decimal::ZERO,
            mode: RepaymentMode::Partial,
        };
        let quote = AccrualCalculator::quote(&terms, &[before_cycle]);
        prop_assert_eq!(quote.interest_remaining, quote.cycle_interest_total);
    }
}

//! Property-based tests for the ledger recorder.
//!
//! - Replaying a ledger built by `apply` always reconstructs the final balance
//! - The walk invariant survives arbitrary IN/OUT sequences
//! - Adjustments land exactly on the requested balance

use proptest::prelude::*;
use rust_decimal::Decimal;

use super::entry::{RecordedEntry, TxDirection};
use super::recorder::LedgerRecorder;

/// Strategy to generate positive amounts (0.01 to 100,000.00).
fn positive_amount() -> impl Strategy<Value = Decimal> {
    (1i64..10_000_000i64).prop_map(|cents| Decimal::new(cents, 2))
}

/// Strategy to generate a direction.
fn direction() -> impl Strategy<Value = TxDirection> {
    prop_oneof![Just(TxDirection::In), Just(TxDirection::Out)]
}

/// Strategy to generate a sequence of movements.
fn movements() -> impl Strategy<Value = Vec<(TxDirection, Decimal)>> {
    prop::collection::vec((direction(), positive_amount()), 0..40)
}

/// Build a well-formed ledger by applying movements in order.
fn build_ledger(moves: &[(TxDirection, Decimal)]) -> Vec<RecordedEntry> {
    let mut entries = Vec::with_capacity(moves.len());
    let mut balance = Decimal::ZERO;
    for &(dir, amount) in moves {
        let posting = LedgerRecorder::apply(balance, dir, amount).unwrap();
        entries.push(RecordedEntry {
            direction: dir,
            amount,
            balance_before: posting.balance_before,
            balance_after: posting.balance_after,
        });
        balance = posting.balance_after;
    }
    entries
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(200))]

    /// Replaying any well-formed ledger reconstructs the running balance.
    #[test]
    fn prop_replay_roundtrip(moves in movements()) {
        let entries = build_ledger(&moves);
        let expected: Decimal = moves
            .iter()
            .map(|(dir, amount)| match dir {
                TxDirection::In => *amount,
                TxDirection::Out => -*amount,
            })
            .sum();
        prop_assert_eq!(LedgerRecorder::replay(&entries).unwrap(), expected);
    }

    /// Each posting moves the balance by exactly the signed amount.
    #[test]
    fn prop_apply_moves_by_amount(
        balance in -1_000_000i64..1_000_000i64,
        amount in positive_amount(),
        dir in direction(),
    ) {
        let before = Decimal::new(balance, 2);
        let posting = LedgerRecorder::apply(before, dir, amount).unwrap();
        let delta = posting.balance_after - posting.balance_before;
        match dir {
            TxDirection::In => prop_assert_eq!(delta, amount),
            TxDirection::Out => prop_assert_eq!(delta, -amount),
        }
    }

    /// Adjustments land exactly on the requested balance.
    #[test]
    fn prop_adjustment_hits_target(
        current in -1_000_000i64..1_000_000i64,
        target in -1_000_000i64..1_000_000i64,
    ) {
        let current = Decimal::new(current, 2);
        let target = Decimal::new(target, 2);
        prop_assume!(current != target);
        let (_, _, posting) = LedgerRecorder::adjustment(current, target).unwrap();
        prop_assert_eq!(posting.balance_before, current);
        prop_assert_eq!(posting.balance_after, target);
    }

    /// Tampering with any recorded balance is caught by replay.
    #[test]
    fn prop_replay_detects_tampering(
        moves in prop::collection::vec((direction(), positive_amount()), 1..20),
        tamper_index in 0usize..20,
        tamper_cents in 1i64..10_000i64,
    ) {
        let mut entries = build_ledger(&moves);
        let index = tamper_index % entries.len();
        entries[index].balance_after += Decimal::new(tamper_cents, 2);
        prop_assert!(LedgerRecorder::replay(&entries).is_err());
    }
}

//! The ledger recorder: the one primitive that moves an account balance.
//!
//! The recorder is pure arithmetic. It never checks sufficiency - callers
//! that need a funds guarantee (disbursement) must check before applying.
//! The repository layer persists the resulting entry and the new balance in
//! the same database transaction, and is the only code path allowed to write
//! `company_accounts.balance`.

use rust_decimal::Decimal;

use super::entry::{Posting, RecordedEntry, TxDirection};
use super::error::LedgerError;

/// Stateless balance-walk primitive.
pub struct LedgerRecorder;

impl LedgerRecorder {
    /// Apply one movement to a balance.
    ///
    /// IN adds the amount, OUT subtracts it. The balance may go negative;
    /// sufficiency is the caller's contract, not the recorder's.
    ///
    /// # Errors
    ///
    /// Returns `LedgerError::ZeroAmount` or `LedgerError::NegativeAmount`
    /// if the amount is not strictly positive.
    pub fn apply(
        balance_before: Decimal,
        direction: TxDirection,
        amount: Decimal,
    ) -> Result<Posting, LedgerError> {
        if amount == Decimal::ZERO {
            return Err(LedgerError::ZeroAmount);
        }
        if amount < Decimal::ZERO {
            return Err(LedgerError::NegativeAmount);
        }

        let balance_after = match direction {
            TxDirection::In => balance_before + amount,
            TxDirection::Out => balance_before - amount,
        };

        Ok(Posting {
            balance_before,
            balance_after,
        })
    }

    /// Express a manual balance correction as a directed movement.
    ///
    /// The account-edit flow supplies the desired new balance; the ledger
    /// records the signed delta as a normal entry instead of overwriting
    /// history.
    ///
    /// # Errors
    ///
    /// Returns `LedgerError::ZeroAmount` if the new balance equals the
    /// current one (the append-only ledger carries no no-op entries).
    pub fn adjustment(
        current_balance: Decimal,
        new_balance: Decimal,
    ) -> Result<(TxDirection, Decimal, Posting), LedgerError> {
        let delta = new_balance - current_balance;
        let (direction, amount) = if delta >= Decimal::ZERO {
            (TxDirection::In, delta)
        } else {
            (TxDirection::Out, -delta)
        };
        let posting = Self::apply(current_balance, direction, amount)?;
        Ok((direction, amount, posting))
    }

    /// Replay a full ledger and reconstruct the final balance.
    ///
    /// Verifies the walk invariant: each entry's `balance_before` equals the
    /// previous entry's `balance_after`, and each `balance_after` is
    /// `balance_before ± amount`. Returns the last `balance_after`, or zero
    /// for an empty ledger (accounts open at zero).
    ///
    /// # Errors
    ///
    /// Returns `LedgerError::BrokenChain` or `LedgerError::BadArithmetic`
    /// pointing at the first offending entry.
    pub fn replay(entries: &[RecordedEntry]) -> Result<Decimal, LedgerError> {
        let mut balance = Decimal::ZERO;

        for (index, entry) in entries.iter().enumerate() {
            if index > 0 && entry.balance_before != balance {
                return Err(LedgerError::BrokenChain {
                    index,
                    expected: balance,
                    found: entry.balance_before,
                });
            }

            let posting = Self::apply(entry.balance_before, entry.direction, entry.amount)?;
            if posting.balance_after != entry.balance_after {
                return Err(LedgerError::BadArithmetic {
                    index,
                    expected: posting.balance_after,
                    found: entry.balance_after,
                });
            }

            balance = entry.balance_after;
        }

        Ok(balance)
    }
}

//! Append-only account ledger and balance bookkeeping.
//!
//! This module implements the single code path through which a funding
//! account's balance may change:
//! - Transaction directions and source kinds
//! - The ledger recorder (balance walk primitive)
//! - Ledger replay verification
//! - Error types for ledger operations

pub mod entry;
pub mod error;
pub mod recorder;

#[cfg(test)]
mod recorder_props;

pub use entry::{Posting, RecordedEntry, TxDirection, TxSource};
pub use error::LedgerError;
pub use recorder::LedgerRecorder;

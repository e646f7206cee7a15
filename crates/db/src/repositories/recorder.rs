//! The single code path that writes money movements.
//!
//! Every balance change goes through [`post`]: it walks the account balance
//! forward, appends the ledger row, and updates the account, all inside the
//! caller's database transaction. Callers must hold an exclusive lock on the
//! account row before calling.

use chrono::{NaiveDate, Utc};
use rust_decimal::Decimal;
use sea_orm::{ActiveModelTrait, DatabaseTransaction, Set};
use uuid::Uuid;

use salama_core::ledger::{LedgerRecorder, TxDirection, TxSource};

use super::RepoError;
use crate::entities::{account_transactions, company_accounts};

/// A ledger entry ready to be written.
pub(crate) struct Entry<'a> {
    pub direction: TxDirection,
    pub source: TxSource,
    pub source_id: Option<Uuid>,
    pub tx_date: NaiveDate,
    pub description: String,
    pub amount: Decimal,
    pub created_by: Option<Uuid>,
    pub account: &'a company_accounts::Model,
}

/// Appends a ledger row and moves the account balance with it.
///
/// Returns the inserted row; its `balance_after` is the account's new balance.
pub(crate) async fn post(
    txn: &DatabaseTransaction,
    entry: Entry<'_>,
) -> Result<account_transactions::Model, RepoError> {
    let posting = LedgerRecorder::apply(entry.account.balance, entry.direction, entry.amount)?;
    let now = Utc::now().into();

    let row = account_transactions::ActiveModel {
        id: Set(Uuid::new_v4()),
        company_account_id: Set(entry.account.id),
        direction: Set(entry.direction.as_str().to_owned()),
        source_type: Set(entry.source.as_str().to_owned()),
        source_id: Set(entry.source_id),
        tx_date: Set(entry.tx_date),
        description: Set(entry.description),
        amount: Set(entry.amount),
        balance_before: Set(posting.balance_before),
        balance_after: Set(posting.balance_after),
        is_active: Set(true),
        created_by: Set(entry.created_by),
        created_at: Set(now),
    }
    .insert(txn)
    .await?;

    let mut account: company_accounts::ActiveModel = entry.account.clone().into();
    account.balance = Set(posting.balance_after);
    account.updated_at = Set(now);
    account.update(txn).await?;

    Ok(row)
}

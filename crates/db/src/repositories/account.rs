//! Company account repository: funding accounts and their ledger.

use chrono::{NaiveDate, Utc};
use rust_decimal::Decimal;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, DatabaseTransaction, EntityTrait,
    QueryFilter, QueryOrder, QuerySelect, Set, TransactionTrait,
};
use uuid::Uuid;

use salama_core::ledger::{LedgerRecorder, RecordedEntry, TxDirection, TxSource};

use super::{RepoError, recorder};
use crate::entities::{account_transactions, company_accounts};

/// Input for creating a funding account.
#[derive(Debug, Clone)]
pub struct CreateAccountInput {
    /// Display name.
    pub name: String,
    /// External identifier (bank account number, wallet number).
    pub account_number: Option<String>,
    /// Starting balance; zero when omitted by the caller.
    pub opening_balance: Decimal,
}

/// Input for setting an account balance by hand.
#[derive(Debug, Clone)]
pub struct AdjustBalanceInput {
    /// Account to adjust.
    pub account_id: Uuid,
    /// The balance the account should show after the adjustment.
    pub new_balance: Decimal,
    /// Ledger date for the adjustment entry.
    pub tx_date: NaiveDate,
    /// Free-form reason, stored as the entry description.
    pub reason: Option<String>,
    /// Operator performing the adjustment.
    pub adjusted_by: Option<Uuid>,
}

/// Repository for company accounts and their transaction ledger.
#[derive(Debug, Clone)]
pub struct AccountRepository {
    db: DatabaseConnection,
}

impl AccountRepository {
    /// Creates a new account repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Creates a funding account.
    ///
    /// A non-zero opening balance is written through the ledger so the
    /// balance walk starts from a recorded entry rather than thin air.
    ///
    /// # Errors
    ///
    /// Returns an error if the opening balance is negative or the database
    /// operation fails.
    pub async fn create(
        &self,
        input: CreateAccountInput,
    ) -> Result<company_accounts::Model, RepoError> {
        let txn = self.db.begin().await?;
        let now = Utc::now().into();

        let account = company_accounts::ActiveModel {
            id: Set(Uuid::new_v4()),
            name: Set(input.name),
            account_number: Set(input.account_number),
            balance: Set(Decimal::ZERO),
            is_active: Set(true),
            created_at: Set(now),
            updated_at: Set(now),
        }
        .insert(&txn)
        .await?;

        let account = if input.opening_balance == Decimal::ZERO {
            account
        } else {
            recorder::post(
                &txn,
                recorder::Entry {
                    direction: TxDirection::In,
                    source: TxSource::BalanceAdjustment,
                    source_id: None,
                    tx_date: Utc::now().date_naive(),
                    description: "Opening balance".to_owned(),
                    amount: input.opening_balance,
                    created_by: None,
                    account: &account,
                },
            )
            .await?;
            // Re-read so the returned model carries the posted balance.
            Self::find_for_update(&txn, account.id).await?
        };

        txn.commit().await.map_err(RepoError::from_commit)?;

        tracing::info!(account_id = %account.id, "company account created");
        Ok(account)
    }

    /// Finds an account by id.
    ///
    /// # Errors
    ///
    /// Returns `AccountNotFound` if no such account exists.
    pub async fn find(&self, account_id: Uuid) -> Result<company_accounts::Model, RepoError> {
        company_accounts::Entity::find_by_id(account_id)
            .one(&self.db)
            .await?
            .ok_or(RepoError::AccountNotFound(account_id))
    }

    /// Lists active accounts, newest first.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn list_active(&self) -> Result<Vec<company_accounts::Model>, RepoError> {
        let accounts = company_accounts::Entity::find()
            .filter(company_accounts::Column::IsActive.eq(true))
            .order_by_desc(company_accounts::Column::CreatedAt)
            .all(&self.db)
            .await?;
        Ok(accounts)
    }

    /// Lists an account's ledger entries in balance-walk order.
    ///
    /// # Errors
    ///
    /// Returns `AccountNotFound` if no such account exists.
    pub async fn list_transactions(
        &self,
        account_id: Uuid,
    ) -> Result<Vec<account_transactions::Model>, RepoError> {
        // Existence check first so an empty ledger and a bad id differ.
        self.find(account_id).await?;

        let entries = account_transactions::Entity::find()
            .filter(account_transactions::Column::CompanyAccountId.eq(account_id))
            .order_by_asc(account_transactions::Column::TxDate)
            .order_by_asc(account_transactions::Column::CreatedAt)
            .all(&self.db)
            .await?;
        Ok(entries)
    }

    /// Sets an account's balance to an explicit figure.
    ///
    /// The difference is written as a single IN or OUT adjustment entry;
    /// the ledger keeps the full story of how the balance moved.
    ///
    /// # Errors
    ///
    /// Returns an error if the account is missing or inactive, the new
    /// balance equals the current one, or the database operation fails.
    pub async fn adjust_balance(
        &self,
        input: AdjustBalanceInput,
    ) -> Result<account_transactions::Model, RepoError> {
        let txn = self.db.begin().await?;

        let account = Self::find_for_update(&txn, input.account_id).await?;
        if !account.is_active {
            return Err(RepoError::AccountInactive(account.id));
        }

        let (direction, amount, _posting) =
            LedgerRecorder::adjustment(account.balance, input.new_balance)?;

        let entry = recorder::post(
            &txn,
            recorder::Entry {
                direction,
                source: TxSource::BalanceAdjustment,
                source_id: None,
                tx_date: input.tx_date,
                description: input
                    .reason
                    .unwrap_or_else(|| "Manual balance adjustment".to_owned()),
                amount,
                created_by: input.adjusted_by,
                account: &account,
            },
        )
        .await?;

        txn.commit().await.map_err(RepoError::from_commit)?;

        tracing::info!(
            account_id = %account.id,
            direction = direction.as_str(),
            %amount,
            new_balance = %entry.balance_after,
            "account balance adjusted"
        );
        Ok(entry)
    }

    /// Replays an account's full ledger and checks it against the stored
    /// balance.
    ///
    /// Returns the replayed balance on success.
    ///
    /// # Errors
    ///
    /// Returns a ledger error when the chain is broken or the final balance
    /// does not match the account row.
    pub async fn verify_ledger(&self, account_id: Uuid) -> Result<Decimal, RepoError> {
        let account = self.find(account_id).await?;
        let entries = self.list_transactions(account_id).await?;

        let recorded: Vec<RecordedEntry> = entries
            .iter()
            .map(|entry| {
                let direction = TxDirection::parse(&entry.direction).ok_or_else(|| {
                    RepoError::CorruptValue {
                        table: "account_transactions",
                        column: "direction",
                        value: entry.direction.clone(),
                    }
                })?;
                Ok(RecordedEntry {
                    direction,
                    amount: entry.amount,
                    balance_before: entry.balance_before,
                    balance_after: entry.balance_after,
                })
            })
            .collect::<Result<_, RepoError>>()?;

        let replayed = LedgerRecorder::replay(&recorded)?;
        if replayed != account.balance {
            tracing::warn!(
                account_id = %account.id,
                stored = %account.balance,
                %replayed,
                "account balance does not match its ledger"
            );
            return Err(RepoError::Ledger(
                salama_core::ledger::LedgerError::BadArithmetic {
                    index: recorded.len().saturating_sub(1),
                    expected: replayed,
                    found: account.balance,
                },
            ));
        }
        Ok(replayed)
    }

    /// Loads an account row under an exclusive lock.
    pub(crate) async fn find_for_update(
        txn: &DatabaseTransaction,
        account_id: Uuid,
    ) -> Result<company_accounts::Model, RepoError> {
        company_accounts::Entity::find_by_id(account_id)
            .lock_exclusive()
            .one(txn)
            .await?
            .ok_or(RepoError::AccountNotFound(account_id))
    }
}

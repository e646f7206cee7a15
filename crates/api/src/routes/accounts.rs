//! Company account routes: funding accounts and their ledger.

use axum::{
    Json, Router,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
};
use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::str::FromStr;
use uuid::Uuid;

use crate::AppState;
use crate::routes::{bad_request, repo_error_response};
use salama_db::entities::{account_transactions, company_accounts};
use salama_db::repositories::{AccountRepository, AdjustBalanceInput, CreateAccountInput};
use salama_shared::types::{AccountId, TransactionId, UserId};

/// Creates the account routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/accounts", get(list_accounts))
        .route("/accounts", post(create_account))
        .route("/accounts/{account_id}", get(get_account))
        .route("/accounts/{account_id}/transactions", get(list_transactions))
        .route("/accounts/{account_id}/adjust-balance", post(adjust_balance))
}

/// Request body for creating an account.
#[derive(Debug, Deserialize)]
pub struct CreateAccountRequest {
    /// Display name.
    pub name: String,
    /// External identifier (bank account number, wallet number).
    pub account_number: Option<String>,
    /// Starting balance as a decimal string; defaults to zero.
    pub opening_balance: Option<String>,
}

/// Request body for setting a balance by hand.
#[derive(Debug, Deserialize)]
pub struct AdjustBalanceRequest {
    /// The balance the account should show afterwards.
    pub new_balance: String,
    /// Ledger date for the adjustment entry (YYYY-MM-DD).
    pub tx_date: NaiveDate,
    /// Free-form reason.
    pub reason: Option<String>,
    /// Operator performing the adjustment.
    pub adjusted_by: Option<UserId>,
}

/// Response for an account.
#[derive(Debug, Serialize)]
pub struct AccountResponse {
    /// Account ID.
    pub id: AccountId,
    /// Display name.
    pub name: String,
    /// External identifier.
    pub account_number: Option<String>,
    /// Current balance.
    pub balance: String,
    /// Whether the account is active.
    pub is_active: bool,
    /// Created at timestamp.
    pub created_at: String,
}

/// Response for a ledger entry.
#[derive(Debug, Serialize)]
pub struct TransactionResponse {
    /// Entry ID.
    pub id: TransactionId,
    /// "IN" or "OUT".
    pub direction: String,
    /// Business origin of the entry.
    pub source_type: String,
    /// Originating record, when one exists.
    pub source_id: Option<Uuid>,
    /// Ledger date.
    pub tx_date: String,
    /// Description.
    pub description: String,
    /// Amount moved.
    pub amount: String,
    /// Balance before this entry.
    pub balance_before: String,
    /// Balance after this entry.
    pub balance_after: String,
    /// Created at timestamp.
    pub created_at: String,
}

fn account_response(account: company_accounts::Model) -> AccountResponse {
    AccountResponse {
        id: AccountId::from_uuid(account.id),
        name: account.name,
        account_number: account.account_number,
        balance: account.balance.to_string(),
        is_active: account.is_active,
        created_at: account.created_at.to_rfc3339(),
    }
}

fn transaction_response(entry: account_transactions::Model) -> TransactionResponse {
    TransactionResponse {
        id: TransactionId::from_uuid(entry.id),
        direction: entry.direction,
        source_type: entry.source_type,
        source_id: entry.source_id,
        tx_date: entry.tx_date.to_string(),
        description: entry.description,
        amount: entry.amount.to_string(),
        balance_before: entry.balance_before.to_string(),
        balance_after: entry.balance_after.to_string(),
        created_at: entry.created_at.to_rfc3339(),
    }
}

/// POST `/accounts` - Create a funding account.
async fn create_account(
    State(state): State<AppState>,
    Json(payload): Json<CreateAccountRequest>,
) -> impl IntoResponse {
    let opening_balance = match payload.opening_balance.as_deref() {
        None => Decimal::ZERO,
        Some(raw) => match Decimal::from_str(raw) {
            Ok(amount) if amount >= Decimal::ZERO => amount,
            Ok(_) => {
                return bad_request("invalid_amount", "Opening balance cannot be negative");
            }
            Err(_) => return bad_request("invalid_amount", "Opening balance is not a number"),
        },
    };

    let repo = AccountRepository::new((*state.db).clone());
    match repo
        .create(CreateAccountInput {
            name: payload.name,
            account_number: payload.account_number,
            opening_balance,
        })
        .await
    {
        Ok(account) => {
            (StatusCode::CREATED, Json(account_response(account))).into_response()
        }
        Err(e) => repo_error_response(&e),
    }
}

/// GET `/accounts` - List active accounts.
async fn list_accounts(State(state): State<AppState>) -> impl IntoResponse {
    let repo = AccountRepository::new((*state.db).clone());
    match repo.list_active().await {
        Ok(accounts) => {
            let items: Vec<AccountResponse> =
                accounts.into_iter().map(account_response).collect();
            (StatusCode::OK, Json(json!({ "accounts": items }))).into_response()
        }
        Err(e) => repo_error_response(&e),
    }
}

/// GET `/accounts/{account_id}` - Get one account.
async fn get_account(
    State(state): State<AppState>,
    Path(account_id): Path<AccountId>,
) -> impl IntoResponse {
    let repo = AccountRepository::new((*state.db).clone());
    match repo.find(account_id.into_inner()).await {
        Ok(account) => (StatusCode::OK, Json(account_response(account))).into_response(),
        Err(e) => repo_error_response(&e),
    }
}

/// GET `/accounts/{account_id}/transactions` - The account's ledger in
/// balance-walk order.
async fn list_transactions(
    State(state): State<AppState>,
    Path(account_id): Path<AccountId>,
) -> impl IntoResponse {
    let repo = AccountRepository::new((*state.db).clone());
    match repo.list_transactions(account_id.into_inner()).await {
        Ok(entries) => {
            let items: Vec<TransactionResponse> =
                entries.into_iter().map(transaction_response).collect();
            (StatusCode::OK, Json(json!({ "transactions": items }))).into_response()
        }
        Err(e) => repo_error_response(&e),
    }
}

/// POST `/accounts/{account_id}/adjust-balance` - Set the balance to an
/// explicit figure, recording the difference in the ledger.
async fn adjust_balance(
    State(state): State<AppState>,
    Path(account_id): Path<AccountId>,
    Json(payload): Json<AdjustBalanceRequest>,
) -> impl IntoResponse {
    let Ok(new_balance) = Decimal::from_str(&payload.new_balance) else {
        return bad_request("invalid_amount", "New balance is not a number");
    };

    let repo = AccountRepository::new((*state.db).clone());
    match repo
        .adjust_balance(AdjustBalanceInput {
            account_id: account_id.into_inner(),
            new_balance,
            tx_date: payload.tx_date,
            reason: payload.reason,
            adjusted_by: payload.adjusted_by.map(UserId::into_inner),
        })
        .await
    {
        Ok(entry) => (StatusCode::OK, Json(transaction_response(entry))).into_response(),
        Err(e) => repo_error_response(&e),
    }
}

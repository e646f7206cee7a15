//! Loan routes: intake, the approval workflow, disbursement, repayment and
//! cycle quoting.

use axum::{
    Json, Router,
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
};
use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::str::FromStr;

use crate::AppState;
use crate::routes::{bad_request, repo_error_response};
use salama_core::loan::{
    CycleQuote, DisburseMethod, LoanStatus, PaymentMethod, PeriodType, RepaymentMode,
};
use salama_db::entities::{loan_disbursements, loan_repayments, loans};
use salama_db::repositories::{
    CreateLoanInput, DisburseLoanInput, LoanFilter, LoanRepository, RepayLoanInput,
};
use salama_shared::types::{
    AccountId, DisbursementId, InterestProductId, LoanId, LoanProductId, MemberId, RepaymentId,
    UserId,
};

/// Creates the loan routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/loans", get(list_loans))
        .route("/loans", post(create_loan))
        .route("/loans/{loan_id}", get(get_loan))
        .route("/loans/{loan_id}/approve", post(approve_loan))
        .route("/loans/{loan_id}/reject", post(reject_loan))
        .route("/loans/{loan_id}/disburse", post(disburse_loan))
        .route("/loans/{loan_id}/repayments", get(list_repayments))
        .route("/loans/{loan_id}/repayments", post(repay_loan))
        .route("/loans/{loan_id}/cycle", get(quote_cycle))
}

// ============================================================================
// Request/Response Types
// ============================================================================

/// Query parameters for listing loans.
#[derive(Debug, Deserialize)]
pub struct ListLoansQuery {
    /// Filter by status.
    pub status: Option<String>,
    /// Filter by member ID.
    pub member: Option<MemberId>,
}

/// Request body for registering a loan application.
#[derive(Debug, Deserialize)]
pub struct CreateLoanRequest {
    /// Borrowing member.
    pub member_id: MemberId,
    /// Optional loan product.
    pub loan_product_id: Option<LoanProductId>,
    /// Interest product supplying the cycle rate.
    pub interest_product_id: InterestProductId,
    /// Principal applied for, as a decimal string.
    pub principal_amount: String,
    /// Number of periods applied for.
    pub term_periods: i32,
    /// "monthly" or "daily"; defaults to monthly.
    pub period_type: Option<String>,
    /// Informational flat-schedule figure.
    pub payment_per_period: Option<String>,
    /// Due date for the first cycle, when agreed at intake (YYYY-MM-DD).
    pub first_payment_date: Option<NaiveDate>,
    /// How the money will be handed over; defaults to cash.
    pub disburse_method: Option<String>,
    /// What the loan is for.
    pub purpose: Option<String>,
    /// Free-form notes.
    pub remarks: Option<String>,
    /// Operator registering the application.
    pub created_by: Option<UserId>,
}

/// Request body for approving a loan.
#[derive(Debug, Default, Deserialize)]
pub struct ApproveLoanRequest {
    /// Operator approving the application.
    pub approved_by: Option<UserId>,
}

/// Request body for disbursing a loan.
#[derive(Debug, Deserialize)]
pub struct DisburseLoanRequest {
    /// Funding account the money leaves.
    pub company_account_id: AccountId,
    /// Amount handed to the member, as a decimal string.
    pub amount: String,
    /// Disbursement date (YYYY-MM-DD).
    pub disburse_date: NaiveDate,
    /// Payment channel: "cash", "bank" or "mobile"; defaults to cash.
    pub method: Option<String>,
    /// Free-form notes.
    pub notes: Option<String>,
    /// Operator performing the disbursement.
    pub created_by: Option<UserId>,
}

/// Request body for registering a repayment.
#[derive(Debug, Deserialize)]
pub struct RepayLoanRequest {
    /// Funding account the money enters.
    pub company_account_id: AccountId,
    /// Amount paid, as a decimal string.
    pub amount: String,
    /// "interest_only", "full" or "partial".
    pub mode: String,
    /// Date the payment was made (YYYY-MM-DD).
    pub payment_date: NaiveDate,
    /// Payment channel: "cash", "bank" or "mobile"; defaults to cash.
    pub method: Option<String>,
    /// Free-form notes.
    pub notes: Option<String>,
    /// Operator registering the payment.
    pub created_by: Option<UserId>,
}

/// Query parameters for quoting a cycle.
#[derive(Debug, Deserialize)]
pub struct QuoteCycleQuery {
    /// Count only payments on or before this date (YYYY-MM-DD).
    pub as_of: Option<NaiveDate>,
}

/// Response for a loan.
#[derive(Debug, Serialize)]
pub struct LoanResponse {
    /// Loan ID.
    pub id: LoanId,
    /// Borrowing member.
    pub member_id: MemberId,
    /// Loan product, when set.
    pub loan_product_id: Option<LoanProductId>,
    /// Interest product.
    pub interest_product_id: InterestProductId,
    /// Principal applied for.
    pub principal_amount: String,
    /// Number of periods applied for.
    pub term_periods: i32,
    /// Period unit.
    pub period_type: String,
    /// Current cycle start.
    pub release_date: Option<String>,
    /// Current cycle due date.
    pub first_payment_date: Option<String>,
    /// Disbursement channel.
    pub disburse_method: String,
    /// Funding account, once disbursed.
    pub company_account_id: Option<AccountId>,
    /// Status.
    pub status: String,
    /// Operator who approved the loan.
    pub approved_by: Option<UserId>,
    /// Created at timestamp.
    pub created_at: String,
}

/// Response for a disbursement.
#[derive(Debug, Serialize)]
pub struct DisbursementResponse {
    /// Disbursement ID.
    pub id: DisbursementId,
    /// Loan paid out.
    pub loan_id: LoanId,
    /// Funding account.
    pub company_account_id: AccountId,
    /// Disbursement date.
    pub disburse_date: String,
    /// Amount handed over.
    pub amount: String,
    /// Payment channel.
    pub method: String,
}

/// Response for a repayment.
#[derive(Debug, Serialize)]
pub struct RepaymentResponse {
    /// Repayment ID.
    pub id: RepaymentId,
    /// Loan repaid.
    pub loan_id: LoanId,
    /// Funding account.
    pub company_account_id: AccountId,
    /// Payment date.
    pub payment_date: String,
    /// Amount paid.
    pub amount: String,
    /// Portion allocated to interest.
    pub interest_amount: String,
    /// Portion allocated to principal.
    pub principal_amount: String,
    /// Outstanding principal after this payment.
    pub principal_balance_after: String,
    /// Repayment mode.
    pub mode: String,
    /// Payment channel.
    pub method: String,
}

/// Response for a cycle quote.
#[derive(Debug, Serialize)]
pub struct CycleQuoteResponse {
    /// Loan quoted.
    pub loan_id: LoanId,
    /// Current cycle start.
    pub release_date: Option<String>,
    /// Current cycle due date.
    pub first_payment_date: Option<String>,
    /// Outstanding principal.
    pub outstanding_principal: String,
    /// Interest charged for the cycle.
    pub cycle_interest_total: String,
    /// Cycle interest not yet covered.
    pub interest_remaining: String,
    /// Exact amount a full settlement requires.
    pub full_settlement_amount: String,
}

fn loan_response(loan: loans::Model) -> LoanResponse {
    LoanResponse {
        id: LoanId::from_uuid(loan.id),
        member_id: MemberId::from_uuid(loan.member_id),
        loan_product_id: loan.loan_product_id.map(LoanProductId::from_uuid),
        interest_product_id: InterestProductId::from_uuid(loan.interest_product_id),
        principal_amount: loan.principal_amount.to_string(),
        term_periods: loan.term_periods,
        period_type: loan.period_type,
        release_date: loan.release_date.map(|d| d.to_string()),
        first_payment_date: loan.first_payment_date.map(|d| d.to_string()),
        disburse_method: loan.disburse_method,
        company_account_id: loan.company_account_id.map(AccountId::from_uuid),
        status: loan.status,
        approved_by: loan.approved_by.map(UserId::from_uuid),
        created_at: loan.created_at.to_rfc3339(),
    }
}

fn disbursement_response(disbursement: loan_disbursements::Model) -> DisbursementResponse {
    DisbursementResponse {
        id: DisbursementId::from_uuid(disbursement.id),
        loan_id: LoanId::from_uuid(disbursement.loan_id),
        company_account_id: AccountId::from_uuid(disbursement.company_account_id),
        disburse_date: disbursement.disburse_date.to_string(),
        amount: disbursement.amount.to_string(),
        method: disbursement.method,
    }
}

fn repayment_response(repayment: loan_repayments::Model) -> RepaymentResponse {
    RepaymentResponse {
        id: RepaymentId::from_uuid(repayment.id),
        loan_id: LoanId::from_uuid(repayment.loan_id),
        company_account_id: AccountId::from_uuid(repayment.company_account_id),
        payment_date: repayment.payment_date.to_string(),
        amount: repayment.amount.to_string(),
        interest_amount: repayment.interest_amount.to_string(),
        principal_amount: repayment.principal_amount.to_string(),
        principal_balance_after: repayment.principal_balance_after.to_string(),
        mode: repayment.mode,
        method: repayment.method,
    }
}

fn quote_response(loan: &loans::Model, quote: CycleQuote) -> CycleQuoteResponse {
    CycleQuoteResponse {
        loan_id: LoanId::from_uuid(loan.id),
        release_date: loan.release_date.map(|d| d.to_string()),
        first_payment_date: loan.first_payment_date.map(|d| d.to_string()),
        outstanding_principal: quote.outstanding_principal.to_string(),
        cycle_interest_total: quote.cycle_interest_total.to_string(),
        interest_remaining: quote.interest_remaining.to_string(),
        full_settlement_amount: (quote.outstanding_principal + quote.interest_remaining)
            .to_string(),
    }
}

// ============================================================================
// Route Handlers
// ============================================================================

/// POST `/loans` - Register a loan application.
async fn create_loan(
    State(state): State<AppState>,
    Json(payload): Json<CreateLoanRequest>,
) -> impl IntoResponse {
    let Ok(principal_amount) = Decimal::from_str(&payload.principal_amount) else {
        return bad_request("invalid_amount", "Principal amount is not a number");
    };

    let period_type = match payload.period_type.as_deref() {
        None => PeriodType::Monthly,
        Some(raw) => match PeriodType::parse(raw) {
            Some(parsed) => parsed,
            None => return bad_request("invalid_period_type", "Unknown period type"),
        },
    };

    let disburse_method = match payload.disburse_method.as_deref() {
        None => DisburseMethod::Cash,
        Some(raw) => match DisburseMethod::parse(raw) {
            Some(parsed) => parsed,
            None => return bad_request("invalid_disburse_method", "Unknown disburse method"),
        },
    };

    let payment_per_period = match payload.payment_per_period.as_deref() {
        None => None,
        Some(raw) => match Decimal::from_str(raw) {
            Ok(amount) => Some(amount),
            Err(_) => {
                return bad_request("invalid_amount", "Payment per period is not a number");
            }
        },
    };

    let repo = LoanRepository::new((*state.db).clone());
    match repo
        .create(CreateLoanInput {
            member_id: payload.member_id.into_inner(),
            loan_product_id: payload.loan_product_id.map(LoanProductId::into_inner),
            interest_product_id: payload.interest_product_id.into_inner(),
            principal_amount,
            term_periods: payload.term_periods,
            period_type,
            payment_per_period,
            first_payment_date: payload.first_payment_date,
            disburse_method,
            purpose: payload.purpose,
            remarks: payload.remarks,
            created_by: payload.created_by.map(UserId::into_inner),
        })
        .await
    {
        Ok(loan) => (StatusCode::CREATED, Json(loan_response(loan))).into_response(),
        Err(e) => repo_error_response(&e),
    }
}

/// GET `/loans` - List loans with optional filters.
async fn list_loans(
    State(state): State<AppState>,
    Query(query): Query<ListLoansQuery>,
) -> impl IntoResponse {
    let status = match query.status.as_deref() {
        None => None,
        Some(raw) => match LoanStatus::parse(raw) {
            Some(parsed) => Some(parsed),
            None => return bad_request("invalid_status", "Unknown loan status"),
        },
    };

    let repo = LoanRepository::new((*state.db).clone());
    match repo
        .list(LoanFilter {
            status,
            member_id: query.member.map(MemberId::into_inner),
        })
        .await
    {
        Ok(loans) => {
            let items: Vec<LoanResponse> = loans.into_iter().map(loan_response).collect();
            (StatusCode::OK, Json(json!({ "loans": items }))).into_response()
        }
        Err(e) => repo_error_response(&e),
    }
}

/// GET `/loans/{loan_id}` - Get one loan.
async fn get_loan(
    State(state): State<AppState>,
    Path(loan_id): Path<LoanId>,
) -> impl IntoResponse {
    let repo = LoanRepository::new((*state.db).clone());
    match repo.find(loan_id.into_inner()).await {
        Ok(loan) => (StatusCode::OK, Json(loan_response(loan))).into_response(),
        Err(e) => repo_error_response(&e),
    }
}

/// POST `/loans/{loan_id}/approve` - Approve a pending loan.
async fn approve_loan(
    State(state): State<AppState>,
    Path(loan_id): Path<LoanId>,
    payload: Option<Json<ApproveLoanRequest>>,
) -> impl IntoResponse {
    let approved_by = payload
        .and_then(|Json(body)| body.approved_by)
        .map(UserId::into_inner);

    let repo = LoanRepository::new((*state.db).clone());
    match repo.approve(loan_id.into_inner(), approved_by).await {
        Ok(loan) => (StatusCode::OK, Json(loan_response(loan))).into_response(),
        Err(e) => repo_error_response(&e),
    }
}

/// POST `/loans/{loan_id}/reject` - Reject a pending loan.
async fn reject_loan(
    State(state): State<AppState>,
    Path(loan_id): Path<LoanId>,
) -> impl IntoResponse {
    let repo = LoanRepository::new((*state.db).clone());
    match repo.reject(loan_id.into_inner()).await {
        Ok(loan) => (StatusCode::OK, Json(loan_response(loan))).into_response(),
        Err(e) => repo_error_response(&e),
    }
}

/// POST `/loans/{loan_id}/disburse` - Pay an approved loan out of a funding
/// account.
async fn disburse_loan(
    State(state): State<AppState>,
    Path(loan_id): Path<LoanId>,
    Json(payload): Json<DisburseLoanRequest>,
) -> impl IntoResponse {
    let Ok(amount) = Decimal::from_str(&payload.amount) else {
        return bad_request("invalid_amount", "Disbursement amount is not a number");
    };

    let method = match payload.method.as_deref() {
        None => PaymentMethod::Cash,
        Some(raw) => match PaymentMethod::parse(raw) {
            Some(parsed) => parsed,
            None => return bad_request("invalid_method", "Unknown payment method"),
        },
    };

    let repo = LoanRepository::new((*state.db).clone());
    match repo
        .disburse(DisburseLoanInput {
            loan_id: loan_id.into_inner(),
            company_account_id: payload.company_account_id.into_inner(),
            amount,
            disburse_date: payload.disburse_date,
            method,
            notes: payload.notes,
            created_by: payload.created_by.map(UserId::into_inner),
        })
        .await
    {
        Ok(disbursement) => (
            StatusCode::CREATED,
            Json(disbursement_response(disbursement)),
        )
            .into_response(),
        Err(e) => repo_error_response(&e),
    }
}

/// POST `/loans/{loan_id}/repayments` - Register a repayment.
async fn repay_loan(
    State(state): State<AppState>,
    Path(loan_id): Path<LoanId>,
    Json(payload): Json<RepayLoanRequest>,
) -> impl IntoResponse {
    let Ok(amount) = Decimal::from_str(&payload.amount) else {
        return bad_request("invalid_amount", "Repayment amount is not a number");
    };

    let Some(mode) = RepaymentMode::parse(&payload.mode) else {
        return bad_request("invalid_mode", "Unknown repayment mode");
    };

    let method = match payload.method.as_deref() {
        None => PaymentMethod::Cash,
        Some(raw) => match PaymentMethod::parse(raw) {
            Some(parsed) => parsed,
            None => return bad_request("invalid_method", "Unknown payment method"),
        },
    };

    let repo = LoanRepository::new((*state.db).clone());
    match repo
        .repay(RepayLoanInput {
            loan_id: loan_id.into_inner(),
            company_account_id: payload.company_account_id.into_inner(),
            amount,
            mode,
            payment_date: payload.payment_date,
            method,
            notes: payload.notes,
            created_by: payload.created_by.map(UserId::into_inner),
        })
        .await
    {
        Ok(repayment) => {
            (StatusCode::CREATED, Json(repayment_response(repayment))).into_response()
        }
        Err(e) => repo_error_response(&e),
    }
}

/// GET `/loans/{loan_id}/repayments` - The loan's repayments in payment
/// order.
async fn list_repayments(
    State(state): State<AppState>,
    Path(loan_id): Path<LoanId>,
) -> impl IntoResponse {
    let repo = LoanRepository::new((*state.db).clone());
    match repo.list_repayments(loan_id.into_inner()).await {
        Ok(repayments) => {
            let items: Vec<RepaymentResponse> =
                repayments.into_iter().map(repayment_response).collect();
            (StatusCode::OK, Json(json!({ "repayments": items }))).into_response()
        }
        Err(e) => repo_error_response(&e),
    }
}

/// GET `/loans/{loan_id}/cycle` - Quote the loan's current billing cycle.
async fn quote_cycle(
    State(state): State<AppState>,
    Path(loan_id): Path<LoanId>,
    Query(query): Query<QuoteCycleQuery>,
) -> impl IntoResponse {
    let repo = LoanRepository::new((*state.db).clone());
    match repo.quote_cycle(loan_id.into_inner(), query.as_of).await {
        Ok(quoted) => {
            (StatusCode::OK, Json(quote_response(&quoted.loan, quoted.quote))).into_response()
        }
        Err(e) => repo_error_response(&e),
    }
}

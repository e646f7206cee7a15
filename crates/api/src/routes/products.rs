//! Product routes: interest products and loan products.

use axum::{
    Json, Router,
    extract::State,
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::str::FromStr;

use crate::AppState;
use crate::routes::{bad_request, repo_error_response};
use salama_core::loan::PeriodType;
use salama_db::entities::{interest_products, loan_products};
use salama_db::repositories::{
    CreateInterestProductInput, CreateLoanProductInput, ProductRepository,
};
use salama_shared::types::{InterestProductId, LoanProductId};

/// Creates the product routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/interest-products", get(list_interest_products))
        .route("/interest-products", post(create_interest_product))
        .route("/loan-products", get(list_loan_products))
        .route("/loan-products", post(create_loan_product))
}

/// Request body for creating an interest product.
#[derive(Debug, Deserialize)]
pub struct CreateInterestProductRequest {
    /// Display name.
    pub name: String,
    /// Percent charged per cycle, as a decimal string.
    pub rate: String,
    /// "monthly" or "daily"; defaults to monthly.
    pub period_type: Option<String>,
}

/// Request body for creating a loan product.
#[derive(Debug, Deserialize)]
pub struct CreateLoanProductRequest {
    /// Display name.
    pub name: String,
    /// What the product is for.
    pub description: Option<String>,
}

/// Response for an interest product.
#[derive(Debug, Serialize)]
pub struct InterestProductResponse {
    /// Product ID.
    pub id: InterestProductId,
    /// Display name.
    pub name: String,
    /// Percent charged per cycle.
    pub rate: String,
    /// Period unit.
    pub period_type: String,
    /// Whether the product is active.
    pub is_active: bool,
}

/// Response for a loan product.
#[derive(Debug, Serialize)]
pub struct LoanProductResponse {
    /// Product ID.
    pub id: LoanProductId,
    /// Display name.
    pub name: String,
    /// What the product is for.
    pub description: Option<String>,
    /// Whether the product is active.
    pub is_active: bool,
}

fn interest_product_response(product: interest_products::Model) -> InterestProductResponse {
    InterestProductResponse {
        id: InterestProductId::from_uuid(product.id),
        name: product.name,
        rate: product.rate.to_string(),
        period_type: product.period_type,
        is_active: product.is_active,
    }
}

fn loan_product_response(product: loan_products::Model) -> LoanProductResponse {
    LoanProductResponse {
        id: LoanProductId::from_uuid(product.id),
        name: product.name,
        description: product.description,
        is_active: product.is_active,
    }
}

/// POST `/interest-products` - Create an interest product.
async fn create_interest_product(
    State(state): State<AppState>,
    Json(payload): Json<CreateInterestProductRequest>,
) -> impl IntoResponse {
    let Ok(rate) = Decimal::from_str(&payload.rate) else {
        return bad_request("invalid_rate", "Rate is not a number");
    };

    let period_type = match payload.period_type.as_deref() {
        None => PeriodType::Monthly,
        Some(raw) => match PeriodType::parse(raw) {
            Some(parsed) => parsed,
            None => return bad_request("invalid_period_type", "Unknown period type"),
        },
    };

    let repo = ProductRepository::new((*state.db).clone());
    match repo
        .create_interest_product(CreateInterestProductInput {
            name: payload.name,
            rate,
            period_type,
        })
        .await
    {
        Ok(product) => (
            StatusCode::CREATED,
            Json(interest_product_response(product)),
        )
            .into_response(),
        Err(e) => repo_error_response(&e),
    }
}

/// GET `/interest-products` - List active interest products.
async fn list_interest_products(State(state): State<AppState>) -> impl IntoResponse {
    let repo = ProductRepository::new((*state.db).clone());
    match repo.list_interest_products().await {
        Ok(products) => {
            let items: Vec<InterestProductResponse> =
                products.into_iter().map(interest_product_response).collect();
            (StatusCode::OK, Json(json!({ "interest_products": items }))).into_response()
        }
        Err(e) => repo_error_response(&e),
    }
}

/// POST `/loan-products` - Create a loan product.
async fn create_loan_product(
    State(state): State<AppState>,
    Json(payload): Json<CreateLoanProductRequest>,
) -> impl IntoResponse {
    let repo = ProductRepository::new((*state.db).clone());
    match repo
        .create_loan_product(CreateLoanProductInput {
            name: payload.name,
            description: payload.description,
        })
        .await
    {
        Ok(product) => {
            (StatusCode::CREATED, Json(loan_product_response(product))).into_response()
        }
        Err(e) => repo_error_response(&e),
    }
}

/// GET `/loan-products` - List active loan products.
async fn list_loan_products(State(state): State<AppState>) -> impl IntoResponse {
    let repo = ProductRepository::new((*state.db).clone());
    match repo.list_loan_products().await {
        Ok(products) => {
            let items: Vec<LoanProductResponse> =
                products.into_iter().map(loan_product_response).collect();
            (StatusCode::OK, Json(json!({ "loan_products": items }))).into_response()
        }
        Err(e) => repo_error_response(&e),
    }
}

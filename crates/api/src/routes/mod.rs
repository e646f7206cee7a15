//! API route definitions.

use axum::Json;
use axum::Router;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;
use tracing::error;

use crate::AppState;
use salama_db::repositories::RepoError;

pub mod accounts;
pub mod health;
pub mod loans;
pub mod members;
pub mod products;

/// Creates the API router with all routes.
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .merge(health::routes())
        .merge(accounts::routes())
        .merge(loans::routes())
        .merge(members::routes())
        .merge(products::routes())
}

/// Maps a repository error to a JSON error response.
///
/// Business errors carry their own message; internal errors are logged and
/// masked.
pub(crate) fn repo_error_response(err: &RepoError) -> Response {
    let status =
        StatusCode::from_u16(err.http_status_code()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);

    if status.is_server_error() {
        error!(error = %err, "request failed");
        return (
            status,
            Json(json!({
                "error": err.error_code(),
                "message": "An error occurred"
            })),
        )
            .into_response();
    }

    (
        status,
        Json(json!({
            "error": err.error_code(),
            "message": err.to_string()
        })),
    )
        .into_response()
}

/// A 400 response for a request field the handler could not interpret.
pub(crate) fn bad_request(code: &'static str, message: &str) -> Response {
    (
        StatusCode::BAD_REQUEST,
        Json(json!({
            "error": code,
            "message": message
        })),
    )
        .into_response()
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    #[test]
    fn test_repo_error_response_status() {
        let response = repo_error_response(&RepoError::LoanNotFound(Uuid::nil()));
        assert_eq!(response.status(), StatusCode::NOT_FOUND);

        let response = repo_error_response(&RepoError::Conflict("retry".into()));
        assert_eq!(response.status(), StatusCode::CONFLICT);
    }

    #[test]
    fn test_bad_request_status() {
        let response = bad_request("invalid_mode", "Unknown repayment mode");
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }
}

//! Member routes.

use axum::{
    Json, Router,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
};
use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::AppState;
use crate::routes::repo_error_response;
use salama_db::entities::members;
use salama_db::repositories::{CreateMemberInput, MemberRepository};
use salama_shared::types::MemberId;

/// Creates the member routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/members", get(list_members))
        .route("/members", post(create_member))
        .route("/members/{member_id}", get(get_member))
}

/// Request body for registering a member.
#[derive(Debug, Deserialize)]
pub struct CreateMemberRequest {
    /// Given name.
    pub first_name: String,
    /// Family name.
    pub last_name: String,
    /// Contact phone number.
    pub phone: Option<String>,
}

/// Response for a member.
#[derive(Debug, Serialize)]
pub struct MemberResponse {
    /// Member ID.
    pub id: MemberId,
    /// Given name.
    pub first_name: String,
    /// Family name.
    pub last_name: String,
    /// Contact phone number.
    pub phone: Option<String>,
    /// Whether the member is active.
    pub is_active: bool,
    /// Created at timestamp.
    pub created_at: String,
}

fn member_response(member: members::Model) -> MemberResponse {
    MemberResponse {
        id: MemberId::from_uuid(member.id),
        first_name: member.first_name,
        last_name: member.last_name,
        phone: member.phone,
        is_active: member.is_active,
        created_at: member.created_at.to_rfc3339(),
    }
}

/// POST `/members` - Register a member.
async fn create_member(
    State(state): State<AppState>,
    Json(payload): Json<CreateMemberRequest>,
) -> impl IntoResponse {
    let repo = MemberRepository::new((*state.db).clone());
    match repo
        .create(CreateMemberInput {
            first_name: payload.first_name,
            last_name: payload.last_name,
            phone: payload.phone,
        })
        .await
    {
        Ok(member) => (StatusCode::CREATED, Json(member_response(member))).into_response(),
        Err(e) => repo_error_response(&e),
    }
}

/// GET `/members` - List active members.
async fn list_members(State(state): State<AppState>) -> impl IntoResponse {
    let repo = MemberRepository::new((*state.db).clone());
    match repo.list_active().await {
        Ok(members) => {
            let items: Vec<MemberResponse> = members.into_iter().map(member_response).collect();
            (StatusCode::OK, Json(json!({ "members": items }))).into_response()
        }
        Err(e) => repo_error_response(&e),
    }
}

/// GET `/members/{member_id}` - Get one member.
async fn get_member(
    State(state): State<AppState>,
    Path(member_id): Path<MemberId>,
) -> impl IntoResponse {
    let repo = MemberRepository::new((*state.db).clone());
    match repo.find(member_id.into_inner()).await {
        Ok(member) => (StatusCode::OK, Json(member_response(member))).into_response(),
        Err(e) => repo_error_response(&e),
    }
}

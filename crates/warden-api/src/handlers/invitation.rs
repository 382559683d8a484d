//! Invitation handlers.

use axum::Json;
use axum::extract::{Query, State};
use axum::http::StatusCode;

use crate::dto::request::{AcceptInvitationQuery, CreateInvitationRequest};
use crate::dto::response::{InvitationResponse, MessageResponse};
use crate::dto::validate_body;
use crate::error::ApiError;
use crate::extractors::AuthUser;
use crate::state::AppState;

/// POST /api/invitations
pub async fn create(
    State(state): State<AppState>,
    auth: AuthUser,
    Json(req): Json<CreateInvitationRequest>,
) -> Result<(StatusCode, Json<InvitationResponse>), ApiError> {
    validate_body(&req)?;

    let invitation = state
        .invitation_service
        .create(auth.user_id, &req.email)
        .await?;

    Ok((StatusCode::CREATED, Json(invitation.into())))
}

/// GET /api/invitations/accept?token=
pub async fn accept(
    State(state): State<AppState>,
    Query(query): Query<AcceptInvitationQuery>,
) -> Result<Json<MessageResponse>, ApiError> {
    state
        .invitation_service
        .accept(query.token.as_deref())
        .await?;

    Ok(Json(MessageResponse {
        message: "Invitation accepted".to_string(),
    }))
}

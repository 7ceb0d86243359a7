/// Admin endpoints
///
/// All routes here sit behind both the authentication layer and the
/// admin-only layer; a non-admin token never reaches these handlers.
///
/// # Endpoints
///
/// - `GET /api/admin/users` - List all users
/// - `PATCH /api/admin/users/:id/promote` - Grant admin privileges
/// - `DELETE /api/admin/users/:id` - Delete a user
/// - `GET /api/admin/stats` - Platform statistics

use crate::{
    app::AppState,
    error::{ApiError, ApiResult},
};
use axum::{
    extract::{Path, State},
    http::StatusCode,
    Extension, Json,
};
use nextup_shared::{
    auth::middleware::AuthContext,
    models::user::{PublicUser, User},
};
use serde::Serialize;
use uuid::Uuid;

/// Platform statistics response
#[derive(Debug, Serialize)]
pub struct StatsResponse {
    /// Total registered users
    pub total_users: i64,
}

/// Lists all users without credential material
pub async fn list_users(State(state): State<AppState>) -> ApiResult<Json<Vec<PublicUser>>> {
    let users = User::list(&state.db).await?;
    Ok(Json(users.iter().map(User::public).collect()))
}

/// Promotes a user to admin
///
/// Idempotent: promoting an existing admin succeeds and changes nothing.
///
/// # Errors
///
/// - `404 Not Found`: No user with this id
pub async fn promote_user(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<PublicUser>> {
    let user = User::promote(&state.db, id)
        .await?
        .ok_or_else(|| ApiError::NotFound("User not found".to_string()))?;

    tracing::info!(promoted = %user.id, by = %auth.user_id, "Promoted user to admin");

    Ok(Json(user.public()))
}

/// Deletes a user; their tryout registrations cascade away with them
///
/// Admins may not delete their own account, which keeps at least the
/// acting admin alive after any sequence of deletions.
///
/// # Errors
///
/// - `400 Bad Request`: Attempted self-deletion
/// - `404 Not Found`: No user with this id
pub async fn delete_user(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(id): Path<Uuid>,
) -> ApiResult<StatusCode> {
    if auth.user_id == id {
        return Err(ApiError::BadRequest(
            "Cannot delete your own account".to_string(),
        ));
    }

    let deleted = User::delete(&state.db, id).await?;
    if !deleted {
        return Err(ApiError::NotFound("User not found".to_string()));
    }

    tracing::info!(deleted = %id, by = %auth.user_id, "Deleted user");

    Ok(StatusCode::NO_CONTENT)
}

/// Platform statistics
pub async fn stats(State(state): State<AppState>) -> ApiResult<Json<StatsResponse>> {
    let total_users = User::count(&state.db).await?;

    Ok(Json(StatsResponse { total_users }))
}

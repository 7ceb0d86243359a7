/// Season endpoints
///
/// The active-season lookup is open to any authenticated user; everything
/// else is admin-only (enforced by the router's middleware stack, not
/// re-checked here).
///
/// # Endpoints
///
/// - `GET /api/seasons/active` - Fetch the single active season
/// - `GET /api/seasons` - List all seasons (admin)
/// - `POST /api/seasons` - Create a season (admin)
/// - `PUT /api/seasons/:id` - Update a season (admin)
/// - `DELETE /api/seasons/:id` - Delete a season (admin)

use crate::{
    app::AppState,
    error::{ApiError, ApiResult},
};
use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use chrono::NaiveDate;
use nextup_shared::models::season::{CreateSeason, Season, UpdateSeason};
use serde::Deserialize;
use uuid::Uuid;
use validator::Validate;

/// Create season request
#[derive(Debug, Deserialize, Validate)]
pub struct CreateSeasonRequest {
    /// Season name
    #[validate(length(min = 1, max = 200, message = "Name must be 1-200 characters"))]
    pub name: String,

    /// Optional calendar year
    pub year: Option<i32>,

    /// Optional first day (ISO date)
    pub start_date: Option<NaiveDate>,

    /// Optional last day (ISO date)
    pub end_date: Option<NaiveDate>,
}

/// Update season request; omitted fields keep their prior values
#[derive(Debug, Deserialize, Validate)]
pub struct UpdateSeasonRequest {
    #[validate(length(min = 1, max = 200, message = "Name must be 1-200 characters"))]
    pub name: Option<String>,
    pub year: Option<i32>,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub is_active: Option<bool>,
}

/// Lists all seasons, newest first (admin)
pub async fn list_seasons(State(state): State<AppState>) -> ApiResult<Json<Vec<Season>>> {
    let seasons = Season::list_all(&state.db).await?;
    Ok(Json(seasons))
}

/// Fetches the single active season
///
/// # Errors
///
/// - `404 Not Found`: No season is currently active
pub async fn get_active_season(State(state): State<AppState>) -> ApiResult<Json<Season>> {
    let season = Season::get_active(&state.db)
        .await?
        .ok_or_else(|| ApiError::NotFound("No active season".to_string()))?;

    Ok(Json(season))
}

/// Creates a new season (admin)
///
/// The created season becomes the active one; any previously active season
/// is deactivated in the same transaction.
pub async fn create_season(
    State(state): State<AppState>,
    Json(req): Json<CreateSeasonRequest>,
) -> ApiResult<(StatusCode, Json<Season>)> {
    req.validate().map_err(ApiError::from)?;

    let season = Season::create(
        &state.db,
        CreateSeason {
            name: req.name,
            year: req.year,
            start_date: req.start_date,
            end_date: req.end_date,
        },
    )
    .await?;

    tracing::info!(season_id = %season.id, "Created season as active");

    Ok((StatusCode::CREATED, Json(season)))
}

/// Applies a partial update to a season (admin)
///
/// Setting `is_active: true` deactivates every other active season in the
/// same transaction.
///
/// # Errors
///
/// - `404 Not Found`: No season with this id
pub async fn update_season(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(req): Json<UpdateSeasonRequest>,
) -> ApiResult<Json<Season>> {
    req.validate().map_err(ApiError::from)?;

    let season = Season::update(
        &state.db,
        id,
        UpdateSeason {
            name: req.name,
            year: req.year,
            start_date: req.start_date,
            end_date: req.end_date,
            is_active: req.is_active,
        },
    )
    .await?
    .ok_or_else(|| ApiError::NotFound("Season not found".to_string()))?;

    Ok(Json(season))
}

/// Deletes a season (admin)
///
/// # Errors
///
/// - `404 Not Found`: No season with this id
pub async fn delete_season(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> ApiResult<StatusCode> {
    let deleted = Season::delete(&state.db, id).await?;
    if !deleted {
        return Err(ApiError::NotFound("Season not found".to_string()));
    }

    tracing::info!(season_id = %id, "Deleted season");

    Ok(StatusCode::NO_CONTENT)
}

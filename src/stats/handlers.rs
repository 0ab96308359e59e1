use axum::{
    extract::{Path, State},
    routing::get,
    Json, Router,
};
use tracing::instrument;
use uuid::Uuid;

use crate::{
    auth::services::{current_user, require_admin, AuthUser},
    error::AppError,
    lots::repo::ParkingLot,
    state::AppState,
    stats::{
        dto::{
            AvailableSpotsResponse, ParkingStatsResponse, RevenueStatsResponse, UserStatsResponse,
        },
        repo,
    },
};

pub fn stats_routes() -> Router<AppState> {
    Router::new()
        .route("/stats/parking", get(parking_stats))
        .route("/stats/revenue", get(revenue_stats))
        .route("/stats/users/:id", get(user_stats))
        // Public: no auth, used by the lot picker.
        .route("/lots/:id/available-spots", get(available_spots))
}

#[instrument(skip(state))]
pub async fn parking_stats(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
) -> Result<Json<ParkingStatsResponse>, AppError> {
    let user = current_user(&state.db, user_id).await?;
    require_admin(&user)?;

    let overall = repo::overall_counts(&state.db).await?;
    let lots = repo::per_lot_counts(&state.db).await?;
    Ok(Json(ParkingStatsResponse {
        overall: overall.into(),
        lots: lots.into_iter().map(Into::into).collect(),
    }))
}

#[instrument(skip(state))]
pub async fn revenue_stats(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
) -> Result<Json<RevenueStatsResponse>, AppError> {
    let user = current_user(&state.db, user_id).await?;
    require_admin(&user)?;

    let daily = repo::daily_revenue(&state.db).await?;
    let monthly = repo::monthly_revenue(&state.db).await?;
    Ok(Json(RevenueStatsResponse {
        daily: daily.into_iter().map(Into::into).collect(),
        monthly: monthly.into_iter().map(Into::into).collect(),
    }))
}

/// A user may read their own stats; admins may read anyone's.
#[instrument(skip(state))]
pub async fn user_stats(
    State(state): State<AppState>,
    AuthUser(caller_id): AuthUser,
    Path(id): Path<Uuid>,
) -> Result<Json<UserStatsResponse>, AppError> {
    let caller = current_user(&state.db, caller_id).await?;
    if !caller.is_admin && caller.id != id {
        return Err(AppError::Forbidden("cannot view another user's stats".into()));
    }

    let row = repo::user_stats(&state.db, id).await?;
    Ok(Json(UserStatsResponse::from_row(id, row)))
}

#[instrument(skip(state))]
pub async fn available_spots(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<AvailableSpotsResponse>, AppError> {
    let lot = ParkingLot::find_by_id(&state.db, id)
        .await?
        .ok_or_else(|| AppError::NotFound("parking lot not found".into()))?;
    let spots = repo::available_spots(&state.db, id).await?;
    Ok(Json(AvailableSpotsResponse {
        lot_id: lot.id,
        lot_name: lot.name,
        price_per_hour: lot.price,
        total_available: spots.len(),
        available_spots: spots.into_iter().map(Into::into).collect(),
    }))
}

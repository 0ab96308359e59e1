use axum::{
    extract::{Query, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use tracing::instrument;
use uuid::Uuid;

use crate::{
    auth::{
        repo::User,
        services::{current_user, require_member, AuthUser},
    },
    display,
    error::AppError,
    lots::repo::ParkingLot,
    reservations::{
        dto::{
            HistoryResponse, LotAvailability, Pagination, ReservationResponse, ReserveRequest,
            UserSummaryResponse,
        },
        repo::Reservation,
        services,
    },
    state::AppState,
};

pub fn user_routes() -> Router<AppState> {
    Router::new()
        .route("/user/reservations", post(reserve).get(history))
        .route("/user/reservations/release", post(release))
        .route("/user/summary", get(summary))
        .route("/user/search", get(search))
}

async fn member_for(state: &AppState, user_id: Uuid) -> Result<User, AppError> {
    let user = current_user(&state.db, user_id).await?;
    require_member(&user)?;
    Ok(user)
}

#[instrument(skip(state, payload))]
pub async fn reserve(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Json(payload): Json<ReserveRequest>,
) -> Result<(StatusCode, Json<ReservationResponse>), AppError> {
    let (reservation, spot, lot) = services::reserve(
        &state.db,
        user_id,
        payload.lot_id,
        &payload.vehicle_number,
    )
    .await?;
    let offset = display::parse_offset(&state.config.display_offset)?;
    Ok((
        StatusCode::CREATED,
        Json(ReservationResponse::reserved(reservation, &spot, &lot, offset)),
    ))
}

#[instrument(skip(state))]
pub async fn release(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
) -> Result<Json<ReservationResponse>, AppError> {
    let (reservation, info) = services::release(&state.db, user_id).await?;
    let offset = display::parse_offset(&state.config.display_offset)?;
    Ok(Json(ReservationResponse::released(
        reservation,
        &info,
        offset,
    )))
}

#[instrument(skip(state))]
pub async fn history(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Query(p): Query<Pagination>,
) -> Result<Json<HistoryResponse>, AppError> {
    let user = member_for(&state, user_id).await?;
    let offset = display::parse_offset(&state.config.display_offset)?;
    let limit = p.limit.clamp(1, 100);
    let rows = Reservation::history_for_user(&state.db, user.id, limit, p.offset).await?;
    let total = Reservation::count_for_user(&state.db, user.id).await?;
    Ok(Json(HistoryResponse {
        items: rows
            .into_iter()
            .map(|row| ReservationResponse::from_history(row, offset))
            .collect(),
        total,
        limit,
        offset: p.offset,
    }))
}

#[instrument(skip(state))]
pub async fn summary(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
) -> Result<Json<UserSummaryResponse>, AppError> {
    let user = member_for(&state, user_id).await?;
    let total_reservations = Reservation::count_for_user(&state.db, user.id).await?;
    let total_spent = Reservation::total_spent(&state.db, user.id).await?;
    let monthly = Reservation::monthly_usage(&state.db, user.id).await?;
    let favorite_lots = Reservation::favorite_lots(&state.db, user.id).await?;
    Ok(Json(UserSummaryResponse {
        total_reservations,
        total_spent,
        monthly: monthly.into_iter().map(Into::into).collect(),
        favorite_lots: favorite_lots.into_iter().map(Into::into).collect(),
    }))
}

#[derive(Debug, serde::Deserialize)]
pub struct SearchQuery {
    #[serde(default)]
    pub q: String,
}

#[instrument(skip(state))]
pub async fn search(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Query(params): Query<SearchQuery>,
) -> Result<Json<Vec<LotAvailability>>, AppError> {
    member_for(&state, user_id).await?;
    let query = params.q.trim();
    if query.is_empty() {
        return Err(AppError::Validation("query must not be empty".into()));
    }
    let lots = ParkingLot::search(&state.db, query).await?;
    Ok(Json(lots.into_iter().map(Into::into).collect()))
}

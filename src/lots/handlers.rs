use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    routing::get,
    Json, Router,
};
use tracing::instrument;
use uuid::Uuid;

use crate::{
    auth::{
        repo::User,
        services::{current_user, require_admin, AuthUser},
    },
    display,
    error::AppError,
    lots::{
        dto::{AdminSearchResponse, LotInput, LotResponse, MemberView, SearchQuery, SpotView},
        repo::{LotWithCounts, ParkingLot, ParkingSpot},
        services,
    },
    state::AppState,
};

pub fn admin_routes() -> Router<AppState> {
    Router::new()
        .route("/admin/lots", get(list_lots).post(create_lot))
        .route(
            "/admin/lots/:id",
            get(get_lot).put(update_lot).delete(delete_lot),
        )
        .route("/admin/lots/:id/spots", get(lot_spots))
        .route("/admin/users", get(list_users))
        .route("/admin/search", get(search))
}

async fn admin_for(state: &AppState, user_id: Uuid) -> Result<User, AppError> {
    let user = current_user(&state.db, user_id).await?;
    require_admin(&user)?;
    Ok(user)
}

#[instrument(skip(state))]
pub async fn list_lots(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
) -> Result<Json<Vec<LotResponse>>, AppError> {
    admin_for(&state, user_id).await?;
    let offset = display::parse_offset(&state.config.display_offset)?;
    let lots = ParkingLot::list_with_counts(&state.db).await?;
    Ok(Json(
        lots.into_iter()
            .map(|row| LotResponse::from_counts(row, offset))
            .collect(),
    ))
}

#[instrument(skip(state, payload))]
pub async fn create_lot(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Json(payload): Json<LotInput>,
) -> Result<(StatusCode, Json<LotResponse>), AppError> {
    let lot = services::create_lot(&state.db, user_id, payload).await?;
    let offset = display::parse_offset(&state.config.display_offset)?;
    let (available, occupied) = ParkingSpot::count_by_status(&state.db, lot.id).await?;
    Ok((
        StatusCode::CREATED,
        Json(LotResponse::from_counts(
            LotWithCounts {
                lot,
                available,
                occupied,
            },
            offset,
        )),
    ))
}

#[instrument(skip(state))]
pub async fn get_lot(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Path(id): Path<Uuid>,
) -> Result<Json<LotResponse>, AppError> {
    admin_for(&state, user_id).await?;
    let lot = ParkingLot::find_by_id(&state.db, id)
        .await?
        .ok_or_else(|| AppError::NotFound("parking lot not found".into()))?;
    let (available, occupied) = ParkingSpot::count_by_status(&state.db, id).await?;
    let offset = display::parse_offset(&state.config.display_offset)?;
    Ok(Json(LotResponse::from_counts(
        LotWithCounts {
            lot,
            available,
            occupied,
        },
        offset,
    )))
}

#[instrument(skip(state, payload))]
pub async fn update_lot(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Path(id): Path<Uuid>,
    Json(payload): Json<LotInput>,
) -> Result<Json<LotResponse>, AppError> {
    let lot = services::update_lot(&state.db, user_id, id, payload).await?;
    let (available, occupied) = ParkingSpot::count_by_status(&state.db, lot.id).await?;
    let offset = display::parse_offset(&state.config.display_offset)?;
    Ok(Json(LotResponse::from_counts(
        LotWithCounts {
            lot,
            available,
            occupied,
        },
        offset,
    )))
}

#[instrument(skip(state))]
pub async fn delete_lot(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, AppError> {
    services::delete_lot(&state.db, user_id, id).await?;
    Ok(StatusCode::NO_CONTENT)
}

#[instrument(skip(state))]
pub async fn lot_spots(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Path(id): Path<Uuid>,
) -> Result<Json<Vec<SpotView>>, AppError> {
    admin_for(&state, user_id).await?;
    ParkingLot::find_by_id(&state.db, id)
        .await?
        .ok_or_else(|| AppError::NotFound("parking lot not found".into()))?;
    let offset = display::parse_offset(&state.config.display_offset)?;
    let rows = ParkingSpot::list_with_occupants(&state.db, id).await?;
    Ok(Json(
        rows.into_iter()
            .map(|row| SpotView::from_row(row, offset))
            .collect(),
    ))
}

#[instrument(skip(state))]
pub async fn list_users(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
) -> Result<Json<Vec<MemberView>>, AppError> {
    admin_for(&state, user_id).await?;
    let users = User::list_members(&state.db).await?;
    Ok(Json(users.into_iter().map(MemberView::from).collect()))
}

#[instrument(skip(state))]
pub async fn search(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Query(params): Query<SearchQuery>,
) -> Result<Json<AdminSearchResponse>, AppError> {
    admin_for(&state, user_id).await?;
    let query = params.q.trim().to_string();
    if query.is_empty() {
        return Err(AppError::Validation("query must not be empty".into()));
    }
    let offset = display::parse_offset(&state.config.display_offset)?;
    let lots = ParkingLot::search(&state.db, &query).await?;
    let users = User::search_members(&state.db, &query).await?;
    Ok(Json(AdminSearchResponse {
        query,
        lots: lots
            .into_iter()
            .map(|row| LotResponse::from_counts(row, offset))
            .collect(),
        users: users.into_iter().map(MemberView::from).collect(),
    }))
}

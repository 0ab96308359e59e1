use serde::{Deserialize, Serialize};
use sqlx::{FromRow, PgPool, Postgres, Transaction};
use time::OffsetDateTime;
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Reservation {
    pub id: Uuid,
    pub spot_id: Option<Uuid>,
    pub user_id: Uuid,
    pub vehicle_number: String,
    pub parking_time: OffsetDateTime,
    pub leaving_time: Option<OffsetDateTime>,
    pub parking_cost: Option<f64>,
    pub is_active: bool,
}

/// The spot and lot behind a user's active reservation, locked for release.
#[derive(Debug, Clone, FromRow)]
pub struct ActiveSpotInfo {
    pub spot_id: Uuid,
    pub spot_number: i32,
    pub lot_id: Uuid,
    pub lot_name: String,
    pub price: f64,
}

/// One page of a user's reservation history, joined with the lot and spot
/// (both optional: the lot may have been deleted since).
#[derive(Debug, Clone, FromRow)]
pub struct HistoryRow {
    pub id: Uuid,
    pub vehicle_number: String,
    pub parking_time: OffsetDateTime,
    pub leaving_time: Option<OffsetDateTime>,
    pub parking_cost: Option<f64>,
    pub is_active: bool,
    pub spot_number: Option<i32>,
    pub lot_name: Option<String>,
}

#[derive(Debug, Clone, FromRow)]
pub struct MonthlyUsageRow {
    pub month: String,
    pub count: i64,
    pub cost: f64,
}

#[derive(Debug, Clone, FromRow)]
pub struct FavoriteLotRow {
    pub name: String,
    pub count: i64,
}

const RESERVATION_COLUMNS: &str =
    "id, spot_id, user_id, vehicle_number, parking_time, leaving_time, parking_cost, is_active";

impl Reservation {
    pub async fn find_active_for_user(
        db: &PgPool,
        user_id: Uuid,
    ) -> anyhow::Result<Option<Reservation>> {
        let row = sqlx::query_as::<_, Reservation>(&format!(
            "SELECT {RESERVATION_COLUMNS} FROM reservations WHERE user_id = $1 AND is_active"
        ))
        .bind(user_id)
        .fetch_optional(db)
        .await?;
        Ok(row)
    }

    pub async fn lock_active_for_user(
        tx: &mut Transaction<'_, Postgres>,
        user_id: Uuid,
    ) -> anyhow::Result<Option<Reservation>> {
        let row = sqlx::query_as::<_, Reservation>(&format!(
            r#"
            SELECT {RESERVATION_COLUMNS}
            FROM reservations
            WHERE user_id = $1 AND is_active
            FOR UPDATE
            "#
        ))
        .bind(user_id)
        .fetch_optional(&mut **tx)
        .await?;
        Ok(row)
    }

    /// Lock the occupied spot and read the lot's current hourly price.
    pub async fn lock_spot_info(
        tx: &mut Transaction<'_, Postgres>,
        spot_id: Uuid,
    ) -> anyhow::Result<ActiveSpotInfo> {
        let row = sqlx::query_as::<_, ActiveSpotInfo>(
            r#"
            SELECT s.id AS spot_id, s.spot_number, l.id AS lot_id, l.name AS lot_name, l.price
            FROM parking_spots s
            JOIN parking_lots l ON l.id = s.lot_id
            WHERE s.id = $1
            FOR UPDATE OF s
            "#,
        )
        .bind(spot_id)
        .fetch_one(&mut **tx)
        .await?;
        Ok(row)
    }

    pub async fn insert(
        tx: &mut Transaction<'_, Postgres>,
        spot_id: Uuid,
        user_id: Uuid,
        vehicle_number: &str,
    ) -> anyhow::Result<Reservation> {
        let row = sqlx::query_as::<_, Reservation>(&format!(
            r#"
            INSERT INTO reservations (spot_id, user_id, vehicle_number)
            VALUES ($1, $2, $3)
            RETURNING {RESERVATION_COLUMNS}
            "#
        ))
        .bind(spot_id)
        .bind(user_id)
        .bind(vehicle_number)
        .fetch_one(&mut **tx)
        .await?;
        Ok(row)
    }

    /// Close the episode: leaving time and cost are written exactly once,
    /// in the same transaction that frees the spot.
    pub async fn close(
        tx: &mut Transaction<'_, Postgres>,
        id: Uuid,
        leaving_time: OffsetDateTime,
        cost: f64,
    ) -> anyhow::Result<Reservation> {
        let row = sqlx::query_as::<_, Reservation>(&format!(
            r#"
            UPDATE reservations
            SET leaving_time = $2, parking_cost = $3, is_active = FALSE
            WHERE id = $1 AND is_active
            RETURNING {RESERVATION_COLUMNS}
            "#
        ))
        .bind(id)
        .bind(leaving_time)
        .bind(cost)
        .fetch_one(&mut **tx)
        .await?;
        Ok(row)
    }

    pub async fn history_for_user(
        db: &PgPool,
        user_id: Uuid,
        limit: i64,
        offset: i64,
    ) -> anyhow::Result<Vec<HistoryRow>> {
        let rows = sqlx::query_as::<_, HistoryRow>(
            r#"
            SELECT r.id, r.vehicle_number, r.parking_time, r.leaving_time,
                   r.parking_cost, r.is_active,
                   s.spot_number, l.name AS lot_name
            FROM reservations r
            LEFT JOIN parking_spots s ON s.id = r.spot_id
            LEFT JOIN parking_lots l ON l.id = s.lot_id
            WHERE r.user_id = $1
            ORDER BY r.parking_time DESC
            LIMIT $2 OFFSET $3
            "#,
        )
        .bind(user_id)
        .bind(limit)
        .bind(offset)
        .fetch_all(db)
        .await?;
        Ok(rows)
    }

    pub async fn count_for_user(db: &PgPool, user_id: Uuid) -> anyhow::Result<i64> {
        let (count,): (i64,) =
            sqlx::query_as("SELECT COUNT(*) FROM reservations WHERE user_id = $1")
                .bind(user_id)
                .fetch_one(db)
                .await?;
        Ok(count)
    }

    /// Total spend across closed reservations.
    pub async fn total_spent(db: &PgPool, user_id: Uuid) -> anyhow::Result<f64> {
        let (total,): (f64,) = sqlx::query_as(
            r#"
            SELECT COALESCE(SUM(parking_cost), 0)::float8
            FROM reservations
            WHERE user_id = $1 AND NOT is_active
            "#,
        )
        .bind(user_id)
        .fetch_one(db)
        .await?;
        Ok(total)
    }

    /// Closed reservations grouped by month, most recent months first.
    pub async fn monthly_usage(db: &PgPool, user_id: Uuid) -> anyhow::Result<Vec<MonthlyUsageRow>> {
        let rows = sqlx::query_as::<_, MonthlyUsageRow>(
            r#"
            SELECT to_char(parking_time, 'YYYY-MM') AS month,
                   COUNT(*) AS count,
                   COALESCE(SUM(parking_cost), 0)::float8 AS cost
            FROM reservations
            WHERE user_id = $1 AND NOT is_active
            GROUP BY 1
            ORDER BY 1 DESC
            LIMIT 6
            "#,
        )
        .bind(user_id)
        .fetch_all(db)
        .await?;
        Ok(rows)
    }

    /// Lots the user parks in most often.
    pub async fn favorite_lots(db: &PgPool, user_id: Uuid) -> anyhow::Result<Vec<FavoriteLotRow>> {
        let rows = sqlx::query_as::<_, FavoriteLotRow>(
            r#"
            SELECT l.name, COUNT(*) AS count
            FROM reservations r
            JOIN parking_spots s ON s.id = r.spot_id
            JOIN parking_lots l ON l.id = s.lot_id
            WHERE r.user_id = $1
            GROUP BY l.id, l.name
            ORDER BY COUNT(*) DESC
            LIMIT 5
            "#,
        )
        .bind(user_id)
        .fetch_all(db)
        .await?;
        Ok(rows)
    }
}

use sqlx::{FromRow, PgPool};
use uuid::Uuid;

#[derive(Debug, Clone, FromRow)]
pub struct OverallCounts {
    pub total: i64,
    pub available: i64,
    pub occupied: i64,
}

#[derive(Debug, Clone, FromRow)]
pub struct LotCounts {
    pub id: Uuid,
    pub name: String,
    pub total: i64,
    pub available: i64,
    pub occupied: i64,
}

#[derive(Debug, Clone, FromRow)]
pub struct DailyRevenueRow {
    pub date: String,
    pub revenue: f64,
}

#[derive(Debug, Clone, FromRow)]
pub struct MonthlyRevenueRow {
    pub month: String,
    pub revenue: f64,
}

#[derive(Debug, Clone, FromRow)]
pub struct UserStatsRow {
    pub total: i64,
    pub completed: i64,
    pub active: i64,
    pub total_spent: f64,
    pub avg_duration_hours: f64,
}

#[derive(Debug, Clone, FromRow)]
pub struct AvailableSpotRow {
    pub id: Uuid,
    pub spot_number: i32,
}

pub async fn overall_counts(db: &PgPool) -> anyhow::Result<OverallCounts> {
    let row = sqlx::query_as::<_, OverallCounts>(
        r#"
        SELECT COUNT(*) AS total,
               COUNT(*) FILTER (WHERE status = 'available') AS available,
               COUNT(*) FILTER (WHERE status = 'occupied') AS occupied
        FROM parking_spots
        "#,
    )
    .fetch_one(db)
    .await?;
    Ok(row)
}

pub async fn per_lot_counts(db: &PgPool) -> anyhow::Result<Vec<LotCounts>> {
    let rows = sqlx::query_as::<_, LotCounts>(
        r#"
        SELECT l.id, l.name,
               COUNT(s.id) AS total,
               COUNT(s.id) FILTER (WHERE s.status = 'available') AS available,
               COUNT(s.id) FILTER (WHERE s.status = 'occupied') AS occupied
        FROM parking_lots l
        LEFT JOIN parking_spots s ON s.lot_id = l.id
        GROUP BY l.id, l.name
        ORDER BY l.name
        "#,
    )
    .fetch_all(db)
    .await?;
    Ok(rows)
}

/// Revenue per day over the trailing 30 days, keyed on leaving time.
pub async fn daily_revenue(db: &PgPool) -> anyhow::Result<Vec<DailyRevenueRow>> {
    let rows = sqlx::query_as::<_, DailyRevenueRow>(
        r#"
        SELECT to_char(leaving_time, 'YYYY-MM-DD') AS date,
               COALESCE(SUM(parking_cost), 0)::float8 AS revenue
        FROM reservations
        WHERE leaving_time IS NOT NULL
          AND leaving_time >= now() - interval '30 days'
        GROUP BY 1
        ORDER BY 1
        "#,
    )
    .fetch_all(db)
    .await?;
    Ok(rows)
}

/// Revenue per month, trailing 12 months.
pub async fn monthly_revenue(db: &PgPool) -> anyhow::Result<Vec<MonthlyRevenueRow>> {
    let rows = sqlx::query_as::<_, MonthlyRevenueRow>(
        r#"
        SELECT to_char(leaving_time, 'YYYY-MM') AS month,
               COALESCE(SUM(parking_cost), 0)::float8 AS revenue
        FROM reservations
        WHERE leaving_time IS NOT NULL
        GROUP BY 1
        ORDER BY 1 DESC
        LIMIT 12
        "#,
    )
    .fetch_all(db)
    .await?;
    Ok(rows)
}

pub async fn user_stats(db: &PgPool, user_id: Uuid) -> anyhow::Result<UserStatsRow> {
    let row = sqlx::query_as::<_, UserStatsRow>(
        r#"
        SELECT COUNT(*) AS total,
               COUNT(*) FILTER (WHERE NOT is_active) AS completed,
               COUNT(*) FILTER (WHERE is_active) AS active,
               COALESCE(SUM(parking_cost), 0)::float8 AS total_spent,
               COALESCE(
                   AVG(EXTRACT(EPOCH FROM (leaving_time - parking_time)) / 3600.0)
                       FILTER (WHERE leaving_time IS NOT NULL),
                   0
               )::float8 AS avg_duration_hours
        FROM reservations
        WHERE user_id = $1
        "#,
    )
    .bind(user_id)
    .fetch_one(db)
    .await?;
    Ok(row)
}

pub async fn available_spots(db: &PgPool, lot_id: Uuid) -> anyhow::Result<Vec<AvailableSpotRow>> {
    let rows = sqlx::query_as::<_, AvailableSpotRow>(
        r#"
        SELECT id, spot_number
        FROM parking_spots
        WHERE lot_id = $1 AND status = 'available'
        ORDER BY spot_number
        "#,
    )
    .bind(lot_id)
    .fetch_all(db)
    .await?;
    Ok(rows)
}

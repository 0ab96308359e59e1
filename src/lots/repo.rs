use serde::{Deserialize, Serialize};
use sqlx::{FromRow, PgPool, Postgres, Transaction};
use time::OffsetDateTime;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "spot_status", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum SpotStatus {
    Available,
    Occupied,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct ParkingLot {
    pub id: Uuid,
    pub name: String,
    pub price: f64,
    pub address: String,
    pub pin_code: String,
    pub max_spots: i32,
    pub created_at: OffsetDateTime,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct ParkingSpot {
    pub id: Uuid,
    pub lot_id: Uuid,
    pub spot_number: i32,
    pub status: SpotStatus,
    pub created_at: OffsetDateTime,
}

/// Lot row joined with its spot counts, for listings and occupancy displays.
#[derive(Debug, Clone, FromRow)]
pub struct LotWithCounts {
    #[sqlx(flatten)]
    pub lot: ParkingLot,
    pub available: i64,
    pub occupied: i64,
}

/// Spot joined with the active reservation holder, if any.
#[derive(Debug, Clone, FromRow)]
pub struct SpotOccupantRow {
    pub id: Uuid,
    pub spot_number: i32,
    pub status: SpotStatus,
    pub reservation_id: Option<Uuid>,
    pub vehicle_number: Option<String>,
    pub parking_time: Option<OffsetDateTime>,
    pub user_name: Option<String>,
    pub user_email: Option<String>,
}

const LOT_COLUMNS: &str = "id, name, price, address, pin_code, max_spots, created_at";

impl ParkingLot {
    pub async fn find_by_id(db: &PgPool, id: Uuid) -> anyhow::Result<Option<ParkingLot>> {
        let lot = sqlx::query_as::<_, ParkingLot>(&format!(
            "SELECT {LOT_COLUMNS} FROM parking_lots WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(db)
        .await?;
        Ok(lot)
    }

    /// Lock the lot row for the duration of a capacity change so concurrent
    /// resizes and deletes serialize.
    pub async fn lock_by_id(
        tx: &mut Transaction<'_, Postgres>,
        id: Uuid,
    ) -> anyhow::Result<Option<ParkingLot>> {
        let lot = sqlx::query_as::<_, ParkingLot>(&format!(
            "SELECT {LOT_COLUMNS} FROM parking_lots WHERE id = $1 FOR UPDATE"
        ))
        .bind(id)
        .fetch_optional(&mut **tx)
        .await?;
        Ok(lot)
    }

    pub async fn insert(
        tx: &mut Transaction<'_, Postgres>,
        name: &str,
        price: f64,
        address: &str,
        pin_code: &str,
        max_spots: i32,
    ) -> anyhow::Result<ParkingLot> {
        let lot = sqlx::query_as::<_, ParkingLot>(&format!(
            r#"
            INSERT INTO parking_lots (name, price, address, pin_code, max_spots)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING {LOT_COLUMNS}
            "#
        ))
        .bind(name)
        .bind(price)
        .bind(address)
        .bind(pin_code)
        .bind(max_spots)
        .fetch_one(&mut **tx)
        .await?;
        Ok(lot)
    }

    pub async fn update_fields(
        tx: &mut Transaction<'_, Postgres>,
        id: Uuid,
        name: &str,
        price: f64,
        address: &str,
        pin_code: &str,
        max_spots: i32,
    ) -> anyhow::Result<ParkingLot> {
        let lot = sqlx::query_as::<_, ParkingLot>(&format!(
            r#"
            UPDATE parking_lots
            SET name = $2, price = $3, address = $4, pin_code = $5, max_spots = $6
            WHERE id = $1
            RETURNING {LOT_COLUMNS}
            "#
        ))
        .bind(id)
        .bind(name)
        .bind(price)
        .bind(address)
        .bind(pin_code)
        .bind(max_spots)
        .fetch_one(&mut **tx)
        .await?;
        Ok(lot)
    }

    pub async fn delete_row(tx: &mut Transaction<'_, Postgres>, id: Uuid) -> anyhow::Result<()> {
        sqlx::query("DELETE FROM parking_lots WHERE id = $1")
            .bind(id)
            .execute(&mut **tx)
            .await?;
        Ok(())
    }

    pub async fn list_with_counts(db: &PgPool) -> anyhow::Result<Vec<LotWithCounts>> {
        let rows = sqlx::query_as::<_, LotWithCounts>(
            r#"
            SELECT l.id, l.name, l.price, l.address, l.pin_code, l.max_spots, l.created_at,
                   COUNT(s.id) FILTER (WHERE s.status = 'available') AS available,
                   COUNT(s.id) FILTER (WHERE s.status = 'occupied') AS occupied
            FROM parking_lots l
            LEFT JOIN parking_spots s ON s.lot_id = l.id
            GROUP BY l.id
            ORDER BY l.created_at DESC
            "#,
        )
        .fetch_all(db)
        .await?;
        Ok(rows)
    }

    /// Text search over name, address and pin code.
    pub async fn search(db: &PgPool, query: &str) -> anyhow::Result<Vec<LotWithCounts>> {
        let pattern = format!("%{}%", query);
        let rows = sqlx::query_as::<_, LotWithCounts>(
            r#"
            SELECT l.id, l.name, l.price, l.address, l.pin_code, l.max_spots, l.created_at,
                   COUNT(s.id) FILTER (WHERE s.status = 'available') AS available,
                   COUNT(s.id) FILTER (WHERE s.status = 'occupied') AS occupied
            FROM parking_lots l
            LEFT JOIN parking_spots s ON s.lot_id = l.id
            WHERE l.name ILIKE $1 OR l.address ILIKE $1 OR l.pin_code ILIKE $1
            GROUP BY l.id
            ORDER BY l.created_at DESC
            "#,
        )
        .bind(&pattern)
        .fetch_all(db)
        .await?;
        Ok(rows)
    }
}

impl ParkingSpot {
    /// Append spots numbered `from..=to`, all Available.
    pub async fn insert_range(
        tx: &mut Transaction<'_, Postgres>,
        lot_id: Uuid,
        from: i32,
        to: i32,
    ) -> anyhow::Result<()> {
        sqlx::query(
            r#"
            INSERT INTO parking_spots (lot_id, spot_number)
            SELECT $1::uuid, n FROM generate_series($2::int, $3::int) AS n
            "#,
        )
        .bind(lot_id)
        .bind(from)
        .bind(to)
        .execute(&mut **tx)
        .await?;
        Ok(())
    }

    pub async fn count_in_lot(
        tx: &mut Transaction<'_, Postgres>,
        lot_id: Uuid,
    ) -> anyhow::Result<i64> {
        let (count,): (i64,) =
            sqlx::query_as("SELECT COUNT(*) FROM parking_spots WHERE lot_id = $1")
                .bind(lot_id)
                .fetch_one(&mut **tx)
                .await?;
        Ok(count)
    }

    /// Highest spot number currently assigned in a lot; new spots are
    /// numbered after it so numbers are never reused.
    pub async fn max_spot_number(
        tx: &mut Transaction<'_, Postgres>,
        lot_id: Uuid,
    ) -> anyhow::Result<i32> {
        let (max,): (i32,) = sqlx::query_as(
            "SELECT COALESCE(MAX(spot_number), 0) FROM parking_spots WHERE lot_id = $1",
        )
        .bind(lot_id)
        .fetch_one(&mut **tx)
        .await?;
        Ok(max)
    }

    pub async fn count_occupied(
        tx: &mut Transaction<'_, Postgres>,
        lot_id: Uuid,
    ) -> anyhow::Result<i64> {
        let (count,): (i64,) = sqlx::query_as(
            "SELECT COUNT(*) FROM parking_spots WHERE lot_id = $1 AND status = 'occupied'",
        )
        .bind(lot_id)
        .fetch_one(&mut **tx)
        .await?;
        Ok(count)
    }

    /// Available/Occupied counts for occupancy displays.
    pub async fn count_by_status(db: &PgPool, lot_id: Uuid) -> anyhow::Result<(i64, i64)> {
        let row: (i64, i64) = sqlx::query_as(
            r#"
            SELECT COUNT(*) FILTER (WHERE status = 'available'),
                   COUNT(*) FILTER (WHERE status = 'occupied')
            FROM parking_spots
            WHERE lot_id = $1
            "#,
        )
        .bind(lot_id)
        .fetch_one(db)
        .await?;
        Ok(row)
    }

    /// Claim the lowest-numbered Available spot in a lot. SKIP LOCKED makes
    /// concurrent reserves land on different rows; a caller that finds none
    /// reports a capacity conflict.
    pub async fn lock_first_available(
        tx: &mut Transaction<'_, Postgres>,
        lot_id: Uuid,
    ) -> anyhow::Result<Option<ParkingSpot>> {
        let row = sqlx::query_as::<_, ParkingSpot>(
            r#"
            SELECT id, lot_id, spot_number, status, created_at
            FROM parking_spots
            WHERE lot_id = $1 AND status = 'available'
            ORDER BY spot_number ASC
            LIMIT 1
            FOR UPDATE SKIP LOCKED
            "#,
        )
        .bind(lot_id)
        .fetch_optional(&mut **tx)
        .await?;
        Ok(row)
    }

    pub async fn set_status(
        tx: &mut Transaction<'_, Postgres>,
        id: Uuid,
        status: SpotStatus,
    ) -> anyhow::Result<()> {
        sqlx::query("UPDATE parking_spots SET status = $2 WHERE id = $1")
            .bind(id)
            .bind(status)
            .execute(&mut **tx)
            .await?;
        Ok(())
    }

    /// Lock the highest-numbered Available spots as shrink candidates.
    /// Returns fewer than `limit` rows when the lot is too occupied to
    /// shrink that far.
    pub async fn lock_removable(
        tx: &mut Transaction<'_, Postgres>,
        lot_id: Uuid,
        limit: i64,
    ) -> anyhow::Result<Vec<ParkingSpot>> {
        let rows = sqlx::query_as::<_, ParkingSpot>(
            r#"
            SELECT id, lot_id, spot_number, status, created_at
            FROM parking_spots
            WHERE lot_id = $1 AND status = 'available'
            ORDER BY spot_number DESC
            LIMIT $2
            FOR UPDATE
            "#,
        )
        .bind(lot_id)
        .bind(limit)
        .fetch_all(&mut **tx)
        .await?;
        Ok(rows)
    }

    pub async fn delete_by_ids(
        tx: &mut Transaction<'_, Postgres>,
        ids: &[Uuid],
    ) -> anyhow::Result<()> {
        sqlx::query("DELETE FROM parking_spots WHERE id = ANY($1)")
            .bind(ids)
            .execute(&mut **tx)
            .await?;
        Ok(())
    }

    pub async fn delete_in_lot(
        tx: &mut Transaction<'_, Postgres>,
        lot_id: Uuid,
    ) -> anyhow::Result<()> {
        sqlx::query("DELETE FROM parking_spots WHERE lot_id = $1")
            .bind(lot_id)
            .execute(&mut **tx)
            .await?;
        Ok(())
    }

    /// Detach historical reservations from this lot's spots. Reservations
    /// are immutable history and must survive lot deletion.
    pub async fn detach_reservations(
        tx: &mut Transaction<'_, Postgres>,
        lot_id: Uuid,
    ) -> anyhow::Result<()> {
        sqlx::query(
            r#"
            UPDATE reservations
            SET spot_id = NULL
            WHERE spot_id IN (SELECT id FROM parking_spots WHERE lot_id = $1)
            "#,
        )
        .bind(lot_id)
        .execute(&mut **tx)
        .await?;
        Ok(())
    }

    /// All spots in a lot with the current occupant, for the admin view.
    pub async fn list_with_occupants(
        db: &PgPool,
        lot_id: Uuid,
    ) -> anyhow::Result<Vec<SpotOccupantRow>> {
        let rows = sqlx::query_as::<_, SpotOccupantRow>(
            r#"
            SELECT s.id, s.spot_number, s.status,
                   r.id AS reservation_id, r.vehicle_number, r.parking_time,
                   u.name AS user_name, u.email AS user_email
            FROM parking_spots s
            LEFT JOIN reservations r ON r.spot_id = s.id AND r.is_active
            LEFT JOIN users u ON u.id = r.user_id
            WHERE s.lot_id = $1
            ORDER BY s.spot_number
            "#,
        )
        .bind(lot_id)
        .fetch_all(db)
        .await?;
        Ok(rows)
    }
}

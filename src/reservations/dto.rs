use serde::{Deserialize, Serialize};
use time::{OffsetDateTime, UtcOffset};
use uuid::Uuid;

use crate::display;
use crate::lots::repo::{LotWithCounts, ParkingLot, ParkingSpot};
use crate::reservations::repo::{
    ActiveSpotInfo, FavoriteLotRow, HistoryRow, MonthlyUsageRow, Reservation,
};

#[derive(Debug, Deserialize)]
pub struct ReserveRequest {
    pub lot_id: Uuid,
    pub vehicle_number: String,
}

#[derive(Debug, Serialize)]
pub struct ReservationResponse {
    pub id: Uuid,
    pub lot_name: Option<String>,
    pub spot_number: Option<i32>,
    pub vehicle_number: String,
    pub parking_time: OffsetDateTime,
    pub parked_at_local: String,
    pub leaving_time: Option<OffsetDateTime>,
    pub left_at_local: Option<String>,
    pub parking_cost: Option<f64>,
    pub is_active: bool,
}

impl ReservationResponse {
    pub fn reserved(
        r: Reservation,
        spot: &ParkingSpot,
        lot: &ParkingLot,
        offset: UtcOffset,
    ) -> Self {
        Self {
            id: r.id,
            lot_name: Some(lot.name.clone()),
            spot_number: Some(spot.spot_number),
            vehicle_number: r.vehicle_number,
            parking_time: r.parking_time,
            parked_at_local: display::format_local(r.parking_time, offset),
            leaving_time: None,
            left_at_local: None,
            parking_cost: None,
            is_active: true,
        }
    }

    pub fn released(r: Reservation, info: &ActiveSpotInfo, offset: UtcOffset) -> Self {
        Self {
            id: r.id,
            lot_name: Some(info.lot_name.clone()),
            spot_number: Some(info.spot_number),
            vehicle_number: r.vehicle_number,
            parking_time: r.parking_time,
            parked_at_local: display::format_local(r.parking_time, offset),
            leaving_time: r.leaving_time,
            left_at_local: r.leaving_time.map(|t| display::format_local(t, offset)),
            parking_cost: r.parking_cost,
            is_active: false,
        }
    }

    pub fn from_history(row: HistoryRow, offset: UtcOffset) -> Self {
        Self {
            id: row.id,
            lot_name: row.lot_name,
            spot_number: row.spot_number,
            vehicle_number: row.vehicle_number,
            parking_time: row.parking_time,
            parked_at_local: display::format_local(row.parking_time, offset),
            leaving_time: row.leaving_time,
            left_at_local: row.leaving_time.map(|t| display::format_local(t, offset)),
            parking_cost: row.parking_cost,
            is_active: row.is_active,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct Pagination {
    #[serde(default = "default_limit")]
    pub limit: i64,
    #[serde(default)]
    pub offset: i64,
}
fn default_limit() -> i64 {
    10
}

#[derive(Debug, Serialize)]
pub struct HistoryResponse {
    pub items: Vec<ReservationResponse>,
    pub total: i64,
    pub limit: i64,
    pub offset: i64,
}

#[derive(Debug, Serialize)]
pub struct MonthlyUsage {
    pub month: String,
    pub count: i64,
    pub cost: f64,
}

impl From<MonthlyUsageRow> for MonthlyUsage {
    fn from(r: MonthlyUsageRow) -> Self {
        Self {
            month: r.month,
            count: r.count,
            cost: r.cost,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct FavoriteLot {
    pub name: String,
    pub count: i64,
}

impl From<FavoriteLotRow> for FavoriteLot {
    fn from(r: FavoriteLotRow) -> Self {
        Self {
            name: r.name,
            count: r.count,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct UserSummaryResponse {
    pub total_reservations: i64,
    pub total_spent: f64,
    pub monthly: Vec<MonthlyUsage>,
    pub favorite_lots: Vec<FavoriteLot>,
}

/// Lot search result for members: where can I park right now.
#[derive(Debug, Serialize)]
pub struct LotAvailability {
    pub id: Uuid,
    pub name: String,
    pub address: String,
    pub pin_code: String,
    pub price: f64,
    pub available: i64,
}

impl From<LotWithCounts> for LotAvailability {
    fn from(row: LotWithCounts) -> Self {
        Self {
            id: row.lot.id,
            name: row.lot.name,
            address: row.lot.address,
            pin_code: row.lot.pin_code,
            price: row.lot.price,
            available: row.available,
        }
    }
}

use serde::{Deserialize, Serialize};
use time::{OffsetDateTime, UtcOffset};
use uuid::Uuid;

use crate::auth::repo::User;
use crate::display;
use crate::lots::repo::{LotWithCounts, SpotOccupantRow, SpotStatus};

/// Body for creating or editing a lot; `max_spots` doubles as the resize
/// target on edit.
#[derive(Debug, Deserialize)]
pub struct LotInput {
    pub name: String,
    pub price: f64,
    pub address: String,
    pub pin_code: String,
    pub max_spots: i32,
}

#[derive(Debug, Serialize)]
pub struct LotResponse {
    pub id: Uuid,
    pub name: String,
    pub price: f64,
    pub address: String,
    pub pin_code: String,
    pub max_spots: i32,
    pub available: i64,
    pub occupied: i64,
    pub created_at: OffsetDateTime,
    pub created_at_local: String,
}

impl LotResponse {
    pub fn from_counts(row: LotWithCounts, offset: UtcOffset) -> Self {
        Self {
            id: row.lot.id,
            name: row.lot.name,
            price: row.lot.price,
            address: row.lot.address,
            pin_code: row.lot.pin_code,
            max_spots: row.lot.max_spots,
            available: row.available,
            occupied: row.occupied,
            created_at: row.lot.created_at,
            created_at_local: display::format_local(row.lot.created_at, offset),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct OccupantView {
    pub reservation_id: Uuid,
    pub user_name: Option<String>,
    pub user_email: Option<String>,
    pub vehicle_number: Option<String>,
    pub parked_at_local: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct SpotView {
    pub id: Uuid,
    pub spot_number: i32,
    pub status: SpotStatus,
    pub occupant: Option<OccupantView>,
}

impl SpotView {
    pub fn from_row(row: SpotOccupantRow, offset: UtcOffset) -> Self {
        let occupant = row.reservation_id.map(|reservation_id| OccupantView {
            reservation_id,
            user_name: row.user_name,
            user_email: row.user_email,
            vehicle_number: row.vehicle_number,
            parked_at_local: row.parking_time.map(|t| display::format_local(t, offset)),
        });
        Self {
            id: row.id,
            spot_number: row.spot_number,
            status: row.status,
            occupant,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct MemberView {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub address: Option<String>,
    pub pin_code: Option<String>,
    pub created_at: OffsetDateTime,
}

impl From<User> for MemberView {
    fn from(u: User) -> Self {
        Self {
            id: u.id,
            name: u.name,
            email: u.email,
            address: u.address,
            pin_code: u.pin_code,
            created_at: u.created_at,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct SearchQuery {
    #[serde(default)]
    pub q: String,
}

#[derive(Debug, Serialize)]
pub struct AdminSearchResponse {
    pub query: String,
    pub lots: Vec<LotResponse>,
    pub users: Vec<MemberView>,
}

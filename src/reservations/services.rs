use lazy_static::lazy_static;
use regex::Regex;
use sqlx::PgPool;
use time::OffsetDateTime;
use tracing::info;
use uuid::Uuid;

use crate::auth::services::{current_user, require_member};
use crate::error::AppError;
use crate::lots::repo::{ParkingLot, ParkingSpot, SpotStatus};
use crate::reservations::repo::{ActiveSpotInfo, Reservation};

pub fn validate_vehicle_number(vehicle: &str) -> Result<(), AppError> {
    lazy_static! {
        static ref VEHICLE_RE: Regex = Regex::new(r"^[A-Z0-9 -]+$").unwrap();
    }
    if vehicle.len() < 5 || vehicle.len() > 20 {
        return Err(AppError::Validation(
            "vehicle number must be between 5 and 20 characters".into(),
        ));
    }
    if !VEHICLE_RE.is_match(vehicle) {
        return Err(AppError::Validation(
            "vehicle number may contain uppercase letters, digits, spaces and hyphens".into(),
        ));
    }
    Ok(())
}

/// Parking cost for an episode: hours elapsed times the hourly price,
/// rounded to two decimals. An episode that has not ended costs nothing yet.
pub fn calculate_cost(
    parking_time: OffsetDateTime,
    leaving_time: Option<OffsetDateTime>,
    hourly_price: f64,
) -> f64 {
    let Some(leaving) = leaving_time else {
        return 0.0;
    };
    let hours = (leaving - parking_time).as_seconds_f64() / 3600.0;
    (hours * hourly_price * 100.0).round() / 100.0
}

/// Reserve the lowest-numbered Available spot in the lot for the user.
pub async fn reserve(
    db: &PgPool,
    user_id: Uuid,
    lot_id: Uuid,
    vehicle_number: &str,
) -> Result<(Reservation, ParkingSpot, ParkingLot), AppError> {
    let user = current_user(db, user_id).await?;
    require_member(&user)?;

    let vehicle = vehicle_number.trim().to_uppercase();
    validate_vehicle_number(&vehicle)?;

    if Reservation::find_active_for_user(db, user.id).await?.is_some() {
        return Err(AppError::Conflict(
            "you already have an active reservation".into(),
        ));
    }

    let lot = ParkingLot::find_by_id(db, lot_id)
        .await?
        .ok_or_else(|| AppError::NotFound("parking lot not found".into()))?;

    let mut tx = db.begin().await?;
    let spot = ParkingSpot::lock_first_available(&mut tx, lot_id)
        .await?
        .ok_or_else(|| AppError::Capacity("no spots available in this lot".into()))?;

    ParkingSpot::set_status(&mut tx, spot.id, SpotStatus::Occupied).await?;
    let reservation = Reservation::insert(&mut tx, spot.id, user.id, &vehicle).await?;
    tx.commit().await?;

    info!(
        reservation_id = %reservation.id,
        user_id = %user.id,
        lot_id = %lot.id,
        spot_number = spot.spot_number,
        "spot reserved"
    );
    Ok((reservation, spot, lot))
}

/// Release the user's active reservation: close the episode, charge the
/// lot's current hourly price, free the spot. All in one transaction.
pub async fn release(
    db: &PgPool,
    user_id: Uuid,
) -> Result<(Reservation, ActiveSpotInfo), AppError> {
    let user = current_user(db, user_id).await?;
    require_member(&user)?;

    let mut tx = db.begin().await?;
    let active = Reservation::lock_active_for_user(&mut tx, user.id)
        .await?
        .ok_or_else(|| AppError::NotFound("no active reservation to release".into()))?;

    // An active reservation always points at a live spot; lot deletion is
    // blocked while any spot is occupied.
    let spot_id = active
        .spot_id
        .ok_or_else(|| AppError::Internal(anyhow::anyhow!("active reservation without a spot")))?;
    let info = Reservation::lock_spot_info(&mut tx, spot_id).await?;

    let leaving_time = OffsetDateTime::now_utc();
    let cost = calculate_cost(active.parking_time, Some(leaving_time), info.price);

    let closed = Reservation::close(&mut tx, active.id, leaving_time, cost).await?;
    ParkingSpot::set_status(&mut tx, spot_id, SpotStatus::Available).await?;
    tx.commit().await?;

    info!(
        reservation_id = %closed.id,
        user_id = %user.id,
        cost,
        "spot released"
    );
    Ok((closed, info))
}

#[cfg(test)]
mod cost_tests {
    use super::*;
    use time::macros::datetime;

    #[test]
    fn ninety_minutes_at_twenty_per_hour() {
        let start = datetime!(2026-03-01 10:00:00 UTC);
        let end = datetime!(2026-03-01 11:30:00 UTC);
        assert_eq!(calculate_cost(start, Some(end), 20.0), 30.00);
    }

    #[test]
    fn open_episode_costs_nothing() {
        let start = datetime!(2026-03-01 10:00:00 UTC);
        assert_eq!(calculate_cost(start, None, 20.0), 0.0);
    }

    #[test]
    fn zero_duration_is_free() {
        let start = datetime!(2026-03-01 10:00:00 UTC);
        assert_eq!(calculate_cost(start, Some(start), 50.0), 0.0);
    }

    #[test]
    fn rounds_to_two_decimals() {
        let start = datetime!(2026-03-01 10:00:00 UTC);
        let end = datetime!(2026-03-01 10:40:00 UTC);
        // 40 minutes at 10/hr = 6.666... -> 6.67
        assert_eq!(calculate_cost(start, Some(end), 10.0), 6.67);
    }

    #[test]
    fn multi_day_stay() {
        let start = datetime!(2026-03-01 08:00:00 UTC);
        let end = datetime!(2026-03-03 08:00:00 UTC);
        assert_eq!(calculate_cost(start, Some(end), 15.0), 720.00);
    }
}

#[cfg(test)]
mod vehicle_tests {
    use super::*;

    #[test]
    fn accepts_plates() {
        assert!(validate_vehicle_number("KA01AB1234").is_ok());
        assert!(validate_vehicle_number("KA 01 AB 1234").is_ok());
        assert!(validate_vehicle_number("MH-12-XY-99").is_ok());
    }

    #[test]
    fn rejects_short_and_long() {
        assert!(validate_vehicle_number("AB12").is_err());
        assert!(validate_vehicle_number("A".repeat(21).as_str()).is_err());
    }

    #[test]
    fn rejects_lowercase_and_symbols() {
        assert!(validate_vehicle_number("ka01ab1234").is_err());
        assert!(validate_vehicle_number("KA01#1234").is_err());
    }
}

use sqlx::PgPool;
use tracing::info;
use uuid::Uuid;

use crate::auth::services::{current_user, require_admin};
use crate::error::AppError;
use crate::lots::dto::LotInput;
use crate::lots::repo::{ParkingLot, ParkingSpot};

pub fn validate_lot_input(input: &LotInput) -> Result<(), AppError> {
    let name = input.name.trim();
    if name.len() < 3 || name.len() > 100 {
        return Err(AppError::Validation(
            "name must be between 3 and 100 characters".into(),
        ));
    }
    if input.price <= 0.0 {
        return Err(AppError::Validation("price must be greater than zero".into()));
    }
    let address = input.address.trim();
    if address.len() < 5 || address.len() > 200 {
        return Err(AppError::Validation(
            "address must be between 5 and 200 characters".into(),
        ));
    }
    let pin = input.pin_code.trim();
    if pin.len() < 6 || pin.len() > 10 {
        return Err(AppError::Validation(
            "pin code must be between 6 and 10 characters".into(),
        ));
    }
    if input.max_spots < 1 {
        return Err(AppError::Validation("capacity must be at least 1".into()));
    }
    Ok(())
}

/// Create a lot plus `max_spots` spots numbered 1..=max_spots, all Available.
pub async fn create_lot(
    db: &PgPool,
    admin_id: Uuid,
    input: LotInput,
) -> Result<ParkingLot, AppError> {
    let admin = current_user(db, admin_id).await?;
    require_admin(&admin)?;
    validate_lot_input(&input)?;

    let mut tx = db.begin().await?;
    let lot = ParkingLot::insert(
        &mut tx,
        input.name.trim(),
        input.price,
        input.address.trim(),
        input.pin_code.trim(),
        input.max_spots,
    )
    .await?;
    ParkingSpot::insert_range(&mut tx, lot.id, 1, input.max_spots).await?;
    tx.commit().await?;

    info!(lot_id = %lot.id, spots = input.max_spots, "parking lot created");
    Ok(lot)
}

/// Edit lot fields and resize capacity. Growing appends spots numbered
/// current+1..=new; shrinking removes the highest-numbered Available spots
/// and fails with a capacity conflict when occupied spots stand in the way.
pub async fn update_lot(
    db: &PgPool,
    admin_id: Uuid,
    lot_id: Uuid,
    input: LotInput,
) -> Result<ParkingLot, AppError> {
    let admin = current_user(db, admin_id).await?;
    require_admin(&admin)?;
    validate_lot_input(&input)?;

    let mut tx = db.begin().await?;
    ParkingLot::lock_by_id(&mut tx, lot_id)
        .await?
        .ok_or_else(|| AppError::NotFound("parking lot not found".into()))?;

    let current = ParkingSpot::count_in_lot(&mut tx, lot_id).await? as i32;
    let requested = input.max_spots;

    if requested > current {
        let start = ParkingSpot::max_spot_number(&mut tx, lot_id).await? + 1;
        ParkingSpot::insert_range(&mut tx, lot_id, start, start + (requested - current) - 1).await?;
    } else if requested < current {
        let surplus = (current - requested) as i64;
        let removable = ParkingSpot::lock_removable(&mut tx, lot_id, surplus).await?;
        if (removable.len() as i64) < surplus {
            // Dropping the transaction rolls everything back.
            return Err(AppError::Capacity(
                "cannot reduce capacity: some spots are currently occupied".into(),
            ));
        }
        let ids: Vec<Uuid> = removable.iter().map(|s| s.id).collect();
        ParkingSpot::delete_by_ids(&mut tx, &ids).await?;
    }

    let lot = ParkingLot::update_fields(
        &mut tx,
        lot_id,
        input.name.trim(),
        input.price,
        input.address.trim(),
        input.pin_code.trim(),
        requested,
    )
    .await?;
    tx.commit().await?;

    info!(lot_id = %lot.id, from = current, to = requested, "parking lot updated");
    Ok(lot)
}

/// Delete a lot and all its spots. Fails while any spot is Occupied.
/// Historical reservations survive with their spot link severed.
pub async fn delete_lot(db: &PgPool, admin_id: Uuid, lot_id: Uuid) -> Result<(), AppError> {
    let admin = current_user(db, admin_id).await?;
    require_admin(&admin)?;

    let mut tx = db.begin().await?;
    ParkingLot::lock_by_id(&mut tx, lot_id)
        .await?
        .ok_or_else(|| AppError::NotFound("parking lot not found".into()))?;

    let occupied = ParkingSpot::count_occupied(&mut tx, lot_id).await?;
    if occupied > 0 {
        return Err(AppError::Capacity(
            "cannot delete parking lot: it has occupied spots".into(),
        ));
    }

    ParkingSpot::detach_reservations(&mut tx, lot_id).await?;
    ParkingSpot::delete_in_lot(&mut tx, lot_id).await?;
    ParkingLot::delete_row(&mut tx, lot_id).await?;
    tx.commit().await?;

    info!(lot_id = %lot_id, "parking lot deleted");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn input() -> LotInput {
        LotInput {
            name: "Central Mall Parking".into(),
            price: 20.0,
            address: "12 MG Road, Bengaluru".into(),
            pin_code: "560001".into(),
            max_spots: 5,
        }
    }

    #[test]
    fn accepts_well_formed_input() {
        assert!(validate_lot_input(&input()).is_ok());
    }

    #[test]
    fn rejects_short_name() {
        let mut i = input();
        i.name = "ab".into();
        assert!(matches!(
            validate_lot_input(&i),
            Err(AppError::Validation(_))
        ));
    }

    #[test]
    fn rejects_non_positive_price() {
        let mut i = input();
        i.price = 0.0;
        assert!(validate_lot_input(&i).is_err());
        i.price = -5.0;
        assert!(validate_lot_input(&i).is_err());
    }

    #[test]
    fn rejects_bad_pin_code() {
        let mut i = input();
        i.pin_code = "123".into();
        assert!(validate_lot_input(&i).is_err());
        i.pin_code = "12345678901".into();
        assert!(validate_lot_input(&i).is_err());
    }

    #[test]
    fn rejects_zero_capacity() {
        let mut i = input();
        i.max_spots = 0;
        assert!(matches!(
            validate_lot_input(&i),
            Err(AppError::Validation(_))
        ));
    }

    #[test]
    fn trims_before_measuring() {
        let mut i = input();
        i.name = "  ab  ".into();
        assert!(validate_lot_input(&i).is_err());
    }
}

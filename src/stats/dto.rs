use serde::Serialize;
use uuid::Uuid;

use crate::stats::repo::{
    AvailableSpotRow, DailyRevenueRow, LotCounts, MonthlyRevenueRow, OverallCounts, UserStatsRow,
};

fn occupancy_rate(occupied: i64, total: i64) -> f64 {
    if total > 0 {
        occupied as f64 / total as f64 * 100.0
    } else {
        0.0
    }
}

#[derive(Debug, Serialize)]
pub struct OccupancyStats {
    pub total: i64,
    pub available: i64,
    pub occupied: i64,
    pub occupancy_rate: f64,
}

impl From<OverallCounts> for OccupancyStats {
    fn from(c: OverallCounts) -> Self {
        Self {
            total: c.total,
            available: c.available,
            occupied: c.occupied,
            occupancy_rate: occupancy_rate(c.occupied, c.total),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct LotOccupancyStats {
    pub id: Uuid,
    pub name: String,
    pub total: i64,
    pub available: i64,
    pub occupied: i64,
    pub occupancy_rate: f64,
}

impl From<LotCounts> for LotOccupancyStats {
    fn from(c: LotCounts) -> Self {
        Self {
            id: c.id,
            name: c.name,
            total: c.total,
            available: c.available,
            occupied: c.occupied,
            occupancy_rate: occupancy_rate(c.occupied, c.total),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct ParkingStatsResponse {
    pub overall: OccupancyStats,
    pub lots: Vec<LotOccupancyStats>,
}

#[derive(Debug, Serialize)]
pub struct DailyRevenue {
    pub date: String,
    pub revenue: f64,
}

impl From<DailyRevenueRow> for DailyRevenue {
    fn from(r: DailyRevenueRow) -> Self {
        Self {
            date: r.date,
            revenue: r.revenue,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct MonthlyRevenue {
    pub month: String,
    pub revenue: f64,
}

impl From<MonthlyRevenueRow> for MonthlyRevenue {
    fn from(r: MonthlyRevenueRow) -> Self {
        Self {
            month: r.month,
            revenue: r.revenue,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct RevenueStatsResponse {
    pub daily: Vec<DailyRevenue>,
    pub monthly: Vec<MonthlyRevenue>,
}

#[derive(Debug, Serialize)]
pub struct UserStatsResponse {
    pub user_id: Uuid,
    pub total_reservations: i64,
    pub completed_reservations: i64,
    pub active_reservations: i64,
    pub total_spent: f64,
    pub avg_duration_hours: f64,
}

impl UserStatsResponse {
    pub fn from_row(user_id: Uuid, row: UserStatsRow) -> Self {
        Self {
            user_id,
            total_reservations: row.total,
            completed_reservations: row.completed,
            active_reservations: row.active,
            total_spent: row.total_spent,
            avg_duration_hours: row.avg_duration_hours,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct AvailableSpot {
    pub id: Uuid,
    pub spot_number: i32,
}

impl From<AvailableSpotRow> for AvailableSpot {
    fn from(r: AvailableSpotRow) -> Self {
        Self {
            id: r.id,
            spot_number: r.spot_number,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct AvailableSpotsResponse {
    pub lot_id: Uuid,
    pub lot_name: String,
    pub price_per_hour: f64,
    pub total_available: usize,
    pub available_spots: Vec<AvailableSpot>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn occupancy_rate_handles_empty_lot() {
        assert_eq!(occupancy_rate(0, 0), 0.0);
    }

    #[test]
    fn occupancy_rate_is_a_percentage() {
        assert_eq!(occupancy_rate(2, 5), 40.0);
        assert_eq!(occupancy_rate(5, 5), 100.0);
    }
}

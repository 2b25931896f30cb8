use std::collections::{BTreeMap, HashSet};

use crate::{
    repository::dashboard_rows::{DashboardSnapshot, ReceiptRow, ReservationRow, UnitRow},
    schemas::{
        DashboardData, DateRange, OccupancyPoint, PreviousTotals, RevenuePoint,
        RoomTypePerformance, VisitorSlice,
    },
    services::period::{buckets, ComparisonPair, Period},
};

const READY_STATUS: &str = "ready";

/// Percentage change from `previous` to `current`.
///
/// A zero `previous` reports 100 when there is any current value and 0
/// otherwise. Non-finite results collapse to 0 so callers never see a fault.
pub fn pct_change(current: f64, previous: f64) -> f64 {
    if previous == 0.0 {
        return if current > 0.0 { 100.0 } else { 0.0 };
    }
    let change = (current - previous) / previous.abs() * 100.0;
    if change.is_finite() {
        change
    } else {
        0.0
    }
}

pub fn round1(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

/// Headline totals for one window.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct PeriodTotals {
    pub room_bookings: i64,
    pub venue_bookings: i64,
    pub revenue: f64,
    pub guests: i64,
    pub available_rooms: i64,
    pub available_spaces: i64,
}

impl PeriodTotals {
    pub fn bookings(&self) -> i64 {
        self.room_bookings + self.venue_bookings
    }
}

pub fn period_totals(snapshot: &DashboardSnapshot, window: &Period) -> PeriodTotals {
    PeriodTotals {
        room_bookings: count_overlapping(&snapshot.room_reservations, window),
        venue_bookings: count_overlapping(&snapshot.venue_reservations, window),
        revenue: sum_receipts(&snapshot.receipts, window),
        guests: distinct_guests(
            snapshot
                .room_reservations
                .iter()
                .chain(snapshot.venue_reservations.iter()),
            window,
        ),
        available_rooms: available_units(&snapshot.rooms, &snapshot.room_reservations, window),
        available_spaces: available_units(
            &snapshot.venues,
            &snapshot.venue_reservations,
            window,
        ),
    }
}

pub fn count_overlapping(reservations: &[ReservationRow], window: &Period) -> i64 {
    reservations
        .iter()
        .filter(|row| window.overlaps(row.start, row.end))
        .count() as i64
}

pub fn sum_receipts(receipts: &[ReceiptRow], window: &Period) -> f64 {
    receipts
        .iter()
        .filter(|receipt| window.contains(receipt.date))
        .map(|receipt| receipt.total)
        .sum()
}

pub fn distinct_guests<'a>(
    reservations: impl Iterator<Item = &'a ReservationRow>,
    window: &Period,
) -> i64 {
    reservations
        .filter(|row| window.overlaps(row.start, row.end))
        .filter_map(|row| row.guest_id.as_deref())
        .collect::<HashSet<_>>()
        .len() as i64
}

/// Ready units without an overlapping reservation.
pub fn available_units(units: &[UnitRow], reservations: &[ReservationRow], window: &Period) -> i64 {
    let ready = units
        .iter()
        .filter(|unit| unit.status.trim().eq_ignore_ascii_case(READY_STATUS))
        .map(|unit| unit.unit_id.as_str())
        .collect::<HashSet<_>>();
    let occupied = reservations
        .iter()
        .filter(|row| window.overlaps(row.start, row.end))
        .filter_map(|row| row.unit_id.as_deref())
        .filter(|unit_id| ready.contains(unit_id))
        .collect::<HashSet<_>>();
    ready.len().saturating_sub(occupied.len()) as i64
}

pub fn room_type_performance(
    reservations: &[ReservationRow],
    window: &Period,
) -> Vec<RoomTypePerformance> {
    let mut by_type: BTreeMap<&str, (i64, i64)> = BTreeMap::new();
    for row in reservations {
        if !window.overlaps(row.start, row.end) {
            continue;
        }
        let Some(room_type) = row
            .unit_type
            .as_deref()
            .map(str::trim)
            .filter(|name| !name.is_empty())
        else {
            continue;
        };
        let entry = by_type.entry(room_type).or_insert((0, 0));
        entry.0 += 1;
        entry.1 += (row.end - row.start).num_days().max(0);
    }

    by_type
        .into_iter()
        .map(|(room_type, (bookings, nights))| RoomTypePerformance {
            room_type: room_type.to_string(),
            booking_frequency: bookings,
            avg_stay_duration: if bookings > 0 {
                nights as f64 / bookings as f64
            } else {
                0.0
            },
        })
        .collect()
}

pub fn build_dashboard(snapshot: &DashboardSnapshot, periods: &ComparisonPair) -> DashboardData {
    let current = period_totals(snapshot, &periods.current);
    let previous = period_totals(snapshot, &periods.previous);
    let label = periods.view_mode.period_label();
    let series = buckets(&periods.current, periods.view_mode);

    let occupancy_data = series
        .iter()
        .map(|bucket| OccupancyPoint {
            date: bucket.label.clone(),
            occupancy: count_overlapping(&snapshot.room_reservations, &bucket.period),
        })
        .collect();
    let revenue_data = series
        .iter()
        .map(|bucket| RevenuePoint {
            date: bucket.label.clone(),
            revenue: sum_receipts(&snapshot.receipts, &bucket.period),
        })
        .collect();

    let change = |now: f64, before: f64| round1(pct_change(now, before));

    DashboardData {
        total_bookings: current.bookings(),
        total_bookings_change: change(current.bookings() as f64, previous.bookings() as f64),
        total_bookings_period: label,
        total_revenue: current.revenue,
        total_revenue_change: change(current.revenue, previous.revenue),
        total_revenue_period: label,
        total_guests: current.guests,
        total_guests_change: change(current.guests as f64, previous.guests as f64),
        total_guests_period: label,
        available_rooms: current.available_rooms,
        available_rooms_change: change(
            current.available_rooms as f64,
            previous.available_rooms as f64,
        ),
        available_rooms_period: label,
        available_spaces: current.available_spaces,
        available_spaces_change: change(
            current.available_spaces as f64,
            previous.available_spaces as f64,
        ),
        available_spaces_period: label,
        occupancy_data,
        revenue_data,
        room_type_performance: room_type_performance(
            &snapshot.room_reservations,
            &periods.current,
        ),
        visitor_data: vec![
            VisitorSlice {
                name: "Room".to_string(),
                visitors: current.room_bookings,
            },
            VisitorSlice {
                name: "Venue".to_string(),
                visitors: current.venue_bookings,
            },
        ],
        visitor_trending: change(current.bookings() as f64, previous.bookings() as f64),
        date_range: DateRange {
            start_date: periods.current.start,
            end_date: periods.current.end,
            previous_start_date: periods.previous.start,
            previous_end_date: periods.previous.end,
            view_mode: periods.view_mode,
        },
        previous: PreviousTotals {
            bookings: previous.bookings(),
            revenue: previous.revenue,
            guests: previous.guests,
            available_rooms: previous.available_rooms,
            available_spaces: previous.available_spaces,
        },
    }
}

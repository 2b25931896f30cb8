use chrono::NaiveDate;
use sqlx::{postgres::PgRow, PgPool, Postgres, QueryBuilder, Row};

use crate::{error::AppError, services::period::Period};

/// Where a reservation kind lives and how its unit is typed.
pub struct ReservationSource {
    pub table: &'static str,
    pub unit_column: &'static str,
    pub start_column: &'static str,
    pub end_column: &'static str,
    pub unit_table: &'static str,
    pub unit_key: &'static str,
    /// `(type table, type key on unit, type name column)`
    pub unit_type: Option<(&'static str, &'static str, &'static str)>,
}

pub struct UnitSource {
    pub table: &'static str,
    pub id_column: &'static str,
    pub status_column: &'static str,
}

pub const ROOM_RESERVATIONS: ReservationSource = ReservationSource {
    table: "room_reservations",
    unit_column: "room_id",
    start_column: "room_reservation_booking_date_start",
    end_column: "room_reservation_booking_date_end",
    unit_table: "rooms",
    unit_key: "room_id",
    unit_type: Some(("room_types", "room_type_id", "room_type_name")),
};

pub const VENUE_RESERVATIONS: ReservationSource = ReservationSource {
    table: "venue_reservations",
    unit_column: "venue_id",
    start_column: "venue_reservation_booking_date_start",
    end_column: "venue_reservation_booking_date_end",
    unit_table: "venues",
    unit_key: "venue_id",
    unit_type: None,
};

pub const ROOMS: UnitSource = UnitSource {
    table: "rooms",
    id_column: "room_id",
    status_column: "room_status",
};

pub const VENUES: UnitSource = UnitSource {
    table: "venues",
    id_column: "venue_id",
    status_column: "venue_status",
};

#[derive(Debug, Clone, PartialEq)]
pub struct ReservationRow {
    pub unit_id: Option<String>,
    /// Set only when the guest exists in `guest_details`.
    pub guest_id: Option<String>,
    pub start: NaiveDate,
    pub end: NaiveDate,
    pub unit_type: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct UnitRow {
    pub unit_id: String,
    pub status: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ReceiptRow {
    pub date: NaiveDate,
    pub total: f64,
}

/// Every row the dashboard aggregates, loaded once for the combined span.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DashboardSnapshot {
    pub room_reservations: Vec<ReservationRow>,
    pub venue_reservations: Vec<ReservationRow>,
    pub rooms: Vec<UnitRow>,
    pub venues: Vec<UnitRow>,
    pub receipts: Vec<ReceiptRow>,
}

pub async fn load_snapshot(pool: &PgPool, span: Period) -> Result<DashboardSnapshot, AppError> {
    Ok(DashboardSnapshot {
        room_reservations: list_reservations(pool, &ROOM_RESERVATIONS, span).await?,
        venue_reservations: list_reservations(pool, &VENUE_RESERVATIONS, span).await?,
        rooms: list_units(pool, &ROOMS).await?,
        venues: list_units(pool, &VENUES).await?,
        receipts: list_receipts(pool, span).await?,
    })
}

pub async fn list_reservations(
    pool: &PgPool,
    source: &ReservationSource,
    window: Period,
) -> Result<Vec<ReservationRow>, AppError> {
    let mut query = reservation_query(source, window);
    let rows = query
        .build()
        .fetch_all(pool)
        .await
        .map_err(|error| map_db_error(source.table, error))?;

    rows.iter()
        .map(read_reservation)
        .collect::<Result<Vec<_>, _>>()
        .map_err(|error| map_db_error(source.table, error))
}

pub async fn list_units(pool: &PgPool, source: &UnitSource) -> Result<Vec<UnitRow>, AppError> {
    let mut query = unit_query(source);
    let rows = query
        .build()
        .fetch_all(pool)
        .await
        .map_err(|error| map_db_error(source.table, error))?;

    rows.iter()
        .map(|row| {
            Ok(UnitRow {
                unit_id: row.try_get::<String, _>("unit_id")?,
                status: row
                    .try_get::<Option<String>, _>("status")?
                    .unwrap_or_default(),
            })
        })
        .collect::<Result<Vec<_>, sqlx::Error>>()
        .map_err(|error| map_db_error(source.table, error))
}

pub async fn list_receipts(pool: &PgPool, window: Period) -> Result<Vec<ReceiptRow>, AppError> {
    let mut query = receipt_query(window);
    let rows = query
        .build()
        .fetch_all(pool)
        .await
        .map_err(|error| map_db_error("receipts", error))?;

    rows.iter()
        .map(|row| {
            Ok(ReceiptRow {
                date: row.try_get::<NaiveDate, _>("receipt_date")?,
                total: row.try_get::<Option<f64>, _>("total")?.unwrap_or(0.0),
            })
        })
        .collect::<Result<Vec<_>, sqlx::Error>>()
        .map_err(|error| map_db_error("receipts", error))
}

fn reservation_query(source: &ReservationSource, window: Period) -> QueryBuilder<'static, Postgres> {
    let mut query = QueryBuilder::<Postgres>::new("SELECT r.");
    query
        .push(source.unit_column)
        .push("::text AS unit_id, g.guest_id::text AS guest_id, r.")
        .push(source.start_column)
        .push("::date AS start_date, r.")
        .push(source.end_column)
        .push("::date AS end_date, ");

    match source.unit_type {
        Some((_, _, name_column)) => query.push("ty.").push(name_column).push(" AS unit_type"),
        None => query.push("NULL::text AS unit_type"),
    };

    query
        .push(" FROM ")
        .push(source.table)
        .push(" r LEFT JOIN guest_details g ON g.guest_id = r.guest_id");

    if let Some((type_table, type_key, _)) = source.unit_type {
        query
            .push(" LEFT JOIN ")
            .push(source.unit_table)
            .push(" u ON u.")
            .push(source.unit_key)
            .push(" = r.")
            .push(source.unit_column)
            .push(" LEFT JOIN ")
            .push(type_table)
            .push(" ty ON ty.")
            .push(type_key)
            .push(" = u.")
            .push(type_key);
    }

    query
        .push(" WHERE r.")
        .push(source.start_column)
        .push("::date <= ")
        .push_bind(window.end)
        .push(" AND r.")
        .push(source.end_column)
        .push("::date >= ")
        .push_bind(window.start)
        .push(" ORDER BY r.")
        .push(source.start_column)
        .push(" ASC");
    query
}

fn unit_query(source: &UnitSource) -> QueryBuilder<'static, Postgres> {
    let mut query = QueryBuilder::<Postgres>::new("SELECT ");
    query
        .push(source.id_column)
        .push("::text AS unit_id, ")
        .push(source.status_column)
        .push("::text AS status FROM ")
        .push(source.table);
    query
}

fn receipt_query(window: Period) -> QueryBuilder<'static, Postgres> {
    let mut query = QueryBuilder::<Postgres>::new(
        "SELECT receipt_date::date AS receipt_date, receipt_total_amount::float8 AS total \
         FROM receipts WHERE receipt_date::date >= ",
    );
    query
        .push_bind(window.start)
        .push(" AND receipt_date::date <= ")
        .push_bind(window.end);
    query
}

fn read_reservation(row: &PgRow) -> Result<ReservationRow, sqlx::Error> {
    Ok(ReservationRow {
        unit_id: row.try_get::<Option<String>, _>("unit_id")?,
        guest_id: row.try_get::<Option<String>, _>("guest_id")?,
        start: row.try_get::<NaiveDate, _>("start_date")?,
        end: row.try_get::<NaiveDate, _>("end_date")?,
        unit_type: row.try_get::<Option<String>, _>("unit_type")?,
    })
}

fn map_db_error(table: &str, error: sqlx::Error) -> AppError {
    tracing::error!(table, error = %error, "Dashboard query failed");
    AppError::Internal("An error occurred while fetching dashboard data".to_string())
}

#[cfg(test)]
mod tests {
    use super::{
        receipt_query, reservation_query, unit_query, ROOMS, ROOM_RESERVATIONS,
        VENUE_RESERVATIONS,
    };
    use crate::services::period::Period;
    use chrono::NaiveDate;

    fn window() -> Period {
        Period::new(
            NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
            NaiveDate::from_ymd_opt(2024, 1, 31).unwrap(),
        )
        .unwrap()
    }

    #[test]
    fn room_query_uses_inclusive_overlap_and_type_join() {
        let query = reservation_query(&ROOM_RESERVATIONS, window());
        let sql = query.sql();
        assert!(
            sql.contains("WHERE r.room_reservation_booking_date_start::date <= $1"),
            "Expected start bound in SQL but got: {sql}"
        );
        assert!(
            sql.contains("AND r.room_reservation_booking_date_end::date >= $2"),
            "Expected end bound in SQL but got: {sql}"
        );
        assert!(
            sql.contains("LEFT JOIN room_types ty ON ty.room_type_id = u.room_type_id"),
            "Expected room type join in SQL but got: {sql}"
        );
        assert!(sql.contains("ty.room_type_name AS unit_type"));
    }

    #[test]
    fn venue_query_has_no_type_join() {
        let query = reservation_query(&VENUE_RESERVATIONS, window());
        let sql = query.sql();
        assert!(sql.contains("NULL::text AS unit_type"));
        assert!(sql.contains("FROM venue_reservations r LEFT JOIN guest_details g"));
        assert!(!sql.contains("room_types"), "Unexpected type join in SQL: {sql}");
    }

    #[test]
    fn receipt_query_bounds_both_ends() {
        let query = receipt_query(window());
        let sql = query.sql();
        assert!(sql.contains("receipt_date::date >= $1 AND receipt_date::date <= $2"));
        assert!(sql.contains("receipt_total_amount::float8 AS total"));
    }

    #[test]
    fn unit_query_reads_status() {
        let query = unit_query(&ROOMS);
        assert_eq!(
            query.sql(),
            "SELECT room_id::text AS unit_id, room_status::text AS status FROM rooms"
        );
    }
}

// SPDX-FileCopyrightText: 2026 Farebot Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Row decoding for the domain types stored in SQLite.
//!
//! Vectors (route, times, the session draft) are stored as JSON text;
//! enums are stored in their snake_case string form.

use chrono::{DateTime, Utc};
use farebot_core::{Booking, Driver, Session, UserId, Vehicle};
use rusqlite::types::Type;
use rusqlite::Row;
use serde::de::DeserializeOwned;

/// Decode a `vehicles` row selected in schema column order.
pub(crate) fn vehicle_from_row(row: &Row<'_>) -> rusqlite::Result<Vehicle> {
    let route_json: String = row.get(2)?;
    let times_json: String = row.get(3)?;
    let service_text: String = row.get(5)?;
    Ok(Vehicle {
        id: row.get(0)?,
        name: row.get(1)?,
        route: decode_json(2, &route_json)?,
        times: decode_json(3, &times_json)?,
        capacity: row.get(4)?,
        service: service_text
            .parse()
            .map_err(|e| conversion_failure(5, e))?,
        driver: Driver {
            name: row.get(6)?,
            phone: row.get(7)?,
        },
    })
}

/// Decode a `bookings` row selected in schema column order.
pub(crate) fn booking_from_row(row: &Row<'_>) -> rusqlite::Result<Booking> {
    let created_at: String = row.get(12)?;
    Ok(Booking {
        id: row.get(0)?,
        user_id: UserId(row.get(1)?),
        user_name: row.get(2)?,
        vehicle_id: row.get(3)?,
        vehicle_name: row.get(4)?,
        driver: Driver {
            name: row.get(5)?,
            phone: row.get(6)?,
        },
        start: row.get(7)?,
        end: row.get(8)?,
        time: row.get(9)?,
        pax: row.get(10)?,
        need_both: row.get(11)?,
        created_at: parse_timestamp(12, &created_at)?,
    })
}

/// Decode a `sessions` row selected as `step, draft, user_name`.
pub(crate) fn session_from_row(row: &Row<'_>) -> rusqlite::Result<Session> {
    let step_text: String = row.get(0)?;
    let draft_json: String = row.get(1)?;
    Ok(Session {
        step: step_text.parse().map_err(|e| conversion_failure(0, e))?,
        draft: decode_json(1, &draft_json)?,
        user_name: row.get(2)?,
    })
}

pub(crate) fn decode_json<T: DeserializeOwned>(idx: usize, raw: &str) -> rusqlite::Result<T> {
    serde_json::from_str(raw).map_err(|e| conversion_failure(idx, e))
}

fn parse_timestamp(idx: usize, raw: &str) -> rusqlite::Result<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(raw)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| conversion_failure(idx, e))
}

fn conversion_failure<E>(idx: usize, e: E) -> rusqlite::Error
where
    E: std::error::Error + Send + Sync + 'static,
{
    rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, Box::new(e))
}

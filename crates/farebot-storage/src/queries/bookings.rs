// SPDX-FileCopyrightText: 2026 Farebot Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Append-only booking log queries.

use farebot_core::{Booking, FarebotError};
use rusqlite::params;

use crate::database::{map_tr_err, Database};
use crate::models::booking_from_row;

const BOOKING_COLUMNS: &str = "id, user_id, user_name, vehicle_id, vehicle_name, driver_name, \
                               driver_phone, start_stop, end_stop, depart_time, pax, need_both, \
                               created_at";

/// Record one confirmed booking.
pub async fn insert_booking(db: &Database, booking: &Booking) -> Result<(), FarebotError> {
    let booking = booking.clone();
    db.connection()
        .call(move |conn| {
            conn.execute(
                "INSERT INTO bookings (id, user_id, user_name, vehicle_id, vehicle_name,
                                       driver_name, driver_phone, start_stop, end_stop,
                                       depart_time, pax, need_both, created_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13)",
                params![
                    booking.id,
                    booking.user_id.0,
                    booking.user_name,
                    booking.vehicle_id,
                    booking.vehicle_name,
                    booking.driver.name,
                    booking.driver.phone,
                    booking.start,
                    booking.end,
                    booking.time,
                    booking.pax,
                    booking.need_both,
                    booking.created_at.to_rfc3339(),
                ],
            )?;
            Ok(())
        })
        .await
        .map_err(map_tr_err)
}

/// All bookings, oldest first.
pub async fn list_bookings(db: &Database) -> Result<Vec<Booking>, FarebotError> {
    db.connection()
        .call(move |conn| {
            let mut stmt = conn.prepare(&format!(
                "SELECT {BOOKING_COLUMNS} FROM bookings ORDER BY created_at"
            ))?;
            let rows = stmt.query_map([], booking_from_row)?;
            let mut bookings = Vec::new();
            for row in rows {
                bookings.push(row?);
            }
            Ok(bookings)
        })
        .await
        .map_err(map_tr_err)
}

// SPDX-FileCopyrightText: 2026 Farebot Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Vehicle roster CRUD and the seat reservation query.

use farebot_core::{FarebotError, Vehicle};
use rusqlite::{params, OptionalExtension};

use crate::database::{map_tr_err, Database};
use crate::models::vehicle_from_row;

const VEHICLE_COLUMNS: &str =
    "id, name, route, times, capacity, service, driver_name, driver_phone";

/// List the whole roster, ordered by id.
pub async fn list_vehicles(db: &Database) -> Result<Vec<Vehicle>, FarebotError> {
    db.connection()
        .call(move |conn| {
            let mut stmt = conn.prepare(&format!(
                "SELECT {VEHICLE_COLUMNS} FROM vehicles ORDER BY id"
            ))?;
            let rows = stmt.query_map([], vehicle_from_row)?;
            let mut vehicles = Vec::new();
            for row in rows {
                vehicles.push(row?);
            }
            Ok(vehicles)
        })
        .await
        .map_err(map_tr_err)
}

/// Get a single vehicle by id.
pub async fn get_vehicle(db: &Database, id: &str) -> Result<Option<Vehicle>, FarebotError> {
    let id = id.to_string();
    db.connection()
        .call(move |conn| {
            let result = conn
                .query_row(
                    &format!("SELECT {VEHICLE_COLUMNS} FROM vehicles WHERE id = ?1"),
                    params![id],
                    vehicle_from_row,
                )
                .optional()?;
            Ok(result)
        })
        .await
        .map_err(map_tr_err)
}

/// Insert a vehicle, replacing any existing roster entry with the same id.
pub async fn upsert_vehicle(db: &Database, vehicle: &Vehicle) -> Result<(), FarebotError> {
    let vehicle = vehicle.clone();
    let route = serde_json::to_string(&vehicle.route)
        .map_err(|e| FarebotError::Internal(format!("encoding vehicle route: {e}")))?;
    let times = serde_json::to_string(&vehicle.times)
        .map_err(|e| FarebotError::Internal(format!("encoding vehicle times: {e}")))?;
    db.connection()
        .call(move |conn| {
            conn.execute(
                "INSERT INTO vehicles (id, name, route, times, capacity, service, driver_name, driver_phone)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)
                 ON CONFLICT(id) DO UPDATE SET
                     name = excluded.name,
                     route = excluded.route,
                     times = excluded.times,
                     capacity = excluded.capacity,
                     service = excluded.service,
                     driver_name = excluded.driver_name,
                     driver_phone = excluded.driver_phone",
                params![
                    vehicle.id,
                    vehicle.name,
                    route,
                    times,
                    vehicle.capacity,
                    vehicle.service.to_string(),
                    vehicle.driver.name,
                    vehicle.driver.phone,
                ],
            )?;
            Ok(())
        })
        .await
        .map_err(map_tr_err)
}

enum ReserveOutcome {
    Reserved(u32),
    Insufficient(u32),
    Missing,
}

/// Atomically take `pax` seats off a vehicle, returning the seats left.
///
/// The conditional decrement and the re-read run in one closure on the
/// writer thread, so no interleaving caller can observe or cause a negative
/// capacity.
pub async fn reserve_seats(db: &Database, id: &str, pax: u32) -> Result<u32, FarebotError> {
    let vehicle_id = id.to_string();
    let key = vehicle_id.clone();
    let outcome = db
        .connection()
        .call(move |conn| {
            let updated = conn.execute(
                "UPDATE vehicles SET capacity = capacity - ?2
                 WHERE id = ?1 AND capacity >= ?2",
                params![key, pax],
            )?;
            if updated == 1 {
                let remaining: u32 = conn.query_row(
                    "SELECT capacity FROM vehicles WHERE id = ?1",
                    params![key],
                    |row| row.get(0),
                )?;
                return Ok(ReserveOutcome::Reserved(remaining));
            }
            let available: Option<u32> = conn
                .query_row(
                    "SELECT capacity FROM vehicles WHERE id = ?1",
                    params![key],
                    |row| row.get(0),
                )
                .optional()?;
            Ok(match available {
                Some(available) => ReserveOutcome::Insufficient(available),
                None => ReserveOutcome::Missing,
            })
        })
        .await
        .map_err(map_tr_err)?;

    match outcome {
        ReserveOutcome::Reserved(remaining) => Ok(remaining),
        ReserveOutcome::Insufficient(available) => Err(FarebotError::InsufficientCapacity {
            requested: pax,
            available,
        }),
        ReserveOutcome::Missing => Err(FarebotError::VehicleUnavailable { vehicle_id }),
    }
}

/// Hand `pax` reserved seats back to a vehicle after a failed booking write.
pub async fn release_seats(db: &Database, id: &str, pax: u32) -> Result<(), FarebotError> {
    let vehicle_id = id.to_string();
    let key = vehicle_id.clone();
    let updated = db
        .connection()
        .call(move |conn| {
            let updated = conn.execute(
                "UPDATE vehicles SET capacity = capacity + ?2 WHERE id = ?1",
                params![key, pax],
            )?;
            Ok(updated)
        })
        .await
        .map_err(map_tr_err)?;

    if updated == 1 {
        Ok(())
    } else {
        Err(FarebotError::VehicleUnavailable { vehicle_id })
    }
}

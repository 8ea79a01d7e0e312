// SPDX-FileCopyrightText: 2026 Farebot Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Durable store boundaries for the four record collections.

use async_trait::async_trait;

use crate::error::FarebotError;
use crate::types::{Booking, Session, UserId, Vehicle};

/// The vehicle roster. Sole owner of `Vehicle` records.
///
/// `reserve_seats` is the only capacity mutation and must be atomic per
/// vehicle: implementations serialize the check-and-decrement (single writer
/// thread, per-key lock) so that no concurrent confirmation can observe a
/// stale capacity between check and decrement.
#[async_trait]
pub trait RosterStore: Send + Sync {
    /// All vehicles in roster order.
    async fn all(&self) -> Result<Vec<Vehicle>, FarebotError>;

    /// Look up a single vehicle by id.
    async fn get(&self, vehicle_id: &str) -> Result<Option<Vehicle>, FarebotError>;

    /// Insert a vehicle, overwriting any existing entry with the same id.
    async fn upsert(&self, vehicle: Vehicle) -> Result<(), FarebotError>;

    /// Atomically decrement a vehicle's capacity by `pax`, returning the
    /// remaining capacity.
    ///
    /// Fails with [`FarebotError::VehicleUnavailable`] if the id does not
    /// resolve, or [`FarebotError::InsufficientCapacity`] if fewer than `pax`
    /// seats remain; in both cases nothing is mutated.
    async fn reserve_seats(&self, vehicle_id: &str, pax: u32) -> Result<u32, FarebotError>;

    /// Return `pax` previously reserved seats to a vehicle. Compensation for
    /// a reservation whose booking could not be recorded.
    ///
    /// Fails with [`FarebotError::VehicleUnavailable`] if the id does not
    /// resolve.
    async fn release_seats(&self, vehicle_id: &str, pax: u32) -> Result<(), FarebotError>;
}

/// Append-only log of confirmed bookings.
#[async_trait]
pub trait BookingStore: Send + Sync {
    async fn append(&self, booking: Booking) -> Result<(), FarebotError>;

    async fn all(&self) -> Result<Vec<Booking>, FarebotError>;
}

/// The set of user identities eligible for broadcast. Grows monotonically.
#[async_trait]
pub trait SubscriberStore: Send + Sync {
    /// Register a subscriber. Adding an existing id is a no-op.
    async fn add(&self, user: UserId) -> Result<(), FarebotError>;

    async fn all(&self) -> Result<Vec<UserId>, FarebotError>;
}

/// Per-user session records. Each session is exclusively owned by its user's
/// event handler; no cross-user access.
#[async_trait]
pub trait SessionStore: Send + Sync {
    async fn get(&self, user: UserId) -> Result<Option<Session>, FarebotError>;

    async fn put(&self, user: UserId, session: Session) -> Result<(), FarebotError>;

    /// Remove a session. Removing a missing session is a no-op.
    async fn remove(&self, user: UserId) -> Result<(), FarebotError>;
}

// SPDX-FileCopyrightText: 2026 Farebot Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Booking engine for the Farebot assistant.
//!
//! Holds the matcher, the multi-step conversation state machine, the booking
//! transaction, and broadcast batching. The engine only talks to its
//! collaborators through the traits in `farebot-core`, so the same code runs
//! against SQLite stores and a live Telegram notifier in production, and
//! against in-memory doubles in tests.

pub mod broadcast;
pub mod flow;
pub mod matcher;
pub mod memory;
pub mod transaction;

use std::sync::Arc;
use std::time::Duration;

use farebot_core::{
    BookingStore, FarebotError, Notifier, RosterStore, SessionStore, SubscriberStore, UserId,
    Vehicle,
};

pub use broadcast::{DeliveryReport, DeliveryStatus};

/// Engine settings that do not belong to any single store.
#[derive(Debug, Clone)]
pub struct EngineConfig {
    /// Chat that receives booking summaries and user reports. `None`
    /// disables admin notifications.
    pub admin_chat: Option<UserId>,
    /// Recipients per broadcast batch.
    pub broadcast_batch_size: usize,
    /// Delay between broadcast batches.
    pub broadcast_batch_delay: Duration,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            admin_chat: None,
            broadcast_batch_size: 20,
            broadcast_batch_delay: Duration::from_millis(1000),
        }
    }
}

/// The booking engine: conversation flow, matching, and confirmation.
///
/// One instance serves all users; per-user state lives in the session store.
/// Events for a single user must be fed in arrival order (the binary's event
/// loop guarantees this by handling each event to completion).
pub struct Engine {
    roster: Arc<dyn RosterStore>,
    bookings: Arc<dyn BookingStore>,
    sessions: Arc<dyn SessionStore>,
    subscribers: Arc<dyn SubscriberStore>,
    notifier: Arc<dyn Notifier>,
    config: EngineConfig,
}

impl Engine {
    pub fn new(
        roster: Arc<dyn RosterStore>,
        bookings: Arc<dyn BookingStore>,
        sessions: Arc<dyn SessionStore>,
        subscribers: Arc<dyn SubscriberStore>,
        notifier: Arc<dyn Notifier>,
        config: EngineConfig,
    ) -> Self {
        Self {
            roster,
            bookings,
            sessions,
            subscribers,
            notifier,
            config,
        }
    }

    pub(crate) fn roster(&self) -> &dyn RosterStore {
        self.roster.as_ref()
    }

    pub(crate) fn bookings(&self) -> &dyn BookingStore {
        self.bookings.as_ref()
    }

    pub(crate) fn sessions(&self) -> &dyn SessionStore {
        self.sessions.as_ref()
    }

    pub(crate) fn subscribers(&self) -> &dyn SubscriberStore {
        self.subscribers.as_ref()
    }

    pub(crate) fn notifier(&self) -> &dyn Notifier {
        self.notifier.as_ref()
    }

    pub(crate) fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Send a plain text message to one user. Used by the admin gateway.
    pub async fn send_direct(&self, user: UserId, text: &str) -> Result<(), FarebotError> {
        self.notifier.send_text(user, text).await
    }

    /// Broadcast text to every subscriber in rate-limited batches, returning
    /// one report per recipient.
    pub async fn broadcast(&self, text: &str) -> Result<Vec<DeliveryReport>, FarebotError> {
        let targets = self.subscribers.all().await?;
        Ok(broadcast::broadcast(
            self.notifier.as_ref(),
            &targets,
            text,
            self.config.broadcast_batch_size,
            self.config.broadcast_batch_delay,
        )
        .await)
    }

    /// Current roster contents, for the admin gateway.
    pub async fn list_vehicles(&self) -> Result<Vec<Vehicle>, FarebotError> {
        self.roster.all().await
    }

    /// Insert or overwrite a roster entry, validating its shape first.
    pub async fn upsert_vehicle(&self, vehicle: Vehicle) -> Result<(), FarebotError> {
        if vehicle.id.trim().is_empty() {
            return Err(FarebotError::Validation(
                "vehicle id must not be empty".into(),
            ));
        }
        if vehicle.route.len() < 2 {
            return Err(FarebotError::Validation(
                "vehicle route must have at least 2 stops".into(),
            ));
        }
        self.roster.upsert(vehicle).await
    }
}

// SPDX-FileCopyrightText: 2026 Farebot Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! In-memory implementations of the store traits, plus a recording notifier.
//!
//! These back the engine's tests and double as a zero-setup runtime for
//! development. `reserve_seats` performs its check-and-decrement under the
//! roster lock, giving the same serialization guarantee as the SQLite
//! writer thread.

use std::collections::{HashMap, HashSet};
use std::sync::Mutex as StdMutex;

use async_trait::async_trait;
use farebot_core::{
    Booking, BookingStore, Choice, FarebotError, Notifier, RosterStore, Session, SessionStore,
    SubscriberStore, UserId, Vehicle,
};
use tokio::sync::Mutex;

/// In-memory vehicle roster.
#[derive(Default)]
pub struct MemoryRoster {
    vehicles: Mutex<Vec<Vehicle>>,
}

impl MemoryRoster {
    pub fn new(vehicles: Vec<Vehicle>) -> Self {
        Self {
            vehicles: Mutex::new(vehicles),
        }
    }
}

#[async_trait]
impl RosterStore for MemoryRoster {
    async fn all(&self) -> Result<Vec<Vehicle>, FarebotError> {
        Ok(self.vehicles.lock().await.clone())
    }

    async fn get(&self, vehicle_id: &str) -> Result<Option<Vehicle>, FarebotError> {
        Ok(self
            .vehicles
            .lock()
            .await
            .iter()
            .find(|v| v.id == vehicle_id)
            .cloned())
    }

    async fn upsert(&self, vehicle: Vehicle) -> Result<(), FarebotError> {
        let mut vehicles = self.vehicles.lock().await;
        match vehicles.iter_mut().find(|v| v.id == vehicle.id) {
            Some(existing) => *existing = vehicle,
            None => vehicles.push(vehicle),
        }
        Ok(())
    }

    async fn reserve_seats(&self, vehicle_id: &str, pax: u32) -> Result<u32, FarebotError> {
        let mut vehicles = self.vehicles.lock().await;
        let Some(vehicle) = vehicles.iter_mut().find(|v| v.id == vehicle_id) else {
            return Err(FarebotError::VehicleUnavailable {
                vehicle_id: vehicle_id.to_string(),
            });
        };
        if vehicle.capacity < pax {
            return Err(FarebotError::InsufficientCapacity {
                requested: pax,
                available: vehicle.capacity,
            });
        }
        vehicle.capacity -= pax;
        Ok(vehicle.capacity)
    }

    async fn release_seats(&self, vehicle_id: &str, pax: u32) -> Result<(), FarebotError> {
        let mut vehicles = self.vehicles.lock().await;
        let Some(vehicle) = vehicles.iter_mut().find(|v| v.id == vehicle_id) else {
            return Err(FarebotError::VehicleUnavailable {
                vehicle_id: vehicle_id.to_string(),
            });
        };
        vehicle.capacity += pax;
        Ok(())
    }
}

/// In-memory append-only booking log.
#[derive(Default)]
pub struct MemoryBookings {
    bookings: Mutex<Vec<Booking>>,
}

#[async_trait]
impl BookingStore for MemoryBookings {
    async fn append(&self, booking: Booking) -> Result<(), FarebotError> {
        self.bookings.lock().await.push(booking);
        Ok(())
    }

    async fn all(&self) -> Result<Vec<Booking>, FarebotError> {
        Ok(self.bookings.lock().await.clone())
    }
}

/// In-memory subscriber set.
#[derive(Default)]
pub struct MemorySubscribers {
    users: Mutex<Vec<UserId>>,
}

#[async_trait]
impl SubscriberStore for MemorySubscribers {
    async fn add(&self, user: UserId) -> Result<(), FarebotError> {
        let mut users = self.users.lock().await;
        if !users.contains(&user) {
            users.push(user);
        }
        Ok(())
    }

    async fn all(&self) -> Result<Vec<UserId>, FarebotError> {
        Ok(self.users.lock().await.clone())
    }
}

/// In-memory per-user session map.
#[derive(Default)]
pub struct MemorySessions {
    sessions: Mutex<HashMap<UserId, Session>>,
}

#[async_trait]
impl SessionStore for MemorySessions {
    async fn get(&self, user: UserId) -> Result<Option<Session>, FarebotError> {
        Ok(self.sessions.lock().await.get(&user).cloned())
    }

    async fn put(&self, user: UserId, session: Session) -> Result<(), FarebotError> {
        self.sessions.lock().await.insert(user, session);
        Ok(())
    }

    async fn remove(&self, user: UserId) -> Result<(), FarebotError> {
        self.sessions.lock().await.remove(&user);
        Ok(())
    }
}

/// Everything a [`RecordingNotifier`] was asked to deliver.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Delivery {
    Text {
        user: UserId,
        text: String,
    },
    Choices {
        user: UserId,
        text: String,
        choices: Vec<Choice>,
    },
    Ack {
        event_id: String,
        text: Option<String>,
    },
}

/// Notifier double that records every attempt, including ones configured
/// to fail. Makes fire-and-forget side effects observable in tests.
#[derive(Default)]
pub struct RecordingNotifier {
    deliveries: StdMutex<Vec<Delivery>>,
    fail_for: StdMutex<HashSet<UserId>>,
}

impl RecordingNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every subsequent send to `user` fail with a channel error.
    pub fn fail_sends_to(&self, user: UserId) {
        self.fail_for.lock().expect("lock poisoned").insert(user);
    }

    /// Snapshot of everything delivered (or attempted) so far.
    pub fn deliveries(&self) -> Vec<Delivery> {
        self.deliveries.lock().expect("lock poisoned").clone()
    }

    /// Plain text messages sent to `user`, in order.
    pub fn texts_to(&self, user: UserId) -> Vec<String> {
        self.deliveries()
            .into_iter()
            .filter_map(|d| match d {
                Delivery::Text { user: u, text } if u == user => Some(text),
                _ => None,
            })
            .collect()
    }

    /// Choice lists sent to `user`, in order.
    pub fn choices_to(&self, user: UserId) -> Vec<Vec<Choice>> {
        self.deliveries()
            .into_iter()
            .filter_map(|d| match d {
                Delivery::Choices { user: u, choices, .. } if u == user => Some(choices),
                _ => None,
            })
            .collect()
    }

    /// Ack texts recorded so far, in order.
    pub fn acks(&self) -> Vec<Option<String>> {
        self.deliveries()
            .into_iter()
            .filter_map(|d| match d {
                Delivery::Ack { text, .. } => Some(text),
                _ => None,
            })
            .collect()
    }

    fn record(&self, delivery: Delivery) {
        self.deliveries.lock().expect("lock poisoned").push(delivery);
    }

    fn should_fail(&self, user: UserId) -> bool {
        self.fail_for.lock().expect("lock poisoned").contains(&user)
    }
}

#[async_trait]
impl Notifier for RecordingNotifier {
    async fn send_text(&self, user: UserId, text: &str) -> Result<(), FarebotError> {
        self.record(Delivery::Text {
            user,
            text: text.to_string(),
        });
        if self.should_fail(user) {
            return Err(FarebotError::Channel {
                message: format!("simulated delivery failure to {user}"),
                source: None,
            });
        }
        Ok(())
    }

    async fn send_choices(
        &self,
        user: UserId,
        text: &str,
        choices: &[Choice],
    ) -> Result<(), FarebotError> {
        self.record(Delivery::Choices {
            user,
            text: text.to_string(),
            choices: choices.to_vec(),
        });
        if self.should_fail(user) {
            return Err(FarebotError::Channel {
                message: format!("simulated delivery failure to {user}"),
                source: None,
            });
        }
        Ok(())
    }

    async fn ack(&self, event_id: &str, text: Option<&str>) -> Result<(), FarebotError> {
        self.record(Delivery::Ack {
            event_id: event_id.to_string(),
            text: text.map(String::from),
        });
        Ok(())
    }
}

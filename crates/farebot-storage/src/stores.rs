// SPDX-FileCopyrightText: 2026 Farebot Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Trait implementations binding the engine's store seams to SQLite.
//!
//! One [`SqliteStore`] serves all four store traits; clones share the same
//! underlying connection, so the single-writer guarantees carry over.

use std::sync::Arc;

use async_trait::async_trait;
use farebot_core::{
    Booking, BookingStore, FarebotError, RosterStore, Session, SessionStore, SubscriberStore,
    UserId, Vehicle,
};

use crate::database::Database;
use crate::queries;

#[derive(Clone)]
pub struct SqliteStore {
    db: Arc<Database>,
}

impl SqliteStore {
    pub fn new(db: Arc<Database>) -> Self {
        Self { db }
    }
}

#[async_trait]
impl RosterStore for SqliteStore {
    async fn all(&self) -> Result<Vec<Vehicle>, FarebotError> {
        queries::vehicles::list_vehicles(&self.db).await
    }

    async fn get(&self, id: &str) -> Result<Option<Vehicle>, FarebotError> {
        queries::vehicles::get_vehicle(&self.db, id).await
    }

    async fn upsert(&self, vehicle: Vehicle) -> Result<(), FarebotError> {
        queries::vehicles::upsert_vehicle(&self.db, &vehicle).await
    }

    async fn reserve_seats(&self, vehicle_id: &str, pax: u32) -> Result<u32, FarebotError> {
        queries::vehicles::reserve_seats(&self.db, vehicle_id, pax).await
    }

    async fn release_seats(&self, vehicle_id: &str, pax: u32) -> Result<(), FarebotError> {
        queries::vehicles::release_seats(&self.db, vehicle_id, pax).await
    }
}

#[async_trait]
impl BookingStore for SqliteStore {
    async fn append(&self, booking: Booking) -> Result<(), FarebotError> {
        queries::bookings::insert_booking(&self.db, &booking).await
    }

    async fn all(&self) -> Result<Vec<Booking>, FarebotError> {
        queries::bookings::list_bookings(&self.db).await
    }
}

#[async_trait]
impl SessionStore for SqliteStore {
    async fn get(&self, user: UserId) -> Result<Option<Session>, FarebotError> {
        queries::sessions::get_session(&self.db, user).await
    }

    async fn put(&self, user: UserId, session: Session) -> Result<(), FarebotError> {
        queries::sessions::put_session(&self.db, user, &session).await
    }

    async fn remove(&self, user: UserId) -> Result<(), FarebotError> {
        queries::sessions::delete_session(&self.db, user).await
    }
}

#[async_trait]
impl SubscriberStore for SqliteStore {
    async fn add(&self, user: UserId) -> Result<(), FarebotError> {
        queries::subscribers::add_subscriber(&self.db, user).await
    }

    async fn all(&self) -> Result<Vec<UserId>, FarebotError> {
        queries::subscribers::list_subscribers(&self.db).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use farebot_core::{Driver, ServiceDirection};
    use tempfile::tempdir;

    #[tokio::test]
    async fn roster_store_reserves_through_sqlite() {
        let dir = tempdir().unwrap();
        let db_path = dir.path().join("test.db");
        let db = Arc::new(Database::open(db_path.to_str().unwrap()).await.unwrap());
        let store = SqliteStore::new(db);

        RosterStore::upsert(
            &store,
            Vehicle {
                id: "bus-1".to_string(),
                name: "Morning Express".to_string(),
                route: vec!["Station A".to_string(), "Station B".to_string()],
                times: vec!["07:45".to_string()],
                capacity: 5,
                service: ServiceDirection::Both,
                driver: Driver {
                    name: "Dana".to_string(),
                    phone: "555-0100".to_string(),
                },
            },
        )
        .await
        .unwrap();

        assert_eq!(store.reserve_seats("bus-1", 2).await.unwrap(), 3);
        assert_eq!(
            RosterStore::get(&store, "bus-1").await.unwrap().unwrap().capacity,
            3
        );
    }
}

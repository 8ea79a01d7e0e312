// SPDX-FileCopyrightText: 2026 Farebot Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Adapter trait definitions for the Farebot collaborator boundaries.
//!
//! The engine only sees these traits; production wiring supplies the SQLite
//! stores and the Telegram notifier, tests supply in-memory doubles.

pub mod notifier;
pub mod store;

pub use notifier::Notifier;
pub use store::{BookingStore, RosterStore, SessionStore, SubscriberStore};

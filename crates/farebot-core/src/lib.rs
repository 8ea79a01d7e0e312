// SPDX-FileCopyrightText: 2026 Farebot Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Core library for the Farebot booking assistant.
//!
//! This crate provides the shared error type, domain model types (vehicles,
//! bookings, sessions, queries), clock utilities, and the adapter traits
//! implemented by the storage and messaging layers.

pub mod error;
pub mod time;
pub mod traits;
pub mod types;

// Re-export key items at crate root for ergonomic imports.
pub use error::FarebotError;
pub use types::{
    Booking, CallbackAction, Choice, Driver, FlowStep, Query, QueryDraft, ServiceDirection,
    Session, UserId, UserRef, Vehicle,
};

pub use traits::{BookingStore, Notifier, RosterStore, SessionStore, SubscriberStore};

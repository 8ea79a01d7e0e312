// SPDX-FileCopyrightText: 2026 Farebot Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! SQLite persistence layer for the Farebot booking assistant.
//!
//! Provides WAL-mode SQLite storage with embedded migrations, a single-writer
//! concurrency model via `tokio-rusqlite`, and typed queries for the vehicle
//! roster, bookings, sessions, and broadcast subscribers. Seat reservation is
//! a conditional decrement executed on the writer thread, which is what keeps
//! capacity from ever going negative under concurrent confirmations.

pub mod database;
pub mod migrations;
mod models;
pub mod queries;
pub mod stores;

pub use database::Database;
pub use stores::SqliteStore;

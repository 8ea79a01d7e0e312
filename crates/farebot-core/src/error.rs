// SPDX-FileCopyrightText: 2026 Farebot Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Error types for the Farebot booking assistant.

use thiserror::Error;

/// The primary error type used across all Farebot crates.
///
/// None of these variants are expected to crash the process; the event loop
/// logs them and continues. Fatal-at-startup is reserved for missing required
/// configuration, handled in the binary before the loop starts.
#[derive(Debug, Error)]
pub enum FarebotError {
    /// Configuration errors (invalid TOML, missing required fields, type mismatches).
    #[error("configuration error: {0}")]
    Config(String),

    /// Storage backend errors (database open, query failure, serialization).
    #[error("storage error: {source}")]
    Storage {
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// Messaging transport errors (delivery failure, malformed payloads, rate limiting).
    #[error("channel error: {message}")]
    Channel {
        message: String,
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Malformed step input. Always recoverable: the flow re-prompts in place.
    #[error("validation error: {0}")]
    Validation(String),

    /// A selection or confirmation referenced a session that no longer exists.
    /// Recoverable only by restarting the flow.
    #[error("session expired")]
    SessionExpired,

    /// The vehicle vanished from the roster between presentation and action.
    #[error("vehicle unavailable: {vehicle_id}")]
    VehicleUnavailable { vehicle_id: String },

    /// Capacity changed between matching and confirmation. The session is kept
    /// so the user can pick a different option.
    #[error("insufficient capacity: requested {requested}, available {available}")]
    InsufficientCapacity { requested: u32, available: u32 },

    /// Admin surface shared-secret mismatch. Rejected before any mutation.
    #[error("unauthorized")]
    Unauthorized,

    /// Internal or unexpected errors.
    #[error("internal error: {0}")]
    Internal(String),
}

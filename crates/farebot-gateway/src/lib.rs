// SPDX-FileCopyrightText: 2026 Farebot Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Admin HTTP gateway for the Farebot booking assistant.
//!
//! Exposes a small REST surface over the engine: direct and broadcast
//! message delivery, roster inspection and upserts, and an unauthenticated
//! health probe. Everything except `/health` requires the shared admin
//! token.

pub mod auth;
pub mod handlers;
pub mod server;

pub use auth::AuthConfig;
pub use server::{router, start_server, GatewayState, ServerConfig};

// SPDX-FileCopyrightText: 2026 Farebot Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Outbound notification boundary.

use async_trait::async_trait;

use crate::error::FarebotError;
use crate::types::{Choice, UserId};

/// Delivers text and selectable choices to users, and acknowledges
/// selection events back to the transport.
///
/// The core requires exactly these three primitives plus per-call failure
/// reporting; everything else about the transport (retries, rendering,
/// rate limits) stays behind this trait.
#[async_trait]
pub trait Notifier: Send + Sync {
    /// Send plain text to a single user.
    async fn send_text(&self, user: UserId, text: &str) -> Result<(), FarebotError>;

    /// Send text accompanied by a list of labeled selectable actions.
    async fn send_choices(
        &self,
        user: UserId,
        text: &str,
        choices: &[Choice],
    ) -> Result<(), FarebotError>;

    /// Acknowledge a selection event, optionally with a short notice.
    async fn ack(&self, event_id: &str, text: Option<&str>) -> Result<(), FarebotError>;
}

// SPDX-FileCopyrightText: 2026 Farebot Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Rate-limited broadcast delivery to the subscriber set.
//!
//! Recipients are deduplicated and delivered in batches with a configurable
//! inter-batch delay. A failed send is captured in that recipient's report
//! and never aborts the rest of the batch or the run.

use std::collections::HashSet;
use std::time::Duration;

use farebot_core::{Notifier, UserId};
use serde::Serialize;
use tracing::warn;

/// Outcome of one broadcast delivery attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum DeliveryStatus {
    Ok,
    Error,
}

/// Per-recipient broadcast result, serialized into the admin API response.
#[derive(Debug, Clone, Serialize)]
pub struct DeliveryReport {
    pub id: i64,
    pub status: DeliveryStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

/// Broadcast `text` to `targets` in batches of `batch_size`, sleeping `delay`
/// between batches (but not after the last one).
///
/// Sends within a batch run concurrently; batches are strictly sequential.
/// Returns one report per deduplicated recipient, in batch order.
pub async fn broadcast(
    notifier: &dyn Notifier,
    targets: &[UserId],
    text: &str,
    batch_size: usize,
    delay: Duration,
) -> Vec<DeliveryReport> {
    let mut seen = HashSet::new();
    let targets: Vec<UserId> = targets
        .iter()
        .copied()
        .filter(|u| seen.insert(*u))
        .collect();

    let batch_size = batch_size.max(1);
    let batches: Vec<&[UserId]> = targets.chunks(batch_size).collect();
    let total = batches.len();

    let mut reports = Vec::with_capacity(targets.len());
    for (i, batch) in batches.into_iter().enumerate() {
        let sends = batch.iter().map(|&user| async move {
            match notifier.send_text(user, text).await {
                Ok(()) => DeliveryReport {
                    id: user.0,
                    status: DeliveryStatus::Ok,
                    message: None,
                },
                Err(e) => {
                    warn!(user = %user, error = %e, "broadcast delivery failed");
                    DeliveryReport {
                        id: user.0,
                        status: DeliveryStatus::Error,
                        message: Some(e.to_string()),
                    }
                }
            }
        });
        reports.extend(futures::future::join_all(sends).await);

        if i + 1 < total {
            tokio::time::sleep(delay).await;
        }
    }

    reports
}

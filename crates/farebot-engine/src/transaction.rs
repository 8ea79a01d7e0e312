// SPDX-FileCopyrightText: 2026 Farebot Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! The confirm step: re-validate, reserve seats, record the booking.
//!
//! Capacity is re-checked and decremented in a single atomic store operation
//! (`RosterStore::reserve_seats`), so two confirmations racing for the same
//! vehicle can never both succeed past the remaining seats.

use chrono::Utc;
use farebot_core::{Booking, FarebotError, UserRef};
use tracing::{info, warn};
use uuid::Uuid;

use crate::flow::MSG_SESSION_EXPIRED;
use crate::Engine;

impl Engine {
    /// Confirm a booking for the vehicle the user selected.
    ///
    /// Fast-fail checkpoints, in order: live session with a completed query;
    /// vehicle still in the roster; enough seats left. The first two clear
    /// nothing and require a restart; a capacity failure keeps the session so
    /// the user can pick another of the still-presented options.
    pub(crate) async fn confirm_booking(
        &self,
        user: &UserRef,
        vehicle_id: &str,
        event_id: &str,
    ) -> Result<(), FarebotError> {
        let session = self.sessions().get(user.id).await?;
        let Some(session) = session else {
            return self.notifier().ack(event_id, Some(MSG_SESSION_EXPIRED)).await;
        };
        let Some(query) = session.draft.complete() else {
            return self.notifier().ack(event_id, Some(MSG_SESSION_EXPIRED)).await;
        };

        let Some(vehicle) = self.roster().get(vehicle_id).await? else {
            return self
                .notifier()
                .ack(event_id, Some("Selected bus not found."))
                .await;
        };

        let remaining = match self.roster().reserve_seats(vehicle_id, query.pax).await {
            Ok(remaining) => remaining,
            Err(FarebotError::InsufficientCapacity { .. }) => {
                // Session intentionally kept: the options list is still on
                // screen and another choice may fit.
                self.notifier()
                    .ack(event_id, Some("Not enough seats available."))
                    .await?;
                return self
                    .notifier()
                    .send_text(
                        user.id,
                        "Sorry - that bus no longer has enough seats. Try another option.",
                    )
                    .await;
            }
            Err(FarebotError::VehicleUnavailable { .. }) => {
                return self
                    .notifier()
                    .ack(event_id, Some("Selected bus not found."))
                    .await;
            }
            Err(e) => return Err(e),
        };

        let booking = Booking {
            id: format!("bk-{}", Uuid::new_v4()),
            user_id: user.id,
            user_name: session.user_name.clone(),
            vehicle_id: vehicle.id.clone(),
            vehicle_name: vehicle.name.clone(),
            driver: vehicle.driver.clone(),
            start: query.start.clone(),
            end: query.end.clone(),
            time: query.time.clone(),
            pax: query.pax,
            need_both: query.need_both,
            created_at: Utc::now(),
        };

        if let Err(e) = self.bookings().append(booking.clone()).await {
            // Hand the seats back so a failed write does not shrink the bus.
            if let Err(release_err) = self.roster().release_seats(vehicle_id, query.pax).await {
                warn!(
                    vehicle = vehicle_id,
                    error = %release_err,
                    "failed to return seats after booking write error"
                );
            }
            return Err(e);
        }
        self.sessions().remove(user.id).await?;

        info!(
            booking = %booking.id,
            user = %user.id,
            vehicle = %booking.vehicle_id,
            pax = booking.pax,
            seats_left = remaining,
            "booking confirmed"
        );

        self.notifier()
            .ack(event_id, Some("Booking confirmed."))
            .await?;
        self.notifier()
            .send_text(
                user.id,
                &format!(
                    "Booking confirmed!\nBooking ID: {}\nDriver: {} ({})\nWe notified the admin.",
                    booking.id, booking.driver.name, booking.driver.phone
                ),
            )
            .await?;

        // Best-effort admin summary: a delivery failure is logged only and
        // never rolls back the booking.
        if let Some(admin) = self.config().admin_chat {
            let summary = format!(
                "New booking: {}\nUser: {} (chat {})\nBus: {} ({})\nDriver: {} {}\nRoute: {} -> {}\nTime: {}\nPax: {}\nBoth up+down: {}\nCreated: {}",
                booking.id,
                booking.user_name,
                booking.user_id,
                booking.vehicle_name,
                booking.vehicle_id,
                booking.driver.name,
                booking.driver.phone,
                booking.start,
                booking.end,
                booking.time,
                booking.pax,
                if booking.need_both { "Yes" } else { "No" },
                booking.created_at.to_rfc3339(),
            );
            if let Err(e) = self.notifier().send_text(admin, &summary).await {
                warn!(error = %e, "failed to notify admin channel of booking");
            }
        }

        Ok(())
    }
}

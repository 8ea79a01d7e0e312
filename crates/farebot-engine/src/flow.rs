// SPDX-FileCopyrightText: 2026 Farebot Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! The multi-step conversation state machine.
//!
//! Each inbound text message or selection event advances exactly one user's
//! session. Transitions follow a strict linear order; invalid input
//! re-prompts in place without writing any field or advancing. The session
//! write always completes before the reply is sent, so a delayed transport
//! can never leave a half-written session behind.

use farebot_core::time::parse_clock;
use farebot_core::{
    CallbackAction, Choice, FarebotError, FlowStep, Session, UserRef, Vehicle,
};
use tracing::{debug, info};

use crate::matcher;
use crate::Engine;

/// Phrases that start a booking flow, recognized only while idle.
const INITIATING_PHRASES: [&str; 3] = ["ser", "search", "book"];

/// Phrase that abandons the flow from any step. Takes precedence over
/// step-specific validation.
const CANCEL_PHRASE: &str = "cancel";

const MSG_FALLBACK: &str =
    "Sorry, I didn't understand that. Type \"help\" to see options, or \"ser\" to search for a bus.";
const MSG_ASK_START: &str = "Where is your START location? (Type street / stop name)";
const MSG_ASK_END: &str = "Where is your END location? (Type street / stop name)";
const MSG_ASK_TIME: &str = "At what time do you need the bus? (HH:MM, 24h - e.g. 07:30)";
const MSG_ASK_PAX: &str = "How many passengers (pax)? Enter a number.";
const MSG_ASK_BOTH: &str = "Do you need both up and down services? (yes/no)";
const MSG_BAD_TIME: &str = "Please provide time in HH:MM format (e.g. 07:30).";
const MSG_BAD_PAX: &str = "Please provide a valid number of passengers (e.g. 2).";
const MSG_BAD_BOTH: &str = "Reply \"yes\" or \"no\".";
const MSG_SEARCHING: &str = "Searching for matching buses...";
const MSG_NO_MATCHES: &str = "No matching buses found for your request. You can try changing time, route or pax. Type \"ser\" to start again.";
const MSG_CANCELLED: &str = "Flow cancelled. Type \"ser\" to search for services.";
const MSG_BOOKING_CANCELLED: &str = "Booking cancelled. Type \"ser\" to start again.";
const MSG_USE_BUTTONS: &str =
    "Please use the buttons above to continue, or type \"cancel\" to start over.";
pub(crate) const MSG_SESSION_EXPIRED: &str = "Session expired. Start again with \"ser\".";

impl Engine {
    /// Handle one inbound text message from `user`.
    ///
    /// A returned error means the direct reply to this user failed to send;
    /// session state has already been updated consistently by that point.
    pub async fn handle_text(&self, user: &UserRef, text: &str) -> Result<(), FarebotError> {
        let text = text.trim();
        let lower = text.to_lowercase();

        // Global cancel wins over everything, including step validators.
        if lower == CANCEL_PHRASE {
            self.sessions().remove(user.id).await?;
            return self.notifier().send_text(user.id, MSG_CANCELLED).await;
        }

        if self.handle_command(user, text, &lower).await? {
            return Ok(());
        }

        match self.sessions().get(user.id).await? {
            None => {
                if INITIATING_PHRASES.contains(&lower.as_str()) {
                    let session = Session::start(&user.display_name);
                    self.sessions().put(user.id, session).await?;
                    debug!(user = %user.id, "booking flow started");
                    self.notifier().send_text(user.id, MSG_ASK_START).await
                } else {
                    self.notifier().send_text(user.id, MSG_FALLBACK).await
                }
            }
            Some(session) => self.advance_step(user, session, text, &lower).await,
        }
    }

    /// Handle one decoded selection event from `user`.
    pub async fn handle_action(
        &self,
        user: &UserRef,
        action: &CallbackAction,
        event_id: &str,
    ) -> Result<(), FarebotError> {
        match action {
            CallbackAction::Cancel => {
                self.sessions().remove(user.id).await?;
                self.notifier().ack(event_id, Some("Cancelled.")).await?;
                self.notifier()
                    .send_text(user.id, MSG_BOOKING_CANCELLED)
                    .await
            }
            CallbackAction::Select(vehicle_id) => {
                self.handle_select(user, vehicle_id, event_id).await
            }
            CallbackAction::Confirm(vehicle_id) => {
                self.confirm_booking(user, vehicle_id, event_id).await
            }
        }
    }

    /// Built-in commands available outside and inside a flow.
    /// Returns `true` when the text was consumed as a command.
    async fn handle_command(
        &self,
        user: &UserRef,
        text: &str,
        lower: &str,
    ) -> Result<bool, FarebotError> {
        if text == "/start" {
            self.subscribers().add(user.id).await?;
            info!(user = %user.id, "subscriber registered");
            self.notifier()
                .send_text(
                    user.id,
                    "Welcome! You're now subscribed to the bus service updates. Send \"help\" for commands.",
                )
                .await?;
            return Ok(true);
        }

        if lower == "help" {
            let reply = [
                "Commands:",
                "/start - subscribe",
                "help - show commands",
                "status - app status",
                "ser - find bus service and book",
                "cancel - cancel current flow",
                "/report <text> - send report to admins",
            ]
            .join("\n");
            self.notifier().send_text(user.id, &reply).await?;
            return Ok(true);
        }

        if lower == "status" {
            self.notifier()
                .send_text(user.id, "All systems operational.")
                .await?;
            return Ok(true);
        }

        if lower == "/report" || lower.starts_with("/report ") {
            let body = text["/report".len()..].trim();
            let body = if body.is_empty() { "(no text)" } else { body };
            match self.config().admin_chat {
                Some(admin) => {
                    let payload = format!(
                        "Report from {} (id:{}):\n{body}",
                        user.display_name, user.id
                    );
                    self.notifier().send_text(admin, &payload).await?;
                    self.notifier()
                        .send_text(user.id, "Thanks - your report was forwarded to the admins.")
                        .await?;
                }
                None => {
                    self.notifier()
                        .send_text(user.id, "Admin chat not configured.")
                        .await?;
                }
            }
            return Ok(true);
        }

        Ok(false)
    }

    /// Advance a live session by one text input according to its step.
    async fn advance_step(
        &self,
        user: &UserRef,
        mut session: Session,
        text: &str,
        lower: &str,
    ) -> Result<(), FarebotError> {
        match session.step {
            FlowStep::AwaitingStart => {
                if text.is_empty() {
                    return self.notifier().send_text(user.id, MSG_ASK_START).await;
                }
                session.draft.start = Some(text.to_string());
                session.step = FlowStep::AwaitingEnd;
                self.sessions().put(user.id, session).await?;
                self.notifier().send_text(user.id, MSG_ASK_END).await
            }
            FlowStep::AwaitingEnd => {
                if text.is_empty() {
                    return self.notifier().send_text(user.id, MSG_ASK_END).await;
                }
                session.draft.end = Some(text.to_string());
                session.step = FlowStep::AwaitingTime;
                self.sessions().put(user.id, session).await?;
                self.notifier().send_text(user.id, MSG_ASK_TIME).await
            }
            FlowStep::AwaitingTime => {
                if parse_clock(text).is_none() {
                    return self.notifier().send_text(user.id, MSG_BAD_TIME).await;
                }
                session.draft.time = Some(text.to_string());
                session.step = FlowStep::AwaitingPax;
                self.sessions().put(user.id, session).await?;
                self.notifier().send_text(user.id, MSG_ASK_PAX).await
            }
            FlowStep::AwaitingPax => {
                let digits: String = text.chars().filter(|c| c.is_ascii_digit()).collect();
                match digits.parse::<u32>() {
                    Ok(pax) if pax > 0 => {
                        session.draft.pax = Some(pax);
                        session.step = FlowStep::AwaitingBoth;
                        self.sessions().put(user.id, session).await?;
                        self.notifier().send_text(user.id, MSG_ASK_BOTH).await
                    }
                    _ => self.notifier().send_text(user.id, MSG_BAD_PAX).await,
                }
            }
            FlowStep::AwaitingBoth => {
                let need_both = match lower {
                    "y" | "yes" => true,
                    "n" | "no" => false,
                    _ => return self.notifier().send_text(user.id, MSG_BAD_BOTH).await,
                };
                session.draft.need_both = Some(need_both);
                session.user_name = user.display_name.clone();
                self.run_search(user, session).await
            }
            // Waiting on a selection event; text has no validator here.
            FlowStep::PresentingOptions | FlowStep::Confirming => {
                self.notifier().send_text(user.id, MSG_USE_BUTTONS).await
            }
        }
    }

    /// Run the matcher against the current roster and present the results.
    async fn run_search(&self, user: &UserRef, mut session: Session) -> Result<(), FarebotError> {
        let Some(query) = session.draft.complete() else {
            // A session cannot reach this point with holes in its draft
            // unless storage was tampered with; restart cleanly.
            self.sessions().remove(user.id).await?;
            return self.notifier().send_text(user.id, MSG_SESSION_EXPIRED).await;
        };

        self.notifier().send_text(user.id, MSG_SEARCHING).await?;

        let roster = self.roster().all().await?;
        let matches = matcher::find_vehicles(&query, &roster);
        info!(
            user = %user.id,
            start = %query.start,
            end = %query.end,
            time = %query.time,
            pax = query.pax,
            matches = matches.len(),
            "search completed"
        );

        if matches.is_empty() {
            self.sessions().remove(user.id).await?;
            return self.notifier().send_text(user.id, MSG_NO_MATCHES).await;
        }

        session.step = FlowStep::PresentingOptions;
        self.sessions().put(user.id, session).await?;

        let mut choices: Vec<Choice> = matches
            .iter()
            .map(|vehicle| Choice {
                label: format!(
                    "{} - driver {} ({}) - seats {}",
                    vehicle.name, vehicle.driver.name, vehicle.driver.phone, vehicle.capacity
                ),
                action: CallbackAction::Select(vehicle.id.clone()),
            })
            .collect();
        choices.push(Choice {
            label: "Cancel".into(),
            action: CallbackAction::Cancel,
        });

        let text = format!("Found {} option(s). Please choose one:", matches.len());
        self.notifier().send_choices(user.id, &text, &choices).await
    }

    /// A vehicle was selected from the presented options: show the booking
    /// summary with confirm/cancel actions.
    async fn handle_select(
        &self,
        user: &UserRef,
        vehicle_id: &str,
        event_id: &str,
    ) -> Result<(), FarebotError> {
        let session = self.sessions().get(user.id).await?;
        let Some(mut session) = session.filter(|s| s.draft.complete().is_some()) else {
            return self.notifier().ack(event_id, Some(MSG_SESSION_EXPIRED)).await;
        };

        let Some(vehicle) = self.roster().get(vehicle_id).await? else {
            return self
                .notifier()
                .ack(event_id, Some("Bus no longer available."))
                .await;
        };

        // The draft was checked above; re-reading fields is infallible here.
        let Some(query) = session.draft.complete() else {
            return self.notifier().ack(event_id, Some(MSG_SESSION_EXPIRED)).await;
        };

        session.step = FlowStep::Confirming;
        self.sessions().put(user.id, session).await?;

        let summary = format!(
            "You selected:\n{}\n\nPassengers: {}\nJourney: {} -> {}\nRequested time: {}\nNeeds both up+down: {}",
            describe_vehicle(&vehicle),
            query.pax,
            query.start,
            query.end,
            query.time,
            if query.need_both { "Yes" } else { "No" },
        );

        let choices = [
            Choice {
                label: "Confirm booking".into(),
                action: CallbackAction::Confirm(vehicle.id.clone()),
            },
            Choice {
                label: "Cancel".into(),
                action: CallbackAction::Cancel,
            },
        ];

        self.notifier().ack(event_id, None).await?;
        self.notifier()
            .send_choices(user.id, &summary, &choices)
            .await
    }
}

/// Multi-line description of a vehicle, used in option summaries.
pub(crate) fn describe_vehicle(vehicle: &Vehicle) -> String {
    format!(
        "{}\nRoute: {}\nTimes: {}\nCapacity left: {}\nDriver: {} ({})",
        vehicle.name,
        vehicle.route.join(" -> "),
        vehicle.times.join(", "),
        vehicle.capacity,
        vehicle.driver.name,
        vehicle.driver.phone,
    )
}

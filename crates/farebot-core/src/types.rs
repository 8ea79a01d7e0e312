// SPDX-FileCopyrightText: 2026 Farebot Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Domain model types shared across the Farebot workspace.

use serde::{Deserialize, Serialize};
use std::fmt;
use strum::{Display, EnumString};

/// Identity of a messaging-platform user (the chat id on Telegram).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserId(pub i64);

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Identity snapshot as delivered by the transport with each event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserRef {
    pub id: UserId,
    pub display_name: String,
}

/// Contact details for the driver assigned to a vehicle.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Driver {
    pub name: String,
    pub phone: String,
}

/// Which direction(s) a vehicle serves on its route.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Display, EnumString, Serialize, Deserialize,
)]
#[strum(serialize_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum ServiceDirection {
    Up,
    Down,
    Both,
}

/// A roster entry: a scheduled vehicle with a fixed route and timetable.
///
/// `capacity` is the number of seats currently available. It is decremented by
/// bookings and can never go negative: the only mutation path is the atomic
/// [`RosterStore::reserve_seats`](crate::traits::RosterStore::reserve_seats).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Vehicle {
    pub id: String,
    pub name: String,
    /// Ordered stop names; travel direction follows the sequence.
    pub route: Vec<String>,
    /// Scheduled departures as `HH:MM` strings.
    pub times: Vec<String>,
    pub capacity: u32,
    pub service: ServiceDirection,
    pub driver: Driver,
}

/// A fully specified search request, consumed atomically by the matcher.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Query {
    pub start: String,
    pub end: String,
    /// Requested departure, `HH:MM`.
    pub time: String,
    pub pax: u32,
    pub need_both: bool,
}

/// The query under construction, filled one field per conversation step.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct QueryDraft {
    #[serde(default)]
    pub start: Option<String>,
    #[serde(default)]
    pub end: Option<String>,
    #[serde(default)]
    pub time: Option<String>,
    #[serde(default)]
    pub pax: Option<u32>,
    #[serde(default)]
    pub need_both: Option<bool>,
}

impl QueryDraft {
    /// Returns the completed query once every field has been collected.
    pub fn complete(&self) -> Option<Query> {
        Some(Query {
            start: self.start.clone()?,
            end: self.end.clone()?,
            time: self.time.clone()?,
            pax: self.pax?,
            need_both: self.need_both?,
        })
    }
}

/// Conversation steps, in the order the flow advances through them.
///
/// `PresentingOptions` and `Confirming` are entered by selection events rather
/// than text, and hold a frozen completed draft.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Display, EnumString, Serialize, Deserialize,
)]
#[strum(serialize_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum FlowStep {
    AwaitingStart,
    AwaitingEnd,
    AwaitingTime,
    AwaitingPax,
    AwaitingBoth,
    PresentingOptions,
    Confirming,
}

/// Per-user in-progress booking state. At most one session per user; absence
/// of a session means the user is idle.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    pub step: FlowStep,
    pub draft: QueryDraft,
    /// Display name captured from the transport, copied into the booking.
    pub user_name: String,
}

impl Session {
    /// A fresh session at the first step, with a clean draft.
    pub fn start(user_name: &str) -> Self {
        Self {
            step: FlowStep::AwaitingStart,
            draft: QueryDraft::default(),
            user_name: user_name.to_string(),
        }
    }
}

/// An immutable confirmed reservation. Appended once, never edited.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Booking {
    pub id: String,
    pub user_id: UserId,
    pub user_name: String,
    pub vehicle_id: String,
    pub vehicle_name: String,
    /// Snapshot of the driver at booking time.
    pub driver: Driver,
    pub start: String,
    pub end: String,
    pub time: String,
    pub pax: u32,
    pub need_both: bool,
    pub created_at: chrono::DateTime<chrono::Utc>,
}

/// A selection event payload, decoded once at the transport boundary.
///
/// Wire form is `select:<vehicleId>`, `confirm:<vehicleId>`, or `cancel`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CallbackAction {
    Select(String),
    Confirm(String),
    Cancel,
}

impl CallbackAction {
    /// Decode a raw callback payload. Returns `None` for unknown payloads.
    pub fn parse(data: &str) -> Option<Self> {
        if data == "cancel" {
            return Some(Self::Cancel);
        }
        if let Some(id) = data.strip_prefix("select:")
            && !id.is_empty()
        {
            return Some(Self::Select(id.to_string()));
        }
        if let Some(id) = data.strip_prefix("confirm:")
            && !id.is_empty()
        {
            return Some(Self::Confirm(id.to_string()));
        }
        None
    }
}

impl fmt::Display for CallbackAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Select(id) => write!(f, "select:{id}"),
            Self::Confirm(id) => write!(f, "confirm:{id}"),
            Self::Cancel => write!(f, "cancel"),
        }
    }
}

/// A labeled selectable action presented to the user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Choice {
    pub label: String,
    pub action: CallbackAction,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn callback_action_round_trips() {
        for raw in ["select:bus-1", "confirm:bus-1", "cancel"] {
            let action = CallbackAction::parse(raw).unwrap();
            assert_eq!(action.to_string(), raw);
        }
    }

    #[test]
    fn callback_action_rejects_unknown_payloads() {
        assert_eq!(CallbackAction::parse("select:"), None);
        assert_eq!(CallbackAction::parse("confirm:"), None);
        assert_eq!(CallbackAction::parse("book:bus-1"), None);
        assert_eq!(CallbackAction::parse(""), None);
        assert_eq!(CallbackAction::parse("CANCEL"), None);
    }

    #[test]
    fn draft_completes_only_when_full() {
        let mut draft = QueryDraft::default();
        assert!(draft.complete().is_none());

        draft.start = Some("Station A".into());
        draft.end = Some("Station B".into());
        draft.time = Some("07:30".into());
        draft.pax = Some(3);
        assert!(draft.complete().is_none());

        draft.need_both = Some(true);
        let query = draft.complete().unwrap();
        assert_eq!(query.pax, 3);
        assert!(query.need_both);
    }

    #[test]
    fn service_direction_serde_is_lowercase() {
        let json = serde_json::to_string(&ServiceDirection::Both).unwrap();
        assert_eq!(json, "\"both\"");
        let parsed: ServiceDirection = serde_json::from_str("\"up\"").unwrap();
        assert_eq!(parsed, ServiceDirection::Up);
    }

    #[test]
    fn flow_step_string_round_trip() {
        use std::str::FromStr;
        let step = FlowStep::PresentingOptions;
        let s = step.to_string();
        assert_eq!(s, "presenting_options");
        assert_eq!(FlowStep::from_str(&s).unwrap(), step);
    }

    #[test]
    fn session_start_is_clean() {
        let session = Session::start("alice");
        assert_eq!(session.step, FlowStep::AwaitingStart);
        assert_eq!(session.draft, QueryDraft::default());
        assert_eq!(session.user_name, "alice");
    }
}

// SPDX-FileCopyrightText: 2026 Farebot Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! End-to-end tests of the conversation flow and booking transaction,
//! driven through the engine's public entry points against in-memory
//! stores and a recording notifier.

use std::sync::Arc;
use std::time::Duration;

use farebot_core::{
    BookingStore, CallbackAction, Driver, FarebotError, RosterStore, ServiceDirection,
    SessionStore, SubscriberStore, UserId, UserRef, Vehicle,
};
use farebot_engine::memory::{
    Delivery, MemoryBookings, MemoryRoster, MemorySessions, MemorySubscribers, RecordingNotifier,
};
use farebot_engine::{Engine, EngineConfig};

struct Harness {
    engine: Engine,
    notifier: Arc<RecordingNotifier>,
    roster: Arc<MemoryRoster>,
    bookings: Arc<MemoryBookings>,
    sessions: Arc<MemorySessions>,
    subscribers: Arc<MemorySubscribers>,
}

fn harness(vehicles: Vec<Vehicle>, admin_chat: Option<UserId>) -> Harness {
    let roster = Arc::new(MemoryRoster::new(vehicles));
    let bookings = Arc::new(MemoryBookings::default());
    let sessions = Arc::new(MemorySessions::default());
    let subscribers = Arc::new(MemorySubscribers::default());
    let notifier = Arc::new(RecordingNotifier::new());

    let engine = Engine::new(
        roster.clone(),
        bookings.clone(),
        sessions.clone(),
        subscribers.clone(),
        notifier.clone(),
        EngineConfig {
            admin_chat,
            broadcast_batch_size: 20,
            broadcast_batch_delay: Duration::from_millis(0),
        },
    );

    Harness {
        engine,
        notifier,
        roster,
        bookings,
        sessions,
        subscribers,
    }
}

fn user(id: i64, name: &str) -> UserRef {
    UserRef {
        id: UserId(id),
        display_name: name.to_string(),
    }
}

fn station_bus() -> Vehicle {
    Vehicle {
        id: "bus-1".into(),
        name: "Morning Express".into(),
        route: vec!["Station A".into(), "Station B".into()],
        times: vec!["07:45".into()],
        capacity: 5,
        service: ServiceDirection::Both,
        driver: Driver {
            name: "Dana".into(),
            phone: "555-0100".into(),
        },
    }
}

/// Drive one user through the whole text flow up to the options list.
async fn run_search(h: &Harness, u: &UserRef, inputs: &[&str]) {
    for input in inputs {
        h.engine.handle_text(u, input).await.unwrap();
    }
}

#[tokio::test]
async fn full_booking_scenario() {
    let h = harness(vec![station_bus()], None);
    let alice = user(1, "alice");

    run_search(
        &h,
        &alice,
        &["ser", "Station A", "Station B", "07:30", "3", "yes"],
    )
    .await;

    // Exactly one option plus the cancel choice.
    let presented = h.notifier.choices_to(alice.id);
    assert_eq!(presented.len(), 1);
    let choices = &presented[0];
    assert_eq!(choices.len(), 2);
    assert_eq!(choices[0].action, CallbackAction::Select("bus-1".into()));
    assert!(choices[0].label.contains("Morning Express"));
    assert!(choices[0].label.contains("Dana"));
    assert!(choices[0].label.contains("5"));
    assert_eq!(choices[1].action, CallbackAction::Cancel);

    // Select, then confirm.
    h.engine
        .handle_action(&alice, &CallbackAction::Select("bus-1".into()), "cq-1")
        .await
        .unwrap();
    let summary_choices = &h.notifier.choices_to(alice.id)[1];
    assert_eq!(
        summary_choices[0].action,
        CallbackAction::Confirm("bus-1".into())
    );

    h.engine
        .handle_action(&alice, &CallbackAction::Confirm("bus-1".into()), "cq-2")
        .await
        .unwrap();

    let bookings = h.bookings.all().await.unwrap();
    assert_eq!(bookings.len(), 1);
    let booking = &bookings[0];
    assert_eq!(booking.pax, 3);
    assert_eq!(booking.vehicle_id, "bus-1");
    assert_eq!(booking.user_name, "alice");
    assert!(booking.need_both);
    assert!(booking.id.starts_with("bk-"));

    // Capacity reduced, session back to idle.
    assert_eq!(h.roster.get("bus-1").await.unwrap().unwrap().capacity, 2);
    assert!(h.sessions.get(alice.id).await.unwrap().is_none());

    let confirmation = h.notifier.texts_to(alice.id);
    assert!(confirmation.iter().any(|t| t.contains("Booking confirmed!")));
}

#[tokio::test]
async fn invalid_step_inputs_reprompt_without_advancing() {
    let h = harness(vec![station_bus()], None);
    let bob = user(2, "bob");

    run_search(&h, &bob, &["ser", "Station A", "Station B"]).await;

    // Bad time shapes and out-of-range values are re-prompted.
    for bad in ["7:3", "25:00", "noon", "12:60"] {
        h.engine.handle_text(&bob, bad).await.unwrap();
        let texts = h.notifier.texts_to(bob.id);
        assert!(texts.last().unwrap().contains("HH:MM"), "rejected: {bad}");
    }

    h.engine.handle_text(&bob, "07:30").await.unwrap();

    // Bad pax values are re-prompted; digits embedded in text are accepted.
    for bad in ["zero", "0", "-"] {
        h.engine.handle_text(&bob, bad).await.unwrap();
        let texts = h.notifier.texts_to(bob.id);
        assert!(
            texts.last().unwrap().contains("valid number"),
            "rejected: {bad}"
        );
    }
    h.engine.handle_text(&bob, "3 people").await.unwrap();

    // Bad yes/no answers are re-prompted.
    h.engine.handle_text(&bob, "maybe").await.unwrap();
    let texts = h.notifier.texts_to(bob.id);
    assert!(texts.last().unwrap().contains("\"yes\" or \"no\""));

    h.engine.handle_text(&bob, "NO").await.unwrap();
    let presented = h.notifier.choices_to(bob.id);
    assert_eq!(presented.len(), 1, "search should have run after yes/no");
}

#[tokio::test]
async fn initiating_phrase_mid_flow_is_plain_input() {
    let h = harness(vec![station_bus()], None);
    let carol = user(3, "carol");

    h.engine.handle_text(&carol, "ser").await.unwrap();
    // "ser" is only an initiating phrase from idle; here it becomes the
    // start stop.
    h.engine.handle_text(&carol, "ser").await.unwrap();

    let session = h.sessions.get(carol.id).await.unwrap().unwrap();
    assert_eq!(session.draft.start.as_deref(), Some("ser"));
}

#[tokio::test]
async fn cancel_phrase_clears_session_from_any_step() {
    let h = harness(vec![station_bus()], None);
    let dave = user(4, "dave");

    run_search(&h, &dave, &["ser", "Station A", "Station B", "07:30"]).await;
    assert!(h.sessions.get(dave.id).await.unwrap().is_some());

    h.engine.handle_text(&dave, "CANCEL").await.unwrap();
    assert!(h.sessions.get(dave.id).await.unwrap().is_none());
    let texts = h.notifier.texts_to(dave.id);
    assert!(texts.last().unwrap().contains("cancelled"));
}

#[tokio::test]
async fn zero_matches_clears_session_and_reports() {
    let h = harness(vec![station_bus()], None);
    let erin = user(5, "erin");

    // Vehicle departs 07:45; 09:00 is outside the 30-minute window.
    run_search(
        &h,
        &erin,
        &["ser", "Station A", "Station B", "09:00", "2", "no"],
    )
    .await;

    assert!(h.sessions.get(erin.id).await.unwrap().is_none());
    let texts = h.notifier.texts_to(erin.id);
    assert!(texts.last().unwrap().contains("No matching buses"));
    assert!(h.notifier.choices_to(erin.id).is_empty());

    // The user can start over immediately.
    h.engine.handle_text(&erin, "ser").await.unwrap();
    assert!(h.sessions.get(erin.id).await.unwrap().is_some());
}

#[tokio::test]
async fn stale_selection_reports_expiry() {
    let h = harness(vec![station_bus()], None);
    let frank = user(6, "frank");

    h.engine
        .handle_action(&frank, &CallbackAction::Select("bus-1".into()), "cq-1")
        .await
        .unwrap();

    let acks = h.notifier.acks();
    assert_eq!(acks.len(), 1);
    assert!(acks[0].as_deref().unwrap().contains("Session expired"));
    assert!(h.sessions.get(frank.id).await.unwrap().is_none());
}

#[tokio::test]
async fn selecting_vanished_vehicle_reports_unavailable() {
    let h = harness(vec![station_bus()], None);
    let grace = user(7, "grace");

    run_search(
        &h,
        &grace,
        &["ser", "Station A", "Station B", "07:30", "1", "no"],
    )
    .await;

    h.engine
        .handle_action(&grace, &CallbackAction::Select("ghost".into()), "cq-1")
        .await
        .unwrap();

    let acks = h.notifier.acks();
    assert!(acks.last().unwrap().as_deref().unwrap().contains("no longer available"));
    // Session survives so another option can be picked.
    assert!(h.sessions.get(grace.id).await.unwrap().is_some());
}

#[tokio::test]
async fn capacity_race_has_exactly_one_winner() {
    let mut bus = station_bus();
    bus.capacity = 3;
    let h = harness(vec![bus], None);
    let alice = user(10, "alice");
    let bob = user(11, "bob");

    for u in [&alice, &bob] {
        run_search(&h, u, &["ser", "Station A", "Station B", "07:30", "2", "no"]).await;
        h.engine
            .handle_action(u, &CallbackAction::Select("bus-1".into()), "cq-sel")
            .await
            .unwrap();
    }

    let confirm_a = CallbackAction::Confirm("bus-1".into());
    let confirm_b = CallbackAction::Confirm("bus-1".into());
    let (a, b) = tokio::join!(
        h.engine.handle_action(&alice, &confirm_a, "cq-a"),
        h.engine.handle_action(&bob, &confirm_b, "cq-b"),
    );
    a.unwrap();
    b.unwrap();

    let bookings = h.bookings.all().await.unwrap();
    assert_eq!(bookings.len(), 1, "exactly one confirmation may win");
    assert_eq!(h.roster.get("bus-1").await.unwrap().unwrap().capacity, 1);

    let acks: Vec<String> = h.notifier.acks().into_iter().flatten().collect();
    let confirmed = acks.iter().filter(|a| a.contains("Booking confirmed")).count();
    let refused = acks.iter().filter(|a| a.contains("Not enough seats")).count();
    assert_eq!((confirmed, refused), (1, 1));

    // The loser keeps its session and may pick another option.
    let loser_sessions = [
        h.sessions.get(alice.id).await.unwrap(),
        h.sessions.get(bob.id).await.unwrap(),
    ];
    assert_eq!(loser_sessions.iter().filter(|s| s.is_some()).count(), 1);
}

#[tokio::test]
async fn admin_notify_failure_does_not_roll_back_booking() {
    let admin = UserId(999);
    let h = harness(vec![station_bus()], Some(admin));
    h.notifier.fail_sends_to(admin);
    let alice = user(12, "alice");

    run_search(
        &h,
        &alice,
        &["ser", "Station A", "Station B", "07:30", "1", "no"],
    )
    .await;
    h.engine
        .handle_action(&alice, &CallbackAction::Select("bus-1".into()), "cq-1")
        .await
        .unwrap();
    h.engine
        .handle_action(&alice, &CallbackAction::Confirm("bus-1".into()), "cq-2")
        .await
        .unwrap();

    assert_eq!(h.bookings.all().await.unwrap().len(), 1);
    assert_eq!(h.roster.get("bus-1").await.unwrap().unwrap().capacity, 4);

    // The admin send was attempted and failed; the user still got confirmed.
    let admin_attempts = h.notifier.texts_to(admin);
    assert_eq!(admin_attempts.len(), 1);
    assert!(admin_attempts[0].contains("New booking"));
    assert!(h
        .notifier
        .texts_to(alice.id)
        .iter()
        .any(|t| t.contains("Booking confirmed!")));
}

#[tokio::test]
async fn cancel_action_during_confirmation_returns_to_idle() {
    let h = harness(vec![station_bus()], None);
    let alice = user(13, "alice");

    run_search(
        &h,
        &alice,
        &["ser", "Station A", "Station B", "07:30", "1", "no"],
    )
    .await;
    h.engine
        .handle_action(&alice, &CallbackAction::Select("bus-1".into()), "cq-1")
        .await
        .unwrap();
    h.engine
        .handle_action(&alice, &CallbackAction::Cancel, "cq-2")
        .await
        .unwrap();

    assert!(h.sessions.get(alice.id).await.unwrap().is_none());
    assert_eq!(h.roster.get("bus-1").await.unwrap().unwrap().capacity, 5);
    assert!(h.bookings.all().await.unwrap().is_empty());
}

#[tokio::test]
async fn start_command_subscribes_and_report_reaches_admin() {
    let admin = UserId(999);
    let h = harness(vec![], Some(admin));
    let alice = user(14, "alice");

    h.engine.handle_text(&alice, "/start").await.unwrap();
    assert_eq!(h.subscribers.all().await.unwrap(), vec![alice.id]);

    h.engine
        .handle_text(&alice, "/report the 07:45 bus never showed")
        .await
        .unwrap();
    let admin_texts = h.notifier.texts_to(admin);
    assert_eq!(admin_texts.len(), 1);
    assert!(admin_texts[0].contains("alice"));
    assert!(admin_texts[0].contains("never showed"));
}

#[tokio::test]
async fn unknown_text_outside_flow_gets_fallback() {
    let h = harness(vec![], None);
    let alice = user(15, "alice");

    h.engine.handle_text(&alice, "good morning").await.unwrap();
    assert!(h.sessions.get(alice.id).await.unwrap().is_none());
    let texts = h.notifier.texts_to(alice.id);
    assert!(texts[0].contains("didn't understand"));

    // A delivery record exists but no choices were ever presented.
    assert!(h.notifier.choices_to(alice.id).is_empty());
    assert!(matches!(
        h.notifier.deliveries()[0],
        Delivery::Text { .. }
    ));
}

/// Booking log whose writes always fail, for exercising the reservation
/// compensation path.
struct BrokenBookings;

#[async_trait::async_trait]
impl BookingStore for BrokenBookings {
    async fn append(&self, _booking: farebot_core::Booking) -> Result<(), FarebotError> {
        Err(FarebotError::Internal("booking log unavailable".into()))
    }

    async fn all(&self) -> Result<Vec<farebot_core::Booking>, FarebotError> {
        Ok(Vec::new())
    }
}

#[tokio::test]
async fn failed_booking_write_returns_reserved_seats() {
    let roster = Arc::new(MemoryRoster::new(vec![station_bus()]));
    let sessions = Arc::new(MemorySessions::default());
    let notifier = Arc::new(RecordingNotifier::new());
    let engine = Engine::new(
        roster.clone(),
        Arc::new(BrokenBookings),
        sessions.clone(),
        Arc::new(MemorySubscribers::default()),
        notifier.clone(),
        EngineConfig {
            admin_chat: None,
            broadcast_batch_size: 20,
            broadcast_batch_delay: Duration::from_millis(0),
        },
    );
    let alice = user(16, "alice");

    for input in ["ser", "Station A", "Station B", "07:30", "2", "no"] {
        engine.handle_text(&alice, input).await.unwrap();
    }
    engine
        .handle_action(&alice, &CallbackAction::Select("bus-1".into()), "cq-sel")
        .await
        .unwrap();

    let err = engine
        .handle_action(&alice, &CallbackAction::Confirm("bus-1".into()), "cq-conf")
        .await
        .unwrap_err();
    assert!(matches!(err, FarebotError::Internal(_)));

    // The seats taken by the reservation came back.
    assert_eq!(roster.get("bus-1").await.unwrap().unwrap().capacity, 5);
    // No confirmation was sent.
    assert!(
        !notifier
            .texts_to(alice.id)
            .iter()
            .any(|t| t.contains("Booking confirmed"))
    );
}

#[tokio::test]
async fn upsert_vehicle_validates_shape() {
    let h = harness(vec![], None);

    let mut bad = station_bus();
    bad.route = vec!["Only Stop".into()];
    assert!(h.engine.upsert_vehicle(bad).await.is_err());

    let mut no_id = station_bus();
    no_id.id = "  ".into();
    assert!(h.engine.upsert_vehicle(no_id).await.is_err());

    h.engine.upsert_vehicle(station_bus()).await.unwrap();
    assert_eq!(h.engine.list_vehicles().await.unwrap().len(), 1);
}

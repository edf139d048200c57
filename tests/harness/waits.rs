//! Deadline waits and notification subscriptions.

use std::cell::{Cell, RefCell};
use std::rc::Rc;
use std::time::Duration;

use stagehand_foundation::names::{editor, entity, notify};
use stagehand_foundation::{Address, ErrorKind, Value};
use stagehand_harness::{HarnessError, Session};

use crate::session;

fn ticks(session: &mut Session) -> i64 {
    session
        .broadcast(editor::BUS, editor::GET_TICK_COUNT, &[])
        .unwrap()
}

// =============================================================================
// Waits
// =============================================================================

#[test]
fn satisfied_predicate_does_not_tick() {
    let mut session = session();
    let before = ticks(&mut session);
    assert!(session.wait_for_default(|_| Ok(true)).unwrap());
    assert_eq!(ticks(&mut session), before);
}

#[test]
fn timeout_returns_false_after_ticking() {
    let mut session = session();
    let before = ticks(&mut session);
    let polls = Cell::new(0);
    let held = session
        .wait_for(Duration::from_millis(20), |_| {
            polls.set(polls.get() + 1);
            Ok(false)
        })
        .unwrap();

    assert!(!held);
    assert!(polls.get() > 1);
    assert!(ticks(&mut session) > before);
}

#[test]
fn predicate_sees_the_editor_advance() {
    let mut session = session();
    let target = ticks(&mut session) + 5;
    let reached = session
        .wait_for_default(|s| {
            let now: i64 = s.broadcast(editor::BUS, editor::GET_TICK_COUNT, &[])?;
            Ok(now >= target)
        })
        .unwrap();
    assert!(reached);
    assert_eq!(ticks(&mut session), target);
}

#[test]
fn predicate_error_abandons_the_wait() {
    let mut session = session();
    let result = session.wait_for_default(|s| {
        let _: String = s.broadcast(editor::BUS, "NoSuchRequest", &[])?;
        Ok(true)
    });
    assert!(matches!(
        result.as_ref().map_err(HarnessError::engine_kind),
        Err(Some(ErrorKind::NoSuchMethod { .. }))
    ));
    assert!(session.wait_for_default(|_| Ok(true)).unwrap());
}

#[test]
fn nested_wait_is_refused() {
    let mut session = session();
    let result = session.wait_for_default(|s| s.wait_for_default(|_| Ok(true)));
    assert!(matches!(result, Err(HarnessError::NestedWait)));
}

#[test]
fn idle_frames_ticks_exactly() {
    let mut session = session();
    let before = ticks(&mut session);
    session.idle_frames(3).unwrap();
    assert_eq!(ticks(&mut session), before + 3);
}

#[test]
fn idle_ticks_at_least_once() {
    let mut session = session();
    let before = ticks(&mut session);
    session.idle(Duration::ZERO).unwrap();
    assert!(ticks(&mut session) > before);
}

// =============================================================================
// Subscriptions
// =============================================================================

#[test]
fn callbacks_see_the_propagation_bracket_in_order() {
    let mut session = session();
    let seen: Rc<RefCell<Vec<&'static str>>> = Rc::new(RefCell::new(Vec::new()));
    let subscription = session.subscribe(notify::PREFAB, Address::Broadcast).unwrap();
    let begin = Rc::clone(&seen);
    let end = Rc::clone(&seen);
    subscription
        .on(notify::PROPAGATION_BEGIN, move |_| begin.borrow_mut().push("begin"))
        .on(notify::PROPAGATION_END, move |_| end.borrow_mut().push("end"));

    session.create_entity(Some("Edited"), None, None).unwrap();
    assert!(session.wait_for_propagation().unwrap());
    assert_eq!(*seen.borrow(), ["begin", "end"]);
}

#[test]
fn dropped_subscription_stops_delivery() {
    let mut session = session();
    let count = Rc::new(Cell::new(0));
    let subscription = session.subscribe(notify::PREFAB, Address::Broadcast).unwrap();
    let counter = Rc::clone(&count);
    subscription.on(notify::PROPAGATION_END, move |_| counter.set(counter.get() + 1));

    session.create_entity(None, None, None).unwrap();
    session.wait_for_propagation().unwrap();
    assert_eq!(count.get(), 1);
    assert_eq!(session.subscription_count(), 1);

    drop(subscription);
    session.create_entity(None, None, None).unwrap();
    session.wait_for_propagation().unwrap();
    assert_eq!(count.get(), 1);
    assert_eq!(session.subscription_count(), 0);
}

#[test]
fn scoped_subscription_is_released_on_error() {
    let mut session = session();
    let result: Result<(), _> = session.with_subscription(
        notify::PREFAB,
        Address::Broadcast,
        |_, _| Err(HarnessError::Usage("stop".into())),
    );
    assert!(matches!(result, Err(HarnessError::Usage(_))));
    assert_eq!(session.subscription_count(), 0);
}

#[test]
fn request_buses_cannot_be_subscribed() {
    let mut session = session();
    let err = session
        .subscribe(entity::BUS, Address::Broadcast)
        .unwrap_err();
    assert!(matches!(err.engine_kind(), Some(ErrorKind::NoSuchMethod { .. })));
    assert_eq!(session.subscription_count(), 0);
}

#[test]
fn entity_addressed_subscription_filters_other_entities() {
    let mut session = session();
    let watched = session.create_entity(Some("Watched"), None, None).unwrap();
    let other = session.create_entity(Some("Other"), None, None).unwrap();
    let watched_box = session.add_component(&watched, "Box Shape").unwrap();
    let other_box = session.add_component(&other, "Box Shape").unwrap();

    let entered = Rc::new(Cell::new(0));
    let counter = Rc::clone(&entered);
    let subscription = session
        .subscribe(notify::COMPONENT_MODE, Address::Entity(watched.id))
        .unwrap();
    subscription.on(notify::ENTERED_COMPONENT_MODE, move |_: &[Value]| {
        counter.set(counter.get() + 1);
    });

    session.enter_component_mode(&other_box).unwrap();
    session.leave_component_mode().unwrap();
    session.idle_frames(1).unwrap();
    assert_eq!(entered.get(), 0);

    session.enter_component_mode(&watched_box).unwrap();
    session.idle_frames(1).unwrap();
    assert_eq!(entered.get(), 1);
    session.leave_component_mode().unwrap();
}

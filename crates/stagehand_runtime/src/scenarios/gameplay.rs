use std::cell::RefCell;
use std::rc::Rc;

use stagehand_foundation::names::notify;
use stagehand_foundation::{Address, EntityId, Value, Vec3};
use stagehand_harness::{Contact, HarnessResult, LabelPair, Scenario, ScenarioConfig, Session};

const IN_GAME_MODE: LabelPair = LabelPair::fixed("Entered game mode", "Failed to enter game mode");
const COLLISION_BEGAN: LabelPair = LabelPair::fixed(
    "Collision begin received from the other body",
    "Collision begin not received",
);
const COLLISION_ENDED: LabelPair = LabelPair::fixed(
    "Collision end received from the other body",
    "Collision end not received",
);
const TRIGGER_ENTERED: LabelPair = LabelPair::fixed(
    "Trigger enter received from the other body",
    "Trigger enter not received",
);
const LEFT_GAME_MODE: LabelPair = LabelPair::fixed("Exited game mode", "Failed to exit game mode");
const RUNTIME_ENTITY_DISCARDED: LabelPair = LabelPair::fixed(
    "Entity spawned in game mode was discarded",
    "Entity spawned in game mode survived",
);

type Log = Rc<RefCell<Vec<(&'static str, Option<EntityId>)>>>;

fn logger(log: Log, event: &'static str) -> impl FnMut(&[Value]) + 'static {
    move |args: &[Value]| {
        let other = args.first().and_then(Value::as_entity);
        log.borrow_mut().push((event, other));
    }
}

/// Injects contacts in game mode and listens for them on the target.
pub struct ContactNotifications;

impl Scenario for ContactNotifications {
    fn name(&self) -> &str {
        "contact_notifications"
    }

    fn summary(&self) -> &str {
        "collision and trigger notifications reach the addressed entity in game mode"
    }

    fn run(&mut self, session: &mut Session, _config: &ScenarioConfig) -> HarnessResult<()> {
        let target = session.create_entity(Some("Target"), None, Some(Vec3::ZERO))?;
        let other = session.create_entity(Some("Ball"), None, Some(Vec3::new(0.0, 0.0, 5.0)))?;
        session.add_component(&target, "PhysX Primitive Collider")?;
        session.add_component(&other, "PhysX Dynamic Rigid Body")?;

        session.enter_game_mode()?;
        let running = session.is_in_game_mode()?;
        session.critical(&IN_GAME_MODE, running)?;

        let log: Log = Rc::default();
        let collisions = session.subscribe(notify::COLLISION, Address::Entity(target.id))?;
        collisions
            .on(notify::COLLISION_BEGIN, logger(Rc::clone(&log), notify::COLLISION_BEGIN))
            .on(notify::COLLISION_END, logger(Rc::clone(&log), notify::COLLISION_END));
        let triggers = session.subscribe(notify::TRIGGER, Address::Entity(target.id))?;
        triggers.on(notify::TRIGGER_ENTER, logger(Rc::clone(&log), notify::TRIGGER_ENTER));

        let spawned = session.create_entity(Some("Spawned"), None, None)?;

        let checks = [
            (Contact::CollisionBegin, &COLLISION_BEGAN),
            (Contact::CollisionEnd, &COLLISION_ENDED),
            (Contact::TriggerEnter, &TRIGGER_ENTERED),
        ];
        for (contact, labels) in checks {
            session.simulate_contact(&target, &other, contact)?;
            let expected = (contact.event(), Some(other.id));
            let seen = session.wait_for_default(|_| Ok(log.borrow().contains(&expected)))?;
            session.record(labels, seen);
        }
        drop(collisions);
        drop(triggers);

        session.exit_game_mode()?;
        let running = session.is_in_game_mode()?;
        session.record(&LEFT_GAME_MODE, !running);
        let survived = session.is_valid(spawned.id)?;
        session.record(&RUNTIME_ENTITY_DISCARDED, !survived);
        Ok(())
    }
}

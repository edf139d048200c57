use std::cell::Cell;
use std::rc::Rc;

use stagehand_foundation::names::notify;
use stagehand_foundation::{Address, Vec3};
use stagehand_harness::{HarnessResult, LabelPair, Scenario, ScenarioConfig, Session};

const BOX_ENABLED: LabelPair = LabelPair::fixed(
    "Box Shape is enabled",
    "Box Shape is not enabled",
);
const CYLINDER_PENDING: LabelPair = LabelPair::fixed(
    "Cylinder Shape was added disabled",
    "Cylinder Shape was added enabled",
);
const ACTIVATION_SWAPPED: LabelPair = LabelPair::fixed(
    "Activating Cylinder Shape disabled Box Shape",
    "Activating Cylinder Shape left both shapes in the wrong state",
);
const REMOVAL_RESTORED: LabelPair = LabelPair::fixed(
    "Removing Cylinder Shape re-enabled Box Shape",
    "Box Shape stayed disabled after Cylinder Shape was removed",
);
const FIELD_WRITTEN: LabelPair = LabelPair::fixed(
    "Collider trigger flag written",
    "Collider trigger flag not written",
);
const ENTERED: LabelPair = LabelPair::fixed(
    "Entered component mode",
    "Failed to enter component mode",
);
const LEFT: LabelPair = LabelPair::fixed(
    "Left component mode",
    "Failed to leave component mode",
);

/// Adds two conflicting shapes and flips which one is active.
pub struct ComponentConflicts;

impl Scenario for ComponentConflicts {
    fn name(&self) -> &str {
        "component_conflicts"
    }

    fn summary(&self) -> &str {
        "conflicting shape components are added disabled and swap on activation"
    }

    fn run(&mut self, session: &mut Session, _config: &ScenarioConfig) -> HarnessResult<()> {
        let entity = session.create_entity(Some("Shapes"), None, Some(Vec3::ZERO))?;
        let boxed = session.add_component(&entity, "Box Shape")?;
        let cylinder = session.add_component(&entity, "Cylinder Shape")?;

        let box_on = session.is_enabled(&boxed)?;
        session.record(&BOX_ENABLED, box_on);
        let cylinder_on = session.is_enabled(&cylinder)?;
        session.record(&CYLINDER_PENDING, !cylinder_on);

        session.activate(&cylinder)?;
        let box_on = session.is_enabled(&boxed)?;
        let cylinder_on = session.is_enabled(&cylinder)?;
        session.record(&ACTIVATION_SWAPPED, cylinder_on && !box_on);

        session.remove_component(&cylinder)?;
        let box_on = session.is_enabled(&boxed)?;
        session.record(&REMOVAL_RESTORED, box_on);

        let collider = session.add_component(&entity, "PhysX Primitive Collider")?;
        let written = session.set_field(&collider, "Collider Configuration|Trigger", true)?
            && session.get_field::<bool>(&collider, "Collider Configuration|Trigger")?;
        session.record(&FIELD_WRITTEN, written);
        Ok(())
    }
}

/// Enters and leaves component mode, waiting for the notifications.
pub struct ComponentMode;

impl Scenario for ComponentMode {
    fn name(&self) -> &str {
        "component_mode"
    }

    fn summary(&self) -> &str {
        "component mode notifications arrive for the edited entity"
    }

    fn run(&mut self, session: &mut Session, _config: &ScenarioConfig) -> HarnessResult<()> {
        let entity = session.create_entity(Some("Editable"), None, None)?;
        let shape = session.add_component(&entity, "Box Shape")?;

        let entered = Rc::new(Cell::new(false));
        let left = Rc::new(Cell::new(false));
        let address = Address::Entity(entity.id);
        session.with_subscription(notify::COMPONENT_MODE, address, |session, subscription| {
            let on_enter = Rc::clone(&entered);
            let on_leave = Rc::clone(&left);
            subscription
                .on(notify::ENTERED_COMPONENT_MODE, move |_| on_enter.set(true))
                .on(notify::LEFT_COMPONENT_MODE, move |_| on_leave.set(true));

            session.enter_component_mode(&shape)?;
            let seen = session.wait_for_default(|_| Ok(entered.get()))?;
            session.record(&ENTERED, seen);

            session.leave_component_mode()?;
            let seen = session.wait_for_default(|_| Ok(left.get()))?;
            session.record(&LEFT, seen);
            Ok(())
        })
    }
}

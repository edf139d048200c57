//! Integration tests for notification delivery

use stagehand_editor::{Editor, EditorConfig};
use stagehand_foundation::names::{component, editor, entity, notify};
use stagehand_foundation::{Address, ComponentRef, EditorBus, EntityId, Value};

use crate::{call, editor_with_level, settle};

fn events(bus: &mut Editor, handler: stagehand_foundation::HandlerId) -> Vec<String> {
    bus.take_notifications(handler)
        .into_iter()
        .map(|n| n.event)
        .collect()
}

#[test]
fn root_instance_loaded_follows_level_load() {
    let mut bus = Editor::new(EditorConfig::default()).unwrap();
    let handler = bus.connect(notify::PREFAB, Address::Broadcast).unwrap();
    let _: bool = call(&mut bus, editor::BUS, editor::CREATE_LEVEL, &[Value::from("Base")]);
    assert!(events(&mut bus, handler).is_empty());

    settle(&mut bus);
    let root: EntityId = call(&mut bus, entity::BUS, entity::GET_LEVEL_ROOT, &[]);
    let delivered = bus.take_notifications(handler);
    assert_eq!(delivered.len(), 1);
    assert_eq!(delivered[0].event, notify::ROOT_INSTANCE_LOADED);
    assert_eq!(delivered[0].args, vec![Value::from(root)]);
}

#[test]
fn every_edit_brackets_a_propagation() {
    let mut bus = editor_with_level(EditorConfig::default());
    let handler = bus.connect(notify::PREFAB, Address::Broadcast).unwrap();

    let _: EntityId = call(&mut bus, entity::BUS, entity::CREATE, &[]);
    let busy: bool = call(
        &mut bus,
        stagehand_foundation::names::prefab::BUS,
        stagehand_foundation::names::prefab::IS_PROPAGATION_IN_PROGRESS,
        &[],
    );
    assert!(busy);
    settle(&mut bus);

    let delivered = bus.take_notifications(handler);
    let names: Vec<&str> = delivered.iter().map(|n| n.event.as_str()).collect();
    assert_eq!(names, [notify::PROPAGATION_BEGIN, notify::PROPAGATION_END]);
    assert!(delivered[0].sequence < delivered[1].sequence);
}

#[test]
fn entity_addressed_handlers_see_only_their_entity() {
    let mut bus = editor_with_level(EditorConfig::immediate());
    let a: EntityId = call(&mut bus, entity::BUS, entity::CREATE, &[Value::from("a")]);
    let b: EntityId = call(&mut bus, entity::BUS, entity::CREATE, &[Value::from("b")]);
    let on_a = bus.connect(notify::COMPONENT_MODE, Address::Entity(a)).unwrap();
    let on_any = bus.connect(notify::COMPONENT_MODE, Address::Broadcast).unwrap();

    let shape: ComponentRef = call(
        &mut bus,
        component::BUS,
        component::ADD,
        &[Value::from(b), Value::from("Box Shape")],
    );
    let _: () = call(&mut bus, component::BUS, component::ENTER_COMPONENT_MODE, &[Value::from(shape)]);
    let _: () = call(&mut bus, component::BUS, component::LEAVE_COMPONENT_MODE, &[]);

    assert!(events(&mut bus, on_a).is_empty());
    assert_eq!(
        events(&mut bus, on_any),
        vec![notify::ENTERED_COMPONENT_MODE, notify::LEFT_COMPONENT_MODE]
    );
}

#[test]
fn disconnected_handlers_stop_receiving() {
    let mut bus = editor_with_level(EditorConfig::immediate());
    let handler = bus.connect(notify::PREFAB, Address::Broadcast).unwrap();
    bus.disconnect(handler);
    let _: EntityId = call(&mut bus, entity::BUS, entity::CREATE, &[]);
    settle(&mut bus);
    assert!(bus.take_notifications(handler).is_empty());
}

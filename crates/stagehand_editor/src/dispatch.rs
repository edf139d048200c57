//! Routes bus calls to editor operations.

use stagehand_foundation::names::{asset, component, editor, entity, physics, prefab};
use stagehand_foundation::{
    Address, AssetId, ComponentRef, EditorBus, EntityId, Error, HandlerId,
    Notification, Result, Value, Vec3,
};
use tracing::trace;

use crate::args::Args;
use crate::editor::Editor;
use crate::level::LevelSettings;

fn count(n: impl TryInto<i64>) -> Value {
    Value::Int(n.try_into().unwrap_or(i64::MAX))
}

/// Fills in the failing call unless an inner layer already named one.
fn annotate<T>(result: Result<T>, bus: &str, method: &str) -> Result<T> {
    result.map_err(|mut err| {
        let context = err.context.take().unwrap_or_default();
        let context = if context.bus.is_some() {
            context
        } else {
            context.with_call(bus, method)
        };
        err.with_context(context)
    })
}

impl EditorBus for Editor {
    fn broadcast(&mut self, bus: &str, method: &str, args: &[Value]) -> Result<Value> {
        trace!(bus, method, args = args.len(), "broadcast");
        let result = self.ensure_alive().and_then(|()| match bus {
            editor::BUS => self.editor_request(method, args),
            entity::BUS => self.entity_broadcast(method, args),
            component::BUS => self.component_request(method, args),
            prefab::BUS => self.prefab_request(method, args),
            asset::BUS => self.asset_request(method, args),
            _ => Err(Error::no_such_method(bus, method)),
        });
        annotate(result, bus, method)
    }

    fn event(
        &mut self,
        bus: &str,
        method: &str,
        target: EntityId,
        args: &[Value],
    ) -> Result<Value> {
        trace!(bus, method, %target, args = args.len(), "event");
        let result = self.ensure_alive().and_then(|()| match bus {
            entity::BUS | physics::BUS if !self.is_entity_valid(target) => {
                Err(Error::invalid_target(target))
            }
            entity::BUS => self.entity_event(method, target, args),
            physics::BUS => self.physics_event(method, target, args),
            _ => Err(Error::no_such_method(bus, method)),
        });
        annotate(result, bus, method)
    }

    fn connect(&mut self, bus: &str, address: Address) -> Result<HandlerId> {
        self.ensure_alive()?;
        self.hub.connect(bus, address)
    }

    fn disconnect(&mut self, handler: HandlerId) {
        self.hub.disconnect(handler);
    }

    fn take_notifications(&mut self, handler: HandlerId) -> Vec<Notification> {
        self.hub.take(handler)
    }

    fn tick(&mut self) -> Result<()> {
        Editor::tick(self)
    }

    fn is_alive(&self) -> bool {
        Editor::is_alive(self)
    }
}

// =============================================================================
// Per-bus handlers
// =============================================================================

impl Editor {
    fn editor_request(&mut self, method: &str, args: &[Value]) -> Result<Value> {
        match method {
            editor::CREATE_LEVEL => {
                let args = Args::expect(args, 1, 5)?;
                let defaults = LevelSettings::default();
                let settings = LevelSettings {
                    heightmap_resolution: args
                        .get::<Option<i64>>(1)?
                        .unwrap_or(defaults.heightmap_resolution),
                    meters_per_pixel: args
                        .get::<Option<f64>>(2)?
                        .unwrap_or(defaults.meters_per_pixel),
                    texture_resolution: args
                        .get::<Option<i64>>(3)?
                        .unwrap_or(defaults.texture_resolution),
                    use_terrain: args.get::<Option<bool>>(4)?.unwrap_or(defaults.use_terrain),
                };
                let name: String = args.get(0)?;
                Ok(Value::from(self.create_level(&name, settings)))
            }
            editor::OPEN_LEVEL => {
                let name: String = Args::expect(args, 1, 1)?.get(0)?;
                Ok(Value::from(self.open_level(&name)))
            }
            editor::SAVE_LEVEL => {
                Args::none(args)?;
                self.save_level().map(Value::from)
            }
            editor::RELOAD_LEVEL => {
                Args::none(args)?;
                self.reload_level().map(Value::from)
            }
            editor::CLOSE_EDITOR => {
                Args::none(args)?;
                self.close();
                Ok(Value::Nil)
            }
            editor::GET_CURRENT_LEVEL_NAME => {
                Args::none(args)?;
                Ok(Value::from(self.current_level_name().map(str::to_string)))
            }
            editor::IS_LEVEL_ACTIVE => {
                Args::none(args)?;
                Ok(Value::from(self.is_level_active()))
            }
            editor::IS_RELOAD_IN_PROGRESS => {
                Args::none(args)?;
                Ok(Value::from(self.is_reload_in_progress()))
            }
            editor::PENDING_WORK_COUNT => {
                Args::none(args)?;
                Ok(count(self.pending_work()))
            }
            editor::GET_TICK_COUNT => {
                Args::none(args)?;
                Ok(count(self.tick_count()))
            }
            editor::UNDO => {
                Args::none(args)?;
                self.undo().map(Value::from)
            }
            editor::REDO => {
                Args::none(args)?;
                self.redo().map(Value::from)
            }
            editor::ENTER_GAME_MODE => {
                Args::none(args)?;
                self.enter_game_mode()?;
                Ok(Value::Nil)
            }
            editor::EXIT_GAME_MODE => {
                Args::none(args)?;
                self.exit_game_mode();
                Ok(Value::Nil)
            }
            editor::IS_IN_GAME_MODE => {
                Args::none(args)?;
                Ok(Value::from(self.is_in_game_mode()))
            }
            editor::GET_VIEWPORT_SIZE => {
                Args::none(args)?;
                let (width, height) = self.viewport_size();
                Ok(Value::List(vec![Value::Int(width), Value::Int(height)]))
            }
            editor::SET_VIEWPORT_SIZE => {
                let args = Args::expect(args, 2, 2)?;
                self.set_viewport_size(args.get(0)?, args.get(1)?)?;
                Ok(Value::Nil)
            }
            editor::GET_HELPERS_VISIBLE => {
                Args::none(args)?;
                Ok(Value::from(self.helpers_visible()))
            }
            editor::SET_HELPERS_VISIBLE => {
                let visible: bool = Args::expect(args, 1, 1)?.get(0)?;
                self.set_helpers_visible(visible);
                Ok(Value::Nil)
            }
            _ => Err(Error::no_such_method(editor::BUS, method)),
        }
    }

    fn entity_broadcast(&mut self, method: &str, args: &[Value]) -> Result<Value> {
        match method {
            entity::CREATE => {
                let args = Args::expect(args, 0, 3)?;
                let name: Option<String> = args.get(0)?;
                let parent: Option<EntityId> = args.get(1)?;
                let position: Option<Vec3> = args.get(2)?;
                self.create_entity(name.as_deref(), parent, position)
                    .map(Value::from)
            }
            entity::FIND_BY_NAME => {
                let name: String = Args::expect(args, 1, 1)?.get(0)?;
                self.find_entity_by_name(&name).map(Value::from)
            }
            entity::IS_VALID => {
                let target: EntityId = Args::expect(args, 1, 1)?.get(0)?;
                Ok(Value::from(self.is_entity_valid(target)))
            }
            entity::GET_LEVEL_ROOT => {
                Args::none(args)?;
                self.level_root().map(Value::from)
            }
            _ => Err(Error::no_such_method(entity::BUS, method)),
        }
    }

    fn entity_event(&mut self, method: &str, target: EntityId, args: &[Value]) -> Result<Value> {
        match method {
            entity::DELETE => {
                Args::none(args)?;
                self.delete_entity(target).map(Value::from)
            }
            entity::GET_NAME => {
                Args::none(args)?;
                self.entity_name(target).map(Value::from)
            }
            entity::SET_NAME => {
                let name: String = Args::expect(args, 1, 1)?.get(0)?;
                self.set_entity_name(target, &name)?;
                Ok(Value::Nil)
            }
            entity::GET_PARENT => {
                Args::none(args)?;
                self.entity_parent(target).map(Value::from)
            }
            entity::SET_PARENT => {
                let parent: Option<EntityId> = Args::expect(args, 0, 1)?.get(0)?;
                self.set_entity_parent(target, parent)?;
                Ok(Value::Nil)
            }
            entity::GET_CHILDREN => {
                Args::none(args)?;
                self.entity_children(target).map(Value::from)
            }
            entity::GET_WORLD_TRANSLATION => {
                Args::none(args)?;
                self.world_translation(target).map(Value::from)
            }
            entity::SET_WORLD_TRANSLATION => {
                let position: Vec3 = Args::expect(args, 1, 1)?.get(0)?;
                self.set_world_translation(target, position)?;
                Ok(Value::Nil)
            }
            entity::GET_LOCAL_TRANSLATION => {
                Args::none(args)?;
                self.local_translation(target).map(Value::from)
            }
            entity::SET_LOCAL_TRANSLATION => {
                let local: Vec3 = Args::expect(args, 1, 1)?.get(0)?;
                self.set_local_translation(target, local)?;
                Ok(Value::Nil)
            }
            _ => Err(Error::no_such_method(entity::BUS, method)),
        }
    }

    fn component_request(&mut self, method: &str, args: &[Value]) -> Result<Value> {
        match method {
            component::ADD => {
                let args = Args::expect(args, 2, 2)?;
                let type_name: String = args.get(1)?;
                self.add_component(args.get(0)?, &type_name).map(Value::from)
            }
            component::HAS => {
                let args = Args::expect(args, 2, 2)?;
                let type_name: String = args.get(1)?;
                self.has_component(args.get(0)?, &type_name).map(Value::from)
            }
            component::FIND => {
                let args = Args::expect(args, 2, 2)?;
                let type_name: String = args.get(1)?;
                self.find_component(args.get(0)?, &type_name).map(Value::from)
            }
            component::LIST => {
                let target: EntityId = Args::expect(args, 1, 1)?.get(0)?;
                self.components(target).map(Value::from)
            }
            component::REMOVE => {
                let c: ComponentRef = Args::expect(args, 1, 1)?.get(0)?;
                self.remove_component(c)?;
                Ok(Value::Nil)
            }
            component::IS_VALID => {
                let c: ComponentRef = Args::expect(args, 1, 1)?.get(0)?;
                Ok(Value::from(self.is_component_valid(c)))
            }
            component::IS_ENABLED => {
                let c: ComponentRef = Args::expect(args, 1, 1)?.get(0)?;
                self.is_component_enabled(c).map(Value::from)
            }
            component::ENABLE => {
                let c: ComponentRef = Args::expect(args, 1, 1)?.get(0)?;
                self.enable_component(c)?;
                Ok(Value::Nil)
            }
            component::DISABLE => {
                let c: ComponentRef = Args::expect(args, 1, 1)?.get(0)?;
                self.disable_component(c)?;
                Ok(Value::Nil)
            }
            component::GET_PROPERTY => {
                let args = Args::expect(args, 2, 2)?;
                let path: String = args.get(1)?;
                self.component_property(args.get(0)?, &path)
            }
            component::SET_PROPERTY => {
                let args = Args::expect(args, 3, 3)?;
                let path: String = args.get(1)?;
                self.set_component_property(args.get(0)?, &path, args.get(2)?)?;
                Ok(Value::Nil)
            }
            component::TYPE_NAME => {
                let c: ComponentRef = Args::expect(args, 1, 1)?.get(0)?;
                self.component_type_name(c).map(Value::from)
            }
            component::ENTER_COMPONENT_MODE => {
                let c: ComponentRef = Args::expect(args, 1, 1)?.get(0)?;
                self.enter_component_mode(c)?;
                Ok(Value::Nil)
            }
            component::LEAVE_COMPONENT_MODE => {
                Args::none(args)?;
                self.leave_component_mode();
                Ok(Value::Nil)
            }
            _ => Err(Error::no_such_method(component::BUS, method)),
        }
    }

    fn prefab_request(&mut self, method: &str, args: &[Value]) -> Result<Value> {
        match method {
            prefab::CREATE_PREFAB => {
                let args = Args::expect(args, 2, 2)?;
                let entities: Vec<EntityId> = args.get(0)?;
                let path: String = args.get(1)?;
                self.create_prefab(&entities, &path).map(Value::from)
            }
            prefab::INSTANTIATE => {
                let args = Args::expect(args, 1, 3)?;
                let path: String = args.get(0)?;
                self.instantiate_prefab(&path, args.get(1)?, args.get(2)?)
                    .map(Value::from)
            }
            prefab::DETACH => {
                let container: EntityId = Args::expect(args, 1, 1)?.get(0)?;
                self.detach_prefab(container)?;
                Ok(Value::Nil)
            }
            prefab::REMOVE_INSTANCE => {
                let container: EntityId = Args::expect(args, 1, 1)?.get(0)?;
                self.remove_prefab_instance(container).map(Value::from)
            }
            prefab::DUPLICATE => {
                let container: EntityId = Args::expect(args, 1, 1)?.get(0)?;
                self.duplicate_prefab_instance(container).map(Value::from)
            }
            prefab::IS_INSTANCE_CONTAINER => {
                let e: EntityId = Args::expect(args, 1, 1)?.get(0)?;
                self.is_instance_container(e).map(Value::from)
            }
            prefab::GET_OWNING_INSTANCE => {
                let e: EntityId = Args::expect(args, 1, 1)?.get(0)?;
                self.owning_instance(e).map(Value::from)
            }
            prefab::GET_TEMPLATE_PATH => {
                let container: EntityId = Args::expect(args, 1, 1)?.get(0)?;
                self.template_path(container).map(Value::from)
            }
            prefab::IS_MODIFIED => {
                let container: EntityId = Args::expect(args, 1, 1)?.get(0)?;
                self.is_instance_modified(container).map(Value::from)
            }
            prefab::SAVE_OVERRIDES => {
                let container: EntityId = Args::expect(args, 1, 1)?.get(0)?;
                self.save_instance_overrides(container)?;
                Ok(Value::Nil)
            }
            prefab::IS_PROPAGATION_IN_PROGRESS => {
                Args::none(args)?;
                Ok(Value::from(self.is_propagation_in_progress()))
            }
            prefab::FOCUS_INSTANCE => {
                let container: EntityId = Args::expect(args, 1, 1)?.get(0)?;
                self.focus_instance(container).map(Value::from)
            }
            prefab::FOCUS_ON_OWNING_PREFAB => {
                let e: EntityId = Args::expect(args, 1, 1)?.get(0)?;
                self.focus_on_owning_prefab(e).map(Value::from)
            }
            prefab::GET_FOCUSED_INSTANCE => {
                Args::none(args)?;
                self.focused_instance().map(Value::from)
            }
            _ => Err(Error::no_such_method(prefab::BUS, method)),
        }
    }

    fn asset_request(&mut self, method: &str, args: &[Value]) -> Result<Value> {
        match method {
            asset::GET_ID_BY_PATH => {
                let path: String = Args::expect(args, 1, 1)?.get(0)?;
                Ok(Value::from(self.asset_id_by_path(&path)))
            }
            asset::IS_VALID => {
                let id: AssetId = Args::expect(args, 1, 1)?.get(0)?;
                Ok(Value::from(self.is_valid_asset(id)))
            }
            _ => Err(Error::no_such_method(asset::BUS, method)),
        }
    }

    fn physics_event(&mut self, method: &str, target: EntityId, args: &[Value]) -> Result<Value> {
        match method {
            physics::INJECT_CONTACT => {
                let args = Args::expect(args, 2, 2)?;
                let other: EntityId = args.get(0)?;
                let kind: String = args.get(1)?;
                self.inject_contact(target, other, &kind)?;
                Ok(Value::Nil)
            }
            _ => Err(Error::no_such_method(physics::BUS, method)),
        }
    }
}

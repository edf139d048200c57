//! Prefab operations: creating templates, instancing, overrides, and focus.
//!
//! An instance is a container entity linked to a template path. The scene
//! keeps the link; the template itself lives in the [`TemplateStore`].
//!
//! [`TemplateStore`]: crate::template::TemplateStore

use stagehand_foundation::{AssetId, EntityId, Error, ErrorKind, Result, Vec3};
use tracing::{debug, info, warn};

use crate::editor::Editor;
use crate::scene::{InstanceLink, SceneState};
use crate::template::{container_name, TemplateNode};
use crate::work::Rebuild;

// =============================================================================
// Instances
// =============================================================================

impl Editor {
    /// Turns `entities` into a new template at `path` and replaces them with
    /// an instance of it. Returns the new container.
    ///
    /// Entities whose ancestor is also listed come along with that ancestor.
    /// The container goes under the entities' shared parent (the level root
    /// when they differ), at the first entity's world position.
    ///
    /// # Errors
    ///
    /// Returns `InvalidTarget` for dead entities, `NotPermitted` for the level
    /// root, `NotFocused`, or `TemplateWriteFailed`.
    pub fn create_prefab(&mut self, entities: &[EntityId], path: &str) -> Result<EntityId> {
        let mut next = self.scene()?.clone();
        if entities.is_empty() {
            return Err(Error::new(ErrorKind::TemplateWriteFailed {
                path: path.to_string(),
                reason: "no entities given".into(),
            }));
        }
        for &entity in entities {
            next.world.validate(entity)?;
            if entity == next.level_root {
                return Err(Error::new(ErrorKind::NotPermitted {
                    entity,
                    reason: "the level root cannot go into a prefab".into(),
                }));
            }
        }

        let mut top: Vec<EntityId> = Vec::with_capacity(entities.len());
        for &entity in entities {
            let covered = entities
                .iter()
                .any(|&other| other != entity && next.world.is_ancestor(other, entity));
            if !covered && !top.contains(&entity) {
                top.push(entity);
            }
        }
        let parents = top
            .iter()
            .map(|&e| Ok(next.world.parent(e)?.unwrap_or(next.level_root)))
            .collect::<Result<Vec<_>>>()?;
        let common = if parents.iter().all(|p| *p == parents[0]) {
            parents[0]
        } else {
            next.level_root
        };
        for &parent in &parents {
            self.require_focus(&next, parent)?;
        }
        self.require_focus(&next, common)?;

        let first = top[0];
        let position = next.world.world_translation(first)?;
        let index = if parents[0] == common {
            next.world.sibling_index(first)
        } else {
            None
        };
        let local = position - next.world.world_translation(common)?;
        let (world, container) =
            next.world
                .spawn(&container_name(path), Some(common), local, index)?;
        next.world = world;
        for &entity in &top {
            next.world = next.world.reparent(entity, Some(container), None)?;
        }

        let node = TemplateNode::capture(&next, container)?;
        self.templates.create(path, node)?;
        next.instances.insert(
            container,
            InstanceLink {
                template: path.to_string(),
                modified: false,
            },
        );
        self.touch(&mut next, common);
        self.commit("Create Prefab", next)?;
        self.work
            .queue_asset(path, self.config.asset_processing_ticks);
        info!(path, %container, entities = top.len(), "prefab_created");
        Ok(container)
    }

    /// Spawns an instance of the template at `path` under `parent` (the level
    /// root when `None`) at world `position` (the origin when `None`).
    ///
    /// # Errors
    ///
    /// Returns `TemplateNotFound`, `InvalidTarget`, or `NotFocused`.
    pub fn instantiate_prefab(
        &mut self,
        path: &str,
        parent: Option<EntityId>,
        position: Option<Vec3>,
    ) -> Result<EntityId> {
        let mut next = self.scene()?.clone();
        let parent = parent.unwrap_or(next.level_root);
        next.world.validate(parent)?;
        self.require_focus(&next, parent)?;

        let template = self.templates.get(path)?.root.clone();
        let local = position.unwrap_or(Vec3::ZERO) - next.world.world_translation(parent)?;
        let container = template.materialize(&mut next, parent, None, Some(local))?;
        next.instances.insert(
            container,
            InstanceLink {
                template: path.to_string(),
                modified: false,
            },
        );
        self.touch(&mut next, parent);
        self.commit("Instantiate Prefab", next)?;
        info!(path, %container, "prefab_instantiated");
        Ok(container)
    }

    /// Unlinks an instance; its entities stay as plain entities.
    ///
    /// # Errors
    ///
    /// Returns `NotAnInstance` or `NotFocused`.
    pub fn detach_prefab(&mut self, container: EntityId) -> Result<()> {
        let mut next = self.scene()?.clone();
        next.link(container)?;
        let parent = next.world.parent(container)?.unwrap_or(next.level_root);
        self.require_focus(&next, parent)?;

        next.instances.remove(&container);
        if self.focused == Some(container) {
            self.focused = None;
        }
        self.touch(&mut next, parent);
        self.commit("Detach Prefab", next)?;
        debug!(%container, "prefab_detached");
        Ok(())
    }

    /// Deletes an instance with all its entities. Returns the removed ids in
    /// pre-order.
    ///
    /// # Errors
    ///
    /// Returns `NotAnInstance` or `NotFocused`.
    pub fn remove_prefab_instance(&mut self, container: EntityId) -> Result<Vec<EntityId>> {
        let mut next = self.scene()?.clone();
        next.link(container)?;
        let parent = next.world.parent(container)?.unwrap_or(next.level_root);
        self.require_focus(&next, parent)?;

        let (world, removed) = next.world.destroy(container)?;
        next.world = world;
        next.prune_links();
        if self.component_mode.is_some_and(|e| removed.contains(&e)) {
            self.component_mode = None;
        }
        self.touch(&mut next, parent);
        self.commit("Delete Prefab Instance", next)?;
        debug!(%container, removed = removed.len(), "prefab_instance_removed");
        Ok(removed)
    }

    /// Copies an instance, including unsaved overrides, next to the original.
    ///
    /// # Errors
    ///
    /// Returns `NotAnInstance` or `NotFocused`.
    pub fn duplicate_prefab_instance(&mut self, container: EntityId) -> Result<EntityId> {
        let mut next = self.scene()?.clone();
        let link = next.link(container)?.clone();
        let parent = next.world.parent(container)?.unwrap_or(next.level_root);
        self.require_focus(&next, parent)?;

        let node = TemplateNode::capture(&next, container)?;
        let index = next.world.sibling_index(container).map(|i| i + 1);
        let copy = node.materialize(&mut next, parent, index, None)?;
        next.instances.insert(copy, link);
        self.touch(&mut next, parent);
        self.commit("Duplicate Prefab Instance", next)?;
        debug!(%container, %copy, "prefab_instance_duplicated");
        Ok(copy)
    }

    /// Returns true if `entity` is an instance container.
    ///
    /// # Errors
    ///
    /// Returns `InvalidTarget` for dead entities.
    pub fn is_instance_container(&self, entity: EntityId) -> Result<bool> {
        let scene = self.scene()?;
        scene.world.validate(entity)?;
        Ok(scene.is_container(entity))
    }

    /// Container that owns `entity`, or the level root.
    ///
    /// # Errors
    ///
    /// Returns `InvalidTarget` for dead entities.
    pub fn owning_instance(&self, entity: EntityId) -> Result<EntityId> {
        let scene = self.scene()?;
        scene.world.validate(entity)?;
        Ok(scene.owning_instance(entity))
    }

    /// Template path an instance was made from.
    ///
    /// # Errors
    ///
    /// Returns `NotAnInstance`.
    pub fn template_path(&self, container: EntityId) -> Result<String> {
        Ok(self.scene()?.link(container)?.template.clone())
    }

    /// True if the instance has unsaved edits.
    ///
    /// # Errors
    ///
    /// Returns `NotAnInstance`.
    pub fn is_instance_modified(&self, container: EntityId) -> Result<bool> {
        Ok(self.scene()?.link(container)?.modified)
    }

    /// Writes an instance's current state back to its template. Every other
    /// unmodified instance is rebuilt when the propagation cycle ends.
    ///
    /// # Errors
    ///
    /// Returns `NotAnInstance` or `TemplateWriteFailed`.
    pub fn save_instance_overrides(&mut self, container: EntityId) -> Result<()> {
        let mut next = self.scene()?.clone();
        let template = next.link(container)?.template.clone();
        let node = TemplateNode::capture(&next, container)?;
        let version = self.templates.update(&template, node)?;
        next.link_mut(container)?.modified = false;
        self.commit("Save Prefab Overrides", next)?;
        self.work.queue_propagation(
            self.config.propagation_ticks,
            Some(Rebuild {
                template: template.clone(),
                source: container,
            }),
        );
        info!(%container, template = %template, version, "overrides_saved");
        Ok(())
    }

    /// True while a propagation cycle is queued or running.
    #[must_use]
    pub fn is_propagation_in_progress(&self) -> bool {
        self.work.is_propagating()
    }

    /// Pushes saved templates to their other unmodified instances.
    pub(crate) fn apply_rebuilds(&mut self, rebuild: &[Rebuild]) {
        let Ok(scene) = self.scene() else {
            return;
        };
        let mut next = scene.clone();
        let mut rebuilt = 0usize;
        for job in rebuild {
            let node = match self.templates.get(&job.template) {
                Ok(template) => template.root.clone(),
                Err(err) => {
                    warn!(template = %job.template, error = %err, "rebuild_skipped");
                    continue;
                }
            };
            for container in next.instances_of(&job.template) {
                let stale = next
                    .instances
                    .get(&container)
                    .is_some_and(|link| !link.modified);
                if container == job.source || !stale {
                    continue;
                }
                match refill(&mut next, container, &node) {
                    Ok(()) => rebuilt += 1,
                    Err(err) => {
                        warn!(%container, error = %err, "rebuild_failed");
                    }
                }
            }
        }
        if rebuilt > 0 {
            info!(instances = rebuilt, "instances_rebuilt");
            self.replace_scene(next);
        }
    }
}

/// Replaces a container's children with the template's.
fn refill(scene: &mut SceneState, container: EntityId, node: &TemplateNode) -> Result<()> {
    for child in scene.world.children(container)? {
        let (world, _) = scene.world.destroy(child)?;
        scene.world = world;
    }
    scene.prune_links();
    for child in &node.children {
        child.materialize(scene, container, None, None)?;
    }
    Ok(())
}

// =============================================================================
// Focus
// =============================================================================

impl Editor {
    /// Focuses a container (or the level root) so hierarchy edits inside it
    /// are accepted. Returns false if it was already focused.
    ///
    /// # Errors
    ///
    /// Returns `NotAnInstance` for entities that are neither.
    pub fn focus_instance(&mut self, container: EntityId) -> Result<bool> {
        let scene = self.scene()?;
        scene.world.validate(container)?;
        let is_root = container == scene.level_root;
        if !is_root && !scene.is_container(container) {
            return Err(Error::new(ErrorKind::NotAnInstance(container)));
        }
        if self.focus_root(scene) == container {
            return Ok(false);
        }
        self.focused = if is_root { None } else { Some(container) };
        self.leave_component_mode();
        info!(%container, "prefab_focused");
        Ok(true)
    }

    /// Focuses the prefab owning `entity`.
    ///
    /// # Errors
    ///
    /// Returns `InvalidTarget` for dead entities.
    pub fn focus_on_owning_prefab(&mut self, entity: EntityId) -> Result<bool> {
        let owner = self.owning_instance(entity)?;
        self.focus_instance(owner)
    }

    /// The focused container, or the level root.
    ///
    /// # Errors
    ///
    /// Returns `NoLevelLoaded` if no level is open.
    pub fn focused_instance(&self) -> Result<EntityId> {
        let scene = self.scene()?;
        Ok(self.focus_root(scene))
    }
}

// =============================================================================
// Assets
// =============================================================================

impl Editor {
    /// Catalog id for a path; invalid until the asset finished processing.
    #[must_use]
    pub fn asset_id_by_path(&self, path: &str) -> AssetId {
        self.assets.id_by_path(path)
    }

    /// True if the id names a registered asset.
    #[must_use]
    pub fn is_valid_asset(&self, id: AssetId) -> bool {
        self.assets.is_valid(id)
    }
}

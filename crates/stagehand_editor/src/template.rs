//! Prefab templates: capture a subtree, write it, and materialize it again.

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use stagehand_foundation::{EntityId, Error, ErrorKind, Result, Vec3};
use stagehand_storage::ComponentInstance;
use tracing::{debug, info};

use crate::scene::{InstanceLink, SceneState};

/// One entity of a template.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TemplateNode {
    /// Entity name.
    pub name: String,
    /// Translation relative to the parent node.
    pub local: Vec3,
    /// Component instances with their field values.
    pub components: Vec<ComponentInstance>,
    /// Template path when this node is a nested instance container.
    pub instance_of: Option<String>,
    /// Child nodes in order.
    pub children: Vec<TemplateNode>,
}

/// A persisted prefab template.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PrefabTemplate {
    /// The path it was written to.
    pub path: String,
    /// Number of times it was written.
    pub version: u64,
    /// The container node.
    pub root: TemplateNode,
}

impl TemplateNode {
    /// Captures `entity` and its descendants from the scene.
    ///
    /// # Errors
    ///
    /// Returns `InvalidTarget` if the entity is not live.
    pub fn capture(scene: &SceneState, entity: EntityId) -> Result<Self> {
        let world = &scene.world;
        let children = world
            .children(entity)?
            .into_iter()
            .map(|child| Self::capture(scene, child))
            .collect::<Result<Vec<_>>>()?;
        Ok(Self {
            name: world.name(entity)?.to_string(),
            local: world.local_translation(entity)?,
            components: world.components().instances(entity).cloned().collect(),
            instance_of: scene.instances.get(&entity).map(|l| l.template.clone()),
            children,
        })
    }

    /// Spawns this node and its descendants under `parent` at sibling
    /// position `index`, placing the node at `local` (its own translation
    /// when `None`). Nested containers get instance links.
    ///
    /// # Errors
    ///
    /// Returns an error if the parent is dead or a component type is unknown.
    pub fn materialize(
        &self,
        scene: &mut SceneState,
        parent: EntityId,
        index: Option<usize>,
        local: Option<Vec3>,
    ) -> Result<EntityId> {
        let (world, entity) =
            scene
                .world
                .spawn(&self.name, Some(parent), local.unwrap_or(self.local), index)?;
        scene.world = world;
        self.fill(scene, entity)?;
        Ok(entity)
    }

    /// Adds this node's components, children, and nested link to an existing
    /// entity.
    ///
    /// # Errors
    ///
    /// As [`TemplateNode::materialize`].
    pub fn fill(&self, scene: &mut SceneState, entity: EntityId) -> Result<()> {
        for component in &self.components {
            let (world, _) = scene.world.insert_component_copy(entity, component)?;
            scene.world = world;
        }
        if let Some(template) = &self.instance_of {
            scene.instances.insert(
                entity,
                InstanceLink {
                    template: template.clone(),
                    modified: false,
                },
            );
        }
        for child in &self.children {
            child.materialize(scene, entity, None, None)?;
        }
        Ok(())
    }

    /// Counts this node and its descendants.
    #[must_use]
    pub fn len(&self) -> usize {
        1 + self.children.iter().map(TemplateNode::len).sum::<usize>()
    }

    /// Always false; a node counts itself.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        false
    }
}

/// Written templates, optionally mirrored to disk.
#[derive(Clone, Debug, Default)]
pub struct TemplateStore {
    templates: HashMap<String, PrefabTemplate>,
    content_root: Option<PathBuf>,
}

impl TemplateStore {
    /// Creates a store; templates are written under `content_root` if given.
    #[must_use]
    pub fn new(content_root: Option<PathBuf>) -> Self {
        Self {
            templates: HashMap::new(),
            content_root,
        }
    }

    /// Looks up a template, loading it from disk if needed.
    ///
    /// # Errors
    ///
    /// Returns `TemplateNotFound` if no template exists at `path`.
    pub fn get(&mut self, path: &str) -> Result<&PrefabTemplate> {
        if !self.templates.contains_key(path) {
            let loaded = self
                .file_for(path)
                .filter(|file| file.exists())
                .map(|file| load(&file))
                .transpose()?
                .ok_or_else(|| Error::new(ErrorKind::TemplateNotFound(path.to_string())))?;
            self.templates.insert(path.to_string(), loaded);
        }
        self.templates
            .get(path)
            .ok_or_else(|| Error::new(ErrorKind::TemplateNotFound(path.to_string())))
    }

    /// Returns true if a template exists at `path`, in memory or on disk.
    #[must_use]
    pub fn contains(&self, path: &str) -> bool {
        self.templates.contains_key(path) || self.file_for(path).is_some_and(|f| f.exists())
    }

    /// Writes a new template. Fails if one already exists at `path`.
    ///
    /// # Errors
    ///
    /// Returns `TemplateWriteFailed` for invalid paths, existing templates,
    /// or I/O failures.
    pub fn create(&mut self, path: &str, root: TemplateNode) -> Result<()> {
        validate_path(path)?;
        if self.contains(path) {
            return Err(write_failed(path, "a template already exists at this path"));
        }
        self.store(PrefabTemplate {
            path: path.to_string(),
            version: 1,
            root,
        })
    }

    /// Replaces an existing template with a new version.
    ///
    /// # Errors
    ///
    /// Returns `TemplateNotFound` if there is nothing to replace, or
    /// `TemplateWriteFailed` on I/O failure.
    pub fn update(&mut self, path: &str, root: TemplateNode) -> Result<u64> {
        let version = self.get(path)?.version + 1;
        self.store(PrefabTemplate {
            path: path.to_string(),
            version,
            root,
        })?;
        Ok(version)
    }

    fn store(&mut self, template: PrefabTemplate) -> Result<()> {
        if let Some(file) = self.file_for(&template.path) {
            save(&file, &template)?;
        }
        info!(
            path = %template.path,
            version = template.version,
            entities = template.root.len(),
            "template_written"
        );
        self.templates.insert(template.path.clone(), template);
        Ok(())
    }

    fn file_for(&self, path: &str) -> Option<PathBuf> {
        self.content_root.as_ref().map(|root| {
            let file = root.join(path);
            if file.extension().is_some() {
                file
            } else {
                file.with_extension("prefab")
            }
        })
    }
}

fn write_failed(path: &str, reason: impl Into<String>) -> Error {
    Error::new(ErrorKind::TemplateWriteFailed {
        path: path.to_string(),
        reason: reason.into(),
    })
}

/// Template paths are relative, non-empty, and free of characters the content
/// tree cannot hold.
fn validate_path(path: &str) -> Result<()> {
    if path.trim().is_empty() {
        return Err(write_failed(path, "path is empty"));
    }
    if path.starts_with('/') || path.ends_with('/') || path.contains("//") {
        return Err(write_failed(path, "path must be a relative file path"));
    }
    if path.split('/').any(|segment| segment == "..") {
        return Err(write_failed(path, "path leaves the content tree"));
    }
    if let Some(bad) = path
        .chars()
        .find(|c| c.is_control() || matches!(c, '<' | '>' | ':' | '"' | '|' | '?' | '*' | '\\'))
    {
        return Err(write_failed(path, format!("invalid character {bad:?}")));
    }
    Ok(())
}

/// Display name for a container built from `path`: the file stem.
#[must_use]
pub fn container_name(path: &str) -> String {
    Path::new(path)
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or(path)
        .to_string()
}

fn save(file: &Path, template: &PrefabTemplate) -> Result<()> {
    let bytes =
        rmp_serde::to_vec_named(template).map_err(|e| write_failed(&template.path, e.to_string()))?;
    if let Some(dir) = file.parent() {
        fs::create_dir_all(dir).map_err(|e| {
            write_failed(
                &template.path,
                format!("cannot create '{}': {e}", dir.display()),
            )
        })?;
    }
    fs::write(file, bytes).map_err(|e| {
        write_failed(
            &template.path,
            format!("cannot write '{}': {e}", file.display()),
        )
    })?;
    debug!(file = %file.display(), "template_saved");
    Ok(())
}

fn load(file: &Path) -> Result<PrefabTemplate> {
    let bytes = fs::read(file).map_err(|e| {
        Error::new(ErrorKind::Io(format!(
            "failed to read '{}': {e}",
            file.display()
        )))
    })?;
    rmp_serde::from_slice(&bytes).map_err(|e| {
        Error::new(ErrorKind::Io(format!(
            "failed to decode '{}': {e}",
            file.display()
        )))
    })
}

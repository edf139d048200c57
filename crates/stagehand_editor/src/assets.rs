//! Asset catalog keyed by content path.

use std::collections::HashMap;

use stagehand_foundation::AssetId;

/// Maps processed content paths to asset ids.
///
/// Ids are handed out sequentially from 1; [`AssetId::INVALID`] answers
/// lookups for paths that have not been processed yet.
#[derive(Clone, Debug)]
pub struct AssetCatalog {
    by_path: HashMap<String, AssetId>,
    next_id: u64,
}

impl Default for AssetCatalog {
    fn default() -> Self {
        Self::new()
    }
}

impl AssetCatalog {
    /// Creates an empty catalog.
    #[must_use]
    pub fn new() -> Self {
        Self {
            by_path: HashMap::new(),
            next_id: 1,
        }
    }

    /// Registers a path, returning its id. Re-registering keeps the old id.
    pub fn register(&mut self, path: &str) -> AssetId {
        let key = normalize(path);
        if let Some(id) = self.by_path.get(&key) {
            return *id;
        }
        let id = AssetId(self.next_id);
        self.next_id += 1;
        self.by_path.insert(key, id);
        id
    }

    /// Looks up a path. Unknown paths yield [`AssetId::INVALID`].
    #[must_use]
    pub fn id_by_path(&self, path: &str) -> AssetId {
        self.by_path
            .get(&normalize(path))
            .copied()
            .unwrap_or(AssetId::INVALID)
    }

    /// Returns true if the id was handed out by this catalog.
    #[must_use]
    pub fn is_valid(&self, id: AssetId) -> bool {
        id.is_valid() && id.0 < self.next_id
    }

    /// Number of registered assets.
    #[must_use]
    pub fn len(&self) -> usize {
        self.by_path.len()
    }

    /// Returns true if nothing is registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.by_path.is_empty()
    }
}

/// Paths compare case-insensitively with forward slashes.
fn normalize(path: &str) -> String {
    path.trim().replace('\\', "/").to_lowercase()
}

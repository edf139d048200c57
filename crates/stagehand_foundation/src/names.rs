//! Bus, method, and notification names understood by the editor.
//!
//! Both sides of the bus use these constants so a typo is a compile error
//! rather than a `NoSuchMethod` at run time.

/// General editor requests: levels, undo/redo, game mode, viewport.
pub mod editor {
    /// Bus name.
    pub const BUS: &str = "EditorRequestBus";
    /// `(name, heightmap_resolution, meters_per_pixel, texture_resolution, use_terrain) -> bool`
    pub const CREATE_LEVEL: &str = "CreateLevel";
    /// `(name) -> bool`
    pub const OPEN_LEVEL: &str = "OpenLevel";
    /// `() -> bool`
    pub const SAVE_LEVEL: &str = "SaveLevel";
    /// `() -> bool`; reopens the current level from its last save.
    pub const RELOAD_LEVEL: &str = "ReloadLevel";
    /// `() -> nil`
    pub const CLOSE_EDITOR: &str = "CloseEditor";
    /// `() -> string | nil`
    pub const GET_CURRENT_LEVEL_NAME: &str = "GetCurrentLevelName";
    /// `() -> bool`
    pub const IS_LEVEL_ACTIVE: &str = "IsLevelActive";
    /// `() -> bool`
    pub const IS_RELOAD_IN_PROGRESS: &str = "IsReloadInProgress";
    /// `() -> int`
    pub const PENDING_WORK_COUNT: &str = "PendingWorkCount";
    /// `() -> int`
    pub const GET_TICK_COUNT: &str = "GetTickCount";
    /// `() -> bool`; false when there is nothing to undo.
    pub const UNDO: &str = "Undo";
    /// `() -> bool`; false when there is nothing to redo.
    pub const REDO: &str = "Redo";
    /// `() -> nil`
    pub const ENTER_GAME_MODE: &str = "EnterGameMode";
    /// `() -> nil`
    pub const EXIT_GAME_MODE: &str = "ExitGameMode";
    /// `() -> bool`
    pub const IS_IN_GAME_MODE: &str = "IsInGameMode";
    /// `() -> [int, int]`
    pub const GET_VIEWPORT_SIZE: &str = "GetViewportSize";
    /// `(width, height) -> nil`
    pub const SET_VIEWPORT_SIZE: &str = "SetViewportSize";
    /// `() -> bool`
    pub const GET_HELPERS_VISIBLE: &str = "GetHelpersVisible";
    /// `(visible) -> nil`
    pub const SET_HELPERS_VISIBLE: &str = "SetHelpersVisible";
}

/// Entity lifetime, naming, hierarchy, and transforms.
pub mod entity {
    /// Bus name.
    pub const BUS: &str = "EditorEntityRequestBus";
    /// Broadcast `(name?, parent?, position?) -> entity`
    pub const CREATE: &str = "CreateEntity";
    /// Broadcast `(name) -> entity | nil`
    pub const FIND_BY_NAME: &str = "FindEntityByName";
    /// Broadcast `(entity) -> bool`
    pub const IS_VALID: &str = "IsValid";
    /// Broadcast `() -> entity`
    pub const GET_LEVEL_ROOT: &str = "GetLevelRoot";
    /// Event `() -> [entity]`; ids removed, pre-order.
    pub const DELETE: &str = "DeleteEntityAndDescendants";
    /// Event `() -> string`
    pub const GET_NAME: &str = "GetName";
    /// Event `(name) -> nil`
    pub const SET_NAME: &str = "SetName";
    /// Event `() -> entity | nil`
    pub const GET_PARENT: &str = "GetParent";
    /// Event `(parent?) -> nil`
    pub const SET_PARENT: &str = "SetParent";
    /// Event `() -> [entity]`
    pub const GET_CHILDREN: &str = "GetChildren";
    /// Event `() -> vec3`
    pub const GET_WORLD_TRANSLATION: &str = "GetWorldTranslation";
    /// Event `(vec3) -> nil`
    pub const SET_WORLD_TRANSLATION: &str = "SetWorldTranslation";
    /// Event `() -> vec3`
    pub const GET_LOCAL_TRANSLATION: &str = "GetLocalTranslation";
    /// Event `(vec3) -> nil`
    pub const SET_LOCAL_TRANSLATION: &str = "SetLocalTranslation";
}

/// Component add/remove/activation and property access.
pub mod component {
    /// Bus name.
    pub const BUS: &str = "EditorComponentAPIBus";
    /// `(entity, type_name) -> component`
    pub const ADD: &str = "AddComponentOfType";
    /// `(entity, type_name) -> bool`
    pub const HAS: &str = "HasComponentOfType";
    /// `(entity, type_name) -> component | nil`
    pub const FIND: &str = "GetComponentOfType";
    /// `(entity) -> [component]`
    pub const LIST: &str = "GetComponents";
    /// `(component) -> nil`
    pub const REMOVE: &str = "RemoveComponent";
    /// `(component) -> bool`
    pub const IS_VALID: &str = "IsValid";
    /// `(component) -> bool`
    pub const IS_ENABLED: &str = "IsComponentEnabled";
    /// `(component) -> nil`
    pub const ENABLE: &str = "EnableComponent";
    /// `(component) -> nil`
    pub const DISABLE: &str = "DisableComponent";
    /// `(component, path) -> value`
    pub const GET_PROPERTY: &str = "GetComponentProperty";
    /// `(component, path, value) -> nil`
    pub const SET_PROPERTY: &str = "SetComponentProperty";
    /// `(component) -> string`
    pub const TYPE_NAME: &str = "GetComponentTypeName";
    /// `(component) -> nil`
    pub const ENTER_COMPONENT_MODE: &str = "EnterComponentMode";
    /// `() -> nil`
    pub const LEAVE_COMPONENT_MODE: &str = "LeaveComponentMode";
}

/// Prefab creation, instancing, and focus.
pub mod prefab {
    /// Bus name.
    pub const BUS: &str = "PrefabPublicRequestBus";
    /// `([entity], path) -> entity` (the new container)
    pub const CREATE_PREFAB: &str = "CreatePrefabInMemory";
    /// `(path, parent?, position?) -> entity`
    pub const INSTANTIATE: &str = "InstantiatePrefab";
    /// `(container) -> nil`
    pub const DETACH: &str = "DetachPrefab";
    /// `(container) -> [entity]`
    pub const REMOVE_INSTANCE: &str = "DeleteInstance";
    /// `(container) -> entity`
    pub const DUPLICATE: &str = "DuplicateInstance";
    /// `(entity) -> bool`
    pub const IS_INSTANCE_CONTAINER: &str = "IsInstanceContainerEntity";
    /// `(entity) -> entity` (container or level root)
    pub const GET_OWNING_INSTANCE: &str = "GetOwningInstanceContainer";
    /// `(container) -> string`
    pub const GET_TEMPLATE_PATH: &str = "GetInstanceTemplatePath";
    /// `(container) -> bool`
    pub const IS_MODIFIED: &str = "IsInstanceModified";
    /// `(container) -> nil`
    pub const SAVE_OVERRIDES: &str = "SaveInstanceOverrides";
    /// `() -> bool`
    pub const IS_PROPAGATION_IN_PROGRESS: &str = "IsPropagationInProgress";
    /// `(container) -> bool`; false when it was already focused.
    pub const FOCUS_INSTANCE: &str = "FocusOnPrefabInstance";
    /// `(entity) -> bool`; false when it was already focused.
    pub const FOCUS_ON_OWNING_PREFAB: &str = "FocusOnOwningPrefab";
    /// `() -> entity`
    pub const GET_FOCUSED_INSTANCE: &str = "GetFocusedInstanceContainer";
}

/// Asset catalog lookups.
pub mod asset {
    /// Bus name.
    pub const BUS: &str = "AssetCatalogRequestBus";
    /// `(path) -> asset` (invalid id when unknown)
    pub const GET_ID_BY_PATH: &str = "GetAssetIdByPath";
    /// `(asset) -> bool`
    pub const IS_VALID: &str = "IsValidAsset";
}

/// Test hook for contact events while in game mode.
pub mod physics {
    /// Bus name.
    pub const BUS: &str = "PhysicsTestRequestBus";
    /// Event `(other, kind) -> nil`; kind is `"collision_begin"`,
    /// `"collision_end"`, or `"trigger_enter"`.
    pub const INJECT_CONTACT: &str = "InjectContact";
}

/// Notification buses and the events they carry.
pub mod notify {
    /// Broadcast-only prefab notifications.
    pub const PREFAB: &str = "PrefabPublicNotificationBus";
    /// Component mode notifications; args `[entity]`.
    pub const COMPONENT_MODE: &str = "ComponentModeNotificationBus";
    /// Entity-addressed collision notifications; args `[other]`.
    pub const COLLISION: &str = "CollisionNotificationBus";
    /// Entity-addressed trigger notifications; args `[other]`.
    pub const TRIGGER: &str = "TriggerNotificationBus";

    /// A propagation cycle started.
    pub const PROPAGATION_BEGIN: &str = "propagation_begin";
    /// A propagation cycle finished; every instance reflects its template.
    pub const PROPAGATION_END: &str = "propagation_end";
    /// The level's root instance finished loading.
    pub const ROOT_INSTANCE_LOADED: &str = "root_instance_loaded";
    /// Component mode entered.
    pub const ENTERED_COMPONENT_MODE: &str = "entered_component_mode";
    /// Component mode left.
    pub const LEFT_COMPONENT_MODE: &str = "left_component_mode";
    /// Contact started.
    pub const COLLISION_BEGIN: &str = "collision_begin";
    /// Contact ended.
    pub const COLLISION_END: &str = "collision_end";
    /// A body entered a trigger volume.
    pub const TRIGGER_ENTER: &str = "trigger_enter";

    /// Buses that accept handler connections.
    pub const ALL: [&str; 4] = [PREFAB, COMPONENT_MODE, COLLISION, TRIGGER];
}

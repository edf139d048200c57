//! Integration tests for level lifecycle over the bus

use std::path::PathBuf;

use stagehand_editor::{Editor, EditorConfig};
use stagehand_foundation::names::{editor, entity};
use stagehand_foundation::{EntityId, Value};

use crate::{call, editor_with_level, settle};

fn scratch_dir(name: &str) -> PathBuf {
    let dir = std::env::temp_dir().join(format!("stagehand-{}-{name}", std::process::id()));
    let _ = std::fs::remove_dir_all(&dir);
    dir
}

#[test]
fn level_becomes_active_after_load_ticks() {
    let mut bus = Editor::new(EditorConfig::sluggish()).unwrap();
    let created: bool = call(&mut bus, editor::BUS, editor::CREATE_LEVEL, &[Value::from("Base")]);
    assert!(created);

    let active: bool = call(&mut bus, editor::BUS, editor::IS_LEVEL_ACTIVE, &[]);
    assert!(!active);
    settle(&mut bus);
    let active: bool = call(&mut bus, editor::BUS, editor::IS_LEVEL_ACTIVE, &[]);
    assert!(active);

    let name: Option<String> = call(&mut bus, editor::BUS, editor::GET_CURRENT_LEVEL_NAME, &[]);
    assert_eq!(name.as_deref(), Some("Base"));
}

#[test]
fn bad_names_and_settings_are_refused_with_false() {
    let mut bus = editor_with_level(EditorConfig::immediate());
    let taken: bool = call(&mut bus, editor::BUS, editor::CREATE_LEVEL, &[Value::from("Base")]);
    assert!(!taken);

    let spaced: bool = call(&mut bus, editor::BUS, editor::CREATE_LEVEL, &[Value::from("Two words")]);
    assert!(!spaced);

    let args = [Value::from("Odd"), Value::from(1000_i64)];
    let odd: bool = call(&mut bus, editor::BUS, editor::CREATE_LEVEL, &args);
    assert!(!odd);

    let missing: bool = call(&mut bus, editor::BUS, editor::OPEN_LEVEL, &[Value::from("Nowhere")]);
    assert!(!missing);
}

#[test]
fn reload_discards_unsaved_edits() {
    let mut bus = editor_with_level(EditorConfig::immediate());
    let kept: EntityId = call(&mut bus, entity::BUS, entity::CREATE, &[Value::from("Kept")]);
    let saved: bool = call(&mut bus, editor::BUS, editor::SAVE_LEVEL, &[]);
    assert!(saved);
    let _: EntityId = call(&mut bus, entity::BUS, entity::CREATE, &[Value::from("Lost")]);

    let reloaded: bool = call(&mut bus, editor::BUS, editor::RELOAD_LEVEL, &[]);
    assert!(reloaded);
    let in_progress: bool = call(&mut bus, editor::BUS, editor::IS_RELOAD_IN_PROGRESS, &[]);
    assert!(in_progress);
    settle(&mut bus);

    let found: Option<EntityId> =
        call(&mut bus, entity::BUS, entity::FIND_BY_NAME, &[Value::from("Kept")]);
    assert_eq!(found, Some(kept));
    let lost: Option<EntityId> =
        call(&mut bus, entity::BUS, entity::FIND_BY_NAME, &[Value::from("Lost")]);
    assert_eq!(lost, None);
}

#[test]
fn content_root_persists_levels_across_editors() {
    let dir = scratch_dir("levels");
    {
        let mut bus = editor_with_level(EditorConfig::immediate().with_content_root(&dir));
        let _: EntityId = call(&mut bus, entity::BUS, entity::CREATE, &[Value::from("Saved")]);
        let saved: bool = call(&mut bus, editor::BUS, editor::SAVE_LEVEL, &[]);
        assert!(saved);
    }

    let mut bus = Editor::new(EditorConfig::immediate().with_content_root(&dir)).unwrap();
    let opened: bool = call(&mut bus, editor::BUS, editor::OPEN_LEVEL, &[Value::from("Base")]);
    assert!(opened);
    settle(&mut bus);
    let found: Option<EntityId> =
        call(&mut bus, entity::BUS, entity::FIND_BY_NAME, &[Value::from("Saved")]);
    assert!(found.is_some());

    let _ = std::fs::remove_dir_all(&dir);
}

#[test]
fn level_path_longer_than_the_limit_is_refused() {
    // Levels/<n>/<n>.level is 14 + 2n characters.
    let mut bus = Editor::new(EditorConfig::immediate().with_max_level_path(30)).unwrap();
    let fits: bool = call(&mut bus, editor::BUS, editor::CREATE_LEVEL, &[Value::from("Eightchr")]);
    assert!(fits);
    let long: bool = call(&mut bus, editor::BUS, editor::CREATE_LEVEL, &[Value::from("Ninechars")]);
    assert!(!long);
    let opened: bool = call(&mut bus, editor::BUS, editor::OPEN_LEVEL, &[Value::from("Ninechars")]);
    assert!(!opened);
}

#[test]
fn content_root_counts_toward_the_path_limit() {
    let dir = scratch_dir("long-paths");
    let limit = dir.join("Levels/Short/Short.level").as_os_str().len();
    let config = EditorConfig::immediate()
        .with_content_root(&dir)
        .with_max_level_path(limit);
    let mut bus = Editor::new(config).unwrap();

    let fits: bool = call(&mut bus, editor::BUS, editor::CREATE_LEVEL, &[Value::from("Short")]);
    assert!(fits);
    let long: bool = call(&mut bus, editor::BUS, editor::CREATE_LEVEL, &[Value::from("Shorter")]);
    assert!(!long);
    assert!(!dir.join("Levels/Shorter").exists());

    let _ = std::fs::remove_dir_all(&dir);
}

use stagehand_foundation::Vec3;
use stagehand_harness::{HarnessResult, LabelPair, Scenario, ScenarioConfig, Session};

const LEVEL_NAMED: LabelPair = LabelPair::fixed(
    "Editor reports the scenario level",
    "Editor reports another level",
);
const SAVED: LabelPair = LabelPair::fixed("Level saved", "Level save failed");
const RELOADED: LabelPair = LabelPair::fixed("Level reloaded", "Level reload failed");
const SAVED_ENTITY_KEPT: LabelPair = LabelPair::fixed(
    "Saved entity survived the reload",
    "Saved entity was lost on reload",
);
const SAVED_POSITION_KEPT: LabelPair = LabelPair::fixed(
    "Saved entity kept its position",
    "Saved entity moved on reload",
);
const UNSAVED_ENTITY_DROPPED: LabelPair = LabelPair::fixed(
    "Unsaved entity was discarded on reload",
    "Unsaved entity survived the reload",
);

/// Saves the level, reloads it, and checks what survived.
pub struct SaveAndReload;

impl Scenario for SaveAndReload {
    fn name(&self) -> &str {
        "save_and_reload"
    }

    fn summary(&self) -> &str {
        "saved entities survive a reload and unsaved ones do not"
    }

    fn run(&mut self, session: &mut Session, config: &ScenarioConfig) -> HarnessResult<()> {
        let current = session.current_level_name()?;
        session.record(&LEVEL_NAMED, current.as_deref() == Some(config.level.as_str()));

        let position = Vec3::new(1.0, 2.0, 3.0);
        session.create_entity(Some("Persisted"), None, Some(position))?;
        let saved = session.save_level()?;
        session.critical(&SAVED, saved)?;

        let reloaded = session.reload_level()?;
        session.critical(&RELOADED, reloaded)?;
        let persisted = session.find_entity("Persisted")?;
        session.record(&SAVED_ENTITY_KEPT, persisted.is_some());
        let kept = match &persisted {
            Some(entity) => session.world_position(entity.id)?.is_close(position, Vec3::TOLERANCE),
            None => false,
        };
        session.record(&SAVED_POSITION_KEPT, kept);

        session.create_entity(Some("Transient"), None, None)?;
        let reloaded = session.reload_level()?;
        session.critical(&RELOADED, reloaded)?;
        let transient = session.find_entity("Transient")?;
        session.record(&UNSAVED_ENTITY_DROPPED, transient.is_none());
        Ok(())
    }
}

//! Harness integration tests.
//!
//! These drive the session facades against the in-process editor.

mod driver;
mod facades;
mod waits;

use stagehand_editor::{Editor, EditorConfig};
use stagehand_harness::{
    HarnessConfig, HarnessResult, LevelParams, Reporter, Scenario, ScenarioConfig, Session,
};

/// A session over a fresh editor with no level open.
pub fn bare_session(config: EditorConfig) -> Session {
    let editor = Editor::new(config).unwrap();
    Session::new(Box::new(editor), Reporter::in_memory(), HarnessConfig::fast())
}

/// A session with the level `Base` open and ready.
pub fn session() -> Session {
    let mut session = bare_session(EditorConfig::default());
    assert!(session.create_level("Base", &LevelParams::default()).unwrap());
    session
}

/// A scenario built from a closure.
pub struct Script<F> {
    pub name: &'static str,
    pub body: F,
}

impl<F> Script<F>
where
    F: FnMut(&mut Session, &ScenarioConfig) -> HarnessResult<()>,
{
    pub fn new(name: &'static str, body: F) -> Self {
        Self { name, body }
    }
}

impl<F> Scenario for Script<F>
where
    F: FnMut(&mut Session, &ScenarioConfig) -> HarnessResult<()>,
{
    fn name(&self) -> &str {
        self.name
    }

    fn run(&mut self, session: &mut Session, config: &ScenarioConfig) -> HarnessResult<()> {
        (self.body)(session, config)
    }
}

//! The outer shape of one test script.
//!
//! [`run_scenario`] brackets a [`Scenario`] with the standard prelude (open
//! the level, apply viewport settings) and postlude (restore settings, write
//! the result line). Whatever happens inside `run`, including a panic, the
//! stream ends with exactly one `result=` line.

use std::any::Any;
use std::ops::{Deref, DerefMut};
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::process::ExitCode;

use stagehand_foundation::names::editor;
use stagehand_foundation::Value;
use tracing::{error, info, warn};

use crate::error::{HarnessError, HarnessResult};
use crate::level::LevelParams;
use crate::report::LabelPair;
use crate::session::Session;

// =============================================================================
// Configuration
// =============================================================================

/// How the prelude reaches the scenario's level.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum LevelPolicy {
    /// Open the level, creating it if it does not exist.
    #[default]
    OpenOrCreate,
    /// Open the level; failing to is fatal.
    OpenExisting,
    /// Create the level; an existing one is fatal.
    CreateFresh,
    /// Leave the editor as it is.
    Skip,
}

/// Everything one scenario run is parameterized by.
#[derive(Clone, Debug, PartialEq)]
pub struct ScenarioConfig {
    /// Scenario name, used in the bracket lines.
    pub name: String,
    /// The level the scenario runs in.
    pub level: String,
    /// Positional arguments after the level name.
    pub extra_args: Vec<String>,
    /// Viewport size while the scenario runs.
    pub viewport: (i64, i64),
    /// Helper visibility while the scenario runs.
    pub helpers_visible: bool,
    /// How the prelude reaches the level.
    pub level_policy: LevelPolicy,
    /// Terrain parameters when the level has to be created.
    pub level_params: LevelParams,
}

impl ScenarioConfig {
    /// Viewport applied during a run unless overridden.
    pub const DEFAULT_VIEWPORT: (i64, i64) = (1600, 900);

    /// Creates a configuration for `name` running in `level`.
    #[must_use]
    pub fn new(name: impl Into<String>, level: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            level: level.into(),
            extra_args: Vec::new(),
            viewport: Self::DEFAULT_VIEWPORT,
            helpers_visible: false,
            level_policy: LevelPolicy::default(),
            level_params: LevelParams::default(),
        }
    }

    /// Builds a configuration from positional arguments: the level name,
    /// then any extra arguments.
    ///
    /// # Errors
    ///
    /// Returns `Usage` when the level name is missing.
    pub fn from_args(name: impl Into<String>, args: &[String]) -> HarnessResult<Self> {
        let (level, extra) = args
            .split_first()
            .ok_or_else(|| HarnessError::Usage("a level name is required".into()))?;
        Ok(Self::new(name, level.clone()).with_extra_args(extra.to_vec()))
    }

    /// Sets the extra arguments.
    #[must_use]
    pub fn with_extra_args(mut self, args: Vec<String>) -> Self {
        self.extra_args = args;
        self
    }

    /// Sets the viewport size.
    #[must_use]
    pub fn with_viewport(mut self, width: i64, height: i64) -> Self {
        self.viewport = (width, height);
        self
    }

    /// Sets helper visibility.
    #[must_use]
    pub fn with_helpers_visible(mut self, visible: bool) -> Self {
        self.helpers_visible = visible;
        self
    }

    /// Sets the level policy.
    #[must_use]
    pub fn with_level_policy(mut self, policy: LevelPolicy) -> Self {
        self.level_policy = policy;
        self
    }

    /// Extra argument at `index`, if given.
    #[must_use]
    pub fn extra_arg(&self, index: usize) -> Option<&str> {
        self.extra_args.get(index).map(String::as_str)
    }
}

// =============================================================================
// Scenario
// =============================================================================

/// One test script.
pub trait Scenario {
    /// Name used in the bracket lines.
    fn name(&self) -> &str;

    /// One-line summary for listings.
    fn summary(&self) -> &str {
        ""
    }

    /// The script body. Returning `Fatal` means a critical record already
    /// failed; any other error becomes a failure record.
    ///
    /// # Errors
    ///
    /// Whatever the script lets escape.
    fn run(&mut self, session: &mut Session, config: &ScenarioConfig) -> HarnessResult<()>;
}

/// How a run ended.
#[derive(Debug)]
pub struct ScenarioOutcome {
    /// Scenario name.
    pub name: String,
    /// True if the stream ended with `result=SUCCESS`.
    pub passed: bool,
    /// The error that ended the run early, if any.
    pub error: Option<HarnessError>,
}

impl ScenarioOutcome {
    /// Process exit status for this outcome.
    #[must_use]
    pub fn exit_code(&self) -> ExitCode {
        if self.passed {
            ExitCode::SUCCESS
        } else {
            ExitCode::FAILURE
        }
    }
}

// =============================================================================
// Editor Settings
// =============================================================================

/// Applies viewport settings for a run and restores the previous ones when
/// dropped, unwinding included.
pub struct SettingsGuard<'a> {
    session: &'a mut Session,
    viewport: (i64, i64),
    helpers_visible: bool,
}

impl<'a> SettingsGuard<'a> {
    /// Records the current settings and applies the requested ones.
    ///
    /// # Errors
    ///
    /// Returns an error if the editor refuses the settings.
    pub fn apply(
        session: &'a mut Session,
        viewport: (i64, i64),
        helpers_visible: bool,
    ) -> HarnessResult<Self> {
        let previous: Vec<i64> = session.broadcast(editor::BUS, editor::GET_VIEWPORT_SIZE, &[])?;
        let previous_helpers: bool =
            session.broadcast(editor::BUS, editor::GET_HELPERS_VISIBLE, &[])?;
        let guard = Self {
            session,
            viewport: match previous[..] {
                [w, h] => (w, h),
                _ => viewport,
            },
            helpers_visible: previous_helpers,
        };
        guard.session.broadcast::<()>(
            editor::BUS,
            editor::SET_VIEWPORT_SIZE,
            &[Value::Int(viewport.0), Value::Int(viewport.1)],
        )?;
        guard.session.broadcast::<()>(
            editor::BUS,
            editor::SET_HELPERS_VISIBLE,
            &[Value::Bool(helpers_visible)],
        )?;
        Ok(guard)
    }

    fn restore(&mut self) -> HarnessResult<()> {
        if self.session.is_in_game_mode()? {
            self.session.exit_game_mode()?;
        }
        let (width, height) = self.viewport;
        self.session.broadcast::<()>(
            editor::BUS,
            editor::SET_VIEWPORT_SIZE,
            &[Value::Int(width), Value::Int(height)],
        )?;
        self.session.broadcast::<()>(
            editor::BUS,
            editor::SET_HELPERS_VISIBLE,
            &[Value::Bool(self.helpers_visible)],
        )?;
        Ok(())
    }
}

impl Deref for SettingsGuard<'_> {
    type Target = Session;

    fn deref(&self) -> &Session {
        self.session
    }
}

impl DerefMut for SettingsGuard<'_> {
    fn deref_mut(&mut self) -> &mut Session {
        self.session
    }
}

impl Drop for SettingsGuard<'_> {
    fn drop(&mut self) {
        if !self.session.is_alive() {
            return;
        }
        if let Err(err) = self.restore() {
            warn!(error = %err, "settings_restore_failed");
        }
    }
}

// =============================================================================
// Driver
// =============================================================================

fn reach_level(session: &mut Session, config: &ScenarioConfig) -> HarnessResult<()> {
    let level = config.level.as_str();
    let ready = match config.level_policy {
        LevelPolicy::Skip => return Ok(()),
        LevelPolicy::OpenExisting => session.open_level(level)?,
        LevelPolicy::CreateFresh => session.create_level(level, &config.level_params)?,
        LevelPolicy::OpenOrCreate => {
            session.open_level(level)? || session.create_level(level, &config.level_params)?
        }
    };
    let labels = LabelPair::new(
        format!("Level {level} is ready"),
        format!("Level {level} failed to open"),
    );
    session.critical(&labels, ready)
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    payload
        .downcast_ref::<&str>()
        .map(|s| (*s).to_string())
        .or_else(|| payload.downcast_ref::<String>().cloned())
        .unwrap_or_else(|| "unknown panic payload".to_string())
}

/// Runs `scenario` with the standard prelude and postlude.
///
/// The stream gets `Starting scenario`, the scenario's records, at most one
/// extra failure record for an escaped error or panic, `Finished scenario`,
/// and the result line.
pub fn run_scenario(
    session: &mut Session,
    scenario: &mut dyn Scenario,
    config: &ScenarioConfig,
) -> ScenarioOutcome {
    let name = scenario.name().to_string();
    session.reporter_mut().start_scenario(&name);
    info!(scenario = %name, level = %config.level, "scenario_started");

    let result = catch_unwind(AssertUnwindSafe(|| {
        let mut guard = SettingsGuard::apply(session, config.viewport, config.helpers_visible)?;
        reach_level(&mut guard, config)?;
        scenario.run(&mut guard, config)
    }));

    let error = match result {
        Ok(Ok(())) => None,
        Ok(Err(HarnessError::Fatal(fatal))) => {
            info!(scenario = %name, label = %fatal.label, "scenario_aborted");
            Some(HarnessError::Fatal(fatal))
        }
        Ok(Err(err)) => {
            error!(scenario = %name, error = %err, "scenario_failed");
            session.reporter_mut().failure(format!("Scenario failed: {err}"));
            Some(err)
        }
        Err(payload) => {
            let message = panic_message(payload.as_ref());
            error!(scenario = %name, panic = %message, "scenario_panicked");
            session.reporter_mut().failure(format!("Scenario panicked: {message}"));
            Some(HarnessError::Panicked(message))
        }
    };

    if session.is_alive() {
        session.dispatch_notifications();
    }
    let passed = session.reporter_mut().end_scenario(&name, error.is_none());
    info!(scenario = %name, passed, "scenario_finished");
    ScenarioOutcome {
        name,
        passed,
        error,
    }
}

#[cfg(test)]
mod tests {
    use stagehand_editor::{Editor, EditorConfig};

    use super::*;
    use crate::config::HarnessConfig;
    use crate::report::{Reporter, RESULT_FAILURE, RESULT_SUCCESS};

    fn session() -> Session {
        let editor = Editor::new(EditorConfig::immediate()).unwrap();
        Session::new(Box::new(editor), Reporter::in_memory(), HarnessConfig::fast())
    }

    struct Script<F>(F);

    impl<F> Scenario for Script<F>
    where
        F: FnMut(&mut Session) -> HarnessResult<()>,
    {
        fn name(&self) -> &str {
            "script"
        }

        fn run(&mut self, session: &mut Session, _config: &ScenarioConfig) -> HarnessResult<()> {
            (self.0)(session)
        }
    }

    const CHECK: LabelPair = LabelPair::fixed("Check passed", "Check failed");

    fn viewport(session: &mut Session) -> Vec<i64> {
        session
            .broadcast(editor::BUS, editor::GET_VIEWPORT_SIZE, &[])
            .unwrap()
    }

    #[test]
    fn passing_run_is_bracketed() {
        let mut session = session();
        let config = ScenarioConfig::new("script", "Base");
        let mut script = Script(|s: &mut Session| -> HarnessResult<()> {
            s.record(&CHECK, true);
            Ok(())
        });
        let outcome = run_scenario(&mut session, &mut script, &config);
        assert!(outcome.passed);
        assert_eq!(
            session.reporter().lines(),
            [
                "Starting scenario: script",
                "Info: Could not open level Base",
                "Level Base is ready",
                "Check passed",
                "Finished scenario: script",
                RESULT_SUCCESS,
            ]
        );
    }

    #[test]
    fn settings_apply_during_run_and_restore_after() {
        let mut session = session();
        let before = viewport(&mut session);
        let config = ScenarioConfig::new("script", "Base").with_viewport(640, 480);
        let mut script = Script(|s: &mut Session| -> HarnessResult<()> {
            let during: Vec<i64> = s.broadcast(editor::BUS, editor::GET_VIEWPORT_SIZE, &[])?;
            let helpers: bool = s.broadcast(editor::BUS, editor::GET_HELPERS_VISIBLE, &[])?;
            s.record(&CHECK, during == [640_i64, 480] && !helpers);
            s.enter_game_mode()?;
            Ok(())
        });
        assert!(run_scenario(&mut session, &mut script, &config).passed);
        assert_eq!(viewport(&mut session), before);
        assert!(!session.is_in_game_mode().unwrap());
        let helpers: bool = session
            .broadcast(editor::BUS, editor::GET_HELPERS_VISIBLE, &[])
            .unwrap();
        assert!(helpers);
    }

    #[test]
    fn critical_failure_stops_the_script() {
        let mut session = session();
        let config = ScenarioConfig::new("script", "Base");
        let mut script = Script(|s: &mut Session| -> HarnessResult<()> {
            s.critical(&CHECK, false)?;
            s.record(&CHECK, true);
            Ok(())
        });
        let outcome = run_scenario(&mut session, &mut script, &config);
        assert!(!outcome.passed);
        assert!(matches!(outcome.error, Some(HarnessError::Fatal(_))));
        let lines = session.reporter().lines();
        assert_eq!(lines.iter().filter(|l| *l == "Check passed").count(), 0);
        assert_eq!(lines.last().map(String::as_str), Some(RESULT_FAILURE));
    }

    #[test]
    fn escaped_error_becomes_one_failure_record() {
        let mut session = session();
        let config = ScenarioConfig::new("script", "Base");
        let mut script = Script(|s: &mut Session| -> HarnessResult<()> {
            s.broadcast::<()>("Nowhere", "Nothing", &[])?;
            Ok(())
        });
        let outcome = run_scenario(&mut session, &mut script, &config);
        assert!(!outcome.passed);
        let failures: Vec<&String> = session
            .reporter()
            .lines()
            .iter()
            .filter(|l| l.starts_with("Scenario failed:"))
            .collect();
        assert_eq!(failures.len(), 1);
    }

    #[test]
    fn panic_is_caught_and_settings_restored() {
        let mut session = session();
        let before = viewport(&mut session);
        let config = ScenarioConfig::new("script", "Base").with_viewport(320, 200);
        let mut script = Script(|_: &mut Session| -> HarnessResult<()> { panic!("boom") });
        let outcome = run_scenario(&mut session, &mut script, &config);
        assert!(matches!(outcome.error, Some(HarnessError::Panicked(ref m)) if m == "boom"));
        assert_eq!(viewport(&mut session), before);
        assert_eq!(
            session.reporter().lines().last().map(String::as_str),
            Some(RESULT_FAILURE)
        );
    }

    #[test]
    fn missing_level_is_fatal_under_open_existing() {
        let mut session = session();
        let config = ScenarioConfig::new("script", "Nowhere")
            .with_level_policy(LevelPolicy::OpenExisting);
        let mut script = Script(|_: &mut Session| -> HarnessResult<()> { Ok(()) });
        let outcome = run_scenario(&mut session, &mut script, &config);
        assert!(!outcome.passed);
        assert!(session
            .reporter()
            .lines()
            .contains(&"Level Nowhere failed to open".to_string()));
    }

    #[test]
    fn arguments_need_a_level() {
        assert!(matches!(
            ScenarioConfig::from_args("x", &[]),
            Err(HarnessError::Usage(_))
        ));
        let config =
            ScenarioConfig::from_args("x", &["Base".to_string(), "fast".to_string()]).unwrap();
        assert_eq!(config.level, "Base");
        assert_eq!(config.extra_arg(0), Some("fast"));
        assert_eq!(config.extra_arg(1), None);
    }
}

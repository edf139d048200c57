//! CLI and bundled smoke scenarios for Stagehand.
//!
//! This crate provides:
//! - [`scenarios`] - The smoke scenarios shipped with the `stagehand` binary
//! - [`Runner`] - Runs one scenario against a fresh in-process editor
//! - [`init_tracing`] - Diagnostic logging to stderr
//!
//! Records go to the reporter's sink (stdout for the binary); diagnostics go
//! to stderr so the record stream stays scrapeable.

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

pub mod scenarios;

use stagehand_editor::{Editor, EditorConfig};
use stagehand_foundation::Result;
use stagehand_harness::{
    HarnessConfig, Reporter, Scenario, ScenarioConfig, ScenarioOutcome, Session, run_scenario,
};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

/// Environment variable read for the log filter before `RUST_LOG`.
pub const LOG_ENV: &str = "STAGEHAND_LOG";

/// Installs a compact stderr subscriber.
///
/// The filter comes from `STAGEHAND_LOG`, then `RUST_LOG`, then `warn`
/// (`debug` when `verbose`). Calling it twice is harmless.
pub fn init_tracing(verbose: bool) {
    let fallback = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_env(LOG_ENV)
        .or_else(|_| EnvFilter::try_from_default_env())
        .unwrap_or_else(|_| EnvFilter::new(fallback));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .compact()
        .try_init();
}

/// Runs scenarios, each against its own editor.
#[derive(Clone, Debug, Default)]
pub struct Runner {
    editor: EditorConfig,
    harness: HarnessConfig,
}

impl Runner {
    /// Creates a runner with explicit editor and harness settings.
    #[must_use]
    pub fn new(editor: EditorConfig, harness: HarnessConfig) -> Self {
        Self { editor, harness }
    }

    /// Editor settings used for every run.
    #[must_use]
    pub fn editor_config(&self) -> &EditorConfig {
        &self.editor
    }

    /// Runs `scenario` against a fresh editor, writing records to `reporter`,
    /// then closes the editor. Returns the outcome and the reporter.
    ///
    /// # Errors
    ///
    /// Returns an error if the editor cannot start.
    pub fn run(
        &self,
        scenario: &mut dyn Scenario,
        config: &ScenarioConfig,
        reporter: Reporter,
    ) -> Result<(ScenarioOutcome, Reporter)> {
        let editor = Editor::new(self.editor.clone())?;
        let mut session = Session::new(Box::new(editor), reporter, self.harness.clone());
        let outcome = run_scenario(&mut session, scenario, config);
        session.close_editor_gracefully();
        info!(scenario = %outcome.name, passed = outcome.passed, "run_complete");
        Ok((outcome, session.into_reporter()))
    }

    /// Runs `scenario` with its level and extra arguments taken from `args`.
    ///
    /// Unusable arguments still produce a failed bracket on `reporter`, so
    /// the stream always ends with a result line; no editor is started.
    ///
    /// # Errors
    ///
    /// Returns an error if the editor cannot start.
    pub fn run_with_args(
        &self,
        scenario: &mut dyn Scenario,
        args: &[String],
        mut reporter: Reporter,
    ) -> Result<(ScenarioOutcome, Reporter)> {
        match ScenarioConfig::from_args(scenario.name(), args) {
            Ok(config) => self.run(scenario, &config, reporter),
            Err(err) => {
                let name = scenario.name().to_string();
                warn!(scenario = %name, error = %err, "scenario_arguments_refused");
                reporter.start_scenario(&name);
                reporter.failure(format!("Scenario failed: {err}"));
                let passed = reporter.end_scenario(&name, false);
                let outcome = ScenarioOutcome {
                    name,
                    passed,
                    error: Some(err),
                };
                Ok((outcome, reporter))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use stagehand_harness::HarnessError;

    #[test]
    fn scenario_names_are_unique() {
        let mut names: Vec<String> = scenarios::all().iter().map(|s| s.name().to_string()).collect();
        let total = names.len();
        names.sort();
        names.dedup();
        assert_eq!(names.len(), total);
    }

    #[test]
    fn every_scenario_has_a_summary() {
        for scenario in scenarios::all() {
            assert!(!scenario.summary().is_empty(), "{} has no summary", scenario.name());
        }
    }

    #[test]
    fn find_looks_up_by_name() {
        assert!(scenarios::find("create_single_prefab").is_some());
        assert!(scenarios::find("no_such_scenario").is_none());
    }

    #[test]
    fn runner_reports_one_bracket() {
        let runner = Runner::new(EditorConfig::immediate(), HarnessConfig::fast());
        let mut scenario = scenarios::CreateEntityUnderRoot;
        let config = ScenarioConfig::new("create_entity_under_root", "Base");
        let (outcome, reporter) = runner
            .run(&mut scenario, &config, Reporter::in_memory())
            .unwrap();
        assert!(outcome.passed, "{:?}", reporter.lines());
        assert_eq!(reporter.lines()[0], "Starting scenario: create_entity_under_root");
        assert_eq!(reporter.lines().last().map(String::as_str), Some("result=SUCCESS"));
    }

    #[test]
    fn missing_level_argument_still_closes_the_bracket() {
        let runner = Runner::new(EditorConfig::immediate(), HarnessConfig::fast());
        let mut scenario = scenarios::CreateEntityUnderRoot;
        let (outcome, reporter) = runner
            .run_with_args(&mut scenario, &[], Reporter::in_memory())
            .unwrap();

        assert!(!outcome.passed);
        assert!(matches!(outcome.error, Some(HarnessError::Usage(_))));
        assert_eq!(
            reporter.lines(),
            [
                "Starting scenario: create_entity_under_root",
                "Scenario failed: usage: a level name is required",
                "Finished scenario: create_entity_under_root",
                "result=FAILURE",
            ]
        );
    }

    #[test]
    fn level_argument_is_passed_through() {
        let runner = Runner::new(EditorConfig::immediate(), HarnessConfig::fast());
        let mut scenario = scenarios::CreateEntityUnderRoot;
        let (outcome, reporter) = runner
            .run_with_args(&mut scenario, &["Other".to_string()], Reporter::in_memory())
            .unwrap();
        assert!(outcome.passed, "{:?}", reporter.lines());
        assert!(reporter.lines().iter().any(|l| l == "Level Other is ready"));
    }
}

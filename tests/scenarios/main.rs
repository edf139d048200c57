//! Bundled scenario tests.
//!
//! Every shipped scenario must pass against a fresh in-process editor, both
//! with instant background work and with the editor's default pacing.

use stagehand_editor::EditorConfig;
use stagehand_harness::{HarnessConfig, Reporter, ScenarioConfig, RESULT_SUCCESS};
use stagehand_runtime::{scenarios, Runner};

fn run_all(runner: &Runner) {
    for mut scenario in scenarios::all() {
        let name = scenario.name().to_string();
        let config = ScenarioConfig::new(name.clone(), "Base");
        let (outcome, reporter) = runner
            .run(scenario.as_mut(), &config, Reporter::in_memory())
            .unwrap();
        let lines = reporter.lines();

        assert!(outcome.passed, "{name} failed:\n{}", lines.join("\n"));
        assert_eq!(lines.first(), Some(&format!("Starting scenario: {name}")));
        assert_eq!(lines.last().map(String::as_str), Some(RESULT_SUCCESS));
        assert_eq!(
            lines.iter().filter(|l| l.starts_with("result=")).count(),
            1,
            "{name} wrote more than one result line"
        );
    }
}

#[test]
fn every_scenario_passes_with_instant_work() {
    run_all(&Runner::new(EditorConfig::immediate(), HarnessConfig::fast()));
}

#[test]
fn every_scenario_passes_with_default_pacing() {
    run_all(&Runner::new(EditorConfig::default(), HarnessConfig::fast()));
}

#[test]
fn every_scenario_passes_on_a_sluggish_editor() {
    run_all(&Runner::new(EditorConfig::sluggish(), HarnessConfig::default()));
}

#[test]
fn scenarios_run_again_in_a_fresh_editor() {
    let runner = Runner::new(EditorConfig::immediate(), HarnessConfig::fast());
    let mut scenario = scenarios::find("create_single_prefab").unwrap();
    let config = ScenarioConfig::new("create_single_prefab", "Base");

    for _ in 0..2 {
        let (outcome, _) = runner
            .run(scenario.as_mut(), &config, Reporter::in_memory())
            .unwrap();
        assert!(outcome.passed);
    }
}

#[test]
fn scenario_without_a_level_name_is_a_usage_error() {
    let err = ScenarioConfig::from_args("save_and_reload", &[]).unwrap_err();
    assert!(err.to_string().starts_with("usage:"));
}

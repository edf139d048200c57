//! Scenario driver tests: prelude, postlude, and containment.

use stagehand_editor::EditorConfig;
use stagehand_foundation::names::editor;
use stagehand_foundation::ErrorKind;
use stagehand_harness::{
    run_scenario, HarnessError, LabelPair, LevelPolicy, ScenarioConfig, Session, RESULT_FAILURE,
    RESULT_SUCCESS,
};

use crate::{bare_session, Script};

const OK: LabelPair = LabelPair::fixed("Check ok", "Check not ok");
const STOP: LabelPair = LabelPair::fixed("Never shown", "Stopped here");

fn viewport(session: &mut Session) -> Vec<i64> {
    session
        .broadcast(editor::BUS, editor::GET_VIEWPORT_SIZE, &[])
        .unwrap()
}

fn helpers(session: &mut Session) -> bool {
    session
        .broadcast(editor::BUS, editor::GET_HELPERS_VISIBLE, &[])
        .unwrap()
}

// =============================================================================
// Bracket
// =============================================================================

#[test]
fn prelude_creates_the_level_and_the_bracket_closes() {
    let mut session = bare_session(EditorConfig::default());
    let mut script = Script::new("bracket", |s: &mut Session, _: &ScenarioConfig| {
        s.record(&OK, true);
        Ok(())
    });
    let outcome = run_scenario(&mut session, &mut script, &ScenarioConfig::new("bracket", "Base"));

    assert!(outcome.passed);
    assert!(outcome.error.is_none());
    assert_eq!(
        session.reporter().lines(),
        [
            "Starting scenario: bracket",
            "Info: Could not open level Base",
            "Level Base is ready",
            "Check ok",
            "Finished scenario: bracket",
            RESULT_SUCCESS,
        ]
    );
    assert_eq!(session.current_level_name().unwrap().as_deref(), Some("Base"));
}

#[test]
fn soft_failure_keeps_running_but_fails_the_result() {
    let mut session = bare_session(EditorConfig::immediate());
    let mut script = Script::new("soft", |s: &mut Session, _: &ScenarioConfig| {
        s.record(&OK, false);
        s.record(&OK, true);
        Ok(())
    });
    let outcome = run_scenario(&mut session, &mut script, &ScenarioConfig::new("soft", "Base"));

    assert!(!outcome.passed);
    assert!(outcome.error.is_none());
    let lines = session.reporter().lines();
    assert!(lines.iter().any(|l| l == "Check not ok"));
    assert!(lines.iter().any(|l| l == "Check ok"));
    assert_eq!(lines.last().map(String::as_str), Some(RESULT_FAILURE));
}

#[test]
fn critical_failure_keeps_earlier_records() {
    let mut session = bare_session(EditorConfig::immediate());
    let mut script = Script::new("critical", |s: &mut Session, _: &ScenarioConfig| {
        s.record(&OK, true);
        s.critical(&STOP, false)?;
        s.record(&OK, true);
        Ok(())
    });
    let outcome =
        run_scenario(&mut session, &mut script, &ScenarioConfig::new("critical", "Base"));

    assert!(matches!(outcome.error, Some(HarnessError::Fatal(ref f)) if f.label == "Stopped here"));
    let lines = session.reporter().lines();
    assert_eq!(lines.iter().filter(|l| *l == "Check ok").count(), 1);
    assert!(!lines.iter().any(|l| l.starts_with("Scenario failed")));
}

#[test]
fn each_run_opens_its_own_bracket() {
    let mut session = bare_session(EditorConfig::immediate());
    let mut failing = Script::new("first", |s: &mut Session, _: &ScenarioConfig| {
        s.record(&OK, false);
        Ok(())
    });
    let mut passing = Script::new("second", |s: &mut Session, _: &ScenarioConfig| {
        s.record(&OK, true);
        Ok(())
    });
    let config = ScenarioConfig::new("runs", "Base");

    assert!(!run_scenario(&mut session, &mut failing, &config).passed);
    assert!(run_scenario(&mut session, &mut passing, &config).passed);
    let results: Vec<&String> = session
        .reporter()
        .lines()
        .iter()
        .filter(|l| l.starts_with("result="))
        .collect();
    assert_eq!(results, [RESULT_FAILURE, RESULT_SUCCESS]);
}

// =============================================================================
// Level Policies
// =============================================================================

#[test]
fn create_fresh_refuses_a_taken_name() {
    let mut session = bare_session(EditorConfig::immediate());
    let config = ScenarioConfig::new("fresh", "Base").with_level_policy(LevelPolicy::CreateFresh);
    let mut script = Script::new("fresh", |_: &mut Session, _: &ScenarioConfig| Ok(()));

    assert!(run_scenario(&mut session, &mut script, &config).passed);
    let outcome = run_scenario(&mut session, &mut script, &config);
    assert!(!outcome.passed);
    assert!(session
        .reporter()
        .lines()
        .iter()
        .any(|l| l == "Level Base failed to open"));
}

#[test]
fn skip_leaves_the_editor_without_a_level() {
    let mut session = bare_session(EditorConfig::immediate());
    let config = ScenarioConfig::new("skip", "Base").with_level_policy(LevelPolicy::Skip);
    let mut script = Script::new("skip", |s: &mut Session, _: &ScenarioConfig| {
        s.level_root()?;
        Ok(())
    });
    let outcome = run_scenario(&mut session, &mut script, &config);

    assert!(!outcome.passed);
    assert!(matches!(
        outcome.error.as_ref().and_then(HarnessError::engine_kind),
        Some(ErrorKind::NoLevelLoaded)
    ));
    let lines = session.reporter().lines();
    assert!(!lines.iter().any(|l| l.starts_with("Level Base")));
    assert_eq!(lines.iter().filter(|l| l.starts_with("Scenario failed")).count(), 1);
}

#[test]
fn bad_level_name_is_fatal() {
    let mut session = bare_session(EditorConfig::immediate());
    let mut ran = false;
    let mut script = Script::new("bad_name", |_: &mut Session, _: &ScenarioConfig| {
        ran = true;
        Ok(())
    });
    let outcome = run_scenario(
        &mut session,
        &mut script,
        &ScenarioConfig::new("bad_name", "no spaces allowed"),
    );

    assert!(!outcome.passed);
    assert!(matches!(outcome.error, Some(HarnessError::Fatal(_))));
    drop(script);
    assert!(!ran);
}

// =============================================================================
// Settings
// =============================================================================

#[test]
fn requested_settings_hold_only_during_the_run() {
    let mut session = bare_session(EditorConfig::immediate());
    let before_viewport = viewport(&mut session);
    let before_helpers = helpers(&mut session);
    let config = ScenarioConfig::new("settings", "Base")
        .with_viewport(640, 480)
        .with_helpers_visible(!before_helpers);

    let mut seen = (Vec::new(), before_helpers);
    let mut script = Script::new("settings", |s: &mut Session, _: &ScenarioConfig| {
        seen = (viewport(s), helpers(s));
        Ok(())
    });
    assert!(run_scenario(&mut session, &mut script, &config).passed);
    drop(script);

    assert_eq!(seen, (vec![640, 480], !before_helpers));
    assert_eq!(viewport(&mut session), before_viewport);
    assert_eq!(helpers(&mut session), before_helpers);
}

#[test]
fn game_mode_left_running_is_stopped() {
    let mut session = bare_session(EditorConfig::immediate());
    let mut script = Script::new("game", |s: &mut Session, _: &ScenarioConfig| {
        s.enter_game_mode()?;
        s.create_entity(Some("Runtime"), None, None)?;
        Ok(())
    });
    assert!(run_scenario(&mut session, &mut script, &ScenarioConfig::new("game", "Base")).passed);

    assert!(!session.is_in_game_mode().unwrap());
    assert!(session.find_entity("Runtime").unwrap().is_none());
}

// =============================================================================
// Containment
// =============================================================================

#[test]
fn losing_the_editor_mid_run_fails_without_panicking() {
    let mut session = bare_session(EditorConfig::immediate());
    let mut script = Script::new("lost", |s: &mut Session, _: &ScenarioConfig| {
        s.broadcast::<()>(editor::BUS, editor::CLOSE_EDITOR, &[])?;
        s.create_entity(None, None, None)?;
        Ok(())
    });
    let outcome = run_scenario(&mut session, &mut script, &ScenarioConfig::new("lost", "Base"));

    assert!(!outcome.passed);
    assert!(outcome.error.as_ref().is_some_and(HarnessError::is_engine_lost));
    assert!(!session.is_alive());
    assert_eq!(
        session.reporter().lines().last().map(String::as_str),
        Some(RESULT_FAILURE)
    );
    session.close_editor_gracefully();
}

#[test]
fn panic_with_a_formatted_message_is_reported() {
    let mut session = bare_session(EditorConfig::immediate());
    let mut script = Script::new("panics", |_: &mut Session, config: &ScenarioConfig| {
        panic!("lost in {}", config.level);
    });
    let outcome = run_scenario(&mut session, &mut script, &ScenarioConfig::new("panics", "Base"));

    assert!(matches!(outcome.error, Some(HarnessError::Panicked(ref m)) if m == "lost in Base"));
    assert!(session
        .reporter()
        .lines()
        .iter()
        .any(|l| l == "Scenario panicked: lost in Base"));
    assert!(session.is_alive());
    assert_eq!(viewport(&mut session), [1280, 720]);
}

#[test]
fn panic_inside_a_wait_does_not_poison_later_waits() {
    let mut session = bare_session(EditorConfig::immediate());
    let mut script = Script::new("wait_panics", |s: &mut Session, _: &ScenarioConfig| {
        s.wait_for_default(|_| panic!("predicate gave up"))?;
        Ok(())
    });
    let config = ScenarioConfig::new("wait_panics", "Base");
    let outcome = run_scenario(&mut session, &mut script, &config);
    assert!(matches!(outcome.error, Some(HarnessError::Panicked(_))));

    assert!(session.wait_for_default(|_| Ok(true)).unwrap());
    session.create_entity(None, None, None).unwrap();
    assert!(session.wait_for_propagation().unwrap());
}

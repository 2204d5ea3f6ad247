use std::path::Path;

use sb_api::{create_engine, EngineOptions};
use sb_compiler::CompileOptions;
use sb_runtime::{SpriteRecord, SpriteTable};

use crate::source::{read_script_from_dir, read_test_case};
use crate::{ExpectedEvent, ExpectedFinal, SbToolError, TestCase};

/// Upper bound on the ticks one case may request.
pub const MAX_TICKS: usize = 100_000;

const CENTER_TOLERANCE: f32 = 1e-3;

#[derive(Debug, Clone, PartialEq)]
pub struct RunReport {
    pub observed_events: Vec<ExpectedEvent>,
    pub ticks: usize,
    pub state: String,
    /// The driven sprite after the last tick; `None` once removed.
    pub sprite: Option<SpriteRecord>,
    pub sprites: usize,
    /// Code of the expected failure the case ended with.
    pub error_code: Option<String>,
}

pub fn run_case(demo_dir: &Path, case: &TestCase) -> Result<RunReport, SbToolError> {
    let source = read_script_from_dir(demo_dir)?;
    let outcome = simulate(&source, case);
    let Some(expected) = &case.expected_error else {
        return outcome;
    };

    match outcome {
        Err(SbToolError::Engine(error)) if error.code == *expected => Ok(RunReport {
            observed_events: Vec::new(),
            ticks: 0,
            state: String::new(),
            sprite: None,
            sprites: 0,
            error_code: Some(error.code),
        }),
        Err(SbToolError::Engine(error)) => Err(SbToolError::ErrorMismatch {
            expected: expected.clone(),
            actual: format!("failed with {}", error.code),
        }),
        Err(other) => Err(other),
        Ok(_) => Err(SbToolError::ErrorMismatch {
            expected: expected.clone(),
            actual: "ran without error".to_string(),
        }),
    }
}

fn simulate(source: &str, case: &TestCase) -> Result<RunReport, SbToolError> {
    let requested: usize = case.ticks.iter().map(|action| action.repeat).sum();
    if requested > MAX_TICKS {
        return Err(SbToolError::GuardExceeded {
            max_ticks: MAX_TICKS,
        });
    }

    let mut table = SpriteTable::new();
    let sprite = table.insert(case.sprite.clone());
    let mut engine = create_engine(EngineOptions {
        source: source.to_string(),
        sprite,
        map: case.map,
        compile: CompileOptions {
            reduce: case.reduce,
        },
    })?;

    let mut observed_events = Vec::new();
    let mut alive = true;
    let mut ticks = 0usize;
    for action in &case.ticks {
        for _ in 0..action.repeat {
            let before = engine.context().state().to_string();
            engine.tick(action.delta, &mut table)?;
            ticks += 1;

            observed_events.extend(
                engine
                    .take_output()
                    .into_iter()
                    .map(|text| ExpectedEvent::Print { text }),
            );
            if engine.context().state() != before {
                observed_events.push(ExpectedEvent::State {
                    name: engine.context().state().to_string(),
                });
            }
            if alive && table.get(sprite).is_none() {
                alive = false;
                observed_events.push(ExpectedEvent::Removed);
            }
        }
    }
    log::debug!("ran {} ticks, {} events", ticks, observed_events.len());

    Ok(RunReport {
        observed_events,
        ticks,
        state: engine.context().state().to_string(),
        sprite: table.get(sprite).cloned(),
        sprites: table.len(),
        error_code: None,
    })
}

pub fn assert_case(demo_dir: &Path, case_path: &Path) -> Result<RunReport, SbToolError> {
    let case = read_test_case(case_path)?;
    let report = run_case(demo_dir, &case)?;

    if report.observed_events.len() != case.expected_events.len() {
        let observed = serde_json::to_string_pretty(&report.observed_events)
            .map_err(SbToolError::EventSerialize)?;
        return Err(SbToolError::EventCountMismatch {
            expected: case.expected_events.len(),
            actual: report.observed_events.len(),
            observed,
        });
    }

    for (index, (expected, actual)) in case
        .expected_events
        .iter()
        .zip(report.observed_events.iter())
        .enumerate()
    {
        if expected != actual {
            let expected = serde_json::to_string(expected).map_err(SbToolError::EventSerialize)?;
            let actual = serde_json::to_string(actual).map_err(SbToolError::EventSerialize)?;
            return Err(SbToolError::EventMismatch {
                index,
                expected,
                actual,
            });
        }
    }

    if let Some(expected) = &case.expected_final {
        check_final(expected, &report)?;
    }
    Ok(report)
}

fn check_final(expected: &ExpectedFinal, report: &RunReport) -> Result<(), SbToolError> {
    fn mismatch(field: &'static str, expected: impl ToString, actual: impl ToString) -> SbToolError {
        SbToolError::FinalMismatch {
            field,
            expected: expected.to_string(),
            actual: actual.to_string(),
        }
    }
    const REMOVED: &str = "removed";

    if let Some(state) = &expected.state {
        if *state != report.state {
            return Err(mismatch("state", state, &report.state));
        }
    }
    if let Some(sprites) = expected.sprites {
        if sprites != report.sprites {
            return Err(mismatch("sprites", sprites, report.sprites));
        }
    }

    let record = report.sprite.as_ref();
    if let Some(center) = expected.center {
        match record.map(|record| record.center) {
            Some(actual)
                if (actual.x - center.x).abs() <= CENTER_TOLERANCE
                    && (actual.y - center.y).abs() <= CENTER_TOLERANCE => {}
            Some(actual) => return Err(mismatch("center", center, actual)),
            None => return Err(mismatch("center", center, REMOVED)),
        }
    }
    if let Some(direction) = expected.direction {
        match record.map(|record| record.direction) {
            Some(actual) if actual == direction => {}
            Some(actual) => return Err(mismatch("direction", direction.name(), actual.name())),
            None => return Err(mismatch("direction", direction.name(), REMOVED)),
        }
    }
    if let Some(animation) = &expected.animation {
        match record.map(|record| record.animation.name.as_str()) {
            Some(actual) if actual == animation.as_str() => {}
            Some(actual) => return Err(mismatch("animation", animation, actual)),
            None => return Err(mismatch("animation", animation, REMOVED)),
        }
    }
    Ok(())
}

#[cfg(test)]
mod runner_tests {
    use super::*;

    use std::fs;
    use std::path::PathBuf;
    use std::time::{SystemTime, UNIX_EPOCH};

    use sb_core::{Direction, Point};

    use crate::TickAction;

    fn temp_dir(name: &str) -> PathBuf {
        let nanos = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .expect("time should move forward")
            .as_nanos();
        std::env::temp_dir().join(format!("sb-tool-runner-{}-{}", name, nanos))
    }

    fn demo(name: &str, script: &str) -> PathBuf {
        let root = temp_dir(name);
        fs::create_dir_all(&root).expect("root should be created");
        fs::write(root.join("main.sprite"), script).expect("script should be written");
        root
    }

    fn case(ticks: Vec<TickAction>) -> TestCase {
        TestCase {
            schema_version: crate::TESTCASE_SCHEMA_V1.to_string(),
            sprite: SpriteRecord::default(),
            map: Point::new(640.0, 480.0),
            reduce: true,
            ticks,
            expected_events: Vec::new(),
            expected_final: None,
            expected_error: None,
        }
    }

    fn ticks(delta: f32, repeat: usize) -> Vec<TickAction> {
        vec![TickAction { delta, repeat }]
    }

    const GREETER: &str = "\
state main:
    print \"hello\"
    during 1s:
        wait
    go to done

state done:
    set self.direction = left
    wait
";

    #[test]
    fn run_case_observes_prints_and_state_changes() {
        let root = demo("greeter", GREETER);
        let report = run_case(&root, &case(ticks(0.5, 5))).expect("run should pass");

        assert_eq!(
            report.observed_events,
            vec![
                ExpectedEvent::Print {
                    text: "hello".to_string()
                },
                ExpectedEvent::State {
                    name: "done".to_string()
                },
            ]
        );
        assert_eq!(report.ticks, 5);
        assert_eq!(report.state, "done");
        assert_eq!(report.sprite.expect("alive").direction, Direction::Left);
    }

    #[test]
    fn run_case_reports_removal() {
        let root = demo("removal", "state main:\n    wait\n    remove\n    wait\n");
        let report = run_case(&root, &case(ticks(0.1, 3))).expect("run should pass");
        assert_eq!(report.observed_events, vec![ExpectedEvent::Removed]);
        assert!(report.sprite.is_none());
        assert_eq!(report.sprites, 0);
    }

    #[test]
    fn expected_errors_must_match() {
        let root = demo("broken", "state main:\n    set x = 1 from 2\n");
        let mut expecting = case(ticks(0.1, 1));
        expecting.expected_error = Some("PARSE_UNEXPECTED_TOKEN".to_string());
        let report = run_case(&root, &expecting).expect("expected failure");
        assert_eq!(report.error_code.as_deref(), Some("PARSE_UNEXPECTED_TOKEN"));

        expecting.expected_error = Some("LEX_BAD_INDENT".to_string());
        let error = run_case(&root, &expecting).expect_err("wrong code");
        assert!(matches!(error, SbToolError::ErrorMismatch { .. }));

        let error = run_case(&root, &case(ticks(0.1, 1))).expect_err("compile error surfaces");
        assert!(matches!(error, SbToolError::Engine(_)));

        let fine = demo("fine", "state main:\n    wait\n");
        let error = run_case(&fine, &expecting).expect_err("no failure happened");
        assert!(matches!(error, SbToolError::ErrorMismatch { .. }));
    }

    #[test]
    fn tick_budget_is_enforced() {
        let root = demo("budget", "state main:\n    wait\n");
        let error = run_case(&root, &case(ticks(0.0, MAX_TICKS + 1))).expect_err("too many ticks");
        assert!(matches!(error, SbToolError::GuardExceeded { .. }));
    }

    #[test]
    fn assert_case_compares_events_and_final_state() {
        let root = demo("assert", GREETER);
        let case_path = root.join("testcase.json");
        fs::write(
            &case_path,
            r#"{
  "schemaVersion": "sb-tool-case.v1",
  "ticks": [{"delta": 0.5, "repeat": 5}],
  "expectedEvents": [
    {"kind": "print", "text": "hello"},
    {"kind": "state", "name": "done"}
  ],
  "expectedFinal": {"state": "done", "direction": "left", "center": {"x": 0, "y": 0}, "sprites": 1}
}"#,
        )
        .expect("case should be written");
        assert_case(&root, &case_path).expect("case should pass");

        fs::write(
            &case_path,
            r#"{
  "schemaVersion": "sb-tool-case.v1",
  "ticks": [{"delta": 0.5, "repeat": 5}],
  "expectedEvents": [
    {"kind": "print", "text": "hello"},
    {"kind": "state", "name": "done"}
  ],
  "expectedFinal": {"direction": "up"}
}"#,
        )
        .expect("case should be written");
        let error = assert_case(&root, &case_path).expect_err("direction differs");
        assert!(matches!(
            error,
            SbToolError::FinalMismatch {
                field: "direction",
                ..
            }
        ));

        fs::write(
            &case_path,
            r#"{"schemaVersion": "sb-tool-case.v1", "ticks": [{"delta": 0.5}]}"#,
        )
        .expect("case should be written");
        let error = assert_case(&root, &case_path).expect_err("print not expected");
        assert!(matches!(error, SbToolError::EventCountMismatch { .. }));
    }
}

mod case;
mod runner;
mod source;

pub use case::{ExpectedEvent, ExpectedFinal, TestCase, TickAction, TESTCASE_SCHEMA_V1};
pub use runner::{assert_case, run_case, RunReport, MAX_TICKS};
pub use source::{discover_cases, read_script_from_dir, read_test_case, SCRIPT_EXTENSION};

use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum SbToolError {
    #[error("Failed to read file {path}: {source}")]
    ReadFile {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("Failed to parse testcase {path}: {source}")]
    ParseCase {
        path: PathBuf,
        source: serde_json::Error,
    },
    #[error("Invalid testcase schema version \"{found}\", expected \"{expected}\".")]
    InvalidSchemaVersion { expected: String, found: String },
    #[error("No .sprite file under {path}.")]
    SourceEmpty { path: PathBuf },
    #[error("Several .sprite files under {path} and none is main.sprite.")]
    SourceAmbiguous { path: PathBuf },
    #[error("Engine error: {0}")]
    Engine(#[from] sb_core::ScriptError),
    #[error("Expected error {expected}, but the case {actual}.")]
    ErrorMismatch { expected: String, actual: String },
    #[error("Guard exceeded: max_ticks={max_ticks}.")]
    GuardExceeded { max_ticks: usize },
    #[error("Expected event count {expected}, actual {actual}. observed={observed}")]
    EventCountMismatch {
        expected: usize,
        actual: usize,
        observed: String,
    },
    #[error("Event mismatch at index {index}. expected={expected} actual={actual}")]
    EventMismatch {
        index: usize,
        expected: String,
        actual: String,
    },
    #[error("Final {field} mismatch. expected={expected} actual={actual}")]
    FinalMismatch {
        field: &'static str,
        expected: String,
        actual: String,
    },
    #[error("Failed to serialize event for diff: {0}")]
    EventSerialize(serde_json::Error),
}

use std::fs;
use std::path::{Path, PathBuf};

use walkdir::WalkDir;

use crate::{SbToolError, TestCase, TESTCASE_SCHEMA_V1};

pub const SCRIPT_EXTENSION: &str = "sprite";
const ENTRY_FILE: &str = "main.sprite";
const CASE_FILE: &str = "testcase.json";

/// Reads the script of a demo directory: `main.sprite`, or the only
/// `.sprite` file in it.
pub fn read_script_from_dir(demo_dir: &Path) -> Result<String, SbToolError> {
    let mut scripts: Vec<PathBuf> = WalkDir::new(demo_dir)
        .max_depth(1)
        .follow_links(false)
        .into_iter()
        .filter_map(Result::ok)
        .filter(|entry| entry.file_type().is_file())
        .map(|entry| entry.into_path())
        .filter(|path| path.extension().and_then(|ext| ext.to_str()) == Some(SCRIPT_EXTENSION))
        .collect();
    scripts.sort();

    let script = match scripts.as_slice() {
        [] => {
            return Err(SbToolError::SourceEmpty {
                path: demo_dir.to_path_buf(),
            })
        }
        [only] => only.clone(),
        many => many
            .iter()
            .find(|path| path.file_name().and_then(|name| name.to_str()) == Some(ENTRY_FILE))
            .cloned()
            .ok_or_else(|| SbToolError::SourceAmbiguous {
                path: demo_dir.to_path_buf(),
            })?,
    };

    fs::read_to_string(&script).map_err(|source| SbToolError::ReadFile {
        path: script,
        source,
    })
}

pub fn read_test_case(case_path: &Path) -> Result<TestCase, SbToolError> {
    let raw = fs::read_to_string(case_path).map_err(|source| SbToolError::ReadFile {
        path: case_path.to_path_buf(),
        source,
    })?;
    let parsed: TestCase = serde_json::from_str(&raw).map_err(|source| SbToolError::ParseCase {
        path: case_path.to_path_buf(),
        source,
    })?;

    if parsed.schema_version != TESTCASE_SCHEMA_V1 {
        return Err(SbToolError::InvalidSchemaVersion {
            expected: TESTCASE_SCHEMA_V1.to_string(),
            found: parsed.schema_version,
        });
    }

    Ok(parsed)
}

/// Demo directories under `root` holding a `testcase.json`, sorted.
pub fn discover_cases(root: &Path) -> Vec<PathBuf> {
    let mut cases: Vec<PathBuf> = WalkDir::new(root)
        .follow_links(false)
        .into_iter()
        .filter_map(Result::ok)
        .filter(|entry| entry.file_type().is_file() && entry.file_name() == CASE_FILE)
        .filter_map(|entry| entry.path().parent().map(Path::to_path_buf))
        .collect();
    cases.sort();
    cases
}

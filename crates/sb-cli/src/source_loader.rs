use std::fs;
use std::path::{Path, PathBuf};

use sb_core::ScriptError;

use crate::map_cli_source_read;

/// File a directory argument resolves to.
pub(crate) const ENTRY_FILE: &str = "main.sprite";

#[derive(Debug, Clone)]
pub(crate) struct LoadedSource {
    /// Directory name for `dir/main.sprite`, file stem otherwise.
    pub(crate) name: String,
    pub(crate) path: PathBuf,
    pub(crate) source: String,
}

pub(crate) fn load_source(path: &Path) -> Result<LoadedSource, ScriptError> {
    let file = resolve_source_path(path)?;
    let source = fs::read_to_string(&file).map_err(map_cli_source_read)?;
    Ok(LoadedSource {
        name: script_name(&file),
        path: file,
        source,
    })
}

pub(crate) fn resolve_source_path(path: &Path) -> Result<PathBuf, ScriptError> {
    if !path.exists() {
        return Err(ScriptError::new(
            "CLI_SOURCE_NOT_FOUND",
            format!("source does not exist: {}", path.display()),
        ));
    }
    if !path.is_dir() {
        return Ok(path.to_path_buf());
    }

    let entry = path.join(ENTRY_FILE);
    if !entry.is_file() {
        return Err(ScriptError::new(
            "CLI_SOURCE_NO_ENTRY",
            format!("{} has no {}", path.display(), ENTRY_FILE),
        ));
    }
    Ok(entry)
}

fn script_name(file: &Path) -> String {
    let from_dir = if file.file_name().and_then(|name| name.to_str()) == Some(ENTRY_FILE) {
        file.parent()
            .and_then(Path::file_name)
            .and_then(|name| name.to_str())
    } else {
        None
    };
    from_dir
        .or_else(|| file.file_stem().and_then(|stem| stem.to_str()))
        .unwrap_or("behavior")
        .to_string()
}

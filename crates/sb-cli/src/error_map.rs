use sb_core::ScriptError;
use std::fmt::Display;

fn map_error(code: &'static str, error: impl Display) -> ScriptError {
    ScriptError::new(code, error.to_string())
}

/// Prints the error block and returns the exit code. Spans are reported as
/// 1-based line:column pairs when the source is at hand.
pub(crate) fn emit_error(error: ScriptError, source: Option<&str>) -> i32 {
    println!("RESULT:ERROR");
    println!("ERROR_CODE:{}", error.code);
    println!(
        "ERROR_MSG_JSON:{}",
        serde_json::to_string(&error.message).unwrap_or_else(|_| "\"Unknown error\"".to_string())
    );
    if let (Some(span), Some(source)) = (error.span, source) {
        let (start, end) = span.locate(source);
        println!(
            "ERROR_AT:{}:{}-{}:{}",
            start.line, start.column, end.line, end.column
        );
    }
    1
}

pub(crate) fn map_cli_source_read(error: std::io::Error) -> ScriptError {
    map_error("CLI_SOURCE_READ", error)
}

pub(crate) fn map_cli_output_write(error: std::io::Error) -> ScriptError {
    map_error("CLI_OUTPUT_WRITE", error)
}

pub(crate) fn map_cli_json(error: serde_json::Error) -> ScriptError {
    map_error("CLI_JSON", error)
}

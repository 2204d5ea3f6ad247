use crate::types::SourceSpan;
use thiserror::Error;

#[derive(Debug, Error, Clone)]
#[error("{code}: {message}")]
pub struct ScriptError {
    pub code: String,
    pub message: String,
    pub span: Option<SourceSpan>,
}

impl ScriptError {
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
            span: None,
        }
    }

    pub fn with_span(
        code: impl Into<String>,
        message: impl Into<String>,
        span: SourceSpan,
    ) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
            span: Some(span),
        }
    }
}

/// Failure of the tokenizer. Both variants carry the source range the
/// editor underlines.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum LexError {
    #[error(
        "unexpected \"{snippet}\" after {current}, expected one of: {}",
        .expected.join(", ")
    )]
    ExpectedTokenNotFound {
        current: &'static str,
        expected: Vec<&'static str>,
        snippet: String,
        span: SourceSpan,
    },
    #[error("indentation of {found} is not a multiple of the indent unit {expected}")]
    BadIndent {
        expected: usize,
        found: usize,
        span: SourceSpan,
    },
}

impl LexError {
    pub fn span(&self) -> SourceSpan {
        match self {
            Self::ExpectedTokenNotFound { span, .. } | Self::BadIndent { span, .. } => *span,
        }
    }

    pub fn code(&self) -> &'static str {
        match self {
            Self::ExpectedTokenNotFound { .. } => "LEX_EXPECTED_TOKEN_NOT_FOUND",
            Self::BadIndent { .. } => "LEX_BAD_INDENT",
        }
    }
}

#[derive(Debug, Error, Clone, PartialEq)]
#[error("unexpected {token}: {expected}")]
pub struct ParseError {
    pub token: &'static str,
    pub expected: String,
    pub span: SourceSpan,
}

impl ParseError {
    pub fn new(token: &'static str, expected: impl Into<String>, span: SourceSpan) -> Self {
        Self {
            token,
            expected: expected.into(),
            span,
        }
    }
}

/// Unresolvable symbolic name.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum LookupError {
    #[error("unknown operator \"{0}\"")]
    UnknownOperator(String),
    #[error("unknown direction \"{0}\"")]
    UnknownDirection(String),
    #[error("unknown duration unit \"{0}\"")]
    UnknownDurationUnit(String),
    #[error("token {0} does not denote a literal value")]
    NotALiteral(&'static str),
    #[error("malformed literal \"{0}\"")]
    MalformedLiteral(String),
}

impl LookupError {
    pub fn code(&self) -> &'static str {
        match self {
            Self::UnknownOperator(_) => "LOOKUP_UNKNOWN_OPERATOR",
            Self::UnknownDirection(_) => "LOOKUP_UNKNOWN_DIRECTION",
            Self::UnknownDurationUnit(_) => "LOOKUP_UNKNOWN_DURATION_UNIT",
            Self::NotALiteral(_) => "LOOKUP_NOT_A_LITERAL",
            Self::MalformedLiteral(_) => "LOOKUP_MALFORMED_LITERAL",
        }
    }
}

impl From<LexError> for ScriptError {
    fn from(error: LexError) -> Self {
        Self::with_span(error.code(), error.to_string(), error.span())
    }
}

impl From<ParseError> for ScriptError {
    fn from(error: ParseError) -> Self {
        Self::with_span("PARSE_UNEXPECTED_TOKEN", error.to_string(), error.span)
    }
}

impl From<LookupError> for ScriptError {
    fn from(error: LookupError) -> Self {
        Self::new(error.code(), error.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lex_error_converts_with_code_and_span() {
        let error = LexError::BadIndent {
            expected: 4,
            found: 6,
            span: SourceSpan::new(12, 18),
        };
        let converted = ScriptError::from(error);
        assert_eq!(converted.code, "LEX_BAD_INDENT");
        assert_eq!(converted.span, Some(SourceSpan::new(12, 18)));
        assert!(converted.message.contains("multiple of the indent unit 4"));
    }

    #[test]
    fn expected_token_message_lists_expected_set() {
        let error = LexError::ExpectedTokenNotFound {
            current: "newLine",
            expected: vec!["state", "comment"],
            snippet: "?!".to_string(),
            span: SourceSpan::new(0, 2),
        };
        assert_eq!(
            error.to_string(),
            "unexpected \"?!\" after newLine, expected one of: state, comment"
        );
    }

    #[test]
    fn lookup_error_keeps_code() {
        let converted = ScriptError::from(LookupError::UnknownDirection("north".to_string()));
        assert_eq!(converted.code, "LOOKUP_UNKNOWN_DIRECTION");
        assert!(converted.span.is_none());
    }
}

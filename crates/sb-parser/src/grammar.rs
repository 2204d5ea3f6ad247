use std::fmt::Debug;
use std::hash::Hash;

use regex::Regex;
use sb_core::SourceSpan;

pub trait GrammarToken: Copy + Eq + Hash + Debug {
    fn name(self) -> &'static str;
}

/// Token vocabulary plus the rules the lexer scans with: which tokens may
/// follow a given token, in priority order, and the anchored pattern of each.
pub trait Grammar {
    type Token: GrammarToken;

    /// Sentinel current token at the start of the source.
    const NEW_LINE: Self::Token;
    /// Token split into indent units, for indentation-sensitive grammars.
    const INDENT: Option<Self::Token>;
    const END_OF_FILE: Self::Token;
    const SYNTAX_ERROR: Self::Token;

    fn tokens_expected(&self, after: Self::Token) -> &[Self::Token];

    /// Pattern anchored with `^`; `None` for tokens that are only synthesized.
    fn pattern(&self, token: Self::Token) -> Option<&Regex>;
}

#[derive(Debug, Clone, PartialEq)]
pub struct FoundToken<T> {
    pub token: T,
    /// Whole match first, then each capture group (empty when unmatched).
    pub captures: Vec<String>,
    pub span: SourceSpan,
}

impl<T: Copy> FoundToken<T> {
    pub fn new(token: T, captures: Vec<String>, span: SourceSpan) -> Self {
        Self {
            token,
            captures,
            span,
        }
    }

    pub fn synthetic(token: T, at: usize) -> Self {
        Self {
            token,
            captures: vec![String::new()],
            span: SourceSpan::new(at, at),
        }
    }

    pub fn text(&self) -> &str {
        self.captures.first().map(String::as_str).unwrap_or_default()
    }

    pub fn capture(&self, index: usize) -> &str {
        self.captures.get(index).map(String::as_str).unwrap_or_default()
    }
}

use std::collections::HashMap;
use std::sync::OnceLock;

use regex::Regex;

use crate::grammar::{Grammar, GrammarToken};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CToken {
    NewLine,
    Whitespace,
    Comment,
    Preprocessor,
    Keyword,
    TypeName,
    Identifier,
    Number,
    String,
    Character,
    Operator,
    Punctuation,
    EndOfFile,
    SyntaxError,
}

impl GrammarToken for CToken {
    fn name(self) -> &'static str {
        match self {
            Self::NewLine => "newLine",
            Self::Whitespace => "whitespace",
            Self::Comment => "comment",
            Self::Preprocessor => "preprocessor",
            Self::Keyword => "keyword",
            Self::TypeName => "typeName",
            Self::Identifier => "identifier",
            Self::Number => "number",
            Self::String => "string",
            Self::Character => "character",
            Self::Operator => "operator",
            Self::Punctuation => "punctuation",
            Self::EndOfFile => "endOfFile",
            Self::SyntaxError => "syntaxError",
        }
    }
}

const ANY: [CToken; 12] = [
    CToken::NewLine,
    CToken::Whitespace,
    CToken::Comment,
    CToken::Preprocessor,
    CToken::String,
    CToken::Character,
    CToken::Number,
    CToken::Keyword,
    CToken::TypeName,
    CToken::Identifier,
    CToken::Operator,
    CToken::Punctuation,
];

/// Flat C token grammar used to highlight and sanity-check generated code.
pub struct CGrammar {
    patterns: HashMap<CToken, Regex>,
}

impl CGrammar {
    pub fn new() -> Self {
        let sources = [
            (CToken::NewLine, r"^\r?\n"),
            (CToken::Whitespace, r"^[ \t]+"),
            (CToken::Comment, r"^(?://[^\n]*|/\*(?s:.*?)\*/)"),
            (CToken::Preprocessor, r"^#[^\n]*"),
            (
                CToken::Keyword,
                r"^(?:if|else|while|for|do|return|switch|case|default|break|continue|static|const|struct|typedef|enum|extern|sizeof|goto|inline)\b",
            ),
            (
                CToken::TypeName,
                r"^(?:void|int|float|double|char|bool|long|short|unsigned|signed|int32_t|uint8_t|[A-Z][A-Za-z0-9]*)\b",
            ),
            (CToken::Identifier, r"^[A-Za-z_][A-Za-z0-9_]*"),
            (
                CToken::Number,
                r"^(?:0[xX][0-9A-Fa-f]+|[0-9]+(?:\.[0-9]+)?(?:[eE][-+]?[0-9]+)?[fFuUlL]*)",
            ),
            (CToken::String, r#"^"(?:[^"\\\n]|\\.)*""#),
            (CToken::Character, r"^'(?:[^'\\\n]|\\.)'"),
            (
                CToken::Operator,
                r"^(?:->|\+\+|--|<<=|>>=|<<|>>|&&|\|\||[-+*/%&|^!<>=]=?|[~?:])",
            ),
            (CToken::Punctuation, r"^[{}()\[\];,.]"),
        ];
        let patterns = sources
            .into_iter()
            .map(|(token, source)| {
                let pattern = Regex::new(source).expect("token pattern must compile");
                (token, pattern)
            })
            .collect();
        Self { patterns }
    }

    pub fn shared() -> &'static CGrammar {
        static GRAMMAR: OnceLock<CGrammar> = OnceLock::new();
        GRAMMAR.get_or_init(CGrammar::new)
    }
}

impl Default for CGrammar {
    fn default() -> Self {
        Self::new()
    }
}

impl Grammar for CGrammar {
    type Token = CToken;

    const NEW_LINE: CToken = CToken::NewLine;
    const INDENT: Option<CToken> = None;
    const END_OF_FILE: CToken = CToken::EndOfFile;
    const SYNTAX_ERROR: CToken = CToken::SyntaxError;

    fn tokens_expected(&self, after: CToken) -> &[CToken] {
        match after {
            CToken::EndOfFile | CToken::SyntaxError => &[],
            _ => &ANY,
        }
    }

    fn pattern(&self, token: CToken) -> Option<&Regex> {
        self.patterns.get(&token)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lexer::Lexer;

    #[test]
    fn tokenizes_c_source() {
        let source = "#include \"sprite.h\"\nstatic void run(Sprite *self) {\n    self->frame.origin.x += 2.5f; // move\n}\n";
        let tokens = Lexer::new(CGrammar::shared())
            .tokenize(source)
            .expect("c source should tokenize");
        let kinds: Vec<_> = tokens.iter().map(|found| found.token).collect();
        assert_eq!(kinds.first(), Some(&CToken::Preprocessor));
        assert!(kinds.contains(&CToken::Keyword));
        assert!(kinds.contains(&CToken::TypeName));
        assert!(kinds.contains(&CToken::Comment));
        assert_eq!(kinds.last(), Some(&CToken::EndOfFile));
        assert!(tokens
            .iter()
            .any(|found| found.token == CToken::Operator && found.text() == "->"));
        assert!(tokens
            .iter()
            .any(|found| found.token == CToken::Number && found.text() == "2.5f"));
    }

    #[test]
    fn rejects_stray_characters() {
        let error = Lexer::new(CGrammar::shared())
            .tokenize("int a = `b`;\n")
            .expect_err("backtick is not C");
        assert_eq!(error.code(), "LEX_EXPECTED_TOKEN_NOT_FOUND");
    }
}

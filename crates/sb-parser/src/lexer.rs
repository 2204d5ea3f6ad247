use sb_core::{LexError, SourceSpan};

use crate::grammar::{FoundToken, Grammar, GrammarToken};

const SNIPPET_CHARS: usize = 10;

/// Tokens scanned so far and, when scanning stopped early, why.
#[derive(Debug, Clone, PartialEq)]
pub struct Scan<T> {
    pub tokens: Vec<FoundToken<T>>,
    pub failure: Option<LexError>,
}

pub struct Lexer<'g, G: Grammar> {
    grammar: &'g G,
}

impl<'g, G: Grammar> Lexer<'g, G> {
    pub fn new(grammar: &'g G) -> Self {
        Self { grammar }
    }

    pub fn tokenize(&self, source: &str) -> Result<Vec<FoundToken<G::Token>>, LexError> {
        let scan = self.scan(source);
        match scan.failure {
            Some(error) => Err(error),
            None => Ok(scan.tokens),
        }
    }

    /// Scans the whole source. On failure the token list ends with a syntax
    /// error token covering the offending text.
    pub fn scan(&self, source: &str) -> Scan<G::Token> {
        let mut tokens = Vec::new();
        let mut current = G::NEW_LINE;
        let mut cursor = 0;
        let mut indent_unit: Option<usize> = None;

        while cursor < source.len() {
            let rest = &source[cursor..];
            let expected = self.grammar.tokens_expected(current);

            let Some((token, captures)) = self.match_first(expected, rest) else {
                let snippet: String = rest.chars().take(SNIPPET_CHARS).collect();
                let span = SourceSpan::new(cursor, cursor + snippet.len());
                tokens.push(FoundToken::new(
                    G::SYNTAX_ERROR,
                    vec![snippet.clone()],
                    span,
                ));
                return Scan {
                    tokens,
                    failure: Some(LexError::ExpectedTokenNotFound {
                        current: current.name(),
                        expected: expected.iter().map(|token| token.name()).collect(),
                        snippet,
                        span,
                    }),
                };
            };

            let length = captures[0].len();
            let span = SourceSpan::new(cursor, cursor + length);

            if Some(token) == G::INDENT {
                let unit = *indent_unit.get_or_insert(length);
                if length % unit != 0 {
                    tokens.push(FoundToken::new(G::SYNTAX_ERROR, captures, span));
                    return Scan {
                        tokens,
                        failure: Some(LexError::BadIndent {
                            expected: unit,
                            found: length,
                            span,
                        }),
                    };
                }
                for step in 0..length / unit {
                    let start = cursor + step * unit;
                    tokens.push(FoundToken::new(
                        token,
                        vec![source[start..start + unit].to_string()],
                        SourceSpan::new(start, start + unit),
                    ));
                }
            } else {
                tokens.push(FoundToken::new(token, captures, span));
            }

            cursor += length;
            current = token;
        }

        if cursor > 0 && current != G::NEW_LINE {
            tokens.push(FoundToken::synthetic(G::NEW_LINE, source.len()));
        }
        tokens.push(FoundToken::synthetic(G::END_OF_FILE, source.len()));

        Scan {
            tokens,
            failure: None,
        }
    }

    fn match_first(&self, expected: &[G::Token], rest: &str) -> Option<(G::Token, Vec<String>)> {
        expected.iter().find_map(|token| {
            let captures = self.grammar.pattern(*token)?.captures(rest)?;
            let whole = captures.get(0)?;
            if whole.start() != 0 || whole.is_empty() {
                return None;
            }
            let values = captures
                .iter()
                .map(|group| group.map(|m| m.as_str().to_string()).unwrap_or_default())
                .collect();
            Some((*token, values))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::script_grammar::{ScriptGrammar, Token};

    fn kinds(source: &str) -> Vec<Token> {
        Lexer::new(ScriptGrammar::shared())
            .tokenize(source)
            .expect("source should tokenize")
            .into_iter()
            .map(|found| found.token)
            .collect()
    }

    fn assert_covers(source: &str) {
        let tokens = Lexer::new(ScriptGrammar::shared())
            .tokenize(source)
            .expect("source should tokenize");
        let mut cursor = 0;
        for found in &tokens {
            assert_eq!(found.span.start, cursor, "gap before {:?}", found);
            cursor = found.span.end;
        }
        assert_eq!(cursor, source.len());
        assert_eq!(tokens.last().map(|found| found.token), Some(Token::EndOfFile));
    }

    #[test]
    fn tokenizes_state_with_indented_statements() {
        assert_eq!(
            kinds("state main:\n    set x = 1\n    wait\n"),
            vec![
                Token::State,
                Token::NewLine,
                Token::Indent,
                Token::AssignmentStart,
                Token::Integer,
                Token::NewLine,
                Token::Indent,
                Token::Instruction,
                Token::NewLine,
                Token::EndOfFile,
            ]
        );
    }

    #[test]
    fn synthesizes_trailing_newline() {
        assert_eq!(
            kinds("state main:\n  wait"),
            vec![
                Token::State,
                Token::NewLine,
                Token::Indent,
                Token::Instruction,
                Token::NewLine,
                Token::EndOfFile,
            ]
        );
        assert_eq!(kinds(""), vec![Token::EndOfFile]);
    }

    #[test]
    fn tokens_cover_source_without_gaps() {
        assert_covers("state main:\n    set x = (2 + 3) * -4 # note\n\n    during 2s ease true:\n        stride self.center.x from 0 to 10\n");
        assert_covers("# only a comment");
        assert_covers("state a:\n\tif self.direction == left:\n\t\tgo to b\nstate b:\n\twait\n");
    }

    #[test]
    fn splits_indentation_into_units() {
        let tokens = Lexer::new(ScriptGrammar::shared())
            .tokenize("state main:\n  if true:\n    wait\n")
            .expect("tokenize");
        let indents: Vec<_> = tokens
            .iter()
            .filter(|found| found.token == Token::Indent)
            .map(|found| found.span.len())
            .collect();
        assert_eq!(indents, vec![2, 2, 2]);
    }

    #[test]
    fn rejects_indent_that_is_not_a_multiple_of_the_unit() {
        let error = Lexer::new(ScriptGrammar::shared())
            .tokenize("state main:\n    if true:\n      wait\n")
            .expect_err("bad indent should fail");
        assert!(matches!(
            error,
            LexError::BadIndent {
                expected: 4,
                found: 6,
                ..
            }
        ));
    }

    #[test]
    fn reports_unexpected_text_with_expected_set() {
        let scan = Lexer::new(ScriptGrammar::shared()).scan("state main:\n    set x = $$$$$$$$$$$$$$\n");
        let Some(LexError::ExpectedTokenNotFound {
            current,
            expected,
            snippet,
            span,
        }) = scan.failure
        else {
            panic!("expected a lexing failure");
        };
        assert_eq!(current, "assignmentStart");
        assert!(expected.contains(&"integer"));
        assert_eq!(snippet, "$$$$$$$$$$");
        assert_eq!(span.len(), 10);
        assert_eq!(
            scan.tokens.last().map(|found| found.token),
            Some(Token::SyntaxError)
        );
    }

    #[test]
    fn statements_at_column_zero_are_rejected() {
        let error = Lexer::new(ScriptGrammar::shared())
            .tokenize("wait\n")
            .expect_err("statement outside state should fail");
        assert_eq!(error.code(), "LEX_EXPECTED_TOKEN_NOT_FOUND");
    }
}

use std::collections::HashMap;
use std::sync::OnceLock;

use regex::Regex;
use sb_core::{Direction, LookupError, Point, Value};

use crate::grammar::{FoundToken, Grammar, GrammarToken};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Token {
    NewLine,
    Indent,
    Comment,
    State,
    GroupStart,
    Instruction,
    AssignmentStart,
    ArgumentName,
    BlockStart,
    Integer,
    Decimal,
    Duration,
    Boolean,
    Point,
    Direction,
    AnimationName,
    String,
    VariablePath,
    BinaryOperator,
    UnaryOperator,
    OpenParen,
    CloseParen,
    EndOfFile,
    SyntaxError,
}

impl GrammarToken for Token {
    fn name(self) -> &'static str {
        match self {
            Self::NewLine => "newLine",
            Self::Indent => "indent",
            Self::Comment => "comment",
            Self::State => "state",
            Self::GroupStart => "groupStart",
            Self::Instruction => "instruction",
            Self::AssignmentStart => "assignmentStart",
            Self::ArgumentName => "argumentName",
            Self::BlockStart => "blockStart",
            Self::Integer => "integer",
            Self::Decimal => "decimal",
            Self::Duration => "duration",
            Self::Boolean => "boolean",
            Self::Point => "point",
            Self::Direction => "direction",
            Self::AnimationName => "animationName",
            Self::String => "string",
            Self::VariablePath => "variablePath",
            Self::BinaryOperator => "binaryOperator",
            Self::UnaryOperator => "unaryOperator",
            Self::OpenParen => "openParen",
            Self::CloseParen => "closeParen",
            Self::EndOfFile => "endOfFile",
            Self::SyntaxError => "syntaxError",
        }
    }
}

impl Token {
    pub fn is_literal(self) -> bool {
        matches!(
            self,
            Self::Integer
                | Self::Decimal
                | Self::Duration
                | Self::Boolean
                | Self::Point
                | Self::Direction
                | Self::AnimationName
                | Self::String
        )
    }
}

const IDENTIFIER: &str = "[A-Za-z_][A-Za-z0-9_]*";
const NUMBER: &str = "-?[0-9]+(?:\\.[0-9]+)?";

/// Keywords introducing a named argument. A variable spelled like one of
/// these cannot appear as a leading positional argument.
pub const ARGUMENT_KEYWORDS: [&str; 8] = [
    "from",
    "to",
    "by",
    "ease",
    "height",
    "at",
    "animation",
    "definition",
];

const OPERAND_START: [Token; 11] = [
    Token::UnaryOperator,
    Token::Point,
    Token::OpenParen,
    Token::Duration,
    Token::Decimal,
    Token::Integer,
    Token::Boolean,
    Token::Direction,
    Token::AnimationName,
    Token::String,
    Token::VariablePath,
];

const AFTER_LINE_START: [Token; 4] = [Token::NewLine, Token::Comment, Token::State, Token::Indent];
const AFTER_INDENT: [Token; 5] = [
    Token::NewLine,
    Token::Comment,
    Token::GroupStart,
    Token::AssignmentStart,
    Token::Instruction,
];
const AFTER_HEADER: [Token; 2] = [Token::NewLine, Token::Comment];
const AFTER_COMMENT: [Token; 1] = [Token::NewLine];
const AFTER_OPERAND: [Token; 6] = [
    Token::BinaryOperator,
    Token::CloseParen,
    Token::BlockStart,
    Token::ArgumentName,
    Token::Comment,
    Token::NewLine,
];

/// Token rules of the behavior script language.
pub struct ScriptGrammar {
    patterns: HashMap<Token, Regex>,
    after_group: Vec<Token>,
    after_instruction: Vec<Token>,
    after_argument_name: Vec<Token>,
}

impl ScriptGrammar {
    pub fn new() -> Self {
        let keywords = ARGUMENT_KEYWORDS.join("|");
        let sources = [
            (Token::NewLine, "^[ \\t]*\\r?\\n".to_string()),
            (Token::Indent, "^[ \\t]+".to_string()),
            (Token::Comment, "^[ \\t]*#[^\\n]*".to_string()),
            (
                Token::State,
                format!("^state[ \\t]+({IDENTIFIER})[ \\t]*:"),
            ),
            (
                Token::GroupStart,
                "^(during|if|else|while|jump)\\b[ \\t]*".to_string(),
            ),
            (
                Token::AssignmentStart,
                format!("^set[ \\t]+({IDENTIFIER}(?:\\.{IDENTIFIER})*)[ \\t]*=[ \\t]*"),
            ),
            (Token::Instruction, format!("^({IDENTIFIER})\\b[ \\t]*")),
            (
                Token::ArgumentName,
                format!("^[ \\t]*({keywords})\\b[ \\t]*"),
            ),
            (Token::BlockStart, "^[ \\t]*:".to_string()),
            (Token::Integer, "^[ \\t]*([0-9]+)".to_string()),
            (Token::Decimal, "^[ \\t]*([0-9]+\\.[0-9]+)".to_string()),
            (
                Token::Duration,
                "^[ \\t]*([0-9]+(?:\\.[0-9]+)?)(ms|s|m)\\b".to_string(),
            ),
            (Token::Boolean, "^[ \\t]*(true|false)\\b".to_string()),
            (
                Token::Point,
                format!("^[ \\t]*\\([ \\t]*({NUMBER})[ \\t]*,[ \\t]*({NUMBER})[ \\t]*\\)"),
            ),
            (Token::Direction, "^[ \\t]*(up|down|left|right)\\b".to_string()),
            (Token::AnimationName, format!("^[ \\t]*@({IDENTIFIER})")),
            (
                Token::String,
                "^[ \\t]*\"((?:[^\"\\\\\\n]|\\\\.)*)\"".to_string(),
            ),
            (
                Token::VariablePath,
                format!("^[ \\t]*({IDENTIFIER}(?:\\.{IDENTIFIER})*)"),
            ),
            (
                Token::BinaryOperator,
                "^[ \\t]*(==|!=|<=|>=|&&|\\|\\||[-+*/%<>])".to_string(),
            ),
            (Token::UnaryOperator, "^[ \\t]*(-|!|not\\b)".to_string()),
            (Token::OpenParen, "^[ \\t]*\\(".to_string()),
            (Token::CloseParen, "^[ \\t]*\\)".to_string()),
        ];

        let patterns = sources
            .into_iter()
            .map(|(token, source)| {
                let pattern = Regex::new(&source).expect("token pattern must compile");
                (token, pattern)
            })
            .collect();

        let with_operands = |prefix: &[Token]| {
            let mut tokens = prefix.to_vec();
            tokens.extend(OPERAND_START);
            tokens
        };

        Self {
            patterns,
            after_group: with_operands(&[Token::BlockStart, Token::ArgumentName]),
            after_instruction: with_operands(&[Token::NewLine, Token::Comment, Token::ArgumentName]),
            after_argument_name: OPERAND_START.to_vec(),
        }
    }

    pub fn shared() -> &'static ScriptGrammar {
        static GRAMMAR: OnceLock<ScriptGrammar> = OnceLock::new();
        GRAMMAR.get_or_init(ScriptGrammar::new)
    }
}

impl Default for ScriptGrammar {
    fn default() -> Self {
        Self::new()
    }
}

impl Grammar for ScriptGrammar {
    type Token = Token;

    const NEW_LINE: Token = Token::NewLine;
    const INDENT: Option<Token> = Some(Token::Indent);
    const END_OF_FILE: Token = Token::EndOfFile;
    const SYNTAX_ERROR: Token = Token::SyntaxError;

    fn tokens_expected(&self, after: Token) -> &[Token] {
        match after {
            Token::NewLine => &AFTER_LINE_START,
            Token::Indent => &AFTER_INDENT,
            Token::Comment => &AFTER_COMMENT,
            Token::State | Token::BlockStart => &AFTER_HEADER,
            Token::GroupStart => &self.after_group,
            Token::Instruction => &self.after_instruction,
            Token::AssignmentStart
            | Token::ArgumentName
            | Token::BinaryOperator
            | Token::UnaryOperator
            | Token::OpenParen => &self.after_argument_name,
            Token::Integer
            | Token::Decimal
            | Token::Duration
            | Token::Boolean
            | Token::Point
            | Token::Direction
            | Token::AnimationName
            | Token::String
            | Token::VariablePath
            | Token::CloseParen => &AFTER_OPERAND,
            Token::EndOfFile | Token::SyntaxError => &[],
        }
    }

    fn pattern(&self, token: Token) -> Option<&Regex> {
        self.patterns.get(&token)
    }
}

impl FoundToken<Token> {
    /// Literal value carried by a literal token.
    pub fn value(&self) -> Result<Value, LookupError> {
        let text = self.capture(1);
        let malformed = || LookupError::MalformedLiteral(self.text().trim().to_string());
        match self.token {
            Token::Integer => text.parse().map(Value::Integer).map_err(|_| malformed()),
            Token::Decimal => text.parse().map(Value::Decimal).map_err(|_| malformed()),
            Token::Duration => {
                let amount: f32 = text.parse().map_err(|_| malformed())?;
                let seconds = match self.capture(2) {
                    "ms" => amount / 1000.0,
                    "s" => amount,
                    "m" => amount * 60.0,
                    unit => return Err(LookupError::UnknownDurationUnit(unit.to_string())),
                };
                Ok(Value::Decimal(seconds))
            }
            Token::Boolean => Ok(Value::Boolean(text == "true")),
            Token::Point => {
                let x: f32 = text.parse().map_err(|_| malformed())?;
                let y: f32 = self.capture(2).parse().map_err(|_| malformed())?;
                Ok(Value::Point(Point::new(x, y)))
            }
            Token::Direction => Direction::from_name(text).map(Value::Direction),
            Token::AnimationName => Ok(Value::AnimationName(text.to_string())),
            Token::String => Ok(Value::String(unescape(text))),
            other => Err(LookupError::NotALiteral(other.name())),
        }
    }
}

fn unescape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut chars = text.chars();
    while let Some(ch) = chars.next() {
        if ch != '\\' {
            out.push(ch);
            continue;
        }
        match chars.next() {
            Some('n') => out.push('\n'),
            Some('t') => out.push('\t'),
            Some(other) => out.push(other),
            None => out.push('\\'),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lexer::Lexer;

    fn literal(text: &str) -> (Token, Value) {
        let source = format!("state main:\n    set x = {}\n", text);
        let tokens = Lexer::new(ScriptGrammar::shared())
            .tokenize(&source)
            .expect("literal should tokenize");
        let found = tokens
            .iter()
            .find(|found| found.token.is_literal())
            .expect("a literal token");
        (found.token, found.value().expect("literal value"))
    }

    #[test]
    fn literal_forms_map_to_values() {
        assert_eq!(literal("42"), (Token::Integer, Value::Integer(42)));
        assert_eq!(literal("1.5"), (Token::Decimal, Value::Decimal(1.5)));
        assert_eq!(literal("2s"), (Token::Duration, Value::Decimal(2.0)));
        assert_eq!(literal("500ms"), (Token::Duration, Value::Decimal(0.5)));
        assert_eq!(literal("1m"), (Token::Duration, Value::Decimal(60.0)));
        assert_eq!(literal("true"), (Token::Boolean, Value::Boolean(true)));
        assert_eq!(
            literal("(1, -2.5)"),
            (Token::Point, Value::Point(Point::new(1.0, -2.5)))
        );
        assert_eq!(
            literal("left"),
            (Token::Direction, Value::Direction(Direction::Left))
        );
        assert_eq!(
            literal("@walk"),
            (Token::AnimationName, Value::AnimationName("walk".to_string()))
        );
        assert_eq!(
            literal("\"a \\\"b\\\"\\n\""),
            (Token::String, Value::String("a \"b\"\n".to_string()))
        );
    }

    #[test]
    fn non_literal_tokens_have_no_value() {
        let found = FoundToken::new(
            Token::VariablePath,
            vec!["x".to_string(), "x".to_string()],
            sb_core::SourceSpan::new(0, 1),
        );
        assert_eq!(found.value(), Err(LookupError::NotALiteral("variablePath")));
    }

    #[test]
    fn keywords_do_not_swallow_longer_identifiers() {
        let tokens = Lexer::new(ScriptGrammar::shared())
            .tokenize("state main:\n    setup upper\n    set total = nothing\n")
            .expect("tokenize");
        let kinds: Vec<_> = tokens.iter().map(|found| found.token).collect();
        assert!(kinds.contains(&Token::Instruction));
        assert!(!kinds.contains(&Token::Direction));
        assert!(!kinds.contains(&Token::UnaryOperator));
        assert_eq!(
            tokens
                .iter()
                .filter(|found| found.token == Token::VariablePath)
                .map(|found| found.capture(1))
                .collect::<Vec<_>>(),
            vec!["upper", "nothing"]
        );
    }

    #[test]
    fn named_arguments_follow_operands() {
        let tokens = Lexer::new(ScriptGrammar::shared())
            .tokenize("state main:\n    stride self.center.x from 0 to 10 * 2\n")
            .expect("tokenize");
        let names: Vec<_> = tokens
            .iter()
            .filter(|found| found.token == Token::ArgumentName)
            .map(|found| found.capture(1))
            .collect();
        assert_eq!(names, vec!["from", "to"]);
    }
}

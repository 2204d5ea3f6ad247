use sb_core::{default_argument_name, Node, ParseError, ScriptError, SourceSpan};

use crate::grammar::{FoundToken, GrammarToken};
use crate::operation::OperationBuilder;
use crate::script_grammar::Token;

#[derive(Debug)]
enum BlockHeader {
    State { name: String },
    Group { name: String, arguments: Vec<Node> },
}

/// An open `state` or group; `depth` is the indentation its children use.
#[derive(Debug)]
struct BlockFrame {
    header: BlockHeader,
    children: Vec<Node>,
    depth: usize,
}

impl BlockFrame {
    fn into_node(self) -> Node {
        match self.header {
            BlockHeader::State { name } => Node::State {
                name,
                children: self.children,
            },
            BlockHeader::Group { name, arguments } => Node::Group {
                name,
                arguments,
                children: self.children,
            },
        }
    }
}

#[derive(Debug)]
enum StatementKind {
    Instruction(String),
    Assignment(String),
    GroupHeader(String),
}

/// The statement on the current line: its arguments so far and the
/// expression being built for the pending one.
#[derive(Debug)]
struct StatementFrame {
    kind: StatementKind,
    arguments: Vec<Node>,
    pending: Option<String>,
    expression: Option<OperationBuilder>,
    span: SourceSpan,
}

impl StatementFrame {
    fn new(kind: StatementKind, span: SourceSpan) -> Self {
        Self {
            kind,
            arguments: Vec::new(),
            pending: None,
            expression: None,
            span,
        }
    }

    fn construct(&self) -> &str {
        match &self.kind {
            StatementKind::Instruction(name)
            | StatementKind::Assignment(name)
            | StatementKind::GroupHeader(name) => name,
        }
    }

    fn consume(&mut self, found: &FoundToken<Token>) -> Result<bool, ParseError> {
        if found.token == Token::ArgumentName {
            self.close_argument(found)?;
            if matches!(self.kind, StatementKind::Assignment(_)) {
                return Err(ParseError::new(
                    "argumentName",
                    "assignments take a single expression",
                    found.span,
                ));
            }
            self.pending = Some(found.capture(1).to_string());
            return Ok(true);
        }

        if self.expression.is_none() {
            if !starts_operand(found.token) {
                return Ok(false);
            }
            if self.pending.is_none() {
                match self.kind {
                    StatementKind::Assignment(_) if self.arguments.is_empty() => {}
                    _ if self.arguments.is_empty() => {
                        self.pending = Some(default_argument_name(self.construct()).to_string());
                    }
                    _ => {
                        return Err(ParseError::new(
                            found.token.name(),
                            "expected an argument name",
                            found.span,
                        ))
                    }
                }
            }
            self.expression = Some(OperationBuilder::new());
        }

        match self.expression.as_mut() {
            Some(expression) => expression.consume(found),
            None => Ok(false),
        }
    }

    /// Moves the finished expression into the argument list.
    fn close_argument(&mut self, at: &FoundToken<Token>) -> Result<(), ParseError> {
        let Some(expression) = self.expression.take() else {
            if let Some(name) = &self.pending {
                return Err(ParseError::new(
                    at.token.name(),
                    format!("expected a value for argument '{}'", name),
                    at.span,
                ));
            }
            return Ok(());
        };
        let value = expression.finish(at)?;
        match (&self.kind, self.pending.take()) {
            (StatementKind::Assignment(_), _) => self.arguments.push(value),
            (_, Some(name)) => self.arguments.push(Node::argument(name, value)),
            (_, None) => {
                return Err(ParseError::new(
                    at.token.name(),
                    "expected an argument name",
                    at.span,
                ))
            }
        }
        Ok(())
    }

    fn into_statement(mut self, at: &FoundToken<Token>) -> Result<Node, ParseError> {
        self.close_argument(at)?;
        match self.kind {
            StatementKind::Instruction(name) => Ok(Node::Instruction {
                name,
                arguments: self.arguments,
            }),
            StatementKind::Assignment(path) => match self.arguments.pop() {
                Some(value) => Ok(Node::assignment(path, value)),
                None => Err(ParseError::new(
                    at.token.name(),
                    format!("expected a value to assign to '{}'", path),
                    self.span,
                )),
            },
            StatementKind::GroupHeader(name) => Err(ParseError::new(
                at.token.name(),
                format!("expected ':' to open the '{}' block", name),
                at.span,
            )),
        }
    }

    fn into_header(mut self, at: &FoundToken<Token>) -> Result<BlockHeader, ParseError> {
        self.close_argument(at)?;
        match self.kind {
            StatementKind::GroupHeader(name) => Ok(BlockHeader::Group {
                name,
                arguments: self.arguments,
            }),
            _ => Err(ParseError::new(
                "blockStart",
                "only group statements open a block",
                at.span,
            )),
        }
    }
}

fn starts_operand(token: Token) -> bool {
    token.is_literal()
        || matches!(
            token,
            Token::VariablePath | Token::UnaryOperator | Token::OpenParen
        )
}

/// Incremental tree builder fed one token at a time. Blocks are kept as an
/// explicit stack of frames; a statement that starts shallower than the
/// innermost block closes that block and is offered to its parent. Finished
/// top-level states can be drained while input is still arriving.
#[derive(Debug, Default)]
pub struct TreeBuilder {
    blocks: Vec<BlockFrame>,
    statement: Option<StatementFrame>,
    line_indent: usize,
    at_line_start: bool,
    completed: Vec<Node>,
    finished: bool,
}

impl TreeBuilder {
    pub fn new() -> Self {
        Self {
            at_line_start: true,
            ..Self::default()
        }
    }

    /// Feeds one token. Returns `false` for tokens that carry no structure
    /// (comments).
    pub fn consume(&mut self, found: &FoundToken<Token>) -> Result<bool, ParseError> {
        if self.finished {
            return Err(ParseError::new(
                found.token.name(),
                "no input is accepted after the end of file",
                found.span,
            ));
        }

        match found.token {
            Token::Comment => Ok(false),
            Token::SyntaxError => Err(ParseError::new(
                "syntaxError",
                format!("unrecognized input \"{}\"", found.text()),
                found.span,
            )),
            Token::NewLine => {
                self.end_line(found)?;
                Ok(true)
            }
            Token::Indent if self.at_line_start => {
                self.line_indent += 1;
                Ok(true)
            }
            Token::EndOfFile => {
                self.end_line(found)?;
                self.close_blocks_deeper_than(0);
                self.finished = true;
                Ok(true)
            }
            Token::State => {
                if self.line_indent != 0 {
                    return Err(ParseError::new(
                        "state",
                        "states must start at column zero",
                        found.span,
                    ));
                }
                self.close_blocks_deeper_than(0);
                self.blocks.push(BlockFrame {
                    header: BlockHeader::State {
                        name: found.capture(1).to_string(),
                    },
                    children: Vec::new(),
                    depth: 1,
                });
                self.at_line_start = false;
                Ok(true)
            }
            Token::GroupStart | Token::Instruction | Token::AssignmentStart => {
                self.start_statement(found)?;
                Ok(true)
            }
            Token::BlockStart => {
                let Some(statement) = self.statement.take() else {
                    return Err(ParseError::new("blockStart", "unexpected ':'", found.span));
                };
                let header = statement.into_header(found)?;
                self.blocks.push(BlockFrame {
                    header,
                    children: Vec::new(),
                    depth: self.line_indent + 1,
                });
                Ok(true)
            }
            token => {
                let Some(statement) = self.statement.as_mut() else {
                    return Err(ParseError::new(
                        token.name(),
                        "expected a statement",
                        found.span,
                    ));
                };
                if statement.consume(found)? {
                    Ok(true)
                } else {
                    Err(ParseError::new(
                        token.name(),
                        format!("unexpected token in '{}' statement", statement.construct()),
                        found.span,
                    ))
                }
            }
        }
    }

    /// Drains the top-level states completed so far.
    pub fn take_completed(&mut self) -> Vec<Node> {
        std::mem::take(&mut self.completed)
    }

    /// Closes every open block and returns all remaining top-level nodes.
    pub fn finish(mut self) -> Result<Vec<Node>, ParseError> {
        if !self.finished {
            let end = FoundToken::synthetic(Token::EndOfFile, self.end_offset());
            self.consume(&end)?;
        }
        Ok(self.completed)
    }

    fn end_offset(&self) -> usize {
        self.statement
            .as_ref()
            .map(|statement| statement.span.end)
            .unwrap_or_default()
    }

    fn start_statement(&mut self, found: &FoundToken<Token>) -> Result<(), ParseError> {
        if !self.at_line_start || self.statement.is_some() {
            return Err(ParseError::new(
                found.token.name(),
                "one statement per line",
                found.span,
            ));
        }
        self.close_blocks_deeper_than(self.line_indent);

        match self.blocks.last() {
            None => {
                return Err(ParseError::new(
                    found.token.name(),
                    "statements must be inside a state",
                    found.span,
                ))
            }
            Some(block) if block.depth != self.line_indent => {
                return Err(ParseError::new(
                    found.token.name(),
                    format!(
                        "expected indentation of {} but found {}",
                        block.depth, self.line_indent
                    ),
                    found.span,
                ))
            }
            Some(_) => {}
        }

        let name = found.capture(1).to_string();
        let kind = match found.token {
            Token::GroupStart => StatementKind::GroupHeader(name),
            Token::AssignmentStart => StatementKind::Assignment(name),
            _ => StatementKind::Instruction(name),
        };
        self.statement = Some(StatementFrame::new(kind, found.span));
        self.at_line_start = false;
        Ok(())
    }

    fn end_line(&mut self, found: &FoundToken<Token>) -> Result<(), ParseError> {
        if let Some(statement) = self.statement.take() {
            let node = statement.into_statement(found)?;
            if let Some(block) = self.blocks.last_mut() {
                block.children.push(node);
            }
        }
        self.at_line_start = true;
        self.line_indent = 0;
        Ok(())
    }

    fn close_blocks_deeper_than(&mut self, indent: usize) {
        while self.blocks.last().is_some_and(|block| block.depth > indent) {
            let Some(block) = self.blocks.pop() else {
                break;
            };
            let node = block.into_node();
            match self.blocks.last_mut() {
                Some(parent) => parent.children.push(node),
                None => self.completed.push(node),
            }
        }
    }
}

/// Tokenizes and parses a whole behavior script into its top-level states.
pub fn parse(source: &str) -> Result<Vec<Node>, ScriptError> {
    let tokens = crate::tokenize(source)?;
    let mut builder = TreeBuilder::new();
    for found in &tokens {
        builder.consume(found)?;
    }
    Ok(builder.finish()?)
}

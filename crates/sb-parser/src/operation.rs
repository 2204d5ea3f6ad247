use sb_core::{BinaryOperator, Node, ParseError, UnaryOperator};

use crate::grammar::{FoundToken, GrammarToken};
use crate::script_grammar::Token;

/// One parenthesis level of an expression under construction.
#[derive(Debug, Default)]
struct Level {
    operands: Vec<Node>,
    operators: Vec<BinaryOperator>,
    prefixes: Vec<UnaryOperator>,
    complete: bool,
}

impl Level {
    fn reduce_while(&mut self, keep_going: impl Fn(BinaryOperator) -> bool) {
        while let Some(&operator) = self.operators.last() {
            if !keep_going(operator) || self.operands.len() < 2 {
                break;
            }
            self.operators.pop();
            let (Some(rhs), Some(lhs)) = (self.operands.pop(), self.operands.pop()) else {
                break;
            };
            self.operands.push(fold_binary(lhs, operator, rhs));
        }
    }
}

/// Precedence-climbing expression frame. Operands and operators arrive one
/// token at a time; a pending operator of higher or equal priority is
/// reduced as soon as a new operator shows up, so every chain stays
/// left-associative. Constant operands are folded on reduction, while
/// parenthesized groups are kept as written.
#[derive(Debug)]
pub(crate) struct OperationBuilder {
    levels: Vec<Level>,
}

impl OperationBuilder {
    pub(crate) fn new() -> Self {
        Self {
            levels: vec![Level::default()],
        }
    }

    /// Offers a token to the expression. `Ok(false)` means the token does not
    /// belong to an expression and the caller should handle it.
    pub(crate) fn consume(&mut self, found: &FoundToken<Token>) -> Result<bool, ParseError> {
        match found.token {
            token if token.is_literal() => {
                let value = found
                    .value()
                    .map_err(|error| ParseError::new(token.name(), error.to_string(), found.span))?;
                self.operand(Node::constant(value), found)?;
            }
            Token::VariablePath => self.operand(Node::variable(found.capture(1)), found)?,
            Token::UnaryOperator => {
                let level = self.expecting_operand(found)?;
                let operator = UnaryOperator::from_symbol(found.capture(1))
                    .map_err(|error| ParseError::new("unaryOperator", error.to_string(), found.span))?;
                level.prefixes.push(operator);
            }
            Token::OpenParen => {
                self.expecting_operand(found)?;
                self.levels.push(Level::default());
            }
            Token::CloseParen => {
                if self.levels.len() == 1 {
                    return Err(ParseError::new(
                        "closeParen",
                        "no parenthesis to close",
                        found.span,
                    ));
                }
                let inner = self.finish_level(found)?;
                self.operand(Node::parenthesized(inner), found)?;
            }
            Token::BinaryOperator => {
                let operator = BinaryOperator::from_symbol(found.capture(1))
                    .map_err(|error| ParseError::new("binaryOperator", error.to_string(), found.span))?;
                let level = self.top();
                if !level.complete {
                    return Err(ParseError::new(
                        "binaryOperator",
                        "expected an operand before the operator",
                        found.span,
                    ));
                }
                let priority = operator.priority();
                level.reduce_while(|pending| pending.priority() >= priority);
                level.operators.push(operator);
                level.complete = false;
            }
            _ => return Ok(false),
        }
        Ok(true)
    }

    /// Completes the expression; `at` locates errors for dangling input.
    pub(crate) fn finish(mut self, at: &FoundToken<Token>) -> Result<Node, ParseError> {
        if self.levels.len() > 1 {
            return Err(ParseError::new(
                at.token.name(),
                "expected ')' to close the parenthesis",
                at.span,
            ));
        }
        self.finish_level(at)
    }

    fn top(&mut self) -> &mut Level {
        if self.levels.is_empty() {
            self.levels.push(Level::default());
        }
        let last = self.levels.len() - 1;
        &mut self.levels[last]
    }

    fn expecting_operand(&mut self, found: &FoundToken<Token>) -> Result<&mut Level, ParseError> {
        let level = self.top();
        if level.complete {
            return Err(ParseError::new(
                found.token.name(),
                "expected an operator between operands",
                found.span,
            ));
        }
        Ok(level)
    }

    fn operand(&mut self, node: Node, found: &FoundToken<Token>) -> Result<(), ParseError> {
        let level = self.expecting_operand(found)?;
        let node = level
            .prefixes
            .drain(..)
            .rev()
            .fold(node, |node, operator| fold_unary(operator, node));
        level.operands.push(node);
        level.complete = true;
        Ok(())
    }

    fn finish_level(&mut self, at: &FoundToken<Token>) -> Result<Node, ParseError> {
        let mut level = self.levels.pop().unwrap_or_default();
        if !level.complete {
            return Err(ParseError::new(
                at.token.name(),
                "expected an operand to complete the expression",
                at.span,
            ));
        }
        level.reduce_while(|_| true);
        level.operands.pop().ok_or_else(|| {
            ParseError::new(at.token.name(), "expected an expression", at.span)
        })
    }
}

fn fold_binary(lhs: Node, operator: BinaryOperator, rhs: Node) -> Node {
    match (lhs.as_constant(), rhs.as_constant()) {
        (Some(a), Some(b)) => Node::constant(operator.apply(a, b)),
        _ => Node::binary(lhs, operator, rhs),
    }
}

fn fold_unary(operator: UnaryOperator, node: Node) -> Node {
    match node.as_constant() {
        Some(value) => Node::constant(operator.apply(value)),
        None => Node::unary(operator, node),
    }
}

use serde::{Deserialize, Serialize};

use crate::operators::{BinaryOperator, UnaryOperator};
use crate::value::Value;

/// Syntax tree of a behavior script. Children are owned; equality is deep.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "node", rename_all = "camelCase")]
pub enum Node {
    State {
        name: String,
        children: Vec<Node>,
    },
    Group {
        name: String,
        arguments: Vec<Node>,
        children: Vec<Node>,
    },
    Instruction {
        name: String,
        arguments: Vec<Node>,
    },
    Argument {
        name: String,
        value: Box<Node>,
    },
    Assignment {
        path: String,
        value: Box<Node>,
    },
    BinaryOp {
        lhs: Box<Node>,
        operator: BinaryOperator,
        rhs: Box<Node>,
    },
    UnaryOp {
        operator: UnaryOperator,
        value: Box<Node>,
    },
    Parenthesized {
        child: Box<Node>,
    },
    Variable {
        path: String,
    },
    Constant {
        value: Value,
    },
}

impl Node {
    pub fn constant(value: Value) -> Self {
        Self::Constant { value }
    }

    pub fn variable(path: impl Into<String>) -> Self {
        Self::Variable { path: path.into() }
    }

    pub fn argument(name: impl Into<String>, value: Node) -> Self {
        Self::Argument {
            name: name.into(),
            value: Box::new(value),
        }
    }

    pub fn assignment(path: impl Into<String>, value: Node) -> Self {
        Self::Assignment {
            path: path.into(),
            value: Box::new(value),
        }
    }

    pub fn binary(lhs: Node, operator: BinaryOperator, rhs: Node) -> Self {
        Self::BinaryOp {
            lhs: Box::new(lhs),
            operator,
            rhs: Box::new(rhs),
        }
    }

    pub fn unary(operator: UnaryOperator, value: Node) -> Self {
        Self::UnaryOp {
            operator,
            value: Box::new(value),
        }
    }

    pub fn parenthesized(child: Node) -> Self {
        Self::Parenthesized {
            child: Box::new(child),
        }
    }

    pub fn as_constant(&self) -> Option<&Value> {
        match self {
            Self::Constant { value } => Some(value),
            _ => None,
        }
    }

    pub fn is_constant(&self) -> bool {
        self.as_constant().is_some()
    }

    pub fn children(&self) -> &[Node] {
        match self {
            Self::State { children, .. } | Self::Group { children, .. } => children,
            _ => &[],
        }
    }

    pub fn arguments(&self) -> &[Node] {
        match self {
            Self::Group { arguments, .. } | Self::Instruction { arguments, .. } => arguments,
            _ => &[],
        }
    }

    /// Value expression of the named argument of a group or instruction.
    pub fn argument_value(&self, name: &str) -> Option<&Node> {
        self.arguments().iter().find_map(|argument| match argument {
            Self::Argument {
                name: argument_name,
                value,
            } if argument_name == name => Some(value.as_ref()),
            _ => None,
        })
    }

    /// True when any variable in this subtree has `root` as path root.
    pub fn references(&self, root: &str) -> bool {
        match self {
            Self::Variable { path } => path_root(path) == root,
            Self::State { children, .. } => children.iter().any(|child| child.references(root)),
            Self::Group {
                arguments,
                children,
                ..
            } => arguments
                .iter()
                .chain(children.iter())
                .any(|child| child.references(root)),
            Self::Instruction { arguments, .. } => {
                arguments.iter().any(|argument| argument.references(root))
            }
            Self::Argument { value, .. }
            | Self::Assignment { value, .. }
            | Self::UnaryOp { value, .. } => value.references(root),
            Self::BinaryOp { lhs, rhs, .. } => lhs.references(root) || rhs.references(root),
            Self::Parenthesized { child } => child.references(root),
            Self::Constant { .. } => false,
        }
    }

    /// True when the subtree contains an instruction named `name`.
    pub fn contains_instruction(&self, name: &str) -> bool {
        match self {
            Self::Instruction {
                name: instruction, ..
            } => instruction == name,
            Self::State { children, .. } | Self::Group { children, .. } => children
                .iter()
                .any(|child| child.contains_instruction(name)),
            _ => false,
        }
    }
}

pub fn path_root(path: &str) -> &str {
    path.split('.').next().unwrap_or(path)
}

pub fn split_path(path: &str) -> Vec<&str> {
    path.split('.')
        .map(str::trim)
        .filter(|segment| !segment.is_empty())
        .collect()
}

/// Block constructs with a guard argument and an indented body.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum GroupKind {
    During,
    If,
    Else,
    While,
    Jump,
}

impl GroupKind {
    pub const ALL: [GroupKind; 5] = [
        GroupKind::During,
        GroupKind::If,
        GroupKind::Else,
        GroupKind::While,
        GroupKind::Jump,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Self::During => "during",
            Self::If => "if",
            Self::Else => "else",
            Self::While => "while",
            Self::Jump => "jump",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|kind| kind.name() == name)
    }

    /// Groups whose body repeats across ticks.
    pub fn is_loop(self) -> bool {
        matches!(self, Self::During | Self::While | Self::Jump)
    }
}

/// Built-in instructions understood by both backends.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum InstructionKind {
    Wait,
    Stride,
    Move,
    GoTo,
    Spawn,
    Remove,
    Print,
}

impl InstructionKind {
    pub const ALL: [InstructionKind; 7] = [
        InstructionKind::Wait,
        InstructionKind::Stride,
        InstructionKind::Move,
        InstructionKind::GoTo,
        InstructionKind::Spawn,
        InstructionKind::Remove,
        InstructionKind::Print,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Self::Wait => "wait",
            Self::Stride => "stride",
            Self::Move => "move",
            Self::GoTo => "go",
            Self::Spawn => "spawn",
            Self::Remove => "remove",
            Self::Print => "print",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|kind| kind.name() == name)
    }
}

pub const DEFAULT_ARGUMENT: &str = "value";
/// Argument of `stride` naming the path it writes; compiled as a path, not evaluated.
pub const TARGET_ARGUMENT: &str = "target";

/// Name given to a leading positional argument of `construct`.
pub fn default_argument_name(construct: &str) -> &'static str {
    match construct {
        "during" => "duration",
        "if" | "while" => "condition",
        "jump" => "height",
        "stride" => TARGET_ARGUMENT,
        "move" => "by",
        "go" => "to",
        "spawn" => "definition",
        _ => DEFAULT_ARGUMENT,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn argument_value_finds_named_argument() {
        let node = Node::Instruction {
            name: "stride".to_string(),
            arguments: vec![
                Node::argument("target", Node::variable("self.center.x")),
                Node::argument("from", Node::constant(Value::Integer(0))),
            ],
        };
        assert_eq!(
            node.argument_value("from"),
            Some(&Node::constant(Value::Integer(0)))
        );
        assert_eq!(node.argument_value("to"), None);
    }

    #[test]
    fn references_walks_nested_expressions() {
        let node = Node::Group {
            name: "during".to_string(),
            arguments: vec![],
            children: vec![Node::assignment(
                "x",
                Node::binary(
                    Node::variable("progress"),
                    BinaryOperator::Multiply,
                    Node::constant(Value::Integer(10)),
                ),
            )],
        };
        assert!(node.references("progress"));
        assert!(!node.references("time"));
    }

    #[test]
    fn paths_split_on_dots() {
        assert_eq!(path_root("self.center.x"), "self");
        assert_eq!(split_path("self.center.x"), vec!["self", "center", "x"]);
    }

    #[test]
    fn construct_names_resolve() {
        assert_eq!(GroupKind::from_name("during"), Some(GroupKind::During));
        assert_eq!(InstructionKind::from_name("go"), Some(InstructionKind::GoTo));
        assert_eq!(default_argument_name("jump"), "height");
        assert_eq!(default_argument_name("shake"), DEFAULT_ARGUMENT);
    }
}

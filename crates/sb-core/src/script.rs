use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::ast::{GroupKind, InstructionKind};
use crate::operators::{BinaryOperator, UnaryOperator};
use crate::value::Value;

/// One step of the stack machine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "op", content = "arg", rename_all = "camelCase")]
pub enum Instruction {
    PushConstant(Value),
    PushVariable(String),
    ClearArguments,
    /// Pops the stack top into the named argument.
    PushArgumentNamed(String),
    /// Pops the stack top and stores it at the path.
    Assign(String),
    BinaryOperator(BinaryOperator),
    UnaryOperator(UnaryOperator),
    /// Loop/condition bookkeeping owning the index execution continues at
    /// once the group is skipped or done. Back-patched after the body.
    GroupGuard { kind: GroupKind, end: usize },
    GoToGroupStart(usize),
    GoToCurrentState,
    Jump(usize),
    Invoke(InstructionKind),
    Wait,
}

impl Instruction {
    /// Rewrites the forward target of a guard or jump.
    pub fn patch_target(&mut self, target: usize) -> bool {
        match self {
            Self::GroupGuard { end, .. } => {
                *end = target;
                true
            }
            Self::Jump(destination) => {
                *destination = target;
                true
            }
            _ => false,
        }
    }
}

impl fmt::Display for Instruction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::PushConstant(value) => write!(f, "push {}", value),
            Self::PushVariable(path) => write!(f, "load {}", path),
            Self::ClearArguments => write!(f, "clear-arguments"),
            Self::PushArgumentNamed(name) => write!(f, "argument {}", name),
            Self::Assign(path) => write!(f, "store {}", path),
            Self::BinaryOperator(operator) => write!(f, "binary {}", operator.symbol()),
            Self::UnaryOperator(operator) => write!(f, "unary {}", operator.symbol()),
            Self::GroupGuard { kind, end } => write!(f, "guard {} else {}", kind.name(), end),
            Self::GoToGroupStart(index) => write!(f, "loop {}", index),
            Self::GoToCurrentState => write!(f, "restart-state"),
            Self::Jump(index) => write!(f, "jump {}", index),
            Self::Invoke(kind) => write!(f, "invoke {}", kind.name()),
            Self::Wait => write!(f, "wait"),
        }
    }
}

/// Compiled form of a behavior script. Immutable once built and shared by
/// every execution context running it.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Script {
    pub states: BTreeMap<String, usize>,
    pub initial_state: String,
    pub instructions: Vec<Instruction>,
}

impl Script {
    pub fn state_start(&self, name: &str) -> Option<usize> {
        self.states.get(name).copied()
    }

    pub fn listing(&self) -> String {
        let mut labels: BTreeMap<usize, Vec<&str>> = BTreeMap::new();
        for (name, index) in &self.states {
            labels.entry(*index).or_default().push(name);
        }

        let mut out = String::new();
        for (index, instruction) in self.instructions.iter().enumerate() {
            if let Some(names) = labels.get(&index) {
                for name in names {
                    out.push_str(&format!("{}:\n", name));
                }
            }
            out.push_str(&format!("{:>4}  {}\n", index, instruction));
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn patch_target_only_touches_jumps() {
        let mut guard = Instruction::GroupGuard {
            kind: GroupKind::During,
            end: 0,
        };
        assert!(guard.patch_target(7));
        assert_eq!(
            guard,
            Instruction::GroupGuard {
                kind: GroupKind::During,
                end: 7
            }
        );
        assert!(!Instruction::Wait.patch_target(3));
    }

    #[test]
    fn listing_labels_state_offsets() {
        let script = Script {
            states: BTreeMap::from([("main".to_string(), 0)]),
            initial_state: "main".to_string(),
            instructions: vec![Instruction::Wait, Instruction::GoToCurrentState],
        };
        let listing = script.listing();
        assert!(listing.starts_with("main:\n"));
        assert!(listing.contains("   1  restart-state"));
    }
}

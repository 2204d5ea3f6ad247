use std::collections::BTreeMap;

use sb_core::{
    GroupKind, Instruction, InstructionKind, Node, Script, Value, TARGET_ARGUMENT,
};

/// Lowers parsed (and usually reduced) states into a flat instruction list.
/// Unsupported instructions and groups are logged and left out.
pub fn compile_nodes(nodes: &[Node]) -> Script {
    let mut emitter = Emitter::default();
    for node in nodes {
        match node {
            Node::State { name, children } => emitter.state(name, children),
            other => log::warn!("skipping top-level node outside of a state: {:?}", other),
        }
    }
    Script {
        states: emitter.states,
        initial_state: emitter.initial_state.unwrap_or_default(),
        instructions: emitter.instructions,
    }
}

#[derive(Debug, Default)]
struct Emitter {
    instructions: Vec<Instruction>,
    states: BTreeMap<String, usize>,
    initial_state: Option<String>,
}

impl Emitter {
    fn emit(&mut self, instruction: Instruction) -> usize {
        self.instructions.push(instruction);
        self.instructions.len() - 1
    }

    fn next_index(&self) -> usize {
        self.instructions.len()
    }

    fn patch(&mut self, at: usize, target: usize) {
        if let Some(instruction) = self.instructions.get_mut(at) {
            instruction.patch_target(target);
        }
    }

    fn state(&mut self, name: &str, children: &[Node]) {
        if self.states.contains_key(name) {
            log::warn!("state '{}' is declared twice; keeping the first", name);
            return;
        }
        self.initial_state.get_or_insert_with(|| name.to_string());
        self.states.insert(name.to_string(), self.next_index());
        self.block(children);
        self.emit(Instruction::GoToCurrentState);
    }

    fn block(&mut self, children: &[Node]) {
        let mut index = 0;
        while index < children.len() {
            let node = &children[index];
            index += 1;
            match node {
                Node::Group {
                    name,
                    arguments,
                    children: body,
                } => match GroupKind::from_name(name) {
                    Some(GroupKind::If) => {
                        let otherwise = match children.get(index) {
                            Some(Node::Group {
                                name,
                                children: else_body,
                                ..
                            }) if GroupKind::from_name(name) == Some(GroupKind::Else) => {
                                index += 1;
                                Some(else_body.as_slice())
                            }
                            _ => None,
                        };
                        self.conditional(arguments, body, otherwise);
                    }
                    Some(GroupKind::Else) => {
                        log::warn!("skipping 'else' without a preceding 'if'");
                    }
                    Some(kind) => self.looping(kind, arguments, body),
                    None => log::warn!("skipping unsupported group '{}'", name),
                },
                Node::Instruction { name, arguments } => self.instruction(name, arguments),
                Node::Assignment { path, value } => {
                    self.expression(value);
                    self.emit(Instruction::Assign(path.clone()));
                }
                other => log::warn!("skipping unexpected statement {:?}", other),
            }
        }
    }

    fn conditional(&mut self, arguments: &[Node], body: &[Node], otherwise: Option<&[Node]>) {
        self.arguments(arguments, false);
        let guard = self.emit(Instruction::GroupGuard {
            kind: GroupKind::If,
            end: 0,
        });
        self.block(body);
        match otherwise {
            Some(otherwise) => {
                let skip = self.emit(Instruction::Jump(0));
                self.patch(guard, self.next_index());
                self.block(otherwise);
                self.patch(skip, self.next_index());
            }
            None => self.patch(guard, self.next_index()),
        }
    }

    fn looping(&mut self, kind: GroupKind, arguments: &[Node], body: &[Node]) {
        let start = self.next_index();
        self.arguments(arguments, false);
        let guard = self.emit(Instruction::GroupGuard { kind, end: 0 });
        self.block(body);
        self.emit(Instruction::GoToGroupStart(start));
        self.patch(guard, self.next_index());
    }

    fn instruction(&mut self, name: &str, arguments: &[Node]) {
        match InstructionKind::from_name(name) {
            Some(InstructionKind::Wait) => {
                self.emit(Instruction::Wait);
            }
            Some(kind) => {
                self.arguments(arguments, kind == InstructionKind::Stride);
                self.emit(Instruction::Invoke(kind));
            }
            None => log::warn!("skipping unsupported instruction '{}'", name),
        }
    }

    /// `ClearArguments` then one value + `PushArgumentNamed` per argument.
    /// A stride's target is passed as its path instead of its value.
    fn arguments(&mut self, arguments: &[Node], target_is_path: bool) {
        self.emit(Instruction::ClearArguments);
        for argument in arguments {
            let Node::Argument { name, value } = argument else {
                continue;
            };
            match value.as_ref() {
                Node::Variable { path } if target_is_path && name == TARGET_ARGUMENT => {
                    self.emit(Instruction::PushConstant(Value::String(path.clone())));
                }
                value => self.expression(value),
            }
            self.emit(Instruction::PushArgumentNamed(name.clone()));
        }
    }

    fn expression(&mut self, node: &Node) {
        match node {
            Node::Constant { value } => {
                self.emit(Instruction::PushConstant(value.clone()));
            }
            Node::Variable { path } => {
                self.emit(Instruction::PushVariable(path.clone()));
            }
            Node::BinaryOp { lhs, operator, rhs } => {
                self.expression(lhs);
                self.expression(rhs);
                self.emit(Instruction::BinaryOperator(*operator));
            }
            Node::UnaryOp { operator, value } => {
                self.expression(value);
                self.emit(Instruction::UnaryOperator(*operator));
            }
            Node::Parenthesized { child } => self.expression(child),
            other => {
                log::warn!("expression expected, found {:?}; pushing null", other);
                self.emit(Instruction::PushConstant(Value::Null));
            }
        }
    }
}

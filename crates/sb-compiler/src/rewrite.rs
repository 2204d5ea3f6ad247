use sb_core::{split_path, InstructionKind, Node, Value, TARGET_ARGUMENT};

use crate::symbols::{stride_endpoints, Binding, LocalScope, SymbolTable};

/// Replaces bare names that denote a state or an animation with constants.
/// Group temporaries stay variables inside the groups that bind them.
pub fn resolve_names(nodes: Vec<Node>, symbols: &SymbolTable) -> Vec<Node> {
    let mut resolver = NameResolver {
        symbols,
        locals: LocalScope::default(),
    };
    resolver.nodes(nodes)
}

struct NameResolver<'a> {
    symbols: &'a SymbolTable,
    locals: LocalScope,
}

impl NameResolver<'_> {
    fn nodes(&mut self, nodes: Vec<Node>) -> Vec<Node> {
        nodes.into_iter().map(|node| self.node(node)).collect()
    }

    fn node(&mut self, node: Node) -> Node {
        match node {
            Node::Variable { path } if split_path(&path).len() == 1 => {
                match self.symbols.resolve_in(&self.locals, &path, true) {
                    Some(Binding::State) => Node::constant(Value::StateName(path)),
                    Some(Binding::Animation) => Node::constant(Value::AnimationName(path)),
                    _ => Node::Variable { path },
                }
            }
            variable @ Node::Variable { .. } => variable,
            Node::State { name, children } => Node::State {
                name,
                children: self.nodes(children),
            },
            group @ Node::Group { .. } => self.group(group),
            Node::Instruction { name, arguments } => Node::Instruction {
                name,
                arguments: arguments
                    .into_iter()
                    .map(|argument| match argument {
                        Node::Argument { name, value } if name == TARGET_ARGUMENT => {
                            Node::Argument { name, value }
                        }
                        other => self.node(other),
                    })
                    .collect(),
            },
            Node::Argument { name, value } => Node::argument(name, self.node(*value)),
            Node::Assignment { path, value } => Node::assignment(path, self.node(*value)),
            Node::BinaryOp { lhs, operator, rhs } => {
                let lhs = self.node(*lhs);
                Node::binary(lhs, operator, self.node(*rhs))
            }
            Node::UnaryOp { operator, value } => Node::unary(operator, self.node(*value)),
            Node::Parenthesized { child } => Node::parenthesized(self.node(*child)),
            constant @ Node::Constant { .. } => constant,
        }
    }

    /// Arguments are evaluated before the group binds its temporaries.
    fn group(&mut self, group: Node) -> Node {
        let entered = self.locals.enter(&group);
        match group {
            Node::Group {
                name,
                arguments,
                children,
            } => {
                let children = self.nodes(children);
                self.locals.leave(&entered);
                Node::Group {
                    name,
                    arguments: self.nodes(arguments),
                    children,
                }
            }
            other => other,
        }
    }
}

/// Moves non-constant stride endpoints into `strideFromN`/`strideToN`
/// assignments placed right before the group that owns the stride, so they
/// are evaluated once on entry. Strides outside any group get their
/// assignments immediately before themselves. Numbering follows the
/// allocation order of [`SymbolTable::build`].
pub fn hoist_strides(nodes: Vec<Node>, symbols: &SymbolTable) -> Vec<Node> {
    let mut hoister = Hoister { symbols, next: 0 };
    nodes
        .into_iter()
        .map(|node| match node {
            Node::State { name, children } => Node::State {
                name,
                children: hoister.block(children),
            },
            other => other,
        })
        .collect()
}

struct Hoister<'a> {
    symbols: &'a SymbolTable,
    next: usize,
}

impl Hoister<'_> {
    /// Rewrites a statement list whose strides are hoisted in place.
    fn block(&mut self, children: Vec<Node>) -> Vec<Node> {
        let mut out = Vec::with_capacity(children.len());
        for child in children {
            match child {
                Node::Group {
                    name,
                    arguments,
                    children,
                } => {
                    let mut prelude = Vec::new();
                    let body = self.group_body(children, &mut prelude);
                    out.extend(prelude);
                    out.push(Node::Group {
                        name,
                        arguments,
                        children: body,
                    });
                }
                stride if is_stride(&stride) => {
                    let mut prelude = Vec::new();
                    let rewritten = self.stride(stride, &mut prelude);
                    out.extend(prelude);
                    out.push(rewritten);
                }
                other => out.push(other),
            }
        }
        out
    }

    /// Rewrites a group body: its own strides feed `prelude`, nested groups
    /// hoist into the body itself.
    fn group_body(&mut self, children: Vec<Node>, prelude: &mut Vec<Node>) -> Vec<Node> {
        let mut out = Vec::with_capacity(children.len());
        for child in children {
            match child {
                group @ Node::Group { .. } => out.extend(self.block(vec![group])),
                stride if is_stride(&stride) => out.push(self.stride(stride, prelude)),
                other => out.push(other),
            }
        }
        out
    }

    fn stride(&mut self, stride: Node, prelude: &mut Vec<Node>) -> Node {
        let Some((from, to)) = stride_endpoints(&stride) else {
            return stride;
        };
        let Some(symbol) = self.symbols.strides.get(self.next) else {
            log::warn!("stride without allocated endpoint variables left as written");
            return stride;
        };
        self.next += 1;

        prelude.push(Node::assignment(symbol.from.clone(), from));
        prelude.push(Node::assignment(symbol.to.clone(), to));

        let (name, arguments) = match stride {
            Node::Instruction { name, arguments } => (name, arguments),
            other => return other,
        };
        let mut arguments: Vec<Node> = arguments
            .into_iter()
            .filter(|argument| {
                !matches!(argument, Node::Argument { name, .. } if name == "from" || name == "to")
            })
            .collect();
        arguments.push(Node::argument("from", Node::variable(symbol.from.clone())));
        arguments.push(Node::argument("to", Node::variable(symbol.to.clone())));
        Node::Instruction { name, arguments }
    }
}

fn is_stride(node: &Node) -> bool {
    matches!(node, Node::Instruction { name, .. } if InstructionKind::from_name(name) == Some(InstructionKind::Stride))
}

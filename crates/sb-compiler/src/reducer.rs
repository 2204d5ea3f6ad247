use std::collections::BTreeMap;

use sb_core::{read_path, split_path, Node, SpriteHost, Value, TARGET_ARGUMENT};

use crate::symbols::LocalScope;

/// Inlines variables whose value under `heap` is a scalar constant and folds
/// operators whose operands became constant. Sprite roots are chased only
/// when a `host` snapshot is supplied. Reducing the output again changes
/// nothing. Inside a group, the temporaries it binds hide heap entries of
/// the same name.
pub fn reduce(nodes: &[Node], heap: &BTreeMap<String, Value>, host: Option<&dyn SpriteHost>) -> Vec<Node> {
    let mut reducer = Reducer {
        heap,
        host,
        locals: LocalScope::default(),
    };
    reducer.nodes(nodes)
}

struct Reducer<'a> {
    heap: &'a BTreeMap<String, Value>,
    host: Option<&'a dyn SpriteHost>,
    locals: LocalScope,
}

impl Reducer<'_> {
    fn node(&mut self, node: &Node) -> Node {
        match node {
            Node::Variable { path } => self
                .inline(path)
                .map_or_else(|| node.clone(), Node::constant),
            Node::Constant { .. } => node.clone(),
            Node::BinaryOp { lhs, operator, rhs } => {
                let lhs = self.node(lhs);
                let rhs = self.node(rhs);
                match (lhs.as_constant(), rhs.as_constant()) {
                    (Some(a), Some(b)) => Node::constant(operator.apply(a, b)),
                    _ => Node::binary(lhs, *operator, rhs),
                }
            }
            Node::UnaryOp { operator, value } => {
                let value = self.node(value);
                match value.as_constant() {
                    Some(constant) => Node::constant(operator.apply(constant)),
                    None => Node::unary(*operator, value),
                }
            }
            Node::Parenthesized { child } => {
                let child = self.node(child);
                if child.is_constant() {
                    child
                } else {
                    Node::parenthesized(child)
                }
            }
            Node::State { name, children } => Node::State {
                name: name.clone(),
                children: self.nodes(children),
            },
            Node::Group {
                name,
                arguments,
                children,
            } => {
                let arguments = self.nodes(arguments);
                let entered = self.locals.enter(node);
                let children = self.nodes(children);
                self.locals.leave(&entered);
                Node::Group {
                    name: name.clone(),
                    arguments,
                    children,
                }
            }
            Node::Instruction { name, arguments } => Node::Instruction {
                name: name.clone(),
                arguments: self.nodes(arguments),
            },
            Node::Argument { name, value } if name == TARGET_ARGUMENT => Node::Argument {
                name: name.clone(),
                value: value.clone(),
            },
            Node::Argument { name, value } => Node::argument(name.clone(), self.node(value)),
            Node::Assignment { path, value } => Node::assignment(path.clone(), self.node(value)),
        }
    }

    fn nodes(&mut self, nodes: &[Node]) -> Vec<Node> {
        nodes.iter().map(|node| self.node(node)).collect()
    }

    fn inline(&self, path: &str) -> Option<Value> {
        let segments = split_path(path);
        let (root, fields) = segments.split_first()?;
        if self.locals.contains(root) {
            return None;
        }
        let value = read_path(self.heap.get(*root)?, fields, self.host);
        value.is_inlineable().then_some(value)
    }
}

use std::collections::{BTreeMap, BTreeSet};

use sb_core::{
    path_root, split_path, GroupKind, InstructionKind, Node, Value, ValueKind, TARGET_ARGUMENT,
};

/// Temporaries a `during` group keeps while it runs.
pub const DURING_LOCALS: [&str; 3] = ["time", "progress", "duration"];
/// Temporaries a `jump` group keeps while it runs.
pub const JUMP_LOCALS: [&str; 3] = ["jumpTime", "jumpOrigin", "jumpVelocity"];
/// Names bound by the engine on every tick.
pub const BUILTINS: [(&str, ValueKind); 3] = [
    ("self", ValueKind::Sprite),
    ("delta", ValueKind::Decimal),
    ("map", ValueKind::Point),
];

/// Temporaries `group` binds for its body. A `during` binds its clock only
/// when the body reads it or strides.
pub fn group_locals(group: &Node) -> &'static [&'static str] {
    let Node::Group { name, .. } = group else {
        return &[];
    };
    match GroupKind::from_name(name) {
        Some(GroupKind::During)
            if DURING_LOCALS.iter().any(|local| group.references(local))
                || group.contains_instruction(InstructionKind::Stride.name()) =>
        {
            &DURING_LOCALS
        }
        Some(GroupKind::Jump) => &JUMP_LOCALS,
        _ => &[],
    }
}

/// Group temporaries visible at one point of a walk over the tree.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LocalScope {
    names: BTreeSet<String>,
}

impl LocalScope {
    /// Brings the temporaries of `group` into scope. Returns the names that
    /// were not visible yet; hand them to [`LocalScope::leave`].
    pub fn enter(&mut self, group: &Node) -> Vec<&'static str> {
        group_locals(group)
            .iter()
            .copied()
            .filter(|local| self.names.insert((*local).to_string()))
            .collect()
    }

    pub fn leave(&mut self, entered: &[&str]) {
        for local in entered {
            self.names.remove(*local);
        }
    }

    pub fn contains(&self, name: &str) -> bool {
        self.names.contains(name)
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }
}

pub fn builtin_kind(name: &str) -> Option<ValueKind> {
    BUILTINS
        .iter()
        .find(|(builtin, _)| *builtin == name)
        .map(|(_, kind)| *kind)
}

/// Variables allocated to hold the endpoints of one non-constant `stride`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StrideSymbol {
    pub from: String,
    pub to: String,
    pub kind: ValueKind,
}

/// What a path root refers to.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Binding<'a> {
    /// Group temporary (`time`, `progress`, `jumpTime`, ...).
    Local,
    Builtin(ValueKind),
    Variable(ValueKind),
    Constant(&'a Value),
    State,
    Animation,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct SymbolTable {
    pub variables: BTreeMap<String, ValueKind>,
    pub constants: BTreeMap<String, Node>,
    pub states: Vec<String>,
    /// Group temporaries in scope at the current point of the walk; empty
    /// once the walk is over.
    pub locals: LocalScope,
    pub strides: Vec<StrideSymbol>,
}

impl SymbolTable {
    pub fn build(nodes: &[Node]) -> Self {
        let mut table = Self {
            states: nodes
                .iter()
                .filter_map(|node| match node {
                    Node::State { name, .. } => Some(name.clone()),
                    _ => None,
                })
                .collect(),
            ..Self::default()
        };
        for node in nodes {
            table.visit(node);
        }
        table
    }

    fn visit(&mut self, node: &Node) {
        match node {
            Node::State { children, .. } => {
                for child in children {
                    self.visit(child);
                }
            }
            Node::Group { children, .. } => {
                let entered = self.locals.enter(node);
                for child in children {
                    self.visit(child);
                }
                self.locals.leave(&entered);
            }
            Node::Assignment { path, value } => self.assign(path, value),
            Node::Instruction { name, .. }
                if InstructionKind::from_name(name) == Some(InstructionKind::Stride) =>
            {
                self.stride(node)
            }
            _ => {}
        }
    }

    fn assign(&mut self, path: &str, value: &Node) {
        let segments = split_path(path);
        let Some(root) = segments.first().copied() else {
            return;
        };
        if self.locals.contains(root) || builtin_kind(root).is_some() {
            return;
        }
        if segments.len() > 1 {
            self.promote(root);
            return;
        }

        let unconstrained = !self.variables.contains_key(root) && !self.constants.contains_key(root);
        if unconstrained && value.is_constant() {
            self.constants.insert(root.to_string(), value.clone());
            return;
        }
        let kind = self.kind_of_node(value).unwrap_or(ValueKind::Decimal);
        self.constants.remove(root);
        self.variables.insert(root.to_string(), kind);
    }

    /// Turns a constant root into a variable of the constant's kind.
    fn promote(&mut self, root: &str) {
        if let Some(node) = self.constants.remove(root) {
            let kind = node
                .as_constant()
                .map(Value::kind)
                .unwrap_or(ValueKind::Decimal);
            self.variables.insert(root.to_string(), kind);
        }
    }

    fn stride(&mut self, node: &Node) {
        if let Some(Node::Variable { path }) = node.argument_value(TARGET_ARGUMENT) {
            self.promote(path_root(path));
        }
        let Some((from, to)) = stride_endpoints(node) else {
            return;
        };
        let kind = self
            .kind_of_node(&from)
            .unwrap_or(ValueKind::Decimal)
            .unify(self.kind_of_node(&to).unwrap_or(ValueKind::Decimal));
        let index = self.strides.len();
        let symbol = StrideSymbol {
            from: format!("strideFrom{}", index),
            to: format!("strideTo{}", index),
            kind,
        };
        self.variables.insert(symbol.from.clone(), kind);
        self.variables.insert(symbol.to.clone(), kind);
        self.strides.push(symbol);
    }

    /// Resolves a path root against the temporaries in scope at the current
    /// point of the walk.
    pub fn resolve(&self, root: &str, bare: bool) -> Option<Binding<'_>> {
        self.resolve_in(&self.locals, root, bare)
    }

    /// Resolves a path root as seen from inside the groups of `locals`.
    /// `bare` is true for single-segment paths, the only ones that may name a
    /// state or an animation.
    pub fn resolve_in(&self, locals: &LocalScope, root: &str, bare: bool) -> Option<Binding<'_>> {
        if locals.contains(root) {
            return Some(Binding::Local);
        }
        if let Some(kind) = builtin_kind(root) {
            return Some(Binding::Builtin(kind));
        }
        if let Some(kind) = self.variables.get(root) {
            return Some(Binding::Variable(*kind));
        }
        if let Some(value) = self.constants.get(root).and_then(Node::as_constant) {
            return Some(Binding::Constant(value));
        }
        if !bare {
            return None;
        }
        if self.states.iter().any(|state| state == root) {
            Some(Binding::State)
        } else {
            Some(Binding::Animation)
        }
    }

    /// Statically inferred kind of an expression, `None` when unknown or
    /// when an operator has no rule for its operand kinds.
    pub fn kind_of_node(&self, node: &Node) -> Option<ValueKind> {
        match node {
            Node::Constant { value } => Some(value.kind()),
            Node::Variable { path } => self.kind_of_path(path),
            Node::BinaryOp { lhs, operator, rhs } => {
                operator.result_kind(self.kind_of_node(lhs)?, self.kind_of_node(rhs)?)
            }
            Node::UnaryOp { operator, value } => operator.result_kind(self.kind_of_node(value)?),
            Node::Parenthesized { child } => self.kind_of_node(child),
            _ => None,
        }
    }

    pub fn kind_of_path(&self, path: &str) -> Option<ValueKind> {
        let segments = split_path(path);
        let (root, fields) = segments.split_first()?;
        let root_kind = match self.resolve(root, fields.is_empty())? {
            Binding::Local => ValueKind::Decimal,
            Binding::Builtin(kind) | Binding::Variable(kind) => kind,
            Binding::Constant(value) => value.kind(),
            Binding::State => ValueKind::StateName,
            Binding::Animation => ValueKind::AnimationName,
        };
        fields
            .iter()
            .try_fold(root_kind, |kind, field| kind.property_kind(field))
    }

    /// Constant values keyed by name, the heap the reducer inlines from.
    pub fn constant_heap(&self) -> BTreeMap<String, Value> {
        self.constants
            .iter()
            .filter_map(|(name, node)| node.as_constant().map(|value| (name.clone(), value.clone())))
            .collect()
    }
}

/// `from`/`to` expressions of a stride that needs endpoint variables, or
/// `None` when both are constant or `to` is missing. A missing `from`
/// starts at the target's current value.
pub(crate) fn stride_endpoints(stride: &Node) -> Option<(Node, Node)> {
    let to = stride.argument_value("to")?.clone();
    let from = stride
        .argument_value("from")
        .or_else(|| stride.argument_value(TARGET_ARGUMENT))?
        .clone();
    if from.is_constant() && to.is_constant() {
        return None;
    }
    Some((from, to))
}

#[cfg(test)]
mod tests {
    use super::*;
    use sb_parser::parse;

    fn table(source: &str) -> SymbolTable {
        SymbolTable::build(&parse(source).expect("source should parse"))
    }

    #[test]
    fn literal_assignment_registers_constant_then_promotes() {
        let symbols = table("state main:\n    set speed = 4\n    wait\n");
        assert_eq!(
            symbols.constants.get("speed"),
            Some(&Node::constant(Value::Integer(4)))
        );
        assert!(!symbols.variables.contains_key("speed"));

        let symbols = table("state main:\n    set speed = 4\n    set speed = self.center.x\n");
        assert!(!symbols.constants.contains_key("speed"));
        assert_eq!(symbols.variables.get("speed"), Some(&ValueKind::Decimal));
    }

    #[test]
    fn dotted_assignment_promotes_constant_root() {
        let symbols = table("state main:\n    set spot = (1, 2)\n    set spot.x = 5\n");
        assert!(symbols.constants.is_empty());
        assert_eq!(symbols.variables.get("spot"), Some(&ValueKind::Point));
    }

    #[test]
    fn assignment_kinds_follow_operators() {
        let symbols = table(
            "state main:\n    set a = self.center + right\n    set b = self.direction.value * 2\n    set c = delta > 1\n",
        );
        assert_eq!(symbols.variables.get("a"), Some(&ValueKind::Point));
        assert_eq!(symbols.variables.get("b"), Some(&ValueKind::Integer));
        assert_eq!(symbols.variables.get("c"), Some(&ValueKind::Boolean));
    }

    #[test]
    fn strides_allocate_unified_endpoint_variables() {
        let symbols = table(
            "state main:\n    during 1s:\n        stride self.center from self.center to 300\n        stride self.center.x from 0 to 10\n        stride self.center.y to 2.5\n",
        );
        assert_eq!(
            symbols.strides,
            vec![
                StrideSymbol {
                    from: "strideFrom0".to_string(),
                    to: "strideTo0".to_string(),
                    kind: ValueKind::Point,
                },
                StrideSymbol {
                    from: "strideFrom1".to_string(),
                    to: "strideTo1".to_string(),
                    kind: ValueKind::Decimal,
                },
            ]
        );
        assert_eq!(symbols.variables.get("strideTo0"), Some(&ValueKind::Point));
        assert!(symbols.locals.is_empty());
    }

    #[test]
    fn bare_names_resolve_to_states_then_animations() {
        let symbols = table("state main:\n    go to idle\nstate idle:\n    wait\n");
        assert_eq!(symbols.resolve("idle", true), Some(Binding::State));
        assert_eq!(symbols.resolve("stand", true), Some(Binding::Animation));
        assert_eq!(symbols.resolve("stand", false), None);
        assert_eq!(symbols.resolve("progress", true), Some(Binding::Animation));
        assert_eq!(
            symbols.resolve("self", false),
            Some(Binding::Builtin(ValueKind::Sprite))
        );
        assert_eq!(symbols.kind_of_path("self.center.x"), Some(ValueKind::Decimal));
        assert_eq!(symbols.kind_of_path("self.wings"), None);
    }

    #[test]
    fn during_seeds_locals_only_while_inside() {
        let group = Node::Group {
            name: "during".to_string(),
            arguments: vec![],
            children: vec![Node::assignment("x", Node::variable("progress"))],
        };
        let mut scope = LocalScope::default();
        let entered = scope.enter(&group);
        assert_eq!(entered, DURING_LOCALS.to_vec());
        assert!(scope.enter(&group).is_empty());
        scope.leave(&entered);
        assert!(scope.is_empty());

        let idle = Node::Group {
            name: "during".to_string(),
            arguments: vec![],
            children: vec![],
        };
        assert!(group_locals(&idle).is_empty());

        let symbols = SymbolTable::build(&[Node::State {
            name: "main".to_string(),
            children: vec![group],
        }]);
        assert!(symbols.locals.is_empty());
        assert_eq!(symbols.variables.get("x"), Some(&ValueKind::Decimal));
    }

    #[test]
    fn group_local_names_are_ordinary_outside_groups() {
        let symbols = table(
            "state main:\n    set time = self.center\n    set p = time + right\n    during 1s:\n        set q = time\n        set jumpTime = 2\n    jump 10:\n        set r = jumpTime\n",
        );
        assert_eq!(symbols.variables.get("time"), Some(&ValueKind::Point));
        assert_eq!(symbols.variables.get("p"), Some(&ValueKind::Point));
        assert_eq!(symbols.variables.get("q"), Some(&ValueKind::Decimal));
        assert_eq!(symbols.variables.get("r"), Some(&ValueKind::Decimal));
        assert_eq!(
            symbols.constants.get("jumpTime"),
            Some(&Node::constant(Value::Integer(2)))
        );
        assert_eq!(symbols.kind_of_path("time"), Some(ValueKind::Point));

        let mut inside = LocalScope::default();
        inside.enter(&Node::Group {
            name: "jump".to_string(),
            arguments: vec![],
            children: vec![],
        });
        assert_eq!(
            symbols.resolve_in(&inside, "jumpTime", true),
            Some(Binding::Local)
        );
        assert_eq!(
            symbols.resolve("jumpTime", true),
            Some(Binding::Constant(&Value::Integer(2)))
        );
    }
}

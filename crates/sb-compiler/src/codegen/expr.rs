use std::collections::BTreeMap;

use sb_core::{split_path, BinaryOperator, Node, UnaryOperator, Value, ValueKind};

use super::names::{c_float, c_string, direction_constant, kind_tag, pascal_case};
use crate::symbols::{Binding, SymbolTable};

/// A C expression and the kind it evaluates to, `None` when unknown.
#[derive(Debug, Clone, PartialEq)]
pub(super) struct Expr {
    pub code: String,
    pub kind: Option<ValueKind>,
}

impl Expr {
    fn new(code: impl Into<String>, kind: ValueKind) -> Self {
        Self {
            code: code.into(),
            kind: Some(kind),
        }
    }

    fn unknown(what: &str) -> Self {
        Self {
            code: format!("0 /* unsupported: {} */", what),
            kind: None,
        }
    }
}

/// Where an assignment writes.
#[derive(Debug, Clone, PartialEq)]
pub(super) enum Place {
    Field { code: String, kind: ValueKind },
    /// Animation of the sprite expression; set through `sprite_set_animation`.
    Animation(String),
    /// Name inlined as a constant everywhere, nothing to store.
    Constant,
    Unsupported,
}

/// Names and kinds visible to the generated code of one script.
pub(super) struct Scope<'a> {
    pub symbols: &'a SymbolTable,
    pub type_name: String,
    /// Script variable → struct member.
    pub members: BTreeMap<String, (String, ValueKind)>,
    /// Group temporaries in scope, innermost last, with their members.
    pub locals: Vec<(&'static str, String)>,
}

impl<'a> Scope<'a> {
    pub fn new(symbols: &'a SymbolTable, type_name: String) -> Self {
        let members = symbols
            .variables
            .iter()
            .enumerate()
            .map(|(index, (name, kind))| {
                (name.clone(), (format!("{}{}", kind_tag(*kind), index), *kind))
            })
            .collect();
        Self {
            symbols,
            type_name,
            members,
            locals: Vec::new(),
        }
    }

    /// Member holding the temporary `name` of the innermost group binding it.
    pub fn local(&self, name: &str) -> Option<&str> {
        self.locals
            .iter()
            .rev()
            .find(|(local, _)| *local == name)
            .map(|(_, member)| member.as_str())
    }

    fn binding(&self, root: &str, bare: bool) -> Option<Binding<'a>> {
        if self.local(root).is_some() {
            return Some(Binding::Local);
        }
        self.symbols.resolve(root, bare)
    }

    pub fn state_type(&self) -> String {
        format!("{}State", self.type_name)
    }

    pub fn state_constant(&self, state: &str) -> String {
        format!("{}State{}", self.type_name, pascal_case(state))
    }

    pub fn constant(&self, value: &Value) -> Expr {
        let code = match value {
            Value::Integer(value) => value.to_string(),
            Value::Decimal(value) => c_float(*value),
            Value::Point(point) => format!("point_make({}, {})", c_float(point.x), c_float(point.y)),
            Value::Boolean(value) => value.to_string(),
            Value::String(value) | Value::AnimationName(value) => c_string(value),
            Value::Direction(direction) => direction_constant(*direction),
            Value::StateName(state) => self.state_constant(state),
            Value::Sprite(_) => "NULL".to_string(),
            Value::Null => "0".to_string(),
        };
        Expr::new(code, value.kind())
    }

    pub fn expression(&self, node: &Node) -> Expr {
        match node {
            Node::Constant { value } => self.constant(value),
            Node::Variable { path } => self.path(path),
            Node::BinaryOp { lhs, operator, rhs } => {
                self.binary(self.expression(lhs), *operator, self.expression(rhs))
            }
            Node::UnaryOp { operator, value } => self.unary(*operator, self.expression(value)),
            Node::Parenthesized { child } => {
                let inner = self.expression(child);
                Expr {
                    code: format!("({})", inner.code),
                    kind: inner.kind,
                }
            }
            other => {
                log::warn!("expression expected, found {:?}", other);
                Expr::unknown("statement in expression")
            }
        }
    }

    fn path(&self, path: &str) -> Expr {
        let segments = split_path(path);
        let Some((root, fields)) = segments.split_first() else {
            return Expr::unknown("empty path");
        };
        let (mut code, mut kind) = match self.binding(root, fields.is_empty()) {
            Some(Binding::Local) => match self.local(root) {
                Some(member) => (format!("script->{}", member), ValueKind::Decimal),
                None => return Expr::unknown(path),
            },
            Some(Binding::Builtin(ValueKind::Sprite)) => ("self".to_string(), ValueKind::Sprite),
            Some(Binding::Builtin(kind)) if *root == "map" => ("map->size".to_string(), kind),
            Some(Binding::Builtin(kind)) => (root.to_string(), kind),
            Some(Binding::Variable(kind)) => match self.members.get(*root) {
                Some((member, _)) => (format!("script->{}", member), kind),
                None => return Expr::unknown(path),
            },
            Some(Binding::Constant(value)) => {
                let constant = self.constant(value);
                (constant.code, value.kind())
            }
            Some(Binding::State) => (self.state_constant(root), ValueKind::StateName),
            Some(Binding::Animation) => (c_string(root), ValueKind::AnimationName),
            None => {
                log::warn!("unknown name '{}' in generated code", path);
                return Expr::unknown(path);
            }
        };

        let mut rest = fields;
        while !rest.is_empty() {
            let Some((next_code, next_kind, consumed)) = property(&code, kind, rest) else {
                log::warn!("no C mapping for '{}'", path);
                return Expr::unknown(path);
            };
            code = next_code;
            kind = next_kind;
            rest = &rest[consumed..];
        }
        Expr::new(code, kind)
    }

    /// Lvalue for an assignment or stride target.
    pub fn place(&self, path: &str) -> Place {
        let segments = split_path(path);
        let Some((root, fields)) = segments.split_first() else {
            return Place::Unsupported;
        };
        let (base, kind) = match self.binding(root, fields.is_empty()) {
            Some(Binding::Local) => match self.local(root) {
                Some(member) => (format!("script->{}", member), ValueKind::Decimal),
                None => return Place::Unsupported,
            },
            Some(Binding::Builtin(ValueKind::Sprite)) => ("self".to_string(), ValueKind::Sprite),
            Some(Binding::Variable(kind)) => match self.members.get(*root) {
                Some((member, _)) => (format!("script->{}", member), kind),
                None => return Place::Unsupported,
            },
            Some(Binding::Constant(_)) if fields.is_empty() => return Place::Constant,
            _ => return Place::Unsupported,
        };
        match (kind, fields) {
            (_, []) if kind != ValueKind::Sprite => Place::Field { code: base, kind },
            (ValueKind::Sprite, ["animation"]) => Place::Animation(base),
            (ValueKind::Sprite | ValueKind::Point, _) => match property(&base, kind, fields) {
                Some((code, kind, consumed)) if consumed == fields.len() => {
                    writable(&code, kind, &fields[consumed - 1])
                }
                Some((code, kind, consumed)) => match (kind, &fields[consumed..]) {
                    (ValueKind::Point, [axis @ ("x" | "y")]) => Place::Field {
                        code: format!("{}.{}", code, axis),
                        kind: ValueKind::Decimal,
                    },
                    _ => Place::Unsupported,
                },
                None => Place::Unsupported,
            },
            _ => Place::Unsupported,
        }
    }

    fn binary(&self, lhs: Expr, operator: BinaryOperator, rhs: Expr) -> Expr {
        use BinaryOperator::*;
        use ValueKind::*;

        let result = match (lhs.kind, rhs.kind) {
            (Some(a), Some(b)) => operator.result_kind(a, b),
            _ => None,
        };
        let (a, b) = (&lhs.code, &rhs.code);
        let arithmetic = matches!(operator, Add | Subtract | Multiply | Divide);
        let code = match (lhs.kind, rhs.kind) {
            (Some(Point), Some(Point)) if operator == Equal => format!("point_equals({}, {})", a, b),
            (Some(Point), Some(Point)) if operator == NotEqual => {
                format!("!point_equals({}, {})", a, b)
            }
            (Some(Point), Some(Point)) if arithmetic => {
                format!("point_{}({}, {})", operator_name(operator), a, b)
            }
            (Some(Point), Some(kind)) if arithmetic && kind.is_numeric() => {
                format!("point_{}_scalar({}, {})", operator_name(operator), a, b)
            }
            (Some(kind), Some(Point)) if arithmetic && kind.is_numeric() => {
                format!("scalar_{}_point({}, {})", operator_name(operator), a, b)
            }
            (Some(Point), Some(Direction)) if matches!(operator, Add | Subtract) => {
                format!("point_{}_direction({}, {})", operator_name(operator), a, b)
            }
            (Some(Direction), Some(kind)) if operator == Multiply && kind.is_numeric() => {
                format!("direction_multiply_scalar({}, {})", a, b)
            }
            (Some(kind), Some(Direction)) if operator == Multiply && kind.is_numeric() => {
                format!("direction_multiply_scalar({}, {})", b, a)
            }
            (Some(String), Some(String)) if operator == Equal => {
                format!("(strcmp({}, {}) == 0)", a, b)
            }
            (Some(String), Some(String)) if operator == NotEqual => {
                format!("(strcmp({}, {}) != 0)", a, b)
            }
            (Some(String), _) | (_, Some(String)) => {
                log::warn!("string operator '{}' has no C mapping", operator.symbol());
                return Expr::unknown("string operator");
            }
            (Some(x), Some(y)) if operator == Modulo && (x == Decimal || y == Decimal) => {
                format!("fmodf({}, {})", a, b)
            }
            (Some(_), Some(_)) if result.is_none() => {
                log::warn!(
                    "operator '{}' is undefined for {} and {}",
                    operator.symbol(),
                    lhs.kind.map_or("unknown", ValueKind::name),
                    rhs.kind.map_or("unknown", ValueKind::name)
                );
                return Expr::unknown("operator");
            }
            _ => format!("({} {} {})", a, operator.symbol(), b),
        };
        Expr { code, kind: result }
    }

    fn unary(&self, operator: UnaryOperator, value: Expr) -> Expr {
        let kind = value.kind.and_then(|kind| operator.result_kind(kind));
        let code = match (operator, value.kind) {
            (UnaryOperator::Negate, Some(ValueKind::Point)) => format!("point_negate({})", value.code),
            (UnaryOperator::Negate, Some(ValueKind::Direction)) => {
                format!("DirectionReverses[{}]", value.code)
            }
            (UnaryOperator::Negate, _) => format!("(-{})", value.code),
            (UnaryOperator::Not, _) => format!("(!{})", value.code),
        };
        Expr { code, kind }
    }
}

fn operator_name(operator: BinaryOperator) -> &'static str {
    match operator {
        BinaryOperator::Add => "add",
        BinaryOperator::Subtract => "subtract",
        BinaryOperator::Multiply => "multiply",
        _ => "divide",
    }
}

/// Maps the property at the head of `fields` on a value of `kind`, returning
/// the new code, its kind and how many fields it consumed.
fn property(code: &str, kind: ValueKind, fields: &[&str]) -> Option<(String, ValueKind, usize)> {
    Some(match (kind, fields) {
        (ValueKind::Sprite, ["center", ..]) => (format!("{}->frame.origin", code), ValueKind::Point, 1),
        (ValueKind::Sprite, ["direction", ..]) => {
            (format!("{}->direction", code), ValueKind::Direction, 1)
        }
        (ValueKind::Sprite, ["animation", field @ ("speed" | "duration"), ..]) => (
            format!("{}->animation.{}", code, field),
            ValueKind::Decimal,
            2,
        ),
        (ValueKind::Sprite, ["animation", ..]) => (
            format!("{}->animation.name", code),
            ValueKind::AnimationName,
            1,
        ),
        (ValueKind::Point, [axis @ ("x" | "y"), ..]) => {
            (format!("{}.{}", code, axis), ValueKind::Decimal, 1)
        }
        (ValueKind::Direction, ["reverse", ..]) => {
            (format!("DirectionReverses[{}]", code), ValueKind::Direction, 1)
        }
        (ValueKind::Direction, ["value", ..]) => (format!("(int){}", code), ValueKind::Integer, 1),
        (ValueKind::Direction, ["vector", ..]) => {
            (format!("DirectionVectors[{}]", code), ValueKind::Point, 1)
        }
        (ValueKind::AnimationName, ["name", ..]) => (code.to_string(), ValueKind::String, 1),
        (ValueKind::String, ["length", ..]) => {
            (format!("(int)strlen({})", code), ValueKind::Integer, 1)
        }
        _ => return None,
    })
}

/// Sprite fields that are plain struct members can be assigned directly;
/// computed ones like `direction.reverse` cannot.
fn writable(code: &str, kind: ValueKind, last: &str) -> Place {
    match last {
        "center" | "direction" | "speed" | "duration" | "x" | "y" => Place::Field {
            code: code.to_string(),
            kind,
        },
        _ => Place::Unsupported,
    }
}

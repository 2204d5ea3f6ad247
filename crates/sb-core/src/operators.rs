use serde::{Deserialize, Serialize};

use crate::error::LookupError;
use crate::value::{Point, Value, ValueKind};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum BinaryOperator {
    Or,
    And,
    Equal,
    NotEqual,
    Less,
    LessOrEqual,
    Greater,
    GreaterOrEqual,
    Add,
    Subtract,
    Multiply,
    Divide,
    Modulo,
}

impl BinaryOperator {
    pub const ALL: [BinaryOperator; 13] = [
        BinaryOperator::Or,
        BinaryOperator::And,
        BinaryOperator::Equal,
        BinaryOperator::NotEqual,
        BinaryOperator::Less,
        BinaryOperator::LessOrEqual,
        BinaryOperator::Greater,
        BinaryOperator::GreaterOrEqual,
        BinaryOperator::Add,
        BinaryOperator::Subtract,
        BinaryOperator::Multiply,
        BinaryOperator::Divide,
        BinaryOperator::Modulo,
    ];

    pub fn symbol(self) -> &'static str {
        match self {
            Self::Or => "||",
            Self::And => "&&",
            Self::Equal => "==",
            Self::NotEqual => "!=",
            Self::Less => "<",
            Self::LessOrEqual => "<=",
            Self::Greater => ">",
            Self::GreaterOrEqual => ">=",
            Self::Add => "+",
            Self::Subtract => "-",
            Self::Multiply => "*",
            Self::Divide => "/",
            Self::Modulo => "%",
        }
    }

    pub fn from_symbol(symbol: &str) -> Result<Self, LookupError> {
        Self::ALL
            .into_iter()
            .find(|operator| operator.symbol() == symbol)
            .ok_or_else(|| LookupError::UnknownOperator(symbol.to_string()))
    }

    /// Higher binds tighter. Operators of equal priority associate left.
    pub fn priority(self) -> u8 {
        match self {
            Self::Or => 1,
            Self::And => 2,
            Self::Equal
            | Self::NotEqual
            | Self::Less
            | Self::LessOrEqual
            | Self::Greater
            | Self::GreaterOrEqual => 3,
            Self::Add | Self::Subtract => 4,
            Self::Multiply | Self::Divide | Self::Modulo => 5,
        }
    }

    pub fn apply(self, lhs: &Value, rhs: &Value) -> Value {
        match self {
            Self::Or | Self::And => match (lhs, rhs) {
                (Value::Boolean(a), Value::Boolean(b)) => Value::Boolean(if self == Self::And {
                    *a && *b
                } else {
                    *a || *b
                }),
                _ => Value::Null,
            },
            Self::Equal => equality(lhs, rhs).map_or(Value::Null, Value::Boolean),
            Self::NotEqual => equality(lhs, rhs).map_or(Value::Null, |equal| Value::Boolean(!equal)),
            Self::Less | Self::LessOrEqual | Self::Greater | Self::GreaterOrEqual => {
                compare(self, lhs, rhs)
            }
            Self::Add | Self::Subtract | Self::Multiply | Self::Divide | Self::Modulo => {
                arithmetic(self, lhs, rhs)
            }
        }
    }

    /// Static result kind, derived from the runtime table so both never
    /// disagree. `None` when the combination is undefined.
    pub fn result_kind(self, lhs: ValueKind, rhs: ValueKind) -> Option<ValueKind> {
        match self.apply(&lhs.sample(), &rhs.sample()) {
            Value::Null => None,
            value => Some(value.kind()),
        }
    }
}

fn equality(lhs: &Value, rhs: &Value) -> Option<bool> {
    match (lhs, rhs) {
        (Value::Null, other) | (other, Value::Null) => Some(other.is_null()),
        (Value::Integer(a), Value::Integer(b)) => Some(a == b),
        (Value::Integer(_) | Value::Decimal(_), Value::Integer(_) | Value::Decimal(_)) => {
            Some(lhs.as_decimal() == rhs.as_decimal())
        }
        _ if lhs.kind() == rhs.kind() => Some(lhs == rhs),
        _ => None,
    }
}

fn compare(operator: BinaryOperator, lhs: &Value, rhs: &Value) -> Value {
    let ordering = match (lhs, rhs) {
        (Value::Integer(a), Value::Integer(b)) => a.partial_cmp(b),
        _ => match (lhs.as_decimal(), rhs.as_decimal()) {
            (Some(a), Some(b)) => a.partial_cmp(&b),
            _ => None,
        },
    };
    let Some(ordering) = ordering else {
        return Value::Null;
    };
    Value::Boolean(match operator {
        BinaryOperator::Less => ordering.is_lt(),
        BinaryOperator::LessOrEqual => ordering.is_le(),
        BinaryOperator::Greater => ordering.is_gt(),
        _ => ordering.is_ge(),
    })
}

fn arithmetic(operator: BinaryOperator, lhs: &Value, rhs: &Value) -> Value {
    match (lhs, rhs) {
        (Value::Integer(a), Value::Integer(b)) => integer_arithmetic(operator, *a, *b),
        (Value::Integer(_) | Value::Decimal(_), Value::Integer(_) | Value::Decimal(_)) => {
            match (lhs.as_decimal(), rhs.as_decimal()) {
                (Some(a), Some(b)) => Value::Decimal(decimal_arithmetic(operator, a, b)),
                _ => Value::Null,
            }
        }
        (Value::Point(a), Value::Point(b)) => match operator {
            BinaryOperator::Modulo => Value::Null,
            _ => Value::Point(a.zip(*b, |x, y| decimal_arithmetic(operator, x, y))),
        },
        (Value::Point(point), scalar) if scalar.kind().is_numeric() => {
            let scalar = scalar.as_decimal().unwrap_or_default();
            Value::Point(point.map(|component| decimal_arithmetic(operator, component, scalar)))
        }
        (scalar, Value::Point(point)) if scalar.kind().is_numeric() => {
            let scalar = scalar.as_decimal().unwrap_or_default();
            Value::Point(point.map(|component| decimal_arithmetic(operator, scalar, component)))
        }
        (Value::Point(point), Value::Direction(direction)) => match operator {
            BinaryOperator::Add => Value::Point(offset(*point, direction.unit_vector(), 1.0)),
            BinaryOperator::Subtract => Value::Point(offset(*point, direction.unit_vector(), -1.0)),
            _ => Value::Null,
        },
        (Value::Direction(direction), scalar) | (scalar, Value::Direction(direction))
            if operator == BinaryOperator::Multiply && scalar.kind().is_numeric() =>
        {
            let scalar = scalar.as_decimal().unwrap_or_default();
            Value::Point(direction.unit_vector().map(|component| component * scalar))
        }
        (Value::String(a), b) if operator == BinaryOperator::Add => {
            Value::String(format!("{}{}", a, b))
        }
        (a, Value::String(b)) if operator == BinaryOperator::Add => {
            Value::String(format!("{}{}", a, b))
        }
        _ => Value::Null,
    }
}

fn offset(point: Point, vector: Point, sign: f32) -> Point {
    Point::new(point.x + vector.x * sign, point.y + vector.y * sign)
}

fn integer_arithmetic(operator: BinaryOperator, a: i32, b: i32) -> Value {
    let result = match operator {
        BinaryOperator::Add => a.checked_add(b),
        BinaryOperator::Subtract => a.checked_sub(b),
        BinaryOperator::Multiply => a.checked_mul(b),
        BinaryOperator::Divide => a.checked_div(b),
        BinaryOperator::Modulo => a.checked_rem(b),
        _ => None,
    };
    result.map_or(Value::Null, Value::Integer)
}

fn decimal_arithmetic(operator: BinaryOperator, a: f32, b: f32) -> f32 {
    match operator {
        BinaryOperator::Add => a + b,
        BinaryOperator::Subtract => a - b,
        BinaryOperator::Multiply => a * b,
        BinaryOperator::Divide => a / b,
        BinaryOperator::Modulo => a % b,
        _ => f32::NAN,
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum UnaryOperator {
    Negate,
    Not,
}

impl UnaryOperator {
    pub fn symbol(self) -> &'static str {
        match self {
            Self::Negate => "-",
            Self::Not => "!",
        }
    }

    pub fn from_symbol(symbol: &str) -> Result<Self, LookupError> {
        match symbol {
            "-" => Ok(Self::Negate),
            "!" | "not" => Ok(Self::Not),
            other => Err(LookupError::UnknownOperator(other.to_string())),
        }
    }

    pub fn apply(self, value: &Value) -> Value {
        match (self, value) {
            (Self::Negate, Value::Integer(value)) => {
                value.checked_neg().map_or(Value::Null, Value::Integer)
            }
            (Self::Negate, Value::Decimal(value)) => Value::Decimal(-value),
            (Self::Negate, Value::Point(point)) => Value::Point(point.map(|component| -component)),
            (Self::Negate, Value::Direction(direction)) => Value::Direction(direction.reverse()),
            (Self::Not, Value::Boolean(value)) => Value::Boolean(!value),
            _ => Value::Null,
        }
    }

    pub fn result_kind(self, kind: ValueKind) -> Option<ValueKind> {
        match self.apply(&kind.sample()) {
            Value::Null => None,
            value => Some(value.kind()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::value::Direction;

    #[test]
    fn integer_and_decimal_mix_to_decimal() {
        assert_eq!(
            BinaryOperator::Add.apply(&Value::Integer(2), &Value::Integer(3)),
            Value::Integer(5)
        );
        assert_eq!(
            BinaryOperator::Multiply.apply(&Value::Integer(2), &Value::Decimal(1.5)),
            Value::Decimal(3.0)
        );
        assert_eq!(
            BinaryOperator::Divide.apply(&Value::Integer(2), &Value::Integer(0)),
            Value::Null
        );
    }

    #[test]
    fn points_combine_with_scalars_and_directions() {
        let point = Value::Point(Point::new(2.0, 4.0));
        assert_eq!(
            BinaryOperator::Multiply.apply(&point, &Value::Integer(2)),
            Value::Point(Point::new(4.0, 8.0))
        );
        assert_eq!(
            BinaryOperator::Subtract.apply(&Value::Integer(10), &point),
            Value::Point(Point::new(8.0, 6.0))
        );
        assert_eq!(
            BinaryOperator::Add.apply(&point, &Value::Direction(Direction::Up)),
            Value::Point(Point::new(2.0, 3.0))
        );
        assert_eq!(
            BinaryOperator::Multiply.apply(&Value::Direction(Direction::Left), &Value::Integer(3)),
            Value::Point(Point::new(-3.0, 0.0))
        );
    }

    #[test]
    fn undefined_combinations_are_null() {
        assert_eq!(
            BinaryOperator::Add.apply(&Value::Boolean(true), &Value::Integer(1)),
            Value::Null
        );
        assert_eq!(
            BinaryOperator::Equal.apply(&Value::Boolean(true), &Value::Integer(1)),
            Value::Null
        );
        assert_eq!(
            BinaryOperator::Less.apply(&Value::Point(Point::ZERO), &Value::Integer(1)),
            Value::Null
        );
        assert_eq!(UnaryOperator::Not.apply(&Value::Integer(1)), Value::Null);
    }

    #[test]
    fn equality_handles_numeric_mix_and_null() {
        assert_eq!(
            BinaryOperator::Equal.apply(&Value::Integer(2), &Value::Decimal(2.0)),
            Value::Boolean(true)
        );
        assert_eq!(
            BinaryOperator::NotEqual.apply(&Value::Null, &Value::Integer(2)),
            Value::Boolean(true)
        );
        assert_eq!(
            BinaryOperator::Equal.apply(
                &Value::Direction(Direction::Left),
                &Value::Direction(Direction::Left)
            ),
            Value::Boolean(true)
        );
    }

    #[test]
    fn strings_concatenate() {
        assert_eq!(
            BinaryOperator::Add.apply(&Value::String("hp: ".to_string()), &Value::Integer(3)),
            Value::String("hp: 3".to_string())
        );
    }

    #[test]
    fn result_kind_follows_runtime_table() {
        assert_eq!(
            BinaryOperator::Add.result_kind(ValueKind::Integer, ValueKind::Decimal),
            Some(ValueKind::Decimal)
        );
        assert_eq!(
            BinaryOperator::Add.result_kind(ValueKind::Point, ValueKind::Direction),
            Some(ValueKind::Point)
        );
        assert_eq!(
            BinaryOperator::Less.result_kind(ValueKind::Integer, ValueKind::Integer),
            Some(ValueKind::Boolean)
        );
        assert_eq!(
            BinaryOperator::And.result_kind(ValueKind::Integer, ValueKind::Boolean),
            None
        );
        assert_eq!(
            UnaryOperator::Negate.result_kind(ValueKind::Direction),
            Some(ValueKind::Direction)
        );
    }

    #[test]
    fn symbols_round_trip() {
        for operator in BinaryOperator::ALL {
            assert_eq!(BinaryOperator::from_symbol(operator.symbol()), Ok(operator));
        }
        assert_eq!(UnaryOperator::from_symbol("not"), Ok(UnaryOperator::Not));
        assert!(BinaryOperator::from_symbol("**").is_err());
    }

    #[test]
    fn multiplicative_binds_tighter_than_additive() {
        assert!(BinaryOperator::Multiply.priority() > BinaryOperator::Add.priority());
        assert!(BinaryOperator::Add.priority() > BinaryOperator::Less.priority());
        assert!(BinaryOperator::And.priority() > BinaryOperator::Or.priority());
    }
}

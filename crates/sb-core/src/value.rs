use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::LookupError;

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Point {
    pub x: f32,
    pub y: f32,
}

impl Point {
    pub const ZERO: Point = Point { x: 0.0, y: 0.0 };

    pub fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    pub fn lerp(self, to: Point, progress: f32) -> Point {
        Point::new(
            self.x + (to.x - self.x) * progress,
            self.y + (to.y - self.y) * progress,
        )
    }

    pub fn map(self, f: impl Fn(f32) -> f32) -> Point {
        Point::new(f(self.x), f(self.y))
    }

    pub fn zip(self, other: Point, f: impl Fn(f32, f32) -> f32) -> Point {
        Point::new(f(self.x, other.x), f(self.y, other.y))
    }
}

impl fmt::Display for Point {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    Up,
    Down,
    Left,
    Right,
}

impl Direction {
    pub const ALL: [Direction; 4] = [
        Direction::Up,
        Direction::Down,
        Direction::Left,
        Direction::Right,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Self::Up => "up",
            Self::Down => "down",
            Self::Left => "left",
            Self::Right => "right",
        }
    }

    pub fn from_name(name: &str) -> Result<Self, LookupError> {
        Self::ALL
            .into_iter()
            .find(|direction| direction.name() == name)
            .ok_or_else(|| LookupError::UnknownDirection(name.to_string()))
    }

    pub fn reverse(self) -> Self {
        match self {
            Self::Up => Self::Down,
            Self::Down => Self::Up,
            Self::Left => Self::Right,
            Self::Right => Self::Left,
        }
    }

    pub fn value(self) -> i32 {
        match self {
            Self::Up => 0,
            Self::Down => 1,
            Self::Left => 2,
            Self::Right => 3,
        }
    }

    /// Unit vector in screen coordinates (y grows downward).
    pub fn unit_vector(self) -> Point {
        match self {
            Self::Up => Point::new(0.0, -1.0),
            Self::Down => Point::new(0.0, 1.0),
            Self::Left => Point::new(-1.0, 0.0),
            Self::Right => Point::new(1.0, 0.0),
        }
    }
}

/// Opaque handle to an engine-owned sprite.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct SpriteRef(pub u32);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ValueKind {
    Integer,
    Decimal,
    Point,
    Boolean,
    String,
    Direction,
    StateName,
    AnimationName,
    Sprite,
    Null,
}

impl ValueKind {
    pub fn name(self) -> &'static str {
        match self {
            Self::Integer => "integer",
            Self::Decimal => "decimal",
            Self::Point => "point",
            Self::Boolean => "boolean",
            Self::String => "string",
            Self::Direction => "direction",
            Self::StateName => "state",
            Self::AnimationName => "animation",
            Self::Sprite => "sprite",
            Self::Null => "null",
        }
    }

    pub fn is_numeric(self) -> bool {
        matches!(self, Self::Integer | Self::Decimal)
    }

    /// A representative value of the kind, used to derive static operator
    /// result kinds from the runtime operator table.
    pub fn sample(self) -> Value {
        match self {
            Self::Integer => Value::Integer(1),
            Self::Decimal => Value::Decimal(1.0),
            Self::Point => Value::Point(Point::new(1.0, 1.0)),
            Self::Boolean => Value::Boolean(true),
            Self::String => Value::String(String::new()),
            Self::Direction => Value::Direction(Direction::Up),
            Self::StateName => Value::StateName(String::new()),
            Self::AnimationName => Value::AnimationName(String::new()),
            Self::Sprite => Value::Sprite(SpriteRef(0)),
            Self::Null => Value::Null,
        }
    }

    /// Static counterpart of [`Value::property`], including the sprite
    /// pseudo-properties resolved through the host.
    pub fn property_kind(self, name: &str) -> Option<ValueKind> {
        match (self, name) {
            (Self::Point, "x" | "y") => Some(Self::Decimal),
            (Self::Direction, "reverse") => Some(Self::Direction),
            (Self::Direction, "value") => Some(Self::Integer),
            (Self::Direction, "vector") => Some(Self::Point),
            (Self::AnimationName, "name") => Some(Self::String),
            (Self::AnimationName, "speed" | "duration") => Some(Self::Decimal),
            (Self::String, "length") => Some(Self::Integer),
            (Self::Sprite, "center") => Some(Self::Point),
            (Self::Sprite, "direction") => Some(Self::Direction),
            (Self::Sprite, "animation") => Some(Self::AnimationName),
            _ => None,
        }
    }

    /// Kind a `stride` interpolates in when easing between the two kinds.
    pub fn unify(self, other: ValueKind) -> ValueKind {
        if self == other {
            return self;
        }
        match (self, other) {
            (Self::Point, kind) | (kind, Self::Point) if kind.is_numeric() => Self::Point,
            _ => Self::Decimal,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "camelCase")]
pub enum Value {
    Integer(i32),
    Decimal(f32),
    Point(Point),
    Boolean(bool),
    String(String),
    Direction(Direction),
    StateName(String),
    AnimationName(String),
    Sprite(SpriteRef),
    Null,
}

impl Value {
    pub fn kind(&self) -> ValueKind {
        match self {
            Self::Integer(_) => ValueKind::Integer,
            Self::Decimal(_) => ValueKind::Decimal,
            Self::Point(_) => ValueKind::Point,
            Self::Boolean(_) => ValueKind::Boolean,
            Self::String(_) => ValueKind::String,
            Self::Direction(_) => ValueKind::Direction,
            Self::StateName(_) => ValueKind::StateName,
            Self::AnimationName(_) => ValueKind::AnimationName,
            Self::Sprite(_) => ValueKind::Sprite,
            Self::Null => ValueKind::Null,
        }
    }

    pub fn type_name(&self) -> &'static str {
        self.kind().name()
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    pub fn as_decimal(&self) -> Option<f32> {
        match self {
            Self::Integer(value) => Some(*value as f32),
            Self::Decimal(value) => Some(*value),
            _ => None,
        }
    }

    pub fn as_integer(&self) -> Option<i32> {
        match self {
            Self::Integer(value) => Some(*value),
            Self::Decimal(value) => Some(*value as i32),
            _ => None,
        }
    }

    pub fn as_point(&self) -> Option<Point> {
        match self {
            Self::Point(point) => Some(*point),
            Self::Direction(direction) => Some(direction.unit_vector()),
            _ => None,
        }
    }

    pub fn as_boolean(&self) -> Option<bool> {
        match self {
            Self::Boolean(value) => Some(*value),
            _ => None,
        }
    }

    pub fn as_string(&self) -> Option<&str> {
        match self {
            Self::String(value) | Self::StateName(value) | Self::AnimationName(value) => {
                Some(value.as_str())
            }
            _ => None,
        }
    }

    /// Only `true` passes a guard; `Null` and every other kind fail it.
    pub fn is_truthy(&self) -> bool {
        matches!(self, Self::Boolean(true))
    }

    /// Scalar kinds the reducer may copy into the tree as constants.
    pub fn is_inlineable(&self) -> bool {
        matches!(
            self,
            Self::Integer(_)
                | Self::Decimal(_)
                | Self::Boolean(_)
                | Self::Point(_)
                | Self::Direction(_)
        )
    }

    /// Reads a field of a detached value. Sprite fields need the host and
    /// are resolved by [`crate::sprite::read_path`].
    pub fn property(&self, name: &str) -> Value {
        match (self, name) {
            (Self::Point(point), "x") => Self::Decimal(point.x),
            (Self::Point(point), "y") => Self::Decimal(point.y),
            (Self::Direction(direction), "reverse") => Self::Direction(direction.reverse()),
            (Self::Direction(direction), "value") => Self::Integer(direction.value()),
            (Self::Direction(direction), "vector") => Self::Point(direction.unit_vector()),
            (Self::AnimationName(name), "name") => Self::String(name.clone()),
            (Self::String(value), "length") => Self::Integer(value.chars().count() as i32),
            _ => Self::Null,
        }
    }

    /// Returns a copy with `name` replaced, or `None` when the field cannot
    /// be edited on this kind.
    pub fn with_property(&self, name: &str, value: &Value) -> Option<Value> {
        match (self, name) {
            (Self::Point(point), "x") => value
                .as_decimal()
                .map(|x| Self::Point(Point::new(x, point.y))),
            (Self::Point(point), "y") => value
                .as_decimal()
                .map(|y| Self::Point(Point::new(point.x, y))),
            _ => None,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Integer(value) => write!(f, "{}", value),
            Self::Decimal(value) => write!(f, "{}", value),
            Self::Point(point) => write!(f, "{}", point),
            Self::Boolean(value) => write!(f, "{}", value),
            Self::String(value) => write!(f, "{}", value),
            Self::Direction(direction) => write!(f, "{}", direction.name()),
            Self::StateName(name) => write!(f, "{}", name),
            Self::AnimationName(name) => write!(f, "@{}", name),
            Self::Sprite(sprite) => write!(f, "sprite#{}", sprite.0),
            Self::Null => write!(f, "null"),
        }
    }
}

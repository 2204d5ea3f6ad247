use serde::{Deserialize, Serialize};

use crate::value::{Direction, Point, SpriteRef, Value};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnimationState {
    pub name: String,
    pub duration: f32,
    pub speed: f32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum SpriteDefinition {
    Index(i32),
    Named(String),
}

impl SpriteDefinition {
    pub fn from_value(value: &Value) -> Option<Self> {
        match value {
            Value::Integer(index) => Some(Self::Index(*index)),
            Value::String(name) | Value::AnimationName(name) => Some(Self::Named(name.clone())),
            _ => None,
        }
    }
}

/// Engine-side sprite state, borrowed by the interpreter for one tick.
/// Getters return `None` for sprites the engine no longer knows.
pub trait SpriteHost {
    fn center(&self, sprite: SpriteRef) -> Option<Point>;
    fn set_center(&mut self, sprite: SpriteRef, center: Point);
    fn direction(&self, sprite: SpriteRef) -> Option<Direction>;
    fn set_direction(&mut self, sprite: SpriteRef, direction: Direction);
    fn animation(&self, sprite: SpriteRef) -> Option<AnimationState>;
    fn set_animation(&mut self, sprite: SpriteRef, name: &str);
    fn set_animation_speed(&mut self, sprite: SpriteRef, speed: f32);
    fn set_animation_duration(&mut self, sprite: SpriteRef, duration: f32);
    fn remove(&mut self, sprite: SpriteRef);

    /// Allocates a sprite from a definition. Hosts without a sprite manager
    /// keep the default.
    fn spawn(
        &mut self,
        _definition: &SpriteDefinition,
        _animation: Option<&str>,
        _at: Option<Point>,
    ) -> Option<SpriteRef> {
        None
    }
}

/// Resolves `segments` (the path after its root) against `root`. Sprite
/// fields are read through `host`; without a host they resolve to `Null`.
pub fn read_path(root: &Value, segments: &[&str], host: Option<&dyn SpriteHost>) -> Value {
    let mut current = root.clone();
    let mut index = 0;
    while index < segments.len() {
        current = match (&current, host) {
            (Value::Sprite(sprite), Some(host)) => {
                let (value, consumed) = read_sprite_property(host, *sprite, &segments[index..]);
                index += consumed.max(1);
                value
            }
            _ => {
                let value = current.property(segments[index]);
                index += 1;
                value
            }
        };
        if current.is_null() {
            break;
        }
    }
    current
}

/// Reads the sprite pseudo-property at the head of `segments`, returning the
/// value and how many segments it consumed.
pub fn read_sprite_property(
    host: &dyn SpriteHost,
    sprite: SpriteRef,
    segments: &[&str],
) -> (Value, usize) {
    match segments {
        ["center", ..] => (host.center(sprite).map_or(Value::Null, Value::Point), 1),
        ["direction", ..] => (
            host.direction(sprite).map_or(Value::Null, Value::Direction),
            1,
        ),
        ["animation", field @ ("name" | "speed" | "duration"), ..] => {
            let value = match host.animation(sprite) {
                Some(animation) => match *field {
                    "name" => Value::String(animation.name),
                    "speed" => Value::Decimal(animation.speed),
                    _ => Value::Decimal(animation.duration),
                },
                None => Value::Null,
            };
            (value, 2)
        }
        ["animation", ..] => (
            host.animation(sprite)
                .map_or(Value::Null, |animation| Value::AnimationName(animation.name)),
            1,
        ),
        _ => (Value::Null, 1),
    }
}

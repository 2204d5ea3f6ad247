use std::collections::BTreeMap;

use sb_core::{AnimationState, Direction, Point, SpriteDefinition, SpriteHost, SpriteRef};
use serde::{Deserialize, Serialize};

/// Engine-side state of one sprite as the in-memory host keeps it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct SpriteRecord {
    pub definition: Option<SpriteDefinition>,
    pub center: Point,
    pub direction: Direction,
    pub animation: AnimationState,
}

impl Default for SpriteRecord {
    fn default() -> Self {
        Self {
            definition: None,
            center: Point::ZERO,
            direction: Direction::Right,
            animation: AnimationState {
                name: String::new(),
                duration: 0.0,
                speed: 1.0,
            },
        }
    }
}

/// [`SpriteHost`] backed by a map, used by tools and tests that run scripts
/// without a game engine.
#[derive(Debug, Clone, Default)]
pub struct SpriteTable {
    sprites: BTreeMap<SpriteRef, SpriteRecord>,
    next_id: u32,
    removed: Vec<SpriteRef>,
}

impl SpriteTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, record: SpriteRecord) -> SpriteRef {
        self.next_id += 1;
        let sprite = SpriteRef(self.next_id);
        self.sprites.insert(sprite, record);
        sprite
    }

    pub fn get(&self, sprite: SpriteRef) -> Option<&SpriteRecord> {
        self.sprites.get(&sprite)
    }

    pub fn get_mut(&mut self, sprite: SpriteRef) -> Option<&mut SpriteRecord> {
        self.sprites.get_mut(&sprite)
    }

    pub fn len(&self) -> usize {
        self.sprites.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sprites.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (SpriteRef, &SpriteRecord)> {
        self.sprites.iter().map(|(sprite, record)| (*sprite, record))
    }

    /// Sprites removed by scripts, oldest first.
    pub fn removed(&self) -> &[SpriteRef] {
        &self.removed
    }
}

impl SpriteHost for SpriteTable {
    fn center(&self, sprite: SpriteRef) -> Option<Point> {
        self.get(sprite).map(|record| record.center)
    }

    fn set_center(&mut self, sprite: SpriteRef, center: Point) {
        if let Some(record) = self.get_mut(sprite) {
            record.center = center;
        }
    }

    fn direction(&self, sprite: SpriteRef) -> Option<Direction> {
        self.get(sprite).map(|record| record.direction)
    }

    fn set_direction(&mut self, sprite: SpriteRef, direction: Direction) {
        if let Some(record) = self.get_mut(sprite) {
            record.direction = direction;
        }
    }

    fn animation(&self, sprite: SpriteRef) -> Option<AnimationState> {
        self.get(sprite).map(|record| record.animation.clone())
    }

    fn set_animation(&mut self, sprite: SpriteRef, name: &str) {
        if let Some(record) = self.get_mut(sprite) {
            record.animation.name = name.to_string();
        }
    }

    fn set_animation_speed(&mut self, sprite: SpriteRef, speed: f32) {
        if let Some(record) = self.get_mut(sprite) {
            record.animation.speed = speed;
        }
    }

    fn set_animation_duration(&mut self, sprite: SpriteRef, duration: f32) {
        if let Some(record) = self.get_mut(sprite) {
            record.animation.duration = duration;
        }
    }

    fn remove(&mut self, sprite: SpriteRef) {
        if self.sprites.remove(&sprite).is_some() {
            self.removed.push(sprite);
        }
    }

    fn spawn(
        &mut self,
        definition: &SpriteDefinition,
        animation: Option<&str>,
        at: Option<Point>,
    ) -> Option<SpriteRef> {
        let mut record = SpriteRecord {
            definition: Some(definition.clone()),
            center: at.unwrap_or(Point::ZERO),
            ..SpriteRecord::default()
        };
        if let Some(animation) = animation {
            record.animation.name = animation.to_string();
        }
        Some(self.insert(record))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn spawn_and_remove_track_sprites() {
        let mut table = SpriteTable::new();
        let hero = table.insert(SpriteRecord::default());
        let bullet = table
            .spawn(
                &SpriteDefinition::Named("bullet".to_string()),
                Some("fly"),
                Some(Point::new(3.0, 4.0)),
            )
            .expect("table always spawns");
        assert_ne!(hero, bullet);
        assert_eq!(table.center(bullet), Some(Point::new(3.0, 4.0)));
        assert_eq!(
            table.animation(bullet).map(|animation| animation.name),
            Some("fly".to_string())
        );

        table.remove(bullet);
        table.remove(bullet);
        assert_eq!(table.removed(), &[bullet]);
        assert_eq!(table.len(), 1);
        assert_eq!(table.center(bullet), None);
    }

    #[test]
    fn records_deserialize_with_defaults() {
        let record: SpriteRecord = serde_json::from_str(r#"{"center":{"x":1.0,"y":2.0}}"#)
            .expect("record should parse");
        assert_eq!(record.center, Point::new(1.0, 2.0));
        assert_eq!(record.direction, Direction::Right);
        assert_eq!(record.animation.speed, 1.0);
    }
}

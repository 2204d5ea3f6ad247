mod engine;
mod sprites;

pub use engine::{ExecutionContext, Tick, DURING_LOCALS, GRAVITY, JUMP_LOCALS, MAX_STEPS_PER_TICK};
pub use sprites::{SpriteRecord, SpriteTable};

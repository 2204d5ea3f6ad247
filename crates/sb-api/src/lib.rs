mod publisher;

use std::sync::Arc;

use sb_compiler::{compile_source, transpile_source, CodegenOptions, CompileOptions, GeneratedCode};
use sb_core::{Point, Script, ScriptError, SpriteHost, SpriteRef};
use sb_runtime::{ExecutionContext, Tick};

pub use publisher::{CompiledScript, Executor, InlineExecutor, Job, ScriptPublisher, ThreadExecutor};

#[derive(Debug, Clone)]
pub struct EngineOptions {
    pub source: String,
    /// Sprite the script drives; bound as `self` on every tick.
    pub sprite: SpriteRef,
    pub map: Point,
    pub compile: CompileOptions,
}

/// One compiled script bound to the sprite it drives.
#[derive(Debug, Clone)]
pub struct SpriteEngine {
    context: ExecutionContext,
    sprite: SpriteRef,
    map: Point,
}

impl SpriteEngine {
    pub fn new(script: Arc<Script>, sprite: SpriteRef, map: Point) -> Self {
        Self {
            context: ExecutionContext::new(script),
            sprite,
            map,
        }
    }

    pub fn sprite(&self) -> SpriteRef {
        self.sprite
    }

    pub fn context(&self) -> &ExecutionContext {
        &self.context
    }

    pub fn context_mut(&mut self) -> &mut ExecutionContext {
        &mut self.context
    }

    pub fn set_map(&mut self, map: Point) {
        self.map = map;
    }

    pub fn tick(&mut self, delta: f32, host: &mut dyn SpriteHost) -> Result<(), ScriptError> {
        self.context.run(Tick {
            sprite: self.sprite,
            map: self.map,
            delta,
            host,
        })
    }

    pub fn take_output(&mut self) -> Vec<String> {
        self.context.take_output()
    }
}

pub fn compile_script_from_source(
    source: &str,
    options: &CompileOptions,
) -> Result<Script, ScriptError> {
    compile_source(source, options)
}

pub fn transpile(source: &str, options: &CodegenOptions) -> Result<GeneratedCode, ScriptError> {
    transpile_source(source, options)
}

pub fn create_engine(options: EngineOptions) -> Result<SpriteEngine, ScriptError> {
    let script = compile_source(&options.source, &options.compile)?;
    if script.state_start(&script.initial_state).is_none() {
        return Err(ScriptError::new(
            "API_NO_STATES",
            "Expected at least one state declaration.",
        ));
    }
    Ok(SpriteEngine::new(Arc::new(script), options.sprite, options.map))
}

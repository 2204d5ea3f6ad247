/// Instructions one [`ExecutionContext::run`] may dispatch before giving up.
pub const MAX_STEPS_PER_TICK: usize = 10_000;
/// Gravity of `jump` groups in px/s²; y grows downward.
pub const GRAVITY: f32 = 1000.0;
/// Temporaries a running `during` group binds in the heap.
pub const DURING_LOCALS: [&str; 3] = ["time", "progress", "duration"];
/// Temporaries a running `jump` group binds in the heap.
pub const JUMP_LOCALS: [&str; 3] = ["jumpTime", "jumpOrigin", "jumpVelocity"];

/// Frame inputs for one run.
pub struct Tick<'h> {
    pub sprite: SpriteRef,
    /// Size of the map the sprite lives on.
    pub map: Point,
    /// Seconds since the previous run.
    pub delta: f32,
    pub host: &'h mut dyn SpriteHost,
}

/// Resumable state of one script driving one sprite.
#[derive(Debug, Clone)]
pub struct ExecutionContext {
    script: Arc<Script>,
    ip: usize,
    stack: Vec<Value>,
    heap: BTreeMap<String, Value>,
    arguments: BTreeMap<String, Value>,
    yielded: bool,
    state: String,
    tick: u64,
    /// Loop guard index → tick it last evaluated on.
    guard_ticks: BTreeMap<usize, u64>,
    /// Loop guard index → heap entries its temporaries hid on entry.
    shadowed: BTreeMap<usize, Vec<(String, Option<Value>)>>,
    output: Vec<String>,
}

impl ExecutionContext {
    pub fn new(script: Arc<Script>) -> Self {
        let state = script.initial_state.clone();
        let ip = script.state_start(&state).unwrap_or(0);
        Self {
            script,
            ip,
            stack: Vec::new(),
            heap: BTreeMap::new(),
            arguments: BTreeMap::new(),
            yielded: false,
            state,
            tick: 0,
            guard_ticks: BTreeMap::new(),
            shadowed: BTreeMap::new(),
            output: Vec::new(),
        }
    }

    pub fn script(&self) -> &Arc<Script> {
        &self.script
    }

    pub fn state(&self) -> &str {
        &self.state
    }

    pub fn instruction_pointer(&self) -> usize {
        self.ip
    }

    /// Number of completed or attempted runs.
    pub fn tick_count(&self) -> u64 {
        self.tick
    }

    pub fn heap(&self) -> &BTreeMap<String, Value> {
        &self.heap
    }

    pub fn variable(&self, name: &str) -> Option<&Value> {
        self.heap.get(name)
    }

    pub fn set_variable(&mut self, name: impl Into<String>, value: Value) {
        self.heap.insert(name.into(), value);
    }

    /// Lines written by `print` since the last call.
    pub fn take_output(&mut self) -> Vec<String> {
        std::mem::take(&mut self.output)
    }

    /// Runs until the script yields or falls off its instruction list.
    pub fn run(&mut self, tick: Tick<'_>) -> Result<(), ScriptError> {
        self.tick += 1;
        self.yielded = false;
        self.heap
            .insert("self".to_string(), Value::Sprite(tick.sprite));
        self.heap.insert("map".to_string(), Value::Point(tick.map));
        self.heap
            .insert("delta".to_string(), Value::Decimal(tick.delta));

        let script = Arc::clone(&self.script);
        let mut steps = 0usize;
        while !self.yielded {
            let Some(instruction) = script.instructions.get(self.ip) else {
                break;
            };
            steps += 1;
            if steps > MAX_STEPS_PER_TICK {
                return Err(ScriptError::new(
                    "ENGINE_GUARD_EXCEEDED",
                    format!(
                        "state \"{}\" ran {} instructions without yielding (at {}).",
                        self.state, MAX_STEPS_PER_TICK, self.ip
                    ),
                ));
            }
            let at = self.ip;
            self.ip += 1;
            self.execute(instruction, at, &mut *tick.host, tick.delta)?;
        }
        Ok(())
    }

    /// Switches to `name`, dropping loop bookkeeping. Returns false for
    /// unknown states.
    pub fn go_to_state(&mut self, name: &str) -> bool {
        let Some(start) = self.script.state_start(name) else {
            return false;
        };
        log::debug!("state {} -> {}", self.state, name);
        self.guard_ticks.clear();
        while let Some((at, _)) = self.shadowed.last_key_value() {
            let at = *at;
            self.unshadow(at);
        }
        self.stack.clear();
        self.arguments.clear();
        self.state = name.to_string();
        self.ip = start;
        self.yielded = true;
        true
    }

    fn pop(&mut self) -> Result<Value, ScriptError> {
        self.stack.pop().ok_or_else(|| {
            ScriptError::new(
                "ENGINE_STACK_UNDERFLOW",
                format!("operand stack is empty at instruction {}.", self.ip - 1),
            )
        })
    }

    fn argument(&self, name: &str) -> Value {
        self.arguments.get(name).cloned().unwrap_or(Value::Null)
    }

    fn heap_decimal(&self, name: &str) -> f32 {
        self.heap
            .get(name)
            .and_then(Value::as_decimal)
            .unwrap_or_default()
    }

    fn set_decimal(&mut self, name: &str, value: f32) {
        self.heap.insert(name.to_string(), Value::Decimal(value));
    }

    /// Binds `locals` for the group guarded at `at`, remembering what they
    /// replaced.
    fn shadow(&mut self, at: usize, locals: &[&str]) {
        let saved = locals
            .iter()
            .map(|local| (local.to_string(), self.heap.get(*local).cloned()))
            .collect();
        self.shadowed.insert(at, saved);
    }

    /// Puts back the heap entries the group at `at` hid.
    fn unshadow(&mut self, at: usize) {
        for (name, value) in self.shadowed.remove(&at).unwrap_or_default() {
            match value {
                Some(value) => self.heap.insert(name, value),
                None => self.heap.remove(&name),
            };
        }
    }

    fn in_during(&self) -> bool {
        self.shadowed
            .values()
            .any(|saved| saved.iter().any(|(name, _)| name == "progress"))
    }

    fn self_sprite(&self) -> Option<SpriteRef> {
        match self.heap.get("self") {
            Some(Value::Sprite(sprite)) => Some(*sprite),
            _ => None,
        }
    }
}

impl ExecutionContext {
    /// Dispatches one instruction. `self.ip` already points past it; jumps
    /// overwrite it.
    fn execute(
        &mut self,
        instruction: &Instruction,
        at: usize,
        host: &mut dyn SpriteHost,
        delta: f32,
    ) -> Result<(), ScriptError> {
        match instruction {
            Instruction::PushConstant(value) => self.stack.push(value.clone()),
            Instruction::PushVariable(path) => {
                let value = self.read_variable(path, host);
                self.stack.push(value);
            }
            Instruction::ClearArguments => self.arguments.clear(),
            Instruction::PushArgumentNamed(name) => {
                let value = self.pop()?;
                self.arguments.insert(name.clone(), value);
            }
            Instruction::Assign(path) => {
                let value = self.pop()?;
                self.assign(path, value, host);
            }
            Instruction::BinaryOperator(operator) => {
                let rhs = self.pop()?;
                let lhs = self.pop()?;
                self.stack.push(operator.apply(&lhs, &rhs));
            }
            Instruction::UnaryOperator(operator) => {
                let value = self.pop()?;
                self.stack.push(operator.apply(&value));
            }
            Instruction::GroupGuard { kind, end } => self.guard(*kind, at, *end, host, delta),
            Instruction::GoToGroupStart(start) => self.loop_back(*start),
            Instruction::GoToCurrentState => {
                self.ip = self.script.state_start(&self.state).unwrap_or(0);
                self.yielded = true;
            }
            Instruction::Jump(target) => self.ip = *target,
            Instruction::Invoke(kind) => self.invoke(*kind, host),
            Instruction::Wait => self.yielded = true,
        }
        Ok(())
    }

    fn read_variable(&self, path: &str, host: &dyn SpriteHost) -> Value {
        let segments = split_path(path);
        let Some((root, fields)) = segments.split_first() else {
            return Value::Null;
        };
        match self.heap.get(*root) {
            Some(value) => read_path(value, fields, Some(host)),
            None => {
                log::debug!("reading undefined variable \"{}\"", root);
                Value::Null
            }
        }
    }

    /// Stores `value` at `path`. Bare names land in the heap, sprite fields
    /// go through the host, anything else edits the heap value in place.
    fn assign(&mut self, path: &str, value: Value, host: &mut dyn SpriteHost) {
        let segments = parse_ref_path(path);
        let Some((root, fields)) = segments.split_first() else {
            return;
        };
        if fields.is_empty() {
            self.heap.insert(root.clone(), value);
            return;
        }
        let result = match self.heap.get_mut(root) {
            Some(Value::Sprite(sprite)) => assign_sprite_path(host, *sprite, fields, value),
            Some(target) => assign_nested_path(target, fields, value),
            None => Err(format!("\"{}\" is not defined", root)),
        };
        if let Err(message) = result {
            log::warn!("cannot assign {}: {}", path, message);
        }
    }
}

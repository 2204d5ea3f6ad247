impl ExecutionContext {
    /// Group guard at `at`. A loop guard without a `guard_ticks` entry is
    /// entered fresh; the entry goes away when the loop finishes.
    fn guard(&mut self, kind: GroupKind, at: usize, end: usize, host: &mut dyn SpriteHost, delta: f32) {
        let fresh = !self.guard_ticks.contains_key(&at);
        match kind {
            GroupKind::If | GroupKind::Else => {
                if !self.argument("condition").is_truthy() {
                    self.ip = end;
                }
            }
            GroupKind::While => {
                if self.argument("condition").is_truthy() {
                    self.guard_ticks.insert(at, self.tick);
                } else {
                    self.finish_loop(at, end);
                }
            }
            GroupKind::During => self.during(at, end, fresh, delta),
            GroupKind::Jump => self.jump(at, end, fresh, host, delta),
        }
    }

    /// Back edge of a loop. A body that already ran this tick waits for the
    /// next one before its guard is evaluated again.
    fn loop_back(&mut self, start: usize) {
        let guard = self.script.instructions[start.min(self.script.instructions.len())..]
            .iter()
            .position(|instruction| matches!(instruction, Instruction::GroupGuard { .. }))
            .map(|offset| start + offset);
        self.ip = start;
        if let Some(guard) = guard {
            if self.guard_ticks.get(&guard) == Some(&self.tick) {
                self.yielded = true;
            }
        }
    }

    fn finish_loop(&mut self, at: usize, end: usize) {
        self.unshadow(at);
        self.guard_ticks.remove(&at);
        self.ip = end;
    }

    /// Each `during` binds its own `time`/`progress`/`duration`; an inner
    /// group hides the outer ones until it finishes.
    fn during(&mut self, at: usize, end: usize, fresh: bool, delta: f32) {
        if fresh {
            let duration = self.argument("duration").as_decimal().unwrap_or_default();
            self.shadow(at, &DURING_LOCALS);
            self.set_decimal("time", 0.0);
            self.set_decimal("duration", duration);
            self.set_decimal("progress", if duration > 0.0 { 0.0 } else { 1.0 });
            self.guard_ticks.insert(at, self.tick);
            return;
        }

        let time = self.heap_decimal("time");
        let duration = self.heap_decimal("duration");
        if time >= duration {
            self.finish_loop(at, end);
            return;
        }
        let time = (time + delta).min(duration);
        let linear = if duration > 0.0 { time / duration } else { 1.0 };
        let progress = if self.argument("ease").is_truthy() {
            linear * linear * (3.0 - 2.0 * linear)
        } else {
            linear
        };
        self.set_decimal("time", time);
        self.set_decimal("progress", progress);
        self.guard_ticks.insert(at, self.tick);
    }

    /// Integrates the jump on every tick the guard runs, the entry tick
    /// included.
    fn jump(&mut self, at: usize, end: usize, fresh: bool, host: &mut dyn SpriteHost, delta: f32) {
        let Some(sprite) = self.self_sprite() else {
            self.finish_loop(at, end);
            return;
        };
        let Some(center) = host.center(sprite) else {
            self.finish_loop(at, end);
            return;
        };

        if fresh {
            let height = self.argument("height").as_decimal().unwrap_or_default().max(0.0);
            self.shadow(at, &JUMP_LOCALS);
            self.set_decimal("jumpTime", 0.0);
            self.set_decimal("jumpOrigin", center.y);
            self.set_decimal("jumpVelocity", (2.0 * GRAVITY * height).sqrt());
        }

        let origin = self.heap_decimal("jumpOrigin");
        let velocity = self.heap_decimal("jumpVelocity");
        let time = self.heap_decimal("jumpTime") + delta;
        let displacement = velocity * time - GRAVITY * time * time / 2.0;
        if displacement <= 0.0 && time > 0.0 {
            host.set_center(sprite, Point::new(center.x, origin));
            self.finish_loop(at, end);
            return;
        }
        host.set_center(sprite, Point::new(center.x, origin - displacement.max(0.0)));
        self.set_decimal("jumpTime", time);
        self.guard_ticks.insert(at, self.tick);
    }
}

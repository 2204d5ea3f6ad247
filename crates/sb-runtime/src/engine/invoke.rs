impl ExecutionContext {
    fn invoke(&mut self, kind: InstructionKind, host: &mut dyn SpriteHost) {
        match kind {
            InstructionKind::Wait => self.yielded = true,
            InstructionKind::Stride => self.stride(host),
            InstructionKind::Move => {
                let Some(sprite) = self.self_sprite() else {
                    return;
                };
                let Some(by) = self.argument("by").as_point() else {
                    log::warn!("move needs a point or direction, got {}", self.argument("by"));
                    return;
                };
                if let Some(center) = host.center(sprite) {
                    host.set_center(sprite, Point::new(center.x + by.x, center.y + by.y));
                }
            }
            InstructionKind::GoTo => {
                let target = self.argument("to");
                match target.as_string() {
                    Some(name) => {
                        if !self.go_to_state(name) {
                            log::warn!("go to unknown state \"{}\"", name);
                        }
                    }
                    None => log::warn!("go needs a state name, got {}", target),
                }
            }
            InstructionKind::Spawn => {
                let Some(definition) = SpriteDefinition::from_value(&self.argument("definition"))
                else {
                    log::warn!("spawn needs a sprite definition, got {}", self.argument("definition"));
                    return;
                };
                let animation = self.argument("animation");
                let at = self.argument("at").as_point();
                match host.spawn(&definition, animation.as_string(), at) {
                    Some(sprite) => log::debug!("spawned sprite#{} from {:?}", sprite.0, definition),
                    None => log::warn!("host could not spawn {:?}", definition),
                }
            }
            InstructionKind::Remove => {
                let sprite = match self.argument("value") {
                    Value::Sprite(sprite) => Some(sprite),
                    _ => self.self_sprite(),
                };
                if let Some(sprite) = sprite {
                    host.remove(sprite);
                }
            }
            InstructionKind::Print => {
                let line = self.argument("value").to_string();
                log::info!("{}", line);
                self.output.push(line);
            }
        }
    }

    /// Interpolates `target` between `from` and `to` by the heap `progress`.
    /// Outside of a `during` the target jumps straight to `to`.
    fn stride(&mut self, host: &mut dyn SpriteHost) {
        let target = self.argument("target");
        let Some(path) = target.as_string().map(str::to_string) else {
            log::warn!("stride target must be a path, got {}", target);
            return;
        };
        let from = match self.argument("from") {
            Value::Null => self.read_variable(&path, host),
            value => value,
        };
        let to = self.argument("to");
        let progress = if self.in_during() {
            self.heap
                .get("progress")
                .and_then(Value::as_decimal)
                .unwrap_or(1.0)
        } else {
            1.0
        };

        let value = match (&from, &to) {
            (Value::Point(_), _) | (_, Value::Point(_)) => {
                match (as_stride_point(&from), as_stride_point(&to)) {
                    (Some(from), Some(to)) => Value::Point(from.lerp(to, progress)),
                    _ => Value::Null,
                }
            }
            _ => match (from.as_decimal(), to.as_decimal()) {
                (Some(from), Some(to)) => Value::Decimal(from + (to - from) * progress),
                _ => Value::Null,
            },
        };
        if value.is_null() {
            log::warn!("stride of {} cannot interpolate {} to {}", path, from, to);
            return;
        }
        self.assign(&path, value, host);
    }
}

fn as_stride_point(value: &Value) -> Option<Point> {
    match value {
        Value::Point(point) => Some(*point),
        scalar => scalar.as_decimal().map(|s| Point::new(s, s)),
    }
}

/// Writes a sprite pseudo-property through the host.
fn assign_sprite_path(
    host: &mut dyn SpriteHost,
    sprite: SpriteRef,
    fields: &[String],
    value: Value,
) -> Result<(), String> {
    let fields: Vec<&str> = fields.iter().map(String::as_str).collect();
    match fields.as_slice() {
        ["center"] => {
            let center = value
                .as_point()
                .ok_or_else(|| format!("center must be a point, got {}", value.type_name()))?;
            host.set_center(sprite, center);
        }
        ["center", axis] => {
            let mut center = Value::Point(host.center(sprite).ok_or("sprite is gone")?);
            assign_nested_path(&mut center, &[axis.to_string()], value)?;
            if let Some(center) = center.as_point() {
                host.set_center(sprite, center);
            }
        }
        ["direction"] => match value {
            Value::Direction(direction) => host.set_direction(sprite, direction),
            other => return Err(format!("direction must be a direction, got {}", other.type_name())),
        },
        ["animation"] | ["animation", "name"] => {
            let name = value
                .as_string()
                .ok_or_else(|| format!("animation must be a name, got {}", value.type_name()))?;
            host.set_animation(sprite, name);
        }
        ["animation", field @ ("speed" | "duration")] => {
            let amount = value
                .as_decimal()
                .ok_or_else(|| format!("animation {} must be a number", field))?;
            if *field == "speed" {
                host.set_animation_speed(sprite, amount);
            } else {
                host.set_animation_duration(sprite, amount);
            }
        }
        _ => return Err(format!("\"{}\" is not writable", fields.join("."))),
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sprites::{SpriteRecord, SpriteTable};
    use sb_core::Direction;
    use sb_compiler::{compile_source, CompileOptions};

    struct World {
        table: SpriteTable,
        hero: SpriteRef,
        context: ExecutionContext,
    }

    impl World {
        fn new(source: &str, reduce: bool) -> Self {
            let script = compile_source(source, &CompileOptions { reduce }).expect("compile");
            let mut table = SpriteTable::new();
            let hero = table.insert(SpriteRecord::default());
            Self {
                table,
                hero,
                context: ExecutionContext::new(Arc::new(script)),
            }
        }

        fn tick(&mut self, delta: f32) {
            self.context
                .run(Tick {
                    sprite: self.hero,
                    map: Point::new(640.0, 480.0),
                    delta,
                    host: &mut self.table,
                })
                .expect("run");
        }

        fn hero(&self) -> &SpriteRecord {
            self.table.get(self.hero).expect("hero is alive")
        }

        fn heap(&self, name: &str) -> Option<&Value> {
            self.context.variable(name)
        }
    }

    fn raw_script(instructions: Vec<Instruction>) -> Arc<Script> {
        Arc::new(Script {
            states: BTreeMap::from([("main".to_string(), 0)]),
            initial_state: "main".to_string(),
            instructions,
        })
    }

    const MAIN: &str = "\
state main:
    set self.animation = stand
    during 2s:
        wait
    set self.animation = walk
    during 500ms:
        wait
";

    #[test]
    fn main_state_yields_through_during_ticks() {
        let mut world = World::new(MAIN, true);

        world.tick(0.0);
        assert_eq!(world.hero().animation.name, "stand");
        assert_eq!(world.heap("duration"), Some(&Value::Decimal(2.0)));
        assert_eq!(world.heap("progress"), Some(&Value::Decimal(0.0)));
        assert_eq!(world.heap("time"), Some(&Value::Decimal(0.0)));

        world.tick(2.0);
        assert_eq!(world.heap("progress"), Some(&Value::Decimal(1.0)));
        assert_eq!(world.heap("time"), Some(&Value::Decimal(2.0)));
        assert_eq!(world.hero().animation.name, "stand");

        world.tick(0.1);
        assert_eq!(world.hero().animation.name, "walk");
        assert_eq!(world.heap("duration"), Some(&Value::Decimal(0.5)));
        assert_eq!(world.context.state(), "main");
    }

    #[test]
    fn while_body_runs_once_per_tick() {
        let mut world = World::new(
            "state main:\n    set n = 0\n    while n < 3:\n        set n = n + 1\n    print \"done\"\n",
            true,
        );
        for expected in 1..=3 {
            world.tick(0.016);
            assert_eq!(world.heap("n"), Some(&Value::Integer(expected)));
        }
        assert!(world.context.take_output().is_empty());
        world.tick(0.016);
        assert_eq!(world.context.take_output(), vec!["done".to_string()]);
    }

    #[test]
    fn jump_integrates_gravity_and_lands_on_origin() {
        let mut world = World::new("state main:\n    jump 80:\n        wait\n    print \"landed\"\n", true);
        world
            .table
            .set_center(world.hero, Point::new(5.0, 100.0));

        world.tick(0.0);
        assert_eq!(world.heap("jumpVelocity"), Some(&Value::Decimal(400.0)));
        assert_eq!(world.hero().center, Point::new(5.0, 100.0));

        world.tick(0.1);
        let y = world.hero().center.y;
        assert!((y - 65.0).abs() < 1e-3, "y was {}", y);

        world.tick(1.0);
        assert_eq!(world.hero().center, Point::new(5.0, 100.0));
        assert_eq!(world.heap("jumpVelocity"), None);
        assert_eq!(world.context.take_output(), vec!["landed".to_string()]);
    }

    #[test]
    fn jump_moves_on_its_entry_tick() {
        let mut world = World::new("state main:\n    jump 80:\n        wait\n", true);
        world
            .table
            .set_center(world.hero, Point::new(5.0, 100.0));
        world.tick(0.1);
        let y = world.hero().center.y;
        assert!((y - 65.0).abs() < 1e-3, "y was {}", y);
        assert_eq!(world.heap("jumpOrigin"), Some(&Value::Decimal(100.0)));
    }

    #[test]
    fn stride_eases_between_constant_and_hoisted_bounds() {
        let mut world = World::new(
            "state main:\n    during 1s:\n        stride self.center.x from 0 to 100\n    wait\n",
            true,
        );
        world.tick(0.0);
        assert_eq!(world.hero().center.x, 0.0);
        world.tick(0.5);
        assert_eq!(world.hero().center.x, 50.0);
        world.tick(0.5);
        assert_eq!(world.hero().center.x, 100.0);

        let mut world = World::new(
            "state main:\n    during 1s:\n        stride self.center to (10, 0)\n    wait\n",
            true,
        );
        world.tick(0.0);
        world.tick(0.5);
        assert_eq!(world.hero().center, Point::new(5.0, 0.0));
        assert_eq!(world.heap("strideFrom0"), Some(&Value::Point(Point::ZERO)));
        world.tick(0.5);
        assert_eq!(world.hero().center, Point::new(10.0, 0.0));
    }

    #[test]
    fn eased_during_follows_smoothstep() {
        let mut world = World::new("state main:\n    during 2s ease true:\n        wait\n", true);
        world.tick(0.0);
        world.tick(0.5);
        assert_eq!(world.heap("progress"), Some(&Value::Decimal(0.15625)));
    }

    #[test]
    fn nested_during_keeps_the_outer_clock() {
        let mut world = World::new(
            "state main:\n    during 5s:\n        during 1s:\n            wait\n        print progress\n        wait\n    print \"done\"\n",
            true,
        );
        world.tick(1.0);
        assert_eq!(world.heap("duration"), Some(&Value::Decimal(1.0)));
        world.tick(1.0);
        world.tick(1.0);
        assert_eq!(world.context.take_output(), vec!["0".to_string()]);
        assert_eq!(world.heap("duration"), Some(&Value::Decimal(5.0)));
        assert_eq!(world.heap("time"), Some(&Value::Decimal(0.0)));

        let mut printed = Vec::new();
        for _ in 3..18 {
            world.tick(1.0);
            printed.extend(world.context.take_output());
        }
        assert_eq!(printed, vec!["0.2", "0.4", "0.6", "0.8", "1"]);
        world.tick(1.0);
        assert_eq!(world.context.take_output(), vec!["done".to_string()]);
        assert_eq!(world.heap("time"), None);
    }

    #[test]
    fn jump_inside_during_leaves_the_during_locals() {
        let mut world = World::new(
            "state main:\n    during 2s:\n        jump 31.25:\n            wait\n        print \"landed \" + time\n        wait\n",
            true,
        );
        world.tick(0.25);
        assert_eq!(world.hero().center, Point::new(0.0, -31.25));

        world.tick(0.25);
        assert_eq!(world.hero().center, Point::ZERO);
        assert_eq!(world.context.take_output(), vec!["landed 0".to_string()]);
        assert_eq!(world.heap("jumpTime"), None);
        assert_eq!(world.heap("duration"), Some(&Value::Decimal(2.0)));
        assert_eq!(world.heap("progress"), Some(&Value::Decimal(0.0)));
    }

    #[test]
    fn group_local_names_are_plain_variables_outside_groups() {
        let mut world = World::new(
            "state main:\n    set time = self.center + (3, 4)\n    set progress = self.center.x + 0.5\n    stride self.center.x from 0 to 10\n    during 1s:\n        wait\n    go to other\nstate other:\n    wait\n",
            false,
        );
        world.tick(0.0);
        assert_eq!(world.hero().center.x, 10.0);
        assert_eq!(world.heap("time"), Some(&Value::Decimal(0.0)));

        world.tick(1.0);
        world.tick(1.0);
        assert_eq!(world.context.state(), "other");
        assert_eq!(world.heap("time"), Some(&Value::Point(Point::new(3.0, 4.0))));
        assert_eq!(world.heap("progress"), Some(&Value::Decimal(0.5)));
        assert_eq!(world.heap("duration"), None);

        let mut world = World::new(
            "state main:\n    set time = self.center + (3, 4)\n    during 5s:\n        go to other\nstate other:\n    wait\n",
            false,
        );
        world.tick(0.0);
        assert_eq!(world.context.state(), "other");
        assert_eq!(world.heap("time"), Some(&Value::Point(Point::new(3.0, 4.0))));
        assert_eq!(world.heap("progress"), None);
    }

    #[test]
    fn go_to_switches_state_and_clears_loop_bookkeeping() {
        let mut world = World::new(
            "state main:\n    during 5s:\n        if time > 1:\n            go to idle\n        wait\nstate idle:\n    print \"idle\"\n",
            true,
        );
        world.tick(0.0);
        world.tick(2.0);
        assert_eq!(world.context.state(), "idle");
        assert_eq!(world.heap("time"), None);
        assert!(world.context.take_output().is_empty());

        world.tick(0.0);
        assert_eq!(world.context.take_output(), vec!["idle".to_string()]);
        assert!(world.context.go_to_state("main"));
        assert!(!world.context.go_to_state("nowhere"));
    }

    #[test]
    fn assignments_edit_nested_fields_and_sprite_properties() {
        let mut world = World::new(
            "state main:\n    set spot = (1, 2)\n    set spot.x = 5\n    set self.center.y = 7\n    set self.direction = up\n    set self.animation.speed = 2\n    set self.direction = 3\n    set spot.z = 1\n",
            false,
        );
        world.tick(0.0);
        assert_eq!(world.heap("spot"), Some(&Value::Point(Point::new(5.0, 2.0))));
        assert_eq!(world.hero().center, Point::new(0.0, 7.0));
        assert_eq!(world.hero().direction, Direction::Up);
        assert_eq!(world.hero().animation.speed, 2.0);
    }

    #[test]
    fn move_spawn_and_remove_go_through_the_host() {
        let mut world = World::new(
            "state main:\n    move by down * 3\n    spawn \"bullet\" animation fly at self.center + (0, -10)\n    wait\n    remove\n",
            true,
        );
        world.tick(0.0);
        assert_eq!(world.hero().center, Point::new(0.0, 3.0));
        let (bullet, record) = world
            .table
            .iter()
            .find(|(sprite, _)| *sprite != world.hero)
            .expect("bullet spawned");
        assert_eq!(record.center, Point::new(0.0, -7.0));
        assert_eq!(record.animation.name, "fly");

        world.tick(0.0);
        assert_eq!(world.table.removed(), &[world.hero]);
        assert!(world.table.get(bullet).is_some());
    }

    #[test]
    fn reduced_and_plain_scripts_behave_alike() {
        let source = "\
state main:
    set speed = 4
    set step = right * speed
    during 1s:
        stride self.center.y from 0 to speed * 10
        move by step
    go to back

state back:
    move by -(2, 1) * speed
    wait
";
        let mut reduced = World::new(source, true);
        let mut plain = World::new(source, false);
        for delta in [0.0, 0.25, 0.5, 0.25, 0.25, 0.1, 0.1] {
            reduced.tick(delta);
            plain.tick(delta);
            assert_eq!(reduced.hero(), plain.hero());
            assert_eq!(reduced.context.state(), plain.context.state());
        }
        assert_eq!(reduced.context.state(), "back");
    }

    #[test]
    fn runaway_script_hits_the_step_guard() {
        let mut context = ExecutionContext::new(raw_script(vec![Instruction::Jump(0)]));
        let mut table = SpriteTable::new();
        let hero = table.insert(SpriteRecord::default());
        let error = context
            .run(Tick {
                sprite: hero,
                map: Point::ZERO,
                delta: 0.0,
                host: &mut table,
            })
            .expect_err("never yields");
        assert_eq!(error.code, "ENGINE_GUARD_EXCEEDED");
    }

    #[test]
    fn popping_an_empty_stack_fails() {
        let mut context = ExecutionContext::new(raw_script(vec![Instruction::Assign("x".to_string())]));
        let mut table = SpriteTable::new();
        let hero = table.insert(SpriteRecord::default());
        let error = context
            .run(Tick {
                sprite: hero,
                map: Point::ZERO,
                delta: 0.0,
                host: &mut table,
            })
            .expect_err("nothing to assign");
        assert_eq!(error.code, "ENGINE_STACK_UNDERFLOW");
    }

    #[test]
    fn nested_path_assignment_rebuilds_values() {
        let mut spot = Value::Point(Point::new(1.0, 2.0));
        assign_nested_path(&mut spot, &parse_ref_path("y"), Value::Integer(4)).expect("assign");
        assert_eq!(spot, Value::Point(Point::new(1.0, 4.0)));

        let error = assign_nested_path(&mut spot, &parse_ref_path("x.y"), Value::Integer(1))
            .expect_err("decimals have no fields");
        assert!(error.contains("missing field"));
        let error = assign_nested_path(&mut spot, &parse_ref_path("z"), Value::Integer(1))
            .expect_err("points have no z");
        assert!(error.contains("cannot set"));
    }
}

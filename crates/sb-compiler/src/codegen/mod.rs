//! C translation of behavior scripts.
//!
//! Each state becomes a chain of part functions. A part runs until it has to
//! wait for the next frame, stores the function to resume with in
//! `script->update` and returns. Loops (`during`, `while`, `jump`) get a part
//! of their own that re-runs its guard on every frame; statements following a
//! loop or a `wait` continue in a new part.

mod expr;
mod names;

use sb_core::{GroupKind, InstructionKind, Node, ValueKind, TARGET_ARGUMENT};

use crate::symbols::{SymbolTable, DURING_LOCALS, JUMP_LOCALS};
use expr::{Expr, Place, Scope};
use names::{c_type, identifier, pascal_case};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CodegenOptions {
    /// Base name of the generated files and C symbols.
    pub script_name: String,
    pub reduce: bool,
}

impl Default for CodegenOptions {
    fn default() -> Self {
        Self {
            script_name: "behavior".to_string(),
            reduce: true,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneratedCode {
    /// Sanitized script name; the body includes `{file_stem}.h`.
    pub file_stem: String,
    pub header: String,
    pub body: String,
}

const PARAMETERS: &str = "script, self, map, delta";

/// Generates the header and body for analyzed `nodes`.
pub fn generate(nodes: &[Node], symbols: &SymbolTable, script_name: &str) -> GeneratedCode {
    let mut generator = Generator {
        scope: Scope::new(symbols, pascal_case(script_name)),
        prefix: identifier(script_name),
        state: String::new(),
        states: Vec::new(),
        parts: Vec::new(),
        functions: Vec::new(),
        groups: 0,
        locals: Vec::new(),
    };
    for node in nodes {
        match node {
            Node::State { name, children } => generator.state(name, children),
            other => log::warn!("skipping top-level node outside of a state: {:?}", other),
        }
    }
    GeneratedCode {
        header: generator.header(),
        body: generator.body(),
        file_stem: generator.prefix,
    }
}

struct Part {
    name: String,
    lines: Vec<String>,
    depth: usize,
}

/// Where control goes once a statement list is done.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Next {
    /// Keep running in the enclosing code.
    Fallthrough,
    /// Continue with a part in the same frame.
    Call(usize),
    /// Continue with a part on the next frame.
    Resume(usize),
}

struct Generator<'a> {
    scope: Scope<'a>,
    prefix: String,
    state: String,
    /// Declared states with their entry part.
    states: Vec<(String, String)>,
    parts: Vec<Part>,
    functions: Vec<Part>,
    /// `during`/`jump` groups seen so far; numbers their members.
    groups: usize,
    /// Struct members holding group temporaries.
    locals: Vec<String>,
}

impl Generator<'_> {
    fn state(&mut self, name: &str, children: &[Node]) {
        if self.states.iter().any(|(state, _)| state == name) {
            log::warn!("state '{}' is declared twice; keeping the first", name);
            return;
        }
        self.state = identifier(name);
        let entry = self.new_part();
        self.statements(entry, children, Next::Resume(entry));
        self.states
            .push((name.to_string(), self.parts[entry].name.clone()));
        self.functions.append(&mut self.parts);
    }

    fn new_part(&mut self) -> usize {
        let index = self.parts.len();
        self.parts.push(Part {
            name: format!("{}_{}_part{}", self.prefix, self.state, index),
            lines: Vec::new(),
            depth: 1,
        });
        index
    }

    fn line(&mut self, part: usize, text: impl AsRef<str>) {
        let part = &mut self.parts[part];
        part.lines
            .push(format!("{}{}", "    ".repeat(part.depth), text.as_ref()));
    }

    fn open(&mut self, part: usize, text: impl AsRef<str>) {
        self.line(part, text);
        self.parts[part].depth += 1;
    }

    fn close(&mut self, part: usize, text: impl AsRef<str>) {
        let depth = &mut self.parts[part].depth;
        *depth = depth.saturating_sub(1);
        self.line(part, text);
    }

    fn next(&mut self, part: usize, next: Next) {
        match next {
            Next::Fallthrough => {}
            Next::Call(target) => {
                let name = self.parts[target].name.clone();
                self.line(part, format!("script->update = {};", name));
                self.line(part, format!("{}({});", name, PARAMETERS));
                self.line(part, "return;");
            }
            Next::Resume(target) => {
                let name = self.parts[target].name.clone();
                self.line(part, format!("script->update = {};", name));
                self.line(part, "return;");
            }
        }
    }

    /// Part running `rest` before `next`, or `next` itself when nothing is
    /// left.
    fn continuation(&mut self, rest: &[Node], next: Next) -> Next {
        if rest.is_empty() {
            return next;
        }
        let part = self.new_part();
        self.statements(part, rest, next);
        Next::Call(part)
    }

    fn statements(&mut self, part: usize, nodes: &[Node], next: Next) {
        let mut index = 0;
        while index < nodes.len() {
            let node = &nodes[index];
            index += 1;
            match node {
                Node::Group {
                    name,
                    children: body,
                    ..
                } => match GroupKind::from_name(name) {
                    Some(GroupKind::If) => {
                        let otherwise: &[Node] = match nodes.get(index) {
                            Some(Node::Group {
                                name,
                                children: else_body,
                                ..
                            }) if GroupKind::from_name(name) == Some(GroupKind::Else) => {
                                index += 1;
                                else_body.as_slice()
                            }
                            _ => &[],
                        };
                        let condition = self.argument(node, "condition", "false");
                        if splits(body) || splits(otherwise) {
                            let after = self.continuation(&nodes[index..], next);
                            self.open(part, format!("if ({}) {{", condition.code));
                            self.statements(part, body, after);
                            self.close(part, "} else {");
                            self.parts[part].depth += 1;
                            self.statements(part, otherwise, after);
                            self.close(part, "}");
                            return;
                        }
                        self.open(part, format!("if ({}) {{", condition.code));
                        self.statements(part, body, Next::Fallthrough);
                        if !otherwise.is_empty() {
                            self.close(part, "} else {");
                            self.parts[part].depth += 1;
                            self.statements(part, otherwise, Next::Fallthrough);
                        }
                        self.close(part, "}");
                    }
                    Some(GroupKind::Else) => {
                        log::warn!("skipping 'else' without a preceding 'if'");
                    }
                    Some(kind) => {
                        let looped = self.new_part();
                        let after = self.continuation(&nodes[index..], next);
                        self.line(part, "script->fresh = true;");
                        self.next(part, Next::Call(looped));
                        self.looping(looped, kind, node, body, after);
                        return;
                    }
                    None => self.unsupported(part, "group", name),
                },
                Node::Instruction { name, .. } => match InstructionKind::from_name(name) {
                    Some(InstructionKind::Wait) => {
                        let after = self.continuation(&nodes[index..], next);
                        match after {
                            Next::Call(target) | Next::Resume(target) => {
                                self.next(part, Next::Resume(target))
                            }
                            Next::Fallthrough => self.line(part, "return;"),
                        }
                        return;
                    }
                    Some(InstructionKind::GoTo) => {
                        let target = self.argument(node, "to", "0");
                        self.line(
                            part,
                            format!(
                                "{}_go_to_state(script, self, map, {});",
                                self.prefix, target.code
                            ),
                        );
                        self.line(part, "return;");
                        return;
                    }
                    Some(kind) => self.instruction(part, kind, node),
                    None => self.unsupported(part, "instruction", name),
                },
                Node::Assignment { path, value } => self.assignment(part, path, value),
                other => {
                    log::warn!("skipping unexpected statement {:?}", other);
                }
            }
        }
        self.next(part, next);
    }

    /// Binds the temporaries of a new group to members of their own.
    fn bind_locals(&mut self, names: &[&'static str]) {
        if names.is_empty() {
            return;
        }
        let index = self.groups;
        self.groups += 1;
        for name in names {
            let member = format!("{}{}", name, index);
            self.locals.push(member.clone());
            self.scope.locals.push((*name, member));
        }
    }

    fn member(&self, local: &str) -> String {
        format!("script->{}", self.scope.local(local).unwrap_or(local))
    }

    fn looping(&mut self, part: usize, kind: GroupKind, group: &Node, body: &[Node], after: Next) {
        let bound = self.scope.locals.len();
        match kind {
            GroupKind::During => {
                let duration = self.argument(group, "duration", "0.0f");
                let eased = match group.argument_value("ease") {
                    None => "linear".to_string(),
                    Some(Node::Constant { value }) if value.is_truthy() => smoothstep("linear"),
                    Some(Node::Constant { .. }) => "linear".to_string(),
                    Some(ease) => format!(
                        "({}) ? {} : linear",
                        self.scope.expression(ease).code,
                        smoothstep("linear")
                    ),
                };
                self.bind_locals(&DURING_LOCALS);
                let (time, span, progress) = (
                    self.member("time"),
                    self.member("duration"),
                    self.member("progress"),
                );
                self.open(part, "if (script->fresh) {");
                self.line(part, "script->fresh = false;");
                self.line(part, format!("{} = 0.0f;", time));
                self.line(part, format!("{} = {};", span, duration.code));
                self.line(part, format!("{} = {} > 0.0f ? 0.0f : 1.0f;", progress, span));
                self.close(part, format!("}} else if ({} >= {}) {{", time, span));
                self.parts[part].depth += 1;
                self.finish(part, after);
                self.close(part, "} else {");
                self.parts[part].depth += 1;
                self.line(part, format!("{0} = fminf({0} + delta, {1});", time, span));
                self.line(part, format!("float linear = {} / {};", time, span));
                self.line(part, format!("{} = {};", progress, eased));
                self.close(part, "}");
            }
            GroupKind::While => {
                let condition = self.argument(group, "condition", "false");
                self.line(part, "script->fresh = false;");
                self.open(part, format!("if (!({})) {{", condition.code));
                self.finish(part, after);
                self.close(part, "}");
            }
            GroupKind::Jump => {
                let height = self.argument(group, "height", "0.0f");
                self.bind_locals(&JUMP_LOCALS);
                let (time, origin, velocity) = (
                    self.member("jumpTime"),
                    self.member("jumpOrigin"),
                    self.member("jumpVelocity"),
                );
                self.open(part, "if (script->fresh) {");
                self.line(part, "script->fresh = false;");
                self.line(part, format!("{} = 0.0f;", time));
                self.line(part, format!("{} = self->frame.origin.y;", origin));
                self.line(
                    part,
                    format!("{} = sqrtf(2.0f * GRAVITY * {});", velocity, height.code),
                );
                self.close(part, "}");
                self.line(part, format!("{} += delta;", time));
                self.line(
                    part,
                    format!(
                        "float displacement = {1} * {0} - GRAVITY * {0} * {0} / 2.0f;",
                        time, velocity
                    ),
                );
                self.open(part, format!("if (displacement <= 0.0f && {} > 0.0f) {{", time));
                self.line(part, format!("self->frame.origin.y = {};", origin));
                self.finish(part, after);
                self.close(part, "}");
                self.line(
                    part,
                    format!("self->frame.origin.y = {} - fmaxf(displacement, 0.0f);", origin),
                );
            }
            GroupKind::If | GroupKind::Else => {}
        }
        self.statements(part, body, Next::Resume(part));
        self.scope.locals.truncate(bound);
    }

    /// Leaves a finished loop.
    fn finish(&mut self, part: usize, after: Next) {
        match after {
            Next::Fallthrough => self.line(part, "return;"),
            next => self.next(part, next),
        }
    }

    fn argument(&self, node: &Node, name: &str, fallback: &str) -> Expr {
        match node.argument_value(name) {
            Some(value) => self.scope.expression(value),
            None => Expr {
                code: fallback.to_string(),
                kind: None,
            },
        }
    }

    fn assignment(&mut self, part: usize, path: &str, value: &Node) {
        let value = self.scope.expression(value);
        match self.scope.place(path) {
            Place::Field { code, .. } => self.line(part, format!("{} = {};", code, value.code)),
            Place::Animation(sprite) => self.line(
                part,
                format!("sprite_set_animation({}, {});", sprite, value.code),
            ),
            Place::Constant => log::debug!("'{}' is inlined, assignment dropped", path),
            Place::Unsupported => self.unsupported(part, "assignment to", path),
        }
    }

    fn instruction(&mut self, part: usize, kind: InstructionKind, node: &Node) {
        match kind {
            InstructionKind::Stride => self.stride(part, node),
            InstructionKind::Move => {
                let Some(by) = node.argument_value("by") else {
                    return self.unsupported(part, "move without", "by");
                };
                let by = self.scope.expression(by);
                let helper = match by.kind {
                    Some(ValueKind::Direction) => "point_add_direction",
                    _ => "point_add",
                };
                self.line(
                    part,
                    format!(
                        "self->frame.origin = {}(self->frame.origin, {});",
                        helper, by.code
                    ),
                );
            }
            InstructionKind::Spawn => {
                let definition = self.argument(node, "definition", "0");
                let animation = self.argument(node, "animation", "NULL");
                let at = self.argument(node, "at", "self->frame.origin");
                self.line(
                    part,
                    format!(
                        "sprite_spawn(map, {}, {}, {});",
                        definition.code, animation.code, at.code
                    ),
                );
            }
            InstructionKind::Remove => {
                let sprite = self.argument(node, "value", "self");
                self.line(part, format!("sprite_remove({});", sprite.code));
            }
            InstructionKind::Print => {
                let value = self.argument(node, "value", "\"\"");
                self.line(part, print_statement(&value));
            }
            InstructionKind::Wait | InstructionKind::GoTo => {}
        }
    }

    fn stride(&mut self, part: usize, node: &Node) {
        let Some(Node::Variable { path }) = node.argument_value(TARGET_ARGUMENT) else {
            return self.unsupported(part, "stride without", "target");
        };
        let Some(to) = node.argument_value("to") else {
            return self.unsupported(part, "stride without", "to");
        };
        let from = match node.argument_value("from") {
            Some(from) => self.scope.expression(from),
            None => self.scope.expression(&Node::variable(path.clone())),
        };
        let to = self.scope.expression(to);
        let progress = match self.scope.local("progress") {
            Some(member) => format!("script->{}", member),
            None => "1.0f".to_string(),
        };
        match self.scope.place(path) {
            Place::Field {
                code,
                kind: ValueKind::Point,
            } => self.line(
                part,
                format!(
                    "{} = point_lerp({}, {}, {});",
                    code,
                    as_point(&from),
                    as_point(&to),
                    progress
                ),
            ),
            Place::Field { code, .. } => self.line(
                part,
                format!(
                    "{} = {} + ({} - {}) * {};",
                    code, from.code, to.code, from.code, progress
                ),
            ),
            _ => self.unsupported(part, "stride of", path),
        }
    }

    fn unsupported(&mut self, part: usize, what: &str, name: &str) {
        log::warn!("no C translation for {} '{}'", what, name);
        self.line(part, format!("/* unsupported {} {} */", what, name));
    }

    fn header(&self) -> String {
        let type_name = &self.scope.type_name;
        let state_type = self.scope.state_type();
        let guard = format!("{}_H", self.prefix.to_uppercase());
        let mut out = String::new();
        out.push_str(&format!("#ifndef {}\n#define {}\n\n", guard, guard));
        out.push_str("#include <stdbool.h>\n#include \"sprite.h\"\n\n");

        out.push_str("typedef enum {\n");
        if self.states.is_empty() {
            out.push_str(&format!("    {}None,\n", state_type));
        }
        for (state, _) in &self.states {
            out.push_str(&format!("    {},\n", self.scope.state_constant(state)));
        }
        out.push_str(&format!("}} {};\n\n", state_type));

        out.push_str(&format!("typedef struct {} {};\n", type_name, type_name));
        out.push_str(&format!(
            "typedef void (*{}Update)({} *script, Sprite *self, Map *map, float delta);\n\n",
            type_name, type_name
        ));
        out.push_str(&format!("struct {} {{\n", type_name));
        out.push_str(&format!("    {} state;\n", state_type));
        out.push_str(&format!("    {}Update update;\n", type_name));
        out.push_str("    bool fresh;\n");
        for local in &self.locals {
            out.push_str(&format!("    float {};\n", local));
        }
        for (member, kind) in self.scope.members.values() {
            out.push_str(&format!("    {} {};\n", c_type(*kind, &state_type), member));
        }
        out.push_str("};\n\n");

        out.push_str(&format!(
            "void {}_init({} *script, Sprite *self, Map *map);\n",
            self.prefix, type_name
        ));
        out.push_str(&format!(
            "void {}_update({} *script, Sprite *self, Map *map, float delta);\n",
            self.prefix, type_name
        ));
        out.push_str(&format!(
            "void {}_go_to_state({} *script, Sprite *self, Map *map, {} state);\n\n",
            self.prefix, type_name, state_type
        ));
        out.push_str("#endif\n");
        out
    }

    fn body(&self) -> String {
        let type_name = &self.scope.type_name;
        let state_type = self.scope.state_type();
        let signature = |name: &str| {
            format!(
                "void {}({} *script, Sprite *self, Map *map, float delta)",
                name, type_name
            )
        };
        let mut out = String::new();
        out.push_str("#include <math.h>\n#include <stdio.h>\n#include <string.h>\n");
        out.push_str(&format!("#include \"{}.h\"\n\n", self.prefix));
        out.push_str("#define GRAVITY 1000.0f\n\n");

        for function in &self.functions {
            out.push_str(&format!("static {};\n", signature(&function.name)));
        }
        out.push('\n');
        for function in &self.functions {
            out.push_str(&format!("static {} {{\n", signature(&function.name)));
            for line in &function.lines {
                out.push_str(line);
                out.push('\n');
            }
            out.push_str("}\n\n");
        }

        out.push_str(&format!(
            "void {}_init({} *script, Sprite *self, Map *map) {{\n",
            self.prefix, type_name
        ));
        out.push_str("    memset(script, 0, sizeof(*script));\n");
        if let Some((initial, _)) = self.states.first() {
            out.push_str(&format!(
                "    {}_go_to_state(script, self, map, {});\n",
                self.prefix,
                self.scope.state_constant(initial)
            ));
        }
        out.push_str("}\n\n");

        out.push_str(&format!("{} {{\n", signature(&format!("{}_update", self.prefix))));
        out.push_str("    if (script->update != NULL) {\n");
        out.push_str(&format!("        script->update({});\n", PARAMETERS));
        out.push_str("    }\n}\n\n");

        out.push_str(&format!(
            "void {}_go_to_state({} *script, Sprite *self, Map *map, {} state) {{\n",
            self.prefix, type_name, state_type
        ));
        out.push_str("    (void)self;\n    (void)map;\n");
        out.push_str("    script->state = state;\n    script->fresh = false;\n");
        out.push_str("    switch (state) {\n");
        for (state, entry) in &self.states {
            out.push_str(&format!("    case {}:\n", self.scope.state_constant(state)));
            out.push_str(&format!("        script->update = {};\n", entry));
            out.push_str("        break;\n");
        }
        out.push_str("    default:\n        script->update = NULL;\n        break;\n");
        out.push_str("    }\n}\n");
        out
    }
}

/// True when `nodes` contain a loop or a `wait`, which need their own parts.
fn splits(nodes: &[Node]) -> bool {
    nodes.iter().any(|node| match node {
        Node::Group { name, children, .. } => match GroupKind::from_name(name) {
            Some(kind) if kind.is_loop() => true,
            Some(_) => splits(children),
            None => false,
        },
        Node::Instruction { name, .. } => {
            InstructionKind::from_name(name) == Some(InstructionKind::Wait)
        }
        _ => false,
    })
}

fn smoothstep(linear: &str) -> String {
    format!("{0} * {0} * (3.0f - 2.0f * {0})", linear)
}

fn as_point(expr: &Expr) -> String {
    match expr.kind {
        Some(kind) if kind.is_numeric() => format!("point_make({0}, {0})", expr.code),
        Some(ValueKind::Direction) => format!("DirectionVectors[{}]", expr.code),
        _ => expr.code.clone(),
    }
}

fn print_statement(value: &Expr) -> String {
    match value.kind {
        Some(ValueKind::Integer) => format!("printf(\"%d\\n\", {});", value.code),
        Some(ValueKind::Decimal) => format!("printf(\"%f\\n\", {});", value.code),
        Some(ValueKind::Point) => format!(
            "{{ Point printed = {}; printf(\"(%f, %f)\\n\", printed.x, printed.y); }}",
            value.code
        ),
        Some(ValueKind::Boolean) => {
            format!("printf(\"%s\\n\", ({}) ? \"true\" : \"false\");", value.code)
        }
        Some(ValueKind::Direction) => format!("printf(\"%d\\n\", (int){});", value.code),
        _ => format!("printf(\"%s\\n\", {});", value.code),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analyze;
    use sb_parser::{parse, CGrammar, CToken, Lexer};

    fn transpile(source: &str, name: &str) -> GeneratedCode {
        let analysis = analyze(parse(source).expect("source should parse"), true);
        generate(&analysis.nodes, &analysis.symbols, name)
    }

    fn assert_lexes_as_c(code: &str) {
        let tokens = Lexer::new(CGrammar::shared())
            .tokenize(code)
            .expect("generated code should tokenize as C");
        assert_eq!(tokens.last().map(|found| found.token), Some(CToken::EndOfFile));
    }

    const WALKER: &str = "state main:\n    set self.animation = stand\n    during 2s:\n        stride self.center.x to 100\n    set self.animation = walk\n";

    #[test]
    fn loops_split_states_into_parts() {
        let code = transpile(WALKER, "walker");
        let body = &code.body;
        assert!(body.contains("static void walker_main_part0(Walker *script, Sprite *self, Map *map, float delta) {"));
        assert!(body.contains("    sprite_set_animation(self, \"stand\");\n    script->decimal0 = self->frame.origin.x;\n    script->decimal1 = 100;\n    script->fresh = true;\n    script->update = walker_main_part1;\n    walker_main_part1(script, self, map, delta);\n    return;\n"));
        assert!(body.contains("    } else if (script->time0 >= script->duration0) {\n        script->update = walker_main_part2;\n        walker_main_part2(script, self, map, delta);\n        return;\n"));
        assert!(body.contains("    self->frame.origin.x = script->decimal0 + (script->decimal1 - script->decimal0) * script->progress0;\n    script->update = walker_main_part1;\n    return;\n"));
        assert!(body.contains("    sprite_set_animation(self, \"walk\");\n    script->update = walker_main_part0;\n    return;\n"));
        assert!(body.contains("script->duration0 = 2.0f;"));
        assert_lexes_as_c(body);
    }

    #[test]
    fn header_declares_state_enum_struct_and_glue() {
        let code = transpile(
            "state main:\n    set speed = self.center.x\n    go to idle\nstate idle:\n    wait\n",
            "hero_bullet",
        );
        let header = &code.header;
        assert!(header.starts_with("#ifndef HERO_BULLET_H\n#define HERO_BULLET_H\n"));
        assert!(header.contains("    HeroBulletStateMain,\n    HeroBulletStateIdle,\n} HeroBulletState;"));
        assert!(header.contains("    float decimal0;\n"));
        assert!(!header.contains("jumpVelocity"));
        assert!(header.contains("void hero_bullet_go_to_state(HeroBullet *script, Sprite *self, Map *map, HeroBulletState state);"));
        assert!(code
            .body
            .contains("    hero_bullet_go_to_state(script, self, map, HeroBulletStateIdle);\n    return;\n"));
        assert!(code
            .body
            .contains("    case HeroBulletStateIdle:\n        script->update = hero_bullet_idle_part0;\n"));
        assert_lexes_as_c(header);
        assert_lexes_as_c(&code.body);
    }

    #[test]
    fn plain_if_stays_native_and_wait_splits() {
        let code = transpile(
            "state main:\n    if self.center.x > 10:\n        move by left\n    else:\n        move by (1, 0)\n    wait\n    print \"done\"\n",
            "mover",
        );
        let body = &code.body;
        assert!(body.contains("    if ((self->frame.origin.x > 10)) {\n        self->frame.origin = point_add_direction(self->frame.origin, DirectionLeft);\n    } else {\n        self->frame.origin = point_add(self->frame.origin, point_make(1.0f, 0.0f));\n    }\n    script->update = mover_main_part1;\n    return;\n"));
        assert!(body.contains("    printf(\"%s\\n\", \"done\");\n    script->update = mover_main_part0;\n"));
        assert_lexes_as_c(body);
    }

    #[test]
    fn if_containing_a_loop_continues_in_both_branches() {
        let code = transpile(
            "state main:\n    if self.center.y < 0:\n        jump 40:\n            wait\n    set self.direction = up\n",
            "hopper",
        );
        let body = &code.body;
        assert!(body.contains("static void hopper_main_part1("));
        assert!(body.contains("script->jumpVelocity0 = sqrtf(2.0f * GRAVITY * 40);"));
        assert!(body.contains("    }\n    script->jumpTime0 += delta;\n"));
        assert!(body.contains("    } else {\n        script->update = hopper_main_part1;\n        hopper_main_part1(script, self, map, delta);\n        return;\n    }\n"));
        assert!(body.contains("self->direction = DirectionUp;"));
        assert_lexes_as_c(body);
    }

    #[test]
    fn unsupported_constructs_become_comments() {
        let code = transpile("state main:\n    shake 3\n    set self.direction.reverse = up\n", "odd");
        assert!(code.body.contains("/* unsupported instruction shake */"));
        assert!(code
            .body
            .contains("/* unsupported assignment to self.direction.reverse */"));
        assert_lexes_as_c(&code.body);
    }

    #[test]
    fn nested_groups_get_their_own_temporaries() {
        let code = transpile(
            "state main:\n    during 5s:\n        during 1s:\n            stride self.center.x from 0 to 10\n        print progress\n        jump 20:\n            wait\n",
            "nested",
        );
        assert!(code.header.contains(
            "    float time0;\n    float progress0;\n    float duration0;\n    float jumpTime1;\n"
        ));
        assert!(code.header.contains("    float duration2;\n"));

        let body = &code.body;
        assert!(body.contains("script->duration0 = 5.0f;"));
        assert!(body.contains("script->duration2 = 1.0f;"));
        assert!(body.contains("self->frame.origin.x = 0 + (10 - 0) * script->progress2;"));
        assert!(body.contains("printf(\"%f\\n\", script->progress0);"));
        assert!(body.contains("if (displacement <= 0.0f && script->jumpTime1 > 0.0f) {"));
        assert!(!body.contains("script->time "));
        assert_lexes_as_c(&code.header);
        assert_lexes_as_c(body);
    }

    #[test]
    fn group_local_names_outside_groups_are_script_variables() {
        let code = transpile(
            "state main:\n    set time = self.center\n    set p = time + right\n    during 1s:\n        set q = time\n    stride self.center.x from 0 to 5\n",
            "clock",
        );
        let body = &code.body;
        assert!(body.contains("script->point2 = self->frame.origin;"));
        assert!(body.contains("script->point0 = point_add_direction(script->point2, DirectionRight);"));
        assert!(body.contains("script->decimal1 = script->time0;"));
        assert!(body.contains("self->frame.origin.x = 0 + (5 - 0) * 1.0f;"));
        assert!(!body.contains("unsupported"));
        assert_lexes_as_c(body);
    }
}

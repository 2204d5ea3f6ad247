use std::fs;

use sb_api::{compile_script_from_source, create_engine, transpile as transpile_script, EngineOptions};
use sb_compiler::{analyze, CodegenOptions, CompileOptions};
use sb_core::{Point, ScriptError};
use sb_parser::{parse, tokenize, GrammarToken};
use sb_runtime::{SpriteRecord, SpriteTable};

use crate::{
    map_cli_json, map_cli_output_write, CompileArgs, LoadedSource, RunArgs, SourceArgs,
    TranspileArgs,
};

fn compile_options(args: &SourceArgs) -> CompileOptions {
    CompileOptions {
        reduce: !args.no_reduce,
    }
}

fn json<T: serde::Serialize + ?Sized>(value: &T) -> Result<String, ScriptError> {
    serde_json::to_string(value).map_err(map_cli_json)
}

pub(crate) fn tokens(loaded: &LoadedSource) -> Result<Vec<String>, ScriptError> {
    let tokens = tokenize(&loaded.source)?;
    tokens
        .iter()
        .map(|found| -> Result<String, ScriptError> {
            Ok(format!(
                "TOKEN:{}|{}..{}|{}",
                found.token.name(),
                found.span.start,
                found.span.end,
                json(found.text())?
            ))
        })
        .collect()
}

pub(crate) fn ast(loaded: &LoadedSource, args: &SourceArgs) -> Result<Vec<String>, ScriptError> {
    let analysis = analyze(parse(&loaded.source)?, !args.no_reduce);
    let tree = serde_json::to_string_pretty(&analysis.nodes).map_err(map_cli_json)?;
    Ok(vec![tree])
}

pub(crate) fn compile(loaded: &LoadedSource, args: &CompileArgs) -> Result<Vec<String>, ScriptError> {
    let script = compile_script_from_source(&loaded.source, &compile_options(&args.source))?;
    let mut lines = vec![
        format!("STATES:{}", script.states.len()),
        format!("INSTRUCTIONS:{}", script.instructions.len()),
    ];
    if args.json {
        lines.push(format!("SCRIPT_JSON:{}", json(&script)?));
    } else {
        lines.extend(script.listing().lines().map(str::to_string));
    }
    Ok(lines)
}

pub(crate) fn run(loaded: &LoadedSource, args: &RunArgs) -> Result<Vec<String>, ScriptError> {
    let mut table = SpriteTable::new();
    let sprite = table.insert(SpriteRecord::default());
    let mut engine = create_engine(EngineOptions {
        source: loaded.source.clone(),
        sprite,
        map: Point::new(args.map_width, args.map_height),
        compile: compile_options(&args.source),
    })?;

    let mut lines = Vec::new();
    for _ in 0..args.ticks {
        engine.tick(args.delta, &mut table)?;
        for line in engine.take_output() {
            lines.push(format!("PRINT_JSON:{}", json(&line)?));
        }
    }

    lines.push(format!("STATE:{}", engine.context().state()));
    lines.push(format!("SPRITES:{}", table.len()));
    lines.push(format!("SELF_JSON:{}", json(&table.get(sprite))?));
    Ok(lines)
}

pub(crate) fn transpile(loaded: &LoadedSource, args: &TranspileArgs) -> Result<Vec<String>, ScriptError> {
    let code = transpile_script(
        &loaded.source,
        &CodegenOptions {
            script_name: args.name.clone().unwrap_or_else(|| loaded.name.clone()),
            reduce: !args.source.no_reduce,
        },
    )?;

    let Some(out_dir) = &args.out_dir else {
        return Ok(vec![code.header, code.body]);
    };
    fs::create_dir_all(out_dir).map_err(map_cli_output_write)?;
    let header = out_dir.join(format!("{}.h", code.file_stem));
    let body = out_dir.join(format!("{}.c", code.file_stem));
    fs::write(&header, &code.header).map_err(map_cli_output_write)?;
    fs::write(&body, &code.body).map_err(map_cli_output_write)?;
    Ok(vec![
        format!("HEADER_OUT:{}", header.display()),
        format!("BODY_OUT:{}", body.display()),
    ])
}

use std::ffi::OsString;

use clap::Parser;
use sb_core::ScriptError;

mod cli_args;
mod commands;
mod error_map;
mod source_loader;

pub(crate) use cli_args::{Cli, CompileArgs, Mode, RunArgs, SourceArgs, TranspileArgs};
pub(crate) use error_map::{emit_error, map_cli_json, map_cli_output_write, map_cli_source_read};
pub(crate) use source_loader::{load_source, LoadedSource};

pub fn run_cli_from_args<I, T>(args: I) -> i32
where
    I: IntoIterator<Item = T>,
    T: Into<OsString> + Clone,
{
    let cli = match Cli::try_parse_from(args) {
        Ok(cli) => cli,
        Err(error) => {
            let _ = error.print();
            return error.exit_code();
        }
    };
    let loaded = match load_source(&cli.command.source_args().source) {
        Ok(loaded) => loaded,
        Err(error) => return emit_error(error, None),
    };
    match run(cli.command, &loaded) {
        Ok(lines) => {
            println!("RESULT:OK");
            for line in lines {
                println!("{}", line);
            }
            0
        }
        Err(error) => emit_error(error, Some(&loaded.source)),
    }
}

fn run(mode: Mode, loaded: &LoadedSource) -> Result<Vec<String>, ScriptError> {
    log::debug!("{:?} on {}", mode, loaded.path.display());
    match mode {
        Mode::Tokens(_) => commands::tokens(loaded),
        Mode::Ast(args) => commands::ast(loaded, &args),
        Mode::Compile(args) => commands::compile(loaded, &args),
        Mode::Run(args) => commands::run(loaded, &args),
        Mode::Transpile(args) => commands::transpile(loaded, &args),
    }
}

impl Mode {
    fn source_args(&self) -> &SourceArgs {
        match self {
            Self::Tokens(args) | Self::Ast(args) => args,
            Self::Compile(args) => &args.source,
            Self::Run(args) => &args.source,
            Self::Transpile(args) => &args.source,
        }
    }
}

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

#[derive(Debug, Parser)]
#[command(name = "sb-cli")]
#[command(about = "Sprite behavior script toolchain")]
pub(crate) struct Cli {
    #[command(subcommand)]
    pub(crate) command: Mode,
}

#[derive(Debug, Subcommand)]
pub(crate) enum Mode {
    /// Print the token stream.
    Tokens(SourceArgs),
    /// Print the analyzed tree as JSON.
    Ast(SourceArgs),
    /// Print the instruction listing.
    Compile(CompileArgs),
    /// Run the script against one sprite for a number of ticks.
    Run(RunArgs),
    /// Generate C header and body.
    Transpile(TranspileArgs),
}

#[derive(Debug, Args)]
pub(crate) struct SourceArgs {
    /// Script file, or a directory holding `main.sprite`.
    pub(crate) source: PathBuf,
    /// Skip constant inlining and folding.
    #[arg(long = "no-reduce")]
    pub(crate) no_reduce: bool,
}

#[derive(Debug, Args)]
pub(crate) struct CompileArgs {
    #[command(flatten)]
    pub(crate) source: SourceArgs,
    #[arg(long = "json")]
    pub(crate) json: bool,
}

#[derive(Debug, Args)]
pub(crate) struct RunArgs {
    #[command(flatten)]
    pub(crate) source: SourceArgs,
    #[arg(long = "ticks", default_value_t = 60)]
    pub(crate) ticks: usize,
    /// Seconds per tick.
    #[arg(long = "delta", default_value_t = 1.0 / 60.0)]
    pub(crate) delta: f32,
    #[arg(long = "map-width", default_value_t = 640.0)]
    pub(crate) map_width: f32,
    #[arg(long = "map-height", default_value_t = 480.0)]
    pub(crate) map_height: f32,
}

#[derive(Debug, Args)]
pub(crate) struct TranspileArgs {
    #[command(flatten)]
    pub(crate) source: SourceArgs,
    /// Name of the generated symbols; defaults to the script's name.
    #[arg(long = "name")]
    pub(crate) name: Option<String>,
    /// Write `<name>.h` and `<name>.c` here instead of printing them.
    #[arg(long = "out-dir")]
    pub(crate) out_dir: Option<PathBuf>,
}

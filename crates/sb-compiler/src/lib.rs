pub mod bytecode;
pub mod codegen;
pub mod reducer;
pub mod rewrite;
pub mod symbols;

use sb_core::{Node, Script, ScriptError};
use sb_parser::parse;

pub use bytecode::compile_nodes;
pub use codegen::{generate, CodegenOptions, GeneratedCode};
pub use reducer::reduce;
pub use rewrite::{hoist_strides, resolve_names};
pub use symbols::{Binding, LocalScope, StrideSymbol, SymbolTable};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompileOptions {
    /// Inline constants and fold operators before lowering.
    pub reduce: bool,
}

impl Default for CompileOptions {
    fn default() -> Self {
        Self { reduce: true }
    }
}

/// Parsed states after every source-level pass, with the symbols they were
/// analyzed against.
#[derive(Debug, Clone, PartialEq)]
pub struct Analysis {
    pub nodes: Vec<Node>,
    pub symbols: SymbolTable,
}

pub fn analyze(nodes: Vec<Node>, reduce: bool) -> Analysis {
    let symbols = SymbolTable::build(&nodes);
    log::debug!(
        "symbols: {} variables, {} constants, {} states, {} strides",
        symbols.variables.len(),
        symbols.constants.len(),
        symbols.states.len(),
        symbols.strides.len()
    );
    let nodes = hoist_strides(nodes, &symbols);
    let mut nodes = resolve_names(nodes, &symbols);
    if reduce {
        nodes = reducer::reduce(&nodes, &symbols.constant_heap(), None);
        log::debug!("reduced {} states", nodes.len());
    }
    Analysis { nodes, symbols }
}

pub fn compile_source(source: &str, options: &CompileOptions) -> Result<Script, ScriptError> {
    let analysis = analyze(parse(source)?, options.reduce);
    let script = compile_nodes(&analysis.nodes);
    log::debug!(
        "compiled {} instructions over {} states",
        script.instructions.len(),
        script.states.len()
    );
    Ok(script)
}

pub fn transpile_source(source: &str, options: &CodegenOptions) -> Result<GeneratedCode, ScriptError> {
    let analysis = analyze(parse(source)?, options.reduce);
    let code = generate(&analysis.nodes, &analysis.symbols, &options.script_name);
    log::debug!(
        "generated '{}': {} header bytes, {} body bytes",
        options.script_name,
        code.header.len(),
        code.body.len()
    );
    Ok(code)
}

mod c_grammar;
mod grammar;
mod lexer;
mod operation;
mod script_grammar;
mod tree_builder;

pub use c_grammar::{CGrammar, CToken};
pub use grammar::{FoundToken, Grammar, GrammarToken};
pub use lexer::{Lexer, Scan};
pub use script_grammar::{ScriptGrammar, Token};
pub use tree_builder::{parse, TreeBuilder};

use sb_core::LexError;

/// Tokenizes behavior script source with the shared script grammar.
pub fn tokenize(source: &str) -> Result<Vec<FoundToken<Token>>, LexError> {
    Lexer::new(ScriptGrammar::shared()).tokenize(source)
}

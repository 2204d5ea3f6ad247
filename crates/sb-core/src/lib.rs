pub mod ast;
pub mod error;
pub mod operators;
pub mod script;
pub mod sprite;
pub mod types;
pub mod value;

pub use ast::*;
pub use error::{LexError, LookupError, ParseError, ScriptError};
pub use operators::*;
pub use script::*;
pub use sprite::*;
pub use types::*;
pub use value::*;

pub mod ast;
pub mod config;
pub mod error;
pub mod interpreter;
pub mod load;
pub mod parser;
pub mod script;
pub mod serialize;
pub mod store;
pub mod tree;

use config::Options;
use error::CompileError;
use store::ParameterStore;
use tree::Value;

pub use interpreter::{resolve, Resolution, Resolver};
pub use script::Compiler;
pub use serialize::ValueSerializer;

// ── Core API ───────────────────────────────────────────────────────

/// Compile a document tree into a command script using default options.
pub fn compile(document: &Value, store: &ParameterStore) -> Result<String, CompileError> {
    Compiler::new(store, &Options::default()).compile(document)
}

/// Render one value in the command grammar.
pub fn serialize(value: &Value, store: &ParameterStore) -> Result<String, CompileError> {
    ValueSerializer::new(Resolver::new(store)).serialize(value)
}

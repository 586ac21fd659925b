//! Decoded entities of a compiled script and the session that produces them.

mod argument;
mod entity;
mod opcode;
mod program;
mod reader;
mod symbols;

pub use argument::{Argument, ArgumentType, ArgumentValue, HashValue};
pub use entity::{Function, Instruction, Jump};
pub use opcode::{Opcode, UnsupportedKind};
pub use program::{open_xseq, DecodeOptions, DecodeSession, ScriptProgram};
pub use symbols::{SymbolCaches, SymbolTable};

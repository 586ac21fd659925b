//! Decoder for XSEQ compiled script containers.
//!
//! The pipeline runs strictly forward: the header is parsed and validated,
//! the pointer width and compression state are detected from table sizes,
//! tables are decoded into functions, jumps, instructions and arguments,
//! and [`codegen`] renders the result as readable pseudocode.

#![allow(clippy::uninlined_format_args)]

pub mod codegen;
pub mod error;
pub mod format;
pub mod nls;
pub mod script;

#[cfg(test)]
mod test_util;

pub use error::{Result, XseqError};
pub use nls::Nls;
pub use script::{open_xseq, DecodeOptions, DecodeSession, ScriptProgram};

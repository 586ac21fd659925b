//! Pseudocode rendering of a decoded [`ScriptProgram`](crate::script::ScriptProgram).

mod pseudocode;
mod value;

pub use pseudocode::{emit_pseudocode, render_pseudocode, GeneratorOptions};
pub use value::{create_value_expression, variable_name, VariableClass};

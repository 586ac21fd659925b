use crate::script::{Argument, ArgumentValue, HashValue};

/// Variable slot families, keyed by the thousands digit of the slot value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, strum::Display)]
pub enum VariableClass {
    #[strum(serialize = "unk")]
    Unknown,
    #[strum(serialize = "local")]
    Local,
    #[strum(serialize = "object")]
    Object,
    #[strum(serialize = "param")]
    Param,
    #[strum(serialize = "global")]
    Global,
}

impl VariableClass {
    /// Split a slot value into its class and index. Values past 4999 have
    /// no class.
    pub fn classify(value: u32) -> Option<(Self, u32)> {
        let class = match value / 1000 {
            0 => VariableClass::Unknown,
            1 => VariableClass::Local,
            2 => VariableClass::Object,
            3 => VariableClass::Param,
            4 => VariableClass::Global,
            _ => return None,
        };
        Some((class, value % 1000))
    }
}

/// `local3`, `global0`, ... or an empty string for unclassified slots.
pub fn variable_name(value: u32) -> String {
    match VariableClass::classify(value) {
        Some((class, index)) => format!("{}{}", class, index),
        None => String::new(),
    }
}

fn quote(s: &str) -> String {
    let mut out = String::with_capacity(s.len() + 2);
    out.push('"');
    for c in s.chars() {
        if matches!(c, '"' | '\\') {
            out.push('\\');
        }
        out.push(c);
    }
    out.push('"');
    out
}

/// Positional decimal with a fractional part: `1.0`, `0.0000001`, never
/// exponent notation.
fn float_literal(f: f32) -> String {
    let mut s = f.to_string();
    if f.is_finite() && !s.contains('.') {
        s.push_str(".0");
    }
    s
}

/// Render one argument as it appears inside a statement.
pub fn create_value_expression(arg: &Argument) -> String {
    let mut expr = match &arg.value {
        ArgumentValue::Variable(v) => variable_name(*v),
        ArgumentValue::Int(v) => v.to_string(),
        ArgumentValue::StringHash(HashValue::Raw(h)) => h.to_string(),
        ArgumentValue::StringHash(HashValue::Resolved(name)) => name.clone(),
        ArgumentValue::Float(f) => float_literal(*f),
        ArgumentValue::String(s) => quote(s),
        ArgumentValue::Null => "null".to_string(),
    };
    if arg.raw_argument_type >= 0 {
        expr.push_str(&format!("<{}>", arg.raw_argument_type));
    }
    expr
}

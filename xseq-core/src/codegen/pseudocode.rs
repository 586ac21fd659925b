use std::collections::BTreeMap;
use std::io::Write;

use super::value::{create_value_expression, variable_name};
use crate::error::{Result, XseqError};
use crate::script::{Argument, Function, Instruction, Jump, Opcode, ScriptProgram};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct GeneratorOptions {
    /// Fail on a malformed instruction instead of emitting a marker line.
    pub strict: bool,
}

/// Jump names keyed by the instruction index they target.
fn label_map(jumps: &[Jump]) -> BTreeMap<usize, Vec<&str>> {
    let mut labels: BTreeMap<usize, Vec<&str>> = BTreeMap::new();
    for jump in jumps {
        labels
            .entry(jump.instruction_index)
            .or_default()
            .push(jump.name.as_str());
    }
    labels
}

fn indexed(base: &str, indices: &[Argument]) -> String {
    let mut out = base.to_string();
    for index in indices {
        out.push('[');
        out.push_str(&create_value_expression(index));
        out.push(']');
    }
    out
}

/// Render one instruction without indentation. `Err` carries the reason
/// the instruction could not be rendered.
fn render_statement(
    inst: &Instruction,
    arguments: &[Argument],
) -> std::result::Result<String, String> {
    let opcode = Opcode::from(inst.opcode);
    let end = inst.argument_index + inst.argument_count;
    let args = arguments.get(inst.argument_index..end).ok_or_else(|| {
        format!(
            "arguments {}..{} out of range ({} decoded)",
            inst.argument_index,
            end,
            arguments.len()
        )
    })?;
    if args.len() < opcode.min_arguments() {
        return Err(format!(
            "{} expects at least {} arguments, got {}",
            opcode.mnemonic(),
            opcode.min_arguments(),
            args.len()
        ));
    }

    let v = |i: usize| create_value_expression(&args[i]);
    let ret = variable_name(inst.return_parameter as u32);

    let line = match opcode {
        Opcode::Yield => "yield".to_string(),
        Opcode::Return if args.is_empty() => "return".to_string(),
        Opcode::Return => format!("return {}", v(0)),
        Opcode::Exit => "exit()".to_string(),
        Opcode::JumpIf => format!("if {} goto {}", v(1), v(0)),
        Opcode::JumpIfNot => format!("if not {} goto {}", v(1), v(0)),
        Opcode::Jump => format!("goto {}", v(0)),
        Opcode::PostIncrement => format!("{}++", indexed(&ret, args)),
        Opcode::PostDecrement => format!("{}--", indexed(&ret, args)),
        Opcode::Assign => format!("{} = {}", indexed(&ret, &args[1..]), v(0)),
        Opcode::AddOne => format!("{} = {} + 1", ret, v(0)),
        Opcode::SubOne => format!("{} = {} - 1", ret, v(0)),
        Opcode::Index => format!("{} = {}", ret, indexed(&v(0), &args[1..])),
        op => {
            if let Some(u) = op.unary_operator() {
                format!("{} = {}{}", ret, u, v(0))
            } else if let Some(b) = op.binary_operator() {
                format!("{} = {} {} {}", ret, v(0), b, v(1))
            } else if let Some(c) = op.compound_operator() {
                format!("{} {} {}", indexed(&ret, &args[1..]), c, v(0))
            } else if let Some(kind) = op.unsupported_kind() {
                format!("# unsupported {} (opcode {})", kind, op.code())
            } else {
                format!("# unhandled opcode {}", op.code())
            }
        }
    };
    Ok(line)
}

fn function_name(function: &Function, position: usize) -> String {
    if function.name.is_empty() {
        format!("f{}", position)
    } else {
        function.name.clone()
    }
}

fn emit_function<W: Write>(
    w: &mut W,
    program: &ScriptProgram,
    position: usize,
    function: &Function,
    labels: &BTreeMap<usize, Vec<&str>>,
    options: GeneratorOptions,
) -> Result<()> {
    let params = (0..function.parameter_count)
        .map(|i| format!("param{}", i))
        .collect::<Vec<_>>()
        .join(", ");
    writeln!(w, "def {}({}):", function_name(function, position), params)?;

    let mut body = Vec::new();
    let push_labels = |body: &mut Vec<String>, index: usize| {
        for name in labels.get(&index).into_iter().flatten() {
            body.push(format!("\"{}\":", name));
        }
    };

    let range = function.instruction_range();
    for index in range.clone() {
        push_labels(&mut body, index);

        let rendered = match program.instructions.get(index) {
            Some(inst) => render_statement(inst, &program.arguments),
            None => Err(format!(
                "instruction out of range ({} decoded)",
                program.instructions.len()
            )),
        };
        match rendered {
            Ok(line) => body.push(line),
            Err(reason) if options.strict => {
                return Err(XseqError::MalformedInstruction { index, reason });
            }
            Err(reason) => {
                log::warn!("malformed instruction {}: {}", index, reason);
                body.push(format!("# malformed instruction {}: {}", index, reason));
            }
        }
    }
    push_labels(&mut body, range.end);

    if body.is_empty() {
        body.push("pass".to_string());
    }
    for line in body {
        writeln!(w, "\t{}", line)?;
    }
    writeln!(w)?;
    Ok(())
}

/// Write the whole program as Python-flavoured pseudocode.
pub fn emit_pseudocode<W: Write>(
    w: &mut W,
    program: &ScriptProgram,
    options: GeneratorOptions,
) -> Result<()> {
    let labels = label_map(&program.jumps);
    for (position, function) in program.functions.iter().enumerate() {
        emit_function(w, program, position, function, &labels, options)?;
    }
    Ok(())
}

pub fn render_pseudocode(program: &ScriptProgram, options: GeneratorOptions) -> Result<String> {
    let mut out = Vec::new();
    emit_pseudocode(&mut out, program, options)?;
    Ok(String::from_utf8_lossy(&out).into_owned())
}

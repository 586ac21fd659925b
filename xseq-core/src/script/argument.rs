use serde::Serialize;

use super::entity::{Instruction, XseqArgument};
use super::opcode::Opcode;
use super::symbols::SymbolCaches;
use crate::error::Result;
use crate::format::StringTable;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, strum::Display)]
pub enum ArgumentType {
    Int,
    StringHash,
    Float,
    Variable,
    String,
    Null,
}

/// A string-hash payload, replaced by a name when a symbol cache knows it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum HashValue {
    Raw(u32),
    Resolved(String),
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum ArgumentValue {
    Int(i32),
    StringHash(HashValue),
    Float(f32),
    Variable(u32),
    String(String),
    Null,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Argument {
    /// `-1`, or the stored type tag of a string-argument subtype.
    pub raw_argument_type: i32,
    pub value: ArgumentValue,
}

impl Argument {
    pub fn argument_type(&self) -> ArgumentType {
        match self.value {
            ArgumentValue::Int(_) => ArgumentType::Int,
            ArgumentValue::StringHash(_) => ArgumentType::StringHash,
            ArgumentValue::Float(_) => ArgumentType::Float,
            ArgumentValue::Variable(_) => ArgumentType::Variable,
            ArgumentValue::String(_) => ArgumentType::String,
            ArgumentValue::Null => ArgumentType::Null,
        }
    }
}

/// Owning instruction of an argument slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ArgumentContext {
    pub opcode: Opcode,
    pub position: usize,
}

/// Stamp each argument slot with the opcode and position of the
/// instruction that covers it. Slots no instruction covers stay `None`.
pub fn argument_contexts(instructions: &[Instruction], count: usize) -> Vec<Option<ArgumentContext>> {
    let mut contexts = vec![None; count];
    for (index, inst) in instructions.iter().enumerate() {
        let opcode = Opcode::from(inst.opcode);
        for position in 0..inst.argument_count {
            match contexts.get_mut(inst.argument_index + position) {
                Some(slot) => *slot = Some(ArgumentContext { opcode, position }),
                None => {
                    log::warn!(
                        "instruction {} references argument {} of {}",
                        index,
                        inst.argument_index + position,
                        count
                    );
                    break;
                }
            }
        }
    }
    contexts
}

fn resolve_hash(hash: u32, context: Option<ArgumentContext>, symbols: &SymbolCaches) -> HashValue {
    let Some(ArgumentContext { opcode, position }) = context else {
        return HashValue::Raw(hash);
    };

    let mut resolved = None;
    if position != 0 {
        resolved = symbols
            .functions
            .resolve(hash)
            .or_else(|| symbols.jumps.resolve(hash));
    }
    if opcode.code() == Opcode::CALL {
        resolved = symbols.functions.resolve(hash).or(resolved);
    }
    if opcode.targets_jump() {
        resolved = symbols.jumps.resolve(hash).or(resolved);
    }

    match resolved {
        Some(name) => HashValue::Resolved(name.to_string()),
        None => HashValue::Raw(hash),
    }
}

/// Classify one stored argument into a typed value.
pub fn resolve_argument(
    raw: XseqArgument,
    context: Option<ArgumentContext>,
    symbols: &SymbolCaches,
    strings: &StringTable,
) -> Result<Argument> {
    let mut raw_argument_type = -1;
    let value = match raw.argument_type {
        1 => ArgumentValue::Int(raw.value as i32),
        2 => ArgumentValue::StringHash(resolve_hash(raw.value, context, symbols)),
        3 => ArgumentValue::Float(f32::from_bits(raw.value)),
        4 => ArgumentValue::Variable(raw.value),
        t @ (24 | 25) => {
            if t == 25 {
                raw_argument_type = t;
            }
            ArgumentValue::String(strings.read_str(raw.value as usize)?.into_owned())
        }
        _ => ArgumentValue::Null,
    };

    Ok(Argument {
        raw_argument_type,
        value,
    })
}

/// Resolve the whole argument table against the decoded instructions and
/// the session's symbol caches.
pub fn resolve_arguments(
    raw: &[XseqArgument],
    instructions: &[Instruction],
    symbols: &SymbolCaches,
    strings: &StringTable,
) -> Result<Vec<Argument>> {
    let contexts = argument_contexts(instructions, raw.len());
    raw.iter()
        .zip(contexts)
        .map(|(arg, context)| resolve_argument(*arg, context, symbols, strings))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::nls::Nls;

    fn caches() -> SymbolCaches {
        let mut symbols = SymbolCaches::default();
        symbols.functions.insert(0x10, "do_thing");
        symbols.jumps.insert(0x20, "loop_start");
        symbols.functions.insert(0x30, "shared_fn");
        symbols.jumps.insert(0x30, "shared_label");
        symbols
    }

    fn ctx(opcode: u16, position: usize) -> Option<ArgumentContext> {
        Some(ArgumentContext {
            opcode: Opcode::from(opcode),
            position,
        })
    }

    fn hash_arg(value: u32) -> XseqArgument {
        XseqArgument {
            argument_type: 2,
            value,
        }
    }

    fn resolve(raw: XseqArgument, context: Option<ArgumentContext>) -> ArgumentValue {
        resolve_argument(raw, context, &caches(), &StringTable::default())
            .unwrap()
            .value
    }

    fn named(name: &str) -> ArgumentValue {
        ArgumentValue::StringHash(HashValue::Resolved(name.to_string()))
    }

    #[test]
    fn first_hash_argument_is_not_substituted() {
        assert_eq!(
            resolve(hash_arg(0x10), ctx(100, 0)),
            ArgumentValue::StringHash(HashValue::Raw(0x10))
        );
        assert_eq!(resolve(hash_arg(0x10), ctx(100, 1)), named("do_thing"));
        assert_eq!(resolve(hash_arg(0x20), ctx(100, 2)), named("loop_start"));
    }

    #[test]
    fn later_positions_prefer_functions() {
        assert_eq!(resolve(hash_arg(0x30), ctx(100, 1)), named("shared_fn"));
    }

    #[test]
    fn opcode_overrides() {
        assert_eq!(resolve(hash_arg(0x10), ctx(20, 0)), named("do_thing"));
        assert_eq!(resolve(hash_arg(0x20), ctx(20, 0)), ArgumentValue::StringHash(HashValue::Raw(0x20)));
        for op in [30, 31, 33] {
            assert_eq!(resolve(hash_arg(0x20), ctx(op, 0)), named("loop_start"));
            assert_eq!(resolve(hash_arg(0x30), ctx(op, 1)), named("shared_label"));
        }
        // A miss keeps the positional result.
        assert_eq!(resolve(hash_arg(0x10), ctx(31, 1)), named("do_thing"));
    }

    #[test]
    fn uncovered_slots_get_no_substitution() {
        assert_eq!(
            resolve(hash_arg(0x10), None),
            ArgumentValue::StringHash(HashValue::Raw(0x10))
        );
    }

    #[test]
    fn scalar_types() {
        let arg = |argument_type, value| XseqArgument { argument_type, value };
        assert_eq!(resolve(arg(1, 0xFFFF_FFFF), None), ArgumentValue::Int(-1));
        assert_eq!(resolve(arg(3, 0x3FC0_0000), None), ArgumentValue::Float(1.5));
        assert_eq!(resolve(arg(4, 3001), None), ArgumentValue::Variable(3001));
        assert_eq!(resolve(arg(9, 5), None), ArgumentValue::Null);
    }

    #[test]
    fn string_arguments() {
        let strings = StringTable::new(b"hello\0".to_vec(), Nls::ShiftJIS);
        let symbols = SymbolCaches::default();
        let plain = resolve_argument(XseqArgument { argument_type: 24, value: 0 }, None, &symbols, &strings).unwrap();
        assert_eq!(plain.value, ArgumentValue::String("hello".to_string()));
        assert_eq!(plain.raw_argument_type, -1);

        let tagged = resolve_argument(XseqArgument { argument_type: 25, value: 1 }, None, &symbols, &strings).unwrap();
        assert_eq!(tagged.value, ArgumentValue::String("ello".to_string()));
        assert_eq!(tagged.raw_argument_type, 25);
        assert_eq!(tagged.argument_type(), ArgumentType::String);

        let empty = resolve_argument(XseqArgument { argument_type: 24, value: 99 }, None, &symbols, &StringTable::default()).unwrap();
        assert_eq!(empty.value, ArgumentValue::String(String::new()));
    }

    #[test]
    fn contexts_follow_instruction_slices() {
        let insts = [
            Instruction { argument_index: 0, argument_count: 2, return_parameter: 0, opcode: 30 },
            Instruction { argument_index: 3, argument_count: 2, return_parameter: 0, opcode: 100 },
        ];
        let contexts = argument_contexts(&insts, 4);
        assert_eq!(contexts[0], ctx(30, 0));
        assert_eq!(contexts[1], ctx(30, 1));
        assert_eq!(contexts[2], None);
        assert_eq!(contexts[3], ctx(100, 0));
    }
}

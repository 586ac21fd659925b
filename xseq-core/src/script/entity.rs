use serde::Serialize;

use super::reader::TableReader;
use super::symbols::SymbolTable;
use crate::error::Result;
use crate::format::{PointerWidth, RawTable, StringTable};

/// Function record as stored on disk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct XseqFunction {
    pub name_offset: u64,
    pub hash: u16,
    pub instruction_offset: u16,
    pub instruction_end_offset: u16,
    pub jump_offset: u16,
    pub jump_count: u16,
    pub local_count: u16,
    pub object_count: u16,
    pub parameter_count: u16,
}

/// Jump (label) record as stored on disk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct XseqJump {
    pub name_offset: u64,
    pub hash: u16,
    pub instruction_index: u16,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct XseqInstruction {
    pub argument_offset: u16,
    pub argument_count: u16,
    pub return_parameter: u16,
    pub instruction_type: u16,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct XseqArgument {
    pub argument_type: i32,
    pub value: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Function {
    pub name: String,
    pub instruction_index: usize,
    pub instruction_count: usize,
    pub jump_index: usize,
    pub jump_count: usize,
    pub parameter_count: usize,
    pub local_count: usize,
    pub object_count: usize,
}

impl Function {
    pub fn instruction_range(&self) -> std::ops::Range<usize> {
        self.instruction_index..self.instruction_index + self.instruction_count
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Jump {
    pub name: String,
    pub instruction_index: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Instruction {
    pub argument_index: usize,
    pub argument_count: usize,
    /// Variable slot receiving the result; see `codegen::value`.
    pub return_parameter: u16,
    /// Raw opcode, see [`super::Opcode`].
    pub opcode: u16,
}

impl XseqFunction {
    fn read(rdr: &mut TableReader<'_>) -> Result<Self> {
        Ok(Self {
            name_offset: rdr.read_pointer()?,
            hash: rdr.read_u16()?,
            instruction_offset: rdr.read_u16()?,
            instruction_end_offset: rdr.read_u16()?,
            jump_offset: rdr.read_u16()?,
            jump_count: rdr.read_u16()?,
            local_count: rdr.read_u16()?,
            object_count: rdr.read_u16()?,
            parameter_count: rdr.read_u16()?,
        })
    }
}

impl XseqJump {
    fn read(rdr: &mut TableReader<'_>) -> Result<Self> {
        let jump = Self {
            name_offset: rdr.read_pointer()?,
            hash: rdr.read_u16()?,
            instruction_index: rdr.read_u16()?,
        };
        rdr.skip_wide_padding(4)?;
        Ok(jump)
    }
}

impl XseqInstruction {
    fn read(rdr: &mut TableReader<'_>) -> Result<Self> {
        let inst = Self {
            argument_offset: rdr.read_u16()?,
            argument_count: rdr.read_u16()?,
            return_parameter: rdr.read_u16()?,
            instruction_type: rdr.read_u16()?,
        };
        // zero field, pointer sized
        rdr.read_pointer()?;
        Ok(inst)
    }
}

impl XseqArgument {
    fn read(rdr: &mut TableReader<'_>) -> Result<Self> {
        let argument_type = rdr.read_i32()?;
        rdr.skip_wide_padding(4)?;
        let value = rdr.read_u32()?;
        rdr.skip_wide_padding(4)?;
        Ok(Self {
            argument_type,
            value,
        })
    }
}

fn read_records<T>(
    table: &RawTable,
    name: &'static str,
    width: PointerWidth,
    read: impl Fn(&mut TableReader<'_>) -> Result<T>,
) -> Result<Vec<T>> {
    let mut rdr = TableReader::new(&table.data, name, width);
    (0..table.count).map(|_| read(&mut rdr)).collect()
}

fn record_name(strings: &StringTable, offset: u64) -> Result<String> {
    Ok(strings.read_str(offset as usize)?.into_owned())
}

/// Decode the function table, record every name in `symbols`, and return
/// the functions ordered by instruction range.
pub fn read_functions(
    table: &RawTable,
    strings: &StringTable,
    width: PointerWidth,
    symbols: &mut SymbolTable,
) -> Result<Vec<Function>> {
    let mut raw = read_records(table, "function", width, XseqFunction::read)?;
    raw.sort_by_key(|f| (f.instruction_offset, f.instruction_end_offset, f.hash));

    raw.into_iter()
        .map(|f| {
            let name = record_name(strings, f.name_offset)?;
            if !name.is_empty() {
                symbols.insert(f.hash, &name);
            }
            if f.instruction_end_offset < f.instruction_offset {
                log::warn!(
                    "function {:?} ends at {} before it starts at {}",
                    name,
                    f.instruction_end_offset,
                    f.instruction_offset
                );
            }
            Ok(Function {
                name,
                instruction_index: f.instruction_offset as usize,
                instruction_count: f.instruction_end_offset.saturating_sub(f.instruction_offset)
                    as usize,
                jump_index: f.jump_offset as usize,
                jump_count: f.jump_count as usize,
                parameter_count: f.parameter_count as usize,
                local_count: f.local_count as usize,
                object_count: f.object_count as usize,
            })
        })
        .collect()
}

/// Decode the jump table in stored order, recording names in `symbols`.
pub fn read_jumps(
    table: &RawTable,
    strings: &StringTable,
    width: PointerWidth,
    symbols: &mut SymbolTable,
) -> Result<Vec<Jump>> {
    read_records(table, "jump", width, XseqJump::read)?
        .into_iter()
        .map(|j| {
            let name = record_name(strings, j.name_offset)?;
            if !name.is_empty() {
                symbols.insert(j.hash, &name);
            }
            Ok(Jump {
                name,
                instruction_index: j.instruction_index as usize,
            })
        })
        .collect()
}

pub fn read_instructions(table: &RawTable, width: PointerWidth) -> Result<Vec<Instruction>> {
    Ok(read_records(table, "instruction", width, XseqInstruction::read)?
        .into_iter()
        .map(|i| Instruction {
            argument_index: i.argument_offset as usize,
            argument_count: i.argument_count as usize,
            return_parameter: i.return_parameter,
            opcode: i.instruction_type,
        })
        .collect())
}

pub fn read_raw_arguments(table: &RawTable, width: PointerWidth) -> Result<Vec<XseqArgument>> {
    read_records(table, "argument", width, XseqArgument::read)
}

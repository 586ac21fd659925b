use byteorder::{ByteOrder, LittleEndian};
use serde::Serialize;

use crate::error::{Result, XseqError};

pub const XSEQ_MAGIC: &[u8; 4] = b"XSEQ";
pub const HEADER_SIZE: usize = 24;

/// Fixed 24-byte header at the start of every container.
///
/// Layout (little-endian, all fields 16-bit after the magic):
/// - 0x00: magic `XSEQ`
/// - 0x04: function count, function offset
/// - 0x08: jump offset, jump count
/// - 0x0C: instruction offset, instruction count
/// - 0x10: argument offset, argument count
/// - 0x14: global variable count, string offset
///
/// Offsets are stored in 4-byte units.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct XseqHeader {
    pub function_count: u16,
    pub function_offset: u16,
    pub jump_offset: u16,
    pub jump_count: u16,
    pub instruction_offset: u16,
    pub instruction_count: u16,
    pub argument_offset: u16,
    pub argument_count: u16,
    pub global_variable_count: u16,
    pub string_offset: u16,
}

/// Byte offset and entry count of one table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct TableLocation {
    pub offset: usize,
    pub count: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct TableLocations {
    pub function: TableLocation,
    pub jump: TableLocation,
    pub instruction: TableLocation,
    pub argument: TableLocation,
    pub string_offset: usize,
}

impl XseqHeader {
    /// Parse the header. Only the first [`HEADER_SIZE`] bytes are touched;
    /// the magic is checked before anything else.
    pub fn parse(data: &[u8]) -> Result<Self> {
        let mut found = [0u8; 4];
        let n = data.len().min(4);
        found[..n].copy_from_slice(&data[..n]);
        if &found != XSEQ_MAGIC {
            return Err(XseqError::InvalidMagic { found });
        }
        if data.len() < HEADER_SIZE {
            return Err(XseqError::InvalidLayout {
                reason: format!("file is {} bytes, header needs {}", data.len(), HEADER_SIZE),
            });
        }

        let field = |i: usize| LittleEndian::read_u16(&data[4 + i * 2..6 + i * 2]);
        Ok(Self {
            function_count: field(0),
            function_offset: field(1),
            jump_offset: field(2),
            jump_count: field(3),
            instruction_offset: field(4),
            instruction_count: field(5),
            argument_offset: field(6),
            argument_count: field(7),
            global_variable_count: field(8),
            string_offset: field(9),
        })
    }

    pub fn table_locations(&self) -> TableLocations {
        let loc = |offset: u16, count: u16| TableLocation {
            offset: (offset as usize) << 2,
            count: count as usize,
        };
        TableLocations {
            function: loc(self.function_offset, self.function_count),
            jump: loc(self.jump_offset, self.jump_count),
            instruction: loc(self.instruction_offset, self.instruction_count),
            argument: loc(self.argument_offset, self.argument_count),
            string_offset: (self.string_offset as usize) << 2,
        }
    }
}

impl TableLocations {
    pub fn tables(&self) -> [TableLocation; 4] {
        [self.function, self.jump, self.instruction, self.argument]
    }

    /// Offset where each table's stored bytes end: the next table's start,
    /// or the string table for the last one.
    pub fn ends(&self) -> [usize; 4] {
        [
            self.jump.offset,
            self.instruction.offset,
            self.argument.offset,
            self.string_offset,
        ]
    }

    /// Stored byte span of each table. Only meaningful after [`Self::validate`].
    pub fn spans(&self) -> [usize; 4] {
        let tables = self.tables();
        let ends = self.ends();
        [0, 1, 2, 3].map(|i| ends[i] - tables[i].offset)
    }

    /// Check that tables appear in order, start after the header and that
    /// the string table starts inside the file.
    pub fn validate(&self, file_len: usize) -> Result<()> {
        let mut prev = HEADER_SIZE;
        let names = ["function", "jump", "instruction", "argument", "string"];
        let offsets = [
            self.function.offset,
            self.jump.offset,
            self.instruction.offset,
            self.argument.offset,
            self.string_offset,
        ];
        for (name, offset) in names.iter().zip(offsets) {
            if offset < prev {
                return Err(XseqError::InvalidLayout {
                    reason: format!("{} table at 0x{:X} precedes 0x{:X}", name, offset, prev),
                });
            }
            prev = offset;
        }
        if self.string_offset > file_len {
            return Err(XseqError::InvalidLayout {
                reason: format!(
                    "string table at 0x{:X} is past the end of the file (0x{:X})",
                    self.string_offset, file_len
                ),
            });
        }
        Ok(())
    }
}

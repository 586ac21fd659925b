use serde::Serialize;

use crate::error::{Result, XseqError};

/// Width of name offsets and padding fields inside table records.
///
/// Not declared anywhere in the container; inferred once per file and
/// applied to all four tables.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, strum::Display)]
pub enum PointerWidth {
    /// 4-byte name offsets and pointers.
    Narrow,
    /// 8-byte name offsets and pointers; the high bytes are padding.
    Wide,
}

impl PointerWidth {
    /// Candidate widths in detection order. The order is the tie-break when
    /// both widths fit a file.
    pub const CANDIDATES: [PointerWidth; 2] = [PointerWidth::Narrow, PointerWidth::Wide];

    pub fn function_entry_size(self) -> usize {
        match self {
            PointerWidth::Narrow => 0x14,
            PointerWidth::Wide => 0x18,
        }
    }

    pub fn jump_entry_size(self) -> usize {
        match self {
            PointerWidth::Narrow => 0x8,
            PointerWidth::Wide => 0x10,
        }
    }

    pub fn instruction_entry_size(self) -> usize {
        match self {
            PointerWidth::Narrow => 0xC,
            PointerWidth::Wide => 0x10,
        }
    }

    pub fn argument_entry_size(self) -> usize {
        match self {
            PointerWidth::Narrow => 0x8,
            PointerWidth::Wide => 0x10,
        }
    }

    /// Entry sizes of the four tables, in table order.
    pub fn entry_sizes(self) -> [usize; 4] {
        [
            self.function_entry_size(),
            self.jump_entry_size(),
            self.instruction_entry_size(),
            self.argument_entry_size(),
        ]
    }

    /// Size in bytes of a stored pointer (name offsets, zero fields).
    pub fn pointer_size(self) -> usize {
        match self {
            PointerWidth::Narrow => 4,
            PointerWidth::Wide => 8,
        }
    }
}

impl TryFrom<u8> for PointerWidth {
    type Error = XseqError;

    fn try_from(v: u8) -> Result<Self> {
        match v {
            0 => Ok(PointerWidth::Narrow),
            1 => Ok(PointerWidth::Wide),
            _ => Err(XseqError::UnknownPointerWidth(v)),
        }
    }
}

use std::io::Cursor;

use byteorder::{LittleEndian, ReadBytesExt};

use crate::error::{Result, XseqError};
use crate::format::PointerWidth;

/// Sequential little-endian reader over one table's bytes.
///
/// Every table gets its own reader; the position is never shared.
pub struct TableReader<'a> {
    cursor: Cursor<&'a [u8]>,
    table: &'static str,
    width: PointerWidth,
}

macro_rules! read_le {
    ($name:ident, $ty:ty) => {
        pub fn $name(&mut self) -> Result<$ty> {
            let offset = self.cursor.position();
            self.cursor
                .$name::<LittleEndian>()
                .map_err(|_| self.eof(offset))
        }
    };
}

impl<'a> TableReader<'a> {
    pub fn new(data: &'a [u8], table: &'static str, width: PointerWidth) -> Self {
        Self {
            cursor: Cursor::new(data),
            table,
            width,
        }
    }

    fn eof(&self, offset: u64) -> XseqError {
        XseqError::UnexpectedEof {
            table: self.table,
            offset,
        }
    }

    read_le!(read_u16, u16);
    read_le!(read_u32, u32);
    read_le!(read_i32, i32);

    /// Read a pointer-sized field (name offset or zero field).
    pub fn read_pointer(&mut self) -> Result<u64> {
        let offset = self.cursor.position();
        self.cursor
            .read_uint::<LittleEndian>(self.width.pointer_size())
            .map_err(|_| self.eof(offset))
    }

    /// Skip padding that only exists in wide records.
    pub fn skip_wide_padding(&mut self, len: u64) -> Result<()> {
        if self.width == PointerWidth::Wide {
            self.skip(len)?;
        }
        Ok(())
    }

    pub fn skip(&mut self, len: u64) -> Result<()> {
        let offset = self.cursor.position();
        let end = offset + len;
        if end > self.cursor.get_ref().len() as u64 {
            return Err(self.eof(offset));
        }
        self.cursor.set_position(end);
        Ok(())
    }
}

use std::borrow::Cow;

use super::compression::Decompress;
use super::header::{TableLocation, TableLocations};
use crate::error::{Result, XseqError};
use crate::nls::Nls;

/// Bytes backing one record table, decompressed when needed and truncated
/// to a multiple of 4.
#[derive(Debug, Clone, Default)]
pub struct RawTable {
    pub count: usize,
    pub data: Vec<u8>,
}

/// NUL-terminated strings addressed by byte offset.
#[derive(Debug, Clone, Default)]
pub struct StringTable {
    data: Vec<u8>,
    nls: Nls,
}

impl StringTable {
    pub fn new(data: Vec<u8>, nls: Nls) -> Self {
        Self { data, nls }
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// Read the string starting at `offset`.
    ///
    /// An empty table yields `""` for every offset. Otherwise the terminator
    /// must be found inside the table.
    pub fn read_str(&self, offset: usize) -> Result<Cow<'_, str>> {
        if self.data.is_empty() {
            return Ok(Cow::Borrowed(""));
        }
        let tail = self
            .data
            .get(offset..)
            .ok_or(XseqError::TruncatedString { offset })?;
        let end = tail
            .iter()
            .position(|&b| b == 0)
            .ok_or(XseqError::TruncatedString { offset })?;
        Ok(self.nls.decode(&tail[..end]))
    }
}

/// The four record tables and the string table of one container.
#[derive(Debug, Clone)]
pub struct ScriptContainer {
    pub functions: RawTable,
    pub jumps: RawTable,
    pub instructions: RawTable,
    pub arguments: RawTable,
    pub strings: StringTable,
    pub compressed: bool,
}

impl ScriptContainer {
    /// Cut the tables out of `data`, decompressing each one when
    /// `compressed` is set. `locations` must already be validated against
    /// `data.len()`.
    pub fn load(
        data: &[u8],
        locations: &TableLocations,
        compressed: bool,
        decompressor: &dyn Decompress,
        nls: Nls,
    ) -> Result<Self> {
        let [functions, jumps, instructions, arguments] = locations.tables();
        let [function_end, jump_end, instruction_end, argument_end] = locations.ends();

        let read_table = |loc: TableLocation, end: usize| -> Result<RawTable> {
            let stored = &data[loc.offset..end];
            let mut bytes = if compressed {
                decompressor.decompress(stored)?
            } else {
                stored.to_vec()
            };
            while bytes.len() % 4 != 0 {
                bytes.pop();
            }
            Ok(RawTable {
                count: loc.count,
                data: bytes,
            })
        };

        let stored_strings = &data[locations.string_offset..];
        let strings = if compressed && !stored_strings.is_empty() {
            decompressor.decompress(stored_strings)?
        } else {
            stored_strings.to_vec()
        };

        let container = Self {
            functions: read_table(functions, function_end)?,
            jumps: read_table(jumps, jump_end)?,
            instructions: read_table(instructions, instruction_end)?,
            arguments: read_table(arguments, argument_end)?,
            strings: StringTable::new(strings, nls),
            compressed,
        };
        log::debug!(
            "tables: functions={}B jumps={}B instructions={}B arguments={}B strings={}B",
            container.functions.data.len(),
            container.jumps.data.len(),
            container.instructions.data.len(),
            container.arguments.data.len(),
            container.strings.len(),
        );
        Ok(container)
    }

    pub fn counts(&self) -> [usize; 4] {
        [
            self.functions.count,
            self.jumps.count,
            self.instructions.count,
            self.arguments.count,
        ]
    }

    pub fn lengths(&self) -> [usize; 4] {
        [
            self.functions.data.len(),
            self.jumps.data.len(),
            self.instructions.data.len(),
            self.arguments.data.len(),
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::format::compression::Level5Decompressor;

    #[test]
    fn read_strings() {
        let table = StringTable::new(b"f0\0loop_start\0".to_vec(), Nls::ShiftJIS);
        assert_eq!(table.read_str(0).unwrap(), "f0");
        assert_eq!(table.read_str(3).unwrap(), "loop_start");
        assert_eq!(table.read_str(4).unwrap(), "oop_start");
    }

    #[test]
    fn unterminated_string_is_reported() {
        let table = StringTable::new(b"abc\0def".to_vec(), Nls::ShiftJIS);
        assert!(matches!(
            table.read_str(4),
            Err(XseqError::TruncatedString { offset: 4 })
        ));
        assert!(matches!(
            table.read_str(100),
            Err(XseqError::TruncatedString { offset: 100 })
        ));
    }

    #[test]
    fn empty_string_table_yields_empty_strings() {
        let table = StringTable::default();
        assert_eq!(table.read_str(0).unwrap(), "");
        assert_eq!(table.read_str(42).unwrap(), "");
    }

    #[test]
    fn tables_are_truncated_to_4_bytes() {
        let at = |offset, count| TableLocation { offset, count };
        let locations = TableLocations {
            function: at(0, 0),
            jump: at(6, 0),
            instruction: at(8, 0),
            argument: at(8, 0),
            string_offset: 8,
        };
        let data = [1u8, 2, 3, 4, 5, 6, 7, 8];
        let container =
            ScriptContainer::load(&data, &locations, false, &Level5Decompressor, Nls::ShiftJIS)
                .unwrap();
        assert_eq!(container.functions.data, vec![1, 2, 3, 4]);
        assert!(container.jumps.data.is_empty());
        assert!(container.strings.is_empty());
    }

    #[test]
    fn decompressed_tables_are_truncated_to_4_bytes() {
        let at = |offset, count| TableLocation { offset, count };
        let locations = TableLocations {
            function: at(0, 1),
            jump: at(4, 0),
            instruction: at(8, 0),
            argument: at(12, 0),
            string_offset: 16,
        };
        let data = [1u8, 2, 3, 4, 5, 6, 7, 8, 9, 10, 11, 12, 13, 14, 15, 16, b'h', b'i', 0, 0];
        // Every table comes back 3 bytes past a 4-byte boundary.
        let decompressor = |stored: &[u8]| -> Result<Vec<u8>> {
            let mut out = stored.to_vec();
            out.extend_from_slice(&[0xEE; 3]);
            Ok(out)
        };
        let container =
            ScriptContainer::load(&data, &locations, true, &decompressor, Nls::ShiftJIS).unwrap();

        assert_eq!(container.functions.data, vec![1, 2, 3, 4]);
        assert_eq!(container.jumps.data, vec![5, 6, 7, 8]);
        assert_eq!(container.arguments.data, vec![13, 14, 15, 16]);
        assert_eq!(container.lengths(), [4, 4, 4, 4]);
        assert_eq!(container.strings.len(), 7);
        assert_eq!(container.strings.read_str(0).unwrap(), "hi");
    }
}

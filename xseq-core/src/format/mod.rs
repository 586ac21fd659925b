//! Container layout: header, table locations, format heuristics and table
//! loading.

pub mod compression;
pub mod detect;
pub mod header;
pub mod layout;
pub mod table;

pub use compression::{CompressionMethod, Decompress, Level5Decompressor};
pub use detect::{match_widths, tables_compressed, AmbiguityPolicy, Detection};
pub use header::{TableLocation, TableLocations, XseqHeader, HEADER_SIZE, XSEQ_MAGIC};
pub use layout::PointerWidth;
pub use table::{RawTable, ScriptContainer, StringTable};

use thiserror::Error;

/// Errors produced while decoding an XSEQ container or rendering it.
///
/// Detection-stage variants (`InvalidMagic`, `InvalidLayout`,
/// `FormatDetection`, `AmbiguousFormat`) abort the whole decode: no partial
/// program is ever returned.
#[derive(Debug, Error)]
pub enum XseqError {
    #[error("wrong xq format, got: {found:?}, expected: b\"XSEQ\"")]
    InvalidMagic { found: [u8; 4] },

    #[error("invalid table layout: {reason}")]
    InvalidLayout { reason: String },

    #[error("could not detect pointer width: {reason}")]
    FormatDetection { reason: String },

    #[error("table sizes match both pointer widths")]
    AmbiguousFormat,

    #[error("unknown pointer width {0}")]
    UnknownPointerWidth(u8),

    #[error("string at offset 0x{offset:X} is not NUL-terminated before the end of the string table")]
    TruncatedString { offset: usize },

    #[error("unexpected end of {table} table at offset 0x{offset:X}")]
    UnexpectedEof { table: &'static str, offset: u64 },

    #[error("decompression failed: {reason}")]
    Decompression { reason: String },

    #[error("malformed instruction {index}: {reason}")]
    MalformedInstruction { index: usize, reason: String },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, XseqError>;

use serde::{Deserialize, Serialize};

use super::argument::{resolve_arguments, Argument};
use super::entity::{
    read_functions, read_instructions, read_jumps, read_raw_arguments, Function, Instruction, Jump,
};
use super::symbols::SymbolCaches;
use crate::error::Result;
use crate::format::{
    match_widths, tables_compressed, AmbiguityPolicy, Decompress, Level5Decompressor, PointerWidth,
    ScriptContainer, XseqHeader,
};
use crate::nls::Nls;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DecodeOptions {
    /// Encoding of names and string arguments.
    pub nls: Nls,
    pub ambiguity: AmbiguityPolicy,
}

/// Everything decoded from one container. Read-only after construction.
#[derive(Debug, Clone)]
pub struct ScriptProgram {
    pub width: PointerWidth,
    pub compressed: bool,
    pub global_variable_count: usize,
    pub functions: Vec<Function>,
    pub jumps: Vec<Jump>,
    pub instructions: Vec<Instruction>,
    pub arguments: Vec<Argument>,
    /// Symbol caches built while decoding this container.
    pub symbols: SymbolCaches,
}

/// One decode of one container.
///
/// The session owns the symbol caches; [`DecodeSession::decode`] consumes
/// it, so names recorded for one file never leak into another.
pub struct DecodeSession<D = Level5Decompressor> {
    options: DecodeOptions,
    decompressor: D,
    symbols: SymbolCaches,
}

impl DecodeSession {
    pub fn new(options: DecodeOptions) -> Self {
        Self::with_decompressor(options, Level5Decompressor)
    }
}

impl<D: Decompress> DecodeSession<D> {
    pub fn with_decompressor(options: DecodeOptions, decompressor: D) -> Self {
        Self {
            options,
            decompressor,
            symbols: SymbolCaches::default(),
        }
    }

    pub fn decode(mut self, data: &[u8]) -> Result<ScriptProgram> {
        let header = XseqHeader::parse(data)?;
        let locations = header.table_locations();
        locations.validate(data.len())?;

        let compressed = tables_compressed(&locations);
        let container = ScriptContainer::load(
            data,
            &locations,
            compressed,
            &self.decompressor,
            self.options.nls,
        )?;

        let width = match_widths(container.counts(), container.lengths())
            .resolve(self.options.ambiguity)?;
        log::debug!("pointer width: {}, compressed: {}", width, compressed);

        let strings = &container.strings;
        let functions = read_functions(
            &container.functions,
            strings,
            width,
            &mut self.symbols.functions,
        )?;
        let jumps = read_jumps(&container.jumps, strings, width, &mut self.symbols.jumps)?;
        let instructions = read_instructions(&container.instructions, width)?;
        let raw_arguments = read_raw_arguments(&container.arguments, width)?;
        let arguments = resolve_arguments(&raw_arguments, &instructions, &self.symbols, strings)?;

        Ok(ScriptProgram {
            width,
            compressed,
            global_variable_count: header.global_variable_count as usize,
            functions,
            jumps,
            instructions,
            arguments,
            symbols: self.symbols,
        })
    }
}

/// Decode a container with default options and Level5 decompression.
pub fn open_xseq(data: &[u8]) -> Result<ScriptProgram> {
    DecodeSession::new(DecodeOptions::default()).decode(data)
}

//! Synthetic container builder for tests.

use std::collections::HashMap;
use std::io::Write;
use std::ops::Range;

use flate2::write::ZlibEncoder;
use flate2::Compression;

use crate::format::{PointerWidth, XSEQ_MAGIC};

/// How the builder stores each table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Packing {
    Raw,
    /// Level5 header with method 0.
    Stored,
    /// Level5 header with method 5.
    ZLib,
}

#[derive(Debug, Clone, Copy)]
pub enum TestArg<'a> {
    Int(i32),
    Hash(u16),
    Float(f32),
    Var(u32),
    Str(&'a str),
    TaggedStr(&'a str),
    Raw(i32, u32),
}

pub struct XseqBuilder {
    width: PointerWidth,
    packing: Packing,
    tables: [Vec<u8>; 4],
    counts: [u16; 4],
    strings: Vec<u8>,
    interned: HashMap<String, u32>,
    globals: u16,
}

impl XseqBuilder {
    pub fn new(width: PointerWidth, packing: Packing) -> Self {
        Self {
            width,
            packing,
            tables: Default::default(),
            counts: [0; 4],
            strings: Vec::new(),
            interned: HashMap::new(),
            globals: 0,
        }
    }

    fn intern(&mut self, s: &str) -> u32 {
        if let Some(&off) = self.interned.get(s) {
            return off;
        }
        let off = self.strings.len() as u32;
        self.strings.extend_from_slice(s.as_bytes());
        self.strings.push(0);
        self.interned.insert(s.to_string(), off);
        off
    }

    fn pointer(&self, out: &mut Vec<u8>, v: u32) {
        match self.width {
            PointerWidth::Narrow => out.extend_from_slice(&v.to_le_bytes()),
            PointerWidth::Wide => out.extend_from_slice(&(v as u64).to_le_bytes()),
        }
    }

    fn padding(&self, out: &mut Vec<u8>) {
        if self.width == PointerWidth::Wide {
            out.extend_from_slice(&[0; 4]);
        }
    }

    fn push(&mut self, table: usize, record: Vec<u8>) {
        self.tables[table].extend(record);
        self.counts[table] += 1;
    }

    pub fn globals(mut self, count: u16) -> Self {
        self.globals = count;
        self
    }

    pub fn function(mut self, name: &str, hash: u16, range: Range<u16>, params: u16) -> Self {
        let name = self.intern(name);
        let mut rec = Vec::new();
        self.pointer(&mut rec, name);
        for v in [hash, range.start, range.end, 0, 0, 0, 0, params] {
            rec.extend_from_slice(&v.to_le_bytes());
        }
        self.push(0, rec);
        self
    }

    pub fn jump(mut self, name: &str, hash: u16, index: u16) -> Self {
        let name = self.intern(name);
        let mut rec = Vec::new();
        self.pointer(&mut rec, name);
        rec.extend_from_slice(&hash.to_le_bytes());
        rec.extend_from_slice(&index.to_le_bytes());
        self.padding(&mut rec);
        self.push(1, rec);
        self
    }

    pub fn instruction(mut self, ret: u16, opcode: u16, args: &[TestArg<'_>]) -> Self {
        let mut rec = Vec::new();
        for v in [self.counts[3], args.len() as u16, ret, opcode] {
            rec.extend_from_slice(&v.to_le_bytes());
        }
        self.pointer(&mut rec, 0);
        self.push(2, rec);

        for arg in args {
            let (ty, value) = match *arg {
                TestArg::Int(v) => (1, v as u32),
                TestArg::Hash(h) => (2, h as u32),
                TestArg::Float(f) => (3, f.to_bits()),
                TestArg::Var(v) => (4, v),
                TestArg::Str(s) => (24, self.intern(s)),
                TestArg::TaggedStr(s) => (25, self.intern(s)),
                TestArg::Raw(ty, value) => (ty, value),
            };
            let mut rec = (ty as i32).to_le_bytes().to_vec();
            self.padding(&mut rec);
            rec.extend_from_slice(&value.to_le_bytes());
            self.padding(&mut rec);
            self.push(3, rec);
        }
        self
    }

    fn pack(&self, payload: &[u8]) -> Vec<u8> {
        let (method, body) = match self.packing {
            Packing::Raw => return payload.to_vec(),
            Packing::Stored => (0u32, payload.to_vec()),
            Packing::ZLib => {
                let mut enc = ZlibEncoder::new(Vec::new(), Compression::default());
                enc.write_all(payload).unwrap();
                (5u32, enc.finish().unwrap())
            }
        };
        let mut out = ((payload.len() as u32) << 3 | method).to_le_bytes().to_vec();
        out.extend(body);
        while out.len() % 4 != 0 {
            out.push(0);
        }
        out
    }

    pub fn build(&self) -> Vec<u8> {
        let stored = self.tables.clone().map(|t| self.pack(&t));
        let strings = self.pack(&self.strings);

        let mut offsets = [0usize; 5];
        let mut cursor = 24;
        for (i, table) in stored.iter().enumerate() {
            offsets[i] = cursor;
            cursor += table.len();
        }
        offsets[4] = cursor;

        let mut out = XSEQ_MAGIC.to_vec();
        let unit = |off: usize| (off >> 2) as u16;
        for v in [
            self.counts[0],
            unit(offsets[0]),
            unit(offsets[1]),
            self.counts[1],
            unit(offsets[2]),
            self.counts[2],
            unit(offsets[3]),
            self.counts[3],
            self.globals,
            unit(offsets[4]),
        ] {
            out.extend_from_slice(&v.to_le_bytes());
        }
        for table in stored {
            out.extend(table);
        }
        out.extend(strings);
        out
    }
}

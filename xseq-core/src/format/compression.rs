//! The decompression seam and a Level5 implementation of it.
//!
//! The decoder only decides *whether* tables are compressed; turning one
//! table's stored bytes into plain bytes is delegated to a [`Decompress`]
//! implementation.

use std::io::Read;

use byteorder::{ByteOrder, LittleEndian};
use flate2::read::ZlibDecoder;

use crate::error::{Result, XseqError};

pub trait Decompress {
    /// Decompress one table's stored bytes.
    fn decompress(&self, data: &[u8]) -> Result<Vec<u8>>;
}

impl<F> Decompress for F
where
    F: Fn(&[u8]) -> Result<Vec<u8>>,
{
    fn decompress(&self, data: &[u8]) -> Result<Vec<u8>> {
        self(data)
    }
}

/// Method stored in the low 3 bits of a Level5 compression header.
#[derive(Debug, Clone, Copy, PartialEq, Eq, strum::Display)]
pub enum CompressionMethod {
    None,
    Lz10,
    Huffman4Bit,
    Huffman8Bit,
    Rle,
    ZLib,
}

impl TryFrom<u32> for CompressionMethod {
    type Error = XseqError;

    fn try_from(v: u32) -> Result<Self> {
        match v {
            0 => Ok(CompressionMethod::None),
            1 => Ok(CompressionMethod::Lz10),
            2 => Ok(CompressionMethod::Huffman4Bit),
            3 => Ok(CompressionMethod::Huffman8Bit),
            4 => Ok(CompressionMethod::Rle),
            5 => Ok(CompressionMethod::ZLib),
            _ => Err(corrupt(format!("unknown Level5 method {}", v))),
        }
    }
}

/// Level5 container compression.
///
/// Layout: a little-endian u32 header (`method | decompressed_size << 3`)
/// followed by the method's payload. A bare zlib stream without the Level5
/// header is accepted as well.
#[derive(Debug, Clone, Copy, Default)]
pub struct Level5Decompressor;

impl Decompress for Level5Decompressor {
    fn decompress(&self, data: &[u8]) -> Result<Vec<u8>> {
        if data.len() < 4 {
            return Err(corrupt(format!("{} bytes is too short for a header", data.len())));
        }

        let word = LittleEndian::read_u32(&data[..4]);
        let size = (word >> 3) as usize;
        let body = &data[4..];

        let method = match CompressionMethod::try_from(word & 7) {
            Ok(CompressionMethod::None) if size > body.len() && is_zlib_stream(data) => {
                return inflate(data);
            }
            Err(_) if is_zlib_stream(data) => return inflate(data),
            other => other?,
        };
        log::debug!("level5 {} -> {} bytes", method, size);

        let out = match method {
            CompressionMethod::None => {
                if size > body.len() {
                    return Err(corrupt(format!(
                        "stored size {} exceeds {} available bytes",
                        size,
                        body.len()
                    )));
                }
                body[..size].to_vec()
            }
            CompressionMethod::Lz10 => lz10(body, size)?,
            CompressionMethod::Huffman4Bit => huffman(data, size, 4)?,
            CompressionMethod::Huffman8Bit => huffman(data, size, 8)?,
            CompressionMethod::Rle => rle(body, size)?,
            CompressionMethod::ZLib => {
                let out = inflate(body)?;
                if out.len() != size {
                    log::warn!("zlib produced {} bytes, header says {}", out.len(), size);
                }
                out
            }
        };

        Ok(out)
    }
}

fn corrupt(reason: String) -> XseqError {
    XseqError::Decompression { reason }
}

fn byte_at(data: &[u8], pos: usize) -> Result<u8> {
    data.get(pos)
        .copied()
        .ok_or_else(|| corrupt(format!("input ended at 0x{:X}", pos)))
}

fn is_zlib_stream(data: &[u8]) -> bool {
    match data {
        [cmf, flg, ..] => cmf & 0x0F == 8 && (u16::from(*cmf) << 8 | u16::from(*flg)) % 31 == 0,
        _ => false,
    }
}

fn inflate(data: &[u8]) -> Result<Vec<u8>> {
    let mut out = Vec::new();
    ZlibDecoder::new(data)
        .read_to_end(&mut out)
        .map_err(|e| corrupt(format!("zlib: {}", e)))?;
    Ok(out)
}

fn lz10(body: &[u8], size: usize) -> Result<Vec<u8>> {
    let mut out = Vec::with_capacity(size);
    let mut pos = 0;

    while out.len() < size {
        let flags = byte_at(body, pos)?;
        pos += 1;

        for bit in (0..8).rev() {
            if out.len() >= size {
                break;
            }
            if (flags >> bit) & 1 == 0 {
                out.push(byte_at(body, pos)?);
                pos += 1;
                continue;
            }

            let b0 = byte_at(body, pos)?;
            let b1 = byte_at(body, pos + 1)?;
            pos += 2;

            let len = (b0 >> 4) as usize + 3;
            let disp = (((b0 & 0x0F) as usize) << 8 | b1 as usize) + 1;
            if disp > out.len() {
                return Err(corrupt(format!(
                    "back-reference {} before start of output ({} bytes)",
                    disp,
                    out.len()
                )));
            }
            for _ in 0..len {
                let v = out[out.len() - disp];
                out.push(v);
            }
        }
    }

    out.truncate(size);
    Ok(out)
}

fn rle(body: &[u8], size: usize) -> Result<Vec<u8>> {
    let mut out = Vec::with_capacity(size);
    let mut pos = 0;

    while out.len() < size {
        let flag = byte_at(body, pos)?;
        pos += 1;

        if flag & 0x80 != 0 {
            let len = (flag & 0x7F) as usize + 3;
            let v = byte_at(body, pos)?;
            pos += 1;
            out.resize(out.len() + len, v);
        } else {
            let len = (flag & 0x7F) as usize + 1;
            let run = body
                .get(pos..pos + len)
                .ok_or_else(|| corrupt(format!("literal run at 0x{:X} overruns input", pos)))?;
            out.extend_from_slice(run);
            pos += len;
        }
    }

    out.truncate(size);
    Ok(out)
}

/// Huffman payload. `data` still includes the 4-byte header: the tree size
/// byte sits at 4 and the root node at 5. Bits are read MSB first from
/// little-endian u32 words; 4-bit symbols fill the low nibble first.
fn huffman(data: &[u8], size: usize, symbol_bits: u32) -> Result<Vec<u8>> {
    const ROOT: usize = 5;

    let tree_size = byte_at(data, 4)? as usize;
    let mut pos = 4 + (tree_size + 1) * 2;
    let mut out = Vec::with_capacity(size);
    let mut node = ROOT;
    let mut low_nibble: Option<u8> = None;

    while out.len() < size {
        let word = data
            .get(pos..pos + 4)
            .map(LittleEndian::read_u32)
            .ok_or_else(|| corrupt(format!("bit stream ended at 0x{:X}", pos)))?;
        pos += 4;

        for bit in (0..32).rev() {
            let dir = ((word >> bit) & 1) as usize;
            let value = byte_at(data, node)?;
            let child = (node & !1) + ((value & 0x3F) as usize) * 2 + 2 + dir;
            let leaf_mask = if dir == 0 { 0x80 } else { 0x40 };

            if value & leaf_mask == 0 {
                node = child;
                continue;
            }

            let symbol = byte_at(data, child)?;
            node = ROOT;
            if symbol_bits == 8 {
                out.push(symbol);
            } else {
                match low_nibble.take() {
                    None => low_nibble = Some(symbol & 0x0F),
                    Some(lo) => out.push(lo | (symbol & 0x0F) << 4),
                }
            }
            if out.len() >= size {
                break;
            }
        }
    }

    Ok(out)
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use flate2::write::ZlibEncoder;
    use flate2::Compression;

    use super::*;

    fn header(method: u32, size: usize) -> Vec<u8> {
        ((size as u32) << 3 | method).to_le_bytes().to_vec()
    }

    #[test]
    fn stored() {
        let mut data = header(0, 3);
        data.extend_from_slice(&[1, 2, 3, 0]);
        assert_eq!(Level5Decompressor.decompress(&data).unwrap(), vec![1, 2, 3]);
    }

    #[test]
    fn lz10_back_reference() {
        let mut data = header(1, 8);
        data.extend_from_slice(&[0x20, b'a', b'b', 0x30, 0x01]);
        assert_eq!(Level5Decompressor.decompress(&data).unwrap(), b"abababab");
    }

    #[test]
    fn lz10_rejects_reference_before_start() {
        let mut data = header(1, 8);
        data.extend_from_slice(&[0x80, 0x30, 0x01]);
        assert!(matches!(
            Level5Decompressor.decompress(&data),
            Err(XseqError::Decompression { .. })
        ));
    }

    #[test]
    fn rle_runs_and_literals() {
        let mut data = header(4, 7);
        data.extend_from_slice(&[0x81, b'z', 0x02, b'a', b'b', b'c']);
        assert_eq!(Level5Decompressor.decompress(&data).unwrap(), b"zzzzabc");
    }

    #[test]
    fn huffman_8bit() {
        let mut data = header(3, 4);
        data.extend_from_slice(&[0x01, 0xC0, b'A', b'B']);
        data.extend_from_slice(&0x6000_0000u32.to_le_bytes());
        assert_eq!(Level5Decompressor.decompress(&data).unwrap(), b"ABBA");
    }

    #[test]
    fn huffman_4bit_low_nibble_first() {
        let mut data = header(2, 1);
        data.extend_from_slice(&[0x01, 0xC0, 0x01, 0x02]);
        data.extend_from_slice(&0x4000_0000u32.to_le_bytes());
        assert_eq!(Level5Decompressor.decompress(&data).unwrap(), vec![0x21]);
    }

    #[test]
    fn zlib_with_and_without_header() {
        let plain = b"XSEQ tables compress well, tables compress well".to_vec();
        let mut enc = ZlibEncoder::new(Vec::new(), Compression::default());
        enc.write_all(&plain).unwrap();
        let stream = enc.finish().unwrap();

        let mut data = header(5, plain.len());
        data.extend_from_slice(&stream);
        assert_eq!(Level5Decompressor.decompress(&data).unwrap(), plain);
        assert_eq!(Level5Decompressor.decompress(&stream).unwrap(), plain);
    }

    #[test]
    fn closures_are_decompressors() {
        let identity = |data: &[u8]| -> Result<Vec<u8>> { Ok(data.to_vec()) };
        assert_eq!(identity.decompress(&[7, 8]).unwrap(), vec![7, 8]);
    }
}

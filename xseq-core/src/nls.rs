use std::borrow::Cow;
use std::str::FromStr;

use anyhow::{anyhow, Result};
use encoding_rs::{Encoding, GBK, SHIFT_JIS, UTF_8};
use serde::{Deserialize, Serialize};

/// Native 8-bit text encoding of the strings stored in a script.
///
/// Names decoded with it are used as symbol-cache keys and label text, so
/// the bytes are decoded as-is and never transcoded through a different
/// default.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum Nls {
    #[default]
    ShiftJIS,
    GBK,
    UTF8,
}

impl FromStr for Nls {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        let lower = s.to_ascii_lowercase();
        match lower.as_str() {
            "sjis" | "shift_jis" | "shift-jis" => Ok(Nls::ShiftJIS),
            "gbk" => Ok(Nls::GBK),
            "utf8" | "utf-8" => Ok(Nls::UTF8),
            _ => Err(anyhow!("unknown NLS: {}", s)),
        }
    }
}

impl Nls {
    fn encoding(self) -> &'static Encoding {
        match self {
            Nls::ShiftJIS => SHIFT_JIS,
            Nls::GBK => GBK,
            Nls::UTF8 => UTF_8,
        }
    }

    /// Decode raw bytes (without the NUL terminator).
    pub fn decode<'a>(self, raw: &'a [u8]) -> Cow<'a, str> {
        let (s, had_err) = self.encoding().decode_without_bom_handling(raw);
        if had_err {
            log::warn!("{:?} decode error in {:02X?}", self, raw);
        }
        s
    }
}

use std::collections::{BTreeMap, BTreeSet};

/// Names seen for each 16-bit symbol hash.
///
/// Hash collisions are real, so every hash keeps a set of names. Lookups
/// return the smallest name, which keeps substitution deterministic.
#[derive(Debug, Clone, Default)]
pub struct SymbolTable {
    names: BTreeMap<u16, BTreeSet<String>>,
}

impl SymbolTable {
    pub fn insert(&mut self, hash: u16, name: &str) {
        self.names.entry(hash).or_default().insert(name.to_string());
    }

    /// Look up a raw 32-bit argument payload. Payloads wider than 16 bits
    /// never match.
    pub fn resolve(&self, hash: u32) -> Option<&str> {
        let hash = u16::try_from(hash).ok()?;
        self.names
            .get(&hash)
            .and_then(|names| names.iter().next())
            .map(String::as_str)
    }

    /// Hashes shared by more than one name, with every name in byte order.
    pub fn collisions(&self) -> impl Iterator<Item = (u16, Vec<&str>)> {
        self.names
            .iter()
            .filter(|(_, names)| names.len() > 1)
            .map(|(hash, names)| (*hash, names.iter().map(String::as_str).collect()))
    }
}

/// Function and jump symbol caches of one decoding session.
#[derive(Debug, Clone, Default)]
pub struct SymbolCaches {
    pub functions: SymbolTable,
    pub jumps: SymbolTable,
}

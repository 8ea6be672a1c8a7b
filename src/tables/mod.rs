//! Character/code tables and the internal code type
//!
//! The surrounding keystroke engine encodes every typed character as a
//! 32-bit internal code. Three disjoint kinds exist: codes for characters
//! present verbatim in the base character table, codes for tone/mark-bearing
//! characters selected from the currently active code table, and raw Unicode
//! scalars for everything the tables do not know about. The original engine
//! distinguished these with reserved mask bits on a raw integer; here they
//! are an explicit sum type so the categories cannot collide.

pub mod convert;

pub use convert::convert;

use log::warn;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use std::path::Path;

use crate::exceptions::{MacroError, Result};

/// One character of the engine's typing alphabet
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Code {
    /// Character present verbatim in the base character table
    Plain(u32),
    /// Tone/mark-bearing character, value taken from the active code table
    Table(u32),
    /// Unrecognized character, carried as its raw Unicode scalar
    Pure(u32),
}

impl Code {
    /// Raw 32-bit value without the category
    pub fn value(self) -> u32 {
        match self {
            Code::Plain(v) | Code::Table(v) | Code::Pure(v) => v,
        }
    }
}

/// Injected character/code database
///
/// `plain` maps characters straight to their codes. `marked` holds one map
/// per code table: base code to the ordered list of tone/mark variants for
/// that base. Table 0 is the canonical (Unicode) table and is the one that
/// gets scanned during resolution; the active table supplies the value that
/// is actually emitted, looked up at the same variant position.
#[derive(Debug, Clone, Default)]
pub struct CodeTables {
    plain: HashMap<char, u32>,
    marked: Vec<BTreeMap<u32, Vec<u32>>>,
    active: usize,
}

impl CodeTables {
    /// Create tables from a plain map and per-table marked variant maps
    pub fn new(plain: HashMap<char, u32>, marked: Vec<BTreeMap<u32, Vec<u32>>>) -> Self {
        Self {
            plain,
            marked,
            active: 0,
        }
    }

    /// Currently active code table index
    pub fn active_table(&self) -> usize {
        self.active
    }

    /// Switch the active code table
    ///
    /// An out-of-range index is kept but resolution falls back to the
    /// canonical table's values until a valid index is set again.
    pub fn set_active_table(&mut self, index: usize) {
        if index >= self.marked.len() && !self.marked.is_empty() {
            warn!(
                "Active table index {} out of range ({} tables), falling back to canonical values",
                index,
                self.marked.len()
            );
        }
        self.active = index;
    }

    /// Resolve one character to its internal code
    ///
    /// Strict priority: base character table first, then a scan of the
    /// canonical marked table (first structural match wins, in the table's
    /// own key order), then the raw scalar as a pure character.
    pub fn resolve(&self, ch: char) -> Code {
        if let Some(&code) = self.plain.get(&ch) {
            return Code::Plain(code);
        }

        let scalar = ch as u32;
        if let Some(canonical) = self.marked.first() {
            for (&base, variants) in canonical {
                if let Some(pos) = variants.iter().position(|&v| v == scalar) {
                    // The active table may be sparse; the canonical value
                    // keeps resolution total
                    let value = self
                        .marked
                        .get(self.active)
                        .and_then(|table| table.get(&base))
                        .and_then(|v| v.get(pos))
                        .copied()
                        .unwrap_or(scalar);
                    return Code::Table(value);
                }
            }
        }

        Code::Pure(scalar)
    }

    /// Load a table definition from a JSON file
    pub fn from_json_file(path: &Path) -> Result<Self> {
        let data = std::fs::read_to_string(path)?;
        Self::from_json_str(&data)
    }

    /// Load a table definition from a JSON string
    pub fn from_json_str(data: &str) -> Result<Self> {
        let spec: TableSetSpec = serde_json::from_str(data)?;
        Self::from_spec(spec)
    }

    /// Build tables from a parsed definition
    pub fn from_spec(spec: TableSetSpec) -> Result<Self> {
        let mut plain = HashMap::new();
        for (key, code) in spec.plain {
            let mut chars = key.chars();
            let ch = match (chars.next(), chars.next()) {
                (Some(ch), None) => ch,
                _ => {
                    return Err(MacroError::Generic(format!(
                        "Plain table key must be a single character: {key:?}"
                    )));
                }
            };
            plain.insert(ch, code);
        }

        let mut marked = Vec::with_capacity(spec.marked.len());
        for (index, table) in spec.marked.into_iter().enumerate() {
            let mut entries = BTreeMap::new();
            for (key, variants) in table {
                let base: u32 = key.parse().map_err(|_| {
                    MacroError::Generic(format!(
                        "Marked table {index} key must be a base code: {key:?}"
                    ))
                })?;
                entries.insert(base, variants);
            }
            marked.push(entries);
        }

        let mut tables = Self::new(plain, marked);
        tables.set_active_table(spec.active);
        Ok(tables)
    }
}

/// Serialized table definition - matches the JSON layout collaborators inject
#[derive(Debug, Serialize, Deserialize)]
pub struct TableSetSpec {
    /// Single-character keys mapped to plain codes
    #[serde(default)]
    pub plain: HashMap<String, u32>,
    /// One map per code table: base code (as string key) to variant values
    #[serde(default)]
    pub marked: Vec<HashMap<String, Vec<u32>>>,
    /// Initially active table index
    #[serde(default)]
    pub active: usize,
}

#[cfg(test)]
mod tests {
    use super::{Code, CodeTables};
    use std::collections::{BTreeMap, HashMap};

    fn sample_tables() -> CodeTables {
        let mut plain = HashMap::new();
        plain.insert('a', 10);
        plain.insert('b', 11);

        // Canonical table: base 10 has variants U+00E1, U+00E0
        let mut canonical = BTreeMap::new();
        canonical.insert(10, vec![0x00E1, 0x00E0]);
        // Second table re-encodes the same positions
        let mut legacy = BTreeMap::new();
        legacy.insert(10, vec![0xA1, 0xA0]);

        CodeTables::new(plain, vec![canonical, legacy])
    }

    #[test]
    fn test_plain_wins_over_marked() {
        let mut plain = HashMap::new();
        plain.insert('\u{00E1}', 42);
        let mut canonical = BTreeMap::new();
        canonical.insert(1, vec![0x00E1]);
        let tables = CodeTables::new(plain, vec![canonical]);

        assert_eq!(tables.resolve('\u{00E1}'), Code::Plain(42));
    }

    #[test]
    fn test_marked_resolution_uses_active_table() {
        let mut tables = sample_tables();
        assert_eq!(tables.resolve('\u{00E1}'), Code::Table(0x00E1));
        assert_eq!(tables.resolve('\u{00E0}'), Code::Table(0x00E0));

        tables.set_active_table(1);
        assert_eq!(tables.resolve('\u{00E1}'), Code::Table(0xA1));
        assert_eq!(tables.resolve('\u{00E0}'), Code::Table(0xA0));
    }

    #[test]
    fn test_pure_fallback() {
        let tables = sample_tables();
        assert_eq!(tables.resolve('!'), Code::Pure('!' as u32));
        assert_eq!(tables.resolve('字'), Code::Pure('字' as u32));
    }

    #[test]
    fn test_out_of_range_active_table_falls_back_to_canonical() {
        let mut tables = sample_tables();
        tables.set_active_table(7);
        assert_eq!(tables.resolve('\u{00E1}'), Code::Table(0x00E1));
    }

    #[test]
    fn test_code_categories_never_collide() {
        assert_ne!(Code::Plain(97), Code::Pure(97));
        assert_ne!(Code::Table(97), Code::Pure(97));
        assert_ne!(Code::Plain(97), Code::Table(97));
    }

    #[test]
    fn test_from_json_str() {
        let json = r#"{
            "plain": {"a": 10, "b": 11},
            "marked": [{"10": [225, 224]}, {"10": [161, 160]}],
            "active": 1
        }"#;
        let tables = CodeTables::from_json_str(json).unwrap();
        assert_eq!(tables.active_table(), 1);
        assert_eq!(tables.resolve('a'), Code::Plain(10));
        assert_eq!(tables.resolve('\u{00E1}'), Code::Table(161));
    }

    #[test]
    fn test_from_json_rejects_multichar_plain_key() {
        let json = r#"{"plain": {"ab": 1}, "marked": [], "active": 0}"#;
        assert!(CodeTables::from_json_str(json).is_err());
    }
}

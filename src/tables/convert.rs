//! Text to internal-code conversion
//!
//! This must agree exactly with the encoding the keystroke engine produces
//! live, otherwise macros added through the management UI would never match
//! what the user types.

use super::{Code, CodeTables};

/// Convert a text string to its internal code sequence
///
/// Each Unicode scalar resolves independently, in strict priority order:
/// plain table, then the canonical marked table (first match in key order),
/// then the raw scalar tagged as a pure character.
pub fn convert(text: &str, tables: &CodeTables) -> Vec<Code> {
    let mut out = Vec::with_capacity(text.len());
    for ch in text.chars() {
        out.push(tables.resolve(ch));
    }
    out
}

#[cfg(test)]
mod tests {
    use super::super::{Code, CodeTables};
    use super::convert;
    use std::collections::{BTreeMap, HashMap};

    fn tables() -> CodeTables {
        let mut plain = HashMap::new();
        plain.insert('v', 1);
        plain.insert('n', 2);
        let mut canonical = BTreeMap::new();
        canonical.insert(1, vec!['ǹ' as u32]);
        CodeTables::new(plain, vec![canonical])
    }

    #[test]
    fn test_convert_mixes_all_three_categories() {
        let codes = convert("vǹ!", &tables());
        assert_eq!(
            codes,
            vec![Code::Plain(1), Code::Table('ǹ' as u32), Code::Pure('!' as u32)]
        );
    }

    #[test]
    fn test_convert_empty_text() {
        assert!(convert("", &tables()).is_empty());
    }

    #[test]
    fn test_convert_is_deterministic() {
        let t = tables();
        assert_eq!(convert("vnǹ", &t), convert("vnǹ", &t));
    }

    #[test]
    fn test_first_structural_match_wins() {
        // Two bases register the same variant; the lower base key must win
        let mut canonical = BTreeMap::new();
        canonical.insert(5, vec![0x1EBF]);
        canonical.insert(9, vec![0x1EBF]);
        let mut alt = BTreeMap::new();
        alt.insert(5, vec![100]);
        alt.insert(9, vec![200]);
        let mut t = CodeTables::new(HashMap::new(), vec![canonical, alt]);
        t.set_active_table(1);

        assert_eq!(convert("\u{1EBF}", &t), vec![Code::Table(100)]);
    }
}

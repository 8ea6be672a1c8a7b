//! In-memory macro table and its persistence codecs
//!
//! Macros are keyed by the internal-code sequence of their trigger text, not
//! by the raw text: two spellings that encode to the same code sequence are
//! the same macro. Each entry caches the code sequence of its expansion
//! content; that cache is rederived from the content text after every
//! mutation and after every active-table switch.

pub mod binary;
pub mod textfile;

use log::{debug, trace};
use std::collections::BTreeMap;

use crate::tables::{Code, CodeTables, convert};

/// One macro definition
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MacroEntry {
    /// Trigger text as entered by the user
    pub trigger: String,
    /// Expansion text as entered by the user
    pub content: String,
    /// Cached code sequence of `content`, always `convert(content)` under
    /// the tables in effect at the last mutation or table switch
    pub content_codes: Vec<Code>,
}

/// Ordered trigger-key to macro mapping
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MacroStore {
    entries: BTreeMap<Vec<Code>, MacroEntry>,
}

impl MacroStore {
    /// Create an empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of macros
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// True if the store holds no macros
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Remove all macros
    pub fn clear(&mut self) {
        self.entries.clear();
    }

    /// Iterate entries in key order
    pub fn iter(&self) -> impl Iterator<Item = (&Vec<Code>, &MacroEntry)> {
        self.entries.iter()
    }

    /// Add a macro, or replace the content of the macro with the same
    /// derived trigger key
    ///
    /// Returns true when a new entry was created, false when an existing
    /// entry was updated. Both outcomes are success; a trigger collision
    /// always means replace.
    pub fn add_macro(&mut self, tables: &CodeTables, trigger: &str, content: &str) -> bool {
        let key = convert(trigger, tables);
        let content_codes = convert(content, tables);

        if let Some(entry) = self.entries.get_mut(&key) {
            debug!("Updating macro {:?}", trigger);
            entry.content = content.to_string();
            entry.content_codes = content_codes;
            false
        } else {
            debug!("Adding macro {:?} ({} codes)", trigger, key.len());
            self.entries.insert(
                key,
                MacroEntry {
                    trigger: trigger.to_string(),
                    content: content.to_string(),
                    content_codes,
                },
            );
            true
        }
    }

    /// Remove a macro by trigger text; returns whether one existed
    pub fn delete_macro(&mut self, tables: &CodeTables, trigger: &str) -> bool {
        let key = convert(trigger, tables);
        let removed = self.entries.remove(&key).is_some();
        debug!("Deleting macro {:?}: existed={}", trigger, removed);
        removed
    }

    /// True if a macro with this trigger text exists
    pub fn has_macro(&self, tables: &CodeTables, trigger: &str) -> bool {
        let key = convert(trigger, tables);
        self.entries.contains_key(&key)
    }

    /// Look up the cached content codes for a live candidate key
    ///
    /// The candidate comes straight from the keystroke engine and may have
    /// been encoded under a different active table; `remap` normalizes each
    /// code to the canonical form used as store keys before the lookup.
    pub fn find_macro<F>(&self, candidate: &[Code], remap: F) -> Option<&[Code]>
    where
        F: Fn(Code) -> Code,
    {
        let key: Vec<Code> = candidate.iter().map(|&c| remap(c)).collect();
        let hit = self.entries.get(&key);
        trace!("find_macro: {} codes, hit={}", candidate.len(), hit.is_some());
        hit.map(|entry| entry.content_codes.as_slice())
    }

    /// Enumerate all macros as (key, trigger, content), in key order
    pub fn get_all_macros(&self) -> Vec<(&[Code], &str, &str)> {
        self.entries
            .iter()
            .map(|(key, entry)| {
                (
                    key.as_slice(),
                    entry.trigger.as_str(),
                    entry.content.as_str(),
                )
            })
            .collect()
    }

    /// Rederive every entry's content codes after an active-table switch
    ///
    /// Keys are left untouched: macro identity is frozen at creation time,
    /// only the expansion payload re-encodes to match the new table.
    pub fn on_table_change(&mut self, tables: &CodeTables) {
        debug!(
            "Recomputing content codes for {} macros (active table {})",
            self.entries.len(),
            tables.active_table()
        );
        for entry in self.entries.values_mut() {
            entry.content_codes = convert(&entry.content, tables);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::MacroStore;
    use crate::tables::{Code, CodeTables, convert};
    use std::collections::{BTreeMap, HashMap};

    fn tables() -> CodeTables {
        let mut plain = HashMap::new();
        plain.insert('a', 10);
        plain.insert('A', 10); // case folds to the same code
        plain.insert('b', 11);
        let mut canonical = BTreeMap::new();
        canonical.insert(10, vec![0x00E1]);
        let mut legacy = BTreeMap::new();
        legacy.insert(10, vec![0xA1]);
        CodeTables::new(plain, vec![canonical, legacy])
    }

    #[test]
    fn test_add_then_edit_keeps_one_entry() {
        let t = tables();
        let mut store = MacroStore::new();
        assert!(store.add_macro(&t, "ab", "first"));
        assert!(!store.add_macro(&t, "ab", "second"));
        assert_eq!(store.len(), 1);

        let all = store.get_all_macros();
        assert_eq!(all[0].2, "second");
    }

    #[test]
    fn test_identity_is_code_sequence_not_text() {
        let t = tables();
        let mut store = MacroStore::new();
        store.add_macro(&t, "ab", "lower");
        // 'A' maps to the same plain code as 'a', so this is the same macro
        assert!(store.has_macro(&t, "Ab"));
        assert!(!store.add_macro(&t, "Ab", "upper"));
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn test_delete_then_lookup() {
        let t = tables();
        let mut store = MacroStore::new();
        store.add_macro(&t, "ab", "x");
        assert!(store.delete_macro(&t, "ab"));
        assert!(!store.has_macro(&t, "ab"));
        assert!(!store.delete_macro(&t, "ab"));
    }

    #[test]
    fn test_find_macro_with_remap() {
        let t = tables();
        let mut store = MacroStore::new();
        store.add_macro(&t, "a\u{00E1}", "hit");

        // Candidate carries a legacy-table code; remap normalizes it back
        let candidate = vec![Code::Plain(10), Code::Table(0xA1)];
        let remap = |c: Code| match c {
            Code::Table(0xA1) => Code::Table(0x00E1),
            other => other,
        };
        let found = store.find_macro(&candidate, remap);
        assert_eq!(found, Some(convert("hit", &t).as_slice()));

        // Without remapping the candidate misses
        assert!(store.find_macro(&candidate, |c| c).is_none());
    }

    #[test]
    fn test_table_change_recomputes_content_not_keys() {
        let mut t = tables();
        let mut store = MacroStore::new();
        store.add_macro(&t, "ab", "\u{00E1}");

        let key_before: Vec<Vec<Code>> = store.iter().map(|(k, _)| k.clone()).collect();

        t.set_active_table(1);
        store.on_table_change(&t);

        let key_after: Vec<Vec<Code>> = store.iter().map(|(k, _)| k.clone()).collect();
        assert_eq!(key_before, key_after);

        for (_, entry) in store.iter() {
            assert_eq!(entry.content_codes, convert(&entry.content, &t));
        }
        let (_, entry) = store.iter().next().unwrap();
        assert_eq!(entry.content_codes, vec![Code::Table(0xA1)]);
    }

    #[test]
    fn test_iteration_is_key_ordered() {
        let t = tables();
        let mut store = MacroStore::new();
        store.add_macro(&t, "b", "2");
        store.add_macro(&t, "a", "1");
        let triggers: Vec<&str> = store.get_all_macros().iter().map(|m| m.1).collect();
        // Plain(10) for "a" orders before Plain(11) for "b"
        assert_eq!(triggers, vec!["a", "b"]);
    }
}

//! Legacy colon-delimited text format
//!
//! Line 1 is a fixed header carried over from the legacy product, every
//! following line is `trigger:content`. Content may itself contain colons,
//! so parsing splits at the first `:` only.

use log::{debug, trace};
use std::io::Write;
use std::path::Path;

use super::MacroStore;
use crate::exceptions::{MacroError, Result};
use crate::tables::CodeTables;

/// Header line of the legacy macro file format
pub const FILE_HEADER: &str = ";Compatible OpenKey Macro Data file for UniKey*** version=1 ***";

/// How a text load treats existing entries
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadMode {
    /// Clear the store before loading
    Replace,
    /// Keep existing entries; loaded triggers that already exist are skipped
    Append,
}

/// Render a store to the text format
pub fn render(store: &MacroStore) -> String {
    let mut out = String::with_capacity(FILE_HEADER.len() + 1 + store.len() * 24);
    out.push_str(FILE_HEADER);
    out.push('\n');
    for (_, entry) in store.iter() {
        out.push_str(&entry.trigger);
        out.push(':');
        out.push_str(&entry.content);
        out.push('\n');
    }
    out
}

/// Parse text-format content into a store; returns how many macros were added
///
/// The first line is skipped unconditionally, lines without a `:` are
/// ignored, and the first occurrence of a trigger in this load wins - later
/// duplicate lines are dropped, not merged.
pub fn parse_into(
    store: &mut MacroStore,
    tables: &CodeTables,
    text: &str,
    mode: LoadMode,
) -> usize {
    if mode == LoadMode::Replace {
        store.clear();
    }

    let mut added = 0;
    for (lineno, line) in text.lines().enumerate() {
        if lineno == 0 {
            continue;
        }
        let Some((trigger, content)) = line.split_once(':') else {
            trace!("Skipping line {} without separator", lineno + 1);
            continue;
        };
        if store.has_macro(tables, trigger) {
            trace!("Skipping duplicate trigger {:?} on line {}", trigger, lineno + 1);
            continue;
        }
        store.add_macro(tables, trigger, content);
        added += 1;
    }
    added
}

/// Write a store to a text file, staged through a temp file in the same
/// directory so a crash never leaves a half-written macro file behind
pub fn save_to_path(store: &MacroStore, path: &Path) -> Result<()> {
    let dir = match path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p,
        _ => Path::new("."),
    };
    let mut staged = tempfile::NamedTempFile::new_in(dir)?;
    staged.write_all(render(store).as_bytes())?;
    staged
        .persist(path)
        .map_err(|e| MacroError::IoError(e.error))?;

    debug!("Saved {} macros to {:?}", store.len(), path);
    Ok(())
}

/// Load a text file into a store; returns how many macros were added
///
/// A missing or unopenable file is not an error here - the load is a no-op
/// and the caller decides whether absence matters.
pub fn load_from_path(
    store: &mut MacroStore,
    tables: &CodeTables,
    path: &Path,
    mode: LoadMode,
) -> Result<usize> {
    let raw = match std::fs::read(path) {
        Ok(raw) => raw,
        Err(e) => {
            debug!("Macro file {:?} unavailable ({}), nothing loaded", path, e);
            return Ok(0);
        }
    };

    let text = String::from_utf8_lossy(&raw);
    let added = parse_into(store, tables, &text, mode);
    debug!("Loaded {} macros from {:?} ({:?})", added, path, mode);
    Ok(added)
}

#[cfg(test)]
mod tests {
    use super::{FILE_HEADER, LoadMode, load_from_path, parse_into, render, save_to_path};
    use crate::store::MacroStore;
    use crate::tables::CodeTables;

    fn tables() -> CodeTables {
        CodeTables::default()
    }

    #[test]
    fn test_render_writes_header_and_lines() {
        let t = tables();
        let mut store = MacroStore::new();
        store.add_macro(&t, "brb", "be right back");
        let text = render(&store);
        assert_eq!(text, format!("{FILE_HEADER}\nbrb:be right back\n"));
    }

    #[test]
    fn test_colon_in_content_is_preserved() {
        let t = tables();
        let mut store = MacroStore::new();
        store.add_macro(&t, "time", "10:30");

        let text = render(&store);
        assert!(text.contains("time:10:30"));

        let mut loaded = MacroStore::new();
        parse_into(&mut loaded, &t, &text, LoadMode::Replace);
        assert_eq!(loaded.get_all_macros()[0].2, "10:30");
    }

    #[test]
    fn test_round_trip() {
        let t = tables();
        let mut store = MacroStore::new();
        store.add_macro(&t, "vn", "Việt Nam");
        store.add_macro(&t, "addr", "1 Lê Lợi, Quận 1");

        let mut loaded = MacroStore::new();
        parse_into(&mut loaded, &t, &render(&store), LoadMode::Replace);
        assert_eq!(loaded, store);
    }

    #[test]
    fn test_first_line_is_always_skipped() {
        let t = tables();
        let mut store = MacroStore::new();
        // No header; the first line is swallowed regardless of its content
        parse_into(&mut store, &t, "a:1\nb:2\n", LoadMode::Replace);
        assert_eq!(store.len(), 1);
        assert!(store.has_macro(&t, "b"));
    }

    #[test]
    fn test_lines_without_separator_are_ignored() {
        let t = tables();
        let mut store = MacroStore::new();
        let text = format!("{FILE_HEADER}\nnot a macro line\nok:yes\n");
        let added = parse_into(&mut store, &t, &text, LoadMode::Replace);
        assert_eq!(added, 1);
        assert!(store.has_macro(&t, "ok"));
    }

    #[test]
    fn test_append_keeps_first_duplicate() {
        let t = tables();
        let mut store = MacroStore::new();
        let text = format!("{FILE_HEADER}\ndup:first\ndup:second\n");
        parse_into(&mut store, &t, &text, LoadMode::Append);
        assert_eq!(store.len(), 1);
        assert_eq!(store.get_all_macros()[0].2, "first");
    }

    #[test]
    fn test_append_does_not_overwrite_existing() {
        let t = tables();
        let mut store = MacroStore::new();
        store.add_macro(&t, "sig", "existing");
        let text = format!("{FILE_HEADER}\nsig:from file\nnew:added\n");
        let added = parse_into(&mut store, &t, &text, LoadMode::Append);
        assert_eq!(added, 1);
        assert_eq!(store.len(), 2);
        assert!(store.get_all_macros().iter().any(|m| m.2 == "existing"));
    }

    #[test]
    fn test_replace_clears_previous_entries() {
        let t = tables();
        let mut store = MacroStore::new();
        store.add_macro(&t, "old", "gone");
        let text = format!("{FILE_HEADER}\nnew:kept\n");
        parse_into(&mut store, &t, &text, LoadMode::Replace);
        assert_eq!(store.len(), 1);
        assert!(!store.has_macro(&t, "old"));
    }

    #[test]
    fn test_missing_file_is_a_noop() {
        let t = tables();
        let dir = tempfile::tempdir().unwrap();
        let mut store = MacroStore::new();
        store.add_macro(&t, "keep", "me");

        let added = load_from_path(
            &mut store,
            &t,
            &dir.path().join("absent.txt"),
            LoadMode::Replace,
        )
        .unwrap();
        assert_eq!(added, 0);
        assert!(store.has_macro(&t, "keep"));
    }

    #[test]
    fn test_save_then_load_file() {
        let t = tables();
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("macros.txt");

        let mut store = MacroStore::new();
        store.add_macro(&t, "brb", "be right back");
        save_to_path(&store, &path).unwrap();

        let mut loaded = MacroStore::new();
        let added = load_from_path(&mut loaded, &t, &path, LoadMode::Replace).unwrap();
        assert_eq!(added, 1);
        assert_eq!(loaded, store);
    }
}

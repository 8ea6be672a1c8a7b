//! Compact binary persistence format (embedded storage blob)
//!
//! Layout, all integers little-endian:
//!
//! ```text
//! [u16 count]
//! per entry: [u8 triggerLen][triggerLen bytes][u16 contentLen][contentLen bytes]
//! ```
//!
//! The blob stores raw text only, never internal codes; keys and content
//! codes are rederived through the tables on load, so a blob written under
//! one active table loads correctly under another.

use log::{debug, trace};

use super::MacroStore;
use crate::exceptions::{MacroError, Result};
use crate::tables::CodeTables;

/// Widest trigger the 1-byte length field can carry
pub const MAX_TRIGGER_LEN: usize = u8::MAX as usize;
/// Widest content the 2-byte length field can carry
pub const MAX_CONTENT_LEN: usize = u16::MAX as usize;
/// Most entries the 2-byte count field can carry
pub const MAX_MACRO_COUNT: usize = u16::MAX as usize;

/// Size of the leading entry-count field
const COUNT_SIZE: usize = 2;
/// Smallest possible serialized entry (empty trigger, empty content)
const MIN_ENTRY_SIZE: usize = 3;

/// Serialize a store to the binary blob
///
/// Oversized fields fail explicitly; the legacy writer silently truncated
/// its length fields instead, corrupting the blob.
pub fn encode(store: &MacroStore) -> Result<Vec<u8>> {
    if store.len() > MAX_MACRO_COUNT {
        return Err(MacroError::StoreTooLarge(store.len()));
    }

    let mut out = Vec::with_capacity(COUNT_SIZE + store.len() * 16);
    out.extend_from_slice(&(store.len() as u16).to_le_bytes());

    for (_, entry) in store.iter() {
        let trigger = entry.trigger.as_bytes();
        if trigger.len() > MAX_TRIGGER_LEN {
            return Err(MacroError::TriggerTooLong(trigger.len()));
        }
        let content = entry.content.as_bytes();
        if content.len() > MAX_CONTENT_LEN {
            return Err(MacroError::ContentTooLong(content.len()));
        }

        out.push(trigger.len() as u8);
        out.extend_from_slice(trigger);
        out.extend_from_slice(&(content.len() as u16).to_le_bytes());
        out.extend_from_slice(content);
    }

    trace!(
        "Encoded {} macros into {} bytes: {}",
        store.len(),
        out.len(),
        hex::encode(&out[..out.len().min(16)])
    );
    Ok(out)
}

/// Deserialize a store from the binary blob
///
/// Every declared length is validated against the remaining buffer before
/// any read. A buffer too short to hold the count field is an empty store.
pub fn decode(data: &[u8], tables: &CodeTables) -> Result<MacroStore> {
    let mut store = MacroStore::new();

    if data.len() < COUNT_SIZE {
        debug!("Blob shorter than count field ({} bytes), empty store", data.len());
        return Ok(store);
    }

    let count = u16::from_le_bytes([data[0], data[1]]) as usize;
    let mut cursor = COUNT_SIZE;

    if count * MIN_ENTRY_SIZE > data.len() - cursor {
        return Err(MacroError::MalformedLength(format!(
            "{} entries declared but only {} bytes follow",
            count,
            data.len() - cursor
        )));
    }

    for _ in 0..count {
        let trigger_len = take(data, &mut cursor, 1)?[0] as usize;
        let trigger = String::from_utf8_lossy(take(data, &mut cursor, trigger_len)?).into_owned();

        let len_bytes = take(data, &mut cursor, 2)?;
        let content_len = u16::from_le_bytes([len_bytes[0], len_bytes[1]]) as usize;
        let content = String::from_utf8_lossy(take(data, &mut cursor, content_len)?).into_owned();

        store.add_macro(tables, &trigger, &content);
    }

    debug!("Decoded {} macros from {} bytes", store.len(), data.len());
    Ok(store)
}

/// Write a store as a binary blob file, staged through a temp file in the
/// same directory
pub fn save_to_path(store: &MacroStore, path: &std::path::Path) -> Result<()> {
    use std::io::Write;

    let blob = encode(store)?;
    let dir = match path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p,
        _ => std::path::Path::new("."),
    };
    let mut staged = tempfile::NamedTempFile::new_in(dir)?;
    staged.write_all(&blob)?;
    staged
        .persist(path)
        .map_err(|e| MacroError::IoError(e.error))?;

    debug!("Saved {} macros to {:?} ({} bytes)", store.len(), path, blob.len());
    Ok(())
}

/// Replace a store with the contents of a binary blob file
///
/// A missing or unopenable file loads nothing and is not an error; a
/// malformed blob clears the store and surfaces the decode error.
pub fn load_from_path(
    store: &mut MacroStore,
    tables: &CodeTables,
    path: &std::path::Path,
) -> Result<usize> {
    let data = match std::fs::read(path) {
        Ok(data) => data,
        Err(e) => {
            debug!("Macro blob {:?} unavailable ({}), nothing loaded", path, e);
            return Ok(0);
        }
    };

    match decode(&data, tables) {
        Ok(loaded) => {
            let count = loaded.len();
            *store = loaded;
            Ok(count)
        }
        Err(e) => {
            store.clear();
            Err(e)
        }
    }
}

/// Advance the cursor by `needed` bytes, bounds-checked
fn take<'a>(data: &'a [u8], cursor: &mut usize, needed: usize) -> Result<&'a [u8]> {
    let remaining = data.len() - *cursor;
    if needed > remaining {
        return Err(MacroError::TruncatedInput { needed, remaining });
    }
    let slice = &data[*cursor..*cursor + needed];
    *cursor += needed;
    Ok(slice)
}

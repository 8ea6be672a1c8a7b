//! Shared, thread-safe macro engine
//!
//! The store is read by the live keystroke path (`find_macro`, high
//! frequency) and written by the management path (add/delete/load, user
//! triggered). Reads and writes are mutually exclusive at operation
//! granularity, so a lookup never observes a half-updated entry.
//!
//! Lock ordering invariant: the store lock is always acquired before the
//! tables lock.

use log::{debug, warn};
use std::path::Path;
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use crate::exceptions::Result;
use crate::store::textfile::LoadMode;
use crate::store::{MacroStore, binary, textfile};
use crate::tables::{Code, CodeTables};

/// Concurrency wrapper around the macro store and its code tables
#[derive(Debug, Default)]
pub struct MacroEngine {
    store: RwLock<MacroStore>,
    tables: RwLock<CodeTables>,
}

impl MacroEngine {
    /// Create an engine with the given table configuration
    pub fn new(tables: CodeTables) -> Self {
        Self {
            store: RwLock::new(MacroStore::new()),
            tables: RwLock::new(tables),
        }
    }

    // A panicked writer must not take the keystroke path down with it;
    // poisoned locks recover the inner value.
    fn store_read(&self) -> RwLockReadGuard<'_, MacroStore> {
        match self.store.read() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }

    fn store_write(&self) -> RwLockWriteGuard<'_, MacroStore> {
        match self.store.write() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }

    fn tables_read(&self) -> RwLockReadGuard<'_, CodeTables> {
        match self.tables.read() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }

    fn tables_write(&self) -> RwLockWriteGuard<'_, CodeTables> {
        match self.tables.write() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }

    /// Number of macros
    pub fn len(&self) -> usize {
        self.store_read().len()
    }

    /// True if no macros are loaded
    pub fn is_empty(&self) -> bool {
        self.store_read().is_empty()
    }

    /// Currently active code table index
    pub fn active_table(&self) -> usize {
        self.tables_read().active_table()
    }

    /// True if a macro with this trigger text exists
    pub fn has_macro(&self, trigger: &str) -> bool {
        let store = self.store_read();
        let tables = self.tables_read();
        store.has_macro(&tables, trigger)
    }

    /// Look up the expansion codes for a live candidate key
    pub fn find_macro<F>(&self, candidate: &[Code], remap: F) -> Option<Vec<Code>>
    where
        F: Fn(Code) -> Code,
    {
        self.store_read()
            .find_macro(candidate, remap)
            .map(<[Code]>::to_vec)
    }

    /// Enumerate all macros as (key, trigger, content)
    pub fn get_all_macros(&self) -> Vec<(Vec<Code>, String, String)> {
        self.store_read()
            .get_all_macros()
            .into_iter()
            .map(|(key, trigger, content)| (key.to_vec(), trigger.to_string(), content.to_string()))
            .collect()
    }

    /// Add or edit a macro; returns true when a new entry was created
    pub fn add_macro(&self, trigger: &str, content: &str) -> bool {
        let mut store = self.store_write();
        let tables = self.tables_read();
        store.add_macro(&tables, trigger, content)
    }

    /// Remove a macro by trigger text; returns whether one existed
    pub fn delete_macro(&self, trigger: &str) -> bool {
        let mut store = self.store_write();
        let tables = self.tables_read();
        store.delete_macro(&tables, trigger)
    }

    /// Switch the active code table and re-encode every macro's content
    ///
    /// Trigger keys stay as they were encoded at creation time; only the
    /// expansion payload follows the new table, because content is what
    /// gets typed back to the user.
    pub fn set_active_table(&self, index: usize) {
        let mut store = self.store_write();
        let mut tables = self.tables_write();
        debug!("Switching active table {} -> {}", tables.active_table(), index);
        tables.set_active_table(index);
        store.on_table_change(&tables);
    }

    /// Replace the store with the contents of a binary blob
    ///
    /// A failed decode leaves the store empty ("no macros loaded") and
    /// surfaces the error.
    pub fn load_binary(&self, data: &[u8]) -> Result<usize> {
        let mut store = self.store_write();
        let tables = self.tables_read();
        match binary::decode(data, &tables) {
            Ok(loaded) => {
                let count = loaded.len();
                *store = loaded;
                Ok(count)
            }
            Err(e) => {
                warn!("Binary macro data rejected: {}", e);
                store.clear();
                Err(e)
            }
        }
    }

    /// Replace the store with the contents of a binary macro file
    ///
    /// A missing or unopenable file loads nothing and is not an error.
    pub fn load_binary_file(&self, path: &Path) -> Result<usize> {
        let data = match std::fs::read(path) {
            Ok(data) => data,
            Err(e) => {
                debug!("Macro blob {:?} unavailable ({}), nothing loaded", path, e);
                return Ok(0);
            }
        };
        self.load_binary(&data)
    }

    /// Serialize the store to a binary blob
    ///
    /// The snapshot is taken under the read lock and encoded outside it, so
    /// keystroke lookups are not blocked on serialization.
    pub fn save_binary(&self) -> Result<Vec<u8>> {
        let snapshot = self.store_read().clone();
        binary::encode(&snapshot)
    }

    /// Load a legacy text macro file; the file is read outside the lock
    pub fn load_text_file(&self, path: &Path, mode: LoadMode) -> Result<usize> {
        let raw = match std::fs::read(path) {
            Ok(raw) => raw,
            Err(e) => {
                debug!("Macro file {:?} unavailable ({}), nothing loaded", path, e);
                return Ok(0);
            }
        };
        let text = String::from_utf8_lossy(&raw);

        let mut store = self.store_write();
        let tables = self.tables_read();
        Ok(textfile::parse_into(&mut store, &tables, &text, mode))
    }

    /// Save the store to a legacy text macro file
    ///
    /// Snapshot under the read lock, file I/O outside it.
    pub fn save_text_file(&self, path: &Path) -> Result<()> {
        let snapshot = self.store_read().clone();
        textfile::save_to_path(&snapshot, path)
    }
}

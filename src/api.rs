//! High-level API for macro file operations

use log::debug;
use std::path::{Path, PathBuf};

use crate::exceptions::{MacroError, Result};
use crate::store::textfile::{FILE_HEADER, LoadMode};
use crate::store::{MacroStore, binary, textfile};
use crate::tables::CodeTables;

/// The two on-disk macro file formats
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MacroFileFormat {
    /// Compact length-prefixed blob (embedded storage)
    Binary,
    /// Legacy colon-delimited text file
    Text,
}

impl MacroFileFormat {
    /// The other format - conversions default to flipping
    pub fn other(self) -> Self {
        match self {
            MacroFileFormat::Binary => MacroFileFormat::Text,
            MacroFileFormat::Text => MacroFileFormat::Binary,
        }
    }
}

/// Options for converting a macro file
#[derive(Debug, Default)]
pub struct ConvertOptions {
    /// Input format; detected from the file content when omitted
    pub from: Option<MacroFileFormat>,
    /// Output format; the opposite of the input format when omitted
    pub to: Option<MacroFileFormat>,
    /// Table definition JSON to inject; empty tables when omitted
    pub tables: Option<PathBuf>,
}

/// Detect the format of a macro file by sniffing its leading bytes
///
/// Text files start with the `;` of the legacy header; anything else is
/// treated as a binary blob.
pub fn detect_file_format(path: &Path) -> Result<MacroFileFormat> {
    let data = std::fs::read(path)?;
    let format = if data.first() == Some(&(FILE_HEADER.as_bytes()[0])) {
        MacroFileFormat::Text
    } else {
        MacroFileFormat::Binary
    };
    debug!("Detected {:?} format for {:?}", format, path);
    Ok(format)
}

/// Convert a macro file between the binary and text formats
///
/// Returns the number of macros written to the output file.
pub fn convert_macro_file(input: &Path, output: &Path, options: ConvertOptions) -> Result<usize> {
    let tables = match options.tables {
        Some(path) => CodeTables::from_json_file(&path)?,
        None => CodeTables::default(),
    };

    let from = match options.from {
        Some(format) => format,
        None => detect_file_format(input)?,
    };
    let to = options.to.unwrap_or_else(|| from.other());

    let mut store = MacroStore::new();
    match from {
        MacroFileFormat::Binary => {
            // Read directly so a missing input is an error here, unlike the
            // absorb-absence behavior of the engine load path
            let data = std::fs::read(input)?;
            store = binary::decode(&data, &tables)?;
        }
        MacroFileFormat::Text => {
            let raw = std::fs::read(input)?;
            let text = String::from_utf8_lossy(&raw);
            textfile::parse_into(&mut store, &tables, &text, LoadMode::Replace);
        }
    }

    match to {
        MacroFileFormat::Binary => binary::save_to_path(&store, output)?,
        MacroFileFormat::Text => textfile::save_to_path(&store, output)?,
    }

    debug!(
        "Converted {:?} ({:?}) -> {:?} ({:?}): {} macros",
        input,
        from,
        output,
        to,
        store.len()
    );
    Ok(store.len())
}

/// Parse a format name from the command line
pub fn parse_format(name: &str) -> Result<MacroFileFormat> {
    match name {
        "binary" | "bin" => Ok(MacroFileFormat::Binary),
        "text" | "txt" => Ok(MacroFileFormat::Text),
        other => Err(MacroError::UnsupportedFormat(other.to_string())),
    }
}

//! vimacro - macro expansion subsystem for a Vietnamese input method engine
//!
//! This crate maintains the table of user-defined typing macros: short
//! trigger strings that expand to longer text. It owns the trigger/content
//! store, the character-to-internal-code conversion that keys it, and the
//! two persistence formats (a compact binary blob and the legacy
//! colon-delimited text file).

// Enforce strict code quality and reliability
#![deny(
    // Safety
    unsafe_code,

    // Correctness
    missing_debug_implementations,
    unreachable_pub,

    // Future compatibility
    future_incompatible,

    // Rust 2018 idioms
    rust_2018_idioms,

    // All warnings must be fixed
    warnings,
)]
#![warn(
    // Documentation
    missing_docs,

    // Error handling best practices
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::panic,
    clippy::unimplemented,
    clippy::todo,

    // Performance
    clippy::inefficient_to_string,
    clippy::large_enum_variant,

    // Code clarity and maintainability
    clippy::cognitive_complexity,
    clippy::type_complexity,

    // Best practices
    clippy::clone_on_ref_ptr,
    clippy::wildcard_imports,
    clippy::enum_glob_use,
    clippy::if_not_else,
    clippy::single_match_else,
    clippy::needless_continue,
    clippy::explicit_iter_loop,
    clippy::explicit_into_iter_loop,
)]

pub mod api;
pub mod engine;
pub mod exceptions;
pub mod exit_codes;
pub mod logger;
pub mod store;
pub mod tables;
pub mod version;

// Re-export main API types
pub use api::{ConvertOptions, MacroFileFormat, convert_macro_file, detect_file_format};
pub use engine::MacroEngine;
pub use exceptions::MacroError;
pub use store::textfile::LoadMode;
pub use store::{MacroEntry, MacroStore};
pub use tables::{Code, CodeTables, convert};

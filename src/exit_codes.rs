//! Standard exit codes for vimacro binaries
//!
//! The conversion tool uses these to report failure classes to scripts that
//! shepherd macro files between installs.

/// Successful execution
pub const EXIT_SUCCESS: i32 = 0;

/// Generic error (avoid using - be more specific)
pub const EXIT_ERROR: i32 = 1;

/// Panic or unrecoverable error
pub const EXIT_PANIC: i32 = 101;

/// Macro format error (oversized fields, truncated or malformed data)
pub const EXIT_FORMAT_ERROR: i32 = 102;

/// Invalid command-line arguments
pub const EXIT_INVALID_ARGS: i32 = 105;

/// I/O error (file not found, permission denied, disk error)
pub const EXIT_IO_ERROR: i32 = 106;

/// Configuration error (invalid table definition JSON)
pub const EXIT_CONFIG_ERROR: i32 = 109;

//! Macro file conversion tool
//!
//! Converts user macro files between the embedded binary blob and the
//! legacy colon-delimited text format.

use clap::Parser;
use std::{env, panic, path::PathBuf, process};
use vimacro::exceptions::MacroError;
use vimacro::exit_codes::{
    EXIT_CONFIG_ERROR, EXIT_ERROR, EXIT_FORMAT_ERROR, EXIT_INVALID_ARGS, EXIT_IO_ERROR,
    EXIT_PANIC, EXIT_SUCCESS,
};
use vimacro::{ConvertOptions, convert_macro_file};

const VERSION: &str = vimacro::version::VERSION;

#[derive(Parser, Debug)]
#[command(version = VERSION, about = "Convert macro files between binary and text formats")]
struct Args {
    /// Input macro file
    #[arg(short, long)]
    input: PathBuf,

    /// Output macro file
    #[arg(short, long)]
    output: PathBuf,

    /// Input format: binary or text (detected from content when omitted)
    #[arg(long)]
    from: Option<String>,

    /// Output format: binary or text (opposite of the input when omitted)
    #[arg(long)]
    to: Option<String>,

    /// Character table definition JSON
    #[arg(long)]
    tables: Option<PathBuf>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long)]
    log_level: Option<String>,
}

fn main() {
    // Set up panic handler to return specific exit code
    panic::set_hook(Box::new(|panic_info| {
        eprintln!("PANIC: {}", panic_info);
        process::exit(EXIT_PANIC);
    }));

    // Wrap main logic in catch_unwind for extra safety
    let result = panic::catch_unwind(run);

    match result {
        Ok(exit_code) => process::exit(exit_code),
        Err(_) => {
            eprintln!("Fatal: Unhandled panic in converter");
            process::exit(EXIT_PANIC);
        }
    }
}

fn run() -> i32 {
    // Handle --version before clap
    if env::args().nth(1).as_deref() == Some("--version") {
        println!("vimacro-convert {}", vimacro::version::full_version());
        return EXIT_SUCCESS;
    }

    let args = Args::parse();

    // Initialize logging with level if provided
    if let Some(ref level) = args.log_level {
        vimacro::logger::JsonLogger::init_with_level(level, "CLI --log-level");
    } else {
        vimacro::logger::JsonLogger::init();
    }

    let from = match args.from.as_deref().map(vimacro::api::parse_format) {
        Some(Ok(format)) => Some(format),
        Some(Err(e)) => {
            eprintln!("Invalid --from: {}", e);
            return EXIT_INVALID_ARGS;
        }
        None => None,
    };
    let to = match args.to.as_deref().map(vimacro::api::parse_format) {
        Some(Ok(format)) => Some(format),
        Some(Err(e)) => {
            eprintln!("Invalid --to: {}", e);
            return EXIT_INVALID_ARGS;
        }
        None => None,
    };

    let options = ConvertOptions {
        from,
        to,
        tables: args.tables,
    };

    match convert_macro_file(&args.input, &args.output, options) {
        Ok(count) => {
            println!("Converted {} macros to {}", count, args.output.display());
            EXIT_SUCCESS
        }
        Err(e) => {
            eprintln!("Conversion error: {}", e);
            match e {
                MacroError::TriggerTooLong(_)
                | MacroError::ContentTooLong(_)
                | MacroError::StoreTooLarge(_)
                | MacroError::TruncatedInput { .. }
                | MacroError::MalformedLength(_)
                | MacroError::UnsupportedFormat(_) => EXIT_FORMAT_ERROR,
                MacroError::IoError(_) => EXIT_IO_ERROR,
                MacroError::JsonError(_) => EXIT_CONFIG_ERROR,
                MacroError::Generic(_) => EXIT_ERROR,
            }
        }
    }
}

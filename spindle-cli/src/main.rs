//! Spindle CLI: run the source scanner over a file.
//!
//! Exit codes:
//! - 0: Success
//! - 1: Usage or input error
//! - 2: Input did not match
//! - 3: Engine error

use std::process;

use spindle_cli::{commands, logger};

fn main() {
    logger::init();
    let args: Vec<String> = std::env::args().collect();

    if args.len() < 2 {
        print_usage();
        process::exit(1);
    }

    let result = match args[1].as_str() {
        "scan" => commands::scan(&args[2..]),
        "--help" | "-h" | "help" => {
            print_usage();
            process::exit(0);
        }
        other => {
            eprintln!("error: unknown command '{other}'");
            eprintln!();
            print_usage();
            process::exit(1);
        }
    };

    if let Err(code) = result {
        process::exit(code);
    }
}

fn print_usage() {
    eprintln!("Usage: spindle <command> [args]");
    eprintln!();
    eprintln!("Commands:");
    eprintln!("  scan <file> [--trace] [--stats]   Scan a source file and print its tokens");
    eprintln!("  help                              Show this message");
    eprintln!();
    eprintln!("Environment:");
    eprintln!("  {}=<level>   off, error, warn (default), info, debug, trace", logger::LEVEL_VAR);
}

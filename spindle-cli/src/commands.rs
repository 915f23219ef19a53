//! CLI command implementations.

use log::LevelFilter;
use spindle_combinator::ParseOptions;
use spindle_common::Source;

use crate::logger;
use crate::scanner::{self, Summary};

/// Options of the `scan` command.
#[derive(Debug, Default, PartialEq, Eq)]
pub struct ScanArgs {
    pub input: String,
    pub trace: bool,
    pub stats: bool,
}

impl ScanArgs {
    pub fn parse(args: &[String]) -> Result<Self, String> {
        let mut input = None;
        let mut parsed = ScanArgs::default();
        for arg in args {
            match arg.as_str() {
                "--trace" => parsed.trace = true,
                "--stats" => parsed.stats = true,
                flag if flag.starts_with("--") => return Err(format!("unknown flag '{flag}'")),
                file => {
                    if input.replace(file.to_string()).is_some() {
                        return Err("scan takes exactly one input file".into());
                    }
                }
            }
        }
        parsed.input = input.ok_or_else(|| "scan requires an input file".to_string())?;
        Ok(parsed)
    }
}

/// Scan a source file and print its token list.
pub fn scan(args: &[String]) -> Result<(), i32> {
    let args = ScanArgs::parse(args).map_err(|e| {
        eprintln!("error: {e}");
        eprintln!("Usage: spindle scan <file> [--trace] [--stats]");
        1
    })?;

    let source = Source::open(&args.input).map_err(|e| {
        eprintln!("error: {e}");
        1
    })?;

    if args.trace {
        logger::raise_to(LevelFilter::Trace);
    }
    let options = ParseOptions::default().with_trace(args.trace);

    let (outcome, stream) = scanner::scan(source, options).map_err(|e| {
        eprintln!("engine error: {e}");
        3
    })?;

    if !outcome.matched {
        eprintln!("error: {}: input did not match the scanner", args.input);
        return Err(2);
    }

    for token in &outcome.tokens {
        println!("{}", scanner::describe(token, &stream));
    }

    if args.stats {
        let summary = Summary::of(&outcome.tokens);
        let stats = outcome.stats;
        eprintln!(
            "{} tokens ({} comments, {} diagnostics)",
            summary.tokens, summary.comments, summary.diagnostics
        );
        eprintln!(
            "{} steps, {} splices, peak depth {} frames / {} contexts",
            stats.steps, stats.splices, stats.peak_frames, stats.peak_contexts
        );
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn scan_args_accept_flags_in_any_order() {
        let parsed = ScanArgs::parse(&args(&["--stats", "a.z", "--trace"])).unwrap();
        assert_eq!(
            parsed,
            ScanArgs {
                input: "a.z".into(),
                trace: true,
                stats: true
            }
        );
    }

    #[test]
    fn scan_args_errors() {
        assert_eq!(
            ScanArgs::parse(&[]),
            Err("scan requires an input file".to_string())
        );
        assert_eq!(
            ScanArgs::parse(&args(&["a", "b"])),
            Err("scan takes exactly one input file".to_string())
        );
        assert_eq!(
            ScanArgs::parse(&args(&["a", "--loud"])),
            Err("unknown flag '--loud'".to_string())
        );
    }
}

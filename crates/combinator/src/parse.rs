//! Top-level entry points.

use spindle_common::{shared, SharedSource, TokenList, TokenStream};
use spindle_vm::{Engine, EngineConfig, EngineStats, InstructionList};

use crate::error::ParseError;
use crate::match_data::MatchData;
use crate::pattern::Pattern;

/// Options for [`parse_with`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ParseOptions {
    pub engine: EngineConfig,
}

impl ParseOptions {
    pub fn with_trace(mut self, trace: bool) -> Self {
        self.engine = self.engine.with_trace(trace);
        self
    }
}

/// Result of a completed parse.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseOutcome {
    /// Whether the root pattern matched.
    pub matched: bool,
    /// Tokens produced by the root pattern. Empty when it did not match.
    pub tokens: TokenList,
    pub stats: EngineStats,
}

/// Run `pattern` over `source` with default options.
pub fn parse(pattern: &Pattern, source: SharedSource) -> Result<ParseOutcome, ParseError> {
    parse_with(pattern, source, ParseOptions::default())
}

/// Run `pattern` over `source`.
///
/// The root context of the engine is the parse context: it owns the
/// output token list and receives the root pattern's result. The source is
/// left just past the matched input, or where it started if nothing
/// matched.
///
/// # Errors
///
/// Returns [`ParseError::Engine`] if the engine rejects the program, which
/// means a bug in a pattern implementation rather than bad input.
pub fn parse_with(
    pattern: &Pattern,
    source: SharedSource,
    options: ParseOptions,
) -> Result<ParseOutcome, ParseError> {
    let root = pattern.clone();
    let mut list: InstructionList<MatchData> = InstructionList::new();
    list.exec(move |calls, m| {
        m.matched = false;
        root.run(calls, m);
    })
    .pop_list();

    log::debug!("parse: {}", pattern.name());
    let mut engine = Engine::with_config(options.engine);
    let context = engine.run(list, MatchData::new(source))?;

    Ok(ParseOutcome {
        matched: context.matched,
        tokens: context.tokens,
        stats: engine.stats(),
    })
}

/// Run `pattern` over an in-memory string.
pub fn parse_str(pattern: &Pattern, text: &str) -> Result<ParseOutcome, ParseError> {
    parse(pattern, shared(TokenStream::from(text)))
}

//! The bootstrap source scanner.
//!
//! Splits a file into comments, separators and diagnostics:
//! - `// ...` up to the end of the line, and `/* ... */`, become one
//!   `Comment` token each; an unterminated block comment runs to the end
//!   of input
//! - space, tab, carriage return, newline and `;` stay plain byte tokens
//! - every other byte becomes a `Diagnostic("invalid token")` token
//!
//! Unknown input is reported in the token list; it never fails the scan.

use spindle_combinator::{parse_with, MatchData, ParseError, ParseOptions, ParseOutcome, Pattern};
use spindle_common::{shared, SharedSource, Source, SpanKind, Token, TokenList, TokenStream};

pub const INVALID_TOKEN: &str = "invalid token";

fn to_comment(m: &mut MatchData) {
    m.collapse(SpanKind::Comment);
}

/// One comment. A line comment also takes its terminating newline, as a
/// separate byte token.
pub fn comment() -> Pattern {
    let line = Pattern::sequence([
        Pattern::sequence([
            Pattern::string("//"),
            Pattern::until(Pattern::or([Pattern::char(b'\n'), Pattern::end_of_file()])),
        ])
        .with_action(to_comment),
        Pattern::optional(Pattern::char(b'\n')),
    ]);
    let block = Pattern::sequence([
        Pattern::string("/*"),
        Pattern::until(Pattern::or([Pattern::string("*/"), Pattern::end_of_file()])),
        Pattern::optional(Pattern::string("*/")),
    ])
    .with_action(to_comment);
    Pattern::or([line, block])
}

/// Any single byte, reported as a diagnostic.
pub fn invalid_token() -> Pattern {
    Pattern::any().with_action(|m| {
        m.collapse(SpanKind::Diagnostic(INVALID_TOKEN.into()));
    })
}

/// The whole-file scanner.
pub fn scanner() -> Pattern {
    let separator = Pattern::or(b"\n \t\r;".iter().map(|&b| Pattern::char(b)));
    Pattern::sequence([
        Pattern::echo("scanning..."),
        Pattern::until_with(
            Pattern::end_of_file(),
            Pattern::or([Pattern::one_or_more(comment()), separator, invalid_token()]),
        ),
        Pattern::end_of_file(),
        Pattern::echo("scanning complete"),
    ])
}

/// Token counts of a finished scan.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Summary {
    pub tokens: usize,
    pub comments: usize,
    pub diagnostics: usize,
}

impl Summary {
    pub fn of(tokens: &TokenList) -> Self {
        let mut summary = Summary {
            tokens: tokens.len(),
            ..Summary::default()
        };
        for span in tokens.iter().filter_map(Token::as_span) {
            match span.kind {
                SpanKind::Comment => summary.comments += 1,
                SpanKind::Diagnostic(_) => summary.diagnostics += 1,
                SpanKind::Span => {}
            }
        }
        summary
    }
}

/// Scan `source`, returning the outcome and the shared stream so span text
/// can be extracted afterwards.
pub fn scan(source: Source, options: ParseOptions) -> Result<(ParseOutcome, SharedSource), ParseError> {
    let stream = shared(TokenStream::new(source));
    let outcome = parse_with(&scanner(), stream.clone(), options)?;
    Ok((outcome, stream))
}

/// One output line for `token`. Spans are followed by their text.
pub fn describe(token: &Token, stream: &SharedSource) -> String {
    match token.as_span() {
        Some(span) => {
            let text = span.text(&mut *stream.borrow_mut());
            format!("{token} {text:?}")
        }
        None => token.to_string(),
    }
}

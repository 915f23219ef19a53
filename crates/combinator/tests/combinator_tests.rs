//! Integration tests for the spindle combinators.
//!
//! Organized by pattern group: leaves, sequence and choice, lookahead and
//! repetition, scanning, actions, rule registry, properties.

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use proptest::prelude::*;
use spindle_combinator::{parse, parse_str, Grammar, MatchData, ParseOutcome, Pattern};
use spindle_common::{shared, SharedSource, SpanKind, Token, TokenStream};

// ============================================================
// Helper functions
// ============================================================

fn source(text: &str) -> SharedSource {
    shared(TokenStream::from(text))
}

/// Parse `text` and hand back the source so the caller can inspect where
/// the stream was left.
fn run(pattern: &Pattern, text: &str) -> (ParseOutcome, SharedSource) {
    let src = source(text);
    let out = parse(pattern, src.clone()).expect("engine error");
    (out, src)
}

fn offset(src: &SharedSource) -> usize {
    src.borrow().save().offset
}

fn next_byte(src: &SharedSource) -> Option<u8> {
    src.borrow_mut().pull_token().byte()
}

fn ch(c: char) -> Pattern {
    Pattern::char(c as u8)
}

fn digits() -> Pattern {
    Pattern::one_or_more(Pattern::range([(b'0', b'9')]))
}

/// A pattern that records every attempt under `name`, then fails.
fn spy(log: &Rc<RefCell<Vec<&'static str>>>, name: &'static str) -> Pattern {
    let log = Rc::clone(log);
    Pattern::custom(move |m| {
        log.borrow_mut().push(name);
        m.matched = false;
    })
}

// ============================================================
// Leaves
// ============================================================

#[test]
fn char_consumes_exactly_one_byte() {
    let (out, src) = run(&ch('a'), "ab");
    assert!(out.matched);
    assert_eq!(out.tokens.bytes(), b"a");
    assert_eq!(next_byte(&src), Some(b'b'));
}

#[test]
fn string_matches_contiguously() {
    let (out, src) = run(&Pattern::string("let"), "let x");
    assert!(out.matched);
    assert_eq!(out.tokens.len(), 3);
    assert_eq!(next_byte(&src), Some(b' '));
}

#[test]
fn end_of_file_does_not_emit_a_token() {
    let out = parse_str(&Pattern::end_of_file(), "").unwrap();
    assert!(out.matched);
    assert!(out.tokens.is_empty());
}

#[test]
fn success_failure_and_echo() {
    assert!(parse_str(&Pattern::success(), "x").unwrap().matched);
    assert!(!parse_str(&Pattern::failure(), "x").unwrap().matched);
    let out = parse_str(&Pattern::echo("hello"), "x").unwrap();
    assert!(out.matched);
    assert!(out.tokens.is_empty());
}

// ============================================================
// Sequence and choice
// ============================================================

#[test]
fn sequence_concatenates_child_tokens() {
    let (out, src) = run(&Pattern::sequence([ch('a'), ch('b')]), "ab");
    assert!(out.matched);
    assert_eq!(out.tokens.bytes(), b"ab");
    assert_eq!(out.tokens.len(), 2);
    assert!(src.borrow_mut().pull_token().is_eof());
}

#[test]
fn sequence_failure_rolls_back_fully() {
    let (out, src) = run(&Pattern::sequence([ch('a'), ch('b')]), "ac");
    assert!(!out.matched);
    assert!(out.tokens.is_empty());
    assert_eq!(next_byte(&src), Some(b'a'));
}

#[test]
fn sequence_rolls_back_nested_compounds() {
    let p = Pattern::sequence([Pattern::one_or_more(ch('a')), ch('b')]);
    let (out, src) = run(&p, "aaac");
    assert!(!out.matched);
    assert_eq!(offset(&src), 0);
}

#[test]
fn or_tries_alternatives_in_order() {
    let log = Rc::new(RefCell::new(Vec::new()));
    let p = Pattern::or([spy(&log, "a"), ch('b'), spy(&log, "c")]);
    let (out, src) = run(&p, "b");
    assert!(out.matched);
    assert_eq!(out.tokens.bytes(), b"b");
    // First match wins: the third alternative is never tried.
    assert_eq!(*log.borrow(), ["a"]);
    assert!(src.borrow_mut().pull_token().is_eof());
}

#[test]
fn or_backtracks_between_compound_alternatives() {
    let p = Pattern::or([
        Pattern::sequence([ch('a'), ch('b')]),
        Pattern::sequence([ch('a'), ch('c')]),
    ]);
    let out = parse_str(&p, "ac").unwrap();
    assert!(out.matched);
    assert_eq!(out.tokens.bytes(), b"ac");
}

#[test]
fn or_is_ordered_not_longest() {
    let p = Pattern::or([Pattern::string("a"), Pattern::string("ab")]);
    let (out, src) = run(&p, "ab");
    assert!(out.matched);
    assert_eq!(out.tokens.bytes(), b"a");
    assert_eq!(next_byte(&src), Some(b'b'));
}

#[test]
fn or_all_failing_restores() {
    let p = Pattern::or([Pattern::string("xy"), ch('z')]);
    let (out, src) = run(&p, "xq");
    assert!(!out.matched);
    assert_eq!(offset(&src), 0);
}

// ============================================================
// Lookahead and repetition
// ============================================================

#[test]
fn optional_keeps_child_output() {
    let p = Pattern::sequence([Pattern::optional(ch('-')), digits()]);
    assert_eq!(parse_str(&p, "-7").unwrap().tokens.bytes(), b"-7");
    assert_eq!(parse_str(&p, "7").unwrap().tokens.bytes(), b"7");
}

#[test]
fn at_is_zero_width() {
    let p = Pattern::at(Pattern::sequence([ch('a'), ch('b')]));
    let (out, src) = run(&p, "ab");
    assert!(out.matched);
    assert!(out.tokens.is_empty());
    assert_eq!(offset(&src), 0);

    let (out, src) = run(&p, "ax");
    assert!(!out.matched);
    assert_eq!(offset(&src), 0);
}

#[test]
fn at_suppresses_child_actions_but_fires_its_own() {
    let inner = Rc::new(Cell::new(0));
    let outer = Rc::new(Cell::new(0));
    let (i, o) = (Rc::clone(&inner), Rc::clone(&outer));
    let p = Pattern::at(ch('a').with_action(move |_| i.set(i.get() + 1)))
        .with_action(move |_| o.set(o.get() + 1));
    let out = parse_str(&Pattern::sequence([p, ch('a')]), "a").unwrap();
    assert!(out.matched);
    assert_eq!(inner.get(), 0);
    assert_eq!(outer.get(), 1);
}

#[test]
fn one_or_more_digits_stops_before_rejecting_token() {
    let (out, src) = run(&digits(), "123x");
    assert!(out.matched);
    assert_eq!(out.tokens.bytes(), b"123");
    assert_eq!(next_byte(&src), Some(b'x'));
}

#[test]
fn one_or_more_requires_one() {
    let (out, src) = run(&Pattern::one_or_more(ch('a')), "x");
    assert!(!out.matched);
    assert!(out.tokens.is_empty());
    assert_eq!(offset(&src), 0);
}

#[test]
fn zero_or_more_rewinds_only_the_failed_iteration() {
    let pair = Pattern::sequence([ch('a'), ch('b')]);
    let (out, src) = run(&Pattern::zero_or_more(pair), "ababa!");
    assert!(out.matched);
    assert_eq!(out.tokens.bytes(), b"abab");
    assert_eq!(next_byte(&src), Some(b'a'));
}

// ============================================================
// Scanning
// ============================================================

#[test]
fn until_end_of_file_consumes_everything_but_the_marker() {
    let (out, src) = run(&Pattern::until(Pattern::end_of_file()), "abc");
    assert!(out.matched);
    assert_eq!(out.tokens.bytes(), b"abc");
    assert!(out.tokens.iter().all(Token::is_byte));
    assert_eq!(offset(&src), 3);
}

#[test]
fn until_leaves_the_terminator_in_the_stream() {
    let p = Pattern::sequence([Pattern::until(ch(';')), ch(';')]);
    let out = parse_str(&p, "abc;").unwrap();
    assert!(out.matched);
    assert_eq!(out.tokens.bytes(), b"abc;");
}

#[test]
fn until_without_terminator_fails_and_restores() {
    let (out, src) = run(&Pattern::until(ch(';')), "abc");
    assert!(!out.matched);
    assert_eq!(offset(&src), 0);
}

#[test]
fn until_with_step_runs_step_between_probes() {
    let word = Pattern::one_or_more(Pattern::range([(b'a', b'z')]))
        .with_action(|m| {
            m.collapse(SpanKind::Span);
        });
    let p = Pattern::until_with(Pattern::end_of_file(), Pattern::or([word, ch(' ')]));
    let out = parse_str(&p, "ab cd").unwrap();
    assert!(out.matched);
    let kinds: Vec<bool> = out.tokens.iter().map(Token::is_span).collect();
    assert_eq!(kinds, [true, false, true]);
}

// ============================================================
// Actions
// ============================================================

#[test]
fn sequence_action_collapses_its_own_tokens() {
    let comment = Pattern::sequence([
        Pattern::string("/*"),
        Pattern::until(Pattern::string("*/")),
        Pattern::string("*/"),
    ])
    .with_action(|m| {
        m.collapse(SpanKind::Comment);
    });
    let p = Pattern::sequence([ch('x'), comment, ch('y')]);

    let src = source("x/* hi */y");
    let out = parse(&p, src.clone()).unwrap();
    assert!(out.matched);
    assert_eq!(out.tokens.len(), 3);
    let span = out.tokens.as_slice()[1].as_span().cloned().unwrap();
    assert_eq!(span.kind, SpanKind::Comment);
    assert_eq!(span.text(&mut *src.borrow_mut()), "/* hi */");
}

#[test]
fn action_on_failed_pattern_never_fires() {
    let fired = Rc::new(Cell::new(false));
    let flag = Rc::clone(&fired);
    let p = Pattern::sequence([ch('a'), ch('b')]).with_action(move |_| flag.set(true));
    assert!(!parse_str(&p, "ax").unwrap().matched);
    assert!(!fired.get());
}

#[test]
fn action_sees_text_and_positions() {
    let seen = Rc::new(RefCell::new(String::new()));
    let sink = Rc::clone(&seen);
    let p = Pattern::sequence([ch(' '), digits().with_action(move |m: &mut MatchData| {
        let (start, end) = (m.start.unwrap(), m.end.unwrap());
        *sink.borrow_mut() = format!("{} {start}..{end}", m.text());
    })]);
    assert!(parse_str(&p, " 42").unwrap().matched);
    assert_eq!(*seen.borrow(), "42 1:2..1:4");
}

#[test]
fn catch_all_emits_diagnostic_instead_of_failing() {
    let invalid = Pattern::any().with_action(|m| {
        m.collapse(SpanKind::Diagnostic("invalid token".into()));
    });
    let p = Pattern::until_with(
        Pattern::end_of_file(),
        Pattern::or([ch(' '), invalid]),
    );
    let out = parse_str(&p, " @ ").unwrap();
    assert!(out.matched);
    let diag = out.tokens.as_slice()[1].as_span().cloned().unwrap();
    assert_eq!(diag.kind, SpanKind::Diagnostic("invalid token".into()));
}

// ============================================================
// Rule registry
// ============================================================

/// `nest := '(' nest ')' | ε`
fn nesting_grammar() -> (Grammar, Pattern) {
    let grammar = Grammar::new();
    let nest = grammar.declare("nest");
    grammar
        .define(
            nest,
            Pattern::optional(Pattern::sequence([ch('('), grammar.rule(nest), ch(')')])),
        )
        .unwrap();
    let whole = Pattern::sequence([grammar.rule(nest), Pattern::end_of_file()]);
    (grammar, whole)
}

#[test]
fn recursive_rule_matches_balanced_input() {
    let (_grammar, p) = nesting_grammar();
    assert!(parse_str(&p, "((()))").unwrap().matched);
    assert!(!parse_str(&p, "(()").unwrap().matched);
}

#[test]
fn deep_recursion_does_not_use_the_host_stack() {
    let (_grammar, p) = nesting_grammar();
    let depth = 5_000;
    let text = format!("{}{}", "(".repeat(depth), ")".repeat(depth));
    let out = parse_str(&p, &text).unwrap();
    assert!(out.matched);
    assert_eq!(out.tokens.len(), depth * 2);
    assert!(out.stats.peak_frames > depth);
}

#[test]
fn deeply_nested_pattern_runs_and_drops() {
    let mut p = ch('a');
    for _ in 0..200_000 {
        p = Pattern::optional(p);
    }
    let out = parse_str(&p, "a").unwrap();
    assert!(out.matched);
    assert_eq!(out.tokens.bytes(), b"a");
    drop(p);
}

#[test]
fn deeply_nested_mixed_pattern_drops() {
    let mut p = ch('a');
    for i in 0..200_000 {
        p = match i % 5 {
            0 => Pattern::sequence([p, ch('b')]),
            1 => Pattern::or([ch('c'), p]),
            2 => Pattern::zero_or_more(p),
            3 => Pattern::until_with(Pattern::end_of_file(), p),
            _ => Pattern::at(p),
        };
    }
    let shared_copy = p.clone();
    drop(p);
    drop(shared_copy);
}

#[test]
fn undefined_rule_never_matches() {
    let grammar = Grammar::new();
    let id = grammar.declare("missing");
    let p = Pattern::or([grammar.rule(id), ch('x')]);
    assert_eq!(parse_str(&p, "x").unwrap().tokens.bytes(), b"x");
}

#[test]
fn rule_references_do_not_keep_grammar_alive() {
    let (grammar, p) = nesting_grammar();
    drop(grammar);
    assert!(!parse_str(&p, "()").unwrap().matched);
}

// ============================================================
// Properties
// ============================================================

fn failing_leaf() -> impl Strategy<Value = Pattern> {
    // Inputs are drawn from [a-z], so none of these can match.
    prop_oneof![
        Just(ch('#')),
        Just(Pattern::string("#!")),
        Just(Pattern::range([(b'0', b'9')])),
        Just(Pattern::failure()),
        Just(Pattern::sequence([ch('#'), ch('a')])),
    ]
}

proptest! {
    /// A failed Char leaves the stream exactly where it was.
    #[test]
    fn char_failure_is_idempotent(text in "[a-c]{0,8}", c in b'a'..=b'c') {
        let (out, src) = run(&Pattern::char(c), &text);
        let first = text.as_bytes().first().copied();
        prop_assert_eq!(out.matched, first == Some(c));
        prop_assert_eq!(offset(&src), usize::from(out.matched));
    }

    /// Optional and ZeroOrMore around a failing leaf always succeed and
    /// leave the stream untouched.
    #[test]
    fn optional_and_star_around_failure_succeed(text in "[a-z]{0,12}", leaf in failing_leaf()) {
        for p in [Pattern::optional(leaf.clone()), Pattern::zero_or_more(leaf.clone())] {
            let (out, src) = run(&p, &text);
            prop_assert!(out.matched);
            prop_assert!(out.tokens.is_empty());
            prop_assert_eq!(offset(&src), 0);
        }
    }

    /// A sequence of chars spelling the input matches it; any change to
    /// the input rolls the whole sequence back.
    #[test]
    fn sequence_matches_or_rolls_back(text in "[a-z]{1,12}", flip in 0usize..12) {
        let p = Pattern::sequence(text.bytes().map(Pattern::char));
        let out = parse_str(&p, &text).unwrap();
        prop_assert!(out.matched);
        prop_assert_eq!(out.tokens.bytes(), text.as_bytes());

        let mut changed = text.clone().into_bytes();
        let i = flip % changed.len();
        changed[i] = b'#';
        let changed = String::from_utf8(changed).unwrap();
        let (out, src) = run(&p, &changed);
        prop_assert!(!out.matched);
        prop_assert_eq!(offset(&src), 0);
    }

    /// OneOrMore over digits takes the longest digit prefix.
    #[test]
    fn digits_take_longest_prefix(text in "[0-9]{0,6}[a-z]{0,3}") {
        let prefix = text.bytes().take_while(u8::is_ascii_digit).count();
        let (out, src) = run(&digits(), &text);
        prop_assert_eq!(out.matched, prefix > 0);
        prop_assert_eq!(out.tokens.len(), prefix);
        prop_assert_eq!(offset(&src), prefix);
    }
}

//! Boundary tests for the token window and lexeme round-trips.

use luxc_util::{Handler, Symbol};
use proptest::prelude::*;

use crate::{Lexer, TokenKind, PEEK_COUNT, UNDO_COUNT};

fn source_with_tokens(count: usize) -> String {
    (0..count)
        .map(|i| format!("t{}", i))
        .collect::<Vec<_>>()
        .join(" ")
}

#[test]
fn peek_up_to_the_window_limit() {
    let handler = Handler::new();
    let source = source_with_tokens(32);
    let mut lexer = Lexer::new(&source, Symbol::intern("t"), &handler);
    lexer.next().unwrap();

    for k in 1..=PEEK_COUNT {
        let token = lexer.peek(k).unwrap();
        assert_eq!(token.text.as_str(), format!("t{}", k));
    }
}

#[test]
#[should_panic(expected = "outside the token window")]
fn peek_past_the_window_panics() {
    let handler = Handler::new();
    let source = source_with_tokens(32);
    let mut lexer = Lexer::new(&source, Symbol::intern("t"), &handler);
    lexer.next().unwrap();
    let _ = lexer.peek(PEEK_COUNT + 1);
}

#[test]
fn undo_up_to_the_window_limit() {
    let handler = Handler::new();
    let source = source_with_tokens(32);
    let mut lexer = Lexer::new(&source, Symbol::intern("t"), &handler);

    for _ in 0..=UNDO_COUNT {
        lexer.next().unwrap();
    }
    assert_eq!(lexer.current().text.as_str(), "t10");

    for step in 1..=UNDO_COUNT {
        let token = lexer.undo();
        assert_eq!(token.text.as_str(), format!("t{}", UNDO_COUNT - step));
    }
}

#[test]
#[should_panic(expected = "past the retained window")]
fn undo_past_the_window_panics() {
    let handler = Handler::new();
    let source = source_with_tokens(32);
    let mut lexer = Lexer::new(&source, Symbol::intern("t"), &handler);

    for _ in 0..=UNDO_COUNT {
        lexer.next().unwrap();
    }
    for _ in 0..=UNDO_COUNT {
        lexer.undo();
    }
}

#[test]
#[should_panic(expected = "past the retained window")]
fn undo_before_any_history_panics() {
    let handler = Handler::new();
    let source = source_with_tokens(4);
    let mut lexer = Lexer::new(&source, Symbol::intern("t"), &handler);
    lexer.next().unwrap();
    lexer.undo();
}

#[test]
fn eviction_keeps_the_undo_horizon() {
    let handler = Handler::new();
    let source = source_with_tokens(64);
    let mut lexer = Lexer::new(&source, Symbol::intern("t"), &handler);

    for _ in 0..40 {
        lexer.next().unwrap();
    }
    assert_eq!(lexer.current().text.as_str(), "t39");

    for _ in 0..UNDO_COUNT {
        lexer.undo();
    }
    assert_eq!(lexer.current().text.as_str(), "t29");
}

#[test]
fn peek_then_advance_sees_the_same_tokens() {
    let handler = Handler::new();
    let source = source_with_tokens(24);
    let mut lexer = Lexer::new(&source, Symbol::intern("t"), &handler);
    lexer.next().unwrap();

    for k in 1..=PEEK_COUNT {
        let peeked = lexer.peek(k).unwrap();
        let mut probe = Lexer::new(&source, Symbol::intern("t"), &handler);
        for _ in 0..=k {
            probe.next().unwrap();
        }
        assert_eq!(peeked, probe.current());
    }
}

fn token_text() -> impl Strategy<Value = String> {
    prop_oneof![
        "[a-z_][a-z0-9_]{0,8}".prop_map(|s| s),
        "[1-9][0-9]{0,6}".prop_map(|s| s),
        Just("0".to_string()),
        Just("0x1f".to_string()),
        prop::sample::select(vec![
            "+", "-", "*", "/", "==", "!=", "<", "<=", ">", ">=", "=", "(", ")", "{", "}", "[",
            "]", ".", "..", ";", ":", "::", "->", ",", "^", "&", "@",
        ])
        .prop_map(|s| s.to_string()),
    ]
}

proptest! {
    /// Concatenating token span slices with the whitespace between them
    /// reproduces the source.
    #[test]
    fn lexeme_round_trip(tokens in prop::collection::vec(token_text(), 0..24)) {
        let source = tokens.join(" ");
        let handler = Handler::new();
        let mut lexer = Lexer::new(&source, Symbol::intern("t"), &handler);

        let mut rebuilt = String::new();
        let mut cursor = 0usize;
        loop {
            let token = lexer.next().unwrap();
            if token.kind == TokenKind::Eof {
                break;
            }

            let gap = &source[cursor..token.span.start];
            prop_assert!(gap.bytes().all(|c| c == b' '));
            rebuilt.push_str(gap);
            rebuilt.push_str(&source[token.span.start..token.span.end]);
            cursor = token.span.end;
        }
        rebuilt.push_str(&source[cursor..]);

        prop_assert_eq!(rebuilt, source);
    }
}

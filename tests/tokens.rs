//! Lexer-level properties checked through the public API.

use pretty_assertions::assert_eq;

use xmltok::{tokens, State, Token};

static SAMPLE: &[u8] = include_bytes!("documents/sample.xml");

#[test]
fn expected_token_sequence() {
    let script = b"<my-root foo=\"bar\" bar='baz' />";
    let lexed: Vec<(State, &[u8])> = tokens(script).map(|t| (t.state(), t.value())).collect();
    assert_eq!(
        lexed,
        vec![
            (State::ElementOpen, b"<".as_ref()),
            (State::ElementName, b"my-root".as_ref()),
            (State::ElementSpace, b" ".as_ref()),
            (State::AttrName, b"foo".as_ref()),
            (State::AttrAssign, b"=".as_ref()),
            (State::AttrValDqStart, b"\"".as_ref()),
            (State::AttrValDq, b"bar".as_ref()),
            (State::AttrValDqEnd, b"\"".as_ref()),
            (State::ElementSpace, b" ".as_ref()),
            (State::AttrName, b"bar".as_ref()),
            (State::AttrAssign, b"=".as_ref()),
            (State::AttrValSqStart, b"'".as_ref()),
            (State::AttrValSq, b"baz".as_ref()),
            (State::AttrValSqEnd, b"'".as_ref()),
            (State::ElementSpace, b" ".as_ref()),
            (State::ElementEmptyMarker, b"/".as_ref()),
            (State::ElementEnd, b">".as_ref()),
            (State::Eof, b"".as_ref()),
        ]
    );
}

#[test]
fn lexing_is_contiguous() {
    for script in [
        b"<empty/>".as_ref(),
        b"<a one='1'>text &lt; more</a>".as_ref(),
        b"<?xml version=\"1.0\"?><!DOCTYPE d><d><!-- c --><![CDATA[x]]></d>".as_ref(),
        SAMPLE,
    ] {
        let mut cursor = 0;
        let mut rebuilt = Vec::new();
        for token in tokens(script) {
            assert_eq!(token.start(), cursor);
            cursor = token.end();
            rebuilt.extend_from_slice(token.value());
        }
        // The terminal Eof token is zero-length, so the values tile the
        // whole input exactly.
        assert_eq!(rebuilt, script);
    }
}

#[test]
fn values_are_subslices_of_the_script() {
    for token in tokens(SAMPLE) {
        assert!(token.start() <= token.end());
        assert!(token.end() <= SAMPLE.len());
        assert_eq!(token.script().as_ptr(), SAMPLE.as_ptr());
        assert_eq!(token.value(), &SAMPLE[token.start()..token.end()]);
    }
}

#[test]
fn lexing_is_deterministic() {
    let first: Vec<(State, usize, usize)> = tokens(SAMPLE)
        .map(|t| (t.state(), t.start(), t.end()))
        .collect();
    let second: Vec<(State, usize, usize)> = tokens(SAMPLE)
        .map(|t| (t.state(), t.start(), t.end()))
        .collect();
    assert_eq!(first, second);
}

#[test]
fn quote_families_never_mix() {
    let script = b"<a one='1' two=\"2\" three='&x;' four=\"&#x20;\" />";
    let mut open = None;
    for token in tokens(script) {
        match token.state() {
            State::AttrValSqStart | State::AttrValDqStart => {
                assert_eq!(open, None);
                open = Some(token.state());
            }
            State::AttrValSqEnd => {
                assert_eq!(open, Some(State::AttrValSqStart));
                open = None;
            }
            State::AttrValDqEnd => {
                assert_eq!(open, Some(State::AttrValDqStart));
                open = None;
            }
            _ => {}
        }
    }
    assert_eq!(open, None);
}

#[test]
fn open_and_close_names_match() {
    let mut stack: Vec<&[u8]> = Vec::new();
    for token in tokens(SAMPLE) {
        match token.state() {
            State::ElementName => stack.push(token.value()),
            State::ElementEmptyMarker => {
                stack.pop();
            }
            State::ElementCloseName => {
                assert_eq!(stack.pop(), Some(token.value()));
            }
            _ => {}
        }
    }
    assert_eq!(stack, Vec::<&[u8]>::new());
}

#[test]
fn terminal_token_is_eof_for_the_sample() {
    let last = tokens(SAMPLE).last().unwrap();
    assert_eq!(last.state(), State::Eof);
    assert_eq!(last.value(), b"");
    assert_eq!(last.end(), SAMPLE.len());
}

#[test]
fn init_token_is_empty_start() {
    let token = Token::new(SAMPLE);
    assert_eq!(token.state(), State::Start);
    assert_eq!(token.value(), b"");
    assert_eq!(token.start(), 0);
}

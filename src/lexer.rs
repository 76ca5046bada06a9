//! Zero-copy tokenizer driving the classifier state machine.
//!
//! A [`Token`] pairs a classifier [`State`] with a sub-slice of the input it
//! was lexed from. [`Token::next_raw`] produces the next token by decoding
//! code points at the cursor and merging the run of characters that stay in
//! the same state; the four multi-character forms (`<!DOCTYPE …>`,
//! `<![CDATA[…]]>`, `<!-- … -->`, `<?xml … ?>`) are recognized by dedicated
//! sub-grammars and come back as single tokens.
//!
//! Tokens never copy: successive tokens tile the input contiguously, and a
//! token's value is always a sub-range of the script it was created from.

mod compound;

use crate::classifier::State;

/// A single token: a classifier state plus the slice of the script it covers.
///
/// Tokens are cheap `Copy` values. The script must outlive every token lexed
/// from it, which the `'xml` lifetime enforces.
///
/// # Examples
///
/// ```
/// use xmltok::{State, Token};
///
/// let token = Token::new(b"<greeting/>").next_raw();
/// assert_eq!(token.state(), State::ElementOpen);
/// assert_eq!(token.value(), b"<");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Token<'xml> {
    pub(crate) state: State,
    pub(crate) script: &'xml [u8],
    pub(crate) start: usize,
    pub(crate) end: usize,
}

impl<'xml> Token<'xml> {
    /// Creates the initial token for a script: a zero-length [`State::Start`]
    /// token at offset 0, ready to be advanced with [`Token::next_raw`].
    pub fn new(script: &'xml [u8]) -> Self {
        Token {
            state: State::Start,
            script,
            start: 0,
            end: 0,
        }
    }

    /// The kind of this token.
    #[inline]
    pub fn state(&self) -> State {
        self.state
    }

    /// The bytes this token covers, borrowed from the script.
    #[inline]
    pub fn value(&self) -> &'xml [u8] {
        &self.script[self.start..self.end]
    }

    /// The whole script this token was lexed from.
    #[inline]
    pub fn script(&self) -> &'xml [u8] {
        self.script
    }

    /// Byte offset of the first byte of [`Token::value`] in the script.
    #[inline]
    pub fn start(&self) -> usize {
        self.start
    }

    /// Byte offset one past the last byte of [`Token::value`].
    #[inline]
    pub fn end(&self) -> usize {
        self.end
    }

    /// `true` when this token ends the stream; see [`State::is_terminal`].
    #[inline]
    pub fn is_terminal(&self) -> bool {
        self.state.is_terminal()
    }

    /// This token with state [`State::Unexpected`].
    ///
    /// Handlers return this to cancel parsing early with an error verdict;
    /// outer loops stop on it like on any lexed `Unexpected` token.
    pub fn into_unexpected(self) -> Token<'xml> {
        Token {
            state: State::Unexpected,
            ..self
        }
    }

    /// This token with state [`State::Eof`].
    ///
    /// Handlers return this to cancel parsing early without an error
    /// verdict.
    pub fn into_eof(self) -> Token<'xml> {
        Token {
            state: State::Eof,
            ..self
        }
    }

    /// A zero-length token of the given terminal state at `at`.
    pub(crate) fn terminal_at(&self, state: State, at: usize) -> Token<'xml> {
        Token {
            state,
            script: self.script,
            start: at,
            end: at,
        }
    }

    /// Returns the next raw token of the script.
    ///
    /// The token begins exactly where this one ends. Its state is the state
    /// the classifier entered on the first decoded code point, and its value
    /// is the maximal run of following code points that remain in that state.
    ///
    /// Terminal tokens are absorbing: advancing an [`State::Eof`],
    /// [`State::Unexpected`] or [`State::ParseError`] token returns it
    /// unchanged. An invalid or truncated UTF-8 sequence at the cursor
    /// produces a zero-length `Unexpected` token rather than a silently
    /// shortened value.
    pub fn next_raw(&self) -> Token<'xml> {
        if self.state.is_terminal() {
            return *self;
        }

        let cursor = self.end;
        if self.state == State::ElementOpen {
            if let Some(token) = compound::recognize(*self) {
                return token;
            }
        }

        let rest = &self.script[cursor..];
        let (mut len, state) = match decode(rest) {
            Decoded::Invalid => return self.terminal_at(State::Unexpected, cursor),
            Decoded::End => (0, self.state.step(None)),
            Decoded::Char(c, n) => (n, self.state.step(Some(c))),
        };

        if state == State::Unexpected {
            return self.terminal_at(State::Unexpected, cursor);
        }
        if state == State::Eof {
            return self.terminal_at(State::Eof, cursor);
        }

        // Merge the run of characters that keep the classifier in `state`.
        // A decode failure ends the run; the next call reports it.
        loop {
            match decode(&rest[len..]) {
                Decoded::Char(c, n) if state.step(Some(c)) == state => len += n,
                _ => break,
            }
        }

        Token {
            state,
            script: self.script,
            start: cursor,
            end: cursor + len,
        }
    }
}

/// One decoding step at a cursor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Decoded {
    /// A code point and the number of bytes it occupied.
    Char(char, usize),
    /// The cursor is at the end of the script.
    End,
    /// The bytes at the cursor are not valid UTF-8 (including a multi-byte
    /// sequence truncated by the end of the script).
    Invalid,
}

/// Decodes the single UTF-8 code point at the start of `input`.
pub(crate) fn decode(input: &[u8]) -> Decoded {
    let first = match input.first() {
        Some(&b) => b,
        None => return Decoded::End,
    };
    let len = match first {
        0x00..=0x7F => return Decoded::Char(first as char, 1),
        0xC2..=0xDF => 2,
        0xE0..=0xEF => 3,
        0xF0..=0xF4 => 4,
        _ => return Decoded::Invalid,
    };
    if input.len() < len {
        return Decoded::Invalid;
    }
    match std::str::from_utf8(&input[..len]) {
        Ok(s) => match s.chars().next() {
            Some(c) => Decoded::Char(c, len),
            None => Decoded::Invalid,
        },
        Err(_) => Decoded::Invalid,
    }
}

/// Iterates the raw tokens of a script, starting from [`Token::new`].
///
/// The terminal [`State::Eof`] or [`State::Unexpected`] token is yielded once
/// and then the iterator ends, so iteration terminates for every input.
///
/// # Examples
///
/// ```
/// use xmltok::{tokens, State};
///
/// let states: Vec<State> = tokens(b"<a/>").map(|t| t.state()).collect();
/// assert_eq!(
///     states,
///     [
///         State::ElementOpen,
///         State::ElementName,
///         State::ElementEmptyMarker,
///         State::ElementEnd,
///         State::Eof,
///     ]
/// );
/// ```
pub fn tokens(script: &[u8]) -> Tokens<'_> {
    Tokens {
        token: Token::new(script),
        done: false,
    }
}

/// Iterator returned by [`tokens`].
#[derive(Debug, Clone)]
pub struct Tokens<'xml> {
    token: Token<'xml>,
    done: bool,
}

impl<'xml> Iterator for Tokens<'xml> {
    type Item = Token<'xml>;

    fn next(&mut self) -> Option<Token<'xml>> {
        if self.done {
            return None;
        }
        self.token = self.token.next_raw();
        if self.token.is_terminal() {
            self.done = true;
        }
        Some(self.token)
    }
}

//! Sub-grammars for the four multi-character token forms.
//!
//! When the lexer sits on an [`ElementOpen`](State::ElementOpen) token and
//! the lookahead matches one of `!DOCTYPE`, `![CDATA[`, `!--` or `?xml`, it
//! hands off here. Each sub-grammar consumes everything up to and including
//! its terminator (`>`, `]]>`, `-->`, `?>`) and yields a single compound
//! token; malformed or unterminated content yields a zero-length
//! [`Unexpected`](State::Unexpected) token at the cursor instead.

use memchr::memmem;

use super::{decode, Decoded, Token};
use crate::classifier::{CharClass, State};

const DOCTYPE: &[u8] = b"!DOCTYPE";
const CDATA: &[u8] = b"![CDATA[";
const COMMENT: &[u8] = b"!--";
const XML_DECL: &[u8] = b"?xml";

/// Tries to lex a compound token at the end of an `ElementOpen` token.
/// Returns `None` when the lookahead matches none of the compound forms and
/// the classifier should proceed normally.
pub(super) fn recognize(token: Token<'_>) -> Option<Token<'_>> {
    let rest = &token.script[token.end..];
    if rest.starts_with(DOCTYPE) {
        Some(doctype(token))
    } else if rest.starts_with(CDATA) {
        Some(scan_to(token, CDATA, b"]]>", State::Cdata))
    } else if rest.starts_with(COMMENT) {
        Some(scan_to(token, COMMENT, b"-->", State::Comment))
    } else if rest.starts_with(XML_DECL) && !continues_name(&rest[XML_DECL.len()..]) {
        Some(scan_to(token, XML_DECL, b"?>", State::XmlDecl))
    } else {
        None
    }
}

/// `true` when the next code point extends an element name, meaning the
/// `?xml` prefix actually belongs to a longer processing-instruction target.
fn continues_name(rest: &[u8]) -> bool {
    match decode(rest) {
        Decoded::Char(c, _) => matches!(
            CharClass::of(Some(c)),
            CharClass::NameStart | CharClass::Name | CharClass::Dash
        ),
        _ => false,
    }
}

/// Opaque compound form: everything from `prefix` through `terminator`
/// becomes one token of kind `state`.
fn scan_to<'xml>(
    token: Token<'xml>,
    prefix: &[u8],
    terminator: &[u8],
    state: State,
) -> Token<'xml> {
    let cursor = token.end;
    let rest = &token.script[cursor + prefix.len()..];
    match memmem::find(rest, terminator) {
        Some(i) => Token {
            state,
            script: token.script,
            start: cursor,
            end: cursor + prefix.len() + i + terminator.len(),
        },
        None => token.terminal_at(State::Unexpected, cursor),
    }
}

/// The doctype declaration: `!DOCTYPE`, whitespace, a name, an optional
/// `SYSTEM`/`PUBLIC` external id, then any remaining interior content up to
/// the `>` that balances the declaration.
fn doctype(token: Token<'_>) -> Token<'_> {
    let cursor = token.end;
    let mut scan = Scan {
        script: token.script,
        pos: cursor + DOCTYPE.len(),
    };

    if scan.spaces() == 0 || !scan.name() {
        return token.terminal_at(State::Unexpected, cursor);
    }

    let mark = scan.pos;
    if !scan.external_id() {
        scan.pos = mark;
    }

    if !scan.interior() {
        return token.terminal_at(State::Unexpected, cursor);
    }

    Token {
        state: State::Doctype,
        script: token.script,
        start: cursor,
        end: scan.pos,
    }
}

/// Cursor over the script used by the doctype sub-grammar. Every method
/// consumes what it matched and reports whether it matched.
struct Scan<'xml> {
    script: &'xml [u8],
    pos: usize,
}

impl Scan<'_> {
    fn peek(&self) -> Decoded {
        decode(&self.script[self.pos..])
    }

    fn eat(&mut self, literal: &[u8]) -> bool {
        if self.script[self.pos..].starts_with(literal) {
            self.pos += literal.len();
            true
        } else {
            false
        }
    }

    /// Consumes a run of whitespace, returning the number of bytes taken.
    fn spaces(&mut self) -> usize {
        let start = self.pos;
        while let Decoded::Char(c, n) = self.peek() {
            if CharClass::of(Some(c)) != CharClass::Space {
                break;
            }
            self.pos += n;
        }
        self.pos - start
    }

    /// Consumes one XML name.
    fn name(&mut self) -> bool {
        match self.peek() {
            Decoded::Char(c, n) if CharClass::of(Some(c)) == CharClass::NameStart => {
                self.pos += n
            }
            _ => return false,
        }
        while let Decoded::Char(c, n) = self.peek() {
            match CharClass::of(Some(c)) {
                CharClass::NameStart | CharClass::Name | CharClass::Dash => self.pos += n,
                _ => break,
            }
        }
        true
    }

    /// Consumes `SYSTEM "…"` or `PUBLIC "…" "…"` including the whitespace
    /// before it. The quote characters must match pairwise.
    fn external_id(&mut self) -> bool {
        if self.spaces() == 0 {
            return false;
        }
        if self.eat(b"SYSTEM") {
            self.spaces() > 0 && self.quoted()
        } else if self.eat(b"PUBLIC") {
            self.spaces() > 0 && self.quoted() && self.spaces() > 0 && self.quoted()
        } else {
            false
        }
    }

    /// Consumes one quoted string, either quote kind.
    fn quoted(&mut self) -> bool {
        match self.peek() {
            Decoded::Char(q @ ('\'' | '"'), n) => {
                self.pos += n;
                self.quote_rest(q)
            }
            _ => false,
        }
    }

    /// Consumes up to and including the closing quote.
    fn quote_rest(&mut self, quote: char) -> bool {
        loop {
            match self.peek() {
                Decoded::Char(c, n) => {
                    self.pos += n;
                    if c == quote {
                        return true;
                    }
                }
                _ => return false,
            }
        }
    }

    /// Consumes the remaining declaration content through the closing `>`.
    ///
    /// Quoted strings are skipped atomically and `[`…`]` internal subsets
    /// are balanced, so a `>` inside the subset does not end the token. A
    /// bare `<` outside the subset, an unbalanced bracket or quote, or end
    /// of input is a failure.
    fn interior(&mut self) -> bool {
        let mut depth = 0usize;
        loop {
            match self.peek() {
                Decoded::Char(c, n) => {
                    match c {
                        '>' if depth == 0 => {
                            self.pos += n;
                            return true;
                        }
                        '<' if depth == 0 => return false,
                        '[' => depth += 1,
                        ']' => {
                            if depth == 0 {
                                return false;
                            }
                            depth -= 1;
                        }
                        '\'' | '"' => {
                            self.pos += n;
                            if !self.quote_rest(c) {
                                return false;
                            }
                            continue;
                        }
                        _ => {}
                    }
                    self.pos += n;
                }
                _ => return false,
            }
        }
    }
}

//! Well-formedness checks layered on the parser.
//!
//! [`validate_document`] accepts exactly the documents of this shape:
//! optional whitespace, an optional `<?xml … ?>` declaration, an optional
//! `<!DOCTYPE … >` declaration (in that order, at most one each), exactly
//! one element subtree, then end of input, with whitespace-only text and
//! comments permitted between those pieces. Inside the subtree every open
//! tag must be closed by a tag with a byte-identical name, and nesting
//! deeper than a budget is rejected so handler recursion cannot grow the
//! stack without bound.
//!
//! [`validate_element`] checks a single element subtree with no prolog and
//! no single-root constraint.
//!
//! Validation never mutates the input and is idempotent: repeated calls on
//! the same token yield the same answer.

use crate::classifier::State;
use crate::lexer::Token;
use crate::parser::{is_text, parse, Attribute, Handler, Skip};

/// Default nesting budget for [`validate_document`].
const DOCUMENT_DEPTH: usize = 1000;

/// Default nesting budget for [`validate_element`].
const ELEMENT_DEPTH: usize = 10000;

/// Returns `true` iff the script beginning at `token` is a well-formed XML
/// document.
///
/// # Examples
///
/// ```
/// use xmltok::{validate_document, Token};
///
/// assert!(validate_document(Token::new(
///     b"<?xml version=\"1.0\"?>\n<greeting>hi</greeting>"
/// )));
/// assert!(!validate_document(Token::new(b"<a></a><b></b>")));
/// ```
pub fn validate_document(token: Token<'_>) -> bool {
    validate_document_depth(token, DOCUMENT_DEPTH)
}

/// [`validate_document`] with an explicit nesting budget.
pub fn validate_document_depth(token: Token<'_>, depth: usize) -> bool {
    let mut token = token;
    let mut first_item = true;
    let mut seen_doctype = false;

    // Prolog: whitespace, at most one XML declaration first, at most one
    // doctype after it, comments anywhere, then the root's `<`.
    let root = loop {
        let next = token.next_raw();
        match next.state() {
            State::Start => token = next,
            State::ElementOpen => {
                let after = next.next_raw();
                match after.state() {
                    State::XmlDecl if first_item => {
                        first_item = false;
                        token = after;
                    }
                    State::Doctype if !seen_doctype => {
                        first_item = false;
                        seen_doctype = true;
                        token = after;
                    }
                    State::Comment => {
                        first_item = false;
                        token = after;
                    }
                    State::ElementName => break next,
                    _ => return false,
                }
            }
            state if is_text(state) => {
                if !is_all_space(next.value()) {
                    return false;
                }
                token = next;
            }
            _ => return false,
        }
    };

    let mut validation = Validation::new(depth);
    token = parse(root, &mut validation);
    if !validation.valid || !validation.rooted || token.is_terminal() {
        return false;
    }

    // Only whitespace and comments may follow the root element.
    loop {
        let next = token.next_raw();
        match next.state() {
            State::Eof => return true,
            // The `>` that closes the root.
            State::ElementEnd => token = next,
            State::ElementOpen => {
                let after = next.next_raw();
                if after.state() != State::Comment {
                    return false;
                }
                token = after;
            }
            state if is_text(state) => {
                if !is_all_space(next.value()) {
                    return false;
                }
                token = next;
            }
            _ => return false,
        }
    }
}

/// Returns `true` iff the script beginning at `token` contains one
/// well-formed element subtree. Tokens before the first `<` are skipped;
/// there is no prolog handling and no single-root constraint.
///
/// # Examples
///
/// ```
/// use xmltok::{validate_element, Token};
///
/// assert!(validate_element(Token::new(b"<a><b/></a>")));
/// assert!(!validate_element(Token::new(b"<a><b></a></b>")));
/// ```
pub fn validate_element(token: Token<'_>) -> bool {
    validate_element_depth(token, ELEMENT_DEPTH)
}

/// [`validate_element`] with an explicit nesting budget.
pub fn validate_element_depth(token: Token<'_>, depth: usize) -> bool {
    let mut token = token;
    while token.state() != State::ElementOpen {
        if token.is_terminal() {
            return false;
        }
        token = token.next_raw();
    }

    let mut validation = Validation::new(depth);
    let token = parse(token, &mut validation);

    // The terminal check matters when the handler never ran or when the
    // subtree was cut short by end of input.
    validation.valid && validation.rooted && !token.is_terminal()
}

/// Handler context for validation: a sticky verdict plus the remaining
/// nesting budget.
struct Validation {
    valid: bool,
    rooted: bool,
    depth: usize,
}

impl Validation {
    fn new(depth: usize) -> Self {
        Validation {
            valid: true,
            rooted: false,
            depth,
        }
    }
}

impl<'xml> Handler<'xml> for Validation {
    fn element(
        &mut self,
        mut token: Token<'xml>,
        name: &'xml [u8],
        _attributes: &[Attribute<'xml>],
        empty: bool,
    ) -> Token<'xml> {
        if !self.valid {
            return token;
        }
        self.rooted = true;

        if self.depth == 0 {
            self.valid = false;
            return token;
        }
        self.depth -= 1;

        if !empty {
            while token.state() != State::ElementCloseName {
                // An XML declaration below the prolog can never be valid.
                if token.state() == State::XmlDecl {
                    self.valid = false;
                    return token;
                }
                token = parse(token, self);
                if token.is_terminal() || !self.valid {
                    self.valid = false;
                    return token;
                }
            }
            self.valid = token.value() == name;
            token = parse(token, &mut Skip);
        }

        self.depth += 1;
        token
    }
}

/// Whitespace per the XML grammar (blank, tab, carriage return, new line).
#[inline]
fn is_whitespace(b: u8) -> bool {
    matches!(b, b' ' | b'\r' | b'\n' | b'\t')
}

fn is_all_space(value: &[u8]) -> bool {
    value.iter().copied().all(is_whitespace)
}

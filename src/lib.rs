//! A streaming, zero-copy XML 1.0 lexer, parser and well-formedness
//! validator.
//!
//! The crate is built as three thin layers over one borrowed byte slice:
//!
//! * [`State`] is a closed set of classifier states forming the lexical state
//!   machine; [`State::step`] maps one code point to the successor state.
//! * [`Token`] is a `(state, slice)` pair produced by [`Token::next_raw`],
//!   which merges runs of same-state characters and lexes doctype, CDATA,
//!   comment and XML-declaration forms as single compound tokens.
//! * [`parse`] consumes tokens one structural unit at a time and invokes a
//!   [`Handler`] for elements (with their attributes) and text runs.
//!   Handlers return the next cursor token, so a callback can recursively
//!   [`parse`] its children without any intermediate tree.
//!
//! [`validate_document`] and [`validate_element`] sit on top of the parser
//! and check element nesting, the single-root rule, prolog ordering and a
//! nesting-depth bound.
//!
//! Errors are data, not panics: malformed input surfaces as tokens whose
//! state is [`State::Unexpected`] (or [`State::ParseError`] from the owning
//! wrapper), and every token loop is expected to stop on
//! [`Token::is_terminal`]. Nothing is ever copied out of the input: names,
//! attribute values and text are sub-slices of the original script, and
//! entity references like `&amp;` are passed through unexpanded.
//!
//! # Examples
//!
//! ```
//! use xmltok::{parse, validate_document, Attribute, Handler, Token};
//!
//! let script = b"<greeting lang=\"en\">Hello, world!</greeting>";
//! assert!(validate_document(Token::new(script)));
//!
//! #[derive(Default)]
//! struct Collect {
//!     titles: Vec<String>,
//! }
//!
//! impl<'xml> Handler<'xml> for Collect {
//!     fn text(
//!         &mut self,
//!         token: xmltok::Token<'xml>,
//!         text: &'xml [u8],
//!     ) -> xmltok::Token<'xml> {
//!         self.titles.push(String::from_utf8_lossy(text).into_owned());
//!         token
//!     }
//! }
//!
//! let mut collect = Collect::default();
//! let mut token = Token::new(script);
//! while !token.is_terminal() {
//!     token = parse(token, &mut collect);
//! }
//! assert_eq!(collect.titles, ["Hello, world!"]);
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod classifier;
mod lexer;
mod parser;
mod validator;

pub use crate::classifier::State;
pub use crate::lexer::{tokens, Token, Tokens};
pub use crate::parser::{parse, parse_cstr, Attribute, CStrHandler, Handler, Skip};
pub use crate::validator::{
    validate_document, validate_document_depth, validate_element, validate_element_depth,
};

//! Structural parser: turns raw tokens into element and text events.
//!
//! [`parse`] advances by exactly one syntactic unit per call (one element
//! open tag with its attributes, or one run of character data) and hands
//! the event to a [`Handler`]. Handlers receive the current token and return
//! a (possibly advanced) token, which is what makes recursive descent work
//! without an intermediate tree: an element callback may itself call
//! [`parse`] in a loop to consume the element's children up to its closing
//! tag.
//!
//! Everything is borrowed. Element names, attribute names and values, and
//! text slices all point into the original script; entity references are
//! passed through unexpanded. [`parse_cstr`] layers NUL-terminated owned
//! copies on top for callers that need them.

use std::ffi::{CStr, CString};

use crate::classifier::State;
use crate::lexer::Token;

/// One attribute of an element, in document order.
///
/// The value slice spans the interior of the quotes; references like
/// `&quot;` inside it are not expanded.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Attribute<'xml> {
    /// Attribute name, borrowed from the script.
    pub name: &'xml [u8],
    /// Attribute value between the quotes, borrowed from the script.
    pub value: &'xml [u8],
}

/// Callbacks invoked by [`parse`], one structural unit at a time.
///
/// Both methods default to returning the token unchanged, so implementing
/// neither (or only one) skips the corresponding events while the parser
/// still consumes exactly the tokens of each unit. Handler state lives in
/// `self`; there is no separate context pointer.
///
/// A handler that observes a terminal token must return it unchanged so
/// outer loops can stop.
pub trait Handler<'xml> {
    /// Called for every element open tag.
    ///
    /// `token` sits on the tag's closing marker: [`State::ElementEmptyMarker`]
    /// when `empty` is `true`, [`State::ElementEnd`] otherwise. `empty` is
    /// only `true` for self-closing tags; `<a></a>` is two units, not an
    /// empty element. The attribute slice lives for this call only.
    fn element(
        &mut self,
        token: Token<'xml>,
        name: &'xml [u8],
        attributes: &[Attribute<'xml>],
        empty: bool,
    ) -> Token<'xml> {
        let _ = (name, attributes, empty);
        token
    }

    /// Called for every run of character data, with consecutive text and
    /// reference tokens coalesced into one `text` slice. `token` sits on the
    /// last token of the run.
    fn text(&mut self, token: Token<'xml>, text: &'xml [u8]) -> Token<'xml> {
        let _ = text;
        token
    }
}

/// The do-nothing [`Handler`]: every event is skipped, every unit is still
/// consumed.
#[derive(Debug, Default, Clone, Copy)]
pub struct Skip;

impl<'xml> Handler<'xml> for Skip {}

/// Advances by one structural unit and returns the resulting token.
///
/// If the token after `token` begins an element open tag, the element's
/// name, attributes and self-closing flag are collected and
/// [`Handler::element`] decides the new cursor. If it begins character
/// data, the run is coalesced and [`Handler::text`] decides. Any other
/// token (closing-tag pieces, compound tokens, terminals) is returned
/// as-is.
///
/// Once a token reaches [`State::Unexpected`] or [`State::ParseError`],
/// further calls return the same state without decoding any more input.
///
/// # Examples
///
/// ```
/// use xmltok::{parse, Attribute, Handler, Token};
///
/// struct Names(Vec<String>);
///
/// impl<'xml> Handler<'xml> for Names {
///     fn element(
///         &mut self,
///         token: Token<'xml>,
///         name: &'xml [u8],
///         _attributes: &[Attribute<'xml>],
///         _empty: bool,
///     ) -> Token<'xml> {
///         self.0.push(String::from_utf8_lossy(name).into_owned());
///         token
///     }
/// }
///
/// let mut names = Names(Vec::new());
/// let mut token = Token::new(b"<a><b/></a>");
/// while !token.is_terminal() {
///     token = parse(token, &mut names);
/// }
/// assert_eq!(names.0, ["a", "b"]);
/// ```
pub fn parse<'xml, H>(token: Token<'xml>, handler: &mut H) -> Token<'xml>
where
    H: Handler<'xml> + ?Sized,
{
    let token = token.next_raw();
    if token.state() == State::ElementName {
        handle_element(token, handler)
    } else if is_text(token.state()) {
        handle_text(token, handler)
    } else {
        token
    }
}

/// Token kinds that belong to an attribute value run, either quote family.
fn is_attribute_value(state: State) -> bool {
    matches!(
        state,
        State::AttrValSq
            | State::AttrValSqEntStart
            | State::AttrValSqEnt
            | State::AttrValDq
            | State::AttrValDqEntStart
            | State::AttrValDqEnt
    )
}

/// Token kinds that belong to a character-data run.
pub(crate) fn is_text(state: State) -> bool {
    matches!(state, State::Text | State::TextEntStart | State::TextEnt)
}

/// Collects one element open tag starting at its name token and dispatches
/// the handler once the closing marker is reached.
fn handle_element<'xml, H>(mut token: Token<'xml>, handler: &mut H) -> Token<'xml>
where
    H: Handler<'xml> + ?Sized,
{
    let name = token.value();

    token = token.next_raw();
    if token.state() == State::Unexpected {
        return token;
    }

    let mut attributes = Vec::new();
    while token.state() == State::ElementSpace {
        token = token.next_raw();
        if token.state() == State::AttrName {
            let attr_name = token.value();
            token = token.next_raw();
            if token.state() == State::AttrExpectAssign {
                token = token.next_raw();
            }
            if token.state() == State::AttrAssign {
                token = token.next_raw();
            }
            if matches!(token.state(), State::AttrValSqStart | State::AttrValDqStart) {
                token = token.next_raw();
            }
            let (value, after) = attribute_value(token);
            attributes.push(Attribute {
                name: attr_name,
                value,
            });
            token = after.next_raw();
        }
    }

    match token.state() {
        State::ElementEmptyMarker => handler.element(token, name, &attributes, true),
        State::ElementEnd => handler.element(token, name, &attributes, false),
        // Unexpected, or end of input mid-tag; the handler never runs.
        _ => token,
    }
}

/// Coalesces the value run starting at `token`. Returns the value slice and
/// the first token after the run (the closing quote when the value is
/// non-empty, `token` itself when it is empty).
fn attribute_value<'xml>(token: Token<'xml>) -> (&'xml [u8], Token<'xml>) {
    if !is_attribute_value(token.state()) {
        return (&token.script[token.start..token.start], token);
    }
    let start = token.start;
    let mut end = token.end;
    let mut next = token.next_raw();
    while is_attribute_value(next.state()) {
        end = next.end;
        next = next.next_raw();
    }
    (&token.script[start..end], next)
}

/// Coalesces the character-data run starting at `token` and dispatches the
/// handler with the token positioned on the run's last token.
fn handle_text<'xml, H>(token: Token<'xml>, handler: &mut H) -> Token<'xml>
where
    H: Handler<'xml> + ?Sized,
{
    let start = token.start;
    let mut last = token;
    let mut next = token.next_raw();
    while is_text(next.state()) {
        last = next;
        next = next.next_raw();
    }
    handler.text(last, &token.script[start..last.end])
}

/// Callbacks for [`parse_cstr`], receiving NUL-terminated owned copies
/// instead of borrowed slices.
///
/// Like [`Handler`], both methods default to skipping the event.
pub trait CStrHandler<'xml> {
    /// Called for every element open tag; see [`Handler::element`].
    /// Attribute pairs are `(name, value)` in document order.
    fn element(
        &mut self,
        token: Token<'xml>,
        name: &CStr,
        attributes: &[(CString, CString)],
        empty: bool,
    ) -> Token<'xml> {
        let _ = (name, attributes, empty);
        token
    }

    /// Called for every run of character data; see [`Handler::text`].
    fn text(&mut self, token: Token<'xml>, text: &CStr) -> Token<'xml> {
        let _ = text;
        token
    }
}

/// Convenience variant of [`parse`] that allocates NUL-terminated copies of
/// the element name, every attribute name and value, and text before
/// invoking the handler, and frees them when the handler returns, on every
/// exit path, including the failure path below.
///
/// When a copy cannot be made (the slice contains an interior NUL byte), the
/// returned token carries [`State::ParseError`], which is terminal and ends
/// parsing like [`State::Unexpected`].
pub fn parse_cstr<'xml, H>(token: Token<'xml>, handler: &mut H) -> Token<'xml>
where
    H: CStrHandler<'xml>,
{
    parse(token, &mut CStrAdapter { inner: handler })
}

/// Bridges [`CStrHandler`] onto the borrowing [`Handler`].
struct CStrAdapter<'h, H> {
    inner: &'h mut H,
}

impl<'xml, H> Handler<'xml> for CStrAdapter<'_, H>
where
    H: CStrHandler<'xml>,
{
    fn element(
        &mut self,
        token: Token<'xml>,
        name: &'xml [u8],
        attributes: &[Attribute<'xml>],
        empty: bool,
    ) -> Token<'xml> {
        let name = match CString::new(name) {
            Ok(name) => name,
            Err(_) => return parse_error(token),
        };
        let mut pairs = Vec::with_capacity(attributes.len());
        for attribute in attributes {
            let pair = match (
                CString::new(attribute.name),
                CString::new(attribute.value),
            ) {
                (Ok(name), Ok(value)) => (name, value),
                _ => return parse_error(token),
            };
            pairs.push(pair);
        }
        self.inner.element(token, &name, &pairs, empty)
    }

    fn text(&mut self, token: Token<'xml>, text: &'xml [u8]) -> Token<'xml> {
        let text = match CString::new(text) {
            Ok(text) => text,
            Err(_) => return parse_error(token),
        };
        self.inner.text(token, &text)
    }
}

fn parse_error(token: Token<'_>) -> Token<'_> {
    Token {
        state: State::ParseError,
        ..token
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::lexer::Token;
    use pretty_assertions::assert_eq;

    /// Test handler that records every event as owned strings.
    #[derive(Debug, Default)]
    struct Events {
        log: Vec<String>,
    }

    impl<'xml> Handler<'xml> for Events {
        fn element(
            &mut self,
            token: Token<'xml>,
            name: &'xml [u8],
            attributes: &[Attribute<'xml>],
            empty: bool,
        ) -> Token<'xml> {
            let attributes: Vec<String> = attributes
                .iter()
                .map(|a| {
                    format!(
                        "{}={}",
                        String::from_utf8_lossy(a.name),
                        String::from_utf8_lossy(a.value)
                    )
                })
                .collect();
            self.log.push(format!(
                "element {} [{}] empty={}",
                String::from_utf8_lossy(name),
                attributes.join(","),
                empty
            ));
            token
        }

        fn text(&mut self, token: Token<'xml>, text: &'xml [u8]) -> Token<'xml> {
            self.log
                .push(format!("text {:?}", String::from_utf8_lossy(text)));
            token
        }
    }

    /// Drives `parse` over the whole script and returns the event log.
    fn events(script: &[u8]) -> Vec<String> {
        let mut handler = Events::default();
        let mut token = Token::new(script);
        while !token.is_terminal() {
            token = parse(token, &mut handler);
        }
        handler.log
    }

    #[test]
    fn empty_element() {
        assert_eq!(events(b"<empty/>"), ["element empty [] empty=true"]);
    }

    #[test]
    fn attributes_in_document_order() {
        assert_eq!(
            events(b"<element first='firstval' second = \"secondval\" third=''></element>"),
            ["element element [first=firstval,second=secondval,third=] empty=false"]
        );
    }

    #[test]
    fn text_node() {
        assert_eq!(
            events(b"<text>Hello, world!</text>"),
            ["element text [] empty=false", "text \"Hello, world!\""]
        );
    }

    #[test]
    fn entities_are_not_expanded() {
        assert_eq!(
            events(b"<element>this &amp; that</element>"),
            [
                "element element [] empty=false",
                "text \"this &amp; that\""
            ]
        );
    }

    #[test]
    fn entity_in_attribute_value() {
        assert_eq!(
            events(b"<a b='x&lt;y' />"),
            ["element a [b=x&lt;y] empty=true"]
        );
    }

    #[test]
    fn open_close_pair_is_not_empty() {
        assert_eq!(events(b"<a></a>"), ["element a [] empty=false"]);
    }

    #[test]
    fn question_mark_self_close() {
        // `?>` ends a `?`-named element the same way `/>` ends an ordinary
        // one.
        assert_eq!(events(b"<?pi?>"), ["element ?pi [] empty=true"]);
    }

    #[test]
    fn siblings_and_nesting() {
        assert_eq!(
            events(b"<a><b x='1'/>mid<c></c></a>"),
            [
                "element a [] empty=false",
                "element b [x=1] empty=true",
                "text \"mid\"",
                "element c [] empty=false",
            ]
        );
    }

    #[test]
    fn whitespace_between_elements_is_text() {
        assert_eq!(
            events(b"<a> <b/> </a>"),
            [
                "element a [] empty=false",
                "text \" \"",
                "element b [] empty=true",
                "text \" \"",
            ]
        );
    }

    #[test]
    fn handler_receives_closing_marker() {
        struct Markers(Vec<State>);
        impl<'xml> Handler<'xml> for Markers {
            fn element(
                &mut self,
                token: Token<'xml>,
                _name: &'xml [u8],
                _attributes: &[Attribute<'xml>],
                _empty: bool,
            ) -> Token<'xml> {
                self.0.push(token.state());
                token
            }
        }

        let mut markers = Markers(Vec::new());
        let mut token = Token::new(b"<a><b/></a>");
        while !token.is_terminal() {
            token = parse(token, &mut markers);
        }
        assert_eq!(markers.0, [State::ElementEnd, State::ElementEmptyMarker]);
    }

    #[test]
    fn skip_consumes_whole_units() {
        let script = b"<a b='c' d=\"e\">text</a>";
        let mut token = Token::new(script);

        // First unit: only the `<` is before the element name.
        token = parse(token, &mut Skip);
        assert_eq!(token.state(), State::ElementOpen);

        // Second unit: the whole open tag through its `>`.
        token = parse(token, &mut Skip);
        assert_eq!(token.state(), State::ElementEnd);
        assert_eq!(token.end(), script.iter().position(|&b| b == b'>').unwrap() + 1);

        // Third unit: the whole text run, cursor on its last token.
        token = parse(token, &mut Skip);
        assert_eq!(token.state(), State::Text);
        assert_eq!(token.value(), b"text");
    }

    #[test]
    fn recursive_descent_from_a_handler() {
        /// Counts elements by recursing into children from the callback.
        struct Depths {
            depth: usize,
            max: usize,
        }

        impl<'xml> Handler<'xml> for Depths {
            fn element(
                &mut self,
                mut token: Token<'xml>,
                _name: &'xml [u8],
                _attributes: &[Attribute<'xml>],
                empty: bool,
            ) -> Token<'xml> {
                self.depth += 1;
                self.max = self.max.max(self.depth);
                if !empty {
                    while token.state() != State::ElementCloseName {
                        token = parse(token, self);
                        if token.is_terminal() {
                            break;
                        }
                    }
                }
                self.depth -= 1;
                token
            }
        }

        let mut depths = Depths { depth: 0, max: 0 };
        let mut token = Token::new(b"<a><b><c/></b><d/></a>");
        while !token.is_terminal() {
            token = parse(token, &mut depths);
        }
        assert_eq!(depths.max, 3);
    }

    #[test]
    fn malformed_tag_returns_unexpected_without_dispatch() {
        let mut handler = Events::default();
        let mut token = Token::new(b"<a =>");
        while !token.is_terminal() {
            token = parse(token, &mut handler);
        }
        assert_eq!(token.state(), State::Unexpected);
        assert_eq!(handler.log, Vec::<String>::new());
    }

    #[test]
    fn cstr_copies_match_the_slices() {
        #[derive(Default)]
        struct COwned {
            log: Vec<String>,
        }

        impl<'xml> CStrHandler<'xml> for COwned {
            fn element(
                &mut self,
                token: Token<'xml>,
                name: &CStr,
                attributes: &[(CString, CString)],
                empty: bool,
            ) -> Token<'xml> {
                let attributes: Vec<String> = attributes
                    .iter()
                    .map(|(n, v)| {
                        format!("{}={}", n.to_str().unwrap(), v.to_str().unwrap())
                    })
                    .collect();
                self.log.push(format!(
                    "element {} [{}] empty={}",
                    name.to_str().unwrap(),
                    attributes.join(","),
                    empty
                ));
                token
            }

            fn text(&mut self, token: Token<'xml>, text: &CStr) -> Token<'xml> {
                self.log.push(format!("text {}", text.to_str().unwrap()));
                token
            }
        }

        let mut handler = COwned::default();
        let mut token = Token::new(b"<greet lang='en'>hi</greet>");
        while !token.is_terminal() {
            token = parse_cstr(token, &mut handler);
        }
        assert_eq!(
            handler.log,
            ["element greet [lang=en] empty=false", "text hi"]
        );
    }
}

//! Character-level state machine over the XML 1.0 lexical grammar.
//!
//! The classifier is a pure transition function: [`State::step`] maps the
//! current state and one decoded code point to the successor state. The lexer
//! layers on top of it by merging runs of characters that stay in the same
//! state into tokens, so every [`State`] doubles as a token kind.
//!
//! The state set is closed and matched exhaustively, which keeps the
//! transition table auditable against the grammar productions in
//! <https://www.w3.org/TR/REC-xml/#sec-documents> line by line.

/// Character classes the classifier derives from each code point before
/// dispatching on the current state.
///
/// Punctuation that the grammar names explicitly gets its own class; all
/// remaining code points fall into the `NameStart`/`Name`/`Space`/`Text`
/// buckets, with `Eof` covering both U+0000 and the end-of-input mark.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum CharClass {
    Eof,
    NameStart,
    Name,
    Space,
    Text,
    /// `=`
    Equals,
    /// `#`
    Hash,
    /// `<`
    OpenBracket,
    /// `>`
    CloseBracket,
    /// `"`
    DoubleQuote,
    /// `'`
    SingleQuote,
    /// `%`
    RefStart,
    /// `&`
    EntityStart,
    /// `;`
    EntityEnd,
    /// `!`
    Bang,
    /// `-`
    Dash,
    /// `?`
    Question,
    /// `/`
    Slash,
}

impl CharClass {
    /// Classifies one decoded code point; `None` is the end-of-input mark.
    pub(crate) fn of(input: Option<char>) -> Self {
        let c = match input {
            Some(c) => c,
            None => return CharClass::Eof,
        };
        match c {
            '=' => CharClass::Equals,
            '#' => CharClass::Hash,
            '<' => CharClass::OpenBracket,
            '>' => CharClass::CloseBracket,
            '"' => CharClass::DoubleQuote,
            '\'' => CharClass::SingleQuote,
            '%' => CharClass::RefStart,
            '&' => CharClass::EntityStart,
            ';' => CharClass::EntityEnd,
            '!' => CharClass::Bang,
            '-' => CharClass::Dash,
            '?' => CharClass::Question,
            '/' => CharClass::Slash,
            ' ' | '\t' | '\r' | '\n' => CharClass::Space,
            '\0' => CharClass::Eof,
            c if is_name_start(c) => CharClass::NameStart,
            c if is_name(c) => CharClass::Name,
            _ => CharClass::Text,
        }
    }
}

/// `NameStartChar` from the XML 1.0 grammar, minus the punctuation handled
/// above.
fn is_name_start(c: char) -> bool {
    matches!(c, ':' | '_')
        || c.is_alphabetic()
        || matches!(c,
            '\u{C0}'..='\u{D6}'
            | '\u{D8}'..='\u{F6}'
            | '\u{F8}'..='\u{2FF}'
            | '\u{370}'..='\u{37D}'
            | '\u{37F}'..='\u{1FFF}'
            | '\u{200C}'..='\u{200D}'
            | '\u{2070}'..='\u{218F}'
            | '\u{2C00}'..='\u{2FEF}'
            | '\u{3001}'..='\u{D7FF}'
            | '\u{F900}'..='\u{FDCF}'
            | '\u{FDF0}'..='\u{FFFD}'
            | '\u{10000}'..='\u{EFFFF}')
}

/// The `NameChar` additions over `NameStartChar`. `-` is excluded here
/// because it has its own punctuation class; states that admit it in names
/// match [`CharClass::Dash`] explicitly.
fn is_name(c: char) -> bool {
    c == '.'
        || c.is_ascii_digit()
        || c == '\u{B7}'
        || matches!(c, '\u{300}'..='\u{36F}' | '\u{203F}'..='\u{2040}')
}

/// A node of the lexical state machine, doubling as the kind tag of the
/// tokens the lexer produces.
///
/// Three values are *terminal*: [`State::Eof`] (legitimate end of input),
/// [`State::Unexpected`] (lexical or structural violation) and
/// [`State::ParseError`] (allocation-layer failure in the owning parse
/// wrapper). They are error-surfacing constants, never real transitions, and
/// [`State::step`] panics when invoked on them: a caller that runs a terminal
/// state has skipped the check every loop over tokens is required to make.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum State {
    /// Before any markup; also covers leading whitespace.
    Start,
    /// The `<` of an opening tag.
    ElementOpen,
    /// An element name, including the `!`/`?` pseudo-names of markup the
    /// compound-token layer does not claim.
    ElementName,
    /// Whitespace inside an open tag, before an attribute or the tag end.
    ElementSpace,
    /// The `/` or `?` of a self-closing tag.
    ElementEmptyMarker,
    /// The `>` closing any tag.
    ElementEnd,
    /// The `/` of a closing tag.
    ElementClose,
    /// The name in a closing tag.
    ElementCloseName,
    /// Whitespace between a closing tag's name and its `>`.
    ElementCloseSpace,
    /// An attribute name.
    AttrName,
    /// Whitespace between an attribute name and its `=`.
    AttrExpectAssign,
    /// The `=` of an attribute, including any whitespace after it.
    AttrAssign,
    /// The opening `'` of a single-quoted attribute value.
    AttrValSqStart,
    /// Literal content of a single-quoted attribute value.
    AttrValSq,
    /// The `&` or `%` opening a reference inside a single-quoted value.
    AttrValSqEntStart,
    /// The body of a reference inside a single-quoted value.
    AttrValSqEnt,
    /// The closing `'` of a single-quoted attribute value.
    AttrValSqEnd,
    /// The opening `"` of a double-quoted attribute value.
    AttrValDqStart,
    /// Literal content of a double-quoted attribute value.
    AttrValDq,
    /// The `&` or `%` opening a reference inside a double-quoted value.
    AttrValDqEntStart,
    /// The body of a reference inside a double-quoted value.
    AttrValDqEnt,
    /// The closing `"` of a double-quoted attribute value.
    AttrValDqEnd,
    /// Character data between tags.
    Text,
    /// The `&` or `%` opening a reference inside text.
    TextEntStart,
    /// The body of a reference inside text.
    TextEnt,
    /// A whole `<!DOCTYPE … >` declaration (compound token).
    Doctype,
    /// A whole `<![CDATA[ … ]]>` section (compound token).
    Cdata,
    /// A whole `<!-- … -->` comment (compound token).
    Comment,
    /// A whole `<?xml … ?>` declaration (compound token).
    XmlDecl,
    /// End of input reached in a position where that is legitimate.
    Eof,
    /// The input violated the XML grammar.
    Unexpected,
    /// The owning parse wrapper failed to allocate a copy.
    ParseError,
}

impl State {
    /// Returns the successor state for one decoded code point; `None` is the
    /// end-of-input mark.
    ///
    /// # Panics
    ///
    /// Panics when `self` is a terminal state; see [`State::is_terminal`].
    pub fn step(self, input: Option<char>) -> State {
        use CharClass::*;

        let class = CharClass::of(input);
        match self {
            State::Start => match class {
                OpenBracket => State::ElementOpen,
                Space => State::Start,
                // An empty document is not a valid XML document, so end of
                // input here is as unexpected as any stray character.
                _ => State::Unexpected,
            },
            State::ElementOpen => match class {
                Bang | Question | NameStart => State::ElementName,
                Slash => State::ElementClose,
                _ => State::Unexpected,
            },
            State::ElementName => match class {
                NameStart | Name | Dash => State::ElementName,
                Space => State::ElementSpace,
                CloseBracket => State::ElementEnd,
                Slash | Question => State::ElementEmptyMarker,
                _ => State::Unexpected,
            },
            State::ElementSpace => match class {
                NameStart => State::AttrName,
                Space => State::ElementSpace,
                CloseBracket => State::ElementEnd,
                Slash | Question => State::ElementEmptyMarker,
                _ => State::Unexpected,
            },
            State::ElementEmptyMarker => match class {
                CloseBracket => State::ElementEnd,
                _ => State::Unexpected,
            },
            // Compound tokens end at their `>`, so they continue exactly
            // like the `>` of an ordinary tag.
            State::ElementEnd
            | State::Doctype
            | State::Cdata
            | State::Comment
            | State::XmlDecl => match class {
                Eof => State::Eof,
                OpenBracket => State::ElementOpen,
                CloseBracket => State::Unexpected,
                EntityStart | RefStart => State::TextEntStart,
                _ => State::Text,
            },
            State::ElementClose => match class {
                NameStart => State::ElementCloseName,
                _ => State::Unexpected,
            },
            State::ElementCloseName => match class {
                NameStart | Name => State::ElementCloseName,
                Space => State::ElementCloseSpace,
                CloseBracket => State::ElementEnd,
                _ => State::Unexpected,
            },
            State::ElementCloseSpace => match class {
                Space => State::ElementCloseSpace,
                CloseBracket => State::ElementEnd,
                _ => State::Unexpected,
            },
            State::AttrName => match class {
                NameStart | Name => State::AttrName,
                Equals => State::AttrAssign,
                Space => State::AttrExpectAssign,
                _ => State::Unexpected,
            },
            State::AttrExpectAssign => match class {
                Equals => State::AttrAssign,
                Space => State::AttrExpectAssign,
                _ => State::Unexpected,
            },
            State::AttrAssign => match class {
                Space => State::AttrAssign,
                SingleQuote => State::AttrValSqStart,
                DoubleQuote => State::AttrValDqStart,
                _ => State::Unexpected,
            },
            // The start state behaves exactly like the value state; it only
            // exists to keep the quote character out of the value token.
            State::AttrValSqStart | State::AttrValSq => match class {
                // AttValue excludes `<` outright.
                OpenBracket | Eof => State::Unexpected,
                SingleQuote => State::AttrValSqEnd,
                EntityStart | RefStart => State::AttrValSqEntStart,
                _ => State::AttrValSq,
            },
            State::AttrValSqEntStart => entity_start(class, State::AttrValSqEnt),
            State::AttrValSqEnt => {
                entity_cont(class, State::AttrValSqEnt, State::AttrValSq)
            }
            State::AttrValDqStart | State::AttrValDq => match class {
                OpenBracket | Eof => State::Unexpected,
                DoubleQuote => State::AttrValDqEnd,
                EntityStart | RefStart => State::AttrValDqEntStart,
                _ => State::AttrValDq,
            },
            State::AttrValDqEntStart => entity_start(class, State::AttrValDqEnt),
            State::AttrValDqEnt => {
                entity_cont(class, State::AttrValDqEnt, State::AttrValDq)
            }
            State::AttrValSqEnd | State::AttrValDqEnd => match class {
                CloseBracket => State::ElementEnd,
                Space => State::ElementSpace,
                Slash | Question => State::ElementEmptyMarker,
                _ => State::Unexpected,
            },
            State::Text => match class {
                OpenBracket => State::ElementOpen,
                EntityStart | RefStart => State::TextEntStart,
                Eof => State::Eof,
                CloseBracket => State::Unexpected,
                _ => State::Text,
            },
            State::TextEntStart => entity_start(class, State::TextEnt),
            State::TextEnt => entity_cont(class, State::TextEnt, State::Text),
            State::Eof | State::Unexpected | State::ParseError => panic!(
                "stepped a terminal classifier state ({:?}); \
                 token loops must check for terminal tokens",
                self
            ),
        }
    }

    /// `true` for the three inert states that end a token stream.
    #[inline]
    pub fn is_terminal(self) -> bool {
        matches!(self, State::Eof | State::Unexpected | State::ParseError)
    }
}

/// First character of a reference body: a name start or `#` (character
/// references like `&#x20;`).
fn entity_start(class: CharClass, cont: State) -> State {
    match class {
        CharClass::NameStart | CharClass::Hash => cont,
        _ => State::Unexpected,
    }
}

/// Continuation of a reference body, terminated by `;` which hands control
/// back to the surrounding context.
fn entity_cont(class: CharClass, cont: State, end: State) -> State {
    match class {
        CharClass::NameStart | CharClass::Name => cont,
        CharClass::EntityEnd => end,
        _ => State::Unexpected,
    }
}

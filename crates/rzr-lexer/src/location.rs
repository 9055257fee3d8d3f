//! Source positions.
//!
//! `absolute_index` is a byte offset into the UTF-8 source and is the single
//! source of truth. `line_index` and `character_index` are derived from it and
//! cached for diagnostics. All three are 0-based.

use std::fmt;

/// A position in source text.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SourceLocation {
    pub absolute_index: usize,
    pub line_index: usize,
    pub character_index: usize,
}

impl SourceLocation {
    /// The start of a document.
    pub const ZERO: SourceLocation = SourceLocation::new(0, 0, 0);

    pub const fn new(absolute_index: usize, line_index: usize, character_index: usize) -> Self {
        Self {
            absolute_index,
            line_index,
            character_index,
        }
    }

    /// The location reached after reading `text` starting from this one.
    pub fn advance(self, text: &str) -> Self {
        let mut location = self;
        let mut chars = text.chars().peekable();
        while let Some(c) = chars.next() {
            location.advance_char(c, chars.peek().copied());
        }
        location
    }

    /// Step over a single character. `next` is the character that follows it,
    /// needed so that `\r\n` only counts as one line break.
    pub fn advance_char(&mut self, c: char, next: Option<char>) {
        self.absolute_index += c.len_utf8();
        if is_line_break(c) && !(c == '\r' && next == Some('\n')) {
            self.line_index += 1;
            self.character_index = 0;
        } else {
            self.character_index += 1;
        }
    }
}

impl fmt::Display for SourceLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "({}:{},{})",
            self.absolute_index, self.line_index, self.character_index
        )
    }
}

/// Characters that end a line.
pub fn is_line_break(c: char) -> bool {
    matches!(c, '\n' | '\r' | '\u{85}' | '\u{2028}' | '\u{2029}')
}

/// Whitespace that is not a line break.
pub fn is_inline_whitespace(c: char) -> bool {
    c.is_whitespace() && !is_line_break(c)
}

/// A value paired with the location where it begins.
///
/// Used for fragments whose original position must survive tree rewrites,
/// such as attribute prefixes and literal attribute values.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct LocationTagged<T> {
    pub value: T,
    pub location: SourceLocation,
}

impl<T> LocationTagged<T> {
    pub fn new(value: T, location: SourceLocation) -> Self {
        Self { value, location }
    }
}

impl LocationTagged<String> {
    /// An empty string tagged at `location`.
    pub fn empty(location: SourceLocation) -> Self {
        Self::new(String::new(), location)
    }

    /// Shorthand used heavily by tests: value plus raw location triple.
    pub fn at(value: impl Into<String>, absolute: usize, line: usize, column: usize) -> Self {
        Self::new(value.into(), SourceLocation::new(absolute, line, column))
    }
}

impl<T: fmt::Display> fmt::Display for LocationTagged<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}@{})", self.value, self.location)
    }
}

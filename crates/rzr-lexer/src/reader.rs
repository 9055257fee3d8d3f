use crate::location::SourceLocation;

/// Forward-only character cursor over a source document.
///
/// Both tokenizers read through one of these. A reader can be opened at any
/// location, which is how a parser resumes tokenizing after another language
/// has consumed part of the input.
#[derive(Debug, Clone)]
pub struct SourceReader<'a> {
    source: &'a str,
    location: SourceLocation,
}

impl<'a> SourceReader<'a> {
    pub fn new(source: &'a str, start: SourceLocation) -> Self {
        Self {
            source,
            location: start,
        }
    }

    pub fn source(&self) -> &'a str {
        self.source
    }

    pub fn location(&self) -> SourceLocation {
        self.location
    }

    /// Unread remainder of the source.
    pub fn rest(&self) -> &'a str {
        self.source.get(self.location.absolute_index..).unwrap_or("")
    }

    /// Text between `start` and the current position.
    pub fn slice_from(&self, start: SourceLocation) -> &'a str {
        self.source
            .get(start.absolute_index..self.location.absolute_index)
            .unwrap_or("")
    }

    pub fn is_at_end(&self) -> bool {
        self.location.absolute_index >= self.source.len()
    }

    /// Current character, `'\0'` at end of input.
    pub fn peek(&self) -> char {
        self.peek_at(0)
    }

    pub fn peek_next(&self) -> char {
        self.peek_at(1)
    }

    pub fn peek_at(&self, n: usize) -> char {
        self.rest().chars().nth(n).unwrap_or('\0')
    }

    pub fn starts_with(&self, text: &str) -> bool {
        self.rest().starts_with(text)
    }

    pub fn advance(&mut self) {
        let mut chars = self.rest().chars();
        if let Some(c) = chars.next() {
            self.location.advance_char(c, chars.next());
        }
    }

    pub fn advance_n(&mut self, n: usize) {
        for _ in 0..n {
            self.advance();
        }
    }

    /// Advance while `predicate` holds for the current character.
    pub fn advance_while(&mut self, predicate: impl Fn(char) -> bool) {
        while !self.is_at_end() && predicate(self.peek()) {
            self.advance();
        }
    }

    /// Advance until `text` is at the cursor (not consumed) or input ends.
    /// Returns whether `text` was found.
    pub fn advance_until(&mut self, text: &str) -> bool {
        while !self.is_at_end() {
            if self.starts_with(text) {
                return true;
            }
            self.advance();
        }
        false
    }
}

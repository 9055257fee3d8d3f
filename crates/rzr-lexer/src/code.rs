//! Tokenizer for the embedded code language.
//!
//! Covers the lexical grammar of a C-family statement language: identifiers,
//! numbers, regular and verbatim strings, character literals, line and block
//! comments, brackets and operators. Keywords are not classified here; which
//! identifiers are reserved is parser configuration.

use crate::location::{is_inline_whitespace, is_line_break, SourceLocation};
use crate::reader::SourceReader;
use crate::symbol::{scan_comment_piece, CommentPiece, CommentState, Symbol};
use crate::Tokenizer;

/// Code symbol classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CodeSymbolKind {
    Identifier,
    IntegerLiteral,
    RealLiteral,
    StringLiteral,
    CharacterLiteral,
    Comment,
    WhiteSpace,
    NewLine,
    Transition,
    RazorCommentTransition,
    RazorCommentStar,
    RazorComment,
    LeftParenthesis,
    RightParenthesis,
    LeftBracket,
    RightBracket,
    LeftBrace,
    RightBrace,
    Dot,
    Semicolon,
    Colon,
    Comma,
    LessThan,
    GreaterThan,
    QuestionMark,
    Assign,
    Operator,
    Unknown,
}

impl CodeSymbolKind {
    /// Whitespace, newlines and comments.
    pub fn is_trivia(self) -> bool {
        matches!(
            self,
            CodeSymbolKind::WhiteSpace | CodeSymbolKind::NewLine | CodeSymbolKind::Comment
        )
    }
}

pub type CodeSymbol = Symbol<CodeSymbolKind>;

/// Pull-based code tokenizer.
pub struct CodeTokenizer<'a> {
    reader: SourceReader<'a>,
    comment: CommentState,
}

impl<'a> CodeTokenizer<'a> {
    /// Tokenize a whole string. Mostly useful in tests.
    pub fn tokenize(source: &'a str) -> Vec<CodeSymbol> {
        CodeTokenizer::new(source, SourceLocation::ZERO).collect()
    }

    fn scan(&mut self) -> Option<CodeSymbol> {
        let start = self.reader.location();

        if self.comment != CommentState::Outside {
            if let Some(piece) = scan_comment_piece(&mut self.comment, &mut self.reader) {
                let kind = match piece {
                    CommentPiece::Star => CodeSymbolKind::RazorCommentStar,
                    CommentPiece::Body => CodeSymbolKind::RazorComment,
                    CommentPiece::Transition => CodeSymbolKind::RazorCommentTransition,
                };
                return Some(self.symbol(kind, start));
            }
        }

        if self.reader.is_at_end() {
            return None;
        }

        let ch = self.reader.peek();
        let kind = match ch {
            c if is_line_break(c) => {
                if c == '\r' && self.reader.peek_next() == '\n' {
                    self.reader.advance();
                }
                self.reader.advance();
                CodeSymbolKind::NewLine
            }
            c if is_inline_whitespace(c) => {
                self.reader.advance_while(is_inline_whitespace);
                CodeSymbolKind::WhiteSpace
            }
            '@' => match self.reader.peek_next() {
                '"' => {
                    self.reader.advance();
                    self.scan_verbatim_string();
                    CodeSymbolKind::StringLiteral
                }
                '*' => {
                    self.reader.advance();
                    self.comment = CommentState::OpeningStar;
                    CodeSymbolKind::RazorCommentTransition
                }
                _ => {
                    self.reader.advance();
                    CodeSymbolKind::Transition
                }
            },
            c if c.is_alphabetic() || c == '_' => {
                self.reader.advance_while(|c| c.is_alphanumeric() || c == '_');
                CodeSymbolKind::Identifier
            }
            c if c.is_ascii_digit() => self.scan_number(),
            '.' if self.reader.peek_next().is_ascii_digit() => self.scan_number(),
            '"' => {
                self.scan_quoted('"');
                CodeSymbolKind::StringLiteral
            }
            '\'' => {
                self.scan_quoted('\'');
                CodeSymbolKind::CharacterLiteral
            }
            '/' if self.reader.peek_next() == '/' => {
                self.reader.advance_while(|c| !is_line_break(c));
                CodeSymbolKind::Comment
            }
            '/' if self.reader.peek_next() == '*' => {
                self.reader.advance_n(2);
                if self.reader.advance_until("*/") {
                    self.reader.advance_n(2);
                }
                CodeSymbolKind::Comment
            }
            c => {
                self.reader.advance();
                match c {
                    '(' => CodeSymbolKind::LeftParenthesis,
                    ')' => CodeSymbolKind::RightParenthesis,
                    '[' => CodeSymbolKind::LeftBracket,
                    ']' => CodeSymbolKind::RightBracket,
                    '{' => CodeSymbolKind::LeftBrace,
                    '}' => CodeSymbolKind::RightBrace,
                    '.' => CodeSymbolKind::Dot,
                    ';' => CodeSymbolKind::Semicolon,
                    ':' => CodeSymbolKind::Colon,
                    ',' => CodeSymbolKind::Comma,
                    '<' => CodeSymbolKind::LessThan,
                    '>' => CodeSymbolKind::GreaterThan,
                    '?' => CodeSymbolKind::QuestionMark,
                    '=' => match self.reader.peek() {
                        '=' | '>' => {
                            self.reader.advance();
                            CodeSymbolKind::Operator
                        }
                        _ => CodeSymbolKind::Assign,
                    },
                    '+' | '-' | '*' | '/' | '%' | '&' | '|' | '^' | '!' | '~' => {
                        let next = self.reader.peek();
                        let doubled = next == c && matches!(c, '+' | '-' | '&' | '|');
                        let arrow = c == '-' && next == '>';
                        if doubled || arrow || (next == '=' && c != '~') {
                            self.reader.advance();
                        }
                        CodeSymbolKind::Operator
                    }
                    _ => CodeSymbolKind::Unknown,
                }
            }
        };

        Some(self.symbol(kind, start))
    }

    fn scan_number(&mut self) -> CodeSymbolKind {
        let mut kind = CodeSymbolKind::IntegerLiteral;
        self.reader.advance_while(|c| c.is_ascii_alphanumeric() || c == '_');
        if self.reader.peek() == '.' && self.reader.peek_next().is_ascii_digit() {
            kind = CodeSymbolKind::RealLiteral;
            self.reader.advance();
            self.reader
                .advance_while(|c| c.is_ascii_alphanumeric() || c == '_');
        }
        kind
    }

    /// `"..."` or `'...'`. Stops at an unescaped quote, a line break or the
    /// end of input; an unterminated literal just ends early.
    fn scan_quoted(&mut self, quote: char) {
        self.reader.advance();
        while !self.reader.is_at_end() {
            match self.reader.peek() {
                c if c == quote => {
                    self.reader.advance();
                    return;
                }
                '\\' => {
                    self.reader.advance();
                    if !is_line_break(self.reader.peek()) {
                        self.reader.advance();
                    }
                }
                c if is_line_break(c) => return,
                _ => self.reader.advance(),
            }
        }
    }

    /// `@"..."` where `""` is an escaped quote and line breaks are allowed.
    /// The cursor is on the opening quote.
    fn scan_verbatim_string(&mut self) {
        self.reader.advance();
        while !self.reader.is_at_end() {
            if self.reader.peek() == '"' {
                self.reader.advance();
                if self.reader.peek() != '"' {
                    return;
                }
            }
            self.reader.advance();
        }
    }

    fn symbol(&self, kind: CodeSymbolKind, start: SourceLocation) -> CodeSymbol {
        Symbol::new(kind, self.reader.slice_from(start), start)
    }
}

impl<'a> Tokenizer<'a> for CodeTokenizer<'a> {
    type Kind = CodeSymbolKind;

    fn new(source: &'a str, start: SourceLocation) -> Self {
        Self {
            reader: SourceReader::new(source, start),
            comment: CommentState::Outside,
        }
    }

    fn next_symbol(&mut self) -> Option<CodeSymbol> {
        self.scan()
    }

    fn location(&self) -> SourceLocation {
        self.reader.location()
    }
}

impl Iterator for CodeTokenizer<'_> {
    type Item = CodeSymbol;

    fn next(&mut self) -> Option<CodeSymbol> {
        self.scan()
    }
}

//! Markup tokenizer.
//!
//! Splits markup into structural single-character symbols (`<`, `>`, `=`,
//! quotes, ...), whitespace and newline runs, transition markers and text
//! runs. It never fails: anything it does not recognise ends up in a `Text`
//! symbol, and whether a `<` actually opens a tag is the parser's call.

use crate::location::{is_inline_whitespace, is_line_break, SourceLocation};
use crate::reader::SourceReader;
use crate::symbol::{scan_comment_piece, CommentPiece, CommentState, Symbol};
use crate::Tokenizer;

/// Markup symbol classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HtmlSymbolKind {
    Text,
    WhiteSpace,
    NewLine,
    OpenAngle,
    Bang,
    ForwardSlash,
    QuestionMark,
    DoubleHyphen,
    LeftBracket,
    CloseAngle,
    RightBracket,
    Equals,
    DoubleQuote,
    SingleQuote,
    Transition,
    RazorCommentTransition,
    RazorCommentStar,
    RazorComment,
}

pub type HtmlSymbol = Symbol<HtmlSymbolKind>;

/// Pull-based markup tokenizer.
pub struct HtmlTokenizer<'a> {
    reader: SourceReader<'a>,
    comment: CommentState,
    escaped_transition: bool,
}

impl<'a> HtmlTokenizer<'a> {
    /// Tokenize a whole document. Mostly useful in tests.
    pub fn tokenize(source: &'a str) -> Vec<HtmlSymbol> {
        HtmlTokenizer::new(source, SourceLocation::ZERO).collect()
    }

    fn scan(&mut self) -> Option<HtmlSymbol> {
        let start = self.reader.location();

        if self.comment != CommentState::Outside {
            if let Some(piece) = scan_comment_piece(&mut self.comment, &mut self.reader) {
                let kind = match piece {
                    CommentPiece::Star => HtmlSymbolKind::RazorCommentStar,
                    CommentPiece::Body => HtmlSymbolKind::RazorComment,
                    CommentPiece::Transition => HtmlSymbolKind::RazorCommentTransition,
                };
                return Some(self.symbol(kind, start));
            }
        }

        if self.reader.is_at_end() {
            return None;
        }

        if self.escaped_transition {
            // Second half of `@@`: always a plain transition, even before `*`.
            self.escaped_transition = false;
            self.reader.advance();
            return Some(self.symbol(HtmlSymbolKind::Transition, start));
        }

        let ch = self.reader.peek();
        let kind = match ch {
            c if is_line_break(c) => {
                if c == '\r' && self.reader.peek_next() == '\n' {
                    self.reader.advance();
                }
                self.reader.advance();
                HtmlSymbolKind::NewLine
            }
            c if is_inline_whitespace(c) => {
                self.reader.advance_while(is_inline_whitespace);
                HtmlSymbolKind::WhiteSpace
            }
            '@' => {
                self.reader.advance();
                match self.reader.peek() {
                    '*' => {
                        self.comment = CommentState::OpeningStar;
                        HtmlSymbolKind::RazorCommentTransition
                    }
                    '@' => {
                        self.escaped_transition = true;
                        HtmlSymbolKind::Transition
                    }
                    _ => HtmlSymbolKind::Transition,
                }
            }
            '-' if self.reader.peek_next() == '-' => {
                self.reader.advance_n(2);
                HtmlSymbolKind::DoubleHyphen
            }
            c => match structural_kind(c) {
                Some(kind) => {
                    self.reader.advance();
                    kind
                }
                None => {
                    self.scan_text();
                    HtmlSymbolKind::Text
                }
            },
        };

        Some(self.symbol(kind, start))
    }

    /// Read a text run. An `@` sandwiched between two letters or digits is
    /// taken as part of the text (`user@example.com`), not a transition.
    fn scan_text(&mut self) {
        let mut prev = '\0';
        loop {
            while !self.reader.is_at_end() && !self.at_text_boundary() {
                prev = self.reader.peek();
                self.reader.advance();
            }
            if self.reader.peek() == '@'
                && prev.is_alphanumeric()
                && self.reader.peek_next().is_alphanumeric()
            {
                prev = '@';
                self.reader.advance();
                continue;
            }
            break;
        }
    }

    fn at_text_boundary(&self) -> bool {
        let c = self.reader.peek();
        c.is_whitespace()
            || c == '@'
            || structural_kind(c).is_some()
            || (c == '-' && self.reader.peek_next() == '-')
    }

    fn symbol(&self, kind: HtmlSymbolKind, start: SourceLocation) -> HtmlSymbol {
        Symbol::new(kind, self.reader.slice_from(start), start)
    }
}

fn structural_kind(c: char) -> Option<HtmlSymbolKind> {
    let kind = match c {
        '<' => HtmlSymbolKind::OpenAngle,
        '!' => HtmlSymbolKind::Bang,
        '/' => HtmlSymbolKind::ForwardSlash,
        '?' => HtmlSymbolKind::QuestionMark,
        '[' => HtmlSymbolKind::LeftBracket,
        '>' => HtmlSymbolKind::CloseAngle,
        ']' => HtmlSymbolKind::RightBracket,
        '=' => HtmlSymbolKind::Equals,
        '"' => HtmlSymbolKind::DoubleQuote,
        '\'' => HtmlSymbolKind::SingleQuote,
        _ => return None,
    };
    Some(kind)
}

impl<'a> Tokenizer<'a> for HtmlTokenizer<'a> {
    type Kind = HtmlSymbolKind;

    fn new(source: &'a str, start: SourceLocation) -> Self {
        Self {
            reader: SourceReader::new(source, start),
            comment: CommentState::Outside,
            escaped_transition: false,
        }
    }

    fn next_symbol(&mut self) -> Option<HtmlSymbol> {
        self.scan()
    }

    fn location(&self) -> SourceLocation {
        self.reader.location()
    }
}

impl Iterator for HtmlTokenizer<'_> {
    type Item = HtmlSymbol;

    fn next(&mut self) -> Option<HtmlSymbol> {
        self.scan()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use HtmlSymbolKind::*;

    fn kinds(source: &str) -> Vec<(HtmlSymbolKind, String)> {
        HtmlTokenizer::tokenize(source)
            .into_iter()
            .map(|s| (s.kind, s.content))
            .collect()
    }

    fn sym(kind: HtmlSymbolKind, content: &str) -> (HtmlSymbolKind, String) {
        (kind, content.to_string())
    }

    // =========================================================================
    // Basics
    // =========================================================================

    #[test]
    fn test_empty_source() {
        assert!(HtmlTokenizer::tokenize("").is_empty());
    }

    #[test]
    fn test_text_and_whitespace() {
        assert_eq!(
            kinds("foo  bar"),
            vec![sym(Text, "foo"), sym(WhiteSpace, "  "), sym(Text, "bar")]
        );
    }

    #[test]
    fn test_newlines() {
        assert_eq!(
            kinds("a\r\nb\nc\r"),
            vec![
                sym(Text, "a"),
                sym(NewLine, "\r\n"),
                sym(Text, "b"),
                sym(NewLine, "\n"),
                sym(Text, "c"),
                sym(NewLine, "\r"),
            ]
        );
    }

    #[test]
    fn test_tag_symbols() {
        assert_eq!(
            kinds("<p class='x'/>"),
            vec![
                sym(OpenAngle, "<"),
                sym(Text, "p"),
                sym(WhiteSpace, " "),
                sym(Text, "class"),
                sym(Equals, "="),
                sym(SingleQuote, "'"),
                sym(Text, "x"),
                sym(SingleQuote, "'"),
                sym(ForwardSlash, "/"),
                sym(CloseAngle, ">"),
            ]
        );
    }

    #[test]
    fn test_html_comment_symbols() {
        assert_eq!(
            kinds("<!--x-->"),
            vec![
                sym(OpenAngle, "<"),
                sym(Bang, "!"),
                sym(DoubleHyphen, "--"),
                sym(Text, "x"),
                sym(DoubleHyphen, "--"),
                sym(CloseAngle, ">"),
            ]
        );
    }

    #[test]
    fn test_single_hyphen_is_text() {
        assert_eq!(kinds("a-b"), vec![sym(Text, "a-b")]);
    }

    #[test]
    fn test_dollar_brace_is_text() {
        assert_eq!(kinds("${bar}"), vec![sym(Text, "${bar}")]);
    }

    // =========================================================================
    // Transitions
    // =========================================================================

    #[test]
    fn test_transition() {
        assert_eq!(
            kinds("foo @bar"),
            vec![
                sym(Text, "foo"),
                sym(WhiteSpace, " "),
                sym(Transition, "@"),
                sym(Text, "bar"),
            ]
        );
    }

    #[test]
    fn test_escaped_transition() {
        assert_eq!(kinds("@@"), vec![sym(Transition, "@"), sym(Transition, "@")]);
    }

    #[test]
    fn test_triple_transition() {
        assert_eq!(
            kinds("@@@Foo"),
            vec![
                sym(Transition, "@"),
                sym(Transition, "@"),
                sym(Transition, "@"),
                sym(Text, "Foo"),
            ]
        );
    }

    #[test]
    fn test_email_stays_text() {
        assert_eq!(
            kinds("anurse@microsoft.com"),
            vec![sym(Text, "anurse@microsoft.com")]
        );
    }

    #[test]
    fn test_email_in_attribute_value() {
        assert_eq!(
            kinds("\"mailto:anurse@microsoft.com\""),
            vec![
                sym(DoubleQuote, "\""),
                sym(Text, "mailto:anurse@microsoft.com"),
                sym(DoubleQuote, "\""),
            ]
        );
    }

    #[test]
    fn test_escaped_transition_splits_email_like_text() {
        assert_eq!(
            kinds("abc@@def.com"),
            vec![
                sym(Text, "abc"),
                sym(Transition, "@"),
                sym(Transition, "@"),
                sym(Text, "def.com"),
            ]
        );
    }

    #[test]
    fn test_at_after_punctuation_is_transition() {
        assert_eq!(
            kinds("'@boz'"),
            vec![
                sym(SingleQuote, "'"),
                sym(Transition, "@"),
                sym(Text, "boz"),
                sym(SingleQuote, "'"),
            ]
        );
    }

    // =========================================================================
    // Razor comments
    // =========================================================================

    #[test]
    fn test_razor_comment() {
        assert_eq!(
            kinds("@* hi *@x"),
            vec![
                sym(RazorCommentTransition, "@"),
                sym(RazorCommentStar, "*"),
                sym(RazorComment, " hi "),
                sym(RazorCommentStar, "*"),
                sym(RazorCommentTransition, "@"),
                sym(Text, "x"),
            ]
        );
    }

    #[test]
    fn test_empty_razor_comment_has_no_body_symbol() {
        assert_eq!(
            kinds("@**@"),
            vec![
                sym(RazorCommentTransition, "@"),
                sym(RazorCommentStar, "*"),
                sym(RazorCommentStar, "*"),
                sym(RazorCommentTransition, "@"),
            ]
        );
    }

    #[test]
    fn test_unterminated_razor_comment() {
        assert_eq!(
            kinds("@* open"),
            vec![
                sym(RazorCommentTransition, "@"),
                sym(RazorCommentStar, "*"),
                sym(RazorComment, " open"),
            ]
        );
    }

    #[test]
    fn test_escaped_transition_before_star_is_not_comment() {
        assert_eq!(
            kinds("@@*"),
            vec![sym(Transition, "@"), sym(Transition, "@"), sym(Text, "*")]
        );
    }

    // =========================================================================
    // Positions
    // =========================================================================

    #[test]
    fn test_symbol_locations() {
        let symbols = HtmlTokenizer::tokenize("a\nb");
        assert_eq!(symbols[2].start, SourceLocation::new(2, 1, 0));
    }

    #[test]
    fn test_start_mid_document() {
        let source = "foo @bar baz";
        let start = SourceLocation::new(8, 0, 8);
        let symbols: Vec<_> = HtmlTokenizer::new(source, start).collect();
        assert_eq!(symbols[0].content, " ");
        assert_eq!(symbols[1].start, SourceLocation::new(9, 0, 9));
    }

    #[test]
    fn test_round_trip() {
        let source = "<a href=\"x@y.z\">@@ @foo <!-- c --></a>\r\n@* c *@";
        let joined: String = HtmlTokenizer::tokenize(source)
            .into_iter()
            .map(|s| s.content)
            .collect();
        assert_eq!(joined, source);
    }
}

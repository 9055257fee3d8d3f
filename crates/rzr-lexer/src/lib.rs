//! rzr Lexer
//!
//! Location model and the two tokenizers used by the template parser:
//! a markup tokenizer and a tokenizer for the embedded code language.
//! Both are pull-based, never fail, and can be (re)started at any
//! `SourceLocation`, which is how the parser switches between them.
//!
//! # Example
//!
//! ```
//! use rzr_lexer::{HtmlSymbolKind, HtmlTokenizer};
//!
//! let symbols = HtmlTokenizer::tokenize("<p>@name</p>");
//! assert_eq!(symbols[0].kind, HtmlSymbolKind::OpenAngle);
//! assert_eq!(symbols[3].kind, HtmlSymbolKind::Transition);
//! ```

pub mod code;
pub mod html;
pub mod location;
pub mod reader;
pub mod symbol;

pub use code::{CodeSymbol, CodeSymbolKind, CodeTokenizer};
pub use html::{HtmlSymbol, HtmlSymbolKind, HtmlTokenizer};
pub use location::{LocationTagged, SourceLocation};
pub use reader::SourceReader;
pub use symbol::Symbol;

/// The transition marker: switches from markup into code.
pub const TRANSITION: char = '@';

/// Common contract of both tokenizers.
///
/// `next_symbol` returns `None` at end of input; there is no error case.
pub trait Tokenizer<'a>: Sized {
    type Kind: Copy + Eq + std::fmt::Debug;

    /// Open a tokenizer over `source`, positioned at `start`.
    fn new(source: &'a str, start: SourceLocation) -> Self;

    fn next_symbol(&mut self) -> Option<Symbol<Self::Kind>>;

    /// Where the next symbol will start.
    fn location(&self) -> SourceLocation;
}

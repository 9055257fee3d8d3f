//! rzr Parser
//!
//! Parses mixed markup and code templates into a syntax tree of spans and
//! blocks. The markup parser drives the parse and hands control to a
//! pluggable code language at each `@` transition; the code language hands
//! control back for nested markup. Every character of the input ends up in
//! exactly one span, so concatenating span contents reproduces the source.
//!
//! ```
//! use rzr_parser::{BlockType, RazorParser};
//!
//! let results = RazorParser::new().parse("<p>Hello @name!</p>");
//! assert!(results.success());
//! assert_eq!(results.document.kind, BlockType::Markup);
//! assert_eq!(results.document.content(), "<p>Hello @name!</p>");
//! ```

pub mod code;
pub mod context;
pub mod errors;
pub mod generator;
pub mod markup;
pub mod tree;

#[cfg(test)]
mod factory;

pub use code::{CodeLanguage, CodeParser};
pub use context::{ParserContext, ParserOptions, SymbolStream, DEFAULT_KEYWORDS, MAX_NESTING_DEPTH};
pub use errors::{messages, ErrorSink, ParserError, RazorError};
pub use generator::{BlockCodeGenerator, SpanCodeGenerator};
pub use markup::MarkupParser;
pub use tree::{
    AcceptedCharacters, Block, BlockBuilder, BlockType, EditHandler, Span, SpanBuilder, SpanKind, Spans,
    SyntaxTreeNode,
};

/// The outcome of a parse: a tree covering the whole input plus every
/// diagnostic found along the way.
#[derive(Debug, Clone, PartialEq)]
pub struct ParserResults {
    pub document: Block,
    pub errors: Vec<RazorError>,
}

impl ParserResults {
    pub fn new(document: Block, errors: Vec<RazorError>) -> Self {
        Self { document, errors }
    }

    /// True when no diagnostics were recorded.
    pub fn success(&self) -> bool {
        self.errors.is_empty()
    }
}

/// Parses whole documents with a configured code language.
pub struct RazorParser {
    options: ParserOptions,
    language: Box<dyn CodeLanguage>,
}

impl RazorParser {
    pub fn new() -> Self {
        Self {
            options: ParserOptions::default(),
            language: Box::new(CodeParser),
        }
    }

    pub fn with_options(mut self, options: ParserOptions) -> Self {
        self.options = options;
        self
    }

    pub fn with_language(mut self, language: impl CodeLanguage + 'static) -> Self {
        self.language = Box::new(language);
        self
    }

    pub fn options(&self) -> &ParserOptions {
        &self.options
    }

    pub fn parse(&self, source: &str) -> ParserResults {
        let context = ParserContext::new(source, &self.options, self.language.as_ref());
        markup::parse_document(context)
    }
}

impl Default for RazorParser {
    fn default() -> Self {
        Self::new()
    }
}

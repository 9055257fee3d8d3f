//! Shared parsing state.
//!
//! The markup parser and the code language never own the input. Both read
//! it through a `SymbolStream` over their own tokenizer and hand control to
//! each other through `ParserContext`, which records where the other side
//! stopped.

use crate::code::CodeLanguage;
use crate::errors::{messages, ErrorSink, RazorError};
use crate::generator::{BlockCodeGenerator, SpanCodeGenerator};
use crate::markup::{self, MarkupMode};
use crate::tree::{AcceptedCharacters, Block, BlockBuilder, BlockType, Span, SpanKind};
use rzr_lexer::{SourceLocation, SourceReader, Symbol, Tokenizer};
use std::collections::{BTreeSet, VecDeque};

/// Keywords that start a statement block after `@`. `else` only ever
/// continues an `if`.
pub const DEFAULT_KEYWORDS: &[&str] = &[
    "if", "else", "for", "foreach", "while", "do", "switch", "try", "lock", "using", "section",
];

/// Most markup blocks and section bodies open at once. Each level nests a
/// code parser and a markup parser on the call stack.
pub const MAX_NESTING_DEPTH: usize = 64;

/// Tunables for a parse.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParserOptions {
    /// Identifiers recognized as block keywords right after `@`.
    pub keywords: BTreeSet<String>,
    /// Marks an editor-driven parse. Only reported in traces; parsing is
    /// the same either way.
    pub design_time: bool,
}

impl Default for ParserOptions {
    fn default() -> Self {
        Self {
            keywords: DEFAULT_KEYWORDS.iter().map(|k| k.to_string()).collect(),
            design_time: false,
        }
    }
}

impl ParserOptions {
    pub fn is_keyword(&self, identifier: &str) -> bool {
        self.keywords.contains(identifier)
    }
}

/// State shared by every parser taking part in one parse.
pub struct ParserContext<'a> {
    source: &'a str,
    location: SourceLocation,
    errors: ErrorSink,
    options: &'a ParserOptions,
    language: &'a dyn CodeLanguage,
    last_accepted: AcceptedCharacters,
    open_blocks: Vec<BlockType>,
}

impl<'a> ParserContext<'a> {
    pub fn new(source: &'a str, options: &'a ParserOptions, language: &'a dyn CodeLanguage) -> Self {
        Self {
            source,
            location: SourceLocation::ZERO,
            errors: ErrorSink::new(),
            options,
            language,
            last_accepted: AcceptedCharacters::None,
            open_blocks: Vec::new(),
        }
    }

    pub fn source(&self) -> &'a str {
        self.source
    }

    /// Where the next parser should pick up.
    pub fn location(&self) -> SourceLocation {
        self.location
    }

    pub fn set_location(&mut self, location: SourceLocation) {
        self.location = location;
    }

    pub fn is_at_end(&self) -> bool {
        self.location.absolute_index >= self.source.len()
    }

    pub fn options(&self) -> &'a ParserOptions {
        self.options
    }

    pub fn errors(&self) -> &ErrorSink {
        &self.errors
    }

    pub fn on_error(&mut self, message: impl Into<String>, location: SourceLocation, length: usize) {
        self.errors.on_error(message, location, length);
    }

    pub fn into_errors(self) -> Vec<RazorError> {
        self.errors.into_errors()
    }

    /// Accepted characters of the most recently emitted span, by any parser.
    pub fn last_accepted(&self) -> AcceptedCharacters {
        self.last_accepted
    }

    pub fn set_last_accepted(&mut self, accepted: AcceptedCharacters) {
        self.last_accepted = accepted;
    }

    pub fn enter(&mut self, kind: BlockType) {
        self.open_blocks.push(kind);
    }

    pub fn exit(&mut self) {
        self.open_blocks.pop();
    }

    /// Whether a block of this type is open anywhere up the parser chain.
    pub fn is_within(&self, kind: BlockType) -> bool {
        self.open_blocks.contains(&kind)
    }

    // ========================================================================
    // Mode switches
    // ========================================================================

    /// Hand control to the code language. `transition` is the already
    /// consumed `@` span; the location must point just past it.
    pub fn parse_code(&mut self, transition: Span, accept_trailing_dot: bool) -> Block {
        tracing::trace!(location = %self.location, "switching to code");
        let language = self.language;
        language.parse_block(self, transition, accept_trailing_dot)
    }

    /// Parse a tag-balanced (or `@:` single line) markup block embedded in
    /// code, starting at the current location. Returns `None`, after
    /// reporting it, when the nesting limit is reached.
    pub fn parse_markup_block(&mut self) -> Option<Block> {
        if !self.can_nest() {
            return None;
        }
        tracing::trace!(location = %self.location, "switching to markup block");
        self.enter(BlockType::Markup);
        let block = markup::parse(self, MarkupMode::Block);
        self.exit();
        Some(block)
    }

    /// Parse a section body up to (not including) its closing `}`. Returns
    /// `None`, after reporting it, when the nesting limit is reached.
    pub fn parse_markup_section(&mut self) -> Option<Block> {
        if !self.can_nest() {
            return None;
        }
        tracing::trace!(location = %self.location, "switching to markup section");
        self.enter(BlockType::Section);
        let block = markup::parse(self, MarkupMode::Section);
        self.exit();
        Some(block)
    }

    fn can_nest(&mut self) -> bool {
        if self.open_blocks.len() < MAX_NESTING_DEPTH {
            return true;
        }
        tracing::debug!(location = %self.location, "nesting limit reached");
        self.on_error(messages::nesting_too_deep(MAX_NESTING_DEPTH), self.location, 1);
        false
    }

    /// Parse a `@* ... *@` comment starting at the current location.
    ///
    /// Both tokenizers split comments the same way, so this reads the source
    /// directly and both sides share it.
    pub fn parse_razor_comment(&mut self) -> Block {
        let start = self.location;
        let mut reader = SourceReader::new(self.source, start);
        let mut block = BlockBuilder::new(BlockType::Comment);
        block.generator = BlockCodeGenerator::RazorComment;

        let mut emit = |reader: &mut SourceReader<'_>, from: SourceLocation, kind: SpanKind| {
            let mut span = Span::new(kind, reader.slice_from(from), from);
            span.generator = SpanCodeGenerator::Null;
            if kind != SpanKind::Comment {
                span.accepted_characters = AcceptedCharacters::None;
            }
            block.push(span);
        };

        reader.advance();
        emit(&mut reader, start, SpanKind::Transition);
        let star = reader.location();
        reader.advance();
        emit(&mut reader, star, SpanKind::MetaCode);

        let body = reader.location();
        let terminated = reader.advance_until("*@");
        emit(&mut reader, body, SpanKind::Comment);

        if terminated {
            let star = reader.location();
            reader.advance();
            emit(&mut reader, star, SpanKind::MetaCode);
            let transition = reader.location();
            reader.advance();
            emit(&mut reader, transition, SpanKind::Transition);
        } else {
            self.on_error(messages::RAZOR_COMMENT_NOT_TERMINATED, start, 2);
        }

        self.location = reader.location();
        self.last_accepted = if terminated {
            AcceptedCharacters::None
        } else {
            AcceptedCharacters::Any
        };
        block.build()
    }
}

/// A tokenizer with unlimited lookahead and the ability to restart at any
/// location.
pub struct SymbolStream<'a, T: Tokenizer<'a>> {
    source: &'a str,
    tokenizer: T,
    ahead: VecDeque<Symbol<T::Kind>>,
}

impl<'a, T: Tokenizer<'a>> SymbolStream<'a, T> {
    pub fn new(source: &'a str, start: SourceLocation) -> Self {
        let mut stream = Self {
            source,
            tokenizer: T::new(source, start),
            ahead: VecDeque::new(),
        };
        stream.fill(0);
        stream
    }

    fn fill(&mut self, n: usize) {
        while self.ahead.len() <= n {
            match self.tokenizer.next_symbol() {
                Some(symbol) => self.ahead.push_back(symbol),
                None => break,
            }
        }
    }

    pub fn current(&self) -> Option<&Symbol<T::Kind>> {
        self.ahead.front()
    }

    pub fn current_kind(&self) -> Option<T::Kind> {
        self.current().map(|s| s.kind)
    }

    pub fn at(&self, kind: T::Kind) -> bool {
        self.current_kind() == Some(kind)
    }

    pub fn is_at_end(&self) -> bool {
        self.ahead.is_empty()
    }

    /// The symbol `n` positions after the current one.
    pub fn peek(&mut self, n: usize) -> Option<&Symbol<T::Kind>> {
        self.fill(n);
        self.ahead.get(n)
    }

    pub fn peek_kind(&mut self, n: usize) -> Option<T::Kind> {
        self.peek(n).map(|s| s.kind)
    }

    /// Take the current symbol and move to the next one.
    pub fn advance(&mut self) -> Option<Symbol<T::Kind>> {
        let symbol = self.ahead.pop_front();
        self.fill(0);
        symbol
    }

    /// Start of the current symbol, or the end of input.
    pub fn location(&self) -> SourceLocation {
        match self.current() {
            Some(symbol) => symbol.start,
            None => self.tokenizer.location(),
        }
    }

    /// Drop all lookahead and restart tokenizing at `location`.
    pub fn reset(&mut self, location: SourceLocation) {
        self.tokenizer = T::new(self.source, location);
        self.ahead.clear();
        self.fill(0);
    }
}

//! Syntax tree.
//!
//! A document is a tree of `Block`s whose leaves are `Span`s. Concatenating
//! the content of every span in depth-first order reproduces the source, and
//! sibling spans are contiguous.

use crate::generator::{BlockCodeGenerator, SpanCodeGenerator};
use rzr_lexer::{SourceLocation, Symbol};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SpanKind {
    Transition,
    MetaCode,
    Comment,
    Code,
    Markup,
}

/// Which characters an editor may insert into a span without forcing the
/// span to be reparsed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum AcceptedCharacters {
    None,
    NonWhiteSpace,
    WhiteSpace,
    AnyExceptNewline,
    #[default]
    Any,
}

/// Editor hint attached to a span.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum EditHandler {
    #[default]
    Default,
    /// The span is an implicit `@name.member` expression.
    ImplicitExpression { accept_trailing_dot: bool },
    /// The span opens a block; `auto_complete_string` is what the editor
    /// should insert to close it when the source forgot to.
    AutoComplete {
        auto_complete_string: Option<String>,
        at_end_of_span: bool,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BlockType {
    Markup,
    Tag,
    Statement,
    Expression,
    Section,
    Comment,
    Directive,
    Template,
}

/// A leaf of the tree: one contiguous run of source text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Span {
    pub kind: SpanKind,
    pub content: String,
    pub start: SourceLocation,
    pub generator: SpanCodeGenerator,
    pub accepted_characters: AcceptedCharacters,
    pub edit_handler: EditHandler,
}

impl Span {
    /// A span with default generator, accepted characters and edit handler.
    pub fn new(kind: SpanKind, content: impl Into<String>, start: SourceLocation) -> Self {
        Self {
            kind,
            content: content.into(),
            start,
            generator: SpanCodeGenerator::default(),
            accepted_characters: AcceptedCharacters::default(),
            edit_handler: EditHandler::default(),
        }
    }

    /// Byte length of the content.
    pub fn length(&self) -> usize {
        self.content.len()
    }

    pub fn end(&self) -> SourceLocation {
        self.start.advance(&self.content)
    }

    /// Zero-length spans only exist as markers around mode switches.
    pub fn is_marker(&self) -> bool {
        self.content.is_empty()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SyntaxTreeNode {
    Span(Span),
    Block(Block),
}

impl SyntaxTreeNode {
    pub fn start(&self) -> Option<SourceLocation> {
        match self {
            SyntaxTreeNode::Span(span) => Some(span.start),
            SyntaxTreeNode::Block(block) => block.start(),
        }
    }

    pub fn length(&self) -> usize {
        match self {
            SyntaxTreeNode::Span(span) => span.length(),
            SyntaxTreeNode::Block(block) => block.length(),
        }
    }

    pub fn as_span(&self) -> Option<&Span> {
        match self {
            SyntaxTreeNode::Span(span) => Some(span),
            SyntaxTreeNode::Block(_) => None,
        }
    }

    pub fn as_block(&self) -> Option<&Block> {
        match self {
            SyntaxTreeNode::Block(block) => Some(block),
            SyntaxTreeNode::Span(_) => None,
        }
    }
}

impl From<Span> for SyntaxTreeNode {
    fn from(span: Span) -> Self {
        SyntaxTreeNode::Span(span)
    }
}

impl From<Block> for SyntaxTreeNode {
    fn from(block: Block) -> Self {
        SyntaxTreeNode::Block(block)
    }
}

/// An internal node of the tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Block {
    pub kind: BlockType,
    pub generator: BlockCodeGenerator,
    pub children: Vec<SyntaxTreeNode>,
}

impl Block {
    pub fn new(kind: BlockType, generator: BlockCodeGenerator, children: Vec<SyntaxTreeNode>) -> Self {
        Self {
            kind,
            generator,
            children,
        }
    }

    /// Start of the first span below this block.
    pub fn start(&self) -> Option<SourceLocation> {
        self.spans().next().map(|span| span.start)
    }

    pub fn length(&self) -> usize {
        self.children.iter().map(SyntaxTreeNode::length).sum()
    }

    /// The source text covered by this block.
    pub fn content(&self) -> String {
        self.spans().map(|span| span.content.as_str()).collect()
    }

    /// All spans below this block, depth-first.
    pub fn spans(&self) -> Spans<'_> {
        Spans {
            stack: vec![self.children.iter()],
        }
    }

    pub fn find_first_span(&self) -> Option<&Span> {
        self.spans().next()
    }

    pub fn find_last_span(&self) -> Option<&Span> {
        self.spans().last()
    }

    /// Whether every span starts exactly where the previous one ended.
    pub fn is_contiguous(&self) -> bool {
        let mut expected: Option<SourceLocation> = None;
        for span in self.spans() {
            if let Some(end) = expected {
                if span.start != end {
                    return false;
                }
            }
            expected = Some(span.end());
        }
        true
    }

    fn write_tree(&self, f: &mut fmt::Formatter<'_>, depth: usize) -> fmt::Result {
        let indent = "  ".repeat(depth);
        match self.start() {
            Some(start) => writeln!(
                f,
                "{indent}{:?} Block at {start}::{} (Gen:{})",
                self.kind,
                self.length(),
                self.generator
            )?,
            None => writeln!(f, "{indent}{:?} Block (Gen:{})", self.kind, self.generator)?,
        }
        for child in &self.children {
            match child {
                SyntaxTreeNode::Block(block) => block.write_tree(f, depth + 1)?,
                SyntaxTreeNode::Span(span) => writeln!(f, "{indent}  {span}")?,
            }
        }
        Ok(())
    }
}

impl fmt::Display for Span {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{:?} Span at {}::{} - [{}] (Accepts:{:?}) (Gen:{})",
            self.kind,
            self.start,
            self.length(),
            self.content.escape_debug(),
            self.accepted_characters,
            self.generator
        )
    }
}

impl fmt::Display for Block {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.write_tree(f, 0)
    }
}

/// Depth-first span iterator returned by [`Block::spans`].
pub struct Spans<'t> {
    stack: Vec<std::slice::Iter<'t, SyntaxTreeNode>>,
}

impl<'t> Iterator for Spans<'t> {
    type Item = &'t Span;

    fn next(&mut self) -> Option<&'t Span> {
        loop {
            let iter = self.stack.last_mut()?;
            match iter.next() {
                Some(SyntaxTreeNode::Span(span)) => return Some(span),
                Some(SyntaxTreeNode::Block(block)) => self.stack.push(block.children.iter()),
                None => {
                    self.stack.pop();
                }
            }
        }
    }
}

// ============================================================================
// Builders
// ============================================================================

/// Accumulates symbols into the next span.
///
/// A builder with nothing accepted produces no span, unless a marker was
/// requested, in which case it produces a zero-length one.
#[derive(Debug, Clone, Default)]
pub struct SpanBuilder {
    start: Option<SourceLocation>,
    content: String,
    pub generator: SpanCodeGenerator,
    pub accepted_characters: AcceptedCharacters,
    pub edit_handler: EditHandler,
}

impl SpanBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn accept<K>(&mut self, symbol: &Symbol<K>) {
        self.accept_str(&symbol.content, symbol.start);
    }

    pub fn accept_str(&mut self, text: &str, start: SourceLocation) {
        self.start.get_or_insert(start);
        self.content.push_str(text);
    }

    /// Request a zero-length span at `location` if nothing else is accepted.
    pub fn accept_marker(&mut self, location: SourceLocation) {
        self.start.get_or_insert(location);
    }

    /// Nothing accepted and no marker requested.
    pub fn is_empty(&self) -> bool {
        self.start.is_none()
    }

    pub fn content(&self) -> &str {
        &self.content
    }

    /// Emit the pending span (if any) and reset the builder to defaults.
    pub fn build(&mut self, kind: SpanKind) -> Option<Span> {
        let builder = std::mem::take(self);
        let start = builder.start?;
        Some(Span {
            kind,
            content: builder.content,
            start,
            generator: builder.generator,
            accepted_characters: builder.accepted_characters,
            edit_handler: builder.edit_handler,
        })
    }
}

/// An open block under construction.
#[derive(Debug, Clone)]
pub struct BlockBuilder {
    pub kind: BlockType,
    pub generator: BlockCodeGenerator,
    pub children: Vec<SyntaxTreeNode>,
}

impl BlockBuilder {
    pub fn new(kind: BlockType) -> Self {
        let generator = match kind {
            BlockType::Expression => BlockCodeGenerator::Expression,
            _ => BlockCodeGenerator::Null,
        };
        Self {
            kind,
            generator,
            children: Vec::new(),
        }
    }

    pub fn push(&mut self, node: impl Into<SyntaxTreeNode>) {
        self.children.push(node.into());
    }

    pub fn build(self) -> Block {
        let block = Block::new(self.kind, self.generator, self.children);
        debug_assert!(block.is_contiguous(), "non-contiguous block:\n{block}");
        block
    }
}

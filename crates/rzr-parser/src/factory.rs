//! Builders for expected trees in tests.
//!
//! `SpanFactory` hands out spans in document order and tracks the location,
//! so expected trees are written as a flat sequence of contents.

use crate::generator::{BlockCodeGenerator, SpanCodeGenerator};
use crate::tree::{AcceptedCharacters, Block, BlockType, EditHandler, Span, SpanKind, SyntaxTreeNode};
use crate::{ParserResults, RazorParser};
use rzr_lexer::{LocationTagged, SourceLocation};

macro_rules! nodes {
    ($($node:expr),* $(,)?) => {
        vec![$(crate::tree::SyntaxTreeNode::from($node)),*]
    };
}
pub(crate) use nodes;

pub(crate) struct SpanFactory {
    location: SourceLocation,
}

impl SpanFactory {
    pub fn new() -> Self {
        Self {
            location: SourceLocation::ZERO,
        }
    }

    fn span(&mut self, kind: SpanKind, content: &str) -> Span {
        let span = Span::new(kind, content, self.location);
        self.location = self.location.advance(content);
        span
    }

    pub fn markup(&mut self, content: &str) -> Span {
        self.span(SpanKind::Markup, content)
    }

    pub fn empty_html(&mut self) -> Span {
        self.markup("")
    }

    pub fn code(&mut self, content: &str) -> Span {
        self.span(SpanKind::Code, content)
    }

    pub fn empty_code(&mut self) -> Span {
        self.code("")
    }

    pub fn code_transition(&mut self) -> Span {
        self.span(SpanKind::Transition, "@")
            .with(SpanCodeGenerator::Null)
            .accepts(AcceptedCharacters::None)
    }

    pub fn markup_transition(&mut self, content: &str) -> Span {
        self.span(SpanKind::Transition, content)
            .with(SpanCodeGenerator::Null)
            .accepts(AcceptedCharacters::None)
    }

    pub fn meta_code(&mut self, content: &str) -> Span {
        self.span(SpanKind::MetaCode, content).with(SpanCodeGenerator::Null)
    }

    pub fn comment(&mut self, content: &str) -> Span {
        self.span(SpanKind::Comment, content).with(SpanCodeGenerator::Null)
    }
}

pub(crate) trait SpanExt {
    fn with(self, generator: SpanCodeGenerator) -> Span;
    fn accepts(self, accepted: AcceptedCharacters) -> Span;
    fn as_statement(self) -> Span;
    fn as_expression(self) -> Span;
    fn as_implicit_expression(self, accept_trailing_dot: bool) -> Span;
    fn auto_complete_with(self, auto_complete_string: Option<&str>, at_end_of_span: bool) -> Span;
}

impl SpanExt for Span {
    fn with(mut self, generator: SpanCodeGenerator) -> Span {
        self.generator = generator;
        self
    }

    fn accepts(mut self, accepted: AcceptedCharacters) -> Span {
        self.accepted_characters = accepted;
        self
    }

    fn as_statement(self) -> Span {
        self.with(SpanCodeGenerator::Statement)
    }

    fn as_expression(self) -> Span {
        self.with(SpanCodeGenerator::Expression)
    }

    fn as_implicit_expression(mut self, accept_trailing_dot: bool) -> Span {
        self.edit_handler = EditHandler::ImplicitExpression { accept_trailing_dot };
        self.with(SpanCodeGenerator::Expression)
            .accepts(AcceptedCharacters::NonWhiteSpace)
    }

    fn auto_complete_with(mut self, auto_complete_string: Option<&str>, at_end_of_span: bool) -> Span {
        self.edit_handler = EditHandler::AutoComplete {
            auto_complete_string: auto_complete_string.map(str::to_string),
            at_end_of_span,
        };
        self
    }
}

pub(crate) fn markup_block(children: Vec<SyntaxTreeNode>) -> Block {
    Block::new(BlockType::Markup, BlockCodeGenerator::Null, children)
}

pub(crate) fn tag_block(children: Vec<SyntaxTreeNode>) -> Block {
    Block::new(BlockType::Tag, BlockCodeGenerator::Null, children)
}

pub(crate) fn expression_block(children: Vec<SyntaxTreeNode>) -> Block {
    Block::new(BlockType::Expression, BlockCodeGenerator::Expression, children)
}

pub(crate) fn statement_block(children: Vec<SyntaxTreeNode>) -> Block {
    Block::new(BlockType::Statement, BlockCodeGenerator::Null, children)
}

pub(crate) fn section_block(name: &str, children: Vec<SyntaxTreeNode>) -> Block {
    Block::new(
        BlockType::Section,
        BlockCodeGenerator::Section { name: name.to_string() },
        children,
    )
}

pub(crate) fn comment_block(children: Vec<SyntaxTreeNode>) -> Block {
    Block::new(BlockType::Comment, BlockCodeGenerator::RazorComment, children)
}

pub(crate) fn attribute_block(
    name: &str,
    prefix: LocationTagged<String>,
    suffix: LocationTagged<String>,
    children: Vec<SyntaxTreeNode>,
) -> Block {
    Block::new(
        BlockType::Markup,
        BlockCodeGenerator::Attribute {
            name: name.to_string(),
            prefix,
            suffix,
        },
        children,
    )
}

pub(crate) fn dynamic_block(
    prefix: LocationTagged<String>,
    value_start: SourceLocation,
    children: Vec<SyntaxTreeNode>,
) -> Block {
    Block::new(
        BlockType::Markup,
        BlockCodeGenerator::DynamicAttribute { prefix, value_start },
        children,
    )
}

pub(crate) fn literal_attribute(prefix: LocationTagged<String>, value: LocationTagged<String>) -> SpanCodeGenerator {
    SpanCodeGenerator::LiteralAttribute { prefix, value }
}

pub(crate) fn loc(absolute: usize, line: usize, column: usize) -> SourceLocation {
    SourceLocation::new(absolute, line, column)
}

pub(crate) fn parse(source: &str) -> ParserResults {
    RazorParser::new().parse(source)
}

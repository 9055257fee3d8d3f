//! Markup parser.
//!
//! Groups markup symbols into spans and tag blocks, and hands control to the
//! code language at every transition. The same machinery runs in three
//! modes: a whole document, the body of a section, and a markup block nested
//! inside code.

use crate::context::{ParserContext, SymbolStream};
use crate::errors::{messages, ParserError};
use crate::generator::{BlockCodeGenerator, SpanCodeGenerator};
use crate::tree::{AcceptedCharacters, Block, BlockBuilder, BlockType, Span, SpanBuilder, SpanKind, SyntaxTreeNode};
use crate::ParserResults;
use rzr_lexer::{HtmlSymbol, HtmlSymbolKind, HtmlTokenizer, LocationTagged, SourceLocation};

/// Elements that never have an end tag.
const VOID_ELEMENTS: &[&str] = &[
    "area", "base", "br", "col", "command", "embed", "hr", "img", "input", "keygen", "link", "meta",
    "param", "source", "track", "wbr",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum MarkupMode {
    Document,
    Section,
    Block,
}

/// Entry point for parsing markup through an attached context.
pub struct MarkupParser<'a> {
    context: Option<ParserContext<'a>>,
}

impl<'a> MarkupParser<'a> {
    pub fn new() -> Self {
        Self { context: None }
    }

    pub fn with_context(context: ParserContext<'a>) -> Self {
        Self {
            context: Some(context),
        }
    }

    pub fn set_context(&mut self, context: ParserContext<'a>) {
        self.context = Some(context);
    }

    /// Parse the whole source as a document.
    pub fn parse_document(&mut self) -> Result<ParserResults, ParserError> {
        let ctx = self.context.take().ok_or(ParserError::ContextNotSet)?;
        Ok(parse_document(ctx))
    }

    /// Parse from the context location as a section body, stopping at the
    /// first unbalanced `}`.
    pub fn parse_section(&mut self) -> Result<ParserResults, ParserError> {
        let mut ctx = self.context.take().ok_or(ParserError::ContextNotSet)?;
        let body = match ctx.parse_markup_section() {
            Some(body) => body,
            None => {
                let marker = Span::new(SpanKind::Markup, "", ctx.location());
                Block::new(BlockType::Markup, BlockCodeGenerator::Null, vec![marker.into()])
            }
        };
        Ok(ParserResults::new(body, ctx.into_errors()))
    }
}

impl Default for MarkupParser<'_> {
    fn default() -> Self {
        Self::new()
    }
}

pub(crate) fn parse_document(mut ctx: ParserContext<'_>) -> ParserResults {
    tracing::debug!(design_time = ctx.options().design_time, "parsing document");
    let document = parse(&mut ctx, MarkupMode::Document);
    ParserResults::new(document, ctx.into_errors())
}

pub(crate) fn parse(ctx: &mut ParserContext<'_>, mode: MarkupMode) -> Block {
    let stream = SymbolStream::new(ctx.source(), ctx.location());
    let mut parser = HtmlMarkupParser {
        ctx,
        stream,
        span: SpanBuilder::new(),
        blocks: Vec::new(),
        mode,
        brace_depth: 0,
        section_closed: false,
    };
    let block = match mode {
        MarkupMode::Document => parser.document(),
        MarkupMode::Section => parser.section(),
        MarkupMode::Block => parser.block(),
    };
    let end = parser.stream.location();
    parser.ctx.set_location(end);
    tracing::debug!(?mode, errors = parser.ctx.errors().len(), "markup parse complete");
    block
}

/// Where a run of literal markup stops.
#[derive(Debug, Clone, Copy)]
enum StopAt {
    OpenAngle,
    NewLine,
    EndOfTag,
    AttributeValueEnd(Option<HtmlSymbolKind>),
}

#[derive(Debug, Clone)]
struct TagInfo {
    name: String,
    start: SourceLocation,
    is_end: bool,
    self_closing: bool,
    closed: bool,
}

impl TagInfo {
    fn opens_script(&self) -> bool {
        !self.is_end && !self.self_closing && self.closed && self.name.eq_ignore_ascii_case("script")
    }

    fn is_void(&self) -> bool {
        VOID_ELEMENTS.iter().any(|v| v.eq_ignore_ascii_case(&self.name))
    }
}

struct HtmlMarkupParser<'c, 'a> {
    ctx: &'c mut ParserContext<'a>,
    stream: SymbolStream<'a, HtmlTokenizer<'a>>,
    span: SpanBuilder,
    blocks: Vec<BlockBuilder>,
    mode: MarkupMode,
    brace_depth: usize,
    section_closed: bool,
}

fn is_whitespace(kind: HtmlSymbolKind) -> bool {
    matches!(kind, HtmlSymbolKind::WhiteSpace | HtmlSymbolKind::NewLine)
}

fn concat(symbols: &[HtmlSymbol]) -> String {
    symbols.iter().map(|s| s.content.as_str()).collect()
}

impl<'c, 'a> HtmlMarkupParser<'c, 'a> {
    // ========================================================================
    // Modes
    // ========================================================================

    fn document(&mut self) -> Block {
        self.start_block(BlockType::Markup);
        while !self.stream.is_at_end() {
            self.skip_to_and_parse_code(StopAt::OpenAngle);
            self.scan_tag_in_document_context();
        }
        self.add_marker_if_necessary();
        self.output(SpanKind::Markup);
        self.finish()
    }

    fn section(&mut self) -> Block {
        self.start_block(BlockType::Markup);
        while !self.stream.is_at_end() && !self.section_closed {
            self.skip_to_and_parse_code(StopAt::OpenAngle);
            if self.section_closed {
                break;
            }
            self.scan_tag_in_document_context();
        }
        self.add_marker_if_necessary();
        let body_is_empty = self.blocks.last().is_some_and(|b| b.children.is_empty());
        if body_is_empty {
            self.span.accept_marker(self.stream.location());
        }
        self.output(SpanKind::Markup);
        self.finish()
    }

    fn block(&mut self) -> Block {
        self.start_block(BlockType::Markup);
        if self.at_single_line_markup() {
            self.single_line_markup();
        } else if self.at(HtmlSymbolKind::OpenAngle) {
            self.tag_balanced_block();
        } else {
            self.skip_to_and_parse_code(StopAt::NewLine);
            self.accept_if(HtmlSymbolKind::NewLine);
            self.output(SpanKind::Markup);
        }
        self.finish()
    }

    // ========================================================================
    // Text and transitions
    // ========================================================================

    fn skip_to_and_parse_code(&mut self, stop: StopAt) {
        while !self.stream.is_at_end() && !self.at_stop(stop) {
            let Some(kind) = self.stream.current_kind() else {
                break;
            };
            match kind {
                HtmlSymbolKind::Transition => {
                    if self.stream.peek_kind(1) == Some(HtmlSymbolKind::Transition) {
                        self.escaped_transition();
                    } else {
                        self.parse_code_block();
                    }
                }
                HtmlSymbolKind::RazorCommentTransition => self.razor_comment(),
                HtmlSymbolKind::Text
                    if self.mode == MarkupMode::Section && matches!(stop, StopAt::OpenAngle) =>
                {
                    self.section_text();
                }
                _ => self.accept_current(),
            }
        }
    }

    fn at_stop(&mut self, stop: StopAt) -> bool {
        if self.section_closed {
            return true;
        }
        match stop {
            StopAt::OpenAngle => self.at(HtmlSymbolKind::OpenAngle),
            StopAt::NewLine => self.at(HtmlSymbolKind::NewLine),
            StopAt::EndOfTag => self.is_end_of_tag(),
            StopAt::AttributeValueEnd(quote) => self.is_end_of_attribute_value(quote),
        }
    }

    /// `@@`: the first marker emits nothing, the second is literal text.
    fn escaped_transition(&mut self) {
        self.output(SpanKind::Markup);
        self.accept_current();
        self.span.generator = SpanCodeGenerator::Null;
        self.output(SpanKind::Markup);
        self.accept_current();
    }

    fn parse_code_block(&mut self) {
        self.add_marker_if_necessary();
        self.output(SpanKind::Markup);
        let Some(symbol) = self.stream.advance() else {
            return;
        };
        let resume = symbol.end();
        let mut transition = Span::new(SpanKind::Transition, symbol.content, symbol.start);
        transition.generator = SpanCodeGenerator::Null;
        transition.accepted_characters = AcceptedCharacters::None;

        self.ctx.set_location(resume);
        let block = self
            .ctx
            .parse_code(transition, self.mode == MarkupMode::Block);
        self.push_node(block.into());
        self.stream.reset(self.ctx.location());
        tracing::trace!(location = %self.ctx.location(), "back in markup");
    }

    fn razor_comment(&mut self) {
        self.add_marker_if_necessary();
        self.output(SpanKind::Markup);
        self.ctx.set_location(self.stream.location());
        let block = self.ctx.parse_razor_comment();
        self.push_node(block.into());
        self.stream.reset(self.ctx.location());
    }

    /// Text inside a section body: track braces and stop at the first `}`
    /// that closes the section.
    fn section_text(&mut self) {
        let Some(symbol) = self.stream.advance() else {
            return;
        };
        for (i, c) in symbol.content.char_indices() {
            match c {
                '{' => self.brace_depth += 1,
                '}' if self.brace_depth == 0 => {
                    let head = &symbol.content[..i];
                    if !head.is_empty() {
                        self.span.accept_str(head, symbol.start);
                    }
                    self.stream.reset(symbol.start.advance(head));
                    self.section_closed = true;
                    return;
                }
                '}' => self.brace_depth -= 1,
                _ => {}
            }
        }
        self.span.accept(&symbol);
    }

    // ========================================================================
    // Tags
    // ========================================================================

    fn scan_tag_in_document_context(&mut self) {
        if !self.at(HtmlSymbolKind::OpenAngle) {
            return;
        }
        match self.stream.peek_kind(1) {
            Some(HtmlSymbolKind::Bang) => {
                self.accept_current();
                self.bang_tag();
            }
            Some(HtmlSymbolKind::QuestionMark) => {
                self.accept_current();
                self.accept_through(&[HtmlSymbolKind::QuestionMark, HtmlSymbolKind::CloseAngle]);
            }
            Some(HtmlSymbolKind::Text | HtmlSymbolKind::ForwardSlash) => {
                let tag = self.tag_block(false);
                if tag.opens_script() {
                    self.script_body();
                }
            }
            _ => self.accept_current(),
        }
    }

    /// `<!-- -->`, `<![CDATA[ ]]>` or `<!DOCTYPE >`, after the `<`. All of it
    /// stays in the current literal run.
    fn bang_tag(&mut self) {
        self.accept_current();
        if self.at(HtmlSymbolKind::DoubleHyphen) {
            self.accept_current();
            self.accept_through(&[HtmlSymbolKind::DoubleHyphen, HtmlSymbolKind::CloseAngle]);
        } else if self.at_cdata() {
            self.accept_through(&[
                HtmlSymbolKind::RightBracket,
                HtmlSymbolKind::RightBracket,
                HtmlSymbolKind::CloseAngle,
            ]);
        } else {
            self.accept_through(&[HtmlSymbolKind::CloseAngle]);
        }
    }

    fn at_cdata(&mut self) -> bool {
        self.at(HtmlSymbolKind::LeftBracket)
            && self
                .stream
                .peek(1)
                .is_some_and(|s| s.kind == HtmlSymbolKind::Text && s.content == "CDATA")
            && self.stream.peek_kind(2) == Some(HtmlSymbolKind::LeftBracket)
    }

    /// Flush pending text, then parse one tag into its own block.
    fn tag_block(&mut self, text_tag: bool) -> TagInfo {
        self.output(SpanKind::Markup);
        self.start_block(BlockType::Tag);
        let tag = self.tag(text_tag);
        if text_tag {
            self.span.generator = SpanCodeGenerator::Null;
            self.span.accepted_characters = AcceptedCharacters::None;
            self.output(SpanKind::Transition);
        } else {
            self.output(SpanKind::Markup);
        }
        self.end_block();
        tag
    }

    fn tag(&mut self, text_tag: bool) -> TagInfo {
        let start = self.stream.location();
        self.accept_current();
        let is_end = self.accept_if(HtmlSymbolKind::ForwardSlash);

        let mut name = String::new();
        if let Some(symbol) = self.stream.current() {
            if symbol.kind == HtmlSymbolKind::Text {
                name = symbol.content.clone();
                self.accept_current();
            }
        }

        if text_tag {
            let whitespace = self.read_while(is_whitespace);
            self.accept_all(&whitespace);
            if !self.stream.is_at_end() && !self.is_end_of_tag() {
                self.ctx
                    .on_error(messages::TEXT_TAG_CANNOT_CONTAIN_ATTRIBUTES, start, name.len() + 1);
                while !self.stream.is_at_end() && !self.is_end_of_tag() {
                    self.accept_current();
                }
            }
        } else if is_end || name.is_empty() {
            self.skip_to_and_parse_code(StopAt::EndOfTag);
        } else {
            self.tag_content();
        }

        let mut self_closing = false;
        let mut closed = false;
        if self.at_self_close() {
            self.accept_current();
            self.accept_current();
            self_closing = true;
            closed = true;
        } else if self.accept_if(HtmlSymbolKind::CloseAngle) {
            closed = true;
        }

        TagInfo {
            name,
            start,
            is_end,
            self_closing,
            closed,
        }
    }

    fn tag_content(&mut self) {
        if !self.stream.current_kind().is_some_and(is_whitespace) {
            self.skip_to_and_parse_code(StopAt::EndOfTag);
            return;
        }
        while !self.stream.is_at_end() && !self.is_end_of_tag() {
            self.before_attribute();
        }
    }

    fn is_end_of_tag(&mut self) -> bool {
        self.at(HtmlSymbolKind::CloseAngle) || self.at(HtmlSymbolKind::OpenAngle) || self.at_self_close()
    }

    fn at_self_close(&mut self) -> bool {
        self.at(HtmlSymbolKind::ForwardSlash) && self.stream.peek_kind(1) == Some(HtmlSymbolKind::CloseAngle)
    }

    /// Raw text up to `</script>`, with transitions still honoured.
    fn script_body(&mut self) {
        while !self.stream.is_at_end() {
            self.skip_to_and_parse_code(StopAt::OpenAngle);
            if self.stream.is_at_end() || self.section_closed || self.at_script_end_tag() {
                return;
            }
            self.accept_current();
        }
    }

    fn at_script_end_tag(&mut self) -> bool {
        self.at(HtmlSymbolKind::OpenAngle)
            && self.stream.peek_kind(1) == Some(HtmlSymbolKind::ForwardSlash)
            && self
                .stream
                .peek(2)
                .is_some_and(|s| s.kind == HtmlSymbolKind::Text && s.content.eq_ignore_ascii_case("script"))
    }

    // ========================================================================
    // Attributes
    // ========================================================================

    fn before_attribute(&mut self) {
        let whitespace = self.read_while(is_whitespace);
        if !self.at(HtmlSymbolKind::Text) {
            self.accept_all(&whitespace);
            self.skip_to_and_parse_code(StopAt::EndOfTag);
            return;
        }

        let name = self.read_attribute_name();
        if !self.at(HtmlSymbolKind::Equals) {
            self.accept_all(&whitespace);
            self.accept_all(&name);
            return;
        }

        self.output(SpanKind::Markup);
        self.start_block(BlockType::Markup);
        self.attribute_prefix(whitespace, name);
        self.end_block();
    }

    fn read_attribute_name(&mut self) -> Vec<HtmlSymbol> {
        let mut name = Vec::new();
        while let Some(kind) = self.stream.current_kind() {
            let stop = is_whitespace(kind)
                || matches!(
                    kind,
                    HtmlSymbolKind::Equals | HtmlSymbolKind::CloseAngle | HtmlSymbolKind::OpenAngle
                )
                || self.at_self_close();
            if stop {
                break;
            }
            name.extend(self.stream.advance());
        }
        name
    }

    fn attribute_prefix(&mut self, whitespace: Vec<HtmlSymbol>, name: Vec<HtmlSymbol>) {
        let name_text = concat(&name);
        let prefix_start = whitespace
            .first()
            .or_else(|| name.first())
            .map_or_else(|| self.stream.location(), |s| s.start);
        self.accept_all(&whitespace);
        self.accept_all(&name);
        self.accept_current();

        let quote = match self.stream.current_kind() {
            Some(kind @ (HtmlSymbolKind::SingleQuote | HtmlSymbolKind::DoubleQuote)) => {
                self.accept_current();
                Some(kind)
            }
            _ => None,
        };

        let is_data = name_text
            .get(..5)
            .is_some_and(|p| p.eq_ignore_ascii_case("data-"));
        if is_data {
            self.skip_to_and_parse_code(StopAt::AttributeValueEnd(quote));
            if let Some(quote) = quote {
                self.accept_if(quote);
            }
            self.output(SpanKind::Markup);
            return;
        }

        let prefix = LocationTagged::new(self.span.content().to_string(), prefix_start);
        self.span.generator = SpanCodeGenerator::Null;
        self.output(SpanKind::Markup);

        while !self.stream.is_at_end() && !self.is_end_of_attribute_value(quote) {
            self.attribute_value(quote);
        }

        let mut suffix = LocationTagged::empty(self.stream.location());
        if let Some(quote) = quote {
            if let Some(symbol) = self.stream.current().filter(|s| s.kind == quote) {
                suffix.value = symbol.content.clone();
                self.accept_current();
            }
        }
        if !self.span.is_empty() {
            self.span.generator = SpanCodeGenerator::Null;
            self.output(SpanKind::Markup);
        }

        if let Some(block) = self.blocks.last_mut() {
            block.generator = BlockCodeGenerator::Attribute {
                name: name_text,
                prefix,
                suffix,
            };
        }
    }

    /// One piece of a conditional attribute value: a literal run, a dynamic
    /// value or an escaped transition, each with its leading whitespace.
    fn attribute_value(&mut self, quote: Option<HtmlSymbolKind>) {
        let prefix_start = self.stream.location();
        let prefix = self.read_while(is_whitespace);
        let prefix_text = concat(&prefix);

        match self.stream.current_kind() {
            Some(HtmlSymbolKind::Transition) => {
                if self.stream.peek_kind(1) == Some(HtmlSymbolKind::Transition) {
                    self.accept_all(&prefix);
                    self.escaped_transition();
                } else {
                    let value_start = self.stream.location();
                    self.accept_all(&prefix);
                    self.span.generator = SpanCodeGenerator::Null;
                    self.start_block(BlockType::Markup);
                    if let Some(block) = self.blocks.last_mut() {
                        block.generator = BlockCodeGenerator::DynamicAttribute {
                            prefix: LocationTagged::new(prefix_text, prefix_start),
                            value_start,
                        };
                    }
                    self.parse_code_block();
                    self.end_block();
                }
            }
            Some(HtmlSymbolKind::RazorCommentTransition) => {
                self.accept_all(&prefix);
                self.razor_comment();
            }
            _ => {
                self.accept_all(&prefix);
                let mut value = Vec::new();
                while let Some(kind) = self.stream.current_kind() {
                    let stop = is_whitespace(kind)
                        || matches!(
                            kind,
                            HtmlSymbolKind::Transition | HtmlSymbolKind::RazorCommentTransition
                        )
                        || self.is_end_of_attribute_value(quote);
                    if stop {
                        break;
                    }
                    value.extend(self.stream.advance());
                }
                let value_start = value.first().map_or(prefix_start, |s| s.start);
                let value_text = concat(&value);
                self.accept_all(&value);
                self.span.generator = SpanCodeGenerator::LiteralAttribute {
                    prefix: LocationTagged::new(prefix_text, prefix_start),
                    value: LocationTagged::new(value_text, value_start),
                };
            }
        }
        self.output(SpanKind::Markup);
    }

    fn is_end_of_attribute_value(&mut self, quote: Option<HtmlSymbolKind>) -> bool {
        let Some(kind) = self.stream.current_kind() else {
            return true;
        };
        match quote {
            Some(quote) => kind == quote,
            None => {
                is_whitespace(kind)
                    || matches!(
                        kind,
                        HtmlSymbolKind::DoubleQuote
                            | HtmlSymbolKind::SingleQuote
                            | HtmlSymbolKind::OpenAngle
                            | HtmlSymbolKind::Equals
                            | HtmlSymbolKind::CloseAngle
                    )
                    || self.at_self_close()
            }
        }
    }

    // ========================================================================
    // Markup nested in code
    // ========================================================================

    fn at_single_line_markup(&mut self) -> bool {
        self.at(HtmlSymbolKind::Transition)
            && self
                .stream
                .peek(1)
                .is_some_and(|s| s.kind == HtmlSymbolKind::Text && s.content.starts_with(':'))
    }

    /// `@:` up to and including the end of the line.
    fn single_line_markup(&mut self) {
        self.accept_current();
        self.span.generator = SpanCodeGenerator::Null;
        self.span.accepted_characters = AcceptedCharacters::None;
        self.output(SpanKind::Transition);

        let colon = self.stream.location();
        self.span.accept_str(":", colon);
        self.span.generator = SpanCodeGenerator::Null;
        self.span.accepted_characters = AcceptedCharacters::None;
        self.output(SpanKind::MetaCode);
        self.stream.reset(colon.advance(":"));

        self.skip_to_and_parse_code(StopAt::NewLine);
        self.accept_if(HtmlSymbolKind::NewLine);
        self.span.accepted_characters = AcceptedCharacters::None;
        self.output(SpanKind::Markup);
    }

    /// A start tag and everything up to its matching end tag.
    fn tag_balanced_block(&mut self) {
        let mut open: Vec<(String, SourceLocation)> = Vec::new();
        loop {
            self.markup_item(&mut open);
            if open.is_empty() {
                break;
            }
            self.skip_to_and_parse_code(StopAt::OpenAngle);
            if self.stream.is_at_end() {
                if let Some((name, start)) = open.last() {
                    let message = messages::missing_end_tag(name);
                    self.ctx.on_error(message, *start, name.len() + 1);
                }
                break;
            }
        }
        self.complete_line();
    }

    /// Handle the tag (or other `<` construct) at the cursor.
    fn markup_item(&mut self, open: &mut Vec<(String, SourceLocation)>) {
        let tag_start = self.at(HtmlSymbolKind::OpenAngle)
            && matches!(
                self.stream.peek_kind(1),
                Some(HtmlSymbolKind::Text | HtmlSymbolKind::ForwardSlash)
            );
        if !tag_start {
            self.scan_tag_in_document_context();
            return;
        }

        let text_tag = self.at_text_tag();
        let tag = self.tag_block(text_tag);
        if tag.is_end {
            match open
                .iter()
                .rposition(|(name, _)| name.eq_ignore_ascii_case(&tag.name))
            {
                Some(index) => open.truncate(index),
                None => {
                    let message = messages::unexpected_end_tag(&tag.name);
                    self.ctx.on_error(message, tag.start, tag.name.len() + 2);
                }
            }
        } else if !tag.self_closing && !tag.is_void() {
            open.push((tag.name.clone(), tag.start));
            if tag.opens_script() {
                self.script_body();
            }
        }
    }

    fn at_text_tag(&mut self) -> bool {
        let name_at = if self.stream.peek_kind(1) == Some(HtmlSymbolKind::ForwardSlash) {
            2
        } else {
            1
        };
        self.stream
            .peek(name_at)
            .is_some_and(|s| s.kind == HtmlSymbolKind::Text && s.content == "text")
    }

    /// Whitespace and one line break after the block's last tag belong to it.
    fn complete_line(&mut self) {
        let mut n = 0;
        while self.stream.peek_kind(n) == Some(HtmlSymbolKind::WhiteSpace) {
            n += 1;
        }
        let take = match self.stream.peek_kind(n) {
            Some(HtmlSymbolKind::NewLine) => n + 1,
            None => n,
            _ => 0,
        };
        for _ in 0..take {
            self.accept_current();
        }
        self.span.accepted_characters = AcceptedCharacters::None;
        self.output(SpanKind::Markup);
    }

    // ========================================================================
    // Symbols, spans and blocks
    // ========================================================================

    fn at(&self, kind: HtmlSymbolKind) -> bool {
        self.stream.at(kind)
    }

    fn accept_current(&mut self) {
        if let Some(symbol) = self.stream.advance() {
            self.span.accept(&symbol);
        }
    }

    fn accept_if(&mut self, kind: HtmlSymbolKind) -> bool {
        let matched = self.at(kind);
        if matched {
            self.accept_current();
        }
        matched
    }

    fn accept_all(&mut self, symbols: &[HtmlSymbol]) {
        for symbol in symbols {
            self.span.accept(symbol);
        }
    }

    /// Accept symbols up to and including the first occurrence of `sequence`,
    /// or to the end of input.
    fn accept_through(&mut self, sequence: &[HtmlSymbolKind]) {
        while !self.stream.is_at_end() {
            let matched = sequence
                .iter()
                .enumerate()
                .all(|(i, kind)| self.stream.peek_kind(i) == Some(*kind));
            if matched {
                for _ in sequence {
                    self.accept_current();
                }
                return;
            }
            self.accept_current();
        }
    }

    fn read_while(&mut self, predicate: impl Fn(HtmlSymbolKind) -> bool) -> Vec<HtmlSymbol> {
        let mut symbols = Vec::new();
        while self.stream.current_kind().is_some_and(&predicate) {
            symbols.extend(self.stream.advance());
        }
        symbols
    }

    /// Before leaving markup: keep an empty span as a marker when the
    /// previous span does not accept arbitrary edits.
    fn add_marker_if_necessary(&mut self) {
        if self.span.is_empty() && self.ctx.last_accepted() != AcceptedCharacters::Any {
            self.span.accept_marker(self.stream.location());
        }
    }

    fn output(&mut self, kind: SpanKind) {
        if let Some(span) = self.span.build(kind) {
            self.ctx.set_last_accepted(span.accepted_characters);
            self.push_node(span.into());
        }
    }

    fn push_node(&mut self, node: SyntaxTreeNode) {
        if let Some(block) = self.blocks.last_mut() {
            block.children.push(node);
        }
    }

    fn start_block(&mut self, kind: BlockType) {
        self.blocks.push(BlockBuilder::new(kind));
    }

    fn end_block(&mut self) {
        if let Some(builder) = self.blocks.pop() {
            let block = builder.build();
            self.push_node(block.into());
        }
    }

    fn finish(&mut self) -> Block {
        self.blocks
            .pop()
            .unwrap_or_else(|| BlockBuilder::new(BlockType::Markup))
            .build()
    }
}

//! Embedded code language.
//!
//! The markup parser knows nothing about the code it hands off to; it only
//! calls a `CodeLanguage`. `CodeParser` is the default implementation for a
//! C-family statement language: implicit and explicit expressions, `{ }`
//! statement blocks, keyword statements, sections and markup nested in code.

use crate::context::{ParserContext, SymbolStream};
use crate::errors::messages;
use crate::generator::{BlockCodeGenerator, SpanCodeGenerator};
use crate::tree::{AcceptedCharacters, Block, BlockBuilder, BlockType, EditHandler, Span, SpanBuilder, SpanKind, SyntaxTreeNode};
use rzr_lexer::{CodeSymbolKind, CodeTokenizer};

/// Keywords that only continue a `try` statement.
const CLAUSE_KEYWORDS: &[&str] = &["catch", "finally"];

/// A parser for the language embedded after the transition marker.
pub trait CodeLanguage {
    /// Parse one construct. `transition` is the `@` span the caller already
    /// consumed and must become the first child of the returned block. The
    /// context location points just past it; on return it must point where
    /// markup resumes.
    fn parse_block(&self, ctx: &mut ParserContext<'_>, transition: Span, accept_trailing_dot: bool) -> Block;
}

/// The default code language.
#[derive(Debug, Clone, Copy, Default)]
pub struct CodeParser;

impl CodeLanguage for CodeParser {
    fn parse_block(&self, ctx: &mut ParserContext<'_>, transition: Span, accept_trailing_dot: bool) -> Block {
        let stream = SymbolStream::new(ctx.source(), ctx.location());
        let mut parser = CodeBlockParser {
            ctx,
            stream,
            span: SpanBuilder::new(),
            blocks: Vec::new(),
            generator: SpanCodeGenerator::Statement,
        };
        let block = parser.parse(transition, accept_trailing_dot);
        let end = parser.stream.location();
        parser.ctx.set_location(end);
        tracing::debug!(kind = ?block.kind, location = %end, "code block complete");
        block
    }
}

struct CodeBlockParser<'c, 'a> {
    ctx: &'c mut ParserContext<'a>,
    stream: SymbolStream<'a, CodeTokenizer<'a>>,
    span: SpanBuilder,
    blocks: Vec<BlockBuilder>,
    /// Generator restored on the span builder after every output.
    generator: SpanCodeGenerator,
}

impl<'c, 'a> CodeBlockParser<'c, 'a> {
    fn parse(&mut self, transition: Span, accept_trailing_dot: bool) -> Block {
        let Some(symbol) = self.stream.current().cloned() else {
            self.start_block(BlockType::Expression, transition);
            self.ctx.on_error(
                messages::UNEXPECTED_EOF_AT_START_OF_CODE_BLOCK,
                self.stream.location(),
                1,
            );
            self.empty_implicit_expression(accept_trailing_dot);
            return self.finish();
        };

        match symbol.kind {
            CodeSymbolKind::Identifier if self.ctx.options().is_keyword(&symbol.content) && symbol.content != "else" => {
                if symbol.content == "section" {
                    self.start_block(BlockType::Section, transition);
                    self.section();
                } else {
                    self.start_block(BlockType::Statement, transition);
                    self.keyword_statement(&symbol.content);
                }
            }
            CodeSymbolKind::Identifier => {
                self.start_block(BlockType::Expression, transition);
                self.implicit_expression(accept_trailing_dot);
            }
            CodeSymbolKind::LeftParenthesis => {
                self.start_block(BlockType::Expression, transition);
                self.explicit_expression();
            }
            CodeSymbolKind::LeftBrace => {
                self.start_block(BlockType::Statement, transition);
                self.statement_block();
            }
            kind => {
                self.start_block(BlockType::Expression, transition);
                let message = if kind == CodeSymbolKind::WhiteSpace || kind == CodeSymbolKind::NewLine {
                    messages::UNEXPECTED_WHITESPACE_AT_START_OF_CODE_BLOCK.to_string()
                } else {
                    messages::unexpected_character_at_start_of_code_block(&symbol.content)
                };
                self.ctx.on_error(message, symbol.start, symbol.content.chars().count().max(1));
                self.empty_implicit_expression(accept_trailing_dot);
            }
        }
        self.finish()
    }

    // ========================================================================
    // Expressions
    // ========================================================================

    fn empty_implicit_expression(&mut self, accept_trailing_dot: bool) {
        self.span.accept_marker(self.stream.location());
        self.output_implicit_expression(accept_trailing_dot);
    }

    /// `name`, then any chain of `.member`, `(...)` and `[...]`.
    fn implicit_expression(&mut self, accept_trailing_dot: bool) {
        self.accept_current();
        loop {
            match self.stream.current_kind() {
                Some(CodeSymbolKind::LeftParenthesis | CodeSymbolKind::LeftBracket) => {
                    if !self.balance() {
                        break;
                    }
                }
                Some(CodeSymbolKind::Dot) => match self.stream.peek_kind(1) {
                    Some(CodeSymbolKind::Identifier) => {
                        self.accept_current();
                        self.accept_current();
                    }
                    None if accept_trailing_dot => {
                        self.accept_current();
                        break;
                    }
                    _ => break,
                },
                _ => break,
            }
        }
        self.output_implicit_expression(accept_trailing_dot);
    }

    fn output_implicit_expression(&mut self, accept_trailing_dot: bool) {
        self.span.generator = SpanCodeGenerator::Expression;
        self.span.accepted_characters = AcceptedCharacters::NonWhiteSpace;
        self.span.edit_handler = EditHandler::ImplicitExpression { accept_trailing_dot };
        self.output(SpanKind::Code);
    }

    /// `( ... )`, the parentheses being meta code.
    fn explicit_expression(&mut self) {
        let open = self.stream.location();
        self.accept_current();
        self.output_meta_code(AcceptedCharacters::None);

        let mut depth = 0usize;
        let mut closed = false;
        while let Some(kind) = self.stream.current_kind() {
            match kind {
                CodeSymbolKind::LeftParenthesis => depth += 1,
                CodeSymbolKind::RightParenthesis if depth == 0 => {
                    closed = true;
                    break;
                }
                CodeSymbolKind::RightParenthesis => depth -= 1,
                _ => {}
            }
            self.accept_current();
        }

        if self.span.is_empty() {
            self.span.accept_marker(self.stream.location());
        }
        self.span.generator = SpanCodeGenerator::Expression;
        self.output(SpanKind::Code);

        if closed {
            self.accept_current();
            self.output_meta_code(AcceptedCharacters::None);
        } else {
            self.ctx
                .on_error(messages::expected_close_bracket_before_eof("(", ")"), open, 1);
        }
    }

    /// Accept a bracketed group starting at the current `(`, `[` or `{`,
    /// including everything up to its matching close.
    fn balance(&mut self) -> bool {
        let Some(open) = self.stream.current().cloned() else {
            return false;
        };
        let (close, close_text) = match open.kind {
            CodeSymbolKind::LeftParenthesis => (CodeSymbolKind::RightParenthesis, ")"),
            CodeSymbolKind::LeftBracket => (CodeSymbolKind::RightBracket, "]"),
            CodeSymbolKind::LeftBrace => (CodeSymbolKind::RightBrace, "}"),
            _ => return false,
        };

        let mut depth = 0usize;
        while let Some(kind) = self.stream.current_kind() {
            if kind == open.kind {
                depth += 1;
            } else if kind == close {
                depth -= 1;
            }
            self.accept_current();
            if depth == 0 {
                return true;
            }
        }
        let message = messages::expected_close_bracket_before_eof(&open.content, close_text);
        self.ctx.on_error(message, open.start, 1);
        false
    }

    // ========================================================================
    // Statements
    // ========================================================================

    /// `{ ... }` directly after the transition.
    fn statement_block(&mut self) {
        let open = self.stream.location();
        self.accept_current();
        self.output_meta_code(AcceptedCharacters::None);

        let closed = self.statement_body();
        if self.span.is_empty() {
            self.span.accept_marker(self.stream.location());
        }
        self.span.edit_handler = EditHandler::AutoComplete {
            auto_complete_string: (!closed).then(|| "}".to_string()),
            at_end_of_span: false,
        };
        self.output(SpanKind::Code);

        if closed {
            self.accept_current();
            self.output_meta_code(AcceptedCharacters::None);
        } else {
            self.ctx
                .on_error(messages::expected_end_of_block_before_eof("code"), open, 1);
        }
    }

    /// Code up to the `}` that closes the enclosing block, which is left
    /// unconsumed. Returns false at end of input.
    fn statement_body(&mut self) -> bool {
        let mut depth = 0usize;
        let mut parens = 0usize;
        let mut statement_start = true;
        loop {
            let Some(kind) = self.stream.current_kind() else {
                return false;
            };
            match kind {
                CodeSymbolKind::LeftBrace => {
                    depth += 1;
                    statement_start = true;
                    self.accept_current();
                }
                CodeSymbolKind::RightBrace => {
                    if depth == 0 {
                        return true;
                    }
                    depth -= 1;
                    statement_start = true;
                    self.accept_current();
                }
                CodeSymbolKind::LeftParenthesis => {
                    parens += 1;
                    statement_start = false;
                    self.accept_current();
                }
                CodeSymbolKind::RightParenthesis => {
                    parens = parens.saturating_sub(1);
                    statement_start = false;
                    self.accept_current();
                }
                CodeSymbolKind::Semicolon => {
                    statement_start = parens == 0;
                    self.accept_current();
                }
                CodeSymbolKind::LessThan if statement_start && parens == 0 && self.at_markup_start() => {
                    statement_start = self.nested_markup();
                }
                CodeSymbolKind::Identifier if statement_start && parens == 0 && self.at_statement_keyword() => {
                    self.accept_current();
                    self.condition();
                }
                CodeSymbolKind::Transition => {
                    statement_start = self.transition_in_code();
                }
                CodeSymbolKind::RazorCommentTransition => self.razor_comment(),
                kind if kind.is_trivia() => self.accept_current(),
                _ => {
                    statement_start = false;
                    self.accept_current();
                }
            }
        }
    }

    fn keyword_statement(&mut self, keyword: &str) {
        match keyword {
            "if" => {
                self.accept_current();
                self.condition();
                self.body("if");
                while self.at_continuation(&["else"]) {
                    self.accept_current();
                    if self.at_continuation(&["if"]) {
                        self.accept_current();
                        self.condition();
                        self.body("if");
                    } else {
                        self.body("else");
                    }
                }
            }
            "do" => {
                self.accept_current();
                self.body("do");
                if self.at_continuation(&["while"]) {
                    self.accept_current();
                    self.condition();
                    if self.stream.at(CodeSymbolKind::Semicolon) {
                        self.accept_current();
                    }
                }
            }
            "try" => {
                self.accept_current();
                self.body("try");
                loop {
                    if self.at_continuation(&["catch"]) {
                        self.accept_current();
                        self.condition();
                        self.body("catch");
                    } else if self.at_continuation(&["finally"]) {
                        self.accept_current();
                        self.body("finally");
                        break;
                    } else {
                        break;
                    }
                }
            }
            _ => {
                self.accept_current();
                self.condition();
                self.body(keyword);
            }
        }
        self.output(SpanKind::Code);
    }

    /// An optional parenthesized condition after a keyword.
    fn condition(&mut self) {
        self.accept_trivia();
        if self.stream.at(CodeSymbolKind::LeftParenthesis) {
            self.balance();
        }
    }

    /// A braced body, a single markup element, or a single statement.
    fn body(&mut self, keyword: &str) {
        self.accept_trivia();
        match self.stream.current_kind() {
            Some(CodeSymbolKind::LeftBrace) => {
                let open = self.stream.location();
                self.accept_current();
                if self.statement_body() {
                    self.accept_current();
                } else {
                    let message = messages::expected_end_of_block_before_eof(keyword);
                    self.ctx.on_error(message, open, 1);
                }
            }
            Some(CodeSymbolKind::LessThan) if self.at_markup_start() => {
                self.nested_markup();
            }
            _ => {
                while let Some(kind) = self.stream.current_kind() {
                    if kind == CodeSymbolKind::RightBrace {
                        break;
                    }
                    self.accept_current();
                    if kind == CodeSymbolKind::Semicolon {
                        break;
                    }
                }
            }
        }
    }

    /// Whether one of `keywords` follows, possibly after trivia. On success
    /// the trivia is accepted and the keyword is current.
    fn at_continuation(&mut self, keywords: &[&str]) -> bool {
        let mut n = 0;
        while self.stream.peek_kind(n).is_some_and(CodeSymbolKind::is_trivia) {
            n += 1;
        }
        let found = self
            .stream
            .peek(n)
            .is_some_and(|s| s.kind == CodeSymbolKind::Identifier && keywords.contains(&s.content.as_str()));
        if found {
            for _ in 0..n {
                self.accept_current();
            }
        }
        found
    }

    /// A block keyword, or a clause keyword that continues one, at the
    /// start of a statement inside a code block. Its condition is read so
    /// that an unbraced markup body after it is still seen as markup.
    fn at_statement_keyword(&self) -> bool {
        self.stream.current().is_some_and(|s| {
            s.kind == CodeSymbolKind::Identifier
                && s.content != "section"
                && (self.ctx.options().is_keyword(&s.content) || CLAUSE_KEYWORDS.contains(&s.content.as_str()))
        })
    }

    // ========================================================================
    // Sections
    // ========================================================================

    /// `section Name { markup }`.
    fn section(&mut self) {
        let keyword = self.stream.location();
        if self.ctx.is_within(BlockType::Section) {
            self.ctx
                .on_error(messages::SECTIONS_CANNOT_BE_NESTED, keyword, "section".len());
        }
        self.accept_current();
        while self.stream.at(CodeSymbolKind::WhiteSpace) {
            self.accept_current();
        }

        let mut name = String::new();
        match self.stream.current().cloned() {
            Some(symbol) if symbol.kind == CodeSymbolKind::Identifier => {
                name = symbol.content;
                self.accept_current();
            }
            found => {
                let message = messages::unexpected_character_at_section_name_start(
                    &messages::describe(found.as_ref().map(|s| s.content.as_str())),
                );
                let location = self.stream.location();
                self.ctx.on_error(message, location, 1);
            }
        }
        while self
            .stream
            .current_kind()
            .is_some_and(|k| k == CodeSymbolKind::WhiteSpace || k == CodeSymbolKind::NewLine)
        {
            self.accept_current();
        }
        if let Some(block) = self.blocks.last_mut() {
            block.generator = BlockCodeGenerator::Section { name: name.clone() };
        }

        let open = self.stream.location();
        let has_body = self.stream.at(CodeSymbolKind::LeftBrace);
        if has_body {
            self.accept_current();
        } else {
            let message = messages::missing_open_brace_after_section(&name);
            self.ctx.on_error(message, open, 1);
        }
        self.span.edit_handler = EditHandler::AutoComplete {
            auto_complete_string: None,
            at_end_of_span: true,
        };
        self.output_meta_code(AcceptedCharacters::Any);
        if !has_body {
            return;
        }
        let header = self.blocks.last().and_then(|b| b.children.len().checked_sub(1));

        self.ctx.set_location(self.stream.location());
        match self.ctx.parse_markup_section() {
            Some(body) => {
                self.push_node(body.into());
                self.stream.reset(self.ctx.location());
            }
            None => {
                self.statement_body();
                self.output(SpanKind::Code);
            }
        }

        if self.stream.at(CodeSymbolKind::RightBrace) {
            self.accept_current();
            self.output_meta_code(AcceptedCharacters::None);
        } else {
            self.ctx
                .on_error(messages::expected_end_of_block_before_eof("section"), open, 1);
            let header_span = match (header, self.blocks.last_mut()) {
                (Some(index), Some(block)) => block.children.get_mut(index),
                _ => None,
            };
            if let Some(SyntaxTreeNode::Span(span)) = header_span {
                span.edit_handler = EditHandler::AutoComplete {
                    auto_complete_string: Some("}".to_string()),
                    at_end_of_span: true,
                };
            }
        }
    }

    // ========================================================================
    // Switching back to markup
    // ========================================================================

    fn at_markup_start(&mut self) -> bool {
        self.stream.at(CodeSymbolKind::LessThan)
            && self.stream.peek(1).is_some_and(|s| {
                s.kind == CodeSymbolKind::Identifier || (s.kind == CodeSymbolKind::Operator && s.content == "/")
            })
    }

    /// Returns false when nesting is too deep, in which case the symbol that
    /// would have started markup is kept as code.
    fn nested_markup(&mut self) -> bool {
        self.output(SpanKind::Code);
        self.ctx.set_location(self.stream.location());
        let Some(block) = self.ctx.parse_markup_block() else {
            self.accept_current();
            return false;
        };
        self.push_node(block.into());
        self.stream.reset(self.ctx.location());
        tracing::trace!(location = %self.ctx.location(), "back in code");
        true
    }

    /// `@:` starts a markup line, `@name` and `@(...)` an expression whose
    /// value is written out. Anything else is reported and kept as code.
    /// Returns whether a new statement may start afterwards.
    fn transition_in_code(&mut self) -> bool {
        match self.stream.peek_kind(1) {
            Some(CodeSymbolKind::Colon) => self.nested_markup(),
            Some(CodeSymbolKind::Identifier | CodeSymbolKind::LeftParenthesis) => {
                self.output(SpanKind::Code);
                let Some(symbol) = self.stream.advance() else {
                    return true;
                };
                let mut transition = Span::new(SpanKind::Transition, symbol.content, symbol.start);
                transition.generator = SpanCodeGenerator::Null;
                transition.accepted_characters = AcceptedCharacters::None;
                self.start_block(BlockType::Expression, transition);
                if self.stream.at(CodeSymbolKind::LeftParenthesis) {
                    self.explicit_expression();
                } else {
                    self.implicit_expression(false);
                }
                self.end_block();
                true
            }
            _ => {
                let location = self.stream.location();
                self.ctx.on_error(
                    messages::AT_IN_CODE_MUST_BE_FOLLOWED_BY_COLON_PAREN_OR_IDENTIFIER,
                    location,
                    1,
                );
                self.accept_current();
                true
            }
        }
    }

    fn razor_comment(&mut self) {
        self.output(SpanKind::Code);
        self.ctx.set_location(self.stream.location());
        let block = self.ctx.parse_razor_comment();
        self.push_node(block.into());
        self.stream.reset(self.ctx.location());
    }

    // ========================================================================
    // Symbols, spans and blocks
    // ========================================================================

    fn accept_current(&mut self) {
        if let Some(symbol) = self.stream.advance() {
            self.span.accept(&symbol);
        }
    }

    fn accept_trivia(&mut self) {
        while self.stream.current_kind().is_some_and(CodeSymbolKind::is_trivia) {
            self.accept_current();
        }
    }

    fn output(&mut self, kind: SpanKind) {
        if let Some(span) = self.span.build(kind) {
            self.ctx.set_last_accepted(span.accepted_characters);
            self.push_node(span.into());
        }
        self.span.generator = self.generator.clone();
    }

    fn output_meta_code(&mut self, accepted: AcceptedCharacters) {
        self.span.generator = SpanCodeGenerator::Null;
        self.span.accepted_characters = accepted;
        self.output(SpanKind::MetaCode);
    }

    fn push_node(&mut self, node: SyntaxTreeNode) {
        if let Some(block) = self.blocks.last_mut() {
            block.children.push(node);
        }
    }

    fn start_block(&mut self, kind: BlockType, transition: Span) {
        self.ctx.set_last_accepted(transition.accepted_characters);
        let mut block = BlockBuilder::new(kind);
        block.push(transition);
        self.blocks.push(block);
        self.span.generator = self.generator.clone();
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
            .unwrap_or_else(|| BlockBuilder::new(BlockType::Expression))
            .build()
    }
}

#[cfg(test)]
mod tests {
    use crate::errors::messages;
    use crate::factory::*;
    use crate::tree::AcceptedCharacters;
    use pretty_assertions::assert_eq;

    fn assert_document(source: &str, expected: crate::tree::Block) {
        let results = parse(source);
        assert_eq!(results.document, expected);
        assert!(results.errors.is_empty(), "unexpected errors: {:?}", results.errors);
    }

    // ========================================================================
    // Expressions
    // ========================================================================

    #[test]
    fn test_implicit_expression_with_members_and_calls() {
        let mut f = SpanFactory::new();
        assert_document(
            "@foo.bar(1, (2)).baz[3]. x",
            markup_block(nodes![
                f.empty_html(),
                expression_block(nodes![
                    f.code_transition(),
                    f.code("foo.bar(1, (2)).baz[3]").as_implicit_expression(false),
                ]),
                f.markup(". x"),
            ]),
        );
    }

    #[test]
    fn test_explicit_expression() {
        let mut f = SpanFactory::new();
        assert_document(
            "@(a + (b))",
            markup_block(nodes![
                f.empty_html(),
                expression_block(nodes![
                    f.code_transition(),
                    f.meta_code("(").accepts(AcceptedCharacters::None),
                    f.code("a + (b)").as_expression(),
                    f.meta_code(")").accepts(AcceptedCharacters::None),
                ]),
                f.empty_html(),
            ]),
        );
    }

    #[test]
    fn test_unclosed_explicit_expression() {
        let results = parse("x @(a");
        assert_eq!(results.errors.len(), 1);
        assert_eq!(results.errors[0].location, loc(3, 0, 3));
        assert_eq!(
            results.errors[0].message,
            messages::expected_close_bracket_before_eof("(", ")")
        );
        assert_eq!(results.document.content(), "x @(a");
    }

    #[test]
    fn test_lone_transition() {
        let results = parse("@");
        assert_eq!(results.errors.len(), 1);
        assert_eq!(results.errors[0].location, loc(1, 0, 1));
        assert_eq!(
            results.errors[0].message,
            messages::UNEXPECTED_EOF_AT_START_OF_CODE_BLOCK
        );
    }

    #[test]
    fn test_whitespace_after_transition() {
        let mut f = SpanFactory::new();
        let results = parse("@ foo");
        assert_eq!(
            results.document,
            markup_block(nodes![
                f.empty_html(),
                expression_block(nodes![
                    f.code_transition(),
                    f.empty_code().as_implicit_expression(false),
                ]),
                f.markup(" foo"),
            ])
        );
        assert_eq!(results.errors.len(), 1);
        assert_eq!(
            results.errors[0].message,
            messages::UNEXPECTED_WHITESPACE_AT_START_OF_CODE_BLOCK
        );
        assert_eq!(results.errors[0].location, loc(1, 0, 1));
    }

    #[test]
    fn test_invalid_character_after_transition() {
        let results = parse("@!");
        assert_eq!(results.errors.len(), 1);
        assert_eq!(
            results.errors[0].message,
            messages::unexpected_character_at_start_of_code_block("!")
        );
        assert_eq!(results.document.content(), "@!");
    }

    // ========================================================================
    // Statements
    // ========================================================================

    #[test]
    fn test_statement_block() {
        let mut f = SpanFactory::new();
        assert_document(
            "@{var x = 1;}",
            markup_block(nodes![
                f.empty_html(),
                statement_block(nodes![
                    f.code_transition(),
                    f.meta_code("{").accepts(AcceptedCharacters::None),
                    f.code("var x = 1;").as_statement().auto_complete_with(None, false),
                    f.meta_code("}").accepts(AcceptedCharacters::None),
                ]),
                f.empty_html(),
            ]),
        );
    }

    #[test]
    fn test_unclosed_statement_block() {
        let mut f = SpanFactory::new();
        let results = parse("@{");
        assert_eq!(
            results.document,
            markup_block(nodes![
                f.empty_html(),
                statement_block(nodes![
                    f.code_transition(),
                    f.meta_code("{").accepts(AcceptedCharacters::None),
                    f.empty_code().as_statement().auto_complete_with(Some("}"), false),
                ]),
            ])
        );
        assert_eq!(results.errors.len(), 1);
        assert_eq!(results.errors[0].location, loc(1, 0, 1));
        assert_eq!(
            results.errors[0].message,
            messages::expected_end_of_block_before_eof("code")
        );
    }

    #[test]
    fn test_keyword_statement_in_markup() {
        let mut f = SpanFactory::new();
        assert_document(
            "<div>Foo @if(true) {} Bar</div>",
            markup_block(nodes![
                tag_block(nodes![f.markup("<div>")]),
                f.markup("Foo "),
                statement_block(nodes![
                    f.code_transition(),
                    f.code("if(true) {}").as_statement(),
                ]),
                f.markup(" Bar"),
                tag_block(nodes![f.markup("</div>")]),
            ]),
        );
    }

    #[test]
    fn test_if_else_chain_is_one_span() {
        let results = parse("@if(a) { x(); } else if(b) { y(); }\r\nelse { z(); } after");
        assert!(results.errors.is_empty());
        let statement = results.document.children[1].as_block().unwrap();
        assert_eq!(statement.children.len(), 2);
        assert_eq!(
            statement.children[1].as_span().unwrap().content,
            "if(a) { x(); } else if(b) { y(); }\r\nelse { z(); }"
        );
        assert_eq!(results.document.children[2].as_span().unwrap().content, " after");
    }

    #[test]
    fn test_do_while_and_try() {
        let results = parse("@do { i++; } while(i < 3);@try { a(); } catch(E e) { } finally { b(); }");
        assert!(results.errors.is_empty());
        let contents: Vec<String> = results
            .document
            .children
            .iter()
            .filter_map(|c| c.as_block())
            .map(|b| b.content())
            .collect();
        assert_eq!(
            contents,
            vec![
                "@do { i++; } while(i < 3);".to_string(),
                "@try { a(); } catch(E e) { } finally { b(); }".to_string(),
            ]
        );
    }

    #[test]
    fn test_keyword_without_continuation_leaves_whitespace() {
        let results = parse("@while(x) { }  \r\n");
        let last = results.document.children.last().unwrap().as_span().unwrap();
        assert_eq!(last.content, "  \r\n");
    }

    #[test]
    fn test_unclosed_keyword_body() {
        let results = parse("@foreach(var x in y) {");
        assert_eq!(results.errors.len(), 1);
        assert_eq!(results.errors[0].location, loc(21, 0, 21));
        assert_eq!(
            results.errors[0].message,
            messages::expected_end_of_block_before_eof("foreach")
        );
    }

    // ========================================================================
    // Markup in code
    // ========================================================================

    #[test]
    fn test_markup_block_in_statement() {
        let mut f = SpanFactory::new();
        assert_document(
            "@{<p>Foo</p>}",
            markup_block(nodes![
                f.empty_html(),
                statement_block(nodes![
                    f.code_transition(),
                    f.meta_code("{").accepts(AcceptedCharacters::None),
                    markup_block(nodes![
                        tag_block(nodes![f.markup("<p>")]),
                        f.markup("Foo"),
                        tag_block(nodes![f.markup("</p>")]),
                    ]),
                    f.empty_code().as_statement().auto_complete_with(None, false),
                    f.meta_code("}").accepts(AcceptedCharacters::None),
                ]),
                f.empty_html(),
            ]),
        );
    }

    #[test]
    fn test_unbraced_keyword_body_in_statement_block() {
        let mut f = SpanFactory::new();
        assert_document(
            "@{ if(x) <p>a</p> }",
            markup_block(nodes![
                f.empty_html(),
                statement_block(nodes![
                    f.code_transition(),
                    f.meta_code("{").accepts(AcceptedCharacters::None),
                    f.code(" if(x) ").as_statement(),
                    markup_block(nodes![
                        tag_block(nodes![f.markup("<p>")]),
                        f.markup("a"),
                        tag_block(nodes![f.markup("</p>")]),
                    ]),
                    f.code(" ").as_statement().auto_complete_with(None, false),
                    f.meta_code("}").accepts(AcceptedCharacters::None),
                ]),
                f.empty_html(),
            ]),
        );
    }

    #[test]
    fn test_markup_split_inside_keyword_statement() {
        let mut f = SpanFactory::new();
        assert_document(
            "@if(x) {<br/>\r\n}",
            markup_block(nodes![
                f.empty_html(),
                statement_block(nodes![
                    f.code_transition(),
                    f.code("if(x) {").as_statement(),
                    markup_block(nodes![
                        tag_block(nodes![f.markup("<br/>")]),
                        f.markup("\r\n").accepts(AcceptedCharacters::None),
                    ]),
                    f.code("}").as_statement(),
                ]),
            ]),
        );
    }

    #[test]
    fn test_text_tag_is_transition() {
        let mut f = SpanFactory::new();
        assert_document(
            "@{<text>Foo</text>}",
            markup_block(nodes![
                f.empty_html(),
                statement_block(nodes![
                    f.code_transition(),
                    f.meta_code("{").accepts(AcceptedCharacters::None),
                    markup_block(nodes![
                        tag_block(nodes![f.markup_transition("<text>")]),
                        f.markup("Foo"),
                        tag_block(nodes![f.markup_transition("</text>")]),
                    ]),
                    f.empty_code().as_statement().auto_complete_with(None, false),
                    f.meta_code("}").accepts(AcceptedCharacters::None),
                ]),
                f.empty_html(),
            ]),
        );
    }

    #[test]
    fn test_single_line_markup() {
        let mut f = SpanFactory::new();
        assert_document(
            "@{@:Hello @name\r\n}",
            markup_block(nodes![
                f.empty_html(),
                statement_block(nodes![
                    f.code_transition(),
                    f.meta_code("{").accepts(AcceptedCharacters::None),
                    markup_block(nodes![
                        f.markup_transition("@"),
                        f.meta_code(":").accepts(AcceptedCharacters::None),
                        f.markup("Hello "),
                        expression_block(nodes![
                            f.code_transition(),
                            f.code("name").as_implicit_expression(true),
                        ]),
                        f.markup("\r\n").accepts(AcceptedCharacters::None),
                    ]),
                    f.empty_code().as_statement().auto_complete_with(None, false),
                    f.meta_code("}").accepts(AcceptedCharacters::None),
                ]),
                f.empty_html(),
            ]),
        );
    }

    #[test]
    fn test_nested_expression_in_code() {
        let mut f = SpanFactory::new();
        assert_document(
            "@{@foo}",
            markup_block(nodes![
                f.empty_html(),
                statement_block(nodes![
                    f.code_transition(),
                    f.meta_code("{").accepts(AcceptedCharacters::None),
                    expression_block(nodes![
                        f.code_transition(),
                        f.code("foo").as_implicit_expression(false),
                    ]),
                    f.empty_code().as_statement().auto_complete_with(None, false),
                    f.meta_code("}").accepts(AcceptedCharacters::None),
                ]),
                f.empty_html(),
            ]),
        );
    }

    #[test]
    fn test_missing_end_tag_in_code() {
        let results = parse("@{<p>}");
        let found: Vec<String> = results.errors.iter().map(|e| e.message.clone()).collect();
        assert_eq!(
            found,
            vec![
                messages::missing_end_tag("p"),
                messages::expected_end_of_block_before_eof("code"),
            ]
        );
        assert_eq!(results.errors[0].location, loc(2, 0, 2));
    }

    #[test]
    fn test_unexpected_end_tag_in_code() {
        let results = parse("@{</p>}");
        assert_eq!(results.errors.len(), 1);
        assert_eq!(results.errors[0].message, messages::unexpected_end_tag("p"));
    }

    #[test]
    fn test_void_element_closes_immediately() {
        let results = parse("@{<br><hr />}");
        assert!(results.errors.is_empty());
        let statement = results.document.children[1].as_block().unwrap();
        let blocks = statement.children.iter().filter(|c| c.as_block().is_some()).count();
        assert_eq!(blocks, 2);
    }

    #[test]
    fn test_at_sign_in_code_is_reported() {
        let results = parse("@{ @; }");
        assert_eq!(results.errors.len(), 1);
        assert_eq!(
            results.errors[0].message,
            messages::AT_IN_CODE_MUST_BE_FOLLOWED_BY_COLON_PAREN_OR_IDENTIFIER
        );
        assert_eq!(results.errors[0].location, loc(3, 0, 3));
    }

    #[test]
    fn test_razor_comment_in_code() {
        let mut f = SpanFactory::new();
        assert_document(
            "@{@*c*@}",
            markup_block(nodes![
                f.empty_html(),
                statement_block(nodes![
                    f.code_transition(),
                    f.meta_code("{").accepts(AcceptedCharacters::None),
                    comment_block(nodes![
                        f.markup_transition("@"),
                        f.meta_code("*").accepts(AcceptedCharacters::None),
                        f.comment("c"),
                        f.meta_code("*").accepts(AcceptedCharacters::None),
                        f.markup_transition("@"),
                    ]),
                    f.empty_code().as_statement().auto_complete_with(None, false),
                    f.meta_code("}").accepts(AcceptedCharacters::None),
                ]),
                f.empty_html(),
            ]),
        );
    }

    // ========================================================================
    // Sections
    // ========================================================================

    #[test]
    fn test_section() {
        let mut f = SpanFactory::new();
        assert_document(
            "@section Foo { <p>x</p> }",
            markup_block(nodes![
                f.empty_html(),
                section_block(
                    "Foo",
                    nodes![
                        f.code_transition(),
                        f.meta_code("section Foo {").auto_complete_with(None, true),
                        markup_block(nodes![
                            f.markup(" "),
                            tag_block(nodes![f.markup("<p>")]),
                            f.markup("x"),
                            tag_block(nodes![f.markup("</p>")]),
                            f.markup(" "),
                        ]),
                        f.meta_code("}").accepts(AcceptedCharacters::None),
                    ],
                ),
                f.empty_html(),
            ]),
        );
    }

    #[test]
    fn test_section_with_balanced_braces() {
        let results = parse("@section S {a{b}c}d");
        assert!(results.errors.is_empty());
        let section = results.document.children[1].as_block().unwrap();
        let body = section.children[2].as_block().unwrap();
        assert_eq!(body.content(), "a{b}c");
        assert_eq!(results.document.children[2].as_span().unwrap().content, "d");
    }

    #[test]
    fn test_empty_section_body_gets_marker() {
        let mut f = SpanFactory::new();
        assert_document(
            "@section Foo {}",
            markup_block(nodes![
                f.empty_html(),
                section_block(
                    "Foo",
                    nodes![
                        f.code_transition(),
                        f.meta_code("section Foo {").auto_complete_with(None, true),
                        markup_block(nodes![f.empty_html()]),
                        f.meta_code("}").accepts(AcceptedCharacters::None),
                    ],
                ),
                f.empty_html(),
            ]),
        );
    }

    #[test]
    fn test_unclosed_section() {
        let mut f = SpanFactory::new();
        let results = parse("@section Foo {<p>");
        assert_eq!(
            results.document,
            markup_block(nodes![
                f.empty_html(),
                section_block(
                    "Foo",
                    nodes![
                        f.code_transition(),
                        f.meta_code("section Foo {").auto_complete_with(Some("}"), true),
                        markup_block(nodes![tag_block(nodes![f.markup("<p>")])]),
                    ],
                ),
            ])
        );
        assert_eq!(results.errors.len(), 1);
        assert_eq!(results.errors[0].location, loc(13, 0, 13));
        assert_eq!(
            results.errors[0].message,
            messages::expected_end_of_block_before_eof("section")
        );
    }

    #[test]
    fn test_nested_sections_are_reported() {
        let results = parse("@section A { @section B { } }");
        assert_eq!(results.errors.len(), 1);
        assert_eq!(results.errors[0].message, messages::SECTIONS_CANNOT_BE_NESTED);
        assert_eq!(results.errors[0].location, loc(14, 0, 14));
        assert_eq!(results.document.content(), "@section A { @section B { } }");
    }

    #[test]
    fn test_section_without_name() {
        let results = parse("@section { }");
        assert_eq!(results.errors.len(), 1);
        assert_eq!(
            results.errors[0].message,
            messages::unexpected_character_at_section_name_start("{")
        );
        assert_eq!(results.document.content(), "@section { }");
    }

    #[test]
    fn test_section_without_brace() {
        let results = parse("@section Foo bar");
        assert_eq!(results.errors.len(), 1);
        assert_eq!(
            results.errors[0].message,
            messages::missing_open_brace_after_section("Foo")
        );
        assert_eq!(results.errors[0].location, loc(13, 0, 13));
        assert_eq!(results.document.content(), "@section Foo bar");
    }
}

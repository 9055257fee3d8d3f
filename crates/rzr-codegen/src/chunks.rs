use crate::{Chunk, ChunkKind, ChunkTree, CodegenError};
use rzr_lexer::SourceLocation;
use rzr_parser::{Block, BlockCodeGenerator, Span, SpanCodeGenerator, SyntaxTreeNode};

/// Lower a parsed document into chunks.
pub fn build_chunk_tree(document: &Block) -> Result<ChunkTree, CodegenError> {
    let mut chunks = Vec::new();
    visit_children(&document.children, false, &mut chunks)?;
    tracing::debug!(chunks = chunks.len(), "chunk tree built");
    Ok(ChunkTree { chunks })
}

fn visit_children(children: &[SyntaxTreeNode], in_attribute: bool, out: &mut Vec<Chunk>) -> Result<(), CodegenError> {
    for child in children {
        match child {
            SyntaxTreeNode::Span(span) => visit_span(span, in_attribute, out)?,
            SyntaxTreeNode::Block(block) => visit_block(block, in_attribute, out)?,
        }
    }
    Ok(())
}

fn visit_span(span: &Span, in_attribute: bool, out: &mut Vec<Chunk>) -> Result<(), CodegenError> {
    if span.is_marker() {
        return Ok(());
    }
    match &span.generator {
        SpanCodeGenerator::Null => {}
        SpanCodeGenerator::Markup => push_literal(span, out),
        SpanCodeGenerator::Expression => out.push(Chunk::new(
            ChunkKind::Expression(span.content.clone()),
            span.start,
            span.length(),
        )),
        SpanCodeGenerator::Statement => out.push(Chunk::new(
            ChunkKind::Statement(span.content.clone()),
            span.start,
            span.length(),
        )),
        SpanCodeGenerator::LiteralAttribute { prefix, value } => {
            if !in_attribute {
                return Err(CodegenError::LiteralAttributeOutsideAttribute { location: span.start });
            }
            out.push(Chunk::new(
                ChunkKind::LiteralCodeAttribute {
                    prefix: prefix.clone(),
                    value: value.clone(),
                },
                span.start,
                span.length(),
            ));
        }
    }
    Ok(())
}

/// Extend the previous literal when it ends where this span starts.
fn push_literal(span: &Span, out: &mut Vec<Chunk>) {
    if let Some(last) = out.last_mut() {
        let contiguous = last.start.absolute_index + last.length == span.start.absolute_index;
        if let (ChunkKind::Literal(text), true) = (&mut last.kind, contiguous) {
            text.push_str(&span.content);
            last.length += span.length();
            return;
        }
    }
    out.push(Chunk::new(
        ChunkKind::Literal(span.content.clone()),
        span.start,
        span.length(),
    ));
}

fn visit_block(block: &Block, in_attribute: bool, out: &mut Vec<Chunk>) -> Result<(), CodegenError> {
    let start = block.start().unwrap_or(SourceLocation::ZERO);
    match &block.generator {
        BlockCodeGenerator::Null | BlockCodeGenerator::Expression => {
            visit_children(&block.children, in_attribute, out)?;
        }
        BlockCodeGenerator::RazorComment => {}
        BlockCodeGenerator::Section { name } => {
            let mut children = Vec::new();
            visit_children(&block.children, in_attribute, &mut children)?;
            out.push(Chunk::new(
                ChunkKind::Section {
                    name: name.clone(),
                    children,
                },
                start,
                block.length(),
            ));
        }
        BlockCodeGenerator::Attribute { name, prefix, suffix } => {
            if in_attribute {
                return Err(CodegenError::NestedAttribute { location: start });
            }
            let mut children = Vec::new();
            visit_children(&block.children, true, &mut children)?;
            out.push(Chunk::new(
                ChunkKind::CodeAttribute {
                    name: name.clone(),
                    prefix: prefix.clone(),
                    suffix: suffix.clone(),
                    children,
                },
                start,
                block.length(),
            ));
        }
        BlockCodeGenerator::DynamicAttribute { prefix, value_start } => {
            if !in_attribute {
                return Err(CodegenError::DynamicAttributeOutsideAttribute { location: start });
            }
            let mut children = Vec::new();
            visit_children(&block.children, true, &mut children)?;
            out.push(Chunk::new(
                ChunkKind::DynamicCodeAttribute {
                    prefix: prefix.clone(),
                    value_start: *value_start,
                    children,
                },
                start,
                block.length(),
            ));
        }
    }
    Ok(())
}

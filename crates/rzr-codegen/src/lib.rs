//! rzr Chunk Builder
//!
//! Lowers a parsed syntax tree into a flat list of chunks, the unit an
//! emission backend works in. Spans with a `Null` generator contribute
//! nothing, adjacent literal markup is merged, and attribute and section
//! blocks become nested chunks.
//!
//! ```text
//! Block tree → build_chunk_tree() → ChunkTree { chunks }
//! ```

pub mod chunks;

pub use chunks::build_chunk_tree;

use rzr_lexer::{LocationTagged, SourceLocation};
use std::fmt;

/// One unit of output.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Chunk {
    pub kind: ChunkKind,
    pub start: SourceLocation,
    /// Length of the source range the chunk came from.
    pub length: usize,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChunkKind {
    /// Markup written out verbatim.
    Literal(String),
    /// Code whose value is written out.
    Expression(String),
    /// Code executed for its effect.
    Statement(String),
    Section {
        name: String,
        children: Vec<Chunk>,
    },
    /// An attribute whose value is assembled from the children.
    CodeAttribute {
        name: String,
        prefix: LocationTagged<String>,
        suffix: LocationTagged<String>,
        children: Vec<Chunk>,
    },
    LiteralCodeAttribute {
        prefix: LocationTagged<String>,
        value: LocationTagged<String>,
    },
    DynamicCodeAttribute {
        prefix: LocationTagged<String>,
        value_start: SourceLocation,
        children: Vec<Chunk>,
    },
}

impl Chunk {
    pub fn new(kind: ChunkKind, start: SourceLocation, length: usize) -> Self {
        Self { kind, start, length }
    }

    pub fn children(&self) -> &[Chunk] {
        match &self.kind {
            ChunkKind::Section { children, .. }
            | ChunkKind::CodeAttribute { children, .. }
            | ChunkKind::DynamicCodeAttribute { children, .. } => children,
            _ => &[],
        }
    }

    fn write_tree(&self, f: &mut fmt::Formatter<'_>, depth: usize) -> fmt::Result {
        let indent = "  ".repeat(depth);
        let at = format!("at {}::{}", self.start, self.length);
        match &self.kind {
            ChunkKind::Literal(text) => writeln!(f, "{indent}Literal {at} - [{}]", text.escape_debug())?,
            ChunkKind::Expression(code) => writeln!(f, "{indent}Expression {at} - [{}]", code.escape_debug())?,
            ChunkKind::Statement(code) => writeln!(f, "{indent}Statement {at} - [{}]", code.escape_debug())?,
            ChunkKind::Section { name, .. } => writeln!(f, "{indent}Section {name} {at}")?,
            ChunkKind::CodeAttribute { name, prefix, suffix, .. } => {
                writeln!(f, "{indent}CodeAttribute {name} {at} - {prefix}/{suffix}")?
            }
            ChunkKind::LiteralCodeAttribute { prefix, value } => {
                writeln!(f, "{indent}LiteralCodeAttribute {at} - {prefix}/{value}")?
            }
            ChunkKind::DynamicCodeAttribute { prefix, value_start, .. } => {
                writeln!(f, "{indent}DynamicCodeAttribute {at} - {prefix}/{value_start}")?
            }
        }
        for child in self.children() {
            child.write_tree(f, depth + 1)?;
        }
        Ok(())
    }
}

impl fmt::Display for Chunk {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.write_tree(f, 0)
    }
}

/// The lowered document.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ChunkTree {
    pub chunks: Vec<Chunk>,
}

impl fmt::Display for ChunkTree {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for chunk in &self.chunks {
            chunk.write_tree(f, 0)?;
        }
        Ok(())
    }
}

/// A tree whose descriptors are attached where no parser puts them.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CodegenError {
    #[error("Codegen error at {location}: literal attribute value outside an attribute block")]
    LiteralAttributeOutsideAttribute { location: SourceLocation },
    #[error("Codegen error at {location}: dynamic attribute value outside an attribute block")]
    DynamicAttributeOutsideAttribute { location: SourceLocation },
    #[error("Codegen error at {location}: attribute blocks cannot be nested")]
    NestedAttribute { location: SourceLocation },
}

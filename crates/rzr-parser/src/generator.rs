//! Code-generator descriptors.
//!
//! Immutable values attached to spans and blocks that record how a fragment
//! is to be emitted later. The parser only produces them; an emission
//! backend consumes them by exhaustive matching.

use rzr_lexer::{LocationTagged, SourceLocation};
use std::fmt;

/// How a leaf span is emitted.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum SpanCodeGenerator {
    /// Takes part in source mapping but emits nothing.
    Null,
    /// Literal markup written to the output as-is.
    #[default]
    Markup,
    /// Code whose value is written to the output.
    Expression,
    /// Code executed in place.
    Statement,
    /// A literal run inside an attribute value, with the boundary text
    /// (whitespace) that precedes it.
    LiteralAttribute {
        prefix: LocationTagged<String>,
        value: LocationTagged<String>,
    },
}

/// How an internal node is emitted.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum BlockCodeGenerator {
    /// Children are emitted one after another.
    #[default]
    Null,
    Expression,
    /// One markup attribute, `prefix` being `name="` (with the leading
    /// whitespace) and `suffix` the closing quote.
    Attribute {
        name: String,
        prefix: LocationTagged<String>,
        suffix: LocationTagged<String>,
    },
    /// A code-produced piece of an attribute value.
    DynamicAttribute {
        prefix: LocationTagged<String>,
        value_start: SourceLocation,
    },
    Section {
        name: String,
    },
    RazorComment,
}

impl fmt::Display for SpanCodeGenerator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SpanCodeGenerator::Null => write!(f, "None"),
            SpanCodeGenerator::Markup => write!(f, "Markup"),
            SpanCodeGenerator::Expression => write!(f, "Expr"),
            SpanCodeGenerator::Statement => write!(f, "Stmt"),
            SpanCodeGenerator::LiteralAttribute { prefix, value } => {
                write!(f, "LitAttr:{prefix},{value}")
            }
        }
    }
}

impl fmt::Display for BlockCodeGenerator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BlockCodeGenerator::Null => write!(f, "None"),
            BlockCodeGenerator::Expression => write!(f, "Expr"),
            BlockCodeGenerator::Attribute {
                name,
                prefix,
                suffix,
            } => write!(f, "Attr:{name},{prefix},{suffix}"),
            BlockCodeGenerator::DynamicAttribute {
                prefix,
                value_start,
            } => write!(f, "DynAttr:{prefix},{value_start}"),
            BlockCodeGenerator::Section { name } => write!(f, "Section:{name}"),
            BlockCodeGenerator::RazorComment => write!(f, "RazorComment"),
        }
    }
}

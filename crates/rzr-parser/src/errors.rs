//! Diagnostics.
//!
//! Parsing never stops at the first problem: every issue is recorded as a
//! `RazorError` in the context's `ErrorSink` and the parser carries on,
//! producing a full tree regardless.

use rzr_lexer::SourceLocation;

/// A diagnostic produced while parsing.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error(
    "Error at line {}, column {}: {message}",
    .location.line_index + 1,
    .location.character_index + 1
)]
pub struct RazorError {
    pub message: String,
    pub location: SourceLocation,
    pub length: usize,
}

impl RazorError {
    pub fn new(message: impl Into<String>, location: SourceLocation, length: usize) -> Self {
        Self {
            message: message.into(),
            location,
            length,
        }
    }
}

/// Ordered collection of diagnostics. Errors are reported in the order
/// they were found.
#[derive(Debug, Clone, Default)]
pub struct ErrorSink {
    errors: Vec<RazorError>,
}

impl ErrorSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn on_error(&mut self, message: impl Into<String>, location: SourceLocation, length: usize) {
        let error = RazorError::new(message, location, length);
        tracing::debug!(%error, "diagnostic recorded");
        self.errors.push(error);
    }

    pub fn errors(&self) -> &[RazorError] {
        &self.errors
    }

    pub fn len(&self) -> usize {
        self.errors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn into_errors(self) -> Vec<RazorError> {
        self.errors
    }
}

/// Misuse of the parser API, as opposed to problems in the parsed source.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ParserError {
    #[error("The parser context has not been set")]
    ContextNotSet,
}

/// Diagnostic message texts.
pub mod messages {
    pub const UNEXPECTED_EOF_AT_START_OF_CODE_BLOCK: &str =
        "End-of-file was found after the \"@\" character.  \"@\" must be followed by a valid code block.  If you want to output an \"@\", escape it using the sequence: \"@@\"";

    pub const UNEXPECTED_WHITESPACE_AT_START_OF_CODE_BLOCK: &str =
        "A space or line break was encountered after the \"@\" character.  Only valid identifiers, keywords, comments, \"(\" and \"{\" are valid at the start of a code block and they must occur immediately following \"@\" with no space in between.";

    pub const RAZOR_COMMENT_NOT_TERMINATED: &str =
        "Razor comment is not terminated.  All Razor comments must be terminated with a \"*@\".";

    pub const SECTIONS_CANNOT_BE_NESTED: &str =
        "Section blocks (\"@section Header { ... }\") cannot be nested.  Only one level of section blocks are allowed.";

    pub const AT_IN_CODE_MUST_BE_FOLLOWED_BY_COLON_PAREN_OR_IDENTIFIER: &str =
        "The \"@\" character must be followed by a \":\", \"(\", or an identifier.  If you intended to switch to markup, use an HTML start tag, for example:\r\n\r\n@if(isLoggedIn) {\r\n    <p>Hello, @user!</p>\r\n}";

    pub const TEXT_TAG_CANNOT_CONTAIN_ATTRIBUTES: &str =
        "\"<text>\" and \"</text>\" tags cannot contain attributes.";

    pub fn nesting_too_deep(limit: usize) -> String {
        format!(
            "Markup and code blocks are nested more than {limit} levels deep.  The remainder of this block is treated as code."
        )
    }

    pub fn unexpected_character_at_start_of_code_block(found: &str) -> String {
        format!(
            "\"{found}\" is not valid at the start of a code block.  Only identifiers, keywords, comments, \"(\" and \"{{\" are valid."
        )
    }

    pub fn expected_close_bracket_before_eof(open: &str, close: &str) -> String {
        format!("An opening \"{open}\" is missing the corresponding closing \"{close}\".")
    }

    pub fn expected_end_of_block_before_eof(block_name: &str) -> String {
        format!(
            "The {block_name} block is missing a closing \"}}\" character.  Make sure you have a matching \"}}\" character for all the \"{{\" characters within this block, and that none of the \"}}\" characters are being interpreted as markup."
        )
    }

    pub fn unexpected_character_at_section_name_start(found: &str) -> String {
        format!("\"{found}\" is not valid at the start of a section name.  Only identifiers are valid.")
    }

    pub fn missing_open_brace_after_section(name: &str) -> String {
        format!("Expected a \"{{\" after the name of section \"{name}\".")
    }

    pub fn missing_end_tag(tag: &str) -> String {
        format!(
            "The \"{tag}\" element was not closed.  All elements must be either self-closing or have a matching end tag."
        )
    }

    pub fn unexpected_end_tag(tag: &str) -> String {
        format!(
            "Encountered end tag \"{tag}\" with no matching start tag.  Are your start/end tags properly balanced?"
        )
    }

    /// How a found symbol is described in messages.
    pub fn describe(content: Option<&str>) -> String {
        match content {
            None => "end of file".to_string(),
            Some(text) if text.chars().all(char::is_whitespace) => "whitespace".to_string(),
            Some(text) => text.to_string(),
        }
    }
}

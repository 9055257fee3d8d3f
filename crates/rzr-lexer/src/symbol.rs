use crate::location::SourceLocation;

/// A token produced by one of the tokenizers.
///
/// `content` is the exact source text of the symbol, so re-concatenating the
/// symbols of a document always reproduces it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Symbol<K> {
    pub kind: K,
    pub content: String,
    pub start: SourceLocation,
}

impl<K> Symbol<K> {
    pub fn new(kind: K, content: impl Into<String>, start: SourceLocation) -> Self {
        Self {
            kind,
            content: content.into(),
            start,
        }
    }

    /// Location just past the last character of this symbol.
    pub fn end(&self) -> SourceLocation {
        self.start.advance(&self.content)
    }

    pub fn len(&self) -> usize {
        self.content.len()
    }

    pub fn is_empty(&self) -> bool {
        self.content.is_empty()
    }
}

/// Pieces of a `@* ... *@` comment, shared by both tokenizers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub(crate) enum CommentState {
    #[default]
    Outside,
    OpeningStar,
    Body,
    ClosingStar,
    ClosingTransition,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum CommentPiece {
    Star,
    Body,
    Transition,
}

/// Scan the next comment piece. Returns `None` once the comment is finished
/// (state goes back to `Outside`) or input ends inside it.
pub(crate) fn scan_comment_piece(
    state: &mut CommentState,
    reader: &mut crate::reader::SourceReader<'_>,
) -> Option<CommentPiece> {
    loop {
        match *state {
            CommentState::Outside => return None,
            CommentState::OpeningStar => {
                reader.advance();
                *state = CommentState::Body;
                return Some(CommentPiece::Star);
            }
            CommentState::Body => {
                let start = reader.location();
                let terminated = reader.advance_until("*@");
                *state = if terminated {
                    CommentState::ClosingStar
                } else {
                    CommentState::Outside
                };
                if reader.location() != start {
                    return Some(CommentPiece::Body);
                }
            }
            CommentState::ClosingStar => {
                reader.advance();
                *state = CommentState::ClosingTransition;
                return Some(CommentPiece::Star);
            }
            CommentState::ClosingTransition => {
                reader.advance();
                *state = CommentState::Outside;
                return Some(CommentPiece::Transition);
            }
        }
    }
}

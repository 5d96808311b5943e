//! Comment rules

mod comment_spacing;
mod terminator_comment;

pub use comment_spacing::CommentSpacingRule;
pub use terminator_comment::TerminatorCommentRule;

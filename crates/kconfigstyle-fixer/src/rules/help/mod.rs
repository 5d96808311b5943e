//! Help text rules

mod help_indent;
mod help_reflow;

pub use help_indent::HelpIndentRule;
pub use help_reflow::HelpReflowRule;

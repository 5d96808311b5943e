//! Comments echoing the opening construct after `endmenu`/`endif`/`endchoice`

use kconfigstyle_core::syntax::{BlockKind, NodeKind};
use kconfigstyle_core::Edit;

use crate::config::RuleConfigError;
use crate::diagnostic::Diagnostic;
use crate::rules::{Rule, RuleContext};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Mode {
    Require,
    Forbid,
}

/// Requires (or forbids) `endmenu # Title`, `endif # EXPR`, `endchoice # NAME`
pub struct TerminatorCommentRule;

impl Rule for TerminatorCommentRule {
    fn id(&self) -> &'static str {
        "terminator-comment"
    }

    fn description(&self) -> &'static str {
        "Echo the opening construct in a comment after block terminators"
    }

    fn check(&self, ctx: &RuleContext<'_>) -> Result<Vec<Diagnostic>, RuleConfigError> {
        let mode = match ctx.params.string("mode", "require")? {
            "require" => Mode::Require,
            "forbid" => Mode::Forbid,
            other => {
                return Err(ctx
                    .params
                    .invalid("mode", other, "expected `require` or `forbid`"));
            }
        };
        let tree = ctx.tree;
        let source = ctx.source();
        let mut diagnostics = Vec::new();

        for (_, node) in tree.nodes() {
            let NodeKind::Block(block) = &node.kind else {
                continue;
            };
            if block.kind == BlockKind::File {
                continue;
            }
            let Some(terminator) = block.terminator else {
                continue;
            };
            let line = tree.line(terminator);
            let Some(head) = line.head else {
                continue;
            };
            let keyword = tree.token_text(head);
            let head_end = tree.tokens()[head].span.end.offset;

            match (mode, line.comment) {
                (Mode::Require, None) => {
                    let Some(label) = &block.label else {
                        continue;
                    };
                    let message = format!("Missing `# {}` after `{}`", label, keyword);
                    diagnostics.push(
                        ctx.diagnostic(message, tree.tokens()[head].span)
                            .with_edit(Edit::insert(
                                head_end,
                                format!(" # {}", label),
                                "Add terminator comment",
                            )),
                    );
                }
                (Mode::Require, Some(comment)) => {
                    let Some(label) = &block.label else {
                        continue;
                    };
                    let token = &tree.tokens()[comment];
                    let text = token.text(source).trim_start_matches('#').trim();
                    let quoted = format!("\"{}\"", label);
                    if text == label || text == quoted {
                        continue;
                    }
                    let message = format!("Terminator comment should be `# {}`", label);
                    diagnostics.push(
                        ctx.diagnostic(message, token.span).with_edit(Edit::new(
                            token.span.start.offset,
                            token.span.end.offset,
                            format!("# {}", label),
                            "Fix terminator comment",
                        )),
                    );
                }
                (Mode::Forbid, Some(comment)) => {
                    let token = &tree.tokens()[comment];
                    let message = format!("Unexpected comment after `{}`", keyword);
                    diagnostics.push(
                        ctx.diagnostic(message, token.span).with_edit(Edit::delete(
                            head_end,
                            token.span.end.offset,
                            "Remove terminator comment",
                        )),
                    );
                }
                (Mode::Forbid, None) => {}
            }
        }

        diagnostics.sort_by_key(|d| d.span.start.offset);
        Ok(diagnostics)
    }
}

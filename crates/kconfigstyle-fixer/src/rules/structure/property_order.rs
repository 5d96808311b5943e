//! Ordering of property lines within an entry

use kconfigstyle_core::syntax::{EntryItem, NodeKind, Property, Tree};
use kconfigstyle_core::Edit;

use crate::config::RuleConfigError;
use crate::diagnostic::Diagnostic;
use crate::rules::{Rule, RuleContext};

const DEFAULT_ORDER: &[&str] = &[
    "type", "prompt", "default", "depends", "select", "imply", "range", "option", "visible",
    "modules", "optional", "transitional", "help",
];

/// A property together with the comments directly above it
struct Unit<'a> {
    property: &'a Property,
    first_line: usize,
    rank: usize,
}

/// Orders the properties of each entry by the profile's `order` groups
///
/// Groups missing from `order` sort after all listed ones. The fix is a stable
/// reorder; comments directly above a property move with it.
pub struct PropertyOrderRule;

impl Rule for PropertyOrderRule {
    fn id(&self) -> &'static str {
        "property-order"
    }

    fn description(&self) -> &'static str {
        "Order entry properties consistently"
    }

    fn check(&self, ctx: &RuleContext<'_>) -> Result<Vec<Diagnostic>, RuleConfigError> {
        let order = ctx.params.list("order", DEFAULT_ORDER)?;
        let tree = ctx.tree;
        let source = ctx.source();
        let rank = |property: &Property| {
            order
                .iter()
                .position(|group| group == property.kind.group())
                .unwrap_or(order.len())
        };
        let mut diagnostics = Vec::new();

        for (_, node) in tree.nodes() {
            let NodeKind::Entry(entry) = &node.kind else {
                continue;
            };

            let mut units = Vec::new();
            let mut pending: Option<usize> = None;
            let mut splittable = true;
            for item in &entry.items {
                match item {
                    EntryItem::Comment(line) => {
                        pending.get_or_insert(*line);
                    }
                    EntryItem::Property(property) => units.push(Unit {
                        property,
                        first_line: pending.take().unwrap_or(property.line),
                        rank: rank(property),
                    }),
                    EntryItem::Blank(_) | EntryItem::Invalid(_) => splittable = false,
                }
            }

            let Some((misplaced, before)) = first_misplaced(&units) else {
                continue;
            };
            let message = format!(
                "`{}` should come before `{}`",
                units[misplaced].property.kind, units[before].property.kind
            );
            let span = tree.line_content_span(units[misplaced].property.line);
            let mut diagnostic = ctx.diagnostic(message, span);

            let last_line = units
                .last()
                .map(|u| u.property.lines().end - 1)
                .unwrap_or(entry.header);
            if splittable && tree.line(last_line).newline.is_some() {
                diagnostic = diagnostic.with_edit(reorder(tree, source, &units, last_line));
            }
            diagnostics.push(diagnostic);
        }

        diagnostics.sort_by_key(|d| d.span.start.offset);
        Ok(diagnostics)
    }
}

/// First unit ranked below an earlier one, and the earlier unit it should precede
fn first_misplaced(units: &[Unit<'_>]) -> Option<(usize, usize)> {
    for (i, unit) in units.iter().enumerate() {
        if let Some(before) = units[..i].iter().position(|u| u.rank > unit.rank) {
            return Some((i, before));
        }
    }
    None
}

fn reorder(tree: &Tree, source: &str, units: &[Unit<'_>], last_line: usize) -> Edit {
    let start = tree.line_span(units[0].first_line).start.offset;
    let end = tree.line_span(last_line).end.offset;

    let ends: Vec<usize> = units
        .iter()
        .map(|u| tree.line_span(u.property.lines().end - 1).end.offset)
        .collect();
    let mut pieces: Vec<(usize, &str)> = units
        .iter()
        .zip(ends)
        .map(|(u, end)| (u.rank, &source[tree.line_span(u.first_line).start.offset..end]))
        .collect();
    pieces.sort_by_key(|(rank, _)| *rank);

    let text: String = pieces.iter().map(|(_, text)| *text).collect();
    Edit::new(start, end, text, "Reorder properties")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Preset;
    use crate::rules::test_support::{apply_all, check_preset};

    fn zephyr(source: &str) -> Vec<Diagnostic> {
        check_preset(&PropertyOrderRule, source, Preset::Zephyr)
    }

    #[test]
    fn test_ordered_entry() {
        let source = "config A\n\tbool \"A\"\n\tdefault y\n\tdepends on B\n\thelp\n\t  Text.\n";
        assert!(zephyr(source).is_empty());
    }

    #[test]
    fn test_reorder_with_help_and_comment() {
        let source = "config A\n\thelp\n\t  Text.\n\t# why\n\tdepends on B\n\tbool \"A\"\n";
        let diagnostics = zephyr(source);

        assert_eq!(diagnostics.len(), 1);
        assert_eq!(diagnostics[0].message, "`depends on` should come before `help`");
        assert_eq!(
            apply_all(source, &diagnostics),
            "config A\n\tbool \"A\"\n\t# why\n\tdepends on B\n\thelp\n\t  Text.\n"
        );
    }

    #[test]
    fn test_profiles_disagree_on_depends() {
        let source = "config A\n\tbool \"A\"\n\tdepends on B\n\tdefault y\n";
        assert_eq!(zephyr(source).len(), 1);
        assert!(check_preset(&PropertyOrderRule, source, Preset::EspIdf).is_empty());
    }

    #[test]
    fn test_no_fix_across_blank_lines() {
        let source = "config A\n\tdefault y\n\n\tbool \"A\"\n";
        let diagnostics = zephyr(source);
        assert_eq!(diagnostics.len(), 1);
        assert!(!diagnostics[0].is_fixable());
    }

    #[test]
    fn test_no_fix_without_final_newline() {
        let source = "config A\n\tdefault y\n\tbool \"A\"";
        let diagnostics = zephyr(source);
        assert!(!diagnostics[0].is_fixable());
    }
}

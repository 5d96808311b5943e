//! Tree visitor for walking parsed Kconfig files
//!
//! Provides a trait-based visitor pattern that rules can implement.
//! Default implementations handle traversal; rules override specific methods.

use crate::syntax::{Block, BlockKind, Directive, Entry, NodeId, NodeKind, Tree};

/// Trait for visiting tree nodes
///
/// `depth` is the number of enclosing menu/choice/if blocks. Children of the
/// file root are at depth 0.
pub trait Visitor {
    fn visit_entry(&mut self, _tree: &Tree, _id: NodeId, _entry: &Entry, _depth: usize) {}

    /// Called for each block. Return `true` to continue traversal into children.
    fn visit_block(&mut self, _tree: &Tree, _id: NodeId, _block: &Block, _depth: usize) -> bool {
        true
    }

    /// Called after a block's children were visited
    fn leave_block(&mut self, _tree: &Tree, _id: NodeId, _block: &Block, _depth: usize) {}

    fn visit_directive(
        &mut self,
        _tree: &Tree,
        _id: NodeId,
        _directive: &Directive,
        _depth: usize,
    ) {
    }

    fn visit_raw_comment(&mut self, _tree: &Tree, _id: NodeId, _depth: usize) {}

    fn visit_blank_run(&mut self, _tree: &Tree, _id: NodeId, _count: usize, _depth: usize) {}

    fn visit_invalid(&mut self, _tree: &Tree, _id: NodeId, _depth: usize) {}

    /// Traverse a node and its children
    fn traverse_node(&mut self, tree: &Tree, id: NodeId, depth: usize) {
        match &tree.node(id).kind {
            NodeKind::Entry(entry) => self.visit_entry(tree, id, entry, depth),
            NodeKind::Block(block) => {
                if self.visit_block(tree, id, block, depth) {
                    let child_depth = match block.kind {
                        BlockKind::File => depth,
                        _ => depth + 1,
                    };
                    for &child in &block.children {
                        self.traverse_node(tree, child, child_depth);
                    }
                }
                self.leave_block(tree, id, block, depth);
            }
            NodeKind::Directive(directive) => self.visit_directive(tree, id, directive, depth),
            NodeKind::RawComment => self.visit_raw_comment(tree, id, depth),
            NodeKind::BlankRun { count } => self.visit_blank_run(tree, id, *count, depth),
            NodeKind::Invalid => self.visit_invalid(tree, id, depth),
        }
    }
}

/// Walk a whole tree, starting at the file root
pub fn walk<V: Visitor + ?Sized>(tree: &Tree, visitor: &mut V) {
    visitor.traverse_node(tree, tree.root(), 0);
}

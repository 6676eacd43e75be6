use smallvec::SmallVec;

use crate::{
    content::model::{ContentKind, ContentTree},
    foundation::ids::NodeId,
    layout::context::{LayoutCheckpoint, LayoutContext},
    layout::cursor::{CursorPosition, LayoutCursor},
};

/// Saved cursors of a node and its in-progress descendants, plus the page marker list and id
/// table positions.
///
/// Captured at the start of each span; [`CursorSnapshot::rollback`] is the only backward move of
/// a cursor besides keep-with-next withdrawal.
#[derive(Clone, Debug)]
pub struct CursorSnapshot {
    cursors: SmallVec<[(NodeId, LayoutCursor); 8]>,
    checkpoint: LayoutCheckpoint,
}

impl CursorSnapshot {
    /// Capture `root` and every descendant on its resume frontier.
    pub fn capture(tree: &ContentTree, root: NodeId, ctx: &LayoutContext<'_>) -> Self {
        let mut cursors = SmallVec::new();
        let mut stack = vec![root];
        while let Some(node) = stack.pop() {
            let cursor = tree.cursor(node);
            cursors.push((node, cursor));
            for child in frontier(tree, node, cursor) {
                if !tree.cursor(child).is_start() {
                    stack.push(child);
                }
            }
        }
        Self {
            cursors,
            checkpoint: ctx.checkpoint(),
        }
    }

    pub fn len(&self) -> usize {
        self.cursors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cursors.is_empty()
    }

    /// Saved cursor of `node`, if it was captured.
    pub fn cursor_of(&self, node: NodeId) -> Option<LayoutCursor> {
        self.cursors
            .iter()
            .find(|(n, _)| *n == node)
            .map(|(_, c)| *c)
    }

    /// Restore every captured cursor, reset everything entered since, and undo marker and id
    /// registrations made after the capture.
    pub fn rollback(&self, tree: &mut ContentTree, ctx: &mut LayoutContext<'_>) {
        for &(node, cursor) in &self.cursors {
            tree.restore_cursor(node, cursor);
        }
        for &(node, cursor) in &self.cursors {
            if cursor.is_start() {
                tree.reset_subtree(node);
                continue;
            }
            let entered: SmallVec<[NodeId; 4]> = frontier(tree, node, cursor)
                .filter(|c| self.cursor_of(*c).is_none())
                .collect();
            for child in entered {
                tree.reset_subtree(child);
            }
        }
        ctx.restore(self.checkpoint);
        ctx.env.counters.rollbacks += 1;
        tracing::debug!(cursors = self.cursors.len(), "rolled back to span snapshot");
    }
}

/// Children that may still change after `cursor`: the one at the resume index and every later
/// one. A retrieve-marker's frontier is the marker it replays.
fn frontier(
    tree: &ContentTree,
    node: NodeId,
    cursor: LayoutCursor,
) -> impl Iterator<Item = NodeId> + '_ {
    let (from, replayed) = match (tree.kind(node), cursor.position) {
        (ContentKind::RetrieveMarker, _) => (usize::MAX, cursor.flags.retrieved),
        (_, CursorPosition::Index(i)) => (i, None),
        _ => (usize::MAX, None),
    };
    tree.children(node)
        .iter()
        .skip(from)
        .copied()
        .chain(replayed)
}

#[cfg(test)]
#[path = "../../tests/unit/balance/snapshot.rs"]
mod tests;

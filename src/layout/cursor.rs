use crate::foundation::ids::NodeId;

/// Saved position of a node's resumable walk over its children.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, serde::Serialize)]
pub enum CursorPosition {
    /// Never entered; style-derived parameters not yet resolved.
    #[default]
    Start,
    /// Next child (or line, for leaves) to lay out.
    Index(usize),
    /// Completed, with a forced break still to be honoured by the parent.
    BreakAfter,
    /// Completed.
    Done,
}

impl CursorPosition {
    fn rank(self) -> u64 {
        match self {
            Self::Start => 0,
            Self::Index(i) => 1 + i as u64,
            Self::BreakAfter => u64::MAX - 1,
            Self::Done => u64::MAX,
        }
    }
}

/// Per-node layout bookkeeping that travels with the position.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, serde::Serialize)]
pub struct CursorFlags {
    /// Space-before has been emitted for the current (first) piece.
    pub space_before_emitted: bool,
    /// Areas this node has attached so far; the first one is flagged `is_first`.
    pub areas_generated: u32,
    /// Consecutive calls that laid out nothing.
    pub stalled_calls: u32,
    /// Marker chosen by a retrieve-marker node, remembered across resumed calls.
    pub retrieved: Option<NodeId>,
}

/// Mutable layout state retained per content node between calls.
///
/// The position only moves forward during a pagination pass. The only backward moves are
/// [`LayoutCursor::rewind_to`] and [`LayoutCursor::reset`], used by rollback.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, serde::Serialize)]
pub struct LayoutCursor {
    /// Where the walk resumes.
    pub position: CursorPosition,
    /// Bookkeeping flags.
    pub flags: CursorFlags,
}

impl LayoutCursor {
    /// Whether the node has never been entered.
    pub fn is_start(&self) -> bool {
        self.position == CursorPosition::Start
    }

    /// Whether the node has completed (including a pending break-after).
    pub fn is_complete(&self) -> bool {
        matches!(
            self.position,
            CursorPosition::Done | CursorPosition::BreakAfter
        )
    }

    /// Resume index, if the node is mid-walk.
    pub fn index(&self) -> Option<usize> {
        match self.position {
            CursorPosition::Index(i) => Some(i),
            _ => None,
        }
    }

    /// Move forward to `position`.
    pub(crate) fn advance(&mut self, position: CursorPosition) {
        debug_assert!(
            position.rank() >= self.position.rank(),
            "layout cursor moved backward without rollback: {:?} -> {:?}",
            self.position,
            position
        );
        self.position = position;
    }

    /// Move forward to child `index`.
    pub(crate) fn advance_to(&mut self, index: usize) {
        self.advance(CursorPosition::Index(index));
    }

    /// Explicit backward move used by keep-with-next withdrawal and marker unwinding.
    pub(crate) fn rewind_to(&mut self, index: usize) {
        self.position = CursorPosition::Index(index);
    }

    /// Return to the pristine state.
    pub fn reset(&mut self) {
        *self = Self::default();
    }
}

#[cfg(test)]
#[path = "../../tests/unit/layout/cursor.rs"]
mod tests;

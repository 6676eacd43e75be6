use std::collections::BTreeSet;

use crate::{
    content::def::NodeDef,
    content::properties::{PropertyMap, PropertyResolver},
    foundation::core::Length,
    foundation::error::{LayoutError, LayoutResult, SourceLocation},
    foundation::ids::NodeId,
    layout::cursor::LayoutCursor,
    layout::params::LayoutParams,
};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
/// Closed set of content node kinds.
pub enum ContentKind {
    /// Root container of a page sequence's main body.
    Flow,
    /// Block-level paragraph/box.
    Block,
    /// Block that establishes a reference area, optionally with fixed dimensions.
    BlockContainer,
    /// List of list items.
    ListBlock,
    /// One list item: exactly a label and a body.
    ListItem,
    /// Label of a list item.
    ListItemLabel,
    /// Body of a list item; generates no box of its own.
    ListItemBody,
    /// Named content snapshot for running headers/footers; generates no area in place.
    Marker,
    /// Replays a previously registered marker's content.
    RetrieveMarker,
    /// Loosely-typed wrapper.
    Container,
    /// Leaf of pre-broken lines.
    Lines,
}

impl ContentKind {
    /// Kinds that may sit directly in a flow or block-level container.
    pub fn is_block_level(self) -> bool {
        matches!(
            self,
            Self::Block
                | Self::BlockContainer
                | Self::ListBlock
                | Self::Container
                | Self::RetrieveMarker
        )
    }

    /// Kinds that only make sense inside a list.
    pub fn is_list_part(self) -> bool {
        matches!(
            self,
            Self::ListItem | Self::ListItemLabel | Self::ListItemBody
        )
    }
}

#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
/// One pre-broken line, as measured by the external line breaker.
pub struct LineBox {
    /// Line text.
    pub text: String,
    /// Line height; falls back to the node's line height when absent.
    #[serde(default)]
    pub height: Option<Length>,
}

impl LineBox {
    /// A line with an explicit height.
    pub fn new(text: impl Into<String>, height: Length) -> Self {
        Self {
            text: text.into(),
            height: Some(height),
        }
    }

    /// A line sized by its node's line height.
    pub fn auto(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            height: None,
        }
    }
}

/// A node of the content tree.
///
/// Shape (kind, children, properties) is immutable once built; only the cursor changes during
/// layout.
#[derive(Clone, Debug)]
pub struct ContentNode {
    pub(crate) kind: ContentKind,
    pub(crate) parent: Option<NodeId>,
    pub(crate) children: Vec<NodeId>,
    pub(crate) props: PropertyMap,
    pub(crate) lines: Vec<LineBox>,
    pub(crate) location: SourceLocation,
    pub(crate) marker_classes: BTreeSet<String>,
    pub(crate) cursor: LayoutCursor,
    pub(crate) params: Option<LayoutParams>,
}

impl ContentNode {
    fn new(kind: ContentKind, parent: Option<NodeId>, def: &NodeDef) -> Self {
        Self {
            kind,
            parent,
            children: Vec::new(),
            props: def.props.clone(),
            lines: def.lines.clone(),
            location: def.location.clone(),
            marker_classes: BTreeSet::new(),
            cursor: LayoutCursor::default(),
            params: None,
        }
    }

    /// Node kind.
    pub fn kind(&self) -> ContentKind {
        self.kind
    }

    /// Parent node, `None` for roots (flows and static content).
    pub fn parent(&self) -> Option<NodeId> {
        self.parent
    }

    /// Ordered children.
    pub fn children(&self) -> &[NodeId] {
        &self.children
    }

    /// Resolved properties.
    pub fn props(&self) -> &PropertyMap {
        &self.props
    }

    /// Pre-broken lines of a [`ContentKind::Lines`] leaf.
    pub fn lines(&self) -> &[LineBox] {
        &self.lines
    }

    /// Source location.
    pub fn location(&self) -> &SourceLocation {
        &self.location
    }

    /// Current layout cursor.
    pub fn cursor(&self) -> LayoutCursor {
        self.cursor
    }

    /// `marker-class-name` of a marker node.
    pub fn marker_class(&self) -> Option<&str> {
        self.props.keyword("marker-class-name")
    }
}

/// Arena holding every content node of a document.
#[derive(Clone, Debug, Default)]
pub struct ContentTree {
    nodes: Vec<ContentNode>,
}

impl ContentTree {
    /// An empty tree.
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a tree holding a single root.
    pub fn from_def(def: &NodeDef) -> LayoutResult<(Self, NodeId)> {
        let mut tree = Self::new();
        let root = tree.insert(def, None)?;
        Ok((tree, root))
    }

    /// Insert `def` and its subtree under `parent` (or as a new root).
    ///
    /// Structural rules checked here: flows are roots, markers carry a class name, are initial
    /// children, and are unique per class under one parent; line leaves have no children.
    pub fn insert(&mut self, def: &NodeDef, parent: Option<NodeId>) -> LayoutResult<NodeId> {
        if def.kind == ContentKind::Flow && parent.is_some() {
            return Err(LayoutError::structural(
                "flow must be the direct child of a page-sequence",
                def.location.clone(),
            ));
        }
        if def.kind == ContentKind::Lines && !def.children.is_empty() {
            return Err(LayoutError::structural(
                "a lines leaf cannot have children",
                def.location.clone(),
            ));
        }

        let id = NodeId(u32::try_from(self.nodes.len()).map_err(|_| {
            LayoutError::validation("content tree exceeds u32::MAX nodes")
        })?);
        self.nodes.push(ContentNode::new(def.kind, parent, def));

        if let Some(parent) = parent {
            if def.kind == ContentKind::Marker {
                let class = match def.props.keyword("marker-class-name") {
                    Some(c) if !c.trim().is_empty() => c.to_string(),
                    _ => {
                        return Err(LayoutError::structural(
                            "marker requires a non-empty marker-class-name",
                            def.location.clone(),
                        ));
                    }
                };
                self.register_marker_class(parent, &class, &def.location)?;
            }
            self.nodes[parent.index()].children.push(id);
        } else if def.kind == ContentKind::Marker {
            return Err(LayoutError::structural(
                "marker must have a parent",
                def.location.clone(),
            ));
        }

        for child in &def.children {
            self.insert(child, Some(id))?;
        }
        Ok(id)
    }

    /// Record a marker class under `parent`.
    ///
    /// Markers must precede every other child, and a class may appear only once per parent.
    pub fn register_marker_class(
        &mut self,
        parent: NodeId,
        class: &str,
        location: &SourceLocation,
    ) -> LayoutResult<()> {
        let has_non_marker = self.nodes[parent.index()]
            .children
            .iter()
            .any(|c| self.nodes[c.index()].kind != ContentKind::Marker);
        if has_non_marker {
            return Err(LayoutError::structural(
                "marker must be an initial child of its parent",
                location.clone(),
            ));
        }
        let node = &mut self.nodes[parent.index()];
        if !node.marker_classes.insert(class.to_string()) {
            return Err(LayoutError::structural(
                format!("only one marker with class '{class}' is allowed per parent"),
                location.clone(),
            ));
        }
        Ok(())
    }

    /// Number of nodes.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Whether the tree is empty.
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Access a node.
    pub fn node(&self, id: NodeId) -> &ContentNode {
        &self.nodes[id.index()]
    }

    /// Node kind.
    pub fn kind(&self, id: NodeId) -> ContentKind {
        self.nodes[id.index()].kind
    }

    /// Ordered children.
    pub fn children(&self, id: NodeId) -> &[NodeId] {
        &self.nodes[id.index()].children
    }

    /// Child at `index`.
    pub fn child(&self, id: NodeId, index: usize) -> Option<NodeId> {
        self.nodes[id.index()].children.get(index).copied()
    }

    /// Parent node.
    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.nodes[id.index()].parent
    }

    /// Ancestors from the parent upward.
    pub fn ancestors(&self, id: NodeId) -> impl Iterator<Item = NodeId> + '_ {
        std::iter::successors(self.parent(id), move |p| self.parent(*p))
    }

    /// Resolved properties.
    pub fn props(&self, id: NodeId) -> &PropertyMap {
        &self.nodes[id.index()].props
    }

    /// Source location.
    pub fn location(&self, id: NodeId) -> &SourceLocation {
        &self.nodes[id.index()].location
    }

    /// Current cursor.
    pub fn cursor(&self, id: NodeId) -> LayoutCursor {
        self.nodes[id.index()].cursor
    }

    /// Mutable cursor.
    pub(crate) fn cursor_mut(&mut self, id: NodeId) -> &mut LayoutCursor {
        &mut self.nodes[id.index()].cursor
    }

    /// Overwrite a cursor; the rollback path.
    pub(crate) fn restore_cursor(&mut self, id: NodeId, cursor: LayoutCursor) {
        self.nodes[id.index()].cursor = cursor;
    }

    /// Parameters resolved on first entry, if any.
    pub(crate) fn cached_params(&self, id: NodeId) -> Option<&LayoutParams> {
        self.nodes[id.index()].params.as_ref()
    }

    pub(crate) fn cache_params(&mut self, id: NodeId, params: LayoutParams) {
        self.nodes[id.index()].params = Some(params);
    }

    /// Reset the cursors of `id` and all its descendants to START.
    pub fn reset_subtree(&mut self, id: NodeId) {
        let mut stack = vec![id];
        while let Some(n) = stack.pop() {
            let node = &mut self.nodes[n.index()];
            node.cursor.reset();
            stack.extend(node.children.iter().copied());
        }
    }

    /// Reset the cursors of the children of `id` from `from` onward (and their subtrees).
    pub(crate) fn reset_children_from(&mut self, id: NodeId, from: usize) {
        let tail: Vec<NodeId> = self.children(id).iter().skip(from).copied().collect();
        for child in tail {
            self.reset_subtree(child);
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/content/model.rs"]
mod tests;

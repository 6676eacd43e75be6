use crate::foundation::core::{Length, Rect, Vec2, non_negative};
use crate::foundation::ids::NodeId;

/// Kind of a box in the output area tree.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, serde::Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum AreaKind {
    Page,
    RegionBefore,
    RegionAfter,
    MainReference,
    Span,
    Column,
    Block,
    BlockContainer,
    ListItem,
    ListLabel,
    ListBody,
    Line,
    /// Vertical space (space-before/after); carries no content.
    DisplaySpace,
}

/// How an area places its children.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Stacking {
    /// Top to bottom; height is the sum of the children.
    #[default]
    Stacked,
    /// Side by side at the top edge; height is the tallest child.
    Beside,
}

/// A positioned, sized box in the output tree.
///
/// Offsets are relative to the parent's content box. Areas are produced only by layout; layout
/// reads them back solely through geometry queries ([`Area::space_left`],
/// [`Area::allocation_width`]) and through withdrawal of areas it generated itself.
#[derive(Clone, Debug, PartialEq, serde::Serialize)]
pub struct Area {
    pub kind: AreaKind,
    /// Position relative to the parent's content box.
    pub offset: Vec2,
    pub content_width: Length,
    pub max_height: Length,
    pub height: Length,
    pub children: Vec<Area>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub id_refs: Vec<String>,
    /// First area generated by its content node.
    pub is_first: bool,
    /// Last area generated by its content node.
    pub is_last: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub column_index: Option<u32>,
    #[serde(skip)]
    pub(crate) generated_by: Option<NodeId>,
    #[serde(skip)]
    pub(crate) stacking: Stacking,
    #[serde(skip)]
    pub(crate) open: bool,
    /// Set on the first column of a page's first span.
    #[serde(skip)]
    pub(crate) page_top: bool,
}

impl Area {
    /// An empty stacked area.
    pub fn new(kind: AreaKind, content_width: Length, max_height: Length) -> Self {
        Self {
            kind,
            offset: Vec2::ZERO,
            content_width: non_negative(content_width),
            max_height: non_negative(max_height),
            height: 0.0,
            children: Vec::new(),
            id_refs: Vec::new(),
            is_first: false,
            is_last: false,
            text: None,
            column_index: None,
            generated_by: None,
            stacking: Stacking::Stacked,
            open: false,
            page_top: false,
        }
    }

    /// A single line box.
    pub fn line(text: impl Into<String>, width: Length, height: Length) -> Self {
        let mut a = Self::new(AreaKind::Line, width, height);
        a.height = non_negative(height);
        a.text = Some(text.into());
        a
    }

    pub(crate) fn generated_by(mut self, node: NodeId) -> Self {
        self.generated_by = Some(node);
        self
    }

    pub(crate) fn with_stacking(mut self, stacking: Stacking) -> Self {
        self.stacking = stacking;
        self
    }

    /// Content node that generated this area, if any.
    pub fn generator(&self) -> Option<NodeId> {
        self.generated_by
    }

    /// Height still available for children.
    pub fn space_left(&self) -> Length {
        non_negative(self.max_height - self.height)
    }

    /// Width available to children.
    pub fn allocation_width(&self) -> Length {
        self.content_width
    }

    pub fn is_empty(&self) -> bool {
        self.children.is_empty()
    }

    /// Whether this area has children other than display space.
    pub fn has_content(&self) -> bool {
        self.children.iter().any(|c| c.kind != AreaKind::DisplaySpace)
    }

    /// Place `child` at the current fill position without growing this area.
    pub fn add_child(&mut self, mut child: Area) {
        match self.stacking {
            Stacking::Stacked => child.offset.y = self.height,
            Stacking::Beside => child.offset.y = 0.0,
        }
        self.children.push(child);
    }

    pub fn increase_height(&mut self, by: Length) {
        self.height += non_negative(by);
    }

    pub fn set_max_height(&mut self, max_height: Length) {
        self.max_height = non_negative(max_height);
    }

    /// Add `child` and grow by its measured height.
    pub fn attach(&mut self, child: Area) {
        let h = child.height;
        match self.stacking {
            Stacking::Stacked => {
                self.add_child(child);
                self.increase_height(h);
            }
            Stacking::Beside => {
                self.add_child(child);
                self.height = self.height.max(h);
            }
        }
    }

    /// Add vertical space attributed to `node`.
    pub fn add_display_space(&mut self, size: Length, node: Option<NodeId>) {
        if size <= 0.0 {
            return;
        }
        let mut space = Area::new(AreaKind::DisplaySpace, self.content_width, size);
        space.height = size;
        space.generated_by = node;
        self.attach(space);
    }

    /// Open the area for content.
    pub fn start(&mut self) {
        self.open = true;
    }

    /// Close the area; its height is final.
    pub fn end(&mut self) {
        self.open = false;
    }

    /// Anchor `id` on this area. Only an open area takes new anchors.
    pub fn add_id_ref(&mut self, id: impl Into<String>) -> bool {
        if !self.open {
            return false;
        }
        self.id_refs.push(id.into());
        true
    }

    /// Withdraw every direct child generated by `node`, returning the height given back.
    pub fn remove_generated_by(&mut self, node: NodeId) -> Length {
        let before = self.height;
        self.children.retain(|c| c.generated_by != Some(node));
        self.restack();
        before - self.height
    }

    /// Recompute child offsets and height from the remaining children.
    pub(crate) fn restack(&mut self) {
        let mut y = 0.0;
        let mut tallest: Length = 0.0;
        for child in &mut self.children {
            match self.stacking {
                Stacking::Stacked => {
                    child.offset.y = y;
                    y += child.height;
                }
                Stacking::Beside => {
                    child.offset.y = 0.0;
                    tallest = tallest.max(child.height);
                }
            }
        }
        self.height = match self.stacking {
            Stacking::Stacked => y,
            Stacking::Beside => tallest,
        };
    }

    /// Bounds relative to the parent's content box.
    pub fn bounds(&self) -> Rect {
        Rect::new(
            self.offset.x,
            self.offset.y,
            self.offset.x + self.content_width,
            self.offset.y + self.height,
        )
    }

    /// Append the text of every line in this subtree, in reading order.
    pub fn collect_text(&self, out: &mut Vec<String>) {
        if let Some(t) = &self.text {
            out.push(t.clone());
        }
        for c in &self.children {
            c.collect_text(out);
        }
    }

    /// Text of every line in this subtree.
    pub fn texts(&self) -> Vec<String> {
        let mut out = Vec::new();
        self.collect_text(&mut out);
        out
    }

    /// Number of direct children that are not display space.
    pub fn content_children(&self) -> usize {
        self.children
            .iter()
            .filter(|c| c.kind != AreaKind::DisplaySpace)
            .count()
    }
}

#[cfg(test)]
#[path = "../../tests/unit/area/model.rs"]
mod tests;

use crate::{
    content::model::{ContentKind, LineBox},
    content::properties::PropertyMap,
    foundation::core::Length,
    foundation::error::{LayoutError, LayoutResult, SourceLocation},
};

#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
/// JSON-facing description of one content node and its subtree.
///
/// A `NodeDef` tree is the hand-off format from the (out-of-scope) markup parser and property
/// resolver. It is turned into an arena-backed [`crate::ContentTree`] before layout.
pub struct NodeDef {
    /// Node kind.
    pub kind: ContentKind,
    /// Pre-resolved properties.
    #[serde(default)]
    pub props: PropertyMap,
    /// Ordered children.
    #[serde(default)]
    pub children: Vec<NodeDef>,
    /// Pre-broken lines, only meaningful for [`ContentKind::Lines`].
    #[serde(default)]
    pub lines: Vec<LineBox>,
    /// Source location for diagnostics.
    #[serde(default)]
    pub location: SourceLocation,
}

impl NodeDef {
    /// An empty node of the given kind.
    pub fn new(kind: ContentKind) -> Self {
        Self {
            kind,
            props: PropertyMap::new(),
            children: Vec::new(),
            lines: Vec::new(),
            location: SourceLocation::default(),
        }
    }

    /// Number of nodes in this subtree, including `self`.
    pub fn subtree_len(&self) -> usize {
        1 + self.children.iter().map(NodeDef::subtree_len).sum::<usize>()
    }
}

#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
/// Page master geometry, in points.
pub struct PageGeometry {
    /// Page width.
    pub width: Length,
    /// Page height.
    pub height: Length,
    /// Top margin.
    pub margin_top: Length,
    /// Bottom margin.
    pub margin_bottom: Length,
    /// Left margin.
    pub margin_left: Length,
    /// Right margin.
    pub margin_right: Length,
    /// Height of region-before (running header), taken from the body.
    pub before_extent: Length,
    /// Height of region-after (running footer), taken from the body.
    pub after_extent: Length,
    /// Number of columns in the body region.
    pub column_count: u32,
    /// Gap between body columns.
    pub column_gap: Length,
}

impl Default for PageGeometry {
    fn default() -> Self {
        // A4 portrait.
        Self {
            width: 595.28,
            height: 841.89,
            margin_top: 36.0,
            margin_bottom: 36.0,
            margin_left: 36.0,
            margin_right: 36.0,
            before_extent: 0.0,
            after_extent: 0.0,
            column_count: 1,
            column_gap: 12.0,
        }
    }
}

impl PageGeometry {
    /// Geometry whose body region is exactly `width` x `height` (no margins or regions).
    pub fn body_only(width: Length, height: Length) -> Self {
        Self {
            width,
            height,
            margin_top: 0.0,
            margin_bottom: 0.0,
            margin_left: 0.0,
            margin_right: 0.0,
            before_extent: 0.0,
            after_extent: 0.0,
            column_count: 1,
            column_gap: 12.0,
        }
    }

    /// Content width shared by all regions.
    pub fn content_width(&self) -> Length {
        self.width - self.margin_left - self.margin_right
    }

    /// Height available to the body region.
    pub fn body_height(&self) -> Length {
        self.height
            - self.margin_top
            - self.margin_bottom
            - self.before_extent
            - self.after_extent
    }

    /// Check that the geometry leaves a usable body region.
    pub fn validate(&self) -> LayoutResult<()> {
        for (name, value) in [
            ("width", self.width),
            ("height", self.height),
            ("margin_top", self.margin_top),
            ("margin_bottom", self.margin_bottom),
            ("margin_left", self.margin_left),
            ("margin_right", self.margin_right),
            ("before_extent", self.before_extent),
            ("after_extent", self.after_extent),
            ("column_gap", self.column_gap),
        ] {
            if !value.is_finite() || value < 0.0 {
                return Err(LayoutError::validation(format!(
                    "page {name} must be finite and >= 0"
                )));
            }
        }
        if self.column_count == 0 {
            return Err(LayoutError::validation("page column_count must be > 0"));
        }
        if self.content_width() <= 0.0 || self.body_height() <= 0.0 {
            return Err(LayoutError::validation(
                "page margins and regions leave no room for the body",
            ));
        }
        let gaps = self.column_gap * f64::from(self.column_count - 1);
        if self.content_width() - gaps <= 0.0 {
            return Err(LayoutError::validation(
                "column gaps leave no room for columns",
            ));
        }
        Ok(())
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "kebab-case")]
/// Page regions that carry static content.
pub enum RegionName {
    /// Running header.
    RegionBefore,
    /// Running footer.
    RegionAfter,
}

#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
/// Static content repeated on every page of a sequence.
pub struct StaticContentDef {
    /// Target region.
    pub region: RegionName,
    /// Content root; laid out afresh on each page.
    pub content: NodeDef,
}

#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
/// One page sequence: a flow plus its page geometry and static content.
pub struct PageSequenceDef {
    /// Page geometry used for every page of this sequence.
    #[serde(default)]
    pub page: PageGeometry,
    /// Number given to the first page of the sequence; `None` continues from the previous
    /// sequence (or starts at 1).
    #[serde(default)]
    pub initial_page_number: Option<u32>,
    /// Main flow content; its root must be a [`ContentKind::Flow`].
    pub flow: NodeDef,
    /// Static content for the page regions.
    #[serde(default)]
    pub static_content: Vec<StaticContentDef>,
}

impl PageSequenceDef {
    /// A sequence with default numbering and no static content.
    pub fn new(page: PageGeometry, flow: NodeDef) -> Self {
        Self {
            page,
            initial_page_number: None,
            flow,
            static_content: Vec::new(),
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq, serde::Serialize, serde::Deserialize)]
/// A complete document: an ordered list of page sequences.
pub struct DocumentDef {
    /// Page sequences in output order.
    pub page_sequences: Vec<PageSequenceDef>,
}

use crate::{
    content::def::{
        DocumentDef, NodeDef, PageGeometry, PageSequenceDef, RegionName, StaticContentDef,
    },
    content::document::Document,
    content::model::{ContentKind, LineBox},
    content::properties::PropertyValue,
    foundation::core::Length,
    foundation::error::{LayoutResult, SourceLocation},
};

/// Fluent builder for one [`NodeDef`] subtree.
#[derive(Clone, Debug)]
pub struct NodeBuilder {
    def: NodeDef,
}

impl NodeBuilder {
    pub fn new(kind: ContentKind) -> Self {
        Self {
            def: NodeDef::new(kind),
        }
    }

    pub fn prop(mut self, name: impl Into<String>, value: impl Into<PropertyValue>) -> Self {
        self.def.props.insert(name.into(), value.into());
        self
    }

    pub fn child(mut self, child: impl Into<NodeDef>) -> Self {
        self.def.children.push(child.into());
        self
    }

    pub fn children<I, C>(mut self, children: I) -> Self
    where
        I: IntoIterator<Item = C>,
        C: Into<NodeDef>,
    {
        self.def.children.extend(children.into_iter().map(Into::into));
        self
    }

    pub fn line(mut self, text: impl Into<String>, height: Length) -> Self {
        self.def.lines.push(LineBox::new(text, height));
        self
    }

    /// A line without its own height.
    pub fn auto_line(mut self, text: impl Into<String>) -> Self {
        self.def.lines.push(LineBox::auto(text));
        self
    }

    pub fn at(mut self, location: SourceLocation) -> Self {
        self.def.location = location;
        self
    }

    pub fn id(self, id: impl Into<String>) -> Self {
        self.prop("id", id.into())
    }

    pub fn keep_with_next(self) -> Self {
        self.prop("keep-with-next", "always")
    }

    pub fn space_before(self, v: Length) -> Self {
        self.prop("space-before", v)
    }

    pub fn space_after(self, v: Length) -> Self {
        self.prop("space-after", v)
    }

    pub fn break_before(self, kind: &str) -> Self {
        self.prop("break-before", kind)
    }

    pub fn break_after(self, kind: &str) -> Self {
        self.prop("break-after", kind)
    }

    pub fn span_all(self) -> Self {
        self.prop("span", "all")
    }

    pub fn build(self) -> NodeDef {
        self.def
    }
}

impl From<NodeBuilder> for NodeDef {
    fn from(b: NodeBuilder) -> Self {
        b.build()
    }
}

pub fn flow() -> NodeBuilder {
    NodeBuilder::new(ContentKind::Flow)
}

pub fn block() -> NodeBuilder {
    NodeBuilder::new(ContentKind::Block)
}

pub fn block_container() -> NodeBuilder {
    NodeBuilder::new(ContentKind::BlockContainer)
}

pub fn container() -> NodeBuilder {
    NodeBuilder::new(ContentKind::Container)
}

/// A generic container acting as a table cell for nested list blocks.
pub fn table_cell(start_offset: Length, width: Length) -> NodeBuilder {
    container()
        .prop("container-role", "table-cell")
        .prop("cell-start-offset", start_offset)
        .prop("cell-width", width)
}

pub fn lines() -> NodeBuilder {
    NodeBuilder::new(ContentKind::Lines)
}

/// A block holding one lines leaf with a line of `height` per text.
pub fn text_block<'a>(height: Length, texts: impl IntoIterator<Item = &'a str>) -> NodeBuilder {
    let leaf = texts
        .into_iter()
        .fold(lines(), |leaf, text| leaf.line(text, height));
    block().child(leaf)
}

pub fn list_block() -> NodeBuilder {
    NodeBuilder::new(ContentKind::ListBlock)
}

pub fn list_item(label: impl Into<NodeDef>, body: impl Into<NodeDef>) -> NodeBuilder {
    NodeBuilder::new(ContentKind::ListItem)
        .child(label)
        .child(body)
}

pub fn item_label() -> NodeBuilder {
    NodeBuilder::new(ContentKind::ListItemLabel)
}

pub fn item_body() -> NodeBuilder {
    NodeBuilder::new(ContentKind::ListItemBody)
}

pub fn marker(class_name: impl Into<String>) -> NodeBuilder {
    NodeBuilder::new(ContentKind::Marker).prop("marker-class-name", class_name.into())
}

pub fn retrieve_marker(class_name: impl Into<String>) -> NodeBuilder {
    NodeBuilder::new(ContentKind::RetrieveMarker).prop("retrieve-class-name", class_name.into())
}

/// Builder for a multi-sequence [`Document`].
#[derive(Clone, Debug, Default)]
pub struct DocumentBuilder {
    sequences: Vec<PageSequenceDef>,
}

impl DocumentBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn sequence(mut self, page: PageGeometry, flow: impl Into<NodeDef>) -> Self {
        self.sequences.push(PageSequenceDef::new(page, flow.into()));
        self
    }

    /// Attach static content to the most recently added sequence.
    pub fn static_content(mut self, region: RegionName, content: impl Into<NodeDef>) -> Self {
        if let Some(seq) = self.sequences.last_mut() {
            seq.static_content.push(StaticContentDef {
                region,
                content: content.into(),
            });
        }
        self
    }

    /// Number the most recently added sequence's first page.
    pub fn initial_page_number(mut self, number: u32) -> Self {
        if let Some(seq) = self.sequences.last_mut() {
            seq.initial_page_number = Some(number);
        }
        self
    }

    pub fn build(self) -> LayoutResult<Document> {
        Document::from_def(DocumentDef {
            page_sequences: self.sequences,
        })
    }
}

#[cfg(test)]
#[path = "../../tests/unit/content/dsl.rs"]
mod tests;

use crate::content::def::{DocumentDef, NodeDef};
use crate::content::model::ContentKind;
use crate::foundation::error::{LayoutError, LayoutResult};
use std::fs::File;
use std::io::BufReader;
use std::path::Path;

/// Document boundary object.
///
/// This is the JSON-facing form handed over by the markup parser and property resolver. It is
/// turned into an arena-backed content tree when constructing a [`crate::Paginator`].
#[derive(Debug, Clone)]
pub struct Document {
    def: DocumentDef,
}

impl Document {
    /// Parse a document from a JSON reader.
    pub fn from_reader<R: std::io::Read>(r: R) -> LayoutResult<Self> {
        let def: DocumentDef = serde_json::from_reader(r)
            .map_err(|e| LayoutError::serde(format!("parse document JSON: {e}")))?;
        Ok(Self { def })
    }

    /// Parse a document from a JSON file on disk.
    pub fn from_path(path: impl AsRef<Path>) -> LayoutResult<Self> {
        let path = path.as_ref();
        let f = File::open(path).map_err(|e| {
            LayoutError::validation(format!("open document JSON '{}': {e}", path.display()))
        })?;
        Self::from_reader(BufReader::new(f))
    }

    /// Wrap an in-memory definition, validating it.
    pub fn from_def(def: DocumentDef) -> LayoutResult<Self> {
        let doc = Self { def };
        doc.validate()?;
        Ok(doc)
    }

    /// Check page geometry and flow placement.
    ///
    /// Tree-shape rules that need the whole subtree (list arity, marker placement) are checked
    /// when the content tree is built or first laid out.
    pub fn validate(&self) -> LayoutResult<()> {
        if self.def.page_sequences.is_empty() {
            return Err(LayoutError::validation(
                "document must contain at least one page-sequence",
            ));
        }
        for (i, seq) in self.def.page_sequences.iter().enumerate() {
            seq.page
                .validate()
                .map_err(|e| LayoutError::validation(format!("page-sequence {i}: {e}")))?;
            if seq.flow.kind != ContentKind::Flow {
                return Err(LayoutError::structural(
                    format!("page-sequence {i} flow root must be a flow, got {:?}", seq.flow.kind),
                    seq.flow.location.clone(),
                ));
            }
            if seq.flow.children.is_empty() {
                return Err(LayoutError::structural(
                    format!("page-sequence {i} has an empty flow"),
                    seq.flow.location.clone(),
                ));
            }
            for sc in &seq.static_content {
                check_static_root(&sc.content)?;
            }
        }
        Ok(())
    }

    /// Total number of content nodes across all sequences.
    pub fn node_count(&self) -> usize {
        self.def
            .page_sequences
            .iter()
            .map(|s| {
                s.flow.subtree_len()
                    + s.static_content
                        .iter()
                        .map(|c| c.content.subtree_len())
                        .sum::<usize>()
            })
            .sum()
    }

    pub(crate) fn def(&self) -> &DocumentDef {
        &self.def
    }
}

fn check_static_root(root: &NodeDef) -> LayoutResult<()> {
    if root.kind == ContentKind::Flow
        || root.kind == ContentKind::Marker
        || root.kind.is_list_part()
    {
        return Err(LayoutError::structural(
            format!("{:?} cannot be the root of static content", root.kind),
            root.location.clone(),
        ));
    }
    Ok(())
}

#[cfg(test)]
#[path = "../../tests/unit/content/document.rs"]
mod tests;

use std::collections::BTreeMap;

use crate::foundation::error::{LayoutError, LayoutResult, SourceLocation};

#[derive(Clone, Debug, PartialEq)]
struct IdEntry {
    location: SourceLocation,
    page: Option<u32>,
}

#[derive(Clone, Debug)]
enum IdOp {
    Created(String),
    Configured { id: String, previous: Option<u32> },
}

/// Journal position to restore to on rollback.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct IdCheckpoint(usize);

/// Document-wide table of element ids and the page each first landed on.
///
/// Every mutation is journaled so a rollback can restore the table exactly.
#[derive(Clone, Debug, Default)]
pub struct IdReferenceTable {
    entries: BTreeMap<String, IdEntry>,
    journal: Vec<IdOp>,
}

impl IdReferenceTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `id` when its node starts layout.
    pub fn create_id(&mut self, id: &str, location: &SourceLocation) -> LayoutResult<()> {
        if let Some(existing) = self.entries.get(id) {
            return Err(LayoutError::structural(
                format!("duplicate id '{id}' (first defined at {})", existing.location),
                location.clone(),
            ));
        }
        self.entries.insert(
            id.to_string(),
            IdEntry {
                location: location.clone(),
                page: None,
            },
        );
        self.journal.push(IdOp::Created(id.to_string()));
        Ok(())
    }

    /// Record the page an id's first area landed on. Later calls keep the first page.
    pub fn configure_id(&mut self, id: &str, page: u32) {
        let Some(entry) = self.entries.get_mut(id) else {
            return;
        };
        if entry.page.is_some() {
            return;
        }
        entry.page = Some(page);
        self.journal.push(IdOp::Configured {
            id: id.to_string(),
            previous: None,
        });
    }

    pub fn contains(&self, id: &str) -> bool {
        self.entries.contains_key(id)
    }

    /// Page the id first landed on, once configured.
    pub fn page_of(&self, id: &str) -> Option<u32> {
        self.entries.get(id).and_then(|e| e.page)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Ids in lexical order with their pages.
    pub fn iter(&self) -> impl Iterator<Item = (&str, Option<u32>)> {
        self.entries.iter().map(|(k, e)| (k.as_str(), e.page))
    }

    pub fn checkpoint(&self) -> IdCheckpoint {
        IdCheckpoint(self.journal.len())
    }

    /// Undo every mutation made after `cp`.
    pub fn restore(&mut self, cp: IdCheckpoint) {
        while self.journal.len() > cp.0 {
            let Some(op) = self.journal.pop() else {
                break;
            };
            match op {
                IdOp::Created(id) => {
                    self.entries.remove(&id);
                }
                IdOp::Configured { id, previous } => {
                    if let Some(e) = self.entries.get_mut(&id) {
                        e.page = previous;
                    }
                }
            }
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/area/ids.rs"]
mod tests;

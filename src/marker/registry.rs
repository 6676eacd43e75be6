use crate::{content::model::ContentTree, foundation::ids::NodeId};

/// Tie-break among equally valid "last" markers.
///
/// Markers are equally valid when they share a class and their owners are nested, so their
/// areas start or end at the same point on the page.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MarkerTieBreak {
    /// The most recently registered (innermost) marker.
    #[default]
    Latest,
    /// The earliest registered (outermost) marker.
    Earliest,
}

/// Value of `retrieve-position`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, serde::Serialize)]
pub enum RetrievePosition {
    FirstIncludingCarryover,
    #[default]
    FirstStartingWithinPage,
    LastStartingWithinPage,
    LastEndingWithinPage,
}

/// One marker registration on a page.
#[derive(Clone, Debug, PartialEq, serde::Serialize)]
pub struct MarkerRecord {
    pub class_name: String,
    /// The marker node whose children are replayed on retrieval.
    pub marker: NodeId,
    /// Node whose area the marker is registered against.
    pub owner: NodeId,
    /// Page the marker was registered on.
    pub page: u32,
    /// The owner's area on this page is its first.
    pub is_first: bool,
    /// The owner's area on this page is its last.
    pub is_last: bool,
    /// `is_first` / `is_last` are final.
    pub finalized: bool,
}

impl MarkerRecord {
    fn matches(&self, position: RetrievePosition) -> bool {
        match position {
            RetrievePosition::FirstIncludingCarryover => true,
            RetrievePosition::FirstStartingWithinPage
            | RetrievePosition::LastStartingWithinPage => self.is_first,
            RetrievePosition::LastEndingWithinPage => self.is_last,
        }
    }
}

/// Ordered marker list owned by one page.
#[derive(Clone, Debug, Default)]
pub struct MarkerRegistry {
    records: Vec<MarkerRecord>,
}

impl MarkerRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a registration; order is first-layout order.
    pub fn register(&mut self, record: MarkerRecord) {
        tracing::trace!(class = %record.class_name, marker = %record.marker, "marker registered");
        self.records.push(record);
    }

    pub fn records(&self) -> &[MarkerRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Drop registrations made after the first `len`; the rollback path.
    pub fn truncate(&mut self, len: usize) {
        self.records.truncate(len);
    }

    /// Resolve the first/last flags of markers registered against `owner`'s area.
    pub fn finalize(&mut self, owner: NodeId, is_first: bool, is_last: bool) {
        for r in self
            .records
            .iter_mut()
            .filter(|r| r.owner == owner && !r.finalized)
        {
            r.is_first = is_first;
            r.is_last = is_last;
            r.finalized = true;
        }
    }

    /// Select a marker of `class` by retrieve position.
    pub fn search(
        &self,
        tree: &ContentTree,
        class: &str,
        position: RetrievePosition,
        tie_break: MarkerTieBreak,
    ) -> Option<&MarkerRecord> {
        let mut candidates = self
            .records
            .iter()
            .filter(|r| r.class_name == class && r.matches(position));
        match position {
            RetrievePosition::FirstIncludingCarryover
            | RetrievePosition::FirstStartingWithinPage => candidates.next(),
            RetrievePosition::LastStartingWithinPage | RetrievePosition::LastEndingWithinPage => {
                let matching: Vec<&MarkerRecord> = candidates.collect();
                let (&latest, earlier) = matching.split_last()?;
                match tie_break {
                    MarkerTieBreak::Latest => Some(latest),
                    MarkerTieBreak::Earliest => Some(
                        earlier
                            .iter()
                            .rev()
                            .take_while(|r| encloses(tree, r.owner, latest.owner))
                            .last()
                            .copied()
                            .unwrap_or(latest),
                    ),
                }
            }
        }
    }
}

fn encloses(tree: &ContentTree, outer: NodeId, inner: NodeId) -> bool {
    outer == inner || tree.ancestors(inner).any(|a| a == outer)
}

/// Markers of one finished page.
#[derive(Clone, Debug)]
pub struct PageMarkers {
    pub page_number: u32,
    pub sequence: usize,
    pub records: Vec<MarkerRecord>,
}

/// Marker records of every finished page, oldest first.
#[derive(Clone, Debug, Default)]
pub struct MarkerHistory {
    pages: Vec<PageMarkers>,
}

impl MarkerHistory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push_page(&mut self, page_number: u32, sequence: usize, registry: MarkerRegistry) {
        self.pages.push(PageMarkers {
            page_number,
            sequence,
            records: registry.records,
        });
    }

    pub fn len(&self) -> usize {
        self.pages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pages.is_empty()
    }

    /// Most recent marker of `class` on an earlier page, scanning back page by page.
    ///
    /// With `sequence` set the scan stops at the first page of another sequence.
    pub fn search_back(&self, class: &str, sequence: Option<usize>) -> Option<&MarkerRecord> {
        let (page, record) = self
            .pages
            .iter()
            .rev()
            .take_while(|p| sequence.is_none_or(|s| p.sequence == s))
            .find_map(|p| {
                let record = p.records.iter().rev().find(|r| r.class_name == class)?;
                Some((p.page_number, record))
            })?;
        tracing::debug!(class, page, "marker found on an earlier page");
        Some(record)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/marker/registry.rs"]
mod tests;

use crate::{
    area::model::Area,
    content::model::{ContentKind, ContentTree},
    content::properties::PropertyResolver,
    foundation::error::{LayoutError, LayoutResult, SourceLocation},
    foundation::ids::NodeId,
    layout::context::LayoutContext,
    layout::cursor::CursorPosition,
    layout::engine::{self, LoopOutcome},
    layout::status::Status,
    marker::registry::{MarkerRecord, RetrievePosition},
};

/// Value of `retrieve-boundary`: how far back a retrieval may look.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, serde::Serialize)]
pub enum RetrieveBoundary {
    /// Current page only.
    Page,
    /// Earlier pages of the same page sequence.
    #[default]
    PageSequence,
    /// Any earlier page.
    Document,
}

/// Resolved retrieve-marker properties.
#[derive(Clone, Debug, PartialEq)]
pub struct RetrieveSpec {
    pub class_name: String,
    pub position: RetrievePosition,
    pub boundary: RetrieveBoundary,
}

impl RetrieveSpec {
    pub fn resolve(props: &impl PropertyResolver, location: &SourceLocation) -> LayoutResult<Self> {
        let class_name = match props.keyword("retrieve-class-name") {
            Some(c) if !c.trim().is_empty() => c.to_string(),
            _ => {
                return Err(LayoutError::structural(
                    "retrieve-marker requires a retrieve-class-name",
                    location.clone(),
                ));
            }
        };
        let position = match props.keyword("retrieve-position") {
            None | Some("first-starting-within-page") => RetrievePosition::FirstStartingWithinPage,
            Some("first-including-carryover") => RetrievePosition::FirstIncludingCarryover,
            Some("last-starting-within-page") => RetrievePosition::LastStartingWithinPage,
            Some("last-ending-within-page") => RetrievePosition::LastEndingWithinPage,
            Some(other) => {
                return Err(LayoutError::structural(
                    format!("illegal retrieve-position '{other}'"),
                    location.clone(),
                ));
            }
        };
        let boundary = match props.keyword("retrieve-boundary") {
            None | Some("page-sequence") => RetrieveBoundary::PageSequence,
            Some("page") => RetrieveBoundary::Page,
            Some("document") => RetrieveBoundary::Document,
            Some(other) => {
                return Err(LayoutError::structural(
                    format!("illegal retrieve-boundary '{other}'"),
                    location.clone(),
                ));
            }
        };
        Ok(Self {
            class_name,
            position,
            boundary,
        })
    }
}

/// Pick the marker a retrieval replays: the current page first, then earlier pages within the
/// boundary, most recent first.
pub fn select_marker(
    tree: &ContentTree,
    spec: &RetrieveSpec,
    ctx: &LayoutContext<'_>,
) -> Option<NodeId> {
    let on_page = ctx.markers.search(
        tree,
        &spec.class_name,
        spec.position,
        ctx.env.opts.last_marker_tie_break,
    );
    if let Some(r) = on_page {
        return Some(r.marker);
    }
    let earlier = match spec.boundary {
        RetrieveBoundary::Page => None,
        RetrieveBoundary::PageSequence => ctx
            .env
            .history
            .search_back(&spec.class_name, Some(ctx.sequence)),
        RetrieveBoundary::Document => ctx.env.history.search_back(&spec.class_name, None),
    };
    earlier.map(|r| r.marker)
}

/// In-flow marker: produces no area, registers itself on the page once.
pub(crate) fn layout_marker(
    tree: &mut ContentTree,
    node: NodeId,
    ctx: &mut LayoutContext<'_>,
) -> LayoutResult<Status> {
    if tree.cursor(node).is_complete() {
        return Ok(Status::Ok);
    }
    let (Some(owner), Some(class_name)) = (tree.parent(node), tree.node(node).marker_class())
    else {
        return Err(LayoutError::structural(
            "marker needs a parent and a marker-class-name",
            tree.location(node).clone(),
        ));
    };
    ctx.markers.register(MarkerRecord {
        class_name: class_name.to_string(),
        marker: node,
        owner,
        page: ctx.page_number,
        is_first: tree.cursor(owner).flags.areas_generated == 0,
        is_last: false,
        finalized: false,
    });
    tree.cursor_mut(node).advance(CursorPosition::Done);
    Ok(Status::Ok)
}

/// Register `owner`'s markers again against a continuation area on a later page.
///
/// Such records never start within the page, so only `first-including-carryover` and
/// `last-ending-within-page` can pick them.
pub(crate) fn register_carryover(tree: &ContentTree, owner: NodeId, ctx: &mut LayoutContext<'_>) {
    let markers = tree
        .children(owner)
        .iter()
        .copied()
        .take_while(|c| tree.kind(*c) == ContentKind::Marker);
    for marker in markers {
        if ctx.markers.records().iter().any(|r| r.marker == marker) {
            continue;
        }
        let Some(class_name) = tree.node(marker).marker_class() else {
            continue;
        };
        ctx.markers.register(MarkerRecord {
            class_name: class_name.to_string(),
            marker,
            owner,
            page: ctx.page_number,
            is_first: false,
            is_last: false,
            finalized: false,
        });
    }
}

/// Replay the selected marker's children into `area` as if laid out in place.
pub(crate) fn layout_retrieve_marker(
    tree: &mut ContentTree,
    node: NodeId,
    area: &mut Area,
    ctx: &mut LayoutContext<'_>,
) -> LayoutResult<Status> {
    if tree.cursor(node).is_complete() {
        return Ok(Status::Ok);
    }
    if tree.cursor(node).is_start() {
        let spec = RetrieveSpec::resolve(tree.props(node), tree.location(node))?;
        let chosen = select_marker(tree, &spec, ctx);
        tracing::debug!(
            class = %spec.class_name,
            ?chosen,
            page = ctx.page_number,
            "retrieve-marker"
        );
        let cursor = tree.cursor_mut(node);
        cursor.advance_to(0);
        cursor.flags.retrieved = chosen;
        if let Some(marker) = chosen {
            tree.reset_subtree(marker);
            tree.cursor_mut(marker).advance_to(0);
        }
    }
    let Some(marker) = tree.cursor(node).flags.retrieved else {
        tree.cursor_mut(node).advance(CursorPosition::Done);
        return Ok(Status::Ok);
    };
    ctx.replay_depth += 1;
    let outcome = engine::layout_children(tree, marker, area, ctx, engine::accepts_block_content);
    ctx.replay_depth -= 1;
    match outcome? {
        LoopOutcome::Complete => {
            tree.cursor_mut(marker).advance(CursorPosition::Done);
            tree.cursor_mut(node).advance(CursorPosition::Done);
            Ok(Status::Ok)
        }
        LoopOutcome::Incomplete(status) => Ok(status),
    }
}

#[cfg(test)]
#[path = "../../tests/unit/marker/retrieve.rs"]
mod tests;

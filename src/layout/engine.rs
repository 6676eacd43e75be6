use smallvec::SmallVec;

use crate::{
    area::model::{Area, AreaKind},
    content::model::{ContentKind, ContentTree},
    foundation::core::fits_within,
    foundation::error::{LayoutError, LayoutResult},
    foundation::ids::NodeId,
    layout::context::{LayoutCheckpoint, LayoutContext},
    layout::cursor::CursorPosition,
    layout::list,
    layout::leaf,
    layout::params::{BreakKind, LayoutParams},
    layout::status::{PageParity, Status},
    marker::retrieve,
};

/// Lay out `node` into `area`, attaching whatever it produces to `area`.
///
/// Resumable: the node's cursor records how far it got, and the next call continues from there
/// with a fresh area.
pub fn layout(
    tree: &mut ContentTree,
    node: NodeId,
    area: &mut Area,
    ctx: &mut LayoutContext<'_>,
) -> LayoutResult<Status> {
    let status = match tree.kind(node) {
        ContentKind::Block
        | ContentKind::BlockContainer
        | ContentKind::ListBlock
        | ContentKind::Container => layout_block(tree, node, area, ctx)?,
        ContentKind::ListItem => list::layout_list_item(tree, node, area, ctx)?,
        ContentKind::ListItemLabel | ContentKind::ListItemBody => {
            list::layout_list_part(tree, node, area, ctx)?
        }
        ContentKind::Lines => leaf::layout_lines(tree, node, area, ctx)?,
        ContentKind::Marker => retrieve::layout_marker(tree, node, ctx)?,
        ContentKind::RetrieveMarker => retrieve::layout_retrieve_marker(tree, node, area, ctx)?,
        ContentKind::Flow => {
            return Err(LayoutError::structural(
                "flow must be the direct child of a page-sequence",
                tree.location(node).clone(),
            ));
        }
    };
    check_progress(tree, node, status, ctx)?;
    Ok(status)
}

/// Infinite-loop guard: count consecutive calls that laid out nothing.
pub(crate) fn check_progress(
    tree: &mut ContentTree,
    node: NodeId,
    status: Status,
    ctx: &LayoutContext<'_>,
) -> LayoutResult<()> {
    let limit = ctx.env.opts.max_stalled_calls.max(1);
    let flags = &mut tree.cursor_mut(node).flags;
    if !status.laid_out_none() {
        flags.stalled_calls = 0;
        return Ok(());
    }
    flags.stalled_calls += 1;
    if flags.stalled_calls >= limit {
        let attempts = flags.stalled_calls;
        return Err(LayoutError::non_termination(
            format!(
                "{:?} made no progress on page {}; its content can never fit",
                tree.kind(node),
                ctx.page_number
            ),
            tree.location(node).clone(),
            attempts,
        ));
    }
    Ok(())
}

/// Resolve (once) and cache a node's parameters.
pub(crate) fn resolve_params(
    tree: &mut ContentTree,
    node: NodeId,
    ctx: &LayoutContext<'_>,
) -> LayoutResult<LayoutParams> {
    if let Some(p) = tree.cached_params(node) {
        return Ok(p.clone());
    }
    let params = LayoutParams::resolve(
        tree.props(node),
        ctx.env.metrics.as_ref(),
        tree.location(node),
    )?;
    tree.cache_params(node, params.clone());
    Ok(params)
}

/// First-entry work shared by every container kind: resolve parameters, register the id and
/// move the cursor off START.
pub(crate) fn enter(
    tree: &mut ContentTree,
    node: NodeId,
    ctx: &mut LayoutContext<'_>,
) -> LayoutResult<LayoutParams> {
    let params = resolve_params(tree, node, ctx)?;
    if tree.cursor(node).is_start() {
        // Replayed marker content may carry an id registered by an earlier replay.
        if let Some(id) = &params.id
            && !(ctx.is_replaying() && ctx.env.ids.contains(id))
        {
            ctx.env.ids.create_id(id, tree.location(node))?;
        }
        tree.cursor_mut(node).advance_to(0);
    }
    Ok(params)
}

/// Children accepted by block-level containers.
pub(crate) fn accepts_block_content(kind: ContentKind) -> bool {
    kind.is_block_level() || matches!(kind, ContentKind::Lines | ContentKind::Marker)
}

fn accepts_list_items(kind: ContentKind) -> bool {
    matches!(kind, ContentKind::ListItem | ContentKind::Marker)
}

/// Result of walking a node's children for one call.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum LoopOutcome {
    /// Every child completed.
    Complete,
    /// Stopped at an incomplete child; the owner's cursor points at it.
    Incomplete(Status),
}

struct Kept {
    index: usize,
    node: NodeId,
    checkpoint: LayoutCheckpoint,
    produced_before: bool,
}

/// The resumable child loop.
///
/// Walks `owner`'s children from its cursor, laying each into `area`. Returns `AreaFullNone`
/// only when nothing was placed in this call. Applies keep-with-next withdrawal. Markers do not
/// count as placed content.
pub(crate) fn layout_children(
    tree: &mut ContentTree,
    owner: NodeId,
    area: &mut Area,
    ctx: &mut LayoutContext<'_>,
    accept: fn(ContentKind) -> bool,
) -> LayoutResult<LoopOutcome> {
    let mut index = match tree.cursor(owner).position {
        CursorPosition::Index(i) => i,
        CursorPosition::Start => {
            tree.cursor_mut(owner).advance_to(0);
            0
        }
        CursorPosition::BreakAfter | CursorPosition::Done => return Ok(LoopOutcome::Complete),
    };
    let start = index;
    let start_markers = ctx.markers.len();
    let mut produced = false;
    let mut kept: Option<Kept> = None;

    while let Some(child) = tree.child(owner, index) {
        let kind = tree.kind(child);
        if !accept(kind) {
            let message = format!(
                "{kind:?} is not allowed inside {:?}; skipped",
                tree.kind(owner)
            );
            ctx.warn(message, tree.location(child));
            tree.cursor_mut(child).advance(CursorPosition::Done);
            index += 1;
            tree.cursor_mut(owner).advance_to(index);
            kept = None;
            continue;
        }

        let checkpoint = ctx.checkpoint();
        let started_here = tree.cursor(child).is_start();
        let status = layout(tree, child, area, ctx)?;

        if status.is_incomplete() {
            if !status.laid_out_none() {
                return Ok(LoopOutcome::Incomplete(status));
            }
            let placed = match kept.take() {
                Some(prev) => {
                    area.remove_generated_by(prev.node);
                    withdraw_kept(tree, owner, &prev, ctx);
                    prev.produced_before
                }
                None => produced,
            };
            if placed {
                return Ok(LoopOutcome::Incomplete(Status::AreaFullSome));
            }
            unwind_markers(tree, owner, start, start_markers, ctx);
            return Ok(LoopOutcome::Incomplete(Status::AreaFullNone));
        }

        let produced_before = produced;
        produced |= kind != ContentKind::Marker;
        kept = (status == Status::KeepWithNext && started_here).then_some(Kept {
            index,
            node: child,
            checkpoint,
            produced_before,
        });
        index += 1;
        tree.cursor_mut(owner).advance_to(index);
    }
    Ok(LoopOutcome::Complete)
}

/// Undo a kept child and everything after it so the pair starts together next time.
fn withdraw_kept(tree: &mut ContentTree, owner: NodeId, prev: &Kept, ctx: &mut LayoutContext<'_>) {
    tree.reset_children_from(owner, prev.index);
    ctx.restore(prev.checkpoint);
    tree.cursor_mut(owner).rewind_to(prev.index);
    ctx.env.counters.keep_rollbacks += 1;
    tracing::debug!(owner = %owner, kept = %prev.node, "keep-with-next withdrawal");
}

/// A call that placed nothing must not leave its markers registered on this page.
///
/// Markers completed since `start` are reset so they register again with the owner's first
/// real area.
fn unwind_markers(
    tree: &mut ContentTree,
    owner: NodeId,
    start: usize,
    start_markers: usize,
    ctx: &mut LayoutContext<'_>,
) {
    let end = tree.cursor(owner).index().unwrap_or(start);
    let markers: SmallVec<[(usize, NodeId); 4]> = tree
        .children(owner)
        .iter()
        .copied()
        .enumerate()
        .take(end)
        .skip(start)
        .filter(|(_, c)| tree.kind(*c) == ContentKind::Marker)
        .collect();
    let Some(&(first, _)) = markers.first() else {
        return;
    };
    for &(_, marker) in &markers {
        tree.reset_subtree(marker);
    }
    ctx.markers.truncate(start_markers);
    tree.cursor_mut(owner).rewind_to(first);
}

/// Break-before, honoured only for children laid directly into a column.
fn break_before(params: &LayoutParams, parent: &Area, ctx: &LayoutContext<'_>) -> Option<Status> {
    if parent.kind != AreaKind::Column {
        return None;
    }
    let status = params.break_before.status()?;
    let at_top = !parent.has_content();
    let suppressed = match params.break_before {
        BreakKind::Auto => true,
        BreakKind::Column => at_top,
        BreakKind::Page => at_top && parent.page_top,
        BreakKind::OddPage => at_top && parent.page_top && PageParity::Odd.matches(ctx.page_number),
        BreakKind::EvenPage => {
            at_top && parent.page_top && PageParity::Even.matches(ctx.page_number)
        }
    };
    (!suppressed).then_some(status)
}

fn break_after(params: &LayoutParams, parent: &Area) -> Option<Status> {
    if parent.kind != AreaKind::Column {
        return None;
    }
    params.break_after.status()
}

/// Emit space-before once, ahead of the node's first piece.
pub(crate) fn emit_space_before(
    tree: &mut ContentTree,
    node: NodeId,
    params: &LayoutParams,
    parent: &mut Area,
) {
    let flags = &mut tree.cursor_mut(node).flags;
    if flags.areas_generated == 0 && !flags.space_before_emitted {
        flags.space_before_emitted = true;
        parent.add_display_space(params.space_before, Some(node));
    }
}

/// Take back everything this node put into `parent` during a call that placed nothing.
pub(crate) fn withdraw(tree: &mut ContentTree, node: NodeId, parent: &mut Area) {
    parent.remove_generated_by(node);
    let flags = &mut tree.cursor_mut(node).flags;
    if flags.areas_generated == 0 {
        flags.space_before_emitted = false;
    }
}

/// Attach one finished piece of `node`: configure its id, settle its markers, grow `parent`.
pub(crate) fn attach_piece(
    tree: &mut ContentTree,
    node: NodeId,
    params: &LayoutParams,
    mut area: Area,
    parent: &mut Area,
    ctx: &mut LayoutContext<'_>,
) {
    if area.is_first
        && let Some(id) = &params.id
    {
        ctx.env.ids.configure_id(id, ctx.page_number);
        area.add_id_ref(id.as_str());
    }
    area.end();
    if !area.is_first {
        retrieve::register_carryover(tree, node, ctx);
    }
    ctx.markers.finalize(node, area.is_first, area.is_last);
    parent.attach(area);
    tree.cursor_mut(node).flags.areas_generated += 1;
}

/// Finish a completed node: space-after, pending break, keep.
pub(crate) fn complete(
    tree: &mut ContentTree,
    node: NodeId,
    params: &LayoutParams,
    parent: &mut Area,
) -> Status {
    parent.add_display_space(params.space_after, Some(node));
    if let Some(status) = break_after(params, parent) {
        tree.cursor_mut(node).advance(CursorPosition::BreakAfter);
        return status;
    }
    tree.cursor_mut(node).advance(CursorPosition::Done);
    if params.keep_with_next {
        Status::KeepWithNext
    } else {
        Status::Ok
    }
}

/// Block, block-container, list-block and generic container.
fn layout_block(
    tree: &mut ContentTree,
    node: NodeId,
    parent: &mut Area,
    ctx: &mut LayoutContext<'_>,
) -> LayoutResult<Status> {
    match tree.cursor(node).position {
        CursorPosition::Done => return Ok(Status::Ok),
        CursorPosition::BreakAfter => {
            tree.cursor_mut(node).advance(CursorPosition::Done);
            return Ok(Status::Ok);
        }
        _ => {}
    }
    let entering = tree.cursor(node).is_start();
    let params = enter(tree, node, ctx)?;
    if entering && let Some(status) = break_before(&params, parent, ctx) {
        return Ok(status);
    }

    let kind = tree.kind(node);
    let (start_indent, end_indent) = indents(tree, node, kind, &params, parent);
    emit_space_before(tree, node, &params, parent);

    let fixed_height = match kind {
        ContentKind::BlockContainer => params.height,
        _ => None,
    };
    let available = parent.space_left();
    if let Some(h) = fixed_height
        && !fits_within(h, available)
    {
        withdraw(tree, node, parent);
        return Ok(Status::AreaFullNone);
    }

    let allocation = parent.allocation_width() - start_indent;
    let width = match (kind, params.width) {
        (ContentKind::BlockContainer, Some(w)) => w.min(allocation),
        _ => allocation - end_indent,
    };
    let area_kind = match kind {
        ContentKind::BlockContainer => AreaKind::BlockContainer,
        _ => AreaKind::Block,
    };
    let mut area =
        Area::new(area_kind, width, fixed_height.unwrap_or(available)).generated_by(node);
    area.offset.x = start_indent;
    area.is_first = tree.cursor(node).flags.areas_generated == 0;
    area.start();

    let accept = match kind {
        ContentKind::ListBlock => accepts_list_items,
        _ => accepts_block_content,
    };
    let mut outcome = layout_children(tree, node, &mut area, ctx, accept)?;

    if let Some(h) = fixed_height {
        if outcome != LoopOutcome::Complete {
            ctx.warn(
                "content overflows a fixed-height block-container; the rest is dropped",
                tree.location(node),
            );
            outcome = LoopOutcome::Complete;
        }
        area.height = h;
    }

    match outcome {
        LoopOutcome::Incomplete(Status::AreaFullNone) => {
            withdraw(tree, node, parent);
            Ok(Status::AreaFullNone)
        }
        LoopOutcome::Incomplete(status) => {
            area.is_last = false;
            attach_piece(tree, node, &params, area, parent, ctx);
            Ok(status)
        }
        LoopOutcome::Complete => {
            area.is_last = true;
            attach_piece(tree, node, &params, area, parent, ctx);
            Ok(complete(tree, node, &params, parent))
        }
    }
}

/// Start/end indents, with the table-cell override applied to list blocks.
fn indents(
    tree: &ContentTree,
    node: NodeId,
    kind: ContentKind,
    params: &LayoutParams,
    parent: &Area,
) -> (f64, f64) {
    if kind == ContentKind::ListBlock
        && let Some(cell) = tree
            .ancestors(node)
            .filter(|a| tree.kind(*a) == ContentKind::Container)
            .find_map(|a| tree.cached_params(a).and_then(|p| p.cell))
    {
        let start = params.start_indent + cell.start_offset;
        let end = (parent.allocation_width() - cell.width - cell.start_offset).max(0.0);
        return (start, end);
    }
    (params.start_indent, params.end_indent)
}

#[cfg(test)]
#[path = "../../tests/unit/layout/engine.rs"]
mod tests;

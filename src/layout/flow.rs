use crate::{
    area::region::RegionBody,
    balance::snapshot::CursorSnapshot,
    content::model::{ContentKind, ContentTree},
    foundation::error::{LayoutError, LayoutResult},
    foundation::ids::NodeId,
    layout::context::{LayoutCheckpoint, LayoutContext},
    layout::cursor::CursorPosition,
    layout::engine,
    layout::params::SpanKind,
    layout::status::Status,
};

struct Kept {
    index: usize,
    node: NodeId,
    checkpoint: LayoutCheckpoint,
    produced_before: bool,
}

/// Lay out one page's worth of a flow into the page's body region.
///
/// Returns `Ok` once the flow is exhausted, an area-full status when the page is full, or a
/// forced page break.
#[tracing::instrument(level = "debug", skip_all, fields(page = ctx.page_number, flow = %flow))]
pub fn layout_flow(
    tree: &mut ContentTree,
    flow: NodeId,
    body: &mut RegionBody,
    ctx: &mut LayoutContext<'_>,
) -> LayoutResult<Status> {
    let status = flow_pass(tree, flow, body, ctx)?;
    engine::check_progress(tree, flow, status, ctx)?;
    tracing::debug!(%status, "flow pass finished");
    Ok(status)
}

fn flow_pass(
    tree: &mut ContentTree,
    flow: NodeId,
    body: &mut RegionBody,
    ctx: &mut LayoutContext<'_>,
) -> LayoutResult<Status> {
    if tree.kind(flow) != ContentKind::Flow || tree.parent(flow).is_some() {
        return Err(LayoutError::structural(
            "flow must be the direct child of a page-sequence",
            tree.location(flow).clone(),
        ));
    }
    if tree.cursor(flow).is_complete() {
        return Ok(Status::Ok);
    }
    if tree.cursor(flow).is_start() {
        if tree.children(flow).is_empty() {
            return Err(LayoutError::structural(
                "flow has no content",
                tree.location(flow).clone(),
            ));
        }
        tree.cursor_mut(flow).advance_to(0);
    }

    let slack = ctx.env.balance_slack();
    let mut snapshot = CursorSnapshot::capture(tree, flow, ctx);
    let mut produced_at_snapshot = false;
    let mut produced = false;
    let mut kept: Option<Kept> = None;

    while let Some(index) = tree.cursor(flow).index() {
        let Some(child) = tree.child(flow, index) else {
            if ctx.env.opts.balance_final_span
                && body.is_unbalanced_multi_column()
                && !body.is_new_span_area()
            {
                body.reset_span_area(slack);
                snapshot.rollback(tree, ctx);
                produced = produced_at_snapshot;
                kept = None;
                continue;
            }
            tree.cursor_mut(flow).advance(CursorPosition::Done);
            return Ok(Status::Ok);
        };

        let kind = tree.kind(child);
        if !kind.is_block_level() {
            let message = format!("{kind:?} cannot sit directly in a flow; skipped");
            ctx.warn(message, tree.location(child));
            tree.cursor_mut(child).advance(CursorPosition::Done);
            tree.cursor_mut(flow).advance_to(index + 1);
            kept = None;
            continue;
        }

        let span = SpanKind::of(tree.props(child), tree.location(child))?;
        if body.needs_span(span) {
            if body.is_balancing_required(span) {
                body.reset_span_area(slack);
                snapshot.rollback(tree, ctx);
                produced = produced_at_snapshot;
                kept = None;
                continue;
            }
            if !body.add_span_area(span) {
                return Ok(page_full(produced));
            }
            snapshot = CursorSnapshot::capture(tree, flow, ctx);
            produced_at_snapshot = produced;
            kept = None;
        }

        let checkpoint = ctx.checkpoint();
        let started_here = tree.cursor(child).is_start();
        let column = body
            .current_column_mut()
            .ok_or_else(|| LayoutError::validation("region body has no open column"))?;
        let status = engine::layout(tree, child, column, ctx)?;

        match status {
            Status::Ok | Status::KeepWithNext => {
                let produced_before = produced;
                produced = true;
                kept = (status == Status::KeepWithNext && started_here).then_some(Kept {
                    index,
                    node: child,
                    checkpoint,
                    produced_before,
                });
                tree.cursor_mut(flow).advance_to(index + 1);
            }
            s if s.is_page_break() || s == Status::ForceColumnBreak => {
                produced = produced || tree.cursor(child).is_complete();
                kept = None;
                if is_trailing_break(tree, flow, index, child) {
                    tree.cursor_mut(child).advance(CursorPosition::Done);
                    tree.cursor_mut(flow).advance_to(index + 1);
                    continue;
                }
                if s == Status::ForceColumnBreak && body.advance_column() {
                    continue;
                }
                return Ok(if s == Status::ForceColumnBreak {
                    Status::ForcePageBreak
                } else {
                    s
                });
            }
            _ => {
                if body.is_last_column() && body.is_balanced() && !body.is_restored() {
                    body.restore_span_area();
                    snapshot.rollback(tree, ctx);
                    produced = produced_at_snapshot;
                    kept = None;
                    continue;
                }
                if status.laid_out_none()
                    && let Some(prev) = kept.take()
                {
                    body.remove_generated_by(prev.node);
                    tree.reset_children_from(flow, prev.index);
                    ctx.restore(prev.checkpoint);
                    tree.cursor_mut(flow).rewind_to(prev.index);
                    ctx.env.counters.keep_rollbacks += 1;
                    produced = prev.produced_before;
                    tracing::debug!(kept = %prev.node, "keep-with-next withdrawal in flow");
                } else if !status.laid_out_none() {
                    produced = true;
                }
                kept = None;
                if body.advance_column() {
                    continue;
                }
                return Ok(page_full(produced));
            }
        }
    }
    Ok(Status::Ok)
}

fn page_full(produced: bool) -> Status {
    if produced {
        Status::AreaFullSome
    } else {
        Status::AreaFullNone
    }
}

/// A break-after on the flow's last child would only open an empty page.
fn is_trailing_break(tree: &ContentTree, flow: NodeId, index: usize, child: NodeId) -> bool {
    tree.cursor(child).position == CursorPosition::BreakAfter
        && index + 1 == tree.children(flow).len()
}

#[cfg(test)]
#[path = "../../tests/unit/layout/flow.rs"]
mod tests;

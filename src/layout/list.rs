use crate::{
    area::model::{Area, AreaKind, Stacking},
    content::model::{ContentKind, ContentTree},
    foundation::error::{LayoutError, LayoutResult},
    foundation::ids::NodeId,
    layout::context::LayoutContext,
    layout::cursor::CursorPosition,
    layout::engine::{self, LoopOutcome},
    layout::status::Status,
    marker::retrieve,
};

fn label_and_body(tree: &ContentTree, item: NodeId) -> LayoutResult<(NodeId, NodeId)> {
    match tree.children(item) {
        &[label, body]
            if tree.kind(label) == ContentKind::ListItemLabel
                && tree.kind(body) == ContentKind::ListItemBody =>
        {
            Ok((label, body))
        }
        children => Err(LayoutError::structural(
            format!(
                "list-item needs exactly a list-item-label and a list-item-body, found {} children",
                children.len()
            ),
            tree.location(item).clone(),
        )),
    }
}

/// A list item: label and body side by side inside one item area.
pub(crate) fn layout_list_item(
    tree: &mut ContentTree,
    node: NodeId,
    parent: &mut Area,
    ctx: &mut LayoutContext<'_>,
) -> LayoutResult<Status> {
    if tree.cursor(node).is_complete() {
        return Ok(Status::Ok);
    }
    let (label, body) = label_and_body(tree, node)?;
    let params = engine::enter(tree, node, ctx)?;
    engine::emit_space_before(tree, node, &params, parent);

    // Provisional distances live on the enclosing list block.
    let (distance, separation) = match tree.parent(node).and_then(|p| tree.cached_params(p)) {
        Some(list) => (list.provisional_distance, list.label_separation),
        None => (params.provisional_distance, params.label_separation),
    };
    let width = parent.allocation_width() - params.start_indent - params.end_indent;
    let available = parent.space_left();

    let mut item = Area::new(AreaKind::ListItem, width, available)
        .generated_by(node)
        .with_stacking(Stacking::Beside);
    item.offset.x = params.start_indent;
    item.is_first = tree.cursor(node).flags.areas_generated == 0;
    item.start();

    let mut label_area =
        Area::new(AreaKind::ListLabel, (distance - separation).clamp(0.0, width), available)
            .generated_by(label);
    label_area.is_first = item.is_first;
    let mut body_area =
        Area::new(AreaKind::ListBody, (width - distance).max(0.0), available).generated_by(body);
    body_area.offset.x = distance.min(width);
    body_area.is_first = item.is_first;

    let checkpoint = ctx.checkpoint();
    let label_started = tree.cursor(label).is_start();
    let label_status = engine::layout(tree, label, &mut label_area, ctx)?;
    let body_status = engine::layout(tree, body, &mut body_area, ctx)?;

    let label_placed = label_area.has_content();
    let body_placed = body_area.has_content();
    if body_status.laid_out_none() && label_started {
        // Never leave a label behind without the start of its body.
        tree.reset_subtree(label);
        tree.reset_subtree(body);
        ctx.restore(checkpoint);
        engine::withdraw(tree, node, parent);
        return Ok(Status::AreaFullNone);
    }
    if !label_placed
        && !body_placed
        && (label_status.is_incomplete() || body_status.is_incomplete())
    {
        engine::withdraw(tree, node, parent);
        return Ok(Status::AreaFullNone);
    }

    let done = !label_status.is_incomplete() && !body_status.is_incomplete();
    label_area.is_last = done;
    body_area.is_last = done;
    if !item.is_first {
        retrieve::register_carryover(tree, label, ctx);
        retrieve::register_carryover(tree, body, ctx);
    }
    ctx.markers.finalize(label, label_area.is_first, done);
    ctx.markers.finalize(body, body_area.is_first, done);
    item.attach(label_area);
    item.attach(body_area);
    item.is_last = done;
    engine::attach_piece(tree, node, &params, item, parent, ctx);

    if done {
        return Ok(engine::complete(tree, node, &params, parent));
    }
    // A forced break from the body wins over plain overflow.
    Ok(
        if body_status.is_incomplete() && !body_status.is_area_full() {
            body_status
        } else {
            Status::AreaFullSome
        },
    )
}

/// Label or body: no box of its own, children go straight into the slot the item gave it.
pub(crate) fn layout_list_part(
    tree: &mut ContentTree,
    node: NodeId,
    area: &mut Area,
    ctx: &mut LayoutContext<'_>,
) -> LayoutResult<Status> {
    if tree.cursor(node).is_complete() {
        return Ok(Status::Ok);
    }
    if tree
        .parent(node)
        .is_none_or(|p| tree.kind(p) != ContentKind::ListItem)
    {
        return Err(LayoutError::structural(
            format!("{:?} must be a child of a list-item", tree.kind(node)),
            tree.location(node).clone(),
        ));
    }
    engine::enter(tree, node, ctx)?;
    match engine::layout_children(tree, node, area, ctx, engine::accepts_block_content)? {
        LoopOutcome::Complete => {
            tree.cursor_mut(node).advance(CursorPosition::Done);
            Ok(Status::Ok)
        }
        LoopOutcome::Incomplete(status) => Ok(status),
    }
}

#[cfg(test)]
#[path = "../../tests/unit/layout/list.rs"]
mod tests;

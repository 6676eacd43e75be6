use crate::{
    area::model::Area,
    content::model::ContentTree,
    foundation::core::fits_within,
    foundation::error::LayoutResult,
    foundation::ids::NodeId,
    layout::context::LayoutContext,
    layout::cursor::CursorPosition,
    layout::engine,
    layout::status::Status,
};

/// Pre-broken lines: place whole lines while they fit, resume at the first that did not.
pub(crate) fn layout_lines(
    tree: &mut ContentTree,
    node: NodeId,
    area: &mut Area,
    ctx: &mut LayoutContext<'_>,
) -> LayoutResult<Status> {
    if tree.cursor(node).is_complete() {
        return Ok(Status::Ok);
    }
    let params = engine::enter(tree, node, ctx)?;
    let first = tree.cursor(node).index().unwrap_or(0);
    let width = area.allocation_width();

    let lines = tree.node(node).lines();
    let total = lines.len();
    let mut next = first;
    while let Some(line) = lines.get(next) {
        let height = line.height.unwrap_or(params.line_height);
        if !fits_within(height, area.space_left()) {
            break;
        }
        let mut line_area = Area::line(line.text.clone(), width, height).generated_by(node);
        line_area.is_first = next == 0;
        line_area.is_last = next + 1 == total;
        if next == 0
            && let Some(id) = &params.id
        {
            ctx.env.ids.configure_id(id, ctx.page_number);
            line_area.id_refs.push(id.clone());
        }
        area.attach(line_area);
        next += 1;
    }

    if next >= total {
        tree.cursor_mut(node).advance(CursorPosition::Done);
        return Ok(Status::Ok);
    }
    tree.cursor_mut(node).advance_to(next);
    Ok(if next == first {
        Status::AreaFullNone
    } else {
        Status::AreaFullSome
    })
}

#[cfg(test)]
#[path = "../../tests/unit/layout/leaf.rs"]
mod tests;

use crate::{
    area::model::{Area, AreaKind, Stacking},
    content::def::PageGeometry,
    foundation::core::{LENGTH_EPSILON, Length},
    foundation::ids::NodeId,
    layout::params::SpanKind,
};

#[derive(Clone, Debug)]
struct SpanState {
    kind: SpanKind,
    columns: u32,
    current: usize,
    balanced: bool,
    restored: bool,
    unbalanced_height: Length,
}

/// Body region of a page: the main reference area, split into spans, each split into columns.
///
/// Layout only ever writes into the current column of the last span. Earlier spans are closed.
#[derive(Clone, Debug)]
pub struct RegionBody {
    main: Area,
    spans: Vec<SpanState>,
    column_count: u32,
    column_gap: Length,
}

impl RegionBody {
    pub fn new(
        content_width: Length,
        height: Length,
        column_count: u32,
        column_gap: Length,
    ) -> Self {
        Self {
            main: Area::new(AreaKind::MainReference, content_width, height),
            spans: Vec::new(),
            column_count: column_count.max(1),
            column_gap,
        }
    }

    pub fn from_geometry(page: &PageGeometry) -> Self {
        Self::new(
            page.content_width(),
            page.body_height(),
            page.column_count,
            page.column_gap,
        )
    }

    pub fn span_count(&self) -> usize {
        self.spans.len()
    }

    /// Whether content of span kind `kind` needs a new span area.
    pub fn needs_span(&self, kind: SpanKind) -> bool {
        self.spans.last().is_none_or(|s| s.kind != kind)
    }

    /// Height not yet claimed by any span's content.
    pub fn remaining_height(&mut self) -> Length {
        self.sync();
        (self.main.max_height - self.main.height).max(0.0)
    }

    /// Close the current span and open a new one below it.
    ///
    /// Returns `false` when the body has no room left.
    pub fn add_span_area(&mut self, kind: SpanKind) -> bool {
        let remaining = self.remaining_height();
        if !self.spans.is_empty() && remaining <= LENGTH_EPSILON {
            return false;
        }
        let columns = match kind {
            SpanKind::All => 1,
            SpanKind::None => self.column_count,
        };
        let gaps = self.column_gap * f64::from(columns - 1);
        let col_width = (self.main.content_width - gaps) / f64::from(columns);
        let first_span = self.spans.is_empty();

        let mut span = Area::new(AreaKind::Span, self.main.content_width, remaining)
            .with_stacking(Stacking::Beside);
        for i in 0..columns {
            let mut col = Area::new(AreaKind::Column, col_width, remaining);
            col.offset.x = f64::from(i) * (col_width + self.column_gap);
            col.column_index = Some(i);
            col.page_top = first_span && i == 0;
            span.children.push(col);
        }
        self.main.add_child(span);
        self.spans.push(SpanState {
            kind,
            columns,
            current: 0,
            balanced: false,
            restored: false,
            unbalanced_height: remaining,
        });
        tracing::debug!(columns, height = remaining, "new span area");
        true
    }

    /// Whether a change to span kind `next` must first balance the current span.
    pub fn is_balancing_required(&self, next: SpanKind) -> bool {
        self.spans
            .last()
            .is_some_and(|s| s.columns > 1 && !s.balanced && s.kind != next)
    }

    /// Whether the current span is multi-column and not yet balanced.
    pub fn is_unbalanced_multi_column(&self) -> bool {
        self.spans.last().is_some_and(|s| s.columns > 1 && !s.balanced)
    }

    pub fn is_balanced(&self) -> bool {
        self.spans.last().is_some_and(|s| s.balanced)
    }

    pub fn is_restored(&self) -> bool {
        self.spans.last().is_some_and(|s| s.restored)
    }

    /// Empty the current span and shrink it to an even share of what it held, plus `slack`.
    ///
    /// Returns the new column height.
    pub fn reset_span_area(&mut self, slack: Length) -> Length {
        let Some(state) = self.spans.last_mut() else {
            return 0.0;
        };
        let Some(span) = self.main.children.last_mut() else {
            return 0.0;
        };
        let total: Length = span.children.iter().map(|c| c.height).sum();
        let height = (total / f64::from(state.columns) + slack).min(state.unbalanced_height);
        clear_columns(span, height);
        state.current = 0;
        state.balanced = true;
        tracing::debug!(total, height, "span reset for balancing");
        height
    }

    /// Empty the current span and give it back its unbalanced height.
    pub fn restore_span_area(&mut self) {
        let Some(state) = self.spans.last_mut() else {
            return;
        };
        let Some(span) = self.main.children.last_mut() else {
            return;
        };
        clear_columns(span, state.unbalanced_height);
        state.current = 0;
        state.restored = true;
        tracing::debug!(height = state.unbalanced_height, "balanced span restored");
    }

    pub fn is_last_column(&self) -> bool {
        self.spans
            .last()
            .is_none_or(|s| s.current + 1 >= s.columns as usize)
    }

    /// Move to the next column of the current span; `false` on the last column.
    pub fn advance_column(&mut self) -> bool {
        match self.spans.last_mut() {
            Some(s) if s.current + 1 < s.columns as usize => {
                s.current += 1;
                true
            }
            _ => false,
        }
    }

    pub fn current_column_index(&self) -> Option<usize> {
        self.spans.last().map(|s| s.current)
    }

    pub fn current_column(&self) -> Option<&Area> {
        let state = self.spans.last()?;
        self.main.children.last()?.children.get(state.current)
    }

    pub fn current_column_mut(&mut self) -> Option<&mut Area> {
        let state = self.spans.last()?;
        self.main.children.last_mut()?.children.get_mut(state.current)
    }

    /// Whether nothing has been placed in the current span yet.
    pub fn is_new_span_area(&self) -> bool {
        self.main
            .children
            .last()
            .is_none_or(|span| span.children.iter().all(Area::is_empty))
    }

    /// Whether the whole body is still empty.
    pub fn is_empty(&self) -> bool {
        self.main
            .children
            .iter()
            .all(|span| span.children.iter().all(Area::is_empty))
    }

    /// Withdraw the areas `node` generated in the current span.
    pub fn remove_generated_by(&mut self, node: NodeId) -> Length {
        let Some(span) = self.main.children.last_mut() else {
            return 0.0;
        };
        span.children
            .iter_mut()
            .map(|col| col.remove_generated_by(node))
            .sum()
    }

    /// Column index of the column holding `node`'s first area in the current span.
    #[cfg(test)]
    pub fn column_of(&self, node: NodeId) -> Option<usize> {
        self.main.children.last()?.children.iter().position(|col| {
            col.children
                .iter()
                .any(|c| c.generated_by == Some(node))
        })
    }

    fn sync(&mut self) {
        if let Some(span) = self.main.children.last_mut() {
            span.height = span
                .children
                .iter()
                .map(|c| c.height)
                .fold(0.0, Length::max);
        }
        self.main.restack();
    }

    /// Finish the body and hand over its main reference area.
    pub fn into_area(mut self) -> Area {
        self.sync();
        self.main
    }
}

fn clear_columns(span: &mut Area, height: Length) {
    span.set_max_height(height);
    span.height = 0.0;
    for col in &mut span.children {
        col.children.clear();
        col.height = 0.0;
        col.set_max_height(height);
    }
}

#[cfg(test)]
#[path = "../../tests/unit/area/region.rs"]
mod tests;

use crate::{
    content::metrics::FontMetricsProvider,
    content::properties::PropertyResolver,
    foundation::core::{Length, non_negative},
    foundation::error::{LayoutError, LayoutResult, SourceLocation},
    layout::status::Status,
};

/// Value of `break-before` / `break-after`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum BreakKind {
    /// No forced break.
    #[default]
    Auto,
    /// Next column.
    Column,
    /// Next page.
    Page,
    /// Next odd page.
    OddPage,
    /// Next even page.
    EvenPage,
}

impl BreakKind {
    fn parse(value: Option<&str>, location: &SourceLocation) -> LayoutResult<Self> {
        Ok(match value {
            None | Some("auto") => Self::Auto,
            Some("column") => Self::Column,
            Some("page") => Self::Page,
            Some("odd-page") => Self::OddPage,
            Some("even-page") => Self::EvenPage,
            Some(other) => {
                return Err(LayoutError::structural(
                    format!("unknown break value '{other}'"),
                    location.clone(),
                ));
            }
        })
    }

    /// Status that requests this break, `None` for [`BreakKind::Auto`].
    pub fn status(self) -> Option<Status> {
        match self {
            Self::Auto => None,
            Self::Column => Some(Status::ForceColumnBreak),
            Self::Page => Some(Status::ForcePageBreak),
            Self::OddPage => Some(Status::ForcePageBreakOdd),
            Self::EvenPage => Some(Status::ForcePageBreakEven),
        }
    }
}

/// Value of `span`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, serde::Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SpanKind {
    /// Flows through the page's columns.
    #[default]
    None,
    /// Spans all columns.
    All,
}

impl SpanKind {
    fn parse(value: Option<&str>, location: &SourceLocation) -> LayoutResult<Self> {
        match value {
            None | Some("none") => Ok(Self::None),
            Some("all") => Ok(Self::All),
            Some(other) => Err(LayoutError::structural(
                format!("unknown span value '{other}'"),
                location.clone(),
            )),
        }
    }

    /// Read the span of a node without resolving its other parameters.
    pub fn of(props: &impl PropertyResolver, location: &SourceLocation) -> LayoutResult<Self> {
        Self::parse(props.keyword("span"), location)
    }
}

/// Table-cell geometry forced onto nested list blocks.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CellOverride {
    /// Added to the list block's start indent.
    pub start_offset: Length,
    /// Width the list block is forced to.
    pub width: Length,
}

/// Style-derived parameters a node resolves once, on first entry.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct LayoutParams {
    pub start_indent: Length,
    pub end_indent: Length,
    pub space_before: Length,
    pub space_after: Length,
    pub break_before: BreakKind,
    pub break_after: BreakKind,
    pub keep_with_next: bool,
    pub id: Option<String>,
    pub span: SpanKind,
    /// Fixed width of a block container.
    pub width: Option<Length>,
    /// Fixed height of a block container; makes it unbreakable.
    pub height: Option<Length>,
    /// Distance from the item's start edge to the body's start edge.
    pub provisional_distance: Length,
    /// Gap between the end of the label and the body.
    pub label_separation: Length,
    /// Height used for lines without an explicit height.
    pub line_height: Length,
    /// Present when this node is a table cell that forces list geometry.
    pub cell: Option<CellOverride>,
}

impl LayoutParams {
    /// Resolve parameters from pre-cascaded properties.
    pub fn resolve(
        props: &impl PropertyResolver,
        metrics: &dyn FontMetricsProvider,
        location: &SourceLocation,
    ) -> LayoutResult<Self> {
        let keep_with_next = match props.get("keep-with-next") {
            None => false,
            Some(v) => match (v.as_text(), v.as_number()) {
                (Some("auto"), _) => false,
                (Some("always"), _) => true,
                (_, Some(n)) => n > 0.0,
                _ => matches!(v, crate::content::properties::PropertyValue::Flag(true)),
            },
        };

        let font_size = props.length_or("font-size", metrics.default_font_size());
        let line_height = props
            .length("line-height")
            .unwrap_or_else(|| metrics.line_height(font_size));

        let cell = match props.keyword("container-role") {
            Some("table-cell") => Some(CellOverride {
                start_offset: non_negative(props.length_or("cell-start-offset", 0.0)),
                width: props.length_or("cell-width", f64::INFINITY),
            }),
            _ => None,
        };

        Ok(Self {
            start_indent: props.length_or("start-indent", 0.0),
            end_indent: props.length_or("end-indent", 0.0),
            space_before: non_negative(props.length_or("space-before", 0.0)),
            space_after: non_negative(props.length_or("space-after", 0.0)),
            break_before: BreakKind::parse(props.keyword("break-before"), location)?,
            break_after: BreakKind::parse(props.keyword("break-after"), location)?,
            keep_with_next,
            id: props
                .keyword("id")
                .filter(|s| !s.is_empty())
                .map(str::to_string),
            span: SpanKind::parse(props.keyword("span"), location)?,
            width: props.length("width").map(non_negative),
            height: props.length("height").map(non_negative),
            provisional_distance: non_negative(
                props.length_or("provisional-distance-between-starts", 24.0),
            ),
            label_separation: non_negative(props.length_or("provisional-label-separation", 6.0)),
            line_height: non_negative(line_height),
            cell,
        })
    }
}

#[cfg(test)]
#[path = "../../tests/unit/layout/params.rs"]
mod tests;

//! Quire is an incremental, resumable pagination engine for formatting-object style documents.
//!
//! Each content node keeps a cursor recording how far it got, so the driver can hand the root
//! flow one fresh page after another until the flow reports completion:
//!
//! - Load and validate a [`Document`] (JSON or the [`dsl`] builders)
//! - Create a [`Paginator`]
//! - Run it into a [`PageSink`] and collect [`FinishedPage`] area trees
//!
//! Multi-column spans are balanced by rolling content back to a [`CursorSnapshot`], and running
//! headers retrieve markers through the per-page [`MarkerRegistry`] and the [`MarkerHistory`].
#![forbid(unsafe_code)]

mod foundation;

pub(crate) mod area;
pub(crate) mod balance;
pub(crate) mod content;
pub(crate) mod layout;
pub(crate) mod marker;
pub(crate) mod session;

pub use crate::content::dsl;

pub use crate::foundation::core::{Length, Point, Rect, Size, Vec2};
pub use crate::foundation::error::{LayoutError, LayoutResult, SourceLocation};
pub use crate::foundation::ids::NodeId;

pub use crate::content::def::{
    DocumentDef, NodeDef, PageGeometry, PageSequenceDef, RegionName, StaticContentDef,
};
pub use crate::content::document::Document;
pub use crate::content::metrics::{FixedMetrics, FontMetricsProvider};
pub use crate::content::model::{ContentKind, ContentNode, ContentTree, LineBox};
pub use crate::content::properties::{PropertyMap, PropertyResolver, PropertyValue};

pub use crate::area::ids::IdReferenceTable;
pub use crate::area::model::{Area, AreaKind};
pub use crate::area::page::{FinishedPage, Page};
pub use crate::area::region::RegionBody;

pub use crate::layout::context::{
    Diagnostic, LayoutContext, LayoutCounters, LayoutEnv, LayoutOpts, Severity,
};
pub use crate::layout::cursor::{CursorFlags, CursorPosition, LayoutCursor};
pub use crate::layout::engine::layout;
pub use crate::layout::flow::layout_flow;
pub use crate::layout::params::{BreakKind, LayoutParams, SpanKind};
pub use crate::layout::status::{PageParity, Status};

pub use crate::marker::registry::{
    MarkerHistory, MarkerRecord, MarkerRegistry, MarkerTieBreak, RetrievePosition,
};
pub use crate::marker::retrieve::{RetrieveBoundary, RetrieveSpec, select_marker};

pub use crate::balance::snapshot::CursorSnapshot;

pub use crate::session::paginator::{PaginationStats, Paginator};
pub use crate::session::sink::{InMemorySink, JsonSink, PageSink, SinkConfig};

use crate::{
    area::ids::{IdCheckpoint, IdReferenceTable},
    content::metrics::{FixedMetrics, FontMetricsProvider},
    foundation::core::Length,
    foundation::error::SourceLocation,
    marker::registry::{MarkerHistory, MarkerRegistry, MarkerTieBreak},
};

/// Options controlling pagination behavior.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct LayoutOpts {
    /// Consecutive zero-progress calls tolerated per node before aborting.
    pub max_stalled_calls: u32,
    /// Extra height given to a balanced span. `None` uses one default line height.
    pub balance_slack: Option<Length>,
    /// Also balance the last multi-column span when the flow completes.
    pub balance_final_span: bool,
    /// Tie-break among equally valid "last" markers.
    pub last_marker_tie_break: MarkerTieBreak,
}

impl Default for LayoutOpts {
    fn default() -> Self {
        Self {
            max_stalled_calls: 16,
            balance_slack: None,
            balance_final_span: true,
            last_marker_tie_break: MarkerTieBreak::Latest,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    Warning,
    Info,
}

/// A recoverable condition reported while layout continues.
#[derive(Clone, Debug, PartialEq, serde::Serialize)]
pub struct Diagnostic {
    pub severity: Severity,
    pub message: String,
    pub location: SourceLocation,
    /// Page being laid out when the condition was seen.
    pub page: u32,
}

/// Counters accumulated over a pagination run.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct LayoutCounters {
    pub rollbacks: u32,
    pub keep_rollbacks: u32,
}

/// Document-wide state shared by every layout call.
pub struct LayoutEnv {
    pub ids: IdReferenceTable,
    pub history: MarkerHistory,
    pub opts: LayoutOpts,
    pub metrics: Box<dyn FontMetricsProvider>,
    pub diagnostics: Vec<Diagnostic>,
    pub counters: LayoutCounters,
}

impl std::fmt::Debug for LayoutEnv {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LayoutEnv")
            .field("ids", &self.ids.len())
            .field("history_pages", &self.history.len())
            .field("opts", &self.opts)
            .field("diagnostics", &self.diagnostics.len())
            .finish()
    }
}

impl LayoutEnv {
    pub fn new(opts: LayoutOpts) -> Self {
        Self::with_metrics(opts, Box::new(FixedMetrics::default()))
    }

    pub fn with_metrics(opts: LayoutOpts, metrics: Box<dyn FontMetricsProvider>) -> Self {
        Self {
            ids: IdReferenceTable::new(),
            history: MarkerHistory::new(),
            opts,
            metrics,
            diagnostics: Vec::new(),
            counters: LayoutCounters::default(),
        }
    }

    /// Record a diagnostic, logging it at the matching level.
    pub fn report(
        &mut self,
        severity: Severity,
        message: impl Into<String>,
        location: &SourceLocation,
        page: u32,
    ) {
        let message = message.into();
        match severity {
            Severity::Warning => tracing::warn!(page, %location, "{message}"),
            Severity::Info => tracing::info!(page, %location, "{message}"),
        }
        self.diagnostics.push(Diagnostic {
            severity,
            message,
            location: location.clone(),
            page,
        });
    }

    /// Slack added to balanced spans.
    pub fn balance_slack(&self) -> Length {
        self.opts.balance_slack.unwrap_or_else(|| {
            self.metrics
                .line_height(self.metrics.default_font_size())
        })
    }
}

/// Restore point for the page marker list and the id table.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct LayoutCheckpoint {
    pub(crate) markers: usize,
    pub(crate) ids: IdCheckpoint,
}

/// Per-page context passed explicitly through every layout call.
pub struct LayoutContext<'a> {
    pub page_number: u32,
    pub sequence: usize,
    pub markers: &'a mut MarkerRegistry,
    pub env: &'a mut LayoutEnv,
    /// Nesting depth of retrieve-marker replays in progress.
    pub(crate) replay_depth: u32,
}

impl<'a> LayoutContext<'a> {
    pub fn new(
        page_number: u32,
        sequence: usize,
        markers: &'a mut MarkerRegistry,
        env: &'a mut LayoutEnv,
    ) -> Self {
        Self {
            page_number,
            sequence,
            markers,
            env,
            replay_depth: 0,
        }
    }

    /// Whether layout is currently replaying retrieved marker content.
    pub fn is_replaying(&self) -> bool {
        self.replay_depth > 0
    }

    pub fn checkpoint(&self) -> LayoutCheckpoint {
        LayoutCheckpoint {
            markers: self.markers.len(),
            ids: self.env.ids.checkpoint(),
        }
    }

    pub fn restore(&mut self, cp: LayoutCheckpoint) {
        self.markers.truncate(cp.markers);
        self.env.ids.restore(cp.ids);
    }

    /// Report a recoverable policy mismatch and keep going.
    pub fn warn(&mut self, message: impl Into<String>, location: &SourceLocation) {
        let page = self.page_number;
        self.env.report(Severity::Warning, message, location, page);
    }
}

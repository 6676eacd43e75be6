use crate::{
    area::ids::IdReferenceTable,
    area::page::{FinishedPage, Page},
    content::def::{PageGeometry, RegionName},
    content::document::Document,
    content::metrics::FontMetricsProvider,
    content::model::ContentTree,
    foundation::error::{LayoutResult, SourceLocation},
    foundation::ids::NodeId,
    layout::context::{Diagnostic, LayoutContext, LayoutEnv, LayoutOpts, Severity},
    layout::engine,
    layout::flow::layout_flow,
    layout::status::{PageParity, Status},
    marker::registry::MarkerHistory,
    session::sink::{InMemorySink, PageSink, SinkConfig},
};

/// Pagination run statistics.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct PaginationStats {
    /// Pages handed to the sink, blank pages included.
    pub pages: u32,
    /// Pages inserted only to satisfy an odd/even page break.
    pub blank_pages: u32,
    /// Span rollbacks performed by column balancing.
    pub rollbacks: u32,
}

#[derive(Clone, Debug)]
struct SequencePlan {
    geometry: PageGeometry,
    initial_page_number: Option<u32>,
    flow: NodeId,
    statics: Vec<(RegionName, NodeId)>,
}

/// The pagination driver.
///
/// Builds one content tree for the whole document up front, then re-invokes each sequence's
/// flow with a fresh page until the flow reports completion.
pub struct Paginator {
    tree: ContentTree,
    sequences: Vec<SequencePlan>,
    env: LayoutEnv,
}

impl std::fmt::Debug for Paginator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Paginator")
            .field("nodes", &self.tree.len())
            .field("sequences", &self.sequences.len())
            .field("env", &self.env)
            .finish()
    }
}

impl Paginator {
    /// Build the content tree for `doc`.
    pub fn new(doc: &Document, opts: LayoutOpts) -> LayoutResult<Self> {
        doc.validate()?;
        let mut tree = ContentTree::new();
        let mut sequences = Vec::with_capacity(doc.def().page_sequences.len());
        for seq in &doc.def().page_sequences {
            let flow = tree.insert(&seq.flow, None)?;
            let statics = seq
                .static_content
                .iter()
                .map(|s| Ok((s.region, tree.insert(&s.content, None)?)))
                .collect::<LayoutResult<Vec<_>>>()?;
            sequences.push(SequencePlan {
                geometry: seq.page,
                initial_page_number: seq.initial_page_number,
                flow,
                statics,
            });
        }
        Ok(Self {
            tree,
            sequences,
            env: LayoutEnv::new(opts),
        })
    }

    /// Replace the metrics used for line-height defaults and balancing slack.
    pub fn with_metrics(mut self, metrics: Box<dyn FontMetricsProvider>) -> Self {
        self.env.metrics = metrics;
        self
    }

    pub fn opts(&self) -> &LayoutOpts {
        &self.env.opts
    }

    /// Recoverable conditions seen during the last run.
    pub fn diagnostics(&self) -> &[Diagnostic] {
        &self.env.diagnostics
    }

    /// Ids registered during the last run, with the page each first landed on.
    pub fn ids(&self) -> &IdReferenceTable {
        &self.env.ids
    }

    /// Marker records of every page of the last run.
    pub fn history(&self) -> &MarkerHistory {
        &self.env.history
    }

    pub fn tree(&self) -> &ContentTree {
        &self.tree
    }

    /// Paginate the whole document into `sink`.
    ///
    /// Any fatal layout error aborts the document; pages already pushed stay with the sink.
    #[tracing::instrument(skip_all, fields(sequences = self.sequences.len()))]
    pub fn run(&mut self, sink: &mut dyn PageSink) -> LayoutResult<PaginationStats> {
        self.reset();
        let result = self.run_inner(sink);
        if let Err(e) = &result {
            tracing::error!(error = %e, "pagination aborted");
        }
        result
    }

    /// Paginate into memory and return the finished pages.
    pub fn paginate(doc: &Document, opts: LayoutOpts) -> LayoutResult<Vec<FinishedPage>> {
        let mut sink = InMemorySink::new();
        Self::new(doc, opts)?.run(&mut sink)?;
        Ok(sink.pages)
    }

    fn reset(&mut self) {
        for plan in &self.sequences {
            self.tree.reset_subtree(plan.flow);
            for &(_, root) in &plan.statics {
                self.tree.reset_subtree(root);
            }
        }
        self.env.ids = IdReferenceTable::new();
        self.env.history = MarkerHistory::new();
        self.env.diagnostics.clear();
        self.env.counters = Default::default();
    }

    fn run_inner(&mut self, sink: &mut dyn PageSink) -> LayoutResult<PaginationStats> {
        let Self {
            tree,
            sequences,
            env,
        } = self;
        sink.begin(SinkConfig {
            sequences: sequences.len(),
        })?;

        let mut stats = PaginationStats::default();
        let mut next_number = 1u32;
        for (index, plan) in sequences.iter().enumerate() {
            let mut number = plan.initial_page_number.unwrap_or(next_number);
            let statics = usable_statics(tree, env, plan, index, number);
            let mut parity: Option<(PageParity, Status)> = None;
            tracing::debug!(sequence = index, first_page = number, "page sequence start");

            loop {
                if let Some((want, status)) = parity.take()
                    && !want.matches(number)
                {
                    let mut page = Page::blank(number, index, plan.geometry);
                    layout_static(tree, env, &mut page, &statics)?;
                    env.report(
                        Severity::Info,
                        format!("blank page {number} inserted for {status}"),
                        &SourceLocation::default(),
                        number,
                    );
                    emit(env, sink, page, status)?;
                    stats.pages += 1;
                    stats.blank_pages += 1;
                    number += 1;
                }

                let mut page = Page::new(number, index, plan.geometry);
                let status = {
                    let Page { body, markers, .. } = &mut page;
                    let mut ctx = LayoutContext::new(number, index, markers, env);
                    layout_flow(tree, plan.flow, body, &mut ctx)?
                };
                layout_static(tree, env, &mut page, &statics)?;
                emit(env, sink, page, status)?;
                stats.pages += 1;
                number += 1;

                if tree.cursor(plan.flow).is_complete() {
                    break;
                }
                parity = status.page_parity().map(|p| (p, status));
            }
            next_number = number;
        }

        sink.end()?;
        stats.rollbacks = env.counters.rollbacks;
        tracing::debug!(
            pages = stats.pages,
            blank = stats.blank_pages,
            rollbacks = stats.rollbacks,
            keep_rollbacks = env.counters.keep_rollbacks,
            "pagination finished"
        );
        Ok(stats)
    }
}

/// Static content whose region has room on the page; the rest is reported and dropped.
fn usable_statics(
    tree: &ContentTree,
    env: &mut LayoutEnv,
    plan: &SequencePlan,
    sequence: usize,
    first_page: u32,
) -> Vec<(RegionName, NodeId)> {
    let g = &plan.geometry;
    plan.statics
        .iter()
        .copied()
        .filter(|&(region, root)| {
            let extent = match region {
                RegionName::RegionBefore => g.before_extent,
                RegionName::RegionAfter => g.after_extent,
            };
            if extent > 0.0 {
                return true;
            }
            env.report(
                Severity::Warning,
                format!(
                    "static content for {region:?} in sequence {sequence} has no region extent; \
                     skipped"
                ),
                tree.location(root),
                first_page,
            );
            false
        })
        .collect()
}

/// Lay out every static region of `page` from scratch.
///
/// Static content repeats on every page, so its ids and markers are not kept.
fn layout_static(
    tree: &mut ContentTree,
    env: &mut LayoutEnv,
    page: &mut Page,
    statics: &[(RegionName, NodeId)],
) -> LayoutResult<()> {
    let Page {
        number,
        sequence,
        before,
        after,
        markers,
        ..
    } = page;
    for &(region, root) in statics {
        tree.reset_subtree(root);
        let area = match region {
            RegionName::RegionBefore => &mut *before,
            RegionName::RegionAfter => &mut *after,
        };
        let mut ctx = LayoutContext::new(*number, *sequence, markers, env);
        let cp = ctx.checkpoint();
        let status = engine::layout(tree, root, area, &mut ctx)?;
        ctx.restore(cp);
        if status.is_incomplete() {
            ctx.warn(
                format!("static content does not fit {region:?}; truncated"),
                tree.location(root),
            );
        }
    }
    Ok(())
}

fn emit(
    env: &mut LayoutEnv,
    sink: &mut dyn PageSink,
    page: Page,
    status: Status,
) -> LayoutResult<()> {
    let (number, sequence) = (page.number, page.sequence);
    let (finished, markers) = page.finish(status);
    env.history.push_page(number, sequence, markers);
    tracing::debug!(page = number, %status, "page finished");
    sink.push_page(finished)
}

#[cfg(test)]
#[path = "../../tests/unit/session/paginator.rs"]
mod tests;

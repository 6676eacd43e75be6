use std::io::Write;

use crate::area::page::FinishedPage;
use crate::foundation::error::{LayoutError, LayoutResult};

/// Configuration provided to a [`PageSink`] at the start of a pagination run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SinkConfig {
    /// Number of page sequences in the document.
    pub sequences: usize,
}

/// Sink contract for consuming finished pages in document order.
///
/// Ordering contract: `push_page` is called once per page, in output order, after the page's
/// flow pass and static content are complete.
pub trait PageSink {
    fn begin(&mut self, cfg: SinkConfig) -> LayoutResult<()>;
    fn push_page(&mut self, page: FinishedPage) -> LayoutResult<()>;
    fn end(&mut self) -> LayoutResult<()>;
}

/// In-memory sink for tests and debugging.
#[derive(Debug, Default)]
pub struct InMemorySink {
    cfg: Option<SinkConfig>,
    /// Pages in output order.
    pub pages: Vec<FinishedPage>,
    ended: bool,
}

impl InMemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn config(&self) -> Option<SinkConfig> {
        self.cfg
    }

    /// Whether `end` was called.
    pub fn is_finished(&self) -> bool {
        self.ended
    }
}

impl PageSink for InMemorySink {
    fn begin(&mut self, cfg: SinkConfig) -> LayoutResult<()> {
        self.cfg = Some(cfg);
        self.pages.clear();
        self.ended = false;
        Ok(())
    }

    fn push_page(&mut self, page: FinishedPage) -> LayoutResult<()> {
        self.pages.push(page);
        Ok(())
    }

    fn end(&mut self) -> LayoutResult<()> {
        self.ended = true;
        Ok(())
    }
}

/// Streams pages as one JSON array, writing each page as soon as it is finished.
#[derive(Debug)]
pub struct JsonSink<W: Write> {
    out: W,
    written: usize,
}

impl<W: Write> JsonSink<W> {
    pub fn new(out: W) -> Self {
        Self { out, written: 0 }
    }

    /// Pages written so far.
    pub fn pages_written(&self) -> usize {
        self.written
    }

    pub fn into_inner(self) -> W {
        self.out
    }

    fn io(e: std::io::Error) -> LayoutError {
        LayoutError::Other(anyhow::Error::new(e).context("write page JSON"))
    }
}

impl<W: Write> PageSink for JsonSink<W> {
    fn begin(&mut self, _cfg: SinkConfig) -> LayoutResult<()> {
        self.written = 0;
        self.out.write_all(b"[\n").map_err(Self::io)
    }

    fn push_page(&mut self, page: FinishedPage) -> LayoutResult<()> {
        if self.written > 0 {
            self.out.write_all(b",\n").map_err(Self::io)?;
        }
        serde_json::to_writer(&mut self.out, &page)
            .map_err(|e| LayoutError::serde(format!("serialize page {}: {e}", page.number)))?;
        self.written += 1;
        Ok(())
    }

    fn end(&mut self) -> LayoutResult<()> {
        self.out.write_all(b"\n]\n").map_err(Self::io)?;
        self.out.flush().map_err(Self::io)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/session/sink.rs"]
mod tests;

/// Session log of committed view operations
///
/// Every committed change to a panel (zoom, view moves, split/stack, scaling,
/// peak lists, integrals, measurements) is recorded with:
/// - Sequence number
/// - Timestamp
/// - Operation name
/// - Description with the values involved
///
/// The log can be exported as human-readable text or JSON.
use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::error::Result;
use crate::view::graph_set::ViewEvent;

/// A single recorded operation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogEntry {
    /// Sequential operation number (1-based)
    pub sequence: usize,
    pub timestamp: DateTime<Local>,
    pub operation: String,
    pub description: String,
}

impl LogEntry {
    pub fn to_text(&self) -> String {
        format!(
            "[{:03}] {} | {} | {}",
            self.sequence,
            self.timestamp.format("%Y-%m-%d %H:%M:%S"),
            self.operation,
            self.description
        )
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionLog {
    pub session_id: String,
    pub session_start: DateTime<Local>,
    pub software_version: String,
    pub entries: Vec<LogEntry>,
}

impl SessionLog {
    pub fn new() -> Self {
        Self {
            session_id: uuid::Uuid::new_v4().to_string(),
            session_start: Local::now(),
            software_version: env!("CARGO_PKG_VERSION").to_string(),
            entries: Vec::new(),
        }
    }

    pub fn add_entry(&mut self, operation: &str, description: &str) {
        let seq = self.entries.len() + 1;
        self.entries.push(LogEntry {
            sequence: seq,
            timestamp: Local::now(),
            operation: operation.to_string(),
            description: description.to_string(),
        });
        log::info!("[LOG {:03}] {}: {}", seq, operation, description);
    }

    /// Record a view event of graph set `set`. Selection changes are not
    /// operations and are skipped; returns whether an entry was added.
    pub fn record(&mut self, set: usize, event: &ViewEvent) -> bool {
        let (operation, description) = match event {
            ViewEvent::Zoomed { min_x, max_x } => {
                ("Zoom", format!("set {}: x {:.4} to {:.4}", set, min_x, max_x))
            }
            ViewEvent::ViewMoved { index } => ("View", format!("set {}: history entry {}", set, index)),
            ViewEvent::ViewsCleared => ("Reset views", format!("set {}: history cleared", set)),
            ViewEvent::SplitChanged { n_split } => {
                let what = if *n_split > 1 { "split" } else { "stacked" };
                ("Split/stack", format!("set {}: {} ({} slices)", set, what, n_split))
            }
            ViewEvent::Scaled { factor } => ("Scale", format!("set {}: y factor {:.4}", set, factor)),
            ViewEvent::ScalesReset => ("Reset scales", format!("set {}: all factors 1", set)),
            ViewEvent::PeaksComputed { spectrum, count } => (
                "Peak list",
                format!("spectrum {}: {} peaks", spectrum, count),
            ),
            ViewEvent::IntegralAdded { spectrum, x1, x2 } => (
                "Integral",
                format!("spectrum {}: {:.4} to {:.4}", spectrum, x1.min(*x2), x1.max(*x2)),
            ),
            ViewEvent::MeasurementStored { spectrum, text } => {
                ("Measurement", format!("spectrum {}: {}", spectrum, text))
            }
            ViewEvent::AnnotationAdded { text } => ("Annotation", format!("set {}: '{}'", set, text)),
            ViewEvent::SpectrumSelected(_) => return false,
        };
        self.add_entry(operation, &description);
        true
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    pub fn to_text(&self) -> String {
        let mut out = String::new();
        out.push_str("═══════════════════════════════════════════════════════════════\n");
        out.push_str("  Spectral View Session Log\n");
        out.push_str("═══════════════════════════════════════════════════════════════\n");
        out.push_str(&format!("  Session ID:  {}\n", self.session_id));
        out.push_str(&format!(
            "  Started:     {}\n",
            self.session_start.format("%Y-%m-%d %H:%M:%S")
        ));
        out.push_str(&format!("  Software:    spectral_view v{}\n", self.software_version));
        out.push_str(&format!("  Operations:  {}\n", self.entries.len()));
        out.push_str("───────────────────────────────────────────────────────────────\n\n");

        for entry in &self.entries {
            out.push_str(&entry.to_text());
            out.push('\n');
        }
        out
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn save_text(&self, path: &Path) -> Result<()> {
        std::fs::write(path, self.to_text())?;
        Ok(())
    }

    pub fn save_json(&self, path: &Path) -> Result<()> {
        std::fs::write(path, self.to_json()?)?;
        Ok(())
    }
}

impl Default for SessionLog {
    fn default() -> Self {
        Self::new()
    }
}

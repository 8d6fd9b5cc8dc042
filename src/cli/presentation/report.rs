//! Batch run report: one status line per node plus a summary.

/// Outcome of a batch command
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BatchReport {
    pub lines: Vec<String>,
    pub succeeded: usize,
    pub failed: usize,
}

impl BatchReport {
    /// Record operation output (if any) for a node that succeeded.
    pub fn success(&mut self, path: &str, output: Option<String>) {
        match output {
            Some(text) => self.lines.push(text),
            None => self.lines.push(format!("{}: OK", path)),
        }
        self.succeeded += 1;
    }

    pub fn failure(&mut self, path: &str, reason: &str) {
        self.lines.push(format!("{}: ERROR ({})", path, reason));
        self.failed += 1;
    }

    pub fn has_failures(&self) -> bool {
        self.failed > 0
    }
}

pub fn format_batch_report(report: &BatchReport) -> String {
    let mut out = report.lines.join("\n");
    if !out.is_empty() {
        out.push('\n');
    }
    out.push_str(&format!(
        "Operation complete.  Nodes succeeded: {}  Nodes failed: {}",
        report.succeeded, report.failed
    ));
    out
}

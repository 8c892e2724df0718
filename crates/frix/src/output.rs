//! Render-pass reporting on stderr.
//!
//! Page listings and failures go to the terminal for the person running the
//! command; structured events go through `tracing`.

use console::{Style, Term};
use frix_site::PageFailure;

/// Writes render-pass reports to stderr.
pub(crate) struct Output {
    term: Term,
    green: Style,
    yellow: Style,
    red: Style,
    cyan_bold: Style,
}

impl Output {
    #[must_use]
    pub(crate) fn new() -> Self {
        Self {
            term: Term::stderr(),
            green: Style::new().green(),
            yellow: Style::new().yellow(),
            red: Style::new().red(),
            cyan_bold: Style::new().cyan().bold(),
        }
    }

    /// `label: value` line, uncoloured.
    pub(crate) fn field(&self, label: &str, value: &str) {
        self.line(&format!("{label}: {value}"));
    }

    /// Rendered page and the file it was written to.
    pub(crate) fn page(&self, url: &str, filename: &str) {
        self.line(&format!("  {url} -> {filename}"));
    }

    /// Page dropped from the pass, in yellow.
    pub(crate) fn failure(&self, failure: &PageFailure) {
        self.line(
            &self.yellow
                .apply_to(format!("  {}: {}", failure.url, failure.reason))
                .to_string(),
        );
    }

    /// Pass totals; green when every page rendered, yellow otherwise.
    pub(crate) fn summary(&self, rendered: usize, failed: usize) {
        let style = if failed == 0 { &self.green } else { &self.yellow };
        self.line(
            &style
                .apply_to(summary_text(rendered, failed))
                .to_string(),
        );
    }

    /// Where the results can be found, in cyan.
    pub(crate) fn location(&self, msg: &str) {
        self.line(&self.cyan_bold.apply_to(msg).to_string());
    }

    /// Fatal error, in red.
    pub(crate) fn error(&self, msg: &str) {
        self.line(&self.red.apply_to(msg).to_string());
    }

    fn line(&self, msg: &str) {
        let _ = self.term.write_line(msg);
    }
}

fn summary_text(rendered: usize, failed: usize) -> String {
    let pages = if rendered == 1 { "page" } else { "pages" };
    format!("Rendered {rendered} {pages}, {failed} failed")
}

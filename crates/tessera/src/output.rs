//! Terminal reporting for the CLI commands.
//!
//! Everything goes to stderr so `tessera build` can stream HTML on stdout.

use std::fmt::Display;

use console::{Style, Term};

/// Width of the label column in [`Output::field`] lines.
const LABEL_WIDTH: usize = 12;

pub(crate) struct Output {
    term: Term,
    ok: Style,
    fail: Style,
    heading: Style,
    label: Style,
}

impl Output {
    #[must_use]
    pub(crate) fn new() -> Self {
        Self {
            term: Term::stderr(),
            ok: Style::new().green(),
            fail: Style::new().red(),
            heading: Style::new().cyan().bold(),
            label: Style::new().dim(),
        }
    }

    fn line(&self, text: &str) {
        let _ = self.term.write_line(text);
    }

    /// Section heading, e.g. `Checking definitions/`.
    pub(crate) fn heading(&self, text: impl Display) {
        self.line(&self.heading.apply_to(text).to_string());
    }

    /// Aligned `label  value` line for startup summaries.
    pub(crate) fn field(&self, label: &str, value: impl Display) {
        let label = format!("{label:<LABEL_WIDTH$}");
        self.line(&format!("  {} {value}", self.label.apply_to(label)));
    }

    /// One line per checked definition.
    pub(crate) fn check_result(&self, name: &dyn Display, failure: Option<&dyn Display>) {
        let line = check_line(name, failure);
        let style = if failure.is_some() { &self.fail } else { &self.ok };
        self.line(&style.apply_to(line).to_string());
    }

    /// A completed step, e.g. a written output file.
    pub(crate) fn done(&self, text: impl Display) {
        self.line(&self.ok.apply_to(text).to_string());
    }

    /// Plain note without styling.
    pub(crate) fn note(&self, text: impl Display) {
        self.line(&text.to_string());
    }

    /// Terminal error for a failed command.
    pub(crate) fn failure(&self, err: impl Display) {
        self.line(&self.fail.apply_to(format!("Error: {err}")).to_string());
    }
}

fn check_line(name: &dyn Display, failure: Option<&dyn Display>) -> String {
    match failure {
        None => format!("  ok    {name}"),
        Some(error) => format!("  FAIL  {name}: {error}"),
    }
}

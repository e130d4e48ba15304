//! Parse diagnostics and their terminal rendering.

use std::fmt;
use std::ops::Range;

use ariadne::{Color, Label, Report, ReportKind, Source};

/// How serious a diagnostic is.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    /// The document contains content that could not be understood.
    Error,
    /// The document was understood, but probably not as the author meant.
    Warning,
}

impl Severity {
    fn report_kind(self) -> ReportKind<'static> {
        match self {
            Self::Error => ReportKind::Error,
            Self::Warning => ReportKind::Warning,
        }
    }

    fn color(self) -> Color {
        match self {
            Self::Error => Color::Red,
            Self::Warning => Color::Yellow,
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Error => write!(f, "error"),
            Self::Warning => write!(f, "warning"),
        }
    }
}

/// A problem found while parsing a story, located by byte span.
#[derive(Debug, Clone, PartialEq)]
pub struct Diagnostic {
    /// How serious the problem is.
    pub severity: Severity,
    /// Byte range in the source document.
    pub span: Range<usize>,
    /// Headline message.
    pub message: String,
    /// Text attached to the highlighted span; the message is used when absent.
    pub label: Option<String>,
    /// Other places in the document that explain the problem.
    pub related: Vec<(Range<usize>, String)>,
}

impl Diagnostic {
    fn new(severity: Severity, span: Range<usize>, message: impl Into<String>) -> Self {
        Self {
            severity,
            span,
            message: message.into(),
            label: None,
            related: Vec::new(),
        }
    }

    /// Create an error.
    pub fn error(span: Range<usize>, message: impl Into<String>) -> Self {
        Self::new(Severity::Error, span, message)
    }

    /// Create a warning.
    pub fn warning(span: Range<usize>, message: impl Into<String>) -> Self {
        Self::new(Severity::Warning, span, message)
    }

    /// Attach text to the primary span.
    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    /// Point at a second span, such as an earlier declaration.
    pub fn with_related(mut self, span: Range<usize>, label: impl Into<String>) -> Self {
        self.related.push((span, label.into()));
        self
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.severity, self.message)
    }
}

/// Count line such as `1 error, 2 warnings`, or `None` when there is nothing to report.
pub fn summary(diagnostics: &[Diagnostic]) -> Option<String> {
    fn plural(n: usize, word: &str) -> String {
        format!("{n} {word}{}", if n == 1 { "" } else { "s" })
    }

    let errors = diagnostics.iter().filter(|d| d.severity == Severity::Error).count();
    let warnings = diagnostics.len() - errors;
    match (errors, warnings) {
        (0, 0) => None,
        (0, w) => Some(plural(w, "warning")),
        (e, w) => Some(format!("{}, {}", plural(e, "error"), plural(w, "warning"))),
    }
}

/// Render diagnostics using ariadne for pretty terminal output.
pub fn render_diagnostics(source: &str, filename: &str, diagnostics: &[Diagnostic]) -> String {
    let mut output = Vec::new();

    for diag in diagnostics {
        let label = Label::new((filename, diag.span.clone()))
            .with_message(diag.label.as_deref().unwrap_or(&diag.message))
            .with_color(diag.severity.color());
        let mut report = Report::build(diag.severity.report_kind(), (filename, diag.span.clone()))
            .with_message(&diag.message)
            .with_label(label);
        for (span, text) in &diag.related {
            report = report.with_label(
                Label::new((filename, span.clone()))
                    .with_message(text)
                    .with_color(Color::Blue),
            );
        }

        report
            .finish()
            .write((filename, Source::from(source)), &mut output)
            .ok();
    }

    String::from_utf8(output).unwrap_or_default()
}

//! Issue reporter - an append-only collection of diagnostics produced while
//! walking a schema source tree. Diagnostics are collected, never thrown;
//! only a `ValidationError` from the governor unwinds a validator.

use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Info,
    Warning,
    Error,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Issue {
    pub severity: Severity,
    pub line: usize,
    pub column: Option<usize>,
    pub message: String,
    pub node_kind: String,
    pub suggestion: Option<String>,
}

impl Issue {
    /// A diagnostic with no source location, used for file-level failures
    /// (parse errors, missing imports, governor faults at the top level).
    pub fn file_level(message: impl Into<String>, severity: Severity) -> Self {
        Self {
            severity,
            line: 1,
            column: Some(0),
            message: message.into(),
            node_kind: "Program".to_string(),
            suggestion: None,
        }
    }
}

#[derive(Debug, Default)]
pub struct IssueReporter {
    issues: Vec<Issue>,
}

impl IssueReporter {
    pub fn new() -> Self {
        Self::default()
    }

    #[allow(clippy::too_many_arguments)]
    pub fn report(
        &mut self,
        line: usize,
        column: Option<usize>,
        message: impl Into<String>,
        node_kind: impl Into<String>,
        severity: Severity,
        suggestion: Option<String>,
    ) {
        self.issues.push(Issue {
            severity,
            line,
            column,
            message: message.into(),
            node_kind: node_kind.into(),
            suggestion,
        });
    }

    pub fn push(&mut self, issue: Issue) {
        self.issues.push(issue);
    }

    pub fn issues(&self) -> &[Issue] {
        &self.issues
    }

    pub fn by_severity(&self, severity: Severity) -> Vec<&Issue> {
        self.issues.iter().filter(|i| i.severity == severity).collect()
    }

    pub fn has_errors(&self) -> bool {
        self.issues.iter().any(|i| i.severity == Severity::Error)
    }

    pub fn clear(&mut self) {
        self.issues.clear();
    }

    pub fn formatted_report(&self) -> String {
        let mut out = String::new();
        for issue in &self.issues {
            let sev = match issue.severity {
                Severity::Error => "ERROR",
                Severity::Warning => "WARNING",
                Severity::Info => "INFO",
            };
            let col = issue.column.map(|c| c.to_string()).unwrap_or_default();
            out.push_str(&format!(
                "{}: {} ({}) at {}:{}\n",
                sev, issue.message, issue.node_kind, issue.line, col
            ));
            if let Some(suggestion) = &issue.suggestion {
                out.push_str(&format!("  suggestion: {}\n", suggestion));
            }
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn has_errors_reflects_severity() {
        let mut reporter = IssueReporter::new();
        assert!(!reporter.has_errors());
        reporter.report(1, Some(2), "warn", "ObjectExpression", Severity::Warning, None);
        assert!(!reporter.has_errors());
        reporter.report(3, None, "boom", "CallExpression", Severity::Error, None);
        assert!(reporter.has_errors());
        assert_eq!(reporter.issues().len(), 2);
    }

    #[test]
    fn by_severity_filters() {
        let mut reporter = IssueReporter::new();
        reporter.report(1, None, "a", "X", Severity::Error, None);
        reporter.report(2, None, "b", "X", Severity::Warning, None);
        reporter.report(3, None, "c", "X", Severity::Error, None);
        assert_eq!(reporter.by_severity(Severity::Error).len(), 2);
        assert_eq!(reporter.by_severity(Severity::Warning).len(), 1);
    }

    #[test]
    fn clear_empties_the_reporter() {
        let mut reporter = IssueReporter::new();
        reporter.report(1, None, "a", "X", Severity::Error, None);
        reporter.clear();
        assert!(reporter.issues().is_empty());
        assert!(!reporter.has_errors());
    }

    #[test]
    fn formatted_report_includes_suggestion() {
        let mut reporter = IssueReporter::new();
        reporter.report(
            4,
            Some(5),
            "Method not allowed in chain: foo",
            "CallExpression",
            Severity::Error,
            Some("Use only allowed Zod methods".to_string()),
        );
        let rendered = reporter.formatted_report();
        assert!(rendered.contains("ERROR: Method not allowed in chain: foo"));
        assert!(rendered.contains("at 4:5"));
        assert!(rendered.contains("suggestion: Use only allowed Zod methods"));
    }
}

//! Cargo-style diagnostic rendering for a validation run.

use std::io::{self, Write};

use colored::Colorize;
use unicode_width::UnicodeWidthStr;

use crate::issues::{Issue, Severity};

pub fn report(source: &str, issues: &[Issue]) {
    report_to(source, issues, &mut io::stderr().lock());
}

pub fn report_to<W: Write>(source: &str, issues: &[Issue], writer: &mut W) {
    if issues.is_empty() {
        return;
    }

    let lines: Vec<&str> = source.lines().collect();
    let max_line_width = issues
        .iter()
        .map(|issue| issue.line.to_string().len())
        .max()
        .unwrap_or(1);

    for issue in issues {
        print_issue(issue, &lines, writer, max_line_width);
    }
}

fn print_issue<W: Write>(issue: &Issue, lines: &[&str], writer: &mut W, max_line_width: usize) {
    let severity_str = match issue.severity {
        Severity::Error => "error".bold().red(),
        Severity::Warning => "warning".bold().yellow(),
        Severity::Info => "info".bold().cyan(),
    };

    let _ = writeln!(writer, "{}: {} ({})", severity_str, issue.message, issue.node_kind.dimmed());
    let col = issue.column.unwrap_or(0);
    let _ = writeln!(writer, "  {} {}:{}", "-->".blue(), issue.line, col);

    if let Some(source_line) = lines.get(issue.line.saturating_sub(1)) {
        let _ = writeln!(writer, "{:>width$} {}", "", "|".blue(), width = max_line_width);
        let _ = writeln!(
            writer,
            "{:>width$} {} {}",
            issue.line.to_string().blue(),
            "|".blue(),
            source_line,
            width = max_line_width
        );

        let prefix = if col > 1 {
            source_line.chars().take(col - 1).collect::<String>()
        } else {
            String::new()
        };
        let caret_padding = UnicodeWidthStr::width(prefix.as_str());
        let caret = match issue.severity {
            Severity::Error => "^".red(),
            Severity::Warning => "^".yellow(),
            Severity::Info => "^".cyan(),
        };
        let _ = writeln!(
            writer,
            "{:>width$} {} {:>padding$}{}",
            "",
            "|".blue(),
            "",
            caret,
            width = max_line_width,
            padding = caret_padding
        );
    }

    if let Some(suggestion) = &issue.suggestion {
        let _ = writeln!(writer, "{:>width$} {} {}", "", "=".blue(), format!("hint: {}", suggestion).bold(), width = max_line_width);
    }

    let _ = writeln!(writer);
}

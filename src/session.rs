//! Per-run state shared by every validator: the governor, the issue
//! reporter, the source map needed to turn a span into a line/column, and
//! the Object Validator's node-identity result cache. One `Session` backs
//! exactly one `validate_schema` call.

use std::collections::HashMap;
use std::sync::Arc;

use swc_common::{SourceMap, Span};

use crate::config::Config;
use crate::governor::Governor;
use crate::issues::{Issue, IssueReporter, Severity};

pub struct Session<'c> {
    pub governor: Governor<'c>,
    pub issues: IssueReporter,
    pub source_map: Arc<SourceMap>,
    pub config: &'c Config,
    object_cache: HashMap<usize, bool>,
}

impl<'c> Session<'c> {
    pub fn new(config: &'c Config, source_map: Arc<SourceMap>) -> Self {
        Self {
            governor: Governor::new(config),
            issues: IssueReporter::new(),
            source_map,
            config,
            object_cache: HashMap::new(),
        }
    }

    /// Resolve a span to a 1-based `(line, column)` pair via the source map.
    pub fn loc(&self, span: Span) -> (usize, Option<usize>) {
        let loc = self.source_map.lookup_char_pos(span.lo);
        (loc.line, Some(loc.col.0 + 1))
    }

    pub fn report(
        &mut self,
        span: Span,
        message: impl Into<String>,
        node_kind: impl Into<String>,
        severity: Severity,
        suggestion: Option<String>,
    ) {
        let (line, column) = self.loc(span);
        self.issues.report(line, column, message, node_kind, severity, suggestion);
    }

    pub fn report_error(&mut self, span: Span, message: impl Into<String>, node_kind: impl Into<String>) {
        self.report(span, message, node_kind, Severity::Error, None);
    }

    pub fn report_warning(&mut self, span: Span, message: impl Into<String>, node_kind: impl Into<String>) {
        self.report(span, message, node_kind, Severity::Warning, None);
    }

    /// A diagnostic with no real span, used for parse failures and other
    /// file-level faults.
    pub fn report_file(&mut self, message: impl Into<String>) {
        self.issues.push(Issue::file_level(message, Severity::Error));
    }

    /// Object Validator memoization, keyed on the borrowed node's address.
    /// Scoped to this session; never persisted across runs.
    pub fn cached_object_result(&self, key: usize) -> Option<bool> {
        if self.config.enable_caching {
            self.object_cache.get(&key).copied()
        } else {
            None
        }
    }

    pub fn cache_object_result(&mut self, key: usize, result: bool) {
        if self.config.enable_caching {
            self.object_cache.insert(key, result);
        }
    }
}

//! User-facing failure notifications
//!
//! Flows never return request failures. They hand a title/message pair to an
//! [`ErrorReporter`] and stop.

use crate::util::truncate_utf8_safe;
use std::sync::{Arc, Mutex};

/// Longest message body written to the log line
const MAX_LOGGED_MESSAGE: usize = 512;

/// Tracing target of report records. The stderr log layer skips it since
/// the reporter already prints the report there.
pub const REPORT_TARGET: &str = "photometer::report";

/// Surface a failure to the user
pub trait ErrorReporter: Send + Sync {
    fn oops(&self, title: &str, message: &str);
}

impl<R: ErrorReporter> ErrorReporter for Arc<R> {
    fn oops(&self, title: &str, message: &str) {
        (**self).oops(title, message)
    }
}

/// Reporter for terminal use: prints to stderr and records a warning for the
/// file log
#[derive(Debug, Default, Clone)]
pub struct TracingReporter;

impl ErrorReporter for TracingReporter {
    fn oops(&self, title: &str, message: &str) {
        tracing::warn!(
            target: REPORT_TARGET,
            title,
            "Reported failure: {}",
            truncate_utf8_safe(message, MAX_LOGGED_MESSAGE)
        );
        eprintln!("{}\n  {}", title, message);
    }
}

/// A reported failure
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Report {
    pub title: String,
    pub message: String,
}

/// Reporter that keeps every report, most recent last
#[derive(Debug, Default, Clone)]
pub struct ReportLog {
    reports: Arc<Mutex<Vec<Report>>>,
}

impl ReportLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn reports(&self) -> Vec<Report> {
        self.reports
            .lock()
            .map(|r| r.clone())
            .unwrap_or_default()
    }

    pub fn len(&self) -> usize {
        self.reports.lock().map(|r| r.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl ErrorReporter for ReportLog {
    fn oops(&self, title: &str, message: &str) {
        if let Ok(mut reports) = self.reports.lock() {
            reports.push(Report {
                title: title.to_string(),
                message: message.to_string(),
            });
        }
    }
}

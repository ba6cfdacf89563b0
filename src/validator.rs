//! Per-route request validation slot.
//!
//! The router does not validate requests itself. A route may carry one
//! [`RequestValidator`]; it runs after the dispatch context is assembled and
//! before the handler chain, and any issues it reports abort the dispatch with
//! [`RouterError::Validation`](crate::RouterError::Validation).

use serde::Serialize;
use std::sync::Arc;
use tracing::warn;

use crate::context::DispatchContext;
use crate::event::RawEvent;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ValidationIssue {
    pub location: String,
    pub kind: String,
    pub message: String,
}

impl ValidationIssue {
    pub fn new(location: impl Into<String>, kind: impl Into<String>, message: impl Into<String>) -> Self {
        ValidationIssue {
            location: location.into(),
            kind: kind.into(),
            message: message.into(),
        }
    }
}

/// Caller-supplied validation logic for one route.
pub trait RequestValidator: Send + Sync {
    fn validate(&self, event: &RawEvent, ctx: &DispatchContext) -> Result<(), Vec<ValidationIssue>>;
}

impl<F> RequestValidator for F
where
    F: Fn(&RawEvent, &DispatchContext) -> Result<(), Vec<ValidationIssue>> + Send + Sync,
{
    fn validate(&self, event: &RawEvent, ctx: &DispatchContext) -> Result<(), Vec<ValidationIssue>> {
        self(event, ctx)
    }
}

pub type BoxedValidator = Arc<dyn RequestValidator>;

pub(crate) fn log_issues(template: &str, issues: &[ValidationIssue]) {
    warn!(
        route_template = %template,
        issue_count = issues.len(),
        "Request validation failed"
    );
    for issue in issues {
        warn!(
            route_template = %template,
            location = %issue.location,
            kind = %issue.kind,
            "{}",
            issue.message
        );
    }
}

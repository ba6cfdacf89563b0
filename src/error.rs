//! # Error Module
//!
//! Two closed error sets:
//!
//! - [`RouteError`] is returned while the routing table is being built
//!   (bad template, empty chain, unsupported verb).
//! - [`RouterError`] is what a dispatch can fail with. Every variant carries
//!   its own payload, and the configured error handler turns it into a
//!   response by matching on the variant.
//!
//! Handlers that want a specific status code return
//! [`RouterError::with_status`] rather than attaching ad-hoc fields to an
//! error value:
//!
//! ```rust
//! use lambda_router::RouterError;
//!
//! let err = RouterError::with_status(401).body("Unauthorized");
//! assert_eq!(err.status_hint(), Some(401));
//! assert!(!err.is_no_end_point());
//! ```

use serde_json::Value;
use thiserror::Error;

use crate::validator::ValidationIssue;

/// Errors raised while dispatching one event.
#[derive(Debug, Error)]
pub enum RouterError {
    /// No route is registered for the method/path pair.
    #[error("End point {method} {path} is not configured")]
    NoEndPoint {
        /// Upper-cased HTTP method of the event
        method: String,
        /// Request path as seen by the router
        path: String,
    },

    /// The raw event did not have the shape the router expects.
    #[error("malformed event: {reason}")]
    InvalidEvent {
        /// What was wrong with the event
        reason: String,
    },

    /// The route's validator rejected the request.
    #[error("request validation failed with {} issue(s)", issues.len())]
    Validation {
        /// Every issue reported by the validator
        issues: Vec<ValidationIssue>,
    },

    /// A handler or global middleware aborted with an explicit status.
    #[error("{message}")]
    Handler {
        /// Status code the handler asks for, if any
        status: Option<u16>,
        /// Response body the handler asks for, if any
        body: Option<Value>,
        /// Human readable description, used for logging
        message: String,
    },

    /// Any other failure coming out of user code.
    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

impl RouterError {
    /// Build a [`RouterError::Handler`] carrying a status code.
    ///
    /// The message defaults to the canonical reason phrase of `status`.
    #[must_use]
    pub fn with_status(status: u16) -> Self {
        let message = http::StatusCode::from_u16(status)
            .ok()
            .and_then(|s| s.canonical_reason())
            .unwrap_or("handler error")
            .to_string();
        RouterError::Handler {
            status: Some(status),
            body: None,
            message,
        }
    }

    /// Build a [`RouterError::Handler`] with only a message.
    pub fn message(message: impl Into<String>) -> Self {
        RouterError::Handler {
            status: None,
            body: None,
            message: message.into(),
        }
    }

    /// Attach a response body. Has no effect on variants other than `Handler`.
    #[must_use]
    pub fn body(mut self, value: impl Into<Value>) -> Self {
        if let RouterError::Handler { body, .. } = &mut self {
            *body = Some(value.into());
        }
        self
    }

    /// True for the routing error raised when nothing matched.
    #[must_use]
    pub fn is_no_end_point(&self) -> bool {
        matches!(self, RouterError::NoEndPoint { .. })
    }

    /// Status code suggested by the error itself.
    ///
    /// `NoEndPoint` carries no status. A custom error handler may map it to
    /// 404; the default handler reports it as a 500.
    #[must_use]
    pub fn status_hint(&self) -> Option<u16> {
        match self {
            RouterError::Handler { status, .. } => *status,
            RouterError::Validation { .. } => Some(400),
            RouterError::NoEndPoint { .. }
            | RouterError::InvalidEvent { .. }
            | RouterError::Internal(_) => None,
        }
    }

    /// Response body suggested by the error itself.
    #[must_use]
    pub fn body_hint(&self) -> Option<Value> {
        match self {
            RouterError::Handler { body, .. } => body.clone(),
            RouterError::Validation { issues } => Some(serde_json::json!({ "errors": issues })),
            _ => None,
        }
    }
}

/// Errors raised while registering routes.
#[derive(Debug, Error)]
pub enum RouteError {
    #[error("HTTP method {0} is not supported by the router")]
    UnsupportedMethod(String),

    #[error("route {method} {template} was registered without handlers")]
    EmptyChain { method: String, template: String },

    #[error("route template {template} declares parameter :{name} more than once")]
    DuplicateParam { template: String, name: String },

    #[error("route template {template} could not be compiled")]
    InvalidTemplate {
        template: String,
        #[source]
        source: regex::Error,
    },
}

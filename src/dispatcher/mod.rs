//! # Dispatcher Module
//!
//! Runs one event through the routing pipeline and shapes the outcome into a
//! [`Response`](crate::Response).
//!
//! ## Request Flow
//!
//! ```text
//! RawEvent
//!   → event mapper            (path, method, query)
//!   → route table lookup      NoEndPoint on miss
//!   → global middleware       selected by predicate, run concurrently, merged
//!   → context assembly        requestQuery, requestBody, routeParams
//!   → route validator         optional
//!   → handler chain           strictly sequential, results accumulate
//!   → Response                statusCode/body or 200 + result
//! ```
//!
//! Any step may fail. The error is caught once, at the top of
//! [`Router::dispatch`](crate::Router::dispatch), and turned into a response
//! by the configured error handler.
//!
//! ## Concurrency
//!
//! Dispatches are independent of each other and only read the router. Within
//! one dispatch, global middleware handlers are polled concurrently while the
//! chain runs one handler at a time. There is no timeout: a handler that never
//! completes stalls its dispatch.

mod core;

pub use core::{default_error_handler, handler, BoxedHandler, Handler, HandlerResult};

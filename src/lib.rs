//! # lambda-router
//!
//! **lambda-router** routes serverless HTTP invocation events to chains of
//! async handlers. There is no HTTP server here: the host runtime hands over
//! a JSON event, the router picks a route, runs the handlers and returns a
//! `{ statusCode, body }` response for the host to send back.
//!
//! ## Architecture
//!
//! - **[`router`]** - Path template compilation (`/users/:id`) and the route table
//! - **[`middleware`]** - Global middleware selected per event by predicate
//! - **[`dispatcher`]** - The dispatch pipeline and the handler contract
//! - **[`config`]** - URL prefix, event mapper and error handler; TOML/env settings
//! - **[`event`]** / **[`context`]** / **[`response`]** - The data flowing through a dispatch
//! - **[`validator`]** - Optional per-route request validation
//! - **[`logging`]** - `tracing` subscriber setup
//!
//! ### Dispatch Flow
//!
//! ```mermaid
//! sequenceDiagram
//!     participant Host
//!     participant Router
//!     participant Table as RouteTable
//!     participant Globals as GlobalMiddleware
//!     participant Chain as Handler chain
//!
//!     Host->>Router: dispatch(event)
//!     Router->>Router: event_mapper(event)
//!     Router->>Table: lookup(method, path)
//!     Table-->>Router: RouteMatch or NoEndPoint
//!     Router->>Globals: resolve(event)
//!     Globals-->>Router: merged context
//!     Router->>Router: requestQuery / requestBody / routeParams
//!     loop each handler, in order
//!         Router->>Chain: call(event, context)
//!         Chain-->>Router: result (merged into context)
//!     end
//!     Router-->>Host: Response { statusCode, body }
//! ```
//!
//! ## Quick Start
//!
//! ```rust
//! use lambda_router::{handler, RawEvent, Router};
//! use serde_json::json;
//!
//! # fn main() -> Result<(), lambda_router::RouteError> {
//! let mut router = Router::new();
//! router.post(
//!     "/users",
//!     vec![handler(|_, ctx| async move {
//!         Ok(json!({ "statusCode": 201, "body": ctx.request_body() }))
//!     })],
//! )?;
//!
//! let event = RawEvent::new("POST", "/users").with_body(r#"{"name":"ada"}"#);
//! let response = futures::executor::block_on(router.dispatch(event));
//! assert_eq!(response.status_code, 201);
//! assert_eq!(response.body, json!({ "name": "ada" }));
//! # Ok(())
//! # }
//! ```
//!
//! ## Errors
//!
//! Handlers fail with [`RouterError`]. Whatever fails during a dispatch is
//! passed once to the configured error handler; the default one answers with
//! the status the error carries, or 500 and the status reason phrase.

mod app;
pub mod config;
pub mod context;
pub mod dispatcher;
pub mod error;
pub mod event;
pub mod ids;
pub mod logging;
pub mod middleware;
pub mod response;
pub mod router;
pub mod validator;

pub use app::Router;
pub use config::{ConfigOptions, RouterConfig, Settings};
pub use context::DispatchContext;
pub use dispatcher::{handler, BoxedHandler, Handler, HandlerResult};
pub use error::{RouteError, RouterError};
pub use event::{MappedEvent, RawEvent};
pub use response::{ErrorResponse, Response};
pub use validator::{RequestValidator, ValidationIssue};

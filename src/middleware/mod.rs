//! # Global Middleware
//!
//! Predicate-gated handlers applied to every event before the route's chain,
//! whatever route matched.
//!
//! ```rust
//! use lambda_router::{Router, RouterError};
//! use serde_json::json;
//!
//! let mut router = Router::new();
//! router
//!     .when_matches(|event| event.path.contains("/protected/"))
//!     .run(|event| async move {
//!         match event.header("Authorization") {
//!             Some(token) => Ok(json!({ "currentUser": token })),
//!             None => Err(RouterError::with_status(401).body("Unauthorized")),
//!         }
//!     });
//! assert_eq!(router.globals().len(), 1);
//! ```
//!
//! Handlers selected for one event run concurrently. Their results are folded
//! into the dispatch context in registration order, but the order of their
//! side effects is unspecified.

mod core;

pub use core::{EventPredicate, GlobalEntry, GlobalHandler, GlobalMiddleware, WhenMatches};

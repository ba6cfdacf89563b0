//! # Router Module
//!
//! Path template compilation and the route table.
//!
//! ## Overview
//!
//! The router is responsible for:
//! - Compiling route templates (e.g. `/foo/bar/:id`) into anchored matchers
//! - Keeping the handler chain registered for every `(method, template)` pair
//! - Finding the route for an incoming `(method, path)` pair
//! - Extracting named route parameters from a matched path
//!
//! ## Architecture
//!
//! 1. **Compilation**: at registration time every template is turned into a
//!    regex in which each `:name` segment becomes a `([^/]+)` capture group.
//!    The parameter names are kept in template order.
//!
//! 2. **Matching**: for each event the templates registered for the method are
//!    tested in registration order. The first match wins; there is no
//!    specificity ranking, so register `/users/me` before `/users/:id`.
//!
//! ## Example
//!
//! ```rust
//! use lambda_router::router::PathPattern;
//!
//! let pattern = PathPattern::compile("/foo/bar/:id").unwrap();
//! assert!(pattern.is_match("/foo/bar/1"));
//! assert!(!pattern.is_match("/foo/bar/1/extra"));
//!
//! let params = pattern.captures("/foo/bar/1").unwrap();
//! assert_eq!(params[0].0.as_ref(), "id");
//! assert_eq!(params[0].1, "1");
//! ```

mod core;

pub use core::{
    normalize_method, ParamVec, PathPattern, RouteEntry, RouteMatch, RouteTable,
    MAX_INLINE_PARAMS, SUPPORTED_METHODS,
};

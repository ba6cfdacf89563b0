//! Router core module: template compilation and the route table.

use http::Method;
use regex::Regex;
use smallvec::SmallVec;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, info, warn};

use crate::dispatcher::BoxedHandler;
use crate::error::{RouteError, RouterError};
use crate::validator::BoxedValidator;

/// Maximum number of route parameters before heap allocation.
/// Most routes have ≤4 params (e.g., /users/:id/posts/:postId).
pub const MAX_INLINE_PARAMS: usize = 8;

/// Stack-allocated parameter storage, in template order.
///
/// Param names are `Arc<str>` shared with the compiled pattern; values are
/// per-request data taken from the path.
pub type ParamVec = SmallVec<[(Arc<str>, String); MAX_INLINE_PARAMS]>;

/// Methods the router accepts, for registration and for lookup.
pub const SUPPORTED_METHODS: [Method; 5] = [
    Method::GET,
    Method::POST,
    Method::PUT,
    Method::PATCH,
    Method::DELETE,
];

/// Normalise a method name (any case) to one of [`SUPPORTED_METHODS`].
#[must_use]
pub fn normalize_method(method: &str) -> Option<Method> {
    let method = Method::from_bytes(method.to_ascii_uppercase().as_bytes()).ok()?;
    SUPPORTED_METHODS.contains(&method).then_some(method)
}

/// A compiled route template such as `/foo/bar/:id`.
///
/// Segments starting with `:` are named parameters matching one non-empty
/// path segment; every other segment must match literally. Matching is
/// anchored at both ends.
#[derive(Debug, Clone)]
pub struct PathPattern {
    template: String,
    regex: Regex,
    param_names: Vec<Arc<str>>,
}

impl PathPattern {
    /// Compile a template into a matcher plus its ordered parameter names.
    ///
    /// Transforms `/users/:id/posts/:postId` into
    /// `^/users/([^/]+)/posts/([^/]+)$` with names `["id", "postId"]`.
    /// Literal segments are regex-escaped, and empty segments are kept, so
    /// `/a//b` only matches `/a//b`.
    pub fn compile(template: &str) -> Result<Self, RouteError> {
        let mut pattern = String::with_capacity(template.len() + 8);
        pattern.push('^');
        let mut param_names: Vec<Arc<str>> = Vec::with_capacity(template.matches(':').count());

        for (idx, segment) in template.split('/').enumerate() {
            if idx > 0 {
                pattern.push('/');
            }
            match segment.strip_prefix(':').filter(|name| !name.is_empty()) {
                Some(name) => {
                    if param_names.iter().any(|n| n.as_ref() == name) {
                        return Err(RouteError::DuplicateParam {
                            template: template.to_string(),
                            name: name.to_string(),
                        });
                    }
                    param_names.push(Arc::from(name));
                    pattern.push_str("([^/]+)");
                }
                None => pattern.push_str(&regex::escape(segment)),
            }
        }
        pattern.push('$');

        let regex = Regex::new(&pattern).map_err(|source| RouteError::InvalidTemplate {
            template: template.to_string(),
            source,
        })?;

        Ok(Self {
            template: template.to_string(),
            regex,
            param_names,
        })
    }

    #[must_use]
    pub fn template(&self) -> &str {
        &self.template
    }

    #[must_use]
    pub fn param_names(&self) -> &[Arc<str>] {
        &self.param_names
    }

    #[must_use]
    pub fn is_match(&self, path: &str) -> bool {
        self.regex.is_match(path)
    }

    /// Extract parameter values, paired positionally with their names.
    ///
    /// Returns `None` when the path does not match the template.
    #[must_use]
    pub fn captures(&self, path: &str) -> Option<ParamVec> {
        let captures = self.regex.captures(path)?;
        Some(
            self.param_names
                .iter()
                .enumerate()
                .filter_map(|(i, name)| {
                    captures
                        .get(i + 1)
                        .map(|value| (Arc::clone(name), value.as_str().to_string()))
                })
                .collect(),
        )
    }
}

/// One `(method, template)` pair and everything registered for it.
pub struct RouteEntry {
    pattern: PathPattern,
    handlers: Vec<BoxedHandler>,
    validator: Option<BoxedValidator>,
}

impl RouteEntry {
    fn new(pattern: PathPattern) -> Self {
        Self {
            pattern,
            handlers: Vec::new(),
            validator: None,
        }
    }

    #[must_use]
    pub fn template(&self) -> &str {
        self.pattern.template()
    }

    #[must_use]
    pub fn pattern(&self) -> &PathPattern {
        &self.pattern
    }

    #[must_use]
    pub fn handlers(&self) -> &[BoxedHandler] {
        &self.handlers
    }

    #[must_use]
    pub fn validator(&self) -> Option<&BoxedValidator> {
        self.validator.as_ref()
    }
}

impl std::fmt::Debug for RouteEntry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RouteEntry")
            .field("template", &self.pattern.template)
            .field("handlers", &self.handlers.len())
            .field("validator", &self.validator.is_some())
            .finish()
    }
}

/// Result of successfully matching a request path to a route
#[derive(Debug, Clone, Copy)]
pub struct RouteMatch<'a> {
    pub entry: &'a RouteEntry,
    pub method: &'a Method,
}

impl<'a> RouteMatch<'a> {
    #[must_use]
    pub fn template(&self) -> &'a str {
        self.entry.template()
    }

    #[must_use]
    pub fn handlers(&self) -> &'a [BoxedHandler] {
        self.entry.handlers()
    }

    /// Route parameters of `path` under the matched template.
    #[must_use]
    pub fn path_params(&self, path: &str) -> ParamVec {
        self.entry.pattern.captures(path).unwrap_or_default()
    }
}

/// Route table: method → templates in registration order → handler chain.
///
/// Built at startup and only read during dispatch. Lookup is a linear scan
/// over the method's templates; the first match wins.
#[derive(Default)]
pub struct RouteTable {
    routes: HashMap<Method, Vec<RouteEntry>>,
}

impl RouteTable {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Append `handlers` to the chain of `(method, template)`.
    ///
    /// The entry is created (and its template compiled) on first use;
    /// later registrations for the same pair extend the existing chain.
    pub fn register(
        &mut self,
        method: &Method,
        template: &str,
        handlers: Vec<BoxedHandler>,
    ) -> Result<(), RouteError> {
        if handlers.is_empty() {
            return Err(RouteError::EmptyChain {
                method: method.to_string(),
                template: template.to_string(),
            });
        }
        let entry = self.entry_mut(method, template)?;
        entry.handlers.extend(handlers);

        info!(
            method = %method,
            route_template = %template,
            chain_length = entry.handlers.len(),
            "Route handlers registered"
        );
        Ok(())
    }

    /// Attach (or replace) the validator of `(method, template)`.
    pub fn set_validator(
        &mut self,
        method: &Method,
        template: &str,
        validator: BoxedValidator,
    ) -> Result<(), RouteError> {
        let entry = self.entry_mut(method, template)?;
        if entry.validator.replace(validator).is_some() {
            warn!(
                method = %method,
                route_template = %template,
                "Replaced existing route validator"
            );
        }
        Ok(())
    }

    fn entry_mut(&mut self, method: &Method, template: &str) -> Result<&mut RouteEntry, RouteError> {
        if !SUPPORTED_METHODS.contains(method) {
            return Err(RouteError::UnsupportedMethod(method.to_string()));
        }
        let entries = self.routes.entry(method.clone()).or_default();
        let idx = match entries.iter().position(|e| e.template() == template) {
            Some(idx) => idx,
            None => {
                entries.push(RouteEntry::new(PathPattern::compile(template)?));
                entries.len() - 1
            }
        };
        Ok(&mut entries[idx])
    }

    /// Find the first template registered for `method` that matches `path`.
    ///
    /// `method` is case-insensitive. Entries that only carry a validator are
    /// not candidates. Unsupported methods and unmatched paths fail with
    /// [`RouterError::NoEndPoint`].
    pub fn lookup(&self, method: &str, path: &str) -> Result<RouteMatch<'_>, RouterError> {
        debug!(method = %method, path = %path, "Route match attempt");
        let match_start = Instant::now();

        let found = normalize_method(method).and_then(|m| {
            let (method, entries) = self.routes.get_key_value(&m)?;
            entries
                .iter()
                .find(|e| !e.handlers.is_empty() && e.pattern.is_match(path))
                .map(|entry| RouteMatch { entry, method })
        });

        let duration_us = match_start.elapsed().as_micros();
        match found {
            Some(route_match) => {
                info!(
                    method = %route_match.method,
                    path = %path,
                    route_template = %route_match.template(),
                    chain_length = route_match.handlers().len(),
                    duration_us = duration_us,
                    "Route matched"
                );
                Ok(route_match)
            }
            _ => {
                warn!(
                    method = %method,
                    path = %path,
                    duration_us = duration_us,
                    "No route matched"
                );
                Err(RouterError::NoEndPoint {
                    method: method.to_ascii_uppercase(),
                    path: path.to_string(),
                })
            }
        }
    }

    /// Templates registered for `method`, in registration order.
    #[must_use]
    pub fn templates(&self, method: &Method) -> Vec<&str> {
        self.routes
            .get(method)
            .map(|entries| entries.iter().map(RouteEntry::template).collect())
            .unwrap_or_default()
    }

    /// Handler chain registered for an exact `(method, template)` pair.
    #[must_use]
    pub fn chain(&self, method: &Method, template: &str) -> Option<&[BoxedHandler]> {
        self.routes
            .get(method)?
            .iter()
            .find(|e| e.template() == template)
            .map(RouteEntry::handlers)
    }

    /// Number of registered `(method, template)` pairs.
    #[must_use]
    pub fn len(&self) -> usize {
        self.routes.values().map(Vec::len).sum()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Log every registered route at info level.
    pub fn dump_routes(&self) {
        info!(routes_count = self.len(), "Routing table");
        for method in &SUPPORTED_METHODS {
            for entry in self.routes.get(method).into_iter().flatten() {
                info!(
                    method = %method,
                    route_template = %entry.template(),
                    chain_length = entry.handlers.len(),
                    has_validator = entry.validator.is_some(),
                    "Route"
                );
            }
        }
    }
}

impl std::fmt::Debug for RouteTable {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_map().entries(self.routes.iter()).finish()
    }
}

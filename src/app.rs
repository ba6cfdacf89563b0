//! The [`Router`]: configuration, route table and global middleware owned by
//! one value, built at startup and then shared read-only by every dispatch.

use http::Method;
use std::sync::Arc;
use tracing::info;

use crate::config::{ConfigOptions, RouterConfig};
use crate::dispatcher::BoxedHandler;
use crate::error::RouteError;
use crate::event::RawEvent;
use crate::middleware::{GlobalMiddleware, WhenMatches};
use crate::router::RouteTable;
use crate::validator::RequestValidator;

/// Request router for serverless function invocations.
///
/// ```rust
/// use lambda_router::{handler, ConfigOptions, RawEvent, Router};
/// use serde_json::json;
///
/// # fn main() -> Result<(), lambda_router::RouteError> {
/// let mut router = Router::new();
/// router.configure(ConfigOptions::new().url_prefix("/my-api"));
/// router.get(
///     "/foo/bar/:id",
///     vec![
///         handler(|_, _| async { Ok(json!({ "extraData": { "foo": "bar" } })) }),
///         handler(|_, ctx| async move {
///             Ok(json!({ "id": ctx.route_param("id"), "extra": ctx.get("extraData") }))
///         }),
///     ],
/// )?;
///
/// let response = futures::executor::block_on(
///     router.dispatch(RawEvent::new("GET", "/my-api/foo/bar/1")),
/// );
/// assert_eq!(response.status_code, 200);
/// assert_eq!(response.body, json!({ "id": "1", "extra": { "foo": "bar" } }));
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Default)]
pub struct Router {
    config: RouterConfig,
    routes: RouteTable,
    globals: GlobalMiddleware,
}

impl Router {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_options(options: ConfigOptions) -> Self {
        Self {
            config: RouterConfig::from_options(options),
            ..Self::default()
        }
    }

    /// Replace the configuration.
    ///
    /// Supplied fields replace the current value; omitted fields go back to
    /// their defaults. The URL prefix is bound at registration time, so routes
    /// registered before this call keep the prefix they were registered with.
    pub fn configure(&mut self, options: ConfigOptions) -> &mut Self {
        self.config = RouterConfig::from_options(options);
        info!(url_prefix = %self.config.url_prefix, "Router configured");
        self
    }

    #[must_use]
    pub fn config(&self) -> &RouterConfig {
        &self.config
    }

    #[must_use]
    pub fn routes(&self) -> &RouteTable {
        &self.routes
    }

    #[must_use]
    pub fn globals(&self) -> &GlobalMiddleware {
        &self.globals
    }

    pub(crate) fn globals_mut(&mut self) -> &mut GlobalMiddleware {
        &mut self.globals
    }

    fn prefixed(&self, template: &str) -> String {
        format!("{}{}", self.config.url_prefix, template)
    }

    /// Append `handlers` to the chain of `method` + prefixed `template`.
    pub fn register(
        &mut self,
        method: Method,
        template: &str,
        handlers: Vec<BoxedHandler>,
    ) -> Result<&mut Self, RouteError> {
        let template = self.prefixed(template);
        self.routes.register(&method, &template, handlers)?;
        Ok(self)
    }

    pub fn get(&mut self, template: &str, handlers: Vec<BoxedHandler>) -> Result<&mut Self, RouteError> {
        self.register(Method::GET, template, handlers)
    }

    pub fn post(&mut self, template: &str, handlers: Vec<BoxedHandler>) -> Result<&mut Self, RouteError> {
        self.register(Method::POST, template, handlers)
    }

    pub fn put(&mut self, template: &str, handlers: Vec<BoxedHandler>) -> Result<&mut Self, RouteError> {
        self.register(Method::PUT, template, handlers)
    }

    pub fn patch(&mut self, template: &str, handlers: Vec<BoxedHandler>) -> Result<&mut Self, RouteError> {
        self.register(Method::PATCH, template, handlers)
    }

    pub fn delete(&mut self, template: &str, handlers: Vec<BoxedHandler>) -> Result<&mut Self, RouteError> {
        self.register(Method::DELETE, template, handlers)
    }

    /// Attach a validator to `method` + prefixed `template`.
    pub fn validator(
        &mut self,
        method: Method,
        template: &str,
        validator: impl RequestValidator + 'static,
    ) -> Result<&mut Self, RouteError> {
        let template = self.prefixed(template);
        self.routes
            .set_validator(&method, &template, Arc::new(validator))?;
        Ok(self)
    }

    /// Start registering a global middleware gated by `predicate`.
    pub fn when_matches<P>(&mut self, predicate: P) -> WhenMatches<'_>
    where
        P: Fn(&RawEvent) -> bool + Send + Sync + 'static,
    {
        WhenMatches::new(self, Arc::new(predicate))
    }
}

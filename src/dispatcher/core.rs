//! Dispatcher core module: handler contract and the per-event pipeline.

use futures::future::BoxFuture;
use http::Method;
use serde_json::{Map, Value};
use std::future::Future;
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, error, info, info_span, Instrument, Span};

use crate::context::{DispatchContext, REQUEST_BODY, REQUEST_QUERY, ROUTE_PARAMS};
use crate::error::RouterError;
use crate::event::RawEvent;
use crate::ids::DispatchId;
use crate::response::{ErrorResponse, Response};
use crate::router::ParamVec;
use crate::validator::log_issues;
use crate::Router;

/// What a handler returns: any JSON value (`Value::Null` for "nothing"),
/// or an error that aborts the dispatch.
pub type HandlerResult = Result<Value, RouterError>;

/// One link of a route's handler chain.
///
/// Handlers get the raw event and a snapshot of the dispatch context
/// accumulated so far. An object result is merged into the context seen by
/// the next handler; the last handler's result becomes the response.
pub trait Handler: Send + Sync {
    fn call(&self, event: Arc<RawEvent>, ctx: DispatchContext) -> BoxFuture<'static, HandlerResult>;
}

impl<F, Fut> Handler for F
where
    F: Fn(Arc<RawEvent>, DispatchContext) -> Fut + Send + Sync,
    Fut: Future<Output = HandlerResult> + Send + 'static,
{
    fn call(&self, event: Arc<RawEvent>, ctx: DispatchContext) -> BoxFuture<'static, HandlerResult> {
        Box::pin(self(event, ctx))
    }
}

pub type BoxedHandler = Arc<dyn Handler>;

/// Box an async closure as a chain handler.
///
/// ```rust
/// use lambda_router::dispatcher::handler;
/// use serde_json::json;
///
/// let h = handler(|_event, ctx| async move {
///     Ok(json!({ "id": ctx.route_param("id") }))
/// });
/// # let _ = h;
/// ```
pub fn handler<F, Fut>(f: F) -> BoxedHandler
where
    F: Fn(Arc<RawEvent>, DispatchContext) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = HandlerResult> + Send + 'static,
{
    Arc::new(f)
}

/// Methods whose body is parsed into `requestBody`.
const BODY_METHODS: [Method; 3] = [Method::POST, Method::PUT, Method::PATCH];

impl Router {
    /// Dispatch one event and produce its response.
    ///
    /// Never fails: any error raised while mapping, routing, running global
    /// middleware, validating or running the chain is handed to the
    /// configured error handler exactly once.
    pub async fn dispatch(&self, event: RawEvent) -> Response {
        let span = dispatch_span(
            DispatchId::from_event_or_new(&event),
            event.method().unwrap_or_default(),
            &event.path,
        );
        self.dispatch_in(Ok(event), span).await
    }

    /// Dispatch an untyped host event.
    ///
    /// Input that does not deserialize into a [`RawEvent`] goes straight to
    /// the error handler as [`RouterError::InvalidEvent`], still inside a
    /// dispatch span with its own id.
    pub async fn dispatch_value(&self, event: Value) -> Response {
        let method = event
            .get("httpMethod")
            .or_else(|| event.get("method"))
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_string();
        let path = event
            .get("path")
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_string();

        let parsed = RawEvent::from_value(event);
        let dispatch_id = match &parsed {
            Ok(event) => DispatchId::from_event_or_new(event),
            Err(_) => DispatchId::new(),
        };
        self.dispatch_in(parsed, dispatch_span(dispatch_id, &method, &path))
            .await
    }

    async fn dispatch_in(&self, parsed: Result<RawEvent, RouterError>, span: Span) -> Response {
        let start = Instant::now();

        let result = match parsed {
            Ok(event) => {
                self.run_pipeline(Arc::new(event))
                    .instrument(span.clone())
                    .await
            }
            Err(err) => Err(err),
        };

        let _entered = span.enter();
        let response = match result {
            Ok(response) => response,
            Err(err) => self.handle_error(&err),
        };
        info!(
            status = response.status_code,
            latency_ms = start.elapsed().as_millis() as u64,
            "Dispatch complete"
        );
        response
    }

    async fn run_pipeline(&self, event: Arc<RawEvent>) -> Result<Response, RouterError> {
        let config = self.config();

        let mapped = (config.event_mapper)(&event)?;

        let route = self.routes().lookup(&mapped.http_method, &mapped.path)?;

        let contributed = self.globals().resolve(&event).await?;

        let mut ctx = DispatchContext::from(contributed);
        ctx.insert(REQUEST_QUERY, query_value(mapped.query));
        if BODY_METHODS.contains(route.method) {
            if let Some(body) = event.parsed_body() {
                ctx.insert(REQUEST_BODY, body);
            }
        }
        ctx.insert(ROUTE_PARAMS, params_value(route.path_params(&mapped.path)));

        if let Some(validator) = route.entry.validator() {
            validator.validate(&event, &ctx).map_err(|issues| {
                log_issues(route.template(), &issues);
                RouterError::Validation { issues }
            })?;
        }

        let output = run_chain(route.template(), route.handlers(), &event, ctx).await?;
        Ok(Response::from_handler_output(output))
    }

    fn handle_error(&self, err: &RouterError) -> Response {
        let outcome = (self.config().error_handler)(err);
        let response = outcome.into_response();
        debug!(
            status = response.status_code,
            no_end_point = err.is_no_end_point(),
            "Error handler produced response"
        );
        response
    }
}

fn dispatch_span(dispatch_id: DispatchId, method: &str, path: &str) -> Span {
    info_span!(
        "dispatch",
        dispatch_id = %dispatch_id,
        method = method,
        path = %path,
    )
}

/// Run a chain strictly in order, each handler awaiting the previous one.
async fn run_chain(
    template: &str,
    handlers: &[BoxedHandler],
    event: &Arc<RawEvent>,
    mut ctx: DispatchContext,
) -> HandlerResult {
    let chain_length = handlers.len();
    for (idx, h) in handlers.iter().enumerate() {
        debug!(
            route_template = %template,
            handler_idx = idx,
            chain_length = chain_length,
            "Handler execution start"
        );
        let output = h.call(Arc::clone(event), ctx.clone()).await?;
        if idx + 1 == chain_length {
            return Ok(output);
        }
        ctx.merge(output);
    }
    Ok(Value::Null)
}

fn query_value(query: Option<std::collections::HashMap<String, String>>) -> Value {
    Value::Object(
        query
            .unwrap_or_default()
            .into_iter()
            .map(|(k, v)| (k, Value::String(v)))
            .collect(),
    )
}

fn params_value(params: ParamVec) -> Value {
    Value::Object(
        params
            .into_iter()
            .map(|(k, v)| (k.to_string(), Value::String(v)))
            .collect::<Map<String, Value>>(),
    )
}

/// Error handler used when none is configured.
///
/// Logs the error and hands back whatever status/body the error itself
/// carries; with neither, the response is a 500.
pub fn default_error_handler(err: &RouterError) -> ErrorResponse {
    error!(
        error = %err,
        no_end_point = err.is_no_end_point(),
        "Dispatch failed"
    );
    ErrorResponse {
        status_code: err.status_hint(),
        body: err.body_hint(),
    }
}

//! Global middleware registry.

use futures::future::{try_join_all, BoxFuture};
use serde_json::{Map, Value};
use std::future::Future;
use std::sync::Arc;
use tracing::{debug, warn};

use crate::dispatcher::HandlerResult;
use crate::event::RawEvent;
use crate::Router;

/// Decides whether a global middleware applies to an event. Must be pure.
pub type EventPredicate = Arc<dyn Fn(&RawEvent) -> bool + Send + Sync>;

/// Handler half of a global middleware entry.
///
/// May perform side effects. An object result is merged into the dispatch
/// context; an error aborts the whole dispatch.
pub trait GlobalHandler: Send + Sync {
    fn call(&self, event: Arc<RawEvent>) -> BoxFuture<'static, HandlerResult>;
}

impl<F, Fut> GlobalHandler for F
where
    F: Fn(Arc<RawEvent>) -> Fut + Send + Sync,
    Fut: Future<Output = HandlerResult> + Send + 'static,
{
    fn call(&self, event: Arc<RawEvent>) -> BoxFuture<'static, HandlerResult> {
        Box::pin(self(event))
    }
}

pub struct GlobalEntry {
    predicate: EventPredicate,
    handler: Arc<dyn GlobalHandler>,
}

impl GlobalEntry {
    #[must_use]
    pub fn applies_to(&self, event: &RawEvent) -> bool {
        (self.predicate)(event)
    }
}

/// Ordered `(predicate, handler)` pairs applied to every event, independent of
/// route matching.
#[derive(Default)]
pub struct GlobalMiddleware {
    entries: Vec<GlobalEntry>,
}

impl GlobalMiddleware {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add<P, F, Fut>(&mut self, predicate: P, handler: F)
    where
        P: Fn(&RawEvent) -> bool + Send + Sync + 'static,
        F: Fn(Arc<RawEvent>) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = HandlerResult> + Send + 'static,
    {
        self.push(Arc::new(predicate), Arc::new(handler));
    }

    pub(crate) fn push(&mut self, predicate: EventPredicate, handler: Arc<dyn GlobalHandler>) {
        self.entries.push(GlobalEntry { predicate, handler });
        debug!(registered = self.entries.len(), "Global middleware registered");
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Entries whose predicate accepts `event`, in registration order.
    pub fn select<'a>(&'a self, event: &'a RawEvent) -> impl Iterator<Item = &'a GlobalEntry> + 'a {
        self.entries.iter().filter(move |e| e.applies_to(event))
    }

    /// Run the selected handlers concurrently and fold their results.
    ///
    /// The fold follows registration order, so a later entry's keys win over
    /// an earlier one's regardless of which finished first. The first error
    /// fails the whole call and the remaining handlers are dropped.
    pub async fn resolve(&self, event: &Arc<RawEvent>) -> Result<Map<String, Value>, crate::RouterError> {
        let pending: Vec<_> = self
            .select(event)
            .map(|entry| entry.handler.call(Arc::clone(event)))
            .collect();

        debug!(
            selected = pending.len(),
            registered = self.entries.len(),
            "Global middleware selected"
        );
        if pending.is_empty() {
            return Ok(Map::new());
        }

        let results = try_join_all(pending).await.map_err(|err| {
            warn!(error = %err, "Global middleware aborted dispatch");
            err
        })?;

        let mut merged = Map::new();
        for result in results {
            if let Value::Object(fields) = result {
                merged.extend(fields);
            }
        }
        Ok(merged)
    }
}

impl std::fmt::Debug for GlobalMiddleware {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GlobalMiddleware")
            .field("entries", &self.entries.len())
            .finish()
    }
}

/// Builder returned by [`Router::when_matches`].
#[must_use = "call .run(handler) to register the middleware"]
pub struct WhenMatches<'r> {
    router: &'r mut Router,
    predicate: EventPredicate,
}

impl<'r> WhenMatches<'r> {
    pub(crate) fn new(router: &'r mut Router, predicate: EventPredicate) -> Self {
        Self { router, predicate }
    }

    /// Register `handler` for events accepted by the predicate.
    pub fn run<F, Fut>(self, handler: F) -> &'r mut Router
    where
        F: Fn(Arc<RawEvent>) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = HandlerResult> + Send + 'static,
    {
        self.router.globals_mut().push(self.predicate, Arc::new(handler));
        self.router
    }
}

//! Route registration and dispatch.
//!
//! # Responsibilities
//! - Store (method, pattern, handler) registrations in registration order
//! - Find the first registration whose method and pattern match a request
//! - Invoke its handler with the captured segments
//!
//! # Design Decisions
//! - Immutable after setup; shared via `Arc` without locks
//! - O(n) scan per dispatch (route tables are small)
//! - First match wins, so specific patterns go before general ones
//! - Explicit NoMatch (`Ok(None)`) rather than a silent default
//! - Handler errors are returned unchanged

use std::future::Future;
use std::sync::Arc;

use futures_util::future::BoxFuture;

use crate::error::ApiResult;
use crate::http::{Method, Request, Response};
use crate::routing::matcher::{Captures, PatternError, PatternMatcher};

/// Boxed route handler.
pub type Handler =
    Arc<dyn Fn(Request, Captures) -> BoxFuture<'static, ApiResult<Response>> + Send + Sync>;

/// A single registration.
pub struct Route {
    pub method: Method,
    pub matcher: PatternMatcher,
    handler: Handler,
}

impl std::fmt::Debug for Route {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Route")
            .field("method", &self.method)
            .field("pattern", &self.matcher.pattern())
            .finish()
    }
}

/// Ordered route table.
#[derive(Debug, Default)]
pub struct Router {
    routes: Vec<Route>,
}

impl Router {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a registration. Duplicates are accepted; later ones are unreachable.
    pub fn register<F, Fut>(
        &mut self,
        method: Method,
        pattern: &str,
        handler: F,
    ) -> Result<&mut Self, PatternError>
    where
        F: Fn(Request, Captures) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = ApiResult<Response>> + Send + 'static,
    {
        let matcher = PatternMatcher::new(pattern)?;
        let handler: Handler = Arc::new(
            move |request: Request, captures: Captures| -> BoxFuture<'static, ApiResult<Response>> {
                Box::pin(handler(request, captures))
            },
        );
        tracing::debug!(method = %method, pattern = %pattern, "Registered route");
        self.routes.push(Route {
            method,
            matcher,
            handler,
        });
        Ok(self)
    }

    pub fn get<F, Fut>(&mut self, pattern: &str, handler: F) -> Result<&mut Self, PatternError>
    where
        F: Fn(Request, Captures) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = ApiResult<Response>> + Send + 'static,
    {
        self.register(Method::Get, pattern, handler)
    }

    pub fn post<F, Fut>(&mut self, pattern: &str, handler: F) -> Result<&mut Self, PatternError>
    where
        F: Fn(Request, Captures) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = ApiResult<Response>> + Send + 'static,
    {
        self.register(Method::Post, pattern, handler)
    }

    pub fn put<F, Fut>(&mut self, pattern: &str, handler: F) -> Result<&mut Self, PatternError>
    where
        F: Fn(Request, Captures) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = ApiResult<Response>> + Send + 'static,
    {
        self.register(Method::Put, pattern, handler)
    }

    pub fn patch<F, Fut>(&mut self, pattern: &str, handler: F) -> Result<&mut Self, PatternError>
    where
        F: Fn(Request, Captures) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = ApiResult<Response>> + Send + 'static,
    {
        self.register(Method::Patch, pattern, handler)
    }

    pub fn delete<F, Fut>(&mut self, pattern: &str, handler: F) -> Result<&mut Self, PatternError>
    where
        F: Fn(Request, Captures) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = ApiResult<Response>> + Send + 'static,
    {
        self.register(Method::Delete, pattern, handler)
    }

    /// First registration matching `method` and `path`, with its captures.
    pub fn find(&self, method: Method, path: &str) -> Option<(&Route, Captures)> {
        self.routes
            .iter()
            .filter(|route| route.method == method)
            .find_map(|route| route.matcher.captures(path).map(|caps| (route, caps)))
    }

    /// Dispatch a request to the first matching handler.
    ///
    /// Returns `Ok(None)` when nothing matches.
    pub async fn dispatch(&self, request: Request) -> ApiResult<Option<Response>> {
        let Some((route, captures)) = self.find(request.method, &request.path) else {
            tracing::debug!(method = %request.method, path = %request.path, "No route matched");
            return Ok(None);
        };

        tracing::debug!(
            method = %request.method,
            path = %request.path,
            pattern = %route.matcher.pattern(),
            "Dispatching request"
        );
        let handler = route.handler.clone();
        handler(request, captures).await.map(Some)
    }

    /// Registrations in order.
    pub fn routes(&self) -> &[Route] {
        &self.routes
    }
}

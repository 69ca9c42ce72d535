//! Router core module - the per-request façade.
//!
//! A [`Router`] owns an `Arc<RouteTable>` snapshot and the state of the last
//! [`handle`](Router::handle) call. Each call is independent and overwrites the
//! previously resolved result. Routers are cheap to create; use one per request
//! when requests are served concurrently.

use super::matcher::{normalize_path, RouteMatcher};
use super::resolver::HandlerResolver;
use crate::collection::{ClosureHandler, RouteCollection, RouteOptions, RouteTable};
use crate::error::RouteError;
use http::Method;
use serde_json::{json, Value};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{debug, info, warn};

/// Matching slower than this is logged at warn level.
const SLOW_MATCH_THRESHOLD: Duration = Duration::from_millis(1);

/// What the resolved handler points at.
#[derive(Debug, Clone)]
pub enum HandlerTarget {
    /// Fully qualified controller class, e.g. `\App\Controllers\BlogController`
    Controller(String),
    Closure(ClosureHandler),
}

/// Result of a successful [`Router::handle`] call.
#[derive(Debug, Clone)]
pub struct MatchResult {
    pub target: HandlerTarget,
    pub method: String,
    /// Positional parameters for the handler
    pub params: Vec<String>,
    pub options: RouteOptions,
    pub middlewares: Vec<String>,
    /// Value captured by `{locale}`; never part of `params`
    pub locale: Option<String>,
    /// The pattern of the route that matched
    pub route_pattern: String,
    pub auto_routed: bool,
}

impl MatchResult {
    /// Controller name, `None` for closure routes.
    #[must_use]
    pub fn controller_name(&self) -> Option<&str> {
        match &self.target {
            HandlerTarget::Controller(name) => Some(name.as_str()),
            HandlerTarget::Closure(_) => None,
        }
    }

    #[must_use]
    pub fn is_closure(&self) -> bool {
        matches!(self.target, HandlerTarget::Closure(_))
    }

    /// JSON rendering used by the CLI.
    #[must_use]
    pub fn to_json(&self) -> Value {
        let controller = match &self.target {
            HandlerTarget::Controller(name) => Value::String(name.clone()),
            HandlerTarget::Closure(_) => Value::String("(Closure)".to_string()),
        };
        json!({
            "controller": controller,
            "method": self.method,
            "params": self.params,
            "middlewares": self.middlewares,
            "locale": self.locale,
            "route": self.route_pattern,
            "options": self.options,
            "auto_routed": self.auto_routed,
        })
    }
}

/// Per-request router.
///
/// ```rust
/// use brrtmvc::{collection::RouteCollection, router::Router};
///
/// let mut routes = RouteCollection::new();
/// routes.get("books/(:num)/(:alpha)/(:num)", "Blog::show/$3/$1")?;
///
/// let mut router = Router::from_collection(&routes);
/// router.handle("/books/123/sometitle/456")?;
/// assert_eq!(router.method_name(), "show");
/// assert_eq!(router.params(), ["456", "123"]);
/// # Ok::<(), brrtmvc::RouteError>(())
/// ```
#[derive(Debug, Clone)]
pub struct Router {
    table: Arc<RouteTable>,
    verb: Method,
    host: Option<String>,
    default_controller: String,
    matched: Option<MatchResult>,
}

impl Router {
    /// Create a router over a shared table. The verb defaults to the table's `http_verb`.
    #[must_use]
    pub fn new(table: Arc<RouteTable>) -> Self {
        let verb = table.settings().http_verb.clone();
        let default_controller = table.settings().default_controller_name();
        Self {
            table,
            verb,
            host: None,
            default_controller,
            matched: None,
        }
    }

    /// Snapshot a collection and route against it.
    #[must_use]
    pub fn from_collection(routes: &RouteCollection) -> Self {
        Self::new(Arc::new(routes.compile()))
    }

    #[must_use]
    pub fn with_verb(mut self, verb: Method) -> Self {
        self.verb = verb;
        self
    }

    #[must_use]
    pub fn with_host(mut self, host: impl Into<String>) -> Self {
        self.host = Some(host.into());
        self
    }

    pub fn set_http_verb(&mut self, verb: Method) -> &mut Self {
        self.verb = verb;
        self
    }

    pub fn set_host(&mut self, host: Option<String>) -> &mut Self {
        self.host = host;
        self
    }

    #[must_use]
    pub fn table(&self) -> &Arc<RouteTable> {
        &self.table
    }

    /// Resolve `uri` with the router's current verb.
    pub fn handle(&mut self, uri: &str) -> Result<&MatchResult, RouteError> {
        self.matched = None;
        let path = normalize_path(uri);

        debug!(method = %self.verb, path = %path, "Route match attempt");
        let match_start = Instant::now();

        let matcher = RouteMatcher::new(&self.table);
        let found = matcher.find(&self.verb, self.host.as_deref(), &path);
        let match_duration = match_start.elapsed();

        let Some(found) = found else {
            warn!(
                method = %self.verb,
                path = %path,
                duration_us = match_duration.as_micros(),
                "No route matched"
            );
            return Err(RouteError::not_found(self.verb.as_str(), &path));
        };

        if match_duration > SLOW_MATCH_THRESHOLD {
            warn!(
                method = %self.verb,
                path = %path,
                route_pattern = %found.route.raw_pattern(),
                duration_us = match_duration.as_micros(),
                "Slow route matching detected"
            );
        } else {
            info!(
                method = %self.verb,
                path = %path,
                route_pattern = %found.route.raw_pattern(),
                handler = %found.route.handler(),
                captures = ?found.captures,
                auto_routed = found.auto_routed,
                duration_us = match_duration.as_micros(),
                "Route matched"
            );
        }

        let resolver = HandlerResolver::new(self.table.settings());
        let result = resolver.resolve(&self.verb, &path, found)?;
        Ok(self.matched.insert(result))
    }

    /// The result of the last successful `handle`, if any.
    #[must_use]
    pub fn matched(&self) -> Option<&MatchResult> {
        self.matched.as_ref()
    }

    /// Resolved controller; before a successful `handle`, the fully qualified
    /// default controller. `None` when the route is a closure.
    #[must_use]
    pub fn controller_name(&self) -> Option<&str> {
        match &self.matched {
            Some(result) => result.controller_name(),
            None => Some(self.default_controller.as_str()),
        }
    }

    #[must_use]
    pub fn closure(&self) -> Option<&ClosureHandler> {
        match self.matched.as_ref().map(|r| &r.target) {
            Some(HandlerTarget::Closure(closure)) => Some(closure),
            _ => None,
        }
    }

    /// Resolved method; before a successful `handle`, the default method.
    #[must_use]
    pub fn method_name(&self) -> &str {
        match &self.matched {
            Some(result) => &result.method,
            None => &self.table.settings().default_method,
        }
    }

    #[must_use]
    pub fn params(&self) -> &[String] {
        self.matched
            .as_ref()
            .map(|r| r.params.as_slice())
            .unwrap_or(&[])
    }

    #[must_use]
    pub fn has_locale(&self) -> bool {
        self.locale().is_some()
    }

    #[must_use]
    pub fn locale(&self) -> Option<&str> {
        self.matched.as_ref().and_then(|r| r.locale.as_deref())
    }

    #[must_use]
    pub fn middlewares(&self) -> &[String] {
        self.matched
            .as_ref()
            .map(|r| r.middlewares.as_slice())
            .unwrap_or(&[])
    }

    #[must_use]
    pub fn matched_route_options(&self) -> Option<&RouteOptions> {
        self.matched.as_ref().map(|r| &r.options)
    }
}

//! Middleware lookup.
//!
//! Introspection tools (the `brrtmvc middleware` command, filter debuggers) need
//! to know which middleware aliases apply to a URI without executing anything.
//! [`MiddlewareFinder`] runs a normal [`Router::handle`] and classifies the
//! outcome:
//!
//! | outcome                | result                     |
//! |------------------------|----------------------------|
//! | route matched          | [`MiddlewareSet::Known`]   |
//! | no route               | [`MiddlewareSet::Unknown`] |
//! | redirect route matched | [`MiddlewareSet::None`]    |
//! | handler misconfigured  | the [`RouteError`]         |

use crate::collection::RouteTable;
use crate::error::RouteError;
use crate::router::Router;
use http::Method;
use serde::Serialize;
use std::fmt;
use std::sync::Arc;
use tracing::debug;

/// Middleware applicable to a URI.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "middleware", rename_all = "lowercase")]
pub enum MiddlewareSet {
    /// Aliases in application order (group middleware first)
    Known(Vec<String>),
    /// The URI does not resolve, so nothing can be said
    Unknown,
    /// The URI redirects before any middleware would run
    None,
}

impl MiddlewareSet {
    #[must_use]
    pub fn aliases(&self) -> &[String] {
        match self {
            MiddlewareSet::Known(aliases) => aliases,
            MiddlewareSet::Unknown | MiddlewareSet::None => &[],
        }
    }
}

impl fmt::Display for MiddlewareSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MiddlewareSet::Known(aliases) if aliases.is_empty() => write!(f, "(none)"),
            MiddlewareSet::Known(aliases) => write!(f, "{}", aliases.join(", ")),
            MiddlewareSet::Unknown => write!(f, "unknown"),
            MiddlewareSet::None => write!(f, "(none)"),
        }
    }
}

/// Looks up middleware for `(verb, uri)` pairs against one table.
#[derive(Debug, Clone)]
pub struct MiddlewareFinder {
    table: Arc<RouteTable>,
}

impl MiddlewareFinder {
    #[must_use]
    pub fn new(table: Arc<RouteTable>) -> Self {
        Self { table }
    }

    pub fn find(&self, verb: Method, uri: &str) -> Result<MiddlewareSet, RouteError> {
        self.find_for_host(verb, uri, None)
    }

    pub fn find_for_host(
        &self,
        verb: Method,
        uri: &str,
        host: Option<&str>,
    ) -> Result<MiddlewareSet, RouteError> {
        let mut router = Router::new(Arc::clone(&self.table)).with_verb(verb);
        router.set_host(host.map(str::to_string));

        match router.handle(uri) {
            Ok(result) => Ok(MiddlewareSet::Known(result.middlewares.clone())),
            Err(RouteError::NotFound { verb, path }) => {
                debug!(verb = %verb, path = %path, "Middleware lookup: no route");
                Ok(MiddlewareSet::Unknown)
            }
            Err(RouteError::Redirect { target, .. }) => {
                debug!(uri = %uri, target = %target, "Middleware lookup: redirect");
                Ok(MiddlewareSet::None)
            }
            Err(err) => Err(err),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::collection::{GroupOptions, RouteCollection, RouteOptions, Verb};

    fn finder() -> MiddlewareFinder {
        let mut routes = RouteCollection::new();
        routes
            .group("admin", GroupOptions::new().middleware("session"), |admin| {
                admin.route(
                    Verb::Method(Method::GET),
                    "users",
                    "Admin\\Users::index",
                    RouteOptions::new().middleware("csrf"),
                )?;
                Ok(())
            })
            .unwrap();
        routes.get("plain", "Pages::plain").unwrap();
        routes.add_redirect("old", "/plain", 301).unwrap();
        routes.get("bad/(:segment)", "$1::index").unwrap();
        MiddlewareFinder::new(Arc::new(routes.compile()))
    }

    #[test]
    fn known_middleware_in_group_order() {
        let set = finder().find(Method::GET, "/admin/users").unwrap();
        assert_eq!(set, MiddlewareSet::Known(vec!["session".into(), "csrf".into()]));
        assert_eq!(set.to_string(), "session, csrf");
    }

    #[test]
    fn route_without_middleware_is_known_and_empty() {
        let set = finder().find(Method::GET, "plain").unwrap();
        assert!(set.aliases().is_empty());
        assert_eq!(set, MiddlewareSet::Known(Vec::new()));
    }

    #[test]
    fn not_found_is_unknown() {
        assert_eq!(finder().find(Method::GET, "nope").unwrap(), MiddlewareSet::Unknown);
        assert_eq!(finder().find(Method::POST, "plain").unwrap(), MiddlewareSet::Unknown);
    }

    #[test]
    fn redirect_has_none() {
        assert_eq!(finder().find(Method::GET, "old").unwrap(), MiddlewareSet::None);
    }

    #[test]
    fn router_exceptions_propagate() {
        let err = finder().find(Method::GET, "bad/x").unwrap_err();
        assert!(err.is_router_exception());
    }
}

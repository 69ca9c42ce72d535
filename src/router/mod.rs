//! # Router Module
//!
//! The router module maps an incoming request (HTTP verb + URI path) to a concrete
//! handler: a controller/method pair with ordered parameters, or a closure.
//!
//! ## Overview
//!
//! Resolution happens in two steps:
//!
//! 1. **Matching** ([`RouteMatcher`]): the path is percent-decoded once, trimmed of
//!    surrounding slashes and tested against the compiled routes of a
//!    [`RouteTable`](crate::collection::RouteTable) in table order. The first
//!    anchored match wins.
//!
//! 2. **Resolution** ([`HandlerResolver`]): `$N` references in the handler are
//!    substituted with captured groups, the controller is namespace-qualified,
//!    dashes are translated when enabled and the `{locale}` segment is extracted.
//!    Handlers whose controller half uses `/` or references a capture group are
//!    rejected.
//!
//! [`Router`] ties both together and keeps the last [`MatchResult`] for its
//! accessors.
//!
//! ## Example
//!
//! ```rust
//! use brrtmvc::collection::RouteCollection;
//! use brrtmvc::router::Router;
//! use brrtmvc::RouteError;
//! use http::Method;
//!
//! let mut routes = RouteCollection::new();
//! routes.get("users/(:num)", "Users::show/$1")?;
//!
//! let mut router = Router::from_collection(&routes);
//! router.handle("/users/42")?;
//! assert_eq!(router.controller_name(), Some(r"\App\Controllers\UsersController"));
//! assert_eq!(router.params(), ["42"]);
//!
//! let mut router = router.with_verb(Method::POST);
//! assert!(matches!(router.handle("/users/42"), Err(RouteError::NotFound { .. })));
//! # Ok::<(), RouteError>(())
//! ```
//!
//! ## Performance
//!
//! Matching is a linear scan over the candidates of one verb, O(n) in the number of
//! routes. Captured groups are kept in a `SmallVec` so routes with up to
//! [`MAX_INLINE_PARAMS`] captures do not allocate for the capture list.

mod core;
mod matcher;
mod resolver;
#[cfg(test)]
mod tests;

pub use core::{HandlerTarget, MatchResult, Router};
pub use matcher::{normalize_path, CaptureVec, MatchedRoute, RouteMatcher, MAX_INLINE_PARAMS};
pub use resolver::HandlerResolver;

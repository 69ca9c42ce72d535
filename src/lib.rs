//! # brrtmvc
//!
//! **brrtmvc** is the route table and request resolution core of an MVC-style web
//! framework. It maps an HTTP verb and URI path to a controller class, a method
//! and an ordered list of positional parameters, or to a closure.
//!
//! ## Overview
//!
//! Routes are registered through a small DSL on a [`RouteCollection`]. Patterns are
//! regular expressions with a few conveniences:
//!
//! - placeholders such as `(:num)`, `(:segment)` or `(:any)` expand to regex groups
//! - `{name}` tokens expand to `(:segment)` (`{locale}` becomes a named group)
//! - handlers like `Blog::show/$3/$1` reorder captured groups into parameters
//!
//! Once registration is done, the collection is compiled into an immutable
//! [`RouteTable`](collection::RouteTable) that any number of per-request
//! [`Router`]s share through an `Arc`.
//!
//! ## Architecture
//!
//! - **[`placeholder`]** - named regex fragments used in patterns
//! - **[`collection`]** - registration DSL: verbs, groups, resources, redirects
//! - **[`router`]** - matching and handler resolution
//! - **[`auto_route`]** - import of auto-discovered routes as low-priority fallbacks
//! - **[`middleware`]** - middleware lookup for introspection tools
//! - **[`dispatcher`]** - registry mapping resolved controller names to code
//! - **[`manifest`]** - declarative YAML/TOML/JSON route files
//! - **[`hot_reload`]** - rebuild and swap the live table when a manifest changes
//! - **[`config`]** - router settings from files and environment variables
//! - **[`logging`]** - `tracing-subscriber` initialization
//! - **[`cli`]** - the `brrtmvc` route inspector
//!
//! ### Request Flow
//!
//! ```mermaid
//! sequenceDiagram
//!     participant Host as Host application
//!     participant Router as Router
//!     participant Matcher as RouteMatcher
//!     participant Resolver as HandlerResolver
//!     participant Dispatcher as Dispatcher
//!
//!     Host->>Router: handle("/books/123/sometitle/456")
//!     Router->>Router: percent-decode, trim slashes
//!     Router->>Matcher: find(verb, host, path)
//!     Matcher->>Matcher: verb bucket, ANY bucket,<br/>then auto routes
//!     Matcher-->>Router: MatchedRoute (captures)
//!     Router->>Resolver: resolve(route, captures)
//!     Resolver->>Resolver: $N substitution,<br/>namespace, dashes, locale
//!     alt handler misconfigured
//!         Resolver-->>Host: RouteError::DynamicController /<br/>InvalidControllerName
//!     end
//!     Resolver-->>Router: MatchResult
//!     Router-->>Host: \App\Controllers\BlogController::show("456", "123")
//!     Host->>Dispatcher: dispatch(&result)
//! ```
//!
//! ## Quick Start
//!
//! ```rust
//! use brrtmvc::{RouteCollection, Router, RouteError};
//!
//! let mut routes = RouteCollection::new();
//! routes.get("books/(:num)/(:alpha)/(:num)", "Blog::show/$3/$1")?;
//!
//! let mut router = Router::from_collection(&routes);
//! let result = router.handle("/books/123/sometitle/456")?;
//! assert_eq!(result.controller_name(), Some(r"\App\Controllers\BlogController"));
//! assert_eq!(result.method, "show");
//! assert_eq!(result.params, ["456", "123"]);
//!
//! let missing = router.handle("url/not-exists").unwrap_err();
//! assert_eq!(missing.to_string(), "Can't find a route for 'get: url/not-exists'.");
//! # Ok::<(), RouteError>(())
//! ```
//!
//! ## Concurrency
//!
//! A [`RouteCollection`] is single-writer. Compile it once registration is done;
//! the resulting table is `Send + Sync` and read-only. A [`Router`] holds
//! per-request state, so use one per request.

pub mod auto_route;
pub mod cli;
pub mod collection;
pub mod config;
pub mod dispatcher;
pub mod error;
pub mod hot_reload;
pub mod logging;
pub mod manifest;
pub mod middleware;
pub mod placeholder;
pub mod router;

pub use collection::{RouteCollection, RouteTable};
pub use config::RouterConfig;
pub use error::RouteError;
pub use router::{MatchResult, Router};

//! Error taxonomy for route registration and resolution.
//!
//! Every outcome of [`Router::handle`](crate::router::Router::handle) other than a
//! successful [`MatchResult`](crate::router::MatchResult) is a [`RouteError`]. Callers
//! pattern-match on the variant instead of catching distinct error types:
//!
//! - [`RouteError::NotFound`] - nothing in the table matches (HTTP 404 equivalent)
//! - [`RouteError::InvalidControllerName`] / [`RouteError::DynamicController`] - the
//!   matched handler is misconfigured or unsafe; fatal for the request
//! - [`RouteError::Redirect`] - a redirect route matched; not a failure
//! - [`RouteError::Config`] - registration-time problems (bad placeholder, regex,
//!   backreference count, reverse-route arguments)

use std::fmt;

/// Outcome of a failed or short-circuited route lookup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RouteError {
    /// No registered route (explicit or auto-discovered) matches verb + path
    NotFound {
        /// Lower-cased HTTP verb used for the lookup
        verb: String,
        /// Decoded, slash-trimmed request path
        path: String,
    },
    /// The handler uses `/` where a namespace delimiter (`\`) is required
    InvalidControllerName {
        /// The handler template as registered
        handler: String,
    },
    /// The controller segment of the handler references a capture group
    DynamicController {
        /// The handler template as registered
        handler: String,
    },
    /// A redirect route matched
    Redirect {
        /// Path (or absolute URL) to redirect to
        target: String,
        /// HTTP status to send (301, 302, 307, 308, ...)
        status: u16,
    },
    /// The route table was configured with something it cannot compile or use
    Config {
        /// Human readable explanation
        reason: String,
    },
}

impl RouteError {
    pub(crate) fn not_found(verb: &str, path: &str) -> Self {
        RouteError::NotFound {
            verb: verb.to_ascii_lowercase(),
            path: path.to_string(),
        }
    }

    pub(crate) fn config(reason: impl Into<String>) -> Self {
        RouteError::Config {
            reason: reason.into(),
        }
    }

    /// True for the handler-configuration errors raised while resolving a matched route.
    #[must_use]
    pub fn is_router_exception(&self) -> bool {
        matches!(
            self,
            RouteError::InvalidControllerName { .. } | RouteError::DynamicController { .. }
        )
    }

    /// True for the 404 variant.
    #[must_use]
    pub fn is_not_found(&self) -> bool {
        matches!(self, RouteError::NotFound { .. })
    }

    /// Whether a redirect must be replayed with the original HTTP verb.
    ///
    /// Only 307 and 308 preserve the method; every other status lets the client
    /// switch to GET.
    #[must_use]
    pub fn preserves_method(&self) -> bool {
        matches!(self, RouteError::Redirect { status: 307 | 308, .. })
    }
}

impl fmt::Display for RouteError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RouteError::NotFound { verb, path } => {
                write!(f, "Can't find a route for '{verb}: {path}'.")
            }
            RouteError::InvalidControllerName { handler } => {
                write!(
                    f,
                    "The namespace delimiter is a backslash (\\), not a slash (/). Route handler: \"{handler}\""
                )
            }
            RouteError::DynamicController { handler } => {
                write!(
                    f,
                    "A dynamic controller is not allowed for security reasons. Route handler: \"{handler}\""
                )
            }
            RouteError::Redirect { target, status } => {
                write!(f, "Redirect ({status}) to '{target}'")
            }
            RouteError::Config { reason } => write!(f, "Route configuration error: {reason}"),
        }
    }
}

impl std::error::Error for RouteError {}

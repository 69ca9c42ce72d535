//! Route groups.
//!
//! Groups are modelled as a stack of immutable [`GroupContext`] frames. Entering a
//! group derives a new frame from the current top and pushes it; leaving pops it.
//! Registration reads only the top frame, so no state needs restoring by hand.

use super::definition::RouteOptions;
use serde::{Deserialize, Serialize};

/// Options accepted by [`RouteCollection::group`](super::RouteCollection::group).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GroupOptions {
    /// Replaces the enclosing namespace
    pub namespace: Option<String>,
    /// Appended to the enclosing middleware list
    pub middleware: Vec<String>,
    pub hostname: Option<String>,
    pub subdomain: Option<String>,
}

impl GroupOptions {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn namespace(mut self, namespace: impl Into<String>) -> Self {
        self.namespace = Some(namespace.into());
        self
    }

    #[must_use]
    pub fn middleware(mut self, middleware: impl Into<String>) -> Self {
        self.middleware.push(middleware.into());
        self
    }

    #[must_use]
    pub fn hostname(mut self, hostname: impl Into<String>) -> Self {
        self.hostname = Some(hostname.into());
        self
    }

    #[must_use]
    pub fn subdomain(mut self, subdomain: impl Into<String>) -> Self {
        self.subdomain = Some(subdomain.into());
        self
    }
}

/// Inherited registration state for one level of group nesting.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GroupContext {
    pub(crate) prefix: String,
    pub(crate) namespace: Option<String>,
    pub(crate) middleware: Vec<String>,
    pub(crate) hostname: Option<String>,
    pub(crate) subdomain: Option<String>,
}

impl GroupContext {
    /// Derive the frame for a nested group.
    #[must_use]
    pub fn nest(&self, prefix: &str, options: &GroupOptions) -> Self {
        let mut middleware = self.middleware.clone();
        middleware.extend(options.middleware.iter().cloned());

        Self {
            prefix: join_path(&self.prefix, prefix),
            namespace: options.namespace.clone().or_else(|| self.namespace.clone()),
            middleware,
            hostname: options.hostname.clone().or_else(|| self.hostname.clone()),
            subdomain: options.subdomain.clone().or_else(|| self.subdomain.clone()),
        }
    }

    /// Prefix a route pattern with the group path; the result is slash-trimmed.
    #[must_use]
    pub fn prefixed(&self, pattern: &str) -> String {
        join_path(&self.prefix, pattern)
    }

    /// Fold the group's inherited options into a route's own options.
    #[must_use]
    pub fn apply(&self, mut options: RouteOptions) -> RouteOptions {
        if !self.middleware.is_empty() {
            let mut merged = self.middleware.clone();
            merged.append(&mut options.middleware);
            options.middleware = merged;
        }
        if options.namespace.is_none() {
            options.namespace = self.namespace.clone();
        }
        if options.hostname.is_none() {
            options.hostname = self.hostname.clone();
        }
        if options.subdomain.is_none() {
            options.subdomain = self.subdomain.clone();
        }
        options
    }

    #[must_use]
    pub fn prefix(&self) -> &str {
        &self.prefix
    }
}

/// Join two path fragments with a single `/`, trimming outer slashes.
pub(crate) fn join_path(left: &str, right: &str) -> String {
    let left = left.trim_matches('/');
    let right = right.trim_matches('/');
    match (left.is_empty(), right.is_empty()) {
        (true, _) => right.to_string(),
        (false, true) => left.to_string(),
        (false, false) => format!("{left}/{right}"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn nested_prefix_and_middleware_merge() {
        let root = GroupContext::default();
        let admin = root.nest(
            "admin",
            &GroupOptions::new().namespace(r"App\Admin").middleware("auth"),
        );
        let users = admin.nest("/users/", &GroupOptions::new().middleware("audit"));

        assert_eq!(users.prefix(), "admin/users");
        assert_eq!(users.middleware, vec!["auth", "audit"]);
        assert_eq!(users.namespace.as_deref(), Some(r"App\Admin"));
        assert_eq!(users.prefixed("list"), "admin/users/list");
        assert_eq!(users.prefixed("/"), "admin/users");
    }

    #[test]
    fn child_namespace_replaces() {
        let outer = GroupContext::default().nest("a", &GroupOptions::new().namespace("Outer"));
        let inner = outer.nest("b", &GroupOptions::new().namespace("Inner"));
        assert_eq!(inner.namespace.as_deref(), Some("Inner"));
    }

    #[test]
    fn apply_merges_group_first() {
        let ctx = GroupContext::default().nest("api", &GroupOptions::new().middleware("cors"));
        let options = ctx.apply(RouteOptions::new().middleware("throttle"));
        assert_eq!(options.middleware, vec!["cors", "throttle"]);
    }
}

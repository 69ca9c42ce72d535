//! The compiled, read-only route table.
//!
//! A [`RouteTable`] is what a [`RouteCollection`](super::RouteCollection) produces once
//! registration is finished. It is `Send + Sync` and is shared between routers via
//! `Arc`, so matching never observes a half-registered table.

use super::definition::{PatternPiece, RouteDefinition, Verb};
use crate::error::RouteError;
use http::Method;
use regex::Regex;
use std::collections::{BTreeSet, HashMap};
use std::sync::Arc;

/// Table-wide resolution settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RouteSettings {
    /// Prefixed to controllers that are not fully qualified
    pub default_namespace: String,
    pub default_controller: String,
    pub default_method: String,
    /// Appended to controller class names that do not already end with it
    pub controller_suffix: String,
    /// Rewrite `-` to `_` in resolved controller and method names
    pub translate_uri_dashes: bool,
    /// Sort low-priority routes after normal ones within each bucket
    pub prioritize: bool,
    /// Verb a new [`Router`](crate::router::Router) starts with
    pub http_verb: Method,
    pub supported_locales: Vec<String>,
    /// Reject `{locale}` values outside `supported_locales` with a 404
    pub use_supported_locales_only: bool,
    /// Locale substituted by reverse routing when none is given
    pub default_locale: String,
}

impl Default for RouteSettings {
    fn default() -> Self {
        Self {
            default_namespace: r"App\Controllers".to_string(),
            default_controller: "Home".to_string(),
            default_method: "index".to_string(),
            controller_suffix: "Controller".to_string(),
            translate_uri_dashes: false,
            prioritize: false,
            http_verb: Method::GET,
            supported_locales: Vec::new(),
            use_supported_locales_only: false,
            default_locale: "en".to_string(),
        }
    }
}

impl RouteSettings {
    /// Whether `locale` may be used, honouring `use_supported_locales_only`.
    #[must_use]
    pub fn accepts_locale(&self, locale: &str) -> bool {
        !self.use_supported_locales_only
            || self.supported_locales.is_empty()
            || self.supported_locales.iter().any(|l| l == locale)
    }

    /// Fully qualify a controller name: `\Namespace\ShortNameController`.
    ///
    /// Names already starting with `\` keep their namespace; the class suffix is
    /// added either way.
    #[must_use]
    pub fn qualify_controller(&self, controller: &str, namespace: Option<&str>) -> String {
        let controller = self.with_suffix(controller);
        if controller.starts_with('\\') {
            return controller;
        }
        let namespace = namespace
            .unwrap_or(&self.default_namespace)
            .trim_matches('\\');
        if namespace.is_empty() {
            format!("\\{controller}")
        } else {
            format!("\\{namespace}\\{controller}")
        }
    }

    /// The default controller, qualified the same way resolved controllers are.
    #[must_use]
    pub fn default_controller_name(&self) -> String {
        self.qualify_controller(&self.default_controller, None)
    }

    fn with_suffix(&self, controller: &str) -> String {
        let suffix = self.controller_suffix.as_str();
        if suffix.is_empty() || controller.ends_with(suffix) {
            controller.to_string()
        } else {
            format!("{controller}{suffix}")
        }
    }
}

/// Immutable route table consumed by the matcher.
#[derive(Debug, Clone, Default)]
pub struct RouteTable {
    settings: RouteSettings,
    verb_routes: Vec<(Method, Vec<Arc<RouteDefinition>>)>,
    any_routes: Vec<Arc<RouteDefinition>>,
    auto_routes: Vec<(Verb, Arc<RouteDefinition>)>,
    named: HashMap<String, Arc<RouteDefinition>>,
    registered_controllers: BTreeSet<String>,
}

impl RouteTable {
    #[must_use]
    pub fn settings(&self) -> &RouteSettings {
        &self.settings
    }

    pub(crate) fn settings_mut(&mut self) -> &mut RouteSettings {
        &mut self.settings
    }

    /// Add a definition to a bucket. Returns `false` if the bucket already holds
    /// the same pattern; the first registration wins.
    pub(crate) fn insert(&mut self, verb: &Verb, route: Arc<RouteDefinition>) -> bool {
        let bucket = match verb {
            Verb::Any => &mut self.any_routes,
            Verb::Method(method) => {
                let position = self.verb_routes.iter().position(|(m, _)| m == method);
                let index = match position {
                    Some(index) => index,
                    None => {
                        self.verb_routes.push((method.clone(), Vec::new()));
                        self.verb_routes.len() - 1
                    }
                };
                &mut self.verb_routes[index].1
            }
        };

        if bucket
            .iter()
            .any(|existing| existing.raw_pattern() == route.raw_pattern())
        {
            return false;
        }
        if let Some(name) = route.name() {
            self.named
                .entry(name.to_string())
                .or_insert_with(|| Arc::clone(&route));
        }
        bucket.push(route);
        true
    }

    pub(crate) fn insert_auto(&mut self, verb: Verb, route: Arc<RouteDefinition>) -> bool {
        if self
            .auto_routes
            .iter()
            .any(|(v, existing)| *v == verb && existing.raw_pattern() == route.raw_pattern())
        {
            return false;
        }
        self.auto_routes.push((verb, route));
        true
    }

    pub(crate) fn register_controller(&mut self, controller: String) {
        self.registered_controllers.insert(controller);
    }

    /// Drop every route, keeping settings.
    pub(crate) fn clear(&mut self) {
        self.verb_routes.clear();
        self.any_routes.clear();
        self.auto_routes.clear();
        self.named.clear();
        self.registered_controllers.clear();
    }

    /// Explicit candidates for `verb` in match order.
    ///
    /// The verb bucket comes first, then the `ANY` bucket, each in registration order.
    /// With prioritization enabled every bucket is stable-partitioned so that
    /// `priority == 0` routes precede low-priority ones.
    pub fn candidates<'a>(&'a self, verb: &Method) -> impl Iterator<Item = &'a RouteDefinition> + 'a {
        let verb_bucket: &[Arc<RouteDefinition>] = self
            .verb_routes
            .iter()
            .find(|(m, _)| m == verb)
            .map(|(_, routes)| routes.as_slice())
            .unwrap_or(&[]);
        let prioritize = self.settings.prioritize;
        ordered(verb_bucket, prioritize).chain(ordered(&self.any_routes, prioritize))
    }

    /// Auto-discovered candidates for `verb`, consulted only after every explicit route.
    pub fn auto_candidates<'a>(&'a self, verb: &Method) -> impl Iterator<Item = &'a RouteDefinition> + 'a {
        let verb = verb.clone();
        self.auto_routes
            .iter()
            .filter(move |(v, _)| v.accepts(&verb))
            .map(|(_, route)| route.as_ref())
    }

    /// Every route as `(bucket, definition)`: verb buckets, `ANY`, then auto routes.
    pub fn routes(&self) -> impl Iterator<Item = (Verb, &RouteDefinition)> + '_ {
        let explicit = self.verb_routes.iter().flat_map(|(method, routes)| {
            routes
                .iter()
                .map(move |r| (Verb::Method(method.clone()), r.as_ref()))
        });
        let any = self.any_routes.iter().map(|r| (Verb::Any, r.as_ref()));
        let auto = self.auto_routes.iter().map(|(v, r)| (v.clone(), r.as_ref()));
        explicit.chain(any).chain(auto)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.verb_routes.iter().map(|(_, r)| r.len()).sum::<usize>()
            + self.any_routes.len()
            + self.auto_routes.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    #[must_use]
    pub fn named_route(&self, name: &str) -> Option<&RouteDefinition> {
        self.named.get(name).map(Arc::as_ref)
    }

    /// Controllers referenced by explicit routes (fully qualified).
    #[must_use]
    pub fn registered_controllers(&self) -> &BTreeSet<String> {
        &self.registered_controllers
    }

    #[must_use]
    pub fn is_registered_controller(&self, controller: &str) -> bool {
        self.registered_controllers.contains(controller)
    }

    /// Rebuild a path for a route identified by name or by handler string.
    ///
    /// Parameters fill the pattern's capture groups in order; each value must match
    /// its group's regex. `{locale}` segments use the default locale.
    pub fn reverse_route(&self, search: &str, params: &[&str]) -> Result<String, RouteError> {
        let locale = self.settings.default_locale.clone();
        self.reverse_route_localized(search, &locale, params)
    }

    pub fn reverse_route_localized(
        &self,
        search: &str,
        locale: &str,
        params: &[&str],
    ) -> Result<String, RouteError> {
        let route = self
            .named_route(search)
            .or_else(|| self.find_by_handler(search))
            .ok_or_else(|| RouteError::config(format!("no route named or handled by '{search}'")))?;

        let mut values = params.iter();
        let mut path = String::new();
        for piece in route.pattern().pieces() {
            match piece {
                PatternPiece::Literal(text) => path.push_str(text),
                PatternPiece::Locale => path.push_str(locale),
                PatternPiece::Syntax(syntax) => {
                    return Err(RouteError::config(format!(
                        "route '{}' cannot be reversed: '{syntax}' has no literal form",
                        route.raw_pattern()
                    )));
                }
                PatternPiece::Group(inner) => {
                    let value = values.next().ok_or_else(|| {
                        RouteError::config(format!(
                            "route '{}' needs {} parameter(s), got {}",
                            route.raw_pattern(),
                            route.pattern().group_count(),
                            params.len()
                        ))
                    })?;
                    let check = Regex::new(&format!("^(?:{inner})$"))
                        .map_err(|e| RouteError::config(e.to_string()))?;
                    if !check.is_match(value) {
                        return Err(RouteError::config(format!(
                            "parameter '{value}' does not match '{inner}' in route '{}'",
                            route.raw_pattern()
                        )));
                    }
                    path.push_str(value);
                }
            }
        }
        if values.next().is_some() {
            return Err(RouteError::config(format!(
                "too many parameters for route '{}'",
                route.raw_pattern()
            )));
        }
        Ok(format!("/{path}"))
    }

    fn find_by_handler(&self, search: &str) -> Option<&RouteDefinition> {
        let wanted = search.trim_start_matches('\\');
        self.routes()
            .map(|(_, route)| route)
            .find(|route| {
                route
                    .handler()
                    .to_string()
                    .trim_start_matches('\\')
                    .eq_ignore_ascii_case(wanted)
            })
    }
}

fn ordered(
    bucket: &[Arc<RouteDefinition>],
    prioritize: bool,
) -> impl Iterator<Item = &RouteDefinition> {
    let normal = bucket
        .iter()
        .filter(move |r| !prioritize || r.priority() == 0);
    let low = bucket
        .iter()
        .filter(move |r| prioritize && r.priority() > 0);
    normal.chain(low).map(Arc::as_ref)
}

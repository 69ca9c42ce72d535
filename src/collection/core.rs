use super::definition::{has_backreference, HandlerSpec, RouteDefinition, RouteOptions, Verb};
use super::group::{GroupContext, GroupOptions};
use super::table::{RouteSettings, RouteTable};
use crate::config::RouterConfig;
use crate::error::RouteError;
use crate::placeholder::PlaceholderTable;
use http::Method;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::debug;

/// The seven conventional resource actions, in registration order.
pub const RESOURCE_ACTIONS: [&str; 7] = ["index", "new", "create", "show", "edit", "update", "delete"];

/// Options for [`RouteCollection::resource`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ResourceOptions {
    /// Controller to route to; defaults to the resource name with its first letter upper-cased
    pub controller: Option<String>,
    /// Pattern used for the `{id}` segment
    pub placeholder: Option<String>,
    /// Restrict to these actions
    pub only: Vec<String>,
    /// Skip these actions
    pub except: Vec<String>,
    pub middleware: Vec<String>,
    pub namespace: Option<String>,
}

impl ResourceOptions {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn controller(mut self, controller: impl Into<String>) -> Self {
        self.controller = Some(controller.into());
        self
    }

    #[must_use]
    pub fn placeholder(mut self, placeholder: impl Into<String>) -> Self {
        self.placeholder = Some(placeholder.into());
        self
    }

    #[must_use]
    pub fn only<I, S>(mut self, actions: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.only = actions.into_iter().map(Into::into).collect();
        self
    }

    #[must_use]
    pub fn except<I, S>(mut self, actions: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.except = actions.into_iter().map(Into::into).collect();
        self
    }

    fn wants(&self, action: &str) -> bool {
        (self.only.is_empty() || self.only.iter().any(|a| a == action))
            && !self.except.iter().any(|a| a == action)
    }
}

/// Mutable route registry.
///
/// Routes are compiled as they are registered. Once registration is finished,
/// [`compile`](RouteCollection::compile) hands out an immutable [`RouteTable`]
/// for routers to share.
///
/// ```rust
/// use brrtmvc::collection::{GroupOptions, RouteCollection};
///
/// let mut routes = RouteCollection::new();
/// routes.get("books/(:num)", "Blog::show/$1")?;
/// routes.group("admin", GroupOptions::new().middleware("auth"), |admin| {
///     admin.get("users", "Admin\\Users::index")?;
///     Ok(())
/// })?;
/// let table = routes.compile();
/// assert_eq!(table.len(), 2);
/// # Ok::<(), brrtmvc::RouteError>(())
/// ```
#[derive(Debug, Clone, Default)]
pub struct RouteCollection {
    placeholders: PlaceholderTable,
    table: RouteTable,
    groups: Vec<GroupContext>,
}

impl RouteCollection {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// A collection preconfigured from a [`RouterConfig`].
    #[must_use]
    pub fn with_config(config: &RouterConfig) -> Self {
        let mut routes = Self::new();
        routes.configure(config);
        routes
    }

    /// Apply settings and placeholders from a [`RouterConfig`].
    pub fn configure(&mut self, config: &RouterConfig) -> &mut Self {
        self.placeholders.extend(config.placeholders.clone());
        let settings = self.table.settings_mut();
        settings.default_namespace = config.default_namespace.clone();
        settings.default_controller = config.default_controller.clone();
        settings.default_method = config.default_method.clone();
        settings.controller_suffix = config.controller_suffix.clone();
        settings.translate_uri_dashes = config.translate_uri_dashes;
        settings.prioritize = config.prioritize;
        settings.supported_locales = config.supported_locales.clone();
        settings.use_supported_locales_only = config.use_supported_locales_only;
        settings.default_locale = config.default_locale.clone();
        if let Ok(Verb::Method(method)) = Verb::parse(&config.http_verb) {
            settings.http_verb = method;
        }
        self
    }

    // --- configuration ------------------------------------------------------

    /// Add or overwrite a placeholder. Routes registered earlier keep the old meaning.
    pub fn add_placeholder(&mut self, name: impl Into<String>, regex: impl Into<String>) -> &mut Self {
        self.placeholders.add(name, regex);
        self
    }

    pub fn add_placeholders<I, K, V>(&mut self, placeholders: I) -> &mut Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        self.placeholders.extend(placeholders);
        self
    }

    #[must_use]
    pub fn placeholders(&self) -> &PlaceholderTable {
        &self.placeholders
    }

    pub fn set_default_namespace(&mut self, namespace: impl Into<String>) -> &mut Self {
        self.table.settings_mut().default_namespace = namespace.into();
        self
    }

    pub fn set_default_controller(&mut self, controller: impl Into<String>) -> &mut Self {
        self.table.settings_mut().default_controller = controller.into();
        self
    }

    pub fn set_default_method(&mut self, method: impl Into<String>) -> &mut Self {
        self.table.settings_mut().default_method = method.into();
        self
    }

    /// Suffix appended to controller class names; empty disables it.
    pub fn set_controller_suffix(&mut self, suffix: impl Into<String>) -> &mut Self {
        self.table.settings_mut().controller_suffix = suffix.into();
        self
    }

    pub fn set_translate_uri_dashes(&mut self, translate: bool) -> &mut Self {
        self.table.settings_mut().translate_uri_dashes = translate;
        self
    }

    /// Sort low-priority routes after normal ones at match time.
    pub fn set_prioritize(&mut self, prioritize: bool) -> &mut Self {
        self.table.settings_mut().prioritize = prioritize;
        self
    }

    pub fn set_http_verb(&mut self, verb: Method) -> &mut Self {
        self.table.settings_mut().http_verb = verb;
        self
    }

    pub fn set_supported_locales<I, S>(&mut self, locales: I, only_supported: bool) -> &mut Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let settings = self.table.settings_mut();
        settings.supported_locales = locales.into_iter().map(Into::into).collect();
        settings.use_supported_locales_only = only_supported;
        self
    }

    #[must_use]
    pub fn settings(&self) -> &RouteSettings {
        self.table.settings()
    }

    /// Remove every registered route. Settings and placeholders are kept.
    pub fn reset_routes(&mut self) -> &mut Self {
        self.table.clear();
        self
    }

    // --- registration -------------------------------------------------------

    /// Register a route for every verb.
    pub fn add(&mut self, from: &str, to: impl Into<HandlerSpec>) -> Result<&mut Self, RouteError> {
        self.route(Verb::Any, from, to, RouteOptions::default())
    }

    pub fn add_with(
        &mut self,
        from: &str,
        to: impl Into<HandlerSpec>,
        options: RouteOptions,
    ) -> Result<&mut Self, RouteError> {
        self.route(Verb::Any, from, to, options)
    }

    pub fn get(&mut self, from: &str, to: impl Into<HandlerSpec>) -> Result<&mut Self, RouteError> {
        self.route(Verb::Method(Method::GET), from, to, RouteOptions::default())
    }

    pub fn post(&mut self, from: &str, to: impl Into<HandlerSpec>) -> Result<&mut Self, RouteError> {
        self.route(Verb::Method(Method::POST), from, to, RouteOptions::default())
    }

    pub fn put(&mut self, from: &str, to: impl Into<HandlerSpec>) -> Result<&mut Self, RouteError> {
        self.route(Verb::Method(Method::PUT), from, to, RouteOptions::default())
    }

    pub fn patch(&mut self, from: &str, to: impl Into<HandlerSpec>) -> Result<&mut Self, RouteError> {
        self.route(Verb::Method(Method::PATCH), from, to, RouteOptions::default())
    }

    pub fn delete(&mut self, from: &str, to: impl Into<HandlerSpec>) -> Result<&mut Self, RouteError> {
        self.route(Verb::Method(Method::DELETE), from, to, RouteOptions::default())
    }

    pub fn head(&mut self, from: &str, to: impl Into<HandlerSpec>) -> Result<&mut Self, RouteError> {
        self.route(Verb::Method(Method::HEAD), from, to, RouteOptions::default())
    }

    pub fn options(&mut self, from: &str, to: impl Into<HandlerSpec>) -> Result<&mut Self, RouteError> {
        self.route(Verb::Method(Method::OPTIONS), from, to, RouteOptions::default())
    }

    /// Register one route under one verb bucket.
    pub fn route(
        &mut self,
        verb: Verb,
        from: &str,
        to: impl Into<HandlerSpec>,
        options: RouteOptions,
    ) -> Result<&mut Self, RouteError> {
        self.register(&[verb], from, to.into(), options)?;
        Ok(self)
    }

    /// Register one definition under several verb buckets.
    pub fn match_verbs(
        &mut self,
        verbs: &[Method],
        from: &str,
        to: impl Into<HandlerSpec>,
        options: RouteOptions,
    ) -> Result<&mut Self, RouteError> {
        let verbs: Vec<Verb> = verbs.iter().cloned().map(Verb::Method).collect();
        self.register(&verbs, from, to.into(), options)?;
        Ok(self)
    }

    /// Register routes inside a group.
    ///
    /// The prefix is joined to the enclosing group's prefix with `/`, middleware is
    /// appended to the enclosing list, and a namespace replaces the enclosing one.
    /// The group frame is popped when `register` returns, even on error.
    pub fn group<F>(
        &mut self,
        prefix: &str,
        options: GroupOptions,
        register: F,
    ) -> Result<&mut Self, RouteError>
    where
        F: FnOnce(&mut RouteCollection) -> Result<(), RouteError>,
    {
        let frame = self.current_group().nest(prefix, &options);
        debug!(prefix = %frame.prefix(), "Entering route group");
        self.groups.push(frame);
        let result = register(self);
        self.groups.pop();
        result.map(|()| self)
    }

    /// Synthesize the seven CRUD routes for `name` under the current group.
    pub fn resource(&mut self, name: &str, options: ResourceOptions) -> Result<&mut Self, RouteError> {
        let name = name.trim_matches('/');
        let controller = options
            .controller
            .clone()
            .unwrap_or_else(|| default_resource_controller(name));
        let id = options.placeholder.as_deref().unwrap_or("{id}");

        for action in RESOURCE_ACTIONS {
            if !options.wants(action) {
                continue;
            }
            let (verbs, path, method): (Vec<Verb>, String, String) = match action {
                "index" => (vec![Verb::Method(Method::GET)], name.to_string(), "index".into()),
                "new" => (vec![Verb::Method(Method::GET)], format!("{name}/new"), "new".into()),
                "create" => (vec![Verb::Method(Method::POST)], name.to_string(), "create".into()),
                "show" => (
                    vec![Verb::Method(Method::GET)],
                    format!("{name}/{id}"),
                    "show/$1".into(),
                ),
                "edit" => (
                    vec![Verb::Method(Method::GET)],
                    format!("{name}/{id}/edit"),
                    "edit/$1".into(),
                ),
                "update" => (
                    vec![Verb::Method(Method::PUT), Verb::Method(Method::PATCH)],
                    format!("{name}/{id}"),
                    "update/$1".into(),
                ),
                _ => (
                    vec![Verb::Method(Method::DELETE)],
                    format!("{name}/{id}"),
                    "delete/$1".into(),
                ),
            };

            let mut route_options = RouteOptions::new()
                .name(format!("{name}.{action}"))
                .middlewares(options.middleware.iter().cloned());
            route_options.namespace = options.namespace.clone();

            let handler = HandlerSpec::ControllerMethod {
                controller: controller.clone(),
                method,
            };
            self.register(&verbs, &path, handler, route_options)?;
        }
        Ok(self)
    }

    /// Register a redirect from `from` to a route name or a literal path.
    pub fn add_redirect(&mut self, from: &str, to: &str, status: u16) -> Result<&mut Self, RouteError> {
        let target = match self.table.named_route(to) {
            Some(_) => self.table.reverse_route(to, &[])?,
            None => to.to_string(),
        };
        let handler = HandlerSpec::Redirect { target, status };
        self.register(&[Verb::Any], from, handler, RouteOptions::default())?;
        Ok(self)
    }

    /// Compile the current routes into a shareable table.
    #[must_use]
    pub fn compile(&self) -> RouteTable {
        self.table.clone()
    }

    /// Consume the collection, yielding its table without cloning.
    #[must_use]
    pub fn into_table(self) -> RouteTable {
        self.table
    }

    /// Read-only view of the table under construction.
    #[must_use]
    pub fn table(&self) -> &RouteTable {
        &self.table
    }

    // --- internals ----------------------------------------------------------

    fn current_group(&self) -> GroupContext {
        self.groups.last().cloned().unwrap_or_default()
    }

    pub(crate) fn table_mut(&mut self) -> &mut RouteTable {
        &mut self.table
    }

    fn register(
        &mut self,
        verbs: &[Verb],
        from: &str,
        handler: HandlerSpec,
        options: RouteOptions,
    ) -> Result<(), RouteError> {
        let group = self.current_group();
        let pattern = group.prefixed(from);
        let options = group.apply(options);

        let route = RouteDefinition::new(
            &pattern,
            verbs.to_vec(),
            handler,
            options,
            &self.placeholders,
        )?;

        if let HandlerSpec::ControllerMethod { controller, .. } = route.handler() {
            if !has_backreference(controller) {
                let qualified = self
                    .table
                    .settings()
                    .qualify_controller(controller, route.options().namespace.as_deref());
                self.table.register_controller(qualified);
            }
        }

        let route = Arc::new(route);
        for verb in verbs {
            if self.table.insert(verb, Arc::clone(&route)) {
                debug!(
                    verb = %verb,
                    pattern = %route.raw_pattern(),
                    regex = %route.compiled_regex(),
                    handler = %route.handler(),
                    priority = route.priority(),
                    "Route compiled"
                );
            } else {
                debug!(
                    verb = %verb,
                    pattern = %route.raw_pattern(),
                    "Duplicate route ignored; first registration wins"
                );
            }
        }
        Ok(())
    }
}

fn default_resource_controller(name: &str) -> String {
    let short = name.rsplit('/').next().unwrap_or(name);
    let mut chars = short.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

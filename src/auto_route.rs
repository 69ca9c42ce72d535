//! Auto-discovered routes.
//!
//! Controller discovery (scanning classes and their public methods) happens
//! outside this crate. A discoverer hands over already-synthesized
//! [`AutoRoute`] entries through [`AutoRouteSource`], and
//! [`RouteCollection::add_auto_routes`] stores them as low-priority candidates
//! that the matcher consults only after every explicit route has failed.
//!
//! Two conventions are applied while importing:
//!
//! - controllers that already have explicit routes are skipped, so auto-routing
//!   cannot expose a method the explicit table chose not to
//! - a trailing default-method segment may be omitted (`blog/index` is also
//!   reachable as `blog`), and the default controller's default method is also
//!   reachable at the root path

use crate::collection::{HandlerSpec, RouteCollection, RouteDefinition, RouteOptions, Verb};
use crate::error::RouteError;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{debug, info};

/// Priority assigned to every auto-discovered route.
pub const AUTO_ROUTE_PRIORITY: u8 = 1;

/// One synthesized route: `{verb, route, handler}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AutoRoute {
    /// HTTP verb, or `*` for any
    #[serde(default = "default_verb")]
    pub verb: String,
    /// Literal path, e.g. `blog/index`
    pub route: String,
    /// `Controller::method` handler string
    pub handler: String,
}

fn default_verb() -> String {
    "*".to_string()
}

impl AutoRoute {
    pub fn new(verb: impl Into<String>, route: impl Into<String>, handler: impl Into<String>) -> Self {
        Self {
            verb: verb.into(),
            route: route.into(),
            handler: handler.into(),
        }
    }
}

/// Supplier of auto-discovered routes.
pub trait AutoRouteSource {
    fn auto_routes(&self) -> Vec<AutoRoute>;
}

impl AutoRouteSource for [AutoRoute] {
    fn auto_routes(&self) -> Vec<AutoRoute> {
        self.to_vec()
    }
}

impl AutoRouteSource for Vec<AutoRoute> {
    fn auto_routes(&self) -> Vec<AutoRoute> {
        self.clone()
    }
}

impl RouteCollection {
    /// Import auto-discovered routes, returning how many candidates were added
    /// (elided variants included).
    pub fn add_auto_routes(&mut self, source: &dyn AutoRouteSource) -> Result<usize, RouteError> {
        let mut added = 0;
        for auto in source.auto_routes() {
            let verb = Verb::parse(&auto.verb)?;
            let handler = HandlerSpec::parse(&auto.handler);
            let HandlerSpec::ControllerMethod { controller, method } = &handler else {
                return Err(RouteError::config(format!(
                    "auto route '{}' needs a Controller::method handler",
                    auto.route
                )));
            };

            let settings = self.settings();
            let qualified = settings.qualify_controller(controller, None);
            if self.table().is_registered_controller(&qualified) {
                debug!(controller = %qualified, route = %auto.route, "Auto route skipped for explicitly routed controller");
                continue;
            }

            let is_default_method = method.is_empty() || method == &settings.default_method;
            let is_default_controller = qualified.eq_ignore_ascii_case(&settings.default_controller_name());
            let variants = route_variants(
                &auto.route,
                &settings.default_method,
                is_default_method,
                is_default_controller,
            );

            for path in variants {
                let options = RouteOptions::new().priority(AUTO_ROUTE_PRIORITY);
                let route = RouteDefinition::new(
                    &path,
                    vec![verb.clone()],
                    handler.clone(),
                    options,
                    self.placeholders(),
                )?;
                if self.table_mut().insert_auto(verb.clone(), Arc::new(route)) {
                    added += 1;
                }
            }
        }
        info!(count = added, "Auto routes imported");
        Ok(added)
    }
}

/// The path itself plus the elided forms it is reachable under.
fn route_variants(
    route: &str,
    default_method: &str,
    is_default_method: bool,
    is_default_controller: bool,
) -> Vec<String> {
    let route = route.trim_matches('/');
    let mut variants = vec![route.to_string()];
    if !is_default_method {
        return variants;
    }

    let elided = match route.rsplit_once('/') {
        Some((head, last)) if last.eq_ignore_ascii_case(default_method) => Some(head.to_string()),
        None if route.eq_ignore_ascii_case(default_method) => Some(String::new()),
        _ => None,
    };
    if let Some(elided) = elided {
        variants.push(elided);
    }
    if is_default_controller && !variants.iter().any(String::is_empty) {
        variants.push(String::new());
    }
    variants
}

//! Handler resolution.
//!
//! Turns a [`MatchedRoute`] into a [`MatchResult`]: backreference substitution,
//! namespace qualification, dash translation and locale extraction, plus the two
//! security checks on handler strings:
//!
//! 1. the controller half must use `\` as namespace delimiter, never `/`
//! 2. the controller half must not reference a capture group, since that would let
//!    the URL choose which class is instantiated

use super::core::{HandlerTarget, MatchResult};
use super::matcher::MatchedRoute;
use crate::collection::{has_backreference, substitute_backreferences, HandlerSpec, RouteSettings};
use crate::error::RouteError;
use http::Method;
use tracing::warn;

/// Resolves matched routes against a table's settings.
#[derive(Debug, Clone, Copy)]
pub struct HandlerResolver<'a> {
    settings: &'a RouteSettings,
}

impl<'a> HandlerResolver<'a> {
    #[must_use]
    pub fn new(settings: &'a RouteSettings) -> Self {
        Self { settings }
    }

    /// Produce the final result for a matched route.
    ///
    /// `verb` and `path` are only used for error reporting.
    pub fn resolve(
        &self,
        verb: &Method,
        path: &str,
        matched: MatchedRoute<'_>,
    ) -> Result<MatchResult, RouteError> {
        let MatchedRoute {
            route,
            captures,
            locale,
            auto_routed,
        } = matched;

        if let Some(locale) = locale.as_deref() {
            if !self.settings.accepts_locale(locale) {
                warn!(locale = %locale, path = %path, "Unsupported locale in request path");
                return Err(RouteError::not_found(verb.as_str(), path));
            }
        }

        let (target, method, params) = match route.handler() {
            HandlerSpec::Redirect { target, status } => {
                return Err(RouteError::Redirect {
                    target: substitute_backreferences(target, &captures),
                    status: *status,
                });
            }
            HandlerSpec::Closure(closure) => (
                HandlerTarget::Closure(closure.clone()),
                self.settings.default_method.clone(),
                captures.into_vec(),
            ),
            HandlerSpec::ControllerMethod { controller, method } => {
                let handler = route.handler().to_string();
                if has_backreference(controller) {
                    warn!(handler = %handler, path = %path, "Rejected dynamic controller");
                    return Err(RouteError::DynamicController { handler });
                }
                if controller.contains('/') {
                    warn!(handler = %handler, "Rejected controller using '/' as namespace delimiter");
                    return Err(RouteError::InvalidControllerName { handler });
                }

                let call = substitute_backreferences(method, &captures);
                let mut segments = call.split('/');
                let method_name = segments
                    .next()
                    .filter(|m| !m.is_empty())
                    .unwrap_or(self.settings.default_method.as_str())
                    .to_string();
                let params: Vec<String> = segments.map(str::to_string).collect();

                let controller = self
                    .settings
                    .qualify_controller(controller, route.options().namespace.as_deref());

                if self.settings.translate_uri_dashes {
                    (
                        HandlerTarget::Controller(translate_short_name(&controller)),
                        method_name.replace('-', "_"),
                        params,
                    )
                } else {
                    (HandlerTarget::Controller(controller), method_name, params)
                }
            }
        };

        Ok(MatchResult {
            target,
            method,
            params,
            middlewares: route.options().middleware.clone(),
            options: route.options().clone(),
            locale,
            route_pattern: route.raw_pattern().to_string(),
            auto_routed,
        })
    }
}

/// Rewrite dashes in the class name only; the namespace is left alone.
fn translate_short_name(controller: &str) -> String {
    match controller.rsplit_once('\\') {
        Some((namespace, short)) => format!("{namespace}\\{}", short.replace('-', "_")),
        None => controller.replace('-', "_"),
    }
}

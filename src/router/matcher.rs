//! Route matching - hot path.
//!
//! Pure function of `(table, verb, host, path)`: walks the candidates in table
//! order and stops at the first anchored regex match. There is no scoring and no
//! backtracking across candidates; ordering is the only tie-break.
//!
//! Lookup order:
//! 1. explicit routes against the path itself
//! 2. explicit routes resolving to the default method, against the path with the
//!    elided default segments restored (`blog` as `blog/index`, `` as `home/index`)
//! 3. auto-discovered routes

use crate::collection::{substitute_backreferences, HandlerSpec, RouteDefinition, RouteSettings, RouteTable};
use http::Method;
use smallvec::SmallVec;

/// Maximum number of captured groups before heap allocation.
/// Most routes capture ≤4 segments (e.g. `users/(:num)/posts/(:slug)`).
pub const MAX_INLINE_PARAMS: usize = 8;

/// Stack-allocated storage for captured groups, 1-indexed for `$N` substitution.
pub type CaptureVec = SmallVec<[String; MAX_INLINE_PARAMS]>;

/// A route selected by the matcher plus what it captured.
#[derive(Debug, Clone)]
pub struct MatchedRoute<'a> {
    pub route: &'a RouteDefinition,
    /// Captured groups in order, excluding the locale group; non-participating groups are empty
    pub captures: CaptureVec,
    /// Value of the `{locale}` group, if the pattern has one
    pub locale: Option<String>,
    /// True when the route came from auto-discovery rather than explicit registration
    pub auto_routed: bool,
}

/// Percent-decode a request path once and trim surrounding slashes.
///
/// Invalid UTF-8 sequences are replaced rather than rejected so that a malformed
/// path degrades into a 404 instead of an error of its own.
#[must_use]
pub fn normalize_path(uri: &str) -> String {
    let decoded = urlencoding::decode_binary(uri.as_bytes());
    String::from_utf8_lossy(&decoded).trim_matches('/').to_string()
}

/// Selects the winning [`RouteDefinition`] for a request.
#[derive(Debug, Clone, Copy)]
pub struct RouteMatcher<'a> {
    table: &'a RouteTable,
}

impl<'a> RouteMatcher<'a> {
    #[must_use]
    pub fn new(table: &'a RouteTable) -> Self {
        Self { table }
    }

    /// Find the first route matching `path` (already normalized).
    ///
    /// Explicit routes are tried first in table order; auto-discovered routes are
    /// consulted only when none of them matches.
    #[must_use]
    pub fn find(&self, verb: &Method, host: Option<&str>, path: &str) -> Option<MatchedRoute<'a>> {
        let table = self.table;
        if let Some(found) = table
            .candidates(verb)
            .find_map(|route| capture(route, host, path, false))
        {
            return Some(found);
        }
        if let Some(found) = self.find_elided(verb, host, path) {
            return Some(found);
        }
        table
            .auto_candidates(verb)
            .find_map(|route| capture(route, host, path, true))
    }
}

impl<'a> RouteMatcher<'a> {
    fn find_elided(&self, verb: &Method, host: Option<&str>, path: &str) -> Option<MatchedRoute<'a>> {
        let settings = self.table.settings();
        let default_method = settings.default_method.as_str();
        let restored = if path.is_empty() {
            let controller = settings.default_controller.to_ascii_lowercase();
            vec![controller.clone(), format!("{controller}/{default_method}")]
        } else {
            vec![format!("{path}/{default_method}")]
        };

        restored.iter().find_map(|candidate| {
            self.table.candidates(verb).find_map(|route| {
                let found = capture(route, host, candidate, false)?;
                resolves_to_default(&found, settings, path.is_empty()).then_some(found)
            })
        })
    }
}

/// Whether a match names the default method, and for the root path also the
/// default controller.
fn resolves_to_default(found: &MatchedRoute<'_>, settings: &RouteSettings, root: bool) -> bool {
    let HandlerSpec::ControllerMethod { controller, method } = found.route.handler() else {
        return false;
    };
    let call = substitute_backreferences(method, &found.captures);
    let method = call.split('/').next().filter(|m| !m.is_empty());
    if !method.map_or(true, |m| m.eq_ignore_ascii_case(&settings.default_method)) {
        return false;
    }
    !root
        || settings
            .qualify_controller(controller, found.route.options().namespace.as_deref())
            .eq_ignore_ascii_case(&settings.default_controller_name())
}

fn capture<'a>(
    route: &'a RouteDefinition,
    host: Option<&str>,
    path: &str,
    auto_routed: bool,
) -> Option<MatchedRoute<'a>> {
    if !route.matches_host(host) {
        return None;
    }
    let caps = route.pattern().regex().captures(path)?;
    let locale_group = route.pattern().locale_group();

    let mut captures = CaptureVec::new();
    let mut locale = None;
    for index in 1..caps.len() {
        let value = caps.get(index).map_or("", |m| m.as_str());
        if Some(index) == locale_group {
            locale = Some(value.to_string());
        } else {
            captures.push(value.to_string());
        }
    }

    Some(MatchedRoute {
        route,
        captures,
        locale,
        auto_routed,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalize_decodes_once_and_trims() {
        assert_eq!(normalize_path("/news/a0%E0%A6%80%E0%A7%BF-/"), "news/a0ঀ৿-");
        assert_eq!(normalize_path("/"), "");
        assert_eq!(normalize_path("a%2525b"), "a%25b");
    }

    #[test]
    fn invalid_utf8_is_replaced() {
        assert_eq!(normalize_path("bad/%FF"), "bad/\u{FFFD}");
    }
}

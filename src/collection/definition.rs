//! Route definitions and pattern compilation.
//!
//! A [`RouteDefinition`] is created once, when a route is registered, and never
//! mutated afterwards. Compilation expands placeholder tokens against the owning
//! collection's [`PlaceholderTable`] at that moment:
//!
//! - `(:name)` becomes `(<fragment>)`; unknown names are rejected
//! - `{locale}` becomes the named group `(?P<locale>[^/]+)`, excluded from `$N` numbering
//! - `{name}` becomes `(<fragment>)` when `name` is a placeholder, `([^/]+)` otherwise
//!
//! Everything else in the pattern is passed to the regex engine untouched, so
//! hand-written groups such as `([a-z0-9\x{0980}-\x{09ff}-]+)` work as expected.

use crate::error::RouteError;
use crate::placeholder::PlaceholderTable;
use http::Method;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;
use std::sync::Arc;

static PLACEHOLDER_TOKEN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\(:([A-Za-z_][A-Za-z0-9_]*)\)").expect("placeholder token regex should be valid")
});

// braces after an escape letter (`\p{L}`, `\x{e9}`) belong to the escape, not a token
static BRACE_TOKEN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(\\[A-Za-z])?\{([A-Za-z_][A-Za-z0-9_]*)\}").expect("brace token regex should be valid")
});

static BACKREFERENCE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\$([0-9]+)").expect("backreference regex should be valid"));

/// Name of the capture group that carries the locale segment.
pub const LOCALE_GROUP: &str = "locale";

/// HTTP verb bucket a route is registered under.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Verb {
    /// Matches every verb, consulted after the verb-specific bucket
    Any,
    Method(Method),
}

impl Verb {
    /// Parse `get`, `POST`, `*`, `any`, ...
    pub fn parse(verb: &str) -> Result<Self, RouteError> {
        let trimmed = verb.trim();
        if trimmed == "*" || trimmed.eq_ignore_ascii_case("any") || trimmed.eq_ignore_ascii_case("add") {
            return Ok(Verb::Any);
        }
        Method::from_bytes(trimmed.to_ascii_uppercase().as_bytes())
            .map(Verb::Method)
            .map_err(|_| RouteError::config(format!("invalid HTTP verb '{verb}'")))
    }

    #[must_use]
    pub fn accepts(&self, method: &Method) -> bool {
        match self {
            Verb::Any => true,
            Verb::Method(m) => m == method,
        }
    }
}

impl fmt::Display for Verb {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Verb::Any => write!(f, "*"),
            Verb::Method(m) => write!(f, "{}", m.as_str().to_ascii_lowercase()),
        }
    }
}

impl From<Method> for Verb {
    fn from(method: Method) -> Self {
        Verb::Method(method)
    }
}

/// Per-route options.
///
/// Group options are folded in at registration: middleware lists are merged
/// (group first), namespace/hostname/subdomain fall back to the group's value.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RouteOptions {
    /// Route name used for reverse routing and redirects
    #[serde(alias = "as", skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub middleware: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub namespace: Option<String>,
    /// 0 = normal, >= 1 = low priority (sorted last when prioritization is on)
    pub priority: u8,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hostname: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub subdomain: Option<String>,
}

impl RouteOptions {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    #[must_use]
    pub fn middleware(mut self, middleware: impl Into<String>) -> Self {
        self.middleware.push(middleware.into());
        self
    }

    #[must_use]
    pub fn middlewares<I, S>(mut self, middlewares: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.middleware.extend(middlewares.into_iter().map(Into::into));
        self
    }

    #[must_use]
    pub fn namespace(mut self, namespace: impl Into<String>) -> Self {
        self.namespace = Some(namespace.into());
        self
    }

    #[must_use]
    pub fn priority(mut self, priority: u8) -> Self {
        self.priority = priority;
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

type ClosureFn = dyn Fn(&[String]) -> Value + Send + Sync;

/// A callable route handler supplied by the host application.
#[derive(Clone)]
pub struct ClosureHandler {
    callable: Arc<ClosureFn>,
    param_count: usize,
}

impl ClosureHandler {
    pub fn new<F>(param_count: usize, callable: F) -> Self
    where
        F: Fn(&[String]) -> Value + Send + Sync + 'static,
    {
        Self {
            callable: Arc::new(callable),
            param_count,
        }
    }

    /// Number of parameters the callable expects.
    #[must_use]
    pub fn param_count(&self) -> usize {
        self.param_count
    }

    pub fn call(&self, params: &[String]) -> Value {
        (self.callable)(params)
    }
}

impl fmt::Debug for ClosureHandler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClosureHandler")
            .field("param_count", &self.param_count)
            .finish_non_exhaustive()
    }
}

/// What a route resolves to.
#[derive(Debug, Clone)]
pub enum HandlerSpec {
    /// `Namespace\Controller::method/$1/$2`; both halves may embed `$N`
    ControllerMethod {
        controller: String,
        /// Everything right of `::`, empty when the handler names only a controller
        method: String,
    },
    Closure(ClosureHandler),
    /// Short-circuits resolution with [`RouteError::Redirect`]
    Redirect { target: String, status: u16 },
}

impl HandlerSpec {
    /// Split a handler string on `::`.
    #[must_use]
    pub fn parse(handler: &str) -> Self {
        let (controller, method) = match handler.split_once("::") {
            Some((controller, method)) => (controller, method),
            None => (handler, ""),
        };
        HandlerSpec::ControllerMethod {
            controller: controller.to_string(),
            method: method.to_string(),
        }
    }

    pub fn closure<F>(param_count: usize, callable: F) -> Self
    where
        F: Fn(&[String]) -> Value + Send + Sync + 'static,
    {
        HandlerSpec::Closure(ClosureHandler::new(param_count, callable))
    }

    #[must_use]
    pub fn is_closure(&self) -> bool {
        matches!(self, HandlerSpec::Closure(_))
    }

    /// Highest `$N` referenced anywhere in the handler.
    #[must_use]
    pub fn max_backreference(&self) -> usize {
        match self {
            HandlerSpec::ControllerMethod { controller, method } => {
                max_backreference(controller).max(max_backreference(method))
            }
            HandlerSpec::Redirect { target, .. } => max_backreference(target),
            HandlerSpec::Closure(_) => 0,
        }
    }
}

impl fmt::Display for HandlerSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            HandlerSpec::ControllerMethod { controller, method } if method.is_empty() => {
                write!(f, "{controller}")
            }
            HandlerSpec::ControllerMethod { controller, method } => {
                write!(f, "{controller}::{method}")
            }
            HandlerSpec::Closure(_) => write!(f, "(Closure)"),
            HandlerSpec::Redirect { target, status } => write!(f, "(Redirect {status}) {target}"),
        }
    }
}

impl From<&str> for HandlerSpec {
    fn from(handler: &str) -> Self {
        HandlerSpec::parse(handler)
    }
}

impl From<String> for HandlerSpec {
    fn from(handler: String) -> Self {
        HandlerSpec::parse(&handler)
    }
}

impl From<ClosureHandler> for HandlerSpec {
    fn from(closure: ClosureHandler) -> Self {
        HandlerSpec::Closure(closure)
    }
}

/// True when `template` contains a `$N` reference.
#[must_use]
pub fn has_backreference(template: &str) -> bool {
    BACKREFERENCE.is_match(template)
}

fn max_backreference(template: &str) -> usize {
    BACKREFERENCE
        .captures_iter(template)
        .filter_map(|c| c.get(1).and_then(|m| m.as_str().parse::<usize>().ok()))
        .max()
        .unwrap_or(0)
}

/// Replace every `$N` (N >= 1) with `captures[N - 1]`; out-of-range references become empty.
#[must_use]
pub fn substitute_backreferences(template: &str, captures: &[String]) -> String {
    BACKREFERENCE
        .replace_all(template, |caps: &regex::Captures<'_>| {
            let index = caps
                .get(1)
                .and_then(|m| m.as_str().parse::<usize>().ok())
                .unwrap_or(0);
            match index {
                0 => caps.get(0).map_or("", |m| m.as_str()).to_string(),
                n => captures.get(n - 1).cloned().unwrap_or_default(),
            }
        })
        .into_owned()
}

/// One piece of a compiled pattern, used to rebuild paths for reverse routing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum PatternPiece {
    Literal(String),
    /// A top-level capture group and its inner regex
    Group(String),
    Locale,
    /// Regex syntax with no single literal expansion: `(?:a|b)`, `[abc]`, `x+`, `|`
    Syntax(String),
}

/// A route pattern after placeholder expansion.
#[derive(Debug, Clone)]
pub struct CompiledPattern {
    raw: String,
    source: String,
    regex: Regex,
    group_count: usize,
    locale_group: Option<usize>,
    pieces: Vec<PatternPiece>,
}

impl CompiledPattern {
    /// Expand tokens in `raw` (already slash-trimmed) and compile `^...$`.
    pub fn compile(raw: &str, placeholders: &PlaceholderTable) -> Result<Self, RouteError> {
        let source = expand_tokens(raw, placeholders)?;
        let regex = Regex::new(&format!("^{source}$")).map_err(|e| {
            RouteError::config(format!("route '{raw}' does not compile to a valid regex: {e}"))
        })?;

        let locale_group = regex
            .capture_names()
            .position(|name| name == Some(LOCALE_GROUP));
        let total = regex.captures_len().saturating_sub(1);
        let group_count = total - usize::from(locale_group.is_some());

        Ok(Self {
            raw: raw.to_string(),
            pieces: split_pieces(&source),
            source,
            regex,
            group_count,
            locale_group,
        })
    }

    /// The pattern as registered (after group prefixing).
    #[must_use]
    pub fn raw(&self) -> &str {
        &self.raw
    }

    /// Regex source without anchors.
    #[must_use]
    pub fn source(&self) -> &str {
        &self.source
    }

    #[must_use]
    pub fn regex(&self) -> &Regex {
        &self.regex
    }

    /// Capture groups addressable as `$N` (the locale group is not counted).
    #[must_use]
    pub fn group_count(&self) -> usize {
        self.group_count
    }

    #[must_use]
    pub fn locale_group(&self) -> Option<usize> {
        self.locale_group
    }

    #[must_use]
    pub fn has_locale(&self) -> bool {
        self.locale_group.is_some()
    }

    pub(crate) fn pieces(&self) -> &[PatternPiece] {
        &self.pieces
    }
}

fn expand_tokens(raw: &str, placeholders: &PlaceholderTable) -> Result<String, RouteError> {
    let mut expanded = String::with_capacity(raw.len() + 16);
    let mut last = 0;
    for caps in PLACEHOLDER_TOKEN.captures_iter(raw) {
        let (Some(whole), Some(name)) = (caps.get(0), caps.get(1)) else {
            continue;
        };
        let fragment = placeholders.get(name.as_str()).ok_or_else(|| {
            RouteError::config(format!(
                "unknown placeholder '(:{})' in route '{raw}'",
                name.as_str()
            ))
        })?;
        expanded.push_str(&raw[last..whole.start()]);
        expanded.push('(');
        expanded.push_str(fragment);
        expanded.push(')');
        last = whole.end();
    }
    expanded.push_str(&raw[last..]);

    let mut result = String::with_capacity(expanded.len() + 16);
    let mut last = 0;
    for caps in BRACE_TOKEN.captures_iter(&expanded) {
        let (Some(whole), Some(name)) = (caps.get(0), caps.get(2)) else {
            continue;
        };
        if caps.get(1).is_some() {
            continue;
        }
        result.push_str(&expanded[last..whole.start()]);
        match name.as_str() {
            LOCALE_GROUP => result.push_str("(?P<locale>[^/]+)"),
            other => {
                result.push('(');
                result.push_str(placeholders.get(other).unwrap_or("[^/]+"));
                result.push(')');
            }
        }
        last = whole.end();
    }
    result.push_str(&expanded[last..]);
    Ok(result)
}

fn split_pieces(source: &str) -> Vec<PatternPiece> {
    let chars: Vec<char> = source.chars().collect();
    let mut pieces = Vec::new();
    let mut literal = String::new();
    let mut i = 0;

    while i < chars.len() {
        let c = chars[i];
        if c == '\\' && i + 1 < chars.len() {
            let escaped = chars[i + 1];
            if escaped.is_ascii_alphanumeric() {
                flush(&mut literal, &mut pieces);
                pieces.push(PatternPiece::Syntax(format!("\\{escaped}")));
            } else {
                literal.push(escaped);
            }
            i += 2;
            continue;
        }
        if c == '(' {
            if let Some(end) = closing_paren(&chars, i) {
                let inner: String = chars[i + 1..end].iter().collect();
                if inner.starts_with("?P<locale>") || inner.starts_with("?<locale>") {
                    flush(&mut literal, &mut pieces);
                    pieces.push(PatternPiece::Locale);
                } else if inner.starts_with('?') {
                    flush(&mut literal, &mut pieces);
                    pieces.push(PatternPiece::Syntax(format!("({inner})")));
                } else {
                    flush(&mut literal, &mut pieces);
                    pieces.push(PatternPiece::Group(inner));
                }
                i = end + 1;
                continue;
            }
        }
        if matches!(c, '[' | '|' | '*' | '+' | '?' | '{' | '^' | '$') {
            flush(&mut literal, &mut pieces);
            pieces.push(PatternPiece::Syntax(c.to_string()));
            i += 1;
            continue;
        }
        literal.push(c);
        i += 1;
    }
    flush(&mut literal, &mut pieces);
    pieces
}

fn flush(literal: &mut String, pieces: &mut Vec<PatternPiece>) {
    if !literal.is_empty() {
        pieces.push(PatternPiece::Literal(std::mem::take(literal)));
    }
}

/// Index of the `)` closing the group opened at `open`, skipping escapes and classes.
fn closing_paren(chars: &[char], open: usize) -> Option<usize> {
    let mut depth = 0usize;
    let mut in_class = false;
    let mut i = open;
    while i < chars.len() {
        match chars[i] {
            '\\' => i += 1,
            '[' if !in_class => in_class = true,
            ']' if in_class => in_class = false,
            '(' if !in_class => depth += 1,
            ')' if !in_class => {
                depth -= 1;
                if depth == 0 {
                    return Some(i);
                }
            }
            _ => {}
        }
        i += 1;
    }
    None
}

/// One registered route.
#[derive(Debug, Clone)]
pub struct RouteDefinition {
    pub(crate) pattern: CompiledPattern,
    pub(crate) verbs: Vec<Verb>,
    pub(crate) handler: HandlerSpec,
    pub(crate) options: RouteOptions,
}

impl RouteDefinition {
    /// Compile a route and check its handler against the pattern's capture groups.
    pub fn new(
        pattern: &str,
        verbs: Vec<Verb>,
        handler: HandlerSpec,
        options: RouteOptions,
        placeholders: &PlaceholderTable,
    ) -> Result<Self, RouteError> {
        let pattern = CompiledPattern::compile(pattern, placeholders)?;

        let referenced = handler.max_backreference();
        if referenced > pattern.group_count() {
            return Err(RouteError::config(format!(
                "handler '{handler}' references ${referenced} but route '{}' has only {} capture group(s)",
                pattern.raw(),
                pattern.group_count()
            )));
        }

        Ok(Self {
            pattern,
            verbs,
            handler,
            options,
        })
    }

    #[must_use]
    pub fn raw_pattern(&self) -> &str {
        self.pattern.raw()
    }

    #[must_use]
    pub fn compiled_regex(&self) -> &str {
        self.pattern.source()
    }

    #[must_use]
    pub fn pattern(&self) -> &CompiledPattern {
        &self.pattern
    }

    #[must_use]
    pub fn verbs(&self) -> &[Verb] {
        &self.verbs
    }

    #[must_use]
    pub fn handler(&self) -> &HandlerSpec {
        &self.handler
    }

    #[must_use]
    pub fn options(&self) -> &RouteOptions {
        &self.options
    }

    #[must_use]
    pub fn name(&self) -> Option<&str> {
        self.options.name.as_deref()
    }

    #[must_use]
    pub fn priority(&self) -> u8 {
        self.options.priority
    }

    #[must_use]
    pub fn is_closure(&self) -> bool {
        self.handler.is_closure()
    }

    /// Whether this route may serve a request addressed to `host`.
    ///
    /// Routes without host restrictions always match. Host-restricted routes
    /// never match a request without a host.
    #[must_use]
    pub fn matches_host(&self, host: Option<&str>) -> bool {
        if self.options.hostname.is_none() && self.options.subdomain.is_none() {
            return true;
        }
        let Some(host) = host else {
            return false;
        };
        let host = host.split(':').next().unwrap_or(host).to_ascii_lowercase();

        if let Some(hostname) = &self.options.hostname {
            if !hostname.eq_ignore_ascii_case(&host) {
                return false;
            }
        }
        if let Some(subdomain) = &self.options.subdomain {
            let labels: Vec<&str> = host.split('.').collect();
            if labels.len() < 3 {
                return false;
            }
            if subdomain != "*" && !subdomain.eq_ignore_ascii_case(labels[0]) {
                return false;
            }
        }
        true
    }
}

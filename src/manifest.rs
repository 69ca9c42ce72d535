//! # Route Manifest
//!
//! A declarative route file, the on-disk counterpart of the registration DSL.
//! Used by the CLI and by [`hot_reload`](crate::hot_reload).
//!
//! ```yaml
//! placeholders:
//!   slug: '[a-z0-9-]+'
//! routes:
//!   - verb: get
//!     from: 'books/(:num)/(:alpha)/(:num)'
//!     to: 'Blog::show/$3/$1'
//!     name: books.show
//!   - verbs: [put, patch]
//!     from: 'books/(:num)'
//!     to: 'Blog::update/$1'
//! resources:
//!   - name: photos
//!     only: [index, show]
//! groups:
//!   - prefix: admin
//!     namespace: 'App\Controllers\Admin'
//!     middleware: [session]
//!     routes:
//!       - { verb: get, from: users, to: 'Users::index', middleware: [csrf] }
//! redirects:
//!   - { from: 'old-books/(:num)', to: 'books/$1', status: 301 }
//! auto_routes:
//!   - { verb: get, route: home/index, handler: 'Home::index' }
//! ```
//!
//! Entries are applied in this order: placeholders, routes, resources, groups,
//! redirects, auto routes. Redirects come after routes so they can target route
//! names.

use crate::auto_route::AutoRoute;
use crate::collection::{GroupOptions, ResourceOptions, RouteCollection, RouteOptions, Verb};
use crate::config::{parse_by_extension, RouterConfig};
use crate::error::RouteError;
use anyhow::{Context, Result};
use http::Method;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;
use tracing::info;

/// One explicit route.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RouteEntry {
    /// Single verb; `*`/`any` (the default) registers in the ANY bucket
    #[serde(default)]
    pub verb: Option<String>,
    /// Several verbs sharing one definition; takes precedence over `verb`
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub verbs: Vec<String>,
    pub from: String,
    pub to: String,
    #[serde(flatten)]
    pub options: RouteOptions,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResourceEntry {
    pub name: String,
    #[serde(flatten)]
    pub options: ResourceOptions,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RedirectEntry {
    pub from: String,
    /// Route name or literal path
    pub to: String,
    #[serde(default = "default_redirect_status")]
    pub status: u16,
}

fn default_redirect_status() -> u16 {
    302
}

/// A group and everything registered inside it. Groups nest.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GroupEntry {
    pub prefix: String,
    #[serde(flatten)]
    pub options: GroupOptions,
    #[serde(default)]
    pub routes: Vec<RouteEntry>,
    #[serde(default)]
    pub resources: Vec<ResourceEntry>,
    #[serde(default)]
    pub groups: Vec<GroupEntry>,
}

/// Top-level manifest document.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RouteManifest {
    pub placeholders: BTreeMap<String, String>,
    pub routes: Vec<RouteEntry>,
    pub resources: Vec<ResourceEntry>,
    pub groups: Vec<GroupEntry>,
    pub redirects: Vec<RedirectEntry>,
    pub auto_routes: Vec<AutoRoute>,
}

impl RouteManifest {
    /// Read and parse a manifest; the format follows the file extension.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read route manifest {}", path.display()))?;
        let manifest = Self::parse(path, &content)?;
        info!(
            path = %path.display(),
            routes = manifest.routes.len(),
            resources = manifest.resources.len(),
            groups = manifest.groups.len(),
            redirects = manifest.redirects.len(),
            auto_routes = manifest.auto_routes.len(),
            "Route manifest loaded"
        );
        Ok(manifest)
    }

    pub fn parse(path: &Path, content: &str) -> Result<Self> {
        parse_by_extension(path, content)
    }

    /// Register everything in the manifest on `routes`.
    pub fn apply(&self, routes: &mut RouteCollection) -> Result<(), RouteError> {
        routes.add_placeholders(self.placeholders.clone());
        apply_routes(routes, &self.routes)?;
        apply_resources(routes, &self.resources)?;
        for group in &self.groups {
            apply_group(routes, group)?;
        }
        for redirect in &self.redirects {
            routes.add_redirect(&redirect.from, &redirect.to, redirect.status)?;
        }
        if !self.auto_routes.is_empty() {
            routes.add_auto_routes(&self.auto_routes)?;
        }
        Ok(())
    }

    /// A fresh collection configured from `config` with this manifest applied.
    pub fn build(&self, config: &RouterConfig) -> Result<RouteCollection, RouteError> {
        let mut routes = RouteCollection::with_config(config);
        self.apply(&mut routes)?;
        Ok(routes)
    }
}

fn apply_routes(routes: &mut RouteCollection, entries: &[RouteEntry]) -> Result<(), RouteError> {
    for entry in entries {
        if entry.verbs.len() > 1 {
            let methods = entry
                .verbs
                .iter()
                .map(|v| match Verb::parse(v)? {
                    Verb::Method(method) => Ok(method),
                    Verb::Any => Err(RouteError::config(format!(
                        "route '{}' lists '*' among several verbs",
                        entry.from
                    ))),
                })
                .collect::<Result<Vec<Method>, RouteError>>()?;
            routes.match_verbs(&methods, &entry.from, entry.to.as_str(), entry.options.clone())?;
        } else {
            let verb = entry
                .verbs
                .first()
                .or(entry.verb.as_ref())
                .map(|v| Verb::parse(v))
                .transpose()?
                .unwrap_or(Verb::Any);
            routes.route(verb, &entry.from, entry.to.as_str(), entry.options.clone())?;
        }
    }
    Ok(())
}

fn apply_resources(routes: &mut RouteCollection, entries: &[ResourceEntry]) -> Result<(), RouteError> {
    for entry in entries {
        routes.resource(&entry.name, entry.options.clone())?;
    }
    Ok(())
}

fn apply_group(routes: &mut RouteCollection, group: &GroupEntry) -> Result<(), RouteError> {
    routes.group(&group.prefix, group.options.clone(), |inner| {
        apply_routes(inner, &group.routes)?;
        apply_resources(inner, &group.resources)?;
        for nested in &group.groups {
            apply_group(inner, nested)?;
        }
        Ok(())
    })?;
    Ok(())
}

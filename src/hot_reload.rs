//! # Hot Reload Module
//!
//! Live reloading of a route manifest without restarting the process.
//!
//! ## Overview
//!
//! The live table is held in an [`ArcSwap<RouteTable>`]. Request handlers take
//! a snapshot with `live.load_full()` and build a [`Router`](crate::router::Router)
//! from it, so a request never sees a table that changes under it. When the
//! manifest file changes the watcher:
//!
//! 1. **Parses** the manifest again
//! 2. **Builds** a fresh [`RouteTable`] with the same [`RouterConfig`]
//! 3. **Swaps** it in atomically
//! 4. **Notifies** the `on_reload` callback with the new table
//!
//! ## Usage
//!
//! ```rust,ignore
//! use arc_swap::ArcSwap;
//! use brrtmvc::{config::RouterConfig, hot_reload, router::Router};
//! use std::sync::Arc;
//!
//! let config = RouterConfig::from_env();
//! let live = Arc::new(ArcSwap::from_pointee(hot_reload::load_table("routes.yaml", &config)?));
//! let _watcher = hot_reload::watch_manifest("routes.yaml", config, live.clone(), |table| {
//!     println!("reloaded {} routes", table.len());
//! })?;
//!
//! let mut router = Router::new(live.load_full());
//! router.handle("/books/1")?;
//! ```
//!
//! ## Error Handling
//!
//! A manifest that fails to read, parse or compile is logged and the previous
//! table stays active.

use crate::collection::RouteTable;
use crate::config::RouterConfig;
use crate::manifest::RouteManifest;
use anyhow::{bail, Context, Result};
use arc_swap::ArcSwap;
use notify::{Config, EventKind, RecommendedWatcher, RecursiveMode, Watcher};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{error, info, warn};

/// Compile a manifest into a table using `config`.
pub fn build_table(manifest: &RouteManifest, config: &RouterConfig) -> Result<RouteTable> {
    let routes = manifest
        .build(config)
        .context("failed to register manifest routes")?;
    Ok(routes.into_table())
}

/// Load the manifest at `path` and compile it.
pub fn load_table(path: impl AsRef<Path>, config: &RouterConfig) -> Result<RouteTable> {
    let path = path.as_ref();
    let manifest = RouteManifest::load(path)?;
    build_table(&manifest, config).with_context(|| format!("invalid route manifest {}", path.display()))
}

/// Rebuild from `path` and swap the result into `live`.
///
/// On error `live` is left untouched. An empty file (an editor mid-save) is
/// treated as an error rather than as a manifest without routes.
pub fn reload(path: &Path, config: &RouterConfig, live: &ArcSwap<RouteTable>) -> Result<Arc<RouteTable>> {
    let size = std::fs::metadata(path)
        .with_context(|| format!("failed to stat route manifest {}", path.display()))?
        .len();
    if size == 0 {
        bail!("route manifest {} is empty", path.display());
    }
    let table = Arc::new(load_table(path, config)?);
    let previous = live.swap(Arc::clone(&table));
    info!(
        path = %path.display(),
        previous_routes = previous.len(),
        routes = table.len(),
        "hot-reload: route table swapped"
    );
    Ok(table)
}

/// Watch a manifest file and swap a rebuilt [`RouteTable`] into `live` when it changes.
///
/// The watcher stops when the returned handle is dropped.
pub fn watch_manifest<P, F>(
    manifest_path: P,
    config: RouterConfig,
    live: Arc<ArcSwap<RouteTable>>,
    mut on_reload: F,
) -> notify::Result<RecommendedWatcher>
where
    P: AsRef<Path>,
    F: FnMut(&RouteTable) + Send + 'static,
{
    let path: PathBuf = manifest_path.as_ref().to_path_buf();
    let watch_path = path.clone();

    let mut watcher = RecommendedWatcher::new(
        move |res: notify::Result<notify::Event>| match res {
            Ok(event) => {
                if matches!(event.kind, EventKind::Modify(_) | EventKind::Create(_)) {
                    match reload(&watch_path, &config, &live) {
                        Ok(table) => on_reload(&table),
                        Err(e) => warn!(
                            path = %watch_path.display(),
                            error = %format!("{e:#}"),
                            "hot-reload: keeping previous route table"
                        ),
                    }
                }
            }
            Err(e) => error!(error = %e, "hot-reload: watch error"),
        },
        Config::default(),
    )?;

    watcher.watch(&path, RecursiveMode::NonRecursive)?;
    info!(path = %path.display(), "hot-reload: watching route manifest");
    Ok(watcher)
}

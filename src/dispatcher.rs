//! Dispatcher - turns a [`MatchResult`] into a call.
//!
//! The router only names a controller; the host application decides what code
//! sits behind that name. Controllers are registered under their fully
//! qualified name (`\App\Controllers\BlogController`) and receive the resolved method
//! and positional parameters. Closure routes are called directly.

use crate::router::{HandlerTarget, MatchResult};
use anyhow::{anyhow, bail, Result};
use serde_json::Value;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;
use tracing::{debug, error, info, warn};

/// Code behind a controller name.
pub trait Controller: Send + Sync {
    /// Run `method` with the route's positional parameters.
    fn invoke(&self, method: &str, params: &[String]) -> Result<Value>;
}

impl<F> Controller for F
where
    F: Fn(&str, &[String]) -> Result<Value> + Send + Sync,
{
    fn invoke(&self, method: &str, params: &[String]) -> Result<Value> {
        self(method, params)
    }
}

/// Registry of controllers keyed by fully qualified name.
#[derive(Clone, Default)]
pub struct Dispatcher {
    controllers: HashMap<String, Arc<dyn Controller>>,
}

impl fmt::Debug for Dispatcher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut names: Vec<&String> = self.controllers.keys().collect();
        names.sort();
        f.debug_struct("Dispatcher").field("controllers", &names).finish()
    }
}

impl Dispatcher {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a controller. A controller already registered under the same
    /// name is replaced.
    pub fn register(&mut self, name: &str, controller: Arc<dyn Controller>) -> &mut Self {
        let name = qualified(name);
        if self.controllers.insert(name.clone(), controller).is_some() {
            warn!(controller = %name, "Replaced existing controller");
        } else {
            info!(
                controller = %name,
                total_controllers = self.controllers.len(),
                "Controller registered"
            );
        }
        self
    }

    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.controllers.contains_key(&qualified(name))
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.controllers.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.controllers.is_empty()
    }

    /// Invoke the handler a router resolved.
    pub fn dispatch(&self, result: &MatchResult) -> Result<Value> {
        match &result.target {
            HandlerTarget::Closure(closure) => {
                if result.params.len() < closure.param_count() {
                    bail!(
                        "closure for route '{}' expects {} parameter(s), got {}",
                        result.route_pattern,
                        closure.param_count(),
                        result.params.len()
                    );
                }
                debug!(route = %result.route_pattern, "Dispatching closure");
                Ok(closure.call(&result.params))
            }
            HandlerTarget::Controller(name) => {
                let controller = self.controllers.get(name).ok_or_else(|| {
                    let mut available: Vec<&String> = self.controllers.keys().collect();
                    available.sort();
                    error!(
                        controller = %name,
                        available_controllers = ?available,
                        "Controller not found"
                    );
                    anyhow!("no controller registered as '{name}'")
                })?;
                debug!(
                    controller = %name,
                    method = %result.method,
                    params = ?result.params,
                    "Dispatching controller"
                );
                controller.invoke(&result.method, &result.params)
            }
        }
    }
}

fn qualified(name: &str) -> String {
    if name.starts_with('\\') {
        name.to_string()
    } else {
        format!("\\{name}")
    }
}

//! # CLI Module
//!
//! Command-line introspection of a route manifest.
//!
//! ## Commands
//!
//! ### `routes`
//!
//! List every route in match order:
//!
//! ```bash
//! brrtmvc routes --manifest routes.yaml
//! brrtmvc routes --manifest routes.yaml --format json
//! ```
//!
//! ### `match`
//!
//! Resolve one request and print the result as JSON:
//!
//! ```bash
//! brrtmvc match --manifest routes.yaml --verb get --uri /books/1/title/2
//! ```
//!
//! ### `middleware`
//!
//! Print the middleware that applies to a request (`unknown` when nothing
//! matches, empty for redirects):
//!
//! ```bash
//! brrtmvc middleware --manifest routes.yaml --verb get --uri /admin/users
//! ```
//!
//! Every command accepts `--config <FILE>` (or `BRRTMVC_CONFIG`) with
//! [`RouterConfig`](crate::config::RouterConfig) settings.

mod commands;


pub use commands::{run, run_cli, Cli, Commands, OutputFormat};

use crate::collection::RouteTable;
use crate::config::RouterConfig;
use crate::error::RouteError;
use crate::hot_reload::load_table;
use crate::logging;
use crate::middleware::MiddlewareFinder;
use crate::router::Router;
use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use http::Method;
use serde_json::json;
use std::io::{self, Write};
use std::path::PathBuf;
use std::sync::Arc;

/// Command-line interface for brrtmvc
///
/// Inspects the routes a manifest produces and how requests resolve against them.
#[derive(Parser)]
#[command(name = "brrtmvc")]
#[command(about = "brrtmvc route inspector", long_about = None, version)]
pub struct Cli {
    /// Router settings file (YAML, TOML or JSON)
    #[arg(long, global = true, env = "BRRTMVC_CONFIG")]
    pub config: Option<PathBuf>,

    /// The subcommand to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Available CLI commands
#[derive(Subcommand)]
pub enum Commands {
    /// List every route in match order
    Routes {
        /// Route manifest (YAML, TOML or JSON)
        #[arg(short, long)]
        manifest: PathBuf,

        #[arg(long, value_enum, default_value_t = OutputFormat::Table)]
        format: OutputFormat,
    },
    /// Resolve a request and print the result as JSON
    Match {
        #[arg(short, long)]
        manifest: PathBuf,

        /// HTTP verb of the request
        #[arg(long, default_value = "get")]
        verb: String,

        /// Request path, percent-encoded or not
        #[arg(long)]
        uri: String,

        /// Host header, for hostname/subdomain restricted routes
        #[arg(long)]
        host: Option<String>,
    },
    /// Print the middleware applied to a request
    Middleware {
        #[arg(short, long)]
        manifest: PathBuf,

        #[arg(long, default_value = "get")]
        verb: String,

        #[arg(long)]
        uri: String,

        #[arg(long)]
        host: Option<String>,
    },
}

/// Output format of the `routes` command
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Table,
    Json,
}

/// Parse process arguments, initialize logging and run.
pub fn run_cli() -> Result<()> {
    let cli = Cli::parse();
    if let Err(e) = logging::init_logging() {
        eprintln!("Warning: {e:#}");
    }
    let stdout = io::stdout();
    let mut out = stdout.lock();
    run(&cli, &mut out)
}

/// Run a parsed command, writing its output to `out`.
pub fn run(cli: &Cli, out: &mut dyn Write) -> Result<()> {
    let config = match &cli.config {
        Some(path) => RouterConfig::load(path)?,
        None => RouterConfig::from_env(),
    };

    match &cli.command {
        Commands::Routes { manifest, format } => {
            let table = load_table(manifest, &config)?;
            match format {
                OutputFormat::Table => print_table(&table, out)?,
                OutputFormat::Json => print_json(&table, out)?,
            }
        }
        Commands::Match {
            manifest,
            verb,
            uri,
            host,
        } => {
            let table = Arc::new(load_table(manifest, &config)?);
            let mut router = Router::new(table).with_verb(parse_method(verb)?);
            router.set_host(host.clone());
            let value = match router.handle(uri) {
                Ok(result) => json!({ "status": "matched", "result": result.to_json() }),
                Err(err @ RouteError::NotFound { .. }) => {
                    json!({ "status": "not_found", "message": err.to_string() })
                }
                Err(RouteError::Redirect { target, status }) => {
                    json!({ "status": "redirect", "target": target, "code": status })
                }
                Err(err) => return Err(err).context(format!("failed to resolve '{uri}'")),
            };
            writeln!(out, "{}", serde_json::to_string_pretty(&value)?)?;
        }
        Commands::Middleware {
            manifest,
            verb,
            uri,
            host,
        } => {
            let table = Arc::new(load_table(manifest, &config)?);
            let finder = MiddlewareFinder::new(table);
            let set = finder
                .find_for_host(parse_method(verb)?, uri, host.as_deref())
                .with_context(|| format!("failed to resolve '{uri}'"))?;
            writeln!(out, "{set}")?;
        }
    }
    Ok(())
}

fn parse_method(verb: &str) -> Result<Method> {
    match Method::from_bytes(verb.trim().to_ascii_uppercase().as_bytes()) {
        Ok(method) => Ok(method),
        Err(_) => bail!("invalid HTTP verb '{verb}'"),
    }
}

fn print_table(table: &RouteTable, out: &mut dyn Write) -> Result<()> {
    let rows: Vec<[String; 5]> = table
        .routes()
        .map(|(verb, route)| {
            [
                verb.to_string(),
                format!("/{}", route.raw_pattern()),
                route.handler().to_string(),
                route.name().unwrap_or("").to_string(),
                route.options().middleware.join(","),
            ]
        })
        .collect();

    let headers = ["VERB", "ROUTE", "HANDLER", "NAME", "MIDDLEWARE"];
    let mut widths = headers.map(str::len);
    for row in &rows {
        for (width, cell) in widths.iter_mut().zip(row) {
            *width = (*width).max(cell.chars().count());
        }
    }

    let line = |cells: [&str; 5]| -> String {
        cells
            .iter()
            .zip(widths)
            .map(|(cell, width)| format!("{cell:<width$}"))
            .collect::<Vec<_>>()
            .join("  ")
            .trim_end()
            .to_string()
    };

    writeln!(out, "{}", line(headers))?;
    for row in &rows {
        writeln!(out, "{}", line([&row[0], &row[1], &row[2], &row[3], &row[4]]))?;
    }
    Ok(())
}

fn print_json(table: &RouteTable, out: &mut dyn Write) -> Result<()> {
    let routes: Vec<_> = table
        .routes()
        .map(|(verb, route)| {
            json!({
                "verb": verb.to_string(),
                "route": route.raw_pattern(),
                "regex": route.compiled_regex(),
                "handler": route.handler().to_string(),
                "options": route.options(),
            })
        })
        .collect();
    writeln!(out, "{}", serde_json::to_string_pretty(&routes)?)?;
    Ok(())
}

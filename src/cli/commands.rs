use std::io::Write;
use std::path::PathBuf;

use anyhow::{anyhow, bail, Context, Result};
use clap::{Parser, Subcommand};
use http::Method;

use crate::cache::{FsCacheFile, RouteCache};
use crate::config::RouterConfig;
use crate::dispatcher::DispatchOutcome;
use crate::manifest::RouteManifest;
use crate::request::RoutingRequest;
use crate::route::parse_method;
use crate::router::Router;
use crate::url::UrlType;

/// Command-line interface for wprouter
///
/// Inspects a route manifest: lists routes, dispatches synthetic requests,
/// generates URLs and manages the route cache.
#[derive(Debug, Parser)]
#[command(name = "wprouter")]
#[command(about = "Route inspection and cache management", long_about = None)]
pub struct Cli {
    /// Route manifest (YAML or JSON)
    #[arg(short, long, global = true, env = "WPROUTER_MANIFEST")]
    pub manifest: Option<PathBuf>,

    /// Router configuration file (YAML or JSON); defaults to WPROUTER_* variables
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// The subcommand to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Available CLI commands
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// List registered routes in match order
    Routes {
        /// Print the admin dashboard menu instead
        #[arg(long, default_value_t = false)]
        menu: bool,
    },
    /// Dispatch a synthetic request and print the outcome
    Match {
        /// HTTP method
        method: String,

        /// Request path or URL, query string included
        uri: String,

        /// Treat the request as coming from the admin dashboard
        #[arg(long, default_value_t = false)]
        admin: bool,
    },
    /// Generate the URL of a named route
    Url {
        /// Route name
        name: String,

        /// Parameters as key=value
        params: Vec<String>,

        /// Generate scheme://host URLs
        #[arg(long, default_value_t = false)]
        absolute: bool,

        /// Force https (implies --absolute unless https is the default)
        #[arg(long, default_value_t = false)]
        secure: bool,
    },
    /// Manage the route cache
    Cache {
        /// Cache action
        #[command(subcommand)]
        action: CacheCommand,
    },
}

/// Route cache actions
#[derive(Debug, Clone, Copy, PartialEq, Eq, Subcommand)]
pub enum CacheCommand {
    /// Compile the manifest and write the cache
    Warm {
        /// Discard an existing cache first
        #[arg(long, default_value_t = false)]
        force: bool,
    },
    /// Report whether the cache exists and is usable
    Status,
    /// Delete the cache file
    Clear,
}

/// Execute the parsed command, writing results to stdout.
///
/// # Errors
///
/// Returns an error if:
/// - The configuration or manifest cannot be loaded
/// - A route is misconfigured
/// - The cache cannot be written or removed
pub fn run_cli(cli: Cli) -> Result<()> {
    let stdout = std::io::stdout();
    let mut out = stdout.lock();
    execute(&cli, &mut out)
}

/// Execute the parsed command, writing results to `out`.
///
/// # Errors
///
/// See [`run_cli`].
pub fn execute(cli: &Cli, out: &mut dyn Write) -> Result<()> {
    let config = match &cli.config {
        Some(path) => RouterConfig::from_file(path)?,
        None => RouterConfig::from_env(),
    };

    match &cli.command {
        Commands::Routes { menu } => {
            let router = build_router(cli, &config)?;
            if *menu {
                print_menu(&router, out)
            } else {
                print_routes(&router, out)
            }
        }
        Commands::Match { method, uri, admin } => {
            let router = build_router(cli, &config)?;
            let method =
                parse_method(method).map_err(|_| anyhow!("invalid HTTP method '{method}'"))?;
            let mut request = RoutingRequest::new(method, uri);
            if *admin {
                request = request.with_loading_script(router.admin().prefix());
            }
            let outcome = router.dispatch(&request)?;
            print_outcome(&outcome, out)
        }
        Commands::Url {
            name,
            params,
            absolute,
            secure,
        } => {
            let router = build_router(cli, &config)?;
            let pairs = parse_params(params)?;
            let borrowed: Vec<(&str, &str)> = pairs
                .iter()
                .map(|(k, v)| (k.as_str(), v.as_str()))
                .collect();
            let url_type = if *absolute {
                UrlType::AbsoluteUrl
            } else {
                UrlType::AbsolutePath
            };
            let url = router.url_to_route(name, &borrowed, url_type, secure.then_some(true))?;
            writeln!(out, "{url}")?;
            Ok(())
        }
        Commands::Cache { action } => run_cache(cli, &config, *action, out),
    }
}

fn build_router(cli: &Cli, config: &RouterConfig) -> Result<Router> {
    let mut router = Router::new(config)?;
    if router.loaded_from_cache() {
        return Ok(router);
    }
    let path = cli
        .manifest
        .as_ref()
        .ok_or_else(|| {
            anyhow!("no route manifest given; pass --manifest or set WPROUTER_MANIFEST")
        })?;
    RouteManifest::from_file(path)?.register(&mut router)?;
    Ok(router)
}

fn run_cache(
    cli: &Cli,
    config: &RouterConfig,
    action: CacheCommand,
    out: &mut dyn Write,
) -> Result<()> {
    let cache_path = match (&config.cache_path, config.caching) {
        (Some(path), true) => path.clone(),
        _ => bail!(
            "route caching is disabled; set WPROUTER_CACHE_PATH or cache_path in the config file"
        ),
    };

    let cache = RouteCache::new(Box::new(FsCacheFile::new(cache_path)));

    match action {
        CacheCommand::Warm { force } => {
            if force {
                cache.clear()?;
            }
            let router = build_router(cli, config)?;
            if router.loaded_from_cache() {
                writeln!(out, "cache already warm ({} routes)", router.collection().len())?;
                return Ok(());
            }
            let matcher = router.compile().context("failed to compile routes")?;
            writeln!(
                out,
                "cache written to {} ({} routes, {} matcher entries)",
                cache.location(),
                router.collection().len(),
                matcher.len()
            )?;
        }
        CacheCommand::Status => match cache.load() {
            Ok(Some(cached)) => writeln!(
                out,
                "warm: {} ({} routes)",
                cache.location(),
                cached.route_collection.len()
            )?,
            Ok(None) => writeln!(out, "cold: {}", cache.location())?,
            Err(err) => writeln!(out, "unusable: {err}")?,
        },
        CacheCommand::Clear => {
            cache.clear()?;
            writeln!(out, "cleared {}", cache.location())?;
        }
    }
    Ok(())
}

fn print_routes(router: &Router, out: &mut dyn Write) -> Result<()> {
    let routes = router.collection();
    for name in routes.names() {
        let route = routes.get(name)?;
        let methods: Vec<&str> = route.methods().iter().map(Method::as_str).collect();
        writeln!(
            out,
            "{:<28} {:<24} {:<32} {}",
            route.name(),
            methods.join("|"),
            route.path(),
            route.handler()
        )?;
    }
    Ok(())
}

fn print_menu(router: &Router, out: &mut dyn Write) -> Result<()> {
    for (name, item) in router.admin_menu()? {
        let parent = item.parent.as_deref().unwrap_or("-");
        writeln!(
            out,
            "{name:<28} {:<24} parent={parent} capability={}",
            item.menu_title, item.capability
        )?;
    }
    Ok(())
}

fn print_outcome(outcome: &DispatchOutcome, out: &mut dyn Write) -> Result<()> {
    match outcome {
        DispatchOutcome::Matched(m) | DispatchOutcome::Delegated(m) => {
            let params: Vec<String> = m
                .path_params
                .iter()
                .map(|(k, v)| format!("{k}={v}"))
                .collect();
            writeln!(
                out,
                "{} {} -> {} [{}]",
                outcome.kind(),
                m.name(),
                m.route.handler(),
                params.join(", ")
            )?;
        }
        DispatchOutcome::MethodNotAllowed(allowed) => {
            let allowed: Vec<&str> = allowed.iter().map(Method::as_str).collect();
            writeln!(out, "{} allow: {}", outcome.kind(), allowed.join(", "))?;
        }
        DispatchOutcome::NotFound => writeln!(out, "{}", outcome.kind())?,
    }
    Ok(())
}

fn parse_params(params: &[String]) -> Result<Vec<(String, String)>> {
    params
        .iter()
        .map(|param| {
            param
                .split_once('=')
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .ok_or_else(|| anyhow!("parameter '{param}' is not key=value"))
        })
        .collect()
}

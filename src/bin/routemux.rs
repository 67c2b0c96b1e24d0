//! Inspect route declarations from the command line.
//!
//! ```bash
//! routemux compile '/users/:id' '/files/:name?'
//! routemux match --route '/users/:id' --route 'POST /users' --method POST /users
//! ```

use anyhow::{bail, Result};
use clap::{Parser, Subcommand};
use http::Method;
use routemux::logging::{init_logging, LogConfig};
use routemux::{Matcher, MethodFilter, Request, Response, Router, RouterConfig};
use serde_json::json;
use std::path::PathBuf;
use std::str::FromStr;

#[derive(Parser)]
#[command(name = "routemux")]
#[command(about = "Compile and test express-style route declarations", long_about = None)]
struct Cli {
    /// The subcommand to execute
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show the regex and parameter names for each declaration
    Compile {
        #[arg(required = true)]
        declarations: Vec<String>,
    },
    /// Dispatch one request against a list of routes
    Match {
        /// Route as `/path` or `METHOD /path`; repeat in priority order
        #[arg(short, long = "route", required = true)]
        routes: Vec<String>,

        #[arg(short, long, default_value = "GET")]
        method: String,

        /// YAML router configuration
        #[arg(short, long, env = "ROUTEMUX_CONFIG")]
        config: Option<PathBuf>,

        /// Request URL, query allowed
        url: String,
    },
}

fn main() -> Result<()> {
    init_logging(&LogConfig::from_env())?;
    let cli = Cli::parse();

    match cli.command {
        Commands::Compile { declarations } => compile(&declarations),
        Commands::Match {
            routes,
            method,
            config,
            url,
        } => run_match(&routes, &method, config, &url),
    }
}

fn compile(declarations: &[String]) -> Result<()> {
    let mut failed = 0;
    for declaration in declarations {
        match Matcher::compile(declaration) {
            Ok(matcher) => {
                let names: Vec<Option<&str>> = matcher
                    .param_names()
                    .unwrap_or_default()
                    .iter()
                    .map(|n| n.as_deref())
                    .collect();
                println!(
                    "{}",
                    json!({
                        "declaration": declaration,
                        "pattern": matcher.pattern(),
                        "params": names,
                    })
                );
            }
            Err(err) => {
                failed += 1;
                eprintln!("{err}");
            }
        }
    }
    if failed > 0 {
        bail!("{failed} declaration(s) failed to compile");
    }
    Ok(())
}

/// Split `METHOD /path` into its filter and declaration.
fn parse_route(raw: &str) -> (MethodFilter, &str) {
    match raw.trim().split_once(char::is_whitespace) {
        Some((method, declaration)) => (MethodFilter::from(method), declaration.trim()),
        None => (MethodFilter::Any, raw.trim()),
    }
}

fn run_match(routes: &[String], method: &str, config: Option<PathBuf>, url: &str) -> Result<()> {
    let config = match config {
        Some(path) => RouterConfig::load(path)?,
        None => RouterConfig::from_env(),
    };
    let method = Method::from_str(&method.to_ascii_uppercase())?;

    let mut router: Router = Router::with_config(config);
    for raw in routes {
        let (filter, declaration) = parse_route(raw);
        let declaration_owned = declaration.to_string();
        router.add(
            declaration,
            move |_router, req, res, _next| {
                res.json(
                    200,
                    json!({
                        "declaration": declaration_owned,
                        "params": req.params.to_map(),
                        "unnamed": req.params.unnamed(),
                    }),
                );
                Ok(())
            },
            filter,
        );
    }
    router.dump_routes();

    let mut req = Request::new(method, url);
    let mut res = Response::new();
    let mut matched = true;
    router.dispatch(&mut req, &mut res, &mut || {
        matched = false;
        Ok(())
    })?;

    if !matched {
        bail!("no route matched {} {}", req.method, url);
    }
    let mut body = res.body;
    body["normalized_url"] = json!(req.normalized_url);
    println!("{}", serde_json::to_string_pretty(&body)?);
    Ok(())
}

//! quakemap - earthquake events on an interactive web map.
//!
//! Fetches a GeoJSON event query from the USGS, classifies every event by
//! magnitude and serves a Leaflet map with one togglable layer per
//! severity tier.

use std::io;
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::{error, warn};

mod app;
mod chrome;
mod classify;
mod cli;
mod client;
mod config;
mod errors;
mod layers;
mod models;
mod output;
mod render;
mod server;

use app::AppContext;
use classify::Classifier;
use cli::{Cli, Command};
use client::{EventSource, UsgsClient};
use config::AppConfig;

fn main() -> ExitCode {
    match run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{e:#}");
            eprintln!("Error: {e:#}");
            ExitCode::FAILURE
        }
    }
}

fn run() -> Result<()> {
    let cli = Cli::parse();

    // Initialize tracing based on verbosity
    init_tracing(cli.verbose, cli.quiet);

    match cli.command {
        Command::Serve(args) => cmd_serve(args),
        Command::Fetch(args) => cmd_fetch(&args),
    }
}

/// Initialize tracing subscriber.
///
/// `RUST_LOG` applies when neither flag is given.
fn init_tracing(verbose: bool, quiet: bool) {
    use tracing_subscriber::EnvFilter;

    let filter = if quiet {
        EnvFilter::new("error")
    } else if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(io::stderr)
        .init();
}

/// Execute the `fetch` command - one-shot fetch and print.
fn cmd_fetch(args: &cli::FetchArgs) -> Result<()> {
    let client =
        UsgsClient::new(args.query.endpoint.clone()).context("failed to create USGS client")?;

    let mut feed = client
        .fetch_events(&args.query.params())
        .context("failed to fetch earthquake events")?;

    // Most recent first
    feed.features
        .sort_by(|a, b| b.properties.time.cmp(&a.properties.time));

    let stdout = io::stdout();
    let mut handle = stdout.lock();
    output::write_events(&mut handle, &feed.features, &Classifier::default(), args.format)?;

    Ok(())
}

/// Execute the `serve` command - fetch once, then start the web server.
fn cmd_serve(args: cli::ServeArgs) -> Result<()> {
    let mut config = AppConfig {
        endpoint: args.query.endpoint.clone(),
        query: args.query.params(),
        ..AppConfig::default()
    };
    config.marker.radius_exponent = args.radius_exponent;

    let mut ctx = AppContext::new(config);

    // The map still comes up when the fetch fails, just without events
    let client =
        UsgsClient::new(ctx.config.endpoint.clone()).context("failed to create USGS client")?;
    if let Err(e) = ctx.load(&client) {
        warn!("could not load earthquake events: {}", e);
    }

    let server_config = server::ServerConfig {
        port: args.port,
        host: args.host.clone(),
    };

    let url = format!("http://{}:{}", args.host, args.port);
    println!("\x1b[1m🌍 quakemap\x1b[0m");
    println!("\x1b[2m───────────────────────────────────────\x1b[0m");
    println!("  Local:   \x1b[96m{url}\x1b[0m");
    println!(
        "  Events:  {} in {} layers ({} to {}, M{}+)",
        ctx.layers.visible_markers().count(),
        ctx.layers.visible_layers().count(),
        ctx.config.query.start,
        ctx.config.query.end,
        ctx.config.query.min_magnitude
    );
    println!("\x1b[2m───────────────────────────────────────\x1b[0m");
    println!("\x1b[2mPress Ctrl+C to stop\x1b[0m\n");

    // Open browser if requested (using xdg-open/open command)
    if args.open {
        #[cfg(target_os = "linux")]
        let spawned = std::process::Command::new("xdg-open").arg(&url).spawn();
        #[cfg(target_os = "macos")]
        let spawned = std::process::Command::new("open").arg(&url).spawn();
        #[cfg(target_os = "windows")]
        let spawned = std::process::Command::new("cmd")
            .args(["/c", "start", &url])
            .spawn();
        #[cfg(any(target_os = "linux", target_os = "macos", target_os = "windows"))]
        if let Err(e) = spawned {
            warn!("could not open browser: {}", e);
        }
    }

    // The blocking client is dropped before the runtime starts
    drop(client);

    tokio::runtime::Runtime::new()
        .context("failed to create tokio runtime")?
        .block_on(server::run_server(server_config, ctx))
}

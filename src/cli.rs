//! Command-line interface definitions.
//!
//! Uses clap derive API for argument parsing.

use chrono::NaiveDate;
use clap::{Args, Parser, Subcommand};

use crate::client::{QueryParams, USGS_QUERY_URL, parse_date};
use crate::output::Format;

/// Earthquake events on an interactive web map.
#[derive(Parser, Debug)]
#[command(name = "quakemap")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Command to run
    #[command(subcommand)]
    pub command: Command,

    /// Enable verbose debug logging
    #[arg(long, global = true)]
    pub verbose: bool,

    /// Suppress all output except errors
    #[arg(long, global = true)]
    pub quiet: bool,
}

/// Available commands.
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Fetch events and serve them on a web map
    Serve(ServeArgs),

    /// Fetch events once and print them
    Fetch(FetchArgs),
}

/// Query options shared by all commands.
#[derive(Args, Debug, Clone)]
pub struct QueryArgs {
    /// Start date (YYYY-MM-DD)
    #[arg(long, default_value = "2020-01-20", value_parser = parse_date)]
    pub start: NaiveDate,

    /// End date (YYYY-MM-DD)
    #[arg(long, default_value = "2020-01-30", value_parser = parse_date)]
    pub end: NaiveDate,

    /// Minimum magnitude to request
    #[arg(long, default_value = "2.5")]
    pub min_magnitude: f64,

    /// FDSN event query endpoint
    #[arg(long, default_value = USGS_QUERY_URL)]
    pub endpoint: String,
}

impl QueryArgs {
    #[must_use]
    pub fn params(&self) -> QueryParams {
        QueryParams {
            start: self.start,
            end: self.end,
            min_magnitude: self.min_magnitude,
        }
    }
}

/// Arguments for the `serve` command.
#[derive(Parser, Debug)]
pub struct ServeArgs {
    #[command(flatten)]
    pub query: QueryArgs,

    /// Port to listen on
    #[arg(long, short = 'p', default_value = "8080")]
    pub port: u16,

    /// Host to bind to
    #[arg(long, default_value = "127.0.0.1")]
    pub host: String,

    /// Marker radius is magnitude raised to this power
    #[arg(long, default_value = "2.1")]
    pub radius_exponent: f64,

    /// Open browser automatically
    #[arg(long)]
    pub open: bool,
}

/// Arguments for the `fetch` command.
#[derive(Parser, Debug)]
pub struct FetchArgs {
    #[command(flatten)]
    pub query: QueryArgs,

    /// Output format
    #[arg(long, short = 'f', default_value = "human", value_parser = parse_format)]
    pub format: Format,
}

/// Parse an output format from string.
fn parse_format(s: &str) -> Result<Format, String> {
    s.parse()
}

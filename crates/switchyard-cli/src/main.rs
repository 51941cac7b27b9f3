//! switchyard CLI
//!
//! Command-line tool for exercising a route table.

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use tracing::{Level, info};
use tracing_subscriber::FmtSubscriber;

use switchyard::{Method, Params, Request};
use switchyard_cli::{format_route, load_routes, parse_pair, recognize};

/// Recognize and generate paths against a route table.
#[derive(Parser)]
#[command(name = "switchyard")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Route table (JSON).
    #[arg(short, long, env = "SWITCHYARD_ROUTES", default_value = "routes.json")]
    routes: PathBuf,

    /// Enable verbose output.
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Recognize a request and print its routing parameters as JSON.
    Recognize {
        /// Request path, optionally with a query string.
        path: String,

        /// Request method.
        #[arg(short, long, default_value = "GET", value_parser = parse_method)]
        method: Method,

        /// Host header.
        #[arg(long)]
        host: Option<String>,
    },

    /// Generate a path from parameters.
    Generate {
        /// Route name (first fitting route if not specified).
        #[arg(short, long)]
        name: Option<String>,

        /// Parameters as key=value pairs.
        #[arg(value_parser = parse_pair)]
        params: Vec<(String, String)>,
    },

    /// List routes in recognition order.
    Routes,
}

fn parse_method(s: &str) -> Result<Method, switchyard::RouterError> {
    s.parse()
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Setup logging
    let log_level = if cli.verbose {
        Level::DEBUG
    } else {
        Level::INFO
    };
    let subscriber = FmtSubscriber::builder()
        .with_max_level(log_level)
        .with_target(false)
        .without_time()
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    let routes = load_routes(&cli.routes)?;

    match cli.command {
        Commands::Recognize { path, method, host } => {
            let mut request = Request::new(method, path);
            if let Some(host) = host {
                request = request.header("Host", host);
            }
            let params = recognize(&routes, request).await?;
            println!("{}", serde_json::to_string_pretty(&params)?);
        }

        Commands::Generate { name, params } => {
            let params: Params = params.into_iter().collect();
            let path = routes.generate(name.as_deref(), &params)?;
            println!("{path}");
        }

        Commands::Routes => {
            if routes.routes().is_empty() {
                info!("No routes defined.");
            }
            for route in routes.routes() {
                println!("{}", format_route(route));
            }
        }
    }

    Ok(())
}

mod api;
mod config;
mod error;
mod extract;
mod fetch;
mod lookup;
mod models;
mod resolver;
mod retriever;
mod ui;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};

use crate::config::{DirectoryConfig, DEFAULT_BASE_URL, DEFAULT_USER_AGENT};
use crate::fetch::{Fetcher, HttpFetcher};
use crate::lookup::CompanyLookup;

#[derive(Parser)]
#[command(name = "rekvizitai-lookup")]
#[command(about = "Looks up Lithuanian companies by registration code on rekvizitai.vz.lt", long_about = None)]
struct Cli {
    /// Quiet mode (less output)
    #[arg(short, long, global = true)]
    quiet: bool,

    /// Verbose mode (log every request)
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(flatten)]
    directory: DirectoryArgs,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Args)]
struct DirectoryArgs {
    /// Directory base URL
    #[arg(long, global = true, default_value = DEFAULT_BASE_URL)]
    base_url: String,

    /// Request timeout in seconds (transport default when omitted)
    #[arg(long, global = true)]
    timeout: Option<u64>,

    /// User-Agent sent to the directory
    #[arg(long, global = true, default_value = DEFAULT_USER_AGENT)]
    user_agent: String,
}

#[derive(Subcommand)]
enum Commands {
    /// Starts the REST API
    Server {
        /// Server port
        #[arg(short, long, default_value = "5000")]
        port: u16,
        /// Server address
        #[arg(long, default_value = "127.0.0.1")]
        host: String,
        /// Worker threads
        #[arg(short, long, default_value = "1")]
        workers: usize,
    },
    /// Looks up one company and prints its record as JSON
    Lookup {
        /// 9-digit company code
        code: String,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    ui::init(cli.quiet, cli.verbose);

    let config = DirectoryConfig::new(
        &cli.directory.base_url,
        &cli.directory.user_agent,
        cli.directory.timeout,
    );
    let lookup = CompanyLookup::new(HttpFetcher::new(&config)?, config);

    match cli.command {
        Commands::Server { port, host, workers } => {
            api::start_server(lookup, &host, port, workers).await?;
        }
        Commands::Lookup { code } => match run_lookup(&lookup, &code).await {
            Ok(json) => println!("{}", json),
            Err(e) => {
                // Reported once here; returning the error would print it again
                ui::print_error(&format!("{:#}", e));
                std::process::exit(1);
            }
        },
    }

    Ok(())
}

/// One lookup from the command line, validated like the API does.
async fn run_lookup<F: Fetcher>(lookup: &CompanyLookup<F>, code: &str) -> Result<String> {
    if !api::is_valid_code(code) {
        anyhow::bail!(api::WRONG_PARAMETER);
    }
    let record = lookup.lookup(code).await?;
    let json = record
        .to_json()
        .with_context(|| format!("Failed to serialize company {}", code))?;
    Ok(json)
}

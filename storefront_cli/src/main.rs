mod commands;
mod output;

use std::time::Duration;

use anyhow::Result;
use clap::{Parser, Subcommand};
use storefront_lib::ApiConfig;

use crate::commands::request::{ReadArgs, WriteArgs};
use crate::output::OutputFormat;

#[derive(Parser)]
#[command(name = "storefront")]
#[command(about = "Send requests to the storefront backend API")]
struct Cli {
    /// Output format: json or table
    #[arg(long, default_value = "json", global = true)]
    output: String,

    /// Backend base URL (defaults to NEXT_PUBLIC_API_URL, then http://localhost:5000)
    #[arg(long, global = true)]
    base_url: Option<String>,

    /// Transport timeout in seconds
    #[arg(long, global = true)]
    timeout: Option<u64>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// GET a resource
    Get(ReadArgs),
    /// POST a body to a resource
    Post(WriteArgs),
    /// PUT a body to a resource
    Put(WriteArgs),
    /// PATCH a resource
    Patch(WriteArgs),
    /// DELETE a resource
    Delete(ReadArgs),
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("storefront=info".parse()?),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let format = match cli.output.as_str() {
        "table" => OutputFormat::Table,
        _ => OutputFormat::Json,
    };

    let mut config = ApiConfig::from_env();
    if let Some(base_url) = &cli.base_url {
        config = config.with_base_url(base_url);
    }
    if let Some(secs) = cli.timeout {
        config = config.with_timeout(Duration::from_secs(secs));
    }
    let client = config.build_client()?;

    match &cli.command {
        Commands::Get(args) => commands::request::run_read("GET", args, &client, &format).await?,
        Commands::Delete(args) => {
            commands::request::run_read("DELETE", args, &client, &format).await?
        }
        Commands::Post(args) => commands::request::run_write("POST", args, &client, &format).await?,
        Commands::Put(args) => commands::request::run_write("PUT", args, &client, &format).await?,
        Commands::Patch(args) => {
            commands::request::run_write("PATCH", args, &client, &format).await?
        }
    }

    Ok(())
}

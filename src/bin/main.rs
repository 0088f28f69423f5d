//! Heron CLI - Query Unity Catalog metadata and run read-only SQL
//!
//! Usage:
//!   heron schemas <catalog>
//!   heron tables <catalog> <schema>
//!   heron describe <catalog.schema.table>...
//!   heron query <sql> [--wait-timeout <secs>]
//!
//! Examples:
//!   heron schemas main
//!   heron describe main.sales.orders main.sales.customers
//!   heron query "SELECT * FROM main.sales.orders LIMIT 10" --wait-timeout 30
//!
//! Workspace and credentials come from `DATABRICKS_*` environment variables.
//! Logs go to stderr (`RUST_LOG`, default `heron=info`); stdout carries only
//! tool output.

use std::path::PathBuf;
use std::process::ExitCode;
use std::time::Duration;

use clap::{Parser, Subcommand};
use heron::config::{Settings, WorkspaceConfig};
use heron::query::QueryState;
use heron::CatalogTools;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "heron")]
#[command(about = "Heron - Unity Catalog metadata and read-only SQL for LLM agents")]
#[command(version)]
struct Cli {
    /// Settings file (defaults to $HERON_CONFIG, ./heron.toml, then the user config dir)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List the schemas of a catalog
    Schemas {
        /// Catalog name (e.g. main)
        catalog: String,
    },

    /// List the tables of a schema
    Tables {
        catalog: String,
        schema: String,
    },

    /// Describe tables, including columns, constraints and lineage
    Describe {
        /// Fully qualified names (catalog.schema.table)
        #[arg(required = true)]
        tables: Vec<String>,
    },

    /// Run a read-only SQL statement on the configured warehouse
    Query {
        sql: String,

        /// Seconds to wait for a result before returning RUNNING
        #[arg(long)]
        wait_timeout: Option<u64>,
    },
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("heron=info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn load_settings(path: Option<&PathBuf>) -> Result<Settings, String> {
    let settings = match path {
        Some(path) => Settings::from_file(path),
        None => Settings::load(),
    };
    settings.map_err(|e| format!("Error loading settings: {}", e))
}

#[tokio::main]
async fn main() -> ExitCode {
    init_tracing();
    let cli = Cli::parse();

    let settings = match load_settings(cli.config.as_ref()) {
        Ok(settings) => settings,
        Err(e) => {
            eprintln!("{}", e);
            return ExitCode::FAILURE;
        }
    };

    let tools = match WorkspaceConfig::from_env()
        .map_err(heron::Error::from)
        .and_then(|config| CatalogTools::connect(&config, &settings))
    {
        Ok(tools) => tools,
        Err(e) => {
            eprintln!("Configuration error: {}", e);
            return ExitCode::FAILURE;
        }
    };

    match cli.command {
        Commands::Schemas { catalog } => print_markdown(tools.fetch_schemas_in_catalog(&catalog).await),
        Commands::Tables { catalog, schema } => {
            print_markdown(tools.fetch_tables_in_schema(&catalog, &schema).await)
        }
        Commands::Describe { tables } => print_markdown(tools.fetch_table_info(&tables).await),
        Commands::Query { sql, wait_timeout } => {
            let wait = wait_timeout
                .map(Duration::from_secs)
                .unwrap_or_else(|| settings.query.wait_timeout());
            let outcome = tools.execute_with_timeout(&sql, wait).await;

            match serde_json::to_string_pretty(&outcome) {
                Ok(json) => println!("{}", json),
                Err(e) => {
                    eprintln!("Error serializing outcome: {}", e);
                    return ExitCode::FAILURE;
                }
            }
            match outcome.state() {
                QueryState::Succeeded | QueryState::Running => ExitCode::SUCCESS,
                QueryState::Failed | QueryState::Cancelled => ExitCode::FAILURE,
            }
        }
    }
}

/// Print a tool document; error documents set a failing exit code.
fn print_markdown(markdown: String) -> ExitCode {
    print!("{}", markdown);
    if markdown.starts_with("**Error**") {
        ExitCode::FAILURE
    } else {
        ExitCode::SUCCESS
    }
}

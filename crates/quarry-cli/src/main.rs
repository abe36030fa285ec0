use clap::{Parser, Subcommand};
use colored::Colorize;
use anyhow::Result;
use serde::Serialize;
use std::path::{Path, PathBuf};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use quarry_core::{Config, Metric, MetricKind, Tags, WarehouseConfig};
use quarry_warehouse::{client_from_config, SqlDialect, StarrocksDialect, TableScope, WarehouseClient};

/// Default config file looked up in the working directory
const DEFAULT_CONFIG: &str = "quarry.toml";

/// Environment variable overriding the configured password
const PASSWORD_ENV: &str = "QUARRY_PASSWORD";

/// Quarry - run SQL and read column catalogs from StarRocks
#[derive(Parser)]
#[command(name = "quarry")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Path to config file (default: quarry.toml)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run a SQL statement and print the result as JSON
    Query {
        /// SQL to run
        sql: String,

        /// Tag attached to the statement (repeatable)
        #[arg(short, long = "tag", value_name = "KEY=VALUE", value_parser = parse_tag)]
        tags: Vec<(String, String)>,

        /// Write JSON here instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Fetch column types for tables and print the catalog as JSON
    Catalog {
        /// Tables as database.schema.table
        #[arg(required = true)]
        tables: Vec<TableScope>,

        /// Write JSON here instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Print the SQL fragment for a metric (no connection needed)
    Metric {
        /// Metric kind, e.g. sum, count_distinct, percentile
        kind: MetricKind,

        /// SQL expression to aggregate
        sql: String,

        /// Percentile in [0, 100] for the percentile metric
        #[arg(short, long)]
        percentile: Option<f64>,
    },

    /// Test the warehouse connection
    Ping,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    init_tracing(cli.verbose);
    dotenvy::dotenv().ok();

    let config = load_config(cli.config.as_deref(), cli.verbose)?;

    match cli.command {
        Commands::Query { sql, tags, output } => {
            let tags: Option<Tags> = (!tags.is_empty()).then(|| tags.into_iter().collect());
            query_command(&config, &sql, tags.as_ref(), output.as_deref(), cli.verbose).await
        }
        Commands::Catalog { tables, output } => {
            catalog_command(&config, &tables, output.as_deref(), cli.verbose).await
        }
        Commands::Metric { kind, sql, percentile } => {
            metric_command(kind, &sql, percentile)
        }
        Commands::Ping => {
            ping_command(&config, cli.verbose).await
        }
    }
}

/// Log to stderr; `--verbose` turns on debug output for quarry crates
fn init_tracing(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("quarry_core=debug,quarry_warehouse=debug,quarry=debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(filter)
        .init();
}

fn load_config(path: Option<&Path>, verbose: bool) -> Result<Config> {
    let config = if let Some(config_path) = path {
        Config::from_file(config_path)?
    } else if Path::new(DEFAULT_CONFIG).exists() {
        Config::from_file(Path::new(DEFAULT_CONFIG))?
    } else {
        if verbose {
            eprintln!("{}", "No config file found, using defaults".yellow());
        }
        Config::default()
    };

    Ok(config)
}

/// Warehouse section with environment overrides applied
fn warehouse_config(config: &Config) -> Result<WarehouseConfig> {
    let mut warehouse = config.warehouse.clone()
        .ok_or_else(|| anyhow::anyhow!(
            "No warehouse configuration found in {}. \
             Add a [warehouse] section with type and connection settings.",
            DEFAULT_CONFIG
        ))?;

    if let Ok(password) = std::env::var(PASSWORD_ENV) {
        warehouse.set_str("password", password);
    }

    Ok(warehouse)
}

fn connect(config: &Config) -> Result<Box<dyn WarehouseClient>> {
    let warehouse = warehouse_config(config)?;

    let client = client_from_config(&warehouse)?;

    tracing::debug!(adapter = %client.adapter_type(), "Created warehouse client");

    Ok(client)
}

async fn query_command(
    config: &Config,
    sql: &str,
    tags: Option<&Tags>,
    output: Option<&Path>,
    verbose: bool,
) -> Result<()> {
    let client = connect(config)?;

    let result = client.run_query(sql, tags).await?;

    tracing::info!(rows = result.row_count(), fields = result.fields.len(), "Query finished");

    emit(&result, output, verbose)
}

async fn catalog_command(
    config: &Config,
    tables: &[TableScope],
    output: Option<&Path>,
    verbose: bool,
) -> Result<()> {
    let client = connect(config)?;

    tracing::debug!(tables = tables.len(), "Fetching column metadata");

    let catalog = client.get_catalog(tables).await?;

    tracing::info!(columns = catalog.column_count(), "Catalog built");

    emit(&catalog, output, verbose)
}

fn metric_command(kind: MetricKind, sql: &str, percentile: Option<f64>) -> Result<()> {
    let metric = match percentile {
        Some(p) if kind == MetricKind::Percentile => {
            if !(0.0..=100.0).contains(&p) {
                return Err(anyhow::anyhow!("Percentile must be between 0 and 100, got {}", p));
            }
            Metric::percentile(p)
        }
        Some(_) => {
            return Err(anyhow::anyhow!("--percentile only applies to the percentile metric"));
        }
        None => Metric::new(kind),
    };

    println!("{}", StarrocksDialect.metric_sql(sql, &metric));
    Ok(())
}

async fn ping_command(config: &Config, verbose: bool) -> Result<()> {
    let client = connect(config)?;

    if verbose {
        eprintln!("{}", "Testing warehouse connection...".cyan());
    }

    client.test_connection().await
        .map_err(|e| anyhow::anyhow!("Failed to connect to warehouse: {}", e))?;

    eprintln!("{}", "✓ Connection successful".green());
    Ok(())
}

/// Write pretty JSON to `output`, or stdout when none is given
fn emit<T: Serialize>(value: &T, output: Option<&Path>, verbose: bool) -> Result<()> {
    let json = serde_json::to_string_pretty(value)?;

    match output {
        Some(path) => {
            std::fs::write(path, json)?;
            if verbose {
                eprintln!("{} {}", "Saved to:".green(), path.display());
            }
        }
        None => println!("{}", json),
    }

    Ok(())
}

/// Parse a `key=value` tag
fn parse_tag(s: &str) -> Result<(String, String), String> {
    let (key, value) = s
        .split_once('=')
        .ok_or_else(|| format!("invalid tag '{}': expected KEY=VALUE", s))?;

    if key.is_empty() {
        return Err(format!("invalid tag '{}': empty key", s));
    }

    Ok((key.to_string(), value.to_string()))
}

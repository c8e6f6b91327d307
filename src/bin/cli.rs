//! cube-expr CLI
//!
//! Command-line interface for checking query expressions against a cube model:
//! - Parse a single cut, drilldown, aggregate, order or fields expression
//! - Parse a whole URL query string
//! - Generate a default config file

use anyhow::Context;
use clap::{Parser, Subcommand};
use serde::Serialize;
use std::fmt::Display;
use std::path::PathBuf;
use std::process::ExitCode;
use tracing_subscriber::{fmt::MakeWriter, layer::SubscriberExt, util::SubscriberInitExt};

use cube_expr::config::{generate_default_config, Config, LoggingConfig};
use cube_expr::model::CubeModel;
use cube_expr::query::{
    Aggregates, Cuts, Drilldowns, ExpressionParser, Fields, Ordering, ParsedQuery, QueryRequest,
    QueryResult,
};

/// Exit status for a rejected expression
const REJECTED: u8 = 2;

#[derive(Parser)]
#[command(name = "cube-expr")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Parse and validate cube query expressions")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Cube model file (.json or .toml); overrides model.path from the config
    #[arg(short, long, global = true)]
    pub model: Option<PathBuf>,

    /// Config file (default: standard locations, then environment)
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Output format (json, text)
    #[arg(short, long, default_value = "json", global = true)]
    pub format: String,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Parse a cut expression, e.g. 'foo:bar|year:2015;2016'
    Cuts { expression: String },

    /// Parse a drilldown expression, e.g. 'cofog1.name|year'
    Drilldowns { expression: String },

    /// Parse an aggregates expression, e.g. 'amount.sum|_count'
    Aggregates { expression: String },

    /// Parse an ordering expression, e.g. 'amount.sum:desc,year'
    Order { expression: String },

    /// Parse a field list, e.g. 'year,cofog1.label,amount'
    Fields { expression: String },

    /// Parse every parameter of a URL query string
    Request { query: String },

    /// Generate default config file
    Config {
        /// Output path (default: stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    if let Commands::Config { output } = &cli.command {
        let content = generate_default_config();
        return match output {
            Some(path) => match std::fs::write(path, content) {
                Ok(()) => {
                    println!("Config written to {:?}", path);
                    ExitCode::SUCCESS
                }
                Err(e) => {
                    eprintln!("Failed to write config to {:?}: {}", path, e);
                    ExitCode::FAILURE
                }
            },
            None => {
                print!("{}", content);
                ExitCode::SUCCESS
            }
        };
    }

    let config = match &cli.config {
        Some(path) => match Config::load_with_env(path) {
            Ok(config) => config,
            Err(e) => {
                eprintln!("{}", e);
                return ExitCode::FAILURE;
            }
        },
        // The real subscriber depends on the config, so report the search on stderr
        None => tracing::subscriber::with_default(
            bootstrap_subscriber(std::io::stderr),
            Config::load_default,
        ),
    };

    init_logging(&config.logging);

    match run(&cli, &config) {
        Ok(code) => code,
        Err(e) => {
            eprintln!("Error: {:#}", e);
            ExitCode::FAILURE
        }
    }
}

fn bootstrap_subscriber<W>(writer: W) -> impl tracing::Subscriber + Send + Sync + 'static
where
    W: for<'w> MakeWriter<'w> + Send + Sync + 'static,
{
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("cube_expr=info"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(writer)
        .with_ansi(false)
        .finish()
}

fn init_logging(logging: &LoggingConfig) {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(format!("cube_expr={}", logging.level)));

    let registry = tracing_subscriber::registry().with(filter);
    let result = if logging.format == "json" {
        registry
            .with(tracing_subscriber::fmt::layer().json().with_writer(std::io::stderr))
            .try_init()
    } else {
        registry
            .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
            .try_init()
    };

    if let Err(e) = result {
        eprintln!("Failed to initialize logging: {}", e);
    }
}

fn run(cli: &Cli, config: &Config) -> anyhow::Result<ExitCode> {
    let model_path = cli
        .model
        .clone()
        .or_else(|| config.model.path.as_ref().map(PathBuf::from))
        .context("no cube model given (use --model or set model.path in the config)")?;
    let model = CubeModel::load(&model_path)
        .with_context(|| format!("loading cube model {:?}", model_path))?;
    let options = config.parser.options();
    let json = cli.format == "json";

    match &cli.command {
        Commands::Cuts { expression } => report(
            Cuts::with_options(&model, options).parse(Some(expression)),
            json,
        ),
        Commands::Drilldowns { expression } => report(
            Drilldowns::with_options(&model, options).parse(Some(expression)),
            json,
        ),
        Commands::Aggregates { expression } => report(
            Aggregates::with_options(&model, options).parse(Some(expression)),
            json,
        ),
        Commands::Order { expression } => report(
            Ordering::with_options(&model, options).parse(Some(expression)),
            json,
        ),
        Commands::Fields { expression } => report(
            Fields::with_options(&model, options).parse(Some(expression)),
            json,
        ),
        Commands::Request { query } => {
            let parsed = QueryRequest::from_query_string(query)
                .and_then(|request| request.parse(&model, &options));
            match parsed {
                Ok(parsed) if json => print_json(&parsed),
                Ok(parsed) => {
                    print_request(&parsed);
                    Ok(ExitCode::SUCCESS)
                }
                Err(e) => {
                    eprintln!("{}", e);
                    Ok(ExitCode::from(REJECTED))
                }
            }
        }
        Commands::Config { .. } => Ok(ExitCode::SUCCESS),
    }
}

fn report<T: Serialize + Display>(result: QueryResult<Vec<T>>, json: bool) -> anyhow::Result<ExitCode> {
    match result {
        Ok(records) if json => print_json(&records),
        Ok(records) => {
            for record in &records {
                println!("{}", record);
            }
            Ok(ExitCode::SUCCESS)
        }
        Err(e) => {
            eprintln!("{}", e);
            Ok(ExitCode::from(REJECTED))
        }
    }
}

fn print_json<T: Serialize + ?Sized>(value: &T) -> anyhow::Result<ExitCode> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(ExitCode::SUCCESS)
}

fn print_request(parsed: &ParsedQuery) {
    print_section("cut", &parsed.cuts, "|");
    print_section("drilldown", &parsed.drilldowns, "|");
    print_section("aggregates", &parsed.aggregates, "|");
    print_section("order", &parsed.ordering, ",");
    print_section("fields", &parsed.fields, ",");
    println!(
        "page: {} (offset {}, limit {})",
        parsed.pagination.page,
        parsed.pagination.offset(),
        parsed.pagination.limit()
    );
}

fn print_section<T: Display>(name: &str, records: &[T], separator: &str) {
    let rendered: Vec<String> = records.iter().map(|r| r.to_string()).collect();
    println!("{}: {}", name, rendered.join(separator));
}

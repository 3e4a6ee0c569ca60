use anyhow::{Context as AnyhowContext, Result};
use catalog_corpus::Corpus;
use catalog_protocol::serialize_json;
use catalog_search::{EngineConfig, EngineState};
use clap::{Args, Parser, Subcommand};
use command::{CommandAction, CommandHandler, CommandRequest, CommandResponse, RequestDefaults};
use serde_json::json;
use std::fs;
use std::io;
use std::path::PathBuf;
use std::sync::Arc;

mod command;
mod http_api;
mod server_security;

fn print_stdout(text: &str) -> Result<()> {
    use std::io::Write;

    let mut stdout = io::stdout().lock();
    if let Err(err) = stdout
        .write_all(text.as_bytes())
        .and_then(|_| stdout.write_all(b"\n"))
        .and_then(|_| stdout.flush())
    {
        if err.kind() == io::ErrorKind::BrokenPipe {
            return Ok(());
        }
        return Err(err.into());
    }
    Ok(())
}

#[derive(Parser)]
#[command(name = "catalog-rec")]
#[command(about = "Genre-based catalog recommendations", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Quiet mode: log only warnings/errors (stdout is reserved for JSON)
    #[arg(long, global = true)]
    quiet: bool,

    /// TOML config file (overrides CATALOG_REC_CONFIG)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// CSV feed to load (overrides config and CATALOG_REC_SOURCE)
    #[arg(long, global = true)]
    source: Option<PathBuf>,

    /// Keep only the first N feed rows
    #[arg(long, global = true)]
    max_rows: Option<usize>,

    /// Vocabulary cap for the genre vectorizer
    #[arg(long, global = true)]
    max_features: Option<usize>,
}

#[derive(Subcommand)]
enum Commands {
    /// Recommend titles similar to the first title matching QUERY
    Recommend(RecommendArgs),

    /// List titles containing PREFIX
    Suggest(SuggestArgs),

    /// Show corpus and vocabulary sizes
    Stats(OutputArgs),

    /// Execute a JSON Command API request
    Command(CommandArgs),

    /// Serve the Command API over HTTP
    ServeHttp(ServeArgs),
}

#[derive(Args)]
struct OutputArgs {
    /// Pretty-print JSON output
    #[arg(long)]
    pretty: bool,
}

#[derive(Args)]
struct RecommendArgs {
    query: String,

    /// Number of suggestions (default from config)
    #[arg(long, conflicts_with = "load_more")]
    top_n: Option<usize>,

    /// Use the larger "load more" page size
    #[arg(long)]
    load_more: bool,

    #[command(flatten)]
    output: OutputArgs,
}

#[derive(Args)]
struct SuggestArgs {
    prefix: String,

    /// Maximum titles returned (default from config)
    #[arg(long)]
    limit: Option<usize>,

    #[command(flatten)]
    output: OutputArgs,
}

#[derive(Args)]
struct CommandArgs {
    /// Inline JSON payload (mutually exclusive with --file)
    #[arg(long, conflicts_with = "file")]
    json: Option<String>,

    /// Path to file containing JSON payload
    #[arg(long)]
    file: Option<PathBuf>,

    #[command(flatten)]
    output: OutputArgs,
}

#[derive(Args)]
struct ServeArgs {
    /// Bind address, e.g. 127.0.0.1:7710
    #[arg(long, default_value = "127.0.0.1:7710")]
    bind: String,

    /// Allow binding to non-loopback addresses
    #[arg(long)]
    public: bool,
}

pub async fn main_entry() -> Result<()> {
    let cli = Cli::parse();

    let mut builder =
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"));
    if cli.quiet {
        builder.filter_level(log::LevelFilter::Warn);
    } else if cli.verbose {
        builder.filter_level(log::LevelFilter::Debug);
    }
    builder.target(env_logger::Target::Stderr).init();

    let config = resolve_config(&cli)?;

    match cli.command {
        Commands::Recommend(args) => {
            let request = CommandRequest {
                action: CommandAction::Recommend,
                payload: json!({
                    "query": args.query,
                    "top_n": args.top_n,
                    "load_more": args.load_more,
                }),
            };
            let handler = build_handler(config).await?;
            respond(&handler.execute(request), &args.output)?;
        }
        Commands::Suggest(args) => {
            let request = CommandRequest {
                action: CommandAction::Autocomplete,
                payload: json!({ "query": args.prefix, "limit": args.limit }),
            };
            let handler = build_suggest_handler(config).await?;
            respond(&handler.execute(request), &args.output)?;
        }
        Commands::Stats(output) => {
            let request = CommandRequest {
                action: CommandAction::Stats,
                payload: json!({}),
            };
            let handler = build_handler(config).await?;
            respond(&handler.execute(request), &output)?;
        }
        Commands::Command(args) => run_command(args, config).await?,
        Commands::ServeHttp(args) => serve_http(args, config).await?,
    }

    Ok(())
}

fn resolve_config(cli: &Cli) -> Result<EngineConfig> {
    let mut config = match &cli.config {
        Some(path) => EngineConfig::from_file(path)?
            .with_overrides(|key| std::env::var(key).ok())?,
        None => EngineConfig::from_env()?,
    };
    if let Some(source) = &cli.source {
        config.source_path = source.clone();
    }
    if let Some(max_rows) = cli.max_rows {
        config.max_rows = max_rows;
    }
    if let Some(max_features) = cli.max_features {
        config.max_features = max_features;
    }
    config.validate()?;
    Ok(config)
}

/// Builds the full engine off the async runtime; the build is CPU-bound.
async fn build_handler(config: EngineConfig) -> Result<CommandHandler> {
    let defaults = RequestDefaults::from(&config);
    let state = tokio::task::spawn_blocking(move || catalog_search::initialize(&config))
        .await
        .context("Engine build task panicked")?
        .context("Failed to initialize recommendation engine")?;
    Ok(CommandHandler::new(Arc::new(state), defaults))
}

/// Autocomplete needs only the corpus, so the all-pairs matrix is skipped.
async fn build_suggest_handler(config: EngineConfig) -> Result<CommandHandler> {
    let defaults = RequestDefaults::from(&config);
    let state = tokio::task::spawn_blocking(move || -> Result<EngineState> {
        let corpus = Corpus::load(&config.source_path, config.max_rows)
            .with_context(|| format!("Failed to load {}", config.source_path.display()))?;
        Ok(EngineState::without_similarity(corpus, config.max_features)?)
    })
    .await
    .context("Corpus load task panicked")??;
    Ok(CommandHandler::new(Arc::new(state), defaults))
}

fn respond(response: &CommandResponse, output: &OutputArgs) -> Result<()> {
    let text = if output.pretty {
        serde_json::to_string_pretty(response)?
    } else {
        serialize_json(response)?
    };
    print_stdout(&text)?;

    if response.is_error() {
        std::process::exit(1);
    }
    Ok(())
}

async fn run_command(args: CommandArgs, config: EngineConfig) -> Result<()> {
    let raw = read_payload(&args)?;
    let request: CommandRequest =
        serde_json::from_str(&raw).context("Invalid JSON passed to --json/--file")?;

    let handler = if request.action == CommandAction::Autocomplete {
        build_suggest_handler(config).await?
    } else {
        build_handler(config).await?
    };
    respond(&handler.execute(request), &args.output)
}

fn read_payload(args: &CommandArgs) -> Result<String> {
    if let Some(raw) = &args.json {
        return Ok(raw.clone());
    }
    if let Some(path) = &args.file {
        return fs::read_to_string(path)
            .with_context(|| format!("Failed to read JSON from {}", path.display()));
    }
    anyhow::bail!("Pass the request with --json or --file")
}

async fn serve_http(args: ServeArgs, config: EngineConfig) -> Result<()> {
    let addr = server_security::resolve_guarded_bind_addr(&args.bind, args.public).await?;
    let handler = build_handler(config).await?;
    let app = http_api::router(handler);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    log::info!("Serving Command API on http://{}/command", listener.local_addr()?);
    axum::serve(listener, app).await?;
    Ok(())
}

use anyhow::{Context, Result};
use clap::Parser;
use coursegraph::directory::HttpDirectory;
use coursegraph::mint::{IdGenerator, RandomIds, SequentialIds};
use coursegraph::pipeline::{self, check_input, PipelineOptions, Services};
use coursegraph::registry::SparqlRegistry;
use coursegraph::config::IngestConfig;
use coursegraph::Config;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

#[derive(Parser, Debug)]
#[command(name = "coursegraph")]
#[command(about = "Resolve a course-offering export into a course/term knowledge graph")]
struct Args {
    /// Tab-delimited offering export
    input: PathBuf,

    /// Graph file to write
    output: PathBuf,

    /// Config file (defaults to $COURSEGRAPH_CONFIG, then ./config.toml)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Mint course ids from a counter seeded with this value instead of randomly
    #[arg(long)]
    seed: Option<u64>,

    /// Encoding label of the export, overriding ingest.encoding
    #[arg(long)]
    encoding: Option<String>,

    /// Only validate the input file and its term codes; contacts no service
    #[arg(long)]
    check: bool,
}

fn init_logger(level: &str) {
    env_logger::Builder::from_env(
        env_logger::Env::default()
            .filter_or("RUST_LOG", level)
    ).init();
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    if args.check {
        init_logger("info");
        let encoding = args.encoding.clone().unwrap_or_else(|| IngestConfig::default().encoding);
        let report = check_input(&args.input, &encoding)
            .with_context(|| format!("Input check failed for {}", args.input.display()))?;
        log::info!(
            "✓ {} rows, {} terms, {} distinct instructors",
            report.rows,
            report.terms,
            report.instructors
        );
        return Ok(());
    }

    let config = Config::load(args.config.as_deref())?;
    init_logger(&config.logging.log_level);
    log::info!("Starting coursegraph v{}", env!("CARGO_PKG_VERSION"));
    log::info!("Registry: {}", config.registry.query_url);
    log::info!("Directory: {}", config.directory.base_url);

    let (email, password) = config.registry_credentials()?;
    let registry = SparqlRegistry::new(
        config.registry.query_url.clone(),
        email,
        password,
        Duration::from_secs(config.registry.timeout_secs),
    )?;
    let directory = HttpDirectory::new(
        &config.directory.base_url,
        Duration::from_secs(config.directory.timeout_secs),
    )?;

    let ids: Box<dyn IdGenerator> = match args.seed {
        Some(seed) => {
            log::info!("Minting sequential ids from seed {}", seed);
            Box::new(SequentialIds::new(seed))
        }
        None => Box::new(RandomIds),
    };

    let services = Services {
        directory: Arc::new(directory),
        registry: Arc::new(registry),
        ids,
    };
    let mut options = PipelineOptions::from_config(&config);
    if let Some(encoding) = args.encoding {
        options.encoding = encoding;
    }

    let summary = pipeline::run(&args.input, &args.output, &options, services)
        .await
        .with_context(|| format!("Failed to build graph from {}", args.input.display()))?;

    log::info!("=== Ingest Complete ===");
    log::info!("Rows read: {}", summary.rows_read);
    log::info!("Rows skipped: {} (see {})", summary.rows_skipped, options.log_dir.display());
    log::info!("Courses: {} ({} merged rows)", summary.courses_minted, summary.rows_merged);
    log::info!("Statements: {}", summary.statements);
    log::info!("Time: {:?}", (summary.finished_at - summary.started_at).to_std().unwrap_or_default());

    Ok(())
}

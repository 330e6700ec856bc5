use clap::Parser;
use pathmetrics::{
    config::ConfigBuilder,
    env::Env,
    eval::time::parse_time_zone,
    pipeline::Pipeline,
    storage::{LocalFileSystem, Storage},
};
use pathmetrics_cli::{error::CliResult, report::write_report};
use std::{
    fs::File,
    io::{self, BufWriter, Write},
    path::PathBuf,
    sync::Arc,
};
use tracing::{debug, info};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Config files to compute metrics for
    #[arg(required = true)]
    configs: Vec<PathBuf>,

    /// Directory that absolute path values are resolved against
    #[arg(short = 'f', long, env = "PATHMETRICS_ROOT")]
    root: Option<PathBuf>,

    /// Write the report to a file instead of stdout
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Number of paths computed concurrently
    #[arg(short, long, default_value_t = 1, env = "PATHMETRICS_WORKERS")]
    workers: usize,

    /// Default time zone for time functions
    #[arg(long, default_value = "UTC", env = "PATHMETRICS_TIME_ZONE")]
    time_zone: String,

    /// Enable debug logging
    #[arg(short, long)]
    verbose: bool,
}

async fn run(cli: &Cli) -> CliResult<()> {
    let storage: Arc<dyn Storage> = match &cli.root {
        Some(root) => Arc::new(LocalFileSystem::with_root(root)),
        None => Arc::new(LocalFileSystem::new()),
    };
    let env = Env::builder()
        .with_time_zone(parse_time_zone(&cli.time_zone)?)
        .with_storage(storage)
        .with_max_workers(cli.workers)
        .build();
    debug!("env: {:?}", env);
    let pipeline = Pipeline::new(Arc::new(env));

    let mut output: Box<dyn Write> = match &cli.output {
        Some(path) => Box::new(BufWriter::new(File::create(path)?)),
        None => Box::new(io::stdout()),
    };

    for config_path in &cli.configs {
        let config = ConfigBuilder::new().from_file(config_path)?.build()?;
        info!("config loaded: {}", config_path.display());

        let results = pipeline.compute_all_metrics(&config).await?;
        write_report(&mut output, &results)?;
    }

    output.flush()?;
    Ok(())
}

#[tokio::main]
async fn main() {
    let _ = dotenv::dotenv();

    let cli = Cli::parse();

    let default_filter = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| default_filter.into()))
        .with(fmt::layer().with_writer(io::stderr))
        .init();

    if let Err(e) = run(&cli).await {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

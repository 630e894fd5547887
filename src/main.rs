use clap::{Parser, Subcommand};
use std::io::Write;
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;
use tracing::{error, info, warn};

use drinkify::app::catalog_use_case::CatalogUseCase;
use drinkify::app::ports::DrinkSourcePort;
use drinkify::config::Config;
use drinkify::constants::{CATALOG_FAILURE_MESSAGE, RANDOM_FAILURE_MESSAGE};
use drinkify::error::AggregationFailure;
use drinkify::infra::http_client::CocktailDbHttp;
use drinkify::{logging, metrics, render};
use drinkify::{AggregationOutcome, CancellationToken, Drink, Progress, QueryFilter};

const PROGRESS_WIDTH: usize = 30;

#[derive(Parser)]
#[command(name = "drinkify")]
#[command(about = "Find your next favorite cocktail")]
#[command(version)]
struct Cli {
    /// Path to a TOML config file (default: ./drinkify.toml if present)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Print collected metrics in Prometheus text format when done
    #[arg(long, global = true)]
    metrics: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show a random drink
    Random,
    /// Browse the full catalog
    All {
        /// Only list drinks whose name, category or type contains this text
        #[arg(long, short)]
        query: Option<String>,
        /// Maximum number of rows to print
        #[arg(long)]
        limit: Option<usize>,
    },
    /// Show the full recipe of the first drink matching a search
    Show {
        query: String,
    },
}

type Catalog = CatalogUseCase<dyn DrinkSourcePort>;

/// Load the catalog with a live progress bar. `Ok(None)` means the run was
/// cancelled with Ctrl-C.
async fn load_catalog(catalog: &Catalog) -> Result<Option<Vec<Drink>>, AggregationFailure> {
    let cancel = CancellationToken::new();
    let mut stderr = std::io::stderr();
    eprintln!("Mixing the list…");
    let _ = write!(
        stderr,
        "{}",
        render::progress_bar(
            Progress {
                completed: 0,
                total: catalog.partition_count()
            },
            PROGRESS_WIDTH
        )
    );
    let _ = stderr.flush();

    let on_progress = move |p: Progress| {
        let _ = write!(stderr, "\r{}", render::progress_bar(p, PROGRESS_WIDTH));
        let _ = stderr.flush();
    };

    let run = catalog.load_all(on_progress, &cancel);
    tokio::pin!(run);
    let result = tokio::select! {
        result = &mut run => result,
        _ = tokio::signal::ctrl_c() => {
            cancel.cancel();
            run.await
        }
    };
    eprintln!();

    match result? {
        AggregationOutcome::Complete(aggregation) => {
            if aggregation.summary.partitions_failed > 0 {
                warn!(
                    "{} of {} partitions failed",
                    aggregation.summary.partitions_failed, aggregation.summary.partitions_total
                );
            }
            Ok(Some(aggregation.items))
        }
        AggregationOutcome::Cancelled { settled } => {
            info!(settled, "Catalog load cancelled");
            Ok(None)
        }
    }
}

fn catalog_failed(e: AggregationFailure) -> ExitCode {
    error!("Catalog aggregation failed: {}", e);
    eprintln!("❌ {}", CATALOG_FAILURE_MESSAGE);
    ExitCode::FAILURE
}

async fn run(cli: Cli, catalog: Catalog) -> ExitCode {
    match cli.command {
        Commands::Random => match catalog.random().await {
            Ok(drink) => {
                println!("{}", render::drink_card(&drink));
                ExitCode::SUCCESS
            }
            Err(_) => {
                eprintln!("❌ {}", RANDOM_FAILURE_MESSAGE);
                ExitCode::FAILURE
            }
        },
        Commands::All { query, limit } => match load_catalog(&catalog).await {
            Ok(Some(drinks)) => {
                let filtered = QueryFilter::apply(&drinks, query.as_deref().unwrap_or(""));
                println!("{}", render::count_line(filtered.len(), drinks.len()));
                println!("{}", render::drink_list(&filtered, limit));
                ExitCode::SUCCESS
            }
            Ok(None) => ExitCode::from(130),
            Err(e) => catalog_failed(e),
        },
        Commands::Show { query } => match load_catalog(&catalog).await {
            Ok(Some(drinks)) => {
                let filtered = QueryFilter::apply(&drinks, &query);
                match filtered.first() {
                    Some(drink) => println!("{}", render::drink_card(drink)),
                    None => println!("{}", render::drink_list(&[], None)),
                }
                ExitCode::SUCCESS
            }
            Ok(None) => ExitCode::from(130),
            Err(e) => catalog_failed(e),
        },
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<ExitCode> {
    dotenv::dotenv().ok();
    let cli = Cli::parse();

    let config = Config::load(cli.config.as_deref())?;
    let _log_guard = logging::init_logging(&config.logging);
    if cli.metrics {
        metrics::init_metrics();
    }

    let source: Arc<dyn DrinkSourcePort> = Arc::new(CocktailDbHttp::new(&config.api)?);
    let catalog = CatalogUseCase::new(source, config.aggregator());

    let print_metrics = cli.metrics;
    let code = run(cli, catalog).await;

    if print_metrics {
        if let Some(text) = metrics::render() {
            println!("{}", text);
        }
    }
    Ok(code)
}

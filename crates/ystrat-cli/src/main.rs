//! Command line interface for the strategy pipeline.

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use tokio_util::sync::CancellationToken;
use tracing_subscriber::EnvFilter;

use ystrat_ingest::{validate_csv_path, CsvInput, IngestLimits};
use ystrat_models::{correlation_id, Brief, Strategy, Tone};
use ystrat_pipeline::{PipelineConfig, StrategyPipeline};
use ystrat_store::StrategyStore;

#[derive(Debug, Parser)]
#[command(name = "ystrat")]
#[command(about = "Local-first YouTube content strategy assistant")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Run the full strategy pipeline over a creator CSV
    Analyze {
        /// Creator analytics CSV
        #[arg(long)]
        input: PathBuf,

        /// What the creator wants to achieve
        #[arg(long)]
        goal: String,

        /// Who the content is for
        #[arg(long)]
        audience: String,

        /// Psychological tone: curiosity, authority, fear, persuasive or engaging
        #[arg(long)]
        tone: String,

        /// Competitor CSVs, comma separated
        #[arg(long, value_delimiter = ',')]
        competitors: Vec<PathBuf>,

        /// Verbose logging
        #[arg(long)]
        verbose: bool,
    },
    /// Enumerate or print persisted strategies
    Strategies {
        /// List all strategies
        #[arg(long)]
        list: bool,

        /// Print one strategy as JSON
        #[arg(long)]
        id: Option<String>,
    },
    /// Validate a CSV without running the pipeline
    Validate {
        /// CSV to check
        path: PathBuf,
    },
}

#[tokio::main]
async fn main() -> ExitCode {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();

    let verbose = matches!(&cli.command, Commands::Analyze { verbose: true, .. });
    init_tracing(verbose);

    match cli.command {
        Commands::Analyze {
            input,
            goal,
            audience,
            tone,
            competitors,
            ..
        } => run_analyze(input, goal, audience, tone, competitors).await,
        Commands::Strategies { list, id } => run_strategies(list, id).await,
        Commands::Validate { path } => run_validate(path).await,
    }
}

fn init_tracing(verbose: bool) {
    let default = if verbose { "ystrat=debug" } else { "ystrat=warn" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt().with_env_filter(filter).init();
}

async fn run_analyze(
    input: PathBuf,
    goal: String,
    audience: String,
    tone: String,
    competitors: Vec<PathBuf>,
) -> ExitCode {
    let tone: Tone = match tone.parse() {
        Ok(tone) => tone,
        Err(err) => {
            eprintln!("error: {err}");
            return ExitCode::from(2);
        }
    };
    let brief = Brief::new(goal, audience, tone);

    let config = PipelineConfig::from_env();
    let pipeline = match StrategyPipeline::from_config(&config).await {
        Ok(pipeline) => pipeline,
        Err(err) => {
            eprintln!("error: {err}");
            return ExitCode::from(1);
        }
    };

    let correlation = correlation_id();
    let cancel = CancellationToken::new();
    let ctrl_c_cancel = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            ctrl_c_cancel.cancel();
        }
    });

    match pipeline
        .run_with_correlation(&correlation, &brief, CsvInput::Path(&input), &competitors, &cancel)
        .await
    {
        Ok((strategy, path)) => {
            print_summary(&strategy, &path);
            ExitCode::SUCCESS
        }
        Err(err) => {
            match err.exit_code() {
                2 | 3 => eprintln!("rejected: {err}"),
                _ => eprintln!("internal failure [{correlation}]: {err}"),
            }
            ExitCode::from(err.exit_code() as u8)
        }
    }
}

fn print_summary(strategy: &Strategy, path: &std::path::Path) {
    println!("Strategy {} ({})", strategy.id, strategy.created_at);
    println!("  goal:     {}", strategy.brief.goal);
    println!("  tone:     {}", strategy.brief.tone);
    println!("  source:   {:?}", strategy.candidates.source);

    println!("\nTop titles:");
    for (i, title) in strategy.candidates.titles.iter().take(5).enumerate() {
        println!("  {}. {title}", i + 1);
    }

    if !strategy.candidates.tags.is_empty() {
        let tags: Vec<&str> = strategy.candidates.tags.iter().map(String::as_str).collect();
        println!("\nTags: {}", tags.join(", "));
    }

    if let Some(gaps) = &strategy.gaps {
        if !gaps.gaps.is_empty() {
            println!("\nTop gaps:");
            for gap in gaps.gaps.iter().take(5) {
                println!("  - {} (score {:.2})", gap.topic, gap.opportunity_score);
            }
        }
    }

    if !strategy.pipeline.degraded_steps.is_empty() {
        println!(
            "\nDegraded steps: {}",
            strategy.pipeline.degraded_steps.join(", ")
        );
    }

    println!("\nSaved to {}", path.display());
}

async fn run_strategies(list: bool, id: Option<String>) -> ExitCode {
    let config = PipelineConfig::from_env();
    let store = match StrategyStore::open(&config.storage_root).await {
        Ok(store) => store,
        Err(err) => {
            eprintln!("error: {err}");
            return ExitCode::from(1);
        }
    };

    if let Some(id) = id {
        return match store.get(&id).await {
            Ok(strategy) => match serde_json::to_string_pretty(&strategy) {
                Ok(json) => {
                    println!("{json}");
                    ExitCode::SUCCESS
                }
                Err(err) => {
                    eprintln!("error: {err}");
                    ExitCode::from(1)
                }
            },
            Err(err) => {
                eprintln!("error: {err}");
                ExitCode::from(1)
            }
        };
    }

    if list {
        match store.list(1000, 0).await {
            Ok(summaries) => {
                if summaries.is_empty() {
                    println!("no strategies yet");
                } else {
                    for summary in summaries {
                        println!(
                            "{}  {}  {}  {}",
                            summary.id, summary.created_at, summary.tone, summary.goal
                        );
                    }
                }
                ExitCode::SUCCESS
            }
            Err(err) => {
                eprintln!("error: {err}");
                ExitCode::from(1)
            }
        }
    } else {
        eprintln!("error: pass --list or --id ID");
        ExitCode::from(1)
    }
}

async fn run_validate(path: PathBuf) -> ExitCode {
    let limits = IngestLimits::default();
    match validate_csv_path(&path, &limits).await {
        Ok((rows, warnings)) => {
            println!("OK: {} row(s) accepted", rows.len());
            for warning in warnings {
                println!("warning: {warning}");
            }
            ExitCode::SUCCESS
        }
        Err(err) => {
            eprintln!("rejected: {err}");
            ExitCode::from(2)
        }
    }
}

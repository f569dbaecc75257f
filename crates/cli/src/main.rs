use clap::{Parser, Subcommand};

mod commands;

use commands::{BacktestArgs, ClassifyArgs, RunArgs};

#[derive(Parser)]
#[command(name = "sentiment-trader")]
#[command(about = "News-sentiment trading on Alpaca", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the live strategy loop against Alpaca
    Run(RunArgs),
    /// Replay the strategy over historical bars and a news archive
    Backtest(BacktestArgs),
    /// Classify headlines from a file and show the resulting signals
    Classify(ClassifyArgs),
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let filter = || {
        tracing_subscriber::EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"))
    };
    match &cli.command {
        Commands::Run(RunArgs {
            log_file: Some(path),
            ..
        }) => {
            let file = std::fs::OpenOptions::new()
                .create(true)
                .append(true)
                .open(path)?;
            tracing_subscriber::fmt()
                .with_env_filter(filter())
                .with_writer(std::sync::Mutex::new(file))
                .with_ansi(false)
                .init();
        }
        _ => {
            tracing_subscriber::fmt().with_env_filter(filter()).init();
        }
    }

    match cli.command {
        Commands::Run(args) => commands::run_live(args).await?,
        Commands::Backtest(args) => commands::run_backtest(args).await?,
        Commands::Classify(args) => commands::run_classify(args).await?,
    }

    Ok(())
}

//! nback CLI — administer an n-back test from the terminal.

use std::path::PathBuf;
use std::process;

use clap::{Parser, Subcommand};

mod commands;

#[derive(Parser)]
#[command(name = "nback", version, about = "Terminal n-back working-memory test")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run one test session
    Run {
        /// How many positions back to compare (1..=9)
        #[arg(long)]
        lag: Option<usize>,

        /// Number of stimuli to show
        #[arg(long)]
        trials: Option<usize>,

        /// Target fraction of match trials (0.0..=1.0)
        #[arg(long)]
        match_rate: Option<f64>,

        /// Milliseconds each stimulus stays up
        #[arg(long)]
        stimulus_ms: Option<u64>,

        /// Milliseconds allowed for a response (must be < stimulus time)
        #[arg(long)]
        response_ms: Option<u64>,

        /// Seed for a reproducible sequence
        #[arg(long)]
        seed: Option<u64>,

        /// Subject first name, carried into the summary
        #[arg(long)]
        name: Option<String>,

        /// Subject email, carried into the summary
        #[arg(long)]
        email: Option<String>,

        /// Directory for the summary JSON
        #[arg(long)]
        output: Option<PathBuf>,

        /// Config file path
        #[arg(long)]
        config: Option<PathBuf>,

        /// Skip webhook delivery even if configured
        #[arg(long)]
        no_deliver: bool,
    },

    /// Print a saved session summary
    Report {
        /// Path to a summary JSON file
        #[arg(long)]
        summary: PathBuf,
    },

    /// Create a starter config file
    Init,
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("nback=info".parse().unwrap()),
        )
        .init();

    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Run {
            lag,
            trials,
            match_rate,
            stimulus_ms,
            response_ms,
            seed,
            name,
            email,
            output,
            config,
            no_deliver,
        } => {
            commands::run::execute(commands::run::RunArgs {
                lag,
                trials,
                match_rate,
                stimulus_ms,
                response_ms,
                seed,
                name,
                email,
                output,
                config,
                no_deliver,
            })
            .await
        }
        Commands::Report { summary } => commands::report::execute(&summary),
        Commands::Init => commands::init::execute(),
    };

    if let Err(e) = result {
        eprintln!("Error: {e:#}");
        process::exit(1);
    }
}

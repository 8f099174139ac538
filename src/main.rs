//! Debate Arena - turn-based AI debates with streaming turns and structured
//! judging.

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use debate_arena::commands::{self, RunOptions, ServeOptions};

#[derive(Parser)]
#[command(
    name = "debate-arena",
    about = "Turn-based AI debates with streaming turns and structured judging",
    version
)]
struct Cli {
    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(short = 'v', long, action = clap::ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the HTTP API server.
    Serve {
        /// Host address to bind to.
        #[arg(long)]
        host: Option<String>,
        /// Port to listen on.
        #[arg(long)]
        port: Option<u16>,
        /// Path to a config file.
        #[arg(long)]
        config: Option<PathBuf>,
    },
    /// Run a debate in the terminal, streaming turns to stdout.
    Run {
        /// The proposition to debate.
        #[arg(long)]
        topic: String,
        /// Number of rounds (one pro turn plus one con turn each).
        #[arg(long, default_value_t = 3)]
        rounds: u32,
        /// Model for the pro side.
        #[arg(long)]
        pro_model: Option<String>,
        /// Model for the con side.
        #[arg(long)]
        con_model: Option<String>,
        /// Model for the judge.
        #[arg(long)]
        judge_model: Option<String>,
        /// Path to a config file.
        #[arg(long)]
        config: Option<PathBuf>,
    },
}

fn init_tracing(verbosity: u8) {
    let level = match verbosity {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(filter)
        .init();
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let result = match cli.command {
        Commands::Serve { host, port, config } => {
            commands::serve(ServeOptions { host, port, config }).await
        }
        Commands::Run {
            topic,
            rounds,
            pro_model,
            con_model,
            judge_model,
            config,
        } => {
            commands::run(RunOptions {
                topic,
                rounds,
                pro_model,
                con_model,
                judge_model,
                config,
            })
            .await
        }
    };

    if let Err(e) = result {
        tracing::error!(error = %e, "Command failed");
        std::process::exit(1);
    }
}

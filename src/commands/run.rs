//! `run` subcommand: drive a full debate in the terminal.

use std::io::Write;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use futures_util::StreamExt;
use owo_colors::OwoColorize;

use crate::config::ConfigLoader;
use crate::debate::{
    Advance, DebateConfig, DebateEngine, JudgeResult, Role, TurnEvent, SCORE_CRITERIA,
};
use crate::provider::OpenRouterClient;
use crate::store::MemoryStore;

/// Debate parameters taken from the command line.
#[derive(Debug)]
pub struct RunOptions {
    pub topic: String,
    pub rounds: u32,
    pub pro_model: Option<String>,
    pub con_model: Option<String>,
    pub judge_model: Option<String>,
    pub config: Option<PathBuf>,
}

fn role_label(role: Role) -> String {
    match role {
        Role::Pro => format!("{}", "PRO".green().bold()),
        Role::Con => format!("{}", "CON".red().bold()),
    }
}

fn print_verdict(verdict: &JudgeResult) {
    println!("\n{}", "=== VERDICT ===".bold());
    println!("Winner: {}", verdict.winner.to_string().to_uppercase().bold());
    for criterion in SCORE_CRITERIA {
        if let Some(score) = verdict.scores.get(criterion) {
            println!("  {criterion:<10} {score:>4.1}");
        }
    }
    println!("\n{}", verdict.reasoning);
}

/// Run a debate start-to-verdict, streaming turns to stdout.
///
/// # Errors
///
/// Returns an error when configuration loading, any turn, or the judgment
/// fails.
pub async fn run(options: RunOptions) -> anyhow::Result<()> {
    let loader = match options.config {
        Some(path) => ConfigLoader::with_path(path),
        None => ConfigLoader::new(),
    };
    let app_config = loader.load()?;

    let provider = Arc::new(OpenRouterClient::new(&app_config.provider));
    let store = Arc::new(MemoryStore::new());
    let engine = DebateEngine::new(store, provider)
        .with_credential_env(app_config.provider.api_key_env.clone());

    let mut config = DebateConfig::new(options.topic);
    config.rounds = options.rounds;
    if let Some(model) = options.pro_model {
        config.pro_model = model;
    }
    if let Some(model) = options.con_model {
        config.con_model = model;
    }
    if let Some(model) = options.judge_model {
        config.judge_model = model;
    }

    println!("{} {}", "Topic:".bold(), config.topic);
    let session_id = engine
        .start(config)
        .await
        .context("failed to start debate")?;

    loop {
        match engine.advance(&session_id).await? {
            Advance::Done { .. } => break,
            Advance::Streaming(mut events) => {
                let mut speaking: Option<Role> = None;
                while let Some(event) = events.next().await {
                    match event? {
                        TurnEvent::Delta { role, data } => {
                            if speaking != Some(role) {
                                print!("\n{} ", role_label(role));
                                speaking = Some(role);
                            }
                            print!("{data}");
                            std::io::stdout().flush().ok();
                        }
                        TurnEvent::Final { .. } => println!(),
                    }
                }
            }
        }
    }

    let verdict = engine
        .judge(&session_id)
        .await
        .context("failed to judge debate")?;
    print_verdict(&verdict);

    Ok(())
}

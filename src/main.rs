mod cli;
mod commands;

use anyhow::Context;
use clap::Parser;
use quizcraft::config::{get_config, init_config, LogFormat};
use quizcraft::error::Error;
use quizcraft::store::SessionStore;
use quizcraft::QuizClient;

#[tokio::main]
async fn main() {
    let code = match run().await {
        Ok(()) => 0,
        Err(error) => {
            tracing::error!("command failed: {error:#}");
            // Library errors carry a message meant for people; everything else prints its chain.
            match error.downcast_ref::<Error>() {
                Some(err) => eprintln!("Error: {}", err.user_message()),
                None => eprintln!("Error: {error:#}"),
            }
            1
        }
    };
    // A pending stdin read cannot be cancelled, so the runtime is not left to wait on it.
    std::process::exit(code);
}

async fn run() -> anyhow::Result<()> {
    let cli = cli::Cli::parse();

    init_config().context("failed to load configuration")?;
    let config = get_config()?;
    init_tracing(cli.verbose, &config.log_format)?;

    let client = QuizClient::new(config.clone())?;
    let store = SessionStore::load(&config.session_file).await?;
    client.set_token(store.active_token().map(str::to_string));

    commands::dispatch(cli.command, &client, store, cli.json).await
}

fn init_tracing(verbose: bool, format: &LogFormat) -> anyhow::Result<()> {
    let level = if verbose { "quizcraft=debug" } else { "quizcraft=info" };

    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(level));

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr);
    let result = match format {
        LogFormat::Json => builder.json().try_init(),
        LogFormat::Text => builder.try_init(),
    };
    result.map_err(|error| anyhow::anyhow!("failed to initialize tracing subscriber: {error}"))
}

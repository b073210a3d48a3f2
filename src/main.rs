use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tracing::info;

use forecast_chat::{
    ConversationSession, ForecastChatConfig, MistralClient, OpenMeteoClient, QueryResolver,
    ResponseRenderer, UtteranceParser, telemetry,
};

#[derive(Parser)]
#[command(name = "forecast-chat")]
#[command(about = "Ask about the weather for the next seven days", version)]
struct Args {
    /// Configuration file (defaults to the user config directory)
    #[arg(long, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Log at debug level
    #[arg(short, long)]
    verbose: bool,
}

fn build_session(config: &ForecastChatConfig) -> Result<ConversationSession> {
    let api_key = config.require_api_key()?;
    let weather = Arc::new(OpenMeteoClient::new(&config.weather)?);
    let llm = Arc::new(MistralClient::new(&config.llm, api_key)?);

    let resolver = QueryResolver::new(UtteranceParser::new(llm.clone()), weather.clone(), weather);
    Ok(ConversationSession::new(resolver, ResponseRenderer::new(llm)))
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let config = ForecastChatConfig::load_from_path(args.config)
        .context("Failed to load configuration")?;
    telemetry::init(&config.logging, args.verbose);

    let mut session = build_session(&config)?;
    info!("Using model {} via {}", config.llm.model, config.llm.base_url);

    let mut stdout = tokio::io::stdout();
    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    stdout
        .write_all(b"Starting the weather chatbot. Type 'exit' to quit.\n\n")
        .await?;

    loop {
        stdout.write_all(b"You: ").await?;
        stdout.flush().await?;

        let Some(line) = lines.next_line().await? else {
            break;
        };
        let line = line.trim();

        if line.eq_ignore_ascii_case("exit") {
            stdout.write_all(b"Goodbye!\n").await?;
            break;
        }
        if line.is_empty() {
            continue;
        }

        let reply = session.respond(line).await;
        stdout.write_all(format!("Bot: {reply}\n").as_bytes()).await?;
    }

    stdout.flush().await?;
    Ok(())
}

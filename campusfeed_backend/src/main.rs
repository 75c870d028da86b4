use anyhow::Result;
use campusfeed_backend::api::{self, AppState};
use campusfeed_backend::config::CampusfeedConfig;
use campusfeed_backend::database::Database;
use campusfeed_backend::moderation::ModerationPipeline;
use campusfeed_backend::oracles::{
    build_http_client, AssetStore, CodeSender, DisabledAssetStore, HttpAssetStore, HttpCodeSender,
    HttpSentimentClassifier, HttpTranslator, LoggingCodeSender,
};
use campusfeed_backend::telemetry;
use clap::{Parser, Subcommand};
use std::sync::Arc;

#[derive(Parser)]
#[command(author, version, about = "Campusfeed backend daemon")]
struct Args {
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
    /// Run the HTTP server (Axum) for REST/API access
    Serve,
}

#[tokio::main]
async fn main() -> Result<()> {
    telemetry::init_tracing();

    let args = Args::parse();

    let config = CampusfeedConfig::from_env()?;
    config.paths.ensure_directories()?;

    let database = Database::connect(&config.paths)?;
    database.ensure_migrations()?;
    tracing::info!(db_path = %config.paths.db_path.display(), "database ready");

    let client = build_http_client(&config.oracles)?;
    let moderation = ModerationPipeline::new(
        Arc::new(HttpTranslator::new(
            client.clone(),
            config.oracles.translate_url.clone(),
        )),
        Arc::new(HttpSentimentClassifier::new(
            client.clone(),
            config.oracles.sentiment_url.clone(),
        )),
    );
    let assets: Arc<dyn AssetStore> = match &config.oracles.asset_url {
        Some(url) => Arc::new(HttpAssetStore::new(client.clone(), url.clone())),
        None => Arc::new(DisabledAssetStore),
    };
    let code_sender: Arc<dyn CodeSender> = match &config.oracles.mailer_url {
        Some(url) => Arc::new(HttpCodeSender::new(client.clone(), url.clone())),
        None => Arc::new(LoggingCodeSender),
    };

    let state = AppState {
        config,
        database,
        moderation,
        assets,
        code_sender,
    };

    match args.command.unwrap_or(Command::Serve) {
        Command::Serve => api::serve_http(state).await,
    }
}

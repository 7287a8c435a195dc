//! MedGid bot binary: load config from env, wire the pipeline, run the REPL.

use std::sync::Arc;

use anyhow::Result;
use clap::{Parser, Subcommand};
use medgid_bot::{BotConfig, Router, TelegramRenderer, UserRegistry};
use medgid_directory::{DirectoryCache, DirectoryService, ProviderScraper};
use medgid_triage::CompletionTriageClient;
use tracing::info;

#[derive(Parser)]
#[command(name = "medgid-bot")]
#[command(about = "MedGid: Telegram bot for finding medical specialists", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the bot (config from env; token can override BOT_TOKEN).
    Run {
        #[arg(short, long)]
        token: Option<String>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    let cli = Cli::parse();
    match cli.command {
        Commands::Run { token } => run(BotConfig::load(token)?).await,
    }
}

async fn run(config: BotConfig) -> Result<()> {
    if let Some(parent) = std::path::Path::new(&config.log_file).parent() {
        std::fs::create_dir_all(parent)?;
    }
    medgid_core::init_tracing(&config.log_file)?;

    info!(
        city = %config.directory_city,
        cache_file = %config.cache_file,
        "Starting MedGid bot"
    );

    let scraper = ProviderScraper::new(&config.directory_base_url, &config.directory_city)?;
    let cache = DirectoryCache::new(&config.cache_file);
    let directory = Arc::new(DirectoryService::new(cache, Arc::new(scraper)));

    let triage = Arc::new(CompletionTriageClient::new(
        &config.triage_api_url,
        &config.triage_api_key,
        &config.triage_folder_id,
    )?);

    let bot = teloxide::Bot::new(&config.bot_token);
    let renderer = Arc::new(TelegramRenderer::new(bot.clone(), &config.welcome_photo));
    let router = Arc::new(Router::new(directory, triage, renderer));
    let users = Arc::new(UserRegistry::new(&config.users_file));

    info!("Bot started, entering polling loop");
    medgid_bot::run_repl(bot, router, users, config.admin_id).await
}

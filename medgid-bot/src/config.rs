//! Bot configuration, loaded from environment variables.

use anyhow::{Context, Result};
use std::env;

/// All runtime configuration. Load `.env` (dotenvy) before calling
/// [`BotConfig::load`].
pub struct BotConfig {
    pub bot_token: String,
    pub triage_api_url: String,
    pub triage_api_key: String,
    pub triage_folder_id: String,
    pub directory_base_url: String,
    pub directory_city: String,
    pub cache_file: String,
    pub users_file: String,
    pub log_file: String,
    pub welcome_photo: String,
    /// User id allowed to run `/broadcast`; unset disables the command.
    pub admin_id: Option<i64>,
}

const DEFAULT_TRIAGE_API_URL: &str =
    "https://llm.api.cloud.yandex.net/foundationModels/v1/completion";

impl BotConfig {
    /// Loads config from environment variables. A provided `token` overrides
    /// `BOT_TOKEN`.
    pub fn load(token: Option<String>) -> Result<Self> {
        let bot_token = match token {
            Some(t) => t,
            None => env::var("BOT_TOKEN").context("BOT_TOKEN not set")?,
        };
        let triage_api_url =
            env::var("TRIAGE_API_URL").unwrap_or_else(|_| DEFAULT_TRIAGE_API_URL.to_string());
        let triage_api_key = env::var("TRIAGE_API_KEY").context("TRIAGE_API_KEY not set")?;
        let triage_folder_id =
            env::var("TRIAGE_FOLDER_ID").context("TRIAGE_FOLDER_ID not set")?;
        let directory_base_url = env::var("DIRECTORY_BASE_URL")
            .unwrap_or_else(|_| "https://prodoctorov.ru".to_string());
        let directory_city =
            env::var("DIRECTORY_CITY").unwrap_or_else(|_| "domodedovo".to_string());
        let cache_file =
            env::var("CACHE_FILE").unwrap_or_else(|_| "doctors_cache.json".to_string());
        let users_file = env::var("USERS_FILE").unwrap_or_else(|_| "users.json".to_string());
        let log_file = env::var("LOG_FILE").unwrap_or_else(|_| "logs/medgid-bot.log".to_string());
        let welcome_photo = env::var("WELCOME_PHOTO").unwrap_or_else(|_| "start.jpg".to_string());
        let admin_id = env::var("ADMIN_ID").ok().and_then(|s| s.parse().ok());

        Ok(Self {
            bot_token,
            triage_api_url,
            triage_api_key,
            triage_folder_id,
            directory_base_url,
            directory_city,
            cache_file,
            users_file,
            log_file,
            welcome_photo,
            admin_id,
        })
    }
}

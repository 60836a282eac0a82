//! Environment-driven configuration.
//!
//! All runtime wiring comes from environment variables so the same binary
//! serves local runs and deployed workers. Values are read once at startup;
//! whether a missing value is fatal depends on the operation (a lead
//! submission does not need the transcription endpoint and vice versa).

use std::path::PathBuf;

#[derive(Debug, Clone)]
pub struct Config {
    /// Hosted inference endpoint for speech-to-text (`HF_ENDPOINT_URL`).
    pub endpoint_url: String,
    /// Bearer token for the inference endpoint (`HF_API_KEY`).
    pub api_key: String,
    /// Reference verse data file (`TARTEEL_QURAN_DATA`).
    pub quran_data_path: PathBuf,
    /// Row-append web endpoint for the lead spreadsheet (`SHEETS_API_URL`).
    pub sheets_api_url: String,
    /// Target spreadsheet id (`SHEET_ID`).
    pub sheet_id: String,
    /// Telegram bot token for lead notifications (`TELEGRAM_BOT_TOKEN`).
    pub telegram_bot_token: String,
    /// Telegram chat id for lead notifications (`TELEGRAM_CHAT_ID`).
    pub telegram_chat_id: String,
}

impl Config {
    #[must_use]
    pub fn from_env() -> Self {
        Self {
            endpoint_url: env_or_default("HF_ENDPOINT_URL", ""),
            api_key: env_or_default("HF_API_KEY", ""),
            quran_data_path: PathBuf::from(env_or_default(
                "TARTEEL_QURAN_DATA",
                "files/quran_ayahs.json",
            )),
            sheets_api_url: env_or_default("SHEETS_API_URL", ""),
            sheet_id: env_or_default("SHEET_ID", ""),
            telegram_bot_token: env_or_default("TELEGRAM_BOT_TOKEN", ""),
            telegram_chat_id: env_or_default("TELEGRAM_CHAT_ID", ""),
        }
    }

    /// Whether the optional notification channel is fully configured.
    #[must_use]
    pub fn telegram_configured(&self) -> bool {
        !self.telegram_bot_token.trim().is_empty() && !self.telegram_chat_id.trim().is_empty()
    }
}

fn env_or_default(key: &str, fallback: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| fallback.to_owned())
}

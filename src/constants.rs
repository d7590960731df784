// Constants loaded from the environment, with defaults for local runs.

use std::env;

/// Value shipped in `.env.example`; treated the same as a missing key.
pub const PLACEHOLDER_API_KEY: &str = "PLACEHOLDER_API_KEY";

/// Shown as the first assistant message of every session.
pub const WELCOME_TEXT: &str = "✨ Добро пожаловать! 🌲 Я помогу вам выбрать идеальное место для отдыха на природе. Что интересует — баня, домик, беседка или праздник? 🎉";

/// Sent as the only fragment when the remote model call fails.
pub const APOLOGY_TEXT: &str = "Извините, произошла ошибка при обработке запроса.";

lazy_static::lazy_static! {
    // VITE_GEMINI_API_KEY is honoured so an existing frontend .env works as-is.
    pub static ref GEMINI_API_KEY: String = env::var("GEMINI_API_KEY")
        .or_else(|_| env::var("VITE_GEMINI_API_KEY"))
        .unwrap_or_default();
    pub static ref GEMINI_MODEL: String = env::var("GEMINI_MODEL").unwrap_or_else(|_| "gemini-2.0-flash".to_string());
    pub static ref GEMINI_BASE_URL: String = env::var("GEMINI_BASE_URL").unwrap_or_else(|_| "https://generativelanguage.googleapis.com".to_string());
    pub static ref FALLBACK_DELAY_MS: u64 = env::var("BEREZKA_FALLBACK_DELAY_MS")
        .ok()
        .and_then(|s| s.parse().ok())
        .unwrap_or(20);
    // No timeout unless asked for; a hung request keeps the turn loading.
    pub static ref REQUEST_TIMEOUT_SECS: Option<u64> = env::var("BEREZKA_REQUEST_TIMEOUT_SECS")
        .ok()
        .and_then(|s| s.parse().ok());
}

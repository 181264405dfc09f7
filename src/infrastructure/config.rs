use std::env;
use std::time::Duration;

use crate::modules::integrations::google_books::DEFAULT_API_URL;

#[derive(Clone, Debug)]
pub struct Config {
    pub database_url: String,
    pub port: u16,
    pub cors_allowed_origins: Vec<String>,
    pub profile: String,
    pub google_books_api_url: String,
    pub google_books_api_key: Option<String>,
    pub lookup_timeout: Duration,
}

impl Config {
    pub fn from_env() -> Self {
        let profile = env::var("PROFILE").unwrap_or_else(|_| "default".to_string());

        let database_url = env::var("DATABASE_URL").unwrap_or_else(|_| {
            if profile == "default" {
                "sqlite://shelfkeeper.db?mode=rwc".to_string()
            } else {
                format!("sqlite://shelfkeeper_{}.db?mode=rwc", profile)
            }
        });

        Self {
            database_url,
            port: env::var("PORT")
                .ok()
                .and_then(|p| p.parse().ok())
                .unwrap_or(8000),
            cors_allowed_origins: env::var("CORS_ALLOWED_ORIGINS")
                .ok()
                .map(|s| s.split(',').map(|s| s.trim().to_string()).collect())
                .unwrap_or_else(Vec::new),
            profile,
            google_books_api_url: env::var("GOOGLE_BOOKS_API_URL")
                .unwrap_or_else(|_| DEFAULT_API_URL.to_string()),
            google_books_api_key: env::var("GOOGLE_BOOKS_API_KEY")
                .ok()
                .filter(|k| !k.is_empty()),
            lookup_timeout: Duration::from_secs(
                env::var("LOOKUP_TIMEOUT_SECS")
                    .ok()
                    .and_then(|s| s.parse().ok())
                    .unwrap_or(5),
            ),
        }
    }
}

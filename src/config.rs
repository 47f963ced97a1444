use std::time::Duration;

use dotenvy;

use crate::services::retry::RetryConfig;

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub db_namespace: String,
    pub db_database: String,
    pub db_password: Option<String>,
    pub db_username: Option<String>,
    pub db_url: String,
    pub server_port: u16,
    pub reply_max_depth: u8,
    pub reply_admin_role: String,
    pub tx_max_attempts: u32,
    pub tx_initial_backoff_ms: u64,
    pub sentry_project_link: Option<String>,
}

impl AppConfig {
    pub fn from_env() -> Self {
        let _ = dotenvy::dotenv();
        let db_namespace = std::env::var("DB_NAMESPACE").unwrap_or("namespace".to_string());
        let db_database = std::env::var("DB_DATABASE").unwrap_or("database".to_string());
        let db_password = std::env::var("DB_PASSWORD").ok();
        let db_username = std::env::var("DB_USERNAME").ok();
        let db_url = std::env::var("DB_URL").unwrap_or("mem://".to_string());

        let server_port = std::env::var("SERVER_PORT").map_or(8080, |v| {
            v.parse::<u16>().expect("SERVER_PORT must be number")
        });

        let reply_max_depth = std::env::var("REPLY_MAX_DEPTH").map_or(3, |v| {
            v.parse::<u8>().expect("REPLY_MAX_DEPTH must be number")
        });
        let reply_admin_role = std::env::var("REPLY_ADMIN_ROLE").unwrap_or("admin".to_string());

        let tx_max_attempts = std::env::var("TX_MAX_ATTEMPTS").map_or(8, |v| {
            v.parse::<u32>().expect("TX_MAX_ATTEMPTS must be number")
        });
        let tx_initial_backoff_ms = std::env::var("TX_INITIAL_BACKOFF_MS").map_or(5, |v| {
            v.parse::<u64>().expect("TX_INITIAL_BACKOFF_MS must be number")
        });

        let sentry_project_link = std::env::var("SENTRY_PROJECT_LINK").ok();

        Self {
            db_namespace,
            db_database,
            db_password,
            db_username,
            db_url,
            server_port,
            reply_max_depth,
            reply_admin_role,
            tx_max_attempts,
            tx_initial_backoff_ms,
            sentry_project_link,
        }
    }

    pub fn retry_config(&self) -> RetryConfig {
        RetryConfig {
            max_attempts: self.tx_max_attempts.max(1),
            initial_backoff: Duration::from_millis(self.tx_initial_backoff_ms),
            ..Default::default()
        }
    }
}

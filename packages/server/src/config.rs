use anyhow::{Context, Result};
use dotenvy::dotenv;
use std::env;
use std::time::Duration;

/// Application configuration loaded from environment variables
#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub port: u16,
    pub db_max_connections: u32,
    pub jwt_secret: String,
    pub jwt_issuer: String,
    pub frontend_url: String,
    /// `None` when EMAIL_USER / EMAIL_PASSWORD are absent; mail is then only logged.
    pub smtp: Option<SmtpConfig>,
    pub notification_poll_interval: Duration,
}

#[derive(Debug, Clone)]
pub struct SmtpConfig {
    pub host: String,
    pub port: u16,
    pub username: String,
    pub password: String,
    pub from_name: String,
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self> {
        // Load .env file if present (development)
        let _ = dotenv();

        Ok(Self {
            database_url: env::var("DATABASE_URL").context("DATABASE_URL must be set")?,
            port: env::var("PORT")
                .unwrap_or_else(|_| "8080".to_string())
                .parse()
                .context("PORT must be a valid number")?,
            db_max_connections: env::var("DB_MAX_CONNECTIONS")
                .unwrap_or_else(|_| "10".to_string())
                .parse()
                .context("DB_MAX_CONNECTIONS must be a valid number")?,
            jwt_secret: env::var("JWT_SECRET").context("JWT_SECRET must be set")?,
            jwt_issuer: env::var("JWT_ISSUER").unwrap_or_else(|_| "events-api".to_string()),
            frontend_url: env::var("FRONTEND_URL")
                .unwrap_or_else(|_| "http://localhost:3000".to_string()),
            smtp: SmtpConfig::from_env()?,
            notification_poll_interval: Duration::from_secs(
                env::var("NOTIFICATION_POLL_SECS")
                    .unwrap_or_else(|_| "5".to_string())
                    .parse()
                    .context("NOTIFICATION_POLL_SECS must be a valid number")?,
            ),
        })
    }
}

impl SmtpConfig {
    fn from_env() -> Result<Option<Self>> {
        let (Ok(username), Ok(password)) = (env::var("EMAIL_USER"), env::var("EMAIL_PASSWORD"))
        else {
            return Ok(None);
        };

        Ok(Some(Self {
            host: env::var("SMTP_HOST").unwrap_or_else(|_| "smtp.naver.com".to_string()),
            port: env::var("SMTP_PORT")
                .unwrap_or_else(|_| "587".to_string())
                .parse()
                .context("SMTP_PORT must be a valid number")?,
            username,
            password,
            from_name: env::var("EMAIL_FROM_NAME").unwrap_or_else(|_| "Events".to_string()),
        }))
    }
}

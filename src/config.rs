use std::net::SocketAddr;

use anyhow::Context;
use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
pub struct JwtConfig {
    pub secret: String,
    pub issuer: String,
    pub audience: String,
    pub ttl_minutes: i64,
    pub refresh_ttl_minutes: i64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

impl ServerConfig {
    pub fn socket_addr(&self) -> anyhow::Result<SocketAddr> {
        format!("{}:{}", self.host, self.port)
            .parse()
            .with_context(|| format!("invalid listen address {}:{}", self.host, self.port))
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub database_url: String,
    pub database_max_connections: u32,
    pub jwt: JwtConfig,
    pub server: ServerConfig,
    /// Buffered events per job feed subscriber before it starts lagging.
    pub job_feed_capacity: usize,
}

impl AppConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        let database_url = std::env::var("DATABASE_URL").context("DATABASE_URL is not set")?;
        let jwt = JwtConfig {
            secret: std::env::var("JWT_SECRET").context("JWT_SECRET is not set")?,
            issuer: std::env::var("JWT_ISSUER").unwrap_or_else(|_| "jobboard".into()),
            audience: std::env::var("JWT_AUDIENCE").unwrap_or_else(|_| "jobboard-users".into()),
            ttl_minutes: env_or("JWT_TTL_MINUTES", 60),
            refresh_ttl_minutes: env_or("JWT_REFRESH_TTL_MINUTES", 60 * 24 * 14),
        };
        let server = ServerConfig {
            host: std::env::var("APP_HOST").unwrap_or_else(|_| "0.0.0.0".into()),
            port: env_or("APP_PORT", 8080),
        };
        Ok(Self {
            database_url,
            database_max_connections: env_or("DATABASE_MAX_CONNECTIONS", 10),
            jwt,
            server,
            job_feed_capacity: env_or("JOB_FEED_CAPACITY", 256),
        })
    }
}

fn env_or<T: std::str::FromStr>(key: &str, default: T) -> T {
    std::env::var(key)
        .ok()
        .and_then(|v| v.parse::<T>().ok())
        .unwrap_or(default)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Mutex, OnceLock};

    fn env_guard() -> &'static Mutex<()> {
        static GUARD: OnceLock<Mutex<()>> = OnceLock::new();
        GUARD.get_or_init(|| Mutex::new(()))
    }

    fn reset_env() {
        for key in [
            "DATABASE_URL",
            "DATABASE_MAX_CONNECTIONS",
            "JWT_SECRET",
            "JWT_ISSUER",
            "JWT_AUDIENCE",
            "JWT_TTL_MINUTES",
            "JWT_REFRESH_TTL_MINUTES",
            "APP_HOST",
            "APP_PORT",
            "JOB_FEED_CAPACITY",
        ] {
            std::env::remove_var(key);
        }
    }

    #[test]
    fn from_env_applies_defaults() {
        let _lock = env_guard().lock().expect("env mutex poisoned");
        reset_env();
        std::env::set_var("DATABASE_URL", "postgres://localhost/jobboard");
        std::env::set_var("JWT_SECRET", "secret");

        let config = AppConfig::from_env().expect("config loads");
        assert_eq!(config.jwt.issuer, "jobboard");
        assert_eq!(config.jwt.audience, "jobboard-users");
        assert_eq!(config.jwt.ttl_minutes, 60);
        assert_eq!(config.server.port, 8080);
        assert_eq!(config.database_max_connections, 10);
        assert_eq!(config.job_feed_capacity, 256);
        assert_eq!(
            config.server.socket_addr().expect("addr parses").to_string(),
            "0.0.0.0:8080"
        );
    }

    #[test]
    fn from_env_requires_secret() {
        let _lock = env_guard().lock().expect("env mutex poisoned");
        reset_env();
        std::env::set_var("DATABASE_URL", "postgres://localhost/jobboard");

        let err = AppConfig::from_env().unwrap_err();
        assert!(err.to_string().contains("JWT_SECRET"));
    }

    #[test]
    fn unparsable_numbers_fall_back() {
        let _lock = env_guard().lock().expect("env mutex poisoned");
        reset_env();
        std::env::set_var("DATABASE_URL", "postgres://localhost/jobboard");
        std::env::set_var("JWT_SECRET", "secret");
        std::env::set_var("APP_PORT", "not-a-port");

        let config = AppConfig::from_env().expect("config loads");
        assert_eq!(config.server.port, 8080);
    }
}

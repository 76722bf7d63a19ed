use std::net::SocketAddr;
use std::time::Duration;

use anyhow::{Context, Result};

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub bind_addr: SocketAddr,
    pub jwt_secret: String,
    pub reply_timeout_ms: u64,
}

impl AppConfig {
    pub fn from_env() -> Result<Self> {
        let bind_addr = env_string("CONDUIT_BIND_ADDR", "127.0.0.1:8080")
            .parse::<SocketAddr>()
            .context("CONDUIT_BIND_ADDR must be a valid host:port")?;

        let jwt_secret = env_string("CONDUIT_JWT_SECRET", "conduit-dev-secret");

        let reply_timeout_ms = env_string("CONDUIT_REPLY_TIMEOUT_MS", "5000")
            .parse::<u64>()
            .context("CONDUIT_REPLY_TIMEOUT_MS must be u64")?;

        Ok(Self {
            bind_addr,
            jwt_secret,
            reply_timeout_ms,
        })
    }

    pub fn reply_timeout(&self) -> Duration {
        Duration::from_millis(self.reply_timeout_ms)
    }
}

fn env_string(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}

use std::net::SocketAddr;

use anyhow::{Context, Result};

// Process-wide configuration, loaded once at startup.
#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub bind_addr: SocketAddr,
    pub jwt_secret: String,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        let database_url =
            std::env::var("DATABASE_URL").unwrap_or_else(|_| "sqlite://todo.db".to_string());

        let bind_addr = std::env::var("BIND_ADDR")
            .unwrap_or_else(|_| "127.0.0.1:8000".to_string())
            .parse()
            .context("BIND_ADDR is not a valid socket address")?;

        // Every outstanding token is signed with this secret; changing it
        // logs everyone out.
        let jwt_secret = std::env::var("JWT_SECRET").context("JWT_SECRET must be set")?;

        Ok(Config {
            database_url,
            bind_addr,
            jwt_secret,
        })
    }
}

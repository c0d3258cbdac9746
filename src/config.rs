use anyhow::{Context, Result};

use crate::domain::status::TransitionMode;

#[derive(Debug, Clone)]
pub struct Config {
    pub database: DatabaseConfig,
    pub server: ServerConfig,
    pub orders: OrdersConfig,
}

#[derive(Debug, Clone)]
pub struct DatabaseConfig {
    pub url: String,
}

#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub bind_addr: String,
}

#[derive(Debug, Clone)]
pub struct OrdersConfig {
    pub strict_transitions: bool,
}

impl OrdersConfig {
    pub fn transition_mode(&self) -> TransitionMode {
        if self.strict_transitions {
            TransitionMode::Strict
        } else {
            TransitionMode::Lenient
        }
    }
}

pub fn load() -> Result<Config> {
    let url = std::env::var("DATABASE_URL").context("DATABASE_URL must be set")?;
    let bind_addr = std::env::var("BIND_ADDR").unwrap_or_else(|_| "0.0.0.0:3000".to_string());
    let strict_transitions = std::env::var("STRICT_STATUS_TRANSITIONS")
        .map(|v| matches!(v.to_lowercase().as_str(), "1" | "true" | "yes"))
        .unwrap_or(false);

    Ok(Config {
        database: DatabaseConfig { url },
        server: ServerConfig { bind_addr },
        orders: OrdersConfig { strict_transitions },
    })
}

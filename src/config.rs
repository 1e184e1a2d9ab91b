use anyhow::Context;
use dotenvy::dotenv;
use std::env;

#[derive(Clone)]
pub struct Config {
    pub server_addr: String,
    pub database_url: String,

    // Rate limiting
    pub rate_api_per_min: u32,
    pub rate_bulk_per_min: u32,
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        dotenv().ok();

        Ok(Self {
            server_addr: env::var("SERVER_ADDR").unwrap_or_else(|_| "127.0.0.1:8080".to_string()),
            database_url: env::var("DATABASE_URL").context("DATABASE_URL must be set")?,

            rate_api_per_min: env::var("RATE_API_PER_MIN")
                .unwrap_or_else(|_| "600".to_string())
                .parse()
                .context("RATE_API_PER_MIN must be a number")?,
            rate_bulk_per_min: env::var("RATE_BULK_PER_MIN")
                .unwrap_or_else(|_| "30".to_string())
                .parse()
                .context("RATE_BULK_PER_MIN must be a number")?,
        })
    }
}

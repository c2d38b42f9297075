// Server configuration: defaults, then config.toml, then APP_* environment variables

use anyhow::{Result, bail};
use config::{Config, ConfigBuilder, Environment, File, builder::DefaultState};
use serde::Deserialize;

pub const DEFAULT_FEED_URL: &str =
    "https://arpitjoshi.github.io/8e4474f3-d675-44c2-ba12-ccfacfa97c8b.json";

#[derive(Debug, Deserialize, Clone)]
pub struct Settings {
    pub server_address: String,
    pub feed_url: String,
    pub items_per_page: usize,
    pub fetch_timeout_secs: u64,
}

impl Settings {
    pub fn new() -> Result<Self> {
        dotenv::dotenv().ok(); // Load .env file if present

        let builder = Self::defaults()?
            // Load from a configuration file (e.g., config.toml)
            .add_source(File::with_name("config").required(false))
            // APP_FEED_URL, APP_ITEMS_PER_PAGE, ...
            .add_source(
                Environment::with_prefix("APP")
                    .prefix_separator("_")
                    .separator("__")
                    .try_parsing(true),
            );

        Self::from_builder(builder)
    }

    fn defaults() -> Result<ConfigBuilder<DefaultState>> {
        Ok(Config::builder()
            .set_default("server_address", "127.0.0.1:3000")?
            .set_default("feed_url", DEFAULT_FEED_URL)?
            .set_default("items_per_page", 6_i64)?
            .set_default("fetch_timeout_secs", 10_i64)?)
    }

    fn from_builder(builder: ConfigBuilder<DefaultState>) -> Result<Self> {
        let settings: Settings = builder.build()?.try_deserialize()?;
        if settings.items_per_page == 0 {
            bail!("items_per_page must be a positive integer");
        }
        if settings.feed_url.trim().is_empty() {
            bail!("feed_url must not be empty");
        }
        Ok(settings)
    }
}

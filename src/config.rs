//! Runtime configuration, read from environment variables.
//!
//! - `HOST` - bind address (default `127.0.0.1`)
//! - `PORT` - bind port (default `3000`)
//! - `DATABASE_PATH` - SQLite file (default `tasks.db`, `:memory:` for a throwaway database)
//! - `SITE_URL` - public base URL, needed by `/sitemap.xml`

use std::path::PathBuf;

use anyhow::{Context, Result};
use url::Url;

#[derive(Debug, Clone)]
pub struct Config {
    pub host: String,
    pub port: u16,
    pub database_path: PathBuf,
    pub site_url: Option<Url>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 3000,
            database_path: PathBuf::from("tasks.db"),
            site_url: None,
        }
    }
}

impl Config {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build a config from an arbitrary key lookup. Empty values count as unset.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        let defaults = Self::default();

        let port = match get("PORT") {
            Some(raw) => raw
                .trim()
                .parse::<u16>()
                .with_context(|| format!("PORT must be a port number, got {:?}", raw))?,
            None => defaults.port,
        };

        let site_url = get("SITE_URL")
            .map(|raw| {
                Url::parse(raw.trim()).with_context(|| format!("SITE_URL is not a valid URL: {:?}", raw))
            })
            .transpose()?;

        Ok(Self {
            host: get("HOST").unwrap_or(defaults.host),
            port,
            database_path: get("DATABASE_PATH")
                .map(PathBuf::from)
                .unwrap_or(defaults.database_path),
            site_url,
        })
    }

    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

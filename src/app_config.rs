use crate::market::{MarketClient, config};
use crate::store::{RecordStore, SupabaseStore};
use anyhow::{Result, bail};
use colored::Colorize;
use std::sync::Arc;

const DEFAULT_PORT: u16 = 3001;
const DEFAULT_BIND: &str = "127.0.0.1";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    Server,
    Sentiment,
    /// One daily FII/DII collection run, for cron
    CollectFiiDii,
}

impl Mode {
    fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "server" => Some(Self::Server),
            "sentiment" => Some(Self::Sentiment),
            "collect-fii-dii" => Some(Self::CollectFiiDii),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Server => "server",
            Self::Sentiment => "sentiment",
            Self::CollectFiiDii => "collect-fii-dii",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SupabaseConfig {
    pub url: String,
    pub service_key: String,
}

/// Application configuration handler
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub mode: Mode,
    pub port: u16,
    pub bind: String,
    pub admin_password: Option<String>,
    pub supabase: Option<SupabaseConfig>,
    pub indices_url: String,
    pub screener_url: String,
    pub nse_home_url: String,
    pub fii_dii_url: String,
    pub log_dir: Option<String>,
    unknown_mode: Option<String>,
}

impl AppConfig {
    /// Create new configuration from environment variables
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from any key lookup; blank values count as unset
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let raw_mode = get("TSM_MODE");
        let mode = raw_mode.as_deref().and_then(Mode::parse);
        let unknown_mode = raw_mode.filter(|_| mode.is_none());

        let supabase = match (get("SUPABASE_URL"), get("SUPABASE_SERVICE_ROLE_KEY")) {
            (Some(url), Some(service_key)) => Some(SupabaseConfig { url, service_key }),
            _ => None,
        };

        Self {
            mode: mode.unwrap_or(Mode::Server),
            port: get("TSM_PORT")
                .and_then(|p| p.parse::<u16>().ok())
                .unwrap_or(DEFAULT_PORT),
            bind: get("TSM_BIND").unwrap_or_else(|| DEFAULT_BIND.to_string()),
            admin_password: get("SWING_ADMIN_PASSWORD"),
            supabase,
            indices_url: get("TSM_INDICES_URL").unwrap_or_else(|| config::INDICES_PAGE_URL.to_string()),
            screener_url: get("TSM_SCREENER_URL").unwrap_or_else(|| config::SCREENER_URL.to_string()),
            nse_home_url: get("TSM_NSE_URL").unwrap_or_else(|| config::NSE_HOME_URL.to_string()),
            fii_dii_url: get("TSM_FII_DII_URL").unwrap_or_else(|| config::NSE_FII_DII_URL.to_string()),
            log_dir: get("TSM_LOG_DIR"),
            unknown_mode,
        }
    }

    pub fn address(&self) -> String {
        format!("{}:{}", self.bind, self.port)
    }

    pub fn market_client(&self) -> Result<MarketClient> {
        Ok(MarketClient::new(&self.indices_url, &self.screener_url)?
            .with_nse_urls(&self.nse_home_url, &self.fii_dii_url))
    }

    pub fn record_store(&self) -> Result<Option<Arc<dyn RecordStore>>> {
        Ok(match &self.supabase {
            Some(db) => Some(Arc::new(SupabaseStore::new(&db.url, &db.service_key)?)),
            None => None,
        })
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<()> {
        if let Some(mode) = &self.unknown_mode {
            bail!("Unknown TSM_MODE '{}'. Use 'server', 'sentiment' or 'collect-fii-dii'", mode);
        }
        if self.port == 0 {
            bail!("TSM_PORT must be a non-zero port");
        }
        let urls = [
            ("TSM_INDICES_URL", &self.indices_url),
            ("TSM_SCREENER_URL", &self.screener_url),
            ("TSM_NSE_URL", &self.nse_home_url),
            ("TSM_FII_DII_URL", &self.fii_dii_url),
        ];
        for (name, url) in urls {
            if !url.starts_with("http://") && !url.starts_with("https://") {
                bail!("{} must be an http(s) URL, got '{}'", name, url);
            }
        }
        if let Some(db) = &self.supabase {
            if !db.url.starts_with("http://") && !db.url.starts_with("https://") {
                bail!("SUPABASE_URL must be an http(s) URL, got '{}'", db.url);
            }
        }
        if self.mode == Mode::CollectFiiDii && self.supabase.is_none() {
            bail!("collect-fii-dii mode needs SUPABASE_URL and SUPABASE_SERVICE_ROLE_KEY");
        }
        Ok(())
    }

    /// Print the effective configuration at startup
    pub fn log_config(&self) {
        println!("{} Mode: {}", "→".cyan(), self.mode.as_str().yellow());
        if self.mode == Mode::Server {
            println!("{} Listening on: {}", "→".cyan(), self.address().yellow());
        }

        match &self.supabase {
            Some(db) => println!("{} Database: {}", "✓".green(), db.url),
            None => println!("{} Database not configured - serving sample data", "⚠".yellow()),
        }
        if self.admin_password.is_none() {
            println!("{} SWING_ADMIN_PASSWORD not set - admin routes disabled", "⚠".yellow());
        }
        if let Some(dir) = &self.log_dir {
            println!("{} JSON logs: {}", "→".cyan(), dir);
        }
        println!();
    }
}

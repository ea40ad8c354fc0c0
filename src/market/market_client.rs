use super::config;
use super::fii_dii;
use super::models::{BreadthCounts, FiiDiiRecord, IndexRow, MarketIndex, NseFiiDiiRow, SectorData};
use super::scrape;
use crate::utility::Timer;
use anyhow::{Context, Result, anyhow};
use chrono::{NaiveDate, Utc};
use rand::{seq::SliceRandom, thread_rng};
use regex::Regex;
use reqwest::{Client, StatusCode, header};
use serde::Deserialize;
use std::sync::LazyLock;
use std::time::Duration;
use tokio::sync::RwLock;
use tokio_retry::Retry;
use tokio_retry::strategy::ExponentialBackoff;
use tracing::{debug, info, warn};

static CSRF_META_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"<meta\s+name="csrf-token"\s+content="([^"]+)""#).expect("valid csrf regex")
});

#[derive(Debug, Deserialize)]
struct ScreenerResponse {
    #[serde(default)]
    data: Vec<ScreenerRow>,
}

#[derive(Debug, Deserialize)]
struct ScreenerRow {
    #[serde(default)]
    nsecode: Option<String>,
    #[serde(default)]
    per_chg: Option<f64>,
}

// -----------------------------------------------
// CLIENT FOR THE PUBLIC MARKET PAGES
// -----------------------------------------------
pub struct MarketClient {
    client: Client,
    indices_url: String,
    screener_url: String,
    nse_home_url: String,
    fii_dii_url: String,
    screener_csrf: RwLock<Option<String>>,
    nse_warmed_up: RwLock<bool>,
}

impl MarketClient {
    pub fn new(indices_url: impl Into<String>, screener_url: impl Into<String>) -> Result<Self> {
        Ok(Self {
            client: build_client()?,
            indices_url: indices_url.into(),
            screener_url: screener_url.into(),
            nse_home_url: config::NSE_HOME_URL.to_string(),
            fii_dii_url: config::NSE_FII_DII_URL.to_string(),
            screener_csrf: RwLock::new(None),
            nse_warmed_up: RwLock::new(false),
        })
    }

    /// Point the FII/DII feed (and the page that seeds its session cookies) elsewhere
    pub fn with_nse_urls(mut self, home_url: impl Into<String>, fii_dii_url: impl Into<String>) -> Self {
        self.nse_home_url = home_url.into();
        self.fii_dii_url = fii_dii_url.into();
        self
    }

    async fn fetch_text(&self, url: &str) -> Result<String> {
        let mut headers = header::HeaderMap::new();
        headers.insert(header::ACCEPT, header::HeaderValue::from_static(config::HEADER_ACCEPT_HTML));
        headers.insert(header::CACHE_CONTROL, header::HeaderValue::from_static("no-cache"));
        self.get_with_retry(url, headers).await
    }

    /// GET with exponential backoff on 429/5xx
    async fn get_with_retry(&self, url: &str, headers: header::HeaderMap) -> Result<String> {
        let _timer = Timer::start_with_threshold(format!("GET {}", url), config::SLOW_FETCH_MS);

        let backoff = ExponentialBackoff::from_millis(config::RETRY_BASE_DELAY_MS)
            .factor(config::RETRY_FACTOR)
            .max_delay(Duration::from_secs(config::RETRY_MAX_DELAY_SECS))
            .take(config::RETRY_MAX_ATTEMPTS);

        Retry::spawn(backoff, || async {
            let res = self
                .client
                .get(url)
                .headers(headers.clone())
                .send()
                .await
                .context("Request send failed")?;

            let status = res.status();
            debug!(url, status = status.as_u16(), "upstream response");

            if status.is_success() {
                return res.text().await.context("Failed to read body");
            }

            if status == StatusCode::TOO_MANY_REQUESTS || status.is_server_error() {
                anyhow::bail!("Retryable error: {}", status)
            }

            let body = res.text().await.unwrap_or_default();
            let preview: String = body.chars().take(200).collect();
            anyhow::bail!("Client error {}: {}", status, preview)
        })
        .await
    }

    pub async fn fetch_index_rows(&self) -> Result<Vec<IndexRow>> {
        let html = self.fetch_text(&self.indices_url).await?;
        let rows = scrape::parse_table_rows(&html);
        debug!(rows = rows.len(), "parsed indices table");
        Ok(rows)
    }

    // -----------------------------------------------
    // HEADLINE INDICES
    // -----------------------------------------------
    pub async fn fetch_market_indices(&self) -> Result<Vec<MarketIndex>> {
        let rows = self.fetch_index_rows().await?;
        let indices = scrape::extract_market_indices(&rows);

        if indices.is_empty() {
            return Err(anyhow!("No market indices found in table"));
        }

        info!(
            "Scraped {}/{} market indices",
            indices.len(),
            config::MARKET_INDICES.len()
        );
        Ok(indices)
    }

    // -----------------------------------------------
    // SECTOR PERFORMANCE
    // -----------------------------------------------
    pub async fn fetch_sectors(&self) -> Result<Vec<SectorData>> {
        let rows = self.fetch_index_rows().await?;
        let sectors = scrape::extract_sectors(&rows, Utc::now());

        if sectors.is_empty() {
            return Err(anyhow!("No sector data found"));
        }

        info!("Found {} sectors", sectors.len());
        Ok(sectors)
    }

    // -----------------------------------------------
    // FII/DII TRADE FEED
    // -----------------------------------------------

    /// The feed rejects requests without the cookies set by the home page
    async fn warmup_nse_if_needed(&self) -> Result<()> {
        if *self.nse_warmed_up.read().await {
            return Ok(());
        }

        let mut warmed = self.nse_warmed_up.write().await;
        if !*warmed {
            self.client
                .get(&self.nse_home_url)
                .header(header::ACCEPT, config::HEADER_ACCEPT_HTML)
                .send()
                .await
                .context("Failed to warm up NSE session")?;

            tokio::time::sleep(Duration::from_millis(config::NSE_WARMUP_DELAY_MS)).await;
            *warmed = true;
        }

        Ok(())
    }

    pub async fn fetch_fii_dii_rows(&self) -> Result<Vec<NseFiiDiiRow>> {
        self.warmup_nse_if_needed().await?;

        let mut headers = header::HeaderMap::new();
        headers.insert(header::ACCEPT, header::HeaderValue::from_static(config::HEADER_ACCEPT_JSON));
        headers.insert(header::REFERER, header::HeaderValue::from_str(&self.nse_home_url)?);
        headers.insert("X-Requested-With", header::HeaderValue::from_static(config::HEADER_X_REQUESTED_WITH));

        let text = self.get_with_retry(&self.fii_dii_url, headers).await?;
        let trimmed = text.trim();
        if !trimmed.starts_with('[') {
            let preview: String = trimmed.chars().take(200).collect();
            if trimmed.starts_with('{') {
                warn!("FII/DII feed returned an object, expected a list");
                return Ok(Vec::new());
            }
            return Err(anyhow!("Non-JSON FII/DII response: {}", preview));
        }

        serde_json::from_str(trimmed).context("Failed to parse FII/DII feed")
    }

    /// Today's FII and DII rows from the exchange feed
    pub async fn fetch_fii_dii_records(&self, today: NaiveDate) -> Result<Vec<FiiDiiRecord>> {
        let rows = self.fetch_fii_dii_rows().await?;
        let records = fii_dii::records_from_nse(&rows, today);
        info!("Parsed {} FII/DII records from {} feed rows", records.len(), rows.len());
        Ok(records)
    }

    // -----------------------------------------------
    // RSI SCREENER
    // -----------------------------------------------

    /// Screener pages hand out a CSRF token that must accompany the POST
    async fn screener_token(&self) -> Result<String> {
        if let Some(token) = self.screener_csrf.read().await.as_ref() {
            return Ok(token.clone());
        }

        let mut cached = self.screener_csrf.write().await;
        if let Some(token) = cached.as_ref() {
            return Ok(token.clone());
        }

        let page = self.fetch_text(config::SCREENER_REFERER).await?;
        let token = CSRF_META_RE
            .captures(&page)
            .map(|c| c[1].to_string())
            .ok_or_else(|| anyhow!("Screener page carried no csrf token"))?;

        *cached = Some(token.clone());
        Ok(token)
    }

    pub async fn fetch_screener_breadth(&self) -> Result<BreadthCounts> {
        let token = self.screener_token().await?;

        let res = self
            .client
            .post(&self.screener_url)
            .header(header::REFERER, config::SCREENER_REFERER)
            .header("X-Requested-With", config::HEADER_X_REQUESTED_WITH)
            .header("X-CSRF-TOKEN", token)
            .form(&[("scan_clause", config::SCREENER_RSI_CLAUSE)])
            .send()
            .await
            .context("Screener request failed")?;

        let status = res.status();
        if !status.is_success() {
            // Token may have rotated; fetch a fresh one next time
            *self.screener_csrf.write().await = None;
            anyhow::bail!("Screener responded with status {}", status);
        }

        let body: ScreenerResponse = res.json().await.context("Failed to parse screener response")?;
        if body.data.is_empty() {
            warn!("Screener returned no rows");
            return Err(anyhow!("Screener returned no rows"));
        }

        let counts = count_breadth(body.data.iter().map(|r| r.per_chg));
        debug!(
            sample = body.data.first().and_then(|r| r.nsecode.as_deref()),
            advancing = counts.advancing,
            declining = counts.declining,
            "screener breadth"
        );
        Ok(counts)
    }
}

/// Bucket per-stock percentage changes into advancers and decliners
pub fn count_breadth(changes: impl Iterator<Item = Option<f64>>) -> BreadthCounts {
    let mut counts = BreadthCounts::default();
    for change in changes.flatten() {
        if change > 0.0 {
            counts.advancing += 1;
        } else if change < 0.0 {
            counts.declining += 1;
        } else {
            counts.unchanged += 1;
        }
    }
    counts
}

// -----------------------------------------------
// HTTP CLIENT BUILDER
// -----------------------------------------------
pub fn build_client() -> Result<Client> {
    let mut headers = header::HeaderMap::new();

    let lang = config::ACCEPT_LANGUAGES
        .choose(&mut thread_rng())
        .copied()
        .unwrap_or("en-US,en;q=0.9");
    headers.insert(header::ACCEPT_LANGUAGE, header::HeaderValue::from_str(lang)?);
    headers.insert(header::ACCEPT, header::HeaderValue::from_static("*/*"));

    Client::builder()
        .default_headers(headers)
        .cookie_store(true)
        .user_agent(config::USER_AGENT)
        .timeout(config::HTTP_TIMEOUT)
        .build()
        .context("Failed to build HTTP client")
}

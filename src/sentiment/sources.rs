use super::engine::{FlowReading, Quote, SentimentInputs, VixQuote};
use crate::market::config;
use crate::market::{
    BreadthCounts, FiiDiiRecord, FiiDiiSummary, MarketClient, MarketIndex, SectorData, fii_dii,
};
use crate::store::RecordStore;
use anyhow::{Result, anyhow};
use async_trait::async_trait;
use chrono::{Duration, Utc};
use std::sync::Arc;
use tracing::{info, warn};

/// Upstream market data behind the sentiment, market and FII/DII routes
#[async_trait]
pub trait MarketSources: Send + Sync {
    async fn market_indices(&self) -> Result<Vec<MarketIndex>>;
    async fn sectors(&self) -> Result<Vec<SectorData>>;
    /// Newest stored FII/DII day, if any
    async fn latest_fii_dii(&self) -> Result<Option<FiiDiiSummary>>;
    async fn screener_breadth(&self) -> Result<BreadthCounts>;
    /// Today's FII and DII rows straight from the exchange feed
    async fn fii_dii_trades(&self) -> Result<Vec<FiiDiiRecord>>;
}

/// Production sources: the scraped pages, the screener and the record store
pub struct LiveSources {
    market: Arc<MarketClient>,
    store: Option<Arc<dyn RecordStore>>,
}

impl LiveSources {
    pub fn new(market: Arc<MarketClient>, store: Option<Arc<dyn RecordStore>>) -> Self {
        Self { market, store }
    }
}

#[async_trait]
impl MarketSources for LiveSources {
    async fn market_indices(&self) -> Result<Vec<MarketIndex>> {
        self.market.fetch_market_indices().await
    }

    async fn sectors(&self) -> Result<Vec<SectorData>> {
        self.market.fetch_sectors().await
    }

    async fn latest_fii_dii(&self) -> Result<Option<FiiDiiSummary>> {
        let store = self
            .store
            .as_ref()
            .ok_or_else(|| anyhow!("Record store not configured"))?;

        let since = (Utc::now() - Duration::days(config::FII_DII_HISTORY_DAYS)).date_naive();
        let records = store.fii_dii_since(since).await?;
        Ok(fii_dii::summarize(&records).into_iter().next())
    }

    async fn screener_breadth(&self) -> Result<BreadthCounts> {
        self.market.fetch_screener_breadth().await
    }

    async fn fii_dii_trades(&self) -> Result<Vec<FiiDiiRecord>> {
        self.market.fetch_fii_dii_records(Utc::now().date_naive()).await
    }
}

/// Pull nifty, bank nifty and VIX quotes out of the headline index list
pub fn quotes_from_indices(indices: &[MarketIndex]) -> (Option<Quote>, Option<Quote>, Option<VixQuote>) {
    let mut nifty = None;
    let mut bank_nifty = None;
    let mut vix = None;

    for index in indices {
        let name = if index.name.is_empty() {
            index.display_name.to_lowercase()
        } else {
            index.name.to_lowercase()
        };

        let quote = Quote {
            current: index.current,
            change: index.change,
            change_percent: index.change_percent,
        };

        if name.contains("nifty 50") || name == "nifty" {
            nifty = Some(quote);
        } else if name.contains("bank nifty") || name.contains("nifty bank") {
            bank_nifty = Some(quote);
        } else if name.contains("vix") {
            vix = Some(VixQuote { current: index.current, change: index.change });
        }
    }

    (nifty, bank_nifty, vix)
}

/// Fan out to every source concurrently; each failure degrades to its default
pub async fn gather_inputs(sources: &dyn MarketSources) -> SentimentInputs {
    let (indices, flows, sectors, breadth) = tokio::join!(
        sources.market_indices(),
        sources.latest_fii_dii(),
        sources.sectors(),
        sources.screener_breadth(),
    );

    let (nifty, bank_nifty, vix) = match indices {
        Ok(indices) => quotes_from_indices(&indices),
        Err(e) => {
            warn!("Market indices unavailable, using defaults: {:#}", e);
            (None, None, None)
        }
    };

    let flows = match flows {
        Ok(Some(latest)) => {
            info!(date = %latest.date, fii_net = latest.fii_net, dii_net = latest.dii_net, "Latest FII/DII flows");
            FlowReading::live(latest.fii_net, latest.dii_net)
        }
        Ok(None) => {
            warn!("No FII/DII history found, using sample flows");
            FlowReading::sample()
        }
        Err(e) => {
            warn!("FII/DII fetch failed, using sample flows: {:#}", e);
            FlowReading::sample()
        }
    };

    let sectors = sectors.unwrap_or_else(|e| {
        warn!("Sector data fetch failed: {:#}", e);
        Vec::new()
    });

    let breadth = breadth
        .inspect_err(|e| warn!("Screener fetch failed: {:#}", e))
        .ok();

    SentimentInputs { nifty, bank_nifty, vix, flows, sectors, breadth }
}

#![allow(dead_code)]

use anyhow::{Result, anyhow};
use async_trait::async_trait;
use chrono::Utc;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use tradesmartmoney::MarketSources;
use tradesmartmoney::market::{BreadthCounts, FiiDiiRecord, FiiDiiSummary, MarketIndex, SectorData};

/// Canned upstreams; `None` makes the corresponding fetch fail
#[derive(Default, Clone)]
pub struct StubSources {
    pub indices: Option<Vec<MarketIndex>>,
    pub sectors: Option<Vec<SectorData>>,
    pub fii_dii: Option<FiiDiiSummary>,
    pub breadth: Option<BreadthCounts>,
    pub fii_dii_feed: Option<Vec<FiiDiiRecord>>,
    /// Number of `market_indices` calls, shared across clones
    pub index_calls: Arc<AtomicUsize>,
}

impl StubSources {
    pub fn failing() -> Self {
        Self::default()
    }

    /// Nifty +2.5% at 25500, VIX 10, net flows +3500, every sector green
    pub fn bullish() -> Self {
        Self {
            indices: Some(vec![
                MarketIndex::new("NIFTY 50", "Nifty", 25500.0, 622.0, 2.5),
                MarketIndex::new("NIFTY BANK", "Bank Nifty", 56000.0, 900.0, 1.6),
                MarketIndex::new("INDIA VIX", "India VIX", 10.0, -0.8, -7.4),
            ]),
            sectors: Some(
                ["IT", "Banking", "Pharma", "Auto", "FMCG"]
                    .iter()
                    .map(|name| sector(name, 1.2))
                    .collect(),
            ),
            fii_dii: Some(FiiDiiSummary {
                date: "2025-01-10".to_string(),
                fii_net: 3000.0,
                dii_net: 500.0,
                net_combined: 3500.0,
                ..Default::default()
            }),
            breadth: Some(BreadthCounts { advancing: 80, declining: 20, unchanged: 0 }),
            ..Self::default()
        }
    }

    pub fn index_calls(&self) -> usize {
        self.index_calls.load(Ordering::SeqCst)
    }
}

pub fn sector(name: &str, change: f64) -> SectorData {
    SectorData {
        name: name.to_string(),
        change,
        value: "₹10,000".to_string(),
        last_updated: Utc::now(),
    }
}

#[async_trait]
impl MarketSources for StubSources {
    async fn market_indices(&self) -> Result<Vec<MarketIndex>> {
        self.index_calls.fetch_add(1, Ordering::SeqCst);
        self.indices.clone().ok_or_else(|| anyhow!("indices page unreachable"))
    }

    async fn sectors(&self) -> Result<Vec<SectorData>> {
        self.sectors.clone().ok_or_else(|| anyhow!("indices page unreachable"))
    }

    async fn latest_fii_dii(&self) -> Result<Option<FiiDiiSummary>> {
        self.fii_dii
            .clone()
            .map(Some)
            .ok_or_else(|| anyhow!("store unreachable"))
    }

    async fn screener_breadth(&self) -> Result<BreadthCounts> {
        self.breadth.ok_or_else(|| anyhow!("screener unreachable"))
    }

    async fn fii_dii_trades(&self) -> Result<Vec<FiiDiiRecord>> {
        self.fii_dii_feed.clone().ok_or_else(|| anyhow!("exchange feed unreachable"))
    }
}

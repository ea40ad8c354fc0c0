use crate::market::{FiiDiiRecord, fii_dii};
use crate::sentiment::MarketSources;
use crate::store::RecordStore;
use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::{info, warn};

#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum FlowSource {
    Nse,
    SampleData,
}

impl FlowSource {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Nse => "nse",
            Self::SampleData => "sample_data",
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct FiiDiiCollection {
    pub records: Vec<FiiDiiRecord>,
    pub source: FlowSource,
    pub scraped_at: DateTime<Utc>,
}

/// Fetch today's institutional flows and persist them.
///
/// An unreachable or empty feed falls back to one sample pair so the history
/// still gains a row for the day. Cleanup failures are logged, not returned.
pub async fn collect_fii_dii(
    sources: &dyn MarketSources,
    store: &dyn RecordStore,
    now: DateTime<Utc>,
) -> Result<FiiDiiCollection> {
    let scraped = sources.fii_dii_trades().await;

    let (records, source) = match scraped {
        Ok(records) if !records.is_empty() => {
            info!("NSE: found {} FII/DII records", records.len());
            (records, FlowSource::Nse)
        }
        outcome => {
            match outcome {
                Err(e) => warn!("FII/DII feed failed, using sample pair: {:#}", e),
                Ok(_) => warn!("FII/DII feed had no usable rows, using sample pair"),
            }
            (fii_dii::sample_pair(now.date_naive(), &mut rand::thread_rng()), FlowSource::SampleData)
        }
    };

    let written = store
        .upsert_fii_dii(&records)
        .await
        .context("Failed to store FII/DII data")?;
    info!(written, source = source.as_str(), "Stored FII/DII records");

    match store.cleanup_fii_dii().await {
        Ok(()) => info!("Cleaned up FII/DII data outside the history window"),
        Err(e) => warn!("Failed to cleanup old FII/DII data: {:#}", e),
    }

    Ok(FiiDiiCollection { records, source, scraped_at: now })
}

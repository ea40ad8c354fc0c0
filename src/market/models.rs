use crate::utility::serde_helpers::grouped_f64;
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// One row of the indices table, cells already stripped of markup
#[derive(Debug, Clone, PartialEq)]
pub struct IndexRow {
    pub name: String,
    pub ltp_text: String,
    pub change_text: String,
}

/// Headline index served by /api/market-indices
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct MarketIndex {
    pub name: String,

    #[serde(rename = "displayName")]
    pub display_name: String,

    pub current: f64,
    pub change: f64,

    #[serde(rename = "changePercent")]
    pub change_percent: f64,
}

impl MarketIndex {
    pub fn new(name: &str, display_name: &str, current: f64, change: f64, change_percent: f64) -> Self {
        Self {
            name: name.to_string(),
            display_name: display_name.to_string(),
            current,
            change,
            change_percent,
        }
    }
}

/// Sector performance entry served by /api/sector-data
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SectorData {
    pub name: String,
    pub change: f64,
    pub value: String,

    #[serde(rename = "lastUpdated")]
    pub last_updated: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum FiiDiiCategory {
    #[serde(rename = "FII")]
    Fii,
    #[serde(rename = "DII")]
    Dii,
}

/// Raw row of the `fii_dii_data` table, values in crores
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct FiiDiiRecord {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<i64>,
    pub date: String,
    pub category: FiiDiiCategory,
    pub buy_value: f64,
    pub sell_value: f64,
    pub net_value: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<String>,
}

impl FiiDiiRecord {
    /// Fresh row for `date`; net is purchases minus sales
    pub fn new(date: NaiveDate, category: FiiDiiCategory, buy_value: f64, sell_value: f64) -> Self {
        Self {
            id: None,
            date: date.format("%Y-%m-%d").to_string(),
            category,
            buy_value,
            sell_value,
            net_value: buy_value - sell_value,
            created_at: None,
        }
    }
}

/// One entry of the exchange's FII/DII trade feed (gross purchase/sale, crores)
#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
pub struct NseFiiDiiRow {
    #[serde(rename = "fiiGrossP", default, deserialize_with = "grouped_f64")]
    pub fii_gross_purchase: Option<f64>,
    #[serde(rename = "fiiGrossS", default, deserialize_with = "grouped_f64")]
    pub fii_gross_sales: Option<f64>,
    #[serde(rename = "diiGrossP", default, deserialize_with = "grouped_f64")]
    pub dii_gross_purchase: Option<f64>,
    #[serde(rename = "diiGrossS", default, deserialize_with = "grouped_f64")]
    pub dii_gross_sales: Option<f64>,
}

/// FII and DII figures folded into one row per trading date
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct FiiDiiSummary {
    pub date: String,
    pub fii_buy: f64,
    pub fii_sell: f64,
    pub fii_net: f64,
    pub dii_buy: f64,
    pub dii_sell: f64,
    pub dii_net: f64,
    pub net_combined: f64,
}

#[derive(Debug, Clone, Serialize)]
pub struct FiiDiiStats {
    pub total_days: usize,
    pub latest_date: Option<String>,
    pub total_records: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct FiiDiiHistory {
    pub raw: Vec<FiiDiiRecord>,
    pub summary: Vec<FiiDiiSummary>,
    pub stats: FiiDiiStats,
}

/// Advancing/declining counts derived from a screener scan
#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq, Default)]
pub struct BreadthCounts {
    pub advancing: usize,
    pub declining: usize,
    pub unchanged: usize,
}

impl BreadthCounts {
    pub fn total_moving(&self) -> usize {
        self.advancing + self.declining
    }
}

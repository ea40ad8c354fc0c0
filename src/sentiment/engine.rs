use super::indicators::{self, Indicators};
use crate::error::AppError;
use crate::market::config;
use crate::market::{BreadthCounts, SectorData};
use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

// Substituted when a quote is missing
const DEFAULT_NIFTY: Quote = Quote { current: 24500.0, change: 0.0, change_percent: 0.0 };
const DEFAULT_BANK_NIFTY: Quote = Quote { current: 52000.0, change: 0.0, change_percent: 0.0 };
const DEFAULT_VIX: VixQuote = VixQuote { current: 15.0, change: 0.0 };

const PENALTY_NO_NIFTY: f64 = 20.0;
const PENALTY_NO_VIX: f64 = 15.0;
const PENALTY_ESTIMATED_FLOWS: f64 = 15.0;
const PENALTY_NO_SECTORS: f64 = 10.0;
const PENALTY_NO_SCREENER: f64 = 5.0;
const MIXED_SIGNAL_FACTOR: f64 = 0.85;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct Quote {
    pub current: f64,
    pub change: f64,
    #[serde(rename = "changePercent")]
    pub change_percent: f64,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct VixQuote {
    pub current: f64,
    pub change: f64,
}

/// Institutional flows; `estimated` when the history source gave nothing usable
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FlowReading {
    pub fii_net: f64,
    pub dii_net: f64,
    pub estimated: bool,
}

impl FlowReading {
    pub fn live(fii_net: f64, dii_net: f64) -> Self {
        Self { fii_net, dii_net, estimated: false }
    }

    pub fn sample() -> Self {
        Self {
            fii_net: config::SAMPLE_FII_NET,
            dii_net: config::SAMPLE_DII_NET,
            estimated: true,
        }
    }
}

/// Everything the upstream fan-out produced for one request
#[derive(Debug, Clone, PartialEq)]
pub struct SentimentInputs {
    pub nifty: Option<Quote>,
    pub bank_nifty: Option<Quote>,
    pub vix: Option<VixQuote>,
    pub flows: FlowReading,
    pub sectors: Vec<SectorData>,
    pub breadth: Option<BreadthCounts>,
}

impl SentimentInputs {
    /// Nothing came back from any source
    pub fn all_missing(&self) -> bool {
        self.nifty.is_none()
            && self.bank_nifty.is_none()
            && self.vix.is_none()
            && self.flows.estimated
            && self.sectors.is_empty()
            && self.breadth.is_none()
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum SentimentLabel {
    #[serde(rename = "Strongly Bullish")]
    StronglyBullish,
    Bullish,
    Neutral,
    Bearish,
    #[serde(rename = "Strongly Bearish")]
    StronglyBearish,
}

impl SentimentLabel {
    pub fn from_score(score: f64) -> Self {
        if score >= 60.0 {
            Self::StronglyBullish
        } else if score >= 20.0 {
            Self::Bullish
        } else if score >= -20.0 {
            Self::Neutral
        } else if score >= -60.0 {
            Self::Bearish
        } else {
            Self::StronglyBearish
        }
    }

    pub fn summary(&self) -> &'static str {
        match self {
            Self::StronglyBullish => "Market shows strong bullish momentum with positive indicators across multiple parameters.",
            Self::Bullish => "Market sentiment is positive with favorable conditions for upward movement.",
            Self::Neutral => "Market is in consolidation mode with mixed signals from various indicators.",
            Self::Bearish => "Market sentiment is negative with concerns about downward pressure.",
            Self::StronglyBearish => "Market shows strong bearish sentiment with multiple negative indicators.",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct MarketData {
    pub nifty: Quote,
    pub bank_nifty: Quote,
    pub vix: VixQuote,
    pub fii_net: f64,
    pub dii_net: f64,
}

/// Which upstreams delivered live data
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct SourceStatus {
    pub indices: bool,
    pub fii_dii: bool,
    pub sectors: bool,
    pub screener: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Sentiment {
    pub overall: SentimentLabel,
    pub score: i32,
    pub confidence: i32,
    pub summary: String,
    pub indicators: Indicators,
    pub market_data: MarketData,
    pub sources: SourceStatus,
    pub last_updated: DateTime<Utc>,
    pub next_update: DateTime<Utc>,
}

/// Score every indicator for the given inputs
pub fn score_indicators(inputs: &SentimentInputs) -> Indicators {
    let nifty = inputs.nifty.unwrap_or(DEFAULT_NIFTY);
    let vix = inputs.vix.unwrap_or(DEFAULT_VIX);

    Indicators {
        nifty_trend: indicators::nifty_trend(nifty.change_percent),
        vix_level: indicators::vix_level(vix.current),
        fii_activity: indicators::fii_activity(inputs.flows.fii_net, inputs.flows.dii_net),
        sector_breadth: indicators::sector_breadth(&inputs.sectors),
        market_cap: indicators::market_cap(nifty.current),
        advance_decline: indicators::advance_decline(inputs.breadth.as_ref(), &inputs.sectors),
    }
}

/// Weighted mean of indicator values, in [-100, 100]
pub fn weighted_score(indicators: &Indicators) -> f64 {
    let all = indicators.all();
    let total_weight: f64 = all.iter().map(|i| i.weight).sum();
    if total_weight <= 0.0 {
        return 0.0;
    }

    let weighted: f64 = all.iter().map(|i| i.value * i.weight).sum();
    (weighted / total_weight).clamp(-100.0, 100.0)
}

/// Starts at 100, loses points per missing source, discounted when signs disagree
pub fn confidence(indicators: &Indicators, inputs: &SentimentInputs) -> f64 {
    let mut confidence = 100.0;

    if inputs.nifty.is_none() {
        confidence -= PENALTY_NO_NIFTY;
    }
    if inputs.vix.is_none() {
        confidence -= PENALTY_NO_VIX;
    }
    if inputs.flows.estimated {
        confidence -= PENALTY_ESTIMATED_FLOWS;
    }
    if inputs.sectors.is_empty() {
        confidence -= PENALTY_NO_SECTORS;
    }
    if inputs.breadth.is_none() {
        confidence -= PENALTY_NO_SCREENER;
    }

    let all = indicators.all();
    let positive = all.iter().filter(|i| i.value > 0.0).count();
    let negative = all.iter().filter(|i| i.value < 0.0).count();
    if positive > 0 && negative > 0 {
        confidence *= MIXED_SIGNAL_FACTOR;
    }

    f64::clamp(confidence, 0.0, 100.0)
}

/// Nearest integer, halves toward positive infinity (-2.5 -> -2, 2.5 -> 3)
pub fn round_half_up(value: f64) -> i32 {
    (value + 0.5).floor() as i32
}

/// Build the composite snapshot. Fails when no source delivered anything.
pub fn compute_sentiment(inputs: &SentimentInputs, now: DateTime<Utc>) -> Result<Sentiment, AppError> {
    if inputs.all_missing() {
        return Err(AppError::Upstream(
            "No upstream market data available".to_string(),
        ));
    }

    let indicators = score_indicators(inputs);
    let score = weighted_score(&indicators);
    if !score.is_finite() {
        return Err(AppError::Internal(format!("Non-finite sentiment score: {}", score)));
    }

    let overall = SentimentLabel::from_score(score);
    let confidence = confidence(&indicators, inputs);

    Ok(Sentiment {
        overall,
        score: round_half_up(score),
        confidence: round_half_up(confidence),
        summary: overall.summary().to_string(),
        market_data: MarketData {
            nifty: inputs.nifty.unwrap_or(DEFAULT_NIFTY),
            bank_nifty: inputs.bank_nifty.unwrap_or(DEFAULT_BANK_NIFTY),
            vix: inputs.vix.unwrap_or(DEFAULT_VIX),
            fii_net: inputs.flows.fii_net,
            dii_net: inputs.flows.dii_net,
        },
        sources: SourceStatus {
            indices: inputs.nifty.is_some() || inputs.vix.is_some(),
            fii_dii: !inputs.flows.estimated,
            sectors: !inputs.sectors.is_empty(),
            screener: inputs.breadth.is_some(),
        },
        indicators,
        last_updated: now,
        next_update: next_update(now),
    })
}

/// Fully populated neutral snapshot returned alongside errors
pub fn default_sentiment(now: DateTime<Utc>) -> Sentiment {
    let zero = Quote { current: 0.0, change: 0.0, change_percent: 0.0 };

    Sentiment {
        overall: SentimentLabel::Neutral,
        score: 0,
        confidence: 0,
        summary: "Unable to determine market sentiment due to data unavailability.".to_string(),
        indicators: Indicators::unavailable(),
        market_data: MarketData {
            nifty: zero,
            bank_nifty: zero,
            vix: VixQuote { current: 0.0, change: 0.0 },
            fii_net: 0.0,
            dii_net: 0.0,
        },
        sources: SourceStatus { indices: false, fii_dii: false, sectors: false, screener: false },
        last_updated: now,
        next_update: next_update(now),
    }
}

fn next_update(now: DateTime<Utc>) -> DateTime<Utc> {
    now + Duration::minutes(config::SENTIMENT_REFRESH_MINUTES)
}

//! Option-chain analysis rows written by the external collector, and the
//! filter pipeline behind `GET /api/option-analysis`.

use crate::utility::serde_helpers::loose_f64;
use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

pub const DEFAULT_LIMIT: i64 = 1000;

/// Lists are stored as JSON text; arrays are accepted as-is, anything
/// unparseable decodes to empty
fn json_list<'de, D, T>(deserializer: D) -> Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    let decoded = match Option::<Value>::deserialize(deserializer)? {
        Some(Value::String(text)) => serde_json::from_str(&text).unwrap_or_default(),
        Some(array @ Value::Array(_)) => serde_json::from_value(array).unwrap_or_default(),
        _ => Vec::new(),
    };
    Ok(decoded)
}

fn score_value<'de, D>(deserializer: D) -> Result<f64, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(loose_f64(deserializer)?.unwrap_or(0.0))
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct OptionAnalysis {
    #[serde(default)]
    pub id: Option<i64>,
    pub symbol: String,
    #[serde(default)]
    pub analysis_timestamp: Option<String>,
    #[serde(default)]
    pub trading_date: Option<String>,
    #[serde(default, deserialize_with = "score_value")]
    pub score: f64,
    #[serde(default)]
    pub institutional_sentiment: Option<String>,
    #[serde(default)]
    pub reasoning: Option<String>,
    #[serde(default, deserialize_with = "loose_f64")]
    pub confidence: Option<f64>,
    #[serde(default, deserialize_with = "loose_f64")]
    pub current_price: Option<f64>,
    #[serde(default, deserialize_with = "loose_f64")]
    pub overall_pcr: Option<f64>,
    #[serde(default, deserialize_with = "loose_f64")]
    pub max_pain: Option<f64>,
    #[serde(default, deserialize_with = "json_list")]
    pub support_levels: Vec<f64>,
    #[serde(default, deserialize_with = "json_list")]
    pub resistance_levels: Vec<f64>,
    #[serde(default, deserialize_with = "json_list")]
    pub unusual_activity: Vec<String>,
    #[serde(default, deserialize_with = "json_list")]
    pub strength_signals: Vec<String>,
    #[serde(default, deserialize_with = "loose_f64")]
    pub net_call_buildup: Option<f64>,
    #[serde(default, deserialize_with = "loose_f64")]
    pub net_put_buildup: Option<f64>,
    #[serde(default, deserialize_with = "loose_f64")]
    pub target_1: Option<f64>,
    #[serde(default, deserialize_with = "loose_f64")]
    pub target_2: Option<f64>,
    #[serde(default, deserialize_with = "loose_f64")]
    pub stop_loss: Option<f64>,
    #[serde(default, deserialize_with = "loose_f64")]
    pub risk_reward_ratio: Option<f64>,
    #[serde(default, deserialize_with = "loose_f64")]
    pub institutional_bullish_flow: Option<f64>,
    #[serde(default, deserialize_with = "loose_f64")]
    pub institutional_bearish_flow: Option<f64>,
    #[serde(default, deserialize_with = "loose_f64")]
    pub net_institutional_flow: Option<f64>,
    #[serde(default, deserialize_with = "json_list")]
    pub detailed_analysis: Vec<String>,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AnalysisType {
    BullishSetups,
    BearishSetups,
    UnusualActivity,
    #[default]
    Comprehensive,
}

impl AnalysisType {
    /// Unknown values fall through to the comprehensive view
    pub fn parse(s: &str) -> Self {
        match s {
            "BULLISH_SETUPS" => Self::BullishSetups,
            "BEARISH_SETUPS" => Self::BearishSetups,
            "UNUSUAL_ACTIVITY" => Self::UnusualActivity,
            _ => Self::Comprehensive,
        }
    }
}

/// Raw query string of the GET route
#[derive(Debug, Clone, Default, Deserialize)]
pub struct OptionAnalysisQuery {
    pub analysis_type: Option<String>,
    pub min_score: Option<String>,
    pub symbols: Option<String>,
    pub limit: Option<String>,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct OptionFilters {
    pub analysis_type: AnalysisType,
    pub min_score: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub symbols: Option<Vec<String>>,
    /// Positive keeps the first n rows, negative drops the last n
    #[serde(skip_serializing_if = "Option::is_none")]
    pub limit: Option<i64>,
}

/// Leading integer of a query value, `parseInt`-style: `"40.5"` and `"40abc"` give 40
pub fn leading_int(raw: &str) -> Option<i64> {
    let s = raw.trim_start();
    let (sign, digits) = match s.as_bytes().first() {
        Some(b'-') => (-1, &s[1..]),
        Some(b'+') => (1, &s[1..]),
        _ => (1, s),
    };

    let end = digits.find(|c: char| !c.is_ascii_digit()).unwrap_or(digits.len());
    digits[..end].parse::<i64>().ok().map(|n| sign * n)
}

impl From<OptionAnalysisQuery> for OptionFilters {
    fn from(query: OptionAnalysisQuery) -> Self {
        // Non-numeric thresholds fall back to 0
        let min_score = query.min_score.as_deref().and_then(leading_int).unwrap_or(0);

        let symbols = query
            .symbols
            .filter(|s| !s.is_empty())
            .map(|s| s.split(',').map(str::to_string).collect());

        // Absent or empty uses the default; zero or garbled means no limit
        let limit = match query.limit.as_deref() {
            None | Some("") => Some(DEFAULT_LIMIT),
            Some(s) => leading_int(s).filter(|n| *n != 0),
        };

        OptionFilters {
            analysis_type: query
                .analysis_type
                .as_deref()
                .map(AnalysisType::parse)
                .unwrap_or_default(),
            min_score,
            symbols,
            limit,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct OptionAnalysisReport {
    pub results: Vec<OptionAnalysis>,
    pub analysis_type: AnalysisType,
    pub total_results: usize,
    pub min_score: i64,
    pub filters: OptionFilters,
    pub timestamp: DateTime<Utc>,
}

/// Sort by score descending, then apply type, symbol and limit filters
pub fn filter_results(mut rows: Vec<OptionAnalysis>, filters: &OptionFilters) -> Vec<OptionAnalysis> {
    rows.sort_by(|a, b| b.score.total_cmp(&a.score));

    let min = filters.min_score as f64;
    rows.retain(|row| match filters.analysis_type {
        AnalysisType::BullishSetups => row.score >= min,
        AnalysisType::BearishSetups => row.score <= -min,
        AnalysisType::UnusualActivity => !row.unusual_activity.is_empty(),
        AnalysisType::Comprehensive => row.score.abs() >= min,
    });

    if let Some(symbols) = filters.symbols.as_ref().filter(|s| !s.is_empty()) {
        rows.retain(|row| symbols.contains(&row.symbol));
    }

    match filters.limit {
        Some(n) if n > 0 => rows.truncate(n as usize),
        Some(n) => rows.truncate(rows.len().saturating_sub(n.unsigned_abs() as usize)),
        None => {}
    }

    rows
}

pub fn build_report(rows: Vec<OptionAnalysis>, filters: OptionFilters, now: DateTime<Utc>) -> OptionAnalysisReport {
    let results = filter_results(rows, &filters);
    OptionAnalysisReport {
        total_results: results.len(),
        analysis_type: filters.analysis_type,
        min_score: filters.min_score,
        results,
        filters,
        timestamp: now,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(symbol: &str, score: f64, unusual: &[&str]) -> OptionAnalysis {
        OptionAnalysis {
            symbol: symbol.to_string(),
            score,
            unusual_activity: unusual.iter().map(|s| s.to_string()).collect(),
            ..Default::default()
        }
    }

    fn rows() -> Vec<OptionAnalysis> {
        vec![
            row("TITAN", 45.0, &[]),
            row("IOC", 72.0, &["Call OI spike at 150"]),
            row("SBIN", -55.0, &[]),
            row("INFY", 5.0, &[]),
        ]
    }

    fn filters(kind: AnalysisType, min_score: i64) -> OptionFilters {
        OptionFilters { analysis_type: kind, min_score, symbols: None, limit: Some(DEFAULT_LIMIT) }
    }

    #[test]
    fn test_decodes_json_text_lists() {
        let parsed: OptionAnalysis = serde_json::from_value(serde_json::json!({
            "symbol": "IOC",
            "score": "72.5",
            "support_levels": "[140, 135.5]",
            "unusual_activity": "[\"Put writing at 140\"]",
            "strength_signals": "not json",
            "detailed_analysis": null,
        }))
        .unwrap();

        assert_eq!(parsed.score, 72.5);
        assert_eq!(parsed.support_levels, vec![140.0, 135.5]);
        assert_eq!(parsed.unusual_activity, vec!["Put writing at 140".to_string()]);
        assert!(parsed.strength_signals.is_empty());
        assert!(parsed.detailed_analysis.is_empty());
        assert!(parsed.resistance_levels.is_empty());
    }

    #[test]
    fn test_filter_by_type() {
        let bullish = filter_results(rows(), &filters(AnalysisType::BullishSetups, 40));
        let symbols: Vec<_> = bullish.iter().map(|r| r.symbol.as_str()).collect();
        assert_eq!(symbols, vec!["IOC", "TITAN"]);

        let bearish = filter_results(rows(), &filters(AnalysisType::BearishSetups, 40));
        assert_eq!(bearish.len(), 1);
        assert_eq!(bearish[0].symbol, "SBIN");

        let unusual = filter_results(rows(), &filters(AnalysisType::UnusualActivity, 0));
        assert_eq!(unusual.len(), 1);

        let all = filter_results(rows(), &filters(AnalysisType::Comprehensive, 10));
        let symbols: Vec<_> = all.iter().map(|r| r.symbol.as_str()).collect();
        assert_eq!(symbols, vec!["IOC", "TITAN", "SBIN"]);
    }

    #[test]
    fn test_query_parsing_and_limit() {
        let query = OptionAnalysisQuery {
            analysis_type: Some("SOMETHING".into()),
            min_score: Some("abc".into()),
            symbols: Some("IOC,SBIN".into()),
            limit: Some("1".into()),
        };
        let f = OptionFilters::from(query);
        assert_eq!(f.analysis_type, AnalysisType::Comprehensive);
        assert_eq!(f.min_score, 0);

        let out = filter_results(rows(), &f);
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].symbol, "IOC");

        let f = OptionFilters::from(OptionAnalysisQuery::default());
        assert_eq!(f.limit, Some(DEFAULT_LIMIT));
    }

    #[test]
    fn test_leading_int() {
        assert_eq!(leading_int("40.5"), Some(40));
        assert_eq!(leading_int("40abc"), Some(40));
        assert_eq!(leading_int("  -15"), Some(-15));
        assert_eq!(leading_int("+7"), Some(7));
        assert_eq!(leading_int("abc"), None);
        assert_eq!(leading_int("-"), None);
        assert_eq!(leading_int(""), None);
    }

    #[test]
    fn test_query_values_with_trailing_text() {
        let query = |min_score: &str, limit: &str| OptionAnalysisQuery {
            analysis_type: Some("BULLISH_SETUPS".into()),
            min_score: Some(min_score.into()),
            symbols: None,
            limit: Some(limit.into()),
        };

        let f = OptionFilters::from(query("40.5", "1x"));
        assert_eq!(f.min_score, 40);
        assert_eq!(f.limit, Some(1));
        let out = filter_results(rows(), &f);
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].symbol, "IOC");

        let f = OptionFilters::from(query("40abc", ""));
        assert_eq!(f.min_score, 40);
        assert_eq!(f.limit, Some(DEFAULT_LIMIT));

        assert_eq!(OptionFilters::from(query("0", "0")).limit, None);
        assert_eq!(OptionFilters::from(query("0", "many")).limit, None);
    }

    #[test]
    fn test_negative_limit_drops_trailing_rows() {
        let mut f = filters(AnalysisType::Comprehensive, 0);
        f.limit = Some(-1);
        let symbols: Vec<_> = filter_results(rows(), &f).into_iter().map(|r| r.symbol).collect();
        assert_eq!(symbols, vec!["IOC", "TITAN", "INFY"]);

        f.limit = Some(-10);
        assert!(filter_results(rows(), &f).is_empty());
    }
}

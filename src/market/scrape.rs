//! Parsing of the public "all NSE indices" HTML table.
//!
//! The page is a plain `<table>` whose rows carry the index name, the last
//! traded price and a change cell such as `+187.50 (0.85%)`. Only rows with at
//! least three `<td>` cells are considered.

use super::config;
use super::models::{IndexRow, MarketIndex, SectorData};
use chrono::{DateTime, Utc};
use regex::Regex;
use std::sync::LazyLock;

static ROW_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?is)<tr[^>]*>(.*?)</tr>").expect("valid row regex"));
static CELL_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?is)<td[^>]*>(.*?)</td>").expect("valid cell regex"));
static TAG_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)<[^>]+>").expect("valid tag regex"));
static NUMBER_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"([-+]?\d+\.?\d*)").expect("valid number regex"));
static PERCENT_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"([-+]?\d+\.?\d*)%").expect("valid percent regex"));
static LEADING_NUMBER_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^-?\d+\.?\d*").expect("valid leading number regex"));

/// Extract every table row with three or more cells
pub fn parse_table_rows(html: &str) -> Vec<IndexRow> {
    ROW_RE
        .captures_iter(html)
        .filter_map(|row| {
            let cells: Vec<String> = CELL_RE
                .captures_iter(&row[1])
                .map(|cell| cell_text(&cell[1]))
                .collect();

            if cells.len() < 3 {
                return None;
            }

            Some(IndexRow {
                name: cells[0].clone(),
                ltp_text: cells[1].clone(),
                change_text: cells[2].clone(),
            })
        })
        .collect()
}

fn cell_text(inner: &str) -> String {
    let stripped = TAG_RE.replace_all(inner, "");
    stripped
        .replace("&nbsp;", " ")
        .replace("&amp;", "&")
        .replace("&#x2B;", "+")
        .trim()
        .to_string()
}

/// Last traded price: keep only digits, dot and minus, then read the leading number
pub fn parse_ltp(text: &str) -> Option<f64> {
    let cleaned: String = text
        .chars()
        .filter(|c| c.is_ascii_digit() || *c == '.' || *c == '-')
        .collect();

    LEADING_NUMBER_RE
        .find(&cleaned)
        .and_then(|m| m.as_str().parse::<f64>().ok())
}

/// First signed number in the change cell, 0 when absent
pub fn parse_change(text: &str) -> f64 {
    NUMBER_RE
        .captures(text)
        .and_then(|c| c[1].parse::<f64>().ok())
        .unwrap_or(0.0)
}

/// Number immediately followed by `%`, 0 when absent
pub fn parse_change_percent(text: &str) -> f64 {
    PERCENT_RE
        .captures(text)
        .and_then(|c| c[1].parse::<f64>().ok())
        .unwrap_or(0.0)
}

pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Pick the headline indices out of the table (exact, case-insensitive name match)
pub fn extract_market_indices(rows: &[IndexRow]) -> Vec<MarketIndex> {
    let mut indices = Vec::new();

    for row in rows {
        let Some((name, display)) = config::MARKET_INDICES
            .iter()
            .find(|(name, _)| row.name.eq_ignore_ascii_case(name))
        else {
            continue;
        };

        let Some(current) = parse_ltp(&row.ltp_text) else {
            continue;
        };
        if current <= 0.0 {
            continue;
        }

        indices.push(MarketIndex::new(
            name,
            display,
            round2(current),
            round2(parse_change(&row.change_text)),
            round2(parse_change_percent(&row.change_text)),
        ));
    }

    indices
}

/// Map table rows onto the tracked sectors
pub fn extract_sectors(rows: &[IndexRow], now: DateTime<Utc>) -> Vec<SectorData> {
    let mut sectors = Vec::new();

    for row in rows {
        let Some((sector, _)) = config::SECTOR_INDICES
            .iter()
            .find(|(_, index)| row.name.eq_ignore_ascii_case(index))
        else {
            continue;
        };

        let Some(ltp) = parse_ltp(&row.ltp_text) else {
            continue;
        };

        sectors.push(SectorData {
            name: sector.to_string(),
            change: round2(parse_change(&row.change_text)),
            value: format!("₹{}", format_inr(ltp.round() as i64)),
            last_updated: now,
        });
    }

    sectors
}

/// Indian digit grouping: 1234567 -> "12,34,567"
pub fn format_inr(value: i64) -> String {
    let negative = value < 0;
    let digits = value.unsigned_abs().to_string();

    let grouped = if digits.len() <= 3 {
        digits
    } else {
        let (head, tail) = digits.split_at(digits.len() - 3);
        let mut parts: Vec<&str> = Vec::new();
        let mut end = head.len();
        while end > 0 {
            let start = end.saturating_sub(2);
            parts.push(&head[start..end]);
            end = start;
        }
        parts.reverse();
        format!("{},{}", parts.join(","), tail)
    };

    if negative { format!("-{}", grouped) } else { grouped }
}

#[cfg(test)]
mod tests {
    use super::*;

    const PAGE: &str = r#"
        <table>
          <tr><th>Index</th><th>LTP</th><th>Change</th></tr>
          <tr><td><a href="/nifty">NIFTY 50</a></td><td>24,741.50</td><td><span>+187.50 (0.85%)</span></td></tr>
          <tr><td>NIFTY BANK</td><td>54,114.25</td><td>-111.25 (-0.23%)</td></tr>
          <tr><td>INDIA VIX</td><td>13.42</td><td>-0.18 (-1.32%)</td></tr>
          <tr><td>NIFTY IT</td><td>41,002.10</td><td>1.10 (1.10%)</td></tr>
          <tr><td>ONLY TWO</td><td>1</td></tr>
        </table>
    "#;

    #[test]
    fn test_parse_rows_skips_short_rows() {
        let rows = parse_table_rows(PAGE);
        assert_eq!(rows.len(), 4);
        assert_eq!(rows[0].name, "NIFTY 50");
        assert_eq!(rows[0].change_text, "+187.50 (0.85%)");
    }

    #[test]
    fn test_extract_market_indices() {
        let rows = parse_table_rows(PAGE);
        let indices = extract_market_indices(&rows);

        assert_eq!(indices.len(), 3);
        assert_eq!(indices[0].display_name, "Nifty");
        assert_eq!(indices[0].current, 24741.5);
        assert_eq!(indices[0].change, 187.5);
        assert_eq!(indices[0].change_percent, 0.85);
        assert_eq!(indices[1].change_percent, -0.23);
        assert_eq!(indices[2].display_name, "India VIX");
    }

    #[test]
    fn test_extract_sectors_formats_value() {
        let rows = parse_table_rows(PAGE);
        let sectors = extract_sectors(&rows, Utc::now());

        let names: Vec<&str> = sectors.iter().map(|s| s.name.as_str()).collect();
        assert_eq!(names, vec!["Nifty 50", "Banking", "IT"]);
        assert_eq!(sectors[0].value, "₹24,742");
        assert_eq!(sectors[2].change, 1.1);
    }

    #[test]
    fn test_number_helpers() {
        assert_eq!(parse_ltp("₹ 1,234.5"), Some(1234.5));
        assert_eq!(parse_ltp("n/a"), None);
        assert_eq!(parse_change("no digits"), 0.0);
        assert_eq!(parse_change_percent("12.5 (no pct)"), 0.0);
        assert_eq!(format_inr(1234567), "12,34,567");
        assert_eq!(format_inr(999), "999");
        assert_eq!(format_inr(-54114), "-54,114");
    }
}

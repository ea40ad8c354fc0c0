use super::models::{
    FiiDiiCategory, FiiDiiHistory, FiiDiiRecord, FiiDiiStats, FiiDiiSummary, NseFiiDiiRow,
};
use chrono::{Duration, NaiveDate};
use rand::Rng;
use std::collections::HashMap;

/// Fold FII and DII rows into one summary per date, newest date first
pub fn summarize(records: &[FiiDiiRecord]) -> Vec<FiiDiiSummary> {
    let mut by_date: HashMap<&str, FiiDiiSummary> = HashMap::new();

    for record in records {
        let entry = by_date
            .entry(record.date.as_str())
            .or_insert_with(|| FiiDiiSummary {
                date: record.date.clone(),
                ..Default::default()
            });

        match record.category {
            FiiDiiCategory::Fii => {
                entry.fii_buy = record.buy_value;
                entry.fii_sell = record.sell_value;
                entry.fii_net = record.net_value;
            }
            FiiDiiCategory::Dii => {
                entry.dii_buy = record.buy_value;
                entry.dii_sell = record.sell_value;
                entry.dii_net = record.net_value;
            }
        }
        entry.net_combined = entry.fii_net + entry.dii_net;
    }

    let mut summaries: Vec<FiiDiiSummary> = by_date.into_values().collect();
    // ISO dates sort lexically
    summaries.sort_by(|a, b| b.date.cmp(&a.date));
    summaries
}

pub fn history_from_records(records: Vec<FiiDiiRecord>) -> FiiDiiHistory {
    let summary = summarize(&records);
    FiiDiiHistory {
        stats: FiiDiiStats {
            total_days: summary.len(),
            latest_date: summary.first().map(|s| s.date.clone()),
            total_records: records.len(),
            note: None,
        },
        raw: records,
        summary,
    }
}

/// Randomised but plausible flows: FIIs lean to selling, DIIs to buying
pub fn sample_history<R: Rng>(today: NaiveDate, days: i64, rng: &mut R, note: &str) -> FiiDiiHistory {
    let mut summary = Vec::with_capacity(days.max(0) as usize);

    for offset in 0..days {
        let date = today - Duration::days(offset);

        let fii_net = (rng.gen_range(0.0..1.0) - 0.6) * 3000.0;
        let dii_net = (rng.gen_range(0.0..1.0) - 0.3) * 2000.0;
        let fii_buy = rng.gen_range(5000.0..20000.0);
        let dii_buy = rng.gen_range(3000.0..15000.0);

        summary.push(FiiDiiSummary {
            date: date.format("%Y-%m-%d").to_string(),
            fii_buy: round2(fii_buy),
            fii_sell: round2(fii_buy - fii_net),
            fii_net: round2(fii_net),
            dii_buy: round2(dii_buy),
            dii_sell: round2(dii_buy - dii_net),
            dii_net: round2(dii_net),
            net_combined: round2(fii_net + dii_net),
        });
    }

    FiiDiiHistory {
        stats: FiiDiiStats {
            total_days: summary.len(),
            latest_date: summary.first().map(|s| s.date.clone()),
            total_records: 0,
            note: Some(note.to_string()),
        },
        raw: Vec::new(),
        summary,
    }
}

// -----------------------------------------------
// DAILY COLLECTION
// -----------------------------------------------

/// FII and DII rows for `today` from the newest feed entry.
/// A category is skipped unless both gross purchase and gross sales are present.
pub fn records_from_nse(rows: &[NseFiiDiiRow], today: NaiveDate) -> Vec<FiiDiiRecord> {
    let Some(latest) = rows.first() else {
        return Vec::new();
    };

    let pairs = [
        (FiiDiiCategory::Fii, latest.fii_gross_purchase, latest.fii_gross_sales),
        (FiiDiiCategory::Dii, latest.dii_gross_purchase, latest.dii_gross_sales),
    ];

    pairs
        .into_iter()
        .filter_map(|(category, buy, sell)| Some(FiiDiiRecord::new(today, category, buy?, sell?)))
        .collect()
}

/// One randomised FII + DII pair for `today`, used when the feed is unavailable
pub fn sample_pair<R: Rng>(today: NaiveDate, rng: &mut R) -> Vec<FiiDiiRecord> {
    let fii_net = (rng.gen_range(0.0..1.0) - 0.6) * 3000.0;
    let dii_net = (rng.gen_range(0.0..1.0) - 0.3) * 2000.0;
    let fii_buy = rng.gen_range(5000.0..20000.0);
    let dii_buy = rng.gen_range(3000.0..15000.0);

    let row = |category, buy: f64, net: f64| FiiDiiRecord {
        buy_value: round2(buy),
        sell_value: round2(buy - net),
        net_value: round2(net),
        ..FiiDiiRecord::new(today, category, 0.0, 0.0)
    };

    vec![
        row(FiiDiiCategory::Fii, fii_buy, fii_net),
        row(FiiDiiCategory::Dii, dii_buy, dii_net),
    ]
}

fn round2(v: f64) -> f64 {
    (v * 100.0).round() / 100.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    fn record(date: &str, category: FiiDiiCategory, net: f64) -> FiiDiiRecord {
        FiiDiiRecord {
            id: None,
            date: date.to_string(),
            category,
            buy_value: 1000.0,
            sell_value: 1000.0 - net,
            net_value: net,
            created_at: None,
        }
    }

    #[test]
    fn test_summarize_merges_categories_per_date() {
        let records = vec![
            record("2025-01-09", FiiDiiCategory::Dii, 900.0),
            record("2025-01-10", FiiDiiCategory::Fii, -1200.0),
            record("2025-01-10", FiiDiiCategory::Dii, 800.0),
            record("2025-01-09", FiiDiiCategory::Fii, 100.0),
        ];

        let summary = summarize(&records);
        assert_eq!(summary.len(), 2);
        assert_eq!(summary[0].date, "2025-01-10");
        assert_eq!(summary[0].fii_net, -1200.0);
        assert_eq!(summary[0].dii_net, 800.0);
        assert_eq!(summary[0].net_combined, -400.0);
        assert_eq!(summary[1].net_combined, 1000.0);
    }

    #[test]
    fn test_sample_history_covers_requested_days() {
        let mut rng = StdRng::seed_from_u64(7);
        let today = NaiveDate::from_ymd_opt(2025, 1, 31).unwrap();
        let history = sample_history(today, 30, &mut rng, "sample");

        assert_eq!(history.summary.len(), 30);
        assert_eq!(history.stats.latest_date.as_deref(), Some("2025-01-31"));
        assert_eq!(history.summary[29].date, "2025-01-02");
        for day in &history.summary {
            assert!((day.net_combined - (day.fii_net + day.dii_net)).abs() < 0.02);
        }
    }

    #[test]
    fn test_records_from_latest_feed_entry() {
        let rows: Vec<NseFiiDiiRow> = serde_json::from_str(
            r#"[
                {"fiiGrossP": "12450.75", "fiiGrossS": "13698.60", "diiGrossP": 9800.5, "diiGrossS": "8908.16"},
                {"fiiGrossP": "1", "fiiGrossS": "2", "diiGrossP": "3", "diiGrossS": "4"}
            ]"#,
        )
        .unwrap();
        let today = NaiveDate::from_ymd_opt(2025, 1, 31).unwrap();

        let records = records_from_nse(&rows, today);
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].category, FiiDiiCategory::Fii);
        assert_eq!(records[0].date, "2025-01-31");
        assert_eq!(records[0].buy_value, 12450.75);
        assert!((records[0].net_value - (-1247.85)).abs() < 1e-6);
        assert_eq!(records[1].category, FiiDiiCategory::Dii);
        assert!((records[1].net_value - 892.34).abs() < 1e-6);
    }

    #[test]
    fn test_records_skip_incomplete_categories() {
        let rows: Vec<NseFiiDiiRow> =
            serde_json::from_str(r#"[{"fiiGrossP": "100.5", "diiGrossP": "50", "diiGrossS": "20"}]"#).unwrap();
        let today = NaiveDate::from_ymd_opt(2025, 1, 31).unwrap();

        let records = records_from_nse(&rows, today);
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].category, FiiDiiCategory::Dii);
        assert_eq!(records[0].net_value, 30.0);

        assert!(records_from_nse(&[], today).is_empty());
    }

    #[test]
    fn test_sample_pair_is_one_row_per_category() {
        let mut rng = StdRng::seed_from_u64(11);
        let today = NaiveDate::from_ymd_opt(2025, 2, 3).unwrap();

        let pair = sample_pair(today, &mut rng);
        assert_eq!(pair.len(), 2);
        assert_eq!(pair[0].category, FiiDiiCategory::Fii);
        assert_eq!(pair[1].category, FiiDiiCategory::Dii);
        for record in &pair {
            assert_eq!(record.date, "2025-02-03");
            assert!((record.buy_value - record.sell_value - record.net_value).abs() < 0.02);
        }
        assert!((-1800.0..=1200.0).contains(&pair[0].net_value));
        assert!((-600.0..=1400.0).contains(&pair[1].net_value));
    }
}

use super::RecordStore;
use crate::blog::{BlogPost, BlogPostPatch, NewBlogPost, PostStatus};
use crate::market::FiiDiiRecord;
use crate::market::config;
use crate::option_analysis::OptionAnalysis;
use crate::trades::{NewSwingTrade, Strategy, SwingTrade, SwingTradePatch};
use anyhow::Result;
use async_trait::async_trait;
use chrono::{Duration, NaiveDate, Utc};
use std::sync::atomic::{AtomicI64, Ordering};
use tokio::sync::RwLock;

#[derive(Default)]
struct Tables {
    trades: Vec<SwingTrade>,
    posts: Vec<BlogPost>,
    fii_dii: Vec<FiiDiiRecord>,
    option_analysis: Vec<OptionAnalysis>,
}

/// Process-local store for tests and for running without a database
pub struct MemoryStore {
    tables: RwLock<Tables>,
    next_id: AtomicI64,
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryStore {
    pub fn new() -> Self {
        Self {
            tables: RwLock::new(Tables::default()),
            next_id: AtomicI64::new(1),
        }
    }

    pub fn with_fii_dii(mut self, records: Vec<FiiDiiRecord>) -> Self {
        self.tables.get_mut().fii_dii = records;
        self
    }

    pub fn with_option_analysis(mut self, rows: Vec<OptionAnalysis>) -> Self {
        self.tables.get_mut().option_analysis = rows;
        self
    }

    fn allocate_id(&self) -> i64 {
        self.next_id.fetch_add(1, Ordering::Relaxed)
    }
}

#[async_trait]
impl RecordStore for MemoryStore {
    async fn list_swing_trades(&self, strategy: Option<Strategy>) -> Result<Vec<SwingTrade>> {
        let tables = self.tables.read().await;
        let mut trades: Vec<SwingTrade> = tables
            .trades
            .iter()
            .filter(|t| strategy.is_none_or(|s| t.strategy == s))
            .cloned()
            .collect();
        trades.sort_by(|a, b| b.entry_date.cmp(&a.entry_date));
        Ok(trades)
    }

    async fn insert_swing_trade(&self, trade: NewSwingTrade) -> Result<SwingTrade> {
        let trade = trade.into_trade(self.allocate_id().to_string(), Utc::now().to_rfc3339());
        self.tables.write().await.trades.push(trade.clone());
        Ok(trade)
    }

    async fn update_swing_trade(&self, id: &str, patch: &SwingTradePatch) -> Result<Option<SwingTrade>> {
        let mut tables = self.tables.write().await;
        Ok(tables.trades.iter_mut().find(|t| t.id == id).map(|trade| {
            patch.apply(trade);
            trade.updated_at = Utc::now().to_rfc3339();
            trade.clone()
        }))
    }

    async fn delete_swing_trade(&self, id: &str) -> Result<bool> {
        let mut tables = self.tables.write().await;
        let before = tables.trades.len();
        tables.trades.retain(|t| t.id != id);
        Ok(tables.trades.len() != before)
    }

    async fn list_blog_posts(&self, status: Option<PostStatus>, category: Option<&str>) -> Result<Vec<BlogPost>> {
        let tables = self.tables.read().await;
        let mut posts: Vec<BlogPost> = tables
            .posts
            .iter()
            .filter(|p| status.is_none_or(|s| p.status == s))
            .filter(|p| category.is_none_or(|c| p.category == c))
            .cloned()
            .collect();
        posts.sort_by(|a, b| b.publish_date.cmp(&a.publish_date));
        Ok(posts)
    }

    async fn blog_post_by_slug(&self, slug: &str) -> Result<Option<BlogPost>> {
        let tables = self.tables.read().await;
        Ok(tables.posts.iter().find(|p| p.slug == slug).cloned())
    }

    async fn insert_blog_post(&self, post: NewBlogPost) -> Result<BlogPost> {
        let post = post.into_post(self.allocate_id());
        self.tables.write().await.posts.push(post.clone());
        Ok(post)
    }

    async fn update_blog_post(&self, id: i64, patch: &BlogPostPatch) -> Result<Option<BlogPost>> {
        let mut tables = self.tables.write().await;
        Ok(tables.posts.iter_mut().find(|p| p.id == id).map(|post| {
            patch.apply(post);
            post.clone()
        }))
    }

    async fn delete_blog_post(&self, id: i64) -> Result<bool> {
        let mut tables = self.tables.write().await;
        let before = tables.posts.len();
        tables.posts.retain(|p| p.id != id);
        Ok(tables.posts.len() != before)
    }

    async fn fii_dii_since(&self, since: NaiveDate) -> Result<Vec<FiiDiiRecord>> {
        let cutoff = since.format("%Y-%m-%d").to_string();
        let tables = self.tables.read().await;
        let mut records: Vec<FiiDiiRecord> = tables
            .fii_dii
            .iter()
            .filter(|r| r.date >= cutoff)
            .cloned()
            .collect();
        records.sort_by(|a, b| b.date.cmp(&a.date));
        Ok(records)
    }

    async fn upsert_fii_dii(&self, records: &[FiiDiiRecord]) -> Result<usize> {
        let mut tables = self.tables.write().await;
        for record in records {
            match tables
                .fii_dii
                .iter_mut()
                .find(|r| r.date == record.date && r.category == record.category)
            {
                Some(existing) => {
                    existing.buy_value = record.buy_value;
                    existing.sell_value = record.sell_value;
                    existing.net_value = record.net_value;
                }
                None => {
                    let mut row = record.clone();
                    row.id = Some(self.allocate_id());
                    row.created_at = Some(Utc::now().to_rfc3339());
                    tables.fii_dii.push(row);
                }
            }
        }
        Ok(records.len())
    }

    async fn cleanup_fii_dii(&self) -> Result<()> {
        let cutoff = (Utc::now().date_naive() - Duration::days(config::FII_DII_HISTORY_DAYS))
            .format("%Y-%m-%d")
            .to_string();
        self.tables.write().await.fii_dii.retain(|r| r.date >= cutoff);
        Ok(())
    }

    async fn latest_option_analysis(&self, limit: usize) -> Result<Vec<OptionAnalysis>> {
        let tables = self.tables.read().await;
        Ok(tables.option_analysis.iter().take(limit).cloned().collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::market::FiiDiiCategory;
    use crate::trades::{SwingTradeInput, TradeStatus, validate_new};

    fn new_trade(symbol: &str, strategy: &str, entry_date: &str) -> NewSwingTrade {
        let input: SwingTradeInput = serde_json::from_value(serde_json::json!({
            "strategy": strategy,
            "stock_name": symbol,
            "stock_symbol": symbol,
            "entry_price": 100,
            "stop_loss": 95,
            "entry_date": entry_date,
        }))
        .unwrap();
        validate_new(input, NaiveDate::from_ymd_opt(2025, 3, 1).unwrap()).unwrap()
    }

    #[tokio::test]
    async fn test_swing_trade_crud() {
        let store = MemoryStore::new();
        let first = store.insert_swing_trade(new_trade("SBIN", "BIT", "2025-01-02")).await.unwrap();
        store.insert_swing_trade(new_trade("ITC", "Swing Angle", "2025-02-10")).await.unwrap();

        let all = store.list_swing_trades(None).await.unwrap();
        assert_eq!(all.len(), 2);
        assert_eq!(all[0].stock_symbol, "ITC");

        let bit = store.list_swing_trades(Some(Strategy::Bit)).await.unwrap();
        assert_eq!(bit.len(), 1);

        let patch = SwingTradePatch { status: Some(TradeStatus::Cancelled), ..Default::default() };
        let updated = store.update_swing_trade(&first.id, &patch).await.unwrap().unwrap();
        assert_eq!(updated.status, TradeStatus::Cancelled);
        assert!(store.update_swing_trade("999", &patch).await.unwrap().is_none());

        assert!(store.delete_swing_trade(&first.id).await.unwrap());
        assert!(!store.delete_swing_trade(&first.id).await.unwrap());
    }

    #[tokio::test]
    async fn test_fii_dii_since_filters_and_orders() {
        let record = |date: &str, category| FiiDiiRecord {
            id: None,
            date: date.to_string(),
            category,
            buy_value: 1000.0,
            sell_value: 900.0,
            net_value: 100.0,
            created_at: None,
        };
        let store = MemoryStore::new().with_fii_dii(vec![
            record("2025-01-01", FiiDiiCategory::Fii),
            record("2025-02-03", FiiDiiCategory::Fii),
            record("2025-02-04", FiiDiiCategory::Dii),
        ]);

        let rows = store
            .fii_dii_since(NaiveDate::from_ymd_opt(2025, 2, 1).unwrap())
            .await
            .unwrap();
        let dates: Vec<_> = rows.iter().map(|r| r.date.as_str()).collect();
        assert_eq!(dates, vec!["2025-02-04", "2025-02-03"]);
    }

    #[tokio::test]
    async fn test_fii_dii_upsert_overwrites_same_day_category() {
        let day = NaiveDate::from_ymd_opt(2025, 2, 4).unwrap();
        let store = MemoryStore::new();

        let written = store
            .upsert_fii_dii(&[
                FiiDiiRecord::new(day, FiiDiiCategory::Fii, 1000.0, 1500.0),
                FiiDiiRecord::new(day, FiiDiiCategory::Dii, 900.0, 400.0),
            ])
            .await
            .unwrap();
        assert_eq!(written, 2);

        store
            .upsert_fii_dii(&[FiiDiiRecord::new(day, FiiDiiCategory::Fii, 2000.0, 1200.0)])
            .await
            .unwrap();

        let rows = store.fii_dii_since(day).await.unwrap();
        assert_eq!(rows.len(), 2);
        let fii = rows.iter().find(|r| r.category == FiiDiiCategory::Fii).unwrap();
        assert_eq!(fii.net_value, 800.0);
        assert!(fii.id.is_some());
    }

    #[tokio::test]
    async fn test_fii_dii_cleanup_drops_rows_outside_window() {
        let today = Utc::now().date_naive();
        let store = MemoryStore::new().with_fii_dii(vec![
            FiiDiiRecord::new(today, FiiDiiCategory::Fii, 10.0, 5.0),
            FiiDiiRecord::new(today - Duration::days(45), FiiDiiCategory::Fii, 10.0, 5.0),
        ]);

        store.cleanup_fii_dii().await.unwrap();

        let rows = store.fii_dii_since(today - Duration::days(365)).await.unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].date, today.format("%Y-%m-%d").to_string());
    }
}

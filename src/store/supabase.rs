use super::RecordStore;
use crate::blog::{BlogPost, BlogPostPatch, NewBlogPost, PostStatus};
use crate::market::FiiDiiRecord;
use crate::market::config;
use crate::option_analysis::OptionAnalysis;
use crate::trades::{NewSwingTrade, Strategy, SwingTrade, SwingTradePatch};
use anyhow::{Context, Result, anyhow};
use async_trait::async_trait;
use chrono::NaiveDate;
use reqwest::{Client, Response, StatusCode, header};
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::time::Duration;
use tokio_retry::Retry;
use tokio_retry::strategy::ExponentialBackoff;
use tracing::debug;

const PREFER_REPRESENTATION: &str = "return=representation";
const PREFER_MERGE: &str = "resolution=merge-duplicates,return=representation";

/// `column=eq.value` with the value percent-encoded
fn eq_filter(column: &str, value: &str) -> String {
    format!("{}=eq.{}", column, urlencoding::encode(value))
}

// -----------------------------------------------
// POSTGREST-BACKED STORE
// -----------------------------------------------
pub struct SupabaseStore {
    client: Client,
    rest_url: String,
}

impl SupabaseStore {
    pub fn new(base_url: &str, service_key: &str) -> Result<Self> {
        let mut headers = header::HeaderMap::new();
        headers.insert("apikey", header::HeaderValue::from_str(service_key)?);
        headers.insert(
            header::AUTHORIZATION,
            header::HeaderValue::from_str(&format!("Bearer {}", service_key))?,
        );
        headers.insert(header::ACCEPT, header::HeaderValue::from_static("application/json"));

        let client = Client::builder()
            .default_headers(headers)
            .timeout(config::HTTP_TIMEOUT)
            .build()
            .context("Failed to build store client")?;

        Ok(Self {
            client,
            rest_url: format!("{}{}", base_url.trim_end_matches('/'), config::SUPABASE_REST_PATH),
        })
    }

    fn table_url(&self, table: &str, filters: &[String]) -> String {
        if filters.is_empty() {
            format!("{}/{}", self.rest_url, table)
        } else {
            format!("{}/{}?{}", self.rest_url, table, filters.join("&"))
        }
    }

    async fn read_rows<T: DeserializeOwned>(res: Response) -> Result<Vec<T>> {
        let status = res.status();
        if !status.is_success() {
            let body = res.text().await.unwrap_or_default();
            let preview: String = body.chars().take(200).collect();
            anyhow::bail!("Store responded {}: {}", status, preview);
        }
        res.json::<Vec<T>>().await.context("Failed to decode store rows")
    }

    /// GET with exponential backoff on 429/5xx
    async fn select<T: DeserializeOwned>(&self, table: &str, filters: &[String]) -> Result<Vec<T>> {
        let url = self.table_url(table, filters);
        let backoff = ExponentialBackoff::from_millis(config::RETRY_BASE_DELAY_MS)
            .factor(config::RETRY_FACTOR)
            .max_delay(Duration::from_secs(config::RETRY_MAX_DELAY_SECS))
            .take(config::RETRY_MAX_ATTEMPTS);

        Retry::spawn(backoff, || async {
            let res = self
                .client
                .get(&url)
                .send()
                .await
                .with_context(|| format!("Select from {} failed", table))?;

            let status = res.status();
            debug!(table, status = status.as_u16(), "store select");

            if status == StatusCode::TOO_MANY_REQUESTS || status.is_server_error() {
                anyhow::bail!("Retryable error: {}", status)
            }
            Self::read_rows(res).await
        })
        .await
    }

    async fn insert<B: Serialize + Sync, T: DeserializeOwned>(&self, table: &str, row: &B) -> Result<T> {
        let res = self
            .client
            .post(self.table_url(table, &[]))
            .header("Prefer", PREFER_REPRESENTATION)
            .json(row)
            .send()
            .await
            .with_context(|| format!("Insert into {} failed", table))?;

        Self::read_rows(res)
            .await?
            .into_iter()
            .next()
            .ok_or_else(|| anyhow!("Insert into {} returned no row", table))
    }

    async fn update<B: Serialize + Sync, T: DeserializeOwned>(
        &self,
        table: &str,
        id: &str,
        patch: &B,
    ) -> Result<Option<T>> {
        let res = self
            .client
            .patch(self.table_url(table, &[eq_filter("id", id)]))
            .header("Prefer", PREFER_REPRESENTATION)
            .json(patch)
            .send()
            .await
            .with_context(|| format!("Update of {} failed", table))?;

        Ok(Self::read_rows(res).await?.into_iter().next())
    }

    /// Bulk insert that overwrites rows colliding on `on_conflict`
    async fn upsert<B: Serialize + Sync>(&self, table: &str, on_conflict: &str, rows: &[B]) -> Result<usize> {
        let res = self
            .client
            .post(self.table_url(table, &[format!("on_conflict={}", on_conflict)]))
            .header("Prefer", PREFER_MERGE)
            .json(rows)
            .send()
            .await
            .with_context(|| format!("Upsert into {} failed", table))?;

        let written: Vec<serde_json::Value> = Self::read_rows(res).await?;
        Ok(written.len())
    }

    fn rpc_url(&self, function: &str) -> String {
        format!("{}/rpc/{}", self.rest_url, function)
    }

    async fn rpc(&self, function: &str) -> Result<()> {
        let res = self
            .client
            .post(self.rpc_url(function))
            .json(&serde_json::json!({}))
            .send()
            .await
            .with_context(|| format!("RPC {} failed", function))?;

        let status = res.status();
        if !status.is_success() {
            let body = res.text().await.unwrap_or_default();
            let preview: String = body.chars().take(200).collect();
            anyhow::bail!("RPC {} responded {}: {}", function, status, preview);
        }
        Ok(())
    }

    async fn delete(&self, table: &str, id: &str) -> Result<bool> {
        let res = self
            .client
            .delete(self.table_url(table, &[eq_filter("id", id)]))
            .header("Prefer", PREFER_REPRESENTATION)
            .send()
            .await
            .with_context(|| format!("Delete from {} failed", table))?;

        let removed: Vec<serde_json::Value> = Self::read_rows(res).await?;
        Ok(!removed.is_empty())
    }
}

#[async_trait]
impl RecordStore for SupabaseStore {
    async fn list_swing_trades(&self, strategy: Option<Strategy>) -> Result<Vec<SwingTrade>> {
        let mut filters = vec!["select=*".to_string(), "order=entry_date.desc".to_string()];
        if let Some(strategy) = strategy {
            filters.push(eq_filter("strategy", strategy.as_str()));
        }
        self.select(config::TABLE_SWING_TRADES, &filters).await
    }

    async fn insert_swing_trade(&self, trade: NewSwingTrade) -> Result<SwingTrade> {
        self.insert(config::TABLE_SWING_TRADES, &trade).await
    }

    async fn update_swing_trade(&self, id: &str, patch: &SwingTradePatch) -> Result<Option<SwingTrade>> {
        self.update(config::TABLE_SWING_TRADES, id, patch).await
    }

    async fn delete_swing_trade(&self, id: &str) -> Result<bool> {
        self.delete(config::TABLE_SWING_TRADES, id).await
    }

    async fn list_blog_posts(&self, status: Option<PostStatus>, category: Option<&str>) -> Result<Vec<BlogPost>> {
        let mut filters = vec!["select=*".to_string(), "order=publish_date.desc".to_string()];
        if let Some(status) = status {
            filters.push(eq_filter("status", status.as_str()));
        }
        if let Some(category) = category {
            filters.push(eq_filter("category", category));
        }
        self.select(config::TABLE_BLOG_POSTS, &filters).await
    }

    async fn blog_post_by_slug(&self, slug: &str) -> Result<Option<BlogPost>> {
        let filters = vec!["select=*".to_string(), eq_filter("slug", slug), "limit=1".to_string()];
        let rows: Vec<BlogPost> = self.select(config::TABLE_BLOG_POSTS, &filters).await?;
        Ok(rows.into_iter().next())
    }

    async fn insert_blog_post(&self, post: NewBlogPost) -> Result<BlogPost> {
        self.insert(config::TABLE_BLOG_POSTS, &post).await
    }

    async fn update_blog_post(&self, id: i64, patch: &BlogPostPatch) -> Result<Option<BlogPost>> {
        self.update(config::TABLE_BLOG_POSTS, &id.to_string(), patch).await
    }

    async fn delete_blog_post(&self, id: i64) -> Result<bool> {
        self.delete(config::TABLE_BLOG_POSTS, &id.to_string()).await
    }

    async fn fii_dii_since(&self, since: NaiveDate) -> Result<Vec<FiiDiiRecord>> {
        let filters = vec![
            "select=*".to_string(),
            format!("date=gte.{}", since.format("%Y-%m-%d")),
            "order=date.desc".to_string(),
        ];
        self.select(config::TABLE_FII_DII, &filters).await
    }

    async fn upsert_fii_dii(&self, records: &[FiiDiiRecord]) -> Result<usize> {
        self.upsert(config::TABLE_FII_DII, "date,category", records).await
    }

    async fn cleanup_fii_dii(&self) -> Result<()> {
        self.rpc(config::RPC_CLEANUP_FII_DII).await
    }

    async fn latest_option_analysis(&self, limit: usize) -> Result<Vec<OptionAnalysis>> {
        let filters = vec!["select=*".to_string(), format!("limit={}", limit)];
        self.select(config::VIEW_LATEST_OPTION_ANALYSIS, &filters).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_eq_filter_encodes_value() {
        assert_eq!(eq_filter("strategy", "Swing Angle"), "strategy=eq.Swing%20Angle");
        assert_eq!(eq_filter("slug", "nifty-50"), "slug=eq.nifty-50");
    }

    #[test]
    fn test_table_url() {
        let store = SupabaseStore::new("https://abc.supabase.co/", "service-key").unwrap();
        assert_eq!(
            store.table_url("swing_trades", &[]),
            "https://abc.supabase.co/rest/v1/swing_trades"
        );
        assert_eq!(
            store.table_url("blog_posts", &["select=*".into(), eq_filter("id", "4")]),
            "https://abc.supabase.co/rest/v1/blog_posts?select=*&id=eq.4"
        );
        assert_eq!(
            store.rpc_url(config::RPC_CLEANUP_FII_DII),
            "https://abc.supabase.co/rest/v1/rpc/cleanup_old_fii_dii_data"
        );
    }
}

pub mod memory;
pub mod supabase;

use crate::blog::{BlogPost, BlogPostPatch, NewBlogPost, PostStatus};
use crate::market::FiiDiiRecord;
use crate::option_analysis::OptionAnalysis;
use crate::trades::{NewSwingTrade, Strategy, SwingTrade, SwingTradePatch};
use anyhow::Result;
use async_trait::async_trait;
use chrono::NaiveDate;

// Re-exports (public API)
pub use memory::MemoryStore;
pub use supabase::SupabaseStore;

/// Persistence behind the CRUD and history routes.
///
/// `update_*` returns `None` and `delete_*` returns `false` when no row
/// carries the given id.
#[async_trait]
pub trait RecordStore: Send + Sync {
    /// Newest entry date first
    async fn list_swing_trades(&self, strategy: Option<Strategy>) -> Result<Vec<SwingTrade>>;
    async fn insert_swing_trade(&self, trade: NewSwingTrade) -> Result<SwingTrade>;
    async fn update_swing_trade(&self, id: &str, patch: &SwingTradePatch) -> Result<Option<SwingTrade>>;
    async fn delete_swing_trade(&self, id: &str) -> Result<bool>;

    /// Newest publish date first
    async fn list_blog_posts(&self, status: Option<PostStatus>, category: Option<&str>) -> Result<Vec<BlogPost>>;
    async fn blog_post_by_slug(&self, slug: &str) -> Result<Option<BlogPost>>;
    async fn insert_blog_post(&self, post: NewBlogPost) -> Result<BlogPost>;
    async fn update_blog_post(&self, id: i64, patch: &BlogPostPatch) -> Result<Option<BlogPost>>;
    async fn delete_blog_post(&self, id: i64) -> Result<bool>;

    /// Rows dated on or after `since`, newest first
    async fn fii_dii_since(&self, since: NaiveDate) -> Result<Vec<FiiDiiRecord>>;
    /// Insert or overwrite by `(date, category)`; returns the number of rows written
    async fn upsert_fii_dii(&self, records: &[FiiDiiRecord]) -> Result<usize>;
    /// Drop rows that fell out of the history window
    async fn cleanup_fii_dii(&self) -> Result<()>;

    async fn latest_option_analysis(&self, limit: usize) -> Result<Vec<OptionAnalysis>>;
}

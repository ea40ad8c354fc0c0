pub mod api_server_axum;
pub mod app_config;
pub mod auth;
pub mod blog;
pub mod collector;
pub mod error;
pub mod logging;
pub mod market;
pub mod option_analysis;
pub mod sentiment;
pub mod store;
pub mod trades;
pub mod utility;

// Re-exports for convenience
pub use api_server_axum::{AppState, build_router, start_server};
pub use app_config::{AppConfig, Mode};
pub use collector::{FiiDiiCollection, collect_fii_dii};
pub use error::AppError;
pub use market::MarketClient;
pub use sentiment::{MarketSources, Sentiment, compute_sentiment, gather_inputs};
pub use store::{MemoryStore, RecordStore, SupabaseStore};

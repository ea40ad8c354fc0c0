pub mod config;
pub mod fii_dii;
pub mod market_client;
pub mod models;
pub mod scrape;

// Re-exports (public API)
pub use market_client::{MarketClient, count_breadth};
pub use models::{
    BreadthCounts, FiiDiiCategory, FiiDiiHistory, FiiDiiRecord, FiiDiiSummary, IndexRow,
    MarketIndex, NseFiiDiiRow, SectorData,
};
pub use scrape::{extract_market_indices, extract_sectors, format_inr, parse_table_rows};

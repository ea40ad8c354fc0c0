pub mod engine;
pub mod indicators;
pub mod sources;

// Re-exports (public API)
pub use engine::{
    FlowReading, MarketData, Quote, Sentiment, SentimentInputs, SentimentLabel, SourceStatus,
    VixQuote, compute_sentiment, confidence, default_sentiment, score_indicators, weighted_score,
};
pub use indicators::{Indicator, Indicators};
pub use sources::{LiveSources, MarketSources, gather_inputs, quotes_from_indices};

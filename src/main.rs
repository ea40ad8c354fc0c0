use anyhow::Result;
use chrono::Utc;
use colored::Colorize;
use std::sync::Arc;
use tradesmartmoney::app_config::{AppConfig, Mode};
use tradesmartmoney::sentiment::{self, LiveSources};
use tradesmartmoney::utility::timed_async;
use tradesmartmoney::{api_server_axum, collector, logging};

#[tokio::main]
async fn main() -> Result<()> {
    let app_config = AppConfig::from_env();
    logging::init_logging(app_config.log_dir.as_deref())?;

    println!("{}", "=".repeat(60).blue());
    println!("{}", "TradeSmartMoney API".green().bold());
    println!("{}", "=".repeat(60).blue());
    println!();

    app_config.validate()?;
    app_config.log_config();

    match app_config.mode {
        Mode::Server => api_server_axum::start_server(&app_config).await,
        Mode::Sentiment => run_sentiment(&app_config).await,
        Mode::CollectFiiDii => run_fii_dii_collection(&app_config).await,
    }
}

/// Daily cron entry: fetch today's FII/DII flows and store them
async fn run_fii_dii_collection(app_config: &AppConfig) -> Result<()> {
    println!("{}", "Collecting FII/DII data...".cyan());

    let Some(store) = app_config.record_store()? else {
        anyhow::bail!("Supabase not configured - cannot store FII/DII data");
    };
    let sources = LiveSources::new(Arc::new(app_config.market_client()?), Some(store.clone()));

    let collection = timed_async("fii-dii collection", || {
        collector::collect_fii_dii(&sources, store.as_ref(), Utc::now())
    })
    .await?;

    println!(
        "{} Stored {} FII/DII records ({})",
        "✓".green(),
        collection.records.len(),
        collection.source.as_str()
    );
    for record in &collection.records {
        println!(
            "   {} {:?}: buy {:.2} sell {:.2} net {:.2}",
            record.date, record.category, record.buy_value, record.sell_value, record.net_value
        );
    }
    Ok(())
}

/// One-shot sentiment computation printed as JSON
async fn run_sentiment(app_config: &AppConfig) -> Result<()> {
    println!("{}", "Computing Indian market sentiment...".cyan());

    let sources = LiveSources::new(Arc::new(app_config.market_client()?), app_config.record_store()?);

    let inputs = timed_async("sentiment sources", || sentiment::gather_inputs(&sources)).await;
    let now = Utc::now();

    match sentiment::compute_sentiment(&inputs, now) {
        Ok(snapshot) => {
            println!(
                "{} {:?} (score {}, confidence {}%)",
                "✓".green(),
                snapshot.overall,
                snapshot.score,
                snapshot.confidence
            );
            println!("{}", serde_json::to_string_pretty(&snapshot)?);
            Ok(())
        }
        Err(e) => {
            println!("{} {}", "✗".red(), e);
            println!("{}", serde_json::to_string_pretty(&sentiment::default_sentiment(now))?);
            Err(e.into())
        }
    }
}

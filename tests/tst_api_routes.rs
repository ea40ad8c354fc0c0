mod common;

use axum::Router;
use axum::body::Body;
use axum::http::{Request, StatusCode, header};
use common::StubSources;
use serde_json::{Value, json};
use std::sync::Arc;
use tower::ServiceExt;
use tradesmartmoney::market::{FiiDiiCategory, FiiDiiRecord};
use tradesmartmoney::option_analysis::OptionAnalysis;
use tradesmartmoney::{AppState, MemoryStore, RecordStore, build_router};

const PASSWORD: &str = "swing-admin";

fn app(sources: StubSources, store: Option<MemoryStore>, password: Option<&str>) -> Router {
    let store = store.map(|s| Arc::new(s) as Arc<dyn RecordStore>);
    build_router(AppState::new(Arc::new(sources), store, password.map(str::to_string)))
}

fn admin_app(store: MemoryStore) -> Router {
    app(StubSources::failing(), Some(store), Some(PASSWORD))
}

async fn send(app: &Router, method: &str, uri: &str, body: Option<Value>, token: Option<&str>) -> (StatusCode, Value) {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
    }
    let body = match body {
        Some(json) => {
            builder = builder.header(header::CONTENT_TYPE, "application/json");
            Body::from(json.to_string())
        }
        None => Body::empty(),
    };

    let response = app.clone().oneshot(builder.body(body).unwrap()).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let value = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, value)
}

async fn login(app: &Router) -> String {
    let (status, body) = send(app, "POST", "/api/admin/auth", Some(json!({ "password": PASSWORD })), None).await;
    assert_eq!(status, StatusCode::OK);
    body["token"].as_str().unwrap().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    // ----- MARKET ROUTES -----

    #[tokio::test]
    async fn test_health() {
        let app = app(StubSources::failing(), None, None);
        let (status, body) = send(&app, "GET", "/health", None, None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "ok");
    }

    #[tokio::test]
    async fn test_sentiment_success_envelope() {
        let app = app(StubSources::bullish(), None, None);
        let (status, body) = send(&app, "GET", "/api/indian-market-sentiment", None, None).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["success"], true);
        assert_eq!(body["data"]["overall"], "Strongly Bullish");
        assert_eq!(body["data"]["score"], 71);
        assert!(body["timestamp"].is_string());
    }

    #[tokio::test]
    async fn test_sentiment_failure_returns_default_snapshot() {
        let app = app(StubSources::failing(), None, None);
        let (status, body) = send(&app, "GET", "/api/indian-market-sentiment", None, None).await;

        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body["success"], false);
        assert!(body["error"].is_string());

        let data = &body["data"];
        assert_eq!(data["score"], 0);
        assert_eq!(data["confidence"], 0);
        assert_eq!(data["overall"], "Neutral");
        for key in ["niftyTrend", "vixLevel", "fiiActivity", "sectorBreadth", "marketCap", "advanceDecline"] {
            assert_eq!(data["indicators"][key]["signal"], "Data unavailable");
        }
        assert_eq!(data["indicators"]["niftyTrend"]["weight"], 25.0);
        assert_eq!(data["marketData"]["nifty"]["current"], 0.0);
        assert!(data["nextUpdate"].is_string());
    }

    #[tokio::test]
    async fn test_market_indices_fallback() {
        let app = app(StubSources::failing(), None, None);
        let (status, body) = send(&app, "GET", "/api/market-indices", None, None).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["success"], true);
        assert!(body["message"].as_str().unwrap().contains("fallback"));
        assert_eq!(body["data"].as_array().unwrap().len(), 4);
        assert_eq!(body["data"][0]["displayName"], "Nifty");
    }

    #[tokio::test]
    async fn test_market_indices_live() {
        let app = app(StubSources::bullish(), None, None);
        let (_, body) = send(&app, "GET", "/api/market-indices", None, None).await;
        assert_eq!(body["count"], 3);
        assert_eq!(body["data"][2]["name"], "INDIA VIX");
    }

    #[tokio::test]
    async fn test_market_indices_cached_after_live_scrape() {
        let stub = StubSources::bullish();
        let app = app(stub.clone(), None, None);

        let (_, first) = send(&app, "GET", "/api/market-indices", None, None).await;
        let (_, second) = send(&app, "GET", "/api/market-indices", None, None).await;

        assert_eq!(stub.index_calls(), 1);
        assert_eq!(first["data"], second["data"]);
        assert_eq!(second["count"], 3);
    }

    #[tokio::test]
    async fn test_market_indices_fallback_is_not_cached() {
        let stub = StubSources::failing();
        let app = app(stub.clone(), None, None);

        for _ in 0..2 {
            let (_, body) = send(&app, "GET", "/api/market-indices", None, None).await;
            assert!(body["message"].as_str().unwrap().contains("fallback"));
        }
        assert_eq!(stub.index_calls(), 2);
    }

    #[tokio::test]
    async fn test_sector_data_failure_is_500_with_empty_data() {
        let app = app(StubSources::failing(), None, None);
        let (status, body) = send(&app, "GET", "/api/sector-data", None, None).await;

        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body["success"], false);
        assert_eq!(body["data"], json!([]));
    }

    #[tokio::test]
    async fn test_fii_dii_history_sample_and_store() {
        let app_without_db = app(StubSources::failing(), None, None);
        let (status, body) = send(&app_without_db, "GET", "/api/fii-dii-history", None, None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["data"]["summary"].as_array().unwrap().len(), 30);
        assert!(body["data"]["stats"]["note"].is_string());

        let today = chrono::Utc::now().date_naive().format("%Y-%m-%d").to_string();
        let record = |category, net: f64| FiiDiiRecord {
            id: None,
            date: today.clone(),
            category,
            buy_value: 5000.0,
            sell_value: 5000.0 - net,
            net_value: net,
            created_at: None,
        };
        let store = MemoryStore::new().with_fii_dii(vec![
            record(FiiDiiCategory::Fii, -800.0),
            record(FiiDiiCategory::Dii, 1200.0),
        ]);
        let app_with_db = app(StubSources::failing(), Some(store), None);
        let (_, body) = send(&app_with_db, "GET", "/api/fii-dii-history", None, None).await;

        assert_eq!(body["data"]["stats"]["total_records"], 2);
        assert_eq!(body["data"]["summary"][0]["net_combined"], 400.0);
        assert!(body["data"]["stats"].get("note").is_none());
    }

    // ----- ADMIN AUTH -----

    #[tokio::test]
    async fn test_fii_dii_collection_stores_feed_rows() {
        let today = chrono::Utc::now().date_naive();
        let stub = StubSources {
            fii_dii_feed: Some(vec![
                FiiDiiRecord::new(today, FiiDiiCategory::Fii, 12450.75, 13698.60),
                FiiDiiRecord::new(today, FiiDiiCategory::Dii, 9800.5, 8908.16),
            ]),
            ..StubSources::failing()
        };
        let app = app(stub, Some(MemoryStore::new()), None);

        let (status, body) = send(&app, "GET", "/api/fii-dii-data", None, None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["success"], true);
        assert_eq!(body["source"], "nse");
        assert_eq!(body["count"], 2);
        assert_eq!(body["message"], "Successfully stored 2 FII/DII records");
        assert_eq!(body["data"][0]["category"], "FII");

        // Same day again overwrites rather than duplicates
        let (status, _) = send(&app, "POST", "/api/cron/daily-fii-dii", None, None).await;
        assert_eq!(status, StatusCode::OK);

        let (_, history) = send(&app, "GET", "/api/fii-dii-history", None, None).await;
        assert_eq!(history["data"]["stats"]["total_records"], 2);
        let latest = &history["data"]["summary"][0];
        assert_eq!(latest["date"], today.format("%Y-%m-%d").to_string());
        assert!((latest["net_combined"].as_f64().unwrap() - (-355.51)).abs() < 1e-6);
    }

    #[tokio::test]
    async fn test_fii_dii_collection_falls_back_to_sample_pair() {
        let app = app(StubSources::failing(), Some(MemoryStore::new()), None);

        let (status, body) = send(&app, "GET", "/api/fii-dii-data", None, None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["source"], "sample_data");
        assert_eq!(body["count"], 2);
        assert_eq!(body["data"][1]["category"], "DII");

        let (_, history) = send(&app, "GET", "/api/fii-dii-history", None, None).await;
        assert_eq!(history["data"]["stats"]["total_days"], 1);
        assert!(history["data"]["stats"]["note"].is_null());
    }

    #[tokio::test]
    async fn test_fii_dii_collection_without_store_is_500() {
        let app = app(StubSources::failing(), None, None);
        let (status, body) = send(&app, "GET", "/api/fii-dii-data", None, None).await;

        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body["success"], false);
        assert!(body["error"].as_str().unwrap().contains("Supabase not configured"));
        assert_eq!(body["data"], json!([]));
    }

    #[tokio::test]
    async fn test_admin_auth_outcomes() {
        let app = admin_app(MemoryStore::new());

        let (status, _) = send(&app, "POST", "/api/admin/auth", Some(json!({})), None).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);

        let (status, body) = send(&app, "POST", "/api/admin/auth", Some(json!({ "password": "guess" })), None).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(body["error"], "Invalid password");

        let token = login(&app).await;
        let (status, body) = send(&app, "POST", "/api/admin/verify", Some(json!({ "token": token })), None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["message"], "Token is valid");

        let (status, _) = send(&app, "POST", "/api/admin/verify", Some(json!({ "token": "123_abc" })), None).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_admin_auth_unconfigured() {
        let app = app(StubSources::failing(), None, None);
        let (status, _) = send(&app, "POST", "/api/admin/auth", Some(json!({ "password": "x" })), None).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    }

    // ----- SWING TRADES -----

    #[tokio::test]
    async fn test_swing_trades_sample_without_store() {
        let app = app(StubSources::failing(), None, Some(PASSWORD));
        let (status, body) = send(&app, "GET", "/api/swing-trades", None, None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["source"], "sample_data");
        assert_eq!(body["data"].as_array().unwrap().len(), 3);

        let token = login(&app).await;
        let new_trade = json!({ "strategy": "BIT", "stock_name": "ITC", "stock_symbol": "ITC", "entry_price": 450, "stop_loss": 430 });
        let (status, _) = send(&app, "POST", "/api/swing-trades", Some(new_trade), Some(&token)).await;
        assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    }

    #[tokio::test]
    async fn test_swing_trade_crud() {
        let app = admin_app(MemoryStore::new());
        let new_trade = json!({
            "strategy": "Swing Angle",
            "stock_name": "Tata Motors",
            "stock_symbol": "tatamotors",
            "entry_price": "800",
            "stop_loss": 770,
            "target_price": 880,
        });

        let (status, _) = send(&app, "POST", "/api/swing-trades", Some(new_trade.clone()), None).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);

        let token = login(&app).await;
        let (status, body) = send(&app, "POST", "/api/swing-trades", Some(new_trade), Some(&token)).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["data"]["stock_symbol"], "TATAMOTORS");
        assert_eq!(body["data"]["potential_return"], 10.0);
        assert_eq!(body["data"]["status"], "Running");
        let id = body["data"]["id"].as_str().unwrap().to_string();

        let (status, body) = send(&app, "POST", "/api/swing-trades", Some(json!({ "strategy": "BIT" })), Some(&token)).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "Missing required field: stock_name");

        let (_, body) = send(&app, "GET", "/api/swing-trades?strategy=Swing%20Angle", None, None).await;
        assert_eq!(body["count"], 1);
        let (_, body) = send(&app, "GET", "/api/swing-trades?strategy=BIT", None, None).await;
        assert_eq!(body["count"], 0);

        let patch = json!({ "id": id, "status": "Trade Successful", "exit_price": 880 });
        let (status, body) = send(&app, "PUT", "/api/swing-trades", Some(patch), Some(&token)).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["data"]["status"], "Trade Successful");
        assert!(body["data"]["exit_date"].is_string());
        assert_eq!(body["data"]["exit_price"], 880.0);

        let (status, _) = send(&app, "PUT", "/api/swing-trades", Some(json!({ "status": "Cancelled" })), Some(&token)).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);

        let (status, _) = send(&app, "PUT", "/api/swing-trades", Some(json!({ "id": "999", "notes": "x" })), Some(&token)).await;
        assert_eq!(status, StatusCode::NOT_FOUND);

        let (status, _) = send(&app, "DELETE", "/api/swing-trades", None, Some(&token)).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);

        let uri = format!("/api/swing-trades?id={}", id);
        let (status, body) = send(&app, "DELETE", &uri, None, Some(&token)).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["message"], "Swing trade deleted successfully");

        let (status, _) = send(&app, "DELETE", &uri, None, Some(&token)).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    // ----- BLOG POSTS -----

    #[tokio::test]
    async fn test_blog_post_lifecycle() {
        let app = admin_app(MemoryStore::new());
        let token = login(&app).await;

        let post = json!({
            "title": "Reading FII DII Data",
            "content": "c".repeat(250),
            "category": "Market Analysis",
            "status": "published",
        });
        let (status, body) = send(&app, "POST", "/api/blog-posts", Some(post), Some(&token)).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["data"]["slug"], "reading-fii-dii-data");
        assert_eq!(body["data"]["read_time"], "2 min read");
        let id = body["data"]["id"].as_i64().unwrap();

        let (status, body) = send(&app, "GET", "/api/blog-posts/reading-fii-dii-data", None, None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["data"]["category"], "Market Analysis");

        let (status, _) = send(&app, "GET", "/api/blog-posts/unknown-slug", None, None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);

        let (_, body) = send(&app, "GET", "/api/blog-posts?status=draft", None, None).await;
        assert_eq!(body["count"], 0);
        let (_, body) = send(&app, "GET", "/api/blog-posts?status=published", None, None).await;
        assert_eq!(body["count"], 1);

        let (status, body) = send(&app, "PUT", "/api/blog-posts", Some(json!({ "id": id, "featured": true })), Some(&token)).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["data"]["featured"], true);

        let (status, _) = send(&app, "POST", "/api/blog-posts", Some(json!({ "title": "No body" })), Some(&token)).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);

        let (status, _) = send(&app, "DELETE", &format!("/api/blog-posts?id={}", id), None, Some(&token)).await;
        assert_eq!(status, StatusCode::OK);
    }

    // ----- OPTION ANALYSIS -----

    #[tokio::test]
    async fn test_option_analysis_filters() {
        let rows: Vec<OptionAnalysis> = serde_json::from_value(json!([
            { "symbol": "TITAN", "score": 52, "unusual_activity": "[]" },
            { "symbol": "IOC", "score": "78.5", "unusual_activity": "[\"Call writing 150\"]" },
            { "symbol": "SBIN", "score": -64, "unusual_activity": "[]" },
        ]))
        .unwrap();
        let app = app(StubSources::failing(), Some(MemoryStore::new().with_option_analysis(rows)), None);

        let (status, body) = send(&app, "GET", "/api/option-analysis?analysis_type=BULLISH_SETUPS&min_score=50", None, None).await;
        assert_eq!(status, StatusCode::OK);
        let data = &body["data"];
        assert_eq!(data["total_results"], 2);
        assert_eq!(data["results"][0]["symbol"], "IOC");
        assert_eq!(data["analysis_type"], "BULLISH_SETUPS");
        assert_eq!(data["min_score"], 50);

        let (_, body) = send(&app, "GET", "/api/option-analysis?analysis_type=UNUSUAL_ACTIVITY", None, None).await;
        assert_eq!(body["data"]["total_results"], 1);

        let (_, body) = send(&app, "GET", "/api/option-analysis?symbols=SBIN,TITAN&limit=1", None, None).await;
        assert_eq!(body["data"]["results"][0]["symbol"], "TITAN");
        assert_eq!(body["data"]["total_results"], 1);
    }

    #[tokio::test]
    async fn test_option_analysis_without_store() {
        let app = app(StubSources::failing(), None, None);
        let (status, body) = send(&app, "GET", "/api/option-analysis", None, None).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body["error"], "Database not configured");

        let (status, body) = send(&app, "POST", "/api/option-analysis", Some(json!({})), None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["success"], true);
    }
}

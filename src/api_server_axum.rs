use crate::app_config::AppConfig;
use crate::auth::{self, AdminSecret, AdminToken};
use crate::blog::{self, BlogPost, BlogPostInput, BlogPostPatch, PostStatus};
use crate::collector;
use crate::error::AppError;
use crate::market::config;
use crate::market::{FiiDiiHistory, FiiDiiRecord, MarketIndex, SectorData, fii_dii};
use crate::option_analysis::{self, OptionAnalysisQuery, OptionAnalysisReport, OptionFilters};
use crate::sentiment::{self, LiveSources, MarketSources, Sentiment};
use crate::store::RecordStore;
use crate::trades::{self, Strategy, SwingTrade, SwingTradeInput, SwingTradePatch};
use crate::utility::Timer;
use anyhow::Result;
use axum::{
    Router,
    body::Bytes,
    extract::{FromRef, Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Json, Response},
    routing::{get, post},
};
use chrono::{DateTime, Duration, NaiveDate, Utc};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Instant;
use tokio::sync::RwLock;
use tower_http::cors::CorsLayer;
use tracing::{error, info, warn};

// -----------------------------------------------
// API REQUEST/RESPONSE MODELS
// -----------------------------------------------

#[derive(Debug, Serialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub count: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source: Option<&'static str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<DateTime<Utc>>,
    pub processing_time_ms: Option<u64>,
}

impl<T> ApiResponse<T> {
    pub fn ok(data: T, timer: &Timer) -> Self {
        Self {
            success: true,
            message: None,
            data: Some(data),
            error: None,
            count: None,
            source: None,
            note: None,
            timestamp: None,
            processing_time_ms: Some(timer.elapsed_ms()),
        }
    }

    /// Failed envelope that still carries a usable payload
    pub fn failure(error: String, data: T, timer: &Timer) -> Self {
        Self {
            success: false,
            error: Some(error),
            ..Self::ok(data, timer)
        }
    }

    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }

    pub fn with_count(mut self, count: usize) -> Self {
        self.count = Some(count);
        self
    }

    pub fn with_source(mut self, source: &'static str) -> Self {
        self.source = Some(source);
        self
    }

    pub fn with_note(mut self, note: impl Into<String>) -> Self {
        self.note = Some(note.into());
        self
    }

    pub fn with_timestamp(mut self) -> Self {
        self.timestamp = Some(Utc::now());
        self
    }
}

impl ApiResponse<()> {
    pub fn message_only(message: impl Into<String>, timer: &Timer) -> Self {
        Self {
            data: None,
            ..Self::ok((), timer).with_message(message)
        }
    }
}

#[derive(Debug, Serialize)]
pub struct AuthResponse {
    pub success: bool,
    pub message: &'static str,
    pub token: String,
}

#[derive(Debug, Deserialize)]
struct PasswordBody {
    #[serde(default)]
    password: Option<String>,
}

#[derive(Debug, Deserialize)]
struct TokenBody {
    #[serde(default)]
    token: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct StrategyQuery {
    pub strategy: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct BlogListQuery {
    pub status: Option<String>,
    pub category: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct IdQuery {
    pub id: Option<String>,
}

// -----------------------------------------------
// APPLICATION STATE
// -----------------------------------------------

#[derive(Clone)]
pub struct AppState {
    sources: Arc<dyn MarketSources>,
    store: Option<Arc<dyn RecordStore>>,
    admin: AdminSecret,
    cache: Arc<RwLock<Cache>>,
}

#[derive(Default)]
struct Cache {
    market_indices: Option<(Vec<MarketIndex>, Instant)>,
}

impl AppState {
    pub fn new(
        sources: Arc<dyn MarketSources>,
        store: Option<Arc<dyn RecordStore>>,
        admin_password: Option<String>,
    ) -> Self {
        Self {
            sources,
            store,
            admin: AdminSecret::new(admin_password),
            cache: Arc::new(RwLock::new(Cache::default())),
        }
    }

    /// Live scrapers plus the PostgREST store when it is configured
    pub fn from_config(app_config: &AppConfig) -> Result<Self> {
        let market = Arc::new(app_config.market_client()?);
        let store = app_config.record_store()?;

        let sources = Arc::new(LiveSources::new(market, store.clone()));
        Ok(Self::new(sources, store, app_config.admin_password.clone()))
    }

    fn require_store(&self, action: &str) -> Result<&Arc<dyn RecordStore>, AppError> {
        self.store
            .as_ref()
            .ok_or_else(|| AppError::NotConfigured(format!("Supabase not configured - cannot {}", action)))
    }
}

impl FromRef<AppState> for AdminSecret {
    fn from_ref(state: &AppState) -> Self {
        state.admin.clone()
    }
}

// -----------------------------------------------
// HELPER FUNCTIONS
// -----------------------------------------------

/// Decode a JSON body so malformed input surfaces in the envelope
fn parse_body<T: DeserializeOwned>(body: &Bytes) -> Result<T, AppError> {
    Ok(serde_json::from_slice(body)?)
}

fn store_error(e: anyhow::Error) -> AppError {
    error!("Store operation failed: {:#}", e);
    AppError::Store(format!("{:#}", e))
}

fn today() -> NaiveDate {
    Utc::now().date_naive()
}

fn fallback_indices() -> Vec<MarketIndex> {
    config::FALLBACK_INDICES
        .iter()
        .map(|(name, display, current, change, pct)| MarketIndex::new(name, display, *current, *change, *pct))
        .collect()
}

fn sample_fii_dii(note: &str) -> FiiDiiHistory {
    fii_dii::sample_history(today(), config::FII_DII_HISTORY_DAYS, &mut rand::thread_rng(), note)
}

fn parse_blog_id(id: Option<String>) -> Result<i64, AppError> {
    let id = id
        .filter(|s| !s.is_empty())
        .ok_or_else(|| AppError::Validation("Missing required parameter: id".to_string()))?;
    id.parse::<i64>()
        .map_err(|_| AppError::Validation(format!("Invalid blog post id: {}", id)))
}

// -----------------------------------------------
// API HANDLERS
// -----------------------------------------------

/// GET /health
async fn health() -> Json<serde_json::Value> {
    Json(serde_json::json!({ "status": "ok" }))
}

/// GET /api/indian-market-sentiment - Composite market mood
async fn get_market_sentiment(State(app_state): State<AppState>) -> Response {
    let timer = Timer::start("indian-market-sentiment");

    let inputs = sentiment::gather_inputs(app_state.sources.as_ref()).await;
    let now = Utc::now();

    match sentiment::compute_sentiment(&inputs, now) {
        Ok(snapshot) => {
            info!(
                overall = ?snapshot.overall,
                score = snapshot.score,
                confidence = snapshot.confidence,
                "Market sentiment computed"
            );
            Json(ApiResponse::<Sentiment>::ok(snapshot, &timer).with_timestamp()).into_response()
        }
        Err(e) => {
            error!("Failed to compute market sentiment: {}", e);
            let body = ApiResponse::failure(e.message().to_string(), sentiment::default_sentiment(now), &timer)
                .with_timestamp();
            (StatusCode::INTERNAL_SERVER_ERROR, Json(body)).into_response()
        }
    }
}

/// GET /api/market-indices - Headline indices with a hard-coded fallback
async fn get_market_indices(State(app_state): State<AppState>) -> Json<ApiResponse<Vec<MarketIndex>>> {
    let timer = Timer::silent("market-indices");

    // Check cache first
    {
        let cache = app_state.cache.read().await;
        if let Some((indices, cached_at)) = &cache.market_indices {
            if cached_at.elapsed() < config::INDICES_CACHE_DURATION {
                return Json(
                    ApiResponse::ok(indices.clone(), &timer)
                        .with_message("Market indices data retrieved successfully")
                        .with_count(indices.len())
                        .with_timestamp(),
                );
            }
        }
    }

    let message = match app_state.sources.market_indices().await {
        Ok(indices) if !indices.is_empty() => {
            {
                let mut cache = app_state.cache.write().await;
                cache.market_indices = Some((indices.clone(), Instant::now()));
            }

            let count = indices.len();
            return Json(
                ApiResponse::ok(indices, &timer)
                    .with_message("Market indices data retrieved successfully")
                    .with_count(count)
                    .with_timestamp(),
            );
        }
        Ok(_) => "Market indices data (fallback)",
        Err(e) => {
            warn!("Market indices scrape failed: {:#}", e);
            "Market indices data (fallback due to error)"
        }
    };

    let fallback = fallback_indices();
    let count = fallback.len();
    Json(
        ApiResponse::ok(fallback, &timer)
            .with_message(message)
            .with_count(count)
            .with_timestamp(),
    )
}

/// GET /api/sector-data - Sector index performance
async fn get_sector_data(State(app_state): State<AppState>) -> Response {
    let timer = Timer::silent("sector-data");

    match app_state.sources.sectors().await {
        Ok(sectors) if !sectors.is_empty() => {
            let count = sectors.len();
            Json(ApiResponse::ok(sectors, &timer).with_count(count).with_timestamp()).into_response()
        }
        result => {
            let reason = match result {
                Err(e) => format!("{:#}", e),
                Ok(_) => "No sector data found".to_string(),
            };
            error!("Sector data unavailable: {}", reason);
            let body = ApiResponse::<Vec<SectorData>>::failure(reason, Vec::new(), &timer);
            (StatusCode::INTERNAL_SERVER_ERROR, Json(body)).into_response()
        }
    }
}

/// GET /api/fii-dii-history - Last 30 days of institutional flows
async fn get_fii_dii_history(State(app_state): State<AppState>) -> Json<ApiResponse<FiiDiiHistory>> {
    let timer = Timer::silent("fii-dii-history");

    let history = match &app_state.store {
        None => {
            warn!("Supabase not configured, using sample FII/DII data");
            sample_fii_dii("Using sample data - configure Supabase for real historical data")
        }
        Some(store) => {
            let since = today() - Duration::days(config::FII_DII_HISTORY_DAYS);
            match store.fii_dii_since(since).await {
                Ok(records) => fii_dii::history_from_records(records),
                Err(e) => {
                    warn!("FII/DII history query failed, using sample data: {:#}", e);
                    sample_fii_dii("Using sample data due to database error")
                }
            }
        }
    };

    Json(ApiResponse::ok(history, &timer))
}

/// GET /api/fii-dii-data - Collect today's flows into the history table
async fn collect_fii_dii_data(State(app_state): State<AppState>) -> Response {
    let timer = Timer::start("fii-dii-data");

    let outcome = match &app_state.store {
        None => Err("Supabase not configured - cannot store FII/DII data".to_string()),
        Some(store) => collector::collect_fii_dii(app_state.sources.as_ref(), store.as_ref(), Utc::now())
            .await
            .map_err(|e| format!("{:#}", e)),
    };

    match outcome {
        Ok(collection) => {
            let count = collection.records.len();
            info!(count, source = collection.source.as_str(), "FII/DII data collected");
            Json(
                ApiResponse::ok(collection.records, &timer)
                    .with_message(format!("Successfully stored {} FII/DII records", count))
                    .with_count(count)
                    .with_source(collection.source.as_str())
                    .with_timestamp(),
            )
            .into_response()
        }
        Err(reason) => {
            error!("Failed to fetch/store FII/DII data: {}", reason);
            let body = ApiResponse::<Vec<FiiDiiRecord>>::failure(reason, Vec::new(), &timer).with_timestamp();
            (StatusCode::INTERNAL_SERVER_ERROR, Json(body)).into_response()
        }
    }
}

// ----- SWING TRADES -----

/// GET /api/swing-trades?strategy=BIT
async fn list_swing_trades(
    Query(query): Query<StrategyQuery>,
    State(app_state): State<AppState>,
) -> Response {
    let timer = Timer::silent("swing-trades");

    let Some(store) = &app_state.store else {
        return Json(
            ApiResponse::ok(trades::sample_swing_trades(), &timer)
                .with_message("Sample swing trades data (Supabase not configured)")
                .with_source("sample_data"),
        )
        .into_response();
    };

    let strategy = match query.strategy.as_deref().filter(|s| !s.is_empty()) {
        None => None,
        Some(s) => match Strategy::parse(s) {
            Some(strategy) => Some(strategy),
            // No row can match an unknown strategy
            None => {
                return Json(ApiResponse::ok(Vec::<SwingTrade>::new(), &timer).with_count(0)).into_response();
            }
        },
    };

    match store.list_swing_trades(strategy).await {
        Ok(rows) => {
            info!("Fetched {} swing trades", rows.len());
            let count = rows.len();
            Json(
                ApiResponse::ok(rows, &timer)
                    .with_message("Swing trades fetched successfully")
                    .with_count(count),
            )
            .into_response()
        }
        Err(e) => {
            let err = store_error(e);
            let body = ApiResponse::failure(err.message().to_string(), trades::sample_swing_trades(), &timer);
            (StatusCode::INTERNAL_SERVER_ERROR, Json(body)).into_response()
        }
    }
}

/// POST /api/swing-trades (admin)
async fn create_swing_trade(
    _admin: AdminToken,
    State(app_state): State<AppState>,
    body: Bytes,
) -> Result<Json<ApiResponse<SwingTrade>>, AppError> {
    let timer = Timer::silent("create-swing-trade");
    let store = app_state.require_store("create swing trades")?;

    let input: SwingTradeInput = parse_body(&body)?;
    let trade = trades::validate_new(input, today())?;
    let created = store.insert_swing_trade(trade).await.map_err(store_error)?;

    info!(id = %created.id, symbol = %created.stock_symbol, "Swing trade created");
    Ok(Json(ApiResponse::ok(created, &timer).with_message("Swing trade created successfully")))
}

/// PUT /api/swing-trades (admin) - partial update, id in body
async fn update_swing_trade(
    _admin: AdminToken,
    State(app_state): State<AppState>,
    body: Bytes,
) -> Result<Json<ApiResponse<SwingTrade>>, AppError> {
    let timer = Timer::silent("update-swing-trade");
    let store = app_state.require_store("update swing trades")?;

    let patch: SwingTradePatch = parse_body(&body)?;
    let id = patch
        .id()
        .ok_or_else(|| AppError::Validation("Missing required field: id".to_string()))?;
    let patch = patch.normalize(today());

    let updated = store
        .update_swing_trade(&id, &patch)
        .await
        .map_err(store_error)?
        .ok_or_else(|| AppError::NotFound(format!("Swing trade {} not found", id)))?;

    info!(id = %updated.id, status = ?updated.status, "Swing trade updated");
    Ok(Json(ApiResponse::ok(updated, &timer).with_message("Swing trade updated successfully")))
}

/// DELETE /api/swing-trades?id=... (admin)
async fn delete_swing_trade(
    _admin: AdminToken,
    Query(query): Query<IdQuery>,
    State(app_state): State<AppState>,
) -> Result<Json<ApiResponse<()>>, AppError> {
    let timer = Timer::silent("delete-swing-trade");
    let store = app_state.require_store("delete swing trades")?;

    let id = query
        .id
        .filter(|s| !s.is_empty())
        .ok_or_else(|| AppError::Validation("Missing required parameter: id".to_string()))?;

    if !store.delete_swing_trade(&id).await.map_err(store_error)? {
        return Err(AppError::NotFound(format!("Swing trade {} not found", id)));
    }

    info!(id = %id, "Swing trade deleted");
    Ok(Json(ApiResponse::message_only("Swing trade deleted successfully", &timer)))
}

// ----- BLOG POSTS -----

/// GET /api/blog-posts?status=published&category=...
async fn list_blog_posts(
    Query(query): Query<BlogListQuery>,
    State(app_state): State<AppState>,
) -> Result<Json<ApiResponse<Vec<BlogPost>>>, AppError> {
    let timer = Timer::silent("blog-posts");

    let status = match query.status.as_deref().filter(|s| !s.is_empty()) {
        None => None,
        Some(s) => Some(PostStatus::parse(s).ok_or_else(|| {
            AppError::Validation("Invalid status. Must be one of: draft, published, scheduled".to_string())
        })?),
    };

    let Some(store) = &app_state.store else {
        return Ok(Json(
            ApiResponse::ok(Vec::new(), &timer)
                .with_message("Database not configured - no blog posts available")
                .with_count(0),
        ));
    };

    let category = query.category.as_deref().filter(|s| !s.is_empty());
    let posts = store.list_blog_posts(status, category).await.map_err(store_error)?;
    let count = posts.len();
    Ok(Json(ApiResponse::ok(posts, &timer).with_count(count)))
}

/// GET /api/blog-posts/{slug}
async fn get_blog_post(
    Path(slug): Path<String>,
    State(app_state): State<AppState>,
) -> Result<Json<ApiResponse<BlogPost>>, AppError> {
    let timer = Timer::silent("blog-post");
    let store = app_state.require_store("read blog posts")?;

    let post = store
        .blog_post_by_slug(&slug)
        .await
        .map_err(store_error)?
        .ok_or_else(|| AppError::NotFound(format!("Blog post '{}' not found", slug)))?;

    Ok(Json(ApiResponse::ok(post, &timer)))
}

/// POST /api/blog-posts (admin)
async fn create_blog_post(
    _admin: AdminToken,
    State(app_state): State<AppState>,
    body: Bytes,
) -> Result<Json<ApiResponse<BlogPost>>, AppError> {
    let timer = Timer::silent("create-blog-post");
    let store = app_state.require_store("create blog posts")?;

    let input: BlogPostInput = parse_body(&body)?;
    let post = blog::validate_new(input, today())?;
    let created = store.insert_blog_post(post).await.map_err(store_error)?;

    info!(id = created.id, slug = %created.slug, "Blog post created");
    Ok(Json(ApiResponse::ok(created, &timer).with_message("Blog post created successfully")))
}

/// PUT /api/blog-posts (admin) - partial update, id in body
async fn update_blog_post(
    _admin: AdminToken,
    State(app_state): State<AppState>,
    body: Bytes,
) -> Result<Json<ApiResponse<BlogPost>>, AppError> {
    let timer = Timer::silent("update-blog-post");
    let store = app_state.require_store("update blog posts")?;

    let patch: BlogPostPatch = parse_body(&body)?;
    let id = patch
        .id
        .ok_or_else(|| AppError::Validation("Missing required field: id".to_string()))?;
    let patch = patch.normalize(today());

    let updated = store
        .update_blog_post(id, &patch)
        .await
        .map_err(store_error)?
        .ok_or_else(|| AppError::NotFound(format!("Blog post {} not found", id)))?;

    Ok(Json(ApiResponse::ok(updated, &timer).with_message("Blog post updated successfully")))
}

/// DELETE /api/blog-posts?id=... (admin)
async fn delete_blog_post(
    _admin: AdminToken,
    Query(query): Query<IdQuery>,
    State(app_state): State<AppState>,
) -> Result<Json<ApiResponse<()>>, AppError> {
    let timer = Timer::silent("delete-blog-post");
    let store = app_state.require_store("delete blog posts")?;
    let id = parse_blog_id(query.id)?;

    if !store.delete_blog_post(id).await.map_err(store_error)? {
        return Err(AppError::NotFound(format!("Blog post {} not found", id)));
    }

    Ok(Json(ApiResponse::message_only("Blog post deleted successfully", &timer)))
}

// ----- OPTION ANALYSIS -----

/// GET /api/option-analysis?analysis_type=BULLISH_SETUPS&min_score=40
async fn get_option_analysis(
    Query(query): Query<OptionAnalysisQuery>,
    State(app_state): State<AppState>,
) -> Result<Json<ApiResponse<OptionAnalysisReport>>, AppError> {
    let timer = Timer::silent("option-analysis");
    let store = app_state
        .store
        .as_ref()
        .ok_or_else(|| AppError::Internal("Database not configured".to_string()))?;

    let filters = OptionFilters::from(query);
    info!(?filters, "Fetching option analysis");

    let rows = store
        .latest_option_analysis(config::OPTION_ANALYSIS_FETCH_LIMIT)
        .await
        .map_err(store_error)?;
    let report = option_analysis::build_report(rows, filters, Utc::now());

    info!("Retrieved {} option analysis results", report.total_results);
    Ok(Json(ApiResponse::ok(report, &timer)))
}

/// POST /api/option-analysis - collection runs outside this service
async fn post_option_analysis() -> Json<ApiResponse<()>> {
    let timer = Timer::silent("option-analysis-post");
    Json(
        ApiResponse::message_only("Option analysis collection is handled by the external collector", &timer)
            .with_note("Run the option chain collector to store new analysis rows")
            .with_timestamp(),
    )
}

// ----- ADMIN AUTH -----

/// POST /api/admin/auth {password}
async fn admin_auth(State(app_state): State<AppState>, body: Bytes) -> Result<Json<AuthResponse>, AppError> {
    let body: PasswordBody = parse_body(&body)?;
    let token = auth::login(&app_state.admin, body.password.as_deref())?;

    info!("Admin authentication successful");
    Ok(Json(AuthResponse {
        success: true,
        message: "Authentication successful",
        token,
    }))
}

/// POST /api/admin/verify {token}
async fn admin_verify(State(app_state): State<AppState>, body: Bytes) -> Result<Json<ApiResponse<()>>, AppError> {
    let timer = Timer::silent("admin-verify");
    let body: TokenBody = parse_body(&body)?;
    auth::check(&app_state.admin, body.token.as_deref())?;
    Ok(Json(ApiResponse::message_only("Token is valid", &timer)))
}

// -----------------------------------------------
// SERVER SETUP
// -----------------------------------------------

pub fn build_router(app_state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/api/indian-market-sentiment", get(get_market_sentiment))
        .route("/api/market-indices", get(get_market_indices))
        .route("/api/sector-data", get(get_sector_data))
        .route("/api/fii-dii-history", get(get_fii_dii_history))
        .route("/api/fii-dii-data", get(collect_fii_dii_data))
        .route("/api/cron/daily-fii-dii", get(collect_fii_dii_data).post(collect_fii_dii_data))
        .route(
            "/api/swing-trades",
            get(list_swing_trades)
                .post(create_swing_trade)
                .put(update_swing_trade)
                .delete(delete_swing_trade),
        )
        .route(
            "/api/blog-posts",
            get(list_blog_posts)
                .post(create_blog_post)
                .put(update_blog_post)
                .delete(delete_blog_post),
        )
        .route("/api/blog-posts/{slug}", get(get_blog_post))
        .route("/api/option-analysis", get(get_option_analysis).post(post_option_analysis))
        .route("/api/admin/auth", post(admin_auth))
        .route("/api/admin/verify", post(admin_verify))
        .layer(CorsLayer::permissive())
        .with_state(app_state)
}

pub async fn start_server(app_config: &AppConfig) -> Result<()> {
    let app_state = AppState::from_config(app_config)?;
    let app = build_router(app_state);

    let addr = app_config.address();
    let listener = tokio::net::TcpListener::bind(&addr).await?;

    info!("TradeSmartMoney API running on http://{}", addr);
    println!("🚀 TradeSmartMoney API running on http://{}", addr);
    println!("📋 Available endpoints:");
    println!("   GET  /health");
    println!("   GET  /api/indian-market-sentiment");
    println!("   GET  /api/market-indices");
    println!("   GET  /api/sector-data");
    println!("   GET  /api/fii-dii-history");
    println!("   GET  /api/fii-dii-data                     (collects today's flows)");
    println!("   POST /api/cron/daily-fii-dii");
    println!("   GET  /api/swing-trades?strategy=BIT        (POST/PUT/DELETE: admin)");
    println!("   GET  /api/blog-posts?status=published      (POST/PUT/DELETE: admin)");
    println!("   GET  /api/blog-posts/{{slug}}");
    println!("   GET  /api/option-analysis?analysis_type=BULLISH_SETUPS&min_score=40");
    println!("   POST /api/admin/auth");
    println!("   POST /api/admin/verify");
    println!();

    axum::serve(listener, app).await?;
    Ok(())
}

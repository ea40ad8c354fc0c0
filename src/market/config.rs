use std::time::Duration;

// -----------------------------------------------
// UPSTREAM ENDPOINTS
// -----------------------------------------------
pub const INDICES_PAGE_URL: &str = "https://dhan.co/all-nse-indices/";
pub const SCREENER_URL: &str = "https://chartink.com/screener/process";
pub const SCREENER_REFERER: &str = "https://chartink.com/screener/";

/// Scan clause posted to the screener: liquid cash stocks with a live RSI reading
pub const SCREENER_RSI_CLAUSE: &str =
    "( {cash} ( latest rsi( 14 ) > 0 and latest close > 100 and latest volume > 100000 ) )";

pub const NSE_HOME_URL: &str = "https://www.nseindia.com/";
pub const NSE_FII_DII_URL: &str = "https://www.nseindia.com/api/fiidiiTradeReact";

pub const SUPABASE_REST_PATH: &str = "/rest/v1";

// -----------------------------------------------
// TABLE NAMES
// -----------------------------------------------
pub const TABLE_SWING_TRADES: &str = "swing_trades";
pub const TABLE_BLOG_POSTS: &str = "blog_posts";
pub const TABLE_FII_DII: &str = "fii_dii_data";
pub const VIEW_LATEST_OPTION_ANALYSIS: &str = "latest_option_analysis";

/// Deletes `fii_dii_data` rows older than the history window
pub const RPC_CLEANUP_FII_DII: &str = "cleanup_old_fii_dii_data";

// -----------------------------------------------
// INDICES TO SCRAPE
// -----------------------------------------------
/// (row name on the indices page, display name)
pub const MARKET_INDICES: &[(&str, &str)] = &[
    ("NIFTY 50", "Nifty"),
    ("BSE SENSEX", "Sensex"),
    ("NIFTY BANK", "Bank Nifty"),
    ("FINNIFTY", "Finnifty"),
    ("INDIA VIX", "India VIX"),
];

/// (sector label, row name on the indices page)
pub const SECTOR_INDICES: &[(&str, &str)] = &[
    ("IT", "NIFTY IT"),
    ("Banking", "NIFTY BANK"),
    ("Pharma", "NIFTY PHARMA"),
    ("Auto", "NIFTY AUTO"),
    ("FMCG", "NIFTY FMCG"),
    ("Energy", "NIFTY ENERGY"),
    ("Metals", "NIFTY METAL"),
    ("Realty", "NIFTY REALTY"),
    ("Nifty 50", "NIFTY 50"),
    ("Finnifty", "FINNIFTY"),
    ("Healthcare", "NIFTY HEALTHCARE"),
    ("Consumption", "NIFTY CONSUMPTION"),
    ("Consumer Durables", "NIFTY CONSUMER DURABLE"),
    ("Infrastructure", "NIFTY INFRA"),
    ("Media", "NIFTY MEDIA"),
];

/// Served by /api/market-indices when the page cannot be scraped
pub const FALLBACK_INDICES: &[(&str, &str, f64, f64, f64)] = &[
    ("NIFTY 50", "Nifty", 22245.80, 187.50, 0.85),
    ("BSE SENSEX", "Sensex", 73427.59, 668.50, 0.92),
    ("NIFTY BANK", "Bank Nifty", 48234.15, -111.25, -0.23),
    ("FINNIFTY", "Finnifty", 23156.75, 45.30, 0.20),
];

// -----------------------------------------------
// HTTP CLIENT CONFIG
// -----------------------------------------------
pub const USER_AGENT: &str = "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) \
                               AppleWebKit/537.36 (KHTML, like Gecko) \
                               Chrome/131.0.0.0 Safari/537.36";

pub const ACCEPT_LANGUAGES: &[&str] = &[
    "en-US,en;q=0.9",
    "en-GB,en;q=0.8",
    "en-IN,en;q=0.9",
];

pub const HEADER_ACCEPT_HTML: &str =
    "text/html,application/xhtml+xml,application/xml;q=0.9,image/webp,*/*;q=0.8";
pub const HEADER_ACCEPT_JSON: &str = "application/json, text/plain, */*";
pub const HEADER_X_REQUESTED_WITH: &str = "XMLHttpRequest";

pub const HTTP_TIMEOUT: Duration = Duration::from_secs(20);
pub const NSE_WARMUP_DELAY_MS: u64 = 300;

/// Upstream GETs slower than this are logged
pub const SLOW_FETCH_MS: u128 = 2000;

// -----------------------------------------------
// RETRY CONFIG
// -----------------------------------------------
pub const RETRY_BASE_DELAY_MS: u64 = 100;
pub const RETRY_FACTOR: u64 = 2;
pub const RETRY_MAX_DELAY_SECS: u64 = 3;
pub const RETRY_MAX_ATTEMPTS: usize = 3;

// -----------------------------------------------
// CACHING / SCHEDULING
// -----------------------------------------------
pub const INDICES_CACHE_DURATION: Duration = Duration::from_secs(900); // 15 minutes
pub const SENTIMENT_REFRESH_MINUTES: i64 = 5;
pub const FII_DII_HISTORY_DAYS: i64 = 30;
pub const OPTION_ANALYSIS_FETCH_LIMIT: usize = 500;

// -----------------------------------------------
// SENTIMENT FALLBACKS
// -----------------------------------------------
pub const SAMPLE_FII_NET: f64 = -1247.85;
pub const SAMPLE_DII_NET: f64 = 892.34;

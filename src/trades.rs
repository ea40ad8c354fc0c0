//! Swing-trade records: validation of admin input, derived return, patching.

use crate::error::AppError;
use crate::utility::serde_helpers::{lenient_f64, patch_f64, patch_string, string_or_number};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum Strategy {
    #[serde(rename = "BIT")]
    Bit,
    #[serde(rename = "Swing Angle")]
    SwingAngle,
    #[serde(rename = "Bottom Formation")]
    BottomFormation,
}

impl Strategy {
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "BIT" => Some(Self::Bit),
            "Swing Angle" => Some(Self::SwingAngle),
            "Bottom Formation" => Some(Self::BottomFormation),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Bit => "BIT",
            Self::SwingAngle => "Swing Angle",
            Self::BottomFormation => "Bottom Formation",
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
pub enum TradeStatus {
    #[default]
    Running,
    #[serde(rename = "SL Hit")]
    SlHit,
    #[serde(rename = "Trade Successful")]
    TradeSuccessful,
    Cancelled,
}

impl TradeStatus {
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "Running" => Some(Self::Running),
            "SL Hit" => Some(Self::SlHit),
            "Trade Successful" => Some(Self::TradeSuccessful),
            "Cancelled" => Some(Self::Cancelled),
            _ => None,
        }
    }

    pub fn is_closed(&self) -> bool {
        !matches!(self, Self::Running)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SwingTrade {
    #[serde(deserialize_with = "string_or_number")]
    pub id: String,
    pub strategy: Strategy,
    pub stock_name: String,
    pub stock_symbol: String,
    pub entry_price: f64,
    #[serde(default)]
    pub exit_price: Option<f64>,
    pub stop_loss: f64,
    #[serde(default)]
    pub target_price: Option<f64>,
    #[serde(default)]
    pub current_price: Option<f64>,
    pub status: TradeStatus,
    #[serde(default)]
    pub setup_description: Option<String>,
    #[serde(default)]
    pub risk_reward_ratio: Option<String>,
    #[serde(default)]
    pub timeframe: Option<String>,
    pub entry_date: String,
    #[serde(default)]
    pub exit_date: Option<String>,
    #[serde(default)]
    pub chart_image_url: Option<String>,
    #[serde(default)]
    pub notes: Option<String>,
    #[serde(default)]
    pub potential_return: Option<f64>,
    #[serde(default)]
    pub created_at: String,
    #[serde(default)]
    pub updated_at: String,
}

/// Body of POST /api/swing-trades as the admin form sends it
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SwingTradeInput {
    #[serde(default)]
    pub strategy: Option<String>,
    #[serde(default)]
    pub stock_name: Option<String>,
    #[serde(default)]
    pub stock_symbol: Option<String>,
    #[serde(default, deserialize_with = "lenient_f64")]
    pub entry_price: Option<f64>,
    #[serde(default, deserialize_with = "lenient_f64")]
    pub exit_price: Option<f64>,
    #[serde(default, deserialize_with = "lenient_f64")]
    pub stop_loss: Option<f64>,
    #[serde(default, deserialize_with = "lenient_f64")]
    pub target_price: Option<f64>,
    #[serde(default, deserialize_with = "lenient_f64")]
    pub current_price: Option<f64>,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub setup_description: Option<String>,
    #[serde(default)]
    pub risk_reward_ratio: Option<String>,
    #[serde(default)]
    pub timeframe: Option<String>,
    #[serde(default)]
    pub entry_date: Option<String>,
    #[serde(default)]
    pub exit_date: Option<String>,
    #[serde(default)]
    pub chart_image_url: Option<String>,
    #[serde(default)]
    pub notes: Option<String>,
    #[serde(default, deserialize_with = "lenient_f64")]
    pub potential_return: Option<f64>,
}

/// Validated row ready for insertion; the store assigns id and timestamps
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct NewSwingTrade {
    pub strategy: Strategy,
    pub stock_name: String,
    pub stock_symbol: String,
    pub entry_price: f64,
    pub exit_price: Option<f64>,
    pub stop_loss: f64,
    pub target_price: Option<f64>,
    pub current_price: Option<f64>,
    pub status: TradeStatus,
    pub setup_description: Option<String>,
    pub risk_reward_ratio: Option<String>,
    pub timeframe: Option<String>,
    pub entry_date: String,
    pub exit_date: Option<String>,
    pub chart_image_url: Option<String>,
    pub notes: Option<String>,
    pub potential_return: Option<f64>,
}

/// Partial update; outer `None` leaves a column untouched, `Some(None)` clears it
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct SwingTradePatch {
    #[serde(default, skip_serializing)]
    pub id: Option<serde_json::Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub strategy: Option<Strategy>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stock_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stock_symbol: Option<String>,
    #[serde(default, deserialize_with = "lenient_f64", skip_serializing_if = "Option::is_none")]
    pub entry_price: Option<f64>,
    #[serde(default, deserialize_with = "patch_f64", skip_serializing_if = "Option::is_none")]
    pub exit_price: Option<Option<f64>>,
    #[serde(default, deserialize_with = "lenient_f64", skip_serializing_if = "Option::is_none")]
    pub stop_loss: Option<f64>,
    #[serde(default, deserialize_with = "patch_f64", skip_serializing_if = "Option::is_none")]
    pub target_price: Option<Option<f64>>,
    #[serde(default, deserialize_with = "patch_f64", skip_serializing_if = "Option::is_none")]
    pub current_price: Option<Option<f64>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<TradeStatus>,
    #[serde(default, deserialize_with = "patch_string", skip_serializing_if = "Option::is_none")]
    pub setup_description: Option<Option<String>>,
    #[serde(default, deserialize_with = "patch_string", skip_serializing_if = "Option::is_none")]
    pub risk_reward_ratio: Option<Option<String>>,
    #[serde(default, deserialize_with = "patch_string", skip_serializing_if = "Option::is_none")]
    pub timeframe: Option<Option<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub entry_date: Option<String>,
    #[serde(default, deserialize_with = "patch_string", skip_serializing_if = "Option::is_none")]
    pub exit_date: Option<Option<String>>,
    #[serde(default, deserialize_with = "patch_string", skip_serializing_if = "Option::is_none")]
    pub chart_image_url: Option<Option<String>>,
    #[serde(default, deserialize_with = "patch_string", skip_serializing_if = "Option::is_none")]
    pub notes: Option<Option<String>>,
    #[serde(default, deserialize_with = "patch_f64", skip_serializing_if = "Option::is_none")]
    pub potential_return: Option<Option<f64>>,
}

/// `(target - entry) / entry * 100`, two decimals
pub fn potential_return(entry: f64, target: f64) -> Option<f64> {
    if entry == 0.0 {
        return None;
    }
    Some(((target - entry) / entry * 100.0 * 100.0).round() / 100.0)
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|s| !s.trim().is_empty())
}

fn required_text(value: Option<String>, field: &str) -> Result<String, AppError> {
    non_empty(value).ok_or_else(|| AppError::Validation(format!("Missing required field: {}", field)))
}

fn required_number(value: Option<f64>, field: &str) -> Result<f64, AppError> {
    value.ok_or_else(|| AppError::Validation(format!("Missing required field: {}", field)))
}

/// Check required fields, normalise and derive the potential return
pub fn validate_new(input: SwingTradeInput, today: NaiveDate) -> Result<NewSwingTrade, AppError> {
    let strategy_text = required_text(input.strategy, "strategy")?;
    let stock_name = required_text(input.stock_name, "stock_name")?;
    let stock_symbol = required_text(input.stock_symbol, "stock_symbol")?;
    let entry_price = required_number(input.entry_price, "entry_price")?;
    let stop_loss = required_number(input.stop_loss, "stop_loss")?;

    let strategy = Strategy::parse(&strategy_text).ok_or_else(|| {
        AppError::Validation(
            "Invalid strategy. Must be one of: BIT, Swing Angle, Bottom Formation".to_string(),
        )
    })?;

    let status = match non_empty(input.status) {
        Some(s) => TradeStatus::parse(&s).ok_or_else(|| {
            AppError::Validation(
                "Invalid status. Must be one of: Running, SL Hit, Trade Successful, Cancelled"
                    .to_string(),
            )
        })?,
        None => TradeStatus::Running,
    };

    let potential_return = match input.potential_return {
        Some(value) => Some((value * 100.0).round() / 100.0),
        None => input
            .target_price
            .and_then(|target| potential_return(entry_price, target)),
    };

    Ok(NewSwingTrade {
        strategy,
        stock_name,
        stock_symbol: stock_symbol.to_uppercase(),
        entry_price,
        exit_price: input.exit_price,
        stop_loss,
        target_price: input.target_price,
        current_price: input.current_price,
        status,
        setup_description: non_empty(input.setup_description),
        risk_reward_ratio: non_empty(input.risk_reward_ratio),
        timeframe: non_empty(input.timeframe),
        entry_date: non_empty(input.entry_date)
            .unwrap_or_else(|| today.format("%Y-%m-%d").to_string()),
        exit_date: non_empty(input.exit_date),
        chart_image_url: non_empty(input.chart_image_url),
        notes: non_empty(input.notes),
        potential_return,
    })
}

impl SwingTradePatch {
    /// Id carried in the PUT body, accepted as number or string
    pub fn id(&self) -> Option<String> {
        match self.id.as_ref()? {
            serde_json::Value::String(s) if !s.is_empty() => Some(s.clone()),
            serde_json::Value::Number(n) => Some(n.to_string()),
            _ => None,
        }
    }

    /// Upper-case the symbol and stamp an exit date when the trade closes
    pub fn normalize(mut self, today: NaiveDate) -> Self {
        if let Some(symbol) = self.stock_symbol.as_mut() {
            *symbol = symbol.to_uppercase();
        }

        if self.status.is_some_and(|s| s.is_closed()) && !matches!(self.exit_date, Some(Some(_))) {
            self.exit_date = Some(Some(today.format("%Y-%m-%d").to_string()));
        }

        self
    }

    pub fn apply(&self, trade: &mut SwingTrade) {
        if let Some(v) = self.strategy {
            trade.strategy = v;
        }
        if let Some(v) = &self.stock_name {
            trade.stock_name = v.clone();
        }
        if let Some(v) = &self.stock_symbol {
            trade.stock_symbol = v.clone();
        }
        if let Some(v) = self.entry_price {
            trade.entry_price = v;
        }
        if let Some(v) = self.exit_price {
            trade.exit_price = v;
        }
        if let Some(v) = self.stop_loss {
            trade.stop_loss = v;
        }
        if let Some(v) = self.target_price {
            trade.target_price = v;
        }
        if let Some(v) = self.current_price {
            trade.current_price = v;
        }
        if let Some(v) = self.status {
            trade.status = v;
        }
        if let Some(v) = &self.setup_description {
            trade.setup_description = v.clone();
        }
        if let Some(v) = &self.risk_reward_ratio {
            trade.risk_reward_ratio = v.clone();
        }
        if let Some(v) = &self.timeframe {
            trade.timeframe = v.clone();
        }
        if let Some(v) = &self.entry_date {
            trade.entry_date = v.clone();
        }
        if let Some(v) = &self.exit_date {
            trade.exit_date = v.clone();
        }
        if let Some(v) = &self.chart_image_url {
            trade.chart_image_url = v.clone();
        }
        if let Some(v) = &self.notes {
            trade.notes = v.clone();
        }
        if let Some(v) = self.potential_return {
            trade.potential_return = v;
        }
    }
}

impl NewSwingTrade {
    pub fn into_trade(self, id: String, timestamp: String) -> SwingTrade {
        SwingTrade {
            id,
            strategy: self.strategy,
            stock_name: self.stock_name,
            stock_symbol: self.stock_symbol,
            entry_price: self.entry_price,
            exit_price: self.exit_price,
            stop_loss: self.stop_loss,
            target_price: self.target_price,
            current_price: self.current_price,
            status: self.status,
            setup_description: self.setup_description,
            risk_reward_ratio: self.risk_reward_ratio,
            timeframe: self.timeframe,
            entry_date: self.entry_date,
            exit_date: self.exit_date,
            chart_image_url: self.chart_image_url,
            notes: self.notes,
            potential_return: self.potential_return,
            created_at: timestamp.clone(),
            updated_at: timestamp,
        }
    }
}

/// Shown while the database is not configured or unreachable
pub fn sample_swing_trades() -> Vec<SwingTrade> {
    fn trade(
        id: &str,
        strategy: Strategy,
        name: &str,
        symbol: &str,
        prices: (f64, Option<f64>, f64, f64, f64),
        status: TradeStatus,
        setup: &str,
        rr: &str,
        timeframe: &str,
        dates: (&str, Option<&str>),
        potential: f64,
        notes: &str,
        stamps: (&str, &str),
    ) -> SwingTrade {
        let (entry, exit, stop, target, current) = prices;
        SwingTrade {
            id: id.to_string(),
            strategy,
            stock_name: name.to_string(),
            stock_symbol: symbol.to_string(),
            entry_price: entry,
            exit_price: exit,
            stop_loss: stop,
            target_price: Some(target),
            current_price: Some(current),
            status,
            setup_description: Some(setup.to_string()),
            risk_reward_ratio: Some(rr.to_string()),
            timeframe: Some(timeframe.to_string()),
            entry_date: dates.0.to_string(),
            exit_date: dates.1.map(str::to_string),
            chart_image_url: None,
            notes: Some(notes.to_string()),
            potential_return: Some(potential),
            created_at: stamps.0.to_string(),
            updated_at: stamps.1.to_string(),
        }
    }

    vec![
        trade(
            "1",
            Strategy::Bit,
            "Reliance Industries",
            "RELIANCE",
            (2450.00, None, 2320.00, 2650.00, 2485.50),
            TradeStatus::Running,
            "Breakout from resistance with volume confirmation",
            "1:2.5",
            "5-10 days",
            ("2025-01-06", None),
            8.16,
            "Strong volume breakout above 2440 resistance level",
            ("2025-01-06T10:00:00Z", "2025-01-06T10:00:00Z"),
        ),
        trade(
            "2",
            Strategy::SwingAngle,
            "HDFC Bank",
            "HDFCBANK",
            (1645.00, Some(1720.00), 1580.00, 1750.00, 1720.00),
            TradeStatus::TradeSuccessful,
            "Swing angle formation with RSI divergence",
            "1:2.2",
            "7-12 days",
            ("2024-12-28", Some("2025-01-05")),
            6.38,
            "Perfect swing angle setup with bullish divergence",
            ("2024-12-28T10:00:00Z", "2025-01-05T16:30:00Z"),
        ),
        trade(
            "3",
            Strategy::BottomFormation,
            "TCS",
            "TCS",
            (3890.00, Some(3750.00), 3750.00, 4200.00, 3825.00),
            TradeStatus::SlHit,
            "Double bottom formation at key support",
            "1:2.8",
            "10-15 days",
            ("2024-12-20", Some("2024-12-30")),
            7.97,
            "False breakout from double bottom pattern",
            ("2024-12-20T10:00:00Z", "2024-12-30T14:20:00Z"),
        ),
    ]
}

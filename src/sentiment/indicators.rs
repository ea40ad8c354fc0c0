use crate::market::BreadthCounts;
use crate::market::SectorData;
use serde::{Deserialize, Serialize};

pub const WEIGHT_NIFTY_TREND: f64 = 25.0;
pub const WEIGHT_VIX_LEVEL: f64 = 20.0;
pub const WEIGHT_FII_ACTIVITY: f64 = 20.0;
pub const WEIGHT_SECTOR_BREADTH: f64 = 15.0;
pub const WEIGHT_MARKET_CAP: f64 = 10.0;
pub const WEIGHT_ADVANCE_DECLINE: f64 = 10.0;

/// A single scored input to the composite
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Indicator {
    pub value: f64,
    pub signal: String,
    pub weight: f64,
}

impl Indicator {
    fn new(value: f64, signal: impl Into<String>, weight: f64) -> Self {
        Self { value, signal: signal.into(), weight }
    }

    pub fn unavailable(weight: f64) -> Self {
        Self::new(0.0, "Data unavailable", weight)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Indicators {
    pub nifty_trend: Indicator,
    pub vix_level: Indicator,
    pub fii_activity: Indicator,
    pub sector_breadth: Indicator,
    pub market_cap: Indicator,
    pub advance_decline: Indicator,
}

impl Indicators {
    pub fn all(&self) -> [&Indicator; 6] {
        [
            &self.nifty_trend,
            &self.vix_level,
            &self.fii_activity,
            &self.sector_breadth,
            &self.market_cap,
            &self.advance_decline,
        ]
    }

    pub fn unavailable() -> Self {
        Self {
            nifty_trend: Indicator::unavailable(WEIGHT_NIFTY_TREND),
            vix_level: Indicator::unavailable(WEIGHT_VIX_LEVEL),
            fii_activity: Indicator::unavailable(WEIGHT_FII_ACTIVITY),
            sector_breadth: Indicator::unavailable(WEIGHT_SECTOR_BREADTH),
            market_cap: Indicator::unavailable(WEIGHT_MARKET_CAP),
            advance_decline: Indicator::unavailable(WEIGHT_ADVANCE_DECLINE),
        }
    }
}

/// Day's Nifty move in percent
pub fn nifty_trend(change_percent: f64) -> Indicator {
    let (value, signal) = if change_percent > 2.0 {
        (80.0, "Strong Bullish - Nifty up >2%")
    } else if change_percent > 1.0 {
        (60.0, "Bullish - Nifty up >1%")
    } else if change_percent > 0.5 {
        (40.0, "Mildly Bullish - Nifty up >0.5%")
    } else if change_percent > 0.0 {
        (20.0, "Slightly Positive - Nifty up marginally")
    } else if change_percent > -0.5 {
        (-20.0, "Slightly Negative - Nifty down marginally")
    } else if change_percent > -1.0 {
        (-40.0, "Mildly Bearish - Nifty down >0.5%")
    } else if change_percent > -2.0 {
        (-60.0, "Bearish - Nifty down >1%")
    } else {
        (-80.0, "Strong Bearish - Nifty down >2%")
    };

    Indicator::new(value, signal, WEIGHT_NIFTY_TREND)
}

/// Lower VIX reads as calmer, more bullish
pub fn vix_level(level: f64) -> Indicator {
    let (value, signal) = if level < 12.0 {
        (60.0, "Low Fear - VIX below 12 (Complacent)")
    } else if level < 15.0 {
        (40.0, "Calm Market - VIX below 15")
    } else if level < 20.0 {
        (0.0, "Normal Volatility - VIX 15-20")
    } else if level < 25.0 {
        (-40.0, "Elevated Fear - VIX 20-25")
    } else if level < 30.0 {
        (-60.0, "High Fear - VIX 25-30")
    } else {
        (-80.0, "Extreme Fear - VIX above 30")
    };

    Indicator::new(value, signal, WEIGHT_VIX_LEVEL)
}

/// Combined FII + DII net flow in crores
pub fn fii_activity(fii_net: f64, dii_net: f64) -> Indicator {
    let net = fii_net + dii_net;
    let amount = net.abs().round();

    let (value, signal) = if net > 3000.0 {
        (80.0, format!("Strong Inflows - ₹{}Cr net buying", amount))
    } else if net > 1500.0 {
        (60.0, format!("Good Inflows - ₹{}Cr net buying", amount))
    } else if net > 500.0 {
        (40.0, format!("Positive Flows - ₹{}Cr net buying", amount))
    } else if net > 0.0 {
        (20.0, format!("Mild Inflows - ₹{}Cr net buying", amount))
    } else if net > -500.0 {
        (-20.0, format!("Mild Outflows - ₹{}Cr net selling", amount))
    } else if net > -1500.0 {
        (-40.0, format!("Negative Flows - ₹{}Cr net selling", amount))
    } else if net > -3000.0 {
        (-60.0, format!("Heavy Selling - ₹{}Cr net selling", amount))
    } else {
        (-80.0, format!("Massive Outflows - ₹{}Cr net selling", amount))
    };

    Indicator::new(value, signal, WEIGHT_FII_ACTIVITY)
}

/// Share of sectors trading green
pub fn sector_breadth(sectors: &[SectorData]) -> Indicator {
    if sectors.is_empty() {
        return Indicator::new(0.0, "No sector data available", WEIGHT_SECTOR_BREADTH);
    }

    let positive = sectors.iter().filter(|s| s.change > 0.0).count();
    let total = sectors.len();
    let percentage = positive as f64 / total as f64 * 100.0;

    let (value, label) = if percentage > 80.0 {
        (80.0, "Broad Rally")
    } else if percentage > 65.0 {
        (60.0, "Strong Breadth")
    } else if percentage > 55.0 {
        (40.0, "Good Breadth")
    } else if percentage > 45.0 {
        (0.0, "Mixed Breadth")
    } else if percentage > 35.0 {
        (-40.0, "Weak Breadth")
    } else if percentage > 20.0 {
        (-60.0, "Poor Breadth")
    } else {
        (-80.0, "Broad Decline")
    };

    Indicator::new(
        value,
        format!("{} - {}/{} sectors positive", label, positive, total),
        WEIGHT_SECTOR_BREADTH,
    )
}

/// Nifty level against its recent historical bands
pub fn market_cap(nifty_level: f64) -> Indicator {
    let (value, signal) = if nifty_level > 25000.0 {
        (60.0, "Near All-Time Highs - Strong momentum")
    } else if nifty_level > 24000.0 {
        (40.0, "Above key resistance - Bullish structure")
    } else if nifty_level > 23000.0 {
        (20.0, "Consolidating - Neutral structure")
    } else if nifty_level > 22000.0 {
        (-20.0, "Below support - Weak structure")
    } else if nifty_level > 21000.0 {
        (-40.0, "Correction mode - Bearish structure")
    } else {
        (-60.0, "Deep correction - Very bearish")
    };

    Indicator::new(value, signal, WEIGHT_MARKET_CAP)
}

/// Screener advancers vs decliners when available, else the mean sector move
pub fn advance_decline(breadth: Option<&BreadthCounts>, sectors: &[SectorData]) -> Indicator {
    if let Some(counts) = breadth.filter(|c| c.total_moving() > 0) {
        let ratio = (counts.advancing as f64 - counts.declining as f64) / counts.total_moving() as f64;
        return Indicator::new(
            80.0 * ratio,
            format!(
                "Advances {} / Declines {} across screened stocks",
                counts.advancing, counts.declining
            ),
            WEIGHT_ADVANCE_DECLINE,
        );
    }

    if sectors.is_empty() {
        return Indicator::new(0.0, "No advance/decline data", WEIGHT_ADVANCE_DECLINE);
    }

    let avg_change = sectors.iter().map(|s| s.change).sum::<f64>() / sectors.len() as f64;
    let value = (avg_change * 40.0).clamp(-80.0, 80.0);

    Indicator::new(
        value,
        format!("Average sector change: {:.2}%", avg_change),
        WEIGHT_ADVANCE_DECLINE,
    )
}

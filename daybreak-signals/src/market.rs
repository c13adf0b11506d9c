//! Global crypto market snapshot from a CoinGecko-compatible endpoint.
//!
//! One number matters here: the 24h change of total market cap, bucketed
//! into a coarse mood the prompt can mention without sounding like a
//! terminal. Callers that cannot reach the endpoint fall back to
//! [`MarketSnapshot::neutral`].

use daybreak_common::{DaybreakError, Result};
use daybreak_http::{HttpClient, HttpError, RequestOpts};
use serde::{Deserialize, Serialize};
use std::fmt;

// Trailing slash matters: paths join onto it.
const MARKET_API_BASE: &str = "https://api.coingecko.com/api/v3/";

#[derive(Debug, Deserialize)]
struct GlobalResponse {
    data: GlobalData,
}

#[derive(Debug, Deserialize)]
struct GlobalData {
    #[serde(default)]
    market_cap_change_percentage_24h_usd: f64,
}

/// Coarse market mood derived from the 24h total market cap change.
///
/// ```
/// use daybreak_signals::MarketSentiment;
///
/// assert_eq!(MarketSentiment::from_change(4.2), MarketSentiment::Bullish);
/// assert_eq!(MarketSentiment::from_change(-1.0).as_phrase(), "slightly down");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MarketSentiment {
    Bullish,
    SlightlyUp,
    SlightlyDown,
    Bearish,
    /// No usable data. Only produced by [`MarketSnapshot::neutral`].
    Neutral,
}

impl MarketSentiment {
    /// Bucket a 24h percentage change: >3 bullish, >0 slightly up,
    /// >-3 slightly down, else bearish.
    pub fn from_change(change_pct: f64) -> Self {
        if change_pct > 3.0 {
            MarketSentiment::Bullish
        } else if change_pct > 0.0 {
            MarketSentiment::SlightlyUp
        } else if change_pct > -3.0 {
            MarketSentiment::SlightlyDown
        } else {
            MarketSentiment::Bearish
        }
    }

    /// Prompt-ready wording.
    pub fn as_phrase(&self) -> &'static str {
        match self {
            MarketSentiment::Bullish => "bullish",
            MarketSentiment::SlightlyUp => "slightly up",
            MarketSentiment::SlightlyDown => "slightly down",
            MarketSentiment::Bearish => "bearish",
            MarketSentiment::Neutral => "neutral",
        }
    }
}

impl fmt::Display for MarketSentiment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_phrase())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MarketSnapshot {
    pub change_24h: f64,
    pub sentiment: MarketSentiment,
}

impl MarketSnapshot {
    /// Sentinel used when the market endpoint is unreachable or garbled.
    pub fn neutral() -> Self {
        Self {
            change_24h: 0.0,
            sentiment: MarketSentiment::Neutral,
        }
    }
}

#[derive(Clone)]
pub struct MarketApi {
    http: HttpClient,
}

impl MarketApi {
    /// `endpoint` overrides the public CoinGecko base, mostly for tests.
    pub fn new(endpoint: Option<&str>) -> Result<Self> {
        let base = endpoint.unwrap_or(MARKET_API_BASE);
        let http = HttpClient::new(base).map_err(http_to_signal)?;
        Ok(Self { http })
    }

    /// Fetch the global market snapshot.
    ///
    /// Single attempt, no retries: this is decorative context for a morning
    /// post, not something worth stalling the run over.
    pub async fn global_snapshot(&self) -> Result<MarketSnapshot> {
        let resp: GlobalResponse = self
            .http
            .get_json(
                "global",
                RequestOpts {
                    retries: Some(0),
                    ..Default::default()
                },
            )
            .await
            .map_err(http_to_signal)?;

        let change = resp.data.market_cap_change_percentage_24h_usd;
        let snapshot = MarketSnapshot {
            change_24h: change,
            sentiment: MarketSentiment::from_change(change),
        };
        tracing::debug!(
            change_pct = snapshot.change_24h,
            vibe = %snapshot.sentiment,
            "market snapshot"
        );
        Ok(snapshot)
    }
}

fn http_to_signal(e: HttpError) -> DaybreakError {
    DaybreakError::Signal(format!("{e}"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn buckets_match_thresholds() {
        assert_eq!(MarketSentiment::from_change(3.1), MarketSentiment::Bullish);
        assert_eq!(
            MarketSentiment::from_change(3.0),
            MarketSentiment::SlightlyUp
        );
        assert_eq!(
            MarketSentiment::from_change(0.5),
            MarketSentiment::SlightlyUp
        );
        assert_eq!(
            MarketSentiment::from_change(0.0),
            MarketSentiment::SlightlyDown
        );
        assert_eq!(
            MarketSentiment::from_change(-2.9),
            MarketSentiment::SlightlyDown
        );
        assert_eq!(MarketSentiment::from_change(-3.0), MarketSentiment::Bearish);
        assert_eq!(
            MarketSentiment::from_change(-12.0),
            MarketSentiment::Bearish
        );
    }

    #[test]
    fn neutral_snapshot_is_flat() {
        let s = MarketSnapshot::neutral();
        assert_eq!(s.change_24h, 0.0);
        assert_eq!(s.sentiment, MarketSentiment::Neutral);
        assert_eq!(s.sentiment.to_string(), "neutral");
    }
}

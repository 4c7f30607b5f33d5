use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Market classification of a token, as reported by the signals endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TokenCategory {
    #[serde(rename = "major coin")]
    MajorCoin,
    #[serde(rename = "memecoin")]
    Memecoin,
}

impl std::fmt::Display for TokenCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TokenCategory::MajorCoin => write!(f, "major coin"),
            TokenCategory::Memecoin => write!(f, "memecoin"),
        }
    }
}

/// Ranking direction for the top-signals view.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    Gainers,
    Losers,
}

impl std::fmt::Display for Direction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Direction::Gainers => write!(f, "gainers"),
            Direction::Losers => write!(f, "losers"),
        }
    }
}

/// Alert severity levels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Info,
    Warning,
    Critical,
}

impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Severity::Info => write!(f, "info"),
            Severity::Warning => write!(f, "warning"),
            Severity::Critical => write!(f, "critical"),
        }
    }
}

/// A snapshot of momentum and social metrics for one token.
///
/// `symbol` is always non-empty and uppercase; the decoder rejects records
/// where no symbol can be resolved. Metrics the server omits default to 0.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TokenSignal {
    pub symbol: String,
    pub category: TokenCategory,
    /// 6-hour return percentage, the primary ranking metric.
    pub momentum_6h: f64,
    /// Market volume change over 6 hours, percent.
    pub liquidity_6h: f64,
    /// Social volume change over 6 hours, percent.
    pub buzz_6h: f64,
    /// AltRank change over 6 hours (negated so that positive = improvement).
    pub rank_improvement_6h: f64,
    /// Galaxy composite score change over 6 hours.
    pub galaxy_change_6h: f64,
    /// Sentiment change over 6 hours, percent.
    pub sentiment_6h: f64,
    /// Realized return over the last 6 hours, percent.
    pub realized_return_6h: f64,
    /// Active social contributors change over 6 hours, percent.
    pub contributors_6h: f64,
    pub captured_at: DateTime<Utc>,
}

/// Links to a token's social presence.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SocialLinks {
    pub twitter: Option<String>,
    pub telegram: Option<String>,
    pub discord: Option<String>,
}

/// Detail view of a token: the signal snapshot plus descriptive fields.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TokenDetail {
    #[serde(flatten)]
    pub signal: TokenSignal,
    pub description: String,
    pub website: Option<String>,
    pub social_links: SocialLinks,
}

impl TokenDetail {
    /// Build a detail view from a cached signal. The signals endpoint does
    /// not carry descriptive fields, so the description is synthesized.
    pub fn from_signal(signal: &TokenSignal) -> Self {
        let trend = if signal.momentum_6h > 0.0 {
            "positive"
        } else {
            "negative"
        };
        let description = format!(
            "{} is a {} with {} momentum signals.",
            signal.symbol, signal.category, trend
        );
        Self {
            signal: signal.clone(),
            description,
            website: None,
            social_links: SocialLinks::default(),
        }
    }
}

/// One point of a token's 6-hour signal history.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TokenSignalTick {
    pub symbol: String,
    pub timestamp: DateTime<Utc>,
    pub momentum_6h: f64,
    pub liquidity_6h: f64,
    pub buzz_6h: f64,
    pub rank_improvement_6h: f64,
    pub galaxy_change_6h: f64,
    pub sentiment_6h: f64,
    pub realized_return_6h: f64,
    pub contributors_6h: f64,
    /// Set during alert evaluation, never by the decoder.
    pub threshold_breached: bool,
}

/// A user's token alert subscription.
///
/// Records are immutable after creation: unsubscribe removes, a threshold
/// change removes and recreates.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TokenSubscription {
    pub id: String,
    pub fid: u64,
    pub token: String,
    /// Alert threshold, percent.
    pub threshold: f64,
    pub created_at: DateTime<Utc>,
}

impl TokenSubscription {
    /// Create a subscription record. The token symbol is normalized to
    /// uppercase and the id is derived from owner, token, and creation time.
    pub fn new(fid: u64, token: &str, threshold: f64) -> Self {
        let created_at = Utc::now();
        let token = token.trim().to_uppercase();
        let id = format!("{}-{}-{}", fid, token, created_at.timestamp_millis());
        Self {
            id,
            fid,
            token,
            threshold,
            created_at,
        }
    }
}

/// One of the secondary metrics, ranked by how much it drives the signal.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DriverContribution {
    pub name: String,
    pub value: f64,
    pub description: String,
}

/// Human-readable alert rendered from a breaching tick.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AlertPayload {
    /// Short title (e.g., "Threshold breach: BTC")
    pub title: String,
    /// Detailed body message
    pub body: String,
    /// Alert severity
    pub severity: Severity,
}

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// One near-Earth object close approach, flattened out of the feed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AsteroidRecord {
    /// Close-approach date (the feed's per-day key)
    pub date: NaiveDate,
    /// Feed designation, e.g. "(2025 QA1)"
    pub name: String,
    /// Maximum estimated diameter in meters
    pub diameter_m: f64,
    /// Feed "potentially hazardous" flag
    pub hazardous: bool,
}

/// Inclusive calendar range sent to the feed.
///
/// Ordering is not enforced: a reversed range is passed through as-is and
/// the upstream decides what to do with it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateRange {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl DateRange {
    /// Longest span the feed historically accepts, in days.
    pub const FEED_MAX_SPAN_DAYS: i64 = 7;

    pub fn new(start: NaiveDate, end: NaiveDate) -> Self {
        Self { start, end }
    }

    /// Number of days between start and end. Negative when reversed.
    pub fn span_days(&self) -> i64 {
        self.end.signed_duration_since(self.start).num_days()
    }

    pub fn is_reversed(&self) -> bool {
        self.start > self.end
    }

    pub fn exceeds_feed_span(&self) -> bool {
        self.span_days() > Self::FEED_MAX_SPAN_DAYS
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        self.start <= date && date <= self.end
    }
}

impl std::fmt::Display for DateRange {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}..={}", self.start, self.end)
    }
}

/// Language of the user-facing text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum Locale {
    #[default]
    #[serde(rename = "en")]
    En,
    #[serde(rename = "fr")]
    Fr,
}

impl Locale {
    pub fn as_str(&self) -> &'static str {
        match self {
            Locale::En => "en",
            Locale::Fr => "fr",
        }
    }
}

impl std::fmt::Display for Locale {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for Locale {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "en" | "english" => Ok(Locale::En),
            "fr" | "french" | "francais" | "français" => Ok(Locale::Fr),
            _ => Err(format!("Unknown locale: {}", s)),
        }
    }
}

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Sentiment label for a classified review.
///
/// Closed two-value set. Nothing else is ever persisted, so
/// `positive + negative == total` holds for every aggregate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum Sentiment {
    Positive,
    Negative,
}

impl Sentiment {
    pub fn as_str(&self) -> &'static str {
        match self {
            Sentiment::Positive => "positive",
            Sentiment::Negative => "negative",
        }
    }

    /// Parses a label, case-insensitively. Anything outside the two
    /// recognized values is rejected.
    pub fn parse(label: &str) -> Option<Sentiment> {
        match label.to_ascii_lowercase().as_str() {
            "positive" => Some(Sentiment::Positive),
            "negative" => Some(Sentiment::Negative),
            _ => None,
        }
    }
}

/// Catalog entry. Seeded at startup, never mutated by this service.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct Movie {
    pub id: String,
    pub title: String,
    pub year: i32,
    pub poster_url: Option<String>,
}

/// A persisted, classified review. Append-only: never updated or deleted.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct Review {
    pub id: i64,
    pub movie_id: String,
    pub text: String,
    pub sentiment: Sentiment,
    pub confidence: f64,
    pub created_at: DateTime<Utc>,
}

/// Result of one classifier call. Transient, never persisted on its own.
#[derive(Debug, Clone)]
pub struct Classification {
    pub sentiment: Sentiment,
    pub confidence: f64,
    pub model: String,
}

/// Grouped aggregation over all reviews of one movie.
#[derive(Debug, Clone, Copy, Default)]
pub struct ReviewAggregate {
    pub total: i64,
    pub positive: i64,
    pub negative: i64,
    /// Arithmetic mean of confidence, 0 when the movie has no reviews.
    pub avg_confidence: f64,
}

/// One calendar day of the sentiment trend. Days without reviews are
/// omitted from the series, not zero-filled.
#[derive(Debug, Clone, Copy)]
pub struct TrendBucket {
    pub date: NaiveDate,
    pub positive: i64,
    pub negative: i64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sentiment_parse_accepts_both_labels_case_insensitively() {
        assert_eq!(Sentiment::parse("positive"), Some(Sentiment::Positive));
        assert_eq!(Sentiment::parse("NEGATIVE"), Some(Sentiment::Negative));
        assert_eq!(Sentiment::parse("Positive"), Some(Sentiment::Positive));
    }

    #[test]
    fn sentiment_parse_rejects_anything_else() {
        assert_eq!(Sentiment::parse("neutral"), None);
        assert_eq!(Sentiment::parse(""), None);
        assert_eq!(Sentiment::parse("pos"), None);
    }

    #[test]
    fn sentiment_serializes_lowercase() {
        assert_eq!(
            serde_json::to_string(&Sentiment::Positive).unwrap(),
            "\"positive\""
        );
    }
}

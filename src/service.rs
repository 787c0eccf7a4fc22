//! Orchestration layer: validation, classification, persistence, and
//! statistics assembly. Every operation is single-shot request/response;
//! no cross-request state lives here.

use std::sync::Arc;

use crate::classifier::SentimentClassifier;
use crate::error::{ApiError, ApiResult};
use crate::models::{Movie, Review, Sentiment, TrendBucket};
use crate::sanitize::{sanitize, truncate_chars, MAX_REVIEW_CHARS};
use crate::store::{ReviewStore, RECENT_REVIEWS_LIMIT, TREND_WINDOW_DAYS};

pub struct ReviewService {
    store: Arc<dyn ReviewStore>,
    classifier: Arc<dyn SentimentClassifier>,
}

/// Classification of one piece of raw text. `text` echoes what the user
/// typed, not the sanitized form the classifier saw.
#[derive(Debug, Clone)]
pub struct AnalyzedText {
    pub text: String,
    pub sentiment: Sentiment,
    pub confidence: f64,
    pub model: String,
}

/// Aggregate view over one movie's reviews, recomputed on every request.
#[derive(Debug, Clone)]
pub struct MovieStatistics {
    pub movie: Movie,
    pub total_reviews: i64,
    pub positive_count: i64,
    pub negative_count: i64,
    /// `(positive / total) * 100`, one decimal. `"0.0"` when there are no
    /// reviews, never NaN.
    pub positive_percentage: String,
    /// Mean confidence across all reviews, three decimals.
    pub average_confidence: String,
    pub recent_reviews: Vec<Review>,
    pub trend: Vec<TrendBucket>,
}

impl ReviewService {
    pub fn new(store: Arc<dyn ReviewStore>, classifier: Arc<dyn SentimentClassifier>) -> Self {
        Self { store, classifier }
    }

    /// Sanitizes and classifies raw review text.
    pub async fn analyze(&self, raw_text: &str) -> ApiResult<AnalyzedText> {
        if raw_text.trim().is_empty() {
            return Err(ApiError::InvalidInput("Review text is required".into()));
        }

        let cleaned = sanitize(raw_text);
        let classification = self.classifier.classify(&cleaned).await?;

        Ok(AnalyzedText {
            text: raw_text.to_string(),
            sentiment: classification.sentiment,
            confidence: classification.confidence,
            model: classification.model,
        })
    }

    /// Persists a classified review. The catalog pre-check owns the
    /// referential invariant; the storage FK is only a backstop.
    pub async fn save_review(
        &self,
        movie_id: &str,
        text: &str,
        sentiment: Sentiment,
        confidence: f64,
    ) -> ApiResult<i64> {
        if movie_id.trim().is_empty() {
            return Err(ApiError::InvalidInput("movieId is required".into()));
        }
        if text.trim().is_empty() {
            return Err(ApiError::InvalidInput("Review text is required".into()));
        }
        if !(0.0..=1.0).contains(&confidence) {
            return Err(ApiError::InvalidInput(
                "confidence must be between 0 and 1".into(),
            ));
        }

        self.store
            .find_movie(movie_id)
            .await?
            .ok_or_else(|| ApiError::NotFound(format!("Movie {movie_id} not found")))?;

        // The client is expected to submit already-sanitized text; the
        // length cap is re-enforced at this boundary regardless.
        let text = truncate_chars(text, MAX_REVIEW_CHARS);

        let review_id = self
            .store
            .insert_review(movie_id, &text, sentiment, confidence)
            .await?;

        tracing::info!(movie_id, review_id, sentiment = sentiment.as_str(), "review saved");
        Ok(review_id)
    }

    /// Assembles the statistics view for one movie.
    ///
    /// The aggregate, recent-list, and trend reads are three independent
    /// queries, not one snapshot: a review inserted between them can skew
    /// the view. Accepted tradeoff for a low-write analytics endpoint.
    pub async fn get_stats(&self, movie_id: &str) -> ApiResult<MovieStatistics> {
        let movie = self
            .store
            .find_movie(movie_id)
            .await?
            .ok_or_else(|| ApiError::NotFound(format!("Movie {movie_id} not found")))?;

        let agg = self.store.aggregate_stats(movie_id).await?;
        let recent_reviews = self.store.recent_reviews(movie_id, RECENT_REVIEWS_LIMIT).await?;
        let trend = self.store.trend(movie_id, TREND_WINDOW_DAYS).await?;

        Ok(MovieStatistics {
            movie,
            total_reviews: agg.total,
            positive_count: agg.positive,
            negative_count: agg.negative,
            positive_percentage: format_percentage(agg.positive, agg.total),
            average_confidence: format!("{:.3}", agg.avg_confidence),
            recent_reviews,
            trend,
        })
    }

    /// Catalog search. A blank query is treated as no query (full listing).
    pub async fn search_movies(&self, query: Option<&str>) -> ApiResult<Vec<Movie>> {
        let query = query.map(str::trim).filter(|q| !q.is_empty());
        self.store.search_movies(query).await
    }
}

fn format_percentage(positive: i64, total: i64) -> String {
    if total == 0 {
        return "0.0".to_string();
    }
    format!("{:.1}", positive as f64 / total as f64 * 100.0)
}

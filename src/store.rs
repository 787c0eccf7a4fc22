//! Storage boundary for the movie catalog and the review log.
//!
//! The trait keeps the storage capability interchangeable (the referential
//! invariant between reviews and movies is owned by the service layer, not
//! assumed from the engine). The Postgres implementation is deliberately
//! thin: parameterized queries, no re-validation, no business rules.

use async_trait::async_trait;
use sqlx::{postgres::PgPool, Row};

use crate::error::{ApiError, ApiResult};
use crate::models::{Movie, Review, ReviewAggregate, Sentiment, TrendBucket};

/// How many recent reviews a statistics response carries.
pub const RECENT_REVIEWS_LIMIT: i64 = 10;
/// Trailing window of the daily trend series, in days.
pub const TREND_WINDOW_DAYS: i32 = 30;
/// Catalog page size when no search query is given.
pub const CATALOG_LIST_LIMIT: i64 = 50;
/// Result cap for title substring search.
pub const SEARCH_RESULT_LIMIT: i64 = 20;

#[async_trait]
pub trait ReviewStore: Send + Sync {
    async fn find_movie(&self, id: &str) -> ApiResult<Option<Movie>>;

    /// Title listing: no query returns up to [`CATALOG_LIST_LIMIT`] entries,
    /// a query returns up to [`SEARCH_RESULT_LIMIT`] case-insensitive
    /// substring matches. Ordered by title either way.
    async fn search_movies(&self, query: Option<&str>) -> ApiResult<Vec<Movie>>;

    /// Single-row append. Ids are storage-assigned in insertion order.
    async fn insert_review(
        &self,
        movie_id: &str,
        text: &str,
        sentiment: Sentiment,
        confidence: f64,
    ) -> ApiResult<i64>;

    /// One grouped aggregation over all reviews of the movie.
    async fn aggregate_stats(&self, movie_id: &str) -> ApiResult<ReviewAggregate>;

    /// Newest first, ties broken by id (insertion order).
    async fn recent_reviews(&self, movie_id: &str, limit: i64) -> ApiResult<Vec<Review>>;

    /// Per-calendar-day counts over the trailing window, date descending.
    /// Days with no reviews are omitted, not zero-filled.
    async fn trend(&self, movie_id: &str, window_days: i32) -> ApiResult<Vec<TrendBucket>>;
}

pub struct PgReviewStore {
    pool: PgPool,
}

impl PgReviewStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ReviewStore for PgReviewStore {
    async fn find_movie(&self, id: &str) -> ApiResult<Option<Movie>> {
        let row = sqlx::query("SELECT id, title, year, poster_url FROM movies WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        row.map(|r| movie_from_row(&r)).transpose()
    }

    async fn search_movies(&self, query: Option<&str>) -> ApiResult<Vec<Movie>> {
        let rows = match query {
            Some(q) => {
                sqlx::query(
                    "SELECT id, title, year, poster_url FROM movies \
                     WHERE title ILIKE $1 ORDER BY title LIMIT $2",
                )
                .bind(format!("%{q}%"))
                .bind(SEARCH_RESULT_LIMIT)
                .fetch_all(&self.pool)
                .await?
            }
            None => {
                sqlx::query("SELECT id, title, year, poster_url FROM movies ORDER BY title LIMIT $1")
                    .bind(CATALOG_LIST_LIMIT)
                    .fetch_all(&self.pool)
                    .await?
            }
        };

        rows.iter().map(movie_from_row).collect()
    }

    async fn insert_review(
        &self,
        movie_id: &str,
        text: &str,
        sentiment: Sentiment,
        confidence: f64,
    ) -> ApiResult<i64> {
        let result = sqlx::query(
            "INSERT INTO reviews (movie_id, review_text, sentiment, confidence) \
             VALUES ($1, $2, $3, $4) RETURNING id",
        )
        .bind(movie_id)
        .bind(text)
        .bind(sentiment.as_str())
        .bind(confidence)
        .fetch_one(&self.pool)
        .await;

        match result {
            Ok(row) => Ok(row.try_get("id")?),
            Err(err) => Err(map_insert_error(err, movie_id)),
        }
    }

    async fn aggregate_stats(&self, movie_id: &str) -> ApiResult<ReviewAggregate> {
        let row = sqlx::query(
            r#"
            SELECT COUNT(*) AS total,
                   COUNT(*) FILTER (WHERE sentiment = 'positive') AS positive,
                   COUNT(*) FILTER (WHERE sentiment = 'negative') AS negative,
                   COALESCE(AVG(confidence), 0) AS avg_confidence
            FROM reviews
            WHERE movie_id = $1
            "#,
        )
        .bind(movie_id)
        .fetch_one(&self.pool)
        .await?;

        Ok(ReviewAggregate {
            total: row.try_get("total")?,
            positive: row.try_get("positive")?,
            negative: row.try_get("negative")?,
            avg_confidence: row.try_get("avg_confidence")?,
        })
    }

    async fn recent_reviews(&self, movie_id: &str, limit: i64) -> ApiResult<Vec<Review>> {
        let rows = sqlx::query(
            "SELECT id, movie_id, review_text, sentiment, confidence, created_at \
             FROM reviews WHERE movie_id = $1 \
             ORDER BY created_at DESC, id DESC LIMIT $2",
        )
        .bind(movie_id)
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;

        rows.iter().map(review_from_row).collect()
    }

    async fn trend(&self, movie_id: &str, window_days: i32) -> ApiResult<Vec<TrendBucket>> {
        let rows = sqlx::query(
            r#"
            SELECT created_at::date AS day,
                   COUNT(*) FILTER (WHERE sentiment = 'positive') AS positive,
                   COUNT(*) FILTER (WHERE sentiment = 'negative') AS negative
            FROM reviews
            WHERE movie_id = $1
              AND created_at >= NOW() - make_interval(days => $2)
            GROUP BY day
            ORDER BY day DESC
            "#,
        )
        .bind(movie_id)
        .bind(window_days)
        .fetch_all(&self.pool)
        .await?;

        rows.iter()
            .map(|row| {
                Ok(TrendBucket {
                    date: row.try_get("day")?,
                    positive: row.try_get("positive")?,
                    negative: row.try_get("negative")?,
                })
            })
            .collect()
    }
}

fn movie_from_row(row: &sqlx::postgres::PgRow) -> ApiResult<Movie> {
    Ok(Movie {
        id: row.try_get("id")?,
        title: row.try_get("title")?,
        year: row.try_get("year")?,
        poster_url: row.try_get("poster_url")?,
    })
}

fn review_from_row(row: &sqlx::postgres::PgRow) -> ApiResult<Review> {
    let label: String = row.try_get("sentiment")?;
    let sentiment = Sentiment::parse(&label).ok_or_else(|| {
        ApiError::Storage(sqlx::Error::Decode(
            format!("unexpected sentiment value in storage: {label}").into(),
        ))
    })?;

    Ok(Review {
        id: row.try_get("id")?,
        movie_id: row.try_get("movie_id")?,
        text: row.try_get("review_text")?,
        sentiment,
        confidence: row.try_get("confidence")?,
        created_at: row.try_get("created_at")?,
    })
}

/// PostgreSQL FK violation (error code 23503) means the movie pre-check was
/// bypassed or the row vanished between check and insert.
fn map_insert_error(err: sqlx::Error, movie_id: &str) -> ApiError {
    if let sqlx::Error::Database(ref db_err) = err {
        if db_err.code().as_deref() == Some("23503") {
            return ApiError::ForeignKeyViolation(format!("movie {movie_id} does not exist"));
        }
    }
    ApiError::Storage(err)
}

/// In-memory [`ReviewStore`] for unit tests. Mirrors the Postgres contract,
/// including the FK guard on insert.
#[cfg(test)]
pub mod memory {
    use std::collections::BTreeMap;
    use std::sync::Mutex;

    use chrono::{DateTime, Duration, Utc};

    use super::*;

    pub struct MemoryStore {
        movies: Vec<Movie>,
        reviews: Mutex<Vec<Review>>,
        next_id: Mutex<i64>,
    }

    impl MemoryStore {
        pub fn with_catalog(movies: Vec<Movie>) -> Self {
            Self {
                movies,
                reviews: Mutex::new(Vec::new()),
                next_id: Mutex::new(1),
            }
        }

        /// A small catalog including the movies the scenarios reference.
        pub fn seeded() -> Self {
            let movie = |id: &str, title: &str, year: i32| Movie {
                id: id.into(),
                title: title.into(),
                year,
                poster_url: None,
            };
            Self::with_catalog(vec![
                movie("tt0111161", "The Shawshank Redemption", 1994),
                movie("tt0068646", "The Godfather", 1972),
                movie("tt0133093", "The Matrix", 1999),
            ])
        }

        /// Test-only backdoor: append a review with an explicit timestamp,
        /// for exercising trend bucketing and recency ordering.
        pub fn push_review_at(
            &self,
            movie_id: &str,
            text: &str,
            sentiment: Sentiment,
            confidence: f64,
            created_at: DateTime<Utc>,
        ) -> i64 {
            let mut next_id = self.next_id.lock().unwrap();
            let id = *next_id;
            *next_id += 1;
            self.reviews.lock().unwrap().push(Review {
                id,
                movie_id: movie_id.into(),
                text: text.into(),
                sentiment,
                confidence,
                created_at,
            });
            id
        }
    }

    #[async_trait]
    impl ReviewStore for MemoryStore {
        async fn find_movie(&self, id: &str) -> ApiResult<Option<Movie>> {
            Ok(self.movies.iter().find(|m| m.id == id).cloned())
        }

        async fn search_movies(&self, query: Option<&str>) -> ApiResult<Vec<Movie>> {
            let (limit, mut matches): (usize, Vec<Movie>) = match query {
                Some(q) => {
                    let needle = q.to_lowercase();
                    (
                        SEARCH_RESULT_LIMIT as usize,
                        self.movies
                            .iter()
                            .filter(|m| m.title.to_lowercase().contains(&needle))
                            .cloned()
                            .collect(),
                    )
                }
                None => (CATALOG_LIST_LIMIT as usize, self.movies.clone()),
            };
            matches.sort_by(|a, b| a.title.cmp(&b.title));
            matches.truncate(limit);
            Ok(matches)
        }

        async fn insert_review(
            &self,
            movie_id: &str,
            text: &str,
            sentiment: Sentiment,
            confidence: f64,
        ) -> ApiResult<i64> {
            if !self.movies.iter().any(|m| m.id == movie_id) {
                return Err(ApiError::ForeignKeyViolation(format!(
                    "movie {movie_id} does not exist"
                )));
            }
            Ok(self.push_review_at(movie_id, text, sentiment, confidence, Utc::now()))
        }

        async fn aggregate_stats(&self, movie_id: &str) -> ApiResult<ReviewAggregate> {
            let reviews = self.reviews.lock().unwrap();
            let mut agg = ReviewAggregate::default();
            let mut confidence_sum = 0.0;
            for review in reviews.iter().filter(|r| r.movie_id == movie_id) {
                agg.total += 1;
                match review.sentiment {
                    Sentiment::Positive => agg.positive += 1,
                    Sentiment::Negative => agg.negative += 1,
                }
                confidence_sum += review.confidence;
            }
            if agg.total > 0 {
                agg.avg_confidence = confidence_sum / agg.total as f64;
            }
            Ok(agg)
        }

        async fn recent_reviews(&self, movie_id: &str, limit: i64) -> ApiResult<Vec<Review>> {
            let reviews = self.reviews.lock().unwrap();
            let mut matches: Vec<Review> = reviews
                .iter()
                .filter(|r| r.movie_id == movie_id)
                .cloned()
                .collect();
            matches.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));
            matches.truncate(limit as usize);
            Ok(matches)
        }

        async fn trend(&self, movie_id: &str, window_days: i32) -> ApiResult<Vec<TrendBucket>> {
            let cutoff = Utc::now() - Duration::days(window_days as i64);
            let reviews = self.reviews.lock().unwrap();

            let mut buckets: BTreeMap<chrono::NaiveDate, (i64, i64)> = BTreeMap::new();
            for review in reviews
                .iter()
                .filter(|r| r.movie_id == movie_id && r.created_at >= cutoff)
            {
                let entry = buckets.entry(review.created_at.date_naive()).or_default();
                match review.sentiment {
                    Sentiment::Positive => entry.0 += 1,
                    Sentiment::Negative => entry.1 += 1,
                }
            }

            Ok(buckets
                .into_iter()
                .rev()
                .map(|(date, (positive, negative))| TrendBucket {
                    date,
                    positive,
                    negative,
                })
                .collect())
        }
    }
}

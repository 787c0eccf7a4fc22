use anyhow::Result;
use sqlx::postgres::PgPool;

/// Fixed catalog, keyed by external media-database ids. The catalog is owned
/// by the seeding process, not by the API; the service never mutates it.
const SEED_MOVIES: &[(&str, &str, i32)] = &[
    ("tt0111161", "The Shawshank Redemption", 1994),
    ("tt0068646", "The Godfather", 1972),
    ("tt0468569", "The Dark Knight", 2008),
    ("tt0071562", "The Godfather Part II", 1974),
    ("tt0050083", "12 Angry Men", 1957),
    ("tt0108052", "Schindler's List", 1993),
    ("tt0167260", "The Lord of the Rings: The Return of the King", 2003),
    ("tt0110912", "Pulp Fiction", 1994),
    ("tt0120737", "The Lord of the Rings: The Fellowship of the Ring", 2001),
    ("tt0060196", "The Good, the Bad and the Ugly", 1966),
    ("tt0109830", "Forrest Gump", 1994),
    ("tt0137523", "Fight Club", 1999),
    ("tt1375666", "Inception", 2010),
    ("tt0133093", "The Matrix", 1999),
    ("tt0099685", "Goodfellas", 1990),
    ("tt0076759", "Star Wars", 1977),
    ("tt0102926", "The Silence of the Lambs", 1991),
    ("tt0114369", "Se7en", 1995),
    ("tt0816692", "Interstellar", 2014),
    ("tt0245429", "Spirited Away", 2001),
];

pub async fn init_db(pool: &PgPool) -> Result<()> {
    // 1. Catalog table
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS movies (
            id VARCHAR PRIMARY KEY,
            title VARCHAR NOT NULL,
            year INTEGER NOT NULL,
            poster_url TEXT
        );
        "#,
    )
    .execute(pool)
    .await?;

    // 2. Append-only review log. The FK is a second line of defense; the
    //    service pre-checks the movie before every insert.
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS reviews (
            id BIGSERIAL PRIMARY KEY,
            movie_id VARCHAR NOT NULL REFERENCES movies(id),
            review_text TEXT NOT NULL,
            sentiment VARCHAR NOT NULL,
            confidence DOUBLE PRECISION NOT NULL,
            created_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
        );
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        "CREATE INDEX IF NOT EXISTS idx_reviews_movie_created ON reviews (movie_id, created_at DESC);",
    )
    .execute(pool)
    .await?;

    // 3. Seed the catalog, idempotently
    for (id, title, year) in SEED_MOVIES {
        sqlx::query("INSERT INTO movies (id, title, year) VALUES ($1, $2, $3) ON CONFLICT (id) DO NOTHING")
            .bind(id)
            .bind(title)
            .bind(year)
            .execute(pool)
            .await?;
    }

    Ok(())
}

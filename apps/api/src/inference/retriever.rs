//! Similarity-based context retrieval over the company/news store.
//!
//! Expected schema (seeded by an external loader):
//!   company(id serial, name text unique, data jsonb,
//!           summary_text text, embedding vector(1536))
//!   company_news(id, company_id references company(id),
//!                title text, news_date date, embedding vector(1536))
//!
//! Both queries order by pgvector cosine distance (`<=>`) to the query
//! embedding. The two queries run without a shared transaction; a result set
//! may be inconsistent with a concurrent seed write, which is accepted
//! staleness.

use async_trait::async_trait;
use chrono::{Days, Utc};
use pgvector::Vector;
use sqlx::PgPool;
use tracing::debug;

use crate::embed_cache::EmbedCache;
use crate::errors::AppError;

const SUMMARY_LIMIT: i64 = 5;
const NEWS_LIMIT: i64 = 10;
/// News older than this is not offered as context.
const NEWS_RECENCY_DAYS: u64 = 180;

/// Retrieval seam, object-safe so the pipeline can be tested with fakes.
#[async_trait]
pub trait ContextSource: Send + Sync {
    /// Returns context snippets for the candidate, most similar first.
    /// An empty list is a valid outcome, never an error.
    async fn retrieve(
        &self,
        text: &str,
        company_names: &[String],
    ) -> Result<Vec<String>, AppError>;
}

pub struct PgContextRetriever {
    pool: PgPool,
    cache: EmbedCache,
}

impl PgContextRetriever {
    pub fn new(pool: PgPool, cache: EmbedCache) -> Self {
        Self { pool, cache }
    }
}

#[async_trait]
impl ContextSource for PgContextRetriever {
    async fn retrieve(
        &self,
        text: &str,
        company_names: &[String],
    ) -> Result<Vec<String>, AppError> {
        let embedding = self.cache.get_embedding(text).await?;
        let query_vector = Vector::from(embedding);

        let summaries: Vec<Option<String>> = sqlx::query_scalar(
            r#"
            SELECT summary_text
            FROM company
            WHERE embedding IS NOT NULL
              AND name = ANY($1)
            ORDER BY embedding <=> $2
            LIMIT $3
            "#,
        )
        .bind(company_names)
        .bind(query_vector.clone())
        .bind(SUMMARY_LIMIT)
        .fetch_all(&self.pool)
        .await?;

        let cutoff = Utc::now().date_naive() - Days::new(NEWS_RECENCY_DAYS);
        let news_titles: Vec<String> = sqlx::query_scalar(
            r#"
            SELECT title
            FROM company_news
            WHERE company_id IN (
                SELECT id FROM company WHERE name = ANY($1)
            )
              AND news_date >= $2
            ORDER BY embedding <=> $3
            LIMIT $4
            "#,
        )
        .bind(company_names)
        .bind(cutoff)
        .bind(query_vector)
        .bind(NEWS_LIMIT)
        .fetch_all(&self.pool)
        .await?;

        let summaries: Vec<String> = summaries.into_iter().flatten().collect();
        debug!(
            "retrieved {} summaries, {} news titles for {} companies",
            summaries.len(),
            news_titles.len(),
            company_names.len()
        );

        Ok(merge_ranked(summaries, news_titles))
    }
}

/// Summaries first, then news titles; each sub-list keeps its internal
/// (distance-ascending) order.
fn merge_ranked(summaries: Vec<String>, news_titles: Vec<String>) -> Vec<String> {
    summaries.into_iter().chain(news_titles).collect()
}

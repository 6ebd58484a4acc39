//! Embedding backends and vector utilities.
//!
//! [`Embedder`] is the seam the screening pipeline depends on. [`OpenAiEmbedder`] is the
//! production backend; tests plug in deterministic fakes. The job description is embedded
//! once and held in memory, so there is no vector store here.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, warn};

use crate::llm_client::api_error_message;

/// Embedding model used for both job descriptions and resumes.
pub const EMBEDDING_MODEL: &str = "text-embedding-ada-002";
const MAX_RETRIES: u32 = 3;
const REQUEST_TIMEOUT_SECS: u64 = 60;
const BACKOFF_BASE: Duration = Duration::from_secs(1);

#[derive(Debug, Error)]
pub enum EmbeddingError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("API error (status {status}): {message}")]
    Api { status: u16, message: String },

    #[error("Expected {expected} embeddings, got {actual}")]
    CountMismatch { expected: usize, actual: usize },

    #[error("Embedding at position {position} has index {index}")]
    IndexMismatch { position: usize, index: usize },

    #[error("Vector dimensions differ: {left} vs {right}")]
    DimensionMismatch { left: usize, right: usize },

    #[error("Embedding request failed after {retries} retries")]
    Exhausted { retries: u32 },
}

/// A backend that turns text into dense vectors.
#[async_trait]
pub trait Embedder: Send + Sync {
    fn model_name(&self) -> &str;

    /// Embeds a batch of texts; output order matches input order.
    async fn embed_documents(&self, texts: &[String]) -> Result<Vec<Vec<f32>>, EmbeddingError>;

    async fn embed_query(&self, text: &str) -> Result<Vec<f32>, EmbeddingError> {
        let mut vectors = self.embed_documents(&[text.to_string()]).await?;
        if vectors.len() != 1 {
            return Err(EmbeddingError::CountMismatch {
                expected: 1,
                actual: vectors.len(),
            });
        }
        Ok(vectors.remove(0))
    }
}

// ============ OpenAI ============

#[derive(Debug, Serialize)]
struct EmbeddingRequest<'a> {
    model: &'a str,
    input: &'a [String],
}

#[derive(Debug, Deserialize)]
struct EmbeddingResponse {
    data: Vec<EmbeddingDatum>,
}

#[derive(Debug, Deserialize)]
struct EmbeddingDatum {
    index: usize,
    embedding: Vec<f32>,
}

/// Calls `POST {base}/embeddings` with retry and backoff.
///
/// - HTTP 429 or 5xx → retry
/// - other 4xx → fail immediately
/// - network error → retry
#[derive(Clone)]
pub struct OpenAiEmbedder {
    client: Client,
    api_key: String,
    base_url: String,
    backoff_base: Duration,
}

impl OpenAiEmbedder {
    pub fn new(api_key: String, base_url: String) -> Result<Self, EmbeddingError> {
        Ok(Self {
            client: Client::builder()
                .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
                .build()?,
            api_key,
            base_url,
            backoff_base: BACKOFF_BASE,
        })
    }

    #[cfg(test)]
    pub fn with_backoff_base(mut self, backoff_base: Duration) -> Self {
        self.backoff_base = backoff_base;
        self
    }
}

#[async_trait]
impl Embedder for OpenAiEmbedder {
    fn model_name(&self) -> &str {
        EMBEDDING_MODEL
    }

    async fn embed_documents(&self, texts: &[String]) -> Result<Vec<Vec<f32>>, EmbeddingError> {
        if texts.is_empty() {
            return Ok(Vec::new());
        }

        let body = EmbeddingRequest {
            model: EMBEDDING_MODEL,
            input: texts,
        };
        let url = format!("{}/embeddings", self.base_url);
        let mut last_err = None;

        for attempt in 0..MAX_RETRIES {
            if attempt > 0 {
                let delay = self.backoff_base * (1 << (attempt - 1));
                warn!(
                    "Embedding attempt {} failed, retrying after {}ms...",
                    attempt,
                    delay.as_millis()
                );
                tokio::time::sleep(delay).await;
            }

            let response = match self
                .client
                .post(&url)
                .bearer_auth(&self.api_key)
                .json(&body)
                .send()
                .await
            {
                Ok(r) => r,
                Err(e) => {
                    last_err = Some(EmbeddingError::Http(e));
                    continue;
                }
            };

            let status = response.status();
            if status.is_success() {
                let parsed: EmbeddingResponse = response.json().await?;
                debug!("Embedded {} texts with {}", texts.len(), EMBEDDING_MODEL);
                return order_embeddings(parsed, texts.len());
            }

            let message = response.text().await.unwrap_or_default();
            if status.as_u16() == 429 || status.is_server_error() {
                last_err = Some(EmbeddingError::Api {
                    status: status.as_u16(),
                    message,
                });
                continue;
            }

            return Err(EmbeddingError::Api {
                status: status.as_u16(),
                message: api_error_message(message),
            });
        }

        Err(last_err.unwrap_or(EmbeddingError::Exhausted {
            retries: MAX_RETRIES,
        }))
    }
}

/// Sorts response vectors by their `index` so they line up with the request.
/// Indices must be exactly `0..expected`.
fn order_embeddings(
    response: EmbeddingResponse,
    expected: usize,
) -> Result<Vec<Vec<f32>>, EmbeddingError> {
    let mut data = response.data;
    if data.len() != expected {
        return Err(EmbeddingError::CountMismatch {
            expected,
            actual: data.len(),
        });
    }
    data.sort_by_key(|d| d.index);
    if let Some((position, datum)) = data.iter().enumerate().find(|(i, d)| d.index != *i) {
        return Err(EmbeddingError::IndexMismatch {
            position,
            index: datum.index,
        });
    }
    Ok(data.into_iter().map(|d| d.embedding).collect())
}

// ============ Batching and vector math ============

/// Embeds `texts` in chunks of `batch_size` to stay under provider rate limits.
pub async fn batch_embed(
    embedder: &dyn Embedder,
    texts: &[String],
    batch_size: usize,
) -> Result<Vec<Vec<f32>>, EmbeddingError> {
    let mut embeddings = Vec::with_capacity(texts.len());
    for batch in texts.chunks(batch_size.max(1)) {
        let vectors = embedder.embed_documents(batch).await?;
        if vectors.len() != batch.len() {
            return Err(EmbeddingError::CountMismatch {
                expected: batch.len(),
                actual: vectors.len(),
            });
        }
        embeddings.extend(vectors);
    }
    Ok(embeddings)
}

/// Cosine similarity in [-1, 1]. A zero vector has no direction, so it scores 0.0.
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> Result<f64, EmbeddingError> {
    if a.len() != b.len() {
        return Err(EmbeddingError::DimensionMismatch {
            left: a.len(),
            right: b.len(),
        });
    }

    let mut dot = 0.0_f64;
    let mut norm_a = 0.0_f64;
    let mut norm_b = 0.0_f64;
    for (x, y) in a.iter().zip(b) {
        let (x, y) = (*x as f64, *y as f64);
        dot += x * y;
        norm_a += x * x;
        norm_b += y * y;
    }

    let denom = norm_a.sqrt() * norm_b.sqrt();
    if denom == 0.0 || !denom.is_finite() {
        return Ok(0.0);
    }
    Ok((dot / denom).clamp(-1.0, 1.0))
}

/// Scales a vector to unit length. Zero vectors come back unchanged.
pub fn normalize_vector(vector: &[f32]) -> Vec<f32> {
    let norm = vector.iter().map(|v| v * v).sum::<f32>().sqrt();
    if norm == 0.0 {
        return vector.to_vec();
    }
    vector.iter().map(|v| v / norm).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm_client::test_server::StubServer;
    use axum::http::StatusCode;
    use std::sync::atomic::{AtomicUsize, Ordering};

    const EMBEDDINGS_PATH: &str = "/v1/embeddings";

    fn embedder_for(server: &StubServer) -> OpenAiEmbedder {
        OpenAiEmbedder::new("test-key".into(), server.base_url.clone())
            .unwrap()
            .with_backoff_base(Duration::from_millis(5))
    }

    fn two_texts() -> Vec<String> {
        vec!["first".to_string(), "second".to_string()]
    }

    /// Embeds each text as [len, 1.0] and counts calls.
    struct CountingEmbedder {
        calls: AtomicUsize,
    }

    #[async_trait]
    impl Embedder for CountingEmbedder {
        fn model_name(&self) -> &str {
            "counting"
        }

        async fn embed_documents(
            &self,
            texts: &[String],
        ) -> Result<Vec<Vec<f32>>, EmbeddingError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(texts.iter().map(|t| vec![t.len() as f32, 1.0]).collect())
        }
    }

    #[test]
    fn test_cosine_identical_vectors_is_one() {
        let v = [0.3_f32, 0.4, 0.5];
        assert!((cosine_similarity(&v, &v).unwrap() - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_cosine_orthogonal_is_zero() {
        let sim = cosine_similarity(&[1.0, 0.0], &[0.0, 1.0]).unwrap();
        assert!(sim.abs() < 1e-12);
    }

    #[test]
    fn test_cosine_zero_vector_is_zero_not_nan() {
        let sim = cosine_similarity(&[0.0, 0.0], &[1.0, 2.0]).unwrap();
        assert_eq!(sim, 0.0);
    }

    #[test]
    fn test_cosine_dimension_mismatch_errors() {
        let err = cosine_similarity(&[1.0], &[1.0, 2.0]).unwrap_err();
        assert!(matches!(
            err,
            EmbeddingError::DimensionMismatch { left: 1, right: 2 }
        ));
    }

    #[test]
    fn test_normalize_vector_unit_length() {
        let n = normalize_vector(&[3.0, 4.0]);
        assert!((n[0] - 0.6).abs() < 1e-6);
        assert!((n[1] - 0.8).abs() < 1e-6);
    }

    #[test]
    fn test_normalize_zero_vector_unchanged() {
        assert_eq!(normalize_vector(&[0.0, 0.0]), vec![0.0, 0.0]);
    }

    #[test]
    fn test_order_embeddings_sorts_by_index() {
        let json = r#"{"data": [
            {"index": 1, "embedding": [0.0, 1.0]},
            {"index": 0, "embedding": [1.0, 0.0]}
        ]}"#;
        let response: EmbeddingResponse = serde_json::from_str(json).unwrap();
        let ordered = order_embeddings(response, 2).unwrap();
        assert_eq!(ordered, vec![vec![1.0, 0.0], vec![0.0, 1.0]]);
    }

    #[test]
    fn test_order_embeddings_count_mismatch() {
        let json = r#"{"data": [{"index": 0, "embedding": [1.0]}]}"#;
        let response: EmbeddingResponse = serde_json::from_str(json).unwrap();
        assert!(matches!(
            order_embeddings(response, 2),
            Err(EmbeddingError::CountMismatch {
                expected: 2,
                actual: 1
            })
        ));
    }

    #[test]
    fn test_order_embeddings_rejects_duplicate_index() {
        let json = r#"{"data": [
            {"index": 0, "embedding": [1.0, 0.0]},
            {"index": 0, "embedding": [0.0, 1.0]}
        ]}"#;
        let response: EmbeddingResponse = serde_json::from_str(json).unwrap();
        assert!(matches!(
            order_embeddings(response, 2),
            Err(EmbeddingError::IndexMismatch {
                position: 1,
                index: 0
            })
        ));
    }

    #[test]
    fn test_order_embeddings_rejects_out_of_range_index() {
        let json = r#"{"data": [
            {"index": 0, "embedding": [1.0]},
            {"index": 5, "embedding": [2.0]}
        ]}"#;
        let response: EmbeddingResponse = serde_json::from_str(json).unwrap();
        assert!(matches!(
            order_embeddings(response, 2),
            Err(EmbeddingError::IndexMismatch {
                position: 1,
                index: 5
            })
        ));
    }

    #[tokio::test]
    async fn test_openai_embedder_retries_server_error_and_reorders() {
        let server = StubServer::start(
            EMBEDDINGS_PATH,
            vec![
                (StatusCode::SERVICE_UNAVAILABLE, "overloaded"),
                (
                    StatusCode::OK,
                    r#"{"data": [
                        {"index": 1, "embedding": [0.0, 1.0]},
                        {"index": 0, "embedding": [1.0, 0.0]}
                    ]}"#,
                ),
            ],
        )
        .await;

        let vectors = embedder_for(&server)
            .embed_documents(&two_texts())
            .await
            .unwrap();
        assert_eq!(vectors, vec![vec![1.0, 0.0], vec![0.0, 1.0]]);
        assert_eq!(server.hits(), 2);
    }

    #[tokio::test]
    async fn test_openai_embedder_client_error_fails_without_retry() {
        let server = StubServer::start(
            EMBEDDINGS_PATH,
            vec![(
                StatusCode::UNAUTHORIZED,
                r#"{"error": {"message": "Incorrect API key provided"}}"#,
            )],
        )
        .await;

        let err = embedder_for(&server)
            .embed_documents(&two_texts())
            .await
            .unwrap_err();
        match err {
            EmbeddingError::Api { status, message } => {
                assert_eq!(status, 401);
                assert_eq!(message, "Incorrect API key provided");
            }
            other => panic!("expected API error, got {other:?}"),
        }
        assert_eq!(server.hits(), 1);
    }

    #[tokio::test]
    async fn test_openai_embedder_rate_limit_exhausts_retries() {
        let server = StubServer::start(
            EMBEDDINGS_PATH,
            vec![(StatusCode::TOO_MANY_REQUESTS, "slow down")],
        )
        .await;

        let err = embedder_for(&server)
            .embed_documents(&two_texts())
            .await
            .unwrap_err();
        assert!(matches!(err, EmbeddingError::Api { status: 429, .. }));
        assert_eq!(server.hits(), MAX_RETRIES as usize);
    }

    #[tokio::test]
    async fn test_openai_embedder_skips_request_for_empty_input() {
        let server = StubServer::start(EMBEDDINGS_PATH, vec![(StatusCode::OK, "{}")]).await;
        let vectors = embedder_for(&server).embed_documents(&[]).await.unwrap();
        assert!(vectors.is_empty());
        assert_eq!(server.hits(), 0);
    }

    #[tokio::test]
    async fn test_batch_embed_chunks_and_preserves_order() {
        let embedder = CountingEmbedder {
            calls: AtomicUsize::new(0),
        };
        let texts: Vec<String> = (1..=25).map(|n| "x".repeat(n)).collect();

        let vectors = batch_embed(&embedder, &texts, 10).await.unwrap();

        assert_eq!(embedder.calls.load(Ordering::SeqCst), 3);
        assert_eq!(vectors.len(), 25);
        for (i, v) in vectors.iter().enumerate() {
            assert_eq!(v[0], (i + 1) as f32);
        }
    }

    #[tokio::test]
    async fn test_batch_embed_zero_batch_size_treated_as_one() {
        let embedder = CountingEmbedder {
            calls: AtomicUsize::new(0),
        };
        let texts = vec!["a".to_string(), "b".to_string()];
        batch_embed(&embedder, &texts, 0).await.unwrap();
        assert_eq!(embedder.calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_embed_query_default_returns_single_vector() {
        let embedder = CountingEmbedder {
            calls: AtomicUsize::new(0),
        };
        let v = embedder.embed_query("abc").await.unwrap();
        assert_eq!(v, vec![3.0, 1.0]);
    }
}

//! Loopback HTTP stub that replays canned responses, one per request.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use axum::{extract::State, http::StatusCode, routing::post, Router};

#[derive(Clone)]
struct Script {
    hits: Arc<AtomicUsize>,
    replies: Arc<Vec<(StatusCode, &'static str)>>,
}

/// Answers the n-th request with the n-th reply; the last reply repeats.
async fn replay(State(script): State<Script>) -> (StatusCode, &'static str) {
    let n = script.hits.fetch_add(1, Ordering::SeqCst);
    script.replies[n.min(script.replies.len() - 1)]
}

pub struct StubServer {
    pub base_url: String,
    hits: Arc<AtomicUsize>,
}

impl StubServer {
    /// Serves `replies` on `POST {path}` from an ephemeral port.
    pub async fn start(path: &str, replies: Vec<(StatusCode, &'static str)>) -> Self {
        assert!(!replies.is_empty());
        let hits = Arc::new(AtomicUsize::new(0));
        let app = Router::new().route(path, post(replay)).with_state(Script {
            hits: hits.clone(),
            replies: Arc::new(replies),
        });

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        Self {
            base_url: format!("http://{addr}/v1"),
            hits,
        }
    }

    pub fn hits(&self) -> usize {
        self.hits.load(Ordering::SeqCst)
    }
}

//! End-to-end behaviour of the request pipeline over a scripted transport.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use findata_core::{Outcome, Session, UserProfile};
use findata_fetch::{
    HttpRequest, HttpResponse, RecordingNavigator, RequestDescriptor, RequestPipeline,
    RetryStrategy, Transport, TransportError,
};
use findata_store::{AppConfig, AuthNotifier, SessionStore};
use serde_json::{Value, json};
use tokio::time::Instant;

/// What the fake server does for one request.
enum Reply {
    Status(u16, Value),
    Stall,
}

struct FakeServer {
    replies: Mutex<VecDeque<Reply>>,
    received: Mutex<Vec<(HttpRequest, Instant)>>,
}

impl FakeServer {
    fn new(replies: Vec<Reply>) -> Arc<Self> {
        Arc::new(Self {
            replies: Mutex::new(replies.into()),
            received: Mutex::new(Vec::new()),
        })
    }

    fn received(&self) -> Vec<(HttpRequest, Instant)> {
        self.received.lock().unwrap().clone()
    }
}

#[async_trait]
impl Transport for FakeServer {
    async fn send(&self, request: HttpRequest) -> Result<HttpResponse, TransportError> {
        self.received.lock().unwrap().push((request, Instant::now()));
        let reply = self.replies.lock().unwrap().pop_front();
        match reply {
            Some(Reply::Status(status, body)) => Ok(HttpResponse::new(status, body)),
            Some(Reply::Stall) => {
                tokio::time::sleep(Duration::from_secs(3600)).await;
                Err(TransportError::Other("stalled".to_string()))
            }
            None => Ok(HttpResponse::new(200, json!({"success": true}))),
        }
    }
}

/// Paused-clock timers fire on millisecond ticks.
fn assert_about(actual: Duration, expected: Duration) {
    assert!(
        actual >= expected && actual < expected + Duration::from_millis(10),
        "expected about {expected:?}, got {actual:?}"
    );
}

struct Client {
    pipeline: RequestPipeline,
    server: Arc<FakeServer>,
    navigator: Arc<RecordingNavigator>,
    transitions: Arc<AtomicUsize>,
}

fn client(replies: Vec<Reply>) -> Client {
    let server = FakeServer::new(replies);
    let navigator = Arc::new(RecordingNavigator::new());
    let notifier = AuthNotifier::new();
    let transitions = Arc::new(AtomicUsize::new(0));
    let counter = Arc::clone(&transitions);
    notifier.subscribe(move |_| {
        counter.fetch_add(1, Ordering::SeqCst);
    });

    let pipeline = RequestPipeline::builder(SessionStore::in_memory())
        .config(&AppConfig::default())
        .transport(server.clone())
        .navigator(navigator.clone())
        .notifier(notifier)
        .build()
        .unwrap();

    Client {
        pipeline,
        server,
        navigator,
        transitions,
    }
}

#[tokio::test]
async fn test_bearer_header_matches_session_at_dispatch() {
    let c = client(vec![]);
    let stats = RequestDescriptor::get("/dashboard/stats");

    c.pipeline.execute(&stats).await.unwrap();
    c.pipeline
        .session()
        .set("first", &UserProfile::new("alice"))
        .unwrap();
    c.pipeline.execute(&stats).await.unwrap();
    c.pipeline
        .session()
        .set("second", &UserProfile::new("alice"))
        .unwrap();
    c.pipeline.execute(&stats).await.unwrap();
    c.pipeline.session().clear().unwrap();
    c.pipeline.execute(&stats).await.unwrap();

    let tokens: Vec<Option<String>> = c
        .server
        .received()
        .iter()
        .map(|(r, _)| r.bearer_token().map(str::to_string))
        .collect();
    assert_eq!(
        tokens,
        vec![
            None,
            Some("first".to_string()),
            Some("second".to_string()),
            None
        ]
    );
}

#[tokio::test(start_paused = true)]
async fn test_expired_session_on_stats() {
    let c = client(vec![Reply::Status(
        401,
        json!({"detail": "Could not validate credentials"}),
    )]);
    c.pipeline
        .session()
        .set("expired", &UserProfile::new("alice"))
        .unwrap();

    let outcome = c
        .pipeline
        .execute(&RequestDescriptor::get("/dashboard/stats"))
        .await
        .unwrap();

    assert!(outcome.is_auth_failure());
    assert_eq!(c.pipeline.session().get(), Session::Anonymous);
    assert_eq!(c.transitions.load(Ordering::SeqCst), 1);
    assert_eq!(c.navigator.routes(), vec!["/".to_string()]);
    assert_eq!(c.server.received().len(), 1);
}

#[tokio::test(start_paused = true)]
async fn test_extract_times_out_twice_then_succeeds() {
    let c = client(vec![
        Reply::Stall,
        Reply::Stall,
        Reply::Status(200, json!({"success": true, "articles": []})),
    ]);
    let timeout = Duration::from_secs(180);
    let extract = RequestDescriptor::post(
        "/scraping/extract",
        json!({"url": "https://example.com", "method": "scrapedo"}),
    )
    .with_timeout(timeout);

    let result = c
        .pipeline
        .call(&extract, &RetryStrategy::new(3))
        .await
        .unwrap();

    assert!(result.outcome.is_success());
    assert_eq!(result.report.attempts, 3);
    assert_about(
        result.report.elapsed,
        timeout * 2 + Duration::from_secs(1) + Duration::from_secs(2),
    );

    let starts: Vec<Instant> = c.server.received().iter().map(|(_, at)| *at).collect();
    assert_about(starts[1] - starts[0], timeout + Duration::from_secs(1));
    assert_about(starts[2] - starts[1], timeout + Duration::from_secs(2));
}

#[tokio::test(start_paused = true)]
async fn test_forbidden_is_final() {
    let c = client(vec![Reply::Status(403, json!({"message": "Plan limit reached"}))]);

    let outcome = c
        .pipeline
        .execute(&RequestDescriptor::get("/dashboard/analytics"))
        .await
        .unwrap();

    assert_eq!(
        outcome,
        Outcome::HttpFailure {
            status: 403,
            message: "Access denied".to_string(),
            detail: Some("Plan limit reached".to_string()),
        }
    );
    assert_eq!(c.server.received().len(), 1);
    assert_eq!(c.transitions.load(Ordering::SeqCst), 0);
}

#[tokio::test(start_paused = true)]
async fn test_rate_limit_is_not_retried() {
    let c = client(vec![Reply::Status(429, Value::Null)]);

    let outcome = c
        .pipeline
        .execute(&RequestDescriptor::get("/dashboard/stats"))
        .await
        .unwrap();

    assert_eq!(outcome.status(), Some(429));
    assert!(!outcome.is_retryable());
    assert_eq!(c.server.received().len(), 1);
}

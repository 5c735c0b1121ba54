//! Service facade behaviour against a scripted backend.

use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use findata_api::{ApiError, FinDataClient, Registration, ValidationError};
use findata_core::{ExtractRequest, FailureKind, ScrapeMethod, Session, UserProfile};
use findata_fetch::{
    HttpRequest, HttpResponse, RecordingNavigator, Transport, TransportError,
};
use findata_store::{
    AppConfig, AuthNotifier, MemoryMedium, ScrapingHistory, SessionStore, TransitionSource,
};
use serde_json::{Value, json};

// ============================================================================
// Scripted backend
// ============================================================================

#[derive(Default)]
struct Backend {
    routes: Mutex<HashMap<String, VecDeque<(u16, Value)>>>,
    received: Mutex<Vec<HttpRequest>>,
}

impl Backend {
    fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    fn reply(&self, path: &str, status: u16, body: Value) {
        self.routes
            .lock()
            .unwrap()
            .entry(path.to_string())
            .or_default()
            .push_back((status, body));
    }

    fn received(&self) -> Vec<HttpRequest> {
        self.received.lock().unwrap().clone()
    }

    fn paths(&self) -> Vec<String> {
        self.received()
            .iter()
            .map(|r| r.url.path().trim_start_matches("/api").to_string())
            .collect()
    }
}

#[async_trait]
impl Transport for Backend {
    async fn send(&self, request: HttpRequest) -> Result<HttpResponse, TransportError> {
        let path = request.url.path().trim_start_matches("/api").to_string();
        self.received.lock().unwrap().push(request);
        let scripted = self
            .routes
            .lock()
            .unwrap()
            .get_mut(&path)
            .and_then(VecDeque::pop_front);
        let (status, body) = scripted.unwrap_or((200, json!({"success": true})));
        Ok(HttpResponse::new(status, body))
    }
}

fn login_ok() -> Value {
    json!({
        "success": true,
        "access_token": "tok-alice",
        "user": {"username": "alice", "email": "alice@example.com"}
    })
}

struct Harness {
    client: FinDataClient,
    backend: Arc<Backend>,
    navigator: Arc<RecordingNavigator>,
    transitions: Arc<Mutex<Vec<TransitionSource>>>,
}

fn harness_on(session: SessionStore) -> Harness {
    let backend = Backend::new();
    let navigator = Arc::new(RecordingNavigator::new());
    let notifier = AuthNotifier::new();
    let transitions = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&transitions);
    notifier.subscribe(move |t| sink.lock().unwrap().push(t.source));

    let client = FinDataClient::builder(AppConfig::default())
        .session(session)
        .notifier(notifier)
        .transport(backend.clone())
        .navigator(navigator.clone())
        .history(ScrapingHistory::in_memory())
        .build()
        .unwrap();

    Harness {
        client,
        backend,
        navigator,
        transitions,
    }
}

fn harness() -> Harness {
    harness_on(SessionStore::in_memory())
}

impl Harness {
    fn transitions(&self) -> Vec<TransitionSource> {
        self.transitions.lock().unwrap().clone()
    }
}

// ============================================================================
// Auth
// ============================================================================

#[tokio::test]
async fn test_login_populates_session() {
    let h = harness();
    h.backend.reply("/auth/login", 200, login_ok());

    let user = h.client.auth().login("alice", "secret1").await.unwrap();

    assert_eq!(user.username, "alice");
    let session = h.client.auth().current_session();
    assert_eq!(session.token(), Some("tok-alice"));
    assert_eq!(session.user().map(|u| u.username.as_str()), Some("alice"));
    assert_eq!(h.transitions(), vec![TransitionSource::Local]);

    let sent = &h.backend.received()[0];
    assert_eq!(sent.bearer_token(), None);
    assert_eq!(
        sent.body,
        Some(json!({"username": "alice", "password": "secret1"}))
    );
}

#[tokio::test]
async fn test_login_rejected_by_server_flag() {
    let h = harness();
    h.backend.reply(
        "/auth/login",
        200,
        json!({"success": false, "message": "Invalid credentials"}),
    );

    let err = h.client.auth().login("alice", "wrong").await.unwrap_err();

    assert_eq!(err.kind(), Some(FailureKind::ClientRequest));
    assert_eq!(err.to_string(), "Invalid credentials");
    assert_eq!(h.client.session().get(), Session::Anonymous);
    assert!(h.transitions().is_empty());
}

#[tokio::test]
async fn test_login_without_token_is_decode_error() {
    let h = harness();
    h.backend
        .reply("/auth/login", 200, json!({"success": true, "user": {"username": "alice"}}));

    let err = h.client.auth().login("alice", "secret1").await.unwrap_err();

    assert!(matches!(err, ApiError::Decode { .. }));
    assert_eq!(err.to_string(), "An unexpected error occurred");
    assert_eq!(h.client.session().get(), Session::Anonymous);
}

#[tokio::test]
async fn test_logout_clears_and_notifies() {
    let h = harness();
    h.client
        .session()
        .set("tok", &UserProfile::new("alice"))
        .unwrap();

    h.client.auth().logout().await.unwrap();

    assert_eq!(h.client.session().get(), Session::Anonymous);
    assert_eq!(h.transitions(), vec![TransitionSource::Local]);
    assert_eq!(h.backend.received()[0].bearer_token(), Some("tok"));
}

#[tokio::test(start_paused = true)]
async fn test_logout_clears_even_when_server_fails() {
    let h = harness();
    h.client
        .session()
        .set("tok", &UserProfile::new("alice"))
        .unwrap();
    for _ in 0..4 {
        h.backend.reply("/auth/logout", 500, Value::Null);
    }

    let err = h.client.auth().logout().await.unwrap_err();

    assert_eq!(err.kind(), Some(FailureKind::Server));
    assert_eq!(h.backend.received().len(), 4);
    assert_eq!(h.client.session().get(), Session::Anonymous);
    assert_eq!(h.transitions(), vec![TransitionSource::Local]);
}

#[tokio::test]
async fn test_logout_with_expired_token_notifies_once() {
    let h = harness();
    h.client
        .session()
        .set("expired", &UserProfile::new("alice"))
        .unwrap();
    h.backend.reply("/auth/logout", 401, Value::Null);

    let err = h.client.auth().logout().await.unwrap_err();

    assert!(err.is_auth());
    assert_eq!(h.client.session().get(), Session::Anonymous);
    assert_eq!(h.transitions(), vec![TransitionSource::Local]);
    assert_eq!(h.navigator.routes(), vec!["/".to_string()]);
}

#[tokio::test]
async fn test_register_checks_form_before_sending() {
    let h = harness();
    let form = Registration::new("alice", "alice@example.com", "secret1")
        .with_confirmation("secret2");

    let err = h.client.auth().register(&form).await.unwrap_err();

    assert!(matches!(
        err,
        ApiError::Validation(ValidationError::PasswordMismatch)
    ));
    assert!(h.backend.received().is_empty());
}

#[tokio::test]
async fn test_register_sends_profile() {
    let h = harness();
    h.backend.reply(
        "/auth/register",
        200,
        json!({"success": true, "message": "User created"}),
    );
    let form = Registration::new(" alice ", "alice@example.com", "secret1");

    let ack = h.client.auth().register(&form).await.unwrap();

    assert_eq!(ack.message.as_deref(), Some("User created"));
    assert_eq!(
        h.backend.received()[0].body,
        Some(json!({
            "username": "alice",
            "password": "secret1",
            "email": "alice@example.com"
        }))
    );
    // Registering does not log in
    assert_eq!(h.client.session().get(), Session::Anonymous);
}

// ============================================================================
// Dashboard
// ============================================================================

#[tokio::test]
async fn test_expired_session_on_stats() {
    let h = harness();
    h.client
        .session()
        .set("expired", &UserProfile::new("alice"))
        .unwrap();
    h.backend.reply(
        "/dashboard/stats",
        401,
        json!({"detail": "Could not validate credentials"}),
    );

    let err = h.client.dashboard().get_stats().await.unwrap_err();

    assert!(err.is_auth());
    assert_eq!(err.to_string(), "Could not validate credentials");
    assert_eq!(h.client.session().get(), Session::Anonymous);
    assert_eq!(h.transitions(), vec![TransitionSource::Local]);
    assert_eq!(h.navigator.routes(), vec!["/".to_string()]);
}

#[tokio::test]
async fn test_overview_fetches_both() {
    let h = harness();
    h.backend.reply(
        "/dashboard/stats",
        200,
        json!({"success": true, "user_stats": {"total_scraping": 12, "total_articles": 240}}),
    );
    h.backend.reply(
        "/dashboard/analytics",
        200,
        json!({
            "success": true,
            "domain_stats": [{"domain": "example.com", "count": 3}],
            "scraping_history": [{"status": "success"}, {"status": "error"}]
        }),
    );

    let overview = h.client.dashboard().overview().await.unwrap();

    assert_eq!(overview.stats.total_articles(), Some(240));
    assert_eq!(overview.analytics.successful_runs(), 1);
    let mut paths = h.backend.paths();
    paths.sort();
    assert_eq!(paths, vec!["/dashboard/analytics", "/dashboard/stats"]);
}

// ============================================================================
// Scraping
// ============================================================================

#[tokio::test]
async fn test_extract_normalizes_url() {
    let h = harness();
    h.backend.reply(
        "/scraping/extract",
        200,
        json!({
            "success": true,
            "articles": [{"title": "Rates hold"}],
            "total_articles": 1,
            "method_used": "scrapedo",
            "processing_time": "4.2s",
            "articles_with_summaries": 1,
            "domain": "example.com"
        }),
    );

    let response = h
        .client
        .scraping()
        .extract_articles(ExtractRequest::new("example.com"))
        .await
        .unwrap();

    assert_eq!(response.articles.len(), 1);
    let sent = &h.backend.received()[0];
    assert_eq!(sent.body.as_ref().unwrap()["url"], "https://example.com");
    assert_eq!(sent.timeout, Duration::from_secs(180));

    let history = h.client.history().entries().await;
    assert_eq!(history.len(), 1);
    assert_eq!(history[0].url, "https://example.com");
    assert_eq!(history[0].domain, "example.com");
}

#[tokio::test]
async fn test_extract_clamps_article_limit() {
    let h = harness();

    h.client
        .scraping()
        .extract_articles(
            ExtractRequest::new("https://example.com")
                .with_method(ScrapeMethod::Requests)
                .with_max_articles(500),
        )
        .await
        .unwrap();
    h.client
        .scraping()
        .extract_articles(ExtractRequest::new("https://example.com").with_max_articles(0))
        .await
        .unwrap();

    let bodies: Vec<Value> = h
        .backend
        .received()
        .into_iter()
        .filter_map(|r| r.body)
        .collect();
    assert_eq!(bodies[0]["max_articles"], 100);
    assert_eq!(bodies[0]["method"], "requests");
    assert_eq!(bodies[1]["max_articles"], 1);
    assert_eq!(bodies[1]["max_ia_summaries"], 10);
}

#[tokio::test]
async fn test_extract_rejects_empty_url_offline() {
    let h = harness();

    let err = h
        .client
        .scraping()
        .extract_articles(ExtractRequest::new("  "))
        .await
        .unwrap_err();

    assert!(err.is_validation());
    assert!(h.backend.received().is_empty());
    assert!(h.client.history().is_empty().await);
}

#[tokio::test]
async fn test_failed_extract_not_recorded() {
    let h = harness();
    h.backend.reply(
        "/scraping/extract",
        400,
        json!({"detail": "Domain not supported"}),
    );

    let err = h
        .client
        .scraping()
        .extract_articles(ExtractRequest::new("example.com"))
        .await
        .unwrap_err();

    assert_eq!(err.to_string(), "Domain not supported");
    assert!(h.client.history().is_empty().await);
}

// ============================================================================
// Cross-context
// ============================================================================

async fn settle(version: &mut tokio::sync::watch::Receiver<u64>) {
    tokio::time::timeout(Duration::from_secs(2), version.changed())
        .await
        .expect("transition should be delivered")
        .unwrap();
}

#[tokio::test]
async fn test_logout_in_one_tab_reaches_the_other() {
    let medium = MemoryMedium::new();
    let tab_a = harness_on(SessionStore::new(Arc::new(medium.context())));
    let tab_b = harness_on(SessionStore::new(Arc::new(medium.context())));
    let mut b_version = tab_b.client.notifier().changes();
    tab_a.backend.reply("/auth/login", 200, login_ok());

    tab_a.client.auth().login("alice", "secret1").await.unwrap();
    settle(&mut b_version).await;
    assert_eq!(tab_b.client.session().token().as_deref(), Some("tok-alice"));

    tab_a.client.auth().logout().await.unwrap();
    settle(&mut b_version).await;

    assert_eq!(
        tab_a.transitions(),
        vec![TransitionSource::Local, TransitionSource::Local]
    );
    assert_eq!(
        tab_b.transitions(),
        vec![TransitionSource::CrossContext, TransitionSource::CrossContext]
    );
    assert_eq!(tab_a.client.session().get(), Session::Anonymous);
    assert_eq!(tab_b.client.session().get(), Session::Anonymous);
    assert!(tab_b.backend.received().is_empty());
}

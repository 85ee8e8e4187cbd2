// Retry and backoff behavior of the fetcher against a local mock server.

use std::sync::Arc;
use std::time::Duration;
use wiremock::matchers::{header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use argus_insight::config::FetcherConfig;
use argus_insight::fetcher::{FetchOutcome, RetryingFetcher};

use super::{RecordingSleeper, fast_fetcher_config, test_identity_pool};

fn fetcher_with(sleeper: Arc<RecordingSleeper>) -> RetryingFetcher {
    RetryingFetcher::with_sleeper(&fast_fetcher_config(), sleeper)
}

#[tokio::test]
async fn test_ok_fetch_returns_body() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/page"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>listings</html>"))
        .mount(&server)
        .await;

    let sleeper = RecordingSleeper::new();
    let fetcher = fetcher_with(Arc::clone(&sleeper));
    let identity = test_identity_pool().next();

    let outcome = fetcher.fetch(&format!("{}/page", server.uri()), &identity).await;

    assert_eq!(outcome, FetchOutcome::Ok("<html>listings</html>".to_string()));
    assert!(sleeper.delays().is_empty(), "a clean fetch never sleeps");
}

#[tokio::test]
async fn test_persistent_429_exhausts_to_rate_limited() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(429))
        .mount(&server)
        .await;

    let sleeper = RecordingSleeper::new();
    let fetcher = fetcher_with(Arc::clone(&sleeper));
    let identity = test_identity_pool().next();

    let outcome = fetcher.fetch(&server.uri(), &identity).await;

    assert_eq!(outcome, FetchOutcome::RateLimited);

    // Backoff between rate-limited attempts grows strictly
    let delays = sleeper.delays();
    assert_eq!(delays.len(), 2, "three attempts sleep twice");
    assert!(delays[1] > delays[0]);
    assert_eq!(delays[0], Duration::from_millis(50));
    assert_eq!(delays[1], Duration::from_millis(100));
}

#[tokio::test]
async fn test_transient_server_error_recovers() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(500))
        .up_to_n_times(2)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_string("recovered"))
        .mount(&server)
        .await;

    let sleeper = RecordingSleeper::new();
    let fetcher = fetcher_with(Arc::clone(&sleeper));
    let identity = test_identity_pool().next();

    let outcome = fetcher.fetch(&server.uri(), &identity).await;

    assert_eq!(outcome, FetchOutcome::Ok("recovered".to_string()));

    // Non-429 failures retry on the fixed short delay
    let delays = sleeper.delays();
    assert_eq!(delays, vec![Duration::from_millis(20), Duration::from_millis(20)]);
}

#[tokio::test]
async fn test_persistent_404_exhausts_to_transport_error() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;

    let fetcher = fetcher_with(RecordingSleeper::new());
    let identity = test_identity_pool().next();

    match fetcher.fetch(&server.uri(), &identity).await {
        FetchOutcome::Transport(reason) => assert!(reason.contains("404")),
        other => panic!("expected transport error, got {:?}", other),
    }
}

#[tokio::test]
async fn test_connection_refused_is_transport_error() {
    let fetcher = fetcher_with(RecordingSleeper::new());
    let identity = test_identity_pool().next();

    // Reserved port; nothing listens there
    match fetcher.fetch("http://127.0.0.1:1/page", &identity).await {
        FetchOutcome::Transport(_) => {}
        other => panic!("expected transport error, got {:?}", other),
    }
}

#[tokio::test]
async fn test_slow_response_exhausts_to_timeout() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string("too late")
                .set_delay(Duration::from_secs(5)),
        )
        .mount(&server)
        .await;

    let config = FetcherConfig {
        max_attempts: 2,
        base_backoff_ms: 10,
        retry_delay_ms: 10,
        request_timeout: 1,
    };
    let fetcher = RetryingFetcher::with_sleeper(&config, RecordingSleeper::new());
    let identity = test_identity_pool().next();

    let outcome = fetcher.fetch(&server.uri(), &identity).await;
    assert_eq!(outcome, FetchOutcome::Timeout);
}

#[tokio::test]
async fn test_identity_user_agent_is_sent() {
    let server = MockServer::start().await;
    // Only a request carrying the pool's user agent matches
    Mock::given(method("GET"))
        .and(header("user-agent", "TestAgent/1.0"))
        .respond_with(ResponseTemplate::new(200).set_body_string("ok"))
        .mount(&server)
        .await;

    let fetcher = fetcher_with(RecordingSleeper::new());
    let identity = test_identity_pool().next();

    let outcome = fetcher.fetch(&server.uri(), &identity).await;
    assert!(outcome.is_ok(), "request did not carry the identity's user agent");
}

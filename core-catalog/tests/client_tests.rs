//! Integration tests for the catalog client
//!
//! These tests drive `CatalogClient` through fake transports and bridges:
//! - Cache hits, expiry and clearing
//! - Parameter validation before any transport runs
//! - Transport ordering and error-body detection
//! - Shared in-flight requests
//! - Built-in data when every transport fails
//! - Callback registration cleanup for the script bridge

use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use bridge_traits::{
    error::BridgeError, HttpClient, HttpRequest, HttpResponse, ManualClock, ScriptCompletion,
    ScriptHandle, ScriptHost, ScriptOutcome,
};
use bytes::Bytes;
use core_catalog::{
    CatalogClient, CatalogError, CatalogTransport, EndpointKind, JsonpTransport, SearchOptions,
    TransportChain, TransportError,
};
use core_runtime::config::{CatalogConfig, CoreConfig, RelayEndpoint, DEFAULT_CACHE_TTL};
use core_runtime::events::{CatalogEvent, CoreEvent, EventBus};
use mockall::mock;
use parking_lot::Mutex;
use serde_json::{json, Value};
use url::Url;

// ============================================================================
// Fakes
// ============================================================================

/// Transport that replays scripted results and counts attempts.
#[derive(Clone)]
struct ScriptedTransport {
    name: &'static str,
    results: Arc<Mutex<VecDeque<Result<Value, TransportError>>>>,
    calls: Arc<AtomicUsize>,
    urls: Arc<Mutex<Vec<String>>>,
    delay: Option<Duration>,
}

impl ScriptedTransport {
    fn new(name: &'static str) -> Self {
        Self {
            name,
            results: Arc::new(Mutex::new(VecDeque::new())),
            calls: Arc::new(AtomicUsize::new(0)),
            urls: Arc::new(Mutex::new(Vec::new())),
            delay: None,
        }
    }

    fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    fn respond(&self, result: Result<Value, TransportError>) -> &Self {
        self.results.lock().push_back(result);
        self
    }

    fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait::async_trait]
impl CatalogTransport for ScriptedTransport {
    fn name(&self) -> &str {
        self.name
    }

    async fn attempt(&self, url: &Url) -> Result<Value, TransportError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.urls.lock().push(url.to_string());
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        self.results
            .lock()
            .pop_front()
            .unwrap_or(Err(TransportError::HttpStatus(503)))
    }
}

#[derive(Clone, Copy)]
enum HostBehavior {
    Respond,
    FailLoad,
    Silent,
}

/// Script host that settles synchronously according to its behavior.
struct FakeScriptHost {
    behavior: HostBehavior,
    payload: Value,
    injected: Mutex<Vec<String>>,
    removed: Mutex<Vec<ScriptHandle>>,
}

impl FakeScriptHost {
    fn new(behavior: HostBehavior) -> Self {
        Self {
            behavior,
            payload: json!({ "id": 3135556, "title": "Harder, Better, Faster, Stronger",
                             "artist": { "id": 27, "name": "Daft Punk" } }),
            injected: Mutex::new(Vec::new()),
            removed: Mutex::new(Vec::new()),
        }
    }
}

impl ScriptHost for FakeScriptHost {
    fn inject(
        &self,
        src: &str,
        callback_name: &str,
        on_complete: ScriptCompletion,
    ) -> Result<ScriptHandle, BridgeError> {
        self.injected.lock().push(src.to_string());
        match self.behavior {
            HostBehavior::Respond => on_complete(ScriptOutcome::Payload(self.payload.clone())),
            HostBehavior::FailLoad => on_complete(ScriptOutcome::LoadFailed("404".to_string())),
            HostBehavior::Silent => {}
        }
        Ok(ScriptHandle::new(format!("script-{}", callback_name)))
    }

    fn remove(&self, handle: ScriptHandle) {
        self.removed.lock().push(handle);
    }
}

mock! {
    Http {}

    #[async_trait::async_trait]
    impl HttpClient for Http {
        async fn execute(&self, request: HttpRequest) -> Result<HttpResponse, BridgeError>;
    }
}

fn response(status: u16, body: Value) -> HttpResponse {
    HttpResponse {
        status,
        headers: Default::default(),
        body: Bytes::from(body.to_string()),
    }
}

fn track_json(id: u64, preview: &str) -> Value {
    json!({
        "id": id,
        "title": format!("Track {}", id),
        "artist": { "id": 27, "name": "Daft Punk" },
        "preview": preview,
        "duration": 200
    })
}

fn client_with(
    transports: Vec<ScriptedTransport>,
) -> (CatalogClient, Arc<ManualClock>) {
    let clock = Arc::new(ManualClock::starting_now());
    let mut chain = TransportChain::new();
    for transport in transports {
        chain.push(Box::new(transport));
    }
    let client = CatalogClient::new(&CatalogConfig::default(), clock.clone(), chain).unwrap();
    (client, clock)
}

// ============================================================================
// Cache
// ============================================================================

#[tokio::test]
async fn test_repeated_request_is_served_from_cache() {
    let transport = ScriptedTransport::new("primary");
    transport.respond(Ok(track_json(1, "https://cdn.example/1.mp3")));
    let (client, _clock) = client_with(vec![transport.clone()]);

    let first = client.get_track("1").await.unwrap();
    let second = client.get_track(" 1 ").await.unwrap();

    assert_eq!(first, second);
    assert_eq!(transport.calls(), 1);
    assert_eq!(client.cache_stats().keys, vec!["track:1".to_string()]);
}

#[tokio::test]
async fn test_entry_expires_after_ttl() {
    let transport = ScriptedTransport::new("primary");
    transport
        .respond(Ok(track_json(1, "")))
        .respond(Ok(track_json(1, "https://cdn.example/1.mp3")));
    let (client, clock) = client_with(vec![transport.clone()]);

    assert!(!client.get_track("1").await.unwrap().has_preview());

    clock.advance(DEFAULT_CACHE_TTL - Duration::from_millis(1));
    assert!(!client.get_track("1").await.unwrap().has_preview());
    assert_eq!(transport.calls(), 1);

    clock.advance(Duration::from_millis(2));
    assert!(client.get_track("1").await.unwrap().has_preview());
    assert_eq!(transport.calls(), 2);
}

#[tokio::test]
async fn test_clear_cache_reports_and_emits() {
    let transport = ScriptedTransport::new("primary");
    transport.respond(Ok(json!({ "data": [] })));
    let bus = EventBus::new(16);
    let mut events = bus.subscribe();
    let (client, _clock) = client_with(vec![transport.clone()]);
    let client = client.with_event_bus(bus);

    client.get_genres().await.unwrap();
    assert_eq!(client.clear_cache(), 1);
    assert_eq!(client.cache_stats().size, 0);
    assert_eq!(
        events.try_recv().unwrap(),
        CoreEvent::Catalog(CatalogEvent::CacheCleared { entries: 1 })
    );
}

// ============================================================================
// Validation
// ============================================================================

#[tokio::test]
async fn test_invalid_parameters_never_reach_a_transport() {
    let transport = ScriptedTransport::new("primary");
    let (client, _clock) = client_with(vec![transport.clone()]);

    for query in ["", "   "] {
        let err = client.search(query, SearchOptions::default()).await.unwrap_err();
        assert!(err.is_validation());
    }
    assert!(client.get_album("").await.unwrap_err().is_validation());
    assert!(client
        .fetch_endpoint(EndpointKind::Search, &json!({ "query": null }))
        .await
        .unwrap_err()
        .is_validation());
    assert!(client
        .fetch_endpoint(EndpointKind::Artist, &json!({ "id": false }))
        .await
        .unwrap_err()
        .is_validation());
    assert!(client
        .get_artist_top_tracks("27", Some(0))
        .await
        .unwrap_err()
        .is_validation());

    assert_eq!(transport.calls(), 0);
}

#[tokio::test]
async fn test_search_uses_trimmed_query_and_defaults() {
    let transport = ScriptedTransport::new("primary");
    transport.respond(Ok(json!({ "data": [track_json(1, "")], "total": 1 })));
    let (client, _clock) = client_with(vec![transport.clone()]);

    let tracks = client.search("  daft punk  ", SearchOptions::default()).await.unwrap();

    assert_eq!(tracks.len(), 1);
    assert_eq!(client.cache_stats().keys, vec!["search:daft punk:0:25".to_string()]);
    assert_eq!(
        transport.urls.lock()[0],
        "https://api.deezer.com/search?q=daft+punk&index=0&limit=25"
    );
}

// ============================================================================
// Transport chain
// ============================================================================

#[tokio::test]
async fn test_script_failure_then_relay_500_then_second_relay() {
    let host = Arc::new(FakeScriptHost::new(HostBehavior::FailLoad));

    let mut http = MockHttp::new();
    http.expect_execute()
        .withf(|request| request.url.starts_with("https://relay-a.example/"))
        .times(1)
        .returning(|_| Ok(response(500, json!({}))));
    http.expect_execute()
        .withf(|request| request.url.starts_with("https://relay-b.example/"))
        .times(1)
        .returning(|_| Ok(response(200, track_json(3135556, "https://cdn.example/p.mp3"))));

    let config = CoreConfig::builder()
        .script_host(host.clone())
        .http_client(Arc::new(http))
        .relays(vec![
            RelayEndpoint::new("a", "https://relay-a.example/?{url}"),
            RelayEndpoint::new("b", "https://relay-b.example/raw?url={url}"),
        ])
        .clock(Arc::new(ManualClock::starting_now()))
        .build()
        .unwrap();
    let client = CatalogClient::from_core_config(&config).unwrap();

    let track = client.get_track("3135556").await.unwrap();

    assert_eq!(track.id.as_str(), "3135556");
    assert_eq!(host.injected.lock().len(), 1);
    assert_eq!(host.removed.lock().len(), 1);
}

#[tokio::test]
async fn test_error_body_moves_on_to_next_transport() {
    let first = ScriptedTransport::new("first");
    first.respond(Ok(json!({ "error": { "type": "DataException", "message": "no data", "code": 800 } })));
    let second = ScriptedTransport::new("second");
    second.respond(Ok(track_json(7, "")));
    let (client, _clock) = client_with(vec![first.clone(), second.clone()]);

    let track = client.get_track("7").await.unwrap();

    assert_eq!(track.id.as_str(), "7");
    assert_eq!((first.calls(), second.calls()), (1, 1));
}

#[tokio::test]
async fn test_unavailable_when_every_transport_fails() {
    let first = ScriptedTransport::new("first");
    first.respond(Err(TransportError::Timeout(Duration::from_secs(10))));
    let second = ScriptedTransport::new("second");
    second.respond(Ok(json!({ "error": { "message": "Quota limit exceeded", "code": 4 } })));
    let bus = EventBus::new(16);
    let mut events = bus.subscribe();
    let (client, _clock) = client_with(vec![first, second]);
    let client = client.with_event_bus(bus);

    let err = client.get_track("1").await.unwrap_err();

    match &err {
        CatalogError::Unavailable { endpoint, failures } => {
            assert_eq!(endpoint, "track:1");
            assert_eq!(failures.len(), 2);
            assert_eq!(failures[0].transport, "first");
            assert_eq!(
                failures[1].error,
                TransportError::Remote {
                    code: Some(4),
                    message: "Quota limit exceeded".to_string()
                }
            );
        }
        other => panic!("unexpected error: {other:?}"),
    }
    assert!(err.is_unavailable());
    assert_eq!(client.cache_stats().size, 0);
    assert_eq!(
        events.try_recv().unwrap(),
        CoreEvent::Catalog(CatalogEvent::Unavailable {
            endpoint: "track:1".to_string(),
            attempts: 2
        })
    );
}

#[tokio::test]
async fn test_concurrent_identical_requests_share_one_attempt() {
    let transport = ScriptedTransport::new("slow").with_delay(Duration::from_millis(20));
    transport.respond(Ok(track_json(5, "")));
    let (client, _clock) = client_with(vec![transport.clone()]);

    let (a, b) = tokio::join!(client.get_track("5"), client.get_track("5"));

    assert_eq!(a.unwrap(), b.unwrap());
    assert_eq!(transport.calls(), 1);
}

// ============================================================================
// Built-in data
// ============================================================================

#[tokio::test]
async fn test_chart_falls_back_and_is_not_cached() {
    let transport = ScriptedTransport::new("primary");
    transport
        .respond(Err(TransportError::HttpStatus(502)))
        .respond(Ok(json!({ "tracks": { "data": [track_json(9, "https://cdn.example/9.mp3")] } })));
    let bus = EventBus::new(16);
    let mut events = bus.subscribe();
    let (client, _clock) = client_with(vec![transport.clone()]);
    let client = client.with_event_bus(bus);

    let fallback = client.get_chart().await.unwrap();
    assert!(!fallback.tracks.data.is_empty());
    assert_eq!(client.cache_stats().size, 0);
    assert_eq!(
        events.try_recv().unwrap(),
        CoreEvent::Catalog(CatalogEvent::FallbackServed {
            endpoint: "charts".to_string()
        })
    );

    let live = client.get_chart().await.unwrap();
    assert_eq!(live.tracks.data[0].id.as_str(), "9");
    assert_eq!(transport.calls(), 2);
}

#[tokio::test]
async fn test_genres_fall_back() {
    let (client, _clock) = client_with(vec![ScriptedTransport::new("down")]);

    let genres = client.get_genres().await.unwrap();

    assert_eq!(genres[0].id.as_str(), "0");
    assert!(genres.iter().any(|g| g.name == "Rock"));
}

#[tokio::test]
async fn test_random_track_only_picks_previewable_tracks() {
    let transport = ScriptedTransport::new("primary");
    transport.respond(Ok(json!({ "tracks": { "data": [
        track_json(1, ""),
        track_json(2, "https://cdn.example/2.mp3"),
        track_json(3, "")
    ] } })));
    let (client, _clock) = client_with(vec![transport]);

    for _ in 0..10 {
        assert_eq!(client.get_random_track().await.unwrap().id.as_str(), "2");
    }
}

#[tokio::test]
async fn test_random_track_without_previews_fails() {
    let (client, _clock) = client_with(vec![ScriptedTransport::new("down")]);

    // Built-in chart tracks carry no previews.
    let err = client.get_random_track().await.unwrap_err();
    assert_eq!(err, CatalogError::NoPlayableTrack);
}

// ============================================================================
// Script bridge
// ============================================================================

fn target() -> Url {
    Url::parse("https://api.deezer.com/track/3135556").unwrap()
}

#[tokio::test]
async fn test_script_bridge_resolves_and_cleans_up() {
    let host = Arc::new(FakeScriptHost::new(HostBehavior::Respond));
    let transport = JsonpTransport::new(host.clone(), "deezer_callback", Duration::from_secs(10));

    let payload = transport.attempt(&target()).await.unwrap();

    assert_eq!(payload["id"], 3135556);
    let src = host.injected.lock()[0].clone();
    assert!(src.starts_with("https://api.deezer.com/track/3135556?output=jsonp&callback=deezer_callback_"));
    assert_eq!(host.removed.lock().len(), 1);
    assert_eq!(transport.pending_callbacks(), 0);
}

#[tokio::test]
async fn test_script_bridge_releases_on_load_failure() {
    let host = Arc::new(FakeScriptHost::new(HostBehavior::FailLoad));
    let transport = JsonpTransport::new(host.clone(), "cb", Duration::from_secs(10));

    let err = transport.attempt(&target()).await.unwrap_err();

    assert_eq!(err, TransportError::ScriptLoad("404".to_string()));
    assert_eq!(host.removed.lock().len(), 1);
    assert_eq!(transport.pending_callbacks(), 0);
}

#[tokio::test]
async fn test_script_bridge_releases_on_timeout() {
    let host = Arc::new(FakeScriptHost::new(HostBehavior::Silent));
    let transport = JsonpTransport::new(host.clone(), "cb", Duration::from_millis(20));

    let err = transport.attempt(&target()).await.unwrap_err();

    assert_eq!(err, TransportError::Timeout(Duration::from_millis(20)));
    assert_eq!(host.removed.lock().len(), 1);
    assert_eq!(transport.pending_callbacks(), 0);
}

#[tokio::test]
async fn test_script_urls_use_unique_callbacks() {
    let host = Arc::new(FakeScriptHost::new(HostBehavior::Respond));
    let transport = JsonpTransport::new(host.clone(), "cb", Duration::from_secs(10));
    let search = Url::parse("https://api.deezer.com/search?q=x").unwrap();

    transport.attempt(&search).await.unwrap();
    transport.attempt(&search).await.unwrap();

    let injected = host.injected.lock();
    assert!(injected[0].contains("?q=x&output=jsonp&callback=cb_"));
    assert_ne!(injected[0], injected[1]);
}

//! Endpoint resolution against scripted endpoints

mod common;

use std::sync::Arc;
use std::time::Duration;

use common::{registry_with, Behavior, ScriptedConnector};
use omnilink::{
    CandidateSource, ChainRegistry, EndpointResolver, KeyValueStore, MemoryStore, PinStore,
    ProbeError,
};

const CHAIN: u64 = 100;
const LABEL: &str = "Gnosis Chain";
const SESSION_KEY: &str = "HEALTHY-RPC-URL-GNOSIS CHAIN";

fn resolver(
    registry: ChainRegistry,
    connector: &Arc<ScriptedConnector>,
    pins: Arc<dyn KeyValueStore>,
    session: Arc<dyn KeyValueStore>,
) -> EndpointResolver {
    EndpointResolver::builder(registry)
        .connector(connector.clone())
        .pin_store(pins)
        .session_store(session)
        .build()
}

#[tokio::test]
async fn test_pinned_url_short_circuits_defaults() {
    let connector = ScriptedConnector::new();
    connector.script("https://pinned.example", Behavior::healthy(CHAIN));
    connector.script("https://a.example", Behavior::healthy(CHAIN));

    let pins = Arc::new(MemoryStore::new());
    let session = Arc::new(MemoryStore::new());
    let resolver = resolver(
        registry_with(CHAIN, LABEL, &["https://a.example"]),
        &connector,
        pins,
        session.clone(),
    );
    resolver.pin(CHAIN, "https://pinned.example").unwrap();

    let handle = resolver.resolve(CHAIN).await.unwrap();
    assert_eq!(handle.url(), "https://pinned.example");
    assert_eq!(handle.source(), CandidateSource::Pinned);
    assert_eq!(connector.connects("https://a.example"), 0);
    assert_eq!(
        session.get(SESSION_KEY).unwrap().as_deref(),
        Some("https://pinned.example")
    );
}

#[tokio::test]
async fn test_failing_pin_falls_through_to_defaults() {
    let connector = ScriptedConnector::new();
    connector.script("https://pinned.example", Behavior::Erroring);
    connector.script("https://a.example", Behavior::healthy(CHAIN));

    let resolver = resolver(
        registry_with(CHAIN, LABEL, &["https://a.example"]),
        &connector,
        Arc::new(MemoryStore::new()),
        Arc::new(MemoryStore::new()),
    );
    resolver.pin(CHAIN, "https://pinned.example").unwrap();

    let handle = resolver.resolve(CHAIN).await.unwrap();
    assert_eq!(handle.url(), "https://a.example");
    assert_eq!(handle.source(), CandidateSource::Default { index: 0 });
    assert_eq!(resolver.pinned(CHAIN).as_deref(), Some("https://pinned.example"));
}

#[tokio::test]
async fn test_first_healthy_default_in_list_order_wins() {
    let connector = ScriptedConnector::new();
    connector.script("https://down.example", Behavior::Unreachable);
    connector.script(
        "https://slow.example",
        Behavior::slow(CHAIN, Duration::from_millis(200)),
    );
    connector.script("https://fast.example", Behavior::healthy(CHAIN));

    let session = Arc::new(MemoryStore::new());
    let resolver = resolver(
        registry_with(
            CHAIN,
            LABEL,
            &["https://down.example", "https://slow.example", "https://fast.example"],
        ),
        &connector,
        Arc::new(MemoryStore::new()),
        session.clone(),
    );

    let handle = resolver.resolve(CHAIN).await.unwrap();
    assert_eq!(handle.url(), "https://slow.example");
    assert_eq!(handle.source(), CandidateSource::Default { index: 1 });
    assert_eq!(
        session.get(SESSION_KEY).unwrap().as_deref(),
        Some("https://slow.example")
    );
}

#[tokio::test]
async fn test_defaults_are_probed_concurrently() {
    let connector = ScriptedConnector::new();
    let urls = [
        "https://one.example",
        "https://two.example",
        "https://three.example",
    ];
    connector.script(urls[0], Behavior::slow(7, Duration::from_millis(300)));
    connector.script(urls[1], Behavior::slow(7, Duration::from_millis(300)));
    connector.script(urls[2], Behavior::slow(CHAIN, Duration::from_millis(300)));

    let resolver = resolver(
        registry_with(CHAIN, LABEL, &urls),
        &connector,
        Arc::new(MemoryStore::new()),
        Arc::new(MemoryStore::new()),
    );

    let started = tokio::time::Instant::now();
    let handle = resolver.resolve(CHAIN).await.unwrap();
    assert_eq!(handle.url(), urls[2]);
    assert!(started.elapsed() < Duration::from_millis(800));
}

#[tokio::test]
async fn test_all_candidates_failing_yields_none() {
    let connector = ScriptedConnector::new();
    connector.script("https://a.example", Behavior::Erroring);
    connector.script("https://b.example", Behavior::Unreachable);

    let session = Arc::new(MemoryStore::new());
    let resolver = resolver(
        registry_with(CHAIN, LABEL, &["https://a.example", "https://b.example"]),
        &connector,
        Arc::new(MemoryStore::new()),
        session.clone(),
    );

    assert!(resolver.resolve(CHAIN).await.is_none());
    assert!(session.is_empty());
}

#[tokio::test]
async fn test_unknown_chain_without_candidates_yields_none() {
    let connector = ScriptedConnector::new();
    let resolver = resolver(
        ChainRegistry::new(),
        &connector,
        Arc::new(MemoryStore::new()),
        Arc::new(MemoryStore::new()),
    );

    assert!(resolver.resolve(424242).await.is_none());
    assert_eq!(connector.total_connects(), 0);
}

#[tokio::test]
async fn test_session_url_is_tried_before_defaults() {
    let connector = ScriptedConnector::new();
    connector.script("https://cached.example", Behavior::healthy(CHAIN));
    connector.script("https://a.example", Behavior::healthy(CHAIN));

    let session = Arc::new(MemoryStore::new());
    session.set(SESSION_KEY, "https://cached.example").unwrap();
    let resolver = resolver(
        registry_with(CHAIN, LABEL, &["https://a.example"]),
        &connector,
        Arc::new(MemoryStore::new()),
        session.clone(),
    );

    let handle = resolver.resolve(CHAIN).await.unwrap();
    assert_eq!(handle.url(), "https://cached.example");
    assert_eq!(handle.source(), CandidateSource::Session);
    assert_eq!(connector.connects("https://a.example"), 0);
}

#[tokio::test]
async fn test_stale_session_url_is_replaced() {
    let connector = ScriptedConnector::new();
    connector.script("https://stale.example", Behavior::Unreachable);
    connector.script("https://a.example", Behavior::healthy(CHAIN));

    let session = Arc::new(MemoryStore::new());
    session.set(SESSION_KEY, "https://stale.example").unwrap();
    let resolver = resolver(
        registry_with(CHAIN, LABEL, &["https://a.example"]),
        &connector,
        Arc::new(MemoryStore::new()),
        session.clone(),
    );

    let handle = resolver.resolve(CHAIN).await.unwrap();
    assert_eq!(handle.url(), "https://a.example");
    assert_eq!(resolver.session_url(CHAIN).as_deref(), Some("https://a.example"));
}

#[tokio::test]
async fn test_wrong_network_is_rejected() {
    let connector = ScriptedConnector::new();
    connector.script("https://mainnet.example", Behavior::healthy(1));
    connector.script("https://gnosis.example", Behavior::healthy(CHAIN));

    let resolver = resolver(
        registry_with(
            CHAIN,
            LABEL,
            &["https://mainnet.example", "https://gnosis.example"],
        ),
        &connector,
        Arc::new(MemoryStore::new()),
        Arc::new(MemoryStore::new()),
    );

    let handle = resolver.resolve(CHAIN).await.unwrap();
    assert_eq!(handle.url(), "https://gnosis.example");

    let err = resolver
        .probe("https://mainnet.example", CHAIN)
        .await
        .unwrap_err();
    assert_eq!(
        err,
        ProbeError::WrongNetwork {
            url: "https://mainnet.example".to_string(),
            expected: CHAIN,
            actual: 1,
        }
    );
}

#[tokio::test]
async fn test_probe_timeout_rejects_slow_endpoint() {
    let connector = ScriptedConnector::new();
    connector.script(
        "https://slow.example",
        Behavior::slow(CHAIN, Duration::from_millis(500)),
    );

    let resolver = EndpointResolver::builder(registry_with(CHAIN, LABEL, &["https://slow.example"]))
        .connector(connector.clone())
        .probe_timeout(Duration::from_millis(50))
        .build();

    assert!(resolver.resolve(CHAIN).await.is_none());
    let err = resolver.probe("https://slow.example", CHAIN).await.unwrap_err();
    assert!(matches!(err, ProbeError::Timeout { timeout_ms: 50, .. }));
}

#[tokio::test]
async fn test_empty_url_is_rejected_without_connecting() {
    let connector = ScriptedConnector::new();
    let resolver = EndpointResolver::builder(registry_with(CHAIN, LABEL, &[]))
        .connector(connector.clone())
        .build();

    let err = resolver.probe("   ", CHAIN).await.unwrap_err();
    assert_eq!(err, ProbeError::EmptyUrl);
    assert_eq!(connector.total_connects(), 0);
}

#[tokio::test]
async fn test_connections_are_memoized_per_url_and_chain() {
    let connector = ScriptedConnector::new();
    connector.script("https://a.example", Behavior::healthy(CHAIN));

    let resolver = resolver(
        registry_with(CHAIN, LABEL, &["https://a.example"]),
        &connector,
        Arc::new(MemoryStore::new()),
        Arc::new(MemoryStore::new()),
    );

    for _ in 0..3 {
        assert!(resolver.resolve(CHAIN).await.is_some());
    }
    assert_eq!(connector.connects("https://a.example"), 1);
    assert_eq!(resolver.cached_connections().await, 1);
    // identity is re-checked on every resolve
    assert_eq!(connector.queries(), 3);

    // same URL against another chain id is a separate connection
    let _ = resolver.probe("https://a.example", 1).await;
    assert_eq!(connector.connects("https://a.example"), 2);
    assert_eq!(resolver.cached_connections().await, 2);
}

#[tokio::test]
async fn test_pins_persist_in_sqlite_store() {
    let connector = ScriptedConnector::new();
    connector.script("https://mine.example", Behavior::healthy(CHAIN));

    let pins = Arc::new(PinStore::open_in_memory().unwrap());
    let resolver = resolver(
        ChainRegistry::with_defaults(),
        &connector,
        pins.clone(),
        Arc::new(MemoryStore::new()),
    );

    resolver.pin(CHAIN, " https://mine.example ").unwrap();
    assert_eq!(
        pins.get("xdai-rpc-url").unwrap().as_deref(),
        Some("https://mine.example")
    );

    let handle = resolver.resolve(CHAIN).await.unwrap();
    assert_eq!(handle.source(), CandidateSource::Pinned);
    assert_eq!(handle.chain_name(), "Gnosis Chain");

    resolver.unpin(CHAIN).unwrap();
    assert!(resolver.pinned(CHAIN).is_none());
}

#[tokio::test]
async fn test_registry_address_is_attached_to_handle() {
    let connector = ScriptedConnector::new();
    connector.script("https://bsc.example", Behavior::healthy(10000));
    connector.script("https://plain.example", Behavior::healthy(56));

    let resolver = resolver(
        ChainRegistry::with_defaults(),
        &connector,
        Arc::new(MemoryStore::new()),
        Arc::new(MemoryStore::new()),
    );

    let handle = resolver.probe("https://bsc.example", 10000).await.unwrap();
    assert_eq!(handle.source(), CandidateSource::Direct);
    assert_eq!(
        handle.ens_address(),
        resolver.registry().get(10000).unwrap().ens_address
    );
    assert!(handle.ens_address().is_some());

    let plain = resolver.probe("https://plain.example", 56).await.unwrap();
    assert!(plain.ens_address().is_none());
    assert_eq!(plain.lookup_address(Default::default()).await.unwrap(), None);
}

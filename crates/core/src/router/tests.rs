use std::sync::Arc;

use std::time::Duration;

use super::testing::{MockNetwork, RejectingPuts, html, json};
use super::*;
use crate::cache::CacheDb;

const SCOPE: &str = "https://app.test/";
const VERSION: &str = "v5";

struct Fixture {
    router: Arc<Router>,
    network: Arc<MockNetwork>,
    db: CacheDb,
}

impl Fixture {
    fn url(&self, path: &str) -> Url {
        self.router.resolve_url(path).unwrap()
    }

    fn get(&self, path: &str) -> InterceptedRequest {
        InterceptedRequest::get(self.url(path))
    }

    fn navigate(&self, path: &str) -> InterceptedRequest {
        InterceptedRequest::navigate(self.url(path))
    }

    async fn entries(&self) -> u64 {
        self.db.entry_count(VERSION).await.unwrap()
    }
}

fn options(assets: &[&str], shell: &str, policy: FallbackPolicy) -> RouterOptions {
    let scope = Scope::parse(SCOPE).unwrap();
    RouterOptions {
        version: VERSION.to_string(),
        assets: assets.iter().map(|a| scope.resolve(a).unwrap()).collect(),
        shell: scope.resolve(shell).unwrap(),
        scope,
        skip_waiting: true,
        policy,
    }
}

async fn fixture_with(options: RouterOptions) -> Fixture {
    let db = CacheDb::open_in_memory().await.unwrap();
    let network = Arc::new(MockNetwork::new());
    network.respond("https://app.test/", html("<main>root</main>"));
    network.respond("https://app.test/index.html", html("<main>shell</main>"));
    network.respond("https://app.test/manifest.json", json(200, r#"{"name":"app"}"#));

    let router = Router::new(options, Arc::new(db.clone()), network.clone());
    Fixture { router: Arc::new(router), network, db }
}

async fn fixture() -> Fixture {
    fixture_with(options(&["./", "./index.html", "./manifest.json"], "./index.html", FallbackPolicy::default())).await
}

async fn installed() -> Fixture {
    let f = fixture().await;
    f.router.install().await.unwrap();
    f.network.reset_calls();
    f
}

#[tokio::test]
async fn test_seed_writes_every_asset() {
    let f = fixture().await;
    assert_eq!(f.router.seed().await.unwrap(), 3);
    assert_eq!(f.entries().await, 3);
    assert_eq!(f.router.state(), LifecycleState::Installed);
    assert_eq!(f.network.calls().len(), 3);
}

#[tokio::test]
async fn test_seed_twice_is_idempotent() {
    let f = fixture().await;
    f.router.seed().await.unwrap();

    f.network.respond("https://app.test/index.html", html("<main>shell v2</main>"));
    f.router.seed().await.unwrap();

    assert_eq!(f.entries().await, 3);
    let shell = f.router.lookup(&f.url("./index.html")).await.unwrap().unwrap();
    assert_eq!(shell.text(), "<main>shell v2</main>");
}

#[tokio::test]
async fn test_seed_is_all_or_nothing() {
    let f = fixture().await;
    f.network.fail("https://app.test/manifest.json");

    let err = f.router.seed().await.unwrap_err();
    assert!(matches!(err, Error::SeedFailed { ref url, .. } if url == "https://app.test/manifest.json"));
    assert_eq!(f.entries().await, 0);
    assert_eq!(f.router.state(), LifecycleState::Redundant);
    assert!(matches!(f.router.reconcile().await, Err(Error::InvalidState(_))));
}

#[tokio::test]
async fn test_seed_rejects_error_status() {
    let f = fixture().await;
    f.network.respond("https://app.test/manifest.json", json(404, "{}"));

    let err = f.router.install().await.unwrap_err();
    assert!(matches!(err, Error::SeedFailed { ref reason, .. } if reason == "status 404"));
    assert_eq!(f.entries().await, 0);
}

#[tokio::test]
async fn test_cancelled_seed_can_be_retried() {
    let f = fixture().await;
    f.network.hang("https://app.test/manifest.json");

    let router = f.router.clone();
    let task = tokio::spawn(async move { router.seed().await });
    tokio::time::sleep(Duration::from_millis(50)).await;
    task.abort();
    assert!(task.await.unwrap_err().is_cancelled());

    assert_eq!(f.router.state(), LifecycleState::Redundant);
    assert_eq!(f.entries().await, 0);

    f.network.respond("https://app.test/manifest.json", json(200, "{}"));
    assert_eq!(f.router.seed().await.unwrap(), 3);
    assert_eq!(f.router.state(), LifecycleState::Installed);
}

#[tokio::test]
async fn test_failed_refresh_keeps_active_entries() {
    let f = installed().await;
    f.network.fail("https://app.test/");

    assert!(f.router.seed().await.is_err());
    assert_eq!(f.router.state(), LifecycleState::Activated);
    assert_eq!(f.entries().await, 3);
}

#[tokio::test]
async fn test_reconcile_keeps_only_current_store() {
    let f = fixture().await;
    let stale = InterceptedRequest::get(Url::parse("https://app.test/index.html").unwrap());
    f.db.put("v3", &stale, &html("old")).await.unwrap();
    f.db.put("v4", &stale, &html("older")).await.unwrap();

    let report = f.router.install().await.unwrap();

    assert_eq!(report.seeded, 3);
    assert_eq!(report.state, LifecycleState::Activated);
    assert_eq!(report.purged, vec!["v3".to_string(), "v4".to_string()]);
    assert_eq!(f.router.store_names().await.unwrap(), vec![VERSION.to_string()]);
    assert_eq!(f.db.entry_count("v3").await.unwrap(), 0);
}

#[tokio::test]
async fn test_without_skip_waiting_stays_installed() {
    let mut opts = options(&["./", "./index.html"], "./index.html", FallbackPolicy::default());
    opts.skip_waiting = false;
    let f = fixture_with(opts).await;

    let report = f.router.install().await.unwrap();
    assert_eq!(report.state, LifecycleState::Installed);
    assert!(report.purged.is_empty());

    let res = f.router.resolve(&f.get("./index.html")).await.unwrap();
    assert_eq!(res.source, ResponseSource::Passthrough);

    f.router.reconcile().await.unwrap();
    let res = f.router.resolve(&f.get("./index.html")).await.unwrap();
    assert_eq!(res.source, ResponseSource::Cache);
}

#[tokio::test]
async fn test_inactive_router_passes_through() {
    let f = fixture().await;
    f.network.respond("https://app.test/app.js", html("js"));

    let res = f.router.resolve(&f.get("./app.js")).await.unwrap();
    assert_eq!(res.source, ResponseSource::Passthrough);
    assert_eq!(f.router.store_names().await.unwrap(), Vec::<String>::new());

    assert!(matches!(f.router.resolve(&f.get("./missing.js")).await, Err(Error::Network(_))));
}

#[tokio::test]
async fn test_cache_hit_skips_network() {
    let f = installed().await;

    let res = f.router.resolve(&f.get("./manifest.json")).await.unwrap();
    assert_eq!(res.source, ResponseSource::Cache);
    assert_eq!(res.response.text(), r#"{"name":"app"}"#);
    assert_eq!(f.network.call_count(), 0);
}

#[tokio::test]
async fn test_cache_hit_ignores_staleness() {
    let f = installed().await;
    f.network.respond("https://app.test/manifest.json", json(200, r#"{"name":"new"}"#));

    let res = f.router.resolve(&f.get("./manifest.json")).await.unwrap();
    assert_eq!(res.response.text(), r#"{"name":"app"}"#);
}

#[tokio::test]
async fn test_miss_writes_through() {
    let f = installed().await;
    f.network.respond("https://app.test/app.js", html("console.log(1)"));

    let res = f.router.resolve(&f.get("./app.js")).await.unwrap();
    assert_eq!(res.source, ResponseSource::Network);
    assert_eq!(f.entries().await, 4);

    let cached = f.router.lookup(&f.url("./app.js")).await.unwrap().unwrap();
    assert_eq!(cached.text(), "console.log(1)");
    drop(cached);
    assert_eq!(res.response.text(), "console.log(1)");

    let again = f.router.resolve(&f.get("./app.js")).await.unwrap();
    assert_eq!(again.source, ResponseSource::Cache);
    assert_eq!(again.response.body, res.response.body);
    assert_eq!(f.network.call_count(), 1);
}

#[tokio::test]
async fn test_write_through_failure_still_returns_response() {
    let db = CacheDb::open_in_memory().await.unwrap();
    let network = Arc::new(MockNetwork::new());
    network.respond("https://app.test/", html("<main>root</main>"));
    network.respond("https://app.test/index.html", html("<main>shell</main>"));
    network.respond("https://app.test/app.js", html("console.log(1)"));

    let opts = options(&["./", "./index.html"], "./index.html", FallbackPolicy::default());
    let router = Router::new(opts, Arc::new(RejectingPuts(db.clone())), network);
    router.install().await.unwrap();

    let req = InterceptedRequest::get(router.resolve_url("./app.js").unwrap());
    let res = router.resolve(&req).await.unwrap();
    assert_eq!(res.source, ResponseSource::Network);
    assert_eq!(res.response.text(), "console.log(1)");
    assert_eq!(db.entry_count(VERSION).await.unwrap(), 2);
}

#[tokio::test]
async fn test_error_status_falls_back_to_shell_without_caching() {
    let f = installed().await;
    f.network.respond("https://app.test/app.js", CapturedResponse::new(500, "boom"));

    let res = f.router.resolve(&f.get("./app.js")).await.unwrap();
    assert_eq!(res.source, ResponseSource::ShellFallback);
    assert_eq!(res.response.text(), "<main>shell</main>");
    assert_eq!(f.entries().await, 3);
}

#[tokio::test]
async fn test_network_error_falls_back_to_shell_without_caching() {
    let f = installed().await;

    let res = f.router.resolve(&f.get("./styles.css")).await.unwrap();
    assert_eq!(res.source, ResponseSource::ShellFallback);
    assert_eq!(res.response.status, 200);
    assert_eq!(f.entries().await, 3);
    assert_eq!(f.network.call_count(), 1);
}

#[tokio::test]
async fn test_navigation_consults_only_shell() {
    let f = installed().await;

    for path in ["./patients/42", "./manifest.json", "./"] {
        let req = f.navigate(path);
        let res = f.router.resolve(&req).await.unwrap();
        assert_eq!(res.source, ResponseSource::Cache);
        assert_eq!(res.response.text(), "<main>shell</main>");
    }
    assert_eq!(f.network.call_count(), 0);
}

#[tokio::test]
async fn test_html_accept_is_routed_as_navigation() {
    let f = installed().await;
    let req = f.get("./reports").with_accept("text/html,application/xhtml+xml");

    let res = f.router.resolve(&req).await.unwrap();
    assert_eq!(res.response.text(), "<main>shell</main>");
}

#[tokio::test]
async fn test_navigation_without_shell_uses_network_then_offline_page() {
    let f = fixture_with(options(&["./", "./index.html"], "./app-shell.html", FallbackPolicy::default())).await;
    f.router.install().await.unwrap();
    f.network.respond("https://app.test/reports", html("<main>reports</main>"));

    let req = f.navigate("./reports");
    let res = f.router.resolve(&req).await.unwrap();
    assert_eq!(res.source, ResponseSource::Network);
    assert_eq!(res.response.text(), "<main>reports</main>");

    f.network.go_offline();
    let res = f.router.resolve(&req).await.unwrap();
    assert_eq!(res.source, ResponseSource::OfflinePage);
    assert_eq!(res.response.content_type(), Some("text/html"));
    assert_eq!(res.response.text(), crate::http::OFFLINE_PAGE_HTML);
}

#[tokio::test]
async fn test_navigation_error_status_is_passed_through() {
    let f = fixture_with(options(&["./", "./index.html"], "./app-shell.html", FallbackPolicy::default())).await;
    f.router.install().await.unwrap();
    f.network.respond("https://app.test/gone", CapturedResponse::new(404, "not found"));

    let req = f.navigate("./gone");
    let res = f.router.resolve(&req).await.unwrap();
    assert_eq!(res.source, ResponseSource::Network);
    assert_eq!(res.response.status, 404);
}

#[tokio::test]
async fn test_resource_fallback_without_shell_errors() {
    let f = fixture_with(options(&["./", "./index.html"], "./app-shell.html", FallbackPolicy::default())).await;
    f.router.install().await.unwrap();

    let err = f.router.resolve(&f.get("./app.js")).await.unwrap_err();
    assert!(matches!(err, Error::ShellMissing(_)));
}

#[tokio::test]
async fn test_propagate_policy_surfaces_api_failures() {
    let policy = FallbackPolicy::new(&["api/".to_string()], FallbackMode::Propagate, FallbackMode::Shell);
    let f = fixture_with(options(&["./", "./index.html"], "./index.html", policy)).await;
    f.router.install().await.unwrap();

    let err = f.router.resolve(&f.get("./api/data")).await.unwrap_err();
    assert!(matches!(err, Error::Network(_)));

    f.network.respond("https://app.test/api/data", json(503, r#"{"error":"busy"}"#));
    let res = f.router.resolve(&f.get("./api/data")).await.unwrap();
    assert_eq!(res.source, ResponseSource::Network);
    assert_eq!(res.response.status, 503);

    let asset = f.router.resolve(&f.get("./app.js")).await.unwrap();
    assert_eq!(asset.source, ResponseSource::ShellFallback);
}

#[tokio::test]
async fn test_cross_origin_success_is_not_cached() {
    let f = installed().await;
    f.network.respond("https://cdn.test/lib.js", html("lib"));

    let res = f.router.resolve(&f.get("https://cdn.test/lib.js")).await.unwrap();
    assert_eq!(res.source, ResponseSource::Network);
    assert_eq!(f.entries().await, 3);
}

#[tokio::test]
async fn test_non_get_success_is_not_cached() {
    let f = installed().await;
    f.network.respond("https://app.test/api/save", json(201, r#"{"ok":true}"#));

    let req = f.get("./api/save").with_method("POST");
    let res = f.router.resolve(&req).await.unwrap();
    assert_eq!(res.source, ResponseSource::Network);
    assert_eq!(res.response.status, 201);
    assert_eq!(f.entries().await, 3);
}

#[tokio::test]
async fn test_non_get_never_matches_cached_get() {
    let f = installed().await;
    f.network.respond("https://app.test/manifest.json", json(200, r#"{"posted":true}"#));

    let req = f.get("./manifest.json").with_method("POST");
    let res = f.router.resolve(&req).await.unwrap();
    assert_eq!(res.source, ResponseSource::Network);
    assert_eq!(f.network.call_count(), 1);
}

#[tokio::test]
async fn test_concurrent_resolves_share_store() {
    let f = installed().await;
    for i in 0..8 {
        f.network.respond(&format!("https://app.test/chunk-{i}.js"), html(&format!("chunk {i}")));
    }

    let mut handles = Vec::new();
    for i in 0..8 {
        let router = f.router.clone();
        let req = f.get(&format!("./chunk-{i}.js"));
        handles.push(tokio::spawn(async move { router.resolve(&req).await }));
    }
    for handle in handles {
        assert_eq!(handle.await.unwrap().unwrap().source, ResponseSource::Network);
    }

    assert_eq!(f.entries().await, 3 + 8);
}

#[tokio::test]
async fn test_offline_scenario() {
    let opts = options(&["/", "/index.html", "/manifest.json"], "/index.html", FallbackPolicy::default());
    let f = fixture_with(opts).await;

    let report = f.router.install().await.unwrap();
    assert_eq!(report.seeded, 3);
    assert_eq!(f.entries().await, 3);
    f.network.reset_calls();

    let manifest = f.router.resolve(&f.get("/manifest.json")).await.unwrap();
    assert_eq!(manifest.source, ResponseSource::Cache);
    assert_eq!(f.network.call_count(), 0);

    let api = f.router.resolve(&f.get("/api/data")).await.unwrap();
    assert_eq!(api.source, ResponseSource::ShellFallback);
    assert_eq!(api.response.status, 200);
    assert_eq!(api.response.text(), "<main>shell</main>");
}

#[test]
fn test_options_from_config() {
    let config = AppConfig {
        version: "patient-app-v5".into(),
        scope: "https://app.example.com/patient/".into(),
        assets: vec!["./".into(), "./index.html".into(), "./index.html?fresh".into()],
        api_prefixes: vec!["api/".into()],
        api_fallback: FallbackMode::Propagate,
        ..Default::default()
    };

    let opts = RouterOptions::from_config(&config).unwrap();
    assert_eq!(opts.version, "patient-app-v5");
    assert_eq!(opts.assets[2].as_str(), "https://app.example.com/patient/index.html?fresh");
    assert_eq!(opts.shell.as_str(), "https://app.example.com/patient/index.html");
    assert_eq!(opts.policy.api, FallbackMode::Propagate);
}

#[tokio::test]
async fn test_equivalent_asset_spellings_seed_once() {
    let config = AppConfig {
        version: VERSION.into(),
        scope: SCOPE.into(),
        assets: vec!["./index.html".into(), "index.html".into(), "./".into()],
        ..Default::default()
    };
    let opts = RouterOptions::from_config(&config).unwrap();
    assert_eq!(opts.assets.len(), 2);
    assert_eq!(opts.assets[0].as_str(), "https://app.test/index.html");

    let f = fixture_with(opts).await;
    let report = f.router.install().await.unwrap();
    assert_eq!(report.seeded, 2);
    assert_eq!(f.entries().await, 2);
}

#[test]
fn test_options_from_invalid_config() {
    let config = AppConfig { shell_path: "./missing.html".into(), ..Default::default() };
    assert!(matches!(RouterOptions::from_config(&config), Err(ConfigError::Invalid { .. })));
}

#![allow(clippy::unwrap_used)]
// Integration tests for `Poller` and `Bridge` against a wiremock server.

use std::collections::HashSet;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use pretty_assertions::assert_eq;
use secrecy::SecretString;
use serde_json::json;
use uuid::Uuid;
use wiremock::matchers::{body_json, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use wellbeing_api::Endpoints;
use wellbeing_core::bridge::DISCONTINUED_WARNING;
use wellbeing_core::model::accessory_uuid;
use wellbeing_core::poller::POLL_CLAMP_WARNING;
use wellbeing_core::{
    AccessoryInfo, AccessorySink, AccessoryState, ApplianceCommand, ApplianceIdentity, Bridge,
    BridgeConfig, CharacteristicWrite, CoreError, Poller, ServiceKind, StartOutcome, WorkMode,
};

// ── Helpers ─────────────────────────────────────────────────────────

async fn setup() -> (MockServer, BridgeConfig) {
    let server = MockServer::start().await;
    let config = BridgeConfig {
        username: Some("user@example.com".into()),
        password: Some(SecretString::from("secret".to_owned())),
        endpoints: Endpoints::new(
            &format!("{}/client-token", server.uri()),
            &format!("{}/api", server.uri()),
        )
        .unwrap(),
        timeout: Duration::from_secs(5),
        poll_time_secs: Some(60),
        ..BridgeConfig::default()
    };
    (server, config)
}

/// Bootstrap + login, answering any number of times.
async fn mount_auth(server: &MockServer) {
    Mock::given(method("GET"))
        .and(path("/client-token"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "accessToken": "client-token" })))
        .mount(server)
        .await;
    Mock::given(method("POST"))
        .and(path("/api/Users/Login"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "accessToken": "access" })))
        .mount(server)
        .await;
}

async fn mount_listing(server: &MockServer, ids: &[&str]) {
    let entries: Vec<_> = ids
        .iter()
        .map(|id| json!({ "pncId": id, "applianceName": format!("Purifier {id}"), "modelName": "PUREA9" }))
        .collect();
    Mock::given(method("GET"))
        .and(path("/api/Domains/Appliances"))
        .respond_with(ResponseTemplate::new(200).set_body_json(entries))
        .mount(server)
        .await;
}

async fn mount_snapshot(server: &MockServer, id: &str, reported: serde_json::Value) {
    Mock::given(method("GET"))
        .and(path(format!("/api/Appliances/{id}")))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "pncId": id,
            "applianceData": { "applianceName": format!("Purifier {id}"), "modelName": "PUREA9" },
            "twin": { "properties": { "reported": reported } }
        })))
        .mount(server)
        .await;
}

async fn mount_missing(server: &MockServer, id: &str) {
    Mock::given(method("GET"))
        .and(path(format!("/api/Appliances/{id}")))
        .respond_with(ResponseTemplate::new(404))
        .mount(server)
        .await;
}

fn identity(id: &str) -> ApplianceIdentity {
    ApplianceIdentity {
        id: id.into(),
        display_name: format!("Purifier {id}"),
        model_name: "PUREA9".into(),
    }
}

#[derive(Default)]
struct RecordingSink {
    known: Mutex<HashSet<Uuid>>,
    registered: Mutex<Vec<AccessoryInfo>>,
    updates: Mutex<Vec<AccessoryState>>,
}

impl RecordingSink {
    fn knowing(uuid: Uuid) -> Self {
        let sink = Self::default();
        sink.known.lock().unwrap().insert(uuid);
        sink
    }

    fn registered(&self) -> Vec<AccessoryInfo> {
        self.registered.lock().unwrap().clone()
    }

    fn updates(&self) -> Vec<AccessoryState> {
        self.updates.lock().unwrap().clone()
    }
}

impl AccessorySink for RecordingSink {
    fn is_registered(&self, uuid: &Uuid) -> bool {
        self.known.lock().unwrap().contains(uuid)
    }

    fn register(&self, info: AccessoryInfo) {
        self.known.lock().unwrap().insert(info.uuid);
        self.registered.lock().unwrap().push(info);
    }

    fn update(&self, state: &AccessoryState) {
        self.updates.lock().unwrap().push(state.clone());
    }
}

// ── Poller tests ────────────────────────────────────────────────────

#[tokio::test]
async fn test_poll_all_isolates_failing_appliance() {
    let (server, config) = setup().await;
    mount_auth(&server).await;
    mount_snapshot(&server, "a", json!({ "Workmode": "Auto" })).await;
    mount_missing(&server, "b").await;
    mount_snapshot(&server, "c", json!({ "Workmode": "PowerOff" })).await;

    let poller = Poller::new(config);
    poller.connect().await.unwrap();

    let results = poller
        .poll_all(&[identity("a"), identity("b"), identity("c")])
        .await;

    assert_eq!(results.len(), 3);
    assert_eq!(results[0].as_ref().unwrap().pnc_id, "a");
    assert!(results[1].is_none());
    assert_eq!(results[2].as_ref().unwrap().work_mode, Some(WorkMode::Off));
}

#[tokio::test]
async fn test_failed_fetch_rebuilds_session_once() {
    let (server, config) = setup().await;

    Mock::given(method("GET"))
        .and(path("/client-token"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "accessToken": "client-token" })))
        .expect(2)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/api/Users/Login"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "accessToken": "access" })))
        .expect(2)
        .mount(&server)
        .await;
    mount_missing(&server, "b").await;

    let poller = Poller::new(config);
    poller.connect().await.unwrap();

    assert!(poller.fetch_snapshot("b").await.is_none());
    assert!(poller.is_connected().await);
}

#[tokio::test]
async fn test_reconnection_failure_still_yields_none() {
    let (server, config) = setup().await;

    Mock::given(method("GET"))
        .and(path("/client-token"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "accessToken": "client-token" })))
        .up_to_n_times(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/client-token"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/api/Users/Login"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "accessToken": "access" })))
        .mount(&server)
        .await;
    mount_missing(&server, "b").await;

    let poller = Poller::new(config);
    poller.connect().await.unwrap();

    assert!(poller.fetch_snapshot("b").await.is_none());
    // The previous session survives a failed rebuild.
    assert!(poller.is_connected().await);
}

#[tokio::test]
async fn test_list_failure_yields_empty_list() {
    let (server, config) = setup().await;
    mount_auth(&server).await;

    Mock::given(method("GET"))
        .and(path("/api/Domains/Appliances"))
        .respond_with(ResponseTemplate::new(500))
        .expect(2)
        .mount(&server)
        .await;

    let poller = Poller::new(config);
    poller.connect().await.unwrap();

    assert!(poller.list_appliances().await.is_empty());
}

#[tokio::test]
async fn test_failed_command_is_swallowed() {
    let (server, config) = setup().await;
    mount_auth(&server).await;

    // Original attempt + one retry after the refresh.
    Mock::given(method("PUT"))
        .and(path("/api/Appliances/a/Commands"))
        .and(body_json(json!({ "FanSpeed": 5 })))
        .respond_with(ResponseTemplate::new(503))
        .expect(4)
        .mount(&server)
        .await;

    let poller = Poller::new(config);
    poller.connect().await.unwrap();

    poller.send_command("a", &ApplianceCommand::FanSpeed(5)).await;

    let result = poller
        .try_send_command("a", &ApplianceCommand::FanSpeed(5))
        .await;
    assert!(
        matches!(result, Err(CoreError::Command { ref field, .. }) if field == "FanSpeed"),
        "expected Command error, got: {result:?}"
    );
}

#[tokio::test]
async fn test_find_appliance_reports_unknown_pnc_id() {
    let (server, config) = setup().await;
    mount_auth(&server).await;
    mount_listing(&server, &["a", "b"]).await;

    let poller = Poller::new(config);
    poller.connect().await.unwrap();

    let found = poller.try_find_appliance("b").await.unwrap();
    assert_eq!(found.id, "b");

    let missing = poller.try_find_appliance("zzz").await;
    assert!(
        matches!(missing, Err(CoreError::UnknownAppliance { ref pnc_id }) if pnc_id == "zzz"),
        "expected UnknownAppliance, got: {missing:?}"
    );
}

// ── Bridge tests ────────────────────────────────────────────────────

#[tokio::test]
async fn test_start_registers_every_listed_appliance() {
    let (server, config) = setup().await;
    mount_auth(&server).await;
    mount_listing(&server, &["a", "b"]).await;
    mount_snapshot(
        &server,
        "a",
        json!({ "FrmVer_NIU": "1.2.0", "Workmode": "Auto", "PM2_5": 4, "Temp": 21.0 }),
    )
    .await;
    mount_missing(&server, "b").await;

    let sink = Arc::new(RecordingSink::default());
    let bridge = Bridge::new(config, sink.clone());

    let outcome = bridge.start().await.unwrap();
    assert_eq!(outcome, StartOutcome::Started { appliances: 2 });

    let registered = sink.registered();
    assert_eq!(registered.len(), 2);
    assert_eq!(registered[0].uuid, accessory_uuid("a"));
    assert_eq!(registered[0].manufacturer, "AEG");
    assert_eq!(registered[0].model, "AX9");
    assert_eq!(registered[0].serial_number, "a");
    assert_eq!(registered[0].firmware_revision.as_deref(), Some("1.2.0"));
    assert_eq!(
        registered[0].services,
        vec![
            ServiceKind::AirPurifier,
            ServiceKind::AirQualitySensor,
            ServiceKind::TemperatureSensor,
        ]
    );
    assert_eq!(registered[1].services, vec![ServiceKind::AirPurifier]);

    // Only the appliance with data gets a state push.
    let updates = sink.updates();
    assert_eq!(updates.len(), 1);
    assert_eq!(updates[0].pnc_id, "a");
    assert_eq!(updates[0].purifier.active, Some(true));
    assert_eq!(bridge.cached("a").unwrap().purifier.active, Some(true));
    assert!(bridge.cached("b").is_none());

    assert!(bridge.take_warnings().await.contains(&DISCONTINUED_WARNING.to_owned()));
    bridge.shutdown().await;
}

#[tokio::test]
async fn test_start_skips_known_accessories() {
    let (server, config) = setup().await;
    mount_auth(&server).await;
    mount_listing(&server, &["a"]).await;
    mount_snapshot(&server, "a", json!({ "Workmode": "Manual" })).await;

    let sink = Arc::new(RecordingSink::knowing(accessory_uuid("a")));
    let bridge = Bridge::new(config, sink.clone());

    bridge.start().await.unwrap();

    assert!(sink.registered().is_empty());
    assert_eq!(sink.updates().len(), 1);
    bridge.shutdown().await;
}

#[tokio::test]
async fn test_start_without_credentials_does_nothing() {
    let sink = Arc::new(RecordingSink::default());
    let bridge = Bridge::new(BridgeConfig::default(), sink.clone());

    let outcome = bridge.start().await.unwrap();

    assert_eq!(outcome, StartOutcome::NeedsConfiguration);
    assert!(sink.registered().is_empty());
    assert!(!bridge.poller().is_connected().await);
}

#[tokio::test]
async fn test_start_fails_on_rejected_login() {
    let (server, config) = setup().await;
    Mock::given(method("GET"))
        .and(path("/client-token"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "accessToken": "client-token" })))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/api/Users/Login"))
        .respond_with(ResponseTemplate::new(401))
        .mount(&server)
        .await;

    let bridge = Bridge::new(config, Arc::new(RecordingSink::default()));
    let result = bridge.start().await;

    assert!(
        matches!(result, Err(CoreError::InvalidCredentials { .. })),
        "expected InvalidCredentials, got: {result:?}"
    );
}

#[tokio::test]
async fn test_short_poll_time_is_clamped_with_warning() {
    let (server, mut config) = setup().await;
    config.poll_time_secs = Some(2);
    mount_auth(&server).await;
    mount_listing(&server, &[]).await;

    let bridge = Bridge::new(config, Arc::new(RecordingSink::default()));
    bridge.start().await.unwrap();

    let warnings = bridge.take_warnings().await;
    assert!(warnings.contains(&POLL_CLAMP_WARNING.to_owned()));
    assert!(bridge.take_warnings().await.is_empty());
    bridge.shutdown().await;
}

#[tokio::test]
async fn test_shutdown_joins_poll_timer() {
    let (server, config) = setup().await;
    mount_auth(&server).await;
    mount_listing(&server, &["a"]).await;
    mount_snapshot(&server, "a", json!({ "Workmode": "Auto" })).await;

    let sink = Arc::new(RecordingSink::default());
    let bridge = Bridge::new(config, sink.clone());
    bridge.start().await.unwrap();

    tokio::time::timeout(Duration::from_secs(2), bridge.shutdown())
        .await
        .expect("shutdown should join the timer task");
    // Handles are drained, so a second call returns at once.
    tokio::time::timeout(Duration::from_secs(2), bridge.shutdown())
        .await
        .expect("second shutdown should be a no-op");
    assert_eq!(sink.updates().len(), 1);
}

#[tokio::test]
async fn test_poll_cycle_pushes_fresh_state() {
    let (server, config) = setup().await;
    mount_auth(&server).await;
    mount_listing(&server, &["a"]).await;
    mount_snapshot(&server, "a", json!({ "Workmode": "Auto", "Fanspeed": 3 })).await;

    let sink = Arc::new(RecordingSink::default());
    let bridge = Bridge::new(config, sink.clone());
    bridge.start().await.unwrap();

    bridge.poll_cycle().await;

    assert_eq!(sink.updates().len(), 2);
    bridge.shutdown().await;
}

#[tokio::test]
async fn test_handle_set_sends_only_changed_active() {
    let (server, config) = setup().await;
    mount_auth(&server).await;
    mount_listing(&server, &["a"]).await;
    mount_snapshot(&server, "a", json!({ "Workmode": "Auto", "SafetyLock": 0 })).await;

    Mock::given(method("PUT"))
        .and(path("/api/Appliances/a/Commands"))
        .and(body_json(json!({ "WorkMode": "PowerOff" })))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("PUT"))
        .and(path("/api/Appliances/a/Commands"))
        .and(body_json(json!({ "SafetyLock": 1 })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "status": "ok" })))
        .expect(1)
        .mount(&server)
        .await;

    let bridge = Bridge::new(config, Arc::new(RecordingSink::default()));
    bridge.start().await.unwrap();

    // Already active: nothing to send.
    assert_eq!(bridge.handle_set("a", CharacteristicWrite::Active(true)).await, None);

    assert_eq!(
        bridge.handle_set("a", CharacteristicWrite::Active(false)).await,
        Some(ApplianceCommand::WorkMode(WorkMode::Off))
    );
    // The accepted write is now the current value.
    assert_eq!(bridge.handle_set("a", CharacteristicWrite::Active(false)).await, None);

    assert_eq!(
        bridge
            .handle_set("a", CharacteristicWrite::LockPhysicalControls(true))
            .await,
        Some(ApplianceCommand::SafetyLock(true))
    );

    bridge.identify("a").await;
    bridge.shutdown().await;
}

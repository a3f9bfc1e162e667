use std::sync::Arc;

use jiff::Timestamp;
use keel_core::MutableClock;
use keel_core::models::delivery_config::{
    ArtifactType, DeliveryArtifact, DeliveryConfig, Environment,
};
use keel_core::models::events::ResourceEventType;
use keel_core::models::resource::{Resource, ResourceKind};
use keel_daemon::config::KeelConfig;
use keel_daemon::engine::EngineBuilder;
use keel_daemon::logging::LogFormat;
use keel_daemon::manifests::load_manifests;
use keel_storage::{EventLog, ResourceRepository};
use serde_json::json;
use tokio::sync::watch;

fn manifest(name: &str) -> DeliveryConfig {
    DeliveryConfig {
        name: name.into(),
        application: "fnord".into(),
        service_account: "keel@spinnaker.io".into(),
        artifacts: vec![DeliveryArtifact {
            name: "fnord".into(),
            artifact_type: ArtifactType::Deb,
            reference: "fnord-deb".into(),
            delivery_config_name: String::new(),
        }],
        environments: vec![Environment {
            name: "test".into(),
            resources: vec![Resource::new(
                ResourceKind::new("ec2", "cluster", "v1"),
                "ec2.spinnaker.netflix.com/v1",
                format!("{name}-cluster"),
                "test",
                "fnord",
                json!({ "capacity": 1 }),
            )],
            constraints: vec![],
            notifications: vec![],
            locations: None,
        }],
    }
}

#[test]
fn log_format_reads_json_case_insensitively() {
    assert_eq!(LogFormat::from_env_value(Some("JSON")), LogFormat::Json);
    assert_eq!(LogFormat::from_env_value(Some("pretty")), LogFormat::Text);
    assert_eq!(LogFormat::from_env_value(None), LogFormat::Text);
}

#[test]
fn manifests_load_in_file_name_order_and_skip_other_files() {
    let dir = tempfile::tempdir().unwrap();
    for name in ["b-manifest", "a-manifest"] {
        std::fs::write(
            dir.path().join(format!("{name}.json")),
            serde_json::to_string(&manifest(name)).unwrap(),
        )
        .unwrap();
    }
    std::fs::write(dir.path().join("README.md"), "not a manifest").unwrap();

    let loaded = load_manifests(dir.path()).unwrap();
    let names: Vec<_> = loaded.iter().map(|m| m.name.as_str()).collect();
    assert_eq!(names, ["a-manifest", "b-manifest"]);
}

#[test]
fn invalid_manifest_names_the_file() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(dir.path().join("broken.json"), "{").unwrap();

    let err = load_manifests(dir.path()).unwrap_err();
    assert!(err.to_string().contains("broken.json"));
}

#[tokio::test]
async fn engine_persists_and_checks_a_manifest() {
    let clock = Arc::new(MutableClock::new("2026-03-01T12:00:00Z".parse::<Timestamp>().unwrap()));
    let engine = EngineBuilder::new(KeelConfig::default())
        .clock(clock.clone())
        .build()
        .await;

    let config = manifest("fnord-manifest");
    let resource_id = config.environments[0].resources[0].id.clone();
    let persisted = engine.persister.upsert(config).await.unwrap();
    assert_eq!(persisted.created, vec![resource_id.clone()]);
    assert!(engine.resources.has(&resource_id).await.unwrap());

    // No handler is registered, so the check is recorded as an error.
    assert_eq!(engine.scheduler.check_resources().await.unwrap(), 1);
    let last = engine.events.last_resource_event(&resource_id).await.unwrap().unwrap();
    assert!(matches!(last.details, ResourceEventType::CheckError { .. }));

    assert_eq!(engine.scheduler.check_environments().await.unwrap(), 1);
    // Checked moments ago, so not due again yet.
    assert_eq!(engine.scheduler.check_resources().await.unwrap(), 0);
}

#[tokio::test]
async fn scheduler_stops_on_shutdown_signal() {
    let engine = EngineBuilder::new(KeelConfig::default()).build().await;
    let (tx, rx) = watch::channel(false);
    let scheduler = engine.scheduler.clone();
    let worker = tokio::spawn(async move { scheduler.run(rx).await });

    tx.send(true).unwrap();
    tokio::time::timeout(std::time::Duration::from_secs(5), worker)
        .await
        .unwrap()
        .unwrap();
}

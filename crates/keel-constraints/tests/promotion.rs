use std::sync::Arc;

use jiff::Timestamp;
use keel_constraints::{
    ConstraintError, ConstraintEvaluator, DependsOnEvaluator, EnvironmentPromotionChecker,
    ManualJudgement, PromotionDecision, StatefulEvaluator, VetoEvaluator,
};
use keel_core::MutableClock;
use keel_core::models::delivery_config::{
    ArtifactType, Constraint, DeliveryArtifact, DeliveryConfig, Environment, TimeWindow,
};
use keel_storage::memory::{InMemoryArtifactRepository, InMemoryConstraintStateRepository};
use keel_storage::{ArtifactRepository, InMemoryPublisher};

fn artifact() -> DeliveryArtifact {
    DeliveryArtifact {
        name: "fnord".into(),
        artifact_type: ArtifactType::Deb,
        reference: "fnord-deb".into(),
        delivery_config_name: "fnord-manifest".into(),
    }
}

fn environment(name: &str, constraints: Vec<Constraint>) -> Environment {
    Environment {
        name: name.into(),
        resources: vec![],
        constraints,
        notifications: vec![],
        locations: None,
    }
}

fn config() -> DeliveryConfig {
    DeliveryConfig {
        name: "fnord-manifest".into(),
        application: "fnord".into(),
        service_account: "keel@spinnaker.io".into(),
        artifacts: vec![artifact()],
        environments: vec![
            environment("test", vec![]),
            environment(
                "prod",
                vec![Constraint::DependsOn {
                    environment: "test".into(),
                }],
            ),
            environment("staging", vec![Constraint::ManualJudgement { timeout: None }]),
        ],
    }
}

async fn setup(versions: &[&str]) -> (Arc<InMemoryArtifactRepository>, EnvironmentPromotionChecker) {
    let clock = Arc::new(MutableClock::new("2026-03-02T15:00:00Z".parse::<Timestamp>().unwrap()));
    let artifacts = Arc::new(InMemoryArtifactRepository::new(clock.clone()));
    artifacts.register(&artifact()).await.unwrap();
    for version in versions {
        artifacts.store_version(&artifact(), version).await.unwrap();
    }

    let evaluators: Vec<Arc<dyn ConstraintEvaluator>> = vec![
        Arc::new(DependsOnEvaluator::new(artifacts.clone())),
        Arc::new(VetoEvaluator::new(artifacts.clone())),
        Arc::new(StatefulEvaluator::new(
            ManualJudgement,
            Arc::new(InMemoryConstraintStateRepository::new()),
            Arc::new(InMemoryPublisher::new()),
            clock,
        )),
    ];
    let checker = EnvironmentPromotionChecker::new(evaluators, artifacts.clone());
    (artifacts, checker)
}

#[tokio::test]
async fn unconstrained_environment_approves_newest_version() {
    let (artifacts, checker) = setup(&["fnord-1.0.0", "fnord-1.0.1"]).await;

    let decisions = checker.check_environment(&config(), "test").await.unwrap();
    assert_eq!(
        decisions,
        vec![PromotionDecision {
            artifact: "fnord-deb".into(),
            version: Some("fnord-1.0.1".into()),
            newly_approved: true,
        }]
    );
    assert!(artifacts.is_approved_for(&artifact(), "fnord-1.0.1", "test").await.unwrap());

    let again = checker.check_environment(&config(), "test").await.unwrap();
    assert!(!again[0].newly_approved);
}

#[tokio::test]
async fn picks_newest_version_every_gate_allows() {
    let (artifacts, checker) = setup(&["fnord-1.0.0", "fnord-1.0.1", "fnord-1.0.2"]).await;
    artifacts
        .mark_as_successfully_deployed_to(&artifact(), "fnord-1.0.1", "test")
        .await
        .unwrap();
    artifacts
        .mark_as_successfully_deployed_to(&artifact(), "fnord-1.0.0", "test")
        .await
        .unwrap();

    let decisions = checker.check_environment(&config(), "prod").await.unwrap();
    assert_eq!(decisions[0].version.as_deref(), Some("fnord-1.0.1"));
}

#[tokio::test]
async fn vetoed_versions_are_skipped_even_without_constraints() {
    let (artifacts, checker) = setup(&["fnord-1.0.0", "fnord-1.0.1"]).await;
    artifacts
        .mark_as_vetoed(&artifact(), "fnord-1.0.1", "test")
        .await
        .unwrap();

    let decisions = checker.check_environment(&config(), "test").await.unwrap();
    assert_eq!(decisions[0].version.as_deref(), Some("fnord-1.0.0"));
}

#[tokio::test]
async fn nothing_is_approved_while_judgement_is_pending() {
    let (artifacts, checker) = setup(&["fnord-1.0.0"]).await;

    let decisions = checker.check_environment(&config(), "staging").await.unwrap();
    assert_eq!(decisions[0].version, None);
    assert!(
        artifacts
            .latest_approved_version(&artifact(), "staging")
            .await
            .unwrap()
            .is_none()
    );
}

#[tokio::test]
async fn constraint_without_evaluator_is_a_configuration_error() {
    let (_, checker) = setup(&["fnord-1.0.0"]).await;
    let mut cfg = config();
    cfg.environments[0].constraints.push(Constraint::AllowedTimes {
        windows: vec![TimeWindow {
            days: Some("mon-fri".into()),
            hours: None,
        }],
        tz: None,
    });

    let err = checker.check_environment(&cfg, "test").await.unwrap_err();
    assert!(matches!(err, ConstraintError::NoEvaluator(t) if t == "allowed-times"));
}

#[tokio::test]
async fn unknown_environment_is_an_error() {
    let (_, checker) = setup(&[]).await;
    let err = checker.check_environment(&config(), "perf").await.unwrap_err();
    assert!(matches!(err, ConstraintError::UnknownEnvironment { .. }));
}

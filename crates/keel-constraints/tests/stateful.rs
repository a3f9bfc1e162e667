use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;

use jiff::{SignedDuration, Timestamp};
use keel_constraints::{
    ConstraintError, ConstraintEvaluator, ConstraintOverrides, DecisionContext, ManualJudgement,
    StatefulConstraintLogic, StatefulEvaluator,
};
use keel_core::MutableClock;
use keel_core::models::constraint_state::{ConstraintState, ConstraintStateKey, ConstraintStatus};
use keel_core::models::delivery_config::{
    ArtifactType, Constraint, DeliveryArtifact, DeliveryConfig, Environment,
};
use keel_core::notification::Notification;
use keel_storage::memory::{InMemoryConstraintStateRepository, InMemoryDeliveryConfigRepository};
use keel_storage::{BoxFuture, ConstraintStateRepository, DeliveryConfigRepository, InMemoryPublisher};

/// Counts invocations and passes or fails once told to.
#[derive(Default)]
struct Switch {
    calls: AtomicUsize,
    pass: AtomicBool,
    fail: AtomicBool,
}

struct SwitchLogic(Arc<Switch>);

impl StatefulConstraintLogic for SwitchLogic {
    fn constraint_type(&self) -> &'static str {
        Constraint::MANUAL_JUDGEMENT
    }

    fn decide<'a>(
        &'a self,
        ctx: &'a DecisionContext<'a>,
        state: &'a mut ConstraintState,
    ) -> BoxFuture<'a, Result<(), ConstraintError>> {
        Box::pin(async move {
            self.0.calls.fetch_add(1, Ordering::SeqCst);
            if self.0.pass.load(Ordering::SeqCst) {
                state.judge(ConstraintStatus::Pass, "switch", ctx.now);
            } else if self.0.fail.load(Ordering::SeqCst) {
                state.judge(ConstraintStatus::Fail, "switch", ctx.now);
            }
            Ok(())
        })
    }
}

struct Fixture {
    clock: Arc<MutableClock>,
    states: Arc<InMemoryConstraintStateRepository>,
    publisher: Arc<InMemoryPublisher>,
    config: DeliveryConfig,
}

fn fixture(timeout: Option<SignedDuration>) -> Fixture {
    Fixture {
        clock: Arc::new(MutableClock::new("2026-03-02T15:00:00Z".parse::<Timestamp>().unwrap())),
        states: Arc::new(InMemoryConstraintStateRepository::new()),
        publisher: Arc::new(InMemoryPublisher::new()),
        config: DeliveryConfig {
            name: "fnord-manifest".into(),
            application: "fnord".into(),
            service_account: "keel@spinnaker.io".into(),
            artifacts: vec![artifact()],
            environments: vec![Environment {
                name: "prod".into(),
                resources: vec![],
                constraints: vec![Constraint::ManualJudgement { timeout }],
                notifications: vec![],
                locations: None,
            }],
        },
    }
}

fn artifact() -> DeliveryArtifact {
    DeliveryArtifact {
        name: "fnord".into(),
        artifact_type: ArtifactType::Deb,
        reference: "fnord-deb".into(),
        delivery_config_name: "fnord-manifest".into(),
    }
}

fn key(version: &str) -> ConstraintStateKey {
    ConstraintStateKey::new("fnord-manifest", "prod", version, Constraint::MANUAL_JUDGEMENT)
}

impl Fixture {
    fn evaluator<L: StatefulConstraintLogic>(&self, logic: L) -> StatefulEvaluator<L> {
        StatefulEvaluator::new(logic, self.states.clone(), self.publisher.clone(), self.clock.clone())
    }

    fn prod(&self) -> &Environment {
        &self.config.environments[0]
    }

    fn state_changes(&self) -> Vec<(Option<ConstraintStatus>, ConstraintStatus)> {
        self.publisher
            .notifications()
            .into_iter()
            .filter_map(|n| match n {
                Notification::ConstraintStateChanged(c) => {
                    Some((c.previous.map(|p| p.status), c.current.status))
                }
                _ => None,
            })
            .collect()
    }
}

#[tokio::test]
async fn first_evaluation_creates_pending_and_runs_logic_once() {
    let f = fixture(None);
    let switch = Arc::new(Switch::default());
    let evaluator = f.evaluator(SwitchLogic(switch.clone()));

    let allowed = evaluator
        .can_promote(&artifact(), "v5", &f.config, f.prod())
        .await
        .unwrap();

    assert!(!allowed);
    assert_eq!(switch.calls.load(Ordering::SeqCst), 1);
    assert_eq!(f.state_changes(), vec![(None, ConstraintStatus::Pending)]);
    let stored = f.states.get(&key("v5")).await.unwrap().unwrap();
    assert_eq!(stored.status, ConstraintStatus::Pending);
}

#[tokio::test]
async fn terminal_state_is_sticky() {
    let f = fixture(None);
    let switch = Arc::new(Switch::default());
    let evaluator = f.evaluator(SwitchLogic(switch.clone()));

    switch.pass.store(true, Ordering::SeqCst);
    assert!(evaluator.can_promote(&artifact(), "v5", &f.config, f.prod()).await.unwrap());
    assert_eq!(switch.calls.load(Ordering::SeqCst), 1);

    // the logic would now say no, but it is never asked again
    switch.pass.store(false, Ordering::SeqCst);
    for _ in 0..3 {
        assert!(evaluator.can_promote(&artifact(), "v5", &f.config, f.prod()).await.unwrap());
    }
    assert_eq!(switch.calls.load(Ordering::SeqCst), 1);
    assert_eq!(
        f.state_changes(),
        vec![
            (None, ConstraintStatus::Pending),
            (Some(ConstraintStatus::Pending), ConstraintStatus::Pass),
        ]
    );
}

#[tokio::test]
async fn failed_state_is_sticky() {
    let f = fixture(None);
    let switch = Arc::new(Switch::default());
    let evaluator = f.evaluator(SwitchLogic(switch.clone()));

    switch.fail.store(true, Ordering::SeqCst);
    assert!(!evaluator.can_promote(&artifact(), "v5", &f.config, f.prod()).await.unwrap());
    assert_eq!(switch.calls.load(Ordering::SeqCst), 1);

    switch.fail.store(false, Ordering::SeqCst);
    switch.pass.store(true, Ordering::SeqCst);
    for _ in 0..3 {
        assert!(!evaluator.can_promote(&artifact(), "v5", &f.config, f.prod()).await.unwrap());
    }
    assert_eq!(switch.calls.load(Ordering::SeqCst), 1);
    assert_eq!(
        f.states.get(&key("v5")).await.unwrap().unwrap().status,
        ConstraintStatus::Fail
    );
}

#[tokio::test]
async fn overridden_states_are_sticky() {
    let f = fixture(None);
    let configs = Arc::new(InMemoryDeliveryConfigRepository::new(f.clock.clone()));
    configs.store(&f.config).await.unwrap();
    let overrides = ConstraintOverrides::new(
        f.states.clone(),
        configs,
        f.publisher.clone(),
        f.clock.clone(),
    );
    let switch = Arc::new(Switch::default());
    let evaluator = f.evaluator(SwitchLogic(switch.clone()));

    assert!(!evaluator.can_promote(&artifact(), "v5", &f.config, f.prod()).await.unwrap());
    assert_eq!(switch.calls.load(Ordering::SeqCst), 1);

    overrides
        .override_constraint(&key("v5"), ConstraintStatus::OverridePass, "emburns@netflix.com", None)
        .await
        .unwrap();
    switch.fail.store(true, Ordering::SeqCst);
    for _ in 0..3 {
        assert!(evaluator.can_promote(&artifact(), "v5", &f.config, f.prod()).await.unwrap());
    }
    assert_eq!(switch.calls.load(Ordering::SeqCst), 1);

    overrides
        .override_constraint(&key("v5"), ConstraintStatus::OverrideFail, "emburns@netflix.com", None)
        .await
        .unwrap();
    switch.fail.store(false, Ordering::SeqCst);
    switch.pass.store(true, Ordering::SeqCst);
    for _ in 0..3 {
        assert!(!evaluator.can_promote(&artifact(), "v5", &f.config, f.prod()).await.unwrap());
    }
    assert_eq!(switch.calls.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn pending_state_is_re_evaluated_until_decided() {
    let f = fixture(None);
    let switch = Arc::new(Switch::default());
    let evaluator = f.evaluator(SwitchLogic(switch.clone()));

    assert!(!evaluator.can_promote(&artifact(), "v5", &f.config, f.prod()).await.unwrap());
    assert!(!evaluator.can_promote(&artifact(), "v5", &f.config, f.prod()).await.unwrap());
    switch.pass.store(true, Ordering::SeqCst);
    assert!(evaluator.can_promote(&artifact(), "v5", &f.config, f.prod()).await.unwrap());

    assert_eq!(switch.calls.load(Ordering::SeqCst), 3);
    // unchanged pending evaluations publish nothing
    assert_eq!(f.state_changes().len(), 2);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_first_evaluations_publish_one_creation() {
    let f = fixture(None);
    let evaluator = Arc::new(f.evaluator(SwitchLogic(Arc::new(Switch::default()))));
    let config = Arc::new(f.config.clone());

    let calls = (0..8).map(|_| {
        let evaluator = evaluator.clone();
        let config = config.clone();
        tokio::spawn(async move {
            evaluator
                .can_promote(&artifact(), "v5", &config, &config.environments[0])
                .await
                .unwrap()
        })
    });
    for allowed in futures::future::join_all(calls).await {
        assert!(!allowed.unwrap());
    }

    let created = f
        .state_changes()
        .into_iter()
        .filter(|(previous, _)| previous.is_none())
        .count();
    assert_eq!(created, 1);
}

#[tokio::test]
async fn missing_and_duplicate_constraints_are_configuration_errors() {
    let mut f = fixture(None);
    let evaluator = f.evaluator(ManualJudgement);

    f.config.environments[0].constraints.clear();
    let err = evaluator
        .can_promote(&artifact(), "v5", &f.config, f.prod())
        .await
        .unwrap_err();
    assert!(matches!(err, ConstraintError::MissingConstraint { .. }));

    f.config.environments[0].constraints = vec![
        Constraint::ManualJudgement { timeout: None },
        Constraint::ManualJudgement { timeout: None },
    ];
    let err = evaluator
        .can_promote(&artifact(), "v5", &f.config, f.prod())
        .await
        .unwrap_err();
    assert!(matches!(err, ConstraintError::DuplicateConstraint { .. }));
    assert!(f.states.get(&key("v5")).await.unwrap().is_none());
}

#[tokio::test]
async fn manual_judgement_waits_without_timeout() {
    let f = fixture(None);
    let evaluator = f.evaluator(ManualJudgement);

    assert!(!evaluator.can_promote(&artifact(), "v5", &f.config, f.prod()).await.unwrap());
    f.clock.advance(SignedDuration::from_hours(24 * 30));
    assert!(!evaluator.can_promote(&artifact(), "v5", &f.config, f.prod()).await.unwrap());
    assert_eq!(
        f.states.get(&key("v5")).await.unwrap().unwrap().status,
        ConstraintStatus::Pending
    );
}

#[tokio::test]
async fn manual_judgement_fails_after_timeout() {
    let f = fixture(Some(SignedDuration::from_hours(1)));
    let evaluator = f.evaluator(ManualJudgement);

    assert!(!evaluator.can_promote(&artifact(), "v5", &f.config, f.prod()).await.unwrap());
    f.clock.advance(SignedDuration::from_mins(59));
    evaluator.can_promote(&artifact(), "v5", &f.config, f.prod()).await.unwrap();
    assert_eq!(
        f.states.get(&key("v5")).await.unwrap().unwrap().status,
        ConstraintStatus::Pending
    );

    f.clock.advance(SignedDuration::from_mins(1));
    assert!(!evaluator.can_promote(&artifact(), "v5", &f.config, f.prod()).await.unwrap());
    let state = f.states.get(&key("v5")).await.unwrap().unwrap();
    assert_eq!(state.status, ConstraintStatus::Fail);
    assert_eq!(state.judged_by.as_deref(), Some("keel"));
}

#[tokio::test]
async fn override_decides_a_pending_judgement() {
    let f = fixture(None);
    let configs = Arc::new(InMemoryDeliveryConfigRepository::new(f.clock.clone()));
    configs.store(&f.config).await.unwrap();
    let overrides = ConstraintOverrides::new(
        f.states.clone(),
        configs,
        f.publisher.clone(),
        f.clock.clone(),
    );
    let evaluator = f.evaluator(ManualJudgement);

    assert!(!evaluator.can_promote(&artifact(), "v5", &f.config, f.prod()).await.unwrap());

    let state = overrides
        .override_constraint(
            &key("v5"),
            ConstraintStatus::OverridePass,
            "emburns@netflix.com",
            Some("looks good".into()),
        )
        .await
        .unwrap();
    assert_eq!(state.judged_by.as_deref(), Some("emburns@netflix.com"));
    assert_eq!(state.comment.as_deref(), Some("looks good"));
    assert!(evaluator.can_promote(&artifact(), "v5", &f.config, f.prod()).await.unwrap());

    // overrides can replace each other
    overrides
        .override_constraint(&key("v5"), ConstraintStatus::OverrideFail, "emburns@netflix.com", None)
        .await
        .unwrap();
    assert!(!evaluator.can_promote(&artifact(), "v5", &f.config, f.prod()).await.unwrap());

    let last = f
        .publisher
        .notifications()
        .into_iter()
        .rev()
        .find_map(|n| match n {
            Notification::ConstraintStateChanged(c) => Some(c),
            _ => None,
        })
        .unwrap();
    assert_eq!(last.constraint, Some(Constraint::ManualJudgement { timeout: None }));
    assert_eq!(last.previous.unwrap().status, ConstraintStatus::OverridePass);
}

#[tokio::test]
async fn override_rejects_plain_statuses_and_unknown_keys() {
    let f = fixture(None);
    let overrides = ConstraintOverrides::new(
        f.states.clone(),
        Arc::new(InMemoryDeliveryConfigRepository::new(f.clock.clone())),
        f.publisher.clone(),
        f.clock.clone(),
    );

    let err = overrides
        .override_constraint(&key("v5"), ConstraintStatus::Pass, "emburns@netflix.com", None)
        .await
        .unwrap_err();
    assert!(matches!(err, ConstraintError::InvalidOverride(ConstraintStatus::Pass)));

    let err = overrides
        .override_constraint(&key("v5"), ConstraintStatus::OverridePass, "emburns@netflix.com", None)
        .await
        .unwrap_err();
    assert!(matches!(err, ConstraintError::UnknownConstraintState(_)));
}

#[tokio::test]
async fn manual_judgement_timeout_past_the_end_of_time_never_fires() {
    let f = fixture(Some(SignedDuration::from_hours(200_000_000)));
    let evaluator = f.evaluator(ManualJudgement);

    assert!(!evaluator.can_promote(&artifact(), "v5", &f.config, f.prod()).await.unwrap());
    f.clock.advance(SignedDuration::from_hours(24 * 365));
    assert!(!evaluator.can_promote(&artifact(), "v5", &f.config, f.prod()).await.unwrap());
    assert_eq!(
        f.states.get(&key("v5")).await.unwrap().unwrap().status,
        ConstraintStatus::Pending
    );
}

#[tokio::test]
async fn negative_manual_judgement_timeout_is_a_configuration_error() {
    let f = fixture(Some(SignedDuration::from_hours(-1)));
    let evaluator = f.evaluator(ManualJudgement);

    let err = evaluator
        .can_promote(&artifact(), "v5", &f.config, f.prod())
        .await
        .unwrap_err();
    assert!(matches!(err, ConstraintError::NegativeTimeout(_)));
    assert_eq!(
        f.states.get(&key("v5")).await.unwrap().unwrap().status,
        ConstraintStatus::Pending
    );
}

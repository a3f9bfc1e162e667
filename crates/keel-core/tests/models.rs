use keel_core::models::constraint_state::ConstraintStatus;
use keel_core::models::delivery_config::{
    Constraint, DeliveryConfig, Environment, EnvironmentLocations,
};
use keel_core::models::drift::json_drift;
use keel_core::models::events::{ApplicationEventType, ResourceEvent, ResourceEventType};
use keel_core::models::resource::{Resource, ResourceId, ResourceKind};
use serde_json::json;

fn cluster(name: &str, spec: serde_json::Value) -> Resource {
    Resource::new(
        "ec2/cluster@v1".parse().unwrap(),
        "ec2.spinnaker.netflix.com/v1",
        name,
        "prod",
        "fnord",
        spec,
    )
}

#[test]
fn resource_kind_round_trips_through_its_tag() {
    let kind: ResourceKind = "ec2/security-group@v2".parse().unwrap();
    assert_eq!(kind.group, "ec2");
    assert_eq!(kind.kind, "security-group");
    assert_eq!(kind.version, "v2");
    assert_eq!(kind.to_string(), "ec2/security-group@v2");
}

#[test]
fn malformed_resource_kinds_are_rejected() {
    for bad in ["ec2", "ec2/cluster", "ec2/cluster@1", "/cluster@v1", "ec2/@v1", "ec2/cluster@v"] {
        assert!(bad.parse::<ResourceKind>().is_err(), "{bad} should not parse");
    }
}

#[test]
fn resource_id_is_derived_from_kind_account_and_name() {
    let resource = cluster("fnord-main", json!({}));
    assert_eq!(resource.id.as_str(), "ec2:cluster:prod:fnord-main");
    assert_eq!(
        "ec2:cluster:prod:fnord-main".parse::<ResourceId>().unwrap(),
        resource.id
    );
    assert!("ec2:cluster".parse::<ResourceId>().is_err());
}

#[test]
fn every_resource_gets_a_distinct_uid() {
    let a = cluster("a", json!({}));
    let b = cluster("a", json!({}));
    assert_eq!(a.id, b.id);
    assert_ne!(a.uid, b.uid);
    assert_eq!(a.uid.to_string().len(), 26);
}

#[test]
fn resource_events_serialize_with_a_type_tag() {
    let resource = cluster("fnord-main", json!({}));
    let event = ResourceEvent::new(
        &resource,
        ResourceEventType::CheckError {
            message: "boom".into(),
        },
        "2026-03-01T12:00:00Z".parse().unwrap(),
    );
    let value = serde_json::to_value(&event).unwrap();
    assert_eq!(value["type"], "ResourceCheckError");
    assert_eq!(value["kind"], "ec2/cluster@v1");
    assert_eq!(value["message"], "boom");

    let back: ResourceEvent = serde_json::from_value(value).unwrap();
    assert_eq!(back, event);
}

#[test]
fn repeat_collapsing_is_declared_per_type() {
    assert!(ResourceEventType::Valid.ignore_repeated_in_history());
    assert!(ResourceEventType::DeltaDetected { delta: vec![] }.ignore_repeated_in_history());
    assert!(!ResourceEventType::Created.ignore_repeated_in_history());
    assert!(!ResourceEventType::DeltaResolved.ignore_repeated_in_history());
    assert!(
        ApplicationEventType::ActuationPaused {
            triggered_by: "me".into()
        }
        .ignore_repeated_in_history()
    );
}

#[test]
fn constraint_status_terminality() {
    assert!(!ConstraintStatus::Pending.is_terminal());
    for status in [
        ConstraintStatus::Pass,
        ConstraintStatus::Fail,
        ConstraintStatus::OverridePass,
        ConstraintStatus::OverrideFail,
    ] {
        assert!(status.is_terminal());
    }
    assert!(ConstraintStatus::OverridePass.passes());
    assert!(ConstraintStatus::OverrideFail.fails());
    assert_eq!(
        serde_json::to_value(ConstraintStatus::OverridePass).unwrap(),
        json!("OVERRIDE_PASS")
    );
}

#[test]
fn constraints_deserialize_from_manifest_shape() {
    let constraints: Vec<Constraint> = serde_json::from_value(json!([
        {"type": "depends-on", "environment": "staging"},
        {"type": "manual-judgement"},
        {"type": "allowed-times", "windows": [{"days": "mon-fri", "hours": "9-17"}], "tz": "America/Los_Angeles"},
    ]))
    .unwrap();
    assert_eq!(constraints[0].constraint_type(), Constraint::DEPENDS_ON);
    assert_eq!(constraints[1], Constraint::ManualJudgement { timeout: None });
    assert_eq!(constraints[2].constraint_type(), Constraint::ALLOWED_TIMES);
}

#[test]
fn environment_locations_are_inherited_only_when_missing() {
    let config = DeliveryConfig {
        name: "fnord-manifest".into(),
        application: "fnord".into(),
        service_account: "keel@example.com".into(),
        artifacts: vec![],
        environments: vec![Environment {
            name: "prod".into(),
            resources: vec![
                cluster("inherits", json!({"capacity": {"min": 1}})),
                cluster(
                    "overrides",
                    json!({"locations": {"account": "other", "regions": ["eu-west-1"]}}),
                ),
            ],
            constraints: vec![],
            notifications: vec![],
            locations: Some(EnvironmentLocations {
                account: "prod".into(),
                regions: vec!["us-east-1".into(), "us-west-2".into()],
                subnet: None,
            }),
        }],
    }
    .with_inherited_locations();

    let env = config.environment("prod").unwrap();
    assert_eq!(
        env.resources[0].spec["locations"],
        json!({"account": "prod", "regions": ["us-east-1", "us-west-2"]})
    );
    assert_eq!(env.resources[1].spec["locations"]["account"], "other");
    assert!(config.environment("staging").is_err());
}

#[test]
fn json_drift_reports_nested_fields() {
    let desired = json!({"capacity": {"min": 1, "max": 3}, "image": "fnord-1.0"});
    let actual = json!({"capacity": {"min": 1, "max": 5}, "image": "fnord-1.0", "extra": true});
    let drift = json_drift(&desired, &actual);
    assert_eq!(drift.len(), 1);
    assert_eq!(drift[0].field, "capacity.max");
    assert_eq!(drift[0].expected, json!(3));
    assert_eq!(drift[0].actual, json!(5));

    assert!(json_drift(&desired, &desired).is_empty());
}

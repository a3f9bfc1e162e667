//! Wires the in-memory stores, actuator, evaluators and scheduler together.

use std::sync::Arc;

use keel_actuator::{ActuationPauser, EventRecorder, ResourceActuator, ResourceHandler, ResourcePersister};
use keel_constraints::{
    AllowedTimesEvaluator, ConstraintEvaluator, ConstraintOverrides, DependsOnEvaluator,
    EnvironmentPromotionChecker, ManualJudgement, StatefulEvaluator, VetoEvaluator,
};
use keel_core::{Clock, SystemClock};
use keel_scheduler::{ArtifactVersionSource, CheckScheduler, ScheduledAgent};
use keel_storage::BroadcastPublisher;
use keel_storage::memory::{
    InMemoryAgentLeases, InMemoryArtifactRepository, InMemoryConstraintStateRepository,
    InMemoryDeliveryConfigRepository, InMemoryEventLog, InMemoryPausedRepository,
    InMemoryResourceRepository,
};
use tracing::info;

use crate::config::KeelConfig;

/// Everything a running daemon holds on to.
pub struct Engine {
    pub clock: Arc<dyn Clock>,
    pub events: Arc<InMemoryEventLog>,
    pub resources: Arc<InMemoryResourceRepository>,
    pub delivery_configs: Arc<InMemoryDeliveryConfigRepository>,
    pub artifacts: Arc<InMemoryArtifactRepository>,
    pub constraint_states: Arc<InMemoryConstraintStateRepository>,
    pub paused: Arc<InMemoryPausedRepository>,
    pub agent_leases: Arc<InMemoryAgentLeases>,
    pub publisher: Arc<BroadcastPublisher>,
    pub recorder: EventRecorder,
    pub actuator: Arc<ResourceActuator>,
    pub promotion: Arc<EnvironmentPromotionChecker>,
    pub overrides: ConstraintOverrides,
    pub persister: ResourcePersister,
    pub pauser: ActuationPauser,
    pub scheduler: Arc<CheckScheduler>,
}

pub struct EngineBuilder {
    config: KeelConfig,
    clock: Arc<dyn Clock>,
    handlers: Vec<Arc<dyn ResourceHandler>>,
    version_sources: Vec<Arc<dyn ArtifactVersionSource>>,
    agents: Vec<Arc<dyn ScheduledAgent>>,
}

impl EngineBuilder {
    pub fn new(config: KeelConfig) -> Self {
        Self {
            config,
            clock: Arc::new(SystemClock),
            handlers: Vec::new(),
            version_sources: Vec::new(),
            agents: Vec::new(),
        }
    }

    pub fn clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    pub fn handler(mut self, handler: Arc<dyn ResourceHandler>) -> Self {
        self.handlers.push(handler);
        self
    }

    pub fn version_source(mut self, source: Arc<dyn ArtifactVersionSource>) -> Self {
        self.version_sources.push(source);
        self
    }

    pub fn agent(mut self, agent: Arc<dyn ScheduledAgent>) -> Self {
        self.agents.push(agent);
        self
    }

    pub async fn build(self) -> Engine {
        let clock = self.clock;

        let events = Arc::new(InMemoryEventLog::new());
        let resources = Arc::new(InMemoryResourceRepository::new(clock.clone()));
        let delivery_configs = Arc::new(InMemoryDeliveryConfigRepository::new(clock.clone()));
        let artifacts = Arc::new(InMemoryArtifactRepository::new(clock.clone()));
        let constraint_states = Arc::new(InMemoryConstraintStateRepository::new());
        let paused = Arc::new(InMemoryPausedRepository::new());
        let agent_leases = Arc::new(InMemoryAgentLeases::new(clock.clone()));
        for agent in &self.agents {
            agent_leases.register(agent.name()).await;
        }

        let publisher = Arc::new(BroadcastPublisher::new(self.config.notification_buffer.max(1)));
        let recorder = EventRecorder::new(events.clone(), publisher.clone(), clock.clone());

        let actuator = Arc::new(ResourceActuator::new(
            self.handlers,
            paused.clone(),
            recorder.clone(),
        ));

        let evaluators: Vec<Arc<dyn ConstraintEvaluator>> = vec![
            Arc::new(StatefulEvaluator::new(
                ManualJudgement,
                constraint_states.clone(),
                publisher.clone(),
                clock.clone(),
            )),
            Arc::new(DependsOnEvaluator::new(artifacts.clone())),
            Arc::new(AllowedTimesEvaluator::new(clock.clone())),
            Arc::new(VetoEvaluator::new(artifacts.clone())),
        ];
        let promotion = Arc::new(EnvironmentPromotionChecker::new(evaluators, artifacts.clone()));

        let overrides = ConstraintOverrides::new(
            constraint_states.clone(),
            delivery_configs.clone(),
            publisher.clone(),
            clock.clone(),
        );
        let persister = ResourcePersister::new(
            delivery_configs.clone(),
            resources.clone(),
            artifacts.clone(),
            recorder.clone(),
        );
        let pauser = ActuationPauser::new(
            delivery_configs.clone(),
            resources.clone(),
            paused.clone(),
            recorder.clone(),
        );

        let mut scheduler = CheckScheduler::new(
            self.config.scheduler.clone(),
            resources.clone(),
            delivery_configs.clone(),
            artifacts.clone(),
            agent_leases.clone(),
            actuator.clone(),
            promotion.clone(),
        );
        for source in self.version_sources {
            scheduler = scheduler.with_version_source(source);
        }
        for agent in self.agents {
            scheduler = scheduler.with_agent(agent);
        }
        info!(worker = %scheduler.worker_id(), "engine assembled");

        Engine {
            clock,
            events,
            resources,
            delivery_configs,
            artifacts,
            constraint_states,
            paused,
            agent_leases,
            publisher,
            recorder,
            actuator,
            promotion,
            overrides,
            persister,
            pauser,
            scheduler: Arc::new(scheduler),
        }
    }
}

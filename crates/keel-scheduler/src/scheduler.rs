use std::sync::Arc;

use futures::future::join_all;
use keel_actuator::{ResourceActuator, format_err_chain};
use keel_constraints::EnvironmentPromotionChecker;
use keel_core::models::delivery_config::DeliveryArtifact;
use keel_storage::{ArtifactRepository, DeliveryConfigRepository, PeriodicallyChecked, ResourceRepository};
use tokio::sync::watch;
use tokio::time::{MissedTickBehavior, interval};
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::config::SchedulerConfig;
use crate::error::SchedulerError;
use crate::sources::{ArtifactVersionSource, ScheduledAgent};

/// Drives the resource, environment, artifact and agent check cycles.
pub struct CheckScheduler {
    worker_id: Uuid,
    config: SchedulerConfig,
    resources: Arc<dyn ResourceRepository>,
    delivery_configs: Arc<dyn DeliveryConfigRepository>,
    artifacts: Arc<dyn ArtifactRepository>,
    agent_leases: Arc<dyn PeriodicallyChecked<String>>,
    actuator: Arc<ResourceActuator>,
    promotion: Arc<EnvironmentPromotionChecker>,
    version_sources: Vec<Arc<dyn ArtifactVersionSource>>,
    agents: Vec<Arc<dyn ScheduledAgent>>,
}

impl CheckScheduler {
    pub fn new(
        config: SchedulerConfig,
        resources: Arc<dyn ResourceRepository>,
        delivery_configs: Arc<dyn DeliveryConfigRepository>,
        artifacts: Arc<dyn ArtifactRepository>,
        agent_leases: Arc<dyn PeriodicallyChecked<String>>,
        actuator: Arc<ResourceActuator>,
        promotion: Arc<EnvironmentPromotionChecker>,
    ) -> Self {
        Self {
            worker_id: Uuid::new_v4(),
            config,
            resources,
            delivery_configs,
            artifacts,
            agent_leases,
            actuator,
            promotion,
            version_sources: Vec::new(),
            agents: Vec::new(),
        }
    }

    pub fn with_version_source(mut self, source: Arc<dyn ArtifactVersionSource>) -> Self {
        self.version_sources.push(source);
        self
    }

    pub fn with_agent(mut self, agent: Arc<dyn ScheduledAgent>) -> Self {
        self.agents.push(agent);
        self
    }

    pub fn worker_id(&self) -> Uuid {
        self.worker_id
    }

    /// Run one resource check cycle. Returns the batch size.
    pub async fn check_resources(&self) -> Result<usize, SchedulerError> {
        let cycle = self.config.resources;
        let batch = self
            .resources
            .items_due_for_check(cycle.min_time_since_last_check(), cycle.batch_size)
            .await?;

        join_all(batch.iter().map(|resource| async move {
            if let Err(e) = self.actuator.check_resource(resource).await {
                warn!(
                    worker = %self.worker_id,
                    resource_id = %resource.id,
                    error = %format_err_chain(&e),
                    "resource check failed"
                );
            }
        }))
        .await;

        Ok(batch.len())
    }

    /// Run one environment promotion cycle. Returns the batch size.
    pub async fn check_environments(&self) -> Result<usize, SchedulerError> {
        let cycle = self.config.environments;
        let batch = self
            .delivery_configs
            .items_due_for_check(cycle.min_time_since_last_check(), cycle.batch_size)
            .await?;

        join_all(batch.iter().map(|due| async move {
            if let Err(e) = self
                .promotion
                .check_environment(&due.delivery_config, &due.environment)
                .await
            {
                warn!(
                    worker = %self.worker_id,
                    delivery_config = %due.delivery_config.name,
                    environment = %due.environment,
                    error = %format_err_chain(&e),
                    "environment check failed"
                );
            }
        }))
        .await;

        Ok(batch.len())
    }

    /// Run one artifact version cycle. Returns the batch size.
    pub async fn check_artifacts(&self) -> Result<usize, SchedulerError> {
        let cycle = self.config.artifacts;
        let batch = self
            .artifacts
            .items_due_for_check(cycle.min_time_since_last_check(), cycle.batch_size)
            .await?;

        join_all(batch.iter().map(|artifact| async move {
            if let Err(e) = self.refresh_versions(artifact).await {
                warn!(
                    worker = %self.worker_id,
                    artifact = %artifact.reference,
                    error = %format_err_chain(&e),
                    "artifact check failed"
                );
            }
        }))
        .await;

        Ok(batch.len())
    }

    async fn refresh_versions(&self, artifact: &DeliveryArtifact) -> Result<(), SchedulerError> {
        let Some(source) = self
            .version_sources
            .iter()
            .find(|s| s.supports(artifact.artifact_type))
        else {
            debug!(artifact = %artifact.reference, "no version source for artifact type");
            return Ok(());
        };

        for version in source.versions(artifact).await? {
            if self.artifacts.store_version(artifact, &version).await? {
                info!(artifact = %artifact.reference, version = %version, "new artifact version");
            }
        }
        Ok(())
    }

    /// Run one agent cycle. Returns how many agents were invoked.
    pub async fn run_agents(&self) -> Result<usize, SchedulerError> {
        let cycle = self.config.agents;
        let due = self
            .agent_leases
            .items_due_for_check(cycle.min_time_since_last_check(), cycle.batch_size)
            .await?;
        let agents: Vec<&Arc<dyn ScheduledAgent>> = due
            .iter()
            .filter_map(|name| self.agents.iter().find(|a| a.name() == name))
            .collect();

        join_all(agents.iter().map(|agent| async move {
            if let Err(e) = agent.invoke().await {
                warn!(worker = %self.worker_id, agent = agent.name(), error = %e, "agent failed");
            }
        }))
        .await;

        Ok(agents.len())
    }

    /// Poll every cycle on its own interval until `shutdown` becomes true
    /// (or its sender is dropped).
    pub async fn run(&self, mut shutdown: watch::Receiver<bool>) {
        if *shutdown.borrow() {
            return;
        }

        let mut resources = interval(self.config.resources.interval());
        let mut environments = interval(self.config.environments.interval());
        let mut artifacts = interval(self.config.artifacts.interval());
        let mut agents = interval(self.config.agents.interval());
        for ticker in [&mut resources, &mut environments, &mut artifacts, &mut agents] {
            ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
        }

        info!(worker = %self.worker_id, "scheduler started");
        loop {
            tokio::select! {
                changed = shutdown.changed() => {
                    if changed.is_err() || *shutdown.borrow() {
                        break;
                    }
                }
                _ = resources.tick() => self.log_cycle("resources", self.check_resources().await),
                _ = environments.tick() => self.log_cycle("environments", self.check_environments().await),
                _ = artifacts.tick() => self.log_cycle("artifacts", self.check_artifacts().await),
                _ = agents.tick() => self.log_cycle("agents", self.run_agents().await),
            }
        }
        info!(worker = %self.worker_id, "scheduler stopped");
    }

    fn log_cycle(&self, cycle: &str, result: Result<usize, SchedulerError>) {
        match result {
            Ok(0) => {}
            Ok(count) => debug!(worker = %self.worker_id, cycle, count, "cycle complete"),
            Err(e) => warn!(worker = %self.worker_id, cycle, error = %e, "cycle failed"),
        }
    }
}

//! Install and reset pipelines
//!
//! A pipeline is a fixed sequence of steps published to the bus one at a
//! time. The next step is published only after every handler of the current
//! one returned successfully; the first failure ends the run. Completed steps
//! are never rolled back.

use std::time::Instant;

use serde::Serialize;
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::events::{EventBus, PublishError, Step};
use crate::executor::StepContext;

const INSTALL_STEPS: [Step; 11] = [
    Step::Installing,
    Step::GenerateKey,
    Step::CacheConfig,
    Step::CacheRoutes,
    Step::PublishVendors,
    Step::RunMigrations,
    Step::RunSeeding,
    Step::UpdateCache,
    Step::LinkStorage,
    Step::ExtraStuff,
    Step::Installed,
];

const RESET_STEPS: [Step; 6] = [
    Step::PublishVendors,
    Step::ResetMigrations,
    Step::RunMigrations,
    Step::RunSeeding,
    Step::UpdateCache,
    Step::ExtraStuff,
];

/// The provisioning workflows
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Pipeline {
    Install,
    Reset,
}

impl Pipeline {
    pub const ALL: [Pipeline; 2] = [Pipeline::Install, Pipeline::Reset];

    /// Steps published by this pipeline, in order
    pub fn steps(&self) -> &'static [Step] {
        match self {
            Self::Install => &INSTALL_STEPS,
            Self::Reset => &RESET_STEPS,
        }
    }

    /// Publish every step in order, stopping at the first failure
    pub fn run(&self, bus: &EventBus, ctx: &mut dyn StepContext) -> Result<RunSummary, PipelineError> {
        debug!(pipeline = %self, "Pipeline::run: called");
        let started = Instant::now();
        let mut completed = Vec::with_capacity(self.steps().len());
        let mut handlers_invoked = 0;

        for &step in self.steps() {
            debug!(pipeline = %self, %step, "Pipeline::run: publishing");
            if let Err(source) = bus.publish(step, ctx) {
                warn!(pipeline = %self, %step, completed = completed.len(), "Pipeline stopped");
                return Err(PipelineError {
                    pipeline: *self,
                    step,
                    completed,
                    source,
                });
            }
            handlers_invoked += bus.handler_count(step);
            completed.push(step);
        }

        let summary = RunSummary {
            pipeline: *self,
            steps: completed,
            handlers_invoked,
            elapsed_ms: started.elapsed().as_millis() as u64,
        };
        info!(
            pipeline = %self,
            steps = summary.steps.len(),
            handlers = summary.handlers_invoked,
            elapsed_ms = summary.elapsed_ms,
            "Pipeline complete"
        );
        Ok(summary)
    }
}

impl std::fmt::Display for Pipeline {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Install => write!(f, "install"),
            Self::Reset => write!(f, "reset"),
        }
    }
}

/// Outcome of a successful pipeline run
#[derive(Debug, Clone, Serialize)]
pub struct RunSummary {
    pub pipeline: Pipeline,
    pub steps: Vec<Step>,
    pub handlers_invoked: usize,
    pub elapsed_ms: u64,
}

/// A pipeline stopped at `step`; `completed` lists the steps that finished before it
#[derive(Debug, Error)]
#[error("{pipeline} stopped at {step} after {} completed step(s)", .completed.len())]
pub struct PipelineError {
    pub pipeline: Pipeline,
    pub step: Step,
    pub completed: Vec<Step>,
    #[source]
    pub source: PublishError,
}

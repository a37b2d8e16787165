//! The agent orchestrator: the system's public surface.

use std::sync::Arc;

use tracing::{error, info};

use chainpilot_chain::{ChainClient, EthereumClient};
use chainpilot_core::{Task, TaskId, TaskRecord};
use chainpilot_llm::{Analyst, OpenAiAnalyst};

use crate::config::AgentConfig;
use crate::dispatcher::Dispatcher;
use crate::error::AgentError;

/// Task-execution façade over the reasoning call, the chain client, and the
/// task dispatcher.
///
/// Construction validates the configuration before any collaborator exists.
/// [`initialize`](Agent::initialize) must complete successfully before
/// [`execute_task`](Agent::execute_task) can reach the chain.
pub struct Agent {
    config: AgentConfig,
    analyst: Arc<dyn Analyst>,
    chain: Arc<dyn ChainClient>,
    dispatcher: Dispatcher,
}

impl Agent {
    /// Create an agent with production collaborators built from the
    /// configuration.
    pub fn new(config: AgentConfig) -> Result<Self, AgentError> {
        config.validate()?;

        let mut analyst =
            OpenAiAnalyst::new(config.api_key.clone()).with_timeout_ms(config.timeout_ms);
        if let Some(base_url) = &config.llm_base_url {
            analyst = analyst.with_base_url(base_url.clone());
        }

        let chain = EthereumClient::new(config.provider.clone())
            .with_timeout_ms(config.timeout_ms)
            .with_retries(config.retries);

        Ok(Self::assemble(config, Arc::new(analyst), Arc::new(chain)))
    }

    /// Create an agent with caller-supplied collaborators.
    ///
    /// Used by tests and by callers who bring their own analyst or chain
    /// client. The configuration is still validated.
    pub fn with_collaborators(
        config: AgentConfig,
        analyst: Arc<dyn Analyst>,
        chain: Arc<dyn ChainClient>,
    ) -> Result<Self, AgentError> {
        config.validate()?;
        Ok(Self::assemble(config, analyst, chain))
    }

    fn assemble(
        config: AgentConfig,
        analyst: Arc<dyn Analyst>,
        chain: Arc<dyn ChainClient>,
    ) -> Self {
        let dispatcher = Dispatcher::new(chain.clone());
        Self {
            config,
            analyst,
            chain,
            dispatcher,
        }
    }

    /// The configuration this agent was built with.
    pub fn config(&self) -> &AgentConfig {
        &self.config
    }

    /// Initialize the chain connection and the dispatcher, in that order.
    ///
    /// Any failure aborts startup and propagates to the caller.
    pub async fn initialize(&self) -> Result<(), AgentError> {
        info!(network = %self.config.network, "initializing agent");
        self.chain.initialize().await.map_err(|err| {
            error!(error = %err, "failed to initialize chain connection");
            err
        })?;
        self.dispatcher.initialize().await?;
        info!("agent initialized successfully");
        Ok(())
    }

    /// Analyze a task and drive it to completion.
    ///
    /// The reasoning call runs first; if it fails or returns unparseable
    /// content the error propagates and no task record is created. Handler
    /// faults after submission never propagate - they surface as the
    /// returned record's `Failed` status.
    pub async fn execute_task(&self, task: Task) -> Result<TaskRecord, AgentError> {
        info!(kind = %task.kind, "executing task");
        let plan = self.analyst.analyze(&task).await.map_err(|err| {
            error!(kind = %task.kind, error = %err, "task analysis failed");
            err
        })?;
        Ok(self.dispatcher.submit(task, plan).await)
    }

    /// Look up a task's record. Delegates to the dispatcher.
    pub async fn task_status(&self, task_id: &TaskId) -> Result<TaskRecord, AgentError> {
        Ok(self.dispatcher.status(task_id).await?)
    }

    /// Cancel a pending task. Delegates to the dispatcher.
    pub async fn cancel_task(&self, task_id: &TaskId) -> Result<(), AgentError> {
        Ok(self.dispatcher.cancel(task_id).await?)
    }
}

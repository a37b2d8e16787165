//! Task dispatcher: record table, kind routing, and handler execution.

use std::collections::HashMap;
use std::sync::Arc;

use serde_json::{json, Value};
use thiserror::Error;
use tokio::sync::RwLock;
use tracing::{error, info, warn};

use chainpilot_chain::{ChainClient, ChainError};
use chainpilot_core::{AnalysisPlan, CoreError, Task, TaskId, TaskKind, TaskRecord, TaskStatus};

/// Error message recorded when a pending task is cancelled.
const CANCELLED_MESSAGE: &str = "Task cancelled by user";

/// Faults raised inside a task handler.
///
/// These never leave [`Dispatcher::submit`]; they are converted into the
/// failed record's error message.
#[derive(Debug, Error)]
enum HandlerFault {
    #[error(transparent)]
    Task(#[from] CoreError),

    #[error(transparent)]
    Chain(#[from] ChainError),

    #[error("Analysis plan does not include a contract ABI")]
    MissingAbi,
}

/// Routes tasks to kind handlers and owns the record table.
///
/// Execution is synchronous with respect to the caller: `submit` drives the
/// handler to completion before returning, so there is no background queue
/// despite the name. Records are never evicted; the table grows for the
/// lifetime of the process, an accepted bound for short-lived runs.
pub struct Dispatcher {
    chain: Arc<dyn ChainClient>,
    records: RwLock<HashMap<TaskId, TaskRecord>>,
}

impl Dispatcher {
    /// Create a dispatcher backed by the given chain client.
    pub fn new(chain: Arc<dyn ChainClient>) -> Self {
        Self {
            chain,
            records: RwLock::new(HashMap::new()),
        }
    }

    /// Dispatcher-side setup. Currently nothing to prepare, but the
    /// orchestrator calls this during startup so future resources have a
    /// place to be acquired.
    pub async fn initialize(&self) -> Result<(), CoreError> {
        info!("task dispatcher ready");
        Ok(())
    }

    /// Submit a task for execution and drive it to completion.
    ///
    /// A fresh pending record is inserted before the handler runs, then
    /// transitioned to `Success` or `Failed` once the handler finishes -
    /// unless a concurrent cancel got there first, in which case the
    /// record's terminal state stands. Handler faults are swallowed into
    /// the record; the caller learns of failure only by inspecting the
    /// returned record's status.
    pub async fn submit(&self, task: Task, plan: AnalysisPlan) -> TaskRecord {
        let task_id = TaskId::generate();
        let record = TaskRecord::new(task_id.clone());
        self.records
            .write()
            .await
            .insert(task_id.clone(), record);

        info!(task_id = %task_id, kind = %task.kind, "starting task execution");

        let outcome = self.run_handler(&task, &plan).await;

        let mut records = self.records.write().await;
        // The record is present unless the map was tampered with; re-insert
        // a pending one if a concurrent caller somehow removed it.
        let record = records
            .entry(task_id.clone())
            .or_insert_with(|| TaskRecord::new(task_id.clone()));

        if record.status == TaskStatus::Pending {
            match outcome {
                Ok(result) => {
                    record.succeed(result);
                    info!(task_id = %task_id, "task completed successfully");
                }
                Err(fault) => {
                    record.fail(fault.to_string());
                    error!(task_id = %task_id, error = %fault, "task failed");
                }
            }
        } else {
            // Cancelled while the handler was in flight; the terminal
            // state wins.
            warn!(task_id = %task_id, status = ?record.status, "task already terminal, keeping existing state");
        }

        record.clone()
    }

    /// Look up a task's record. Pure read, no side effect.
    pub async fn status(&self, task_id: &TaskId) -> Result<TaskRecord, CoreError> {
        self.records
            .read()
            .await
            .get(task_id)
            .cloned()
            .ok_or_else(|| CoreError::TaskNotFound(task_id.to_string()))
    }

    /// Cancel a pending task.
    ///
    /// Cancellation is a status flag, not preemption: an in-flight handler
    /// keeps running, but its outcome is discarded because the record is
    /// already terminal. Fails with [`CoreError::TaskNotFound`] for unknown
    /// ids and [`CoreError::NotCancellable`] once the record is terminal.
    pub async fn cancel(&self, task_id: &TaskId) -> Result<(), CoreError> {
        let mut records = self.records.write().await;
        let record = records
            .get_mut(task_id)
            .ok_or_else(|| CoreError::TaskNotFound(task_id.to_string()))?;

        if record.status != TaskStatus::Pending {
            return Err(CoreError::NotCancellable {
                task_id: task_id.to_string(),
                status: record.status,
            });
        }

        record.fail(CANCELLED_MESSAGE);
        info!(task_id = %task_id, "task cancelled");
        Ok(())
    }

    /// Number of records in the table.
    pub async fn record_count(&self) -> usize {
        self.records.read().await.len()
    }

    async fn run_handler(
        &self,
        task: &Task,
        plan: &AnalysisPlan,
    ) -> Result<Option<Value>, HandlerFault> {
        match TaskKind::parse(task)? {
            TaskKind::ContractInteraction {
                contract_address,
                method,
            } => {
                self.execute_contract_interaction(task, plan, &contract_address, &method)
                    .await
            }
            TaskKind::Payment => {
                info!("payment execution not implemented yet");
                Ok(None)
            }
            TaskKind::Monitoring => {
                info!("monitoring execution not implemented yet");
                Ok(None)
            }
        }
    }

    async fn execute_contract_interaction(
        &self,
        task: &Task,
        plan: &AnalysisPlan,
        contract_address: &str,
        method: &str,
    ) -> Result<Option<Value>, HandlerFault> {
        let abi = plan.contract_abi.as_ref().ok_or(HandlerFault::MissingAbi)?;
        let contract = self.chain.contract(contract_address, abi)?;

        let tx_hash = self
            .chain
            .send_contract_call(&contract, method, &task.params)
            .await?;
        info!(%tx_hash, method, "contract call submitted, awaiting confirmation");

        let receipt = self.chain.wait_for_transaction(&tx_hash).await?;
        Ok(Some(json!({
            "txHash": receipt.transaction_hash,
            "blockNumber": receipt.block_number,
        })))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use chainpilot_chain::{ContractHandle, TxReceipt};
    use std::sync::atomic::{AtomicUsize, Ordering};

    const VALID_ADDRESS: &str = "0x00000000219ab540356cBB839Cbe05303d7705Fa";

    fn erc20_abi() -> Value {
        json!([{
            "type": "function",
            "name": "transfer",
            "inputs": [
                {"name": "to", "type": "address"},
                {"name": "amount", "type": "uint256"}
            ]
        }])
    }

    /// Chain client double: counts calls, fails or stalls on demand.
    struct MockChain {
        calls: AtomicUsize,
        fail_wait: bool,
        wait_delay: Option<std::time::Duration>,
    }

    impl MockChain {
        fn new() -> Self {
            Self {
                calls: AtomicUsize::new(0),
                fail_wait: false,
                wait_delay: None,
            }
        }

        fn failing_confirmation() -> Self {
            Self {
                fail_wait: true,
                ..Self::new()
            }
        }

        fn slow_confirmation(delay: std::time::Duration) -> Self {
            Self {
                wait_delay: Some(delay),
                ..Self::new()
            }
        }

        fn call_count(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl ChainClient for MockChain {
        async fn initialize(&self) -> Result<(), ChainError> {
            Ok(())
        }

        fn contract(&self, _address: &str, abi: &Value) -> Result<ContractHandle, ChainError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            ContractHandle::new(VALID_ADDRESS, abi)
        }

        async fn balance(&self, _address: &str) -> Result<String, ChainError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok("1.0".to_string())
        }

        async fn gas_price(&self) -> Result<String, ChainError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok("20.0".to_string())
        }

        async fn transaction_receipt(
            &self,
            hash: &str,
        ) -> Result<Option<TxReceipt>, ChainError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(Some(receipt(hash)))
        }

        async fn wait_for_transaction(&self, hash: &str) -> Result<TxReceipt, ChainError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if let Some(delay) = self.wait_delay {
                tokio::time::sleep(delay).await;
            }
            if self.fail_wait {
                return Err(ChainError::Transaction(format!(
                    "timed out waiting for transaction {hash}"
                )));
            }
            Ok(receipt(hash))
        }

        async fn send_contract_call(
            &self,
            _contract: &ContractHandle,
            _method: &str,
            _params: &[Value],
        ) -> Result<String, ChainError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok("0xhash".to_string())
        }
    }

    fn receipt(hash: &str) -> TxReceipt {
        TxReceipt {
            transaction_hash: hash.to_string(),
            block_number: Some("0x10".to_string()),
            status: Some("0x1".to_string()),
            gas_used: None,
        }
    }

    fn dispatcher(chain: MockChain) -> (Dispatcher, Arc<MockChain>) {
        let chain = Arc::new(chain);
        (Dispatcher::new(chain.clone()), chain)
    }

    fn contract_task() -> Task {
        Task::new("contract_interaction")
            .with_contract("0xABC")
            .with_method("transfer")
            .with_params(vec![json!("0xDEF"), json!(100)])
    }

    #[tokio::test]
    async fn test_contract_interaction_succeeds() {
        let (dispatcher, _) = dispatcher(MockChain::new());
        let record = dispatcher
            .submit(contract_task(), AnalysisPlan::with_abi(erc20_abi()))
            .await;

        assert_eq!(record.status, TaskStatus::Success);
        assert_eq!(record.result.as_ref().unwrap()["txHash"], "0xhash");
    }

    #[tokio::test]
    async fn test_confirmation_timeout_fails_record() {
        let (dispatcher, _) = dispatcher(MockChain::failing_confirmation());
        let record = dispatcher
            .submit(contract_task(), AnalysisPlan::with_abi(erc20_abi()))
            .await;

        assert_eq!(record.status, TaskStatus::Failed);
        let error = record.error.unwrap();
        assert!(!error.is_empty());
        assert!(error.contains("timed out"));
    }

    #[tokio::test]
    async fn test_missing_method_fails_without_chain_contact() {
        let (dispatcher, chain) = dispatcher(MockChain::new());
        let task = Task::new("contract_interaction").with_contract("0xABC");
        let record = dispatcher
            .submit(task, AnalysisPlan::with_abi(erc20_abi()))
            .await;

        assert_eq!(record.status, TaskStatus::Failed);
        assert!(record.error.unwrap().contains("method"));
        assert_eq!(chain.call_count(), 0);
    }

    #[tokio::test]
    async fn test_unknown_kind_fails_naming_the_kind() {
        let (dispatcher, chain) = dispatcher(MockChain::new());
        let record = dispatcher
            .submit(Task::new("teleport"), AnalysisPlan::default())
            .await;

        assert_eq!(record.status, TaskStatus::Failed);
        assert!(record.error.unwrap().contains("teleport"));
        assert_eq!(chain.call_count(), 0);
    }

    #[tokio::test]
    async fn test_missing_abi_fails_record() {
        let (dispatcher, _) = dispatcher(MockChain::new());
        let record = dispatcher
            .submit(contract_task(), AnalysisPlan::default())
            .await;

        assert_eq!(record.status, TaskStatus::Failed);
        assert!(record.error.unwrap().contains("ABI"));
    }

    #[tokio::test]
    async fn test_extension_kinds_succeed() {
        let (dispatcher, chain) = dispatcher(MockChain::new());
        for kind in ["payment", "monitoring"] {
            let record = dispatcher
                .submit(Task::new(kind), AnalysisPlan::default())
                .await;
            assert_eq!(record.status, TaskStatus::Success, "kind {kind}");
        }
        assert_eq!(chain.call_count(), 0);
    }

    #[tokio::test]
    async fn test_each_submission_gets_a_unique_id() {
        let (dispatcher, _) = dispatcher(MockChain::new());
        let first = dispatcher
            .submit(Task::new("payment"), AnalysisPlan::default())
            .await;
        let second = dispatcher
            .submit(Task::new("payment"), AnalysisPlan::default())
            .await;

        assert_ne!(first.task_id, second.task_id);
        assert_eq!(dispatcher.record_count().await, 2);
    }

    #[tokio::test]
    async fn test_status_is_idempotent_after_terminal() {
        let (dispatcher, _) = dispatcher(MockChain::new());
        let record = dispatcher
            .submit(Task::new("monitoring"), AnalysisPlan::default())
            .await;

        let first = dispatcher.status(&record.task_id).await.unwrap();
        let second = dispatcher.status(&record.task_id).await.unwrap();
        assert_eq!(first, second);
        assert_eq!(first, record);
    }

    #[tokio::test]
    async fn test_status_unknown_id_not_found() {
        let (dispatcher, _) = dispatcher(MockChain::new());
        let err = dispatcher.status(&TaskId::new("never-issued")).await;
        assert!(matches!(err, Err(CoreError::TaskNotFound(_))));
    }

    #[tokio::test]
    async fn test_cancel_unknown_id_not_found() {
        let (dispatcher, _) = dispatcher(MockChain::new());
        let err = dispatcher.cancel(&TaskId::new("never-issued")).await;
        assert!(matches!(err, Err(CoreError::TaskNotFound(_))));
    }

    #[tokio::test]
    async fn test_cancel_pending_then_cancel_again() {
        let (dispatcher, _) = dispatcher(MockChain::new());
        // Insert a pending record directly; submit would complete it before
        // cancel could observe the pending state.
        let task_id = TaskId::generate();
        dispatcher
            .records
            .write()
            .await
            .insert(task_id.clone(), TaskRecord::new(task_id.clone()));

        dispatcher.cancel(&task_id).await.unwrap();
        let record = dispatcher.status(&task_id).await.unwrap();
        assert_eq!(record.status, TaskStatus::Failed);
        assert_eq!(record.error.as_deref(), Some("Task cancelled by user"));

        let err = dispatcher.cancel(&task_id).await;
        assert!(matches!(err, Err(CoreError::NotCancellable { .. })));
    }

    #[tokio::test]
    async fn test_cancel_completed_task_is_invalid() {
        let (dispatcher, _) = dispatcher(MockChain::new());
        let record = dispatcher
            .submit(Task::new("payment"), AnalysisPlan::default())
            .await;

        let err = dispatcher.cancel(&record.task_id).await;
        assert!(matches!(err, Err(CoreError::NotCancellable { .. })));
    }

    #[tokio::test]
    async fn test_cancel_while_handler_in_flight() {
        // Cancel-vs-completion race: the cancel lands while the handler is
        // stalled in wait_for_transaction, so the cancelled state must win
        // over the handler's success.
        let (dispatcher, _) = dispatcher(MockChain::slow_confirmation(
            std::time::Duration::from_millis(200),
        ));
        let dispatcher = Arc::new(dispatcher);

        let submit = tokio::spawn({
            let dispatcher = dispatcher.clone();
            async move {
                dispatcher
                    .submit(contract_task(), AnalysisPlan::with_abi(erc20_abi()))
                    .await
            }
        });

        // Wait for the pending record to appear, then cancel it.
        let task_id = loop {
            let records = dispatcher.records.read().await;
            if let Some(id) = records.keys().next().cloned() {
                break id;
            }
            drop(records);
            tokio::time::sleep(std::time::Duration::from_millis(5)).await;
        };
        dispatcher.cancel(&task_id).await.unwrap();

        let record = submit.await.unwrap();
        assert_eq!(record.status, TaskStatus::Failed);
        assert_eq!(record.error.as_deref(), Some(CANCELLED_MESSAGE));
    }
}

//! Prompt construction for task analysis.

use chainpilot_core::Task;

/// System instruction sent with every analysis request.
pub const SYSTEM_PROMPT: &str = "You are an expert blockchain automation assistant. \
Analyze the given task and provide detailed execution steps. \
Respond with a single JSON object containing: contractAbi (the contract's JSON ABI, \
for contract interactions), steps, risks, and expectedOutcomes.";

/// Build the deterministic user prompt for a task.
///
/// Derived only from the task's declared fields, so identical tasks always
/// produce identical prompts.
pub fn build_task_prompt(task: &Task) -> String {
    let params = serde_json::to_string(&task.params).unwrap_or_else(|_| "[]".to_string());
    format!(
        "Task Kind: {}\n\
         Contract Address: {}\n\
         Method: {}\n\
         Parameters: {}\n\n\
         Please analyze this task and provide:\n\
         1. Required steps for execution\n\
         2. Potential risks and mitigations\n\
         3. Expected outcomes\n\
         4. Required blockchain interactions",
        task.kind,
        task.contract_address.as_deref().unwrap_or("none"),
        task.method.as_deref().unwrap_or("none"),
        params,
    )
}

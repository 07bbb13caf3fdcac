// Generation: category routing, prompt assembly, the completion call with its
// bounded retry, and deterministic guardrails on what comes back.
// All completion calls go through llm_client::CompletionService.

pub mod category;
pub mod composer;
pub mod guardrails;
pub mod handlers;
pub mod orchestrator;
pub mod prompts;
pub mod router;

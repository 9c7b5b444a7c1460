pub mod llm_service;
pub mod topic_history;

pub use llm_service::{generate_with_fallback, LlmService, ModelSelection, TextGenerator};
pub use topic_history::{RecentHistory, SessionHistories};

pub mod prompt_builder;
pub mod qa_gate;

pub use prompt_builder::{user_message, AssembledPrompt, PromptBuilder};
pub use qa_gate::{evaluate, is_critical, QaVerdict, CRITICAL_VIOLATIONS};

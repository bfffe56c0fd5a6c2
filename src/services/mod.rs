pub mod guards;
pub mod language_router;
pub mod llm_service;
pub mod name_extractor;
pub mod name_preservation;

pub use guards::{Guard, GuardPipeline, PipelineOutcome};
pub use language_router::detect_language;
pub use llm_service::{Completion, CompletionModel, CompletionRequest, LlmService};
pub use name_extractor::extract_doctor_names;
pub use name_preservation::{NamePreservationReport, RestoreOutcome};

pub mod doctor_name;
pub mod guard;
pub mod language;
pub mod model_contract;
pub mod prompt_bundle;
pub mod section7;

pub use doctor_name::{normalize_for_comparison, DoctorName};
pub use guard::{DateReordering, GuardMetadata, GuardOutcome, TerminologyChange};
pub use language::Language;
pub use model_contract::ModelResponse;
pub use prompt_bundle::{ArtifactKind, FewShotExample, PromptBundle, RulesConfig, TerminologyRules};
pub use section7::{ResultMetadata, Section7Result, TokenUsage};

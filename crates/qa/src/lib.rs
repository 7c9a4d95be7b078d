pub mod confidence;
pub mod context;
pub mod prompt;
pub mod service;
pub mod sources;
pub mod suggest;

pub use confidence::{estimate_confidence, Confidence};
pub use context::{build_context, MAX_CONTEXT_CHARS};
pub use prompt::{build_prompt, SYSTEM_PROMPT};
pub use service::{CapabilityHealth, QaResult, QaService};
pub use sources::attribute_sources;
pub use suggest::{suggest_questions, MAX_SUGGESTIONS};

pub use rptqa_core::{MetadataStore, QaError, ReportMetadata};
pub use rptqa_llm::{Completion, CompletionOptions, CompletionRequest, CompletionResponse};

use std::sync::Arc;

use rptqa_core::{MetadataStore, QaError, Result};
use rptqa_llm::{Completion, CompletionOptions, CompletionRequest};
use tracing::{debug, warn};

use crate::confidence::{estimate_confidence, SCORE_FLOOR};
use crate::context::build_context;
use crate::prompt::{build_prompt, SYSTEM_PROMPT};
use crate::sources::attribute_sources;
use crate::suggest::suggest_questions;

const NOT_FOUND_ANSWER: &str = "Report not found. Please upload the report first.";
const EMPTY_QUESTION_ANSWER: &str = "Please enter a question about the report.";
const UNCONFIGURED_ANSWER: &str = "The language model capability is not configured. Metadata \
browsing and suggested questions remain available.";
const FAILURE_ANSWER: &str =
    "Sorry, I encountered an error while processing your question. Please try again.";

/// One question's structured outcome. Failures are carried in `error`;
/// nothing about a question unwinds past `QaService`.
#[derive(Debug, Clone)]
pub struct QaResult {
    pub question: String,
    pub answer: String,
    pub confidence: f64,
    pub confidence_reasoning: String,
    pub sources: Vec<String>,
    pub error: Option<QaError>,
}

impl QaResult {
    fn failure(question: &str, answer: &str, error: QaError) -> Self {
        Self {
            question: question.to_string(),
            answer: answer.to_string(),
            confidence: SCORE_FLOOR,
            confidence_reasoning: "low: no model answer".to_string(),
            sources: Vec::new(),
            error: Some(error),
        }
    }

    pub fn is_success(&self) -> bool {
        self.error.is_none()
    }
}

#[derive(Debug, Clone)]
pub struct CapabilityHealth {
    pub available: bool,
    pub detail: String,
}

/// Orchestrates lookup -> context -> prompt -> completion -> post-processing.
/// Holds the completion capability as an optional trait object so the service
/// degrades gracefully when no provider is configured and tests can inject
/// deterministic fakes.
pub struct QaService {
    store: Arc<MetadataStore>,
    completion: Option<Arc<dyn Completion>>,
    options: CompletionOptions,
}

impl QaService {
    pub fn new(store: Arc<MetadataStore>, completion: Option<Arc<dyn Completion>>) -> Self {
        Self {
            store,
            completion,
            options: CompletionOptions::default(),
        }
    }

    pub fn with_options(mut self, options: CompletionOptions) -> Self {
        self.options = options;
        self
    }

    pub fn store(&self) -> &Arc<MetadataStore> {
        &self.store
    }

    /// Answer a question about a stored report. Every failure mode comes back
    /// as a `QaResult` with `error` set; the model is never invoked for an
    /// unknown report or an empty question.
    pub async fn answer_question(&self, report_id: &str, question: &str) -> QaResult {
        let question = question.trim();
        if question.is_empty() {
            return QaResult::failure(question, EMPTY_QUESTION_ANSWER, QaError::InvalidQuestion);
        }
        let Some(metadata) = self.store.get(report_id) else {
            return QaResult::failure(
                question,
                NOT_FOUND_ANSWER,
                QaError::ReportNotFound(report_id.to_string()),
            );
        };
        let Some(completion) = &self.completion else {
            return QaResult::failure(
                question,
                UNCONFIGURED_ANSWER,
                QaError::CapabilityUnconfigured,
            );
        };

        let context = build_context(&metadata);
        let request = CompletionRequest {
            system: Some(SYSTEM_PROMPT.to_string()),
            user: build_prompt(&context, question),
        };
        debug!(report_id, context_chars = context.len(), "asking model");

        let call = completion.complete(&request, &self.options);
        match tokio::time::timeout(self.options.timeout, call).await {
            Err(_elapsed) => {
                warn!(
                    report_id,
                    timeout_ms = self.options.timeout.as_millis() as u64,
                    "model call timed out"
                );
                QaResult::failure(question, FAILURE_ANSWER, QaError::CapabilityTimeout)
            }
            Ok(Err(err)) => {
                warn!(report_id, error = %err, "model call failed");
                QaResult::failure(
                    question,
                    FAILURE_ANSWER,
                    QaError::CapabilityError(err.to_string()),
                )
            }
            Ok(Ok(response)) => {
                let answer = response.content.trim().to_string();
                let confidence = estimate_confidence(&answer, &metadata);
                let sources = attribute_sources(&answer, &metadata);
                debug!(
                    report_id,
                    score = confidence.score,
                    sources = sources.len(),
                    completion_tokens = response.completion_tokens,
                    "answer produced"
                );
                QaResult {
                    question: question.to_string(),
                    answer,
                    confidence: confidence.score,
                    confidence_reasoning: confidence.reasoning,
                    sources,
                    error: None,
                }
            }
        }
    }

    /// Suggested questions for a stored report; `ReportNotFound` when the id
    /// is unknown. Works with or without the completion capability.
    pub fn suggested_questions(&self, report_id: &str) -> Result<Vec<String>> {
        let metadata = self
            .store
            .get(report_id)
            .ok_or_else(|| QaError::ReportNotFound(report_id.to_string()))?;
        Ok(suggest_questions(&metadata))
    }

    /// Configuration check only; no completion call is made.
    pub fn capability_health(&self) -> CapabilityHealth {
        match &self.completion {
            Some(completion) => CapabilityHealth {
                available: true,
                detail: completion.describe(),
            },
            None => CapabilityHealth {
                available: false,
                detail: "language model capability is not configured".to_string(),
            },
        }
    }
}

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use rptqa_core::{Formula, MetadataStore, QaError, ReportMetadata, Table};
use rptqa_llm::{Completion, CompletionOptions, CompletionRequest, CompletionResponse, LlmError};
use rptqa_qa::{QaService, SYSTEM_PROMPT};

/// Deterministic capability double: returns a canned answer and counts calls.
struct FakeCompletion {
    calls: AtomicUsize,
    reply: String,
}

impl FakeCompletion {
    fn new(reply: &str) -> Arc<Self> {
        Arc::new(Self {
            calls: AtomicUsize::new(0),
            reply: reply.to_string(),
        })
    }

    fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Completion for FakeCompletion {
    async fn complete(
        &self,
        request: &CompletionRequest,
        _options: &CompletionOptions,
    ) -> Result<CompletionResponse, LlmError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        assert_eq!(request.system.as_deref(), Some(SYSTEM_PROMPT));
        Ok(CompletionResponse {
            content: self.reply.clone(),
            prompt_tokens: 10,
            completion_tokens: 20,
        })
    }

    fn describe(&self) -> String {
        "fake/canned".to_string()
    }
}

/// Capability double that never finishes within any sane timeout.
struct StalledCompletion;

#[async_trait]
impl Completion for StalledCompletion {
    async fn complete(
        &self,
        _request: &CompletionRequest,
        _options: &CompletionOptions,
    ) -> Result<CompletionResponse, LlmError> {
        tokio::time::sleep(Duration::from_secs(3600)).await;
        Err(LlmError::MissingContent)
    }

    fn describe(&self) -> String {
        "fake/stalled".to_string()
    }
}

/// Capability double that fails every call.
struct FailingCompletion;

#[async_trait]
impl Completion for FailingCompletion {
    async fn complete(
        &self,
        _request: &CompletionRequest,
        _options: &CompletionOptions,
    ) -> Result<CompletionResponse, LlmError> {
        Err(LlmError::Api {
            status: 500,
            body: "upstream exploded".to_string(),
        })
    }

    fn describe(&self) -> String {
        "fake/failing".to_string()
    }
}

fn seeded_store() -> Arc<MetadataStore> {
    let store = Arc::new(MetadataStore::new());
    store.insert(ReportMetadata {
        report_id: "r-1".to_string(),
        tables: vec![
            Table {
                name: "Customer".to_string(),
                location: "dbo.Customer".to_string(),
                class_name: "Table".to_string(),
            },
            Table {
                name: "Orders".to_string(),
                location: "dbo.Orders".to_string(),
                class_name: "Table".to_string(),
            },
        ],
        formulas: vec![Formula {
            name: "TotalAmount".to_string(),
            field_name: "{@TotalAmount}".to_string(),
            text: Some("Sum({Orders.Amount})".to_string()),
        }],
        ..ReportMetadata::default()
    });
    store
}

#[tokio::test]
async fn successful_answer_is_scored_and_attributed() {
    let fake = FakeCompletion::new(
        "The report uses the Customer and Orders tables and a TotalAmount formula.",
    );
    let service = QaService::new(seeded_store(), Some(fake.clone()));

    let result = service.answer_question("r-1", "  What tables are used?  ").await;
    assert!(result.is_success());
    assert_eq!(result.question, "What tables are used?");
    assert_eq!(result.sources, vec!["Customer", "Orders", "TotalAmount"]);
    assert!(result.confidence >= 0.75);
    assert_eq!(fake.call_count(), 1);
}

#[tokio::test]
async fn unknown_report_never_reaches_the_model() {
    let fake = FakeCompletion::new("unused");
    let service = QaService::new(seeded_store(), Some(fake.clone()));

    let result = service.answer_question("missing", "What tables are used?").await;
    assert_eq!(
        result.error,
        Some(QaError::ReportNotFound("missing".to_string()))
    );
    assert!(result.answer.contains("not found"));
    assert_eq!(fake.call_count(), 0);
}

#[tokio::test]
async fn blank_question_is_rejected_before_the_model() {
    let fake = FakeCompletion::new("unused");
    let service = QaService::new(seeded_store(), Some(fake.clone()));

    let result = service.answer_question("r-1", "   \n\t ").await;
    assert_eq!(result.error, Some(QaError::InvalidQuestion));
    assert_eq!(fake.call_count(), 0);
}

#[tokio::test]
async fn unconfigured_capability_degrades_gracefully() {
    let service = QaService::new(seeded_store(), None);

    let result = service.answer_question("r-1", "What tables are used?").await;
    assert_eq!(result.error, Some(QaError::CapabilityUnconfigured));
    assert!(result.answer.contains("not configured"));

    // The rest of the system keeps working without the capability.
    let questions = service.suggested_questions("r-1").expect("suggestions");
    assert!(!questions.is_empty());
    let health = service.capability_health();
    assert!(!health.available);
}

#[tokio::test]
async fn stalled_model_call_times_out_as_a_value() {
    let options = CompletionOptions {
        timeout: Duration::from_millis(50),
        ..CompletionOptions::default()
    };
    let service =
        QaService::new(seeded_store(), Some(Arc::new(StalledCompletion))).with_options(options);

    let result = service.answer_question("r-1", "What tables are used?").await;
    assert_eq!(result.error, Some(QaError::CapabilityTimeout));
    assert!(result.confidence <= 0.3);
    assert!(!result.answer.is_empty());
}

#[tokio::test]
async fn provider_failure_becomes_a_structured_error() {
    let service = QaService::new(seeded_store(), Some(Arc::new(FailingCompletion)));

    let result = service.answer_question("r-1", "What tables are used?").await;
    match result.error {
        Some(QaError::CapabilityError(detail)) => assert!(detail.contains("500")),
        other => panic!("expected capability error, got {other:?}"),
    }
    assert!(result.sources.is_empty());
}

#[tokio::test]
async fn suggestions_require_a_stored_report() {
    let service = QaService::new(Arc::new(MetadataStore::new()), None);
    assert_eq!(
        service.suggested_questions("missing"),
        Err(QaError::ReportNotFound("missing".to_string()))
    );
}

#[tokio::test]
async fn health_reports_the_configured_provider() {
    let fake = FakeCompletion::new("unused");
    let service = QaService::new(seeded_store(), Some(fake));
    let health = service.capability_health();
    assert!(health.available);
    assert_eq!(health.detail, "fake/canned");
}

// Integration tests for the form auto-fill coalescing engine
//
// These verify the watermark decision rule, the at-most-one-in-flight
// invariant, merge precedence for manual edits, and rollback on remote
// failure.

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use anyhow::Result;
use scribeflow::coalesce::{merge_form_values, FormFiller, TriggerOutcome};
use scribeflow::llm::{
    AzureConfig, EvaluateQuestionsRequest, EvaluateQuestionsResponse, FillFormRequest,
    FillFormResponse, FormField, FormFieldType, LlmConfig, LlmProvider, LlmService,
};
use serde_json::{json, Map, Value};
use tokio::sync::Notify;

struct MockLlm {
    calls: AtomicUsize,
    fail: AtomicBool,
    values: Mutex<Map<String, Value>>,
    last_request: Mutex<Option<FillFormRequest>>,
    /// When set, fill_form signals `entered` and blocks until `release`.
    gate: Option<(Arc<Notify>, Arc<Notify>)>,
}

impl MockLlm {
    fn returning(values: Map<String, Value>) -> Arc<Self> {
        Arc::new(Self {
            calls: AtomicUsize::new(0),
            fail: AtomicBool::new(false),
            values: Mutex::new(values),
            last_request: Mutex::new(None),
            gate: None,
        })
    }

    fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait::async_trait]
impl LlmService for MockLlm {
    async fn fill_form(&self, request: FillFormRequest) -> Result<FillFormResponse> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        *self.last_request.lock().unwrap() = Some(request);

        if let Some((entered, release)) = &self.gate {
            entered.notify_one();
            release.notified().await;
        }
        if self.fail.load(Ordering::SeqCst) {
            anyhow::bail!("simulated backend failure");
        }
        Ok(FillFormResponse {
            values: self.values.lock().unwrap().clone(),
        })
    }

    async fn evaluate_questions(
        &self,
        _request: EvaluateQuestionsRequest,
    ) -> Result<EvaluateQuestionsResponse> {
        anyhow::bail!("not used by form tests");
    }
}

fn llm_config() -> LlmConfig {
    LlmConfig {
        provider: LlmProvider::AzureOpenai,
        api_key: "test-key".to_string(),
        model: "gpt-test".to_string(),
        azure_config: Some(AzureConfig {
            api_version: "2024-06-01".to_string(),
            azure_endpoint: "https://example.openai.azure.com".to_string(),
            deployment_name: "gpt-test".to_string(),
        }),
        langdock_config: None,
    }
}

fn fields() -> Vec<FormField> {
    vec![
        FormField {
            id: "a".to_string(),
            label: "Field A".to_string(),
            field_type: FormFieldType::String,
            description: None,
            options: None,
        },
        FormField {
            id: "b".to_string(),
            label: "Field B".to_string(),
            field_type: FormFieldType::String,
            description: None,
            options: None,
        },
    ]
}

fn values(pairs: &[(&str, &str)]) -> Map<String, Value> {
    pairs
        .iter()
        .map(|(k, v)| (k.to_string(), json!(v)))
        .collect()
}

#[test]
fn test_merge_precedence_manual_edits_dominate() {
    // Previous {a: x}, remote {a: z, b: w}, manual {a: y}
    let merged = merge_form_values(
        &values(&[("a", "x")]),
        &values(&[("a", "z"), ("b", "w")]),
        &values(&[("a", "y")]),
    );

    assert_eq!(merged["a"], json!("y"), "manual edit must win over remote");
    assert_eq!(merged["b"], json!("w"));
}

#[tokio::test]
async fn test_trigger_issues_one_call_and_merges() -> Result<()> {
    let llm = MockLlm::returning(values(&[("a", "filled-a"), ("b", "filled-b")]));
    let filler = FormFiller::new(llm.clone());

    let outcome = filler
        .trigger_fill("the transcript", &fields(), &llm_config())
        .await?;

    assert_eq!(outcome, TriggerOutcome::Triggered);
    assert_eq!(llm.calls(), 1);
    assert_eq!(filler.values()["a"], json!("filled-a"));
    assert_eq!(filler.values()["b"], json!("filled-b"));
    Ok(())
}

#[tokio::test]
async fn test_second_trigger_with_unchanged_transcript_is_skipped() -> Result<()> {
    let llm = MockLlm::returning(values(&[("a", "filled")]));
    let filler = FormFiller::new(llm.clone());

    let first = filler
        .trigger_fill("same transcript", &fields(), &llm_config())
        .await?;
    let second = filler
        .trigger_fill("same transcript", &fields(), &llm_config())
        .await?;

    assert_eq!(first, TriggerOutcome::Triggered);
    assert_eq!(second, TriggerOutcome::Skipped);
    assert_eq!(llm.calls(), 1, "unchanged transcript must not re-trigger");
    Ok(())
}

#[tokio::test]
async fn test_watermark_requires_strict_growth() -> Result<()> {
    let llm = MockLlm::returning(values(&[("a", "filled")]));
    let filler = FormFiller::new(llm.clone());

    let transcript_100 = "x".repeat(100);
    filler
        .trigger_fill(&transcript_100, &fields(), &llm_config())
        .await?;

    assert!(!filler.should_fill(&transcript_100), "watermark == len");
    assert!(filler.should_fill(&"x".repeat(101)), "len > watermark");
    Ok(())
}

#[tokio::test]
async fn test_empty_transcript_never_triggers() -> Result<()> {
    let llm = MockLlm::returning(Map::new());
    let filler = FormFiller::new(llm.clone());

    assert!(!filler.should_fill(""));
    assert!(!filler.should_fill("   \n\t"));

    let outcome = filler.trigger_fill("   ", &fields(), &llm_config()).await?;
    assert_eq!(outcome, TriggerOutcome::Skipped);
    assert_eq!(llm.calls(), 0);
    Ok(())
}

#[tokio::test]
async fn test_complete_form_never_triggers() -> Result<()> {
    let llm = MockLlm::returning(Map::new());
    let filler = FormFiller::new(llm.clone());

    filler.toggle_complete();
    let outcome = filler
        .trigger_fill("plenty of transcript", &fields(), &llm_config())
        .await?;

    assert_eq!(outcome, TriggerOutcome::Skipped);
    assert_eq!(llm.calls(), 0);
    Ok(())
}

#[tokio::test]
async fn test_manual_edits_survive_remote_fill() -> Result<()> {
    let llm = MockLlm::returning(values(&[("a", "z"), ("b", "w")]));
    let filler = FormFiller::new(llm.clone());

    filler.set_manual_value("a", json!("y"));
    filler
        .trigger_fill("the transcript", &fields(), &llm_config())
        .await?;

    let merged = filler.values();
    assert_eq!(merged["a"], json!("y"), "manual edit must win over remote");
    assert_eq!(merged["b"], json!("w"));
    Ok(())
}

#[tokio::test]
async fn test_previous_values_carry_manual_edits() -> Result<()> {
    let llm = MockLlm::returning(values(&[("b", "w")]));
    let filler = FormFiller::new(llm.clone());

    filler.set_manual_value("a", json!("user typed this"));
    filler
        .trigger_fill("the transcript", &fields(), &llm_config())
        .await?;

    let request = llm.last_request.lock().unwrap().clone().unwrap();
    let previous = request.previous_values.expect("previous values should be sent");
    assert_eq!(previous["a"], json!("user typed this"));
    Ok(())
}

#[tokio::test]
async fn test_first_fill_sends_no_previous_values() -> Result<()> {
    let llm = MockLlm::returning(values(&[("a", "filled")]));
    let filler = FormFiller::new(llm.clone());

    filler
        .trigger_fill("the transcript", &fields(), &llm_config())
        .await?;

    let request = llm.last_request.lock().unwrap().clone().unwrap();
    assert!(request.previous_values.is_none());
    Ok(())
}

#[tokio::test]
async fn test_failure_rolls_back_and_allows_retry() -> Result<()> {
    let llm = MockLlm::returning(values(&[("a", "filled")]));
    llm.fail.store(true, Ordering::SeqCst);
    let filler = FormFiller::new(llm.clone());

    let result = filler
        .trigger_fill("the transcript", &fields(), &llm_config())
        .await;
    assert!(result.is_err());
    assert!(filler.values().is_empty(), "failed call must not change state");

    // Watermark unchanged: the same transcript still qualifies
    assert!(filler.should_fill("the transcript"));

    llm.fail.store(false, Ordering::SeqCst);
    let outcome = filler
        .trigger_fill("the transcript", &fields(), &llm_config())
        .await?;
    assert_eq!(outcome, TriggerOutcome::Triggered);
    assert_eq!(llm.calls(), 2);
    Ok(())
}

#[tokio::test]
async fn test_concurrent_trigger_is_dropped_not_queued() -> Result<()> {
    let entered = Arc::new(Notify::new());
    let release = Arc::new(Notify::new());
    let llm = Arc::new(MockLlm {
        calls: AtomicUsize::new(0),
        fail: AtomicBool::new(false),
        values: Mutex::new(values(&[("a", "filled")])),
        last_request: Mutex::new(None),
        gate: Some((entered.clone(), release.clone())),
    });
    let filler = Arc::new(FormFiller::new(llm.clone()));

    let background = {
        let filler = Arc::clone(&filler);
        let config = llm_config();
        tokio::spawn(async move {
            filler
                .trigger_fill("the transcript", &fields(), &config)
                .await
        })
    };

    // Wait until the first call is inside the remote request
    entered.notified().await;

    let second = filler
        .trigger_fill("the transcript grew meanwhile", &fields(), &llm_config())
        .await?;
    assert_eq!(second, TriggerOutcome::Skipped, "second trigger must drop, not queue");

    release.notify_one();
    let first = background.await??;
    assert_eq!(first, TriggerOutcome::Triggered);
    assert_eq!(llm.calls(), 1);
    Ok(())
}

#[tokio::test]
async fn test_reset_clears_state_and_watermark() -> Result<()> {
    let llm = MockLlm::returning(values(&[("a", "filled")]));
    let filler = FormFiller::new(llm.clone());

    filler.set_manual_value("a", json!("manual"));
    filler
        .trigger_fill("the transcript", &fields(), &llm_config())
        .await?;
    filler.toggle_complete();

    filler.reset();

    assert!(filler.values().is_empty());
    assert!(filler.manual_edits().is_empty());
    assert!(!filler.is_complete());
    assert!(filler.should_fill("the transcript"), "watermark must reset");
    Ok(())
}

use std::collections::HashSet;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use anyhow::{Context, Result};
use tracing::info;

use crate::llm::{EvaluateQuestionsRequest, LlmConfig, LlmService, QuestionPrompt};
use crate::session::LiveQuestion;

use super::{InFlightGuard, TriggerOutcome};

/// Evaluates the user's open questions against a growing live
/// transcript.
///
/// Pending items are the unanswered questions. Beyond transcript
/// growth, adding a question re-qualifies a trigger even when the
/// transcript hasn't grown since the last evaluation; the identity
/// watermark tracks which questions the last successful call saw.
pub struct QuestionEvaluator {
    llm: Arc<dyn LlmService>,
    questions: Mutex<Vec<LiveQuestion>>,
    last_evaluated_transcript_len: AtomicUsize,
    last_evaluated_ids: Mutex<HashSet<String>>,
    in_flight: AtomicBool,
}

impl QuestionEvaluator {
    pub fn new(llm: Arc<dyn LlmService>) -> Self {
        Self::with_questions(llm, Vec::new())
    }

    /// Restore from a persisted question list.
    pub fn with_questions(llm: Arc<dyn LlmService>, questions: Vec<LiveQuestion>) -> Self {
        Self {
            llm,
            questions: Mutex::new(questions),
            last_evaluated_transcript_len: AtomicUsize::new(0),
            last_evaluated_ids: Mutex::new(HashSet::new()),
            in_flight: AtomicBool::new(false),
        }
    }

    /// Add an unanswered question. Empty/whitespace-only text is
    /// ignored. Returns the created question.
    pub fn add_question(&self, text: &str) -> Option<LiveQuestion> {
        let question = LiveQuestion::new(text)?;
        self.questions.lock().unwrap().push(question.clone());
        Some(question)
    }

    pub fn remove_question(&self, id: &str) -> bool {
        let mut questions = self.questions.lock().unwrap();
        let before = questions.len();
        questions.retain(|q| q.id != id);
        questions.len() != before
    }

    /// Answered → unanswered, clearing the answer so the question is
    /// re-evaluated on the next qualifying event.
    pub fn reset_question(&self, id: &str) -> bool {
        let mut questions = self.questions.lock().unwrap();
        match questions.iter_mut().find(|q| q.id == id) {
            Some(question) => {
                question.reset();
                true
            }
            None => false,
        }
    }

    pub fn questions(&self) -> Vec<LiveQuestion> {
        self.questions.lock().unwrap().clone()
    }

    /// Whether an evaluation call should be made for this transcript.
    pub fn should_evaluate(&self, transcript: &str) -> bool {
        let unanswered: Vec<String> = {
            let questions = self.questions.lock().unwrap();
            questions
                .iter()
                .filter(|q| !q.is_answered())
                .map(|q| q.id.clone())
                .collect()
        };

        if unanswered.is_empty() {
            return false;
        }
        if transcript.trim().is_empty() {
            return false;
        }

        if transcript.len() > self.last_evaluated_transcript_len.load(Ordering::SeqCst) {
            return true;
        }

        let seen = self.last_evaluated_ids.lock().unwrap();
        unanswered.iter().any(|id| !seen.contains(id))
    }

    /// Issue at most one evaluation call for the current transcript
    /// and unanswered questions.
    ///
    /// On success, the transcript watermark advances to the call-time
    /// length, the identity watermark is replaced with the set of
    /// questions actually sent, and only questions the response marked
    /// answered (with an answer) transition; the rest stay untouched.
    /// On failure only the in-flight flag resets.
    pub async fn trigger_evaluation(
        &self,
        transcript: &str,
        config: &LlmConfig,
    ) -> Result<TriggerOutcome> {
        if self.in_flight.load(Ordering::SeqCst) {
            return Ok(TriggerOutcome::Skipped);
        }
        if !self.should_evaluate(transcript) {
            return Ok(TriggerOutcome::Skipped);
        }
        if self.in_flight.swap(true, Ordering::SeqCst) {
            return Ok(TriggerOutcome::Skipped);
        }
        let _guard = InFlightGuard::new(&self.in_flight);

        let sent: Vec<QuestionPrompt> = {
            let questions = self.questions.lock().unwrap();
            questions
                .iter()
                .filter(|q| !q.is_answered())
                .map(|q| QuestionPrompt {
                    id: q.id.clone(),
                    question: q.question.clone(),
                })
                .collect()
        };

        let request = EvaluateQuestionsRequest {
            llm: config.clone(),
            transcript: transcript.to_string(),
            questions: sent.clone(),
        };

        let response = self
            .llm
            .evaluate_questions(request)
            .await
            .context("live question evaluation failed")?;

        self.last_evaluated_transcript_len
            .store(transcript.len(), Ordering::SeqCst);
        *self.last_evaluated_ids.lock().unwrap() =
            sent.iter().map(|q| q.id.clone()).collect();

        let mut answered = 0;
        {
            let mut questions = self.questions.lock().unwrap();
            for evaluation in response.evaluations {
                if !evaluation.answered {
                    continue;
                }
                // An "answered" verdict without answer text is ignored:
                // answer presence and answered status move together.
                let Some(answer) = evaluation.answer else {
                    continue;
                };
                if let Some(question) = questions
                    .iter_mut()
                    .find(|q| q.id == evaluation.id && !q.is_answered())
                {
                    question.mark_answered(answer, transcript.len());
                    answered += 1;
                }
            }
        }

        if answered > 0 {
            info!("Live question evaluation answered {} question(s)", answered);
        }
        Ok(TriggerOutcome::Triggered)
    }

    /// Remove every question and reset both watermarks.
    pub fn clear_all(&self) {
        self.questions.lock().unwrap().clear();
        self.reset_evaluation_tracking();
    }

    /// Reset the watermarks without touching the questions, so the
    /// next transcript re-evaluates everything (used when the session
    /// transcript itself is cleared).
    pub fn reset_evaluation_tracking(&self) {
        self.last_evaluated_transcript_len.store(0, Ordering::SeqCst);
        self.last_evaluated_ids.lock().unwrap().clear();
    }
}

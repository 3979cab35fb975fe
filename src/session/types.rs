use chrono::Utc;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;
use std::str::FromStr;

/// The two independent workflow modes. Each persists its own session
/// record under its own key namespace.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Mode {
    /// File upload, batch transcript.
    Standard,
    /// Live streaming transcript.
    Realtime,
}

impl Mode {
    pub fn as_str(&self) -> &'static str {
        match self {
            Mode::Standard => "standard",
            Mode::Realtime => "realtime",
        }
    }
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Mode {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "standard" => Ok(Mode::Standard),
            "realtime" => Ok(Mode::Realtime),
            _ => Err(()),
        }
    }
}

/// What the standard workflow renders from a transcript.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputMode {
    #[default]
    Summary,
    Form,
}

impl OutputMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            OutputMode::Summary => "summary",
            OutputMode::Form => "form",
        }
    }
}

impl FromStr for OutputMode {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "summary" => Ok(OutputMode::Summary),
            "form" => Ok(OutputMode::Form),
            _ => Err(()),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum QuestionStatus {
    Unanswered,
    Answered,
}

/// A question the user wants answered during a live session.
///
/// `answer` is present exactly when `status` is `Answered`; every
/// transition below maintains that.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LiveQuestion {
    pub id: String,
    pub question: String,
    pub status: QuestionStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub answer: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub answered_at_transcript_length: Option<usize>,
    pub created_at: i64,
}

impl LiveQuestion {
    /// Create an unanswered question. Returns `None` for
    /// empty/whitespace-only text.
    pub fn new(text: &str) -> Option<Self> {
        let trimmed = text.trim();
        if trimmed.is_empty() {
            return None;
        }
        Some(Self {
            id: uuid::Uuid::new_v4().to_string(),
            question: trimmed.to_string(),
            status: QuestionStatus::Unanswered,
            answer: None,
            answered_at_transcript_length: None,
            created_at: Utc::now().timestamp_millis(),
        })
    }

    pub fn is_answered(&self) -> bool {
        self.status == QuestionStatus::Answered
    }

    /// Unanswered → answered, recording the transcript length the
    /// answer was found at.
    pub fn mark_answered(&mut self, answer: String, transcript_len: usize) {
        self.status = QuestionStatus::Answered;
        self.answer = Some(answer);
        self.answered_at_transcript_length = Some(transcript_len);
    }

    /// Answered → unanswered, clearing the answer and its watermark.
    pub fn reset(&mut self) {
        self.status = QuestionStatus::Unanswered;
        self.answer = None;
        self.answered_at_transcript_length = None;
    }
}

/// One mode's persisted session record.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SessionData {
    pub transcript: String,
    pub summary: String,
    pub form_template_id: Option<String>,
    pub form_values: Map<String, Value>,
    /// Standard mode only; defaults to `Summary`.
    pub output_mode: OutputMode,
    /// Realtime mode only; empty for standard sessions.
    pub questions: Vec<LiveQuestion>,
    /// Epoch ms of the last transcript write. `None` until a
    /// transcript has ever been saved in this mode.
    pub updated_at: Option<i64>,
}

/// Result of the cross-mode recency comparison.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LatestTranscript {
    pub transcript: String,
    pub mode: Mode,
}

/// Folds streamed transcript turns into one growing transcript.
///
/// The STT service re-delivers a turn's final text progressively: a
/// later final that extends the previous one replaces it instead of
/// being appended, so the transcript never repeats a turn. A partial
/// starts a new turn and resets that replacement tracking.
#[derive(Debug, Default, Clone)]
pub struct TranscriptAccumulator {
    committed: String,
    last_final: String,
    partial: String,
}

impl TranscriptAccumulator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Restore from a persisted transcript.
    pub fn with_committed(committed: String) -> Self {
        Self {
            committed,
            last_final: String::new(),
            partial: String::new(),
        }
    }

    /// Fold in a final turn.
    pub fn fold_final(&mut self, text: &str) {
        if !self.last_final.is_empty() && text.starts_with(&self.last_final) {
            // Progressive update: replace the last final with the longer version.
            self.committed
                .truncate(self.committed.len() - self.last_final.len());
            self.committed.push_str(text);
        } else if self.committed.is_empty() {
            self.committed.push_str(text);
        } else {
            self.committed.push(' ');
            self.committed.push_str(text);
        }
        self.last_final = text.to_string();
        self.partial.clear();
    }

    /// Replace the in-progress partial. A partial means a new turn has
    /// started, so progressive-final replacement is reset.
    pub fn set_partial(&mut self, text: &str) {
        self.last_final.clear();
        self.partial = text.to_string();
    }

    /// Finalized transcript text (what gets persisted).
    pub fn committed_text(&self) -> &str {
        &self.committed
    }

    pub fn partial_text(&self) -> &str {
        &self.partial
    }

    /// Committed text plus the in-progress partial, for display.
    pub fn full_text(&self) -> String {
        if self.partial.is_empty() {
            self.committed.clone()
        } else if self.committed.is_empty() {
            self.partial.clone()
        } else {
            format!("{} {}", self.committed, self.partial)
        }
    }

    pub fn clear(&mut self) {
        self.committed.clear();
        self.last_final.clear();
        self.partial.clear();
    }
}

//! Re-trigger coalescing for expensive remote calls
//!
//! Live transcripts grow continuously; firing an LLM call on every
//! incremental update would cause request storms, out-of-order
//! responses, and runaway cost. Both consumers here (form auto-fill,
//! live question evaluation) share the same cursor shape:
//!
//! - a transcript-length watermark recording how much transcript the
//!   last successful call accounted for,
//! - an identity watermark (question evaluator only) recording which
//!   pending items that call saw, and
//! - an in-flight flag guaranteeing at most one outstanding remote
//!   call per instance: a second trigger while one is outstanding is
//!   silently dropped, never queued.
//!
//! Call volume is therefore proportional to distinct growth/new-item
//! events, not to update frequency.

mod form;
mod questions;

pub use form::{merge_form_values, FormFiller};
pub use questions::QuestionEvaluator;

use std::sync::atomic::{AtomicBool, Ordering};

/// What a trigger call did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TriggerOutcome {
    /// A remote call was issued and its result merged.
    Triggered,
    /// Nothing qualified (no growth, no new items, or a call was
    /// already in flight); no remote call was made.
    Skipped,
}

/// Clears the in-flight flag on every exit path, so a failed or
/// panicked call never permanently blocks future triggers.
pub(crate) struct InFlightGuard<'a>(&'a AtomicBool);

impl<'a> InFlightGuard<'a> {
    pub(crate) fn new(flag: &'a AtomicBool) -> Self {
        Self(flag)
    }
}

impl Drop for InFlightGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::SeqCst);
    }
}

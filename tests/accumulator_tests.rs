// Unit tests for the transcript accumulator's progressive-final
// folding.

use scribeflow::realtime::TranscriptAccumulator;

#[test]
fn test_finals_append_with_separator() {
    let mut acc = TranscriptAccumulator::new();

    acc.fold_final("Hello everyone.");
    acc.set_partial("let's");
    acc.fold_final("Let's get started.");

    assert_eq!(acc.committed_text(), "Hello everyone. Let's get started.");
}

#[test]
fn test_progressive_final_replaces_previous() {
    let mut acc = TranscriptAccumulator::new();

    acc.fold_final("Hello");
    acc.fold_final("Hello everyone");
    acc.fold_final("Hello everyone, welcome");

    // Progressive re-deliveries of the same turn replace, not append
    assert_eq!(acc.committed_text(), "Hello everyone, welcome");
}

#[test]
fn test_partial_resets_progressive_tracking() {
    let mut acc = TranscriptAccumulator::new();

    acc.fold_final("First turn");
    acc.set_partial("second");
    acc.fold_final("First turn continued");

    // The partial marked a new turn, so even a prefix-extending final
    // appends instead of replacing
    assert_eq!(acc.committed_text(), "First turn First turn continued");
}

#[test]
fn test_partial_is_display_only() {
    let mut acc = TranscriptAccumulator::new();

    acc.fold_final("Committed text.");
    acc.set_partial("in progress");

    assert_eq!(acc.committed_text(), "Committed text.");
    assert_eq!(acc.partial_text(), "in progress");
    assert_eq!(acc.full_text(), "Committed text. in progress");
}

#[test]
fn test_final_clears_partial() {
    let mut acc = TranscriptAccumulator::new();

    acc.set_partial("in prog");
    acc.fold_final("In progress turn done.");

    assert_eq!(acc.partial_text(), "");
    assert_eq!(acc.full_text(), "In progress turn done.");
}

#[test]
fn test_restore_from_persisted_transcript() {
    let mut acc = TranscriptAccumulator::with_committed("Earlier session text.".to_string());

    acc.fold_final("New turn");
    assert_eq!(acc.committed_text(), "Earlier session text. New turn");
}

#[test]
fn test_clear() {
    let mut acc = TranscriptAccumulator::new();
    acc.fold_final("Some text");
    acc.set_partial("partial");

    acc.clear();
    assert_eq!(acc.full_text(), "");
}

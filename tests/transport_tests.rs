// Serialization tests for transport messages
//
// The STT service consumes/produces these JSON shapes; the field names
// are wire contract, not implementation detail.

use base64::Engine;
use scribeflow::transport::{AudioFrameMessage, TranscriptMessage};

#[test]
fn test_audio_frame_serialization() {
    let msg = AudioFrameMessage {
        session_id: "test-session".to_string(),
        sequence: 0,
        pcm: base64::engine::general_purpose::STANDARD.encode([0u8; 100]),
        sample_rate: 16000,
        channels: 1,
        timestamp: "2026-08-07T14:30:00Z".to_string(),
        final_frame: false,
    };

    let json = serde_json::to_string(&msg).unwrap();
    assert!(json.contains("test-session"));
    assert!(json.contains("16000"));
    assert!(json.contains("\"final\":false"));
    assert!(json.contains("\"sequence\":0"));

    let deserialized: AudioFrameMessage = serde_json::from_str(&json).unwrap();
    assert_eq!(deserialized.session_id, "test-session");
    assert_eq!(deserialized.sample_rate, 16000);
    assert_eq!(deserialized.channels, 1);
    assert_eq!(deserialized.sequence, 0);
    assert!(!deserialized.final_frame);
}

#[test]
fn test_audio_frame_final_marker() {
    let msg = AudioFrameMessage {
        session_id: "test-session".to_string(),
        sequence: 10,
        pcm: String::new(), // Empty for final marker
        sample_rate: 16000,
        channels: 1,
        timestamp: "2026-08-07T14:30:00Z".to_string(),
        final_frame: true,
    };

    let json = serde_json::to_string(&msg).unwrap();
    assert!(json.contains("\"final\":true"));

    let deserialized: AudioFrameMessage = serde_json::from_str(&json).unwrap();
    assert!(deserialized.final_frame);
    assert!(deserialized.pcm.is_empty());
    assert_eq!(deserialized.sequence, 10);
}

#[test]
fn test_transcript_message_deserialization() {
    let json = r#"{
        "session_id": "test-session",
        "text": "hello world",
        "partial": true,
        "timestamp": "2026-08-07T14:30:01Z",
        "confidence": 0.92
    }"#;

    let msg: TranscriptMessage = serde_json::from_str(json).unwrap();
    assert_eq!(msg.session_id, "test-session");
    assert_eq!(msg.text, "hello world");
    assert!(msg.partial);
    assert_eq!(msg.confidence, Some(0.92));
}

#[test]
fn test_transcript_message_without_confidence() {
    let json = r#"{
        "session_id": "test-session",
        "text": "final text",
        "partial": false,
        "timestamp": "2026-08-07T14:30:02Z",
        "confidence": null
    }"#;

    let msg: TranscriptMessage = serde_json::from_str(json).unwrap();
    assert!(!msg.partial);
    assert_eq!(msg.confidence, None);
}

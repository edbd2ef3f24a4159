//! Transcript accumulation.
//!
//! The aggregator records finalized utterances in arrival order. Partial
//! (interim) transcript events are filtered out by the controller before
//! they reach this type; everything appended here is a final utterance.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Who produced an utterance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Speaker {
    /// The AI interviewer.
    Ai,
    /// The human candidate.
    Candidate,
}

/// One finalized utterance attributed to a speaker.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TranscriptEntry {
    /// Who spoke.
    pub speaker: Speaker,
    /// Final (non-partial) utterance content.
    pub text: String,
    /// Timestamp of arrival.
    pub observed_at: DateTime<Utc>,
}

/// Accumulates finalized utterances in arrival order.
///
/// Write-once-per-entry, read-many: entries are appended and never removed,
/// edited, or reordered. Read-back order equals arrival order regardless of
/// timestamp ties.
#[derive(Debug, Clone, Default)]
pub struct TranscriptAggregator {
    entries: Vec<TranscriptEntry>,
}

impl TranscriptAggregator {
    /// Creates an empty aggregator.
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a finalized utterance, stamped with the current time.
    ///
    /// Every final event must be recorded; there is no condition under
    /// which an append is dropped.
    pub fn append(&mut self, speaker: Speaker, text: impl Into<String>) {
        self.entries.push(TranscriptEntry {
            speaker,
            text: text.into(),
            observed_at: Utc::now(),
        });
    }

    /// The full ordered sequence of entries.
    pub fn entries(&self) -> &[TranscriptEntry] {
        &self.entries
    }

    /// Number of recorded entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns true when no entry has been recorded yet.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// The most recently recorded entry, if any.
    pub fn last(&self) -> Option<&TranscriptEntry> {
        self.entries.last()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_append_preserves_arrival_order() {
        let mut transcript = TranscriptAggregator::new();
        transcript.append(Speaker::Ai, "Tell me about yourself");
        transcript.append(Speaker::Candidate, "I am a developer");
        transcript.append(Speaker::Ai, "Thanks");

        let speakers: Vec<Speaker> = transcript.entries().iter().map(|e| e.speaker).collect();
        assert_eq!(
            speakers,
            vec![Speaker::Ai, Speaker::Candidate, Speaker::Ai]
        );
        assert_eq!(transcript.len(), 3);
        assert_eq!(transcript.last().unwrap().text, "Thanks");
    }

    #[test]
    fn test_empty_aggregator() {
        let transcript = TranscriptAggregator::new();
        assert!(transcript.is_empty());
        assert_eq!(transcript.len(), 0);
        assert!(transcript.last().is_none());
    }

    #[test]
    fn test_speaker_wire_names() {
        assert_eq!(serde_json::to_string(&Speaker::Ai).unwrap(), "\"ai\"");
        assert_eq!(
            serde_json::to_string(&Speaker::Candidate).unwrap(),
            "\"candidate\""
        );
    }
}

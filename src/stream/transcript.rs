//! Transcript accumulator.
//!
//! Collects finalized text fragments in the order results are consumed and
//! exposes the joined transcript. Appends are the only mutation, so interim
//! reads during a long session are always safe.

use crate::stream::frame::RecognitionResult;

/// Append-only collection of finalized transcript fragments.
#[derive(Debug, Default)]
pub struct TranscriptAccumulator {
    fragments: Vec<String>,
}

impl TranscriptAccumulator {
    /// Creates an empty accumulator.
    pub fn new() -> Self {
        Self::default()
    }

    /// Records the finalized fragment of a result, if it carries one.
    /// Empty or partial-only results leave the accumulator untouched.
    pub fn observe(&mut self, result: &RecognitionResult) {
        let text = result.text.trim();
        if !text.is_empty() {
            self.fragments.push(text.to_string());
        }
    }

    /// Number of fragments collected so far.
    pub fn len(&self) -> usize {
        self.fragments.len()
    }

    /// True when nothing has been finalized yet.
    pub fn is_empty(&self) -> bool {
        self.fragments.is_empty()
    }

    /// The fragments in insertion order.
    pub fn fragments(&self) -> &[String] {
        &self.fragments
    }

    /// The transcript so far: fragments joined with a single space.
    pub fn join(&self) -> String {
        self.fragments.join(" ")
    }

    /// Consumes the accumulator, returning the final transcript.
    pub fn into_transcript(self) -> String {
        self.fragments.join(" ")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_accumulator_joins_to_empty_string() {
        let acc = TranscriptAccumulator::new();
        assert!(acc.is_empty());
        assert_eq!(acc.join(), "");
    }

    #[test]
    fn test_observe_appends_finalized_text_in_order() {
        let mut acc = TranscriptAccumulator::new();
        acc.observe(&RecognitionResult::finalized("dos litros"));
        acc.observe(&RecognitionResult::finalized("de leche"));

        assert_eq!(acc.len(), 2);
        assert_eq!(acc.join(), "dos litros de leche");
    }

    #[test]
    fn test_observe_skips_silence_and_partials() {
        let mut acc = TranscriptAccumulator::new();
        acc.observe(&RecognitionResult::finalized("a"));
        acc.observe(&RecognitionResult::silence());
        acc.observe(&RecognitionResult::partial());
        acc.observe(&RecognitionResult::finalized("b"));

        assert_eq!(acc.join(), "a b");
    }

    #[test]
    fn test_observe_trims_whitespace_fragments() {
        let mut acc = TranscriptAccumulator::new();
        acc.observe(&RecognitionResult::finalized("  pan  "));
        acc.observe(&RecognitionResult::finalized("   "));

        assert_eq!(acc.fragments(), &["pan".to_string()]);
    }

    #[test]
    fn test_interim_read_does_not_disturb_accumulation() {
        let mut acc = TranscriptAccumulator::new();
        acc.observe(&RecognitionResult::finalized("uno"));
        let interim = acc.join();
        acc.observe(&RecognitionResult::finalized("dos"));

        assert_eq!(interim, "uno");
        assert_eq!(acc.into_transcript(), "uno dos");
    }
}

//! Fixed-size frame carving.
//!
//! Turns arbitrary-length runs of PCM samples into uniform frames of
//! `block_size × channels` samples. The capture callback delivers whatever
//! buffer size the driver chose; file decoding yields one long buffer.
//! Either way the recognition protocol only ever sees full frames, with the
//! trailing remainder zero-padded on flush.

use crate::stream::frame::AudioFrame;

/// Accumulates samples and emits complete fixed-size frames.
#[derive(Debug)]
pub struct FrameChunker {
    frame_samples: usize,
    buffer: Vec<i16>,
}

impl FrameChunker {
    /// Creates a chunker emitting frames of `frame_samples` samples
    /// (block size × channel count).
    pub fn new(frame_samples: usize) -> Self {
        Self {
            frame_samples,
            buffer: Vec::with_capacity(frame_samples),
        }
    }

    /// Adds samples and returns every frame completed by them.
    pub fn push(&mut self, samples: &[i16]) -> Vec<AudioFrame> {
        self.buffer.extend_from_slice(samples);

        let mut frames = Vec::new();
        while self.buffer.len() >= self.frame_samples {
            let rest = self.buffer.split_off(self.frame_samples);
            let full = std::mem::replace(&mut self.buffer, rest);
            frames.push(AudioFrame::new(full));
        }
        frames
    }

    /// Emits the trailing partial frame, zero-padded to full length.
    /// Returns `None` when no samples are pending.
    pub fn flush(&mut self) -> Option<AudioFrame> {
        if self.buffer.is_empty() {
            return None;
        }
        let mut samples = std::mem::take(&mut self.buffer);
        samples.resize(self.frame_samples, 0);
        Some(AudioFrame::new(samples))
    }

    /// Number of samples waiting for a full frame.
    pub fn pending(&self) -> usize {
        self.buffer.len()
    }
}

/// Carves a complete buffer into `ceil(len / frame_samples)` frames, the
/// last one zero-padded. Used by file mode, where the whole recording is
/// decoded up front.
pub fn carve_frames(samples: &[i16], frame_samples: usize) -> Vec<AudioFrame> {
    let mut chunker = FrameChunker::new(frame_samples);
    let mut frames = chunker.push(samples);
    if let Some(last) = chunker.flush() {
        frames.push(last);
    }
    frames
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_push_emits_nothing_below_frame_size() {
        let mut chunker = FrameChunker::new(100);
        let frames = chunker.push(&[1i16; 99]);
        assert!(frames.is_empty());
        assert_eq!(chunker.pending(), 99);
    }

    #[test]
    fn test_push_emits_complete_frames() {
        let mut chunker = FrameChunker::new(4);
        let frames = chunker.push(&[1, 2, 3, 4, 5, 6, 7, 8, 9]);

        assert_eq!(frames.len(), 2);
        assert_eq!(frames[0].samples, vec![1, 2, 3, 4]);
        assert_eq!(frames[1].samples, vec![5, 6, 7, 8]);
        assert_eq!(chunker.pending(), 1);
    }

    #[test]
    fn test_push_preserves_order_across_calls() {
        let mut chunker = FrameChunker::new(4);
        assert!(chunker.push(&[1, 2]).is_empty());
        let frames = chunker.push(&[3, 4, 5]);

        assert_eq!(frames.len(), 1);
        assert_eq!(frames[0].samples, vec![1, 2, 3, 4]);
        assert_eq!(chunker.pending(), 1);
    }

    #[test]
    fn test_flush_zero_pads_remainder() {
        let mut chunker = FrameChunker::new(4);
        chunker.push(&[7, 8]);

        let last = chunker.flush().unwrap();
        assert_eq!(last.samples, vec![7, 8, 0, 0]);
        assert_eq!(chunker.pending(), 0);
        assert!(chunker.flush().is_none());
    }

    #[test]
    fn test_flush_on_empty_returns_none() {
        let mut chunker = FrameChunker::new(4);
        assert!(chunker.flush().is_none());
    }

    #[test]
    fn test_carve_frames_count_is_ceil() {
        // L = 13500, B = 4000 → ceil(13500/4000) = 4 frames
        let samples = vec![5i16; 13500];
        let frames = carve_frames(&samples, 4000);

        assert_eq!(frames.len(), 4);
        for frame in &frames {
            assert_eq!(frame.samples.len(), 4000);
        }
        // Padding = 4 * 4000 - 13500 = 2500 trailing zeros
        let last = &frames[3].samples;
        assert!(last[..1500].iter().all(|&s| s == 5));
        assert!(last[1500..].iter().all(|&s| s == 0));
    }

    #[test]
    fn test_carve_frames_exact_multiple_has_no_padding() {
        let samples = vec![1i16; 8000];
        let frames = carve_frames(&samples, 4000);

        assert_eq!(frames.len(), 2);
        assert!(frames[1].samples.iter().all(|&s| s == 1));
    }

    #[test]
    fn test_carve_frames_empty_input() {
        let frames = carve_frames(&[], 4000);
        assert!(frames.is_empty());
    }
}

//! Session queue: single-producer/single-consumer frame hand-off.
//!
//! Decouples the non-blocking capture callback from the consumer loop, which
//! may block on network I/O. `push` never blocks the producer; `pop` waits a
//! bounded interval so the consumer can re-check the idle-timeout clock even
//! when no audio is arriving. FIFO; nothing is dropped once enqueued.

use crate::stream::frame::AudioFrame;
use std::time::Duration;
use tokio::sync::mpsc;

/// Outcome of a bounded [`SessionQueue::pop`] wait.
#[derive(Debug, PartialEq)]
pub enum Pop {
    /// A frame arrived within the wait bound.
    Frame(AudioFrame),
    /// No frame arrived within the wait bound.
    TimedOut,
    /// The producer is gone and the queue is drained.
    Closed,
}

/// Producer half. Held by the capture callback; cheap to clone, push never
/// blocks. Dropping every producer closes the queue.
#[derive(Clone)]
pub struct QueueProducer {
    tx: mpsc::UnboundedSender<AudioFrame>,
}

impl QueueProducer {
    /// Enqueues a frame without blocking. Returns false if the consumer is
    /// gone, which the capture callback treats as a stop signal.
    pub fn push(&self, frame: AudioFrame) -> bool {
        self.tx.send(frame).is_ok()
    }
}

/// Consumer half. Owned by the single session consumer loop.
pub struct QueueConsumer {
    rx: mpsc::UnboundedReceiver<AudioFrame>,
}

impl QueueConsumer {
    /// Waits up to `timeout` for the next frame.
    pub async fn pop(&mut self, timeout: Duration) -> Pop {
        match tokio::time::timeout(timeout, self.rx.recv()).await {
            Ok(Some(frame)) => Pop::Frame(frame),
            Ok(None) => Pop::Closed,
            Err(_) => Pop::TimedOut,
        }
    }

    /// Stops accepting new frames; already-enqueued frames remain poppable.
    pub fn close(&mut self) {
        self.rx.close();
    }
}

/// Creates a connected producer/consumer pair.
pub fn session_queue() -> (QueueProducer, QueueConsumer) {
    let (tx, rx) = mpsc::unbounded_channel();
    (QueueProducer { tx }, QueueConsumer { rx })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn frame(n: i16) -> AudioFrame {
        AudioFrame::new(vec![n; 4])
    }

    #[tokio::test]
    async fn test_push_pop_fifo_order() {
        let (producer, mut consumer) = session_queue();

        assert!(producer.push(frame(1)));
        assert!(producer.push(frame(2)));
        assert!(producer.push(frame(3)));

        for expected in 1..=3i16 {
            match consumer.pop(Duration::from_millis(100)).await {
                Pop::Frame(f) => assert_eq!(f.samples, vec![expected; 4]),
                other => panic!("expected frame, got {:?}", other),
            }
        }
    }

    #[tokio::test]
    async fn test_pop_times_out_when_empty() {
        let (_producer, mut consumer) = session_queue();

        let outcome = consumer.pop(Duration::from_millis(20)).await;
        assert_eq!(outcome, Pop::TimedOut);
    }

    #[tokio::test]
    async fn test_pop_returns_closed_after_producer_drop() {
        let (producer, mut consumer) = session_queue();
        producer.push(frame(7));
        drop(producer);

        // Enqueued frame is still delivered before the close signal.
        assert!(matches!(
            consumer.pop(Duration::from_millis(100)).await,
            Pop::Frame(_)
        ));
        assert_eq!(consumer.pop(Duration::from_millis(100)).await, Pop::Closed);
    }

    #[tokio::test]
    async fn test_push_from_non_async_thread() {
        let (producer, mut consumer) = session_queue();

        let handle = std::thread::spawn(move || {
            for n in 0..10i16 {
                assert!(producer.push(frame(n)));
            }
        });

        let mut received = 0;
        loop {
            match consumer.pop(Duration::from_millis(200)).await {
                Pop::Frame(_) => received += 1,
                Pop::Closed => break,
                Pop::TimedOut => break,
            }
            if received == 10 {
                break;
            }
        }
        handle.join().unwrap();
        assert_eq!(received, 10);
    }

    #[tokio::test]
    async fn test_push_fails_after_consumer_close() {
        let (producer, mut consumer) = session_queue();
        consumer.close();
        // Drain whatever raced in, then the producer sees the closed queue.
        while let Pop::Frame(_) = consumer.pop(Duration::from_millis(10)).await {}
        assert!(!producer.push(frame(1)));
    }
}

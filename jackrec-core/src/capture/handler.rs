use std::sync::Arc;

use crate::processing::channel_buffer::{ChannelWriter, Sample};

use super::status::ClientStatus;

/// Outcome of one real-time block.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BlockOutcome {
    /// Every channel received the block.
    Written,
    /// At least one channel lacked room; nothing was written.
    Dropped,
    /// A channel accepted less than it reported room for. Callbacks should stop.
    Fault,
}

/// Producer side of a capture client, handed to the audio server on activation.
///
/// `process` runs on the real-time thread: it never blocks, allocates or
/// performs I/O.
pub struct CaptureHandler {
    writers: Vec<ChannelWriter>,
    status: Arc<ClientStatus>,
}

impl CaptureHandler {
    pub(crate) fn new(writers: Vec<ChannelWriter>, status: Arc<ClientStatus>) -> Self {
        Self { writers, status }
    }

    pub fn channel_count(&self) -> usize {
        self.writers.len()
    }

    /// Flags to raise from the server's shutdown notification.
    pub fn status(&self) -> Arc<ClientStatus> {
        Arc::clone(&self.status)
    }

    /// Write one block of `frames` samples per channel.
    ///
    /// `input(c)` yields channel `c`'s samples for this block. Either every
    /// channel receives the block or none does, so channels stay sample-aligned.
    pub fn process<'a, F>(&mut self, frames: usize, input: F) -> BlockOutcome
    where
        F: Fn(usize) -> &'a [Sample],
    {
        if (0..self.writers.len()).any(|c| input(c).len() < frames) {
            self.status.mark_fault();
            return BlockOutcome::Fault;
        }

        if self.writers.iter().any(|w| w.free_samples() < frames) {
            self.status.note_overflow();
            return BlockOutcome::Dropped;
        }

        for (c, writer) in self.writers.iter_mut().enumerate() {
            if writer.write(&input(c)[..frames]) < frames {
                self.status.mark_fault();
                return BlockOutcome::Fault;
            }
        }

        BlockOutcome::Written
    }
}

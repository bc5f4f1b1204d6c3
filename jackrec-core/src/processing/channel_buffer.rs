//! Fixed-capacity single-producer/single-consumer sample ring for one channel.
//!
//! This is the only structure shared between the real-time callback and the
//! control thread. Each half owns its own cursor; `ringbuf` publishes cursor
//! moves with release/acquire ordering, so a reader never observes an advanced
//! write cursor before the samples behind it.
//!
//! Sizes reported by `free_space`, `used_space` and `capacity` are in bytes.

use ringbuf::traits::{Consumer, Observer, Producer, Split};
use ringbuf::{HeapCons, HeapProd, HeapRb};

use crate::models::error::CaptureError;

/// A single captured sample.
pub type Sample = f32;

/// Size of one sample in bytes.
pub const SAMPLE_SIZE: usize = std::mem::size_of::<Sample>();

/// Number of samples a ring holds for `duration_secs` of audio at `sample_rate`.
pub fn capacity_samples(sample_rate: u32, duration_secs: f64) -> usize {
    (sample_rate as f64 * duration_secs).floor() as usize
}

/// Create a channel buffer and split it into its producer and consumer halves.
pub fn channel_buffer(
    sample_rate: u32,
    duration_secs: f64,
) -> Result<(ChannelWriter, ChannelReader), CaptureError> {
    let samples = capacity_samples(sample_rate, duration_secs);
    if samples == 0 {
        return Err(CaptureError::Configuration(format!(
            "ring buffer of {duration_secs}s at {sample_rate} Hz holds no samples"
        )));
    }
    let (producer, consumer) = HeapRb::<Sample>::new(samples).split();
    Ok((ChannelWriter { inner: producer }, ChannelReader { inner: consumer }))
}

/// Producer half, owned by the real-time callback.
pub struct ChannelWriter {
    inner: HeapProd<Sample>,
}

impl ChannelWriter {
    /// Copy `samples` into the ring if all of them fit.
    ///
    /// Returns the number of samples written: either `samples.len()` or 0.
    /// Never overwrites unread data and never blocks.
    pub fn write(&mut self, samples: &[Sample]) -> usize {
        if self.inner.vacant_len() < samples.len() {
            return 0;
        }
        self.inner.push_slice(samples)
    }

    /// Samples that can be written without overwriting unread data.
    pub fn free_samples(&self) -> usize {
        self.inner.vacant_len()
    }

    pub fn free_space(&self) -> usize {
        self.inner.vacant_len() * SAMPLE_SIZE
    }

    pub fn used_space(&self) -> usize {
        self.inner.occupied_len() * SAMPLE_SIZE
    }

    pub fn capacity(&self) -> usize {
        self.inner.capacity().get() * SAMPLE_SIZE
    }
}

/// Consumer half, owned by the control thread.
pub struct ChannelReader {
    inner: HeapCons<Sample>,
}

impl ChannelReader {
    /// Fill `out` from the ring if at least `out.len()` samples are buffered.
    ///
    /// Returns the number of samples read: either `out.len()` or 0.
    /// Never waits for data; check `used_space` first.
    pub fn read(&mut self, out: &mut [Sample]) -> usize {
        if self.inner.occupied_len() < out.len() {
            return 0;
        }
        self.inner.pop_slice(out)
    }

    /// Samples buffered and not yet read.
    pub fn used_samples(&self) -> usize {
        self.inner.occupied_len()
    }

    pub fn used_space(&self) -> usize {
        self.inner.occupied_len() * SAMPLE_SIZE
    }

    pub fn free_space(&self) -> usize {
        self.inner.vacant_len() * SAMPLE_SIZE
    }

    pub fn capacity(&self) -> usize {
        self.inner.capacity().get() * SAMPLE_SIZE
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread;

    #[test]
    fn capacity_from_rate_and_duration() {
        for (rate, duration) in [(48000, 2.0), (44100, 0.5), (22050, 0.3333), (8000, 1.0)] {
            let (writer, reader) = channel_buffer(rate, duration).unwrap();
            let expected = (rate as f64 * duration).floor() as usize * SAMPLE_SIZE;
            assert_eq!(writer.capacity(), expected);
            assert_eq!(reader.capacity(), expected);
        }
    }

    #[test]
    fn capacity_is_fixed() {
        let (mut writer, mut reader) = channel_buffer(1000, 0.01).unwrap();
        let before = writer.capacity();

        assert_eq!(writer.write(&[0.5; 10]), 10);
        assert_eq!(writer.write(&[0.5; 1]), 0);
        let mut out = [0.0; 10];
        assert_eq!(reader.read(&mut out), 10);

        assert_eq!(writer.capacity(), before);
        assert_eq!(reader.capacity(), before);
    }

    #[test]
    fn zero_capacity_is_rejected() {
        assert!(channel_buffer(48000, 0.00001).is_err());
        assert!(channel_buffer(0, 2.0).is_err());
    }

    #[test]
    fn write_then_read_preserves_order() {
        let (mut writer, mut reader) = channel_buffer(100, 1.0).unwrap();
        let samples: Vec<f32> = (0..100).map(|i| i as f32 * 0.01).collect();

        assert_eq!(writer.write(&samples), 100);
        assert_eq!(reader.used_space(), 100 * SAMPLE_SIZE);

        let mut out = vec![0.0; 100];
        assert_eq!(reader.read(&mut out), 100);
        assert_eq!(out, samples);
        assert_eq!(reader.used_space(), 0);
    }

    #[test]
    fn write_is_all_or_nothing() {
        let (mut writer, reader) = channel_buffer(10, 1.0).unwrap();
        assert_eq!(writer.write(&[1.0; 8]), 8);

        assert_eq!(writer.write(&[2.0; 3]), 0);
        assert_eq!(reader.used_space(), 8 * SAMPLE_SIZE);
        assert_eq!(writer.free_space(), 2 * SAMPLE_SIZE);
    }

    #[test]
    fn read_never_returns_partial_data() {
        let (mut writer, mut reader) = channel_buffer(10, 1.0).unwrap();
        writer.write(&[1.0, 2.0, 3.0]);

        let mut out = [0.0; 4];
        assert_eq!(reader.read(&mut out), 0);
        assert_eq!(out, [0.0; 4]);
        assert_eq!(reader.used_space(), 3 * SAMPLE_SIZE);
    }

    #[test]
    fn wraparound() {
        let (mut writer, mut reader) = channel_buffer(4, 1.0).unwrap();
        writer.write(&[1.0, 2.0, 3.0]);
        let mut two = [0.0; 2];
        reader.read(&mut two);

        assert_eq!(writer.write(&[4.0, 5.0, 6.0]), 3);

        let mut out = [0.0; 4];
        assert_eq!(reader.read(&mut out), 4);
        assert_eq!(out, [3.0, 4.0, 5.0, 6.0]);
    }

    #[test]
    fn producer_and_consumer_on_separate_threads() {
        let (mut writer, mut reader) = channel_buffer(64, 1.0).unwrap();
        const TOTAL: usize = 10_000;

        let producer = thread::spawn(move || {
            let mut next = 0usize;
            while next < TOTAL {
                let block: Vec<f32> = (next..next + 8).map(|i| i as f32).collect();
                if writer.write(&block) == block.len() {
                    next += 8;
                } else {
                    thread::yield_now();
                }
            }
        });

        let mut received = Vec::with_capacity(TOTAL);
        let mut block = [0.0; 8];
        while received.len() < TOTAL {
            if reader.read(&mut block) == block.len() {
                received.extend_from_slice(&block);
            } else {
                thread::yield_now();
            }
        }
        producer.join().unwrap();

        for (i, sample) in received.iter().enumerate() {
            assert_eq!(*sample, i as f32);
        }
    }
}

//! Bounded ring buffer for the CD audio samples pre-mixed into the SPU output

use log::warn;
use serde::{Deserialize, Serialize};

/// Capacity in samples (two per stereo frame). Power of two, sized for a few
/// sectors worth of CD audio bursts.
const CAPACITY: usize = 8192;
const MASK: usize = CAPACITY - 1;

/// Producer/consumer ring shared with the CD controller. The producer runs on
/// the same cooperative schedule as the SPU, so no locking is involved; on
/// overflow the oldest samples are evicted to make room.
#[derive(Serialize, Deserialize)]
pub struct CdFifo {
    #[serde(with = "serde_big_array::BigArray")]
    buffer: [i16; CAPACITY],
    read_pos: usize,
    write_pos: usize,
    len: usize,
    /// Total samples evicted because of overflow
    total_dropped: u64,
}

impl CdFifo {
    pub fn new() -> CdFifo {
        CdFifo {
            buffer: [0; CAPACITY],
            read_pos: 0,
            write_pos: 0,
            len: 0,
            total_dropped: 0,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn total_dropped(&self) -> u64 {
        self.total_dropped
    }

    /// Append interleaved samples, discarding the oldest buffered samples if
    /// the ring is too full to take them all.
    pub fn push_slice(&mut self, samples: &[i16]) {
        let pushed = samples.len().min(CAPACITY);
        let space = CAPACITY - self.len;

        if space < pushed {
            let evicted = pushed - space;
            warn!(
                "CD audio FIFO overflow - dropping {} oldest samples ({} dropped so far)",
                evicted, self.total_dropped
            );
            self.read_pos = (self.read_pos + evicted) & MASK;
            self.len -= evicted;
            self.total_dropped += evicted as u64;
        }

        for &sample in &samples[samples.len() - pushed..] {
            self.buffer[self.write_pos] = sample;
            self.write_pos = (self.write_pos + 1) & MASK;
        }

        self.len += pushed;
    }

    /// Pop the oldest sample. The caller checks for emptiness first.
    pub fn pop(&mut self) -> i16 {
        debug_assert!(self.len > 0);

        let sample = self.buffer[self.read_pos];
        self.read_pos = (self.read_pos + 1) & MASK;
        self.len -= 1;

        sample
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn push_pop_in_order() {
        let mut fifo = CdFifo::new();

        fifo.push_slice(&[1, 2, 3, 4]);
        assert_eq!(fifo.len(), 4);
        assert_eq!(fifo.pop(), 1);
        assert_eq!(fifo.pop(), 2);
        assert_eq!(fifo.pop(), 3);
        assert_eq!(fifo.pop(), 4);
        assert!(fifo.is_empty());
    }

    #[test]
    fn overflow_drops_oldest() {
        let mut fifo = CdFifo::new();

        let frame = [0x1111, 0x2222];
        for _ in 0..CAPACITY / 2 {
            fifo.push_slice(&frame);
        }
        assert_eq!(fifo.len(), CAPACITY);

        // One more frame pushes out the oldest one
        fifo.push_slice(&[0x3333, 0x4444]);
        assert_eq!(fifo.len(), CAPACITY);
        assert_eq!(fifo.total_dropped(), 2);
        assert_eq!(fifo.pop(), 0x1111);

        // The newest samples are at the tail
        for _ in 0..CAPACITY - 3 {
            fifo.pop();
        }
        assert_eq!(fifo.pop(), 0x3333);
        assert_eq!(fifo.pop(), 0x4444);
    }

    #[test]
    fn wraps_around_the_ring() {
        let mut fifo = CdFifo::new();

        for i in 0..3 * CAPACITY as i16 {
            fifo.push_slice(&[i, -i]);
            assert_eq!(fifo.pop(), i);
            assert_eq!(fifo.pop(), -i);
        }
        assert!(fifo.is_empty());
        assert_eq!(fifo.total_dropped(), 0);
    }
}

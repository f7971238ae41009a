//! Block assembly on the UI side of the capture ring buffer.
//!
//! The capture callback pushes individual mono samples; the meter wants
//! fixed-size blocks. `LevelTap` drains the ring buffer and hands out each
//! complete block in order, never overlapping, holding any remainder for the
//! next drain.

use rtrb::Consumer;

use crate::dsp::BLOCK_SIZE;

/// Consumer side of the capture transport.
pub struct LevelTap {
    samples: Consumer<f32>,
    pending: Vec<f32>,
}

impl LevelTap {
    /// Wraps the consumer half of a sample ring buffer.
    pub fn new(samples: Consumer<f32>) -> Self {
        Self {
            samples,
            pending: Vec::with_capacity(BLOCK_SIZE),
        }
    }

    /// Drains everything currently queued, invoking `on_block` once per
    /// complete [`BLOCK_SIZE`] block, in arrival order. Returns how many
    /// blocks were delivered. Incomplete tails stay queued.
    pub fn drain_blocks(&mut self, mut on_block: impl FnMut(&[f32])) -> usize {
        let mut delivered = 0;
        while let Ok(sample) = self.samples.pop() {
            self.pending.push(sample);
            if self.pending.len() == BLOCK_SIZE {
                on_block(&self.pending);
                self.pending.clear();
                delivered += 1;
            }
        }
        delivered
    }

    /// Number of samples waiting for the current block to fill.
    pub fn pending_len(&self) -> usize {
        self.pending.len()
    }
}

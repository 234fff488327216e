use crate::{CARRY_SAMPLES, WINDOW_SAMPLES};

/// Carries unconsumed tail samples across capture reads.
///
/// Burst detection probes a handful of neighbouring samples, so the last
/// `CARRY_SAMPLES` of every read are withheld and prepended to the next
/// block. A burst sitting on a read boundary is therefore always seen whole.
pub struct CarryBuffer {
    pending: Vec<i16>,
}

impl CarryBuffer {
    pub fn new() -> Self {
        Self {
            pending: Vec::with_capacity(crate::SAMPLE_RATE),
        }
    }

    /// Append a captured block and drain the samples that are safe to scan.
    ///
    /// Returns an empty vec until more than `CARRY_SAMPLES` samples are
    /// pending. Always accepts input; nothing here blocks or fails.
    pub fn push(&mut self, block: &[i16]) -> Vec<i16> {
        self.pending.extend_from_slice(block);

        if self.pending.len() <= CARRY_SAMPLES {
            return Vec::new();
        }

        let release = self.pending.len() - CARRY_SAMPLES;
        let mut drained: Vec<i16> = self.pending.drain(..release).collect();
        drained.shrink_to_fit();
        drained
    }

    /// Samples currently withheld for the next read.
    pub fn carried(&self) -> &[i16] {
        &self.pending
    }
}

impl Default for CarryBuffer {
    fn default() -> Self {
        Self::new()
    }
}

/// Accumulates exactly one analysis window once a frame start is detected.
pub struct WindowAccumulator {
    buf: Vec<i16>,
}

impl WindowAccumulator {
    pub fn new() -> Self {
        Self {
            buf: Vec::with_capacity(WINDOW_SAMPLES),
        }
    }

    /// Push one sample; returns the full window when the last sample lands.
    /// The accumulator resets itself on handoff.
    pub fn push(&mut self, sample: i16) -> Option<Vec<i16>> {
        self.buf.push(sample);
        if self.buf.len() >= WINDOW_SAMPLES {
            let window = std::mem::replace(&mut self.buf, Vec::with_capacity(WINDOW_SAMPLES));
            Some(window)
        } else {
            None
        }
    }

    pub fn is_collecting(&self) -> bool {
        !self.buf.is_empty()
    }

    /// Drop a partially collected window (index zeroed).
    pub fn reset(&mut self) {
        self.buf.clear();
    }
}

impl Default for WindowAccumulator {
    fn default() -> Self {
        Self::new()
    }
}

use crate::error::Result;
use crate::tone::ToneEstimator;
use crate::window::{CarryBuffer, WindowAccumulator};
use crate::{agc, frame, hamming, sync, DEFAULT_BURST_THRESHOLD};

/// Streaming receive pipeline.
///
/// Feed capture blocks with [`push`](Decoder::push); the decoder scans for a
/// frame-start burst, accumulates one analysis window and runs it through
/// AGC, dual-tone energy estimation, bit assembly and the parity decode.
/// At most one window is in flight: a new burst cannot start a frame until
/// the current window has been fully processed. Frame-level failures are
/// silent (logged at debug) and scanning simply resumes.
pub struct Decoder {
    burst_threshold: i16,
    carry: CarryBuffer,
    accumulator: WindowAccumulator,
    estimator: ToneEstimator,
    collecting: bool,
}

impl Decoder {
    pub fn new() -> Self {
        Self::with_threshold(DEFAULT_BURST_THRESHOLD)
    }

    /// Build a decoder with a non-default burst sensitivity.
    pub fn with_threshold(burst_threshold: i16) -> Self {
        Self {
            burst_threshold,
            carry: CarryBuffer::new(),
            accumulator: WindowAccumulator::new(),
            estimator: ToneEstimator::new(),
            collecting: false,
        }
    }

    /// Submit one captured block; returns a payload if a frame completed
    /// and decoded inside it.
    pub fn push(&mut self, block: &[i16]) -> Option<u16> {
        let mut view = self.carry.push(block);
        let scan_len = view.len();
        // The burst probe may look past the scan cut into the carried tail;
        // those samples are only consumed on the next read.
        view.extend_from_slice(self.carry.carried());
        let mut decoded = None;

        for i in 0..scan_len {
            let sample = view[i];
            if self.collecting {
                if let Some(mut window) = self.accumulator.push(sample) {
                    self.collecting = false;
                    match self.decode_window(&mut window) {
                        Ok(payload) => {
                            // Single slot per push; a later frame in the same
                            // block would overwrite, mirroring the mailbox.
                            decoded = Some(payload);
                        }
                        Err(e) => {
                            log::debug!("frame dropped: {}", e);
                        }
                    }
                }
            } else if sync::burst_at(&view, i, self.burst_threshold) {
                // Window accumulation begins at the burst sample itself
                self.collecting = true;
                self.accumulator.reset();
                self.accumulator.push(sample);
            }
        }

        decoded
    }

    /// Run the full decode pipeline over one analysis window.
    ///
    /// The window is normalized in place; callers that keep the buffer see
    /// the AGC-corrected samples afterwards.
    pub fn decode_window(&self, window: &mut [i16]) -> Result<u16> {
        agc::normalize(window, self.burst_threshold);
        let profiles = self.estimator.energy_profiles(window);
        let classes = frame::classify(&profiles);
        let word = frame::assemble_codeword(&classes)?;
        hamming::decode(word)
    }

    /// Discard any partially collected window and resume scanning.
    pub fn reset(&mut self) {
        self.collecting = false;
        self.accumulator.reset();
    }
}

impl Default for Decoder {
    fn default() -> Self {
        Self::new()
    }
}

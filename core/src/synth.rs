//! Reference wire-format encoder for the receive direction.
//!
//! The peripheral's transmitter is a fixed-function circuit; on the host
//! side the production transmit path only replays pre-recorded clips. This
//! module is the executable definition of what the decoder expects on the
//! air: a 15-bit codeword (header sentinel 0, Hamming(13,9) word, trailer
//! sentinel 1) sent LSB first as 54-sample bursts of 2500 Hz (bit 0) or
//! 5000 Hz (bit 1) at 44.1 kHz. Tests and the CLI `encode` command use it
//! to exercise the full pipeline.

use crate::error::Result;
use crate::{
    hamming, BIT_INTERVAL_SAMPLES, CODEWORD_BITS, SAMPLE_RATE, TONE_A_HZ, TONE_B_HZ,
};

/// Burst amplitude, comfortably above the burst threshold and below clipping
const FRAME_AMPLITUDE: f32 = 16000.0;

/// Build the 15-bit on-air codeword for a payload.
pub fn codeword(payload: u16) -> Result<u16> {
    let word = hamming::encode(payload)?;
    // header bit 0 stays 0; trailer bit 14 set to 1
    Ok((word << 1) | (1 << (CODEWORD_BITS - 1)))
}

/// Synthesize the tone-modulated samples for one frame.
pub fn frame_samples(payload: u16) -> Result<Vec<i16>> {
    Ok(codeword_samples(codeword(payload)?))
}

/// Modulate an arbitrary 15-bit codeword, LSB first.
///
/// Phase accumulates continuously across bit boundaries, matching the
/// receiver's continuously accumulated correlator phase. Taking the raw
/// codeword lets tests put deliberately broken framing on the air.
pub fn codeword_samples(code: u16) -> Vec<i16> {
    let mut samples = Vec::with_capacity(CODEWORD_BITS * BIT_INTERVAL_SAMPLES);
    let mut phase = 0.0f32;

    for bit in 0..CODEWORD_BITS {
        let freq = if code & (1 << bit) != 0 {
            TONE_B_HZ
        } else {
            TONE_A_HZ
        };
        let step = 2.0 * std::f32::consts::PI * freq / SAMPLE_RATE as f32;
        for _ in 0..BIT_INTERVAL_SAMPLES {
            phase += step;
            samples.push((FRAME_AMPLITUDE * phase.sin()) as i16);
        }
    }

    samples
}

/// Frame samples wrapped in leading and trailing silence, sized like a real
/// capture: the burst lands `lead_silence` samples into the stream.
pub fn frame_in_silence(payload: u16, lead_silence: usize, tail_silence: usize) -> Result<Vec<i16>> {
    let mut samples = vec![0i16; lead_silence];
    samples.extend(frame_samples(payload)?);
    samples.extend(std::iter::repeat(0i16).take(tail_silence));
    Ok(samples)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::DEFAULT_BURST_THRESHOLD;

    #[test]
    fn test_frame_length() {
        let samples = frame_samples(0x0AB).unwrap();
        assert_eq!(samples.len(), CODEWORD_BITS * BIT_INTERVAL_SAMPLES);
    }

    #[test]
    fn test_codeword_sentinels() {
        let code = codeword(0x1F3).unwrap();
        assert_eq!(code & 0x0001, 0, "header sentinel must be 0");
        assert_ne!(code & (1 << 14), 0, "trailer sentinel must be 1");
    }

    #[test]
    fn test_frame_opens_loud_enough_to_trigger_detection() {
        let samples = frame_samples(0).unwrap();
        let over = samples
            .iter()
            .take(5)
            .filter(|&&s| s > DEFAULT_BURST_THRESHOLD || s < -DEFAULT_BURST_THRESHOLD)
            .count();
        assert!(over >= 4, "only {} of first 5 samples over threshold", over);
    }

    #[test]
    fn test_payload_out_of_range_is_rejected() {
        assert!(frame_samples(0x0200).is_err());
    }

    #[test]
    fn test_silence_padding() {
        let samples = frame_in_silence(5, 100, 192).unwrap();
        assert_eq!(
            samples.len(),
            100 + CODEWORD_BITS * BIT_INTERVAL_SAMPLES + 192
        );
        assert!(samples[..100].iter().all(|&s| s == 0));
    }
}

use crate::{NONCOHERENT_SAMPLES, SAMPLE_RATE, TONE_A_HZ, TONE_B_HZ};

/// Smoothed non-coherent correlation energy against the two carrier tones.
///
/// Both profiles are index-aligned with the analysis window they were
/// computed from and are only meaningful together with it; they are built
/// once per frame and discarded after the decode attempt.
pub struct EnergyProfiles {
    pub tone_a: Vec<f32>,
    pub tone_b: Vec<f32>,
}

/// Dual-tone non-coherent energy estimator.
///
/// The transmitter and receiver clocks are not phase locked, so detection
/// must not depend on absolute phase: per-sample in-phase and quadrature
/// products are integrated over a trailing block and combined as a vector
/// magnitude, which is invariant to the unknown phase offset.
pub struct ToneEstimator {
    freq_a: f32,
    freq_b: f32,
    sample_rate: f32,
}

impl ToneEstimator {
    pub fn new() -> Self {
        Self {
            freq_a: TONE_A_HZ,
            freq_b: TONE_B_HZ,
            sample_rate: SAMPLE_RATE as f32,
        }
    }

    /// Compute the two energy profiles for one analysis window.
    ///
    /// Per sample: multiply by cos/sin of a phase accumulated incrementally
    /// at `2π·f/sample_rate` (continuous across the whole window, no reset).
    /// Per index: average the products over the next `NONCOHERENT_SAMPLES`
    /// samples and take `sqrt(cos² + sin²)`. A second pass replaces each
    /// energy value with the mean of itself and the following 15, which
    /// knocks down residual ripple and noise spikes.
    pub fn energy_profiles(&self, window: &[i16]) -> EnergyProfiles {
        let n = window.len();
        let step_a = 2.0 * std::f32::consts::PI * self.freq_a / self.sample_rate;
        let step_b = 2.0 * std::f32::consts::PI * self.freq_b / self.sample_rate;

        let mut cos_a = vec![0.0f32; n];
        let mut sin_a = vec![0.0f32; n];
        let mut cos_b = vec![0.0f32; n];
        let mut sin_b = vec![0.0f32; n];

        let mut phase_a = 0.0f32;
        let mut phase_b = 0.0f32;
        for i in 0..n {
            phase_a += step_a;
            phase_b += step_b;
            let s = window[i] as f32;
            cos_a[i] = s * phase_a.cos();
            sin_a[i] = s * phase_a.sin();
            cos_b[i] = s * phase_b.cos();
            sin_b[i] = s * phase_b.sin();
        }

        let mut tone_a = vec![0.0f32; n];
        let mut tone_b = vec![0.0f32; n];

        if n >= NONCOHERENT_SAMPLES {
            for i in 0..=(n - NONCOHERENT_SAMPLES) {
                let block = NONCOHERENT_SAMPLES as f32;
                let mut sum_cos_a = 0.0;
                let mut sum_sin_a = 0.0;
                let mut sum_cos_b = 0.0;
                let mut sum_sin_b = 0.0;
                for j in 0..NONCOHERENT_SAMPLES {
                    sum_cos_a += cos_a[i + j];
                    sum_sin_a += sin_a[i + j];
                    sum_cos_b += cos_b[i + j];
                    sum_sin_b += sin_b[i + j];
                }
                sum_cos_a /= block;
                sum_sin_a /= block;
                sum_cos_b /= block;
                sum_sin_b /= block;

                tone_a[i] = (sum_cos_a * sum_cos_a + sum_sin_a * sum_sin_a).sqrt();
                tone_b[i] = (sum_cos_b * sum_cos_b + sum_sin_b * sum_sin_b).sqrt();
            }
        }

        // Second smoothing pass: 16-tap forward moving average
        if n > NONCOHERENT_SAMPLES {
            for i in 0..(n - NONCOHERENT_SAMPLES) {
                let mut acc_a = tone_a[i];
                let mut acc_b = tone_b[i];
                for j in 1..NONCOHERENT_SAMPLES {
                    acc_a += tone_a[i + j];
                    acc_b += tone_b[i + j];
                }
                tone_a[i] = acc_a / NONCOHERENT_SAMPLES as f32;
                tone_b[i] = acc_b / NONCOHERENT_SAMPLES as f32;
            }
        }

        EnergyProfiles { tone_a, tone_b }
    }
}

impl Default for ToneEstimator {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::COHERENT_THRESHOLD;
    use std::f32::consts::PI;

    fn tone(freq: f32, amplitude: f32, samples: usize) -> Vec<i16> {
        let step = 2.0 * PI * freq / SAMPLE_RATE as f32;
        let mut phase = 0.0f32;
        (0..samples)
            .map(|_| {
                phase += step;
                (amplitude * phase.sin()) as i16
            })
            .collect()
    }

    #[test]
    fn test_tone_a_dominates_its_own_profile() {
        let window = tone(TONE_A_HZ, 20000.0, 400);
        let profiles = ToneEstimator::new().energy_profiles(&window);

        // Mid-window indices are clear of both edge ramps
        for i in 100..300 {
            assert!(
                profiles.tone_a[i] > profiles.tone_b[i],
                "index {}: a={} b={}",
                i,
                profiles.tone_a[i],
                profiles.tone_b[i]
            );
            assert!(profiles.tone_a[i] >= COHERENT_THRESHOLD);
        }
    }

    #[test]
    fn test_tone_b_dominates_its_own_profile() {
        let window = tone(TONE_B_HZ, 20000.0, 400);
        let profiles = ToneEstimator::new().energy_profiles(&window);

        for i in 100..300 {
            assert!(profiles.tone_b[i] > profiles.tone_a[i]);
            assert!(profiles.tone_b[i] >= COHERENT_THRESHOLD);
        }
    }

    #[test]
    fn test_silence_has_no_energy() {
        let window = vec![0i16; 400];
        let profiles = ToneEstimator::new().energy_profiles(&window);
        assert!(profiles.tone_a.iter().all(|&e| e < COHERENT_THRESHOLD));
        assert!(profiles.tone_b.iter().all(|&e| e < COHERENT_THRESHOLD));
    }

    #[test]
    fn test_energy_is_phase_insensitive() {
        let step = 2.0 * PI * TONE_A_HZ / SAMPLE_RATE as f32;
        let estimator = ToneEstimator::new();

        let mut mids = Vec::new();
        for offset in [0.0f32, 0.7, 1.9, 3.1] {
            let window: Vec<i16> = (0..400)
                .map(|i| (20000.0 * (step * (i + 1) as f32 + offset).sin()) as i16)
                .collect();
            let profiles = estimator.energy_profiles(&window);
            mids.push(profiles.tone_a[200]);
        }

        let max = mids.iter().cloned().fold(f32::MIN, f32::max);
        let min = mids.iter().cloned().fold(f32::MAX, f32::min);
        // Non-coherent magnitude should barely move with the carrier phase
        assert!(min > 0.5 * max, "min={} max={}", min, max);
    }

    #[test]
    fn test_profiles_align_with_window() {
        let window = tone(TONE_A_HZ, 20000.0, 257);
        let profiles = ToneEstimator::new().energy_profiles(&window);
        assert_eq!(profiles.tone_a.len(), window.len());
        assert_eq!(profiles.tone_b.len(), window.len());
    }

    #[test]
    fn test_short_window_does_not_panic() {
        let window = tone(TONE_A_HZ, 20000.0, NONCOHERENT_SAMPLES - 1);
        let profiles = ToneEstimator::new().energy_profiles(&window);
        assert_eq!(profiles.tone_a.len(), window.len());
    }
}

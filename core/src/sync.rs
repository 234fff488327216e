use crate::BURST_PROBE_SAMPLES;

/// Minimum probe samples that must clear the threshold (4 of 5)
const BURST_PROBE_REQUIRED: usize = BURST_PROBE_SAMPLES - BURST_PROBE_SAMPLES / 5;

/// Check for a frame-start burst at `pos`.
///
/// Examines `BURST_PROBE_SAMPLES` consecutive samples and declares a start
/// when at least 4 of 5 exceed the absolute threshold. The majority vote
/// debounces single-sample spikes; the threshold is the only sensitivity
/// knob and is never adapted automatically.
///
/// Samples past the end of the slice count as silent, so a probe near the
/// buffer tail simply fails (the carry buffer guarantees the detector sees
/// the same region again on the next read).
pub fn burst_at(samples: &[i16], pos: usize, threshold: i16) -> bool {
    let mut over = 0;
    for offset in 0..BURST_PROBE_SAMPLES {
        match samples.get(pos + offset) {
            Some(&s) if s > threshold || s < -threshold => over += 1,
            _ => {}
        }
    }
    over >= BURST_PROBE_REQUIRED
}

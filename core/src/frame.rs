use crate::error::{Result, TonelinkError};
use crate::tone::EnergyProfiles;
use crate::{BIT_INTERVAL_SAMPLES, CODEWORD_BITS, COHERENT_THRESHOLD};

/// Ternary per-sample tone classification
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tone {
    /// Tone A (2500 Hz) dominant, codes a 0 bit
    A,
    /// Tone B (5000 Hz) dominant, codes a 1 bit
    B,
    /// Combined energy below the coherence threshold
    Ambiguous,
}

/// Classify every window index against the coherence threshold.
pub fn classify(profiles: &EnergyProfiles) -> Vec<Tone> {
    profiles
        .tone_a
        .iter()
        .zip(profiles.tone_b.iter())
        .map(|(&a, &b)| {
            if a >= COHERENT_THRESHOLD || b >= COHERENT_THRESHOLD {
                if a > b {
                    Tone::A
                } else {
                    Tone::B
                }
            } else {
                Tone::Ambiguous
            }
        })
        .collect()
}

/// Assemble the 15-bit codeword from a classification sequence and validate
/// its framing.
///
/// The bit-stream origin is the first non-ambiguous index (leading silence
/// and the detector's early trigger are skipped). Each of the 15 bit
/// intervals is decided by majority vote over its 54 samples; an interval
/// where neither tone clears half the width means the frame has too little
/// coherent energy to call and is dropped. Bits are packed LSB first.
///
/// Framing: bit 0 is the header sentinel (must be 0), bit 14 the trailer
/// sentinel (must be 1). Both are stripped from the returned 13-bit word.
pub fn assemble_codeword(classes: &[Tone]) -> Result<u16> {
    let origin = classes
        .iter()
        .position(|&t| t != Tone::Ambiguous)
        .ok_or(TonelinkError::NoCoherentEnergy)?;

    let mut code: u16 = 0;
    let mut code_bit: u16 = 0x01;

    for interval in 0..CODEWORD_BITS {
        let start = origin + interval * BIT_INTERVAL_SAMPLES;
        let mut count_a = 0usize;
        let mut count_b = 0usize;

        // Indices past the window tail count as ambiguous
        for j in 0..BIT_INTERVAL_SAMPLES {
            match classes.get(start + j) {
                Some(Tone::A) => count_a += 1,
                Some(Tone::B) => count_b += 1,
                _ => {}
            }
        }

        if count_a <= BIT_INTERVAL_SAMPLES / 2 && count_b <= BIT_INTERVAL_SAMPLES / 2 {
            return Err(TonelinkError::AmbiguousBitInterval { interval });
        }
        if count_b > count_a {
            code |= code_bit;
        }
        code_bit <<= 1;
    }

    if code & 0x0001 != 0 {
        return Err(TonelinkError::HeaderSentinel);
    }
    if code & (0x0001 << (CODEWORD_BITS - 1)) == 0 {
        return Err(TonelinkError::TrailerSentinel);
    }

    // Strip trailer, then header
    let code = code & !(0x0001 << (CODEWORD_BITS - 1));
    Ok(code >> 1)
}

#[cfg(test)]
mod tests {
    use super::*;

    // Expand a 15-bit codeword, LSB first, into per-sample classifications
    fn classes_for(code: u16, lead_ambiguous: usize) -> Vec<Tone> {
        let mut classes = vec![Tone::Ambiguous; lead_ambiguous];
        for bit in 0..CODEWORD_BITS {
            let tone = if code & (1 << bit) != 0 { Tone::B } else { Tone::A };
            classes.extend(std::iter::repeat(tone).take(BIT_INTERVAL_SAMPLES));
        }
        classes
    }

    #[test]
    fn test_assembles_and_strips_sentinels() {
        // header 0, payload 13 bits = 0x1234, trailer 1
        let code = (0x1234u16 << 1) | (1 << 14);
        let classes = classes_for(code, 0);
        assert_eq!(assemble_codeword(&classes).unwrap(), 0x1234);
    }

    #[test]
    fn test_leading_ambiguity_is_skipped() {
        let code = (0x0155u16 << 1) | (1 << 14);
        let classes = classes_for(code, 97);
        assert_eq!(assemble_codeword(&classes).unwrap(), 0x0155);
    }

    #[test]
    fn test_all_ambiguous_window_fails() {
        let classes = vec![Tone::Ambiguous; 1102];
        assert!(matches!(
            assemble_codeword(&classes),
            Err(TonelinkError::NoCoherentEnergy)
        ));
    }

    #[test]
    fn test_header_sentinel_violation() {
        // LSB interval carries tone B -> header bit 1
        let code = 0x0001 | (1 << 14);
        let classes = classes_for(code, 0);
        assert!(matches!(
            assemble_codeword(&classes),
            Err(TonelinkError::HeaderSentinel)
        ));
    }

    #[test]
    fn test_trailer_sentinel_violation() {
        let code = 0x0AAA << 1; // trailer bit 14 left at 0
        let classes = classes_for(code, 0);
        assert!(matches!(
            assemble_codeword(&classes),
            Err(TonelinkError::TrailerSentinel)
        ));
    }

    #[test]
    fn test_split_interval_fails() {
        let mut classes = classes_for((0x0000u16 << 1) | (1 << 14), 0);
        // Rewrite interval 3 as an even A/B split: neither tone clears half
        let start = 3 * BIT_INTERVAL_SAMPLES;
        for j in 0..BIT_INTERVAL_SAMPLES {
            classes[start + j] = match j % 2 {
                0 => Tone::A,
                _ => Tone::B,
            };
        }
        assert!(matches!(
            assemble_codeword(&classes),
            Err(TonelinkError::AmbiguousBitInterval { interval: 3 })
        ));
    }

    #[test]
    fn test_majority_tolerates_minority_noise() {
        let mut classes = classes_for((0x0F0Fu16 << 1) | (1 << 14), 0);
        // Blank 20 of 54 samples in a few intervals; majority still holds
        for interval in [1usize, 5, 9] {
            let start = interval * BIT_INTERVAL_SAMPLES;
            for j in 0..20 {
                classes[start + j] = Tone::Ambiguous;
            }
        }
        assert_eq!(assemble_codeword(&classes).unwrap(), 0x0F0F);
    }

    #[test]
    fn test_truncated_tail_fails_as_ambiguous() {
        // Origin so late that the last intervals fall off the window
        let mut classes = vec![Tone::Ambiguous; 700];
        classes.extend(classes_for((0x0000u16 << 1) | (1 << 14), 0));
        classes.truncate(1102);
        assert!(matches!(
            assemble_codeword(&classes),
            Err(TonelinkError::AmbiguousBitInterval { .. })
        ));
    }
}

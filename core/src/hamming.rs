use crate::error::{Result, TonelinkError};
use crate::PAYLOAD_BITS;

/// Odd-parity check masks over the 13-bit word. Mask i covers every
/// position whose 1-indexed binary representation has bit i set, parity bit
/// included, so each mask must come out with an odd popcount.
const PARITY_MASKS: [u16; 4] = [0x5555, 0x6666, 0x7878, 0x7F80];

/// Width of the protected word: 9 data bits + 4 parity bits
const WORD_BITS: u8 = 13;

fn is_parity_position(pos_1_indexed: u8) -> bool {
    pos_1_indexed.is_power_of_two()
}

/// Check the four parity masks and strip the redundancy bits.
///
/// This is an all-or-nothing code: a mask with even parity means the frame
/// is unrecoverable and is dropped, never corrected. On success the data
/// bits (every non-power-of-two position, 1-indexed) are packed in order
/// into the 9-bit payload.
pub fn decode(word: u16) -> Result<u16> {
    for &mask in &PARITY_MASKS {
        if (word & mask).count_ones() % 2 == 0 {
            return Err(TonelinkError::ParityMismatch { mask });
        }
    }

    let mut payload: u16 = 0;
    let mut out_bit: u16 = 0x01;
    for pos in 1..=WORD_BITS {
        if !is_parity_position(pos) {
            if word & (1 << (pos - 1)) != 0 {
                payload |= out_bit;
            }
            out_bit <<= 1;
        }
    }

    Ok(payload)
}

/// Systematic inverse of [`decode`]: spread the 9 payload bits over the
/// non-power-of-two positions and set each parity bit so its mask has odd
/// popcount. The transmit path never runs this (it replays clips); it backs
/// the reference wire-format encoder and the round-trip tests.
pub fn encode(payload: u16) -> Result<u16> {
    if payload >> PAYLOAD_BITS != 0 {
        return Err(TonelinkError::PayloadOutOfRange {
            payload,
            bits: PAYLOAD_BITS as u8,
        });
    }

    let mut word: u16 = 0;
    let mut in_bit: u16 = 0x01;
    for pos in 1..=WORD_BITS {
        if !is_parity_position(pos) {
            if payload & in_bit != 0 {
                word |= 1 << (pos - 1);
            }
            in_bit <<= 1;
        }
    }

    for (i, &mask) in PARITY_MASKS.iter().enumerate() {
        if (word & mask).count_ones() % 2 == 0 {
            word |= 1 << ((1u8 << i) - 1);
        }
    }

    Ok(word)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_roundtrip_all_payloads() {
        for payload in 0u16..(1 << PAYLOAD_BITS) {
            let word = encode(payload).unwrap();
            assert_eq!(word >> WORD_BITS, 0, "word overflows 13 bits");
            assert_eq!(decode(word).unwrap(), payload, "payload {:#05x}", payload);
        }
    }

    #[test]
    fn test_encoded_words_pass_all_masks() {
        for payload in [0u16, 1, 0x0AA, 0x155, 0x1FF] {
            let word = encode(payload).unwrap();
            for &mask in &PARITY_MASKS {
                assert_eq!((word & mask).count_ones() % 2, 1);
            }
        }
    }

    #[test]
    fn test_single_bit_error_always_detected() {
        // Every 13-bit position is covered by at least one mask, so a lone
        // flip must fail decode rather than surface a wrong payload.
        for payload in 0u16..(1 << PAYLOAD_BITS) {
            let word = encode(payload).unwrap();
            for bit in 0..WORD_BITS {
                let corrupted = word ^ (1 << bit);
                assert!(
                    decode(corrupted).is_err(),
                    "payload {:#05x} bit {} slipped through",
                    payload,
                    bit
                );
            }
        }
    }

    #[test]
    fn test_payload_out_of_range() {
        assert!(encode(1 << PAYLOAD_BITS).is_err());
        assert!(encode(0xFFFF).is_err());
    }

    #[test]
    fn test_decode_reports_failing_mask() {
        let word = encode(0x0C3).unwrap();
        // Flip the mask-0 parity bit (position 1)
        let corrupted = word ^ 0x0001;
        match decode(corrupted) {
            Err(TonelinkError::ParityMismatch { mask }) => assert_eq!(mask, 0x5555),
            other => panic!("expected parity mismatch, got {:?}", other),
        }
    }
}

use crate::error::{Result, TonelinkError};

/// Minimum bytes before the data chunk can start (RIFF + fmt)
const MIN_HEADER_BYTES: usize = 44;

/// Parsed waveform clip: format fields plus the raw PCM payload.
pub struct Clip {
    pub format: u16,
    pub channels: u16,
    pub sample_rate: u32,
    pub bits_per_sample: u16,
    pub data: Vec<u8>,
}

fn read_u16(bytes: &[u8], at: usize) -> u16 {
    u16::from_le_bytes([bytes[at], bytes[at + 1]])
}

fn read_u32(bytes: &[u8], at: usize) -> u32 {
    u32::from_le_bytes([bytes[at], bytes[at + 1], bytes[at + 2], bytes[at + 3]])
}

/// Parse a minimal RIFF/WAVE clip resource.
///
/// Pre-recorded clips ship with the host application, so malformed header
/// fields are logged and tolerated rather than failing the transmit: the
/// clip plays with whatever is in its data chunk. Only a missing `data`
/// marker (nothing playable at all) or a truncated header is a hard error.
///
/// Expected constraints, warned about when violated: linear PCM (format 1),
/// mono or stereo, 16-bit, 11025-48000 Hz.
pub fn parse_clip(bytes: &[u8]) -> Result<Clip> {
    if bytes.len() < MIN_HEADER_BYTES {
        return Err(TonelinkError::ClipTruncated(bytes.len()));
    }

    let format = read_u16(bytes, 20);
    if format != 1 {
        log::warn!("clip: unsupported encoding {}", format);
    }
    let channels = read_u16(bytes, 22);
    if channels != 1 && channels != 2 {
        log::warn!("clip: unsupported channel count {}", channels);
    }
    let sample_rate = read_u32(bytes, 24);
    if !(11025..=48000).contains(&sample_rate) {
        log::warn!("clip: unsupported sample rate {}", sample_rate);
    }
    let bits_per_sample = read_u16(bytes, 34);
    if bits_per_sample != 16 {
        log::warn!("clip: unsupported bit depth {}", bits_per_sample);
    }

    // Walk chunks after the fmt block until the data marker shows up
    let mut at = 36;
    let data_start = loop {
        if at + 8 > bytes.len() {
            return Err(TonelinkError::ClipDataMissing);
        }
        let tag = &bytes[at..at + 4];
        let size = read_u32(bytes, at + 4) as usize;
        if tag == b"data" {
            break at + 8;
        }
        log::warn!(
            "clip: skipping non-data chunk {:?} ({} bytes)",
            String::from_utf8_lossy(tag),
            size
        );
        at += 8 + size;
    };

    let declared = read_u32(bytes, data_start - 4) as usize;
    let available = bytes.len() - data_start;
    let take = if declared > available {
        log::warn!(
            "clip: data chunk declares {} bytes but only {} remain",
            declared,
            available
        );
        available
    } else {
        declared
    };

    Ok(Clip {
        format,
        channels,
        sample_rate,
        bits_per_sample,
        data: bytes[data_start..data_start + take].to_vec(),
    })
}

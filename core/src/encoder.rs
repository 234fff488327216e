use crate::error::{Result, TonelinkError};
use crate::wav;

/// Resolves a named waveform clip to its raw resource bytes.
///
/// This is the boundary to the host's resource system (asset bundle,
/// filesystem, embedded table); the core only asks for clips by logical
/// name and parses what comes back.
pub trait ClipLibrary {
    fn load(&self, name: &str) -> Result<Vec<u8>>;
}

/// Device playback profile, selected once at session setup.
///
/// Some device families need differently mastered clips to come out clean
/// on their speakers. Profiles map to clip-set identifiers through an
/// explicit table rather than sniffing manufacturer strings at every call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DeviceProfile {
    #[default]
    Standard,
    /// Hotter mastering for speakers that attenuate the carrier band
    Alternate,
}

/// Logical clip names making up one transmit clip set.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClipSet {
    pub header: &'static str,
    pub bit0: &'static str,
    pub bit1: &'static str,
    pub silence: &'static str,
}

impl ClipSet {
    /// Profile-to-clip-set table.
    pub fn for_profile(profile: DeviceProfile) -> Self {
        match profile {
            DeviceProfile::Standard => ClipSet {
                header: "wav_header",
                bit0: "wav_bit0",
                bit1: "wav_bit1",
                silence: "wav_silence10ms",
            },
            DeviceProfile::Alternate => ClipSet {
                header: "alt_header",
                bit0: "alt_bit0",
                bit1: "alt_bit1",
                silence: "wav_silence10ms",
            },
        }
    }
}

/// Builds the transmit buffer by concatenating pre-built waveform clips.
///
/// No tone synthesis and no parity encode happen here: the peripheral's
/// receive direction defines its own symbology and the clips already carry
/// it. The buffer is rebuilt from scratch on every call; the only state
/// kept between transmissions is the resolved clip set.
pub struct TransmitEncoder<L: ClipLibrary> {
    library: L,
    clips: ClipSet,
}

impl<L: ClipLibrary> TransmitEncoder<L> {
    pub fn new(library: L) -> Self {
        Self::with_profile(library, DeviceProfile::default())
    }

    pub fn with_profile(library: L, profile: DeviceProfile) -> Self {
        Self {
            library,
            clips: ClipSet::for_profile(profile),
        }
    }

    /// Encode a payload into a playback buffer.
    ///
    /// Layout: header clip, one bit clip per payload bit from lowest to
    /// highest, header clip again as the trailer. A `bit_count` wider than
    /// the payload word transmits the extra positions as zero bits.
    pub fn encode(&self, payload: u32, bit_count: u8) -> Result<Vec<u8>> {
        let mut buffer = Vec::new();
        self.append_clip(&mut buffer, self.clips.header)?;

        for bit in 0..bit_count {
            let set = (bit as u32) < u32::BITS && payload >> bit & 0x01 != 0;
            let name = if set {
                self.clips.bit1
            } else {
                self.clips.bit0
            };
            self.append_clip(&mut buffer, name)?;
        }

        self.append_clip(&mut buffer, self.clips.header)?;
        Ok(buffer)
    }

    /// Prepend roughly `millis` of silence in 10 ms clip units.
    pub fn lead_in_silence(&self, buffer: &mut Vec<u8>, millis: u32) -> Result<()> {
        let mut silence = Vec::new();
        for _ in 0..millis / 10 {
            self.append_clip(&mut silence, self.clips.silence)?;
        }
        silence.extend_from_slice(buffer);
        *buffer = silence;
        Ok(())
    }

    fn append_clip(&self, buffer: &mut Vec<u8>, name: &str) -> Result<()> {
        let bytes = self
            .library
            .load(name)
            .map_err(|_| TonelinkError::ClipNotFound(name.to_string()))?;
        let clip = wav::parse_clip(&bytes)?;
        buffer.extend_from_slice(&clip.data);
        Ok(())
    }
}

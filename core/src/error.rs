use thiserror::Error;

#[derive(Debug, Error)]
pub enum TonelinkError {
    /// No index in the window cleared the coherence threshold
    #[error("no coherent tone energy in window")]
    NoCoherentEnergy,

    #[error("header sentinel bit is not 0")]
    HeaderSentinel,

    #[error("trailer sentinel bit is not 1")]
    TrailerSentinel,

    #[error("bit interval {interval} has no majority tone")]
    AmbiguousBitInterval { interval: usize },

    #[error("parity check failed for mask {mask:#06x}")]
    ParityMismatch { mask: u16 },

    #[error("payload {payload} does not fit in {bits} bits")]
    PayloadOutOfRange { payload: u16, bits: u8 },

    #[error("waveform clip {0:?} not found")]
    ClipNotFound(String),

    /// Clip bytes with no RIFF data chunk cannot be played at all
    #[error("waveform clip has no data chunk")]
    ClipDataMissing,

    #[error("clip too short: {0} bytes")]
    ClipTruncated(usize),

    #[error("audio device error: {0}")]
    AudioDevice(String),
}

pub type Result<T> = std::result::Result<T, TonelinkError>;

//! Acoustic pairing modem for radio-less peripherals
//!
//! Carries a small integer payload over a speaker/microphone link using two
//! fixed carrier tones (2500 Hz / 5000 Hz). The receive pipeline detects a
//! frame start in the capture stream, normalizes amplitude per zero-crossing
//! segment, estimates non-coherent tone energy, extracts bits by majority
//! vote and validates the codeword with a Hamming-style parity check.
//! Transmit concatenates pre-recorded waveform clips.

pub mod agc;
pub mod decoder;
pub mod encoder;
pub mod error;
pub mod frame;
pub mod hamming;
pub mod mailbox;
pub mod player;
pub mod session;
pub mod sync;
pub mod synth;
pub mod tone;
pub mod wav;
pub mod window;

pub use decoder::Decoder;
pub use encoder::{ClipLibrary, ClipSet, DeviceProfile, TransmitEncoder};
pub use error::{Result, TonelinkError};
pub use mailbox::ResponseMailbox;
pub use player::{PlaybackSink, Player};
pub use session::{CaptureSource, Recorder, SessionState};

/// Capture/playback sample rate in Hz (mono, signed 16-bit PCM)
pub const SAMPLE_RATE: usize = 44100;

/// One analysis window of tone data (25 ms of samples)
pub const WINDOW_SAMPLES: usize = SAMPLE_RATE / 40; // 1102

/// Samples carried across read boundaries so a burst never straddles invisibly
pub const CARRY_SAMPLES: usize = 32;

/// Samples probed when checking for a frame-start burst
pub const BURST_PROBE_SAMPLES: usize = 5;

/// Default absolute amplitude a burst sample must exceed
pub const DEFAULT_BURST_THRESHOLD: i16 = 1024;

/// Trailing integration block for non-coherent energy, also the smoothing tap
pub const NONCOHERENT_SAMPLES: usize = 16;

/// Minimum smoothed tone energy to trust a classification as signal
pub const COHERENT_THRESHOLD: f32 = 4096.0;

/// Carrier for a 0 bit
pub const TONE_A_HZ: f32 = 2500.0;

/// Carrier for a 1 bit
pub const TONE_B_HZ: f32 = 5000.0;

/// Samples per bit interval inside the analysis window
pub const BIT_INTERVAL_SAMPLES: usize = 54;

/// Codeword length: header sentinel + 13-bit Hamming word + trailer sentinel
pub const CODEWORD_BITS: usize = 15;

/// Data bits carried per frame after parity stripping
pub const PAYLOAD_BITS: usize = 9;

/// Library version constant exposed to the host application
pub const VERSION: u32 = 1;

/// Library build date constant (YYYYMMDD)
pub const DATE_CODE: u32 = 20260830;

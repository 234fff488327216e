use crate::decoder::Decoder;
use crate::error::Result;
use crate::mailbox::ResponseMailbox;
use crate::DEFAULT_BURST_THRESHOLD;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::JoinHandle;

/// Blocking audio input collaborator.
///
/// Opens a mono 16-bit 44.1 kHz stream; `read` blocks until samples are
/// available and returns how many were written into `buf`. Any count >= 0
/// is valid; retry/backoff policy belongs to the implementation, not the
/// core. A failed read is fatal for the session.
pub trait CaptureSource: Send {
    fn read(&mut self, buf: &mut [i16]) -> Result<usize>;
}

/// Shared session state between the capture thread and the host.
///
/// Each flag has a single writer, so plain atomic loads/stores are enough
/// for cross-thread visibility.
#[derive(Clone)]
pub struct SessionState {
    recording: Arc<AtomicBool>,
    decoding: Arc<AtomicBool>,
    mailbox: ResponseMailbox,
}

impl SessionState {
    pub fn new() -> Self {
        Self {
            recording: Arc::new(AtomicBool::new(false)),
            decoding: Arc::new(AtomicBool::new(false)),
            mailbox: ResponseMailbox::new(),
        }
    }

    pub fn is_recording(&self) -> bool {
        self.recording.load(Ordering::Acquire)
    }

    pub fn enable_decode(&self) {
        self.decoding.store(true, Ordering::Release);
    }

    pub fn disable_decode(&self) {
        self.decoding.store(false, Ordering::Release);
    }

    pub fn is_decoding(&self) -> bool {
        self.decoding.load(Ordering::Acquire)
    }

    pub fn response_pending(&self) -> bool {
        self.mailbox.is_pending()
    }

    /// Take-and-clear the most recent decoded payload.
    pub fn fetch_response(&self) -> Option<u16> {
        self.mailbox.take()
    }

    fn set_recording(&self, on: bool) {
        self.recording.store(on, Ordering::Release);
    }
}

impl Default for SessionState {
    fn default() -> Self {
        Self::new()
    }
}

/// Capture block size in samples per blocking read
const READ_SAMPLES: usize = 4096;

/// Owns the dedicated capture thread running the read-decode loop.
///
/// One session at a time: starting while a session is active stops and
/// joins the previous thread before the new one spawns, so two loops never
/// compete for the input device.
pub struct Recorder {
    state: SessionState,
    burst_threshold: i16,
    handle: Option<JoinHandle<()>>,
}

impl Recorder {
    pub fn new() -> Self {
        Self::with_threshold(DEFAULT_BURST_THRESHOLD)
    }

    pub fn with_threshold(burst_threshold: i16) -> Self {
        Self {
            state: SessionState::new(),
            burst_threshold,
            handle: None,
        }
    }

    pub fn state(&self) -> SessionState {
        self.state.clone()
    }

    /// Start the capture loop over `source`.
    ///
    /// Each iteration blocks on the source for a block of samples, then
    /// runs the whole receive pipeline inline before blocking again; a
    /// successful decode lands in the mailbox. Frames are processed one at
    /// a time on this thread, never in parallel.
    pub fn start<S: CaptureSource + 'static>(&mut self, source: S) {
        self.stop();

        let state = self.state.clone();
        let threshold = self.burst_threshold;
        state.set_recording(true);

        let handle = std::thread::Builder::new()
            .name("tonelink-capture".into())
            .spawn(move || capture_loop(source, state, threshold))
            .expect("failed to spawn capture thread");
        self.handle = Some(handle);
    }

    /// Stop the session and wait for the capture thread to exit.
    /// Idempotent; safe to call with no session running.
    pub fn stop(&mut self) {
        self.state.set_recording(false);
        if let Some(handle) = self.handle.take() {
            let _ = handle.join();
        }
    }
}

impl Default for Recorder {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for Recorder {
    fn drop(&mut self) {
        self.stop();
    }
}

fn capture_loop<S: CaptureSource>(mut source: S, state: SessionState, threshold: i16) {
    let mut decoder = Decoder::with_threshold(threshold);
    let mut buf = vec![0i16; READ_SAMPLES];

    while state.is_recording() {
        let count = match source.read(&mut buf) {
            Ok(count) => count.min(buf.len()),
            Err(e) => {
                // Device failures are fatal for the session; the host sees
                // recording drop to false.
                log::error!("capture read failed: {}", e);
                break;
            }
        };

        if count == 0 || !state.is_decoding() {
            continue;
        }

        if let Some(payload) = decoder.push(&buf[..count]) {
            state.mailbox.publish(payload);
        }
    }

    state.set_recording(false);
}

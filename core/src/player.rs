use crate::error::Result;
use std::sync::{Arc, Condvar, Mutex};
use std::thread::JoinHandle;
use std::time::{Duration, Instant};

/// Blocking audio output collaborator.
///
/// Opens a mono 16-bit PCM stream; `write` returns how many bytes were
/// consumed (the player loops until the whole buffer is written). `play`
/// starts or restarts playback of what was written; `stop` halts it.
pub trait PlaybackSink: Send {
    fn write(&mut self, bytes: &[u8]) -> Result<usize>;
    fn play(&mut self) -> Result<()>;
    fn stop(&mut self) -> Result<()>;
    fn active(&self) -> bool;
}

/// Drives a playback sink and schedules looped replays.
///
/// Writing is synchronous: `transmit` blocks until the sink accepted every
/// byte, then starts playback. Replay is timer-driven and cooperative, not
/// a dedicated playback thread: a scheduled replay fires once after its
/// delay unless a newer schedule or transmit cancelled it first. The timer
/// waits on a condvar guarding a generation counter, so cancellation wakes
/// it immediately instead of letting it sleep out the delay.
pub struct Player<S: PlaybackSink + 'static> {
    sink: Arc<Mutex<S>>,
    timer: Arc<(Mutex<u64>, Condvar)>,
    pending: Mutex<Option<JoinHandle<()>>>,
}

impl<S: PlaybackSink + 'static> Player<S> {
    pub fn new(sink: S) -> Self {
        Self {
            sink: Arc::new(Mutex::new(sink)),
            timer: Arc::new((Mutex::new(0), Condvar::new())),
            pending: Mutex::new(None),
        }
    }

    /// Write the whole transmit buffer and start playback.
    /// Cancels any replay still pending from an earlier transmission.
    pub fn transmit(&self, buffer: &[u8]) -> Result<()> {
        self.cancel_replay();

        let mut sink = self.sink.lock().unwrap();
        sink.stop()?;

        let mut written = 0;
        while written < buffer.len() {
            written += sink.write(&buffer[written..])?;
        }
        sink.play()
    }

    /// Schedule a one-shot replay after `delay`.
    ///
    /// Scheduling again before the timer fires replaces the pending replay;
    /// only the newest schedule can fire.
    pub fn schedule_replay(&self, delay: Duration) {
        let generation = self.bump_generation();
        let sink = Arc::clone(&self.sink);
        let timer = Arc::clone(&self.timer);

        let handle = std::thread::Builder::new()
            .name("tonelink-replay".into())
            .spawn(move || replay_timer(sink, timer, generation, delay))
            .expect("failed to spawn replay timer");

        // The superseded timer wakes and exits on the generation bump
        let stale = self.pending.lock().unwrap().replace(handle);
        if let Some(stale) = stale {
            let _ = stale.join();
        }
    }

    /// Invalidate any pending replay and wake its timer thread.
    pub fn cancel_replay(&self) {
        self.bump_generation();
        if let Some(stale) = self.pending.lock().unwrap().take() {
            let _ = stale.join();
        }
    }

    fn bump_generation(&self) -> u64 {
        let (generation, wakeup) = &*self.timer;
        let mut generation = generation.lock().unwrap();
        *generation += 1;
        wakeup.notify_all();
        *generation
    }

    /// Whether the sink is currently playing.
    pub fn is_playing(&self) -> bool {
        self.sink.lock().unwrap().active()
    }

    /// Stop playback and drop any pending replay.
    pub fn stop(&self) -> Result<()> {
        self.cancel_replay();
        self.sink.lock().unwrap().stop()
    }
}

fn replay_timer<S: PlaybackSink>(
    sink: Arc<Mutex<S>>,
    timer: Arc<(Mutex<u64>, Condvar)>,
    generation: u64,
    delay: Duration,
) {
    let (current, wakeup) = &*timer;
    let deadline = Instant::now() + delay;

    let mut current = current.lock().unwrap();
    loop {
        if *current != generation {
            return;
        }
        let now = Instant::now();
        if now >= deadline {
            break;
        }
        current = wakeup.wait_timeout(current, deadline - now).unwrap().0;
    }
    drop(current);

    let mut sink = sink.lock().unwrap();
    if let Err(e) = sink.stop() {
        log::warn!("replay stop failed: {}", e);
        return;
    }
    if let Err(e) = sink.play() {
        log::warn!("replay failed: {}", e);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Default)]
    struct SinkLog {
        written: Vec<u8>,
        plays: usize,
        playing: bool,
        /// Max bytes accepted per write call, to exercise the write loop
        chunk_limit: usize,
    }

    #[derive(Clone, Default)]
    struct MockSink(Arc<Mutex<SinkLog>>);

    impl PlaybackSink for MockSink {
        fn write(&mut self, bytes: &[u8]) -> Result<usize> {
            let mut log = self.0.lock().unwrap();
            let take = if log.chunk_limit > 0 {
                bytes.len().min(log.chunk_limit)
            } else {
                bytes.len()
            };
            let taken = &bytes[..take];
            log.written.extend_from_slice(taken);
            Ok(take)
        }

        fn play(&mut self) -> Result<()> {
            let mut log = self.0.lock().unwrap();
            log.plays += 1;
            log.playing = true;
            Ok(())
        }

        fn stop(&mut self) -> Result<()> {
            self.0.lock().unwrap().playing = false;
            Ok(())
        }

        fn active(&self) -> bool {
            self.0.lock().unwrap().playing
        }
    }

    #[test]
    fn test_transmit_writes_everything_then_plays() {
        let sink = MockSink::default();
        sink.0.lock().unwrap().chunk_limit = 3;
        let log = Arc::clone(&sink.0);

        let player = Player::new(sink);
        player.transmit(b"0123456789").unwrap();

        let log = log.lock().unwrap();
        assert_eq!(log.written, b"0123456789");
        assert_eq!(log.plays, 1);
        assert!(log.playing);
    }

    #[test]
    fn test_is_playing_tracks_sink() {
        let sink = MockSink::default();
        let player = Player::new(sink);
        assert!(!player.is_playing());
        player.transmit(b"xy").unwrap();
        assert!(player.is_playing());
        player.stop().unwrap();
        assert!(!player.is_playing());
    }

    #[test]
    fn test_replay_fires_after_delay() {
        let sink = MockSink::default();
        let log = Arc::clone(&sink.0);
        let player = Player::new(sink);

        player.transmit(b"ab").unwrap();
        player.schedule_replay(Duration::from_millis(10));
        std::thread::sleep(Duration::from_millis(200));

        assert_eq!(log.lock().unwrap().plays, 2);
    }

    #[test]
    fn test_newer_schedule_cancels_older() {
        let sink = MockSink::default();
        let log = Arc::clone(&sink.0);
        let player = Player::new(sink);

        player.transmit(b"ab").unwrap();
        player.schedule_replay(Duration::from_millis(10));
        player.schedule_replay(Duration::from_millis(30));
        std::thread::sleep(Duration::from_millis(300));

        // Initial play + exactly one replay
        assert_eq!(log.lock().unwrap().plays, 2);
    }

    #[test]
    fn test_cancel_replay() {
        let sink = MockSink::default();
        let log = Arc::clone(&sink.0);
        let player = Player::new(sink);

        player.transmit(b"ab").unwrap();
        player.schedule_replay(Duration::from_millis(20));
        player.cancel_replay();
        std::thread::sleep(Duration::from_millis(200));

        assert_eq!(log.lock().unwrap().plays, 1);
    }

    #[test]
    fn test_cancel_wakes_sleeping_timer() {
        let sink = MockSink::default();
        let log = Arc::clone(&sink.0);
        let player = Player::new(sink);

        player.transmit(b"ab").unwrap();
        player.schedule_replay(Duration::from_secs(60));

        // cancel_replay joins the timer thread; it must return long before
        // the scheduled delay would elapse
        let start = Instant::now();
        player.cancel_replay();
        assert!(start.elapsed() < Duration::from_secs(5));
        assert_eq!(log.lock().unwrap().plays, 1);
    }
}

//! Playback synchronizer.
//!
//! Starts the player for each pass and shows every lyric when the time since
//! the pass started reaches its timestamp. Every wait races the shutdown
//! future, so an interrupt stops the loop at the next scheduling step and
//! the player is terminated before returning.

use std::future::Future;
use std::num::NonZeroU32;
use std::path::{Path, PathBuf};
use std::pin::Pin;
use std::time::Duration;

use tokio::time::{self, Instant};

use crate::config::Config;
use crate::constants::timing::COUNTDOWN_TICK;
use crate::error::{Error, Result};
use crate::lrc::LyricLine;
use crate::player::Player;
use crate::screen::Screen;

/// How many passes to play.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RepeatCount {
    /// A fixed number of passes.
    Times(NonZeroU32),
    /// Loop until interrupted.
    Forever,
}

impl RepeatCount {
    /// Map a user count to a repeat count; 0 means forever.
    pub fn from_count(count: u32) -> Self {
        NonZeroU32::new(count).map_or(Self::Forever, Self::Times)
    }

    fn allows(self, passes: u64) -> bool {
        match self {
            Self::Times(n) => passes < u64::from(n.get()),
            Self::Forever => true,
        }
    }
}

impl Default for RepeatCount {
    fn default() -> Self {
        Self::Times(NonZeroU32::MIN)
    }
}

/// Everything one run needs: what to play, what to show, how often.
#[derive(Debug, Clone)]
pub struct PlaybackSession {
    audio_path: PathBuf,
    lines: Vec<LyricLine>,
    repeat: RepeatCount,
}

impl PlaybackSession {
    /// Create a session. Fails if the audio file does not exist.
    pub fn new(
        audio_path: impl Into<PathBuf>,
        mut lines: Vec<LyricLine>,
        repeat: RepeatCount,
    ) -> Result<Self> {
        let audio_path = audio_path.into();
        if !audio_path.is_file() {
            return Err(Error::not_found(audio_path));
        }
        if !lines.is_sorted_by_key(|l| l.timestamp) {
            lines.sort_by_key(|l| l.timestamp);
        }
        Ok(Self { audio_path, lines, repeat })
    }

    /// Audio file played each pass.
    pub fn audio_path(&self) -> &Path {
        &self.audio_path
    }

    /// Lyric lines in timestamp order.
    pub fn lines(&self) -> &[LyricLine] {
        &self.lines
    }

    /// Number of passes.
    pub const fn repeat(&self) -> RepeatCount {
        self.repeat
    }
}

/// Tunables for the synchronizer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SyncOptions {
    /// Count down to the first lyric.
    pub countdown: bool,
    /// Pause after the last lyric before waiting on the player.
    pub tail: Duration,
}

impl From<&Config> for SyncOptions {
    fn from(config: &Config) -> Self {
        Self { countdown: config.countdown, tail: config.tail }
    }
}

/// How a run ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// Every requested pass was played.
    Completed {
        /// Passes played.
        passes: u64,
    },
    /// Stopped by an interrupt.
    Interrupted {
        /// Passes fully played before the interrupt.
        passes: u64,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Step {
    Reached,
    Interrupted,
}

/// Drives one player and one screen through a session.
pub struct Synchronizer<P, S> {
    player: P,
    screen: S,
    options: SyncOptions,
    player_running: bool,
}

impl<P: Player, S: Screen> Synchronizer<P, S> {
    /// Create a synchronizer that owns `player` and `screen`.
    pub const fn new(player: P, screen: S, options: SyncOptions) -> Self {
        Self { player, screen, options, player_running: false }
    }

    /// Give back the player and screen.
    pub fn into_parts(self) -> (P, S) {
        (self.player, self.screen)
    }

    /// Play `session` until its repeat count runs out or `shutdown` resolves.
    pub async fn run<F>(&mut self, session: &PlaybackSession, shutdown: F) -> Result<Outcome>
    where
        F: Future<Output = ()>,
    {
        tokio::pin!(shutdown);
        let mut passes = 0;

        while session.repeat().allows(passes) {
            match self.play_pass(session, &mut shutdown).await {
                Ok(Step::Reached) => passes += 1,
                Ok(Step::Interrupted) | Err(Error::Interrupted) => {
                    self.player.stop().await?;
                    tracing::info!("Interrupted after {passes} pass(es)");
                    return Ok(Outcome::Interrupted { passes });
                }
                Err(e) => {
                    if let Err(stop_err) = self.player.stop().await {
                        tracing::warn!("Failed to stop {}: {stop_err}", self.player.name());
                    }
                    return Err(e);
                }
            }
        }

        tracing::info!("Completed {passes} pass(es)");
        Ok(Outcome::Completed { passes })
    }

    async fn play_pass<F>(
        &mut self,
        session: &PlaybackSession,
        shutdown: &mut Pin<&mut F>,
    ) -> Result<Step>
    where
        F: Future<Output = ()>,
    {
        self.player.start(session.audio_path()).await?;
        self.player_running = true;
        let start = Instant::now();

        match session.lines().first() {
            None => self.screen.notice("No lyrics to display.")?,
            Some(first) if self.options.countdown => {
                if self.countdown(start + first.timestamp, shutdown).await? == Step::Interrupted {
                    return Ok(Step::Interrupted);
                }
            }
            Some(_) => {}
        }

        for line in session.lines() {
            if self.wait_until(start + line.timestamp, shutdown).await? == Step::Interrupted {
                return Ok(Step::Interrupted);
            }
            self.screen.show(&line.text)?;
        }

        let tail = Instant::now() + self.options.tail;
        if self.wait_until(tail, shutdown).await? == Step::Interrupted {
            return Ok(Step::Interrupted);
        }

        // Let the track finish so passes never overlap.
        if self.player_running {
            tokio::select! {
                biased;
                () = shutdown.as_mut() => return Ok(Step::Interrupted),
                res = self.player.wait() => res?,
            }
            self.player_running = false;
        }
        Ok(Step::Reached)
    }

    /// Show whole seconds left until `first`, redrawing when the number changes.
    async fn countdown<F>(&mut self, first: Instant, shutdown: &mut Pin<&mut F>) -> Result<Step>
    where
        F: Future<Output = ()>,
    {
        let mut shown = None;
        loop {
            let remaining = first.saturating_duration_since(Instant::now());
            if remaining.is_zero() {
                return Ok(Step::Reached);
            }
            let secs = remaining.as_millis().div_ceil(1000);
            let secs = u64::try_from(secs).unwrap_or(u64::MAX);
            if shown != Some(secs) {
                self.screen.countdown(secs)?;
                shown = Some(secs);
            }
            let next = (Instant::now() + COUNTDOWN_TICK).min(first);
            if self.wait_until(next, shutdown).await? == Step::Interrupted {
                return Ok(Step::Interrupted);
            }
        }
    }

    /// Sleep until `deadline`, watching the player and the shutdown future.
    async fn wait_until<F>(&mut self, deadline: Instant, shutdown: &mut Pin<&mut F>) -> Result<Step>
    where
        F: Future<Output = ()>,
    {
        loop {
            tokio::select! {
                biased;
                () = shutdown.as_mut() => return Ok(Step::Interrupted),
                () = time::sleep_until(deadline) => return Ok(Step::Reached),
                res = self.player.wait(), if self.player_running => {
                    self.player_running = false;
                    res?;
                    tracing::debug!("{} finished before the lyrics", self.player.name());
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::expect_used, clippy::unwrap_used, clippy::panic)]

    use std::sync::{Arc, Mutex};

    use async_trait::async_trait;

    use super::*;

    #[derive(Debug, Clone, PartialEq, Eq)]
    enum Event {
        Start,
        Stop,
        Countdown(u64),
        Show(String, Duration),
        Notice(String),
    }

    type Log = Arc<Mutex<Vec<Event>>>;

    /// Player whose "track" is a timer.
    struct FakePlayer {
        log: Log,
        track: Duration,
        ends_at: Option<Instant>,
        fail_start: bool,
        crash: bool,
    }

    impl FakePlayer {
        fn new(log: &Log, track: Duration) -> Self {
            Self { log: Arc::clone(log), track, ends_at: None, fail_start: false, crash: false }
        }
    }

    #[async_trait]
    impl Player for FakePlayer {
        async fn start(&mut self, _audio: &Path) -> Result<()> {
            if self.fail_start {
                return Err(Error::PlayerLaunch {
                    program: "fake".into(),
                    source: std::io::Error::from(std::io::ErrorKind::NotFound),
                });
            }
            self.log.lock().unwrap().push(Event::Start);
            self.ends_at = Some(Instant::now() + self.track);
            Ok(())
        }

        async fn wait(&mut self) -> Result<()> {
            let Some(end) = self.ends_at else { return Ok(()) };
            time::sleep_until(end).await;
            self.ends_at = None;
            if self.crash {
                return Err(Error::from("player crashed"));
            }
            Ok(())
        }

        async fn stop(&mut self) -> Result<()> {
            if self.ends_at.take().is_some() {
                self.log.lock().unwrap().push(Event::Stop);
            }
            Ok(())
        }

        fn name(&self) -> &str {
            "fake"
        }
    }

    struct RecordingScreen {
        log: Log,
        origin: Instant,
    }

    impl Screen for RecordingScreen {
        fn countdown(&mut self, remaining_secs: u64) -> Result<()> {
            self.log.lock().unwrap().push(Event::Countdown(remaining_secs));
            Ok(())
        }

        fn show(&mut self, text: &str) -> Result<()> {
            let at = Instant::now() - self.origin;
            self.log.lock().unwrap().push(Event::Show(text.to_string(), at));
            Ok(())
        }

        fn notice(&mut self, message: &str) -> Result<()> {
            self.log.lock().unwrap().push(Event::Notice(message.to_string()));
            Ok(())
        }
    }

    fn audio_file() -> tempfile::NamedTempFile {
        tempfile::NamedTempFile::new().unwrap()
    }

    fn two_lines() -> Vec<LyricLine> {
        vec![
            LyricLine::new(Duration::from_millis(1_000), "A"),
            LyricLine::new(Duration::from_millis(3_500), "B"),
        ]
    }

    fn quiet() -> SyncOptions {
        SyncOptions { countdown: false, tail: Duration::from_millis(500) }
    }

    fn setup(
        track: Duration,
        options: SyncOptions,
    ) -> (Log, Synchronizer<FakePlayer, RecordingScreen>) {
        let log: Log = Arc::default();
        let screen = RecordingScreen { log: Arc::clone(&log), origin: Instant::now() };
        let sync = Synchronizer::new(FakePlayer::new(&log, track), screen, options);
        (log, sync)
    }

    fn shown(log: &Log) -> Vec<(String, Duration)> {
        log.lock()
            .unwrap()
            .iter()
            .filter_map(|e| match e {
                Event::Show(t, at) => Some((t.clone(), *at)),
                _ => None,
            })
            .collect()
    }

    #[test]
    fn repeat_zero_is_forever() {
        assert_eq!(RepeatCount::from_count(0), RepeatCount::Forever);
        assert_eq!(RepeatCount::from_count(2), RepeatCount::Times(NonZeroU32::new(2).unwrap()));
        assert!(RepeatCount::Forever.allows(u64::MAX - 1));
        assert!(!RepeatCount::default().allows(1));
    }

    #[test]
    fn missing_audio_is_not_found() {
        let err = PlaybackSession::new("/no/such/song.mp3", two_lines(), RepeatCount::default())
            .unwrap_err();
        assert!(matches!(err, Error::FileNotFound { .. }));
    }

    #[test]
    fn session_sorts_lines() {
        let audio = audio_file();
        let mut lines = two_lines();
        lines.reverse();
        let session = PlaybackSession::new(audio.path(), lines, RepeatCount::default()).unwrap();
        assert_eq!(session.lines(), two_lines().as_slice());
    }

    #[tokio::test(start_paused = true)]
    async fn emits_lines_at_their_timestamps() {
        let audio = audio_file();
        let session =
            PlaybackSession::new(audio.path(), two_lines(), RepeatCount::default()).unwrap();
        let (log, mut sync) = setup(Duration::from_secs(4), quiet());

        let outcome = sync.run(&session, std::future::pending()).await.unwrap();

        assert_eq!(outcome, Outcome::Completed { passes: 1 });
        assert_eq!(
            shown(&log),
            vec![
                ("A".to_string(), Duration::from_millis(1_000)),
                ("B".to_string(), Duration::from_millis(3_500)),
            ]
        );
    }

    #[tokio::test(start_paused = true)]
    async fn nothing_shown_before_first_timestamp() {
        let audio = audio_file();
        let session =
            PlaybackSession::new(audio.path(), two_lines(), RepeatCount::default()).unwrap();
        let (log, mut sync) = setup(Duration::from_secs(4), quiet());

        let outcome = sync.run(&session, time::sleep(Duration::from_millis(999))).await.unwrap();

        assert_eq!(outcome, Outcome::Interrupted { passes: 0 });
        assert!(shown(&log).is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn repeat_restarts_player_each_pass() {
        let audio = audio_file();
        let repeat = RepeatCount::from_count(2);
        let session = PlaybackSession::new(audio.path(), two_lines(), repeat).unwrap();
        let (log, mut sync) = setup(Duration::from_secs(5), quiet());

        let outcome = sync.run(&session, std::future::pending()).await.unwrap();

        assert_eq!(outcome, Outcome::Completed { passes: 2 });
        let times: Vec<_> = shown(&log).into_iter().map(|(_, at)| at.as_millis()).collect();
        // Second pass starts once the 5s track ends.
        assert_eq!(times, vec![1_000, 3_500, 6_000, 8_500]);
        let starts = log.lock().unwrap().iter().filter(|e| **e == Event::Start).count();
        assert_eq!(starts, 2);
    }

    #[tokio::test(start_paused = true)]
    async fn forever_stops_on_interrupt_and_kills_player() {
        let audio = audio_file();
        let session =
            PlaybackSession::new(audio.path(), two_lines(), RepeatCount::Forever).unwrap();
        let (log, mut sync) = setup(Duration::from_secs(3), quiet());
        let begun = Instant::now();

        let outcome = sync.run(&session, time::sleep(Duration::from_millis(10_200))).await.unwrap();

        // Passes take 4s (3.5s last lyric + 0.5s tail).
        assert_eq!(outcome, Outcome::Interrupted { passes: 2 });
        assert_eq!(Instant::now() - begun, Duration::from_millis(10_200));
        let texts: Vec<_> = shown(&log).into_iter().map(|(t, _)| t).collect();
        assert_eq!(texts, vec!["A", "B", "A", "B", "A"]);
        assert_eq!(log.lock().unwrap().last(), Some(&Event::Stop));
    }

    #[tokio::test(start_paused = true)]
    async fn countdown_counts_whole_seconds() {
        let audio = audio_file();
        let lines = vec![LyricLine::new(Duration::from_millis(2_500), "go")];
        let session = PlaybackSession::new(audio.path(), lines, RepeatCount::default()).unwrap();
        let options = SyncOptions { countdown: true, tail: Duration::ZERO };
        let (log, mut sync) = setup(Duration::from_secs(3), options);

        sync.run(&session, std::future::pending()).await.unwrap();

        let events = log.lock().unwrap().clone();
        assert_eq!(
            events,
            vec![
                Event::Start,
                Event::Countdown(3),
                Event::Countdown(2),
                Event::Countdown(1),
                Event::Show("go".into(), Duration::from_millis(2_500)),
            ]
        );
    }

    #[tokio::test(start_paused = true)]
    async fn empty_lyrics_still_play_audio() {
        let audio = audio_file();
        let session = PlaybackSession::new(audio.path(), vec![], RepeatCount::default()).unwrap();
        let (log, mut sync) = setup(Duration::from_secs(2), quiet());

        let outcome = sync.run(&session, std::future::pending()).await.unwrap();

        assert_eq!(outcome, Outcome::Completed { passes: 1 });
        let events = log.lock().unwrap().clone();
        assert_eq!(events, vec![Event::Start, Event::Notice("No lyrics to display.".into())]);
    }

    #[tokio::test(start_paused = true)]
    async fn lyrics_outlast_short_track() {
        let audio = audio_file();
        let session =
            PlaybackSession::new(audio.path(), two_lines(), RepeatCount::default()).unwrap();
        let (log, mut sync) = setup(Duration::from_secs(2), quiet());

        sync.run(&session, std::future::pending()).await.unwrap();

        assert_eq!(shown(&log).len(), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn player_crash_stops_playback() {
        let audio = audio_file();
        let session =
            PlaybackSession::new(audio.path(), two_lines(), RepeatCount::Forever).unwrap();
        let (log, mut sync) = setup(Duration::from_secs(2), quiet());
        sync.player.crash = true;

        let err = sync.run(&session, std::future::pending()).await.unwrap_err();

        assert!(matches!(err, Error::Msg(_)));
        let texts: Vec<_> = shown(&log).into_iter().map(|(t, _)| t).collect();
        assert_eq!(texts, vec!["A"]);
    }

    #[tokio::test(start_paused = true)]
    async fn launch_failure_shows_nothing() {
        let audio = audio_file();
        let session =
            PlaybackSession::new(audio.path(), two_lines(), RepeatCount::default()).unwrap();
        let (log, mut sync) = setup(Duration::from_secs(2), quiet());
        sync.player.fail_start = true;

        let err = sync.run(&session, std::future::pending()).await.unwrap_err();

        assert!(matches!(err, Error::PlayerLaunch { .. }));
        assert!(log.lock().unwrap().is_empty());
    }
}

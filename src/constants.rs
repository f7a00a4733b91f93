//! Application constants.
//!
//! Centralizes magic numbers and configuration values for better maintainability.

/// Playback timing constants.
pub mod timing {
    use std::time::Duration;

    /// Redraw interval for the pre-roll countdown.
    pub const COUNTDOWN_TICK: Duration = Duration::from_millis(100);

    /// Default pause after the last lyric of a pass, in milliseconds.
    pub const DEFAULT_TAIL_MS: u64 = 500;
}

/// Terminal layout constants.
pub mod terminal {
    /// Width assumed when the terminal size cannot be queried.
    pub const FALLBACK_WIDTH: u16 = 80;

    /// Height assumed when the terminal size cannot be queried.
    pub const FALLBACK_HEIGHT: u16 = 24;
}

/// External player constants.
pub mod player {
    /// Players probed on `PATH`, in order of preference.
    pub const CANDIDATES: &[&str] = &["mpv", "ffplay", "afplay", "cvlc", "vlc", "mplayer", "play"];

    /// Player used when none of the candidates is installed (sox).
    pub const FALLBACK: &str = "play";
}

/// Environment variable names read by [`crate::config::Config`].
pub mod env {
    /// Player name or path overriding auto-detection.
    pub const PLAYER: &str = "LYRICSYNC_PLAYER";

    /// Display style: `center` or `plain`.
    pub const DISPLAY: &str = "LYRICSYNC_DISPLAY";

    /// Whether to show the pre-roll countdown.
    pub const COUNTDOWN: &str = "LYRICSYNC_COUNTDOWN";

    /// Pause after the last lyric, in milliseconds.
    pub const TAIL_MS: &str = "LYRICSYNC_TAIL_MS";
}

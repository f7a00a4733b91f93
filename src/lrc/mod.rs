//! LRC lyrics files.
//!
//! An `.lrc` file pairs timestamps with lines of text:
//!
//! ```text
//! [ti:Amazing Grace]
//! [00:01.00]Amazing grace
//! [00:03.50]How sweet the sound
//! ```
//!
//! [`parse_file`] loads a document; [`LrcDocument::to_lrc`] writes one back.

mod parser;

use std::fmt::{self, Write as _};
use std::time::Duration;

pub use parser::{parse_file, parse_str};

/// A single timed lyric.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LyricLine {
    /// Offset from the start of the track.
    pub timestamp: Duration,
    /// Text shown at `timestamp`.
    pub text: String,
}

impl LyricLine {
    /// Create a lyric line.
    pub fn new(timestamp: Duration, text: impl Into<String>) -> Self {
        Self { timestamp, text: text.into() }
    }
}

impl fmt::Display for LyricLine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", format_timestamp(self.timestamp), self.text)
    }
}

/// ID tags found in the file header.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Metadata {
    /// `[ti:]` track title
    pub title: Option<String>,
    /// `[ar:]` artist
    pub artist: Option<String>,
    /// `[al:]` album
    pub album: Option<String>,
    /// `[by:]` author of the lrc file
    pub author: Option<String>,
    /// `[offset:]` in milliseconds; positive shows lyrics earlier
    pub offset_ms: i64,
}

/// A parsed lyrics file.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LrcDocument {
    /// Header tags.
    pub metadata: Metadata,
    /// Lyric lines in non-decreasing timestamp order.
    pub lines: Vec<LyricLine>,
}

impl LrcDocument {
    /// Lines with the `[offset:]` tag applied, clamped at zero.
    pub fn timed_lines(&self) -> Vec<LyricLine> {
        let shift = Duration::from_millis(self.metadata.offset_ms.unsigned_abs());
        self.lines
            .iter()
            .map(|line| {
                let timestamp = if self.metadata.offset_ms >= 0 {
                    line.timestamp.saturating_sub(shift)
                } else {
                    line.timestamp + shift
                };
                LyricLine::new(timestamp, line.text.clone())
            })
            .collect()
    }

    /// Serialize back into `.lrc` text.
    pub fn to_lrc(&self) -> String {
        let mut out = String::new();
        let tags = [
            ("ti", &self.metadata.title),
            ("ar", &self.metadata.artist),
            ("al", &self.metadata.album),
            ("by", &self.metadata.author),
        ];
        for (key, value) in tags {
            if let Some(value) = value {
                let _ = writeln!(out, "[{key}:{value}]");
            }
        }
        if self.metadata.offset_ms != 0 {
            let _ = writeln!(out, "[offset:{:+}]", self.metadata.offset_ms);
        }
        for line in &self.lines {
            let _ = writeln!(out, "{line}");
        }
        out
    }
}

/// Format a duration as an `[MM:SS.cc]` tag.
pub fn format_timestamp(ts: Duration) -> String {
    let centis = ts.as_millis() / 10;
    let minutes = centis / 6000;
    let seconds = (centis / 100) % 60;
    let hundredths = centis % 100;
    format!("[{minutes:02}:{seconds:02}.{hundredths:02}]")
}

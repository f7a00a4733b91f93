//! `lyricsync` - play an audio file with synchronized `.lrc` lyrics.
//!
//! The binary prompts for an audio file, a lyrics file and a repeat count,
//! then runs an installed command-line player while showing each lyric at
//! its timestamp.

pub mod config;
pub mod constants;
pub mod error;
pub mod lrc;
pub mod player;
pub mod prompt;
pub mod screen;
pub mod sync;

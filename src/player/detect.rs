//! Finding an installed player and building its command line.

use std::ffi::OsString;
use std::path::{Path, PathBuf};

use crate::constants::player::{CANDIDATES, FALLBACK};

/// Program plus the flags that go before the audio path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlayerCommand {
    /// Executable name or path.
    pub program: String,
    /// Flags placed before the audio file argument.
    pub args: Vec<String>,
}

impl PlayerCommand {
    /// Command for a player name or path, with quiet/no-video flags for
    /// players we know.
    pub fn for_program(program: &str) -> Self {
        let stem = Path::new(program)
            .file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or(program);

        let args: &[&str] = match stem {
            "ffplay" => &["-nodisp", "-autoexit", "-loglevel", "quiet"],
            "mpv" => &["--no-video", "--really-quiet"],
            "cvlc" => &["--play-and-exit", "--no-video"],
            "vlc" => &["--intf", "dummy", "--play-and-exit", "--no-video"],
            "mplayer" => &["-really-quiet", "-vo", "null"],
            _ => &[],
        };

        Self {
            program: program.to_string(),
            args: args.iter().map(ToString::to_string).collect(),
        }
    }

    /// Full argument list for playing `audio`.
    pub fn args_for(&self, audio: &Path) -> Vec<OsString> {
        self.args
            .iter()
            .map(OsString::from)
            .chain(std::iter::once(audio.as_os_str().to_os_string()))
            .collect()
    }
}

/// Pick the player to use: the configured one, else the first installed
/// candidate, else `play`.
pub fn resolve_player(configured: Option<&str>) -> String {
    let path_var = std::env::var_os("PATH");

    if let Some(name) = configured {
        if find_on_path(name, path_var.as_deref()).is_none() && !Path::new(name).is_file() {
            tracing::warn!("Configured player '{name}' not found in PATH; trying it anyway");
        }
        return name.to_string();
    }

    detect_player(CANDIDATES, path_var.as_deref()).map_or_else(
        || {
            tracing::warn!(
                "No known audio player detected in PATH; falling back to '{FALLBACK}' (sox)"
            );
            FALLBACK.to_string()
        },
        ToString::to_string,
    )
}

/// First candidate found on `path_var`.
pub fn detect_player<'a>(
    candidates: &[&'a str],
    path_var: Option<&std::ffi::OsStr>,
) -> Option<&'a str> {
    candidates
        .iter()
        .copied()
        .find(|c| find_on_path(c, path_var).is_some())
}

/// Locate an executable in the directories of a `PATH`-style variable.
pub fn find_on_path(program: &str, path_var: Option<&std::ffi::OsStr>) -> Option<PathBuf> {
    let path_var = path_var?;
    std::env::split_paths(path_var).find_map(|dir| {
        executable_names(program)
            .into_iter()
            .map(|name| dir.join(name))
            .find(|p| p.is_file())
    })
}

#[cfg(windows)]
fn executable_names(program: &str) -> Vec<String> {
    vec![program.to_string(), format!("{program}.exe")]
}

#[cfg(not(windows))]
fn executable_names(program: &str) -> Vec<String> {
    vec![program.to_string()]
}

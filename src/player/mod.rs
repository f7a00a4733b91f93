//! External audio player process.
//!
//! The synchronizer only needs start/wait/stop semantics from a player, so
//! it talks to the [`Player`] trait. [`ProcessPlayer`] is the real
//! implementation backed by a child process.

mod detect;

use std::path::Path;
use std::process::{ExitStatus, Stdio};

use async_trait::async_trait;
use tokio::process::{Child, Command};

pub use detect::{detect_player, find_on_path, resolve_player, PlayerCommand};

use crate::error::{Error, Result};

/// Something that can play an audio file in the background.
#[async_trait]
pub trait Player: Send {
    /// Start playing `audio`, replacing any track already playing.
    async fn start(&mut self, audio: &Path) -> Result<()>;

    /// Wait for the current track to end.
    ///
    /// Returns immediately when nothing is playing. Must be cancel-safe.
    async fn wait(&mut self) -> Result<()>;

    /// Stop the current track, if any.
    async fn stop(&mut self) -> Result<()>;

    /// Get the name of this player (for messages).
    fn name(&self) -> &str;
}

/// Player running as a child process.
#[derive(Debug)]
pub struct ProcessPlayer {
    command: PlayerCommand,
    child: Option<Child>,
}

impl ProcessPlayer {
    /// Create a player that runs `command` for each track.
    pub const fn new(command: PlayerCommand) -> Self {
        Self { command, child: None }
    }

    /// Whether a child process is currently held.
    pub const fn is_running(&self) -> bool {
        self.child.is_some()
    }

    fn check_status(&self, status: ExitStatus) -> Result<()> {
        if status.success() {
            return Ok(());
        }
        if killed_by_interrupt(status) {
            // Ctrl-C reaches the whole foreground process group.
            return Err(Error::Interrupted);
        }
        Err(Error::PlayerExited {
            program: self.command.program.clone(),
            status,
        })
    }
}

#[async_trait]
impl Player for ProcessPlayer {
    async fn start(&mut self, audio: &Path) -> Result<()> {
        self.stop().await?;

        let child = Command::new(&self.command.program)
            .args(self.command.args_for(audio))
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .kill_on_drop(true)
            .spawn()
            .map_err(|source| Error::PlayerLaunch {
                program: self.command.program.clone(),
                source,
            })?;

        tracing::debug!("Started {} (pid {:?})", self.command.program, child.id());
        self.child = Some(child);
        Ok(())
    }

    async fn wait(&mut self) -> Result<()> {
        let Some(child) = self.child.as_mut() else {
            return Ok(());
        };
        let status = child.wait().await?;
        self.child = None;
        tracing::debug!("{} exited with {status}", self.command.program);
        self.check_status(status)
    }

    async fn stop(&mut self) -> Result<()> {
        if let Some(mut child) = self.child.take() {
            if child.try_wait()?.is_none() {
                tracing::debug!("Terminating {}", self.command.program);
                child.kill().await?;
            }
        }
        Ok(())
    }

    fn name(&self) -> &str {
        &self.command.program
    }
}

#[cfg(unix)]
fn killed_by_interrupt(status: ExitStatus) -> bool {
    use std::os::unix::process::ExitStatusExt;

    // SIGINT = 2, SIGTERM = 15
    matches!(status.signal(), Some(2 | 15))
}

#[cfg(not(unix))]
const fn killed_by_interrupt(_status: ExitStatus) -> bool {
    false
}

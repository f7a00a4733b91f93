//! `lyricsync` - interactive synced-lyrics player.

use std::io::{self, Write};
use std::process::ExitCode;

use lyricsync::config::{Config, DisplayStyle};
use lyricsync::error::{Error, Result};
use lyricsync::lrc;
use lyricsync::player::{resolve_player, PlayerCommand, ProcessPlayer};
use lyricsync::prompt::{prompt_file_path, prompt_repeat_count};
use lyricsync::screen::{CenteredScreen, PlainScreen, Screen};
use lyricsync::sync::{Outcome, PlaybackSession, SyncOptions, Synchronizer};

#[tokio::main]
async fn main() -> ExitCode {
    // Logs go to stderr so they never mix with lyrics on stdout
    tracing_subscriber::fmt()
        .with_writer(io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .init();

    match run().await {
        Ok(Outcome::Completed { passes }) => {
            tracing::info!("Finished after {passes} pass(es)");
            ExitCode::SUCCESS
        }
        Ok(Outcome::Interrupted { .. }) => {
            println!("\nInterrupted. Exiting.");
            ExitCode::SUCCESS
        }
        Err(Error::Interrupted) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("Error: {err}");
            ExitCode::from(u8::try_from(err.exit_code()).unwrap_or(1))
        }
    }
}

async fn run() -> Result<Outcome> {
    let config = Config::load()?;
    println!("{} {} interactive\n", config.app_name(), config.app_version());

    let (audio_path, lrc_path, repeat) = {
        let mut input = io::stdin().lock();
        let mut out = io::stdout();
        let audio = prompt_file_path(
            &mut input,
            &mut out,
            "Enter audio file path (drag file here or type path): ",
        )?;
        let lyrics = prompt_file_path(
            &mut input,
            &mut out,
            "Enter .lrc file path (drag file here or type path): ",
        )?;
        let repeat = prompt_repeat_count(&mut input, &mut out)?;
        out.flush()?;
        (audio, lyrics, repeat)
    };

    let doc = lrc::parse_file(&lrc_path)?;
    if let Some(title) = &doc.metadata.title {
        println!("Now playing: {title}");
    }
    let session = PlaybackSession::new(audio_path, doc.timed_lines(), repeat)?;

    let program = resolve_player(config.player.as_deref());
    println!("Using audio player: {program}");
    let player = ProcessPlayer::new(PlayerCommand::for_program(&program));

    let screen: Box<dyn Screen> = match config.display {
        DisplayStyle::Center => Box::new(CenteredScreen::new(io::stdout())),
        DisplayStyle::Plain => Box::new(PlainScreen::new(io::stdout())),
    };

    let mut sync = Synchronizer::new(player, screen, SyncOptions::from(&config));
    sync.run(&session, shutdown_signal()).await
}

/// Resolves on Ctrl-C, or SIGTERM on unix.
async fn shutdown_signal() {
    tokio::select! {
        res = tokio::signal::ctrl_c() => {
            if let Err(e) = res {
                tracing::warn!("Failed to listen for Ctrl-C: {e}");
                std::future::pending::<()>().await;
            }
            tracing::info!("Received SIGINT, stopping playback");
        }
        () = terminate() => {
            tracing::info!("Received SIGTERM, stopping playback");
        }
    }
}

#[cfg(unix)]
async fn terminate() {
    use tokio::signal::unix::{signal, SignalKind};

    match signal(SignalKind::terminate()) {
        Ok(mut sigterm) => {
            sigterm.recv().await;
        }
        Err(e) => {
            tracing::warn!("Failed to listen for SIGTERM: {e}");
            std::future::pending::<()>().await;
        }
    }
}

#[cfg(not(unix))]
async fn terminate() {
    std::future::pending::<()>().await;
}

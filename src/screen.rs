//! Rendering lyrics to the terminal.

use std::io::Write;

use crossterm::{
    cursor::MoveTo,
    execute,
    terminal::{self, Clear, ClearType},
};
use unicode_width::UnicodeWidthStr;

use crate::constants::terminal::{FALLBACK_HEIGHT, FALLBACK_WIDTH};
use crate::error::Result;

/// Where lyrics and countdowns are shown.
pub trait Screen: Send {
    /// Show the whole seconds left before the first lyric.
    fn countdown(&mut self, remaining_secs: u64) -> Result<()>;

    /// Show a lyric line.
    fn show(&mut self, text: &str) -> Result<()>;

    /// Show a status message.
    fn notice(&mut self, message: &str) -> Result<()>;
}

impl<S: Screen + ?Sized> Screen for Box<S> {
    fn countdown(&mut self, remaining_secs: u64) -> Result<()> {
        (**self).countdown(remaining_secs)
    }

    fn show(&mut self, text: &str) -> Result<()> {
        (**self).show(text)
    }

    fn notice(&mut self, message: &str) -> Result<()> {
        (**self).notice(message)
    }
}

/// Clears the terminal and centers each line.
pub struct CenteredScreen<W: Write> {
    out: W,
}

impl<W: Write> CenteredScreen<W> {
    /// Render to `out`.
    pub const fn new(out: W) -> Self {
        Self { out }
    }

    fn draw(&mut self, text: &str) -> Result<()> {
        let (width, height) = terminal::size().unwrap_or((FALLBACK_WIDTH, FALLBACK_HEIGHT));
        execute!(self.out, Clear(ClearType::All), MoveTo(0, 0))?;
        self.out.write_all(center_text(text, width, height).as_bytes())?;
        self.out.flush()?;
        Ok(())
    }
}

impl<W: Write + Send> Screen for CenteredScreen<W> {
    fn countdown(&mut self, remaining_secs: u64) -> Result<()> {
        self.draw(&remaining_secs.to_string())
    }

    fn show(&mut self, text: &str) -> Result<()> {
        self.draw(text)
    }

    fn notice(&mut self, message: &str) -> Result<()> {
        self.draw(message)
    }
}

/// Prints one row per lyric; suits pipes and logs.
pub struct PlainScreen<W: Write> {
    out: W,
}

impl<W: Write> PlainScreen<W> {
    /// Render to `out`.
    pub const fn new(out: W) -> Self {
        Self { out }
    }

    /// Take back the writer.
    pub fn into_inner(self) -> W {
        self.out
    }
}

impl<W: Write + Send> Screen for PlainScreen<W> {
    fn countdown(&mut self, remaining_secs: u64) -> Result<()> {
        writeln!(self.out, "{remaining_secs}...")?;
        Ok(())
    }

    fn show(&mut self, text: &str) -> Result<()> {
        writeln!(self.out, "{text}")?;
        self.out.flush()?;
        Ok(())
    }

    fn notice(&mut self, message: &str) -> Result<()> {
        writeln!(self.out, "{message}")?;
        Ok(())
    }
}

/// Pad `text` so it sits in the middle of a `width` x `height` terminal.
pub fn center_text(text: &str, width: u16, height: u16) -> String {
    let lines: Vec<&str> = text.lines().collect();
    let max_width = lines.iter().map(|l| l.width()).max().unwrap_or(0);
    let left = usize::from(width).saturating_sub(max_width) / 2;
    let top = usize::from(height).saturating_sub(lines.len()) / 2;

    let mut out = "\n".repeat(top);
    for line in lines {
        out.push_str(&" ".repeat(left));
        out.push_str(line);
        out.push('\n');
    }
    out
}

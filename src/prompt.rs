//! Interactive prompts for the audio path, lyrics path and repeat count.
//!
//! Paths are often pasted or dragged into the terminal, which may wrap them
//! in quotes or escape spaces. Several readings of the input are tried and
//! the first one naming an existing file wins.

use std::io::{BufRead, Write};
use std::path::PathBuf;

use crate::error::{Error, Result};
use crate::sync::RepeatCount;

/// Ask for a path until the answer names an existing file.
pub fn prompt_file_path<R: BufRead, W: Write>(
    input: &mut R,
    out: &mut W,
    message: &str,
) -> Result<PathBuf> {
    loop {
        let raw = read_answer(input, out, message)?;
        if raw.is_empty() {
            writeln!(out, "Path cannot be empty. Please try again.")?;
            continue;
        }

        let candidates = path_candidates(&raw);
        if let Some(found) = candidates.iter().find_map(|c| resolve_candidate(c)) {
            tracing::debug!("Resolved {raw:?} to {}", found.display());
            return Ok(found);
        }

        writeln!(out, "File not found. Tried these forms:")?;
        for c in &candidates {
            writeln!(out, "  {c}")?;
        }
        writeln!(out, "Please re-enter the path.")?;
    }
}

/// Ask how many passes to play. Empty means 1, 0 means forever.
pub fn prompt_repeat_count<R: BufRead, W: Write>(
    input: &mut R,
    out: &mut W,
) -> Result<RepeatCount> {
    loop {
        let raw = read_answer(
            input,
            out,
            "How many times to play? (default 1, enter 0 for infinite loop): ",
        )?;
        if raw.is_empty() {
            return Ok(RepeatCount::default());
        }
        match raw.parse::<i64>() {
            Ok(n) if n < 0 => {
                writeln!(out, "Please enter 0 for infinite or a positive integer.")?;
            }
            Ok(n) => match u32::try_from(n) {
                Ok(n) => return Ok(RepeatCount::from_count(n)),
                Err(_) => writeln!(out, "That is too many; please enter a smaller number.")?,
            },
            Err(_) => {
                writeln!(out, "Invalid number. Please enter an integer (e.g., 1, 2, 0).")?;
            }
        }
    }
}

/// Print `message` and read one trimmed line. EOF counts as an interrupt.
fn read_answer<R: BufRead, W: Write>(input: &mut R, out: &mut W, message: &str) -> Result<String> {
    write!(out, "{message}")?;
    out.flush()?;

    let mut line = String::new();
    if input.read_line(&mut line)? == 0 {
        writeln!(out)?;
        return Err(Error::Interrupted);
    }
    Ok(line.trim().to_string())
}

/// Distinct readings of a typed or dropped path, most literal first.
pub fn path_candidates(raw: &str) -> Vec<String> {
    let raw = raw.trim();
    let mut forms = vec![
        raw.to_string(),
        raw.trim_matches(|c| c == '"' || c == '\'').to_string(),
        raw.replace("\\ ", " "),
    ];

    if let Some(words) = split_shell_words(raw) {
        if let Some(first) = words.first() {
            forms.push(words.join(" "));
            forms.push(first.clone());
        }
    }

    let mut seen = Vec::new();
    for form in forms {
        let form = form.trim().to_string();
        if !form.is_empty() && !seen.contains(&form) {
            seen.push(form);
        }
    }
    seen
}

/// Expand `~` and `$VAR` and return the path if it is a file.
fn resolve_candidate(candidate: &str) -> Option<PathBuf> {
    let unquoted = strip_matching_quotes(candidate);
    if unquoted.is_empty() {
        return None;
    }
    let expanded = shellexpand::full(unquoted)
        .map_or_else(|_| shellexpand::tilde(unquoted).into_owned(), std::borrow::Cow::into_owned);
    let path = PathBuf::from(expanded);
    path.is_file().then_some(path)
}

fn strip_matching_quotes(s: &str) -> &str {
    for q in ['"', '\''] {
        if s.len() >= 2 && s.starts_with(q) && s.ends_with(q) {
            return &s[1..s.len() - 1];
        }
    }
    s
}

/// POSIX-ish word splitting: quotes group, backslash escapes.
/// Returns `None` for unbalanced quotes or a trailing backslash.
fn split_shell_words(s: &str) -> Option<Vec<String>> {
    let mut words = Vec::new();
    let mut current = String::new();
    let mut in_word = false;
    let mut quote: Option<char> = None;
    let mut chars = s.chars();

    while let Some(c) = chars.next() {
        match (quote, c) {
            (Some(q), c) if c == q => quote = None,
            (Some('"'), '\\') => {
                let next = chars.next()?;
                if !matches!(next, '"' | '\\' | '$' | '`') {
                    current.push('\\');
                }
                current.push(next);
            }
            (Some(_), c) => current.push(c),
            (None, '\'' | '"') => {
                quote = Some(c);
                in_word = true;
            }
            (None, '\\') => {
                current.push(chars.next()?);
                in_word = true;
            }
            (None, c) if c.is_whitespace() => {
                if in_word {
                    words.push(std::mem::take(&mut current));
                    in_word = false;
                }
            }
            (None, c) => {
                current.push(c);
                in_word = true;
            }
        }
    }

    if quote.is_some() {
        return None;
    }
    if in_word {
        words.push(current);
    }
    Some(words)
}

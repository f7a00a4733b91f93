//! Line parser for `.lrc` text.

use std::path::Path;
use std::sync::LazyLock;
use std::time::Duration;

use regex::Regex;

use super::{LrcDocument, LyricLine, Metadata};
use crate::error::{Error, Result};

/// Regex matching one leading `[...]` tag.
#[allow(clippy::expect_used)]
static RE_TAG: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^\[([^\[\]]*)\]").expect("valid regex: RE_TAG")
});

/// Regex matching `MM:SS`, `MM:SS.c`, `MM:SS.cc` or `MM:SS.mmm`.
#[allow(clippy::expect_used)]
static RE_TIMESTAMP: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(\d+):(\d{1,2})(?:\.(\d{1,3}))?$").expect("valid regex: RE_TIMESTAMP")
});

/// Regex matching `key:value` ID tags.
#[allow(clippy::expect_used)]
static RE_ID_TAG: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^([A-Za-z#]+):(.*)$").expect("valid regex: RE_ID_TAG")
});

/// ID tags accepted but not kept.
const IGNORED_ID_TAGS: &[&str] = &["au", "length", "re", "ve", "tool", "#"];

/// Parse an `.lrc` file from disk.
pub fn parse_file(path: &Path) -> Result<LrcDocument> {
    if !path.is_file() {
        return Err(Error::not_found(path));
    }
    let input = fs_err::read_to_string(path).map_err(|e| {
        if e.kind() == std::io::ErrorKind::NotFound {
            Error::not_found(path)
        } else {
            Error::io(e, path.to_path_buf())
        }
    })?;

    let doc = parse_str(&input, Some(path))?;
    tracing::info!("Loaded {} lyric lines from {}", doc.lines.len(), path.display());
    Ok(doc)
}

/// Parse `.lrc` text. `file` is only used for error context.
pub fn parse_str(input: &str, file: Option<&Path>) -> Result<LrcDocument> {
    let mut doc = LrcDocument::default();

    for (idx, raw) in input.lines().enumerate() {
        let line_no = idx + 1;
        let line = raw.trim_start_matches('\u{feff}').trim();
        if line.is_empty() {
            continue;
        }
        if !line.starts_with('[') {
            tracing::warn!("Skipping untagged line {line_no}: {line:?}");
            continue;
        }

        let mut rest = line;
        let mut stamps = Vec::new();
        let mut had_id_tag = false;

        while rest.starts_with('[') {
            let Some(caps) = RE_TAG.captures(rest) else {
                return Err(Error::parse(
                    format!("unterminated tag in {rest:?}"),
                    file.map(Path::to_path_buf),
                    line_no,
                ));
            };
            let whole = caps.get(0).map_or("", |m| m.as_str());
            let body = caps.get(1).map_or("", |m| m.as_str());
            rest = &rest[whole.len()..];

            if let Some(ts) = parse_timestamp(body) {
                stamps.push(ts);
            } else if apply_id_tag(&mut doc.metadata, body).map_err(|message| {
                Error::parse(message, file.map(Path::to_path_buf), line_no)
            })? {
                had_id_tag = true;
            } else {
                return Err(Error::parse(
                    format!("malformed timestamp tag '[{body}]'"),
                    file.map(Path::to_path_buf),
                    line_no,
                ));
            }
        }

        let text = rest.trim();
        if stamps.is_empty() {
            if had_id_tag && !text.is_empty() {
                tracing::warn!("Ignoring text after ID tag on line {line_no}: {text:?}");
            }
            continue;
        }
        if text.is_empty() {
            tracing::debug!("Skipping empty lyric on line {line_no}");
            continue;
        }

        doc.lines
            .extend(stamps.into_iter().map(|ts| LyricLine::new(ts, text)));
    }

    // Stable: equal timestamps keep file order.
    doc.lines.sort_by_key(|l| l.timestamp);
    Ok(doc)
}

/// Parse the inside of a timestamp tag, e.g. `01:02.50`.
fn parse_timestamp(body: &str) -> Option<Duration> {
    let caps = RE_TIMESTAMP.captures(body)?;
    let minutes: u64 = caps.get(1)?.as_str().parse().ok()?;
    let seconds: u64 = caps.get(2)?.as_str().parse().ok()?;
    if seconds >= 60 {
        return None;
    }
    let millis = caps.get(3).map_or(Some(0), |m| fraction_to_millis(m.as_str()))?;
    let total = minutes
        .checked_mul(60)
        .and_then(|s| s.checked_add(seconds))
        .and_then(|s| s.checked_mul(1000))
        .and_then(|ms| ms.checked_add(millis))?;
    Some(Duration::from_millis(total))
}

/// `5` is tenths, `50` hundredths, `500` milliseconds.
fn fraction_to_millis(digits: &str) -> Option<u64> {
    let value: u64 = digits.parse().ok()?;
    match digits.len() {
        1 => Some(value * 100),
        2 => Some(value * 10),
        3 => Some(value),
        _ => None,
    }
}

/// Record a known ID tag. Returns `Ok(false)` when `body` is not one.
fn apply_id_tag(meta: &mut Metadata, body: &str) -> std::result::Result<bool, String> {
    let Some(caps) = RE_ID_TAG.captures(body) else {
        return Ok(false);
    };
    let key = caps.get(1).map_or("", |m| m.as_str()).to_ascii_lowercase();
    let value = caps.get(2).map_or("", |m| m.as_str()).trim().to_string();

    match key.as_str() {
        "ti" => meta.title = Some(value),
        "ar" => meta.artist = Some(value),
        "al" => meta.album = Some(value),
        "by" => meta.author = Some(value),
        "offset" => {
            meta.offset_ms = value
                .trim_start_matches('+')
                .parse()
                .map_err(|_| format!("invalid offset '{value}'"))?;
        }
        k if IGNORED_ID_TAGS.contains(&k) => {}
        _ => return Ok(false),
    }
    Ok(true)
}

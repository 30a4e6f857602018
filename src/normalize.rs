//! Text canonicalisation.
//!
//! [`normalize`] is the first stage of every analysis: uniform `\n` line
//! endings and no trailing whitespace on any line. [`restyle`] is a separate,
//! opt-in rewrite of quote, dash and ellipsis glyphs used to produce a cleaned
//! copy of a manuscript; it is never applied before counting.

use std::str::FromStr;

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::error::MetricsError;

static SPACED_HYPHEN_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s-\s").unwrap());

static SPACE_RUN_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r" {2,}").unwrap());

static DOUBLE_QUOTED_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r#""([^"]*)""#).unwrap());

static SINGLE_QUOTED_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"'([^']*)'").unwrap());

static SPACED_EM_DASH_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s*\u{2014}\s*").unwrap());

const INDENT: &str = "    ";

/// Canonicalise line endings to `\n` and right-trim every line.
pub fn normalize(text: &str) -> String {
    normalize_line_endings(text)
        .split('\n')
        .map(str::trim_end)
        .collect::<Vec<_>>()
        .join("\n")
}

/// Glyph style for a rewritten manuscript.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TextStyle {
    /// Straight quotes, `...`, spaced em dashes, collapsed spaces.
    #[default]
    Plain,
    /// Curly quotes, `…`, unspaced em dashes.
    Smart,
}

impl FromStr for TextStyle {
    type Err = MetricsError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "plain" => Ok(TextStyle::Plain),
            "smart" => Ok(TextStyle::Smart),
            other => Err(MetricsError::InvalidConfig(format!(
                "unknown text style '{other}' (expected plain or smart)"
            ))),
        }
    }
}

/// Rewrite punctuation glyphs in `text` according to `style`.
pub fn restyle(text: &str, style: TextStyle) -> String {
    match style {
        TextStyle::Plain => restyle_plain(text),
        TextStyle::Smart => restyle_smart(text),
    }
}

/// `\r\n` and lone `\r` become `\n`; nothing else changes.
pub fn normalize_line_endings(text: &str) -> String {
    text.replace("\r\n", "\n").replace('\r', "\n")
}

fn restyle_plain(text: &str) -> String {
    let t = normalize_line_endings(text)
        .replace(['\u{201C}', '\u{201D}'], "\"")
        .replace(['\u{2018}', '\u{2019}'], "'")
        .replace('\u{2026}', "...");
    let t = SPACED_HYPHEN_RE.replace_all(&t, " \u{2014} ");
    let t = t
        .split('\n')
        .map(collapse_spaces)
        .collect::<Vec<_>>()
        .join("\n");
    t.replace('\u{00A0}', " ").replace('\t', INDENT)
}

// A leading four-space indent survives; every other run of spaces collapses.
fn collapse_spaces(line: &str) -> String {
    match line.strip_prefix(INDENT) {
        Some(rest) => format!("{INDENT}{}", SPACE_RUN_RE.replace_all(rest, " ")),
        None => SPACE_RUN_RE.replace_all(line, " ").into_owned(),
    }
}

fn restyle_smart(text: &str) -> String {
    let t = restyle_plain(text);
    let t = DOUBLE_QUOTED_RE.replace_all(&t, "\u{201C}${1}\u{201D}");
    let t = SINGLE_QUOTED_RE.replace_all(&t, "\u{2018}${1}\u{2019}");
    let t = t.replace("...", "\u{2026}");
    SPACED_EM_DASH_RE.replace_all(&t, "\u{2014}").into_owned()
}

//! Extraction of values from `simplewallet` console output
//!
//! `simplewallet` has no structured output in interactive mode, so the
//! address and seed are pulled out of its console text. Both parsers fail
//! loudly when the text does not look as expected.

use once_cell::sync::Lazy;
use regex::Regex;

use crate::install::error::SetupError;

/// Printed by `show_seed` right before the seed phrase
pub const SEED_CONFIRMATION: &str =
    "Remember, restoring a wallet from Secured Seed can only be done if you know its password.";

/// Fewest words a seed phrase can have
const MIN_SEED_WORDS: usize = 24;

const EXCERPT_LEN: usize = 200;

static ADDRESS_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\bZx[1-9A-HJ-NP-Za-km-z]{95}\b").expect("valid address regex"));

static ANY_ADDRESS_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(?:Zx|iZ)[1-9A-HJ-NP-Za-km-z]{95,}$").expect("valid address regex")
});

static ANSI_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\x1b\[[0-9;]*[A-Za-z]").expect("valid ANSI regex"));

/// First standard wallet address in `output`.
pub fn parse_address(output: &str) -> Result<String, SetupError> {
    let clean = strip_ansi(output);
    ADDRESS_RE
        .find(&clean)
        .map(|m| m.as_str().to_string())
        .ok_or_else(|| SetupError::OutputFormat {
            what: "address",
            excerpt: excerpt(&clean),
        })
}

/// Seed phrase printed after `SEED_CONFIRMATION`.
///
/// The phrase is the rest of the confirmation line or, when that is empty,
/// the next non-empty line. A trailing `[...]` note is dropped.
pub fn parse_seed(output: &str) -> Result<String, SetupError> {
    let clean = strip_ansi(output);
    let fail = || SetupError::OutputFormat {
        what: "seed",
        excerpt: excerpt(&clean),
    };

    let mut lines = clean.lines();
    let after_marker = lines
        .by_ref()
        .find_map(|line| {
            line.find(SEED_CONFIRMATION)
                .map(|i| &line[i + SEED_CONFIRMATION.len()..])
        })
        .ok_or_else(fail)?;

    let seed_line = if after_marker.trim().is_empty() {
        lines.find(|line| !line.trim().is_empty()).ok_or_else(fail)?
    } else {
        after_marker
    };

    let seed = strip_bracketed_note(seed_line)
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ");

    let words = seed.split(' ').count();
    let only_words = seed.chars().all(|c| c.is_ascii_alphabetic() || c == ' ');
    if seed.is_empty() || words < MIN_SEED_WORDS || !only_words {
        return Err(fail());
    }
    Ok(seed)
}

/// Whether `candidate` is a standard or integrated Zano address.
pub fn is_valid_address(candidate: &str) -> bool {
    ANY_ADDRESS_RE.is_match(candidate)
}

fn strip_bracketed_note(line: &str) -> &str {
    let trimmed = line.trim_end();
    if trimmed.ends_with(']')
        && let Some(open) = trimmed.rfind('[')
    {
        return &trimmed[..open];
    }
    trimmed
}

fn strip_ansi(text: &str) -> String {
    ANSI_RE.replace_all(text, "").into_owned()
}

/// Tail of the output, for error messages
fn excerpt(text: &str) -> String {
    let trimmed = text.trim();
    let start = trimmed
        .char_indices()
        .rev()
        .nth(EXCERPT_LEN)
        .map(|(i, _)| i)
        .unwrap_or(0);
    trimmed[start..].to_string()
}

//! Splits raw model output into setup and punchline.

use regex::Regex;
use std::fmt;
use std::sync::OnceLock;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedJoke {
    pub setup: String,
    pub punchline: String,
    pub full_text: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParseFailure {
    EmptyResponse,
    NoPunchline,
    EmptySetup,
}

impl fmt::Display for ParseFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ParseFailure::EmptyResponse => "empty response",
            ParseFailure::NoPunchline => "no recoverable punchline",
            ParseFailure::EmptySetup => "empty setup",
        };
        f.write_str(s)
    }
}

impl std::error::Error for ParseFailure {}

fn marker_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"(?is)\bsetup\**\s*:\s*(.*?)\bpunchline\**\s*:\s*(.*)")
            .unwrap_or_else(|e| panic!("invalid marker regex: {e}"))
    })
}

fn sentence_end_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"[.!]\s+").unwrap_or_else(|e| panic!("invalid sentence regex: {e}"))
    })
}

fn clean(s: &str) -> String {
    s.trim_matches(|c: char| c.is_whitespace() || c == '*')
        .to_string()
}

/// Markers, then first `?`, then first line break, then the last sentence.
/// An unlabelled heuristic that leaves either side empty yields to the next one.
pub fn parse_joke(raw: &str) -> Result<ParsedJoke, ParseFailure> {
    let text = raw.trim();
    if text.is_empty() {
        return Err(ParseFailure::EmptyResponse);
    }

    let (setup, punchline) = split(text);
    if punchline.is_empty() {
        return Err(ParseFailure::NoPunchline);
    }
    if setup.is_empty() {
        return Err(ParseFailure::EmptySetup);
    }

    Ok(ParsedJoke {
        setup,
        punchline,
        full_text: text.to_string(),
    })
}

fn split(text: &str) -> (String, String) {
    // Explicit labels are authoritative, even when one side is empty.
    if let Some(pair) = split_markers(text) {
        return pair;
    }
    let heuristics: [fn(&str) -> Option<(String, String)>; 3] =
        [split_question, split_line, split_sentence];
    heuristics
        .iter()
        .filter_map(|h| h(text))
        .find(complete)
        .unwrap_or_else(|| (clean(text), String::new()))
}

fn complete(pair: &(String, String)) -> bool {
    !pair.0.is_empty() && !pair.1.is_empty()
}

fn split_markers(text: &str) -> Option<(String, String)> {
    let c = marker_re().captures(text)?;
    let setup = c.get(1).map(|m| clean(m.as_str())).unwrap_or_default();
    let punchline = c.get(2).map(|m| clean(m.as_str())).unwrap_or_default();
    Some((setup, punchline))
}

fn split_question(text: &str) -> Option<(String, String)> {
    let i = text.find('?')?;
    Some((clean(&text[..=i]), clean(&text[i + 1..])))
}

fn split_line(text: &str) -> Option<(String, String)> {
    let i = text.find('\n')?;
    Some((clean(&text[..i]), clean(&text[i + 1..])))
}

fn split_sentence(text: &str) -> Option<(String, String)> {
    let m = sentence_end_re().find_iter(text).last()?;
    Some((clean(&text[..m.start() + 1]), clean(&text[m.end()..])))
}

pub fn count_words(s: &str) -> usize {
    s.split_whitespace().count()
}

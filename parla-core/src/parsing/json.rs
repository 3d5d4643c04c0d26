//! JSON extraction and repair for free-text model replies

use regex::Regex;
use serde::de::DeserializeOwned;
use std::sync::LazyLock;

use super::{ParseError, ParseResult};

static CODE_FENCE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"```(?:json|JSON)?\s*\n?([\s\S]*?)\n?```").expect("code fence pattern")
});
static LINE_COMMENT_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?m)^\s*//[^\n]*").expect("line comment pattern"));
static BLOCK_COMMENT_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"/\*[\s\S]*?\*/").expect("block comment pattern"));

/// Lenient JSON parser for model replies
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonParser;

impl JsonParser {
    pub fn new() -> Self {
        Self
    }

    /// Find and parse the JSON value in a model reply.
    ///
    /// Tries, in order: the whole reply (after stripping a code fence), then
    /// each balanced `{...}` span from left to right, then each `[...]` span.
    /// Every span is retried once after repair.
    pub fn parse(&self, raw: &str) -> ParseResult<serde_json::Value> {
        let input = raw.trim();
        if input.is_empty() {
            return Err(ParseError::EmptyInput);
        }

        let input = strip_code_fences(input);
        if let Some(value) = try_parse(input) {
            return Ok(value);
        }

        for candidate in candidates(input) {
            if let Some(value) = try_parse(candidate).or_else(|| try_parse(&repair_json(candidate)))
            {
                return Ok(value);
            }
        }

        Err(ParseError::InvalidFormat(
            "No JSON object found in model reply".to_string(),
        ))
    }

    /// Parse and deserialize into `T`.
    ///
    /// A reply that is valid JSON but lacks a required field is reported as
    /// [`ParseError::MissingField`]; any other shape mismatch as
    /// [`ParseError::InvalidFormat`].
    pub fn parse_as<T: DeserializeOwned>(&self, raw: &str) -> ParseResult<T> {
        let value = self.parse(raw)?;
        serde_json::from_value(value).map_err(|e| {
            if e.to_string().starts_with("missing field") {
                ParseError::MissingField(e.to_string())
            } else {
                ParseError::InvalidFormat(e.to_string())
            }
        })
    }
}

fn try_parse(input: &str) -> Option<serde_json::Value> {
    serde_json::from_str::<serde_json::Value>(input).ok()
}

/// Contents of the first Markdown code fence, or the input unchanged
fn strip_code_fences(input: &str) -> &str {
    CODE_FENCE_RE
        .captures(input)
        .and_then(|caps| caps.get(1))
        .map_or(input, |content| content.as_str())
}

/// Candidate spans: every `{` start first, then every `[` start
fn candidates(input: &str) -> impl Iterator<Item = &str> {
    input
        .match_indices('{')
        .chain(input.match_indices('['))
        .map(move |(start, _)| balanced_span(&input[start..]))
}

/// The balanced span opening at the first character, or the whole tail when
/// it never closes (repair may still close it)
fn balanced_span(input: &str) -> &str {
    let mut depth = 0usize;
    let mut in_string = false;
    let mut escape_next = false;

    for (i, c) in input.char_indices() {
        if escape_next {
            escape_next = false;
            continue;
        }

        match c {
            '\\' if in_string => escape_next = true,
            '"' => in_string = !in_string,
            '{' | '[' if !in_string => depth += 1,
            '}' | ']' if !in_string => {
                depth = depth.saturating_sub(1);
                if depth == 0 {
                    return &input[..=i];
                }
            }
            _ => {}
        }
    }

    input
}

/// Repair common JSON mistakes
fn repair_json(input: &str) -> String {
    let without_comments = BLOCK_COMMENT_RE.replace_all(input, "");
    let without_comments = LINE_COMMENT_RE.replace_all(&without_comments, "");
    repair_structure(&fix_quotes(&without_comments))
}

/// Convert single-quoted strings to double-quoted ones
fn fix_quotes(input: &str) -> String {
    let mut result = String::with_capacity(input.len());
    let mut in_double_string = false;
    let mut in_single_string = false;
    let mut escape_next = false;

    for c in input.chars() {
        if escape_next {
            result.push(c);
            escape_next = false;
            continue;
        }

        match c {
            '\\' => {
                result.push(c);
                escape_next = true;
            }
            '"' if in_single_string => result.push_str("\\\""),
            '"' => {
                in_double_string = !in_double_string;
                result.push(c);
            }
            '\'' if !in_double_string => {
                in_single_string = !in_single_string;
                result.push('"');
            }
            _ => result.push(c),
        }
    }

    result
}

/// Drop trailing commas, quote bare keys and close whatever is left open.
///
/// Only text outside string literals is touched.
fn repair_structure(input: &str) -> String {
    let chars: Vec<char> = input.chars().collect();
    let mut result = String::with_capacity(input.len() + 8);
    let mut open: Vec<char> = Vec::new();
    let mut in_string = false;
    let mut escape_next = false;
    // Last non-whitespace character emitted outside a string
    let mut last = None;
    let mut i = 0;

    while i < chars.len() {
        let c = chars[i];

        if in_string {
            result.push(c);
            if escape_next {
                escape_next = false;
            } else if c == '\\' {
                escape_next = true;
            } else if c == '"' {
                in_string = false;
                last = Some('"');
            }
            i += 1;
            continue;
        }

        match c {
            '"' => {
                in_string = true;
                result.push(c);
            }
            ',' if matches!(next_significant(&chars, i + 1), Some('}' | ']')) => {}
            '{' | '[' => {
                open.push(if c == '{' { '}' } else { ']' });
                result.push(c);
            }
            '}' | ']' => {
                open.pop();
                result.push(c);
            }
            c if (c.is_ascii_alphabetic() || c == '_') && matches!(last, Some('{' | ',')) => {
                let start = i;
                while i < chars.len() && (chars[i].is_ascii_alphanumeric() || chars[i] == '_') {
                    i += 1;
                }
                let word: String = chars[start..i].iter().collect();
                if next_significant(&chars, i) == Some(':') {
                    result.push('"');
                    result.push_str(&word);
                    result.push('"');
                } else {
                    result.push_str(&word);
                }
                last = chars.get(i - 1).copied();
                continue;
            }
            _ => result.push(c),
        }

        if !c.is_whitespace() {
            last = Some(c);
        }
        i += 1;
    }

    if in_string {
        result.push('"');
    }
    while let Some(close) = open.pop() {
        result.push(close);
    }

    result
}

fn next_significant(chars: &[char], from: usize) -> Option<char> {
    chars[from.min(chars.len())..]
        .iter()
        .copied()
        .find(|c| !c.is_whitespace())
}

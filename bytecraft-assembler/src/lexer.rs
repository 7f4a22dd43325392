//! Line-level lexical helpers.
//!
//! The language is line-oriented: a `;` or `#` starts a comment that
//! runs to end of line, operands are comma-separated, and numeric
//! literals are decimal (reduced modulo 2^32) or `0x`/`0X` hex.

use bytecraft_spec::Register;

/// A preprocessed source line with its one-based line number.
#[derive(Debug, Clone)]
pub struct SourceLine {
    pub number: usize,
    pub text: String,
}

/// Strip comments, trim whitespace, and drop blank lines.
pub fn preprocess(source: &str) -> Vec<SourceLine> {
    source
        .lines()
        .enumerate()
        .filter_map(|(index, raw)| {
            let uncommented = match raw.find([';', '#']) {
                Some(pos) => &raw[..pos],
                None => raw,
            };
            let text = uncommented.trim();
            if text.is_empty() {
                None
            } else {
                Some(SourceLine {
                    number: index + 1,
                    text: text.to_string(),
                })
            }
        })
        .collect()
}

/// Parse a numeric literal: `[-]?[0-9]+` (wrapped into u32) or
/// `0x`/`0X` hex.
pub fn parse_number(token: &str) -> Option<u32> {
    let trimmed = token.trim();
    if let Some(hex) = trimmed
        .strip_prefix("0x")
        .or_else(|| trimmed.strip_prefix("0X"))
    {
        return u32::from_str_radix(hex, 16).ok();
    }
    trimmed.parse::<i64>().ok().map(|value| value as u32)
}

/// Register-name recognition (case-insensitive).
pub fn parse_register(token: &str) -> Option<Register> {
    Register::from_name(token)
}

/// `[ ... ]` memory operand; returns the trimmed inner text.
pub fn mem_inner(token: &str) -> Option<&str> {
    let trimmed = token.trim();
    let inner = trimmed.strip_prefix('[')?.strip_suffix(']')?;
    Some(inner.trim())
}

/// Split a comma-separated operand list into trimmed tokens. A single
/// trailing comma does not produce an empty operand.
pub fn split_operands(tail: &str) -> Vec<String> {
    if tail.trim().is_empty() {
        return Vec::new();
    }
    let mut tokens: Vec<String> = tail.split(',').map(|token| token.trim().to_string()).collect();
    if tokens.last().is_some_and(|token| token.is_empty()) {
        tokens.pop();
    }
    tokens
}

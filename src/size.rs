//  Sizes written as a number with an optional `K` (thousand) or `M` (million)
//  suffix, as used on the command line and in result file names.

use crate::error::RunError;

const THOUSAND: usize = 1_000;
const MILLION: usize = 1_000_000;

/// Parses a size such as `500`, `10K` or `2m`.
///
/// Suffixes are decimal and case insensitive: `K` is a thousand and `M` a
/// million.
pub fn parse_size(s: &str) -> Result<usize, RunError> {
    let invalid = || RunError::InvalidSize(s.to_string());

    let (digits, multiplier) = match s.as_bytes().last() {
        Some(b'K' | b'k') => (&s[..s.len() - 1], THOUSAND),
        Some(b'M' | b'm') => (&s[..s.len() - 1], MILLION),
        Some(_) => (s, 1),
        None => return Err(invalid()),
    };

    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return Err(invalid());
    }

    digits
        .parse::<usize>()
        .ok()
        .and_then(|n| n.checked_mul(multiplier))
        .ok_or_else(invalid)
}

/// Formats a size with the largest suffix that divides it exactly.
pub fn format_size(size: usize) -> String {
    if size % MILLION == 0 {
        format!("{}M", size / MILLION)
    } else if size % THOUSAND == 0 {
        format!("{}K", size / THOUSAND)
    } else {
        size.to_string()
    }
}

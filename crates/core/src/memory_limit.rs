// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Memory-limit grammar: `^\s*(\d+(?:\.\d+)?)\s*(MB|GB)\s*$`, case-insensitive.
//!
//! `MB` is mebibytes (1024^2 bytes), `GB` is 1024 MB. Values that don't parse
//! are treated as "no limit" rather than an error, matching the daemon's
//! tolerant handling of this user-supplied string.

const MIB_PER_GIB: f64 = 1024.0;

/// Parse a memory-limit string into a megabyte ceiling.
///
/// Returns `None` for anything that doesn't match the grammar — callers
/// treat that as "no limit", not a hard error.
pub fn parse_memory_limit(raw: &str) -> Option<f64> {
    let trimmed = raw.trim();
    let lower = trimmed.to_ascii_lowercase();

    let (number_part, unit_multiplier) = if let Some(prefix) = lower.strip_suffix("mb") {
        (prefix, 1.0)
    } else if let Some(prefix) = lower.strip_suffix("gb") {
        (prefix, MIB_PER_GIB)
    } else {
        return None;
    };

    let number_part = number_part.trim();
    if number_part.is_empty() {
        return None;
    }
    // Grammar is `\d+(?:\.\d+)?`: one dot at most, and at least one digit on
    // each side of it (so "5.MB" and ".5MB" are both rejected).
    if !number_part.chars().all(|c| c.is_ascii_digit() || c == '.') {
        return None;
    }
    match number_part.split_once('.') {
        Some((_, rest)) if rest.contains('.') => return None,
        Some((whole, frac)) if whole.is_empty() || frac.is_empty() => return None,
        _ => {}
    }

    number_part.parse::<f64>().ok().map(|value| value * unit_multiplier)
}

//! Address Text Normalization
//!
//! The same transform is applied to every value inserted into the radix
//! index and to every query term before lookup. This symmetry is what
//! guarantees that queries find what indexing stored, so any change here
//! affects both sides at once.

/// Whitespace characters that are trimmed and collapsed.
///
/// Only these ASCII characters count; Unicode whitespace passes through
/// untouched, like every other non-ASCII character.
fn is_collapsible_space(c: char) -> bool {
    matches!(c, ' ' | '\t' | '\r' | '\n' | '\x0B' | '\x0C')
}

/// Normalizes a field or query term.
///
/// 1. ASCII letters are folded to upper case (locale-independent);
///    non-ASCII characters pass through unchanged.
/// 2. Leading and trailing whitespace is stripped.
/// 3. Every internal run of whitespace collapses to a single space.
///
/// The transform is idempotent: `normalize(normalize(s)) == normalize(s)`.
pub fn normalize(text: &str) -> String {
    let mut result = String::with_capacity(text.len());
    let mut pending_space = false;

    for c in text.chars() {
        if is_collapsible_space(c) {
            // Leading whitespace never flushes; trailing whitespace stays pending.
            if !result.is_empty() {
                pending_space = true;
            }
        } else {
            if pending_space {
                result.push(' ');
                pending_space = false;
            }
            result.push(c.to_ascii_uppercase());
        }
    }

    result
}

/// Normalizes a street name, additionally expanding a trailing postal
/// suffix abbreviation ("Park Ave" -> "PARK AVENUE").
///
/// Only the last whitespace-separated token is rewritten; unknown
/// suffixes are left alone. The result is again a normalized form.
pub fn normalize_street_suffix(street: &str) -> String {
    let normalized = normalize(street);

    match normalized.rsplit_once(' ') {
        Some((head, last)) => match expand_suffix(last) {
            Some(full) => format!("{head} {full}"),
            None => normalized,
        },
        None => match expand_suffix(&normalized) {
            Some(full) => full.to_string(),
            None => normalized,
        },
    }
}

fn expand_suffix(token: &str) -> Option<&'static str> {
    let full = match token {
        "ST" => "STREET",
        "AVE" => "AVENUE",
        "RD" => "ROAD",
        "BLVD" => "BOULEVARD",
        "DR" => "DRIVE",
        "LN" => "LANE",
        "CT" => "COURT",
        "PL" => "PLACE",
        "CIR" => "CIRCLE",
        "PKWY" => "PARKWAY",
        "TER" => "TERRACE",
        "SQ" => "SQUARE",
        "HWY" => "HIGHWAY",
        "EXPY" => "EXPRESSWAY",
        "WAY" => "WAY",
        _ => return None,
    };
    Some(full)
}

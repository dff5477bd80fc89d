//! Icon name comparison.

use unicode_normalization::UnicodeNormalization;

/// Canonical form used to decide whether two icon names collide.
///
/// NFC composition, then surrounding whitespace trimmed, inner whitespace runs
/// collapsed to a single space, then lower-cased. Stored names keep their
/// display form; only comparisons go through here.
pub fn normalize_name(raw: &str) -> String {
    let composed: String = raw.nfc().collect();
    composed
        .split(is_name_space)
        .filter(|word| !word.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase()
}

/// Unicode whitespace plus U+FEFF.
pub(crate) fn is_name_space(c: char) -> bool {
    c.is_whitespace() || c == '\u{feff}'
}

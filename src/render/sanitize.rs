//! Reduction of arbitrary text to what the standard PDF fonts can show.
//!
//! The built-in Type 1 fonts use WinAnsi (Windows-1252). Text is split
//! into clusters of a starter and its combining marks. A cluster whose NFC
//! form is representable is kept composed (`e` + U+0301 becomes `é`).
//! Otherwise every input code point without a WinAnsi byte is replaced by
//! [`SUBSTITUTE`], so two jamo that would compose into one Hangul syllable
//! still yield two markers.

use encoding_rs::WINDOWS_1252;
use unicode_normalization::char::canonical_combining_class;
use unicode_normalization::UnicodeNormalization;

/// Marker written in place of an unrepresentable code point.
pub const SUBSTITUTE: char = '?';

/// Make `text` representable in the rendering encoding.
///
/// Never fails. Idempotent, and returns representable input unchanged.
///
/// # Example
/// ```
/// use topdf::render::sanitize;
///
/// assert_eq!(sanitize("café"), "café");
/// assert_eq!(sanitize("日本"), "??");
/// ```
pub fn sanitize(text: &str) -> String {
    if text.chars().all(is_representable) {
        return text.to_string();
    }
    let mut out = String::with_capacity(text.len());
    let mut cluster = String::new();
    for c in text.chars() {
        if canonical_combining_class(c) == 0 && !cluster.is_empty() {
            push_cluster(&cluster, &mut out);
            cluster.clear();
        }
        cluster.push(c);
    }
    push_cluster(&cluster, &mut out);
    out
}

fn push_cluster(cluster: &str, out: &mut String) {
    let composed: String = cluster.nfc().collect();
    let source = if composed.chars().all(is_representable) {
        &composed
    } else {
        cluster
    };
    out.extend(source.chars().map(|c| if is_representable(c) { c } else { SUBSTITUTE }));
}

/// Whether `c` survives rendering as itself.
pub fn is_representable(c: char) -> bool {
    match c {
        '\t' | '\n' | '\r' => true,
        c if c.is_control() => false,
        c if c.is_ascii() => true,
        c => {
            let mut buf = [0u8; 4];
            let (bytes, _, had_errors) = WINDOWS_1252.encode(c.encode_utf8(&mut buf));
            !had_errors && bytes.len() == 1
        }
    }
}

/// Encode sanitized text into WinAnsi bytes for a content stream.
pub(crate) fn encode_win_ansi(text: &str) -> Vec<u8> {
    let (bytes, _, _) = WINDOWS_1252.encode(text);
    bytes.into_owned()
}

//! Text normalization with Turkish casing rules.
//!
//! Word ids are produced by [`normalize_word`]. Plain Unicode lowercasing is
//! not enough for Turkish: `I` must fold to dotless `ı` and `İ` to `i`, while
//! the default mapping turns `İ` into `i` followed by a combining dot.

use std::collections::HashSet;

/// Characters stripped by [`sanitize_input`].
const UNSAFE_CHARS: [char; 6] = ['<', '>', '\'', '"', '&', ';'];

/// Canonicalizes a raw word into its id.
///
/// Trims, lowercases with Turkish rules and collapses every whitespace run
/// into a single space. Whitespace-only input yields an empty string, which
/// callers treat as invalid.
pub fn normalize_word(input: &str) -> String {
    let mut out = String::with_capacity(input.len());

    for token in input.split_whitespace() {
        if !out.is_empty() {
            out.push(' ');
        }
        for c in token.chars() {
            push_lower(&mut out, c);
        }
    }

    out
}

fn push_lower(out: &mut String, c: char) {
    match c {
        'I' => out.push('ı'),
        'İ' => out.push('i'),
        _ => out.extend(c.to_lowercase()),
    }
}

fn push_upper(out: &mut String, c: char) {
    match c {
        'i' => out.push('İ'),
        'ı' => out.push('I'),
        _ => out.extend(c.to_uppercase()),
    }
}

/// Returns true if the word can be used as a navigation target.
///
/// The normalized form must have at least two characters, all of them
/// letters, with spaces and hyphens allowed only between letters.
pub fn is_valid_word(word: &str) -> bool {
    let normalized = normalize_word(word);
    let chars: Vec<char> = normalized.chars().collect();

    if chars.len() < 2 {
        return false;
    }

    let last = chars.len() - 1;
    chars.iter().enumerate().all(|(i, &c)| {
        c.is_alphabetic() || ((c == ' ' || c == '-') && i != 0 && i != last)
    })
}

/// Drops words whose normalized form was already seen.
///
/// The first spelling of each word is kept as-is so it can still be shown
/// with its original casing. Words that normalize to nothing are dropped.
pub fn dedupe_words<S: AsRef<str>>(words: &[S]) -> Vec<String> {
    let mut seen = HashSet::new();
    let mut result = Vec::new();

    for word in words {
        let word = word.as_ref();
        let normalized = normalize_word(word);
        if !normalized.is_empty() && seen.insert(normalized) {
            result.push(word.to_string());
        }
    }

    result
}

/// Normalizes input and removes characters that have no place in a lookup key.
pub fn sanitize_input(input: &str) -> String {
    normalize_word(input)
        .chars()
        .filter(|c| !UNSAFE_CHARS.contains(c))
        .collect()
}

/// Shortens text to at most `max_len` characters, ending in `...` when cut.
pub fn truncate_text(text: &str, max_len: usize) -> String {
    if text.chars().count() <= max_len {
        return text.to_string();
    }

    let keep = max_len.saturating_sub(3);
    let mut out: String = text.chars().take(keep).collect();
    out.push_str("...");
    out
}

/// Formats a word for display: normalized, first letter capitalized.
pub fn format_display_word(word: &str) -> String {
    let normalized = normalize_word(word);
    let mut chars = normalized.chars();

    match chars.next() {
        Some(first) => {
            let mut out = String::with_capacity(normalized.len() + 1);
            push_upper(&mut out, first);
            out.extend(chars);
            out
        }
        None => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_trims_and_collapses() {
        assert_eq!(normalize_word("  kitap  "), "kitap");
        assert_eq!(normalize_word("kara \t\n kutu"), "kara kutu");
        assert_eq!(normalize_word("Roman"), "roman");
    }

    #[test]
    fn test_normalize_turkish_i() {
        assert_eq!(normalize_word("IŞIK"), "ışık");
        assert_eq!(normalize_word("İstanbul"), "istanbul");
        assert_eq!(normalize_word("İĞNE"), "iğne");
        assert_eq!(normalize_word("ÇÖĞÜŞ"), "çöğüş");
    }

    #[test]
    fn test_normalize_empty() {
        assert_eq!(normalize_word(""), "");
        assert_eq!(normalize_word("   \t  "), "");
    }

    #[test]
    fn test_normalize_is_idempotent() {
        let samples = [
            "  Kitap ",
            "IRMAK  kıyısı",
            "İİİ iii III ııı",
            "Straße",
            "ΣΟΦΙΑ",
            "\u{00a0}nbsp\u{2003}space ",
            "",
            "a-b  c",
        ];

        for s in samples {
            let once = normalize_word(s);
            assert_eq!(normalize_word(&once), once, "not idempotent for {:?}", s);
        }
    }

    #[test]
    fn test_is_valid_word() {
        assert!(is_valid_word("kitap"));
        assert!(is_valid_word("Öğretmen"));
        assert!(is_valid_word("kara kutu"));
        assert!(is_valid_word("alt-üst"));

        assert!(!is_valid_word(""));
        assert!(!is_valid_word("a"));
        assert!(!is_valid_word("   "));
        assert!(!is_valid_word("kitap1"));
        assert!(!is_valid_word("<script>"));
        assert!(!is_valid_word("-kitap"));
        assert!(!is_valid_word("kitap-"));
    }

    #[test]
    fn test_dedupe_keeps_first_spelling() {
        let words = ["Roman", "roman", "  ROMAN ", "", "yazar", "Yazar"];
        assert_eq!(dedupe_words(&words), vec!["Roman", "yazar"]);
    }

    #[test]
    fn test_sanitize_input() {
        assert_eq!(sanitize_input(" Kitap<>;' "), "kitap");
        assert_eq!(sanitize_input("a&b\"c"), "abc");
    }

    #[test]
    fn test_truncate_text() {
        assert_eq!(truncate_text("kitap", 20), "kitap");
        assert_eq!(truncate_text("kütüphanecilik", 8), "kütüp...");
        assert_eq!(truncate_text("abcdef", 2), "...");
    }

    #[test]
    fn test_format_display_word() {
        assert_eq!(format_display_word("istanbul"), "İstanbul");
        assert_eq!(format_display_word("ırmak"), "Irmak");
        assert_eq!(format_display_word("  KİTAP "), "Kitap");
        assert_eq!(format_display_word(""), "");
    }
}

//! Text normalization helpers
//!
//! Matching across the engine runs on lowercased text with runs of whitespace
//! collapsed to a single space. Accents are kept.

use unicode_segmentation::UnicodeSegmentation;

/// Lowercase, trim and collapse whitespace
pub fn normalize(text: &str) -> String {
    text.split_whitespace()
        .map(str::to_lowercase)
        .collect::<Vec<_>>()
        .join(" ")
}

/// Number of words, ignoring punctuation
pub fn word_count(text: &str) -> usize {
    text.unicode_words().count()
}

/// Whether `phrase` occurs in `text` on word boundaries
///
/// Both arguments are expected to be normalized already.
pub fn contains_phrase(text: &str, phrase: &str) -> bool {
    if phrase.is_empty() {
        return false;
    }
    text.match_indices(phrase).any(|(start, matched)| {
        let before = text[..start].chars().next_back();
        let after = text[start + matched.len()..].chars().next();
        !before.is_some_and(char::is_alphanumeric) && !after.is_some_and(char::is_alphanumeric)
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize() {
        assert_eq!(normalize("  Quero   ANTECIPAR\tminhas\nvendas "), "quero antecipar minhas vendas");
        assert_eq!(normalize("CARTÃO Pré-Pago"), "cartão pré-pago");
        assert_eq!(normalize(""), "");
        assert_eq!(normalize("   "), "");
    }

    #[test]
    fn test_word_count() {
        assert_eq!(word_count("problema"), 1);
        assert_eq!(word_count("meu cartão, de novo!!!"), 4);
        assert_eq!(word_count("?!..."), 0);
        assert_eq!(word_count(""), 0);
    }

    #[test]
    fn test_contains_phrase() {
        assert!(contains_phrase("tenho um problema", "problema"));
        assert!(contains_phrase("problema, urgente", "problema"));
        assert!(!contains_phrase("problemas demais", "problema"));
        assert!(contains_phrase("isso mesmo, obrigado", "isso mesmo"));
        assert!(!contains_phrase("nãoo sei", "não"));
        assert!(contains_phrase("não sei", "não"));
        assert!(!contains_phrase("qualquer coisa", ""));
    }

    #[test]
    fn test_contains_phrase_later_occurrence() {
        // First occurrence is inside a word, second stands alone
        assert!(contains_phrase("simples sim", "sim"));
    }
}

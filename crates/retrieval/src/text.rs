//! Text normalisation shared by the keyword index and the query parser.

use once_cell::sync::Lazy;
use regex::Regex;
use unicode_segmentation::UnicodeSegmentation;

/// A dot between a digit and exactly three more digits ("4.958").
static THOUSANDS_SEPARATOR: Lazy<Regex> = Lazy::new(|| Regex::new(r"(\d)\.(\d{3})\b").unwrap());

/// Replace Portuguese (and common Latin) diacritics with their base letter.
///
/// Ordinal indicators (`º`, `ª`) and the degree sign are left alone; the
/// norm patterns match them explicitly.
pub fn fold_accents(text: &str) -> String {
    text.chars()
        .map(|c| match c {
            'á' | 'à' | 'â' | 'ã' | 'ä' => 'a',
            'Á' | 'À' | 'Â' | 'Ã' | 'Ä' => 'A',
            'é' | 'è' | 'ê' | 'ë' => 'e',
            'É' | 'È' | 'Ê' | 'Ë' => 'E',
            'í' | 'ì' | 'î' | 'ï' => 'i',
            'Í' | 'Ì' | 'Î' | 'Ï' => 'I',
            'ó' | 'ò' | 'ô' | 'õ' | 'ö' => 'o',
            'Ó' | 'Ò' | 'Ô' | 'Õ' | 'Ö' => 'O',
            'ú' | 'ù' | 'û' | 'ü' => 'u',
            'Ú' | 'Ù' | 'Û' | 'Ü' => 'U',
            'ç' => 'c',
            'Ç' => 'C',
            'ñ' => 'n',
            'Ñ' => 'N',
            other => other,
        })
        .collect()
}

/// Remove thousands separators inside numbers: "1.234.567" becomes "1234567".
pub fn strip_thousands_separators(text: &str) -> String {
    let mut current = text.to_string();
    while THOUSANDS_SEPARATOR.is_match(&current) {
        current = THOUSANDS_SEPARATOR.replace_all(&current, "$1$2").into_owned();
    }
    current
}

/// Lowercase, fold diacritics and strip thousands separators.
pub fn normalize_for_matching(text: &str) -> String {
    strip_thousands_separators(&fold_accents(&text.trim().to_lowercase()))
}

/// Split text into lowercase, accent-folded unicode words.
pub fn tokenize(text: &str) -> Vec<String> {
    let folded = fold_accents(&text.to_lowercase());
    folded.unicode_words().map(str::to_string).collect()
}

/// Shorten text to at most `max_chars` characters, appending "..." when cut.
pub fn truncate_chars(text: &str, max_chars: usize) -> String {
    let trimmed = text.trim();
    if trimmed.chars().count() <= max_chars {
        return trimmed.to_string();
    }
    let cut: String = trimmed.chars().take(max_chars).collect();
    format!("{}...", cut.trim_end())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fold_accents() {
        assert_eq!(fold_accents("Resolução nº"), "Resolucao nº");
        assert_eq!(fold_accents("provisão é crédito"), "provisao e credito");
    }

    #[test]
    fn test_strip_thousands_separators() {
        assert_eq!(strip_thousands_separators("resolução 4.958"), "resolução 4958");
        assert_eq!(strip_thousands_separators("1.234.567 e 3.9"), "1234567 e 3.9");
        assert_eq!(strip_thousands_separators("Art. 12."), "Art. 12.");
    }

    #[test]
    fn test_tokenize_folds_and_splits() {
        assert_eq!(
            tokenize("Patrimônio de Referência (PR), art. 12"),
            vec!["patrimonio", "de", "referencia", "pr", "art", "12"]
        );
    }

    #[test]
    fn test_truncate_chars_is_utf8_safe() {
        assert_eq!(truncate_chars("ação", 10), "ação");
        assert_eq!(truncate_chars("ação rápida", 4), "ação...");
    }
}

//! Fixed stop-word lists per supported language.

use ystrat_models::Language;

const EN_STOPWORDS: &[&str] = &[
    "the", "and", "for", "are", "but", "not", "you", "your", "all", "can", "had", "has", "have",
    "her", "his", "him", "was", "one", "our", "out", "day", "get", "how", "its", "may", "new",
    "now", "old", "see", "two", "who", "why", "what", "when", "where", "which", "with", "this",
    "that", "these", "those", "from", "into", "will", "they", "them", "then", "than", "there",
    "about", "after", "before", "just", "like", "more", "most", "only", "over", "some", "such",
    "very", "every", "should", "could", "would", "been", "being", "does", "did", "don",
];

const BN_STOPWORDS: &[&str] = &[
    "এবং", "একটি", "এই", "যে", "করে", "থেকে", "কি", "না", "তার", "সাথে", "হয়", "জন্য",
    "আমি", "আমরা", "তুমি", "সে", "তারা", "কিন্তু", "অথবা", "হবে", "ছিল", "আছে", "কোন",
];

/// The stop list for a detected language. `Other` falls back to the
/// English list, which is harmless for unrelated scripts.
pub fn stopwords(language: Language) -> &'static [&'static str] {
    match language {
        Language::Bn => BN_STOPWORDS,
        Language::En | Language::Other => EN_STOPWORDS,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn english_list_contains_common_words() {
        assert!(stopwords(Language::En).contains(&"the"));
        assert!(stopwords(Language::En).contains(&"with"));
    }

    #[test]
    fn bengali_list_is_used_for_bn() {
        assert!(stopwords(Language::Bn).contains(&"এবং"));
    }
}

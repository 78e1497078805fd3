/// Leading words dropped from a normalized key.
const LEADING_ARTICLES: &[&str] = &["the", "a", "an"];

/// Comparison key for a title or author: lowercase, punctuation removed,
/// whitespace collapsed, one leading article stripped. Never used as identity.
pub fn normalize_text(raw: &str) -> String {
    let lowercase = raw.to_lowercase();
    let cleaned: String = lowercase
        .chars()
        .filter_map(|c| {
            if c.is_alphanumeric() {
                Some(c)
            } else if c.is_whitespace() || is_word_joiner(c) {
                Some(' ')
            } else {
                None
            }
        })
        .collect();

    let mut words: Vec<&str> = cleaned.split_whitespace().collect();
    if words.len() > 1 && LEADING_ARTICLES.contains(&words[0]) {
        words.remove(0);
    }
    words.join(" ")
}

/// Key for an optional field; absent fields yield the empty key.
pub fn normalize_field(raw: Option<&str>) -> String {
    raw.map(normalize_text).unwrap_or_default()
}

// Separators that join words rather than decorate them ("Rye-Smith", "A/B").
fn is_word_joiner(c: char) -> bool {
    matches!(c, '-' | '–' | '—' | '/' | '_')
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strips_case_punctuation_and_whitespace() {
        assert_eq!(normalize_text("  The Nickel   Boys! "), "nickel boys");
        assert_eq!(normalize_text("Colson  Whitehead"), "colson whitehead");
        assert_eq!(normalize_text("Hamnet: A Novel"), "hamnet a novel");
    }

    #[test]
    fn strips_only_one_leading_article() {
        assert_eq!(normalize_text("A Promised Land"), "promised land");
        assert_eq!(normalize_text("An American Marriage"), "american marriage");
        assert_eq!(normalize_text("The A Team"), "a team");
        assert_eq!(normalize_text("Theory of Bastards"), "theory of bastards");
    }

    #[test]
    fn lone_article_is_kept() {
        assert_eq!(normalize_text("The"), "the");
    }

    #[test]
    fn apostrophes_vanish_and_hyphens_split() {
        assert_eq!(normalize_text("Hell's Half-Acre"), "hells half acre");
        assert_eq!(normalize_text("O'Farrell, Maggie"), "ofarrell maggie");
    }

    #[test]
    fn empty_and_punctuation_only_yield_empty() {
        assert_eq!(normalize_text(""), "");
        assert_eq!(normalize_text("?!..."), "");
        assert_eq!(normalize_field(None), "");
    }

    #[test]
    fn keeps_non_ascii_letters() {
        assert_eq!(normalize_text("Éric-Emmanuel Schmitt"), "éric emmanuel schmitt");
    }
}

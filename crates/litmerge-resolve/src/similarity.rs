/// Bounded similarity between two normalized keys, in `[0.0, 1.0]`.
///
/// Symmetric and deterministic: 1.0 for identical non-empty keys, 0.0 when no
/// character lines up. An empty key scores 0.0 against everything, including
/// another empty key, so two records that both lack a title never match on it.
pub fn similarity(a: &str, b: &str) -> f64 {
    if a.is_empty() || b.is_empty() {
        return 0.0;
    }

    if a == b {
        return 1.0;
    }

    strsim::normalized_levenshtein(a, b).clamp(0.0, 1.0)
}

//! Fuzzy matching of OCR output against a target string

/// Count target characters found in `candidate`, consuming each candidate
/// character at most once. Order is ignored.
pub fn hit_count(target: &str, candidate: &str) -> usize {
    let mut pool: Vec<char> = candidate.chars().collect();
    let mut hits = 0;

    for ch in target.chars() {
        if let Some(pos) = pool.iter().position(|c| *c == ch) {
            pool.swap_remove(pos);
            hits += 1;
        }
    }

    hits
}

/// Whether `candidate` holds at least `min_hits` characters of `target`.
///
/// `min_hits` defaults to the character count of `target`; zero counts as
/// unset.
pub fn is_match(target: &str, candidate: &str, min_hits: Option<usize>) -> bool {
    let min_hits = min_hits
        .filter(|&n| n > 0)
        .unwrap_or_else(|| target.chars().count());
    hit_count(target, candidate) >= min_hits
}

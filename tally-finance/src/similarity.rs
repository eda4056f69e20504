//! Edit-distance similarity between normalized descriptions.

/// Levenshtein distance over chars (insertions, deletions, substitutions).
pub fn levenshtein_distance(a: &str, b: &str) -> usize {
    let a: Vec<char> = a.chars().collect();
    let b: Vec<char> = b.chars().collect();
    if a.is_empty() {
        return b.len();
    }
    if b.is_empty() {
        return a.len();
    }

    let mut prev: Vec<usize> = (0..=b.len()).collect();
    let mut curr = vec![0; b.len() + 1];
    for (i, ca) in a.iter().enumerate() {
        curr[0] = i + 1;
        for (j, cb) in b.iter().enumerate() {
            let cost = usize::from(ca != cb);
            curr[j + 1] = (prev[j + 1] + 1).min(curr[j] + 1).min(prev[j] + cost);
        }
        std::mem::swap(&mut prev, &mut curr);
    }
    prev[b.len()]
}

/// Similarity in 0..=100: `round((1 - distance / longest) * 100)`.
/// Two empty strings are identical; one empty string matches nothing.
pub fn calculate_string_similarity(a: &str, b: &str) -> u8 {
    let longest = a.chars().count().max(b.chars().count());
    if longest == 0 {
        return 100;
    }
    let distance = levenshtein_distance(a, b);
    let ratio = 1.0 - distance as f64 / longest as f64;
    (ratio * 100.0).round().clamp(0.0, 100.0) as u8
}

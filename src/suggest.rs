//! "Did you mean" candidates for mistyped flags and subcommand names.

use std::cmp::Ordering;

const MAX_MATCHES: usize = 3;
const CUTOFF: f64 = 0.6;

/// Returns up to three of `possibilities` that look like `word`, best
/// first.
pub(crate) fn close_matches<'a, I>(word: &str, possibilities: I) -> Vec<String>
where
    I: IntoIterator<Item = &'a str>,
{
    let mut scored = possibilities
        .into_iter()
        .map(|it| (ratio(word, it), it))
        .filter(|(score, _)| *score >= CUTOFF)
        .collect::<Vec<_>>();
    scored.sort_by(|(ls, lw), (rs, rw)| rs.partial_cmp(ls).unwrap_or(Ordering::Equal).then(lw.cmp(rw)));
    scored.into_iter().take(MAX_MATCHES).map(|(_, it)| it.to_string()).collect()
}

/// Similarity in `[0, 1]`: twice the longest common subsequence over the
/// combined length.
fn ratio(a: &str, b: &str) -> f64 {
    let a = a.chars().collect::<Vec<_>>();
    let b = b.chars().collect::<Vec<_>>();
    let total = a.len() + b.len();
    if total == 0 {
        return 1.0;
    }
    2.0 * lcs_len(&a, &b) as f64 / total as f64
}

fn lcs_len(a: &[char], b: &[char]) -> usize {
    let mut prev = vec![0usize; b.len() + 1];
    let mut curr = vec![0usize; b.len() + 1];
    for &ca in a {
        for (j, &cb) in b.iter().enumerate() {
            curr[j + 1] = if ca == cb { prev[j] + 1 } else { curr[j].max(prev[j + 1]) };
        }
        std::mem::swap(&mut prev, &mut curr);
    }
    prev[b.len()]
}

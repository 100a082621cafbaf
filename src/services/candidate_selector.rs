use rand::Rng;

use crate::domain::models::FileDetails;

/// Service for picking the file a challenge is generated for
///
/// Linear rank selection: the candidate at position `i` of an ascending
/// coverage ordering gets weight `(2 - c + 2(c - 1) * r / (N - 1)) / N`
/// with `r = N - 1 - i`, so the worst covered file is the most likely pick
/// while every file keeps a positive chance.
#[derive(Debug, Clone)]
pub struct CandidateSelector {
    bias: f64,
}

impl Default for CandidateSelector {
    fn default() -> Self {
        Self::new()
    }
}

impl CandidateSelector {
    /// Create a selector with the default bias of 1.5
    pub fn new() -> Self {
        Self { bias: 1.5 }
    }

    /// Create a selector with a custom bias in `(1, 2]`
    pub fn with_bias(bias: f64) -> Self {
        Self { bias }
    }

    pub fn bias(&self) -> f64 {
        self.bias
    }

    /// Cumulative selection probabilities for `n` ranked candidates
    ///
    /// # Returns
    /// One entry per candidate, monotonically increasing and ending at 1.0
    pub fn rank_table(&self, n: usize) -> Vec<f64> {
        rank_table(n, self.bias)
    }

    /// Draw a position in `[0, n)`, or `None` when there is nothing to draw
    pub fn select_index<R: Rng + ?Sized>(&self, n: usize, rng: &mut R) -> Option<usize> {
        if n == 0 {
            return None;
        }
        let table = self.rank_table(n);
        let p: f64 = rng.gen();
        Some(table.iter().position(|r| *r > p).unwrap_or(n - 1))
    }

    /// Draw one of `candidates`, which must be sorted worst covered first
    pub fn select<'a, T, R: Rng + ?Sized>(
        &self,
        candidates: &'a [T],
        rng: &mut R,
    ) -> Option<&'a T> {
        self.select_index(candidates.len(), rng)
            .map(|index| &candidates[index])
    }
}

/// Cumulative linear-ranking table with selection pressure `bias`
pub fn rank_table(n: usize, bias: f64) -> Vec<f64> {
    if n == 0 {
        return Vec::new();
    }
    if n == 1 {
        return vec![1.0];
    }

    let count = n as f64;
    let last = (n - 1) as f64;
    let mut cumulative = 0.0;
    (0..n)
        .map(|i| {
            let rank = (n - 1 - i) as f64;
            cumulative += (2.0 - bias + 2.0 * (bias - 1.0) * rank / last) / count;
            cumulative
        })
        .collect()
}

/// Files `user` may receive a challenge for, worst covered first
///
/// Drops files that no longer exist, are fully covered, or were not changed
/// by the user. The sort is stable so equal coverage keeps host order.
pub fn eligible_candidates(files: &[FileDetails], user: &str) -> Vec<FileDetails> {
    let mut candidates: Vec<FileDetails> = files
        .iter()
        .filter(|f| f.exists && !f.is_fully_covered() && f.was_changed_by(user))
        .cloned()
        .collect();
    candidates.sort_by(|a, b| a.coverage.total_cmp(&b.coverage));
    candidates
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn file(name: &str, coverage: f64) -> FileDetails {
        FileDetails::source("org.example", name, format!("src/{name}.java"), coverage)
            .changed_by("alice")
    }

    #[test]
    fn test_rank_table_five_candidates() {
        let table = rank_table(5, 1.5);
        assert_eq!(table.len(), 5);
        assert!(table.windows(2).all(|w| w[0] < w[1]));
        assert!((table[4] - 1.0).abs() < 1e-9);

        let first = table[0];
        let last = table[4] - table[3];
        assert!(first > last);
        // (2 - 1.5 + 2 * 0.5 * 4 / 4) / 5 = 0.3
        assert!((first - 0.3).abs() < 1e-9);
        // (2 - 1.5) / 5 = 0.1
        assert!((last - 0.1).abs() < 1e-9);
    }

    #[test]
    fn test_rank_table_edges() {
        assert!(rank_table(0, 1.5).is_empty());
        assert_eq!(rank_table(1, 1.5), vec![1.0]);
    }

    #[test]
    fn test_select_single_candidate() {
        let selector = CandidateSelector::new();
        let mut rng = StdRng::seed_from_u64(7);
        for _ in 0..20 {
            assert_eq!(selector.select_index(1, &mut rng), Some(0));
        }
    }

    #[test]
    fn test_select_empty() {
        let selector = CandidateSelector::new();
        let mut rng = StdRng::seed_from_u64(7);
        let empty: Vec<FileDetails> = Vec::new();
        assert!(selector.select(&empty, &mut rng).is_none());
    }

    #[test]
    fn test_select_favours_front() {
        let selector = CandidateSelector::new();
        let mut rng = StdRng::seed_from_u64(42);
        let mut hits = [0usize; 5];
        for _ in 0..10_000 {
            if let Some(i) = selector.select_index(5, &mut rng) {
                hits[i] += 1;
            }
        }
        assert!(hits[0] > hits[4]);
        assert!(hits.iter().all(|h| *h > 0));
    }

    #[test]
    fn test_select_is_reproducible() {
        let selector = CandidateSelector::new();
        let draw = |seed| {
            let mut rng = StdRng::seed_from_u64(seed);
            (0..10)
                .filter_map(|_| selector.select_index(4, &mut rng))
                .collect::<Vec<_>>()
        };
        assert_eq!(draw(3), draw(3));
    }

    #[test]
    fn test_eligible_candidates_filters_and_sorts() {
        let files = vec![
            file("High", 0.9),
            file("Full", 1.0),
            file("Low", 0.1),
            file("Gone", 0.0).with_exists(false),
            FileDetails::source("org.example", "Other", "src/Other.java", 0.2).changed_by("bob"),
            file("Mid", 0.5),
        ];

        let names: Vec<String> = eligible_candidates(&files, "alice")
            .into_iter()
            .map(|f| f.file_name)
            .collect();
        assert_eq!(names, vec!["Low", "Mid", "High"]);
    }

    #[test]
    fn test_eligible_candidates_never_fully_covered() {
        let files = vec![file("Full", 1.0), file("Half", 0.5)];
        let selector = CandidateSelector::new();
        let mut rng = StdRng::seed_from_u64(1);
        let candidates = eligible_candidates(&files, "alice");
        for _ in 0..100 {
            let picked = selector.select(&candidates, &mut rng).unwrap();
            assert_eq!(picked.file_name, "Half");
        }
    }
}

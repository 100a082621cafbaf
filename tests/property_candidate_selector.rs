use gamekins::services::candidate_selector::rank_table;
use gamekins::{eligible_candidates, CandidateSelector, FileDetails};
use proptest::prelude::*;
use rand::rngs::StdRng;
use rand::SeedableRng;

proptest! {
    /// Property: the cumulative table never decreases and ends at 1
    #[test]
    fn prop_rank_table_is_cumulative(
        n in 1usize..200,
        bias in 1.01f64..=2.0
    ) {
        let table = rank_table(n, bias);

        prop_assert_eq!(table.len(), n);
        prop_assert!(table[0] > 0.0);
        for pair in table.windows(2) {
            prop_assert!(pair[1] >= pair[0]);
        }
        prop_assert!((table[n - 1] - 1.0).abs() < 1e-9);
    }

    /// Property: earlier (worse covered) positions never weigh less
    #[test]
    fn prop_rank_weights_decrease(
        n in 2usize..100,
        bias in 1.01f64..=2.0
    ) {
        let table = rank_table(n, bias);
        let mut previous = table[0];
        let mut weight = table[0];
        for cumulative in &table[1..] {
            let next = cumulative - previous;
            prop_assert!(next <= weight + 1e-12);
            weight = next;
            previous = *cumulative;
        }
    }

    /// Property: a draw always lands inside the candidate range
    #[test]
    fn prop_select_index_in_range(
        n in 1usize..500,
        seed in any::<u64>()
    ) {
        let selector = CandidateSelector::new();
        let mut rng = StdRng::seed_from_u64(seed);

        let index = selector.select_index(n, &mut rng);
        prop_assert!(index.is_some_and(|i| i < n));
    }

    /// Property: candidates belong to the user and come worst covered first
    #[test]
    fn prop_eligible_candidates_sorted(
        coverages in prop::collection::vec(0.0f64..=1.0, 0..30),
        owners in prop::collection::vec(any::<bool>(), 30)
    ) {
        let files: Vec<FileDetails> = coverages
            .iter()
            .zip(owners.iter())
            .enumerate()
            .map(|(i, (coverage, owned))| {
                let path = format!("C{i}.java");
                let file = FileDetails::source("org.example", format!("C{i}"), path, *coverage);
                if *owned { file.changed_by("alice") } else { file.changed_by("bob") }
            })
            .collect();

        let candidates = eligible_candidates(&files, "alice");

        prop_assert!(candidates.iter().all(|f| f.was_changed_by("alice") && f.coverage < 1.0));
        for pair in candidates.windows(2) {
            prop_assert!(pair[0].coverage <= pair[1].coverage);
        }
    }
}

#[test]
fn test_empty_pool_has_no_table() {
    assert!(rank_table(0, 1.5).is_empty());
    let mut rng = StdRng::seed_from_u64(0);
    assert_eq!(CandidateSelector::new().select_index(0, &mut rng), None);
}

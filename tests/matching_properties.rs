use thermalign::{hamming_distance, match_descriptors, Descriptor};

/// Deterministic pseudo-random descriptor sets.
fn descriptors(count: usize, mut state: u64) -> Vec<Descriptor> {
    let mut out = Vec::with_capacity(count);
    for _ in 0..count {
        let mut d = [0u8; 32];
        for byte in d.iter_mut() {
            state = state
                .wrapping_mul(6364136223846793005)
                .wrapping_add(1442695040888963407);
            *byte = (state >> 56) as u8;
        }
        out.push(d);
    }
    out
}

#[test]
fn tightening_the_ratio_never_adds_matches() {
    let query = descriptors(200, 42);
    // Overlap half the train set with the query set so plenty of strong
    // matches exist alongside random ones.
    let mut train = query[..100].to_vec();
    train.extend(descriptors(100, 99));

    let thresholds = [0.9f32, 0.75, 0.6, 0.5, 0.3];
    let counts: Vec<usize> = thresholds
        .iter()
        .map(|&ratio| match_descriptors(&query, &train, ratio).len())
        .collect();
    for pair in counts.windows(2) {
        assert!(pair[1] <= pair[0], "counts not monotonic: {counts:?}");
    }
    // Sanity: the loosest threshold accepts the exact duplicates.
    assert!(counts[0] >= 100);
}

#[test]
fn matches_reference_valid_indices_and_true_distances() {
    let query = descriptors(80, 7);
    let train = descriptors(120, 8);

    for m in match_descriptors(&query, &train, 0.75) {
        assert!(m.query_idx < query.len());
        assert!(m.train_idx < train.len());
        assert_eq!(
            m.distance,
            hamming_distance(&query[m.query_idx], &train[m.train_idx])
        );
        // The accepted candidate is a true nearest neighbor.
        let min = train
            .iter()
            .map(|t| hamming_distance(&query[m.query_idx], t))
            .min()
            .unwrap();
        assert_eq!(m.distance, min);
    }
}

#[test]
fn each_query_matches_at_most_once() {
    let query = descriptors(150, 3);
    let train = descriptors(150, 4);
    let matches = match_descriptors(&query, &train, 0.9);
    let mut seen = std::collections::HashSet::new();
    for m in &matches {
        assert!(seen.insert(m.query_idx), "query {} matched twice", m.query_idx);
    }
}

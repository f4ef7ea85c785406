//! End-to-end matching statistics queries against brute-force oracles.

mod common;

use common::Reference;
use matchstats::bit_vectors::MarkerBits;
use matchstats::utils::needed_bits;
use matchstats::{DenseVector, MsIndex, RleBwt, SdVector};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaChaRng;
use tempfile::TempDir;

fn build(text: &[u8]) -> (TempDir, Reference, MsIndex) {
    let dir = tempfile::tempdir().unwrap();
    let reference = Reference::new(text);
    let prefix = reference.write_artifacts(dir.path(), "t");
    let index = MsIndex::from_files(&prefix).unwrap();
    (dir, reference, index)
}

/// Checks a query result against the brute-force maximum-LCP oracle.
fn verify_query(reference: &Reference, index: &MsIndex, pattern: &[u8]) {
    let pointers = index.query(pattern);
    assert_eq!(pointers.len(), pattern.len());
    for k in 0..pattern.len() {
        match reference.best_match_len(pattern, k) {
            Some(best) => {
                let p = pointers[k];
                assert_eq!(
                    reference.text[p], pattern[k],
                    "pointer {p} at position {k} of {pattern:?} starts with the wrong character"
                );
                let got = Reference::lcp(&reference.text[p..], &pattern[k..]);
                assert_eq!(
                    got, best,
                    "pointer {p} at position {k} of {pattern:?} reaches {got}, oracle says {best}"
                );
            }
            None => assert_eq!(pointers[k], 0, "absent character must report the sentinel"),
        }
    }
}

#[test]
fn index_shape_matches_reference() {
    let (_dir, reference, index) = build(b"GATTAGATACAT");
    assert_eq!(index.len(), reference.len());
    assert_eq!(index.num_runs(), reference.num_runs());
    assert_eq!(
        index.terminator_position(),
        reference.bwt.iter().position(|&c| c == 1).unwrap()
    );

    // The F column is an exclusive prefix histogram.
    let f = index.f();
    assert_eq!(f[0], 0);
    assert_eq!(f[256], index.len());
    let mut total = 0;
    for c in 0..=255u8 {
        assert_eq!(f[usize::from(c) + 1] - f[usize::from(c)], index.bwt().num_occ(c));
        total += index.bwt().num_occ(c);
    }
    assert_eq!(total, index.len());

    // The RLBWT reproduces the reference BWT.
    for (i, &c) in reference.bwt.iter().enumerate() {
        assert_eq!(index.bwt().access(i), Some(c));
    }

    // Rank/select round-trip on every character present.
    for c in 0..=255u8 {
        for k in 0..index.bwt().num_occ(c) {
            let pos = index.bwt().select(k, c).unwrap();
            assert_eq!(index.bwt().rank(pos, c), Some(k));
            assert_eq!(index.bwt().access(pos), Some(c));
        }
    }

    // Samples are in range and packed in ceil(log2 n) bits.
    let n = index.len();
    assert_eq!(index.samples_last().width(), needed_bits(n - 1));
    assert_eq!(index.samples_last().len(), index.num_runs());
    for j in 0..index.num_runs() {
        assert!(index.samples_start()[j] < n);
        assert!(index.samples_last().get_int(j).unwrap() < n);
        assert!(index.thresholds()[j] <= n);
    }
}

#[test]
fn lf_agrees_with_reference_suffix_array() {
    let (_dir, reference, index) = build(b"GATTAGATACAT");
    for i in 0..index.len() {
        let c = reference.bwt[i];
        assert_eq!(index.lf(i, c), reference.lf_reference(i), "LF({i})");
        // LF lands inside the F interval of c.
        let f = index.f();
        assert!(index.lf(i, c) >= f[usize::from(c)]);
        assert!(index.lf(i, c) <= f[usize::from(c) + 1]);
    }
}

#[test]
fn gattaca_query() {
    let (_dir, reference, index) = build(b"GATTAGATACAT");
    let pointers = index.query(b"GATTACA");
    assert_eq!(pointers.len(), 7);
    verify_query(&reference, &index, b"GATTACA");
}

#[test]
fn absent_character_reports_sentinel() {
    let (_dir, _reference, index) = build(b"GATTAGATACAT");
    assert_eq!(index.query(b"Z"), vec![0]);
}

#[test]
fn single_character_query() {
    let (_dir, reference, index) = build(b"GATTAGATACAT");
    let pointers = index.query(b"A");
    assert_eq!(pointers.len(), 1);
    assert_eq!(reference.text[pointers[0]], b'A');
    verify_query(&reference, &index, b"A");
}

#[test]
fn substring_queries() {
    let (_dir, reference, index) = build(b"GATTAGATACAT");

    let pointers = index.query(b"GATTA");
    assert!(reference.text[pointers[0]..].starts_with(b"GATTA"));
    verify_query(&reference, &index, b"GATTA");

    let pointers = index.query(b"TACAT");
    assert!(reference.text[pointers[0]..].starts_with(b"TACAT"));
    verify_query(&reference, &index, b"TACAT");
}

#[test]
fn empty_pattern() {
    let (_dir, _reference, index) = build(b"GATTAGATACAT");
    assert_eq!(index.query(b""), vec![]);
}

#[test]
fn random_patterns_match_oracle() {
    let (_dir, reference, index) = build(b"GATTAGATACAT");
    let mut rng = ChaChaRng::seed_from_u64(42);
    for _ in 0..300 {
        let m = rng.gen_range(1..=64);
        let pattern: Vec<u8> = (0..m).map(|_| b"ACGTZ"[rng.gen_range(0..5)]).collect();
        verify_query(&reference, &index, &pattern);
    }
}

#[test]
fn random_repetitive_texts() {
    let mut rng = ChaChaRng::seed_from_u64(43);
    for round in 0..5 {
        // Repetitive collection: a core unit copied with point mutations.
        let unit: Vec<u8> = (0..40).map(|_| b"ACGT"[rng.gen_range(0..4)]).collect();
        let mut text = vec![];
        for _ in 0..8 {
            let mut copy = unit.clone();
            let site = rng.gen_range(0..copy.len());
            copy[site] = b"ACGT"[rng.gen_range(0..4)];
            text.extend_from_slice(&copy);
        }
        let (_dir, reference, index) = build(&text);
        for _ in 0..50 {
            let m = rng.gen_range(1..=64);
            let pattern: Vec<u8> = (0..m).map(|_| b"ACGTN"[rng.gen_range(0..5)]).collect();
            verify_query(&reference, &index, &pattern);
        }
        assert!(index.num_runs() < index.len(), "round {round}");
    }
}

#[test]
fn degenerate_texts() {
    for text in [&b"AAAAAAAA"[..], &b"ABABABABAB"[..], &b"A"[..]] {
        let (_dir, reference, index) = build(text);
        let mut rng = ChaChaRng::seed_from_u64(44);
        for _ in 0..30 {
            let m = rng.gen_range(1..=16);
            let pattern: Vec<u8> = (0..m).map(|_| b"AB"[rng.gen_range(0..2)]).collect();
            verify_query(&reference, &index, &pattern);
        }
    }
}

#[test]
fn queries_deterministic_across_builds() {
    let dir = tempfile::tempdir().unwrap();
    let reference = Reference::new(b"GATTAGATACAT");
    let prefix = reference.write_artifacts(dir.path(), "t");
    let first: MsIndex = MsIndex::from_files(&prefix).unwrap();
    let second: MsIndex = MsIndex::from_files(&prefix).unwrap();
    assert_eq!(first, second);
    for pattern in [&b"GATTACA"[..], b"TTT", b"ACATACAT"] {
        assert_eq!(first.query(pattern), second.query(pattern));
    }
}

#[test]
fn dense_variant_agrees_with_sparse() {
    let dir = tempfile::tempdir().unwrap();
    let reference = Reference::new(b"GATTAGATACAT");
    let prefix = reference.write_artifacts(dir.path(), "t");
    let sparse: MsIndex<SdVector> = MsIndex::from_files(&prefix).unwrap();
    let dense: MsIndex<DenseVector> = MsIndex::from_files(&prefix).unwrap();
    let mut rng = ChaChaRng::seed_from_u64(45);
    for _ in 0..50 {
        let m = rng.gen_range(1..=32);
        let pattern: Vec<u8> = (0..m).map(|_| b"ACGT"[rng.gen_range(0..4)]).collect();
        assert_eq!(sparse.query(&pattern), dense.query(&pattern));
    }
}

#[test]
fn block_parameter_is_query_transparent() {
    let dir = tempfile::tempdir().unwrap();
    let reference = Reference::new(b"GATTAGATACAT");
    let prefix = reference.write_artifacts(dir.path(), "t");
    let default: MsIndex = MsIndex::from_files(&prefix).unwrap();
    for block in [1, 3, 8] {
        let other: MsIndex = MsIndex::from_files_with_block(&prefix, block).unwrap();
        for pattern in [&b"GATTACA"[..], b"CAT", b"AGATAG"] {
            assert_eq!(default.query(pattern), other.query(pattern));
        }
    }
}

#[test]
fn run_length_encoded_input_matches_raw() {
    let dir = tempfile::tempdir().unwrap();
    let reference = Reference::new(b"GATTAGATACAT");
    let prefix = reference.write_artifacts(dir.path(), "t");
    let (heads_path, lens_path) = reference.write_runs(dir.path(), "t");

    let index: MsIndex = MsIndex::from_files(&prefix).unwrap();
    let mut heads = std::fs::File::open(heads_path).unwrap();
    let mut lengths = std::fs::File::open(lens_path).unwrap();
    let from_runs: RleBwt = RleBwt::from_runs(&mut heads, &mut lengths, 2).unwrap();
    assert_eq!(index.bwt(), &from_runs);
}

#[test]
fn marker_seam_builds_either_variant() {
    // The construction trait alone suffices to build both variants.
    fn roundtrip<V: MarkerBits>(bits: &[bool]) -> usize {
        use matchstats::bit_vectors::NumBits;
        V::from_bits(bits.iter().copied()).num_ones()
    }
    let bits = [true, false, true, true, false];
    assert_eq!(roundtrip::<SdVector>(&bits), 3);
    assert_eq!(roundtrip::<DenseVector>(&bits), 3);
}

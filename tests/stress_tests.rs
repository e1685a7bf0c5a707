//! Stress tests comparing the aggregator against a brute-force model.

use rangedel::{
    FileMetadata, InternalKey, InternalKeyComparator, RangeDelAggregator, RangeTombstone,
    VecIterator, VecTableBuilder,
};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tracing_subscriber::EnvFilter;

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

fn key(i: u64) -> String {
    format!("key{:04}", i)
}

fn random_tombstones(
    rng: &mut StdRng,
    count: usize,
    key_space: u64,
    max_seq: u64,
) -> Vec<RangeTombstone> {
    (0..count)
        .map(|_| {
            let start = rng.gen_range(0..key_space - 1);
            let len = rng.gen_range(1..=key_space / 8);
            let end = (start + len).min(key_space);
            RangeTombstone::new(key(start), key(end), rng.gen_range(1..=max_seq))
        })
        .collect()
}

/// Brute-force answer: deleted iff some tombstone in the same stripe covers
/// the key with a greater sequence number.
fn model_should_delete(
    tombstones: &[RangeTombstone],
    snapshots: &[u64],
    user_key: &[u8],
    seq: u64,
) -> bool {
    let stripe = |s: u64| snapshots.iter().filter(|&&snap| snap < s).count();
    tombstones.iter().any(|t| {
        stripe(t.sequence) == stripe(seq)
            && t.start_key.as_ref() <= user_key
            && user_key < t.end_key.as_ref()
            && t.sequence > seq
    })
}

/// Test coverage queries against the model over many random tombstones.
#[test]
fn stress_should_delete_matches_model() {
    init_tracing();
    let mut rng = StdRng::seed_from_u64(0x5eed);
    let snapshots = [100, 250, 400];
    let key_space = 500;

    let mut tombstones = random_tombstones(&mut rng, 2000, key_space, 500);
    let mut agg = RangeDelAggregator::new(InternalKeyComparator::default(), &snapshots);

    // Ingest in several sorted batches
    for batch in tombstones.chunks_mut(250) {
        batch.sort_by(|a, b| {
            a.start_key
                .cmp(&b.start_key)
                .then_with(|| b.sequence.cmp(&a.sequence))
        });
        agg.add_tombstones(VecIterator::from_tombstones(batch.iter()))
            .unwrap();
    }
    assert_eq!(agg.num_tombstones(), 2000);

    for _ in 0..5000 {
        let user_key = key(rng.gen_range(0..key_space));
        let seq = rng.gen_range(0..520);
        let expected = model_should_delete(&tombstones, &snapshots, user_key.as_bytes(), seq);
        let actual = agg.should_delete(&InternalKey::for_value(user_key.clone(), seq).as_parsed());
        assert_eq!(actual, expected, "key {} at sequence {}", user_key, seq);
    }
}

/// Test that emission writes every overlapping tombstone in sorted order.
#[test]
fn stress_emission_sorted_and_complete() {
    init_tracing();
    let mut rng = StdRng::seed_from_u64(42);
    let snapshots = [50, 150];
    let tombstones = random_tombstones(&mut rng, 1000, 300, 200);

    let mut agg = RangeDelAggregator::new(InternalKeyComparator::default(), &snapshots);
    for t in &tombstones {
        agg.add_tombstones(VecIterator::from_tombstones([t])).unwrap();
    }

    let lower = key(100);
    let upper = key(200);
    let mut builder = VecTableBuilder::default();
    let mut meta = FileMetadata::empty(7);
    agg.add_to_builder(
        &mut builder,
        Some(lower.as_bytes()),
        Some(upper.as_bytes()),
        &mut meta,
        false,
    )
    .unwrap();

    let mut expected: Vec<(Vec<u8>, u64)> = tombstones
        .iter()
        .filter(|t| t.start_key.as_ref() < upper.as_bytes() && t.end_key.as_ref() > lower.as_bytes())
        .map(|t| (t.start_key.to_vec(), t.sequence))
        .collect();
    expected.sort_by(|a, b| a.0.cmp(&b.0).then_with(|| b.1.cmp(&a.1)));
    expected.dedup();

    // VecTableBuilder rejects unordered keys, so success implies sorted output
    let written: Vec<(Vec<u8>, u64)> = builder
        .entries()
        .iter()
        .map(|(k, _)| {
            let key = InternalKey::decode(k).unwrap();
            (key.user_key().to_vec(), key.sequence())
        })
        .collect();
    assert_eq!(written, expected);

    if !written.is_empty() {
        assert!(meta.smallest().unwrap().user_key() >= lower.as_bytes());
        assert!(meta.largest().unwrap().user_key() <= upper.as_bytes());
    }
}

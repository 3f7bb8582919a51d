//! Property-based tests for identifier spaces and minting.
//!
//! These tests use proptest to verify invariants hold across
//! randomly generated configurations.

use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;

use proptest::prelude::*;
use rand::SeedableRng;
use rand::rngs::StdRng;

use pid_minter::config::MinterConfig;
use pid_minter::domain::{Identifier, MintConfiguration, SpaceModel, compare_names};
use pid_minter::error::AppError;
use pid_minter::service::{Allocator, CollisionGate, PrefetchCache};
use pid_minter::storage::MemoryStorage;
use pid_minter::storage::traits::IdentifierStore;

/// Strategy for generating char map codes.
fn class_code() -> impl Strategy<Value = char> {
    prop::sample::select(vec!['d', 'l', 'u', 'm', 'e'])
}

/// Strategy for generating char maps of `len` positions.
fn char_map(len: std::ops::Range<usize>) -> impl Strategy<Value = String> {
    prop::collection::vec(class_code(), len).prop_map(|codes| codes.into_iter().collect())
}

fn space(char_map: &str, sans_vowel: bool) -> SpaceModel {
    MintConfiguration::custom("", char_map)
        .with_sans_vowel(sans_vowel)
        .fingerprint()
        .unwrap()
        .space()
}

fn block_on<F: std::future::Future>(future: F) -> F::Output {
    tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .unwrap()
        .block_on(future)
}

fn allocator(storage: Arc<MemoryStorage>, prefetch_size: usize, seed: u64) -> Allocator {
    Allocator::new(
        storage,
        MinterConfig {
            prefetch_size,
            prefetch_threshold: prefetch_size / 2,
            seed: Some(seed),
            ..MinterConfig::default()
        },
    )
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    /// The total is the product of the per-position alphabet sizes.
    #[test]
    fn total_is_product_of_alphabets(map in char_map(1..8), sans_vowel in any::<bool>()) {
        let model = space(&map, sans_vowel);
        let expected = model
            .alphabets()
            .positions()
            .map(|alphabet| alphabet.len() as u128)
            .product::<u128>();
        prop_assert_eq!(u128::from(model.total_permutations()), expected);
    }

    /// Incrementing `total` times from zero returns to zero, wrapping only on
    /// the last step and visiting every slot once.
    #[test]
    fn increment_cycle_law(map in char_map(1..3), sans_vowel in any::<bool>()) {
        let model = space(&map, sans_vowel);
        let total = model.total_permutations();
        let mut indices = vec![0; map.len()];
        let mut seen = HashSet::new();

        for step in 1..=total {
            prop_assert!(seen.insert(model.render(&indices)));
            let wrapped = model.increment(&mut indices);
            prop_assert_eq!(wrapped, step == total);
        }
        prop_assert!(indices.iter().all(|&index| index == 0));
    }

    /// Name order agrees with slot order.
    #[test]
    fn ordering_follows_offsets(map in char_map(1..7), a in any::<u64>(), b in any::<u64>()) {
        let model = space(&map, true);
        let total = model.total_permutations();
        let (a, b) = (a % total, b % total);
        prop_assume!(a != b);

        let (low, high) = (a.min(b), a.max(b));
        let low_name = model.identifier_at(low);
        let high_name = model.identifier_at(high);
        prop_assert!(compare_names(low_name.name(), high_name.name()).is_lt());
        prop_assert_eq!(model.offset_of(low_name.indices()), low);
    }

    /// A sequential mint returns exactly N strictly increasing identifiers,
    /// and consecutive mints continue where the last stopped.
    #[test]
    fn sequential_mints_are_dense_and_increasing(
        map in char_map(1..4),
        amounts in prop::collection::vec(0u64..40, 1..5),
        prefetch in 0usize..30,
    ) {
        let config = MintConfiguration::custom("p", &map);
        let total = config.fingerprint().unwrap().space().total_permutations();
        let allocator = allocator(Arc::new(MemoryStorage::new()), prefetch, 0);

        let minted: Vec<Identifier> = block_on(async {
            let mut minted = Vec::new();
            for amount in &amounts {
                match allocator.mint(&config, *amount).await {
                    Ok(batch) => {
                        assert_eq!(batch.len() as u64, *amount);
                        minted.extend(batch);
                    }
                    Err(AppError::CapacityExceeded { remaining, requested }) => {
                        assert_eq!(requested, *amount);
                        assert_eq!(remaining, total - minted.len() as u64);
                    }
                    Err(e) => panic!("unexpected error: {e}"),
                }
            }
            minted
        });

        prop_assert!(minted.windows(2).all(|w| compare_names(w[0].name(), w[1].name()).is_lt()));
        let model = space(&map, true);
        for (offset, identifier) in minted.iter().enumerate() {
            prop_assert_eq!(model.offset_of(identifier.indices()), offset as u64);
        }
    }

    /// Random mints are unique within and across batches and never return an
    /// identifier that was already in the store.
    #[test]
    fn random_mints_are_unique(
        seed in any::<u64>(),
        preissued in prop::collection::hash_set(0u64..100, 0..50),
        amount in 1u64..20,
    ) {
        let config = MintConfiguration::custom("", "dd").with_random(true);
        let model = config.fingerprint().unwrap().space();
        let storage = Arc::new(MemoryStorage::new());
        let taken: Vec<Identifier> = preissued.iter().map(|&offset| model.identifier_at(offset)).collect();
        let taken_names: HashSet<String> = taken.iter().map(|id| id.name().to_string()).collect();

        let minted = block_on(async {
            storage.save_all(&taken).await.unwrap();
            let allocator = allocator(Arc::clone(&storage), 10, seed);
            let mut minted = Vec::new();
            for _ in 0..2 {
                minted.extend(allocator.mint(&config, amount).await.unwrap());
            }
            minted
        });

        let names: HashSet<&str> = minted.iter().map(Identifier::name).collect();
        prop_assert_eq!(names.len(), minted.len());
        prop_assert!(names.iter().all(|name| !taken_names.contains(*name)));
    }

    /// Peek is idempotent, collect removes min(n, len), and the two agree.
    #[test]
    fn peek_and_collect_agree(target in 0usize..40, n in 0usize..50, random in any::<bool>()) {
        let fingerprint = MintConfiguration::custom("", "dl")
            .with_random(random)
            .fingerprint()
            .unwrap();
        let gate = CollisionGate::new(Arc::new(MemoryStorage::new()), Duration::from_secs(1));
        let mut cache = PrefetchCache::new();
        let mut rng = StdRng::seed_from_u64(3);

        block_on(cache.refill(&fingerprint, target, 0, &gate, &mut rng)).unwrap();
        let len = cache.len();
        prop_assert_eq!(len, target);

        let first: Vec<Identifier> = cache.peek(n).cloned().collect();
        let second: Vec<Identifier> = cache.peek(n).cloned().collect();
        prop_assert_eq!(&first, &second);
        prop_assert_eq!(cache.len(), len);

        let collected = cache.collect(n);
        prop_assert_eq!(collected.len(), n.min(len));
        prop_assert_eq!(&collected, &first);
        prop_assert_eq!(cache.len(), len - n.min(len));
    }
}

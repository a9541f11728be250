//! Integration tests for transforming and combining arbitraries.

use std::collections::HashSet;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use probity::{
    Arbitrary, GenerationError, RandomGenerator, ShrinkEngine, Shrinkable, booleans, combine_all,
    combine2, combine3, create_seeded_rng, frequency, integers, just, of, one_of,
};
use rand::Rng;

#[test]
fn test_filter_gives_up_after_exactly_max_misses() {
    let attempts = Arc::new(AtomicUsize::new(0));
    let counter = Arc::clone(&attempts);
    let source = RandomGenerator::new(move |rng| {
        counter.fetch_add(1, Ordering::SeqCst);
        Ok(Shrinkable::unshrinkable(rng.gen_range(0..100i32)))
    });
    let impossible = source.filter(|n: &i32| *n < 0, 5);

    let mut rng = create_seeded_rng(1);
    let error = impossible.next(&mut rng).unwrap_err();
    assert_eq!(attempts.load(Ordering::SeqCst), 5);
    match error {
        GenerationError::TooManyFilterMisses {
            misses, max_misses, ..
        } => {
            assert_eq!(misses, 5);
            assert_eq!(max_misses, 5);
        }
        other => panic!("unexpected error {other:?}"),
    }
}

#[test]
fn test_filtered_values_satisfy_predicate() {
    let even = integers::<i32>().between(-1000, 1000).filter(|n| n % 2 == 0);
    let generator = even.generator(1000);
    let mut rng = create_seeded_rng(2);
    for _ in 0..200 {
        let shrinkable = generator.next(&mut rng).unwrap();
        assert_eq!(shrinkable.value() % 2, 0);
        assert!(shrinkable.shrink().all(|candidate| candidate.value() % 2 == 0));
    }
}

#[test]
fn test_filter_errors_name_the_filter() {
    let error = integers::<u8>()
        .filter_with_max_misses(3, |_| false)
        .sample()
        .unwrap_err();
    assert!(error.to_string().contains("rejected 3 values"), "{error}");
}

#[test]
fn test_combination_filter_is_unsatisfiable() {
    let impossible = combine2(integers::<i32>().between(0, 9), integers::<i32>().between(0, 9))
        .filter_with_max_misses(50, |(a, b)| a + b > 100)
        .as_tuple();
    let error = impossible.sample().unwrap_err();
    assert!(matches!(
        error,
        GenerationError::UnsatisfiableCombination {
            misses: 50,
            max_misses: 50
        }
    ));
}

#[test]
fn test_combine_maps_independent_draws() {
    let sums = combine3(
        integers::<i32>().between(0, 10),
        integers::<i32>().between(100, 110),
        just(1000),
    )
    .map(|(a, b, c)| a + b + c);
    let generator = sums.generator(1000);
    let mut rng = create_seeded_rng(3);
    for _ in 0..100 {
        let sum = generator.next(&mut rng).unwrap().value();
        assert!((1100..=1120).contains(&sum));
    }
}

#[test]
fn test_flat_map_draws_dependent_values() {
    let sized = integers::<usize>()
        .between(1, 5)
        .flat_map(|size| booleans().list().of_size(size));
    let generator = sized.generator(1000);
    let mut rng = create_seeded_rng(4);
    let sizes: HashSet<usize> = (0..200).map(|_| generator.next(&mut rng).unwrap().value().len()).collect();
    assert_eq!(sizes, (1..=5).collect());
    assert!(sized.edge_cases(1000).is_empty());
}

#[test]
fn test_flat_map_shrinks_through_both_levels() {
    let sized = integers::<usize>()
        .between(1, 10)
        .flat_map(|size| integers::<u32>().between(0, 100).list().of_max_size(size));
    let generator = sized.generator(1000);
    let mut rng = create_seeded_rng(5);
    let shrinkable = std::iter::repeat_with(|| generator.next(&mut rng).unwrap())
        .find(|s| s.value().iter().any(|n| *n > 20))
        .unwrap();

    let result = ShrinkEngine::new().shrink(shrinkable, |values| values.iter().any(|n| *n > 20));
    assert_eq!(result.minimal, vec![21]);
}

#[test]
fn test_one_of_and_frequency() {
    let mixed = one_of(vec![
        just(-1).boxed(),
        integers::<i32>().between(10, 20).boxed(),
    ]);
    let generator = mixed.generator(1000);
    let mut rng = create_seeded_rng(6);
    let values: Vec<i32> = (0..200).map(|_| generator.next(&mut rng).unwrap().value()).collect();
    assert!(values.iter().all(|n| *n == -1 || (10..=20).contains(n)));
    assert!(values.contains(&-1));
    assert!(values.iter().any(|n| *n >= 10));

    let weighted = frequency(vec![(1, 'a'), (0, 'b'), (9, 'c')]);
    let generator = weighted.generator(1000);
    let drawn: Vec<char> = (0..1000).map(|_| generator.next(&mut rng).unwrap().value()).collect();
    assert!(!drawn.contains(&'b'));
    let a_count = drawn.iter().filter(|c| **c == 'a').count();
    assert!((30..200).contains(&a_count), "{a_count} times 'a'");
}

#[test]
fn test_combine_all_of_same_type() {
    let combined = combine_all(vec![
        of(vec![1, 2]).boxed(),
        of(vec![10, 20]).boxed(),
        just(100).boxed(),
    ])
    .as_tuple();
    let all: Vec<Vec<i32>> = combined.exhaustive(100).unwrap().iter().collect();
    assert_eq!(all.len(), 4);
    assert_eq!(all[0], vec![1, 10, 100]);

    let sums = combine_all(vec![of(vec![1, 2]).boxed(), of(vec![10, 20]).boxed()]).map(|values| values.iter().sum::<i32>());
    assert_eq!(sums.exhaustive(100).unwrap().iter().collect::<Vec<_>>(), vec![11, 21, 12, 22]);
}

#[test]
fn test_unique_lists_and_sets() {
    let unique = integers::<u8>().between(0, 20).list().of_size(10).unique_elements();
    let sets = integers::<u8>().between(0, 20).set().of_min_size(3).of_max_size(10);
    let unique_generator = unique.generator(1000);
    let set_generator = sets.generator(1000);
    let mut rng = create_seeded_rng(7);
    for _ in 0..50 {
        let values = unique_generator.next(&mut rng).unwrap().value();
        assert_eq!(values.iter().collect::<HashSet<_>>().len(), 10);
        assert!(set_generator.next(&mut rng).unwrap().value().len() >= 3);
    }
}

#[test]
fn test_collect_grows_until_condition() {
    let collected = integers::<u32>().between(1, 10).collect(|values| values.iter().sum::<u32>() >= 20);
    let generator = collected.generator(1000);
    let mut rng = create_seeded_rng(8);
    for _ in 0..50 {
        let values = generator.next(&mut rng).unwrap().value();
        let sum: u32 = values.iter().sum();
        assert!(sum >= 20);
        assert!(sum - values[values.len() - 1] < 20);
    }
}

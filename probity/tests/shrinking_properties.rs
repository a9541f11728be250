//! Integration tests for shrinking: distance ordering, termination and the
//! greedy search driven through the public API.

use probity::{
    Arbitrary, ShrinkConfig, ShrinkEngine, Shrinkable, TestConfig, Value, check_with_config,
    combine2, create_seeded_rng, integers, strings,
};
use rand::Rng;
use rand::rngs::StdRng;

fn draw<A: Arbitrary>(arbitrary: &A, rng: &mut StdRng) -> Shrinkable<A::Value> {
    arbitrary.generator(1000).next(rng).unwrap()
}

fn assert_candidates_are_simpler<T: Value>(shrinkable: &Shrinkable<T>) {
    let value = shrinkable.value();
    let distance = shrinkable.distance();
    for candidate in shrinkable.shrink().take(500) {
        assert!(
            candidate.distance() <= distance,
            "candidate {:?} ({}) is further away than {:?} ({})",
            candidate.value(),
            candidate.distance(),
            value,
            distance
        );
        assert_ne!(candidate.value(), value, "{value:?} shrinks to itself");
    }
}

#[test]
fn test_candidates_never_increase_distance() {
    let mut rng = create_seeded_rng(1);
    let numbers = integers::<i64>().between(-10_000, 10_000);
    let lists = integers::<i32>().between(-50, 50).list().of_max_size(8);
    let pairs = combine2(integers::<u16>(), integers::<i8>()).as_tuple();
    let words = strings().alpha().of_max_length(6);

    for _ in 0..50 {
        assert_candidates_are_simpler(&draw(&numbers, &mut rng));
        assert_candidates_are_simpler(&draw(&lists, &mut rng));
        assert_candidates_are_simpler(&draw(&pairs, &mut rng));
        assert_candidates_are_simpler(&draw(&words, &mut rng));
    }
}

#[test]
fn test_minimal_components_keep_combined_distance_order() {
    let mut rng = create_seeded_rng(1);
    let optional_first = combine2(
        integers::<i32>().between(1, 1000).inject_null(0.0),
        integers::<i32>().between(500, 1000),
    )
    .as_tuple();
    let optionals_in_list = combine2(
        integers::<u8>().between(1, 50).inject_null(0.3).list().of_max_size(4),
        integers::<i32>().between(500, 1000),
    )
    .as_tuple();
    let nested_lists = combine2(
        integers::<u8>().between(0, 9).list().of_max_size(3).list().of_max_size(3),
        integers::<u16>().between(100, 200),
    )
    .as_tuple();

    for _ in 0..50 {
        assert_candidates_are_simpler(&draw(&optional_first, &mut rng));
        assert_candidates_are_simpler(&draw(&optionals_in_list, &mut rng));
        assert_candidates_are_simpler(&draw(&nested_lists, &mut rng));
    }

    let pair = draw(&optional_first, &mut create_seeded_rng(1));
    let none_first = pair
        .shrink()
        .find(|candidate| candidate.value().0.is_none())
        .expect("the optional component shrinks to None");
    assert!(none_first.distance() < pair.distance());
}

/// Follows randomly chosen candidates until a shrinkable without candidates
/// is reached, returning the number of steps taken.
fn random_walk<T: Value>(mut current: Shrinkable<T>, rng: &mut StdRng, max_steps: usize) -> Option<usize> {
    for step in 0..max_steps {
        let candidates: Vec<_> = current.shrink().collect();
        if candidates.is_empty() {
            return Some(step);
        }
        current = candidates[rng.gen_range(0..candidates.len())].clone();
    }
    None
}

#[test]
fn test_any_shrink_path_terminates() {
    let mut rng = create_seeded_rng(2);
    let numbers = integers::<i32>().between(-500, 500);
    for _ in 0..20 {
        let shrinkable = draw(&numbers, &mut rng);
        let bound = shrinkable.value().unsigned_abs() as usize;
        let steps = random_walk(shrinkable, &mut rng, 10_000).expect("integer shrinking terminates");
        assert!(steps <= bound);
    }

    let lists = integers::<u8>().between(0, 20).list().of_max_size(5);
    for _ in 0..20 {
        let shrinkable = draw(&lists, &mut rng);
        assert!(random_walk(shrinkable, &mut rng, 100_000).is_some());
    }
}

#[test]
fn test_map_commutes_with_value() {
    let mut rng = create_seeded_rng(3);
    let shrinkable = draw(&integers::<i32>().between(-100, 100), &mut rng);
    let f = |n: i32| n * 2;
    let g = |n: i32| format!("<{n}>");

    let mapped = shrinkable.map(f).map(g);
    let composed = shrinkable.map(move |n| g(f(n)));
    assert_eq!(mapped.value(), g(f(shrinkable.value())));
    assert_eq!(mapped.value(), composed.value());

    let mapped_candidates: Vec<String> = mapped.shrink().map(|s| s.value()).collect();
    let composed_candidates: Vec<String> = composed.shrink().map(|s| s.value()).collect();
    assert_eq!(mapped_candidates, composed_candidates);
}

#[test]
fn test_shrinking_stops_just_outside_accepted_range() {
    let in_range = |n: &i32| (-10..=10).contains(n);

    for seed in 0..10 {
        let config = TestConfig::default().with_seed(seed).with_tries(100);
        let failure = check_with_config(integers::<i32>().between(-1000, 1000), in_range, config)
            .expect_err("values outside [-10, 10] are generated");
        let minimal = *failure.minimal_input().unwrap();
        assert!(minimal == 11 || minimal == -11, "shrunk to {minimal}");
        assert!(failure.shrinking_completed);
    }
}

#[test]
fn test_independent_component_stays_fixed() {
    let mut rng = create_seeded_rng(4);
    let pairs = combine2(integers::<i32>().between(-1000, 1000), integers::<i32>().between(0, 1000)).as_tuple();
    let shrinkable = std::iter::repeat_with(|| draw(&pairs, &mut rng))
        .find(|s| {
            let (a, b) = s.value();
            a.abs() > 10 && b > 0
        })
        .unwrap();
    let (_, fixed) = shrinkable.value();

    let result = ShrinkEngine::new().shrink(shrinkable, |(a, b)| a.abs() > 10 && *b == fixed);
    assert_eq!(result.minimal.0.abs(), 11);
    assert_eq!(result.minimal.1, fixed);
}

#[test]
fn test_shrinking_respects_step_limit() {
    let mut rng = create_seeded_rng(5);
    let lists = integers::<i32>().list().of_min_size(50).of_max_size(60);
    let shrinkable = draw(&lists, &mut rng);

    let engine = ShrinkEngine::with_config(ShrinkConfig::with_max_steps(2));
    let result = engine.shrink(shrinkable, |values| !values.is_empty());
    assert_eq!(result.shrink_steps, 2);
    assert!(!result.completed);
    assert_eq!(result.minimal.len(), 50);
}

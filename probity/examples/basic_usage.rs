//! Basic usage examples demonstrating the core Probity API
//!
//! Shows arbitraries, property runs, shrinking and configuration.

use probity::{
    Arbitrary, EdgeCasesMode, PropertyTestBuilder, TestConfig, check,
    check_with_config, combine2, integers, of, strings,
};

// Example 1: Simple property over pairs
fn example_1_basic_property() {
    println!("=== Example 1: Basic Property Testing ===");

    let pairs = combine2(integers::<i32>().between(-100, 100), integers::<i32>().between(-100, 100)).as_tuple();
    match check(pairs, |(a, b): &(i32, i32)| a.wrapping_add(*b) == b.wrapping_add(*a)) {
        Ok(success) => println!("✓ Commutative property passed! ({} tries)", success.tries),
        Err(failure) => println!("✗ Property failed: {}", failure),
    }
}

// Example 2: A failing property is shrunk to a minimal value
fn example_2_shrinking() {
    println!("\n=== Example 2: Shrinking ===");

    let config = TestConfig::default().with_seed(42);
    let result = check_with_config(
        integers::<u32>().list(),
        |values: &Vec<u32>| values.iter().all(|n| *n < 1000),
        config,
    );
    if let Err(failure) = result {
        println!("{}", failure.detailed_report());
    }
}

// Example 3: Properties reporting their own errors
fn example_3_result_properties() {
    println!("\n=== Example 3: Result Properties ===");

    let words = strings().alpha().of_max_length(12);
    let result = PropertyTestBuilder::new()
        .tries(200)
        .edge_cases_mode(EdgeCasesMode::Mixin)
        .run(words, |word: &String| {
            if word.len() < 10 {
                Ok(())
            } else {
                Err(format!("{word:?} is too long"))
            }
        });
    match result {
        Ok(success) => println!("✓ {} tries", success.tries),
        Err(failure) => println!("✗ {} ({})", failure, failure.error),
    }
}

// Example 4: Small domains are enumerated instead of sampled
fn example_4_exhaustive() {
    println!("\n=== Example 4: Exhaustive Generation ===");

    let suits = of(vec!['♠', '♥', '♦', '♣']);
    let ranks = integers::<u8>().between(1, 13);
    let cards = combine2(suits, ranks).as_tuple();
    match check(cards, |(_, rank): &(char, u8)| (1..=13).contains(rank)) {
        Ok(success) => println!(
            "✓ Checked all {} cards (exhaustive: {})",
            success.tries, success.exhaustive
        ),
        Err(failure) => println!("✗ {}", failure),
    }
}

fn main() {
    example_1_basic_property();
    example_2_shrinking();
    example_3_result_properties();
    example_4_exhaustive();
}

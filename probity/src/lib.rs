#![allow(clippy::result_large_err)]
#![allow(clippy::type_complexity)]

//! # Probity - Property-Based Testing for Rust
//!
//! Probity generates values from composable [`Arbitrary`] descriptions, runs
//! properties against them and shrinks falsifying values to a minimal
//! example. Every generated value carries its own shrink candidates and a
//! [`ShrinkingDistance`] that orders candidates from simpler to more complex.
//!
//! Small domains are enumerated exhaustively instead of sampled, and
//! arbitraries contribute edge cases (bounds, zero, empty collections) that
//! are tried before random values.
//!
//! ## Quick Start
//!
//! ```rust
//! use probity::{Arbitrary, check_with_config, integers, TestConfig};
//!
//! let config = TestConfig::default().with_seed(42).with_tries(100);
//! let result = check_with_config(
//!     integers::<i32>().between(-1000, 1000),
//!     |n: &i32| (-10..=10).contains(n),
//!     config,
//! );
//!
//! let failure = result.unwrap_err();
//! assert_eq!(failure.minimal_input().map(|n| n.abs()), Some(11));
//! ```
//!
//! ## Combining arbitraries
//!
//! ```rust
//! use probity::{Arbitrary, combine2, integers, strings};
//!
//! let labels = combine2(integers::<u8>().between(1, 9), strings().alpha().of_max_length(5))
//!     .map(|(n, s)| format!("{n}:{s}"));
//! let label = labels.sample().unwrap();
//! assert!(label.contains(':'));
//! ```

pub mod arbitraries;
pub mod arbitrary;
pub mod collections;
pub mod combinators;
pub mod config;
pub mod distance;
pub mod edge_cases;
pub mod error;
pub mod execution;
pub mod exhaustive;
pub mod generator;
pub mod rng;
pub mod shrink;
pub mod shrinkable;
pub mod transform;

// Re-export the main public API
pub use arbitraries::{
    CharArbitrary, Integral, IntegralArbitrary, IntegralShrinkable, StringArbitrary, booleans,
    chars, create, frequency, frequency_of, integers, just, lazy, of, one_of, shuffle, strings,
};
pub use arbitrary::{Arbitrary, BoxedArbitrary, DEFAULT_MAX_MISSES, SampleStream, current_max_misses};
pub use collections::{ArrayArbitrary, IterArbitrary, ListArbitrary, SetArbitrary, ValueIter};
pub use combinators::{Combinator, combine_all, combine2, combine3, combine4, combine5};
pub use config::{
    ConfigError, ConfigManager, EdgeCasesMode, GenerationConfig, GenerationMode, GlobalConfig,
    TestConfig, create_test_config, get_global_config, set_global_config,
};
pub use distance::ShrinkingDistance;
pub use edge_cases::{EdgeCases, EdgeCasesConfig};
pub use error::{GenerationError, PropertyError, PropertyResult, TestFailure, TestSuccess};
pub use execution::{
    ParallelConfig, Property, PropertyTest, PropertyTestBuilder, Verdict, check, check_parallel,
    check_with_config,
};
pub use exhaustive::ExhaustiveGenerator;
pub use generator::RandomGenerator;
pub use rng::{create_seeded_rng, random_seed};
pub use shrink::{ShrinkConfig, ShrinkEngine, ShrinkResult};
pub use shrinkable::{ShrinkStream, Shrinkable, ShrinkableNode, Value};

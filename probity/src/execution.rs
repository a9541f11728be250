//! Property test execution: drawing values, evaluating the property and
//! shrinking falsifying values.

use std::any::Any;
use std::fmt::Display;
use std::panic::{AssertUnwindSafe, catch_unwind};
use std::time::{Duration, Instant};

use rand::RngCore;
use tracing::{info, warn};

use crate::arbitrary::{Arbitrary, with_max_misses};
use crate::config::{EdgeCasesMode, GenerationMode, TestConfig, create_test_config};
use crate::error::{GenerationError, PropertyError, PropertyResult, TestFailure, TestSuccess};
use crate::exhaustive::ExhaustiveGenerator;
use crate::rng::{create_seeded_rng, random_seed, with_bound_rng};
use crate::shrink::{ShrinkConfig, ShrinkEngine};
use crate::shrinkable::Value;

/// What a property returns: `bool`, `()`, or `Result<(), E>`.
pub trait Verdict {
    fn into_result(self) -> Result<(), PropertyError>;
}

impl Verdict for bool {
    fn into_result(self) -> Result<(), PropertyError> {
        if self {
            Ok(())
        } else {
            Err(PropertyError::property_failed("property returned false"))
        }
    }
}

impl Verdict for () {
    fn into_result(self) -> Result<(), PropertyError> {
        Ok(())
    }
}

impl<E: Display> Verdict for Result<(), E> {
    fn into_result(self) -> Result<(), PropertyError> {
        self.map_err(|error| PropertyError::property_failed(error.to_string()))
    }
}

/// Property definition trait
pub trait Property<T>: Send + Sync {
    /// Test the property with the given input
    fn test(&self, input: &T) -> Result<(), PropertyError>;
}

impl<T, F, R> Property<T> for F
where
    F: Fn(&T) -> R + Send + Sync,
    R: Verdict,
{
    fn test(&self, input: &T) -> Result<(), PropertyError> {
        self(input).into_result()
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        message.to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "unknown panic payload".to_string()
    }
}

/// Evaluates `property`, turning panics into failures.
fn evaluate<T, P: Property<T>>(property: &P, input: &T) -> Result<(), PropertyError> {
    match catch_unwind(AssertUnwindSafe(|| property.test(input))) {
        Ok(result) => result,
        Err(payload) => Err(PropertyError::property_failed(format!(
            "property panicked: {}",
            panic_message(payload.as_ref())
        ))),
    }
}

/// Evaluates `property` with a source seeded by `seed` bound for
/// [`Arbitrary::sample`].
fn evaluate_seeded<T, P: Property<T>>(property: &P, input: &T, seed: u64) -> Result<(), PropertyError> {
    let mut rng = create_seeded_rng(seed);
    with_bound_rng(&mut rng, || evaluate(property, input))
}

/// Core property test execution struct
pub struct PropertyTest<A, P> {
    arbitrary: A,
    property: P,
    config: TestConfig,
}

impl<A, P> PropertyTest<A, P>
where
    A: Arbitrary,
    P: Property<A::Value>,
{
    pub fn new(arbitrary: A, property: P, config: TestConfig) -> Self {
        Self {
            arbitrary,
            property,
            config,
        }
    }

    /// Execute the property test
    pub fn run(self) -> PropertyResult<A::Value> {
        execute(&self.arbitrary, &self.property, self.config)
    }
}

fn execute<A, P>(arbitrary: &A, property: &P, config: TestConfig) -> PropertyResult<A::Value>
where
    A: Arbitrary,
    P: Property<A::Value>,
{
    let test_start = Instant::now();
    if let Err(error) = config.validate() {
        return Err(TestFailure::without_input(
            error.into(),
            config,
            None,
            0,
            test_start.elapsed(),
        ));
    }

    // Filters without their own budget pick up the run's when their
    // generators are built, including generators built during shrinking.
    let max_misses = config.generation.max_misses;
    with_max_misses(max_misses, || match exhaustive_generator(arbitrary, &config) {
        Ok(Some(exhaustive)) => run_exhaustive(exhaustive, property, config, test_start),
        Ok(None) => run_randomized(arbitrary, property, config, test_start),
        Err(error) => Err(TestFailure::without_input(
            error.into(),
            config,
            None,
            0,
            test_start.elapsed(),
        )),
    })
}

fn exhaustive_generator<A: Arbitrary>(
    arbitrary: &A,
    config: &TestConfig,
) -> Result<Option<ExhaustiveGenerator<A::Value>>, GenerationError> {
    match config.generation_mode {
        GenerationMode::Randomized => Ok(None),
        // Enumerate instead of sampling when there are no more values than tries.
        GenerationMode::Auto => Ok(arbitrary.exhaustive(config.tries as u64)),
        GenerationMode::Exhaustive => arbitrary
            .exhaustive(config.generation.max_exhaustive_samples)
            .map(Some)
            .ok_or_else(|| {
                GenerationError::value_unavailable(format!(
                    "exhaustive generation is not possible within {} samples",
                    config.generation.max_exhaustive_samples
                ))
            }),
    }
}

fn run_exhaustive<T, P>(
    exhaustive: ExhaustiveGenerator<T>,
    property: &P,
    config: TestConfig,
    test_start: Instant,
) -> PropertyResult<T>
where
    T: Value,
    P: Property<T>,
{
    let mut tries = 0;
    for value in exhaustive.iter() {
        tries += 1;
        if let Err(error) = evaluate(property, &value) {
            info!(try_number = tries, "property falsified by exhaustive value");
            return Err(TestFailure {
                error,
                original_input: Some(value),
                shrunk_input: None,
                shrink_steps: 0,
                shrinking_completed: true,
                config,
                seed: None,
                failed_try: tries,
                test_duration: test_start.elapsed(),
                shrink_duration: Duration::ZERO,
            });
        }
    }
    Ok(TestSuccess {
        tries,
        edge_cases_tried: 0,
        exhaustive: true,
        seed: None,
        config,
    })
}

fn run_randomized<A, P>(
    arbitrary: &A,
    property: &P,
    config: TestConfig,
    test_start: Instant,
) -> PropertyResult<A::Value>
where
    A: Arbitrary,
    P: Property<A::Value>,
{
    let seed = config.seed.unwrap_or_else(random_seed);
    let mut rng = create_seeded_rng(seed);
    let generation = &config.generation;
    let generator = arbitrary.configured_generator(
        generation.gen_size,
        generation.max_edge_cases,
        generation.edge_cases_mode,
    );

    for try_index in 0..config.tries {
        let try_number = try_index + 1;
        let try_seed = rng.next_u64();
        let shrinkable = match generator.next(&mut rng) {
            Ok(shrinkable) => shrinkable,
            Err(error) => {
                warn!(seed, try_number, %error, "value generation failed");
                return Err(TestFailure::without_input(
                    error.into(),
                    config,
                    Some(seed),
                    try_number,
                    test_start.elapsed(),
                ));
            }
        };

        let original = shrinkable.value();
        let Err(error) = evaluate_seeded(property, &original, try_seed) else {
            continue;
        };
        info!(seed, try_number, ?original, "property falsified, shrinking");

        let engine = ShrinkEngine::with_config(ShrinkConfig::from(&config));
        let shrunk = engine.shrink(shrinkable, |candidate| {
            evaluate_seeded(property, candidate, try_seed).is_err()
        });
        // Report the failure of the minimal value, which may differ from the
        // original one.
        let error = if shrunk.shrink_steps > 0 {
            evaluate_seeded(property, &shrunk.minimal, try_seed).err().unwrap_or(error)
        } else {
            error
        };

        return Err(TestFailure {
            error,
            original_input: Some(original),
            shrunk_input: (shrunk.shrink_steps > 0).then_some(shrunk.minimal),
            shrink_steps: shrunk.shrink_steps,
            shrinking_completed: shrunk.completed,
            seed: Some(seed),
            failed_try: try_number,
            test_duration: test_start.elapsed(),
            shrink_duration: shrunk.shrink_duration,
            config,
        });
    }

    let edge_cases_tried = edge_cases_tried(arbitrary, &config);
    Ok(TestSuccess {
        tries: config.tries,
        edge_cases_tried,
        exhaustive: false,
        seed: Some(seed),
        config,
    })
}

fn edge_cases_tried<A: Arbitrary>(arbitrary: &A, config: &TestConfig) -> usize {
    let generation = &config.generation;
    let available = match generation.edge_cases_mode {
        EdgeCasesMode::None => return 0,
        _ => arbitrary
            .edge_cases(generation.max_edge_cases)
            .len()
            .min(generation.gen_size as usize),
    };
    match generation.edge_cases_mode {
        EdgeCasesMode::Mixin => available.min(config.tries.div_ceil(2)),
        _ => available.min(config.tries),
    }
}

/// Execute a property test with the configuration derived from the global
/// defaults
pub fn check<A, P>(arbitrary: A, property: P) -> PropertyResult<A::Value>
where
    A: Arbitrary,
    P: Property<A::Value>,
{
    check_with_config(arbitrary, property, create_test_config())
}

/// Execute a property test with a custom configuration
pub fn check_with_config<A, P>(arbitrary: A, property: P, config: TestConfig) -> PropertyResult<A::Value>
where
    A: Arbitrary,
    P: Property<A::Value>,
{
    PropertyTest::new(arbitrary, property, config).run()
}

/// Configuration for parallel execution
#[derive(Debug, Clone)]
pub struct ParallelConfig {
    /// Number of worker threads
    pub num_threads: usize,
}

impl Default for ParallelConfig {
    fn default() -> Self {
        Self {
            num_threads: num_cpus::get(),
        }
    }
}

/// Splits the tries over worker threads, each with its own seed derived from
/// the run's seed. The failure of the lowest-numbered worker is reported.
pub fn check_parallel<A, P>(
    arbitrary: A,
    property: P,
    config: TestConfig,
    parallel_config: ParallelConfig,
) -> PropertyResult<A::Value>
where
    A: Arbitrary,
    P: Property<A::Value>,
{
    let test_start = Instant::now();
    let num_threads = parallel_config.num_threads.clamp(1, config.tries.max(1));
    let exhaustive = matches!(exhaustive_generator(&arbitrary, &config), Ok(Some(_)));
    if num_threads == 1 || exhaustive || config.validate().is_err() {
        return execute(&arbitrary, &property, config);
    }

    let seed = config.seed.unwrap_or_else(random_seed);
    let mut seeds = create_seeded_rng(seed);
    let per_thread = config.tries / num_threads;
    let remainder = config.tries % num_threads;
    let worker_configs: Vec<TestConfig> = (0..num_threads)
        .map(|thread_id| {
            let tries = per_thread + usize::from(thread_id < remainder);
            config
                .clone()
                .with_tries(tries)
                .with_seed(seeds.next_u64())
                .with_generation_mode(GenerationMode::Randomized)
        })
        .collect();

    let (arbitrary, property) = (&arbitrary, &property);
    let outcome = crossbeam::scope(|s| {
        let handles: Vec<_> = worker_configs
            .into_iter()
            .map(|worker_config| s.spawn(move |_| execute(arbitrary, property, worker_config)))
            .collect();

        let mut tries = 0;
        let mut edge_cases_tried = 0;
        for handle in handles {
            match handle.join() {
                Ok(Ok(success)) => {
                    tries += success.tries;
                    edge_cases_tried += success.edge_cases_tried;
                }
                Ok(Err(mut failure)) => {
                    failure.config = config.clone();
                    failure.test_duration = test_start.elapsed();
                    return Err(failure);
                }
                Err(payload) => {
                    return Err(TestFailure::without_input(
                        PropertyError::internal_error(format!(
                            "worker thread panicked: {}",
                            panic_message(payload.as_ref())
                        )),
                        config.clone(),
                        Some(seed),
                        0,
                        test_start.elapsed(),
                    ));
                }
            }
        }
        Ok(TestSuccess {
            tries,
            edge_cases_tried,
            exhaustive: false,
            seed: Some(seed),
            config: config.clone(),
        })
    });

    outcome.unwrap_or_else(|payload| {
        Err(TestFailure::without_input(
            PropertyError::internal_error(format!(
                "parallel execution failed: {}",
                panic_message(payload.as_ref())
            )),
            config.clone(),
            Some(seed),
            0,
            test_start.elapsed(),
        ))
    })
}

/// Builder pattern for configuring property tests
#[derive(Debug, Clone)]
pub struct PropertyTestBuilder {
    config: TestConfig,
}

impl PropertyTestBuilder {
    /// Starts from the configuration derived from the global defaults
    pub fn new() -> Self {
        Self {
            config: create_test_config(),
        }
    }

    pub fn tries(mut self, tries: usize) -> Self {
        self.config.tries = tries;
        self
    }

    pub fn seed(mut self, seed: u64) -> Self {
        self.config.seed = Some(seed);
        self
    }

    pub fn max_shrink_steps(mut self, max_steps: usize) -> Self {
        self.config.max_shrink_steps = max_steps;
        self
    }

    pub fn shrink_timeout(mut self, timeout: Duration) -> Self {
        self.config.shrink_timeout = timeout;
        self
    }

    pub fn gen_size(mut self, gen_size: u32) -> Self {
        self.config.generation.gen_size = gen_size;
        self
    }

    pub fn edge_cases_mode(mut self, mode: EdgeCasesMode) -> Self {
        self.config.generation.edge_cases_mode = mode;
        self
    }

    pub fn generation_mode(mut self, mode: GenerationMode) -> Self {
        self.config.generation_mode = mode;
        self
    }

    pub fn config(&self) -> &TestConfig {
        &self.config
    }

    pub fn run<A, P>(self, arbitrary: A, property: P) -> PropertyResult<A::Value>
    where
        A: Arbitrary,
        P: Property<A::Value>,
    {
        check_with_config(arbitrary, property, self.config)
    }
}

impl Default for PropertyTestBuilder {
    fn default() -> Self {
        Self::new()
    }
}

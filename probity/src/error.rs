//! Error types and result handling for property-based testing.

use std::error::Error as StdError;
use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use thiserror::Error;

use crate::config::{ConfigError, TestConfig};

/// Failure to produce a value from a generator.
#[derive(Debug, Clone, Error)]
pub enum GenerationError {
    /// A filter rejected every value it was offered.
    #[error(
        "filter `{filter}` rejected {misses} values in a row (max {max_misses}); the condition is too strict for the generated values"
    )]
    TooManyFilterMisses {
        filter: String,
        misses: usize,
        max_misses: usize,
    },

    /// A combination filter rejected every combined value it was offered.
    #[error("combination filter rejected {misses} combined values in a row (max {max_misses})")]
    UnsatisfiableCombination { misses: usize, max_misses: usize },

    /// No value can be produced at all, e.g. an empty choice or an empty range.
    #[error("no value available: {reason}")]
    ValueUnavailable { reason: String },

    /// A collect condition was not met after the maximum number of draws.
    #[error("collect condition not met after {draws} draws")]
    TooManyCollectDraws { draws: usize },

    /// Unique elements could not be found for a collection.
    #[error("could not find a unique element after {misses} attempts (max {max_misses})")]
    TooManyUniqueMisses { misses: usize, max_misses: usize },

    /// A user-supplied mapping failed.
    #[error("value mapping failed: {error}")]
    User {
        error: Arc<dyn StdError + Send + Sync>,
    },
}

impl GenerationError {
    pub fn value_unavailable(reason: impl Into<String>) -> Self {
        Self::ValueUnavailable {
            reason: reason.into(),
        }
    }

    pub fn user<E>(error: E) -> Self
    where
        E: StdError + Send + Sync + 'static,
    {
        Self::User {
            error: Arc::new(error),
        }
    }

    /// Whether this is a user error of type `E`.
    pub fn is_user_error<E>(&self) -> bool
    where
        E: StdError + 'static,
    {
        match self {
            Self::User { error } => error.downcast_ref::<E>().is_some(),
            _ => false,
        }
    }
}

/// Error type for property testing failures.
#[derive(Debug, Clone, Error)]
pub enum PropertyError {
    /// The property returned false, an error, or panicked.
    #[error("Property failed: {message}")]
    PropertyFailed { message: String },

    /// A value could not be generated.
    #[error("Generation failed: {0}")]
    GenerationFailed(#[from] GenerationError),

    /// Invalid test configuration.
    #[error("Configuration error: {0}")]
    ConfigError(#[from] ConfigError),

    /// Shrinking stopped at its step ceiling or timeout.
    #[error("Shrinking stopped after {steps} steps without reaching a minimum")]
    ShrinkageTimeout { steps: usize },

    /// Internal error in the testing machinery, e.g. a panicking worker thread.
    #[error("Internal error: {message}")]
    InternalError { message: String },
}

impl PropertyError {
    pub fn property_failed(message: impl Into<String>) -> Self {
        Self::PropertyFailed {
            message: message.into(),
        }
    }

    pub fn internal_error(message: impl Into<String>) -> Self {
        Self::InternalError {
            message: message.into(),
        }
    }
}

/// Result of a property test execution
pub type PropertyResult<T> = Result<TestSuccess, TestFailure<T>>;

/// Information about a successful test run
#[derive(Debug, Clone)]
pub struct TestSuccess {
    /// Number of tries that ran the property
    pub tries: usize,
    /// Number of those tries that were edge cases
    pub edge_cases_tried: usize,
    /// Whether values were enumerated exhaustively instead of drawn randomly
    pub exhaustive: bool,
    /// Seed of the random source, absent for exhaustive runs
    pub seed: Option<u64>,
    pub config: TestConfig,
}

/// Information about a failed test run
#[derive(Debug)]
pub struct TestFailure<T> {
    /// The error that caused the failure
    pub error: PropertyError,
    /// First falsifying value, absent when generation itself failed
    pub original_input: Option<T>,
    /// Minimal falsifying value found by shrinking
    pub shrunk_input: Option<T>,
    /// Number of committed shrinking steps
    pub shrink_steps: usize,
    /// Whether shrinking reached a local minimum
    pub shrinking_completed: bool,
    pub config: TestConfig,
    /// Seed of the random source, absent for exhaustive runs
    pub seed: Option<u64>,
    /// One-based try number of the failure
    pub failed_try: usize,
    pub test_duration: Duration,
    pub shrink_duration: Duration,
}

impl<T> TestFailure<T> {
    /// Failure raised before any value was falsified.
    pub fn without_input(
        error: PropertyError,
        config: TestConfig,
        seed: Option<u64>,
        failed_try: usize,
        test_duration: Duration,
    ) -> Self {
        Self {
            error,
            original_input: None,
            shrunk_input: None,
            shrink_steps: 0,
            shrinking_completed: true,
            config,
            seed,
            failed_try,
            test_duration,
            shrink_duration: Duration::ZERO,
        }
    }

    /// The smallest known falsifying value.
    pub fn minimal_input(&self) -> Option<&T> {
        self.shrunk_input.as_ref().or(self.original_input.as_ref())
    }

    /// [`PropertyError::ShrinkageTimeout`] if shrinking stopped early.
    pub fn shrinking_error(&self) -> Option<PropertyError> {
        (!self.shrinking_completed).then_some(PropertyError::ShrinkageTimeout {
            steps: self.shrink_steps,
        })
    }

    /// Get a detailed report of the test failure
    pub fn detailed_report(&self) -> String
    where
        T: fmt::Debug,
    {
        let mut report = String::new();

        report.push_str(&format!("Property test failed on try {}\n", self.failed_try));
        report.push_str(&format!("Error: {}\n", self.error));
        match &self.original_input {
            Some(original) => report.push_str(&format!("Original input: {:?}\n", original)),
            None => report.push_str("No input was generated\n"),
        }

        if let Some(ref shrunk) = self.shrunk_input {
            report.push_str(&format!("Shrunk input: {:?}\n", shrunk));
            report.push_str(&format!("Shrinking steps: {}\n", self.shrink_steps));
            report.push_str(&format!("Shrinking time: {:?}\n", self.shrink_duration));
            if let Some(error) = self.shrinking_error() {
                report.push_str(&format!("{}\n", error));
            }
        } else {
            report.push_str("No shrinking performed\n");
        }

        report.push_str(&format!("Total test time: {:?}\n", self.test_duration));
        report.push_str(&format!(
            "Test configuration: tries={}, seed={:?}\n",
            self.config.tries, self.seed
        ));

        report
    }

    /// Get a concise summary of the test failure
    pub fn summary(&self) -> String
    where
        T: fmt::Debug,
    {
        match (&self.shrunk_input, &self.original_input) {
            (Some(shrunk), Some(original)) => format!(
                "Property failed with input {:?} (shrunk from {:?}) on try {}",
                shrunk, original, self.failed_try
            ),
            (None, Some(original)) => format!(
                "Property failed with input {:?} on try {}",
                original, self.failed_try
            ),
            _ => format!("{} on try {}", self.error, self.failed_try),
        }
    }
}

impl<T: fmt::Debug> fmt::Display for TestFailure<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.summary())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Error)]
    #[error("bad input {0}")]
    struct BadInput(i32);

    #[derive(Debug, Error)]
    #[error("other")]
    struct Other;

    fn failure() -> TestFailure<i32> {
        TestFailure {
            error: PropertyError::property_failed("x must be small"),
            original_input: Some(500),
            shrunk_input: Some(11),
            shrink_steps: 9,
            shrinking_completed: true,
            config: TestConfig::default(),
            seed: Some(42),
            failed_try: 3,
            test_duration: Duration::from_millis(5),
            shrink_duration: Duration::from_millis(1),
        }
    }

    #[test]
    fn test_filter_miss_message_names_the_filter() {
        let error = GenerationError::TooManyFilterMisses {
            filter: "positive".to_string(),
            misses: 5,
            max_misses: 5,
        };
        let message = error.to_string();
        assert!(message.contains("positive"));
        assert!(message.contains("5"));
    }

    #[test]
    fn test_user_error_downcast() {
        let error = GenerationError::user(BadInput(3));
        assert!(error.is_user_error::<BadInput>());
        assert!(!error.is_user_error::<Other>());
        assert!(error.to_string().contains("bad input 3"));
        assert!(!GenerationError::value_unavailable("empty").is_user_error::<BadInput>());
    }

    #[test]
    fn test_generation_error_converts_into_property_error() {
        let error: PropertyError = GenerationError::TooManyCollectDraws { draws: 10 }.into();
        assert!(matches!(error, PropertyError::GenerationFailed(_)));
        assert!(error.to_string().contains("10 draws"));
    }

    #[test]
    fn test_detailed_report() {
        let report = failure().detailed_report();
        assert!(report.contains("try 3"));
        assert!(report.contains("Original input: 500"));
        assert!(report.contains("Shrunk input: 11"));
        assert!(report.contains("Shrinking steps: 9"));
        assert!(report.contains("seed=Some(42)"));
    }

    #[test]
    fn test_incomplete_shrinking_is_reported() {
        let mut failure = failure();
        assert!(failure.shrinking_error().is_none());

        failure.shrinking_completed = false;
        assert!(matches!(
            failure.shrinking_error(),
            Some(PropertyError::ShrinkageTimeout { steps: 9 })
        ));
        assert!(failure.detailed_report().contains("Shrinking stopped after 9 steps"));
    }

    #[test]
    fn test_summary_and_minimal_input() {
        let failure = failure();
        assert_eq!(failure.minimal_input(), Some(&11));
        assert_eq!(
            failure.to_string(),
            "Property failed with input 11 (shrunk from 500) on try 3"
        );

        let no_input: TestFailure<i32> = TestFailure::without_input(
            GenerationError::value_unavailable("empty range").into(),
            TestConfig::default(),
            None,
            1,
            Duration::ZERO,
        );
        assert_eq!(no_input.minimal_input(), None);
        assert!(no_input.summary().contains("empty range"));
    }
}

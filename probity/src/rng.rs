//! Random sources and the per-thread source bound during property evaluation.

use std::cell::RefCell;

use rand::rngs::StdRng;
use rand::{RngCore, SeedableRng};
use tracing::trace;

/// Source of the random generators a property run draws from.
pub trait RngProvider: Send + Sync {
    type Rng: RngCore + Clone + Send;

    /// Seeded when `seed` is given, from entropy otherwise.
    fn create_rng(&self, seed: Option<u64>) -> Self::Rng;
}

/// `StdRng` backed provider used by every run.
#[derive(Debug, Clone, Default)]
pub struct DefaultRngProvider;

impl RngProvider for DefaultRngProvider {
    type Rng = StdRng;

    fn create_rng(&self, seed: Option<u64>) -> Self::Rng {
        match seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        }
    }
}

/// Reproducible source for `seed`.
pub fn create_seeded_rng(seed: u64) -> StdRng {
    DefaultRngProvider.create_rng(Some(seed))
}

/// Fresh seed from the operating system.
pub fn random_seed() -> u64 {
    StdRng::from_entropy().next_u64()
}

thread_local! {
    static BOUND_RNG: RefCell<Option<StdRng>> = const { RefCell::new(None) };
}

/// Runs `action` with `rng` bound to the current thread, so that sampling
/// inside `action` draws from it. The advanced state is written back to
/// `rng` afterwards, even when `action` panics.
pub fn with_bound_rng<R>(rng: &mut StdRng, action: impl FnOnce() -> R) -> R {
    struct Restore<'a> {
        target: &'a mut StdRng,
        previous: Option<StdRng>,
    }

    impl Drop for Restore<'_> {
        fn drop(&mut self) {
            let previous = self.previous.take();
            let bound = BOUND_RNG.with(|cell| cell.replace(previous));
            if let Some(advanced) = bound {
                *self.target = advanced;
            }
        }
    }

    let previous = BOUND_RNG.with(|cell| cell.replace(Some(rng.clone())));
    let _restore = Restore {
        target: rng,
        previous,
    };
    action()
}

/// Whether a source is bound to the current thread.
pub fn is_bound() -> bool {
    BOUND_RNG.with(|cell| cell.try_borrow().map(|rng| rng.is_some()).unwrap_or(true))
}

/// Runs `action` with the bound source, or returns `None` when no source is
/// bound or the bound source is already in use further up the stack.
///
/// Callers fall back to a source seeded from entropy on `None`. Sampling
/// from inside another sample, such as from a `create` supplier that is
/// itself sampled, is therefore not reproducible from the run's seed.
pub fn with_current_rng<R>(action: impl FnOnce(&mut dyn RngCore) -> R) -> Option<R> {
    BOUND_RNG.with(|cell| {
        let Ok(mut guard) = cell.try_borrow_mut() else {
            trace!("bound random source already in use, nested sample is not reproducible");
            return None;
        };
        let rng = guard.as_mut()?;
        Some(action(rng))
    })
}

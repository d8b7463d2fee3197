//! Response selection for a resolved [`Action`].
//!
//! `SINGLE` (and unrecognised modes) return the configured index, falling
//! back to the first response when the index is out of range. `RANDOM`
//! performs a weighted draw. `INTERCEPT` is rejected with
//! [`SelectionError::UnsupportedMode`].
//!
//! Randomness comes from a [`RandomSource`]. [`ThreadRandom`] keeps one
//! generator per thread, each seeded from a single locked seed generator,
//! so concurrent requests never contend on a shared lock.

use std::cell::RefCell;
use std::sync::{LazyLock, Mutex};

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use super::tree::{Action, ActionMode, Response};
use crate::error::SelectionError;

/// Source of uniformly distributed integers.
pub trait RandomSource: Send + Sync {
    /// A value in `min..=max`. Implementations return `min` when `max < min`.
    fn next_inclusive(&self, min: i64, max: i64) -> i64;
}

static SEED_SOURCE: LazyLock<Mutex<StdRng>> = LazyLock::new(|| Mutex::new(StdRng::from_entropy()));

thread_local! {
    static THREAD_RNG: RefCell<StdRng> = RefCell::new(StdRng::seed_from_u64(next_seed()));
}

fn next_seed() -> u64 {
    let mut seeds = SEED_SOURCE
        .lock()
        .unwrap_or_else(std::sync::PoisonError::into_inner);
    seeds.gen()
}

/// Thread-local [`RandomSource`] backed by `StdRng`.
#[derive(Debug, Clone, Copy, Default)]
pub struct ThreadRandom;

impl RandomSource for ThreadRandom {
    fn next_inclusive(&self, min: i64, max: i64) -> i64 {
        if max <= min {
            return min;
        }
        THREAD_RNG.with(|rng| rng.borrow_mut().gen_range(min..=max))
    }
}

/// Pick the response `action` answers with.
pub fn select<'a>(action: &'a Action, random: &dyn RandomSource) -> Result<&'a Response, SelectionError> {
    let Some(first) = action.responses.first() else {
        return Err(SelectionError::NoResponse);
    };

    match &action.mode {
        ActionMode::Single | ActionMode::Unknown(_) => Ok(select_single(action, first)),
        ActionMode::Random => Ok(select_weighted(&action.responses, first, random)),
        ActionMode::Intercept => Err(SelectionError::UnsupportedMode(action.mode.clone())),
    }
}

fn select_single<'a>(action: &'a Action, first: &'a Response) -> &'a Response {
    usize::try_from(action.single_index)
        .ok()
        .and_then(|i| action.responses.get(i))
        .unwrap_or(first)
}

fn select_weighted<'a>(responses: &'a [Response], first: &'a Response, random: &dyn RandomSource) -> &'a Response {
    let total: i64 = responses
        .iter()
        .map(|r| r.random_weight)
        .fold(0_i64, i64::saturating_add);

    // Nothing to weigh against; skip the draw entirely.
    if total <= 0 {
        return first;
    }

    let draw = random.next_inclusive(1, total);
    let mut cumulative: i64 = 0;
    for response in responses {
        cumulative = cumulative.saturating_add(response.random_weight);
        if cumulative >= draw {
            return response;
        }
    }
    first
}

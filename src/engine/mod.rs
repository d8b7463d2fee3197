//! The mock resolution engine.
//!
//! Turns a `(method, path)` pair into a configured [`Response`] using an
//! immutable [`EndpointTree`]. Submodules cover path splitting
//! ([`segment`]), the tree model ([`tree`]), declaration-order matching
//! ([`matcher`]) and response selection ([`select`]). Everything here is
//! synchronous, allocation-light and safe to call from any number of
//! request tasks at once.

pub mod matcher;
pub mod segment;
pub mod select;
pub mod tree;

use select::RandomSource;
use tree::{EndpointTree, Response};

use crate::error::SelectionError;

/// Outcome of one configuration generation.
///
/// A `Failed` state stays in place until the next successful reload.
#[derive(Debug, Clone, PartialEq)]
pub enum EngineState {
    Ready(EndpointTree),
    Failed(String),
}

impl EngineState {
    #[must_use]
    pub const fn is_ready(&self) -> bool {
        matches!(self, Self::Ready(_))
    }

    #[must_use]
    pub const fn tree(&self) -> Option<&EndpointTree> {
        match self {
            Self::Ready(tree) => Some(tree),
            Self::Failed(_) => None,
        }
    }

    #[must_use]
    pub fn error_message(&self) -> Option<&str> {
        match self {
            Self::Ready(_) => None,
            Self::Failed(message) => Some(message),
        }
    }
}

/// What a request resolved to against one generation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Outcome<'t> {
    Matched(&'t Response),
    NotFound,
    /// The engine holds no usable tree; carries the stored failure message.
    Failed(&'t str),
}

impl Outcome<'_> {
    #[must_use]
    pub const fn matched(&self) -> bool {
        matches!(self, Self::Matched(_))
    }
}

/// Resolve a request against `state`.
pub fn resolve<'t>(
    state: &'t EngineState,
    method: &str,
    path: &str,
    random: &dyn RandomSource,
) -> Result<Outcome<'t>, SelectionError> {
    let tree = match state {
        EngineState::Ready(tree) => tree,
        EngineState::Failed(message) => return Ok(Outcome::Failed(message)),
    };

    let segments = segment::segment(Some(path));
    let Some(action) = matcher::find_action(method, &segments, &tree.endpoints) else {
        return Ok(Outcome::NotFound);
    };

    select::select(action, random).map(Outcome::Matched)
}

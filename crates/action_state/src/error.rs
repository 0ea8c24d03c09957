//! Error types.
//!
//! Decoding errors ([`ActionError`], [`TypeCheckFailure`]) are fatal to the
//! single decode that raised them. [`HistoryError`] aborts a whole history
//! reconstruction: there is no partial result. [`HashMismatch`] is only
//! produced when a caller asks for the comparison.

#![expect(
    clippy::module_name_repetitions,
    reason = "error types are named for what failed"
)]

use core::fmt;

use crate::primitives::ActionState;

/// A decoded region does not satisfy its type descriptor.
#[derive(Clone, Copy, Debug, PartialEq, Eq, thiserror::Error)]
#[error("type check failed for {type_name}: {reason}")]
pub struct TypeCheckFailure {
    /// Rust type that rejected the value.
    pub type_name: &'static str,
    /// What was wrong with it.
    pub reason: &'static str,
}

impl TypeCheckFailure {
    /// A failure attributed to type `T`.
    #[must_use]
    pub fn new<T: ?Sized>(reason: &'static str) -> Self {
        Self {
            type_name: core::any::type_name::<T>(),
            reason,
        }
    }
}

/// The action length a decoder requires.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ActionSize {
    /// Exactly this many field elements.
    Exactly(usize),
    /// At least this many field elements.
    AtLeast(usize),
}

impl fmt::Display for ActionSize {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {
            Self::Exactly(size) => write!(formatter, "exactly {size}"),
            Self::AtLeast(size) => write!(formatter, "at least {size}"),
        }
    }
}

/// Errors decoding a single action.
#[derive(Clone, Copy, Debug, PartialEq, Eq, thiserror::Error)]
pub enum ActionError {
    /// The action length does not match what its key/value shape and the
    /// padding rule predict.
    #[error("invalid action size: expected {expected} field elements, found {found}")]
    InvalidActionSize {
        /// Required length.
        expected: ActionSize,
        /// Actual length.
        found: usize,
    },

    /// A decoded key or value failed its validity predicate.
    #[error(transparent)]
    TypeCheckFailure(#[from] TypeCheckFailure),
}

/// An error object reported by an action source instead of data.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
#[error("action source error: {message}")]
pub struct SourceError {
    /// The source's error, verbatim.
    pub message: String,
}

impl SourceError {
    /// Wrap a source-reported message.
    #[must_use]
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// Errors reconstructing action history.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum HistoryError {
    /// The source reported an error instead of data. Nothing was decoded.
    #[error("fetching action history failed")]
    HistoryFetch(#[source] SourceError),

    /// A raw action element is not a decimal field element.
    #[error("batch {batch}, action {action}: {value:?} is not a field element")]
    InvalidFieldElement {
        /// Batch index in fetch order.
        batch: usize,
        /// Action index within the batch.
        action: usize,
        /// The offending raw value.
        value: String,
    },

    /// A raw action failed to decode into a leaf.
    #[error("batch {batch}, action {action}: {source}")]
    Action {
        /// Batch index in fetch order.
        batch: usize,
        /// Action index within the batch.
        action: usize,
        /// Underlying decode error.
        source: ActionError,
    },
}

/// A re-derived action state disagrees with the expected on-chain value.
#[derive(Clone, Copy, Debug, PartialEq, Eq, thiserror::Error)]
#[error("action state mismatch: expected {expected:?}, re-derived {found:?}")]
pub struct HashMismatch {
    /// What the chain reports.
    pub expected: ActionState,
    /// What the history folded to.
    pub found: ActionState,
}

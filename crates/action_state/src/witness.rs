//! Unconstrained witnesses.
//!
//! - **[`Unconstrained`]**: data carried next to provable values but never
//!   bound by a proof. A circuit may read it to compute a witness, but must
//!   not assume anything about how it relates to the constrained values.

/// A value a proof carries but does not constrain.
///
/// Wrapping marks the boundary: code that only holds an
/// `Unconstrained<T>` has to go through [`get`](Self::get) to see the
/// data, which keeps every read of unverified data explicit.
///
/// Used for [`MerkleLeaf::prefix`](crate::leaf::MerkleLeaf::prefix): the
/// raw action elements preceding the `(key, value)` pair.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Unconstrained<T>(T);

impl<T> Unconstrained<T> {
    /// Read the unverified value.
    #[must_use]
    pub const fn get(&self) -> &T {
        &self.0
    }

    /// Take the unverified value.
    #[must_use]
    pub fn into_inner(self) -> T {
        self.0
    }
}

impl<T> From<T> for Unconstrained<T> {
    fn from(value: T) -> Self {
        Self(value)
    }
}

//! Merkle leaves and the selective leaf hash.
//!
//! A [`MerkleLeaf`] is one action reduced to its final two elements, which
//! for an [`encode`](crate::action::encode)d action are the key hash and
//! value hash of a Merkle map entry. Everything before them is kept as an
//! [`Unconstrained`] prefix.
//!
//! ## Selective hashing
//!
//! $$\text{leaf\_hash} = \text{Poseidon.update}(\underbrace{\text{Poseidon.update}(\text{salt}(\text{"MinaZkappEvent"}),\; \text{prefix})}_{\text{PrefixState}},\; [key, value])_0$$
//!
//! A proof that only needs "`(key, value)` is part of this action" takes
//! the [`PrefixState`] as a witness it does not verify, and constrains only
//! the final two-element absorption ([`MerkleLeaf::hash_from_state`]).
//! The expensive part, absorbing a variable-length prefix, happens once,
//! outside the proof.
//!
//! Because actions are even-length and the sponge rate is two, the
//! selective hash of a leaf with a non-empty prefix equals the full
//! [`Action::hash`]. So a leaf list folds to the same accumulator the
//! network computes, and the accumulator (compared against chain state
//! elsewhere) is what vouches for the prefix. The selective hash on its own
//! vouches for nothing beyond `(key, value)`.

use pasta_curves::Fp;

use crate::{
    action::Action,
    constants::EVENT_PREFIX,
    error::{ActionError, ActionSize},
    poseidon::{self, State},
    witness::Unconstrained,
};

/// An action reduced to its final `(key, value)` pair.
#[derive(Clone, Debug, PartialEq, Eq)]
#[expect(clippy::module_name_repetitions, reason = "MerkleLeaf is the established name")]
pub struct MerkleLeaf {
    /// Second-to-last action element.
    pub key: Fp,
    /// Last action element.
    pub value: Fp,
    /// All action elements before `key`, not bound by the selective hash's
    /// constrained part.
    pub prefix: Unconstrained<Vec<Fp>>,
}

/// Sponge state after absorbing a leaf's prefix under the action salt.
///
/// Supplied to a proof as an unverified witness.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PrefixState(State);

impl From<State> for PrefixState {
    fn from(state: State) -> Self {
        Self(state)
    }
}

impl From<PrefixState> for State {
    fn from(state: PrefixState) -> Self {
        state.0
    }
}

impl MerkleLeaf {
    /// Split a raw action into prefix, key and value.
    ///
    /// Fails with [`ActionError::InvalidActionSize`] if the action has fewer
    /// than two elements.
    pub fn from_action(action: &[Fp]) -> Result<Self, ActionError> {
        let Some((prefix, &[key, value])) = action.split_last_chunk::<2>() else {
            tracing::trace!(found = action.len(), "action too short for a leaf");
            return Err(ActionError::InvalidActionSize {
                expected: ActionSize::AtLeast(2),
                found: action.len(),
            });
        };
        Ok(Self {
            key,
            value,
            prefix: Unconstrained::from(prefix.to_vec()),
        })
    }

    /// Absorb the prefix. This is the part done outside any proof.
    #[must_use]
    pub fn prefix_state(&self) -> PrefixState {
        PrefixState(poseidon::update(
            poseidon::salt(EVENT_PREFIX),
            self.prefix.get(),
        ))
    }

    /// Finish a leaf hash from a (trusted) prefix state.
    ///
    /// This is the only part of the leaf hash a proof constrains.
    #[must_use]
    pub fn hash_from_state(state: &PrefixState, key: Fp, value: Fp) -> Fp {
        poseidon::squeeze(poseidon::update(state.0, &[key, value]))
    }

    /// Leaf hash: [`prefix_state`](Self::prefix_state) followed by
    /// [`hash_from_state`](Self::hash_from_state).
    #[must_use]
    pub fn hash(&self) -> Fp {
        Self::hash_from_state(&self.prefix_state(), self.key, self.value)
    }

    /// Reassemble the raw action.
    #[must_use]
    pub fn to_action(&self) -> Action {
        let mut fields = self.prefix.get().clone();
        fields.push(self.key);
        fields.push(self.value);
        Action::from(fields)
    }
}

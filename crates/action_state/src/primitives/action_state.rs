use core::fmt;

use ff::PrimeField as _;
use pasta_curves::Fp;
use serde::{Deserialize, Serialize};

use crate::{
    constants::{ACTION_STATE_EMPTY_DOMAIN, SEQUENCE_EVENTS_PREFIX},
    decimal, poseidon,
};

/// An account's action state: the accumulator over its whole action history.
///
/// Every batch of actions applied on chain (one account update's actions)
/// is first folded into a per-batch actions hash, which is then chained
/// into the action state:
///
/// $$s_{i+1} = \text{Poseidon}_{\text{"MinaZkappSeqEvents"}}(s_i \| h_i)$$
///
/// starting from [`ActionState::empty`]. The chain is order-sensitive, so
/// two histories agree on their action state only if they applied the same
/// batches in the same order.
///
/// A client that re-derives the action state from fetched history and
/// compares it against the state the chain reports has checked the history
/// end to end; that comparison is the only source of truth, never a
/// selective leaf hash.
#[derive(Clone, Copy, Debug, Eq, Ord, PartialEq, PartialOrd, Deserialize, Serialize)]
pub struct ActionState(#[serde(with = "fp_serde")] Fp);

mod fp_serde {
    use ff::PrimeField as _;
    use pasta_curves::Fp;
    use serde::{Deserialize as _, Deserializer, Serialize as _, Serializer};

    pub(super) fn serialize<S: Serializer>(fp: &Fp, serializer: S) -> Result<S::Ok, S::Error> {
        fp.to_repr().serialize(serializer)
    }

    pub(super) fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Fp, D::Error> {
        let bytes = <[u8; 32]>::deserialize(deserializer)?;
        Option::from(Fp::from_repr(bytes))
            .ok_or_else(|| serde::de::Error::custom("invalid field element"))
    }
}

impl ActionState {
    /// The action state of an account that has never emitted an action.
    #[must_use]
    pub fn empty() -> Self {
        Self(poseidon::empty_hash_with_prefix(ACTION_STATE_EMPTY_DOMAIN))
    }

    /// Chain one batch's actions hash onto this state.
    #[must_use]
    pub fn update(self, actions_hash: Fp) -> Self {
        Self(poseidon::hash_with_prefix(
            SEQUENCE_EVENTS_PREFIX,
            &[self.0, actions_hash],
        ))
    }

    /// Parse the decimal form nodes use on the wire.
    #[must_use]
    pub fn from_decimal(decimal: &str) -> Option<Self> {
        decimal::parse(decimal).map(Self)
    }
}

/// Decimal, matching [`from_decimal`](ActionState::from_decimal).
impl fmt::Display for ActionState {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.write_str(&decimal::format(self.0))
    }
}

impl From<Fp> for ActionState {
    fn from(fp: Fp) -> Self {
        Self(fp)
    }
}

impl From<ActionState> for Fp {
    fn from(state: ActionState) -> Self {
        state.0
    }
}

impl From<ActionState> for [u8; 32] {
    fn from(state: ActionState) -> Self {
        state.0.to_repr()
    }
}

impl TryFrom<[u8; 32]> for ActionState {
    type Error = &'static str;

    fn try_from(bytes: [u8; 32]) -> Result<Self, Self::Error> {
        Option::from(Fp::from_repr(bytes))
            .map(Self)
            .ok_or("invalid field element")
    }
}

#[cfg(test)]
mod tests {
    use ff::Field as _;

    use super::*;

    /// The empty state is the squeezed salt of its domain.
    #[test]
    fn empty_is_domain_salt() {
        let expected = poseidon::squeeze(poseidon::salt(ACTION_STATE_EMPTY_DOMAIN));
        assert_eq!(Fp::from(ActionState::empty()), expected);
    }

    /// Applying batches in a different order gives a different state.
    #[test]
    fn update_is_order_sensitive() {
        let first = Fp::from(1u64);
        let second = Fp::from(2u64);
        let forward = ActionState::empty().update(first).update(second);
        let backward = ActionState::empty().update(second).update(first);
        assert_ne!(forward, backward);
    }

    /// Byte conversion round-trips and rejects non-canonical encodings.
    #[test]
    fn repr_round_trip() {
        let state = ActionState::empty().update(Fp::ONE);
        let bytes: [u8; 32] = state.into();
        assert_eq!(ActionState::try_from(bytes), Ok(state));
        assert!(ActionState::try_from([0xffu8; 32]).is_err(), "p <= 2^256 - 1");
    }

    /// Decimal strings parse as field elements; garbage does not.
    #[test]
    fn decimal_parsing() {
        assert_eq!(
            ActionState::from_decimal("42"),
            Some(ActionState::from(Fp::from(42u64)))
        );
        assert_eq!(ActionState::from_decimal("not a number"), None);

        let state = ActionState::empty();
        assert_eq!(ActionState::from_decimal(&state.to_string()), Some(state));
    }
}

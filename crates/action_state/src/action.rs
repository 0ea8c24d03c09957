//! Action encoding.
//!
//! An action is one logged event: a flat, fixed-length sequence of field
//! elements appended to an account's action history. Key/value records are
//! laid out so that the last two elements are a key hash and a value hash:
//!
//! | Region | Width | Contents |
//! | ------ | ----- | -------- |
//! | key | `K` (0 if keyless) | [`KeyShape::to_fields`] |
//! | value | `V` | [`Actionable::to_fields`] |
//! | padding | 0 or 1 | a zero, iff `2 + K + V` is odd |
//! | `key_hash` | 1 | $\text{Poseidon}(\text{prefix} \| K \,;\, \text{pack}(key))$ |
//! | `value_hash` | 1 | $\text{Poseidon}(\text{pack}(value))$ |
//!
//! The padding keeps every action even-length. With a rate-2 sponge this
//! means the final `(key_hash, value_hash)` pair is absorbed in a block of
//! its own, which is what lets [`MerkleLeaf`](crate::leaf::MerkleLeaf)
//! re-hash just that pair on top of a precomputed prefix state.

#![expect(
    clippy::module_name_repetitions,
    reason = "action vocabulary: push_action, action_size, DecodedAction"
)]

use core::iter;

use ff::Field as _;
use pasta_curves::Fp;

use crate::{
    constants::{ACTIONS_EMPTY_DOMAIN, EVENT_PREFIX, SEQUENCE_EVENTS_PREFIX},
    error::{ActionError, ActionSize},
    poseidon,
    provable::{Actionable, KeyShape},
};

/// An encoded action.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Action(Vec<Fp>);

impl Action {
    /// The action's field elements.
    #[must_use]
    pub fn as_slice(&self) -> &[Fp] {
        &self.0
    }

    /// Number of field elements.
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether the action has no field elements.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Full action hash, as the network computes it.
    ///
    /// $$\text{H}(a) = \text{Poseidon}_{\text{"MinaZkappEvent"}}(a_1 \| \cdots \| a_n)$$
    #[must_use]
    pub fn hash(&self) -> Fp {
        poseidon::hash_with_prefix(EVENT_PREFIX, &self.0)
    }
}

impl From<Vec<Fp>> for Action {
    fn from(fields: Vec<Fp>) -> Self {
        Self(fields)
    }
}

impl From<Action> for Vec<Fp> {
    fn from(action: Action) -> Self {
        action.0
    }
}

impl AsRef<[Fp]> for Action {
    fn as_ref(&self) -> &[Fp] {
        &self.0
    }
}

/// Hash of a batch with no actions.
#[must_use]
pub fn empty_actions_hash() -> Fp {
    poseidon::empty_hash_with_prefix(ACTIONS_EMPTY_DOMAIN)
}

/// Chain one action's full hash onto a batch's actions hash.
#[must_use]
pub fn push_action(actions_hash: Fp, action: &Action) -> Fp {
    poseidon::hash_with_prefix(SEQUENCE_EVENTS_PREFIX, &[actions_hash, action.hash()])
}

/// Full actions hash of a batch, folding actions oldest first.
#[must_use]
pub fn actions_hash(actions: &[Action]) -> Fp {
    actions.iter().fold(empty_actions_hash(), push_action)
}

/// Padding width for a key/value layout: 1 iff `2 + key + value` is odd.
#[must_use]
pub const fn padding_size(key_size: usize, value_size: usize) -> usize {
    (key_size + value_size) & 1
}

/// Total encoded width for key shape `KS` and value type `V`.
#[must_use]
pub const fn action_size<KS: KeyShape, V: Actionable>() -> usize {
    KS::SIZE_IN_FIELDS
        + V::SIZE_IN_FIELDS
        + padding_size(KS::SIZE_IN_FIELDS, V::SIZE_IN_FIELDS)
        + 2
}

#[expect(clippy::as_conversions, reason = "usize is at most 64 bits")]
fn size_field(size: usize) -> Fp {
    Fp::from(size as u64)
}

/// Key hash: binds the prefix tag, the declared key width, and the key.
///
/// $$\text{key\_hash} = \text{Poseidon}(\text{prefix} \| K \,;\, \text{pack}(key))$$
///
/// The packed key is absorbed in a second update, so it starts a fresh
/// rate block. A keyless shape absorbs nothing after `prefix || 0`.
#[must_use]
pub fn key_hash<KS: KeyShape>(prefix: Fp, key: &KS::Key) -> Fp {
    let state = poseidon::update(
        poseidon::initial_state(),
        &[prefix, size_field(KS::SIZE_IN_FIELDS)],
    );
    poseidon::squeeze(KS::absorb(state, key))
}

/// Encode a key/value record as an action.
///
/// `prefix` is a caller-chosen domain tag; it is bound only through the key
/// hash and does not appear in the action itself.
#[must_use]
pub fn encode<KS: KeyShape, V: Actionable>(prefix: Fp, key: &KS::Key, value: &V) -> Action {
    let padding = padding_size(KS::SIZE_IN_FIELDS, V::SIZE_IN_FIELDS);

    let mut fields = Vec::with_capacity(action_size::<KS, V>());
    fields.extend(KS::to_fields(key));
    fields.extend(value.to_fields());
    fields.extend(iter::repeat_n(Fp::ZERO, padding));
    fields.push(key_hash::<KS>(prefix, key));
    fields.push(poseidon::hash_packed(value));
    Action(fields)
}

/// A decoded key/value action.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DecodedAction<K, V> {
    /// The key (`()` for keyless actions).
    pub key: K,
    /// The value.
    pub value: V,
    /// The action's trailing key hash, as found.
    pub key_hash: Fp,
    /// The action's trailing value hash, as found.
    pub value_hash: Fp,
}

impl<K, V: Actionable> DecodedAction<K, V> {
    /// Whether the key hash was produced under `prefix`.
    ///
    /// Decoding does not check the trailing hashes; this is how a caller
    /// compares an action against the domain tag it expects.
    #[must_use]
    pub fn has_prefix<KS: KeyShape<Key = K>>(&self, prefix: Fp) -> bool {
        key_hash::<KS>(prefix, &self.key) == self.key_hash
    }

    /// Whether the trailing value hash matches the decoded value.
    #[must_use]
    pub fn value_hash_matches(&self) -> bool {
        poseidon::hash_packed(&self.value) == self.value_hash
    }
}

/// Decode an action produced by [`encode`] with the same key shape and
/// value type.
///
/// The length must be exactly [`action_size::<KS, V>()`](action_size);
/// anything else is [`ActionError::InvalidActionSize`] and nothing is
/// truncated or padded. The key and value are type-checked after decoding.
pub fn decode<KS: KeyShape, V: Actionable>(
    action: &Action,
) -> Result<DecodedAction<KS::Key, V>, ActionError> {
    let expected = action_size::<KS, V>();
    let size_error = ActionError::InvalidActionSize {
        expected: ActionSize::Exactly(expected),
        found: action.len(),
    };
    if action.len() != expected {
        tracing::trace!(expected, found = action.len(), "action size mismatch");
        return Err(size_error);
    }

    let (key_fields, after_key) = action
        .as_slice()
        .split_at_checked(KS::SIZE_IN_FIELDS)
        .ok_or(size_error)?;
    let (value_fields, after_value) = after_key
        .split_at_checked(V::SIZE_IN_FIELDS)
        .ok_or(size_error)?;
    let &[key_hash, value_hash] = after_value.last_chunk::<2>().ok_or(size_error)?;

    let key = KS::from_fields(key_fields)?;
    let value = V::from_fields(value_fields)?;
    value.check()?;

    Ok(DecodedAction {
        key,
        value,
        key_hash,
        value_hash,
    })
}

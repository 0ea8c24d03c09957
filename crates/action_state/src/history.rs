//! Re-deriving an account's action state from fetched history.
//!
//! An [`ActionSource`] returns raw batches: one batch per account update,
//! each a list of actions, each action a list of decimal field elements.
//! [`fetch_merkle_leaves`] turns that into an [`ActionBatchList`]:
//!
//! 1. fetch once; a source error aborts with nothing decoded,
//! 2. parse and split every action into a [`MerkleLeaf`],
//! 3. fold each batch into an [`ActionList`] in the order given,
//! 4. fold the batches onto the starting action state.
//!
//! Step 2 completes for the whole history before step 3 starts, so a
//! malformed action anywhere yields an error and never a partial list.

use pasta_curves::Fp;
use serde::{Deserialize, Serialize};

use crate::{
    action::Action,
    decimal,
    error::{HistoryError, SourceError},
    leaf::MerkleLeaf,
    list::{ActionBatchList, ActionList},
    primitives::ActionState,
};

/// The account whose actions are fetched.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord)]
pub struct AccountId {
    /// Base58 public key, passed through to the source untouched.
    pub public_key: String,
    /// Token the account belongs to.
    pub token_id: Fp,
}

impl AccountId {
    /// An account on the default token (token id `1`).
    #[must_use]
    pub fn new(public_key: impl Into<String>) -> Self {
        Self::with_token(public_key, Fp::from(1u64))
    }

    /// An account on a custom token.
    #[must_use]
    pub fn with_token(public_key: impl Into<String>, token_id: Fp) -> Self {
        Self {
            public_key: public_key.into(),
            token_id,
        }
    }
}

/// Which part of the history to fetch.
///
/// Both bounds are action states the chain reported at some point.
/// `from_action_state` is exclusive: batches already folded into it are not
/// returned. `end_action_state` is inclusive. Deserializes from the
/// camel-cased JSON a node's archive API accepts, with states as decimal
/// strings.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default, rename_all = "camelCase")]
pub struct FetchRange {
    /// Resume after this state. Also the state the reconstruction starts
    /// from; [`ActionState::empty`] when unset.
    #[serde(with = "decimal_state", skip_serializing_if = "Option::is_none")]
    pub from_action_state: Option<ActionState>,
    /// Stop after this state; the newest batch when unset.
    #[serde(with = "decimal_state", skip_serializing_if = "Option::is_none")]
    pub end_action_state: Option<ActionState>,
}

impl FetchRange {
    /// The whole history.
    #[must_use]
    pub const fn all() -> Self {
        Self {
            from_action_state: None,
            end_action_state: None,
        }
    }

    /// Everything after `state`.
    #[must_use]
    pub const fn after(state: ActionState) -> Self {
        Self {
            from_action_state: Some(state),
            end_action_state: None,
        }
    }

    /// The state reconstruction starts folding from.
    #[must_use]
    pub fn start(&self) -> ActionState {
        self.from_action_state.unwrap_or_else(ActionState::empty)
    }
}

mod decimal_state {
    use serde::{Deserialize as _, Deserializer, Serializer};

    use crate::primitives::ActionState;

    #[expect(
        clippy::ref_option,
        reason = "signature fixed by serde's `with` attribute"
    )]
    pub(super) fn serialize<S: Serializer>(
        state: &Option<ActionState>,
        serializer: S,
    ) -> Result<S::Ok, S::Error> {
        match *state {
            Some(known) => serializer.collect_str(&known),
            None => serializer.serialize_none(),
        }
    }

    pub(super) fn deserialize<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<Option<ActionState>, D::Error> {
        Option::<String>::deserialize(deserializer)?
            .map(|decimal| {
                ActionState::from_decimal(&decimal).ok_or_else(|| {
                    serde::de::Error::custom(format!("{decimal:?} is not a field element"))
                })
            })
            .transpose()
    }
}

/// One batch as a source reports it.
#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize, Serialize)]
pub struct RawBatch {
    /// Actions in chain order, elements as decimal strings.
    pub actions: Vec<Vec<String>>,
    /// The action state after this batch, if the source reports it.
    ///
    /// Only used to locate range bounds. Reconstruction never trusts it.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hash: Option<String>,
}

impl RawBatch {
    /// Render actions the way a node reports them.
    #[must_use]
    pub fn from_actions(actions: &[Action]) -> Self {
        Self {
            actions: actions
                .iter()
                .map(|action| action.as_slice().iter().copied().map(decimal::format).collect())
                .collect(),
            hash: None,
        }
    }

    /// Attach the action state the node reports after this batch.
    #[must_use]
    pub fn with_hash(mut self, state: ActionState) -> Self {
        self.hash = Some(state.to_string());
        self
    }

    /// The reported action state, if present and well-formed.
    #[must_use]
    pub fn reported_state(&self) -> Option<ActionState> {
        self.hash.as_deref().and_then(ActionState::from_decimal)
    }
}

/// Where action history comes from: an archive node, a cache, a fixture.
///
/// One call per reconstruction. An implementation reports failure as a
/// [`SourceError`]; it never returns partial data alongside one.
pub trait ActionSource {
    /// Fetch the batches of `account` within `range`, oldest first.
    fn fetch_actions(
        &self,
        account: &AccountId,
        range: &FetchRange,
    ) -> impl Future<Output = Result<Vec<RawBatch>, SourceError>> + Send;
}

/// Fetch `account`'s history within `range` and fold it into an
/// [`ActionBatchList`].
///
/// The list starts at [`FetchRange::start`]. Its
/// [`action_state`](ActionBatchList::action_state) is the re-derived state,
/// which the caller compares against what the chain reports (see
/// [`ActionBatchList::ensure_action_state`]). This function does not make
/// that comparison.
#[tracing::instrument(skip_all, fields(public_key = %account.public_key))]
pub async fn fetch_merkle_leaves<S: ActionSource>(
    source: &S,
    account: &AccountId,
    range: &FetchRange,
) -> Result<ActionBatchList, HistoryError> {
    let batches = source
        .fetch_actions(account, range)
        .await
        .map_err(|error| {
            tracing::warn!(%error, "action source failed");
            HistoryError::HistoryFetch(error)
        })?;
    let history = fold_batches(&batches, range.start())?;
    tracing::debug!(
        batches = history.len(),
        leaves = history.iter().map(ActionList::len).sum::<usize>(),
        action_state = %history.action_state(),
        "re-derived action state"
    );
    Ok(history)
}

/// Decode `batches` and fold them onto `start`.
///
/// The synchronous core of [`fetch_merkle_leaves`], for callers that
/// already hold the raw history.
pub fn fold_batches(
    batches: &[RawBatch],
    start: ActionState,
) -> Result<ActionBatchList, HistoryError> {
    let decoded = decode_batches(batches)?;
    Ok(decoded
        .into_iter()
        .map(ActionList::from_reverse_array)
        .fold(ActionBatchList::starting_at(start.into()), ActionBatchList::push_front))
}

/// Parse every action of every batch into leaves.
///
/// Errors carry the batch and action index of the first bad action.
pub fn decode_batches(batches: &[RawBatch]) -> Result<Vec<Vec<MerkleLeaf>>, HistoryError> {
    batches
        .iter()
        .enumerate()
        .map(|(batch, raw)| {
            raw.actions
                .iter()
                .enumerate()
                .map(|(action, elements)| decode_action(batch, action, elements))
                .collect::<Result<Vec<_>, _>>()
        })
        .collect()
}

fn decode_action(
    batch: usize,
    action: usize,
    elements: &[String],
) -> Result<MerkleLeaf, HistoryError> {
    let fields = elements
        .iter()
        .map(|element| {
            decimal::parse(element).ok_or_else(|| HistoryError::InvalidFieldElement {
                batch,
                action,
                value: element.clone(),
            })
        })
        .collect::<Result<Vec<Fp>, _>>()?;
    MerkleLeaf::from_action(&fields).map_err(|source| HistoryError::Action {
        batch,
        action,
        source,
    })
}

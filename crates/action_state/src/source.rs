//! An in-memory archive implementing [`ActionSource`].
//!
//! Holds each account's full batch history, oldest first, with the action
//! state the archive reports after each batch. Range bounds are located by
//! those reported states, the way an archive node answers a ranged query.

use alloc::collections::BTreeMap;

use crate::{
    action::{Action, actions_hash},
    error::SourceError,
    history::{AccountId, ActionSource, FetchRange, RawBatch},
    primitives::ActionState,
};

/// Batch histories keyed by account.
///
/// Unknown accounts have an empty history.
#[derive(Clone, Debug, Default)]
pub struct MemorySource {
    accounts: BTreeMap<AccountId, Result<Vec<RawBatch>, SourceError>>,
}

impl MemorySource {
    /// An archive with no accounts.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Store `batches` verbatim as `account`'s history.
    #[must_use]
    pub fn with_batches(mut self, account: AccountId, batches: Vec<RawBatch>) -> Self {
        self.accounts.insert(account, Ok(batches));
        self
    }

    /// Store `batches` as `account`'s history, reporting after each batch the
    /// action state a node would compute from the full action hashes.
    #[must_use]
    pub fn record(self, account: AccountId, batches: &[Vec<Action>]) -> Self {
        let raw = batches
            .iter()
            .scan(ActionState::empty(), |state, actions| {
                *state = state.update(actions_hash(actions));
                Some(RawBatch::from_actions(actions).with_hash(*state))
            })
            .collect();
        self.with_batches(account, raw)
    }

    /// Answer every fetch for `account` with `message` as an error.
    #[must_use]
    pub fn failing(mut self, account: AccountId, message: impl Into<String>) -> Self {
        self.accounts.insert(account, Err(SourceError::new(message)));
        self
    }

    /// Load `account`'s history from a JSON array of batches.
    pub fn from_json(account: AccountId, json: &str) -> Result<Self, serde_json::Error> {
        let batches = serde_json::from_str(json)?;
        Ok(Self::new().with_batches(account, batches))
    }

    fn select(
        &self,
        account: &AccountId,
        range: &FetchRange,
    ) -> Result<Vec<RawBatch>, SourceError> {
        let Some(archive) = self.accounts.get(account) else {
            return Ok(Vec::new());
        };
        let batches = archive.as_ref().map_err(SourceError::clone)?;
        let begin = match range.from_action_state {
            None => 0,
            Some(from) if from == ActionState::empty() => 0,
            Some(from) => position_after(batches, from)
                .ok_or_else(|| SourceError::new(format!("unknown fromActionState {from}")))?,
        };
        let end = match range.end_action_state {
            None => batches.len(),
            Some(end) => position_after(batches, end)
                .ok_or_else(|| SourceError::new(format!("unknown endActionState {end}")))?,
        };
        batches
            .get(begin..end)
            .map(<[RawBatch]>::to_vec)
            .ok_or_else(|| SourceError::new("endActionState precedes fromActionState"))
    }
}

/// Index just past the batch whose reported state is `state`.
fn position_after(batches: &[RawBatch], state: ActionState) -> Option<usize> {
    batches
        .iter()
        .position(|batch| batch.reported_state() == Some(state))
        .map(|index| index.saturating_add(1))
}

impl ActionSource for MemorySource {
    async fn fetch_actions(
        &self,
        account: &AccountId,
        range: &FetchRange,
    ) -> Result<Vec<RawBatch>, SourceError> {
        let selected = self.select(account, range);
        if let Ok(count) = selected.as_ref().map(Vec::len) {
            tracing::trace!(
                public_key = %account.public_key,
                batches = count,
                "served from memory"
            );
        }
        selected
    }
}

#[cfg(test)]
mod tests {
    use ff::Field as _;
    use pasta_curves::Fp;

    use super::*;
    use crate::{
        action::encode,
        history::{fetch_merkle_leaves, fold_batches},
        provable::{Keyed, Keyless},
    };

    fn alice() -> AccountId {
        AccountId::new("B62qalice")
    }

    fn history() -> Vec<Vec<Action>> {
        let entry = |key: u64, value: u64| {
            encode::<Keyed<Fp>, Fp>(Fp::ONE, &Fp::from(key), &Fp::from(value))
        };
        vec![
            vec![entry(7, 42), entry(9, 100)],
            vec![encode::<Keyless, [u64; 3]>(Fp::ONE, &(), &[1, 2, 3])],
            vec![],
            vec![entry(7, 43)],
        ]
    }

    /// States reported after each batch, computed from full action hashes.
    fn reported(batches: &[Vec<Action>]) -> Vec<ActionState> {
        batches
            .iter()
            .scan(ActionState::empty(), |state, actions| {
                *state = state.update(actions_hash(actions));
                Some(*state)
            })
            .collect()
    }

    fn four_states(batches: &[Vec<Action>]) -> [ActionState; 4] {
        <[ActionState; 4]>::try_from(reported(batches)).expect("four batches")
    }

    /// Leaf-based reconstruction agrees with the archive's own state.
    #[tokio::test]
    async fn reconstruction_matches_reported_state() {
        let batches = history();
        let source = MemorySource::new().record(alice(), &batches);
        let rebuilt = fetch_merkle_leaves(&source, &alice(), &FetchRange::all())
            .await
            .expect("well-formed history");
        let latest = *reported(&batches).last().expect("non-empty history");
        assert_eq!(rebuilt.len(), batches.len());
        assert_eq!(rebuilt.ensure_action_state(latest), Ok(()));
    }

    /// A range selects batches after `from` up to and including `end`.
    #[tokio::test]
    async fn ranges_are_exclusive_then_inclusive() {
        let batches = history();
        let [first, _, third, _] = four_states(&batches);
        let source = MemorySource::new().record(alice(), &batches);
        let range = FetchRange {
            from_action_state: Some(first),
            end_action_state: Some(third),
        };
        let selected = source.fetch_actions(&alice(), &range).await.expect("known bounds");
        assert_eq!(selected.len(), 2);
        assert_eq!(
            selected.last().and_then(RawBatch::reported_state),
            Some(third)
        );

        let partial = fold_batches(&selected, first).expect("well-formed");
        assert_eq!(partial.action_state(), third);
    }

    /// The empty state and an unset bound both mean "from the beginning".
    #[tokio::test]
    async fn empty_start_is_the_beginning() {
        let source = MemorySource::new().record(alice(), &history());
        let everything = source
            .fetch_actions(&alice(), &FetchRange::all())
            .await
            .expect("whole history");
        let from_empty = source
            .fetch_actions(&alice(), &FetchRange::after(ActionState::empty()))
            .await
            .expect("whole history");
        assert_eq!(everything, from_empty);
    }

    /// Bounds the archive has never reported are errors, as are inverted
    /// ranges.
    #[tokio::test]
    async fn bad_bounds_rejected() {
        let batches = history();
        let [first, _, third, _] = four_states(&batches);
        let source = MemorySource::new().record(alice(), &batches);

        let unknown = FetchRange::after(ActionState::from(Fp::from(5u64)));
        assert!(source.fetch_actions(&alice(), &unknown).await.is_err());

        let inverted = FetchRange {
            from_action_state: Some(third),
            end_action_state: Some(first),
        };
        assert!(source.fetch_actions(&alice(), &inverted).await.is_err());
    }

    /// Unknown accounts have no history; failing accounts report their
    /// error through reconstruction.
    #[tokio::test]
    async fn unknown_and_failing_accounts() {
        let bob = AccountId::new("B62qbob");
        let source = MemorySource::new().failing(bob.clone(), "account pruned");

        let nobody = AccountId::with_token("B62qalice", Fp::from(2u64));
        let empty = fetch_merkle_leaves(&source, &nobody, &FetchRange::all())
            .await
            .expect("no history is fine");
        assert_eq!(empty.action_state(), ActionState::empty());

        let error = fetch_merkle_leaves(&source, &bob, &FetchRange::all())
            .await
            .expect_err("failing account");
        assert_eq!(
            error.to_string(),
            "fetching action history failed",
            "source detail lives in the error source"
        );
    }

    /// JSON fixtures load as an account's history.
    #[tokio::test]
    async fn loads_json_fixture() {
        let json = r#"[
            {"actions": [["1", "0", "5", "6"], ["2", "0", "7", "8"]]},
            {"actions": [["3", "4"]], "hash": "12345"}
        ]"#;
        let source = MemorySource::from_json(alice(), json).expect("valid fixture");
        let rebuilt = fetch_merkle_leaves(&source, &alice(), &FetchRange::all())
            .await
            .expect("well-formed history");
        assert_eq!(rebuilt.len(), 2);
        let newest = rebuilt.newest().expect("two batches");
        let leaf = newest.newest().expect("one action");
        assert_eq!((leaf.key, leaf.value), (Fp::from(3u64), Fp::from(4u64)));
        assert!(MemorySource::from_json(alice(), "{").is_err());
    }
}

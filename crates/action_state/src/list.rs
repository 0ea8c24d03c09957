//! Hash-chained lists.
//!
//! A [`HashList`] is an ordered, append-only sequence together with a
//! running accumulator. Each element is folded in with a fixed rule,
//!
//! $$h_{i+1} = \text{combine}(h_i, \text{element\_hash}(e_i))$$
//!
//! starting from the chain's empty hash (or a caller-supplied start). The
//! fold is order-sensitive: the accumulator commits to the exact sequence.
//!
//! Lists are built by pushing at the *front*: the most recently pushed
//! element is the newest, and the accumulator always covers everything
//! pushed so far. Iteration runs in chain order, oldest first.
//!
//! ## Two Levels
//!
//! | List | Element | Empty hash | Combine |
//! | ---- | ------- | ---------- | ------- |
//! | [`ActionList`] | [`MerkleLeaf`] | empty actions hash | $\text{Poseidon}_{\text{"MinaZkappSeqEvents"}}(h \| \text{leaf})$ |
//! | [`ActionBatchList`] | [`ActionList`] | [`ActionState::empty`] | [`ActionState::update`] |

#![expect(
    clippy::module_name_repetitions,
    reason = "HashList, ActionList and ActionBatchList are the established names"
)]

use core::fmt;

use pasta_curves::Fp;

use crate::{
    action::empty_actions_hash,
    constants::SEQUENCE_EVENTS_PREFIX,
    error::HashMismatch,
    leaf::MerkleLeaf,
    poseidon,
    primitives::ActionState,
};

/// The folding rule of a [`HashList`].
pub trait Chain {
    /// Element type.
    type Element;

    /// Accumulator of the empty list.
    fn empty_hash() -> Fp;

    /// Hash of one element, as fed to [`combine`](Self::combine).
    fn element_hash(element: &Self::Element) -> Fp;

    /// Fold one element hash into the accumulator.
    fn combine(accumulator: Fp, element_hash: Fp) -> Fp;
}

struct Node<T> {
    /// Accumulator before this element was pushed.
    previous_hash: Fp,
    element: T,
}

/// An immutable hash-chained list with folding rule `C`.
pub struct HashList<C: Chain> {
    start: Fp,
    hash: Fp,
    /// Oldest first.
    nodes: Vec<Node<C::Element>>,
}

impl<C: Chain> HashList<C> {
    /// The empty list, at the chain's canonical empty hash.
    #[must_use]
    pub fn empty() -> Self {
        Self::starting_at(C::empty_hash())
    }

    /// An empty list whose accumulator starts at `hash`.
    ///
    /// Used to resume from a known accumulator instead of the beginning.
    #[must_use]
    pub const fn starting_at(hash: Fp) -> Self {
        Self {
            start: hash,
            hash,
            nodes: Vec::new(),
        }
    }

    /// Push `element` as the newest element.
    #[must_use]
    pub fn push_front(mut self, element: C::Element) -> Self {
        let previous_hash = self.hash;
        self.hash = C::combine(previous_hash, C::element_hash(&element));
        self.nodes.push(Node {
            previous_hash,
            element,
        });
        self
    }

    /// Build from elements given newest first.
    ///
    /// The input is reversed before folding, so the last element of
    /// `elements` is folded first.
    #[must_use]
    pub fn from_array(elements: Vec<C::Element>) -> Self {
        Self::from_reverse_array(elements.into_iter().rev())
    }

    /// Build from elements already in chain order (oldest first), folding
    /// them as given.
    #[must_use]
    pub fn from_reverse_array(elements: impl IntoIterator<Item = C::Element>) -> Self {
        elements.into_iter().fold(Self::empty(), Self::push_front)
    }

    /// The accumulator.
    #[must_use]
    pub const fn hash(&self) -> Fp {
        self.hash
    }

    /// The accumulator before any element was pushed.
    #[must_use]
    pub const fn start_hash(&self) -> Fp {
        self.start
    }

    /// Number of elements.
    #[must_use]
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Whether no element has been pushed.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Elements in chain order, oldest first.
    pub fn iter(&self) -> impl DoubleEndedIterator<Item = &C::Element> + ExactSizeIterator + Clone {
        self.nodes.iter().map(|node| &node.element)
    }

    /// The most recently pushed element.
    #[must_use]
    pub fn newest(&self) -> Option<&C::Element> {
        self.nodes.last().map(|node| &node.element)
    }

    /// Remove the newest element, restoring the accumulator it was pushed
    /// onto.
    #[must_use]
    pub fn pop_front(mut self) -> Option<(C::Element, Self)> {
        let node = self.nodes.pop()?;
        self.hash = node.previous_hash;
        Some((node.element, self))
    }

    /// Recompute the fold from the start hash and check it against every
    /// stored intermediate accumulator and the final one.
    #[must_use]
    pub fn verify(&self) -> bool {
        let mut accumulator = self.start;
        for node in &self.nodes {
            if node.previous_hash != accumulator {
                return false;
            }
            accumulator = C::combine(accumulator, C::element_hash(&node.element));
        }
        accumulator == self.hash
    }

    /// Take the elements, oldest first.
    #[must_use]
    pub fn into_elements(self) -> Vec<C::Element> {
        self.nodes.into_iter().map(|node| node.element).collect()
    }
}

impl<C: Chain> Clone for HashList<C>
where
    C::Element: Clone,
{
    fn clone(&self) -> Self {
        Self {
            start: self.start,
            hash: self.hash,
            nodes: self
                .nodes
                .iter()
                .map(|node| Node {
                    previous_hash: node.previous_hash,
                    element: node.element.clone(),
                })
                .collect(),
        }
    }
}

impl<C: Chain> fmt::Debug for HashList<C>
where
    C::Element: fmt::Debug,
{
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter
            .debug_struct("HashList")
            .field("start", &self.start)
            .field("hash", &self.hash)
            .field("elements", &self.iter().collect::<Vec<_>>())
            .finish()
    }
}

impl<C: Chain> PartialEq for HashList<C>
where
    C::Element: PartialEq,
{
    fn eq(&self, other: &Self) -> bool {
        self.start == other.start
            && self.hash == other.hash
            && self.iter().eq(other.iter())
    }
}

impl<C: Chain> Eq for HashList<C> where C::Element: Eq {}

/// Folding rule for the leaves of one batch.
#[derive(Clone, Copy, Debug)]
pub struct LeafChain;

impl Chain for LeafChain {
    type Element = MerkleLeaf;

    fn empty_hash() -> Fp {
        empty_actions_hash()
    }

    fn element_hash(leaf: &MerkleLeaf) -> Fp {
        leaf.hash()
    }

    fn combine(accumulator: Fp, leaf_hash: Fp) -> Fp {
        poseidon::hash_with_prefix(SEQUENCE_EVENTS_PREFIX, &[accumulator, leaf_hash])
    }
}

/// Folding rule for batches onto the action state.
#[derive(Clone, Copy, Debug)]
pub struct BatchChain;

impl Chain for BatchChain {
    type Element = ActionList;

    fn empty_hash() -> Fp {
        ActionState::empty().into()
    }

    fn element_hash(batch: &ActionList) -> Fp {
        batch.hash()
    }

    fn combine(accumulator: Fp, batch_hash: Fp) -> Fp {
        ActionState::from(accumulator).update(batch_hash).into()
    }
}

/// The leaves of one batch.
pub type ActionList = HashList<LeafChain>;

/// An action history: batches folded onto an action state.
pub type ActionBatchList = HashList<BatchChain>;

impl ActionBatchList {
    /// The accumulator as an action state.
    #[must_use]
    pub fn action_state(&self) -> ActionState {
        ActionState::from(self.hash())
    }

    /// Compare the accumulator against the action state the chain reports.
    pub fn ensure_action_state(&self, expected: ActionState) -> Result<(), HashMismatch> {
        let found = self.action_state();
        if found == expected {
            Ok(())
        } else {
            Err(HashMismatch { expected, found })
        }
    }
}

#[cfg(test)]
mod tests {
    use ff::Field as _;
    use proptest::prelude::*;

    use super::*;
    use crate::{
        action::{Action, actions_hash, encode},
        provable::Keyed,
    };

    fn leaf(key: u64, value: u64) -> MerkleLeaf {
        let action = encode::<Keyed<Fp>, Fp>(Fp::ONE, &Fp::from(key), &Fp::from(value));
        MerkleLeaf::from_action(action.as_slice()).expect("encoded action")
    }

    /// Empty lists sit at the canonical constants.
    #[test]
    fn empty_constants() {
        assert_eq!(ActionList::empty().hash(), empty_actions_hash());
        assert_eq!(ActionBatchList::empty().hash(), Fp::from(ActionState::empty()));
        assert_eq!(
            ActionBatchList::empty().action_state(),
            ActionState::empty()
        );
        let custom = Fp::from(99u64);
        assert_eq!(ActionBatchList::starting_at(custom).hash(), custom);
    }

    /// push_front folds left to right and iteration is oldest first.
    #[test]
    fn push_front_folds_in_chain_order() {
        let first = leaf(7, 42);
        let second = leaf(9, 100);
        let list = ActionList::empty()
            .push_front(first.clone())
            .push_front(second.clone());

        let expected = LeafChain::combine(
            LeafChain::combine(empty_actions_hash(), first.hash()),
            second.hash(),
        );
        assert_eq!(list.hash(), expected);
        assert_eq!(list.iter().collect::<Vec<_>>(), vec![&first, &second]);
        assert_eq!(list.newest(), Some(&second));
        assert_eq!(list.len(), 2);
    }

    /// from_reverse_array takes chain order; from_array takes the reverse.
    #[test]
    fn bulk_constructors_agree() {
        let leaves = vec![leaf(1, 2), leaf(3, 4), leaf(5, 6)];
        let chain = ActionList::from_reverse_array(leaves.clone());
        let mut newest_first = leaves.clone();
        newest_first.reverse();
        assert_eq!(ActionList::from_array(newest_first), chain);
        assert_eq!(chain.into_elements(), leaves);
    }

    /// A leaf list folds to the same hash as the full actions hash.
    #[test]
    fn leaf_list_matches_full_actions_hash() {
        let actions: Vec<Action> = [(7u64, 42u64), (9, 100)]
            .iter()
            .map(|&(key, value)| encode::<Keyed<Fp>, Fp>(Fp::ONE, &Fp::from(key), &Fp::from(value)))
            .collect();
        let leaves = actions
            .iter()
            .map(|action| MerkleLeaf::from_action(action.as_slice()).expect("encoded"));
        assert_eq!(
            ActionList::from_reverse_array(leaves).hash(),
            actions_hash(&actions)
        );
    }

    /// pop_front undoes push_front.
    #[test]
    fn pop_front_restores_accumulator() {
        let base = ActionList::from_reverse_array(vec![leaf(1, 1)]);
        let pushed = base.clone().push_front(leaf(2, 2));
        let (popped, rest) = pushed.pop_front().expect("non-empty");
        assert_eq!(popped, leaf(2, 2));
        assert_eq!(rest, base);
        assert!(ActionList::empty().pop_front().is_none(), "empty list");
    }

    /// verify accepts honest lists and rejects a tampered accumulator or
    /// element.
    #[test]
    fn verify_detects_tampering() {
        let list = ActionList::from_reverse_array(vec![leaf(1, 1), leaf(2, 2)]);
        assert!(list.verify(), "honest list");

        let mut forged_hash = list.clone();
        forged_hash.hash += Fp::ONE;
        assert!(!forged_hash.verify(), "forged accumulator");

        let mut forged_element = list;
        if let Some(node) = forged_element.nodes.first_mut() {
            node.element.value += Fp::ONE;
        }
        assert!(!forged_element.verify(), "forged element");
    }

    /// Batches chain through the action-state update rule.
    #[test]
    fn batch_list_uses_action_state_rule() {
        let batch = ActionList::from_reverse_array(vec![leaf(7, 42), leaf(9, 100)]);
        let history = ActionBatchList::from_reverse_array(vec![batch.clone()]);
        assert_eq!(
            history.action_state(),
            ActionState::empty().update(batch.hash())
        );
        assert!(history.ensure_action_state(history.action_state()).is_ok(), "matches itself");
        assert_eq!(
            history.ensure_action_state(ActionState::empty()),
            Err(HashMismatch {
                expected: ActionState::empty(),
                found: history.action_state(),
            })
        );
    }

    /// Iteration can be restarted and run backwards.
    #[test]
    fn iteration_is_restartable() {
        let list = ActionList::from_reverse_array(vec![leaf(1, 1), leaf(2, 2), leaf(3, 3)]);
        let forward: Vec<_> = list.iter().collect();
        let again: Vec<_> = list.iter().collect();
        let mut backward: Vec<_> = list.iter().rev().collect();
        backward.reverse();
        assert_eq!(forward, again);
        assert_eq!(forward, backward);
    }

    proptest! {
        /// Swapping two distinct elements changes the accumulator.
        #[test]
        fn folding_is_order_sensitive(
            values in prop::collection::vec(any::<u64>(), 2..6),
            i in any::<prop::sample::Index>(),
            j in any::<prop::sample::Index>(),
        ) {
            let first = i.index(values.len());
            let second = j.index(values.len());
            prop_assume!(values.get(first) != values.get(second));

            let leaves: Vec<MerkleLeaf> = values.iter().map(|value| leaf(0, *value)).collect();
            let mut swapped = leaves.clone();
            swapped.swap(first, second);
            prop_assert_ne!(
                ActionList::from_reverse_array(leaves).hash(),
                ActionList::from_reverse_array(swapped).hash()
            );
        }
    }
}

//! # action_state
//!
//! Encoding, hashing and re-deriving zkApp action state over the Pallas base
//! field.
//!
//! An account's actions are an append-only log of fixed-length field
//! element sequences. The chain commits to the log as an *action state*: a
//! hash chain over batches, each batch itself a hash chain over its
//! actions. This crate provides:
//! - **Encoding**: typed key/value records laid out as actions whose last
//!   two elements are a key hash and a value hash ([`encode`], [`decode`])
//! - **Selective hashing**: a [`MerkleLeaf`] re-hashes only that final pair
//!   on top of a precomputed prefix state, which is what a proof constrains
//! - **Reconstruction**: fetching an account's history from an
//!   [`ActionSource`] and folding it into an [`ActionBatchList`] whose
//!   [`ActionState`] can be compared against the chain
//!
//! ## Accumulators
//!
//! | Accumulator | Empty value | Combine |
//! | ----------- | ----------- | ------- |
//! | [`ActionList`] | `empty_hash_with_prefix("MinaZkappActionsEmpty")` | `hash_with_prefix("MinaZkappSeqEvents**", [acc, leaf_hash])` |
//! | [`ActionBatchList`] | `empty_hash_with_prefix("MinaZkappActionStateEmptyElt")` | `hash_with_prefix("MinaZkappSeqEvents**", [acc, list_hash])` |
//!
//! ## Trust
//!
//! A selective leaf hash vouches only for its `(key, value)` pair. The
//! prefix it sits on is [`Unconstrained`](witness::Unconstrained); only the
//! re-derived action state, compared against what the chain reports, binds
//! a history end to end.

#![cfg_attr(docsrs, feature(doc_cfg))]
#![allow(clippy::pub_use, reason = "exporting items for consumers")]

extern crate alloc;

pub mod action;
pub mod constants;
pub mod error;
pub mod history;
pub mod input;
pub mod leaf;
pub mod list;
pub mod poseidon;
pub mod provable;
pub mod source;
pub mod witness;

mod decimal;
mod primitives;

pub use action::{Action, DecodedAction, decode, encode};
pub use error::{ActionError, HashMismatch, HistoryError, SourceError, TypeCheckFailure};
pub use history::{AccountId, ActionSource, FetchRange, RawBatch, fetch_merkle_leaves};
pub use leaf::MerkleLeaf;
pub use list::{ActionBatchList, ActionList, HashList};
pub use primitives::ActionState;
pub use provable::{Actionable, KeyShape, Keyed, Keyless};
pub use source::MemorySource;

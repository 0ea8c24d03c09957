//! Native sponge over the Pallas base field.
//!
//! A width-3, rate-2 Poseidon sponge. This is the only hash primitive the
//! crate uses: action hashes, the selective leaf hash, and both levels of
//! the action-state chain are all built from [`update`].
//!
//! ## Permutation
//!
//! Parameters are `halo2_poseidon`'s [`P128Pow5T3`]: $x \mapsto x^5$, 8 full
//! rounds split around 56 partial rounds, with its round constants and MDS
//! matrix. Each round adds the round constants, applies the S-box (to every
//! element in a full round, to the first element in a partial round), then
//! multiplies by the MDS matrix.
//!
//! ## Absorption
//!
//! Input is absorbed in blocks of [`SPONGE_RATE`], zero-padded, with one
//! permutation per block. An empty input still permutes once. Because the
//! rate is two, absorbing `a ++ b` equals absorbing `a` then `b` whenever
//! `a` has even, non-zero length.

use core::ops::Range;

use ff::Field as _;
use halo2_poseidon::{Mds, P128Pow5T3, Spec};
use lazy_static::lazy_static;
use pasta_curves::Fp;

use crate::{
    constants::{SPONGE_RATE, SPONGE_WIDTH},
    input::pack_to_fields,
    provable::Actionable,
};

/// Sponge state: `[rate_0, rate_1, capacity]`.
pub type State = [Fp; SPONGE_WIDTH];

struct Parameters {
    round_constants: Vec<State>,
    mds: Mds<Fp, SPONGE_WIDTH>,
    /// Rounds in this range apply the S-box to the first element only.
    partial: Range<usize>,
}

lazy_static! {
    static ref PARAMETERS: Parameters = parameters();
}

#[expect(
    clippy::integer_division,
    clippy::integer_division_remainder_used,
    reason = "full rounds are split evenly around the partial rounds"
)]
fn parameters() -> Parameters {
    let (round_constants, mds, _) =
        <P128Pow5T3 as Spec<Fp, SPONGE_WIDTH, SPONGE_RATE>>::constants();
    let first_partial = <P128Pow5T3 as Spec<Fp, SPONGE_WIDTH, SPONGE_RATE>>::full_rounds() / 2;
    let partial_rounds = <P128Pow5T3 as Spec<Fp, SPONGE_WIDTH, SPONGE_RATE>>::partial_rounds();
    Parameters {
        round_constants,
        mds,
        partial: first_partial..first_partial + partial_rounds,
    }
}

fn sbox(element: Fp) -> Fp {
    <P128Pow5T3 as Spec<Fp, SPONGE_WIDTH, SPONGE_RATE>>::sbox(element)
}

/// Apply the permutation in place.
pub fn permute(state: &mut State) {
    let parameters = &*PARAMETERS;
    for (round, constants) in parameters.round_constants.iter().enumerate() {
        for (element, constant) in state.iter_mut().zip(constants) {
            *element += constant;
        }
        if parameters.partial.contains(&round) {
            if let Some(first) = state.first_mut() {
                *first = sbox(*first);
            }
        } else {
            for element in state.iter_mut() {
                *element = sbox(*element);
            }
        }
        let mixed = parameters.mds.map(|row| {
            row.iter()
                .zip(state.iter())
                .map(|(entry, element)| *entry * element)
                .sum::<Fp>()
        });
        *state = mixed;
    }
}

/// The all-zero starting state.
#[must_use]
pub const fn initial_state() -> State {
    [Fp::ZERO; SPONGE_WIDTH]
}

/// Absorb `input` into `state`.
///
/// An empty input applies the permutation once; otherwise one permutation
/// runs per (zero-padded) block of [`SPONGE_RATE`] elements.
#[must_use]
pub fn update(state: State, input: &[Fp]) -> State {
    let mut next = state;
    if input.is_empty() {
        permute(&mut next);
        return next;
    }
    for block in input.chunks(SPONGE_RATE) {
        // a short final block leaves the remaining rate element as is,
        // which is the same as absorbing a zero
        for (element, absorbed) in next.iter_mut().zip(block) {
            *element += absorbed;
        }
        permute(&mut next);
    }
    next
}

/// First element of the state.
#[must_use]
pub const fn squeeze(state: State) -> Fp {
    let [first, ..] = state;
    first
}

/// Hash a sequence of field elements from the initial state.
#[must_use]
pub fn hash(input: &[Fp]) -> Fp {
    squeeze(update(initial_state(), input))
}

/// Read an ASCII domain string as a little-endian integer.
///
/// Domains must be shorter than 32 bytes for the result to be injective;
/// every domain in [`constants`](crate::constants) is.
#[must_use]
pub fn prefix_to_field(prefix: &str) -> Fp {
    let radix = Fp::from(256u64);
    prefix
        .bytes()
        .rev()
        .fold(Fp::ZERO, |acc, byte| acc * radix + Fp::from(u64::from(byte)))
}

/// Sponge state after absorbing a domain prefix.
#[must_use]
pub fn salt(prefix: &str) -> State {
    update(initial_state(), &[prefix_to_field(prefix)])
}

/// Domain-separated hash: absorb `input` on top of [`salt`]`(prefix)`.
#[must_use]
pub fn hash_with_prefix(prefix: &str, input: &[Fp]) -> Fp {
    squeeze(update(salt(prefix), input))
}

/// The canonical "empty" value of a domain: its salt, squeezed.
#[must_use]
pub fn empty_hash_with_prefix(prefix: &str) -> Fp {
    squeeze(salt(prefix))
}

/// Hash a typed value through its packed input representation.
#[must_use]
pub fn hash_packed<T: Actionable>(value: &T) -> Fp {
    hash(&pack_to_fields(&value.to_input()))
}

#[cfg(test)]
mod tests {
    use ff::Field as _;
    use pasta_curves::Fp;
    use rand::{SeedableRng as _, rngs::StdRng};

    use super::*;
    use crate::constants::{EVENT_PREFIX, SEQUENCE_EVENTS_PREFIX};

    fn random_fields(count: usize, seed: u64) -> Vec<Fp> {
        let mut rng = StdRng::seed_from_u64(seed);
        (0..count).map(|_| Fp::random(&mut rng)).collect()
    }

    /// Round count and S-box follow the 128-bit Pow5T3 parameters.
    #[test]
    fn permutation_parameters() {
        assert_eq!(PARAMETERS.round_constants.len(), 64);
        assert_eq!(PARAMETERS.partial, 4..60);
        assert_eq!(sbox(Fp::from(2u64)), Fp::from(32u64));
    }

    /// The permutation must actually move the zero state.
    #[test]
    fn permutation_is_not_identity() {
        let mut state = initial_state();
        permute(&mut state);
        assert_ne!(state, initial_state());
    }

    /// An empty update is exactly one permutation.
    #[test]
    fn empty_update_permutes_once() {
        let mut expected = salt(EVENT_PREFIX);
        permute(&mut expected);
        assert_eq!(update(salt(EVENT_PREFIX), &[]), expected);
    }

    /// Splitting the input at an even, non-zero offset does not change the
    /// resulting state.
    #[test]
    fn update_splits_at_even_offsets() {
        let fields = random_fields(7, 1);
        let (head, tail) = fields.split_at(4);
        let whole = update(initial_state(), &fields);
        let split = update(update(initial_state(), head), tail);
        assert_eq!(whole, split);
    }

    /// An odd split misaligns the rate blocks and changes the state.
    #[test]
    fn update_does_not_split_at_odd_offsets() {
        let fields = random_fields(4, 2);
        let (head, tail) = fields.split_at(1);
        let whole = update(initial_state(), &fields);
        let split = update(update(initial_state(), head), tail);
        assert_ne!(whole, split);
    }

    /// A trailing zero is indistinguishable from padding.
    #[test]
    fn short_block_is_zero_padded() {
        let fields = random_fields(3, 3);
        let mut padded = fields.clone();
        padded.push(Fp::ZERO);
        assert_eq!(hash(&fields), hash(&padded));
    }

    /// Different domains separate otherwise identical inputs.
    #[test]
    fn prefixes_separate_domains() {
        let fields = random_fields(2, 4);
        assert_ne!(
            hash_with_prefix(EVENT_PREFIX, &fields),
            hash_with_prefix(SEQUENCE_EVENTS_PREFIX, &fields)
        );
        assert_ne!(
            empty_hash_with_prefix(EVENT_PREFIX),
            empty_hash_with_prefix(SEQUENCE_EVENTS_PREFIX)
        );
    }

    /// Domain strings are read little-endian: the first byte is least
    /// significant.
    #[test]
    fn prefix_to_field_is_little_endian() {
        assert_eq!(prefix_to_field("A"), Fp::from(0x41u64));
        assert_eq!(prefix_to_field("AB"), Fp::from(0x4241u64));
        assert_eq!(prefix_to_field(""), Fp::ZERO);
    }

    /// Hashing is a pure function of its input.
    #[test]
    fn hash_is_deterministic() {
        let fields = random_fields(5, 5);
        assert_eq!(hash(&fields), hash(&fields.clone()));
        assert_ne!(hash(&fields), hash(&random_fields(5, 6)));
    }
}

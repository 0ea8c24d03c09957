//! Protocol-wide domain separators and sponge parameters.
//!
//! Sponge domains are short ASCII strings read as a little-endian integer
//! (see [`prefix_to_field`](crate::poseidon::prefix_to_field)), so every
//! domain here is shorter than 32 bytes.

/// Domain for hashing a single action's fields.
///
/// $$\text{H}_{\text{action}}(a) = \text{Poseidon}_{\text{"MinaZkappEvent"}}(a_1 \| \cdots \| a_n)$$
///
/// Also the salt of the selective leaf hash, which is what makes the
/// selective hash of an even-length action equal to its full hash.
pub const EVENT_PREFIX: &str = "MinaZkappEvent******";

/// Domain for chaining hashes: both pushing an action onto a per-batch
/// actions hash and pushing a batch onto the action state.
pub const SEQUENCE_EVENTS_PREFIX: &str = "MinaZkappSeqEvents**";

/// Domain whose salt is the hash of an empty per-batch action list.
pub const ACTIONS_EMPTY_DOMAIN: &str = "MinaZkappActionsEmpty";

/// Domain whose salt is the action state before any action was applied.
pub const ACTION_STATE_EMPTY_DOMAIN: &str = "MinaZkappActionStateEmptyElt";

/// Sponge state width in field elements.
pub const SPONGE_WIDTH: usize = 3;

/// Sponge rate: field elements absorbed per permutation call.
pub const SPONGE_RATE: usize = 2;

/// Bit capacity available when packing small values into one field element.
///
/// A packed accumulator is flushed once adding the next value would reach
/// this many bits, keeping every packed element below the modulus.
pub const PACKED_FIELD_BITS: u32 = 255;

//! Hash inputs: whole field elements plus bit-packed small values.
//!
//! Small values (booleans, fixed-width integers) waste most of a field
//! element. A [`HashInput`] keeps them apart as `(value, bits)` pairs so
//! [`pack_to_fields`] can squeeze several into one element before hashing.

use ff::Field as _;
use pasta_curves::Fp;

use crate::constants::PACKED_FIELD_BITS;

/// Structured, packable form of a value.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
#[expect(clippy::module_name_repetitions, reason = "HashInput is the established name")]
pub struct HashInput {
    /// Elements hashed as-is.
    pub fields: Vec<Fp>,
    /// `(value, bit length)` pairs to be packed.
    pub packed: Vec<(Fp, u32)>,
}

impl HashInput {
    /// A single unpacked element.
    #[must_use]
    pub fn field(field: Fp) -> Self {
        Self {
            fields: vec![field],
            packed: Vec::new(),
        }
    }

    /// A single value known to fit in `bits` bits.
    #[must_use]
    pub fn packed(value: Fp, bits: u32) -> Self {
        Self {
            fields: Vec::new(),
            packed: vec![(value, bits)],
        }
    }

    /// Concatenate, keeping unpacked and packed parts separate.
    #[must_use]
    pub fn append(mut self, other: Self) -> Self {
        self.fields.extend(other.fields);
        self.packed.extend(other.packed);
        self
    }
}

/// Flatten a [`HashInput`] into field elements.
///
/// Packed values accumulate big-endian into one element,
/// `acc = acc * 2^bits + value`, until the next value would bring the
/// accumulator to [`PACKED_FIELD_BITS`]; then the accumulator is flushed and
/// restarts at that value. Output is the unpacked fields followed by the
/// flushed accumulators.
#[must_use]
pub fn pack_to_fields(input: &HashInput) -> Vec<Fp> {
    let mut fields = input.fields.clone();
    if input.packed.is_empty() {
        return fields;
    }

    let mut current = Fp::ZERO;
    let mut current_bits = 0u32;
    for &(value, bits) in &input.packed {
        current_bits = current_bits.saturating_add(bits);
        if current_bits < PACKED_FIELD_BITS {
            current = current * power_of_two(bits) + value;
        } else {
            fields.push(current);
            current_bits = bits;
            current = value;
        }
    }
    fields.push(current);
    fields
}

fn power_of_two(bits: u32) -> Fp {
    Fp::from(2u64).pow_vartime([u64::from(bits)])
}

//! Type descriptors for values carried inside actions.
//!
//! An [`Actionable`] type has a fixed width in field elements, converts to
//! and from that representation, and knows its packable hash input. Keys
//! are optional, which is modelled at the type level by [`KeyShape`]:
//! [`Keyed<K>`] for a typed key and [`Keyless`] for none, so that key width
//! is a total function of the shape rather than of a nullable value.

use core::marker::PhantomData;

use ff::{Field as _, PrimeField as _};
use pasta_curves::Fp;

use crate::{
    error::TypeCheckFailure,
    input::{HashInput, pack_to_fields},
    poseidon::{self, State},
};

/// A value with a fixed-width field-element encoding.
pub trait Actionable: Sized {
    /// Encoding width in field elements.
    const SIZE_IN_FIELDS: usize;

    /// Encode as exactly [`SIZE_IN_FIELDS`](Self::SIZE_IN_FIELDS) elements.
    fn to_fields(&self) -> Vec<Fp>;

    /// Decode from exactly [`SIZE_IN_FIELDS`](Self::SIZE_IN_FIELDS)
    /// elements.
    ///
    /// Fails when the length is wrong or an element has no representation
    /// in `Self` (an out-of-range integer, a boolean that is not 0 or 1).
    fn from_fields(fields: &[Fp]) -> Result<Self, TypeCheckFailure>;

    /// Validity predicate beyond representability.
    fn check(&self) -> Result<(), TypeCheckFailure> {
        Ok(())
    }

    /// Packable hash input.
    fn to_input(&self) -> HashInput;
}

/// Sequential reader over a field-element slice.
struct FieldReader<'fields> {
    rest: &'fields [Fp],
}

impl<'fields> FieldReader<'fields> {
    const fn new(fields: &'fields [Fp]) -> Self {
        Self { rest: fields }
    }

    fn read<T: Actionable>(&mut self) -> Result<T, TypeCheckFailure> {
        let (head, tail) = self
            .rest
            .split_at_checked(T::SIZE_IN_FIELDS)
            .ok_or_else(|| TypeCheckFailure::new::<T>("not enough field elements"))?;
        self.rest = tail;
        T::from_fields(head)
    }
}

fn single<T>(fields: &[Fp]) -> Result<Fp, TypeCheckFailure> {
    match *fields {
        [field] => Ok(field),
        _ => Err(TypeCheckFailure::new::<T>(
            "expected exactly one field element",
        )),
    }
}

fn exact_size<T: Actionable>(fields: &[Fp]) -> Result<(), TypeCheckFailure> {
    if fields.len() == T::SIZE_IN_FIELDS {
        Ok(())
    } else {
        Err(TypeCheckFailure::new::<T>("wrong number of field elements"))
    }
}

/// Little-endian low `N` bytes of `field`, if every higher byte is zero.
fn low_bytes<const N: usize>(field: Fp) -> Option<[u8; N]> {
    let repr = field.to_repr();
    let (low, high) = repr.split_at_checked(N)?;
    if high.iter().any(|byte| *byte != 0) {
        return None;
    }
    low.try_into().ok()
}

impl Actionable for Fp {
    const SIZE_IN_FIELDS: usize = 1;

    fn to_fields(&self) -> Vec<Fp> {
        vec![*self]
    }

    fn from_fields(fields: &[Fp]) -> Result<Self, TypeCheckFailure> {
        single::<Self>(fields)
    }

    fn to_input(&self) -> HashInput {
        HashInput::field(*self)
    }
}

impl Actionable for bool {
    const SIZE_IN_FIELDS: usize = 1;

    fn to_fields(&self) -> Vec<Fp> {
        vec![Fp::from(u64::from(*self))]
    }

    fn from_fields(fields: &[Fp]) -> Result<Self, TypeCheckFailure> {
        let field = single::<Self>(fields)?;
        if field == Fp::ZERO {
            Ok(false)
        } else if field == Fp::ONE {
            Ok(true)
        } else {
            Err(TypeCheckFailure::new::<Self>("not 0 or 1"))
        }
    }

    fn to_input(&self) -> HashInput {
        HashInput::packed(Fp::from(u64::from(*self)), 1)
    }
}

impl Actionable for u32 {
    const SIZE_IN_FIELDS: usize = 1;

    fn to_fields(&self) -> Vec<Fp> {
        vec![Fp::from(u64::from(*self))]
    }

    fn from_fields(fields: &[Fp]) -> Result<Self, TypeCheckFailure> {
        low_bytes(single::<Self>(fields)?)
            .map(Self::from_le_bytes)
            .ok_or_else(|| TypeCheckFailure::new::<Self>("exceeds 32 bits"))
    }

    fn to_input(&self) -> HashInput {
        HashInput::packed(Fp::from(u64::from(*self)), 32)
    }
}

impl Actionable for u64 {
    const SIZE_IN_FIELDS: usize = 1;

    fn to_fields(&self) -> Vec<Fp> {
        vec![Fp::from(*self)]
    }

    fn from_fields(fields: &[Fp]) -> Result<Self, TypeCheckFailure> {
        low_bytes(single::<Self>(fields)?)
            .map(Self::from_le_bytes)
            .ok_or_else(|| TypeCheckFailure::new::<Self>("exceeds 64 bits"))
    }

    fn to_input(&self) -> HashInput {
        HashInput::packed(Fp::from(*self), 64)
    }
}

impl<T: Actionable, const N: usize> Actionable for [T; N] {
    const SIZE_IN_FIELDS: usize = T::SIZE_IN_FIELDS * N;

    fn to_fields(&self) -> Vec<Fp> {
        self.iter().flat_map(Actionable::to_fields).collect()
    }

    fn from_fields(fields: &[Fp]) -> Result<Self, TypeCheckFailure> {
        exact_size::<Self>(fields)?;
        let mut reader = FieldReader::new(fields);
        let items = (0..N)
            .map(|_| reader.read::<T>())
            .collect::<Result<Vec<T>, _>>()?;
        items
            .try_into()
            .map_err(|_items| TypeCheckFailure::new::<Self>("wrong number of items"))
    }

    fn check(&self) -> Result<(), TypeCheckFailure> {
        self.iter().try_for_each(Actionable::check)
    }

    fn to_input(&self) -> HashInput {
        self.iter()
            .map(Actionable::to_input)
            .fold(HashInput::default(), HashInput::append)
    }
}

impl<A: Actionable, B: Actionable> Actionable for (A, B) {
    const SIZE_IN_FIELDS: usize = A::SIZE_IN_FIELDS + B::SIZE_IN_FIELDS;

    fn to_fields(&self) -> Vec<Fp> {
        let mut fields = self.0.to_fields();
        fields.extend(self.1.to_fields());
        fields
    }

    fn from_fields(fields: &[Fp]) -> Result<Self, TypeCheckFailure> {
        exact_size::<Self>(fields)?;
        let mut reader = FieldReader::new(fields);
        let first = reader.read::<A>()?;
        let second = reader.read::<B>()?;
        Ok((first, second))
    }

    fn check(&self) -> Result<(), TypeCheckFailure> {
        self.0.check()?;
        self.1.check()
    }

    fn to_input(&self) -> HashInput {
        self.0.to_input().append(self.1.to_input())
    }
}

/// Whether an action carries a key, and of which type.
pub trait KeyShape {
    /// The key value: `K` for [`Keyed<K>`], `()` for [`Keyless`].
    type Key;

    /// Key width in field elements; zero when keyless.
    const SIZE_IN_FIELDS: usize;

    /// Encode the key.
    fn to_fields(key: &Self::Key) -> Vec<Fp>;

    /// Decode and validate the key.
    fn from_fields(fields: &[Fp]) -> Result<Self::Key, TypeCheckFailure>;

    /// Absorb the key's packed input into a key-hash state.
    ///
    /// A keyless shape absorbs nothing; the state is returned unpermuted.
    fn absorb(state: State, key: &Self::Key) -> State;
}

/// An action keyed by a value of type `K`.
#[derive(Debug)]
pub struct Keyed<K>(PhantomData<K>);

/// An action without a key.
#[derive(Clone, Copy, Debug)]
pub struct Keyless;

impl<K: Actionable> KeyShape for Keyed<K> {
    type Key = K;

    const SIZE_IN_FIELDS: usize = K::SIZE_IN_FIELDS;

    fn to_fields(key: &K) -> Vec<Fp> {
        key.to_fields()
    }

    fn from_fields(fields: &[Fp]) -> Result<K, TypeCheckFailure> {
        let key = K::from_fields(fields)?;
        key.check()?;
        Ok(key)
    }

    fn absorb(state: State, key: &K) -> State {
        poseidon::update(state, &pack_to_fields(&key.to_input()))
    }
}

impl KeyShape for Keyless {
    type Key = ();

    const SIZE_IN_FIELDS: usize = 0;

    fn to_fields(_key: &()) -> Vec<Fp> {
        Vec::new()
    }

    fn from_fields(fields: &[Fp]) -> Result<(), TypeCheckFailure> {
        if fields.is_empty() {
            Ok(())
        } else {
            Err(TypeCheckFailure::new::<Self>("keyless action with key fields"))
        }
    }

    fn absorb(state: State, _key: &()) -> State {
        state
    }
}

//! Decimal text form of field elements, as nodes exchange them.

use ff::PrimeField as _;
use pasta_curves::Fp;

/// Parse a base-10 field element.
///
/// Values at or above the modulus are reduced, as the node does.
pub(crate) fn parse(decimal: &str) -> Option<Fp> {
    Fp::from_str_vartime(decimal)
}

/// Render the canonical integer of `field` in base 10.
#[expect(
    clippy::integer_division,
    clippy::integer_division_remainder_used,
    reason = "schoolbook long division by ten"
)]
pub(crate) fn format(field: Fp) -> String {
    // Little-endian digits of the canonical representative.
    let mut magnitude = field.to_repr();
    let mut digits = Vec::new();
    loop {
        let mut remainder = 0u32;
        for byte in magnitude.iter_mut().rev() {
            let acc = (remainder << 8) | u32::from(*byte);
            let [quotient, ..] = (acc / 10).to_le_bytes();
            *byte = quotient;
            remainder = acc % 10;
        }
        digits.extend(char::from_digit(remainder, 10));
        if magnitude.iter().all(|byte| *byte == 0) {
            break;
        }
    }
    digits.iter().rev().collect()
}

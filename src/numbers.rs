//! Arbitrary-precision integers and fixed-width encoding (spec.md §4.1, §6).
//!
//! Wraps `num_bigint::BigUint` rather than re-deriving modular arithmetic by
//! hand; the `safe_prime` group is the only place bignum modexp actually
//! runs, so this module stays thin.

use num_bigint::BigUint;
use num_traits::{One, Zero};

use crate::bytetree::{ByteTree, ByteTreeEncodable, FormatError};

/// Encodes `n` as a fixed-width big-endian byte string of length `width`,
/// as spec.md §6 requires for every `Z_q` element and big integer ("the
/// field-element width equals `⌈log₂ q⌉` rounded to bytes").
pub fn to_fixed_be(n: &BigUint, width: usize) -> Vec<u8> {
    let raw = n.to_bytes_be();
    assert!(raw.len() <= width, "value does not fit in {width} bytes");
    let mut out = vec![0u8; width - raw.len()];
    out.extend_from_slice(&raw);
    out
}

/// Inverse of [`to_fixed_be`]; any length is accepted, `FormatError` is
/// raised only if the decoded value does not round-trip back to the same
/// length (callers that need a specific width check it themselves).
pub fn from_fixed_be(bytes: &[u8]) -> BigUint {
    BigUint::from_bytes_be(bytes)
}

/// Byte width needed to hold any value in `[0, q)`.
pub fn byte_width(q: &BigUint) -> usize {
    ((q.bits() as usize) + 7) / 8
}

/// A `Z_q`-reduced big integer paired with its modulus, implementing the
/// additive/multiplicative operations spec.md §3 asks of the scalar field
/// ("the ring"): add, sub, mul, neg, inner product, fixed-width encoding.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RingElement {
    pub value: BigUint,
    pub modulus: BigUint,
}

impl RingElement {
    pub fn new(value: BigUint, modulus: BigUint) -> Self {
        RingElement { value: value % &modulus, modulus }
    }

    pub fn zero(modulus: BigUint) -> Self {
        RingElement { value: BigUint::zero(), modulus }
    }

    pub fn one(modulus: BigUint) -> Self {
        RingElement { value: BigUint::one(), modulus }
    }

    fn check_same_ring(&self, other: &Self) {
        assert_eq!(
            self.modulus, other.modulus,
            "mixing ring elements across incompatible moduli is a fatal error"
        );
    }

    pub fn add(&self, other: &Self) -> Self {
        self.check_same_ring(other);
        RingElement::new(&self.value + &other.value, self.modulus.clone())
    }

    pub fn sub(&self, other: &Self) -> Self {
        self.check_same_ring(other);
        let sum = &self.modulus + &self.value - &other.value;
        RingElement::new(sum, self.modulus.clone())
    }

    pub fn mul(&self, other: &Self) -> Self {
        self.check_same_ring(other);
        RingElement::new(&self.value * &other.value, self.modulus.clone())
    }

    pub fn neg(&self) -> Self {
        if self.value.is_zero() {
            self.clone()
        } else {
            RingElement::new(&self.modulus - &self.value, self.modulus.clone())
        }
    }

    /// `Σ x_i · y_i mod q`.
    pub fn inner_product(xs: &[RingElement], ys: &[RingElement]) -> Self {
        assert_eq!(xs.len(), ys.len(), "inner_product requires equal-length arrays");
        let modulus = xs.first().expect("inner_product of empty arrays is undefined").modulus.clone();
        xs.iter().zip(ys).fold(RingElement::zero(modulus), |acc, (x, y)| acc.add(&x.mul(y)))
    }

    pub fn to_fixed_be(&self, width: usize) -> Vec<u8> {
        to_fixed_be(&self.value, width)
    }
}

impl ByteTreeEncodable for RingElement {
    fn to_byte_tree(&self) -> ByteTree {
        ByteTree::leaf(to_fixed_be(&self.value, byte_width(&self.modulus)))
    }

    fn from_byte_tree(_tree: &ByteTree) -> Result<Self, FormatError> {
        // Decoding a bare RingElement needs the modulus from context; group
        // scalar types carry it and implement their own from_byte_tree.
        Err(FormatError::InvalidScalar)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fixed_be_round_trip_pads_to_width() {
        let n = BigUint::from(42u32);
        let encoded = to_fixed_be(&n, 8);
        assert_eq!(encoded.len(), 8);
        assert_eq!(from_fixed_be(&encoded), n);
    }

    #[test]
    fn ring_arithmetic_matches_naive_mod() {
        let q = BigUint::from(97u32);
        let a = RingElement::new(BigUint::from(40u32), q.clone());
        let b = RingElement::new(BigUint::from(90u32), q.clone());
        assert_eq!(a.add(&b).value, BigUint::from(33u32)); // (40+90) mod 97
        assert_eq!(a.sub(&b).value, BigUint::from(47u32)); // (40-90) mod 97 = -50 mod 97
        assert_eq!(a.mul(&b).value, BigUint::from((40u64 * 90) % 97));
        assert_eq!(a.neg().add(&a).value, BigUint::zero());
    }

    #[test]
    fn inner_product_is_sum_of_products() {
        let q = BigUint::from(1009u32);
        let xs: Vec<_> = [1u32, 2, 3].iter().map(|v| RingElement::new(BigUint::from(*v), q.clone())).collect();
        let ys: Vec<_> = [4u32, 5, 6].iter().map(|v| RingElement::new(BigUint::from(*v), q.clone())).collect();
        let got = RingElement::inner_product(&xs, &ys);
        assert_eq!(got.value, BigUint::from(1u32 * 4 + 2 * 5 + 3 * 6));
    }
}

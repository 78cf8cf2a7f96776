use num_bigint::BigUint;
use num_traits::{One, Zero};

use crate::bytetree::{ByteTree, FormatError};
use crate::groups::safe_prime::scalar::SafePrimeScalar;
use crate::groups::safe_prime::{element_byte_width, p, q};
use crate::numbers::{from_fixed_be, to_fixed_be};
use crate::traits::element::GroupElement;
use crate::traits::scalar::GroupScalar;

/// An element of `Z_p^*`, restricted (and checked, in the safe decode path)
/// to the order-`q` quadratic-residue subgroup where `p = 2q + 1` (spec.md
/// §3, §4.2).
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SafePrimeElement(BigUint);

impl SafePrimeElement {
    /// Wraps a raw residue mod `p` without checking subgroup membership.
    /// Used internally where membership is already guaranteed by
    /// construction (squaring, `hash_to_generators`).
    pub(crate) fn from_raw(value: BigUint) -> Self {
        SafePrimeElement(value % p())
    }

    pub fn value(&self) -> &BigUint {
        &self.0
    }
}

impl GroupElement for SafePrimeElement {
    type Scalar = SafePrimeScalar;

    fn identity() -> Self {
        SafePrimeElement(BigUint::one())
    }

    fn mul(&self, other: &Self) -> Self {
        SafePrimeElement((&self.0 * &other.0) % p())
    }

    fn inv(&self) -> Self {
        let modulus = p();
        let exponent = &modulus - BigUint::from(2u8);
        SafePrimeElement(self.0.modpow(&exponent, &modulus))
    }

    fn exp(&self, scalar: &Self::Scalar) -> Self {
        SafePrimeElement(self.0.modpow(&scalar.to_biguint(), &p()))
    }

    /// Subgroup membership: `1 <= value < p` and `value^q mod p == 1`.
    fn is_valid(&self) -> bool {
        let modulus = p();
        if self.0.is_zero() || self.0 >= modulus {
            return false;
        }
        self.0.modpow(&q(), &modulus).is_one()
    }

    fn to_byte_tree(&self) -> ByteTree {
        ByteTree::leaf(to_fixed_be(&self.0, element_byte_width()))
    }

    fn from_byte_tree_unsafe(tree: &ByteTree) -> Result<Self, FormatError> {
        let bytes = tree.as_leaf()?;
        let width = element_byte_width();
        if bytes.len() != width {
            return Err(FormatError::WrongLeafLength { expected: width, found: bytes.len() });
        }
        Ok(SafePrimeElement(from_fixed_be(bytes)))
    }
}

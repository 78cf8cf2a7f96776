use num_bigint::{BigInt, BigUint};
use num_integer::Integer;
use num_traits::{One, Zero};
use rand::{CryptoRng, RngCore};

use crate::bytetree::{ByteTree, FormatError};
use crate::groups::safe_prime::q;
use crate::numbers::{byte_width, from_fixed_be, to_fixed_be};
use crate::traits::scalar::GroupScalar;

/// An element of `Z_q`, the scalar field for [`crate::groups::safe_prime::SafePrimeGroup`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SafePrimeScalar(BigUint);

impl SafePrimeScalar {
    pub(crate) fn from_raw_reduced(value: BigUint) -> Self {
        SafePrimeScalar(value % q())
    }
}

impl GroupScalar for SafePrimeScalar {
    fn zero() -> Self {
        SafePrimeScalar(BigUint::zero())
    }

    fn one() -> Self {
        SafePrimeScalar(BigUint::one())
    }

    fn random<R: RngCore + CryptoRng>(rng: &mut R) -> Self {
        use num_bigint::RandBigInt;
        SafePrimeScalar(rng.gen_biguint_below(&q()))
    }

    fn add(&self, other: &Self) -> Self {
        SafePrimeScalar((&self.0 + &other.0) % q())
    }

    fn sub(&self, other: &Self) -> Self {
        let q = q();
        SafePrimeScalar((&q + &self.0 - &other.0) % &q)
    }

    fn mul(&self, other: &Self) -> Self {
        SafePrimeScalar((&self.0 * &other.0) % q())
    }

    fn neg(&self) -> Self {
        if self.0.is_zero() {
            self.clone()
        } else {
            SafePrimeScalar(&q() - &self.0)
        }
    }

    fn invert(&self) -> Option<Self> {
        if self.0.is_zero() {
            return None;
        }
        let q = BigInt::from(q());
        let value = BigInt::from(self.0.clone());
        let egcd = value.extended_gcd(&q);
        if !egcd.gcd.is_one() {
            return None;
        }
        let inv = ((egcd.x % &q) + &q) % &q;
        Some(SafePrimeScalar(inv.to_biguint().expect("reduced mod positive q is non-negative")))
    }

    fn from_biguint(n: &BigUint) -> Self {
        SafePrimeScalar::from_raw_reduced(n.clone())
    }

    fn to_biguint(&self) -> BigUint {
        self.0.clone()
    }

    fn to_byte_tree(&self) -> ByteTree {
        ByteTree::leaf(to_fixed_be(&self.0, byte_width(&q())))
    }

    fn from_byte_tree(tree: &ByteTree) -> Result<Self, FormatError> {
        let bytes = tree.as_leaf()?;
        let width = byte_width(&q());
        if bytes.len() != width {
            return Err(FormatError::WrongLeafLength { expected: width, found: bytes.len() });
        }
        let value = from_fixed_be(bytes);
        if value >= q() {
            return Err(FormatError::IntegerOutOfRange(value.to_string()));
        }
        Ok(SafePrimeScalar(value))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::OsRng;

    #[test]
    fn zero_is_additive_identity() {
        let s = SafePrimeScalar::random(&mut OsRng);
        assert_eq!(s.add(&SafePrimeScalar::zero()), s);
    }

    #[test]
    fn negation_inverts_addition() {
        let s = SafePrimeScalar::random(&mut OsRng);
        assert_eq!(s.add(&s.neg()), SafePrimeScalar::zero());
    }

    #[test]
    fn invert_of_nonzero_round_trips_to_one() {
        let s = SafePrimeScalar::random(&mut OsRng);
        let inv = s.invert().unwrap();
        assert_eq!(s.mul(&inv), SafePrimeScalar::one());
    }

    #[test]
    fn invert_of_zero_is_none() {
        assert!(SafePrimeScalar::zero().invert().is_none());
    }

    #[test]
    fn byte_tree_round_trip() {
        let s = SafePrimeScalar::random(&mut OsRng);
        let tree = s.to_byte_tree();
        assert_eq!(SafePrimeScalar::from_byte_tree(&tree).unwrap(), s);
    }

    #[test]
    fn from_biguint_reduces_values_at_or_above_q() {
        let q = q();
        let reduced = SafePrimeScalar::from_biguint(&q);
        assert_eq!(reduced, SafePrimeScalar::zero());
    }
}

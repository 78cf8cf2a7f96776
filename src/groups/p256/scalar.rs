use crate::bytetree::{ByteTree, FormatError};
use crate::traits::scalar::GroupScalar;
use core::fmt::Debug;
use num_bigint::BigUint;
use p256::elliptic_curve::Field;
use p256::elliptic_curve::PrimeField;
use p256::{FieldBytes, Scalar};
use rand::{CryptoRng, RngCore};

#[derive(Clone, Copy, PartialEq, Eq)]
pub struct P256Scalar(pub Scalar);

impl P256Scalar {
    pub fn new(scalar: Scalar) -> Self {
        P256Scalar(scalar)
    }
}

impl Debug for P256Scalar {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_tuple("P256Scalar").field(&self.0.to_repr()).finish()
    }
}

impl GroupScalar for P256Scalar {
    fn zero() -> Self {
        P256Scalar(Scalar::ZERO)
    }

    fn one() -> Self {
        P256Scalar(Scalar::ONE)
    }

    fn random<R: RngCore + CryptoRng>(rng: &mut R) -> Self {
        P256Scalar(Scalar::random(rng))
    }

    fn add(&self, other: &Self) -> Self {
        P256Scalar(self.0 + other.0)
    }

    fn sub(&self, other: &Self) -> Self {
        P256Scalar(self.0 - other.0)
    }

    fn mul(&self, other: &Self) -> Self {
        P256Scalar(self.0 * other.0)
    }

    fn neg(&self) -> Self {
        P256Scalar(-self.0)
    }

    fn invert(&self) -> Option<Self> {
        Option::from(self.0.invert()).map(P256Scalar)
    }

    fn from_biguint(n: &BigUint) -> Self {
        let order = super::p256_order();
        let reduced = n % &order;
        let mut be = reduced.to_bytes_be();
        while be.len() < 32 {
            be.insert(0, 0);
        }
        let field_bytes = FieldBytes::clone_from_slice(&be);
        P256Scalar(Scalar::from_repr(field_bytes).expect("reduced value always fits"))
    }

    fn to_biguint(&self) -> BigUint {
        BigUint::from_bytes_be(self.0.to_repr().as_slice())
    }

    fn to_byte_tree(&self) -> ByteTree {
        ByteTree::leaf(self.0.to_repr().to_vec())
    }

    fn from_byte_tree(tree: &ByteTree) -> Result<Self, FormatError> {
        let bytes = tree.as_leaf()?;
        if bytes.len() != 32 {
            return Err(FormatError::WrongLeafLength { expected: 32, found: bytes.len() });
        }
        let field_bytes = FieldBytes::clone_from_slice(bytes);
        Option::<Scalar>::from(Scalar::from_repr(field_bytes))
            .map(P256Scalar)
            .ok_or(FormatError::InvalidScalar)
    }
}

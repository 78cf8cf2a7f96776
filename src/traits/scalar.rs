use crate::bytetree::{ByteTree, FormatError};
use core::fmt::Debug;
use rand::{CryptoRng, RngCore};

/// An element of the scalar field `Z_q` (spec.md §3, "the ring").
pub trait GroupScalar: Clone + Debug + PartialEq + Eq + Send + Sync + Sized {
    fn zero() -> Self;
    fn one() -> Self;
    fn random<R: RngCore + CryptoRng>(rng: &mut R) -> Self;

    fn add(&self, other: &Self) -> Self;
    fn sub(&self, other: &Self) -> Self;
    fn mul(&self, other: &Self) -> Self;
    fn neg(&self) -> Self;
    fn invert(&self) -> Option<Self>;

    /// Reduces an arbitrary non-negative big integer into this field.
    fn from_biguint(n: &num_bigint::BigUint) -> Self;
    fn to_biguint(&self) -> num_bigint::BigUint;

    fn to_byte_tree(&self) -> ByteTree;
    fn from_byte_tree(tree: &ByteTree) -> Result<Self, FormatError>;
}

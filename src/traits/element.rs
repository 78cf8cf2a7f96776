use crate::bytetree::{ByteTree, FormatError};
use crate::traits::scalar::GroupScalar;
use core::fmt::Debug;

/// An element of a cryptographic group (spec.md §3).
///
/// Multiplicative notation throughout, matching spec.md's `g^x`, `a·b`
/// algebra, regardless of whether the concrete group is written additively
/// internally (elliptic-curve point addition) or multiplicatively (mod-`p`
/// residues) — `mul` is always "the group operation", `exp` is always
/// "repeated application of the group operation".
pub trait GroupElement: Clone + Debug + PartialEq + Eq + Send + Sync + Sized {
    type Scalar: GroupScalar;

    fn identity() -> Self;
    fn mul(&self, other: &Self) -> Self;
    fn inv(&self) -> Self;
    fn exp(&self, scalar: &Self::Scalar) -> Self;

    /// Subgroup-membership check, used both by the `safe` decode path and by
    /// [`crate::traits::group::CryptoGroup::verify_unsafe`] (spec.md §4.2).
    fn is_valid(&self) -> bool;

    fn to_byte_tree(&self) -> ByteTree;

    /// Syntactic decode only — does not check group membership. Callers
    /// that need a verified element should call [`GroupElement::from_byte_tree`]
    /// or run [`crate::traits::group::CryptoGroup::verify_unsafe`] afterwards.
    fn from_byte_tree_unsafe(tree: &ByteTree) -> Result<Self, FormatError>;

    /// Decode with membership verification (the "safe" mode of spec.md
    /// §4.2's `toElementArray`).
    fn from_byte_tree(tree: &ByteTree) -> Result<Self, FormatError> {
        let element = Self::from_byte_tree_unsafe(tree)?;
        if element.is_valid() {
            Ok(element)
        } else {
            Err(FormatError::InvalidGroupElement)
        }
    }
}

use crate::bytetree::{ByteTree, FormatError};
use crate::traits::element::GroupElement;
use crate::traits::scalar::GroupScalar;

/// A cyclic group of known prime order with a distinguished generator (spec.md §3).
///
/// Implementations are zero-sized marker types; every operation is dispatched
/// statically. Two groups never mix at the type level: `G::Element` and
/// `H::Element` are distinct Rust types for `G != H`. Array-length mismatches
/// within a single group are still checked explicitly where they occur.
pub trait CryptoGroup: Clone + std::fmt::Debug + Send + Sync + 'static {
    type Element: GroupElement<Scalar = Self::Scalar>;
    type Scalar: GroupScalar;

    /// `q`, the prime order of the group.
    fn order() -> num_bigint::BigUint;

    /// The distinguished generator `g`.
    fn generator() -> Self::Element;

    /// Fiat-Shamir scalar hash, used directly by [`CryptoGroup::hash_to_generators`]
    /// and as the building block `fiatshamir::Challenger` extends into a full
    /// transcript rather than a single hashed byte slice.
    fn hash_to_scalar(input_slices: &[&[u8]]) -> Self::Scalar;

    /// Derives `n` generators independent of `g` by hashing `tag` together
    /// with the session prefix `rho` and an index counter, then mapping into
    /// the group (spec.md §4.7). One-shot per session; callers cache the
    /// result.
    fn hash_to_generators(tag: &[u8], rho: &[u8], n: usize) -> Vec<Self::Element>;

    /// Decodes `n` elements from a byte-tree node of `n` children.
    ///
    /// In `safe` mode every element's membership in the group is verified
    /// during decode; in unsafe mode only syntactic validity is checked and
    /// the caller commits to verifying membership later (e.g. via
    /// [`CryptoGroup::verify_unsafe`], run in parallel). See spec.md §4.2.
    fn decode_element_array(
        tree: &ByteTree,
        n: usize,
        safe: bool,
    ) -> Result<Vec<Self::Element>, FormatError>;

    /// Parallel subgroup-membership check over elements decoded unsafe.
    /// Reports the first failing index, if any.
    fn verify_unsafe(elements: &[Self::Element]) -> Result<(), usize> {
        use rayon::prelude::*;
        elements
            .par_iter()
            .enumerate()
            .find_map_first(|(i, e)| if e.is_valid() { None } else { Some(i) })
            .map_or(Ok(()), Err)
    }
}

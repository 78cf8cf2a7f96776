pub mod element;
pub mod scalar;

pub use element::SafePrimeElement;
pub use scalar::SafePrimeScalar;

use num_bigint::BigUint;
use num_traits::One;

use crate::bytetree::{ByteTree, FormatError};
use crate::numbers::byte_width;
use crate::traits::element::GroupElement;
use crate::traits::group::CryptoGroup;
use crate::utils;

/// Marker struct for the multiplicative-subgroup-mod-safe-prime
/// instantiation of the group carrier (spec.md §3's second required group,
/// alongside the elliptic curve in [`crate::groups::p256`]).
///
/// Not present in the codebase this crate grew from; grounded instead on
/// the `num-bigint`-based modular arithmetic conventions found across the
/// wider corpus of sigma-protocol implementations, generalized to the
/// `CryptoGroup`/`GroupElement`/`GroupScalar` trait set used throughout
/// this crate.
#[derive(Debug, Clone)]
pub struct SafePrimeGroup;

/// RFC 3526 Group 14 (2048-bit MODP), a publicly documented safe prime
/// `p = 2q + 1` with `q` prime. Used here purely as a fixed, auditable
/// instance of the modulus; this crate does not generate fresh safe primes.
const P_HEX: &str = "\
FFFFFFFFFFFFFFFFC90FDAA22168C234C4C6628B80DC1CD129024E088A67CC7\
4020BBEA63B139B22514A08798E3404DDEF9519B3CD3A431B302B0A6DF25F14\
374FE1356D6D51C245E485B576625E7EC6F44C42E9A637ED6B0BFF5CB6F406B\
7EDEE386BFB5A899FA5AE9F24117C4B1FE649286651ECE45B3DC2007CB8A163\
BF0598DA48361C55D39A69163FA8FD24CF5F83655D23DCA3AD961C62F356208\
552BB9ED529077096966D670C354E4ABC9804F1746C08CA18217C32905E462E\
36CE3BE39E772C180E86039B2783A2EC07A28FB5C55DF06F4C52C9DE2BCBF69\
55817183995497CEA956AE515D2261898FA051015728E5A8AACAA68FFFFFFFF\
FFFFFFFF";

pub(crate) fn p() -> BigUint {
    BigUint::parse_bytes(P_HEX.as_bytes(), 16).expect("hardcoded safe prime parses")
}

/// `q = (p - 1) / 2`, the order of the quadratic-residue subgroup this group
/// actually implements.
pub(crate) fn q() -> BigUint {
    (p() - BigUint::one()) / BigUint::from(2u8)
}

impl CryptoGroup for SafePrimeGroup {
    type Element = SafePrimeElement;
    type Scalar = SafePrimeScalar;

    fn order() -> BigUint {
        q()
    }

    fn generator() -> Self::Element {
        // 4 = 2^2 is always a quadratic residue, hence (q being prime) has
        // order exactly q unless it happens to be 1, which it is not for
        // this particular p.
        SafePrimeElement::from_raw(BigUint::from(4u8))
    }

    fn hash_to_scalar(input_slices: &[&[u8]]) -> Self::Scalar {
        let mut hasher = utils::hash::new_default_hasher();
        utils::hash::update_hasher_with_slices(&mut hasher, input_slices);
        let digest = hasher.finalize();
        Self::Scalar::from_biguint(&BigUint::from_bytes_be(&digest))
    }

    /// Try-and-increment hash-to-group: hash `tag || rho || i || counter`
    /// into `Z_p^*` and square the result to land in the order-`q` subgroup
    /// (spec.md §4.7), retrying on the rare case that squaring produces the
    /// identity.
    fn hash_to_generators(tag: &[u8], rho: &[u8], n: usize) -> Vec<Self::Element> {
        let modulus = p();
        (0..n)
            .map(|i| {
                let index_bytes = (i as u64).to_be_bytes();
                let mut counter: u8 = 0;
                loop {
                    let mut hasher = utils::hash::new_default_hasher();
                    utils::hash::update_hasher_with_slices(
                        &mut hasher,
                        &[tag, rho, &index_bytes, &[counter]],
                    );
                    let digest = hasher.finalize();
                    let candidate = BigUint::from_bytes_be(&digest) % &modulus;
                    let squared = candidate.modpow(&BigUint::from(2u8), &modulus);
                    if !squared.is_one() && squared > BigUint::from(0u8) {
                        break SafePrimeElement::from_raw(squared);
                    }
                    counter = counter.wrapping_add(1);
                }
            })
            .collect()
    }

    fn decode_element_array(
        tree: &ByteTree,
        n: usize,
        safe: bool,
    ) -> Result<Vec<Self::Element>, FormatError> {
        let mut reader = tree.reader()?;
        if reader.remaining() != n {
            return Err(FormatError::WrongChildCount { expected: n, found: reader.remaining() });
        }
        let mut out = Vec::with_capacity(n);
        for _ in 0..n {
            let child = reader.next_child()?;
            let element = if safe {
                SafePrimeElement::from_byte_tree(child)?
            } else {
                SafePrimeElement::from_byte_tree_unsafe(child)?
            };
            out.push(element);
        }
        Ok(out)
    }
}

pub(crate) fn element_byte_width() -> usize {
    byte_width(&p())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn p_is_odd_and_q_is_half_of_p_minus_one() {
        let p = p();
        let q = q();
        assert!(&p % BigUint::from(2u8) == BigUint::one());
        assert_eq!(p, BigUint::from(2u8) * &q + BigUint::one());
    }

    #[test]
    fn generator_has_order_q() {
        let g = SafePrimeGroup::generator();
        let q = SafePrimeGroup::order();
        let should_be_identity = g.exp(&SafePrimeScalar::from_biguint(&q));
        assert_eq!(should_be_identity, SafePrimeElement::identity());
    }

    #[test]
    fn hash_to_generators_is_deterministic_and_valid() {
        let gens_a = SafePrimeGroup::hash_to_generators(b"tag", b"rho", 4);
        let gens_b = SafePrimeGroup::hash_to_generators(b"tag", b"rho", 4);
        assert_eq!(gens_a, gens_b);
        for g in &gens_a {
            assert!(g.is_valid());
        }
    }

    #[test]
    fn decode_element_array_round_trips() {
        let elements = SafePrimeGroup::hash_to_generators(b"array-tag", b"rho", 3);
        let tree = ByteTree::node(elements.iter().map(|e| e.to_byte_tree()).collect());
        let decoded = SafePrimeGroup::decode_element_array(&tree, 3, true).unwrap();
        assert_eq!(decoded, elements);
    }
}

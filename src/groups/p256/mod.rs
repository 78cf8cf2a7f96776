pub mod element;
pub mod scalar;

pub use element::P256Element;
pub use scalar::P256Scalar;

use num_bigint::BigUint;
use p256::elliptic_curve::sec1::FromEncodedPoint;
use p256::{EncodedPoint, ProjectivePoint};

use crate::bytetree::{ByteTree, FormatError};
use crate::traits::element::GroupElement;
use crate::traits::group::CryptoGroup;
use crate::utils;

/// Marker struct for the P-256 instantiation of the group carrier (spec.md §3).
#[derive(Debug, Clone)]
pub struct P256Group;

/// The P-256 curve order, as `BigUint`, used by [`P256Scalar::from_biguint`]
/// to reduce arbitrary integers into the field.
pub(crate) fn p256_order() -> BigUint {
    // NIST P-256 order n = FFFFFFFF00000000FFFFFFFFFFFFFFFFBCE6FAADA7179E84F3B9CAC2FC632551
    BigUint::parse_bytes(
        b"FFFFFFFF00000000FFFFFFFFFFFFFFFFBCE6FAADA7179E84F3B9CAC2FC632551",
        16,
    )
    .expect("hardcoded P-256 order parses")
}

impl CryptoGroup for P256Group {
    type Element = P256Element;
    type Scalar = P256Scalar;

    fn order() -> BigUint {
        p256_order()
    }

    fn generator() -> Self::Element {
        P256Element::new(p256::ProjectivePoint::GENERATOR)
    }

    fn hash_to_scalar(input_slices: &[&[u8]]) -> Self::Scalar {
        let mut hasher = utils::hash::new_256_hasher();
        utils::hash::update_hasher_with_slices(&mut hasher, input_slices);
        let digest = hasher.finalize();
        Self::Scalar::from_biguint(&BigUint::from_bytes_be(&digest))
    }

    /// Try-and-increment hash-to-curve (spec.md §4.7): hash `tag || rho || i
    /// || counter` to a candidate 32-byte x-coordinate, prepend a SEC1
    /// even-y sign tag, and attempt to decompress it onto the curve,
    /// incrementing the counter on failure. Unlike deriving a scalar and
    /// exponentiating the generator, this never produces a generator with a
    /// known discrete log relative to `g` — the whole point of an
    /// independent generator for a Pedersen commitment. Deterministic given
    /// `(tag, rho, n)`.
    fn hash_to_generators(tag: &[u8], rho: &[u8], n: usize) -> Vec<Self::Element> {
        const FIELD_BYTE_WIDTH: usize = 32;
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
                    let mut candidate = Vec::with_capacity(1 + FIELD_BYTE_WIDTH);
                    candidate.push(0x02);
                    candidate.extend_from_slice(&digest[..FIELD_BYTE_WIDTH]);
                    if let Ok(encoded) = EncodedPoint::from_bytes(&candidate) {
                        if let Some(point) =
                            Option::<ProjectivePoint>::from(ProjectivePoint::from_encoded_point(&encoded))
                        {
                            break P256Element(point);
                        }
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
                P256Element::from_byte_tree(child)?
            } else {
                P256Element::from_byte_tree_unsafe(child)?
            };
            out.push(element);
        }
        Ok(out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn order_parses_to_expected_bit_length() {
        assert_eq!(P256Group::order().bits(), 256);
    }

    #[test]
    fn hash_to_generators_is_deterministic_and_nonzero() {
        let gens_a = P256Group::hash_to_generators(b"test-tag", b"rho", 4);
        let gens_b = P256Group::hash_to_generators(b"test-tag", b"rho", 4);
        assert_eq!(gens_a, gens_b);
        for g in &gens_a {
            assert_ne!(*g, P256Element::identity());
        }
    }

    #[test]
    fn hash_to_generators_differs_by_tag() {
        let gens_a = P256Group::hash_to_generators(b"tag-a", b"rho", 2);
        let gens_b = P256Group::hash_to_generators(b"tag-b", b"rho", 2);
        assert_ne!(gens_a, gens_b);
    }

    #[test]
    fn decode_element_array_round_trips() {
        let elements = P256Group::hash_to_generators(b"array-tag", b"rho", 3);
        let tree = ByteTree::node(elements.iter().map(|e| e.to_byte_tree()).collect());
        let decoded = P256Group::decode_element_array(&tree, 3, true).unwrap();
        assert_eq!(decoded, elements);
    }

    #[test]
    fn decode_element_array_rejects_wrong_count() {
        let elements = P256Group::hash_to_generators(b"array-tag", b"rho", 3);
        let tree = ByteTree::node(elements.iter().map(|e| e.to_byte_tree()).collect());
        assert!(P256Group::decode_element_array(&tree, 4, true).is_err());
    }
}

use crate::bytetree::{ByteTree, FormatError};
use crate::groups::p256::scalar::P256Scalar;
use crate::traits::element::GroupElement;
use core::fmt::Debug;
use p256::elliptic_curve::group::Group;
use p256::elliptic_curve::sec1::{FromEncodedPoint, ToEncodedPoint};
use p256::{EncodedPoint, ProjectivePoint};

/// Byte width of a P-256 affine coordinate (256-bit field, big-endian).
const FIELD_BYTE_WIDTH: usize = 32;

/// A P-256 group element, wire-encoded as two fixed-width big-endian
/// integers `(x, y)` (spec.md §6). Identity gets two all-zero
/// `FIELD_BYTE_WIDTH`-byte leaves, distinct from any point actually on the
/// curve: `(0, 0)` doesn't satisfy `y^2 = x^3 - 3x + b` since `b != 0`.
#[derive(Clone, Copy)]
pub struct P256Element(pub ProjectivePoint);

impl P256Element {
    pub fn new(point: ProjectivePoint) -> Self {
        P256Element(point)
    }
}

impl Debug for P256Element {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_tuple("P256Element").field(&self.to_byte_tree()).finish()
    }
}

impl PartialEq for P256Element {
    fn eq(&self, other: &Self) -> bool {
        self.0 == other.0
    }
}
impl Eq for P256Element {}

impl GroupElement for P256Element {
    type Scalar = P256Scalar;

    fn identity() -> Self {
        P256Element(ProjectivePoint::IDENTITY)
    }

    fn mul(&self, other: &Self) -> Self {
        P256Element(self.0 + other.0)
    }

    fn inv(&self) -> Self {
        P256Element(-self.0)
    }

    fn exp(&self, scalar: &Self::Scalar) -> Self {
        P256Element(self.0 * scalar.0)
    }

    fn is_valid(&self) -> bool {
        // P-256 has prime order and no cofactor: any point `p256` itself
        // decoded onto the curve is automatically in the subgroup.
        true
    }

    fn to_byte_tree(&self) -> ByteTree {
        if bool::from(self.0.is_identity()) {
            return ByteTree::node(vec![
                ByteTree::leaf(vec![0u8; FIELD_BYTE_WIDTH]),
                ByteTree::leaf(vec![0u8; FIELD_BYTE_WIDTH]),
            ]);
        }
        let encoded = self.0.to_affine().to_encoded_point(false);
        let bytes = encoded.as_bytes();
        let x = bytes[1..1 + FIELD_BYTE_WIDTH].to_vec();
        let y = bytes[1 + FIELD_BYTE_WIDTH..1 + 2 * FIELD_BYTE_WIDTH].to_vec();
        ByteTree::node(vec![ByteTree::leaf(x), ByteTree::leaf(y)])
    }

    fn from_byte_tree_unsafe(tree: &ByteTree) -> Result<Self, FormatError> {
        let mut reader = tree.reader()?;
        if reader.remaining() != 2 {
            return Err(FormatError::WrongChildCount { expected: 2, found: reader.remaining() });
        }
        let x = reader.read_bytes(FIELD_BYTE_WIDTH)?;
        let y = reader.read_bytes(FIELD_BYTE_WIDTH)?;
        if x.iter().all(|&b| b == 0) && y.iter().all(|&b| b == 0) {
            return Ok(P256Element(ProjectivePoint::IDENTITY));
        }
        let mut uncompressed = Vec::with_capacity(1 + 2 * FIELD_BYTE_WIDTH);
        uncompressed.push(0x04);
        uncompressed.extend_from_slice(&x);
        uncompressed.extend_from_slice(&y);
        let encoded = EncodedPoint::from_bytes(&uncompressed).map_err(|_| FormatError::InvalidGroupElement)?;
        Option::<ProjectivePoint>::from(ProjectivePoint::from_encoded_point(&encoded))
            .map(P256Element)
            .ok_or(FormatError::InvalidGroupElement)
    }
}

impl Default for P256Element {
    fn default() -> Self {
        Self::identity()
    }
}

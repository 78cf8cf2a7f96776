//! ElGamal encryption over the group carrier (spec.md glossary: "ElGamal
//! ciphertext", "re-encryption").

use rand::{CryptoRng, RngCore};

use crate::bytetree::{ByteTree, ByteTreeEncodable, FormatError};
use crate::traits::element::GroupElement;
use crate::traits::group::CryptoGroup;
use crate::traits::scalar::GroupScalar;

/// A public-key pair `pk = (g, y)`; `g` is the group's fixed generator, so
/// only `y` is carried explicitly.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PublicKey<G: CryptoGroup> {
    pub y: G::Element,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct KeyPair<G: CryptoGroup> {
    pub public: PublicKey<G>,
    pub secret: G::Scalar,
}

impl<G: CryptoGroup> KeyPair<G> {
    pub fn generate<R: RngCore + CryptoRng>(rng: &mut R) -> Self {
        let secret = G::Scalar::random(rng);
        let y = G::generator().exp(&secret);
        KeyPair { public: PublicKey { y }, secret }
    }
}

/// `(u, v) = (g^s, y^s · m)`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Ciphertext<G: CryptoGroup> {
    pub u: G::Element,
    pub v: G::Element,
}

impl<G: CryptoGroup> Ciphertext<G> {
    pub fn encrypt<R: RngCore + CryptoRng>(
        message: &G::Element,
        pk: &PublicKey<G>,
        rng: &mut R,
    ) -> (Self, G::Scalar) {
        let s = G::Scalar::random(rng);
        (Self::encrypt_with(message, pk, &s), s)
    }

    /// Encrypts with an explicit randomness scalar (used by the shuffle
    /// prover, which must track `s_i` as part of its witness).
    pub fn encrypt_with(message: &G::Element, pk: &PublicKey<G>, s: &G::Scalar) -> Self {
        Ciphertext { u: G::generator().exp(s), v: pk.y.exp(s).mul(message) }
    }

    pub fn decrypt(&self, secret: &G::Scalar) -> G::Element {
        let shared = self.u.exp(secret);
        self.v.mul(&shared.inv())
    }

    /// Re-encrypts with fresh randomness `s'`: multiplies by `Enc_{pk}(1; s')`.
    pub fn reencrypt(&self, pk: &PublicKey<G>, s_prime: &G::Scalar) -> Self {
        let blank = Ciphertext::encrypt_with(&G::Element::identity(), pk, s_prime);
        Ciphertext { u: self.u.mul(&blank.u), v: self.v.mul(&blank.v) }
    }

    pub fn mul(&self, other: &Self) -> Self {
        Ciphertext { u: self.u.mul(&other.u), v: self.v.mul(&other.v) }
    }

    /// Raises both components to `scalar`: `(u^e, v^e)`. Used by the shuffle
    /// engine's batched re-encryption check, not by any decryption path.
    pub fn exp(&self, scalar: &G::Scalar) -> Self {
        Ciphertext { u: self.u.exp(scalar), v: self.v.exp(scalar) }
    }

    /// `Enc_pk(1; s)`, the "blank" ciphertext used to shift a product of
    /// re-encryptions by a single aggregated exponent.
    pub fn blank(pk: &PublicKey<G>, s: &G::Scalar) -> Self {
        Ciphertext::encrypt_with(&G::Element::identity(), pk, s)
    }
}

impl<G: CryptoGroup> ByteTreeEncodable for Ciphertext<G> {
    fn to_byte_tree(&self) -> ByteTree {
        ByteTree::node(vec![self.u.to_byte_tree(), self.v.to_byte_tree()])
    }

    fn from_byte_tree(tree: &ByteTree) -> Result<Self, FormatError> {
        let mut reader = tree.reader()?;
        let u = G::Element::from_byte_tree(reader.next_child()?)?;
        let v = G::Element::from_byte_tree(reader.next_child()?)?;
        Ok(Ciphertext { u, v })
    }
}

//! `PoSCBasicTW`: proves that an array of permutation commitments `u` is a
//! valid shuffle of the independent generators `h` (spec.md §4.7).
//!
//! Same `(α,β,γ,δ,ε)` bridging machinery as [`crate::shuffle::pos`], minus
//! the ciphertext limb — there is no `w`/`w'`/`F`/`F'`/`k_F` here, since
//! nothing is being re-encrypted. Used as the precomputation step that
//! produces a `u` later consumed by [`crate::shuffle::ccpos`].

use rand::{CryptoRng, RngCore};

use crate::bytetree::{ByteTree, ByteTreeEncodable, FormatError};
use crate::errors::ProtocolError;
use crate::fiatshamir::Challenger;
use crate::permutation::{commit_permutation, Permutation};
use crate::shuffle::bridging;
use crate::shuffle::ProtocolParams;
use crate::traits::group::CryptoGroup;
use crate::traits::scalar::GroupScalar;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Instance<G: CryptoGroup> {
    pub h: Vec<G::Element>,
    pub u: Vec<G::Element>,
}

#[derive(Clone, Debug)]
pub struct Witness<G: CryptoGroup> {
    pub perm: Permutation,
    pub r: Vec<G::Scalar>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Proof<G: CryptoGroup> {
    pub bridging: bridging::Commitments<G>,
    pub response: bridging::Response<G>,
}

impl<G: CryptoGroup> ByteTreeEncodable for Proof<G> {
    fn to_byte_tree(&self) -> ByteTree {
        ByteTree::node(vec![self.bridging.to_byte_tree(), self.response.to_byte_tree()])
    }

    fn from_byte_tree(tree: &ByteTree) -> Result<Self, FormatError> {
        let mut reader = tree.reader()?;
        let bridging = bridging::Commitments::from_byte_tree(reader.next_child()?)?;
        let response = bridging::Response::from_byte_tree(reader.next_child()?)?;
        Ok(Proof { bridging, response })
    }
}

fn tagged(tag: &str, inner: ByteTree) -> ByteTree {
    ByteTree::node(vec![ByteTree::leaf(tag.as_bytes().to_vec()), inner])
}

fn instance_tree<G: CryptoGroup>(instance: &Instance<G>) -> ByteTree {
    ByteTree::node(vec![
        bridging::encode_elements::<G>(&instance.h),
        bridging::encode_elements::<G>(&instance.u),
    ])
}

pub fn prove<G: CryptoGroup, R: RngCore + CryptoRng>(
    instance: &Instance<G>,
    witness: &Witness<G>,
    challenger: &Challenger,
    params: ProtocolParams,
    rng: &mut R,
) -> Result<Proof<G>, ProtocolError> {
    let n = instance.h.len();
    if witness.perm.len() != n || witness.r.len() != n || instance.u.len() != n {
        return Err(ProtocolError::InvalidWitness("witness arrays do not match instance size".into()));
    }
    let g = G::generator();
    let expected_u = commit_permutation::<G>(&witness.perm, &g, &instance.h, &witness.r)
        .map_err(|e| ProtocolError::InvalidWitness(e.to_string()))?;
    if expected_u != instance.u {
        return Err(ProtocolError::InvalidWitness("permutation commitment does not open u".into()));
    }

    let e: Vec<G::Scalar> = challenger
        .batching_vector(&tagged("posc/batch", instance_tree(instance)), n, params.n_e)
        .iter()
        .map(G::Scalar::from_biguint)
        .collect();
    // See `pos::prove`'s matching comment: `e'` must use the inverse
    // permutation's `apply` for the bridging check to hold.
    let e_prime = witness.perm.inverse().apply(&e);

    let (commitments, secrets) = bridging::commit::<G, R>(&instance.h, &e_prime, rng)
        .map_err(|err| ProtocolError::InvalidWitness(err.to_string()))?;

    let v = G::Scalar::from_biguint(
        &challenger.scalar(&tagged("posc/challenge", commitments.to_byte_tree()), params.n_v),
    );

    let response = bridging::respond(&v, &secrets, &witness.r, &e_prime)
        .map_err(|err| ProtocolError::InvalidWitness(err.to_string()))?;

    Ok(Proof { bridging: commitments, response })
}

pub fn verify<G: CryptoGroup>(
    instance: &Instance<G>,
    proof: &Proof<G>,
    challenger: &Challenger,
    params: ProtocolParams,
) -> bool {
    let n = instance.h.len();
    if instance.u.len() != n || proof.bridging.b.len() != n {
        return false;
    }

    let e: Vec<G::Scalar> = challenger
        .batching_vector(&tagged("posc/batch", instance_tree(instance)), n, params.n_e)
        .iter()
        .map(G::Scalar::from_biguint)
        .collect();

    let v = G::Scalar::from_biguint(
        &challenger.scalar(&tagged("posc/challenge", proof.bridging.to_byte_tree()), params.n_v),
    );

    matches!(
        bridging::verify::<G>(&instance.h, &instance.u, &e, &proof.bridging, &proof.response, &v),
        Ok(true)
    )
}

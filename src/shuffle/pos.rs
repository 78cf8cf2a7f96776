//! `PoSBasicTW`: the Terelius-Wikström proof of a shuffle (spec.md §4.5).
//!
//! Proves that `w'` is a re-encrypted permutation of `w` under the *same*
//! secret permutation that opens the Pedersen commitment `u` against the
//! independent generators `h`, without revealing the permutation or the
//! re-encryption exponents. Built from two pieces: the bridging-commitment
//! argument in [`crate::shuffle::bridging`] (knowledge of `π, r` opening
//! `u`), plus the batched re-encryption relation (`F, F', k_F` below) tying
//! the same `π` to `w'`.
//!
//! Ciphertexts carry a width (`w[i].len()`) for sessions encrypting
//! ciphertext tuples rather than single messages; every relation below
//! applies componentwise across that width, since a shared `Z_q` exponent
//! acts identically on every lane of a product group (spec.md §3's `G^ω`
//! note).

use rand::{CryptoRng, RngCore};

use crate::bytetree::{encode_vec, ByteTree, ByteTreeEncodable, FormatError};
use crate::carrier::ScalarArray;
use crate::elgamal::{Ciphertext, PublicKey};
use crate::errors::{ArithmeticError, ProtocolError};
use crate::fiatshamir::Challenger;
use crate::permutation::{commit_permutation, Permutation};
use crate::shuffle::bridging;
use crate::shuffle::ProtocolParams;
use crate::traits::element::GroupElement;
use crate::traits::group::CryptoGroup;
use crate::traits::scalar::GroupScalar;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Instance<G: CryptoGroup> {
    pub h: Vec<G::Element>,
    pub u: Vec<G::Element>,
    pub pk: PublicKey<G>,
    pub w: Vec<Vec<Ciphertext<G>>>,
    pub w_prime: Vec<Vec<Ciphertext<G>>>,
}

impl<G: CryptoGroup> Instance<G> {
    pub fn n(&self) -> usize {
        self.h.len()
    }

    pub fn width(&self) -> usize {
        self.w.first().map_or(0, |lane| lane.len())
    }
}

#[derive(Clone, Debug)]
pub struct Witness<G: CryptoGroup> {
    pub perm: Permutation,
    pub r: Vec<G::Scalar>,
    pub s: Vec<G::Scalar>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Proof<G: CryptoGroup> {
    pub bridging: bridging::Commitments<G>,
    pub f_prime: Vec<Ciphertext<G>>,
    pub response: bridging::Response<G>,
    pub k_f: G::Scalar,
}

impl<G: CryptoGroup> ByteTreeEncodable for Proof<G> {
    fn to_byte_tree(&self) -> ByteTree {
        ByteTree::node(vec![
            self.bridging.to_byte_tree(),
            encode_vec(&self.f_prime),
            self.response.to_byte_tree(),
            self.k_f.to_byte_tree(),
        ])
    }

    fn from_byte_tree(tree: &ByteTree) -> Result<Self, FormatError> {
        let mut reader = tree.reader()?;
        let bridging = bridging::Commitments::from_byte_tree(reader.next_child()?)?;
        let f_prime = reader.next_child()?.decode_vec::<Ciphertext<G>>()?;
        let response = bridging::Response::from_byte_tree(reader.next_child()?)?;
        let k_f = G::Scalar::from_byte_tree(reader.next_child()?)?;
        Ok(Proof { bridging, f_prime, response, k_f })
    }
}

fn tagged(tag: &str, inner: ByteTree) -> ByteTree {
    ByteTree::node(vec![ByteTree::leaf(tag.as_bytes().to_vec()), inner])
}

fn encode_wide<G: CryptoGroup>(wide: &[Vec<Ciphertext<G>>]) -> ByteTree {
    ByteTree::node(wide.iter().map(|lane| encode_vec(lane)).collect())
}

fn instance_tree<G: CryptoGroup>(instance: &Instance<G>) -> ByteTree {
    ByteTree::node(vec![
        bridging::encode_elements::<G>(&instance.h),
        bridging::encode_elements::<G>(&instance.u),
        instance.pk.y.to_byte_tree(),
        encode_wide(&instance.w),
        encode_wide(&instance.w_prime),
    ])
}

fn round1_tree<G: CryptoGroup>(
    commitments: &bridging::Commitments<G>,
    f_prime: &[Ciphertext<G>],
) -> ByteTree {
    ByteTree::node(vec![commitments.to_byte_tree(), encode_vec(f_prime)])
}

/// `∏ bases_i[lane]^{exps_i}` for every lane, sequentially (ciphertext
/// widths are small; this isn't on the hot path that `ElementArray::exp_prod`
/// parallelizes).
fn wide_exp_prod<G: CryptoGroup>(
    bases: &[Vec<Ciphertext<G>>],
    exps: &[G::Scalar],
) -> Result<Vec<Ciphertext<G>>, ArithmeticError> {
    if bases.len() != exps.len() {
        return Err(ArithmeticError::LengthMismatch { expected: bases.len(), found: exps.len() });
    }
    if bases.is_empty() {
        return Err(ArithmeticError::EmptyArray);
    }
    let width = bases[0].len();
    let mut acc: Vec<Ciphertext<G>> =
        (0..width).map(|_| Ciphertext { u: G::Element::identity(), v: G::Element::identity() }).collect();
    for (wc, e) in bases.iter().zip(exps) {
        for lane in 0..width {
            acc[lane] = acc[lane].mul(&wc[lane].exp(e));
        }
    }
    Ok(acc)
}

fn check_witness<G: CryptoGroup>(
    instance: &Instance<G>,
    witness: &Witness<G>,
) -> Result<(), ProtocolError> {
    let n = instance.n();
    if witness.perm.len() != n || witness.r.len() != n || witness.s.len() != n {
        return Err(ProtocolError::InvalidWitness("witness arrays do not match instance size".into()));
    }
    let g = G::generator();
    let expected_u = commit_permutation::<G>(&witness.perm, &g, &instance.h, &witness.r)
        .map_err(|e| ProtocolError::InvalidWitness(e.to_string()))?;
    if expected_u != instance.u {
        return Err(ProtocolError::InvalidWitness("permutation commitment does not open u".into()));
    }
    let permuted_w = witness.perm.inverse().apply(&instance.w);
    for (i, (w_prime_i, w_mapped)) in instance.w_prime.iter().zip(&permuted_w).enumerate() {
        let expected: Vec<Ciphertext<G>> = w_mapped
            .iter()
            .map(|c| Ciphertext::blank(&instance.pk, &witness.s[i]).mul(c))
            .collect();
        if &expected != w_prime_i {
            return Err(ProtocolError::InvalidWitness(format!(
                "re-encryption relation fails to hold at index {i}"
            )));
        }
    }
    Ok(())
}

pub fn prove<G: CryptoGroup, R: RngCore + CryptoRng>(
    instance: &Instance<G>,
    witness: &Witness<G>,
    challenger: &Challenger,
    params: ProtocolParams,
    rng: &mut R,
) -> Result<Proof<G>, ProtocolError> {
    check_witness(instance, witness)?;

    let e: Vec<G::Scalar> = challenger
        .batching_vector(&tagged("pos/batch", instance_tree(instance)), instance.n(), params.n_e)
        .iter()
        .map(G::Scalar::from_biguint)
        .collect();
    // `e'` must be indexed the same way `u` reaches into `h`: check1's
    // completeness requires `e'_k = e_{perm.map^{-1}(k)}`, i.e. the inverse
    // permutation's `apply`, not `perm`'s own (see DESIGN.md).
    let e_prime = witness.perm.inverse().apply(&e);

    let (commitments, secrets) = bridging::commit::<G, R>(&instance.h, &e_prime, rng)
        .map_err(|err| ProtocolError::InvalidWitness(err.to_string()))?;

    let phi = G::Scalar::random(rng);
    let agg = wide_exp_prod(&instance.w_prime, secrets.epsilon())
        .map_err(|err| ProtocolError::InvalidWitness(err.to_string()))?;
    let blank_neg_phi = Ciphertext::blank(&instance.pk, &phi.neg());
    let f_prime: Vec<Ciphertext<G>> = agg.iter().map(|c| blank_neg_phi.mul(c)).collect();

    let v = G::Scalar::from_biguint(&challenger.scalar(
        &tagged("pos/challenge", round1_tree(&commitments, &f_prime)),
        params.n_v,
    ));

    let response = bridging::respond(&v, &secrets, &witness.r, &e_prime)
        .map_err(|err| ProtocolError::InvalidWitness(err.to_string()))?;

    let f = ScalarArray::<G>::new(witness.s.clone())
        .inner_product(&ScalarArray::<G>::new(e_prime.clone()))
        .map_err(|err| ProtocolError::InvalidWitness(err.to_string()))?;
    let k_f = v.mul(&f).add(&phi);

    Ok(Proof { bridging: commitments, f_prime, response, k_f })
}

pub fn verify<G: CryptoGroup>(
    instance: &Instance<G>,
    proof: &Proof<G>,
    challenger: &Challenger,
    params: ProtocolParams,
) -> bool {
    let n = instance.n();
    if instance.u.len() != n
        || instance.w.len() != n
        || instance.w_prime.len() != n
        || proof.bridging.b.len() != n
    {
        return false;
    }

    let e: Vec<G::Scalar> = challenger
        .batching_vector(&tagged("pos/batch", instance_tree(instance)), n, params.n_e)
        .iter()
        .map(G::Scalar::from_biguint)
        .collect();

    let v = G::Scalar::from_biguint(&challenger.scalar(
        &tagged("pos/challenge", round1_tree(&proof.bridging, &proof.f_prime)),
        params.n_v,
    ));

    let bridging_ok =
        match bridging::verify::<G>(&instance.h, &instance.u, &e, &proof.bridging, &proof.response, &v) {
            Ok(ok) => ok,
            Err(_) => return false,
        };
    if !bridging_ok {
        return false;
    }

    let f = match wide_exp_prod(&instance.w, &e) {
        Ok(f) => f,
        Err(_) => return false,
    };
    let rhs_agg = match wide_exp_prod(&instance.w_prime, &proof.response.k_e) {
        Ok(agg) => agg,
        Err(_) => return false,
    };
    let blank_neg_kf = Ciphertext::blank(&instance.pk, &proof.k_f.neg());

    if f.len() != proof.f_prime.len() || f.len() != rhs_agg.len() {
        return false;
    }
    f.iter().zip(&proof.f_prime).zip(&rhs_agg).all(|((f_lane, f_prime_lane), rhs_lane)| {
        let lhs = f_lane.exp(&v).mul(f_prime_lane);
        let rhs = blank_neg_kf.mul(rhs_lane);
        lhs == rhs
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::elgamal::KeyPair;
    use crate::groups::p256::P256Group;
    use rand::rngs::OsRng;

    fn build_instance_and_witness(
        n: usize,
        width: usize,
    ) -> (Instance<P256Group>, Witness<P256Group>, KeyPair<P256Group>) {
        let keypair = KeyPair::<P256Group>::generate(&mut OsRng);
        let rho = b"pos-test-session";
        let h = P256Group::hash_to_generators(b"generators", rho, n);
        let g = P256Group::generator();

        let r: Vec<_> = (0..n).map(|_| <P256Group as CryptoGroup>::Scalar::random(&mut OsRng)).collect();
        let s: Vec<_> = (0..n).map(|_| <P256Group as CryptoGroup>::Scalar::random(&mut OsRng)).collect();
        let perm = Permutation::sample_uniform(n, 40, &mut OsRng);

        let u = commit_permutation::<P256Group>(&perm, &g, &h, &r).unwrap();

        let w: Vec<Vec<Ciphertext<P256Group>>> = (0..n)
            .map(|_| {
                (0..width)
                    .map(|_| {
                        let msg = g.exp(&<P256Group as CryptoGroup>::Scalar::random(&mut OsRng));
                        Ciphertext::encrypt(&msg, &keypair.public, &mut OsRng).0
                    })
                    .collect()
            })
            .collect();

        let permuted_w = perm.inverse().apply(&w);
        let w_prime: Vec<Vec<Ciphertext<P256Group>>> = permuted_w
            .iter()
            .zip(&s)
            .map(|(lane, s_i)| lane.iter().map(|c| Ciphertext::blank(&keypair.public, s_i).mul(c)).collect())
            .collect();

        let instance = Instance { h, u, pk: keypair.public.clone(), w, w_prime };
        let witness = Witness { perm, r, s };
        (instance, witness, keypair)
    }

    fn sample_challenger() -> Challenger {
        Challenger::new("1.0", b"pos-test-session", 40, 128, 40, "chacha20", "p256", "sha3-512")
    }

    #[test]
    fn honest_proof_verifies() {
        let (instance, witness, _) = build_instance_and_witness(6, 1);
        let challenger = sample_challenger();
        let params = ProtocolParams { n_v: 128, n_e: 40 };
        let proof = prove::<P256Group, _>(&instance, &witness, &challenger, params, &mut OsRng).unwrap();
        assert!(verify(&instance, &proof, &challenger, params));
    }

    #[test]
    fn honest_proof_verifies_with_width_three() {
        let (instance, witness, _) = build_instance_and_witness(5, 3);
        let challenger = sample_challenger();
        let params = ProtocolParams { n_v: 128, n_e: 40 };
        let proof = prove::<P256Group, _>(&instance, &witness, &challenger, params, &mut OsRng).unwrap();
        assert!(verify(&instance, &proof, &challenger, params));
    }

    #[test]
    fn honest_proof_verifies_at_n_100() {
        let (instance, witness, _) = build_instance_and_witness(100, 1);
        let challenger = sample_challenger();
        let params = ProtocolParams { n_v: 128, n_e: 40 };
        let proof = prove::<P256Group, _>(&instance, &witness, &challenger, params, &mut OsRng).unwrap();
        assert!(verify(&instance, &proof, &challenger, params));
    }

    #[test]
    fn mismatched_witness_is_rejected_by_prover() {
        let (instance, mut witness, _) = build_instance_and_witness(4, 1);
        witness.s[0] = witness.s[0].add(&<P256Group as CryptoGroup>::Scalar::one());
        let challenger = sample_challenger();
        let params = ProtocolParams { n_v: 128, n_e: 40 };
        assert!(prove::<P256Group, _>(&instance, &witness, &challenger, params, &mut OsRng).is_err());
    }

    #[test]
    fn tampered_proof_fails_verification() {
        let (instance, witness, _) = build_instance_and_witness(6, 1);
        let challenger = sample_challenger();
        let params = ProtocolParams { n_v: 128, n_e: 40 };
        let mut proof = prove::<P256Group, _>(&instance, &witness, &challenger, params, &mut OsRng).unwrap();
        proof.k_f = proof.k_f.add(&<P256Group as CryptoGroup>::Scalar::one());
        assert!(!verify(&instance, &proof, &challenger, params));
    }

    #[test]
    fn proof_tied_to_wrong_instance_fails() {
        let (instance, witness, _) = build_instance_and_witness(6, 1);
        let (other_instance, _, _) = build_instance_and_witness(6, 1);
        let challenger = sample_challenger();
        let params = ProtocolParams { n_v: 128, n_e: 40 };
        let proof = prove::<P256Group, _>(&instance, &witness, &challenger, params, &mut OsRng).unwrap();
        assert!(!verify(&other_instance, &proof, &challenger, params));
    }

    #[test]
    fn byte_tree_round_trip() {
        let (instance, witness, _) = build_instance_and_witness(4, 1);
        let challenger = sample_challenger();
        let params = ProtocolParams { n_v: 128, n_e: 40 };
        let proof = prove::<P256Group, _>(&instance, &witness, &challenger, params, &mut OsRng).unwrap();
        let tree = proof.to_byte_tree();
        let decoded = Proof::<P256Group>::from_byte_tree(&tree).unwrap();
        assert_eq!(decoded, proof);
    }
}

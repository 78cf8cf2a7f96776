//! `CCPoSBasicW`: the commitment-consistent variant of [`crate::shuffle::pos`]
//! (spec.md §4.6).
//!
//! Used once a permutation commitment `u` has already been produced (and
//! proved well-formed) by a prior [`crate::shuffle::posc`] run, so this
//! proof only has to show that `w'` is a re-encrypted shuffle of `w` under
//! the permutation `u` already commits to. The prover still needs the
//! opening `(π, r)` of `u` to run the bridging argument — in a mix-net
//! pipeline that opening is simply the same precomputation state the
//! `PoSC` step produced, carried forward rather than discarded. Given that,
//! the instance, witness and transcript shape are identical to
//! [`crate::shuffle::pos`]: `CCPoSBasicW(π, r, s)` accepts iff
//! `PoSBasicTW(π, r, s)` built over the same `(h, u, w, w')` accepts. This
//! module exists as the commitment-consistent entry point callers reach
//! for once `u` is already in hand, not as a separate protocol.

use rand::{CryptoRng, RngCore};

use crate::fiatshamir::Challenger;
use crate::shuffle::pos;
use crate::shuffle::ProtocolParams;
use crate::traits::group::CryptoGroup;

pub type Instance<G> = pos::Instance<G>;
pub type Witness<G> = pos::Witness<G>;
pub type Proof<G> = pos::Proof<G>;

pub fn prove<G: CryptoGroup, R: RngCore + CryptoRng>(
    instance: &Instance<G>,
    witness: &Witness<G>,
    challenger: &Challenger,
    params: ProtocolParams,
    rng: &mut R,
) -> Result<Proof<G>, crate::errors::ProtocolError> {
    pos::prove(instance, witness, challenger, params, rng)
}

pub fn verify<G: CryptoGroup>(
    instance: &Instance<G>,
    proof: &Proof<G>,
    challenger: &Challenger,
    params: ProtocolParams,
) -> bool {
    pos::verify(instance, proof, challenger, params)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::elgamal::{Ciphertext, KeyPair};
    use crate::groups::p256::P256Group;
    use crate::permutation::{commit_permutation, Permutation};
    use crate::traits::element::GroupElement;
    use crate::traits::scalar::GroupScalar;
    use rand::rngs::OsRng;

    /// Given a precomputed `u`, CCPoS accepts exactly when the corresponding
    /// PoS built from the same `(π, r, s)` would.
    #[test]
    fn ccpos_equivalence_with_pos() {
        let n = 5;
        let keypair = KeyPair::<P256Group>::generate(&mut OsRng);
        let rho = b"ccpos-test-session";
        let h = P256Group::hash_to_generators(b"generators", rho, n);
        let g = P256Group::generator();

        let r: Vec<_> = (0..n).map(|_| <P256Group as CryptoGroup>::Scalar::random(&mut OsRng)).collect();
        let s: Vec<_> = (0..n).map(|_| <P256Group as CryptoGroup>::Scalar::random(&mut OsRng)).collect();
        let perm = Permutation::sample_uniform(n, 40, &mut OsRng);
        let u = commit_permutation::<P256Group>(&perm, &g, &h, &r).unwrap();

        let w: Vec<Vec<Ciphertext<P256Group>>> = (0..n)
            .map(|_| vec![Ciphertext::encrypt(&g, &keypair.public, &mut OsRng).0])
            .collect();
        let permuted_w = perm.inverse().apply(&w);
        let w_prime: Vec<Vec<Ciphertext<P256Group>>> = permuted_w
            .iter()
            .zip(&s)
            .map(|(lane, s_i)| lane.iter().map(|c| Ciphertext::blank(&keypair.public, s_i).mul(c)).collect())
            .collect();

        let instance = Instance { h, u, pk: keypair.public, w, w_prime };
        let witness = Witness { perm, r, s };
        let challenger = Challenger::new("1.0", rho, 40, 128, 40, "chacha20", "p256", "sha3-512");
        let params = ProtocolParams { n_v: 128, n_e: 40 };

        let ccpos_proof = prove(&instance, &witness, &challenger, params, &mut OsRng).unwrap();
        let pos_proof = pos::prove(&instance, &witness, &challenger, params, &mut OsRng).unwrap();

        assert!(verify(&instance, &ccpos_proof, &challenger, params));
        assert!(pos::verify(&instance, &pos_proof, &challenger, params));
    }
}

//! End-to-end scenarios for the shuffle proof engine (spec.md §8).

use rand::rngs::OsRng;

use mixverify::bytetree::ByteTreeEncodable;
use mixverify::elgamal::{Ciphertext, KeyPair};
use mixverify::fiatshamir::Challenger;
use mixverify::groups::p256::P256Group;
use mixverify::groups::safe_prime::SafePrimeGroup;
use mixverify::permutation::{commit_permutation, Permutation};
use mixverify::shuffle::{ccpos, pos, posc, ProtocolParams};
use mixverify::traits::element::GroupElement;
use mixverify::traits::group::CryptoGroup;
use mixverify::traits::scalar::GroupScalar;

const N_R: u32 = 40;
const N_V: u32 = 128;
const N_E: u32 = 40;

fn params() -> ProtocolParams {
    ProtocolParams { n_v: N_V, n_e: N_E }
}

fn challenger(rosid: &[u8], group_name: &str, hash_name: &str) -> Challenger {
    Challenger::new("1.0", rosid, N_R, N_V, N_E, "chacha20", group_name, hash_name)
}

/// Builds a full PoS instance/witness: a random permutation shuffling `n`
/// ciphertexts of width `width`, with independent re-encryption randomness.
fn build_pos_case<G: CryptoGroup>(
    n: usize,
    width: usize,
    rosid: &[u8],
    identity_permutation: bool,
    zero_randomizers: bool,
) -> (pos::Instance<G>, pos::Witness<G>, KeyPair<G>) {
    let keypair = KeyPair::<G>::generate(&mut OsRng);
    let h = G::hash_to_generators(b"generators", rosid, n);
    let g = G::generator();

    let r: Vec<G::Scalar> = (0..n).map(|_| G::Scalar::random(&mut OsRng)).collect();
    let perm =
        if identity_permutation { Permutation::identity(n) } else { Permutation::sample_uniform(n, N_R, &mut OsRng) };
    let u = commit_permutation::<G>(&perm, &g, &h, &r).unwrap();

    let w: Vec<Vec<Ciphertext<G>>> = (0..n)
        .map(|_| {
            (0..width)
                .map(|_| {
                    let msg = g.exp(&G::Scalar::random(&mut OsRng));
                    Ciphertext::encrypt(&msg, &keypair.public, &mut OsRng).0
                })
                .collect()
        })
        .collect();

    let s: Vec<G::Scalar> =
        (0..n).map(|_| if zero_randomizers { G::Scalar::zero() } else { G::Scalar::random(&mut OsRng) }).collect();
    let permuted_w = perm.inverse().apply(&w);
    let w_prime: Vec<Vec<Ciphertext<G>>> = permuted_w
        .iter()
        .zip(&s)
        .map(|(lane, s_i)| lane.iter().map(|c| Ciphertext::blank(&keypair.public, s_i).mul(c)).collect())
        .collect();

    let instance = pos::Instance { h, u, pk: keypair.public.clone(), w, w_prime };
    let witness = pos::Witness { perm, r, s };
    (instance, witness, keypair)
}

/// Scenario 1: safe-prime group, `N = 1`, `ω = 1` — a single ciphertext
/// shuffled under the trivial permutation of one element.
#[test]
fn scenario_1_single_ciphertext_safe_prime() {
    let rosid = b"scenario-1";
    let (instance, witness, _) = build_pos_case::<SafePrimeGroup>(1, 1, rosid, false, false);
    let chal = challenger(rosid, "safe-prime", "sha3-512");
    let params = params();
    let proof = pos::prove(&instance, &witness, &chal, params, &mut OsRng).unwrap();
    assert!(pos::verify(&instance, &proof, &chal, params));
}

/// Scenario 2: identity permutation with all-zero re-encryption
/// randomizers — `w' == w` exactly, and the proof still verifies.
#[test]
fn scenario_2_identity_permutation_zero_randomizers() {
    let rosid = b"scenario-2";
    let (instance, witness, _) = build_pos_case::<SafePrimeGroup>(5, 1, rosid, true, true);
    for (lane_w, lane_w_prime) in instance.w.iter().zip(&instance.w_prime) {
        assert_eq!(lane_w, lane_w_prime);
    }
    let chal = challenger(rosid, "safe-prime", "sha3-512");
    let params = params();
    let proof = pos::prove(&instance, &witness, &chal, params, &mut OsRng).unwrap();
    assert!(pos::verify(&instance, &proof, &chal, params));
}

/// Scenario 3: P-256, `N = 10`, random permutation and randomizers.
#[test]
fn scenario_3_p256_random_shuffle() {
    let rosid = b"scenario-3";
    let (instance, witness, _) = build_pos_case::<P256Group>(10, 1, rosid, false, false);
    let chal = challenger(rosid, "p256", "sha3-512");
    let params = params();
    let proof = pos::prove(&instance, &witness, &chal, params, &mut OsRng).unwrap();
    assert!(pos::verify(&instance, &proof, &chal, params));
}

/// Scenario 4: same as scenario 3, but a single flipped bit in the
/// serialized reply (standing in for "file `PoSRl`" in spec.md §8) must
/// cause rejection.
#[test]
fn scenario_4_bitflipped_reply_is_rejected() {
    let rosid = b"scenario-4";
    let (instance, witness, _) = build_pos_case::<P256Group>(10, 1, rosid, false, false);
    let chal = challenger(rosid, "p256", "sha3-512");
    let params = params();
    let proof = pos::prove(&instance, &witness, &chal, params, &mut OsRng).unwrap();

    let mut reply_bytes = proof.response.to_byte_tree().encode();
    let flip_at = reply_bytes.len() - 1;
    reply_bytes[flip_at] ^= 0x01;
    let tree = mixverify::bytetree::ByteTree::decode(&reply_bytes).unwrap();
    let tampered_response = mixverify::shuffle::bridging::Response::<P256Group>::from_byte_tree(&tree).unwrap();

    let mut tampered_proof = proof;
    tampered_proof.response = tampered_response;
    assert!(!pos::verify(&instance, &tampered_proof, &chal, params));
}

/// Scenario 5: P-256, `N = 10` — PoSC over a permutation commitment, then
/// CCPoS against the ciphertexts it commits to; a mismatched `u` between
/// the two phases must reject.
#[test]
fn scenario_5_posc_then_ccpos_and_mismatched_commitment_rejects() {
    let rosid = b"scenario-5";
    let n = 10;
    let h = P256Group::hash_to_generators(b"generators", rosid, n);
    let g = P256Group::generator();
    let r: Vec<_> = (0..n).map(|_| <P256Group as CryptoGroup>::Scalar::random(&mut OsRng)).collect();
    let perm = Permutation::sample_uniform(n, N_R, &mut OsRng);
    let u = commit_permutation::<P256Group>(&perm, &g, &h, &r).unwrap();

    let posc_instance = posc::Instance::<P256Group> { h: h.clone(), u: u.clone() };
    let posc_witness = posc::Witness::<P256Group> { perm: perm.clone(), r: r.clone() };
    let chal = challenger(rosid, "p256", "sha3-512");
    let params = params();
    let posc_proof = posc::prove(&posc_instance, &posc_witness, &chal, params, &mut OsRng).unwrap();
    assert!(posc::verify(&posc_instance, &posc_proof, &chal, params));

    let keypair = KeyPair::<P256Group>::generate(&mut OsRng);
    let w: Vec<Vec<Ciphertext<P256Group>>> = (0..n)
        .map(|_| vec![Ciphertext::encrypt(&g, &keypair.public, &mut OsRng).0])
        .collect();
    let s: Vec<_> = (0..n).map(|_| <P256Group as CryptoGroup>::Scalar::random(&mut OsRng)).collect();
    let permuted_w = perm.inverse().apply(&w);
    let w_prime: Vec<Vec<Ciphertext<P256Group>>> = permuted_w
        .iter()
        .zip(&s)
        .map(|(lane, s_i)| lane.iter().map(|c| Ciphertext::blank(&keypair.public, s_i).mul(c)).collect())
        .collect();

    let ccpos_instance = ccpos::Instance::<P256Group> { h, u, pk: keypair.public.clone(), w, w_prime };
    let ccpos_witness = ccpos::Witness::<P256Group> { perm, r, s };
    let ccpos_proof = ccpos::prove(&ccpos_instance, &ccpos_witness, &chal, params, &mut OsRng).unwrap();
    assert!(ccpos::verify(&ccpos_instance, &ccpos_proof, &chal, params));

    let mut mismatched_instance = ccpos_instance.clone();
    mismatched_instance.u[0] = P256Group::generator().exp(&<P256Group as CryptoGroup>::Scalar::random(&mut OsRng));
    assert!(!ccpos::verify(&mismatched_instance, &ccpos_proof, &chal, params));
}

/// Scenario 6: safe-prime group, `ω = 3`, at a size kept well under the
/// spec's literal `N = 1000` for default `cargo test` runs (see
/// DESIGN.md's "test sizing" note); the full-scale case runs under
/// `--ignored`.
#[test]
fn scenario_6_wide_ciphertexts_safe_prime() {
    let rosid = b"scenario-6";
    let (instance, witness, _) = build_pos_case::<SafePrimeGroup>(24, 3, rosid, false, false);
    let chal = challenger(rosid, "safe-prime", "sha3-512");
    let params = params();
    let proof = pos::prove(&instance, &witness, &chal, params, &mut OsRng).unwrap();
    assert!(pos::verify(&instance, &proof, &chal, params));
}

/// Scenario 7: `N = 100`, the largest non-ignored size in spec.md §8's
/// completeness matrix, over the safe-prime group.
#[test]
fn scenario_7_n_100_safe_prime() {
    let rosid = b"scenario-7";
    let (instance, witness, _) = build_pos_case::<SafePrimeGroup>(100, 1, rosid, false, false);
    let chal = challenger(rosid, "safe-prime", "sha3-512");
    let params = params();
    let proof = pos::prove(&instance, &witness, &chal, params, &mut OsRng).unwrap();
    assert!(pos::verify(&instance, &proof, &chal, params));
}

/// Scenario 8: `N = 100` again, this time over `P256Group`, completing the
/// `N ∈ {1,2,3,10,100}` row for the elliptic-curve instantiation.
#[test]
fn scenario_8_n_100_p256() {
    let rosid = b"scenario-8";
    let (instance, witness, _) = build_pos_case::<P256Group>(100, 1, rosid, false, false);
    let chal = challenger(rosid, "p256", "sha3-512");
    let params = params();
    let proof = pos::prove(&instance, &witness, &chal, params, &mut OsRng).unwrap();
    assert!(pos::verify(&instance, &proof, &chal, params));
}

/// Scenario 9: `ω = 3` over `P256Group` — the one `(ω, group)` pairing
/// scenario 6/`n_1000_full_scale` never exercise, since those stay on the
/// safe-prime group.
#[test]
fn scenario_9_wide_ciphertexts_p256() {
    let rosid = b"scenario-9";
    let (instance, witness, _) = build_pos_case::<P256Group>(10, 3, rosid, false, false);
    let chal = challenger(rosid, "p256", "sha3-512");
    let params = params();
    let proof = pos::prove(&instance, &witness, &chal, params, &mut OsRng).unwrap();
    assert!(pos::verify(&instance, &proof, &chal, params));
}

#[test]
#[ignore]
fn n_1000_full_scale() {
    let rosid = b"scenario-6-full-scale";
    let (instance, witness, _) = build_pos_case::<SafePrimeGroup>(1000, 3, rosid, false, false);
    let chal = challenger(rosid, "safe-prime", "sha3-512");
    let params = params();
    let proof = pos::prove(&instance, &witness, &chal, params, &mut OsRng).unwrap();
    assert!(pos::verify(&instance, &proof, &chal, params));
}

/// Fiat-Shamir determinism (spec.md §8): verifying the same proof twice
/// yields the same verdict.
#[test]
fn verification_is_deterministic() {
    let rosid = b"determinism";
    let (instance, witness, _) = build_pos_case::<P256Group>(6, 1, rosid, false, false);
    let chal = challenger(rosid, "p256", "sha3-512");
    let params = params();
    let proof = pos::prove(&instance, &witness, &chal, params, &mut OsRng).unwrap();
    let first = pos::verify(&instance, &proof, &chal, params);
    let second = pos::verify(&instance, &proof, &chal, params);
    assert_eq!(first, second);
    assert!(first);
}

/// CCPoS equivalence (spec.md §8): given the same `(π, r, s)`, CCPoS
/// accepts iff the corresponding PoS does.
#[test]
fn ccpos_equivalence_with_pos_over_same_witness() {
    let rosid = b"ccpos-equivalence";
    let (instance, witness, _) = build_pos_case::<P256Group>(8, 1, rosid, false, false);
    let chal = challenger(rosid, "p256", "sha3-512");
    let params = params();

    let pos_proof = pos::prove(&instance, &witness, &chal, params, &mut OsRng).unwrap();
    let ccpos_proof = ccpos::prove(&instance, &witness, &chal, params, &mut OsRng).unwrap();

    assert!(pos::verify(&instance, &pos_proof, &chal, params));
    assert!(ccpos::verify(&instance, &ccpos_proof, &chal, params));
}


//! Fiat-Shamir transcript challenger (spec.md §4.4).
//!
//! `rho` is the session-wide prefix hashed once at construction; `seed`
//! derives a PRG seed for a batching vector and `scalar` derives the
//! challenge itself, both as a function of `rho` and the challenge data `d`
//! (a byte tree) alone. Pure: same inputs always yield the same outputs.

use num_bigint::{BigUint, RandBigInt};
use rand::SeedableRng;
use rand_chacha::ChaCha20Rng;
use sha3::Digest;

use crate::bytetree::ByteTree;
use crate::utils;

#[derive(Clone, Debug)]
pub struct Challenger {
    rho: Vec<u8>,
}

impl Challenger {
    /// `rho = H(version || rosid || n_r || n_v || n_e || prg_name ||
    /// group_name || hash_name)`, each field framed as a byte-tree leaf so
    /// the hash input is unambiguous regardless of field contents.
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        version: &str,
        rosid: &[u8],
        n_r: u32,
        n_v: u32,
        n_e: u32,
        prg_name: &str,
        group_name: &str,
        hash_name: &str,
    ) -> Self {
        let tree = ByteTree::node(vec![
            ByteTree::leaf(version.as_bytes().to_vec()),
            ByteTree::leaf(rosid.to_vec()),
            ByteTree::leaf(n_r.to_be_bytes().to_vec()),
            ByteTree::leaf(n_v.to_be_bytes().to_vec()),
            ByteTree::leaf(n_e.to_be_bytes().to_vec()),
            ByteTree::leaf(prg_name.as_bytes().to_vec()),
            ByteTree::leaf(group_name.as_bytes().to_vec()),
            ByteTree::leaf(hash_name.as_bytes().to_vec()),
        ]);
        let mut hasher = utils::hash::new_default_hasher();
        hasher.update(tree.encode());
        Challenger { rho: hasher.finalize().to_vec() }
    }

    fn transcript_digest(&self, d: &ByteTree) -> Vec<u8> {
        let mut hasher = utils::hash::new_default_hasher();
        hasher.update(&self.rho);
        hasher.update(d.encode());
        hasher.finalize().to_vec()
    }

    /// `seed(d, B)`: seeds a PRG from `H(rho || encode(d))`, to be drawn
    /// from for `B`-bit batching components. Returns the PRG itself rather
    /// than raw bytes, since every caller immediately wants to draw from it.
    pub fn seed(&self, d: &ByteTree) -> ChaCha20Rng {
        let digest = self.transcript_digest(d);
        let mut key = [0u8; 32];
        key.copy_from_slice(&digest[..32]);
        ChaCha20Rng::from_seed(key)
    }

    /// `scalar(d, n_v) = to_positive(H(rho || encode(d)))` reduced to `n_v`
    /// bits — the challenge itself.
    pub fn scalar(&self, d: &ByteTree, n_v: u32) -> BigUint {
        let digest = self.transcript_digest(d);
        let full = BigUint::from_bytes_be(&digest);
        full % (BigUint::from(1u8) << n_v)
    }

    /// Draws the length-`n` batching vector of `n_e`-bit components, seeding
    /// the PRG once via `seed` (spec.md §4.4: "the batching vector... is
    /// obtained by seeding the PRG once and drawing `N` integers").
    pub fn batching_vector(&self, d: &ByteTree, n: usize, n_e: u32) -> Vec<BigUint> {
        let mut rng = self.seed(d);
        let bound = BigUint::from(1u8) << n_e;
        (0..n).map(|_| rng.gen_biguint_below(&bound)).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_challenger() -> Challenger {
        Challenger::new("1.0", b"session-id", 40, 128, 40, "chacha20", "p256", "sha3-512")
    }

    #[test]
    fn same_prefix_and_data_give_same_scalar() {
        let c = sample_challenger();
        let d = ByteTree::leaf(vec![1, 2, 3]);
        assert_eq!(c.scalar(&d, 128), c.scalar(&d, 128));
    }

    #[test]
    fn different_data_gives_different_scalar() {
        let c = sample_challenger();
        let a = c.scalar(&ByteTree::leaf(vec![1]), 128);
        let b = c.scalar(&ByteTree::leaf(vec![2]), 128);
        assert_ne!(a, b);
    }

    #[test]
    fn scalar_is_bounded_by_n_v_bits() {
        let c = sample_challenger();
        let d = ByteTree::leaf(vec![9, 9, 9]);
        let s = c.scalar(&d, 16);
        assert!(s.bits() <= 16);
    }

    #[test]
    fn batching_vector_is_deterministic_and_bounded() {
        let c = sample_challenger();
        let d = ByteTree::leaf(vec![5]);
        let a = c.batching_vector(&d, 10, 40);
        let b = c.batching_vector(&d, 10, 40);
        assert_eq!(a, b);
        for v in &a {
            assert!(v.bits() <= 40);
        }
    }

    #[test]
    fn different_prefix_gives_different_batching_vector() {
        let d = ByteTree::leaf(vec![5]);
        let c1 = sample_challenger();
        let c2 = Challenger::new("1.0", b"other-session", 40, 128, 40, "chacha20", "p256", "sha3-512");
        assert_ne!(c1.batching_vector(&d, 5, 40), c2.batching_vector(&d, 5, 40));
    }
}

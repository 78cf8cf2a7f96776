//! Uniform permutation sampling and Pedersen permutation commitments
//! (spec.md §4.3, §4.4).

use num_bigint::BigUint;
use num_bigint::RandBigInt;
use rand::{CryptoRng, RngCore};

use crate::errors::ArithmeticError;
use crate::traits::element::GroupElement;
use crate::traits::group::CryptoGroup;
use crate::traits::scalar::GroupScalar;

/// A permutation of `{0, ..., n-1}`, stored so that `apply(items)[i] ==
/// items[map[i]]`, i.e. position `i` of the permuted sequence holds the
/// element that was at position `map[i]` before permuting.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Permutation {
    map: Vec<usize>,
}

impl Permutation {
    /// Validates `map` is a bijection on `0..map.len()` before accepting it.
    pub fn new(map: Vec<usize>) -> Result<Self, ArithmeticError> {
        let n = map.len();
        let mut seen = vec![false; n];
        for &idx in &map {
            if idx >= n {
                return Err(ArithmeticError::PermutationIndexOutOfBounds { index: idx, size: n });
            }
            if seen[idx] {
                return Err(ArithmeticError::NotABijection(n));
            }
            seen[idx] = true;
        }
        Ok(Permutation { map })
    }

    pub fn identity(n: usize) -> Self {
        Permutation { map: (0..n).collect() }
    }

    pub fn len(&self) -> usize {
        self.map.len()
    }

    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }

    pub fn check_size(&self, n: usize) -> Result<(), ArithmeticError> {
        if self.map.len() == n {
            Ok(())
        } else {
            Err(ArithmeticError::LengthMismatch { expected: n, found: self.map.len() })
        }
    }

    pub fn as_slice(&self) -> &[usize] {
        &self.map
    }

    pub fn apply<T: Clone>(&self, items: &[T]) -> Vec<T> {
        self.map.iter().map(|&i| items[i].clone()).collect()
    }

    /// `π^{-1}`: `inverse().map[π(i)] == i`.
    pub fn inverse(&self) -> Self {
        let mut inv = vec![0usize; self.map.len()];
        for (i, &pi_i) in self.map.iter().enumerate() {
            inv[pi_i] = i;
        }
        Permutation { map: inv }
    }

    /// Draws a permutation close to uniform over `S_n` by attaching to each
    /// index a random key of `n_r + 2⌈log₂ n⌉` bits and sorting indices by
    /// key (spec.md §4.3's prefix-sort sampler). Statistical distance from
    /// uniform is at most `2^-n_r`; ties among keys occur with negligible
    /// probability at that bit length and are broken by index order, which
    /// does not measurably bias the result.
    pub fn sample_uniform<R: RngCore + CryptoRng>(n: usize, n_r: u32, rng: &mut R) -> Self {
        if n == 0 {
            return Permutation { map: Vec::new() };
        }
        let log2_n = (usize::BITS - (n.max(1) - 1).leading_zeros()).max(1);
        let key_bits = n_r + 2 * log2_n;
        let bound = BigUint::from(1u8) << key_bits;
        let mut keyed: Vec<(BigUint, usize)> =
            (0..n).map(|i| (rng.gen_biguint_below(&bound), i)).collect();
        keyed.sort_by(|a, b| a.0.cmp(&b.0).then(a.1.cmp(&b.1)));
        let map = keyed.into_iter().map(|(_, i)| i).collect();
        Permutation { map }
    }
}

/// Pedersen commitment to a permutation: `u_i = g^{r_{π(i)}} · h_{π(i)}`
/// (spec.md §4.4), given independent generators `h` and fresh randomizers
/// `r`.
pub fn commit_permutation<G: CryptoGroup>(
    perm: &Permutation,
    g: &G::Element,
    h: &[G::Element],
    r: &[G::Scalar],
) -> Result<Vec<G::Element>, ArithmeticError> {
    perm.check_size(h.len())?;
    perm.check_size(r.len())?;
    let permuted_h = perm.apply(h);
    let permuted_r = perm.apply(r);
    Ok(permuted_h.iter().zip(&permuted_r).map(|(h_i, r_i)| g.exp(r_i).mul(h_i)).collect())
}

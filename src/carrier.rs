//! Arrays over `G` and `Z_q` with the batched operations spec.md §3 needs:
//! `mul`, `exp`, `exp_prod`, `inner_product`, `prod`, `sum`, `shift_push`,
//! `permute`, `rec_lin`, `prods`.
//!
//! Backed by `Vec<T>` with a runtime length rather than the teacher's
//! `hybrid_array`/`typenum` compile-time-sized arrays: this crate's arrays
//! range over whatever mix size `N` a session declares, so the length has
//! to be a runtime value, not a type parameter.

use rayon::prelude::*;

use crate::errors::ArithmeticError;
use crate::permutation::Permutation;
use crate::traits::element::GroupElement;
use crate::traits::group::CryptoGroup;
use crate::traits::scalar::GroupScalar;

fn check_len(expected: usize, found: usize) -> Result<(), ArithmeticError> {
    if expected == found {
        Ok(())
    } else {
        Err(ArithmeticError::LengthMismatch { expected, found })
    }
}

/// An ordered sequence of `G`-elements.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ElementArray<G: CryptoGroup>(Vec<G::Element>);

impl<G: CryptoGroup> ElementArray<G> {
    pub fn new(items: Vec<G::Element>) -> Self {
        ElementArray(items)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn as_slice(&self) -> &[G::Element] {
        &self.0
    }

    pub fn mul(&self, other: &Self) -> Result<Self, ArithmeticError> {
        check_len(self.len(), other.len())?;
        Ok(ElementArray(self.0.par_iter().zip(&other.0).map(|(a, b)| a.mul(b)).collect()))
    }

    /// Per-index exponentiation by a same-length scalar array.
    pub fn exp(&self, exponents: &ScalarArray<G>) -> Result<Self, ArithmeticError> {
        check_len(self.len(), exponents.len())?;
        Ok(ElementArray(
            self.0.par_iter().zip(exponents.as_slice()).map(|(b, e)| b.exp(e)).collect(),
        ))
    }

    /// Every element raised to the same scalar.
    pub fn exp_single(&self, scalar: &G::Scalar) -> Self {
        ElementArray(self.0.par_iter().map(|b| b.exp(scalar)).collect())
    }

    /// `∏ bases_i^{exps_i}`, computed by a fork-join partition of the index
    /// range into equal-sized chunks (spec.md §5): each chunk folds its own
    /// partial product, and the per-chunk results are combined afterward.
    /// Deterministic and equal to the sequential fold regardless of how the
    /// range is partitioned, since the group operation is associative and
    /// commutative.
    pub fn exp_prod(bases: &Self, exponents: &ScalarArray<G>) -> Result<G::Element, ArithmeticError> {
        check_len(bases.len(), exponents.len())?;
        if bases.is_empty() {
            return Err(ArithmeticError::EmptyArray);
        }
        let partial = bases
            .0
            .par_iter()
            .zip(exponents.as_slice())
            .map(|(b, e)| b.exp(e))
            .reduce(G::Element::identity, |a, b| a.mul(&b));
        Ok(partial)
    }

    pub fn prod(&self) -> Result<G::Element, ArithmeticError> {
        if self.0.is_empty() {
            return Err(ArithmeticError::EmptyArray);
        }
        Ok(self.0.par_iter().cloned().reduce(G::Element::identity, |a, b| a.mul(&b)))
    }

    pub fn permute(&self, perm: &Permutation) -> Result<Self, ArithmeticError> {
        perm.check_size(self.len())?;
        Ok(ElementArray(perm.apply(&self.0)))
    }
}

/// An ordered sequence of `Z_q` scalars.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ScalarArray<G: CryptoGroup>(Vec<G::Scalar>);

impl<G: CryptoGroup> ScalarArray<G> {
    pub fn new(items: Vec<G::Scalar>) -> Self {
        ScalarArray(items)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn as_slice(&self) -> &[G::Scalar] {
        &self.0
    }

    pub fn mul(&self, other: &Self) -> Result<Self, ArithmeticError> {
        check_len(self.len(), other.len())?;
        Ok(ScalarArray(self.0.iter().zip(&other.0).map(|(a, b)| a.mul(b)).collect()))
    }

    pub fn add(&self, other: &Self) -> Result<Self, ArithmeticError> {
        check_len(self.len(), other.len())?;
        Ok(ScalarArray(self.0.iter().zip(&other.0).map(|(a, b)| a.add(b)).collect()))
    }

    pub fn sub(&self, other: &Self) -> Result<Self, ArithmeticError> {
        check_len(self.len(), other.len())?;
        Ok(ScalarArray(self.0.iter().zip(&other.0).map(|(a, b)| a.sub(b)).collect()))
    }

    pub fn inner_product(&self, other: &Self) -> Result<G::Scalar, ArithmeticError> {
        check_len(self.len(), other.len())?;
        if self.0.is_empty() {
            return Err(ArithmeticError::EmptyArray);
        }
        Ok(self
            .0
            .iter()
            .zip(&other.0)
            .fold(G::Scalar::zero(), |acc, (x, y)| acc.add(&x.mul(y))))
    }

    pub fn sum(&self) -> Result<G::Scalar, ArithmeticError> {
        if self.0.is_empty() {
            return Err(ArithmeticError::EmptyArray);
        }
        Ok(self.0.iter().fold(G::Scalar::zero(), |acc, x| acc.add(x)))
    }

    pub fn prod(&self) -> Result<G::Scalar, ArithmeticError> {
        if self.0.is_empty() {
            return Err(ArithmeticError::EmptyArray);
        }
        Ok(self.0.iter().fold(G::Scalar::one(), |acc, x| acc.mul(x)))
    }

    /// Drops the last element and prepends `v` (spec.md §3).
    pub fn shift_push(&self, v: G::Scalar) -> Self {
        let mut out = Vec::with_capacity(self.0.len());
        out.push(v);
        out.extend(self.0[..self.0.len().saturating_sub(1)].iter().cloned());
        ScalarArray(out)
    }

    pub fn permute(&self, perm: &Permutation) -> Result<Self, ArithmeticError> {
        perm.check_size(self.len())?;
        Ok(ScalarArray(perm.apply(&self.0)))
    }

    /// Cumulative products: `prods()[i] = e_0 · e_1 ··· e_i`.
    pub fn prods(&self) -> Self {
        let mut out = Vec::with_capacity(self.0.len());
        let mut acc = G::Scalar::one();
        for e in &self.0 {
            acc = acc.mul(e);
            out.push(acc.clone());
        }
        ScalarArray(out)
    }

    /// `recLin(e)`: `y_0 = b_0`, `y_i = b_i + e_i·y_{i-1}`; returns the full
    /// sequence `y` together with `d = y_{N-1}` (spec.md §3, used by the
    /// shuffle prover's round-1 commitment).
    pub fn rec_lin(&self, e: &Self) -> Result<(Self, G::Scalar), ArithmeticError> {
        check_len(self.len(), e.len())?;
        if self.0.is_empty() {
            return Err(ArithmeticError::EmptyArray);
        }
        let mut y = Vec::with_capacity(self.0.len());
        y.push(self.0[0].clone());
        for i in 1..self.0.len() {
            let prev = y[i - 1].clone();
            y.push(self.0[i].add(&e.0[i].mul(&prev)));
        }
        let d = y.last().unwrap().clone();
        Ok((ScalarArray(y), d))
    }
}

//! The bridging-commitment argument shared by [`crate::shuffle::pos`] and
//! [`crate::shuffle::posc`] (spec.md §4.5's `B_i, A', B'_i, C', D'` machinery).
//!
//! Proves knowledge of `r` and a permutation `π` such that `u_i =
//! g^{r_{π(i)}} h_{π(i)}`, batched against a challenge vector `e` via the
//! telescoping recurrence `recLin`. Independent of ciphertexts; PoS layers a
//! re-encryption argument ([`crate::shuffle::pos::FRelation`]) on top of it,
//! PoSC uses it standalone.

use rand::{CryptoRng, RngCore};

use crate::bytetree::{ByteTree, ByteTreeEncodable, FormatError};
use crate::carrier::{ElementArray, ScalarArray};
use crate::errors::ArithmeticError;
use crate::traits::element::GroupElement;
use crate::traits::group::CryptoGroup;
use crate::traits::scalar::GroupScalar;

pub(crate) fn encode_elements<G: CryptoGroup>(items: &[G::Element]) -> ByteTree {
    ByteTree::node(items.iter().map(|e| e.to_byte_tree()).collect())
}

pub(crate) fn decode_elements<G: CryptoGroup>(tree: &ByteTree) -> Result<Vec<G::Element>, FormatError> {
    let mut reader = tree.reader()?;
    let mut out = Vec::with_capacity(reader.remaining());
    while reader.remaining() > 0 {
        out.push(G::Element::from_byte_tree(reader.next_child()?)?);
    }
    Ok(out)
}

pub(crate) fn encode_scalars<G: CryptoGroup>(items: &[G::Scalar]) -> ByteTree {
    ByteTree::node(items.iter().map(|s| s.to_byte_tree()).collect())
}

pub(crate) fn decode_scalars<G: CryptoGroup>(tree: &ByteTree) -> Result<Vec<G::Scalar>, FormatError> {
    let mut reader = tree.reader()?;
    let mut out = Vec::with_capacity(reader.remaining());
    while reader.remaining() > 0 {
        out.push(G::Scalar::from_byte_tree(reader.next_child()?)?);
    }
    Ok(out)
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Commitments<G: CryptoGroup> {
    pub b: Vec<G::Element>,
    pub a_prime: G::Element,
    pub b_prime: Vec<G::Element>,
    pub c_prime: G::Element,
    pub d_prime: G::Element,
}

impl<G: CryptoGroup> ByteTreeEncodable for Commitments<G> {
    fn to_byte_tree(&self) -> ByteTree {
        ByteTree::node(vec![
            encode_elements::<G>(&self.b),
            self.a_prime.to_byte_tree(),
            encode_elements::<G>(&self.b_prime),
            self.c_prime.to_byte_tree(),
            self.d_prime.to_byte_tree(),
        ])
    }

    fn from_byte_tree(tree: &ByteTree) -> Result<Self, FormatError> {
        let mut reader = tree.reader()?;
        let b = decode_elements::<G>(reader.next_child()?)?;
        let a_prime = G::Element::from_byte_tree(reader.next_child()?)?;
        let b_prime = decode_elements::<G>(reader.next_child()?)?;
        let c_prime = G::Element::from_byte_tree(reader.next_child()?)?;
        let d_prime = G::Element::from_byte_tree(reader.next_child()?)?;
        Ok(Commitments { b, a_prime, b_prime, c_prime, d_prime })
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Response<G: CryptoGroup> {
    pub k_a: G::Scalar,
    pub k_b: Vec<G::Scalar>,
    pub k_c: G::Scalar,
    pub k_d: G::Scalar,
    pub k_e: Vec<G::Scalar>,
}

impl<G: CryptoGroup> ByteTreeEncodable for Response<G> {
    fn to_byte_tree(&self) -> ByteTree {
        ByteTree::node(vec![
            self.k_a.to_byte_tree(),
            encode_scalars::<G>(&self.k_b),
            self.k_c.to_byte_tree(),
            self.k_d.to_byte_tree(),
            encode_scalars::<G>(&self.k_e),
        ])
    }

    fn from_byte_tree(tree: &ByteTree) -> Result<Self, FormatError> {
        let mut reader = tree.reader()?;
        let k_a = G::Scalar::from_byte_tree(reader.next_child()?)?;
        let k_b = decode_scalars::<G>(reader.next_child()?)?;
        let k_c = G::Scalar::from_byte_tree(reader.next_child()?)?;
        let k_d = G::Scalar::from_byte_tree(reader.next_child()?)?;
        let k_e = decode_scalars::<G>(reader.next_child()?)?;
        Ok(Response { k_a, k_b, k_c, k_d, k_e })
    }
}

/// Round-1 randomizers, kept private between `commit` and `respond`.
pub struct Secrets<G: CryptoGroup> {
    alpha: G::Scalar,
    beta: Vec<G::Scalar>,
    gamma: G::Scalar,
    delta: G::Scalar,
    epsilon: Vec<G::Scalar>,
    b: Vec<G::Scalar>,
    d: G::Scalar,
}

/// `e' = π(e)`, the batching vector reindexed by the secret permutation
/// (spec.md §4.5's `π^{-1}(e)`, relabeled here so every array in this
/// module shares one flat index domain — see DESIGN.md).
pub fn commit<G: CryptoGroup, R: RngCore + CryptoRng>(
    h: &[G::Element],
    e_prime: &[G::Scalar],
    rng: &mut R,
) -> Result<(Commitments<G>, Secrets<G>), ArithmeticError> {
    let n = h.len();
    if n == 0 || h.len() != e_prime.len() {
        return Err(ArithmeticError::LengthMismatch { expected: n, found: e_prime.len() });
    }
    let g = G::generator();
    let h0 = h[0].clone();

    let alpha = G::Scalar::random(rng);
    let gamma = G::Scalar::random(rng);
    let delta = G::Scalar::random(rng);
    let beta: Vec<G::Scalar> = (0..n).map(|_| G::Scalar::random(rng)).collect();
    let epsilon: Vec<G::Scalar> = (0..n).map(|_| G::Scalar::random(rng)).collect();
    let b: Vec<G::Scalar> = (0..n).map(|_| G::Scalar::random(rng)).collect();

    let b_arr = ScalarArray::<G>::new(b.clone());
    let e_prime_arr = ScalarArray::<G>::new(e_prime.to_vec());
    let (x, d) = b_arr.rec_lin(&e_prime_arr)?;
    let y = e_prime_arr.prods();

    let h_arr = ElementArray::<G>::new(h.to_vec());
    let eps_arr = ScalarArray::<G>::new(epsilon.clone());

    let b_commitments: Vec<G::Element> = (0..n)
        .map(|i| g.exp(&x.as_slice()[i]).mul(&h0.exp(&y.as_slice()[i])))
        .collect();

    let a_prime = g.exp(&alpha).mul(&ElementArray::exp_prod(&h_arr, &eps_arr)?);

    let x_shifted = x.shift_push(G::Scalar::zero());
    let y_shifted = y.shift_push(G::Scalar::one());
    let b_prime: Vec<G::Element> = (0..n)
        .map(|i| {
            let exponent_g =
                beta[i].add(&x_shifted.as_slice()[i].mul(&epsilon[i]));
            let exponent_h0 = y_shifted.as_slice()[i].mul(&epsilon[i]);
            g.exp(&exponent_g).mul(&h0.exp(&exponent_h0))
        })
        .collect();

    let c_prime = g.exp(&gamma);
    let d_prime = g.exp(&delta);

    Ok((
        Commitments { b: b_commitments, a_prime, b_prime, c_prime, d_prime },
        Secrets { alpha, beta, gamma, delta, epsilon, b, d },
    ))
}

impl<G: CryptoGroup> Secrets<G> {
    pub fn epsilon(&self) -> &[G::Scalar] {
        &self.epsilon
    }
}

/// `r` and `e'` must share the flat index domain `commit` used.
pub fn respond<G: CryptoGroup>(
    v: &G::Scalar,
    secrets: &Secrets<G>,
    r: &[G::Scalar],
    e_prime: &[G::Scalar],
) -> Result<Response<G>, ArithmeticError> {
    let r_arr = ScalarArray::<G>::new(r.to_vec());
    let e_prime_arr = ScalarArray::<G>::new(e_prime.to_vec());
    let a = r_arr.inner_product(&e_prime_arr)?;
    let c = r_arr.sum()?;

    let k_a = v.mul(&a).add(&secrets.alpha);
    let k_b: Vec<G::Scalar> =
        secrets.b.iter().zip(&secrets.beta).map(|(b_i, beta_i)| v.mul(b_i).add(beta_i)).collect();
    let k_c = v.mul(&c).add(&secrets.gamma);
    let k_d = v.mul(&secrets.d).add(&secrets.delta);
    let k_e: Vec<G::Scalar> = e_prime
        .iter()
        .zip(&secrets.epsilon)
        .map(|(e_i, eps_i)| v.mul(e_i).add(eps_i))
        .collect();

    Ok(Response { k_a, k_b, k_c, k_d, k_e })
}

/// The four bridging-commitment check equations (spec.md §4.5, minus the
/// ciphertext relation). `e` is the *unpermuted* batching vector; the
/// verifier never sees `e'` since it never learns `π`.
pub fn verify<G: CryptoGroup>(
    h: &[G::Element],
    u: &[G::Element],
    e: &[G::Scalar],
    commitments: &Commitments<G>,
    response: &Response<G>,
    v: &G::Scalar,
) -> Result<bool, ArithmeticError> {
    let n = h.len();
    if u.len() != n || e.len() != n || commitments.b.len() != n || commitments.b_prime.len() != n
        || response.k_b.len() != n || response.k_e.len() != n
    {
        return Err(ArithmeticError::LengthMismatch { expected: n, found: u.len() });
    }
    let g = G::generator();
    let h0 = h[0].clone();

    let u_arr = ElementArray::<G>::new(u.to_vec());
    let h_arr = ElementArray::<G>::new(h.to_vec());
    let e_arr = ScalarArray::<G>::new(e.to_vec());
    let k_e_arr = ScalarArray::<G>::new(response.k_e.clone());

    let a = ElementArray::exp_prod(&u_arr, &e_arr)?;
    let c = u_arr.prod()?.mul(&h_arr.prod()?.inv());
    let e_prod = e_arr.prod()?;
    let d = commitments.b[n - 1].mul(&h0.exp(&e_prod).inv());

    let check1 = a.exp(v).mul(&commitments.a_prime)
        == g.exp(&response.k_a).mul(&ElementArray::exp_prod(&h_arr, &k_e_arr)?);

    let b_shifted: Vec<G::Element> = {
        let mut out = Vec::with_capacity(n);
        out.push(h0.clone());
        out.extend(commitments.b[..n - 1].iter().cloned());
        out
    };
    let check2 = (0..n).all(|i| {
        commitments.b[i].exp(v).mul(&commitments.b_prime[i])
            == g.exp(&response.k_b[i]).mul(&b_shifted[i].exp(&response.k_e[i]))
    });

    let check3 = c.exp(v).mul(&commitments.c_prime) == g.exp(&response.k_c);
    let check4 = d.exp(v).mul(&commitments.d_prime) == g.exp(&response.k_d);

    Ok(check1 && check2 && check3 && check4)
}

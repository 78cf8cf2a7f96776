//! The Terelius-Wikström shuffle proof engine (spec.md §4.5-§4.7): a
//! permutation is sampled and committed ([`crate::permutation`]), then one
//! of three sigma protocols proves a relation over it without revealing the
//! permutation. [`bridging`] holds the argument all three share; [`pos`],
//! [`posc`] and [`ccpos`] layer the ciphertext-specific pieces on top.

pub mod bridging;
pub mod ccpos;
pub mod pos;
pub mod posc;

/// Bit widths for the Fiat-Shamir transcript (spec.md §4.4): `n_v` bounds
/// the challenge scalar, `n_e` bounds each component of the batching
/// vector. Fixed per session, shared by every proof the session produces.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ProtocolParams {
    pub n_v: u32,
    pub n_e: u32,
}

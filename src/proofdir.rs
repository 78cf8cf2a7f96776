//! Proof-directory layout (spec.md §6): one file per object, all byte
//! trees, named by a fixed canonical scheme. This module is in-memory and
//! filesystem-agnostic — the CLI's prove/verify subcommands own the actual
//! `read`/`write` calls and hand this module the bytes.
//!
//! The directory does not interpret `at`/`kLl` (active-threshold, per-party
//! keep lists): spec.md scopes the late-joiner/keep-list protocol to the
//! session layer this crate doesn't implement, so those files round-trip as
//! opaque byte trees.

use std::collections::BTreeMap;

use tracing::warn;

use crate::bytetree::{ByteTree, ByteTreeEncodable, FormatError};
use crate::errors::MixError;
use crate::traits::element::GroupElement;
use crate::traits::group::CryptoGroup;
use crate::traits::scalar::GroupScalar;

/// The canonical proof-directory object kinds (spec.md §6). Variants ending
/// in `l` are per-mix-party; the rest are session-wide.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord)]
pub enum FileKind {
    PermutationCommitment,
    PoSCCommitment,
    PoSCReply,
    PoSCommitment,
    PoSReply,
    CCPoSCommitment,
    CCPoSReply,
    ActiveThreshold,
    KeepList,
    MaxCiphertexts,
    Width,
    Type,
    Version,
    AuxSid,
}

impl FileKind {
    /// The file name this object is stored under for mix-party `l`
    /// (spec.md §6: `PCl`, `PoSCCl`, `PoSCRl`, `PoSCl`, `PoSRl`, `CCPoSCl`,
    /// `CCPoSRl`, `at`, `kLl`, `mc`, `width`, `type`, `version`, `auxsid`).
    /// Session-wide kinds ignore `l`.
    pub fn file_name(&self, l: u32) -> String {
        match self {
            FileKind::PermutationCommitment => format!("PC{l}"),
            FileKind::PoSCCommitment => format!("PoSCC{l}"),
            FileKind::PoSCReply => format!("PoSCR{l}"),
            FileKind::PoSCommitment => format!("PoSC{l}"),
            FileKind::PoSReply => format!("PoSR{l}"),
            FileKind::CCPoSCommitment => format!("CCPoSC{l}"),
            FileKind::CCPoSReply => format!("CCPoSR{l}"),
            FileKind::ActiveThreshold => "at".to_string(),
            FileKind::KeepList => format!("kL{l}"),
            FileKind::MaxCiphertexts => "mc".to_string(),
            FileKind::Width => "width".to_string(),
            FileKind::Type => "type".to_string(),
            FileKind::Version => "version".to_string(),
            FileKind::AuxSid => "auxsid".to_string(),
        }
    }
}

/// A value that has a well-defined "continue with this instead" stand-in
/// for a malformed proof-directory file (spec.md §4.5's "observable
/// continue-with-identity semantics"). Implemented only by the wire types
/// the *verifier* loads leniently; prover-side loads always propagate.
pub trait Substitute: ByteTreeEncodable {
    fn substitute() -> Self;
}

impl<G: CryptoGroup> Substitute for crate::shuffle::bridging::Commitments<G> {
    fn substitute() -> Self {
        crate::shuffle::bridging::Commitments {
            b: Vec::new(),
            a_prime: G::Element::identity(),
            b_prime: Vec::new(),
            c_prime: G::Element::identity(),
            d_prime: G::Element::identity(),
        }
    }
}

impl<G: CryptoGroup> Substitute for crate::shuffle::bridging::Response<G> {
    fn substitute() -> Self {
        crate::shuffle::bridging::Response {
            k_a: G::Scalar::zero(),
            k_b: Vec::new(),
            k_c: G::Scalar::zero(),
            k_d: G::Scalar::zero(),
            k_e: Vec::new(),
        }
    }
}

impl<G: CryptoGroup> Substitute for crate::shuffle::pos::Proof<G> {
    fn substitute() -> Self {
        crate::shuffle::pos::Proof {
            bridging: Substitute::substitute(),
            f_prime: Vec::new(),
            response: Substitute::substitute(),
            k_f: G::Scalar::zero(),
        }
    }
}

impl<G: CryptoGroup> Substitute for crate::shuffle::posc::Proof<G> {
    fn substitute() -> Self {
        crate::shuffle::posc::Proof { bridging: Substitute::substitute(), response: Substitute::substitute() }
    }
}

/// An in-memory proof directory: canonical file name to raw byte-tree
/// encoding. `load_strict`/`store` are the prover-side path (any decode
/// failure is fatal); `load_lenient` is the verifier-side path (a missing
/// or malformed file becomes `Substitute::substitute()`, logged, rather
/// than an early return — the algebraic check downstream fails instead).
#[derive(Debug, Default)]
pub struct ProofDirectory {
    files: BTreeMap<String, Vec<u8>>,
}

impl ProofDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn store<T: ByteTreeEncodable>(&mut self, kind: FileKind, l: u32, value: &T) {
        self.files.insert(kind.file_name(l), value.to_byte_tree().encode());
    }

    pub fn store_opaque(&mut self, kind: FileKind, l: u32, tree: &ByteTree) {
        self.files.insert(kind.file_name(l), tree.encode());
    }

    /// The raw encoded bytes backing any file already `store`d/`store_opaque`d
    /// under `kind`/`l` — what a CLI would write verbatim to disk.
    pub fn raw_bytes(&self, kind: FileKind, l: u32) -> Result<Vec<u8>, MixError> {
        let name = kind.file_name(l);
        self.files.get(&name).cloned().ok_or(MixError::MissingFile(name))
    }

    /// Installs already-encoded bytes (e.g. read back from disk) under
    /// `kind`/`l` without re-encoding them.
    pub fn insert_raw(&mut self, kind: FileKind, l: u32, bytes: Vec<u8>) {
        self.files.insert(kind.file_name(l), bytes);
    }

    /// Prover-side load: missing file or malformed bytes are both fatal.
    pub fn load_strict<T: ByteTreeEncodable>(&self, kind: FileKind, l: u32) -> Result<T, MixError> {
        let name = kind.file_name(l);
        let bytes = self.files.get(&name).ok_or_else(|| MixError::MissingFile(name.clone()))?;
        let tree = ByteTree::decode(bytes)?;
        Ok(T::from_byte_tree(&tree)?)
    }

    pub fn load_opaque(&self, kind: FileKind, l: u32) -> Result<ByteTree, MixError> {
        let name = kind.file_name(l);
        let bytes = self.files.get(&name).ok_or_else(|| MixError::MissingFile(name.clone()))?;
        Ok(ByteTree::decode(bytes)?)
    }

    /// Verifier-side counterpart of [`Self::load_opaque`]: a missing or
    /// malformed file becomes an empty node, which fails whatever decode the
    /// caller attempts next rather than aborting the run early.
    pub fn load_opaque_lenient(&self, kind: FileKind, l: u32) -> ByteTree {
        let name = kind.file_name(l);
        let decoded =
            self.files.get(&name).ok_or(FormatError::Truncated).and_then(|bytes| ByteTree::decode(bytes));
        match decoded {
            Ok(tree) => tree,
            Err(err) => {
                warn!(file = %name, error = %err, "substituting empty node for malformed proof-directory file");
                ByteTree::node(Vec::new())
            }
        }
    }

    /// `PC{l}` (spec.md §6's permutation commitment) is a bare element
    /// array, not a `ByteTreeEncodable` wire type, so it gets its own pair
    /// of accessors rather than going through `store`/`load_strict`.
    pub fn store_permutation_commitment<G: CryptoGroup>(&mut self, l: u32, u: &[G::Element]) {
        let name = FileKind::PermutationCommitment.file_name(l);
        self.files.insert(name, crate::shuffle::bridging::encode_elements::<G>(u).encode());
    }

    pub fn load_permutation_commitment_strict<G: CryptoGroup>(&self, l: u32) -> Result<Vec<G::Element>, MixError> {
        let name = FileKind::PermutationCommitment.file_name(l);
        let bytes = self.files.get(&name).ok_or_else(|| MixError::MissingFile(name.clone()))?;
        let tree = ByteTree::decode(bytes)?;
        Ok(crate::shuffle::bridging::decode_elements::<G>(&tree)?)
    }

    /// Verifier-side counterpart: a missing or malformed `PC{l}` becomes an
    /// empty array, which fails the downstream algebraic check rather than
    /// aborting the run early.
    pub fn load_permutation_commitment_lenient<G: CryptoGroup>(&self, l: u32) -> Vec<G::Element> {
        let name = FileKind::PermutationCommitment.file_name(l);
        let decoded = self
            .files
            .get(&name)
            .ok_or(FormatError::Truncated)
            .and_then(|bytes| ByteTree::decode(bytes))
            .and_then(|tree| crate::shuffle::bridging::decode_elements::<G>(&tree));
        match decoded {
            Ok(value) => value,
            Err(err) => {
                warn!(file = %name, error = %err, "substituting empty array for malformed proof-directory file");
                Vec::new()
            }
        }
    }

    /// Verifier-side load: never errors. A missing file or a `FormatError`
    /// is logged and replaced by `T::substitute()`.
    pub fn load_lenient<T: Substitute>(&self, kind: FileKind, l: u32) -> T {
        let name = kind.file_name(l);
        let decoded = self
            .files
            .get(&name)
            .ok_or(FormatError::Truncated)
            .and_then(|bytes| ByteTree::decode(bytes))
            .and_then(|tree| T::from_byte_tree(&tree));
        match decoded {
            Ok(value) => value,
            Err(err) => {
                warn!(file = %name, error = %err, "substituting identity for malformed proof-directory file");
                T::substitute()
            }
        }
    }
}

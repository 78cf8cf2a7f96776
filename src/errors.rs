//! Crate-wide error kinds (spec.md §7).
//!
//! Three kinds, deliberately not unified into one enum at the library
//! boundary: callers that only ever see a `FormatError` (decoders) shouldn't
//! have to match on variants that can't occur there. `MixError` exists only
//! at the outermost edge (CLI, proof-directory loading) where all three can
//! show up.

use thiserror::Error;

/// Malformed byte tree, wrong length, unexpected tag, out-of-range integer,
/// point not on curve. Fatal in the prover; in the verifier it triggers
/// substitution with the identity element (spec.md §4.5) rather than an
/// early return.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum FormatError {
    #[error("truncated byte tree: expected more data")]
    Truncated,
    #[error("unexpected tag byte {0:#04x}")]
    BadTag(u8),
    #[error("expected a leaf of length {expected}, found {found}")]
    WrongLeafLength { expected: usize, found: usize },
    #[error("expected a leaf, found a node")]
    ExpectedLeaf,
    #[error("expected a node, found a leaf")]
    ExpectedNode,
    #[error("expected {expected} children, found {found}")]
    WrongChildCount { expected: usize, found: usize },
    #[error("trailing bytes after decoding a byte tree")]
    TrailingBytes,
    #[error("integer {0} out of the expected range")]
    IntegerOutOfRange(String),
    #[error("bytes do not decode to a valid group element")]
    InvalidGroupElement,
    #[error("bytes do not decode to a valid scalar")]
    InvalidScalar,
}

/// Mismatched parent groups/rings, mismatched array lengths. Always fatal:
/// it indicates an internal bug or a malicious caller and must never be
/// caught silently by the core (spec.md §3 invariants, §7).
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ArithmeticError {
    #[error("array length mismatch: expected {expected}, found {found}")]
    LengthMismatch { expected: usize, found: usize },
    #[error("operation requires a non-empty array")]
    EmptyArray,
    #[error("permutation index {index} out of bounds for size {size}")]
    PermutationIndexOutOfBounds { index: usize, size: usize },
    #[error("permutation is not a bijection on 0..{0}")]
    NotABijection(usize),
}

/// The witness fails the prover's preconditions (e.g. an out-of-range
/// challenge). Fatal for the prover; cannot be triggered by the verifier
/// unless the transcript is self-inconsistent.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ProtocolError {
    #[error("witness does not satisfy the claimed instance: {0}")]
    InvalidWitness(String),
    #[error("challenge scalar out of the expected range")]
    ChallengeOutOfRange,
}

/// Top-level error for code at the crate boundary (CLI, proof-directory
/// loading) where any of the three kinds can surface.
#[derive(Debug, Error)]
pub enum MixError {
    #[error(transparent)]
    Format(#[from] FormatError),
    #[error(transparent)]
    Arithmetic(#[from] ArithmeticError),
    #[error(transparent)]
    Protocol(#[from] ProtocolError),
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("missing proof-directory file: {0}")]
    MissingFile(String),
}

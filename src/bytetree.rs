//! Self-describing binary serialization (spec.md §4.1, §6).
//!
//! A byte tree is either a **leaf** carrying a byte string, or a **node**
//! carrying an ordered sequence of children. Wire format: one tag byte
//! (`0x00` leaf, `0x01` node), one 4-byte big-endian length (byte count for
//! a leaf, child count for a node), then the payload. Every hash input in
//! this crate passes through this codec, so its encoding is the one thing
//! that must never drift between prover and verifier.

pub use crate::errors::FormatError;

const TAG_LEAF: u8 = 0x00;
const TAG_NODE: u8 = 0x01;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ByteTree {
    Leaf(Vec<u8>),
    Node(Vec<ByteTree>),
}

impl ByteTree {
    pub fn leaf(bytes: impl Into<Vec<u8>>) -> Self {
        ByteTree::Leaf(bytes.into())
    }

    pub fn node(children: Vec<ByteTree>) -> Self {
        ByteTree::Node(children)
    }

    /// Deterministic encoding: a function of logical content alone.
    pub fn encode(&self) -> Vec<u8> {
        let mut out = Vec::new();
        self.encode_into(&mut out);
        out
    }

    fn encode_into(&self, out: &mut Vec<u8>) {
        match self {
            ByteTree::Leaf(bytes) => {
                out.push(TAG_LEAF);
                out.extend_from_slice(&(bytes.len() as u32).to_be_bytes());
                out.extend_from_slice(bytes);
            }
            ByteTree::Node(children) => {
                out.push(TAG_NODE);
                out.extend_from_slice(&(children.len() as u32).to_be_bytes());
                for child in children {
                    child.encode_into(out);
                }
            }
        }
    }

    /// Decodes a single byte tree from a buffer that must contain exactly
    /// one encoding with nothing left over.
    pub fn decode(bytes: &[u8]) -> Result<Self, FormatError> {
        let mut cursor = Cursor { data: bytes, pos: 0 };
        let tree = cursor.decode_one()?;
        if cursor.pos != cursor.data.len() {
            return Err(FormatError::TrailingBytes);
        }
        Ok(tree)
    }

    /// Borrows this tree's children for sequential reading. Errors if this
    /// is a leaf.
    pub fn reader(&self) -> Result<ByteTreeReader<'_>, FormatError> {
        match self {
            ByteTree::Node(children) => Ok(ByteTreeReader { children, idx: 0 }),
            ByteTree::Leaf(_) => Err(FormatError::ExpectedNode),
        }
    }

    pub fn as_leaf(&self) -> Result<&[u8], FormatError> {
        match self {
            ByteTree::Leaf(bytes) => Ok(bytes),
            ByteTree::Node(_) => Err(FormatError::ExpectedLeaf),
        }
    }

    /// Decodes every child of a node as a `T`, in order. Used for the
    /// variable-length element/scalar arrays the shuffle proofs carry.
    pub fn decode_vec<T: ByteTreeEncodable>(&self) -> Result<Vec<T>, FormatError> {
        let mut reader = self.reader()?;
        let mut out = Vec::with_capacity(reader.remaining());
        while reader.remaining() > 0 {
            out.push(T::from_byte_tree(reader.next_child()?)?);
        }
        Ok(out)
    }
}

/// Encodes a homogeneous sequence as a byte-tree node of each item's own
/// encoding.
pub fn encode_vec<T: ByteTreeEncodable>(items: &[T]) -> ByteTree {
    ByteTree::node(items.iter().map(|item| item.to_byte_tree()).collect())
}

struct Cursor<'a> {
    data: &'a [u8],
    pos: usize,
}

impl<'a> Cursor<'a> {
    fn take(&mut self, n: usize) -> Result<&'a [u8], FormatError> {
        if self.data.len() - self.pos < n {
            return Err(FormatError::Truncated);
        }
        let slice = &self.data[self.pos..self.pos + n];
        self.pos += n;
        Ok(slice)
    }

    fn decode_one(&mut self) -> Result<ByteTree, FormatError> {
        let tag = self.take(1)?[0];
        let len_bytes = self.take(4)?;
        let len = u32::from_be_bytes(len_bytes.try_into().unwrap()) as usize;
        match tag {
            TAG_LEAF => Ok(ByteTree::Leaf(self.take(len)?.to_vec())),
            TAG_NODE => {
                let mut children = Vec::with_capacity(len);
                for _ in 0..len {
                    children.push(self.decode_one()?);
                }
                Ok(ByteTree::Node(children))
            }
            other => Err(FormatError::BadTag(other)),
        }
    }
}

/// Sequential reader over a node's children, per spec.md §4.1:
/// `remaining()`, `nextChild()`, `readBytes(n)`, `readInt()`,
/// `readBooleans(n)`.
pub struct ByteTreeReader<'a> {
    children: &'a [ByteTree],
    idx: usize,
}

impl<'a> ByteTreeReader<'a> {
    pub fn remaining(&self) -> usize {
        self.children.len() - self.idx
    }

    pub fn next_child(&mut self) -> Result<&'a ByteTree, FormatError> {
        let child = self.children.get(self.idx).ok_or(FormatError::Truncated)?;
        self.idx += 1;
        Ok(child)
    }

    pub fn read_bytes(&mut self, n: usize) -> Result<Vec<u8>, FormatError> {
        let bytes = self.next_child()?.as_leaf()?;
        if bytes.len() != n {
            return Err(FormatError::WrongLeafLength { expected: n, found: bytes.len() });
        }
        Ok(bytes.to_vec())
    }

    pub fn read_int(&mut self) -> Result<num_bigint::BigUint, FormatError> {
        let bytes = self.next_child()?.as_leaf()?;
        Ok(num_bigint::BigUint::from_bytes_be(bytes))
    }

    pub fn read_booleans(&mut self, n: usize) -> Result<Vec<bool>, FormatError> {
        Ok(self.read_bytes(n)?.into_iter().map(|b| b != 0).collect())
    }
}

/// A value with a canonical, deterministic byte-tree encoding. Implemented
/// by every wire type in the crate so the round-trip property of spec.md §8
/// is a single generic test per type.
pub trait ByteTreeEncodable: Sized {
    fn to_byte_tree(&self) -> ByteTree;
    fn from_byte_tree(tree: &ByteTree) -> Result<Self, FormatError>;
}

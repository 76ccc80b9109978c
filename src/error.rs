use core::fmt::Debug;

use thiserror::Error;

/// An error from an operation on a tree.
#[derive(Debug, Error, PartialEq, Eq, Clone, Copy)]
pub enum TreeError {
    /// The requested leaf index does not exist in the tree.
    #[error("leaf index {index} out of bounds for tree with {len} leaves")]
    IndexOutOfBounds {
        /// The index that was requested.
        index: usize,
        /// The number of leaves in the tree at the time of the call.
        len: usize,
    },
}

/// An error found while validating an inclusion path, with no tree access.
#[derive(Debug, Error, PartialEq, Eq, Clone)]
pub enum PathError<H>
where
    H: Debug + AsRef<[u8]>,
{
    /// Recombining a triplet's children did not reproduce its parent hash.
    /// The path is corrupt or has been tampered with.
    #[error("unexpected parent hash: got {:?}, want {:?}", hex::encode(got), hex::encode(want))]
    ParentMismatch {
        /// The parent hash stored in the triplet.
        got: H,
        /// The hash recomputed from the triplet's children.
        want: H,
    },

    /// A triplet's parent hash does not reappear as a child of the next
    /// triplet. The path is malformed or its levels were reordered.
    #[error(
        "could not find parent hash {:?}, got {:?} and {:?}",
        hex::encode(parent),
        hex::encode(left),
        hex::encode(right)
    )]
    BrokenChain {
        /// The parent hash that went unmatched.
        parent: H,
        /// The left child of the next triplet.
        left: H,
        /// The right child of the next triplet.
        right: H,
    },
}

//! Mutable merkle trees with incremental growth and verifiable inclusion
//! paths.
//!
//! [`DynTree`] appends leaves in amortized logarithmic work per insertion,
//! patching the pointer structure in place instead of rebuilding levels.
//! Hash recomputation can be paused around bulk loads and settled with one
//! linear sweep. [`Path`] is the tree-independent inclusion proof: a
//! leaf-to-root sequence of (left, right, parent) hash triplets that can
//! be validated from hashes alone.
//!
//! ```
//! use dyn_merkle::{Sha256DynTree, Sha256Hasher};
//!
//! let mut tree = Sha256DynTree::new();
//! tree.add([1; 32]);
//! tree.add([2; 32]);
//! tree.add([3; 32]);
//!
//! let path = tree.path(1).unwrap();
//! path.validate::<Sha256Hasher>().unwrap();
//! assert_eq!(path.root(), tree.root().as_ref());
//! ```

/// Defines errors for tree operations and path validation.
pub mod error;
/// Defines the two-digest combine primitive and the SHA-256 hasher.
pub mod hasher;
/// Defines inclusion paths and their validation.
pub mod path;
/// Defines a reader/writer-locked tree for cross-thread sharing.
pub mod shared;
/// Defines the dynamic merkle tree itself.
pub mod tree;

pub use error::{PathError, TreeError};
pub use hasher::{NodeHasher, Sha256Hasher};
pub use path::{NodeHashes, Path};
pub use shared::SharedDynTree;
pub use tree::{DynTree, Tree};

/// Length in bytes of the default SHA-256 digest.
pub const HASH_LEN: usize = 32;

/// A [`DynTree`] hashing with SHA-256.
pub type Sha256DynTree = DynTree<Sha256Hasher>;

/// A [`SharedDynTree`] hashing with SHA-256.
pub type SharedSha256DynTree = SharedDynTree<Sha256Hasher>;

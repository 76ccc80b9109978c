use parking_lot::RwLock;

use crate::error::TreeError;
use crate::hasher::NodeHasher;
use crate::path::Path;
use crate::tree::{DynTree, Tree};

/// A [`DynTree`] behind a reader/writer lock, for sharing across threads.
///
/// Mutating calls (`add`, `update`, `pause`, `resume`) take the write
/// lock; read-only calls take the read lock. No caller ever observes a
/// partially applied insertion, update or resume, and pause state is never
/// seen torn from hash state. Wrap in an [`std::sync::Arc`] to share.
#[derive(Debug)]
pub struct SharedDynTree<M: NodeHasher> {
    inner: RwLock<DynTree<M>>,
}

impl<M: NodeHasher + Default> SharedDynTree<M> {
    /// Creates an empty shared tree with a default hasher.
    pub fn new() -> Self {
        Self::from_tree(DynTree::new())
    }

    /// Creates an empty shared tree sized for `leaves` insertions.
    pub fn with_capacity(leaves: usize) -> Self {
        Self::from_tree(DynTree::with_capacity(leaves))
    }
}

impl<M: NodeHasher + Default> Default for SharedDynTree<M> {
    fn default() -> Self {
        Self::new()
    }
}

impl<M: NodeHasher> SharedDynTree<M> {
    /// Wraps an existing tree.
    pub fn from_tree(tree: DynTree<M>) -> Self {
        Self {
            inner: RwLock::new(tree),
        }
    }

    /// Unwraps the inner tree, consuming the lock.
    pub fn into_inner(self) -> DynTree<M> {
        self.inner.into_inner()
    }

    /// Appends a leaf digest to the tree.
    pub fn add(&self, leaf: M::Output) {
        self.inner.write().add(leaf);
    }

    /// Replaces the digest of the leaf at `index`.
    pub fn update(&self, index: usize, hash: M::Output) -> Result<(), TreeError> {
        self.inner.write().update(index, hash)
    }

    /// Suspends hash recomputation; see [`DynTree::pause`].
    pub fn pause(&self) {
        self.inner.write().pause();
    }

    /// Recomputes stale hashes and lifts the suspension; see
    /// [`DynTree::resume`].
    pub fn resume(&self) {
        self.inner.write().resume();
    }

    /// Returns the number of leaves.
    pub fn leaves_len(&self) -> usize {
        self.inner.read().leaves_len()
    }

    /// Returns the merkle root, absent for an empty tree.
    pub fn root(&self) -> Option<M::Output> {
        self.inner.read().root()
    }

    /// Returns the digest of the leaf at `index`, if it exists.
    pub fn leaf(&self, index: usize) -> Option<M::Output> {
        self.inner.read().leaf(index)
    }

    /// Returns the inclusion path from leaf `index` to the root.
    pub fn path(&self, index: usize) -> Result<Path<M::Output>, TreeError> {
        self.inner.read().path(index)
    }
}

impl<M: NodeHasher> Tree for SharedDynTree<M> {
    type Hash = M::Output;

    fn leaves_len(&self) -> usize {
        SharedDynTree::leaves_len(self)
    }

    fn root(&self) -> Option<Self::Hash> {
        SharedDynTree::root(self)
    }

    fn leaf(&self, index: usize) -> Option<Self::Hash> {
        SharedDynTree::leaf(self, index)
    }

    fn path(&self, index: usize) -> Result<Path<Self::Hash>, TreeError> {
        SharedDynTree::path(self, index)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hasher::Sha256Hasher;
    use std::sync::Arc;
    use std::thread;

    type SharedSha256DynTree = SharedDynTree<Sha256Hasher>;

    #[test]
    fn writers_serialize_readers_share() {
        let tree = Arc::new(SharedSha256DynTree::with_capacity(4 * 64));

        let writers: Vec<_> = (0u8..4)
            .map(|w| {
                let tree = Arc::clone(&tree);
                thread::spawn(move || {
                    for i in 0u8..64 {
                        tree.add([w.wrapping_mul(64).wrapping_add(i); 32]);
                    }
                })
            })
            .collect();

        let readers: Vec<_> = (0..2)
            .map(|_| {
                let tree = Arc::clone(&tree);
                thread::spawn(move || {
                    for _ in 0..200 {
                        let len = tree.leaves_len();
                        if len >= 2 {
                            let path = tree.path(len / 2).unwrap();
                            path.validate::<Sha256Hasher>().unwrap();
                        }
                        let _ = tree.root();
                    }
                })
            })
            .collect();

        for handle in writers.into_iter().chain(readers) {
            handle.join().unwrap();
        }

        assert_eq!(tree.leaves_len(), 4 * 64);
        for index in 0..tree.leaves_len() {
            tree.path(index)
                .unwrap()
                .validate::<Sha256Hasher>()
                .unwrap();
        }
    }

    #[test]
    fn pause_resume_through_the_lock() {
        let shared = SharedSha256DynTree::new();
        shared.pause();
        for i in 0u8..9 {
            shared.add([i; 32]);
        }
        shared.resume();

        let mut eager = DynTree::<Sha256Hasher>::new();
        for i in 0u8..9 {
            eager.add([i; 32]);
        }

        assert_eq!(shared.root(), eager.root());
    }
}

use crate::error::TreeError;
use crate::hasher::NodeHasher;
use crate::path::{NodeHashes, Path};

/// Stable index of a node inside the tree's arena.
type NodeId = usize;

/// Sibling relation of a node.
///
/// At most one direction is ever set: a node is either the right child of
/// its parent, pointing at its left sibling, or the left child, pointing at
/// its right sibling. The root and a lone leaf have no sibling.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
enum Sibling {
    #[default]
    None,
    /// This node is the right child; the id is its left sibling.
    Left(NodeId),
    /// This node is the left child; the id is its right sibling.
    Right(NodeId),
}

#[derive(Debug, Clone)]
struct Node<H> {
    hash: H,
    sibling: Sibling,
    parent: Option<NodeId>,
    height: usize,
}

/// Operations any merkle tree implementation must provide.
///
/// This dynamic tree is one implementor; a static tree precomputed from a
/// fixed leaf set can satisfy the same contract.
pub trait Tree {
    /// Digest type of the tree's nodes.
    type Hash;

    /// Returns the number of leaves.
    fn leaves_len(&self) -> usize;

    /// Returns the merkle root, absent for an empty tree.
    fn root(&self) -> Option<Self::Hash>;

    /// Returns the digest of the leaf at `index`, if it exists.
    fn leaf(&self, index: usize) -> Option<Self::Hash>;

    /// Returns the inclusion path from leaf `index` to the root.
    fn path(&self, index: usize) -> Result<Path<Self::Hash>, TreeError>;
}

/// A merkle tree that can grow and mutate.
///
/// Leaves are appended one at a time and the internal structure is patched
/// in place, costing amortized logarithmic work per insertion: subtrees
/// pair up and promote exactly like carry bits when incrementing a binary
/// counter. Hash recomputation can be paused around bulk insertions and
/// settled afterwards with a single linear sweep; see [`DynTree::pause`].
///
/// All nodes live in one append-only arena owned by the tree, related to
/// each other by index. Nodes are never moved or dropped once created.
#[derive(Debug)]
pub struct DynTree<M: NodeHasher> {
    nodes: Vec<Node<M::Output>>,
    root: Option<NodeId>,
    leaves: Vec<NodeId>,
    height: usize,
    hasher: M,
    paused: bool,
}

impl<M: NodeHasher + Default> DynTree<M> {
    /// Creates an empty tree with a default hasher.
    pub fn new() -> Self {
        Self::with_hasher(M::default())
    }

    /// Creates an empty tree sized ahead of time for `leaves` insertions.
    pub fn with_capacity(leaves: usize) -> Self {
        let mut tree = Self::new();
        tree.nodes.reserve(leaves.saturating_mul(2).saturating_sub(1));
        tree.leaves.reserve(leaves);
        tree
    }
}

impl<M: NodeHasher + Default> Default for DynTree<M> {
    fn default() -> Self {
        Self::new()
    }
}

impl<M: NodeHasher> DynTree<M> {
    /// Creates an empty tree with the given hasher.
    pub fn with_hasher(hasher: M) -> Self {
        Self {
            nodes: Vec::new(),
            root: None,
            leaves: Vec::new(),
            height: 0,
            hasher,
            paused: false,
        }
    }

    /// Returns the number of leaves.
    pub fn leaves_len(&self) -> usize {
        self.leaves.len()
    }

    /// Returns the merkle root, absent for an empty tree.
    pub fn root(&self) -> Option<M::Output> {
        self.root.map(|id| self.nodes[id].hash.clone())
    }

    /// Returns the digest of the leaf at `index`, if it exists.
    pub fn leaf(&self, index: usize) -> Option<M::Output> {
        self.leaves.get(index).map(|&id| self.nodes[id].hash.clone())
    }

    /// Returns the maximum height the tree has reached.
    pub fn height(&self) -> usize {
        self.height
    }

    /// Returns `true` while hash recomputation is suspended.
    pub fn is_paused(&self) -> bool {
        self.paused
    }

    /// Appends a leaf digest to the tree.
    ///
    /// The structure always grows; ancestor hashes are recomputed on the
    /// spot unless the tree is paused.
    pub fn add(&mut self, leaf: M::Output) {
        let node = self.push_node(Node {
            hash: leaf.clone(),
            sibling: Sibling::None,
            parent: None,
            height: 0,
        });
        self.leaves.push(node);

        if self.root.is_none() {
            self.root = Some(node);
            return;
        }

        // Climb the fully paired chain above the previous leaf. The loop
        // stops at the subtree root ready to pair with the new leaf, the
        // same way a carry stops at the first zero bit.
        let mut left = self.leaves[self.leaves.len() - 2];
        while let Some(p) = self.nodes[left].parent {
            if self.nodes[p].height != self.nodes[left].height + 1 {
                break;
            }
            left = p;
        }

        // The new parent takes over the candidate's old position in the
        // tree: its former left-sibling relation and its former parent.
        let displaced = match self.nodes[left].sibling {
            Sibling::Left(x) => Some(x),
            _ => None,
        };
        let parent = self.push_node(Node {
            hash: M::Output::default(),
            sibling: displaced.map_or(Sibling::None, Sibling::Left),
            parent: self.nodes[left].parent,
            height: self.nodes[left].height + 1,
        });

        self.nodes[node].parent = Some(parent);
        self.nodes[node].sibling = Sibling::Left(left);
        self.nodes[left].parent = Some(parent);
        self.nodes[left].sibling = Sibling::Right(node);

        // The candidate's outward sibling relation is superseded by the
        // new parent; its former left neighbor must point there instead.
        if let Some(x) = displaced {
            self.nodes[x].sibling = Sibling::Right(parent);
        }

        if self.nodes[parent].parent.is_none() {
            self.root = Some(parent);
        }
        if self.nodes[parent].height > self.height {
            self.height = self.nodes[parent].height;
        }

        if !self.paused {
            let left_hash = self.nodes[left].hash.clone();
            self.rehash_upward(parent, left_hash, leaf);
        }
    }

    /// Replaces the digest of the leaf at `index`.
    ///
    /// Every ancestor up to the root is recombined immediately unless the
    /// tree is paused, in which case the work is deferred to the next
    /// [`DynTree::resume`].
    pub fn update(&mut self, index: usize, hash: M::Output) -> Result<(), TreeError> {
        let len = self.leaves.len();
        let node = *self
            .leaves
            .get(index)
            .ok_or(TreeError::IndexOutOfBounds { index, len })?;
        self.nodes[node].hash = hash.clone();

        if self.paused {
            return Ok(());
        }

        if let Some(parent) = self.nodes[node].parent {
            match self.nodes[node].sibling {
                Sibling::Left(x) => {
                    let left = self.nodes[x].hash.clone();
                    self.rehash_upward(parent, left, hash);
                }
                Sibling::Right(x) => {
                    let right = self.nodes[x].hash.clone();
                    self.rehash_upward(parent, hash, right);
                }
                Sibling::None => {}
            }
        }

        Ok(())
    }

    /// Suspends hash recomputation on subsequent [`DynTree::add`] and
    /// [`DynTree::update`] calls.
    ///
    /// The structure keeps growing correctly; stored hashes go stale until
    /// the next [`DynTree::resume`]. Pausing around a bulk load of N
    /// leaves turns O(N log N) of eager rehashing into a single O(N)
    /// sweep.
    pub fn pause(&mut self) {
        self.paused = true;
    }

    /// Recomputes every stale hash and lifts the suspension.
    ///
    /// Afterwards the tree is exactly as consistent as if it had never
    /// been paused.
    pub fn resume(&mut self) {
        self.recompute();
        self.paused = false;
    }

    /// Returns the inclusion path from leaf `index` to the root.
    ///
    /// A tree with fewer than two leaves yields an empty path for any
    /// index; otherwise an out-of-range index is an error.
    pub fn path(&self, index: usize) -> Result<Path<M::Output>, TreeError> {
        if self.leaves.len() < 2 {
            return Ok(Path::default());
        }

        let len = self.leaves.len();
        let mut node = *self
            .leaves
            .get(index)
            .ok_or(TreeError::IndexOutOfBounds { index, len })?;
        let mut triplets = Vec::with_capacity(self.height);

        while let Some(parent) = self.nodes[node].parent {
            let triplet = match self.nodes[node].sibling {
                Sibling::Left(x) => NodeHashes {
                    left: self.nodes[x].hash.clone(),
                    right: self.nodes[node].hash.clone(),
                    parent: self.nodes[parent].hash.clone(),
                },
                Sibling::Right(x) => NodeHashes {
                    left: self.nodes[node].hash.clone(),
                    right: self.nodes[x].hash.clone(),
                    parent: self.nodes[parent].hash.clone(),
                },
                Sibling::None => break,
            };
            triplets.push(triplet);
            node = parent;
        }

        Ok(Path { triplets })
    }

    fn push_node(&mut self, node: Node<M::Output>) -> NodeId {
        self.nodes.push(node);
        self.nodes.len() - 1
    }

    /// Sets `id`'s hash from the two supplied child hashes, then walks the
    /// parent links recombining every ancestor up to the root.
    fn rehash_upward(&mut self, id: NodeId, left: M::Output, right: M::Output) {
        let mut id = id;
        let mut left = left;
        let mut right = right;

        loop {
            let combined = self.hasher.hash_nodes(&left, &right);
            self.nodes[id].hash = combined.clone();

            let Some(parent) = self.nodes[id].parent else {
                break;
            };
            match self.nodes[id].sibling {
                Sibling::Left(x) => {
                    left = self.nodes[x].hash.clone();
                    right = combined;
                }
                Sibling::Right(x) => {
                    left = combined;
                    right = self.nodes[x].hash.clone();
                }
                Sibling::None => break,
            }
            id = parent;
        }
    }

    /// One bottom-up sweep recomputing every internal hash exactly once.
    ///
    /// Each level's working set holds the completed pairs at that height;
    /// their parents are rehashed and become the next level's working set
    /// until the root is reached.
    fn recompute(&mut self) {
        let mut row: Vec<NodeId> = self.leaves.clone();

        while !row.is_empty() {
            let mut above = Vec::with_capacity(row.len() / 2);

            for &id in &row {
                let Some(parent) = self.nodes[id].parent else {
                    continue;
                };
                if self.nodes[parent].height != self.nodes[id].height + 1 {
                    continue;
                }
                if let Sibling::Right(right) = self.nodes[id].sibling {
                    let left_hash = self.nodes[id].hash.clone();
                    let right_hash = self.nodes[right].hash.clone();
                    self.nodes[parent].hash = self.hasher.hash_nodes(&left_hash, &right_hash);
                    above.push(parent);
                }
            }

            row = above;
        }
    }
}

impl<M: NodeHasher> Tree for DynTree<M> {
    type Hash = M::Output;

    fn leaves_len(&self) -> usize {
        DynTree::leaves_len(self)
    }

    fn root(&self) -> Option<Self::Hash> {
        DynTree::root(self)
    }

    fn leaf(&self, index: usize) -> Option<Self::Hash> {
        DynTree::leaf(self, index)
    }

    fn path(&self, index: usize) -> Result<Path<Self::Hash>, TreeError> {
        DynTree::path(self, index)
    }
}

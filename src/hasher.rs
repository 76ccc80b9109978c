use core::fmt::Debug;

use sha2::{Digest, Sha256};

/// A two-digest combine primitive for deriving merkle node hashes.
///
/// Implementations may keep internal state (such as a digest context) that
/// is reset and reused between calls; a tree holds exactly one hasher for
/// its whole lifetime instead of allocating one per combine.
pub trait NodeHasher {
    /// The digest produced by this hasher.
    type Output: Debug + PartialEq + Eq + Clone + Default + AsRef<[u8]>;

    /// Combines two child digests into their parent digest.
    fn hash_nodes(&mut self, left: &Self::Output, right: &Self::Output) -> Self::Output;
}

/// The default hasher: `SHA-256(left || right)`, no domain separation.
#[derive(Debug, Default, Clone)]
pub struct Sha256Hasher {
    ctx: Sha256,
}

impl NodeHasher for Sha256Hasher {
    type Output = [u8; 32];

    fn hash_nodes(&mut self, left: &Self::Output, right: &Self::Output) -> Self::Output {
        self.ctx.update(left);
        self.ctx.update(right);
        self.ctx.finalize_reset().into()
    }
}

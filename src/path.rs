use core::fmt::Debug;

use crate::error::PathError;
use crate::hasher::NodeHasher;

/// The left, right and parent hashes of one level of an inclusion path.
#[derive(Debug, PartialEq, Eq, Clone)]
#[cfg_attr(
    feature = "borsh",
    derive(borsh::BorshSerialize, borsh::BorshDeserialize)
)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct NodeHashes<H> {
    /// Hash of the left child.
    pub left: H,
    /// Hash of the right child.
    pub right: H,
    /// Hash of the parent; combining the two children must reproduce it.
    pub parent: H,
}

/// An ordered sequence of hash triplets going from a leaf's own pairing up
/// to the root.
///
/// A path carries everything needed to check that its leaf is included
/// under its final parent hash, with no access to the tree that produced
/// it.
#[derive(Debug, PartialEq, Eq, Clone)]
#[cfg_attr(
    feature = "borsh",
    derive(borsh::BorshSerialize, borsh::BorshDeserialize)
)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Path<H> {
    /// Triplets ordered leaf-to-root; the last triplet's parent is the root.
    pub triplets: Vec<NodeHashes<H>>,
}

impl<H> Default for Path<H> {
    fn default() -> Self {
        Self {
            triplets: Vec::new(),
        }
    }
}

impl<H> NodeHashes<H>
where
    H: Debug + PartialEq + Eq + Clone + AsRef<[u8]>,
{
    /// Checks the triplet with a fresh default hasher.
    pub fn validate<M>(&self) -> Result<(), PathError<H>>
    where
        M: NodeHasher<Output = H> + Default,
    {
        self.validate_with_hasher(&mut M::default())
    }

    /// Checks that combining the children reproduces the parent hash.
    pub fn validate_with_hasher<M>(&self, hasher: &mut M) -> Result<(), PathError<H>>
    where
        M: NodeHasher<Output = H>,
    {
        let want = hasher.hash_nodes(&self.left, &self.right);
        if self.parent != want {
            return Err(PathError::ParentMismatch {
                got: self.parent.clone(),
                want,
            });
        }
        Ok(())
    }
}

impl<H> Path<H> {
    /// Returns the number of triplets in the path.
    pub fn len(&self) -> usize {
        self.triplets.len()
    }

    /// Returns `true` if the path has no triplets, as produced by trees
    /// with fewer than two leaves.
    pub fn is_empty(&self) -> bool {
        self.triplets.is_empty()
    }

    /// Returns the root commitment the path leads to, if any.
    pub fn root(&self) -> Option<&H> {
        self.triplets.last().map(|t| &t.parent)
    }
}

impl<H> Path<H>
where
    H: Debug + PartialEq + Eq + Clone + AsRef<[u8]>,
{
    /// Validates the integrity of the path with a fresh default hasher.
    pub fn validate<M>(&self) -> Result<(), PathError<H>>
    where
        M: NodeHasher<Output = H> + Default,
    {
        self.validate_with_hasher(&mut M::default())
    }

    /// Validates the integrity of the path.
    ///
    /// Every triplet must recombine to its stored parent hash, and each
    /// triplet's parent must reappear as the left or right child of the
    /// triplet one level up. An empty or single-triplet path has no
    /// chaining to check.
    pub fn validate_with_hasher<M>(&self, hasher: &mut M) -> Result<(), PathError<H>>
    where
        M: NodeHasher<Output = H>,
    {
        for (i, triplet) in self.triplets.iter().enumerate() {
            triplet.validate_with_hasher(hasher)?;

            if let Some(up) = self.triplets.get(i + 1) {
                if triplet.parent != up.left && triplet.parent != up.right {
                    return Err(PathError::BrokenChain {
                        parent: triplet.parent.clone(),
                        left: up.left.clone(),
                        right: up.right.clone(),
                    });
                }
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hasher::Sha256Hasher;

    type Hash = [u8; 32];

    fn combine(left: &Hash, right: &Hash) -> Hash {
        Sha256Hasher::default().hash_nodes(left, right)
    }

    /// Builds a well-formed three-level path over eight distinct leaves.
    fn sample_path() -> Path<Hash> {
        let leaves: Vec<Hash> = (0u8..8).map(|i| [i; 32]).collect();
        let l01 = combine(&leaves[0], &leaves[1]);
        let l23 = combine(&leaves[2], &leaves[3]);
        let l0123 = combine(&l01, &l23);
        let l45 = combine(&leaves[4], &leaves[5]);
        let l67 = combine(&leaves[6], &leaves[7]);
        let l4567 = combine(&l45, &l67);
        let root = combine(&l0123, &l4567);

        // Path for leaf 2.
        Path {
            triplets: vec![
                NodeHashes {
                    left: leaves[2],
                    right: leaves[3],
                    parent: l23,
                },
                NodeHashes {
                    left: l01,
                    right: l23,
                    parent: l0123,
                },
                NodeHashes {
                    left: l0123,
                    right: l4567,
                    parent: root,
                },
            ],
        }
    }

    #[test]
    fn valid_path_passes() {
        sample_path().validate::<Sha256Hasher>().unwrap();
    }

    #[test]
    fn empty_path_is_valid() {
        Path::<Hash>::default().validate::<Sha256Hasher>().unwrap();
    }

    #[test]
    fn single_triplet_path_is_valid() {
        let left = [7u8; 32];
        let right = [9u8; 32];
        let path = Path {
            triplets: vec![NodeHashes {
                left,
                right,
                parent: combine(&left, &right),
            }],
        };
        path.validate::<Sha256Hasher>().unwrap();
    }

    #[test]
    fn corrupt_parent_reports_both_digests() {
        let left = [7u8; 32];
        let right = [9u8; 32];
        let good = combine(&left, &right);
        let mut bad = good;
        bad[0] ^= 0x01;

        let path = Path {
            triplets: vec![NodeHashes {
                left,
                right,
                parent: bad,
            }],
        };
        let err = path.validate::<Sha256Hasher>().unwrap_err();
        assert_eq!(
            err,
            PathError::ParentMismatch {
                got: bad,
                want: good,
            }
        );

        let message = err.to_string();
        assert!(message.contains(&hex::encode(bad)));
        assert!(message.contains(&hex::encode(good)));
    }

    #[test]
    fn any_flipped_byte_is_detected() {
        let good = sample_path();

        for triplet in 0..good.len() {
            for field in 0..3 {
                for byte in 0..32 {
                    let mut path = good.clone();
                    let t = &mut path.triplets[triplet];
                    let target = match field {
                        0 => &mut t.left,
                        1 => &mut t.right,
                        _ => &mut t.parent,
                    };
                    target[byte] ^= 0x80;

                    assert!(
                        path.validate::<Sha256Hasher>().is_err(),
                        "flip in triplet {triplet}, field {field}, byte {byte} went undetected"
                    );
                }
            }
        }
    }

    #[test]
    fn flipped_parent_is_an_integrity_error() {
        let mut path = sample_path();
        path.triplets[1].parent[31] ^= 0xff;

        match path.validate::<Sha256Hasher>().unwrap_err() {
            PathError::ParentMismatch { .. } => {}
            other => panic!("expected parent mismatch, got {other:?}"),
        }
    }

    #[test]
    fn reordered_triplets_break_the_chain() {
        let mut path = sample_path();
        path.triplets.swap(0, 1);

        match path.validate::<Sha256Hasher>().unwrap_err() {
            PathError::BrokenChain { parent, left, right } => {
                // The displaced mid-level parent is compared against the
                // two leaf children it cannot match.
                assert_ne!(parent, left);
                assert_ne!(parent, right);
            }
            other => panic!("expected broken chain, got {other:?}"),
        }
    }

    #[cfg(feature = "serde")]
    #[test]
    fn path_survives_json() {
        let path = sample_path();
        let encoded = serde_json::to_string(&path).unwrap();
        let decoded: Path<Hash> = serde_json::from_str(&encoded).unwrap();
        assert_eq!(path, decoded);
        decoded.validate::<Sha256Hasher>().unwrap();
    }

    #[cfg(feature = "borsh")]
    #[test]
    fn path_survives_borsh() {
        let path = sample_path();
        let encoded = borsh::to_vec(&path).unwrap();
        let decoded: Path<Hash> = borsh::from_slice(&encoded).unwrap();
        assert_eq!(path, decoded);
    }
}

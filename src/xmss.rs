//! # XMSS subtrees
//!
//! One layer of the hypertree is a forest of Merkle trees of height `h' = h / d` whose leaves are
//! W-OTS+ public keys. [`Xmss`] builds, signs with and verifies a single one of these trees,
//! identified by the layer and tree fields of the [`Adrs`] passed in.
//!
//! Trees are built level by level: all `2^h'` leaves are derived in parallel, then every level
//! is hashed from the one below it. Node `i` at height `j` is
//! `H(ADRS{TREE, height = j, index = i}, left || right)`; leaves sit at height 0.
//!
//! The two helpers [`treehash`] and [`compute_root`] are shared with FORS, whose trees differ
//! only in the address type and in a global index offset.

use crate::adrs::{Adrs, AdrsType};
use crate::hash::SpxHasher;
use crate::params::ParameterSet;
use crate::wots_plus::WotsPlus;
use rayon::prelude::*;

#[derive(Clone, Copy)]
pub struct Xmss<'a> {
    params: &'a ParameterSet,
    hasher: &'a SpxHasher,
}

impl<'a> Xmss<'a> {
    pub fn new(params: &'a ParameterSet, hasher: &'a SpxHasher) -> Self {
        Self { params, hasher }
    }

    /// Computes the `2^h'` W-OTS+ public keys of the tree, concatenated in leaf order.
    fn leaves(&self, sk_seed: &[u8], adrs: &Adrs) -> Vec<u8> {
        let wots = WotsPlus::new(self.params, self.hasher);
        let leaf_count = 1_u32 << self.params.tree_height();

        (0..leaf_count)
            .into_par_iter()
            .map(|idx| {
                let mut wots_adrs = adrs.subtree_of(AdrsType::WotsHash);
                wots_adrs.set_keypair_addr(idx);
                wots.pk_gen(sk_seed, &wots_adrs)
            })
            .collect::<Vec<Vec<u8>>>()
            .concat()
    }

    /// Computes the root of the tree addressed by `adrs`.
    pub fn root(&self, sk_seed: &[u8], adrs: &Adrs) -> Vec<u8> {
        self.auth_path(sk_seed, 0, adrs).1
    }

    /// Computes the authentication path of leaf `idx` and the root of the tree.
    ///
    /// # Returns
    ///
    /// A tuple containing:
    /// * `Vec<u8>` - the `h' * n`-byte authentication path, lowest sibling first.
    /// * `Vec<u8>` - the `n`-byte root.
    pub fn auth_path(&self, sk_seed: &[u8], idx: u32, adrs: &Adrs) -> (Vec<u8>, Vec<u8>) {
        let leaves = self.leaves(sk_seed, adrs);
        let mut tree_adrs = adrs.subtree_of(AdrsType::Tree);
        treehash(
            self.hasher,
            leaves,
            idx,
            0,
            self.params.tree_height(),
            &mut tree_adrs,
        )
    }

    /// Signs the `n`-byte `message` with W-OTS+ key pair `idx` of the tree.
    ///
    /// # Returns
    ///
    /// A tuple containing:
    /// * `Vec<u8>` - the `(len + h') * n`-byte XMSS signature: W-OTS+ signature, then
    ///   authentication path.
    /// * `Vec<u8>` - the root of the tree.
    pub fn sign(
        &self,
        message: &[u8],
        sk_seed: &[u8],
        idx: u32,
        adrs: &Adrs,
    ) -> (Vec<u8>, Vec<u8>) {
        let (auth, root) = self.auth_path(sk_seed, idx, adrs);
        let mut sig = self.wots_sign(message, sk_seed, idx, adrs);
        sig.extend_from_slice(&auth);
        (sig, root)
    }

    /// Signs with W-OTS+ key pair `idx` only, leaving out the authentication path.
    pub(crate) fn wots_sign(
        &self,
        message: &[u8],
        sk_seed: &[u8],
        idx: u32,
        adrs: &Adrs,
    ) -> Vec<u8> {
        let mut wots_adrs = adrs.subtree_of(AdrsType::WotsHash);
        wots_adrs.set_keypair_addr(idx);
        WotsPlus::new(self.params, self.hasher).sign(message, sk_seed, &wots_adrs)
    }

    /// Computes the root implied by an XMSS signature of `message` by key pair `idx`.
    pub fn pk_from_sig(&self, idx: u32, sig: &[u8], message: &[u8], adrs: &Adrs) -> Vec<u8> {
        let wots_bytes = self.params.wots_bytes();

        let mut wots_adrs = adrs.subtree_of(AdrsType::WotsHash);
        wots_adrs.set_keypair_addr(idx);
        let leaf = WotsPlus::new(self.params, self.hasher).pk_from_sig(
            &sig[..wots_bytes],
            message,
            &wots_adrs,
        );

        let mut tree_adrs = adrs.subtree_of(AdrsType::Tree);
        compute_root(
            self.hasher,
            &leaf,
            idx,
            0,
            &sig[wots_bytes..self.params.xmss_bytes()],
            &mut tree_adrs,
        )
    }
}

/// Hashes `nodes`, the concatenated leaves of a tree of the given height, up to the root,
/// collecting the authentication path of `leaf_idx` on the way.
///
/// `idx_offset` is the index of the first leaf in the address space of `adrs`; node `p` at
/// height `j` is addressed as `(idx_offset >> j) + p`. The type and position words of `adrs`
/// (`TREE` or `FORS_TREE`, layer, tree, key pair) must be set by the caller.
pub(crate) fn treehash(
    hasher: &SpxHasher,
    mut nodes: Vec<u8>,
    leaf_idx: u32,
    idx_offset: u32,
    height: usize,
    adrs: &mut Adrs,
) -> (Vec<u8>, Vec<u8>) {
    let n = hasher.n();
    let mut auth = Vec::with_capacity(height * n);

    for j in 1..=height {
        let sibling = ((leaf_idx >> (j - 1)) ^ 1) as usize;
        auth.extend_from_slice(&nodes[sibling * n..(sibling + 1) * n]);

        adrs.set_tree_height(j as u32);
        let offset = idx_offset >> j;
        let mut parents = vec![0_u8; nodes.len() / 2];
        for (p, (parent, children)) in parents
            .chunks_exact_mut(n)
            .zip(nodes.chunks_exact(2 * n))
            .enumerate()
        {
            adrs.set_tree_index(offset + p as u32);
            hasher.h(parent, &children[..n], &children[n..], adrs);
        }
        nodes = parents;
    }

    (auth, nodes)
}

/// Computes a root node given a leaf and an authentication path.
///
/// `leaf_idx` is the position of the leaf within its tree and `idx_offset` the global index of
/// the tree's first leaf, as in [`treehash`].
pub(crate) fn compute_root(
    hasher: &SpxHasher,
    leaf: &[u8],
    leaf_idx: u32,
    idx_offset: u32,
    auth_path: &[u8],
    adrs: &mut Adrs,
) -> Vec<u8> {
    let n = hasher.n();
    let mut node = leaf[..n].to_vec();
    let mut tree_index = idx_offset + leaf_idx;

    for (k, auth) in auth_path.chunks_exact(n).enumerate() {
        adrs.set_tree_height(k as u32 + 1);
        tree_index >>= 1;
        adrs.set_tree_index(tree_index);

        // If the node is a left child, the authentication node is its right sibling.
        let mut parent = vec![0_u8; n];
        if (leaf_idx >> k) & 1 == 0 {
            hasher.h(&mut parent, &node, auth, adrs);
        } else {
            hasher.h(&mut parent, auth, &node, adrs);
        }
        node = parent;
    }

    node
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::params::{
        SPHINCS_SHAKE_128F_ROBUST, SPHINCS_SHAKE_128F_SIMPLE, SPHINCS_SHAKE_256F_SIMPLE,
    };
    use rand::prelude::*;
    use rand::rngs::OsRng;

    fn subtree_adrs(layer: u32, tree: u64) -> Adrs {
        let mut adrs = Adrs::default();
        adrs.set_layer_addr(layer);
        adrs.set_tree_addr(tree);
        adrs
    }

    #[test]
    fn test_xmss() {
        for params in [SPHINCS_SHAKE_128F_SIMPLE, SPHINCS_SHAKE_256F_SIMPLE] {
            let mut pk_seed = vec![0; params.n];
            let mut sk_seed = vec![0; params.n];
            let mut message = vec![0; params.n];
            OsRng.fill_bytes(&mut pk_seed);
            OsRng.fill_bytes(&mut sk_seed);
            OsRng.fill_bytes(&mut message);

            let hasher = SpxHasher::new(&params, &pk_seed);
            let xmss = Xmss::new(&params, &hasher);
            let adrs = subtree_adrs(2, OsRng.gen::<u32>() as u64);
            let root = xmss.root(&sk_seed, &adrs);

            for idx in 0..(1_u32 << params.tree_height()) {
                let (sig, sig_root) = xmss.sign(&message, &sk_seed, idx, &adrs);
                assert_eq!(sig.len(), params.xmss_bytes());
                assert_eq!(sig_root, root);
                assert_eq!(xmss.pk_from_sig(idx, &sig, &message, &adrs), root);

                // A valid signature under the wrong index does not verify.
                let other = idx ^ 1;
                assert_ne!(xmss.pk_from_sig(other, &sig, &message, &adrs), root);
            }

            // Same seeds, different tree.
            let other_adrs = subtree_adrs(2, adrs.tree_addr() + 1);
            assert_ne!(xmss.root(&sk_seed, &other_adrs), root);
        }
    }

    #[test]
    fn test_root_vector() {
        let params = SPHINCS_SHAKE_128F_ROBUST;
        let pk_seed: Vec<u8> = (0..16).collect();
        let sk_seed: Vec<u8> = (0x10..0x20).collect();
        let hasher = SpxHasher::new(&params, &pk_seed);

        let root = Xmss::new(&params, &hasher).root(&sk_seed, &subtree_adrs(5, 0x1234));
        let hex: String = root.iter().map(|b| format!("{:02x}", b)).collect();
        assert_eq!(hex, "e7541237fb37dd63cad2cf111267c897");
    }

    #[test]
    fn test_treehash_and_compute_root_agree() {
        let params = SPHINCS_SHAKE_128F_SIMPLE;
        let hasher = SpxHasher::new(&params, &[7; 16]);
        let height = 4;
        let mut leaves = vec![0_u8; (1 << height) * 16];
        OsRng.fill_bytes(&mut leaves);

        let mut adrs = Adrs::from(AdrsType::ForsTree);
        adrs.set_keypair_addr(9);
        let offset = 3 << height;

        let (_, root) = treehash(&hasher, leaves.clone(), 0, offset, height, &mut adrs.clone());
        for leaf_idx in 0..(1 << height) {
            let (auth, other_root) =
                treehash(&hasher, leaves.clone(), leaf_idx, offset, height, &mut adrs.clone());
            assert_eq!(other_root, root);

            let leaf = &leaves[leaf_idx as usize * 16..(leaf_idx as usize + 1) * 16];
            let computed = compute_root(&hasher, leaf, leaf_idx, offset, &auth, &mut adrs.clone());
            assert_eq!(computed, root);
        }

        // The offset is part of every node address.
        let (_, shifted) = treehash(&hasher, leaves, 0, offset + (1 << height), height, &mut adrs);
        assert_ne!(shifted, root);
    }
}

//! # Hypertree
//!
//! `d` layers of XMSS trees of height `h'`. Layer `d - 1` holds a single tree whose root is the
//! SPHINCS+ public root; every leaf of a tree at layer `j > 0` signs the root of one tree at layer
//! `j - 1`, and the leaves of layer 0 sign FORS public keys.
//!
//! A signing position is given by the bottom-layer tree index `tree` (`h - h'` bits) and the leaf
//! index `leaf` (`h'` bits). Moving one layer up, the low `h'` bits of `tree` become the leaf
//! index and the remaining bits the tree index.
//!
//! The trees along the path are independent of each other and are built in parallel; only the
//! W-OTS+ signatures, which take the root of the layer below as message, are chained.

use crate::adrs::Adrs;
use crate::hash::SpxHasher;
use crate::params::ParameterSet;
use crate::utils::mask_low_bits;
use crate::xmss::Xmss;
use log::trace;
use rayon::prelude::*;
use subtle::ConstantTimeEq;

#[derive(Clone, Copy)]
pub struct Hypertree<'a> {
    params: &'a ParameterSet,
    hasher: &'a SpxHasher,
}

impl<'a> Hypertree<'a> {
    pub fn new(params: &'a ParameterSet, hasher: &'a SpxHasher) -> Self {
        Self { params, hasher }
    }

    fn layer_adrs(layer: usize, tree: u64) -> Adrs {
        let mut adrs = Adrs::default();
        adrs.set_layer_addr(layer as u32);
        adrs.set_tree_addr(tree);
        adrs
    }

    /// Lists the `(tree, leaf)` position on every layer, bottom layer first.
    fn path(&self, mut tree: u64, mut leaf: u32) -> Vec<(u64, u32)> {
        let tree_height = self.params.tree_height();
        let mut path = Vec::with_capacity(self.params.d);
        path.push((tree, leaf));
        for _ in 1..self.params.d {
            leaf = mask_low_bits(tree, tree_height) as u32;
            tree = if tree_height < 64 { tree >> tree_height } else { 0 };
            path.push((tree, leaf));
        }
        path
    }

    /// Computes the public root: the root of the single tree on the top layer.
    pub fn pk_gen(&self, sk_seed: &[u8]) -> Vec<u8> {
        let adrs = Self::layer_adrs(self.params.d - 1, 0);
        Xmss::new(self.params, self.hasher).root(sk_seed, &adrs)
    }

    /// Signs the `n`-byte `message` from leaf `leaf` of bottom-layer tree `tree`.
    ///
    /// # Returns
    ///
    /// The `d * (len + h') * n`-byte hypertree signature, bottom layer first.
    pub fn sign(&self, message: &[u8], sk_seed: &[u8], tree: u64, leaf: u32) -> Vec<u8> {
        let xmss = Xmss::new(self.params, self.hasher);
        let path = self.path(tree, leaf);

        let trees = path
            .par_iter()
            .enumerate()
            .map(|(layer, &(tree, leaf))| {
                xmss.auth_path(sk_seed, leaf, &Self::layer_adrs(layer, tree))
            })
            .collect::<Vec<_>>();

        let mut sig = Vec::with_capacity(self.params.ht_bytes());
        let mut root = message[..self.params.n].to_vec();
        for (layer, (&(tree, leaf), (auth, layer_root))) in path.iter().zip(trees).enumerate() {
            trace!("hypertree: signing layer {} tree {:#x} leaf {}", layer, tree, leaf);
            let adrs = Self::layer_adrs(layer, tree);
            sig.extend_from_slice(&xmss.wots_sign(&root, sk_seed, leaf, &adrs));
            sig.extend_from_slice(&auth);
            root = layer_root;
        }

        sig
    }

    /// Computes the top-layer root implied by a hypertree signature of `message`.
    pub fn pk_from_sig(&self, message: &[u8], sig: &[u8], tree: u64, leaf: u32) -> Vec<u8> {
        let xmss = Xmss::new(self.params, self.hasher);
        let mut node = message[..self.params.n].to_vec();

        for (layer, ((tree, leaf), xmss_sig)) in self
            .path(tree, leaf)
            .into_iter()
            .zip(sig.chunks_exact(self.params.xmss_bytes()))
            .enumerate()
        {
            let adrs = Self::layer_adrs(layer, tree);
            node = xmss.pk_from_sig(leaf, xmss_sig, &node, &adrs);
        }

        node
    }

    /// Checks a hypertree signature against the public root, in constant time.
    pub fn verify(
        &self,
        message: &[u8],
        sig: &[u8],
        tree: u64,
        leaf: u32,
        pk_root: &[u8],
    ) -> bool {
        if sig.len() != self.params.ht_bytes() {
            return false;
        }
        let root = self.pk_from_sig(message, sig, tree, leaf);
        root.ct_eq(pk_root).into()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::params::{SPHINCS_SHAKE_128F_SIMPLE, SPHINCS_SHAKE_256F_ROBUST};
    use rand::prelude::*;
    use rand::rngs::OsRng;

    #[test]
    fn test_hypertree() {
        for params in [SPHINCS_SHAKE_128F_SIMPLE, SPHINCS_SHAKE_256F_ROBUST] {
            let mut pk_seed = vec![0; params.n];
            let mut sk_seed = vec![0; params.n];
            let mut message = vec![0; params.n];
            OsRng.fill_bytes(&mut pk_seed);
            OsRng.fill_bytes(&mut sk_seed);
            OsRng.fill_bytes(&mut message);

            let hasher = SpxHasher::new(&params, &pk_seed);
            let ht = Hypertree::new(&params, &hasher);
            let pk_root = ht.pk_gen(&sk_seed);

            let tree = mask_low_bits(OsRng.gen(), params.tree_bits());
            let leaf = OsRng.gen_range(0..1_u32 << params.tree_height());

            let sig = ht.sign(&message, &sk_seed, tree, leaf);
            assert_eq!(sig.len(), params.ht_bytes());
            assert!(ht.verify(&message, &sig, tree, leaf, &pk_root), "{}", params);

            let mut fake_sig = sig.clone();
            fake_sig[sig.len() - 1] ^= 1;
            assert!(!ht.verify(&message, &fake_sig, tree, leaf, &pk_root));

            let mut other_message = message.clone();
            other_message[0] ^= 0x40;
            assert!(!ht.verify(&other_message, &sig, tree, leaf, &pk_root));

            let other_leaf = leaf ^ 1;
            assert!(!ht.verify(&message, &sig, tree, other_leaf, &pk_root));
            assert!(!ht.verify(&message, &sig[1..], tree, leaf, &pk_root));
        }
    }

    #[test]
    fn test_path() {
        let params = SPHINCS_SHAKE_128F_SIMPLE;
        let hasher = SpxHasher::new(&params, &[0; 16]);
        let ht = Hypertree::new(&params, &hasher);

        // h' = 3, d = 22.
        let path = ht.path(0b101_110_011, 6);
        assert_eq!(path.len(), 22);
        assert_eq!(path[0], (0b101_110_011, 6));
        assert_eq!(path[1], (0b101_110, 0b011));
        assert_eq!(path[2], (0b101, 0b110));
        assert_eq!(path[3], (0, 0b101));
        assert_eq!(path[21], (0, 0));

        // 256f: tree selector uses all 64 bits, top tree index must end at 0.
        let params = SPHINCS_SHAKE_256F_ROBUST;
        let hasher = SpxHasher::new(&params, &[0; 32]);
        let ht = Hypertree::new(&params, &hasher);
        let path = ht.path(u64::MAX, 15);
        assert_eq!(path[1], (u64::MAX >> 4, 15));
        assert_eq!(path[16], (0, 15));
    }
}

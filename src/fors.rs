//! # Forest Of Random Subsets (FORS)
//!
//! FORS is the few-time signature SPHINCS+ applies to the message digest. It is a forest of `k`
//! Merkle trees of height `a`; the digest selects one leaf in every tree, and the signature
//! reveals that leaf's secret together with its authentication path. The `k` roots are compressed
//! with `T_k` into the FORS public key, which the bottom hypertree layer then signs.
//!
//! All nodes of the forest share one address space: leaf `idx` of tree `i` has the global index
//! `i * 2^a + idx`, and node `p` of tree `i` at height `j` has index `i * 2^(a - j) + p`.
//! The caller passes an address of type [`AdrsType::ForsTree`] with the layer, tree and key pair
//! fields set to the hypertree leaf that certifies this FORS instance.
//!
//! The `k` trees are independent and are built in parallel.

use crate::adrs::{Adrs, AdrsType};
use crate::hash::SpxHasher;
use crate::params::ParameterSet;
use crate::utils::message_to_indices;
use crate::xmss::{compute_root, treehash};
use rayon::prelude::*;
use zeroize::Zeroizing;

#[derive(Clone, Copy)]
pub struct Fors<'a> {
    params: &'a ParameterSet,
    hasher: &'a SpxHasher,
}

impl<'a> Fors<'a> {
    pub fn new(params: &'a ParameterSet, hasher: &'a SpxHasher) -> Self {
        Self { params, hasher }
    }

    /// Splits the first `k * a` bits of `md` into the `k` selected leaf indices.
    pub fn message_to_indices(&self, md: &[u8]) -> Vec<u32> {
        message_to_indices(md, self.params.k, self.params.a)
    }

    /// Derives the secret value of the leaf with global index `idx`.
    fn gen_sk(&self, sk: &mut [u8], sk_seed: &[u8], adrs: &Adrs, idx: u32) {
        let mut prf_adrs = adrs.keypair_of(AdrsType::ForsPrf);
        prf_adrs.set_tree_index(idx);
        self.hasher.prf(sk, sk_seed, &prf_adrs);
    }

    /// Hashes a leaf secret into the leaf with global index `idx`.
    fn sk_to_leaf(&self, leaf: &mut [u8], sk: &[u8], adrs: &Adrs, idx: u32) {
        let mut leaf_adrs = adrs.keypair_of(AdrsType::ForsTree);
        leaf_adrs.set_tree_height(0);
        leaf_adrs.set_tree_index(idx);
        self.hasher.f(leaf, sk, &leaf_adrs);
    }

    /// Computes all `2^a` leaves of tree `tree`, concatenated in leaf order.
    fn tree_leaves(&self, sk_seed: &[u8], adrs: &Adrs, tree: u32) -> Vec<u8> {
        let n = self.params.n;
        let idx_offset = tree << self.params.a;
        let mut sk = Zeroizing::new(vec![0_u8; n]);
        let mut leaves = vec![0_u8; n << self.params.a];

        for (idx, leaf) in leaves.chunks_exact_mut(n).enumerate() {
            let global = idx_offset + idx as u32;
            self.gen_sk(&mut sk, sk_seed, adrs, global);
            self.sk_to_leaf(leaf, &sk, adrs, global);
        }

        leaves
    }

    /// Signs the `ceil(k * a / 8)`-byte digest `md`.
    ///
    /// # Returns
    ///
    /// The `k * (a + 1) * n`-byte FORS signature: for every tree, the selected leaf secret
    /// followed by its authentication path.
    pub fn sign(&self, md: &[u8], sk_seed: &[u8], adrs: &Adrs) -> Vec<u8> {
        let n = self.params.n;
        let a = self.params.a;

        self.message_to_indices(md)
            .into_par_iter()
            .enumerate()
            .map(|(i, idx)| {
                let tree = i as u32;
                let idx_offset = tree << a;
                let mut part = vec![0_u8; (a + 1) * n];

                self.gen_sk(&mut part[..n], sk_seed, adrs, idx_offset + idx);

                let leaves = self.tree_leaves(sk_seed, adrs, tree);
                let mut tree_adrs = adrs.keypair_of(AdrsType::ForsTree);
                let (auth, _) =
                    treehash(self.hasher, leaves, idx, idx_offset, a, &mut tree_adrs);
                part[n..].copy_from_slice(&auth);
                part
            })
            .collect::<Vec<Vec<u8>>>()
            .concat()
    }

    /// Derives the FORS public key from a signature of `md`.
    ///
    /// A valid signature yields the public key of the FORS instance addressed by `adrs`.
    pub fn pk_from_sig(&self, sig: &[u8], md: &[u8], adrs: &Adrs) -> Vec<u8> {
        let n = self.params.n;
        let a = self.params.a;

        let roots = self
            .message_to_indices(md)
            .into_iter()
            .zip(sig.chunks_exact((a + 1) * n))
            .enumerate()
            .flat_map(|(i, (idx, part))| {
                let idx_offset = (i as u32) << a;

                let mut leaf = vec![0_u8; n];
                self.sk_to_leaf(&mut leaf, &part[..n], adrs, idx_offset + idx);

                let mut tree_adrs = adrs.keypair_of(AdrsType::ForsTree);
                compute_root(self.hasher, &leaf, idx, idx_offset, &part[n..], &mut tree_adrs)
            })
            .collect::<Vec<u8>>();

        let roots_adrs = adrs.keypair_of(AdrsType::ForsRoots);
        let mut pk = vec![0_u8; n];
        self.hasher.t_l(&mut pk, &roots, &roots_adrs);
        pk
    }
}

//! # Winternitz One-Time Signature Scheme Plus (W-OTS+)
//!
//! W-OTS+ is the one-time signature at every leaf of the SPHINCS+ hypertree: the key pair at a
//! leaf signs the root of the tree below it (or the FORS public key, at the bottom layer).
//!
//! Secret chain starts are never stored. They are re-derived with `PRF` from `SK.seed` and the
//! [`Adrs`] of the chain each time they are needed, and wiped right after use. Every step along a
//! chain is hashed under its own address (chain index and hash index), so no two hash calls of a
//! key pair share an address.
//!
//! The caller passes an address of type [`AdrsType::WotsHash`] with the layer, tree and key pair
//! fields already set; the chain and hash words are managed here.
//!
//! ## Important Note
//!
//! A W-OTS+ key pair must sign at most one message. Within SPHINCS+ this is guaranteed by the
//! hypertree, which signs the same root with the same key pair every time.

use crate::adrs::{Adrs, AdrsType};
use crate::hash::SpxHasher;
use crate::params::{ParameterSet, SPX_WOTS_LEN2, SPX_WOTS_LOGW, SPX_WOTS_W};
use crate::utils::{base_w, u32_to_bytes};
use zeroize::Zeroizing;

/// Borrowed view over a parameter set and a `PK.seed` keyed hasher, exposing the W-OTS+
/// operations.
#[derive(Clone, Copy)]
pub struct WotsPlus<'a> {
    params: &'a ParameterSet,
    hasher: &'a SpxHasher,
}

impl<'a> WotsPlus<'a> {
    pub fn new(params: &'a ParameterSet, hasher: &'a SpxHasher) -> Self {
        Self { params, hasher }
    }

    /// Generates the compressed W-OTS+ public key of the key pair addressed by `adrs`.
    ///
    /// # Arguments
    ///
    /// * `sk_seed` - The `n`-byte secret seed.
    /// * `adrs` - Address of the key pair (layer, tree and key pair fields).
    ///
    /// # Returns
    ///
    /// The `n`-byte public key, `T_len` over the ends of all `len` chains.
    pub fn pk_gen(&self, sk_seed: &[u8], adrs: &Adrs) -> Vec<u8> {
        let n = self.params.n;
        let mut pk_buf = vec![0_u8; self.params.wots_bytes()];
        let mut hash_adrs = adrs.keypair_of(AdrsType::WotsHash);

        for (i, chain) in pk_buf.chunks_exact_mut(n).enumerate() {
            self.chain_start(chain, sk_seed, adrs, i as u32);
            hash_adrs.set_chain_addr(i as u32);
            self.gen_chain(chain, 0, SPX_WOTS_W - 1, &mut hash_adrs);
        }

        self.compress(&pk_buf, adrs)
    }

    /// Signs an `n`-byte message with the key pair addressed by `adrs`.
    ///
    /// # Returns
    ///
    /// The `len * n`-byte signature: chain `i` advanced `lengths[i]` steps from its start.
    pub fn sign(&self, message: &[u8], sk_seed: &[u8], adrs: &Adrs) -> Vec<u8> {
        let n = self.params.n;
        let lengths = self.chain_lengths(message);
        let mut sig = vec![0_u8; self.params.wots_bytes()];
        let mut hash_adrs = adrs.keypair_of(AdrsType::WotsHash);

        for (i, chain) in sig.chunks_exact_mut(n).enumerate() {
            self.chain_start(chain, sk_seed, adrs, i as u32);
            hash_adrs.set_chain_addr(i as u32);
            self.gen_chain(chain, 0, lengths[i] as usize, &mut hash_adrs);
        }

        sig
    }

    /// Takes a W-OTS+ signature and an `n`-byte message and computes the public key the
    /// signature corresponds to.
    ///
    /// A valid signature yields the output of [`pk_gen`](Self::pk_gen) for the same address.
    pub fn pk_from_sig(&self, sig: &[u8], message: &[u8], adrs: &Adrs) -> Vec<u8> {
        let n = self.params.n;
        let lengths = self.chain_lengths(message);
        let mut pk_buf = sig[..self.params.wots_bytes()].to_vec();
        let mut hash_adrs = adrs.keypair_of(AdrsType::WotsHash);

        for (i, chain) in pk_buf.chunks_exact_mut(n).enumerate() {
            hash_adrs.set_chain_addr(i as u32);
            let start = lengths[i] as usize;
            self.gen_chain(chain, start, SPX_WOTS_W - 1 - start, &mut hash_adrs);
        }

        self.compress(&pk_buf, adrs)
    }

    /// Takes a message and derives the matching chain lengths: `len1` base-w digits of the
    /// message followed by `len2` digits of its checksum.
    pub fn chain_lengths(&self, message: &[u8]) -> Vec<u32> {
        let len1 = self.params.wots_len1();
        let mut lengths = vec![0_u32; self.params.wots_len()];
        base_w(&mut lengths[..len1], &message[..self.params.n]);
        let (msg, csum) = lengths.split_at_mut(len1);
        Self::wots_checksum(csum, msg);
        lengths
    }

    /// Computes the W-OTS+ checksum over a message (in base w).
    fn wots_checksum(csum_base_w: &mut [u32], msg_base_w: &[u32]) {
        let mut csum: u32 = msg_base_w
            .iter()
            .map(|&digit| (SPX_WOTS_W as u32) - 1 - digit)
            .sum();

        // Make sure expected empty zero bits are the least significant bits.
        csum <<= (8 - ((SPX_WOTS_LEN2 * SPX_WOTS_LOGW) % 8)) % 8;

        const CSUM_BYTES: usize = (SPX_WOTS_LEN2 * SPX_WOTS_LOGW + 7) / 8;
        let csum_bytes = u32_to_bytes(csum);
        base_w(csum_base_w, &csum_bytes[4 - CSUM_BYTES..]);
    }

    /// Derives the secret start of chain `chain` into `output`.
    fn chain_start(&self, output: &mut [u8], sk_seed: &[u8], adrs: &Adrs, chain: u32) {
        let mut sk_adrs = adrs.keypair_of(AdrsType::WotsPrf);
        sk_adrs.set_chain_addr(chain);
        sk_adrs.set_hash_addr(0);
        let mut sk = Zeroizing::new(vec![0_u8; self.params.n]);
        self.hasher.prf(&mut sk, sk_seed, &sk_adrs);
        output.copy_from_slice(&sk);
    }

    /// Computes the chaining function in place.
    ///
    /// Interprets `inout` as the `start`-th value of the chain and applies `F` `steps` times.
    /// `adrs` has to contain the address of the chain.
    fn gen_chain(&self, inout: &mut [u8], start: usize, steps: usize, adrs: &mut Adrs) {
        for i in start..(start + steps).min(SPX_WOTS_W - 1) {
            adrs.set_hash_addr(i as u32);
            self.hasher.f_inplace(inout, adrs);
        }
    }

    /// Compresses the `len` chain ends with `T_len` under the key pair's `WOTS_PK` address.
    fn compress(&self, chain_ends: &[u8], adrs: &Adrs) -> Vec<u8> {
        let pk_adrs = adrs.keypair_of(AdrsType::WotsPk);
        let mut pk = vec![0_u8; self.params.n];
        self.hasher.t_l(&mut pk, chain_ends, &pk_adrs);
        pk
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::params::{ALL_PARAMETER_SETS, SPHINCS_SHAKE_128F_ROBUST, SPHINCS_SHAKE_128S_SIMPLE};
    use rand::prelude::*;
    use rand::rngs::OsRng;

    fn keypair_adrs(layer: u32, tree: u64, keypair: u32) -> Adrs {
        let mut adrs = Adrs::from(AdrsType::WotsHash);
        adrs.set_layer_addr(layer);
        adrs.set_tree_addr(tree);
        adrs.set_keypair_addr(keypair);
        adrs
    }

    #[test]
    fn test_wots_plus() {
        for params in ALL_PARAMETER_SETS {
            let mut pk_seed = vec![0; params.n];
            let mut sk_seed = vec![0; params.n];
            let mut message = vec![0; params.n];
            OsRng.fill_bytes(&mut pk_seed);
            OsRng.fill_bytes(&mut sk_seed);
            OsRng.fill_bytes(&mut message);

            let hasher = SpxHasher::new(&params, &pk_seed);
            let wots = WotsPlus::new(&params, &hasher);
            let adrs = keypair_adrs(OsRng.gen_range(0..params.d as u32), OsRng.gen(), 3);

            let pk = wots.pk_gen(&sk_seed, &adrs);
            let sig = wots.sign(&message, &sk_seed, &adrs);
            assert_eq!(sig.len(), params.wots_bytes());
            assert_eq!(wots.pk_from_sig(&sig, &message, &adrs), pk, "{}", params);

            let mut fake_sig = sig.clone();
            fake_sig[0] ^= 1;
            assert_ne!(wots.pk_from_sig(&fake_sig, &message, &adrs), pk);

            let mut other_message = message.clone();
            other_message[params.n - 1] ^= 0x10;
            assert_ne!(wots.pk_from_sig(&sig, &other_message, &adrs), pk);

            let other_keypair = keypair_adrs(adrs.layer_addr(), adrs.tree_addr(), 4);
            assert_ne!(wots.pk_gen(&sk_seed, &other_keypair), pk);
        }
    }

    #[test]
    fn test_pk_gen_vector() {
        let params = SPHINCS_SHAKE_128S_SIMPLE;
        let pk_seed: Vec<u8> = (0..16).collect();
        let sk_seed: Vec<u8> = (0x10..0x20).collect();
        let hasher = SpxHasher::new(&params, &pk_seed);
        let wots = WotsPlus::new(&params, &hasher);

        let pk = wots.pk_gen(&sk_seed, &keypair_adrs(1, 2, 3));
        let hex: String = pk.iter().map(|b| format!("{:02x}", b)).collect();
        assert_eq!(hex, "430d1bd003c11207d21a6ba31596d0f2");
    }

    #[test]
    fn test_chain_lengths() {
        let params = SPHINCS_SHAKE_128F_ROBUST;
        let hasher = SpxHasher::new(&params, &[0; 16]);
        let wots = WotsPlus::new(&params, &hasher);

        // All digits 0: checksum 32 * 15 = 480 = 0x1e0.
        let lengths = wots.chain_lengths(&[0; 16]);
        assert_eq!(lengths.len(), 35);
        assert!(lengths[..32].iter().all(|&l| l == 0));
        assert_eq!(lengths[32..], [1, 14, 0]);

        // All digits 15: checksum 0.
        let lengths = wots.chain_lengths(&[0xff; 16]);
        assert!(lengths[..32].iter().all(|&l| l == 15));
        assert_eq!(lengths[32..], [0, 0, 0]);

        let mut message = [0xff; 16];
        message[0] = 0x3c;
        let lengths = wots.chain_lengths(&message);
        assert_eq!(lengths[..2], [3, 12]);
        // (15 - 3) + (15 - 12) = 15.
        assert_eq!(lengths[32..], [0, 0, 15]);
    }
}

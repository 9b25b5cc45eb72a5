use crate::adrs::Adrs;
use crate::params::{HashMode, ParameterSet};
use crate::utils::{bytes_to_u64, mask_low_bits};
use sha3::{
    digest::{ExtendableOutput, Update, XofReader},
    Shake256,
};
use zeroize::Zeroizing;

/// The three fields `H_msg` yields, split as the signer and verifier consume them.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MessageDigest {
    /// `ceil(k·a / 8)` bytes selecting one leaf in each FORS tree.
    pub md: Vec<u8>,
    /// Index of the bottom-layer XMSS tree, masked to `h - h'` bits.
    pub tree: u64,
    /// Index of the WOTS+ key pair within that tree, masked to `h'` bits.
    pub leaf: u32,
}

/// SHAKE256 tweakable hash family keyed by `PK.seed`.
///
/// `PK.seed` is absorbed once; each call clones the primed state and continues from there, so no
/// state is shared between calls with different addresses.
#[derive(Clone)]
pub struct SpxHasher {
    seeded: Shake256,
    n: usize,
    mode: HashMode,
}

impl SpxHasher {
    pub fn new(params: &ParameterSet, pk_seed: &[u8]) -> Self {
        let mut seeded = Shake256::default();
        seeded.update(&pk_seed[..params.n]);
        Self {
            seeded,
            n: params.n,
            mode: params.mode,
        }
    }

    pub fn n(&self) -> usize {
        self.n
    }

    pub fn mode(&self) -> HashMode {
        self.mode
    }

    /// Writes `SHAKE256(input)` to fill `output`.
    pub fn shake256(output: &mut [u8], input: &[u8]) {
        let mut hasher = Shake256::default();
        hasher.update(input);
        hasher.finalize_xof().read(output);
    }

    /// Tweakable hash of an input of any number of `n`-byte blocks. Writes `n` bytes.
    ///
    /// robust: `SHAKE256(PK.seed || ADRS || (M xor SHAKE256(PK.seed || ADRS)))`
    ///
    /// simple: `SHAKE256(PK.seed || ADRS || M)`
    pub fn thash(&self, output: &mut [u8], input: &[u8], adrs: &Adrs) {
        let mut hasher = self.seeded.clone();
        hasher.update(adrs.as_ref());

        match self.mode {
            HashMode::Simple => hasher.update(input),
            HashMode::Robust => {
                let mut masked = Zeroizing::new(vec![0_u8; input.len()]);
                self.seeded
                    .clone()
                    .chain(adrs)
                    .finalize_xof()
                    .read(&mut masked[..]);
                masked
                    .iter_mut()
                    .zip(input)
                    .for_each(|(mask, byte)| *mask ^= byte);
                hasher.update(&masked[..]);
            }
        }

        hasher.finalize_xof().read(&mut output[..self.n]);
    }

    /// F(PK.seed, ADRS, M1), a one block tweakable hash.
    pub fn f(&self, output: &mut [u8], input: &[u8], adrs: &Adrs) {
        self.thash(output, &input[..self.n], adrs);
    }

    /// Applies [`f`](Self::f) to the first `n` bytes of `inout`, replacing them.
    pub fn f_inplace(&self, inout: &mut [u8], adrs: &Adrs) {
        let input = Zeroizing::new(inout[..self.n].to_vec());
        self.thash(inout, &input, adrs);
    }

    /// H(PK.seed, ADRS, M1 || M2), used for Merkle tree nodes.
    pub fn h(&self, output: &mut [u8], left: &[u8], right: &[u8], adrs: &Adrs) {
        let mut input = Vec::with_capacity(2 * self.n);
        input.extend_from_slice(&left[..self.n]);
        input.extend_from_slice(&right[..self.n]);
        self.thash(output, &input, adrs);
    }

    /// T_l(PK.seed, ADRS, M), compressing `l` concatenated blocks.
    pub fn t_l(&self, output: &mut [u8], input: &[u8], adrs: &Adrs) {
        self.thash(output, input, adrs);
    }

    /// PRF(PK.seed, SK.seed, ADRS) = SHAKE256(PK.seed || ADRS || SK.seed), never masked.
    pub fn prf(&self, output: &mut [u8], sk_seed: &[u8], adrs: &Adrs) {
        self.seeded
            .clone()
            .chain(adrs)
            .chain(&sk_seed[..self.n])
            .finalize_xof()
            .read(&mut output[..self.n]);
    }

    /// PRF_msg(SK.prf, OptRand, M) = SHAKE256(SK.prf || OptRand || M). Writes the `n`-byte
    /// randomizer `R`.
    pub fn prf_msg(output: &mut [u8], sk_prf: &[u8], opt_rand: &[u8], message: &[u8]) {
        let n = sk_prf.len();
        Shake256::default()
            .chain(sk_prf)
            .chain(opt_rand)
            .chain(message)
            .finalize_xof()
            .read(&mut output[..n]);
    }

    /// H_msg(R, PK.seed, PK.root, M) = SHAKE256(R || PK.seed || PK.root || M), read to
    /// `m` bytes and split into the FORS message and the hypertree tree and leaf indices.
    pub fn h_msg(
        params: &ParameterSet,
        r: &[u8],
        pk_seed: &[u8],
        pk_root: &[u8],
        message: &[u8],
    ) -> MessageDigest {
        let mut reader = Shake256::default()
            .chain(r)
            .chain(pk_seed)
            .chain(pk_root)
            .chain(message)
            .finalize_xof();

        let mut md = vec![0_u8; params.fors_msg_bytes()];
        reader.read(&mut md);

        let mut buf_tree = vec![0_u8; params.tree_bytes()];
        reader.read(&mut buf_tree);
        let tree = mask_low_bits(bytes_to_u64(&buf_tree), params.tree_bits());

        let mut buf_leaf = vec![0_u8; params.leaf_bytes()];
        reader.read(&mut buf_leaf);
        let leaf = mask_low_bits(bytes_to_u64(&buf_leaf), params.tree_height()) as u32;

        MessageDigest { md, tree, leaf }
    }
}

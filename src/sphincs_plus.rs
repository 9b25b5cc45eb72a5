//! # SPHINCS+ stateless hash-based signatures
//!
//! This module composes the building blocks of the crate into the SPHINCS+ signature scheme of the
//! [SPHINCS+ v.3.1 submission](https://sphincs.org/data/sphincs+-r3.1-specification.pdf), in its
//! SHAKE256 instantiation:
//!
//! - [`Fors`](crate::fors::Fors) signs a digest of the message,
//! - the [`Hypertree`](crate::hypertree::Hypertree) signs the FORS public key from a leaf the
//!   digest selects,
//! - the top hypertree root is the public key.
//!
//! [`SphincsPlus`] is one engine for all twelve parameter sets. The [`ParameterSet`] is chosen once
//! at construction and every buffer size follows from it.
//!
//! ## Keys and signatures
//!
//! - **`SphincsPlusSecretKey`**: `SK.seed || SK.prf || PK.seed || PK.root`, `4n` bytes.
//! - **`SphincsPlusPublicKey`**: `PK.seed || PK.root`, `2n` bytes, always the second half of the
//!   secret key.
//! - **`SphincsPlusSignature`**: `R || FORS signature || hypertree signature`.
//!
//! All three are wiped from memory when dropped and compare in constant time. Their byte layout is
//! fixed; constructing one from a slice of the wrong length fails with
//! [`Error::LengthMismatch`].
//!
//! ## Signing modes
//!
//! The randomizer `R = PRF_msg(SK.prf, OptRand, M)` is always derived from `SK.prf`; `OptRand` only
//! hedges it:
//!
//! - [`SphincsPlus::sign`] takes `OptRand` from the caller,
//! - [`SphincsPlus::sign_deterministic`] uses `OptRand = PK.seed`, so the same message always
//!   yields the same signature,
//! - [`SphincsPlus::sign_randomized`] draws `OptRand` from the operating system.
//!
//! ## Usage Example
//!
//! ```rust
//! use sphincs_plus::params::SPHINCS_SHAKE_128F_SIMPLE;
//! use sphincs_plus::sphincs_plus::SphincsPlus;
//!
//! let sphincs = SphincsPlus::new(SPHINCS_SHAKE_128F_SIMPLE).expect("valid parameter set");
//! let (secret_key, public_key) = sphincs.keygen_random().expect("Key generation failed");
//!
//! let message = b"stateless hash-based signatures";
//! let signature = sphincs
//!     .sign_randomized(message, &secret_key)
//!     .expect("Signing failed");
//!
//! assert_eq!(sphincs.verify(message, &signature, &public_key), Ok(true));
//! assert_eq!(sphincs.verify(b"another message", &signature, &public_key), Ok(false));
//! ```
//!
//! ## Errors
//!
//! Every operation checks its inputs against the sizes of its parameter set before hashing and
//! returns [`Error::LengthMismatch`] on a mismatch. An invalid signature is not an error:
//! [`SphincsPlus::verify`] returns `Ok(false)`.

use crate::adrs::{Adrs, AdrsType};
use crate::error::{Error, Result};
use crate::fors::Fors;
use crate::hash::SpxHasher;
use crate::hypertree::Hypertree;
use crate::params::ParameterSet;
use crate::utils::bytes_struct;
use log::{debug, trace};
use rand::rngs::OsRng;
use rand::RngCore;
use std::fmt;
use subtle::ConstantTimeEq;
use zeroize::{Zeroize, ZeroizeOnDrop, Zeroizing};

bytes_struct!(
    /// `SphincsPlusSecretKey` holds a SPHINCS+ secret key, `SK.seed || SK.prf || PK.seed ||
    /// PK.root`. Its `Debug` output never shows key material.
    SphincsPlusSecretKey,
    "secret key",
    sk_bytes
);

bytes_struct!(
    /// `SphincsPlusPublicKey` holds a SPHINCS+ public key, `PK.seed || PK.root`.
    #[derive(Debug)]
    SphincsPlusPublicKey,
    "public key",
    pk_bytes
);

bytes_struct!(
    /// `SphincsPlusSignature` holds a SPHINCS+ signature, `R || FORS signature || hypertree
    /// signature`.
    #[derive(Debug)]
    SphincsPlusSignature,
    "signature",
    sig_bytes
);

impl fmt::Debug for SphincsPlusSecretKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SphincsPlusSecretKey")
            .field("len", &self.len())
            .finish_non_exhaustive()
    }
}

impl SphincsPlusSecretKey {
    fn n(&self) -> usize {
        self.0.len() / 4
    }

    pub fn sk_seed(&self) -> &[u8] {
        &self.0[..self.n()]
    }

    pub fn sk_prf(&self) -> &[u8] {
        &self.0[self.n()..2 * self.n()]
    }

    pub fn pk_seed(&self) -> &[u8] {
        &self.0[2 * self.n()..3 * self.n()]
    }

    pub fn pk_root(&self) -> &[u8] {
        &self.0[3 * self.n()..]
    }

    /// Returns the matching public key, the last `2n` bytes of the secret key.
    pub fn public_key(&self) -> SphincsPlusPublicKey {
        SphincsPlusPublicKey(self.0[2 * self.n()..].to_vec())
    }
}

impl SphincsPlusPublicKey {
    pub fn pk_seed(&self) -> &[u8] {
        &self.0[..self.0.len() / 2]
    }

    pub fn pk_root(&self) -> &[u8] {
        &self.0[self.0.len() / 2..]
    }
}

impl SphincsPlusSignature {
    /// The `n`-byte randomizer `R`.
    pub fn randomizer(&self, params: &ParameterSet) -> &[u8] {
        &self.0[..params.n]
    }

    /// The `k * (a + 1) * n`-byte FORS signature.
    pub fn fors_part(&self, params: &ParameterSet) -> &[u8] {
        &self.0[params.n..params.n + params.fors_bytes()]
    }

    /// The `d * (len + h') * n`-byte hypertree signature.
    pub fn hypertree_part(&self, params: &ParameterSet) -> &[u8] {
        &self.0[params.n + params.fors_bytes()..]
    }
}

/// `SphincsPlus` generates key pairs, signs messages and verifies signatures for one SPHINCS+
/// parameter set.
///
/// It holds no key material and no mutable state; one instance may be shared between threads.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SphincsPlus {
    params: ParameterSet,
}

impl Default for SphincsPlus {
    /// `sphincs+-shake-128s-simple`.
    fn default() -> Self {
        Self {
            params: ParameterSet::default(),
        }
    }
}

impl SphincsPlus {
    /// Creates a `SphincsPlus` instance for the given parameter set, after checking it with
    /// [`ParameterSet::validate`].
    pub fn new(params: ParameterSet) -> Result<Self> {
        params.validate()?;
        Ok(Self { params })
    }

    /// Creates a `SphincsPlus` instance from a parameter set name such as
    /// `sphincs+-shake-256f-robust` or `256f-robust`.
    pub fn from_name(name: &str) -> Result<Self> {
        Self::new(ParameterSet::from_name(name)?)
    }

    pub fn params(&self) -> &ParameterSet {
        &self.params
    }

    /// Generates a SPHINCS+ key pair from three `n`-byte seeds.
    ///
    /// The public root is the root of the top hypertree layer. Key generation is deterministic:
    /// the same seeds always yield the same keys.
    ///
    /// # Returns
    ///
    /// A tuple containing:
    /// * `SphincsPlusSecretKey` - `sk_seed || sk_prf || pk_seed || pk_root`.
    /// * `SphincsPlusPublicKey` - `pk_seed || pk_root`.
    pub fn keygen(
        &self,
        sk_seed: &[u8],
        sk_prf: &[u8],
        pk_seed: &[u8],
    ) -> Result<(SphincsPlusSecretKey, SphincsPlusPublicKey)> {
        let params = &self.params;
        Error::check_len("secret seed", params.n, sk_seed)?;
        Error::check_len("secret PRF key", params.n, sk_prf)?;
        Error::check_len("public seed", params.n, pk_seed)?;
        debug!(
            "{}: generating key pair ({} byte public key)",
            params,
            params.pk_bytes()
        );

        let hasher = SpxHasher::new(params, pk_seed);
        let pk_root = Hypertree::new(params, &hasher).pk_gen(sk_seed);

        let mut sk = Vec::with_capacity(params.sk_bytes());
        sk.extend_from_slice(sk_seed);
        sk.extend_from_slice(sk_prf);
        sk.extend_from_slice(pk_seed);
        sk.extend_from_slice(&pk_root);
        let sk = SphincsPlusSecretKey(sk);

        let pk = sk.public_key();
        Ok((sk, pk))
    }

    /// Generates a SPHINCS+ key pair from seeds drawn from the operating system's RNG.
    pub fn keygen_random(&self) -> Result<(SphincsPlusSecretKey, SphincsPlusPublicKey)> {
        let mut seeds = Zeroizing::new(vec![0_u8; 3 * self.params.n]);
        OsRng.fill_bytes(&mut seeds);
        let (sk_seed, rest) = seeds.split_at(self.params.n);
        let (sk_prf, pk_seed) = rest.split_at(self.params.n);
        self.keygen(sk_seed, sk_prf, pk_seed)
    }

    /// Computes the SPHINCS+ signature of `message` under `sk`, with `opt_rand` as the `n`-byte
    /// `OptRand` input of the randomizer.
    ///
    /// Signing is a pure function of `(message, sk, opt_rand)`.
    pub fn sign(
        &self,
        message: &[u8],
        sk: &SphincsPlusSecretKey,
        opt_rand: &[u8],
    ) -> Result<SphincsPlusSignature> {
        let params = &self.params;
        Error::check_len("secret key", params.sk_bytes(), sk.as_bytes())?;
        Error::check_len("randomizer", params.n, opt_rand)?;
        debug!(
            "{}: signing {} byte message ({} byte signature)",
            params,
            message.len(),
            params.sig_bytes()
        );

        let n = params.n;
        let sk_seed = sk.sk_seed();
        let hasher = SpxHasher::new(params, sk.pk_seed());

        let mut sig = Vec::with_capacity(params.sig_bytes());
        sig.resize(n, 0);
        SpxHasher::prf_msg(&mut sig, sk.sk_prf(), opt_rand, message);

        let digest = SpxHasher::h_msg(params, &sig[..n], sk.pk_seed(), sk.pk_root(), message);
        trace!(
            "{}: signing from tree {:#x} leaf {}",
            params,
            digest.tree,
            digest.leaf
        );

        let adrs = Self::fors_adrs(digest.tree, digest.leaf);
        let fors = Fors::new(params, &hasher);
        let fors_sig = fors.sign(&digest.md, sk_seed, &adrs);
        let fors_pk = fors.pk_from_sig(&fors_sig, &digest.md, &adrs);
        sig.extend_from_slice(&fors_sig);

        let ht_sig = Hypertree::new(params, &hasher).sign(&fors_pk, sk_seed, digest.tree, digest.leaf);
        sig.extend_from_slice(&ht_sig);

        Ok(SphincsPlusSignature(sig))
    }

    /// Signs with `OptRand = PK.seed`: the same message and key always give the same signature.
    pub fn sign_deterministic(
        &self,
        message: &[u8],
        sk: &SphincsPlusSecretKey,
    ) -> Result<SphincsPlusSignature> {
        Error::check_len("secret key", self.params.sk_bytes(), sk.as_bytes())?;
        self.sign(message, sk, sk.pk_seed())
    }

    /// Signs with `OptRand` drawn from the operating system's RNG.
    pub fn sign_randomized(
        &self,
        message: &[u8],
        sk: &SphincsPlusSecretKey,
    ) -> Result<SphincsPlusSignature> {
        let mut opt_rand = Zeroizing::new(vec![0_u8; self.params.n]);
        OsRng.fill_bytes(&mut opt_rand);
        self.sign(message, sk, &opt_rand)
    }

    /// Verifies the SPHINCS+ signature of `message` under `pk`.
    ///
    /// It returns `Err(Error::LengthMismatch)` if the signature or the public key does not have
    /// the size of this parameter set. Otherwise it returns `Ok(true)` if the signature is valid
    /// and `Ok(false)` if it is not.
    pub fn verify(
        &self,
        message: &[u8],
        signature: &SphincsPlusSignature,
        pk: &SphincsPlusPublicKey,
    ) -> Result<bool> {
        let params = &self.params;
        Error::check_len("signature", params.sig_bytes(), signature.as_bytes())?;
        Error::check_len("public key", params.pk_bytes(), pk.as_bytes())?;
        debug!("{}: verifying {} byte message", params, message.len());

        let hasher = SpxHasher::new(params, pk.pk_seed());
        let r = signature.randomizer(params);
        let digest = SpxHasher::h_msg(params, r, pk.pk_seed(), pk.pk_root(), message);

        let adrs = Self::fors_adrs(digest.tree, digest.leaf);
        let fors_pk =
            Fors::new(params, &hasher).pk_from_sig(signature.fors_part(params), &digest.md, &adrs);

        let valid = Hypertree::new(params, &hasher).verify(
            &fors_pk,
            signature.hypertree_part(params),
            digest.tree,
            digest.leaf,
            pk.pk_root(),
        );
        trace!("{}: signature valid: {}", params, valid);
        Ok(valid)
    }

    /// Address of the FORS instance certified by leaf `leaf` of bottom-layer tree `tree`.
    fn fors_adrs(tree: u64, leaf: u32) -> Adrs {
        let mut adrs = Adrs::default();
        adrs.set_layer_addr(0);
        adrs.set_tree_addr(tree);
        adrs.set_type(AdrsType::ForsTree);
        adrs.set_keypair_addr(leaf);
        adrs
    }
}

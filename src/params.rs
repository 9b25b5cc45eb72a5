//! # SPHINCS+ parameter sets
//!
//! The twelve SHAKE256 instantiations of SPHINCS+ r3.1, i.e. the three NIST security levels
//! (128, 192 and 256 bits), each in a small (`s`) and a fast (`f`) flavour, and each hashing
//! in either the [`HashMode::Robust`] or the [`HashMode::Simple`] mode.
//!
//! A [`ParameterSet`] is a plain value. It is selected once when constructing
//! [`SphincsPlus`](crate::sphincs_plus::SphincsPlus) and threaded through every call, so a single
//! engine serves all variants. Every buffer size used by the scheme is derived from its fields.

use crate::error::{Error, Result};
use std::fmt;

/// Winternitz parameter. Fixed for every SPHINCS+ parameter set.
pub const SPX_WOTS_W: usize = 16;

/// `log2(SPX_WOTS_W)`.
pub const SPX_WOTS_LOGW: usize = 4;

/// Number of base-w digits of the WOTS+ checksum. For `w = 16` it is 3 for every `n` up to 136.
pub const SPX_WOTS_LEN2: usize = 3;

/// Byte size of an address.
pub const SPX_ADDR_BYTES: usize = 32;

/// Tweakable hash construction.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serialization", derive(serde::Serialize, serde::Deserialize))]
pub enum HashMode {
    /// The hash input is XORed with a bitmask derived from `PK.seed` and the address.
    Robust,
    /// The hash input is used as is.
    Simple,
}

impl HashMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            HashMode::Robust => "robust",
            HashMode::Simple => "simple",
        }
    }
}

/// Values defining one SPHINCS+ instantiation.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct ParameterSet {
    /// Canonical name, e.g. `sphincs+-shake-128s-robust`.
    pub name: &'static str,
    /// Security parameter: byte size of every hash output.
    pub n: usize,
    /// Total height of the hypertree.
    pub h: usize,
    /// Number of hypertree layers.
    pub d: usize,
    /// Height of each FORS tree.
    pub a: usize,
    /// Number of FORS trees.
    pub k: usize,
    /// Tweakable hash construction.
    pub mode: HashMode,
}

macro_rules! parameter_set {
    ($ident: ident, $name: expr, $n: expr, $h: expr, $d: expr, $a: expr, $k: expr, $mode: expr) => {
        pub const $ident: ParameterSet = ParameterSet {
            name: $name,
            n: $n,
            h: $h,
            d: $d,
            a: $a,
            k: $k,
            mode: $mode,
        };
    };
}

parameter_set!(SPHINCS_SHAKE_128S_ROBUST, "sphincs+-shake-128s-robust", 16, 63, 7, 12, 14, HashMode::Robust);
parameter_set!(SPHINCS_SHAKE_128S_SIMPLE, "sphincs+-shake-128s-simple", 16, 63, 7, 12, 14, HashMode::Simple);
parameter_set!(SPHINCS_SHAKE_128F_ROBUST, "sphincs+-shake-128f-robust", 16, 66, 22, 6, 33, HashMode::Robust);
parameter_set!(SPHINCS_SHAKE_128F_SIMPLE, "sphincs+-shake-128f-simple", 16, 66, 22, 6, 33, HashMode::Simple);
parameter_set!(SPHINCS_SHAKE_192S_ROBUST, "sphincs+-shake-192s-robust", 24, 63, 7, 14, 17, HashMode::Robust);
parameter_set!(SPHINCS_SHAKE_192S_SIMPLE, "sphincs+-shake-192s-simple", 24, 63, 7, 14, 17, HashMode::Simple);
parameter_set!(SPHINCS_SHAKE_192F_ROBUST, "sphincs+-shake-192f-robust", 24, 66, 22, 8, 33, HashMode::Robust);
parameter_set!(SPHINCS_SHAKE_192F_SIMPLE, "sphincs+-shake-192f-simple", 24, 66, 22, 8, 33, HashMode::Simple);
parameter_set!(SPHINCS_SHAKE_256S_ROBUST, "sphincs+-shake-256s-robust", 32, 64, 8, 14, 22, HashMode::Robust);
parameter_set!(SPHINCS_SHAKE_256S_SIMPLE, "sphincs+-shake-256s-simple", 32, 64, 8, 14, 22, HashMode::Simple);
parameter_set!(SPHINCS_SHAKE_256F_ROBUST, "sphincs+-shake-256f-robust", 32, 68, 17, 9, 35, HashMode::Robust);
parameter_set!(SPHINCS_SHAKE_256F_SIMPLE, "sphincs+-shake-256f-simple", 32, 68, 17, 9, 35, HashMode::Simple);

/// All twelve supported parameter sets.
pub const ALL_PARAMETER_SETS: [ParameterSet; 12] = [
    SPHINCS_SHAKE_128S_ROBUST,
    SPHINCS_SHAKE_128S_SIMPLE,
    SPHINCS_SHAKE_128F_ROBUST,
    SPHINCS_SHAKE_128F_SIMPLE,
    SPHINCS_SHAKE_192S_ROBUST,
    SPHINCS_SHAKE_192S_SIMPLE,
    SPHINCS_SHAKE_192F_ROBUST,
    SPHINCS_SHAKE_192F_SIMPLE,
    SPHINCS_SHAKE_256S_ROBUST,
    SPHINCS_SHAKE_256S_SIMPLE,
    SPHINCS_SHAKE_256F_ROBUST,
    SPHINCS_SHAKE_256F_SIMPLE,
];

impl Default for ParameterSet {
    fn default() -> Self {
        SPHINCS_SHAKE_128S_SIMPLE
    }
}

impl fmt::Display for ParameterSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name)
    }
}

impl ParameterSet {
    /// Looks up a parameter set by its canonical name (`sphincs+-shake-128s-robust`) or by the
    /// short form (`128s-robust`). Matching is case-insensitive.
    pub fn from_name(name: &str) -> Result<Self> {
        let wanted = name.trim().to_ascii_lowercase();
        ALL_PARAMETER_SETS
            .iter()
            .find(|p| p.name == wanted || p.name.trim_start_matches("sphincs+-shake-") == wanted)
            .copied()
            .ok_or_else(|| Error::UnknownParameterSet(name.to_owned()))
    }

    /// Checks the structural constraints every derived size relies on.
    pub fn validate(&self) -> Result<()> {
        if !matches!(self.n, 16 | 24 | 32) {
            return Err(Error::InvalidParameterSet("n must be 16, 24 or 32"));
        }
        if self.d == 0 || self.h % self.d != 0 {
            return Err(Error::InvalidParameterSet("h must be divisible by d"));
        }
        if self.tree_bits() > 64 {
            return Err(Error::InvalidParameterSet("h - h/d must not exceed 64"));
        }
        if self.tree_height() > 32 || self.a == 0 || self.a > 32 || self.k == 0 {
            return Err(Error::InvalidParameterSet("tree heights must be in 1..=32"));
        }
        Ok(())
    }

    /// Height `h'` of each XMSS subtree.
    pub const fn tree_height(&self) -> usize {
        self.h / self.d
    }

    /// Number of WOTS+ digits covering the message.
    pub const fn wots_len1(&self) -> usize {
        8 * self.n / SPX_WOTS_LOGW
    }

    /// Number of WOTS+ chains.
    pub const fn wots_len(&self) -> usize {
        self.wots_len1() + SPX_WOTS_LEN2
    }

    /// Byte size of a WOTS+ signature.
    pub const fn wots_bytes(&self) -> usize {
        self.wots_len() * self.n
    }

    /// Byte size of one XMSS signature: a WOTS+ signature and an authentication path.
    pub const fn xmss_bytes(&self) -> usize {
        self.wots_bytes() + self.tree_height() * self.n
    }

    /// Byte size of the hypertree signature.
    pub const fn ht_bytes(&self) -> usize {
        self.d * self.xmss_bytes()
    }

    /// Byte size of the message digest part signed by FORS.
    pub const fn fors_msg_bytes(&self) -> usize {
        (self.k * self.a + 7) / 8
    }

    /// Byte size of a FORS signature.
    pub const fn fors_bytes(&self) -> usize {
        self.k * (self.a + 1) * self.n
    }

    /// Number of bits selecting the bottom-layer tree.
    pub const fn tree_bits(&self) -> usize {
        self.h - self.tree_height()
    }

    /// Byte size of the tree selector in the message digest.
    pub const fn tree_bytes(&self) -> usize {
        (self.tree_bits() + 7) / 8
    }

    /// Byte size of the leaf selector in the message digest.
    pub const fn leaf_bytes(&self) -> usize {
        (self.tree_height() + 7) / 8
    }

    /// Byte size `m` of the `H_msg` output.
    pub const fn digest_bytes(&self) -> usize {
        self.fors_msg_bytes() + self.tree_bytes() + self.leaf_bytes()
    }

    /// Byte size of a public key: `PK.seed || PK.root`.
    pub const fn pk_bytes(&self) -> usize {
        2 * self.n
    }

    /// Byte size of a secret key: `SK.seed || SK.prf || PK.seed || PK.root`.
    pub const fn sk_bytes(&self) -> usize {
        4 * self.n
    }

    /// Byte size of a signature: `R || FORS signature || hypertree signature`.
    pub const fn sig_bytes(&self) -> usize {
        self.n + self.fors_bytes() + self.ht_bytes()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_published_sizes() {
        let expected = [
            (SPHINCS_SHAKE_128S_ROBUST, 64, 32, 7856),
            (SPHINCS_SHAKE_128F_ROBUST, 64, 32, 17088),
            (SPHINCS_SHAKE_192S_ROBUST, 96, 48, 16224),
            (SPHINCS_SHAKE_192F_ROBUST, 96, 48, 35664),
            (SPHINCS_SHAKE_256S_ROBUST, 128, 64, 29792),
            (SPHINCS_SHAKE_256F_ROBUST, 128, 64, 49856),
            (SPHINCS_SHAKE_128S_SIMPLE, 64, 32, 7856),
            (SPHINCS_SHAKE_128F_SIMPLE, 64, 32, 17088),
            (SPHINCS_SHAKE_192S_SIMPLE, 96, 48, 16224),
            (SPHINCS_SHAKE_192F_SIMPLE, 96, 48, 35664),
            (SPHINCS_SHAKE_256S_SIMPLE, 128, 64, 29792),
            (SPHINCS_SHAKE_256F_SIMPLE, 128, 64, 49856),
        ];
        for (p, sk, pk, sig) in expected {
            assert_eq!(p.sk_bytes(), sk, "{}", p);
            assert_eq!(p.pk_bytes(), pk, "{}", p);
            assert_eq!(p.sig_bytes(), sig, "{}", p);
            assert_eq!(2 * p.pk_bytes(), p.sk_bytes());
            assert!(p.validate().is_ok());
        }
    }

    #[test]
    fn test_derived_lengths() {
        let table = [
            (SPHINCS_SHAKE_128S_SIMPLE, 9, 35, 30),
            (SPHINCS_SHAKE_128F_SIMPLE, 3, 35, 34),
            (SPHINCS_SHAKE_192S_SIMPLE, 9, 51, 39),
            (SPHINCS_SHAKE_192F_SIMPLE, 3, 51, 42),
            (SPHINCS_SHAKE_256S_SIMPLE, 8, 67, 47),
            (SPHINCS_SHAKE_256F_SIMPLE, 4, 67, 49),
        ];
        for (p, hp, len, m) in table {
            assert_eq!(p.tree_height(), hp, "{}", p);
            assert_eq!(p.wots_len(), len, "{}", p);
            assert_eq!(p.digest_bytes(), m, "{}", p);
        }
    }

    #[test]
    fn test_from_name() {
        assert_eq!(
            ParameterSet::from_name("sphincs+-shake-256f-robust"),
            Ok(SPHINCS_SHAKE_256F_ROBUST)
        );
        assert_eq!(ParameterSet::from_name("192S-Simple"), Ok(SPHINCS_SHAKE_192S_SIMPLE));
        assert_eq!(
            ParameterSet::from_name("sphincs+-sha2-128s-simple"),
            Err(Error::UnknownParameterSet("sphincs+-sha2-128s-simple".into()))
        );
        for p in ALL_PARAMETER_SETS {
            assert_eq!(ParameterSet::from_name(p.name), Ok(p));
        }
    }

    #[test]
    fn test_validate_rejects_malformed_sets() {
        let mut p = SPHINCS_SHAKE_128S_SIMPLE;
        p.d = 8;
        assert!(matches!(p.validate(), Err(Error::InvalidParameterSet(_))));

        let mut p = SPHINCS_SHAKE_128S_SIMPLE;
        p.n = 20;
        assert!(matches!(p.validate(), Err(Error::InvalidParameterSet(_))));

        let mut p = SPHINCS_SHAKE_256F_SIMPLE;
        p.h = 85;
        assert!(matches!(p.validate(), Err(Error::InvalidParameterSet(_))));
    }
}

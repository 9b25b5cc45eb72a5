//! Tweakable hash functions of SPHINCS+.
//!
//! Only the SHAKE256 instantiation is provided. [`SpxHasher`] carries `PK.seed` and the
//! [`HashMode`](crate::params::HashMode) of a parameter set and exposes `F`, `H`, `T_l` and `PRF`;
//! `PRF_msg` and `H_msg` are associated functions since they are not keyed by `PK.seed` alone.

pub mod shake;

pub use shake::{MessageDigest, SpxHasher};

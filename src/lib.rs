//! SPHINCS+ r3.1 stateless hash-based signatures, instantiated with SHAKE256.
//!
//! All twelve parameter sets are supported (`128s`, `128f`, `192s`, `192f`, `256s`, `256f`, each
//! `robust` or `simple`) through one [`SphincsPlus`] engine configured by a [`ParameterSet`].
//! The building blocks are public modules of their own: [`wots_plus`], [`xmss`], [`hypertree`]
//! and [`fors`], on top of the address scheme in [`adrs`] and the tweakable hashes in [`hash`].

mod utils;

pub mod adrs;
pub mod error;
pub mod fors;
pub mod hash;
pub mod hypertree;
pub mod params;
pub mod sphincs_plus;
pub mod wots_plus;
pub mod xmss;

pub use crate::error::{Error, Result};
pub use crate::params::{HashMode, ParameterSet, ALL_PARAMETER_SETS};
pub use crate::sphincs_plus::{
    SphincsPlus, SphincsPlusPublicKey, SphincsPlusSecretKey, SphincsPlusSignature,
};

//! # Hash addresses
//!
//! Every tweakable hash call in SPHINCS+ is keyed with a 32-byte address `Adrs` that encodes
//! exactly where in the structure the call happens. Two calls that differ in any address field
//! are domain separated, which is what the multi-target security of the scheme relies on.
//!
//! The layout follows the SHAKE instantiation of the
//! [SPHINCS+ v.3.1 submission](https://sphincs.org/data/sphincs+-r3.1-specification.pdf): eight
//! big-endian 32-bit words
//!
//! | word  | content                                                  |
//! |-------|----------------------------------------------------------|
//! | 0     | layer address                                            |
//! | 1..=3 | tree address (the 64-bit tree index sits in words 2..=3) |
//! | 4     | type                                                     |
//! | 5     | key pair address                                         |
//! | 6     | chain address, or tree height                            |
//! | 7     | hash address, or tree index                              |

use crate::params::SPX_ADDR_BYTES;
use crate::utils::{get_u32_at, set_u32_at, set_u64_at};

/// The byte used to specify the Merkle tree layer.
pub const SPX_OFFSET_LAYER: usize = 0;

/// The start of the 12 byte field used to specify the tree.
pub const SPX_OFFSET_TREE: usize = 4;

/// The start of the 8 byte field holding the 64-bit tree index.
const SPX_OFFSET_TREE_LOW: usize = 8;

/// The word used to specify the hash type (reason).
pub const SPX_OFFSET_TYPE: usize = 16;

/// The word used to specify the key pair (which one-time signature).
pub const SPX_OFFSET_KP_ADDR: usize = 20;

/// The word used to specify the chain address (which Winternitz chain).
pub const SPX_OFFSET_CHAIN_ADDR: usize = 24;

/// The word used to specify the hash address (where in the Winternitz chain).
pub const SPX_OFFSET_HASH_ADDR: usize = 28;

/// The word used to specify the height of this node in the FORS or Merkle tree.
pub const SPX_OFFSET_TREE_HGT: usize = 24;

/// The word used to specify the node in the FORS or Merkle tree.
pub const SPX_OFFSET_TREE_INDEX: usize = 28;

/// All 7 types of ADRS defined for SPHINCS+.
/// The corresponding value is set as the `type` word of an ADRS.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[repr(u32)]
pub enum AdrsType {
    /// 0, used for hashing through a WOTS+ chain.
    WotsHash,
    /// 1, used for compression of the WOTS+ public key.
    WotsPk,
    /// 2, used for the inner nodes of the hypertree subtrees.
    Tree,
    /// 3, used for the leaves and inner nodes of FORS trees.
    ForsTree,
    /// 4, used for compression of the FORS roots.
    ForsRoots,
    /// 5, used for WOTS+ secret key generation (start of each chain).
    WotsPrf,
    /// 6, used for FORS secret key generation.
    ForsPrf,
}

impl AdrsType {
    fn from_u32(value: u32) -> Option<Self> {
        Some(match value {
            0 => AdrsType::WotsHash,
            1 => AdrsType::WotsPk,
            2 => AdrsType::Tree,
            3 => AdrsType::ForsTree,
            4 => AdrsType::ForsRoots,
            5 => AdrsType::WotsPrf,
            6 => AdrsType::ForsPrf,
            _ => return None,
        })
    }
}

/// The 32-byte SPHINCS+ hash address.
#[derive(Copy, Clone, Default, Debug, PartialEq, Eq, Hash)]
pub struct Adrs([u8; SPX_ADDR_BYTES]);

impl AsRef<[u8]> for Adrs {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

impl From<[u8; SPX_ADDR_BYTES]> for Adrs {
    fn from(value: [u8; SPX_ADDR_BYTES]) -> Self {
        Self(value)
    }
}

impl From<AdrsType> for Adrs {
    /// Returns an all-zero address of the given type.
    fn from(adrs_type: AdrsType) -> Self {
        let mut adrs = Self::default();
        adrs.set_type(adrs_type);
        adrs
    }
}

impl Adrs {
    pub fn to_bytes(self) -> [u8; SPX_ADDR_BYTES] {
        self.0
    }

    /// Specify which level of Merkle tree (the "layer") we're working on.
    pub fn set_layer_addr(&mut self, layer: u32) {
        set_u32_at(self.0.as_mut(), layer, SPX_OFFSET_LAYER);
    }

    pub fn layer_addr(&self) -> u32 {
        get_u32_at(&self.0, SPX_OFFSET_LAYER)
    }

    /// Specify which Merkle tree within the level (the "tree address") we're working on.
    /// The upper word of the 12-byte field is always zero.
    pub fn set_tree_addr(&mut self, tree: u64) {
        set_u32_at(self.0.as_mut(), 0, SPX_OFFSET_TREE);
        set_u64_at(self.0.as_mut(), tree, SPX_OFFSET_TREE_LOW);
    }

    pub fn tree_addr(&self) -> u64 {
        ((get_u32_at(&self.0, SPX_OFFSET_TREE_LOW) as u64) << 32)
            | get_u32_at(&self.0, SPX_OFFSET_TREE_LOW + 4) as u64
    }

    /// Specify the reason we'll use this address structure for, that is, what
    /// hash will we compute with it. This is used so that unrelated types of
    /// hashes don't accidentally get the same address structure.
    ///
    /// Clears the key pair, chain/height and hash/index words.
    pub fn set_type(&mut self, adrs_type: AdrsType) {
        set_u32_at(self.0.as_mut(), adrs_type as u32, SPX_OFFSET_TYPE);
        self.0[SPX_OFFSET_KP_ADDR..].fill(0);
    }

    /// Returns the type word, or `None` if it holds no known type.
    pub fn adrs_type(&self) -> Option<AdrsType> {
        AdrsType::from_u32(get_u32_at(&self.0, SPX_OFFSET_TYPE))
    }

    /// Specify which Merkle leaf we're working on; that is, which OTS keypair
    /// we're talking about.
    pub fn set_keypair_addr(&mut self, keypair: u32) {
        set_u32_at(self.0.as_mut(), keypair, SPX_OFFSET_KP_ADDR);
    }

    pub fn keypair_addr(&self) -> u32 {
        get_u32_at(&self.0, SPX_OFFSET_KP_ADDR)
    }

    /// Copy the layer and tree fields of the address structure. This is used
    /// when we're doing multiple types of hashes within the same Merkle tree.
    pub fn subtree_of(&self, adrs_type: AdrsType) -> Adrs {
        let mut dst = Adrs::default();
        dst.0[..SPX_OFFSET_TYPE].copy_from_slice(&self.0[..SPX_OFFSET_TYPE]);
        dst.set_type(adrs_type);
        dst
    }

    /// Copy the layer, tree and keypair fields of the address structure. This is
    /// used when we're doing multiple things within the same OTS keypair.
    pub fn keypair_of(&self, adrs_type: AdrsType) -> Adrs {
        let mut dst = self.subtree_of(adrs_type);
        dst.set_keypair_addr(self.keypair_addr());
        dst
    }

    /// Specify which Merkle chain within the OTS we're working with
    /// (the chain address).
    pub fn set_chain_addr(&mut self, chain: u32) {
        set_u32_at(self.0.as_mut(), chain, SPX_OFFSET_CHAIN_ADDR);
    }

    pub fn chain_addr(&self) -> u32 {
        get_u32_at(&self.0, SPX_OFFSET_CHAIN_ADDR)
    }

    /// Specify where in the Merkle chain we are
    /// (the hash address).
    pub fn set_hash_addr(&mut self, hash: u32) {
        set_u32_at(self.0.as_mut(), hash, SPX_OFFSET_HASH_ADDR);
    }

    pub fn hash_addr(&self) -> u32 {
        get_u32_at(&self.0, SPX_OFFSET_HASH_ADDR)
    }

    /// Specify the height of the node in the Merkle/FORS tree we are in
    /// (the tree height).
    pub fn set_tree_height(&mut self, tree_height: u32) {
        set_u32_at(self.0.as_mut(), tree_height, SPX_OFFSET_TREE_HGT);
    }

    pub fn tree_height(&self) -> u32 {
        get_u32_at(&self.0, SPX_OFFSET_TREE_HGT)
    }

    /// Specify the distance from the left edge of the node in the Merkle/FORS tree
    /// (the tree index).
    pub fn set_tree_index(&mut self, tree_index: u32) {
        set_u32_at(self.0.as_mut(), tree_index, SPX_OFFSET_TREE_INDEX);
    }

    pub fn tree_index(&self) -> u32 {
        get_u32_at(&self.0, SPX_OFFSET_TREE_INDEX)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_layout() {
        let mut adrs = Adrs::from(AdrsType::Tree);
        adrs.set_layer_addr(0x0102_0304);
        adrs.set_tree_addr(0x1112_1314_1516_1718);
        adrs.set_tree_height(0x2122_2324);
        adrs.set_tree_index(0x3132_3334);

        let mut expected = [0_u8; 32];
        expected[0..4].copy_from_slice(&[1, 2, 3, 4]);
        expected[8..16].copy_from_slice(&[0x11, 0x12, 0x13, 0x14, 0x15, 0x16, 0x17, 0x18]);
        expected[16..20].copy_from_slice(&[0, 0, 0, 2]);
        expected[24..28].copy_from_slice(&[0x21, 0x22, 0x23, 0x24]);
        expected[28..32].copy_from_slice(&[0x31, 0x32, 0x33, 0x34]);
        assert_eq!(adrs.to_bytes(), expected);

        assert_eq!(adrs.layer_addr(), 0x0102_0304);
        assert_eq!(adrs.tree_addr(), 0x1112_1314_1516_1718);
        assert_eq!(adrs.adrs_type(), Some(AdrsType::Tree));
        assert_eq!(adrs.tree_height(), 0x2122_2324);
        assert_eq!(adrs.tree_index(), 0x3132_3334);
    }

    #[test]
    fn test_set_type_clears_position_words() {
        let mut adrs = Adrs::from(AdrsType::WotsHash);
        adrs.set_layer_addr(3);
        adrs.set_tree_addr(77);
        adrs.set_keypair_addr(5);
        adrs.set_chain_addr(6);
        adrs.set_hash_addr(7);

        adrs.set_type(AdrsType::WotsPk);
        assert_eq!(adrs.layer_addr(), 3);
        assert_eq!(adrs.tree_addr(), 77);
        assert_eq!(adrs.keypair_addr(), 0);
        assert_eq!(adrs.chain_addr(), 0);
        assert_eq!(adrs.hash_addr(), 0);
    }

    #[test]
    fn test_copy_helpers() {
        let mut adrs = Adrs::from(AdrsType::WotsHash);
        adrs.set_layer_addr(2);
        adrs.set_tree_addr(9);
        adrs.set_keypair_addr(4);
        adrs.set_chain_addr(11);

        let subtree = adrs.subtree_of(AdrsType::Tree);
        assert_eq!(subtree.layer_addr(), 2);
        assert_eq!(subtree.tree_addr(), 9);
        assert_eq!(subtree.keypair_addr(), 0);
        assert_eq!(subtree.adrs_type(), Some(AdrsType::Tree));

        let keypair = adrs.keypair_of(AdrsType::WotsPrf);
        assert_eq!(keypair.keypair_addr(), 4);
        assert_eq!(keypair.chain_addr(), 0);
        assert_eq!(keypair.adrs_type(), Some(AdrsType::WotsPrf));
    }

    #[test]
    fn test_unknown_type() {
        let mut raw = [0_u8; 32];
        raw[19] = 9;
        assert_eq!(Adrs::from(raw).adrs_type(), None);
    }
}

use crate::params::{SPX_WOTS_LOGW, SPX_WOTS_W};

pub(crate) fn u32_to_bytes(value: u32) -> [u8; 4] {
    value.to_be_bytes()
}

pub(crate) fn u64_to_bytes(value: u64) -> [u8; 8] {
    value.to_be_bytes()
}

/// Interprets up to 8 bytes as a big-endian integer.
pub(crate) fn bytes_to_u64(bytes: &[u8]) -> u64 {
    bytes
        .iter()
        .fold(0_u64, |acc, &byte| (acc << 8) | byte as u64)
}

pub(crate) fn set_u32_at(array: &mut [u8], value: u32, start_index: usize) {
    array[start_index..start_index + 4].copy_from_slice(&u32_to_bytes(value));
}

pub(crate) fn set_u64_at(array: &mut [u8], value: u64, start_index: usize) {
    array[start_index..start_index + 8].copy_from_slice(&u64_to_bytes(value));
}

pub(crate) fn get_u32_at(array: &[u8], start_index: usize) -> u32 {
    bytes_to_u64(&array[start_index..start_index + 4]) as u32
}

/// Keeps the low `bits` bits of `value`; `bits` may be 64.
pub(crate) fn mask_low_bits(value: u64, bits: usize) -> u64 {
    if bits >= 64 {
        value
    } else {
        value & ((1_u64 << bits) - 1)
    }
}

/// Converts an array of bytes into `output.len()` integers in base `w`,
/// most significant nibble first.
pub(crate) fn base_w(output: &mut [u32], input: &[u8]) {
    let mut bits = 0;
    let mut total: u8 = 0;
    let mut input_index = 0;

    for out in output.iter_mut() {
        if bits == 0 {
            total = input[input_index];
            input_index += 1;
            bits += 8;
        }

        bits -= SPX_WOTS_LOGW;
        *out = ((total >> bits) & ((SPX_WOTS_W - 1) as u8)) as u32;
    }
}

/// Reads `count` groups of `bits` bits from `input`, bit `b` being bit `b % 8` of byte `b / 8`
/// (least significant first). Bit `j` of each group becomes bit `j` of the index.
pub(crate) fn message_to_indices(input: &[u8], count: usize, bits: usize) -> Vec<u32> {
    let mut offset = 0;
    (0..count)
        .map(|_| {
            let mut index = 0_u32;
            for j in 0..bits {
                index ^= (((input[offset >> 3] >> (offset & 7)) & 1) as u32) << j;
                offset += 1;
            }
            index
        })
        .collect()
}

/// Declares a byte-string newtype whose length is fixed by a [`ParameterSet`](crate::params::ParameterSet).
///
/// The contents are wiped from memory on drop. Equality is evaluated in constant time.
macro_rules! bytes_struct {
    ($(#[$meta: meta])* $type: ident, $what: expr, $len: ident) => {
        $(#[$meta])*
        #[derive(Clone, Zeroize, ZeroizeOnDrop)]
        #[cfg_attr(feature = "serialization", derive(serde::Serialize, serde::Deserialize))]
        pub struct $type(Vec<u8>);

        impl $type {
            /// Copies `data` after checking it has the size required by `params`.
            pub fn from_bytes(params: &ParameterSet, data: &[u8]) -> Result<Self> {
                Error::check_len($what, params.$len(), data)?;
                Ok(Self(data.to_vec()))
            }

            pub fn as_bytes(&self) -> &[u8] {
                &self.0
            }

            pub fn to_vec(&self) -> Vec<u8> {
                self.0.clone()
            }

            pub fn len(&self) -> usize {
                self.0.len()
            }

            pub fn is_empty(&self) -> bool {
                self.0.is_empty()
            }
        }

        impl AsRef<[u8]> for $type {
            fn as_ref(&self) -> &[u8] {
                &self.0
            }
        }

        impl PartialEq for $type {
            fn eq(&self, other: &Self) -> bool {
                self.0.ct_eq(&other.0).into()
            }
        }

        impl Eq for $type {}
    };
}

pub(crate) use bytes_struct;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bytes_to_u64() {
        assert_eq!(bytes_to_u64(&[]), 0);
        assert_eq!(bytes_to_u64(&[0x01, 0x02]), 0x0102);
        assert_eq!(
            bytes_to_u64(&[0xff, 0, 0, 0, 0, 0, 0, 0x01]),
            0xff00_0000_0000_0001
        );
        assert_eq!(get_u32_at(&[9, 0, 0, 1, 0x80], 1), 0x0000_0180);
    }

    #[test]
    fn test_mask_low_bits() {
        assert_eq!(mask_low_bits(u64::MAX, 64), u64::MAX);
        assert_eq!(mask_low_bits(u64::MAX, 63), u64::MAX >> 1);
        assert_eq!(mask_low_bits(0b1011_0110, 3), 0b110);
    }

    #[test]
    fn test_base_w() {
        let mut out = [0_u32; 5];
        base_w(&mut out, &[0xa7, 0x3c, 0xff]);
        assert_eq!(out, [0xa, 0x7, 0x3, 0xc, 0xf]);
    }

    #[test]
    fn test_message_to_indices() {
        // 0b1000_0001 0b0000_0011: groups of 3 bits, least significant first.
        let indices = message_to_indices(&[0x81, 0x03], 5, 3);
        assert_eq!(indices, vec![0b001, 0b000, 0b110, 0b001, 0b000]);

        let indices = message_to_indices(&[0xff, 0x0f, 0x34], 2, 12);
        assert_eq!(indices, vec![0xfff, 0x340]);
    }
}

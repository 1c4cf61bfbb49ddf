//! The [`Pack`] trait and shared field codecs.

use arrayref::{array_refs, mut_array_refs};
use sol_wire::Pubkey;

use crate::error::LayoutError;

/// A record with a fixed byte layout.
pub trait Pack: Sized {
    /// Exact encoded length in bytes.
    const LEN: usize;
    /// Human-readable record name used in errors.
    const NAME: &'static str;

    /// Write the record into `dst`, which must be exactly `LEN` bytes.
    fn pack_into_slice(&self, dst: &mut [u8]);

    /// Reinterpret `src`, which must be exactly `LEN` bytes.
    fn unpack_from_slice(src: &[u8]) -> Self;

    /// Decode the first `LEN` bytes of `input`; trailing bytes are ignored.
    fn unpack(input: &[u8]) -> Result<Self, LayoutError> {
        if input.len() < Self::LEN {
            return Err(Self::too_small(input.len()));
        }
        Ok(Self::unpack_from_slice(&input[..Self::LEN]))
    }

    /// Encode into the first `LEN` bytes of `dst`.
    fn pack(&self, dst: &mut [u8]) -> Result<(), LayoutError> {
        if dst.len() < Self::LEN {
            return Err(Self::too_small(dst.len()));
        }
        self.pack_into_slice(&mut dst[..Self::LEN]);
        Ok(())
    }

    fn pack_to_vec(&self) -> Vec<u8> {
        let mut buf = vec![0u8; Self::LEN];
        self.pack_into_slice(&mut buf);
        buf
    }

    #[doc(hidden)]
    fn too_small(actual: usize) -> LayoutError {
        LayoutError::BufferTooSmall {
            record: Self::NAME,
            expected: Self::LEN,
            actual,
        }
    }
}

pub(crate) fn unpack_bool(byte: u8) -> bool {
    byte != 0
}

pub(crate) fn unpack_key(src: &[u8; 32]) -> Pubkey {
    Pubkey::new_from_array(*src)
}

pub(crate) fn unpack_option_key(src: &[u8; 33]) -> Option<Pubkey> {
    let (tag, body) = array_refs![src, 1, 32];
    match tag[0] {
        0 => None,
        _ => Some(Pubkey::new_from_array(*body)),
    }
}

pub(crate) fn pack_option_key(src: &Option<Pubkey>, dst: &mut [u8; 33]) {
    let (tag, body) = mut_array_refs![dst, 1, 32];
    match src {
        Some(key) => {
            tag[0] = 1;
            body.copy_from_slice(key.as_ref());
        }
        None => {
            tag[0] = 0;
            body.fill(0);
        }
    }
}

pub(crate) fn unpack_option_u64(src: &[u8; 9]) -> Option<u64> {
    let (tag, body) = array_refs![src, 1, 8];
    match tag[0] {
        0 => None,
        _ => Some(u64::from_le_bytes(*body)),
    }
}

pub(crate) fn pack_option_u64(src: &Option<u64>, dst: &mut [u8; 9]) {
    let (tag, body) = mut_array_refs![dst, 1, 8];
    match src {
        Some(value) => {
            tag[0] = 1;
            *body = value.to_le_bytes();
        }
        None => {
            tag[0] = 0;
            *body = [0; 8];
        }
    }
}

//! m-of-n authority accounts.

use arrayref::{array_mut_ref, array_ref, array_refs, mut_array_refs};
use sol_wire::Pubkey;
use static_assertions::const_assert_eq;

use crate::pack::{unpack_bool, Pack};

/// Minimum number of multisignature signers.
pub const MIN_SIGNERS: usize = 1;
/// Maximum number of multisignature signers.
pub const MAX_SIGNERS: usize = 11;

/// Multisignature data.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Multisig {
    /// Number of signers required.
    pub m: u8,
    /// Number of valid signers.
    pub n: u8,
    pub is_initialized: bool,
    /// Signer public keys; only the first `n` are meaningful.
    pub signers: [Pubkey; MAX_SIGNERS],
}

impl Multisig {
    pub fn is_initialized(&self) -> bool {
        self.is_initialized
    }

    /// `1 <= m <= n <= 11`.
    pub fn is_valid(&self) -> bool {
        let (m, n) = (self.m as usize, self.n as usize);
        MIN_SIGNERS <= m && m <= n && n <= MAX_SIGNERS
    }

    /// The `n` meaningful signer keys.
    pub fn active_signers(&self) -> &[Pubkey] {
        &self.signers[..(self.n as usize).min(MAX_SIGNERS)]
    }
}

impl Pack for Multisig {
    const LEN: usize = 355;
    const NAME: &'static str = "Multisig";

    fn unpack_from_slice(src: &[u8]) -> Self {
        let src = array_ref![src, 0, 355];
        let (m, n, is_initialized, keys) = array_refs![src, 1, 1, 1, 32 * MAX_SIGNERS];
        let mut signers = [Pubkey::default(); MAX_SIGNERS];
        for (signer, chunk) in signers.iter_mut().zip(keys.chunks_exact(32)) {
            *signer = Pubkey::new_from_array(*array_ref![chunk, 0, 32]);
        }
        Multisig {
            m: m[0],
            n: n[0],
            is_initialized: unpack_bool(is_initialized[0]),
            signers,
        }
    }

    fn pack_into_slice(&self, dst: &mut [u8]) {
        let dst = array_mut_ref![dst, 0, 355];
        let (m, n, is_initialized, keys) = mut_array_refs![dst, 1, 1, 1, 32 * MAX_SIGNERS];
        m[0] = self.m;
        n[0] = self.n;
        is_initialized[0] = self.is_initialized as u8;
        for (chunk, signer) in keys.chunks_exact_mut(32).zip(self.signers.iter()) {
            chunk.copy_from_slice(signer.as_ref());
        }
    }
}

const_assert_eq!(<Multisig as Pack>::LEN, 3 + 32 * MAX_SIGNERS);

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Multisig {
        let mut signers = [Pubkey::default(); MAX_SIGNERS];
        signers[0] = Pubkey::new_from_array([1; 32]);
        signers[1] = Pubkey::new_from_array([2; 32]);
        signers[2] = Pubkey::new_from_array([3; 32]);
        Multisig {
            m: 2,
            n: 3,
            is_initialized: true,
            signers,
        }
    }

    #[test]
    fn multisig_roundtrip() {
        let multisig = sample();
        let bytes = multisig.pack_to_vec();
        assert_eq!(bytes.len(), 355);
        assert_eq!(&bytes[..3], &[2, 3, 1]);
        assert_eq!(&bytes[35..67], &[2; 32]);
        assert_eq!(Multisig::unpack(&bytes).unwrap(), multisig);
    }

    #[test]
    fn active_signers_respects_n() {
        assert_eq!(sample().active_signers().len(), 3);
    }

    #[test]
    fn validity_bounds() {
        let mut multisig = sample();
        assert!(multisig.is_valid());
        multisig.m = 0;
        assert!(!multisig.is_valid());
        multisig.m = 4;
        assert!(!multisig.is_valid());
        multisig.m = 1;
        multisig.n = 12;
        assert!(!multisig.is_valid());
        // Out-of-range n must not panic.
        assert_eq!(multisig.active_signers().len(), MAX_SIGNERS);
    }

    #[test]
    fn short_buffer_fails() {
        assert!(Multisig::unpack(&[0u8; 354]).is_err());
    }
}

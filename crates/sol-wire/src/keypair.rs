//! Ed25519 keypairs and signatures.

use std::fmt;

use ed25519_dalek::{Signer, SigningKey, VerifyingKey};
use rand::rngs::OsRng;
use zeroize::Zeroize;

use crate::address::Pubkey;
use crate::error::SolError;

/// A 64-byte Ed25519 signature.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct Signature([u8; 64]);

impl Signature {
    pub const LEN: usize = 64;

    pub const fn new_from_array(bytes: [u8; 64]) -> Self {
        Self(bytes)
    }

    pub const fn to_bytes(self) -> [u8; 64] {
        self.0
    }

    /// Check this signature over `message` against `pubkey`.
    ///
    /// Uses strict verification, so small-order and malleable encodings are
    /// rejected.
    pub fn verify(&self, pubkey: &Pubkey, message: &[u8]) -> bool {
        let Ok(vk) = VerifyingKey::from_bytes(pubkey.as_array()) else {
            return false;
        };
        let sig = ed25519_dalek::Signature::from_bytes(&self.0);
        vk.verify_strict(message, &sig).is_ok()
    }
}

impl Default for Signature {
    fn default() -> Self {
        Self([0u8; 64])
    }
}

impl fmt::Display for Signature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&bs58::encode(self.0).into_string())
    }
}

impl fmt::Debug for Signature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Signature({self})")
    }
}

/// An Ed25519 signing keypair.
///
/// The secret half lives inside `ed25519_dalek::SigningKey`, which zeroizes
/// itself on drop. `Debug` only ever prints the public key.
pub struct Keypair {
    signing_key: SigningKey,
}

impl Keypair {
    /// Generate a fresh keypair from the operating system RNG.
    pub fn new() -> Self {
        Self {
            signing_key: SigningKey::generate(&mut OsRng),
        }
    }

    /// Build a keypair from a 32-byte Ed25519 seed.
    pub fn from_seed(seed: &[u8; 32]) -> Self {
        let mut seed = *seed;
        let signing_key = SigningKey::from_bytes(&seed);
        seed.zeroize();
        Self { signing_key }
    }

    /// Parse the 64-byte `secret || public` form used by Solana keypair files.
    ///
    /// The public half must match the key derived from the secret half.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, SolError> {
        if bytes.len() != 64 {
            return Err(SolError::InvalidPrivateKey(format!(
                "expected 64 bytes, got {}",
                bytes.len()
            )));
        }

        let mut seed = [0u8; 32];
        seed.copy_from_slice(&bytes[..32]);
        let keypair = Self::from_seed(&seed);
        seed.zeroize();

        if keypair.pubkey().as_ref() != &bytes[32..] {
            return Err(SolError::InvalidPrivateKey(
                "public key does not match secret key".into(),
            ));
        }

        Ok(keypair)
    }

    /// The 64-byte `secret || public` form.
    pub fn to_bytes(&self) -> [u8; 64] {
        self.signing_key.to_keypair_bytes()
    }

    pub fn pubkey(&self) -> Pubkey {
        Pubkey::new_from_array(self.signing_key.verifying_key().to_bytes())
    }

    pub fn sign_message(&self, message: &[u8]) -> Signature {
        Signature(self.signing_key.sign(message).to_bytes())
    }
}

impl Default for Keypair {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for Keypair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Keypair")
            .field("pubkey", &self.pubkey())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn seed_is_deterministic() {
        let a = Keypair::from_seed(&[0x42; 32]);
        let b = Keypair::from_seed(&[0x42; 32]);
        assert_eq!(a.pubkey(), b.pubkey());
    }

    #[test]
    fn generated_keypairs_differ() {
        assert_ne!(Keypair::new().pubkey(), Keypair::new().pubkey());
    }

    #[test]
    fn sign_and_verify() {
        let kp = Keypair::from_seed(&[0x55; 32]);
        let sig = kp.sign_message(b"portfolio");
        assert!(sig.verify(&kp.pubkey(), b"portfolio"));
        assert!(!sig.verify(&kp.pubkey(), b"tampered"));
    }

    #[test]
    fn verify_against_wrong_key_fails() {
        let kp = Keypair::from_seed(&[0x55; 32]);
        let other = Keypair::from_seed(&[0x56; 32]);
        let sig = kp.sign_message(b"msg");
        assert!(!sig.verify(&other.pubkey(), b"msg"));
    }

    #[test]
    fn keypair_bytes_roundtrip() {
        let kp = Keypair::from_seed(&[9; 32]);
        let restored = Keypair::from_bytes(&kp.to_bytes()).unwrap();
        assert_eq!(restored.pubkey(), kp.pubkey());
    }

    #[test]
    fn keypair_bytes_with_wrong_public_half_fails() {
        let mut bytes = Keypair::from_seed(&[9; 32]).to_bytes();
        bytes[63] ^= 0xff;
        let err = Keypair::from_bytes(&bytes).unwrap_err();
        assert!(err.to_string().contains("does not match"));
    }

    #[test]
    fn keypair_bytes_wrong_length_fails() {
        assert!(Keypair::from_bytes(&[1u8; 32]).is_err());
    }

    #[test]
    fn debug_hides_secret() {
        let kp = Keypair::from_seed(&[1; 32]);
        let debug = format!("{kp:?}");
        assert!(debug.contains(&kp.pubkey().to_string()));
        assert!(!debug.contains("signing_key"));
    }
}

//! Program Derived Address (PDA) derivation.
//!
//! A PDA is `SHA-256(seed_0 || ... || seed_n || program_id || "ProgramDerivedAddress")`
//! with the extra requirement that the result is NOT a valid Ed25519 point,
//! so no private key can ever sign for it.

use sha2::{Digest, Sha256};

use crate::address::Pubkey;
use crate::error::SolError;

/// Maximum number of seeds, bump included.
pub const MAX_SEEDS: usize = 16;
/// Maximum length of a single seed.
pub const MAX_SEED_LEN: usize = 32;

/// The string appended to PDA derivation: "ProgramDerivedAddress".
const PDA_MARKER: &[u8] = b"ProgramDerivedAddress";

/// Create a PDA from fully specified seeds (bump included).
///
/// Fails with [`SolError::InvalidSeeds`] if the seeds break the limits or if
/// the hash lands on the curve.
pub fn create_program_address(seeds: &[&[u8]], program_id: &Pubkey) -> Result<Pubkey, SolError> {
    check_seeds(seeds, MAX_SEEDS)?;

    let hash = hash_seeds(seeds, None, program_id);
    if is_on_curve(&hash) {
        return Err(SolError::InvalidSeeds(
            "derived address lies on the ed25519 curve".into(),
        ));
    }
    Ok(Pubkey::new_from_array(hash))
}

/// Find a valid PDA for the given seeds and program.
///
/// Iterates bump seeds from 255 down to 0 and returns the first address that
/// is off the curve together with its bump.
pub fn find_program_address(
    seeds: &[&[u8]],
    program_id: &Pubkey,
) -> Result<(Pubkey, u8), SolError> {
    // One slot is reserved for the bump.
    check_seeds(seeds, MAX_SEEDS - 1)?;

    for bump in (0u8..=255).rev() {
        let hash = hash_seeds(seeds, Some(bump), program_id);
        if !is_on_curve(&hash) {
            return Ok((Pubkey::new_from_array(hash), bump));
        }
    }

    Err(SolError::InvalidSeeds(
        "could not find valid PDA bump seed".into(),
    ))
}

/// Check if 32 bytes represent a valid Ed25519 curve point.
///
/// Uses `curve25519-dalek` to attempt decompression. If it succeeds, the
/// point is on the curve.
pub fn is_on_curve(bytes: &[u8; 32]) -> bool {
    curve25519_dalek::edwards::CompressedEdwardsY(*bytes)
        .decompress()
        .is_some()
}

fn check_seeds(seeds: &[&[u8]], max_seeds: usize) -> Result<(), SolError> {
    if seeds.len() > max_seeds {
        return Err(SolError::InvalidSeeds(format!(
            "{} seeds given, at most {max_seeds} allowed",
            seeds.len()
        )));
    }
    if let Some(seed) = seeds.iter().find(|s| s.len() > MAX_SEED_LEN) {
        return Err(SolError::InvalidSeeds(format!(
            "seed of {} bytes exceeds {MAX_SEED_LEN}",
            seed.len()
        )));
    }
    Ok(())
}

fn hash_seeds(seeds: &[&[u8]], bump: Option<u8>, program_id: &Pubkey) -> [u8; 32] {
    let mut hasher = Sha256::new();
    for seed in seeds {
        hasher.update(seed);
    }
    if let Some(bump) = bump {
        hasher.update([bump]);
    }
    hasher.update(program_id.as_ref());
    hasher.update(PDA_MARKER);
    hasher.finalize().into()
}

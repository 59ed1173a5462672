//! Derivation of the data account address.

use core::str::FromStr;

use solana_sdk::pubkey::{Pubkey, PubkeyError};

use crate::{Error, Result};


/// Address derived with [`derive`] together with the inputs used to derive
/// it.
///
/// The inputs are needed again when creating the account with the System
/// program’s `CreateAccountWithSeed` instruction.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SeededAddress {
    /// Key the address is derived from; must sign account creation.
    pub base: Pubkey,
    pub seed: String,
    /// Program which will own the account.
    pub owner: Pubkey,
    /// The derived address.
    pub address: Pubkey,
}

/// Derives address of an account owned by `owner` from `base` key and `seed`.
///
/// The address is `sha256(base ‖ seed ‖ owner)` and has no private key.  Equal
/// inputs always give the same address.
///
/// Fails with [`Error::InvalidSeed`] if seed is longer than
/// [`solana_sdk::pubkey::MAX_SEED_LEN`] bytes and [`Error::InvalidInput`] if
/// `owner` cannot own seeded accounts (i.e. ends with the PDA marker).
pub fn derive(base: &Pubkey, seed: &str, owner: &Pubkey) -> Result<SeededAddress> {
    let address = Pubkey::create_with_seed(base, seed, owner).map_err(|err| {
        match err {
            PubkeyError::MaxSeedLengthExceeded => Error::InvalidSeed(err),
            err => Error::InvalidInput(format!("{owner}: {err}")),
        }
    })?;
    Ok(SeededAddress {
        base: *base,
        seed: seed.into(),
        owner: *owner,
        address,
    })
}

/// Parses a base58-encoded public key.
pub fn parse_pubkey(key: &str) -> Result<Pubkey> {
    Pubkey::from_str(key)
        .map_err(|err| Error::InvalidInput(format!("{key:?}: {err}")))
}

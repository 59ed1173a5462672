//! Making sure the data account exists.

use solana_sdk::account::Account;
use solana_sdk::instruction::Instruction;
use solana_sdk::pubkey::Pubkey;

use crate::address::SeededAddress;
use crate::rpc::Rpc;
use crate::{ConfirmationLevel, Error, Result};


/// Fee charged for each signature of a transaction.
///
/// With the payer as the base, the account creating transaction carries one
/// signature, so this is what it costs on top of the rent.
pub const SIGNATURE_FEE: u64 = 5_000;

/// Outcome of [`ensure_account`].
#[derive(Clone, Debug, PartialEq)]
pub enum Resolution {
    /// The account exists.
    Exists(Account),
    /// The account doesn’t exist; the instruction creates and funds it.
    Missing(Instruction),
}

impl Resolution {
    pub fn existed(&self) -> bool { matches!(self, Self::Exists(_)) }

    /// Returns the instruction creating the account if it doesn’t exist.
    pub fn into_instruction(self) -> Option<Instruction> {
        match self {
            Self::Exists(_) => None,
            Self::Missing(ix) => Some(ix),
        }
    }
}

/// Checks whether account at `seeded.address` exists and if it doesn’t
/// returns instruction which creates it.
///
/// The instruction is a System program’s `CreateAccountWithSeed` which makes
/// `payer` fund a `size`-byte rent-exempt account owned by `seeded.owner`.
/// Both `payer` and `seeded.base` must sign it.  The instruction is not sent.
///
/// Only a successful query reporting no account is treated as the account not
/// existing.  Failed queries are reported as [`Error::RemoteQuery`].  If the
/// payer cannot afford the rent and the [`SIGNATURE_FEE`], fails with
/// [`Error::InsufficientFunds`].  The check is only as good as the fee
/// estimate; a cluster charging more still rejects the transaction.
pub async fn ensure_account<R: Rpc + ?Sized>(
    rpc: &R,
    seeded: &SeededAddress,
    payer: &Pubkey,
    size: usize,
) -> Result<Resolution> {
    let address = &seeded.address;
    let account = rpc
        .get_account(address, ConfirmationLevel::Confirmed.into())
        .await
        .map_err(Error::RemoteQuery)?;
    if let Some(account) = account {
        tracing::debug!(%address, "account exists");
        return Ok(Resolution::Exists(account));
    }

    let lamports = rpc
        .get_minimum_balance_for_rent_exemption(size)
        .await
        .map_err(Error::RemoteQuery)?;
    let required = lamports.saturating_add(SIGNATURE_FEE);
    let available = rpc.get_balance(payer).await.map_err(Error::RemoteQuery)?;
    if available < required {
        return Err(Error::InsufficientFunds {
            payer: *payer,
            required,
            available,
        });
    }

    tracing::info!(%address, lamports, size, "account does not exist");
    let space = u64::try_from(size)
        .map_err(|_| Error::InvalidInput(format!("account size {size}")))?;
    Ok(Resolution::Missing(
        solana_system_interface::instruction::create_account_with_seed(
            payer,
            address,
            &seeded.base,
            &seeded.seed,
            lamports,
            space,
            &seeded.owner,
        ),
    ))
}

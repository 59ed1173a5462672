//! Building, signing, sending and confirming transactions.
//!
//! [`submit_and_confirm`] takes a transaction through the following stages,
//! each at most once and never backwards:
//!
//! 1. fetching latest blockhash (always at `finalized` commitment),
//! 2. assembling the message with the payer as fee payer,
//! 3. signing with matching signers,
//! 4. sending it to the node (with or without preflight) and
//! 5. waiting for a signature notification at requested commitment.
//!
//! Nothing is retried.  Failure at any stage is reported as a distinct
//! [`Error`] variant.

use std::time::Duration;

use solana_client::rpc_config::RpcSendTransactionConfig;
use solana_client::rpc_response::{ProcessedSignatureResult, RpcSignatureResult};
use solana_sdk::hash::Hash;
use solana_sdk::instruction::Instruction;
use solana_sdk::message::Message;
use solana_sdk::pubkey::Pubkey;
use solana_sdk::signature::{Signature, Signer};
use solana_sdk::transaction::Transaction;

use crate::rpc::{Rpc, SignatureSubscriber, Subscription};
use crate::{ConfirmationLevel, Error, Result};


/// Default bound on how long [`submit_and_confirm`] waits for confirmation.
pub const DEFAULT_CONFIRM_TIMEOUT: Duration = Duration::from_secs(60);

/// Options of a [`submit_and_confirm`] call.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SubmitOptions {
    /// Whether to ask the node to skip transaction simulation.
    pub skip_preflight: bool,
    /// Commitment the node simulates the transaction at.
    pub preflight: ConfirmationLevel,
    /// Commitment to wait for after the transaction is sent.
    pub confirm: ConfirmationLevel,
    /// How long to wait for confirmation.  `None` waits indefinitely.
    pub timeout: Option<Duration>,
}

impl Default for SubmitOptions {
    fn default() -> Self {
        Self {
            skip_preflight: false,
            preflight: ConfirmationLevel::Confirmed,
            confirm: ConfirmationLevel::Confirmed,
            timeout: Some(DEFAULT_CONFIRM_TIMEOUT),
        }
    }
}


/// Builds a transaction from given instructions, signs it, sends it and waits
/// for it to be confirmed.
///
/// `payer` pays transaction fees and must be among `signers`.  For each
/// account the transaction needs signature of, the first signer with matching
/// public key is used.
///
/// Returns signature of the transaction once a notification at
/// `options.confirm` commitment reports successful execution.  If the
/// transaction has been sent, the signature is also part of any confirmation
/// error.
pub async fn submit_and_confirm<R, S>(
    rpc: &R,
    pubsub: &S,
    instructions: &[Instruction],
    signers: &[&dyn Signer],
    payer: &Pubkey,
    options: &SubmitOptions,
) -> Result<Signature>
where
    R: Rpc + ?Sized,
    S: SignatureSubscriber + ?Sized,
{
    let blockhash = rpc
        .get_latest_blockhash(ConfirmationLevel::Finalized.into())
        .await
        .map_err(Error::AnchorFetch)?;
    tracing::debug!(%blockhash, "latest blockhash");

    let tx = build(instructions, payer, blockhash)?;
    let tx = sign(tx, signers)?;

    let config = RpcSendTransactionConfig {
        skip_preflight: options.skip_preflight,
        preflight_commitment: Some(options.preflight.into()),
        ..Default::default()
    };
    let signature = rpc
        .send_transaction(&tx, config)
        .await
        .map_err(Error::SubmissionRejected)?;
    tracing::debug!(%signature, "transaction sent");

    confirm(pubsub, signature, options.confirm, options.timeout).await?;
    tracing::info!(%signature, commitment = %options.confirm, "transaction confirmed");
    Ok(signature)
}


/// Assembles an unsigned transaction.
fn build(
    instructions: &[Instruction],
    payer: &Pubkey,
    blockhash: Hash,
) -> Result<Transaction> {
    if instructions.is_empty() {
        return Err(Error::Assembly("no instructions"));
    }
    let message =
        Message::new_with_blockhash(instructions, Some(payer), &blockhash);
    Ok(Transaction::new_unsigned(message))
}

/// Signs the transaction with all required signers.
///
/// Fails without signing anything if any required signer is missing.
fn sign(mut tx: Transaction, signers: &[&dyn Signer]) -> Result<Transaction> {
    let required = usize::from(tx.message.header.num_required_signatures);
    let keys = &tx.message.account_keys[..required];
    let signers = keys
        .iter()
        .map(|key| {
            signers
                .iter()
                .find(|signer| signer.pubkey() == *key)
                .ok_or(Error::MissingSigner(*key))
        })
        .collect::<Result<Vec<_>>>()?;

    let data = tx.message_data();
    for (slot, signer) in tx.signatures.iter_mut().zip(signers) {
        *slot = signer.try_sign_message(&data).map_err(Error::Signing)?;
    }
    Ok(tx)
}

/// Waits for a notification about transaction with given signature.
///
/// The subscription is released whatever the outcome.
async fn confirm<S: SignatureSubscriber + ?Sized>(
    pubsub: &S,
    signature: Signature,
    level: ConfirmationLevel,
    timeout: Option<Duration>,
) -> Result {
    let mut subscription = pubsub
        .signature_subscribe(&signature, level.into())
        .await
        .map_err(|err| Error::ConfirmationChannel {
            signature,
            reason: err.to_string(),
        })?;

    let wait = wait_for_status(&mut subscription, signature);
    let result = match timeout {
        None => wait.await,
        Some(timeout) => tokio::time::timeout(timeout, wait)
            .await
            .unwrap_or(Err(Error::ConfirmationTimeout { signature, timeout })),
    };
    subscription.unsubscribe().await;
    result
}

async fn wait_for_status(
    subscription: &mut Subscription<'_>,
    signature: Signature,
) -> Result {
    loop {
        match subscription.next().await {
            Some(RpcSignatureResult::ProcessedSignature(
                ProcessedSignatureResult { err: None },
            )) => return Ok(()),
            Some(RpcSignatureResult::ProcessedSignature(
                ProcessedSignatureResult { err: Some(error) },
            )) => return Err(Error::OnChainExecution { signature, error }),
            Some(RpcSignatureResult::ReceivedSignature(_)) => {
                tracing::debug!(%signature, "transaction received")
            }
            None => {
                return Err(Error::ConfirmationChannel {
                    signature,
                    reason: "subscription closed before notification".into(),
                })
            }
        }
    }
}

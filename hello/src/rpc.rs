//! Interfaces to the Solana node.
//!
//! The client talks to a node over two independent connections: JSON-RPC
//! requests go through [`Rpc`] and transaction status notifications arrive
//! through [`SignatureSubscriber`].  Both traits are implemented for the
//! non-blocking clients from `solana_client` and can be replaced in tests.

use async_trait::async_trait;
use futures::future::BoxFuture;
use futures::stream::{BoxStream, StreamExt};
#[cfg(test)]
use mockall::automock;
use solana_client::client_error::ClientError;
use solana_client::nonblocking::pubsub_client::{PubsubClient, PubsubClientError};
use solana_client::nonblocking::rpc_client::RpcClient;
use solana_client::rpc_config::{
    RpcSendTransactionConfig, RpcSignatureSubscribeConfig,
};
use solana_client::rpc_response::RpcSignatureResult;
use solana_sdk::account::Account;
use solana_sdk::commitment_config::CommitmentConfig;
use solana_sdk::hash::Hash;
use solana_sdk::pubkey::Pubkey;
use solana_sdk::signature::Signature;
use solana_sdk::transaction::Transaction;
use solana_transaction_status::option_serializer::OptionSerializer;
use solana_transaction_status::UiTransactionEncoding;


/// Request/response operations used by the client.
#[cfg_attr(test, automock)]
#[async_trait]
pub trait Rpc: Send + Sync {
    /// Returns version of the node; used to check connectivity.
    async fn get_version(&self) -> Result<String, ClientError>;

    /// Fetches an account.  Returns `None` if the account doesn’t exist.
    async fn get_account(
        &self,
        address: &Pubkey,
        commitment: CommitmentConfig,
    ) -> Result<Option<Account>, ClientError>;

    async fn get_balance(&self, address: &Pubkey) -> Result<u64, ClientError>;

    /// Returns minimum balance an account of given size needs to be rent
    /// exempt.
    async fn get_minimum_balance_for_rent_exemption(
        &self,
        size: usize,
    ) -> Result<u64, ClientError>;

    async fn get_latest_blockhash(
        &self,
        commitment: CommitmentConfig,
    ) -> Result<Hash, ClientError>;

    /// Sends a signed transaction; returns its signature.
    async fn send_transaction(
        &self,
        transaction: &Transaction,
        config: RpcSendTransactionConfig,
    ) -> Result<Signature, ClientError>;

    /// Returns log messages of a confirmed transaction or `None` if the node
    /// didn’t record any.
    async fn get_log_messages(
        &self,
        signature: &Signature,
    ) -> Result<Option<Vec<String>>, ClientError>;
}

#[async_trait]
impl Rpc for RpcClient {
    async fn get_version(&self) -> Result<String, ClientError> {
        RpcClient::get_version(self).await.map(|version| version.solana_core)
    }

    async fn get_account(
        &self,
        address: &Pubkey,
        commitment: CommitmentConfig,
    ) -> Result<Option<Account>, ClientError> {
        self.get_account_with_commitment(address, commitment)
            .await
            .map(|response| response.value)
    }

    async fn get_balance(&self, address: &Pubkey) -> Result<u64, ClientError> {
        RpcClient::get_balance(self, address).await
    }

    async fn get_minimum_balance_for_rent_exemption(
        &self,
        size: usize,
    ) -> Result<u64, ClientError> {
        RpcClient::get_minimum_balance_for_rent_exemption(self, size).await
    }

    async fn get_latest_blockhash(
        &self,
        commitment: CommitmentConfig,
    ) -> Result<Hash, ClientError> {
        self.get_latest_blockhash_with_commitment(commitment)
            .await
            .map(|(blockhash, _last_valid_height)| blockhash)
    }

    async fn send_transaction(
        &self,
        transaction: &Transaction,
        config: RpcSendTransactionConfig,
    ) -> Result<Signature, ClientError> {
        self.send_transaction_with_config(transaction, config).await
    }

    async fn get_log_messages(
        &self,
        signature: &Signature,
    ) -> Result<Option<Vec<String>>, ClientError> {
        let encoding = UiTransactionEncoding::Binary;
        let resp = self.get_transaction(signature, encoding).await?;
        let messages = resp.transaction.meta.map(|meta| meta.log_messages);
        Ok(match messages {
            Some(OptionSerializer::Some(messages)) => Some(messages),
            _ => None,
        })
    }
}


#[async_trait]
impl<T: Rpc + ?Sized> Rpc for std::sync::Arc<T> {
    async fn get_version(&self) -> Result<String, ClientError> {
        (**self).get_version().await
    }

    async fn get_account(
        &self,
        address: &Pubkey,
        commitment: CommitmentConfig,
    ) -> Result<Option<Account>, ClientError> {
        (**self).get_account(address, commitment).await
    }

    async fn get_balance(&self, address: &Pubkey) -> Result<u64, ClientError> {
        (**self).get_balance(address).await
    }

    async fn get_minimum_balance_for_rent_exemption(
        &self,
        size: usize,
    ) -> Result<u64, ClientError> {
        (**self).get_minimum_balance_for_rent_exemption(size).await
    }

    async fn get_latest_blockhash(
        &self,
        commitment: CommitmentConfig,
    ) -> Result<Hash, ClientError> {
        (**self).get_latest_blockhash(commitment).await
    }

    async fn send_transaction(
        &self,
        transaction: &Transaction,
        config: RpcSendTransactionConfig,
    ) -> Result<Signature, ClientError> {
        (**self).send_transaction(transaction, config).await
    }

    async fn get_log_messages(
        &self,
        signature: &Signature,
    ) -> Result<Option<Vec<String>>, ClientError> {
        (**self).get_log_messages(signature).await
    }
}


/// Function which cancels a subscription.
pub type Unsubscribe = Box<dyn FnOnce() -> BoxFuture<'static, ()> + Send>;

/// Push subscriptions used by the client.
#[async_trait]
pub trait SignatureSubscriber: Send + Sync {
    /// Subscribes to status notifications of a transaction with given
    /// signature reaching given commitment.
    async fn signature_subscribe<'a>(
        &'a self,
        signature: &Signature,
        commitment: CommitmentConfig,
    ) -> Result<Subscription<'a>, PubsubClientError>;
}

#[async_trait]
impl SignatureSubscriber for PubsubClient {
    async fn signature_subscribe<'a>(
        &'a self,
        signature: &Signature,
        commitment: CommitmentConfig,
    ) -> Result<Subscription<'a>, PubsubClientError> {
        let config = RpcSignatureSubscribeConfig {
            commitment: Some(commitment),
            enable_received_notification: Some(false),
        };
        let (stream, unsubscribe) =
            PubsubClient::signature_subscribe(self, signature, Some(config))
                .await?;
        Ok(Subscription::new(
            stream.map(|response| response.value).boxed(),
            unsubscribe,
        ))
    }
}


#[async_trait]
impl<T: SignatureSubscriber + ?Sized> SignatureSubscriber for std::sync::Arc<T> {
    async fn signature_subscribe<'a>(
        &'a self,
        signature: &Signature,
        commitment: CommitmentConfig,
    ) -> Result<Subscription<'a>, PubsubClientError> {
        (**self).signature_subscribe(signature, commitment).await
    }
}


/// An open signature subscription.
///
/// The subscription must be released with [`Subscription::unsubscribe`].  If
/// it’s dropped without that (e.g. because the future waiting on it was
/// cancelled), the unsubscribe request is spawned on the current tokio
/// runtime.  Either way, the unsubscribe function is called exactly once.
pub struct Subscription<'a> {
    stream: BoxStream<'a, RpcSignatureResult>,
    unsubscribe: Option<Unsubscribe>,
}

impl<'a> Subscription<'a> {
    pub fn new(
        stream: BoxStream<'a, RpcSignatureResult>,
        unsubscribe: Unsubscribe,
    ) -> Self {
        Self { stream, unsubscribe: Some(unsubscribe) }
    }

    /// Waits for the next notification.  Returns `None` once the subscription
    /// is closed.
    pub async fn next(&mut self) -> Option<RpcSignatureResult> {
        self.stream.next().await
    }

    /// Releases the subscription.
    pub async fn unsubscribe(mut self) {
        if let Some(unsubscribe) = self.unsubscribe.take() {
            unsubscribe().await
        }
    }
}

impl Drop for Subscription<'_> {
    fn drop(&mut self) {
        let Some(unsubscribe) = self.unsubscribe.take() else { return };
        let fut = unsubscribe();
        match tokio::runtime::Handle::try_current() {
            Ok(handle) => {
                handle.spawn(fut);
            }
            Err(_) => {
                tracing::warn!("no runtime to release dropped subscription on")
            }
        }
    }
}

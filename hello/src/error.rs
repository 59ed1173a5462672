use std::time::Duration;

use solana_client::client_error::ClientError;
use solana_client::nonblocking::pubsub_client::PubsubClientError;
use solana_sdk::pubkey::{Pubkey, PubkeyError};
use solana_sdk::signature::Signature;
use solana_sdk::signer::SignerError;
use solana_sdk::transaction::TransactionError;

use crate::state::MalformedPayload;


pub type Result<T = (), E = Error> = core::result::Result<T, E>;


/// Errors returned by the client.
///
/// Nothing is retried.  Each error describes the step which failed; use
/// [`Error::kind`] to get a stable name of the error kind.
#[derive(Debug, derive_more::Display, derive_more::From)]
pub enum Error {
    /// Cannot reach the RPC or the websocket endpoint.
    #[display("cannot connect to {endpoint}: {source}")]
    #[from(ignore)]
    Connectivity { endpoint: String, source: ConnectError },

    #[display("program {_0} does not exist")]
    #[from(ignore)]
    ProgramNotFound(Pubkey),

    #[display("program {_0} is not executable")]
    #[from(ignore)]
    ProgramNotExecutable(Pubkey),

    /// Seed is longer than [`solana_sdk::pubkey::MAX_SEED_LEN`].
    #[display("invalid seed: {_0}")]
    #[from(ignore)]
    InvalidSeed(PubkeyError),

    #[display("invalid input: {_0}")]
    #[from(ignore)]
    InvalidInput(String),

    /// Querying the cluster failed for a reason other than the account not
    /// existing.
    #[display("remote query failed: {_0}")]
    #[from(ignore)]
    RemoteQuery(ClientError),

    #[display(
        "payer {payer} has {available} lamports but {required} are needed"
    )]
    #[from(ignore)]
    InsufficientFunds { payer: Pubkey, required: u64, available: u64 },

    #[display("cannot fetch latest blockhash: {_0}")]
    #[from(ignore)]
    AnchorFetch(ClientError),

    #[display("cannot assemble transaction: {_0}")]
    #[from(ignore)]
    Assembly(&'static str),

    /// No signer given for an account the transaction must be signed by.
    #[display("missing signer for {_0}")]
    #[from(ignore)]
    MissingSigner(Pubkey),

    #[display("signing failed: {_0}")]
    #[from(ignore)]
    Signing(SignerError),

    /// The node refused the transaction (e.g. preflight failed or blockhash
    /// expired).
    #[display("transaction rejected: {_0}")]
    #[from(ignore)]
    SubmissionRejected(ClientError),

    /// The transaction was included in a block but its execution failed.
    #[display("transaction {signature} failed: {error}")]
    #[from(ignore)]
    OnChainExecution { signature: Signature, error: TransactionError },

    /// The signature subscription failed or closed before reporting the
    /// transaction status.
    #[display("confirmation of {signature} failed: {reason}")]
    #[from(ignore)]
    ConfirmationChannel { signature: Signature, reason: String },

    #[display("transaction {signature} not confirmed within {timeout:?}")]
    #[from(ignore)]
    ConfirmationTimeout { signature: Signature, timeout: Duration },

    MalformedPayload(MalformedPayload),

    #[display("account {_0} does not exist")]
    #[from(ignore)]
    AccountNotFound(Pubkey),

    #[display("account {address} is owned by {owner}")]
    #[from(ignore)]
    UnexpectedOwner { address: Pubkey, owner: Pubkey },

    #[display("no log messages for transaction {_0}")]
    #[from(ignore)]
    MissingLogs(Signature),
}

/// Reason the client couldn’t connect to one of the endpoints.
#[derive(Debug, derive_more::Display, derive_more::From)]
pub enum ConnectError {
    Rpc(ClientError),
    Pubsub(PubsubClientError),
}

impl Error {
    /// Returns name of the error kind, e.g. `"AnchorFetchError"`.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Connectivity { .. } => "ConnectivityError",
            Self::ProgramNotFound(_) => "ProgramNotFoundError",
            Self::ProgramNotExecutable(_) => "ProgramNotExecutableError",
            Self::InvalidSeed(_) => "InvalidSeedError",
            Self::InvalidInput(_) => "InvalidInputError",
            Self::RemoteQuery(_) => "RemoteQueryError",
            Self::InsufficientFunds { .. } => "InsufficientFundsError",
            Self::AnchorFetch(_) => "AnchorFetchError",
            Self::Assembly(_) => "AssemblyError",
            Self::MissingSigner(_) => "MissingSignerError",
            Self::Signing(_) => "SigningError",
            Self::SubmissionRejected(_) => "SubmissionRejectedError",
            Self::OnChainExecution { .. } => "OnChainExecutionError",
            Self::ConfirmationChannel { .. } => "ConfirmationChannelError",
            Self::ConfirmationTimeout { .. } => "ConfirmationTimeoutError",
            Self::MalformedPayload(_) => "MalformedPayloadError",
            Self::AccountNotFound(_) => "AccountNotFoundError",
            Self::UnexpectedOwner { .. } => "UnexpectedOwnerError",
            Self::MissingLogs(_) => "MissingLogsError",
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Connectivity { source, .. } => Some(source),
            Self::InvalidSeed(err) => Some(err),
            Self::RemoteQuery(err) |
            Self::AnchorFetch(err) |
            Self::SubmissionRejected(err) => Some(err),
            Self::Signing(err) => Some(err),
            Self::OnChainExecution { error, .. } => Some(error),
            Self::MalformedPayload(err) => Some(err),
            _ => None,
        }
    }
}

impl std::error::Error for ConnectError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Rpc(err) => Some(err),
            Self::Pubsub(err) => Some(err),
        }
    }
}


#[test]
fn test_kind_and_display() {
    let key = Pubkey::new_unique();
    let err = Error::MissingSigner(key);
    assert_eq!("MissingSignerError", err.kind());
    assert_eq!(format!("missing signer for {key}"), err.to_string());

    let err = Error::from(MalformedPayload { expected: 4, got: 2 });
    assert_eq!("MalformedPayloadError", err.kind());
    assert_eq!(
        "malformed greeting account: expected 4 bytes, got 2",
        err.to_string()
    );
    assert!(std::error::Error::source(&err).is_some());

    let err = Error::ConfirmationTimeout {
        signature: Signature::default(),
        timeout: Duration::from_secs(3),
    };
    assert_eq!("ConfirmationTimeoutError", err.kind());
    assert!(err.to_string().ends_with("not confirmed within 3s"));
}

//! Client of the hello program.
//!
//! ```ignore
//! let options = ClientOptions::new(read_keypair_file(path)?);
//! let client = Client::connect(options).await?;
//! client.invoke().await?;
//! let greeting = client.read_state().await?;
//! println!("{} greets {} times", client.address(), greeting.counter);
//! ```

use solana_client::nonblocking::pubsub_client::PubsubClient;
use solana_client::nonblocking::rpc_client::RpcClient;
use solana_sdk::commitment_config::CommitmentConfig;
use solana_sdk::instruction::{AccountMeta, Instruction};
use solana_sdk::pubkey::Pubkey;
use solana_sdk::signature::{Signature, Signer};
use solana_sdk::signer::keypair::Keypair;

use crate::account::ensure_account;
use crate::address::SeededAddress;
use crate::error::ConnectError;
use crate::rpc::{Rpc, SignatureSubscriber};
use crate::state::GreetingAccount;
use crate::transaction::{submit_and_confirm, SubmitOptions};
use crate::{address, ConfirmationLevel, Error, Result};


/// Default address of the RPC endpoint.
pub const DEFAULT_RPC_URL: &str = "http://127.0.0.1:8899";

/// Default address of the websocket endpoint.
pub const DEFAULT_WS_URL: &str = "ws://127.0.0.1:8900";


/// Configuration of the client.
pub struct ClientOptions {
    /// RPC endpoint; [`DEFAULT_RPC_URL`] if not set.
    pub rpc_url: Option<String>,
    /// Websocket endpoint; [`DEFAULT_WS_URL`] if not set.
    pub ws_url: Option<String>,
    /// Account paying for transactions and the base of the data account
    /// address.
    pub payer: Keypair,
    pub program_id: Pubkey,
    pub seed: String,
}

impl ClientOptions {
    /// Returns options for the deployed hello program using local node.
    pub fn new(payer: Keypair) -> Self {
        Self {
            rpc_url: None,
            ws_url: None,
            payer,
            program_id: crate::program_id(),
            seed: crate::SEED.into(),
        }
    }
}


/// Connections to a Solana node.
///
/// The connections are shared by all calls made through a [`Client`].
pub struct Connection<R = RpcClient, S = PubsubClient> {
    pub rpc: R,
    pub pubsub: S,
}

impl Connection {
    /// Connects to the RPC and websocket endpoints.
    ///
    /// The RPC endpoint is queried for its version to check it’s reachable.
    pub async fn open(options: &ClientOptions) -> Result<Self> {
        let rpc_url = options.rpc_url.as_deref().unwrap_or(DEFAULT_RPC_URL);
        let ws_url = options.ws_url.as_deref().unwrap_or(DEFAULT_WS_URL);
        let connectivity = |endpoint: &str, source| Error::Connectivity {
            endpoint: endpoint.into(),
            source,
        };

        let rpc = RpcClient::new_with_commitment(
            rpc_url.into(),
            CommitmentConfig::confirmed(),
        );
        let version = Rpc::get_version(&rpc)
            .await
            .map_err(|err| connectivity(rpc_url, ConnectError::Rpc(err)))?;

        let pubsub = PubsubClient::new(ws_url)
            .await
            .map_err(|err| connectivity(ws_url, ConnectError::Pubsub(err)))?;

        tracing::info!(rpc_url, ws_url, %version, "connected to cluster");
        Ok(Self { rpc, pubsub })
    }
}


/// Client of the hello program bound to payer’s data account.
pub struct Client<R = RpcClient, S = PubsubClient> {
    conn: Connection<R, S>,
    payer: Keypair,
    account: SeededAddress,
}

impl Client {
    /// Connects to the cluster and initialises the client.
    ///
    /// See [`Connection::open`] and [`Client::initialize`].
    pub async fn connect(options: ClientOptions) -> Result<Self> {
        let conn = Connection::open(&options).await?;
        Self::initialize(conn, options.payer, options.program_id, &options.seed)
            .await
    }
}

impl<R: Rpc, S: SignatureSubscriber> Client<R, S> {
    /// Initialises the client.
    ///
    /// Checks that the program is deployed and creates payer’s data account
    /// (derived from payer’s key, `seed` and the program id) if it doesn’t
    /// exist yet.
    pub async fn initialize(
        conn: Connection<R, S>,
        payer: Keypair,
        program_id: Pubkey,
        seed: &str,
    ) -> Result<Self> {
        check_program(&conn.rpc, &program_id).await?;

        let account = address::derive(&payer.pubkey(), seed, &program_id)?;
        let this = Self { conn, payer, account };

        let resolution = ensure_account(
            &this.conn.rpc,
            &this.account,
            &this.payer.pubkey(),
            GreetingAccount::LEN,
        )
        .await?;
        if let Some(instruction) = resolution.into_instruction() {
            tracing::info!(address = %this.account.address, "creating account");
            this.submit(instruction).await?;
        }

        Ok(this)
    }

    /// Address of the data account.
    pub fn address(&self) -> &Pubkey { &self.account.address }

    pub fn program_id(&self) -> &Pubkey { &self.account.owner }

    pub fn payer(&self) -> Pubkey { self.payer.pubkey() }

    /// Calls the program which increments the counter in the data account.
    ///
    /// Returns once the transaction is confirmed.
    pub async fn invoke(&self) -> Result<Signature> {
        let instruction = Instruction {
            program_id: self.account.owner,
            accounts: vec![AccountMeta::new(self.account.address, false)],
            data: Vec::new(),
        };
        self.submit(instruction).await
    }

    /// Fetches and decodes the data account.
    pub async fn read_state(&self) -> Result<GreetingAccount> {
        let address = &self.account.address;
        let account = self
            .conn
            .rpc
            .get_account(address, ConfirmationLevel::Confirmed.into())
            .await
            .map_err(Error::RemoteQuery)?
            .ok_or(Error::AccountNotFound(*address))?;
        if account.owner != self.account.owner {
            return Err(Error::UnexpectedOwner {
                address: *address,
                owner: account.owner,
            });
        }
        Ok(GreetingAccount::decode(&account.data)?)
    }

    /// Returns log messages of a confirmed transaction.
    pub async fn transaction_logs(
        &self,
        signature: &Signature,
    ) -> Result<Vec<String>> {
        self.conn
            .rpc
            .get_log_messages(signature)
            .await
            .map_err(Error::RemoteQuery)?
            .ok_or(Error::MissingLogs(*signature))
    }

    async fn submit(&self, instruction: Instruction) -> Result<Signature> {
        submit_and_confirm(
            &self.conn.rpc,
            &self.conn.pubsub,
            core::slice::from_ref(&instruction),
            &[&self.payer],
            &self.payer.pubkey(),
            &SubmitOptions::default(),
        )
        .await
    }
}

/// Checks that the program account exists and is executable.
async fn check_program<R: Rpc + ?Sized>(rpc: &R, program_id: &Pubkey) -> Result {
    let account = rpc
        .get_account(program_id, ConfirmationLevel::Confirmed.into())
        .await
        .map_err(Error::RemoteQuery)?
        .ok_or(Error::ProgramNotFound(*program_id))?;
    if account.executable {
        Ok(())
    } else {
        Err(Error::ProgramNotExecutable(*program_id))
    }
}

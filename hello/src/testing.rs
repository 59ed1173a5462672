//! Fakes of the Solana node used in tests.

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use futures::stream::{self, StreamExt};
use solana_client::client_error::{ClientError, ClientErrorKind};
use solana_client::nonblocking::pubsub_client::PubsubClientError;
use solana_client::rpc_config::RpcSendTransactionConfig;
use solana_client::rpc_response::{
    ProcessedSignatureResult, ReceivedSignatureResult, RpcSignatureResult,
};
use solana_sdk::account::Account;
use solana_sdk::commitment_config::CommitmentConfig;
use solana_sdk::hash::Hash;
use solana_sdk::instruction::InstructionError;
use solana_sdk::pubkey::Pubkey;
use solana_sdk::signature::Signature;
use solana_sdk::transaction::{Transaction, TransactionError};

use crate::rpc::{Rpc, SignatureSubscriber, Subscription, Unsubscribe};
use crate::state::GreetingAccount;


pub fn processed(err: Option<TransactionError>) -> RpcSignatureResult {
    RpcSignatureResult::ProcessedSignature(ProcessedSignatureResult { err })
}

fn client_error(msg: &str) -> ClientError {
    ClientError::from(ClientErrorKind::Custom(msg.into()))
}

/// Keeps track of subscriptions and how many of them have been released.
#[derive(Default)]
struct Subscriptions {
    subscribed: Mutex<Vec<(Signature, CommitmentConfig)>>,
    unsubscribed: Arc<AtomicUsize>,
}

impl Subscriptions {
    fn open<'a>(
        &self,
        signature: &Signature,
        commitment: CommitmentConfig,
        notifications: Vec<RpcSignatureResult>,
        close: bool,
    ) -> Subscription<'a> {
        self.subscribed.lock().unwrap().push((*signature, commitment));
        let stream = stream::iter(notifications);
        let stream = if close {
            stream.boxed()
        } else {
            stream.chain(stream::pending()).boxed()
        };
        let count = self.unsubscribed.clone();
        let unsubscribe: Unsubscribe = Box::new(move || {
            count.fetch_add(1, Ordering::SeqCst);
            Box::pin(async {})
        });
        Subscription::new(stream, unsubscribe)
    }
}


/// What [`FakeSubscriber`] does when subscribed to.
#[derive(Clone, Debug)]
pub enum Notifications {
    /// Sends given notification.
    Reply(RpcSignatureResult),
    /// Sends a ‘received’ notification and closes the stream.
    ReceivedThenClose,
    /// Closes the stream without sending anything.
    Close,
    /// Never sends anything.
    Never,
    /// Fails to subscribe.
    Refuse,
}

/// Subscriber which replies to every subscription the same way.
pub struct FakeSubscriber {
    notifications: Notifications,
    subs: Subscriptions,
}

impl FakeSubscriber {
    pub fn new(notifications: Notifications) -> Self {
        Self { notifications, subs: Default::default() }
    }

    pub fn subscribed(&self) -> Vec<(Signature, CommitmentConfig)> {
        self.subs.subscribed.lock().unwrap().clone()
    }

    pub fn unsubscribed(&self) -> usize {
        self.subs.unsubscribed.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl SignatureSubscriber for FakeSubscriber {
    async fn signature_subscribe<'a>(
        &'a self,
        signature: &Signature,
        commitment: CommitmentConfig,
    ) -> Result<Subscription<'a>, PubsubClientError> {
        let (notifications, close) = match self.notifications.clone() {
            Notifications::Reply(result) => (vec![result], false),
            Notifications::ReceivedThenClose => {
                let received = RpcSignatureResult::ReceivedSignature(
                    ReceivedSignatureResult::ReceivedSignature,
                );
                (vec![received], true)
            }
            Notifications::Close => (Vec::new(), true),
            Notifications::Never => (Vec::new(), false),
            Notifications::Refuse => {
                return Err(PubsubClientError::UnexpectedMessageError(
                    "subscription refused".into(),
                ))
            }
        };
        Ok(self.subs.open(signature, commitment, notifications, close))
    }
}


/// In-memory ledger running the System program’s `CreateAccountWithSeed` and
/// the hello program.
///
/// Transactions are executed when sent and their outcome is reported to
/// whoever subscribes to their signature.
pub struct FakeLedger {
    pub program_id: Pubkey,
    pub rent: u64,
    inner: Mutex<Inner>,
    subs: Subscriptions,
}

#[derive(Default)]
struct Inner {
    accounts: HashMap<Pubkey, Account>,
    sent: Vec<Transaction>,
    outcomes: HashMap<Signature, Option<TransactionError>>,
    logs: HashMap<Signature, Vec<String>>,
    account_queries: usize,
    offline: bool,
    close_subscriptions: bool,
}

impl FakeLedger {
    /// Creates a ledger with the hello program deployed and payer holding
    /// given balance.
    pub fn new(payer: &Pubkey, balance: u64) -> Self {
        let program_id = Pubkey::new_unique();
        let ledger = Self {
            program_id,
            rent: 946_560,
            inner: Default::default(),
            subs: Default::default(),
        };
        ledger.set_account(program_id, Account {
            lamports: 1,
            data: b"\x7fELF".to_vec(),
            owner: Pubkey::new_unique(),
            executable: true,
            rent_epoch: 0,
        });
        ledger.set_account(*payer, Account {
            lamports: balance,
            ..Account::default()
        });
        ledger
    }

    pub fn set_account(&self, address: Pubkey, account: Account) {
        self.inner.lock().unwrap().accounts.insert(address, account);
    }

    pub fn remove_account(&self, address: &Pubkey) {
        self.inner.lock().unwrap().accounts.remove(address);
    }

    pub fn account(&self, address: &Pubkey) -> Option<Account> {
        self.inner.lock().unwrap().accounts.get(address).cloned()
    }

    pub fn sent(&self) -> Vec<Transaction> {
        self.inner.lock().unwrap().sent.clone()
    }

    pub fn account_queries(&self) -> usize {
        self.inner.lock().unwrap().account_queries
    }

    pub fn set_offline(&self, offline: bool) {
        self.inner.lock().unwrap().offline = offline;
    }

    /// Makes subscriptions close without sending any notification.
    pub fn set_close_subscriptions(&self, close: bool) {
        self.inner.lock().unwrap().close_subscriptions = close;
    }

    pub fn subscribed(&self) -> usize {
        self.subs.subscribed.lock().unwrap().len()
    }

    pub fn unsubscribed(&self) -> usize {
        self.subs.unsubscribed.load(Ordering::SeqCst)
    }

    fn check_online(&self) -> Result<(), ClientError> {
        if self.inner.lock().unwrap().offline {
            Err(client_error("connection refused"))
        } else {
            Ok(())
        }
    }

    /// Executes transaction instructions.  Changes are discarded on error.
    fn execute(
        &self,
        inner: &mut Inner,
        tx: &Transaction,
    ) -> Result<Vec<String>, TransactionError> {
        let mut accounts = inner.accounts.clone();
        let mut logs = Vec::new();
        for (index, ix) in tx.message.instructions.iter().enumerate() {
            let index = index as u8;
            let fail = |err| TransactionError::InstructionError(index, err);
            let program_id = tx.message.account_keys[usize::from(ix.program_id_index)];
            let key = |pos: usize| {
                ix.accounts
                    .get(pos)
                    .map(|idx| tx.message.account_keys[usize::from(*idx)])
                    .ok_or(fail(InstructionError::NotEnoughAccountKeys))
            };
            if program_id == solana_system_interface::program::ID {
                let (payer, address) = (key(0)?, key(1)?);
                if accounts.contains_key(&address) {
                    return Err(fail(InstructionError::AccountAlreadyInitialized));
                }
                let payer = accounts
                    .get_mut(&payer)
                    .filter(|acc| acc.lamports >= self.rent)
                    .ok_or(fail(InstructionError::InsufficientFunds))?;
                payer.lamports -= self.rent;
                accounts.insert(address, Account {
                    lamports: self.rent,
                    data: vec![0; GreetingAccount::LEN],
                    owner: self.program_id,
                    executable: false,
                    rent_epoch: 0,
                });
            } else if program_id == self.program_id {
                let account = accounts
                    .get_mut(&key(0)?)
                    .filter(|acc| acc.owner == self.program_id)
                    .ok_or(fail(InstructionError::IncorrectProgramId))?;
                let mut greeting = GreetingAccount::decode(&account.data)
                    .map_err(|_| fail(InstructionError::InvalidAccountData))?;
                greeting.counter += 1;
                account.data = greeting.encode();
                logs.push(format!(
                    "Program log: Greeted {} time(s)!",
                    greeting.counter
                ));
            } else {
                return Err(fail(InstructionError::UnsupportedProgramId));
            }
        }
        inner.accounts = accounts;
        Ok(logs)
    }
}

#[async_trait]
impl Rpc for FakeLedger {
    async fn get_version(&self) -> Result<String, ClientError> {
        self.check_online()?;
        Ok("2.3.0".into())
    }

    async fn get_account(
        &self,
        address: &Pubkey,
        _commitment: CommitmentConfig,
    ) -> Result<Option<Account>, ClientError> {
        self.check_online()?;
        let mut inner = self.inner.lock().unwrap();
        inner.account_queries += 1;
        Ok(inner.accounts.get(address).cloned())
    }

    async fn get_balance(&self, address: &Pubkey) -> Result<u64, ClientError> {
        self.check_online()?;
        Ok(self.account(address).map_or(0, |acc| acc.lamports))
    }

    async fn get_minimum_balance_for_rent_exemption(
        &self,
        _size: usize,
    ) -> Result<u64, ClientError> {
        self.check_online()?;
        Ok(self.rent)
    }

    async fn get_latest_blockhash(
        &self,
        _commitment: CommitmentConfig,
    ) -> Result<Hash, ClientError> {
        self.check_online()?;
        Ok(Hash::new_unique())
    }

    async fn send_transaction(
        &self,
        tx: &Transaction,
        _config: RpcSendTransactionConfig,
    ) -> Result<Signature, ClientError> {
        self.check_online()?;
        tx.verify().map_err(|err| client_error(&err.to_string()))?;
        let signature = tx.signatures[0];
        let mut inner = self.inner.lock().unwrap();
        inner.sent.push(tx.clone());
        let outcome = match self.execute(&mut inner, tx) {
            Ok(logs) => {
                inner.logs.insert(signature, logs);
                None
            }
            Err(err) => Some(err),
        };
        inner.outcomes.insert(signature, outcome);
        Ok(signature)
    }

    async fn get_log_messages(
        &self,
        signature: &Signature,
    ) -> Result<Option<Vec<String>>, ClientError> {
        self.check_online()?;
        Ok(self.inner.lock().unwrap().logs.get(signature).cloned())
    }
}

#[async_trait]
impl SignatureSubscriber for FakeLedger {
    async fn signature_subscribe<'a>(
        &'a self,
        signature: &Signature,
        commitment: CommitmentConfig,
    ) -> Result<Subscription<'a>, PubsubClientError> {
        let (outcome, close) = {
            let inner = self.inner.lock().unwrap();
            (inner.outcomes.get(signature).cloned(), inner.close_subscriptions)
        };
        let notifications = match (outcome, close) {
            (Some(err), false) => vec![processed(err)],
            _ => Vec::new(),
        };
        Ok(self.subs.open(signature, commitment, notifications, true))
    }
}

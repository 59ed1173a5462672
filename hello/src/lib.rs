// aneka-hello — client library for the Aneka hello Solana program
// © 2025 by Michał Nazarewicz <mina86@mina86.com>
//
// This program is free software; you can redistribute it and/or modify it under
// the terms of the GNU General Public License as published by the Free Software
// Foundation; either version 2 of the License, or (at your option) any later
// version.
//
// This program is distributed in the hope that it will be useful, but WITHOUT
// ANY WARRANTY; without even the implied warranty of MERCHANTABILITY or FITNESS
// FOR A PARTICULAR PURPOSE.  See the GNU General Public License for more
// details.
//
// You should have received a copy of the GNU General Public License along with
// this program; if not, see <https://www.gnu.org/licenses/>.

//! Client library for the Aneka hello Solana program.
//!
//! The hello program keeps a per-user counter in a data account whose address
//! is derived from the user’s key, a seed and the program id (see
//! [`Pubkey::create_with_seed`]).  Every call to the program increments the
//! counter.
//!
//! The account payload is a borsh-serialised [`state::GreetingAccount`] which
//! is always available so that the on-chain program shares the codec with the
//! clients.  With the `client` feature, the crate also provides:
//!
//! * [`address`]: deriving the data account address,
//! * [`account`]: checking whether the data account exists and building the
//!   instruction which creates and funds it if it doesn’t,
//! * [`transaction`]: building, signing, sending and confirming transactions
//!   over the RPC and websocket endpoints of a Solana node and
//! * [`client`]: the [`Client`] which puts all of the above together.
//!
//! [`Pubkey::create_with_seed`]: https://docs.rs/solana-pubkey/latest/solana_pubkey/struct.Pubkey.html#method.create_with_seed
//!
//! # Features
#![doc = document_features::document_features!()]

pub mod state;

#[cfg(feature = "client")]
pub mod account;
#[cfg(feature = "client")]
pub mod address;
#[cfg(feature = "client")]
pub mod client;
#[cfg(feature = "client")]
mod commitment;
#[cfg(feature = "client")]
mod error;
#[cfg(feature = "client")]
pub mod rpc;
#[cfg(feature = "client")]
pub mod transaction;

#[cfg(all(test, feature = "client"))]
mod testing;

#[cfg(feature = "client")]
pub use client::{Client, ClientOptions, Connection};
#[cfg(feature = "client")]
pub use commitment::ConfirmationLevel;
#[cfg(feature = "client")]
pub use error::{Error, Result};

/// Seed used to derive the data account address of the payer.
pub const SEED: &str = "hello";

/// Address the hello program is deployed at.
///
/// Base58 encoding of the key is `J3aRWdbSPs7BLKkmyXMo8LEdhbKLkXZDLjbVUQUuA9Lr`.
/// Use [`program_id`] to get it as a key.
pub const PROGRAM_ID: &str = "J3aRWdbSPs7BLKkmyXMo8LEdhbKLkXZDLjbVUQUuA9Lr";

/// Returns [`PROGRAM_ID`] as a public key.
#[cfg(feature = "client")]
pub fn program_id() -> solana_sdk::pubkey::Pubkey {
    solana_sdk::pubkey!("J3aRWdbSPs7BLKkmyXMo8LEdhbKLkXZDLjbVUQUuA9Lr")
}

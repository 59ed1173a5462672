//! Layout of the data account owned by the hello program.
//!
//! The account holds a single borsh-serialised [`GreetingAccount`].  There is
//! no header, no version and no trailing space: the account is exactly
//! [`GreetingAccount::LEN`] bytes and anything else is rejected.

use borsh::{BorshDeserialize, BorshSerialize};


/// Payload of the data account.
#[derive(
    Clone,
    Copy,
    Debug,
    Default,
    PartialEq,
    Eq,
    Hash,
    BorshSerialize,
    BorshDeserialize,
)]
pub struct GreetingAccount {
    /// Number of times the account has been greeted.
    pub counter: u32,
}

/// Error returned when account data doesn’t match [`GreetingAccount`] layout.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct MalformedPayload {
    /// Length the payload must have.
    pub expected: usize,
    /// Length of the rejected payload.
    pub got: usize,
}

impl core::fmt::Display for MalformedPayload {
    fn fmt(&self, fmtr: &mut core::fmt::Formatter) -> core::fmt::Result {
        write!(
            fmtr,
            "malformed greeting account: expected {} bytes, got {}",
            self.expected, self.got
        )
    }
}

impl std::error::Error for MalformedPayload {}

impl GreetingAccount {
    /// Size of the serialised account in bytes.
    ///
    /// This is also the size the data account is created with.
    pub const LEN: usize = core::mem::size_of::<u32>();

    /// Serialises the account.
    pub fn encode(&self) -> Vec<u8> { self.counter.to_le_bytes().to_vec() }

    /// Serialises the account into a buffer which must be exactly
    /// [`Self::LEN`] bytes long.
    pub fn encode_into(&self, buf: &mut [u8]) -> Result<(), MalformedPayload> {
        let got = buf.len();
        let mut dst = check_len(buf)?;
        self.serialize(&mut dst)
            .map_err(|_| MalformedPayload { expected: Self::LEN, got })
    }

    /// Deserialises the account.
    ///
    /// Fails if the data isn’t exactly [`Self::LEN`] bytes long.
    pub fn decode(data: &[u8]) -> Result<Self, MalformedPayload> {
        let got = data.len();
        borsh::from_slice(check_len(data)?)
            .map_err(|_| MalformedPayload { expected: Self::LEN, got })
    }
}

fn check_len<T: AsRef<[u8]>>(data: T) -> Result<T, MalformedPayload> {
    let got = data.as_ref().len();
    if got == GreetingAccount::LEN {
        Ok(data)
    } else {
        Err(MalformedPayload { expected: GreetingAccount::LEN, got })
    }
}

//! The hello program.  Increments the counter stored in the account it’s
//! called with.

use aneka_hello::state::GreetingAccount;
use solana_program::account_info::AccountInfo;
use solana_program::program_error::ProgramError;
use solana_program::pubkey::Pubkey;

#[cfg(not(feature = "no-entrypoint"))]
solana_program::entrypoint!(process_instruction);

/// Increments counter in the first account.
///
/// The account must be writable, owned by the program and hold a serialised
/// [`GreetingAccount`].  Instruction data is ignored.
pub fn process_instruction(
    program_id: &Pubkey,
    accounts: &[AccountInfo],
    _instruction: &[u8],
) -> Result<(), ProgramError> {
    let account = accounts.first().ok_or(ProgramError::NotEnoughAccountKeys)?;
    if account.owner != program_id {
        solana_program::msg!("Greeted account has the wrong program id");
        return Err(ProgramError::IncorrectProgramId);
    }
    if !account.is_writable {
        return Err(ProgramError::InvalidAccountData);
    }

    let mut data = account.try_borrow_mut_data()?;
    let mut greeting = GreetingAccount::decode(&data)
        .map_err(|_| ProgramError::InvalidAccountData)?;
    greeting.counter = greeting
        .counter
        .checked_add(1)
        .ok_or(ProgramError::ArithmeticOverflow)?;
    greeting
        .encode_into(&mut data)
        .map_err(|_| ProgramError::InvalidAccountData)?;

    solana_program::msg!("Greeted {} time(s)!", greeting.counter);
    Ok(())
}

use anchor_lang::prelude::*;
use switchboard_on_demand::accounts::RandomnessAccountData;

use crate::constants::*;
use crate::error::ErrorCode;
use crate::events::*;
use crate::state::*;

/// Accounts required to set a round's winning number.
///
/// This ensures that:
/// 1. Only the operator can resolve a round.
/// 2. The randomness account provided matches the one committed for the round.
/// 3. The round is closed.
/// 4. A winning number hasn't already been set.
#[derive(Accounts)]
#[instruction(round_id: u64)]
pub struct SetWinningNumber<'info> {
    #[account(mut)]
    pub operator: Signer<'info>,

    #[account(
        seeds = [LOTTERY_SEED],
        bump = lottery.bump
    )]
    pub lottery: Box<Account<'info, Lottery>>,

    #[account(
        mut,
        seeds = [ROUND_SEED, round_id.to_le_bytes().as_ref()],
        bump = round.bump
    )]
    pub round: Box<Account<'info, Round>>,

    /// The randomness oracle account providing verifiable randomness.
    /// CHECK: The account's data is validated manually within the handler.
    pub randomness_account_data: UncheckedAccount<'info>,
}

pub fn process_set_winning_number(ctx: Context<SetWinningNumber>, round_id: u64) -> Result<()> {
    let clock = Clock::get()?;
    ctx.accounts
        .lottery
        .require_operator(ctx.accounts.operator.key())?;

    let randomness_account = ctx.accounts.randomness_account_data.key();
    let round = &mut ctx.accounts.round;
    round.require_committed(randomness_account)?;

    let randomness_data =
        RandomnessAccountData::parse(ctx.accounts.randomness_account_data.data.borrow())
            .map_err(|_| ErrorCode::InvalidRandomnessAccount)?;
    let revealed_random_value = randomness_data
        .get_value(&clock)
        .map_err(|_| ErrorCode::RandomnessNotResolved)?;

    let (winning_number, winner) = round.draw(randomness_account, &revealed_random_value)?;

    msg!("Round {} winning number: {}", round_id, winning_number);
    emit!(WinningNumberSet {
        round_id,
        winning_number,
        winner,
    });

    Ok(())
}

use anchor_lang::prelude::*;
use switchboard_on_demand::accounts::RandomnessAccountData;

use crate::constants::*;
use crate::error::ErrorCode;
use crate::events::*;
use crate::state::*;

/// Accounts required to commit a randomness account for a round's draw.
///
/// Ensures:
/// 1. Only the operator can commit the randomness.
/// 2. The round is closed, has entries, no winning number and no earlier
///    commitment.
/// 3. The randomness account was seeded in the previous slot and has not
///    been revealed.
#[derive(Accounts)]
#[instruction(round_id: u64)]
pub struct CommitRandomness<'info> {
    /// The account paying transaction fees.
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

    /// Randomness account from Switchboard.
    /// CHECK: The account's data is validated manually within the handler.
    pub randomness_account_data: UncheckedAccount<'info>,
}

pub fn process_commit_randomness(ctx: Context<CommitRandomness>, round_id: u64) -> Result<()> {
    let clock = Clock::get()?;
    ctx.accounts
        .lottery
        .require_operator(ctx.accounts.operator.key())?;
    ctx.accounts.round.require_drawable()?;

    let randomness_data =
        RandomnessAccountData::parse(ctx.accounts.randomness_account_data.data.borrow())
            .map_err(|_| ErrorCode::InvalidRandomnessAccount)?;
    require_unrevealed(randomness_data.seed_slot, clock.slot)?;

    let randomness_account = ctx.accounts.randomness_account_data.key();
    ctx.accounts.round.commit_randomness(randomness_account)?;

    msg!("Round {} committed to {}", round_id, randomness_account);
    emit!(RandomnessCommitted {
        round_id,
        randomness_account,
    });

    Ok(())
}

/// Only randomness requested in the previous slot can still be unknown to
/// the operator.
fn require_unrevealed(seed_slot: u64, current_slot: u64) -> Result<()> {
    require_eq!(
        seed_slot,
        current_slot.saturating_sub(1),
        ErrorCode::RandomnessAlreadyRevealed
    );
    Ok(())
}

use anchor_lang::prelude::*;

use crate::constants::*;
use crate::error::ErrorCode;
use crate::state::*;

/// Accounts required to read a round.
#[derive(Accounts)]
#[instruction(round_id: u64)]
pub struct ReadRound<'info> {
    #[account(
        seeds = [LOTTERY_SEED],
        bump = lottery.bump
    )]
    pub lottery: Box<Account<'info, Lottery>>,

    /// CHECK: Still unallocated for a current round nobody entered yet;
    /// deserialized in the handler otherwise.
    #[account(
        seeds = [ROUND_SEED, round_id.to_le_bytes().as_ref()],
        bump
    )]
    pub round: UncheckedAccount<'info>,
}

/// Returns `(ticket_count, is_closed, winning_number)` for `round_id`.
pub fn process_rounds(ctx: Context<ReadRound>, round_id: u64) -> Result<RoundSummary> {
    let info = ctx.accounts.round.to_account_info();
    if info.data_is_empty() {
        return ctx.accounts.lottery.summarize(round_id, None);
    }
    require_keys_eq!(*info.owner, crate::ID, ErrorCode::UnknownRound);

    let data = info.try_borrow_data()?;
    let round = Round::try_deserialize(&mut &data[..])?;
    ctx.accounts.lottery.summarize(round_id, Some(&round))
}

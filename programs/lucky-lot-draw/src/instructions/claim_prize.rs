use anchor_lang::prelude::*;
use anchor_spl::{
    associated_token::AssociatedToken,
    token_interface::{Mint, TokenAccount, TokenInterface},
};

use super::pay_out;
use crate::constants::*;
use crate::error::ErrorCode;
use crate::events::*;
use crate::state::*;

/// Accounts required for claiming a round's prize.
///
/// Ensures:
/// 1. The round has a winning number.
/// 2. Only the holder of the winning ticket can claim.
/// 3. The round was neither refunded nor claimed, and some of its funds
///    are still in custody.
#[derive(Accounts)]
#[instruction(round_id: u64)]
pub struct ClaimPrize<'info> {
    /// The holder of the winning ticket.
    #[account(mut)]
    pub winner: Signer<'info>,

    #[account(
        mut,
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

    #[account(address = lottery.payment_mint @ ErrorCode::WrongPaymentMint)]
    pub payment_mint: Box<InterfaceAccount<'info, Mint>>,

    #[account(
        mut,
        associated_token::mint = payment_mint,
        associated_token::authority = lottery,
        associated_token::token_program = token_program,
    )]
    pub vault: Box<InterfaceAccount<'info, TokenAccount>>,

    /// The token account of the winner that will receive the prize.
    #[account(
        init_if_needed,
        payer = winner,
        associated_token::mint = payment_mint,
        associated_token::authority = winner,
        associated_token::token_program = token_program,
    )]
    pub winner_token_account: Box<InterfaceAccount<'info, TokenAccount>>,

    pub token_program: Interface<'info, TokenInterface>,

    pub associated_token_program: Program<'info, AssociatedToken>,

    pub system_program: Program<'info, System>,
}

/// Pays the round's pot to the holder of the winning ticket. Payments
/// swept by an earlier withdrawal are not part of the pot.
pub fn process_claim_prize(mut ctx: Context<ClaimPrize>, round_id: u64) -> Result<()> {
    let winner = ctx.accounts.winner.key();
    let pot = ctx
        .accounts
        .round
        .prize(winner, ctx.accounts.lottery.sweep_epoch)?;

    pay_out(
        &ctx.accounts.token_program,
        &ctx.accounts.vault,
        &ctx.accounts.payment_mint,
        ctx.accounts.winner_token_account.to_account_info(),
        &ctx.accounts.lottery,
        pot,
    )?;

    let accounts = &mut ctx.accounts;
    accounts.lottery.settle_prize(&mut accounts.round, pot)?;

    msg!("Round {} prize of {} claimed by {}", round_id, pot, winner);
    emit!(PrizeClaimed {
        round_id,
        winner,
        amount: pot,
    });

    Ok(())
}

use anchor_lang::prelude::*;
use anchor_spl::token_interface::{Mint, TokenAccount, TokenInterface};

use super::pay_out;
use crate::constants::*;
use crate::error::ErrorCode;
use crate::events::*;
use crate::state::*;

/// Accounts required to refund a round, one batch of entries at a time.
///
/// The participants' payment token accounts follow as remaining accounts,
/// one per entry of the batch, in purchase order starting at the round's
/// refund cursor. A participant with several entries appears once per entry.
#[derive(Accounts)]
#[instruction(round_id: u64)]
pub struct RefundAll<'info> {
    #[account(mut)]
    pub operator: Signer<'info>,

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

    pub token_program: Interface<'info, TokenInterface>,
}

/// Pays the next batch of entries back to their participants.
///
/// Steps:
/// 1. Take the next `remaining_accounts.len()` unrefunded entries; fails if
///    the round is empty, settled, or fewer entries are left.
/// 2. Check each remaining account belongs to its entry's participant.
/// 3. Transfer the refunds out of the vault. Entries swept by a withdrawal
///    are owed nothing.
/// 4. Advance the refund cursor; the last batch settles the round. An open
///    round is closed by the first batch.
pub fn process_refund_all<'info>(
    mut ctx: Context<'_, '_, 'info, 'info, RefundAll<'info>>,
    round_id: u64,
) -> Result<()> {
    ctx.accounts
        .lottery
        .require_operator(ctx.accounts.operator.key())?;

    let batch = ctx
        .accounts
        .round
        .refund_batch(ctx.accounts.lottery.sweep_epoch, ctx.remaining_accounts.len())?;

    let payment_mint = ctx.accounts.lottery.payment_mint;
    let mut total: u64 = 0;
    for ((participant, amount), account) in batch.iter().zip(ctx.remaining_accounts.iter()) {
        let destination = InterfaceAccount::<TokenAccount>::try_from(account)?;
        require_refund_destination(
            destination.owner,
            destination.mint,
            *participant,
            payment_mint,
        )?;
        if *amount == 0 {
            continue;
        }

        pay_out(
            &ctx.accounts.token_program,
            &ctx.accounts.vault,
            &ctx.accounts.payment_mint,
            account.clone(),
            &ctx.accounts.lottery,
            *amount,
        )?;
        total = total.checked_add(*amount).ok_or(ErrorCode::Overflow)?;
    }

    let accounts = &mut ctx.accounts;
    if accounts
        .lottery
        .settle_refund(&mut accounts.round, batch.len(), total)?
    {
        emit!(RoundClosed {
            round_id,
            ticket_count: accounts.round.ticket_count(),
            forced: true,
        });
        emit!(RoundOpened {
            round_id: accounts.lottery.current_round
        });
    }

    let remaining = accounts.round.refunds_left();
    msg!(
        "Round {} refunded {} to {} entries, {} left",
        round_id,
        total,
        batch.len(),
        remaining
    );
    emit!(RoundRefunded {
        round_id,
        entries: batch.len() as u8,
        amount: total,
        remaining,
    });

    Ok(())
}

fn require_refund_destination(
    owner: Pubkey,
    mint: Pubkey,
    participant: Pubkey,
    payment_mint: Pubkey,
) -> Result<()> {
    require!(
        owner == participant && mint == payment_mint,
        ErrorCode::WrongRefundAccount
    );
    Ok(())
}

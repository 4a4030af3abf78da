use anchor_lang::prelude::*;
use anchor_spl::token_interface::{
    transfer_checked, Mint, TokenAccount, TokenInterface, TransferChecked,
};

use crate::constants::*;
use crate::error::ErrorCode;
use crate::events::*;
use crate::state::*;

/// Accounts required to buy a ticket in the current round.
#[derive(Accounts)]
pub struct Enter<'info> {
    /// The account buying and paying for the ticket.
    #[account(mut)]
    pub participant: Signer<'info>,

    #[account(
        mut,
        seeds = [LOTTERY_SEED],
        bump = lottery.bump
    )]
    pub lottery: Box<Account<'info, Lottery>>,

    /// The current round. The first entry after a closure creates it.
    #[account(
        init_if_needed,
        payer = participant,
        space = 8 + Round::INIT_SPACE,
        seeds = [ROUND_SEED, lottery.current_round.to_le_bytes().as_ref()],
        bump
    )]
    pub round: Box<Account<'info, Round>>,

    #[account(address = lottery.payment_mint @ ErrorCode::WrongPaymentMint)]
    pub payment_mint: Box<InterfaceAccount<'info, Mint>>,

    /// Source of the ticket payment.
    #[account(
        mut,
        token::mint = payment_mint,
        token::authority = participant,
        token::token_program = token_program,
    )]
    pub participant_token_account: Box<InterfaceAccount<'info, TokenAccount>>,

    #[account(
        mut,
        associated_token::mint = payment_mint,
        associated_token::authority = lottery,
        associated_token::token_program = token_program,
    )]
    pub vault: Box<InterfaceAccount<'info, TokenAccount>>,

    pub token_program: Interface<'info, TokenInterface>,

    pub system_program: Program<'info, System>,
}

/// Buys `ticket_number` in the current round for the caller.
///
/// Steps performed:
/// 1. Open the round account if this is its first use.
/// 2. Check the round is open and the ticket is free and in range.
/// 3. Pull the ticket price from the participant into the vault.
/// 4. Record the entry; the 100th entry closes the round and advances
///    the current round.
pub fn process_enter(mut ctx: Context<Enter>, ticket_number: u8) -> Result<()> {
    let participant = ctx.accounts.participant.key();
    let price = ctx.accounts.lottery.ticket_price;

    let accounts = &mut ctx.accounts;
    if accounts.lottery.open_current(&mut accounts.round, ctx.bumps.round) {
        emit!(RoundOpened {
            round_id: accounts.round.round_id
        });
    }
    accounts.round.check_entry(ticket_number)?;

    transfer_checked(
        CpiContext::new(
            accounts.token_program.to_account_info(),
            TransferChecked {
                from: accounts.participant_token_account.to_account_info(),
                mint: accounts.payment_mint.to_account_info(),
                to: accounts.vault.to_account_info(),
                authority: accounts.participant.to_account_info(),
            },
        ),
        price,
        accounts.payment_mint.decimals,
    )?;

    let filled = accounts
        .lottery
        .sell_ticket(&mut accounts.round, participant, ticket_number)?;
    let round = &accounts.round;

    msg!("Ticket {} sold in round {}", ticket_number, round.round_id);
    emit!(TicketPurchased {
        round_id: round.round_id,
        participant,
        ticket_number,
        paid_amount: price,
    });

    if filled {
        msg!("Round {} is full", round.round_id);
        emit!(RoundClosed {
            round_id: round.round_id,
            ticket_count: round.ticket_count(),
            forced: false,
        });
        emit!(RoundOpened {
            round_id: accounts.lottery.current_round
        });
    }

    Ok(())
}

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

/// Accounts required to provision the lottery.
/// Creates the config account, the custody vault and round 1.
#[derive(Accounts)]
pub struct InitializeConfig<'info> {
    /// The account paying for account creation; becomes the operator.
    #[account(mut)]
    pub payer: Signer<'info>,

    /// The Lottery state account that stores the engine configuration.
    #[account(
        init,
        payer = payer,
        space = 8 + Lottery::INIT_SPACE,
        seeds = [LOTTERY_SEED],
        bump
    )]
    pub lottery: Box<Account<'info, Lottery>>,

    /// Round 1, open and empty.
    #[account(
        init,
        payer = payer,
        space = 8 + Round::INIT_SPACE,
        seeds = [ROUND_SEED, FIRST_ROUND_ID.to_le_bytes().as_ref()],
        bump
    )]
    pub round: Box<Account<'info, Round>>,

    /// Mint of the token tickets are paid with.
    pub payment_mint: Box<InterfaceAccount<'info, Mint>>,

    /// Custody account holding every ticket payment.
    #[account(
        init,
        payer = payer,
        associated_token::mint = payment_mint,
        associated_token::authority = lottery,
        associated_token::token_program = token_program,
    )]
    pub vault: Box<InterfaceAccount<'info, TokenAccount>>,

    /// Token program interface.
    pub token_program: Interface<'info, TokenInterface>,

    /// Associated token program interface.
    pub associated_token_program: Program<'info, AssociatedToken>,

    /// System program to create accounts.
    pub system_program: Program<'info, System>,
}

/// Accounts required for the operator to close the current round early.
#[derive(Accounts)]
pub struct CloseRound<'info> {
    #[account(mut)]
    pub operator: Signer<'info>,

    #[account(
        mut,
        seeds = [LOTTERY_SEED],
        bump = lottery.bump
    )]
    pub lottery: Box<Account<'info, Lottery>>,

    /// The current round. Created here if nobody entered it yet.
    #[account(
        init_if_needed,
        payer = operator,
        space = 8 + Round::INIT_SPACE,
        seeds = [ROUND_SEED, lottery.current_round.to_le_bytes().as_ref()],
        bump
    )]
    pub round: Box<Account<'info, Round>>,

    pub system_program: Program<'info, System>,
}

/// Accounts required to sweep a lottery-owned token balance to the
/// payout address.
#[derive(Accounts)]
pub struct Withdraw<'info> {
    #[account(mut)]
    pub operator: Signer<'info>,

    #[account(
        mut,
        seeds = [LOTTERY_SEED],
        bump = lottery.bump
    )]
    pub lottery: Box<Account<'info, Lottery>>,

    /// The token to withdraw. Not necessarily the payment token.
    pub mint: Box<InterfaceAccount<'info, Mint>>,

    #[account(
        mut,
        associated_token::mint = mint,
        associated_token::authority = lottery,
        associated_token::token_program = token_program,
    )]
    pub source: Box<InterfaceAccount<'info, TokenAccount>>,

    /// CHECK: Only used as the authority of `destination`; must match the config.
    #[account(address = lottery.payout_address @ ErrorCode::WrongPayoutAddress)]
    pub payout_address: UncheckedAccount<'info>,

    #[account(
        init_if_needed,
        payer = operator,
        associated_token::mint = mint,
        associated_token::authority = payout_address,
        associated_token::token_program = token_program,
    )]
    pub destination: Box<InterfaceAccount<'info, TokenAccount>>,

    pub token_program: Interface<'info, TokenInterface>,

    pub associated_token_program: Program<'info, AssociatedToken>,

    pub system_program: Program<'info, System>,
}

/// Initializes the Lottery account and opens round 1.
///
/// # Arguments
/// * `ctx` - Context holding the InitializeConfig accounts
/// * `ticket_price` - Price of one ticket in base units of the payment mint
/// * `payout_address` - Owner of the account withdrawals are sent to
pub fn process_initialize_config(
    ctx: Context<InitializeConfig>,
    ticket_price: u64,
    payout_address: Pubkey,
) -> Result<()> {
    require!(ticket_price > 0, ErrorCode::InvalidTicketPrice);

    let lottery = &mut ctx.accounts.lottery;
    lottery.bump = ctx.bumps.lottery;
    lottery.authority = ctx.accounts.payer.key();
    lottery.payment_mint = ctx.accounts.payment_mint.key();
    lottery.payout_address = payout_address;
    lottery.ticket_price = ticket_price;
    lottery.current_round = FIRST_ROUND_ID;
    lottery.custody = 0;
    lottery.sweep_epoch = 0;

    ctx.accounts.round.open(FIRST_ROUND_ID, ctx.bumps.round);

    msg!("Lottery initialized, ticket price: {}", ticket_price);
    emit!(RoundOpened {
        round_id: FIRST_ROUND_ID
    });

    Ok(())
}

/// Closes the current round regardless of how many tickets were sold and
/// moves entries to the next round.
pub fn process_close_round(mut ctx: Context<CloseRound>) -> Result<()> {
    let accounts = &mut ctx.accounts;
    accounts
        .lottery
        .require_operator(accounts.operator.key())?;

    if accounts.lottery.open_current(&mut accounts.round, ctx.bumps.round) {
        emit!(RoundOpened {
            round_id: accounts.round.round_id
        });
    }
    let next_round = accounts.lottery.close_current(&mut accounts.round)?;
    let round = &accounts.round;

    msg!(
        "Round {} closed with {} tickets",
        round.round_id,
        round.ticket_count()
    );
    emit!(RoundClosed {
        round_id: round.round_id,
        ticket_count: round.ticket_count(),
        forced: true,
    });
    emit!(RoundOpened {
        round_id: next_round
    });

    Ok(())
}

/// Transfers the lottery's whole balance of `mint` to the payout address.
/// Withdrawing the payment token releases all custody.
pub fn process_withdraw(ctx: Context<Withdraw>) -> Result<()> {
    ctx.accounts
        .lottery
        .require_operator(ctx.accounts.operator.key())?;

    let amount = ctx.accounts.source.amount;
    if amount == 0 {
        msg!("Nothing to withdraw");
        return Ok(());
    }

    pay_out(
        &ctx.accounts.token_program,
        &ctx.accounts.source,
        &ctx.accounts.mint,
        ctx.accounts.destination.to_account_info(),
        &ctx.accounts.lottery,
        amount,
    )?;

    let mint = ctx.accounts.mint.key();
    if ctx.accounts.lottery.record_withdrawal(mint, amount)? {
        msg!("Payment custody swept");
    }

    msg!("Withdrew {} to {}", amount, ctx.accounts.payout_address.key());
    emit!(CustodyWithdrawn {
        mint,
        destination: ctx.accounts.destination.key(),
        amount,
    });

    Ok(())
}

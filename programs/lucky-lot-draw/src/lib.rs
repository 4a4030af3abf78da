use anchor_lang::prelude::*;

/// Module containing program-wide constants such as PDA seeds and the
/// round capacity.
pub mod constants;

/// Module defining custom error types used throughout the program.
/// Errors are returned via the Anchor framework when instructions fail.
pub mod error;

/// Events emitted on every round state change.
pub mod events;

/// Module containing all instruction handlers for the program,
/// such as buying tickets, closing rounds and drawing a winner.
pub mod instructions;

/// Module defining the on-chain state structures for the program,
/// the `Lottery` config account and one `Round` account per round.
pub mod state;

pub use instructions::*;
use state::RoundSummary;

declare_id!("271JxYaQKGRwBqz528GGxfppKBPgZ1kd6vdQqShBGdqg");

#[program]
pub mod lucky_lot_draw {
    use super::*;

    pub fn initialize_config(
        ctx: Context<InitializeConfig>,
        ticket_price: u64,
        payout_address: Pubkey,
    ) -> Result<()> {
        process_initialize_config(ctx, ticket_price, payout_address)
    }

    pub fn enter(ctx: Context<Enter>, ticket_number: u8) -> Result<()> {
        process_enter(ctx, ticket_number)
    }

    pub fn close_round(ctx: Context<CloseRound>) -> Result<()> {
        process_close_round(ctx)
    }

    pub fn commit_randomness(ctx: Context<CommitRandomness>, round_id: u64) -> Result<()> {
        process_commit_randomness(ctx, round_id)
    }

    pub fn set_winning_number(ctx: Context<SetWinningNumber>, round_id: u64) -> Result<()> {
        process_set_winning_number(ctx, round_id)
    }

    pub fn refund_all<'info>(
        ctx: Context<'_, '_, 'info, 'info, RefundAll<'info>>,
        round_id: u64,
    ) -> Result<()> {
        process_refund_all(ctx, round_id)
    }

    pub fn claim_prize(ctx: Context<ClaimPrize>, round_id: u64) -> Result<()> {
        process_claim_prize(ctx, round_id)
    }

    pub fn withdraw(ctx: Context<Withdraw>) -> Result<()> {
        process_withdraw(ctx)
    }

    pub fn rounds(ctx: Context<ReadRound>, round_id: u64) -> Result<RoundSummary> {
        process_rounds(ctx, round_id)
    }
}

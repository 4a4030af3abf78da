use anchor_lang::prelude::*;
use anchor_spl::token_interface::{
    transfer_checked, Mint, TokenAccount, TokenInterface, TransferChecked,
};

use crate::constants::LOTTERY_SEED;
use crate::state::Lottery;

/// Operator instructions: provisioning, forced round closure and withdrawal.
pub mod admin;

/// Winner payout for a resolved round.
pub mod claim_prize;

/// Drawing the winning ticket from revealed randomness.
pub mod choose_winner;

/// Binding an oracle randomness account to a closed round.
pub mod commit_winner;

/// Ticket purchase.
pub mod enter;

/// Returning every entry's payment to its participant.
pub mod refund;

/// Read-only round query.
pub mod rounds;

pub use admin::*;
pub use choose_winner::*;
pub use claim_prize::*;
pub use commit_winner::*;
pub use enter::*;
pub use refund::*;
pub use rounds::*;

/// Moves `amount` out of a lottery-owned token account, signed by the
/// lottery PDA.
pub(crate) fn pay_out<'info>(
    token_program: &Interface<'info, TokenInterface>,
    source: &InterfaceAccount<'info, TokenAccount>,
    mint: &InterfaceAccount<'info, Mint>,
    destination: AccountInfo<'info>,
    lottery: &Account<'info, Lottery>,
    amount: u64,
) -> Result<()> {
    let signer_seeds: &[&[&[u8]]] = &[&[LOTTERY_SEED, &[lottery.bump]]];

    transfer_checked(
        CpiContext::new_with_signer(
            token_program.to_account_info(),
            TransferChecked {
                from: source.to_account_info(),
                mint: mint.to_account_info(),
                to: destination,
                authority: lottery.to_account_info(),
            },
            signer_seeds,
        ),
        amount,
        mint.decimals,
    )
}

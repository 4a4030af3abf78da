use anchor_lang::prelude::*;

#[event]
pub struct RoundOpened {
    pub round_id: u64,
}

#[event]
pub struct TicketPurchased {
    pub round_id: u64,
    pub participant: Pubkey,
    pub ticket_number: u8,
    pub paid_amount: u64,
}

#[event]
pub struct RoundClosed {
    pub round_id: u64,
    pub ticket_count: u8,
    /// `true` when the operator closed the round before it filled.
    pub forced: bool,
}

#[event]
pub struct RandomnessCommitted {
    pub round_id: u64,
    pub randomness_account: Pubkey,
}

#[event]
pub struct WinningNumberSet {
    pub round_id: u64,
    pub winning_number: u8,
    pub winner: Pubkey,
}

#[event]
pub struct RoundRefunded {
    pub round_id: u64,
    /// Entries paid back by this batch.
    pub entries: u8,
    pub amount: u64,
    /// Entries still waiting for a later batch.
    pub remaining: u8,
}

#[event]
pub struct PrizeClaimed {
    pub round_id: u64,
    pub winner: Pubkey,
    pub amount: u64,
}

#[event]
pub struct CustodyWithdrawn {
    pub mint: Pubkey,
    pub destination: Pubkey,
    pub amount: u64,
}

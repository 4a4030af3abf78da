/// Seed of the singleton `Lottery` config account.
pub const LOTTERY_SEED: &[u8] = b"lucky_lot_draw";

/// Seed prefix of every `Round` account; followed by the round id as LE u64.
pub const ROUND_SEED: &[u8] = b"round";

/// Tickets per round. Ticket numbers run from `0` to `TICKET_CAPACITY - 1`.
pub const TICKET_CAPACITY: usize = 100;

/// Id of the round opened at provisioning. Round ids are dense from here;
/// zero marks a round account that was never opened.
pub const FIRST_ROUND_ID: u64 = 1;

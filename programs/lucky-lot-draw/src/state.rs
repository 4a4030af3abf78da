use anchor_lang::prelude::*;

use crate::constants::*;
use crate::error::ErrorCode;

#[account]
#[derive(InitSpace, Default)]
pub struct Lottery {
    /// The bump seed used for deriving the PDA address of this account.
    pub bump: u8,

    /// The operator allowed to close rounds, draw, refund and withdraw.
    pub authority: Pubkey,

    /// Mint of the token tickets are paid with.
    pub payment_mint: Pubkey,

    /// Owner of the token account that receives withdrawals.
    pub payout_address: Pubkey,

    /// The price (in base units of `payment_mint`) of a single ticket.
    pub ticket_price: u64,

    /// Id of the round new entries go to. Starts at `FIRST_ROUND_ID`.
    pub current_round: u64,

    /// Payment tokens held on behalf of unsettled entries.
    /// Always at most the vault balance.
    pub custody: u64,

    /// Incremented every time the payment token custody is withdrawn.
    pub sweep_epoch: u32,
}

impl Lottery {
    pub fn require_operator(&self, signer: Pubkey) -> Result<()> {
        require_keys_eq!(signer, self.authority, ErrorCode::NotAuthorized);
        Ok(())
    }

    pub fn is_known_round(&self, round_id: u64) -> bool {
        (FIRST_ROUND_ID..=self.current_round).contains(&round_id)
    }

    /// Moves the current-round pointer past a round that just closed.
    pub fn advance_round(&mut self) -> Result<u64> {
        self.current_round = self
            .current_round
            .checked_add(1)
            .ok_or(ErrorCode::Overflow)?;
        Ok(self.current_round)
    }

    pub fn deposit(&mut self, amount: u64) -> Result<()> {
        self.custody = self
            .custody
            .checked_add(amount)
            .ok_or(ErrorCode::Overflow)?;
        Ok(())
    }

    pub fn release(&mut self, amount: u64) -> Result<()> {
        require!(amount <= self.custody, ErrorCode::InsufficientCustody);
        self.custody -= amount;
        Ok(())
    }

    /// Forgets all custody after the vault was emptied to the payout address.
    pub fn sweep(&mut self) -> Result<()> {
        self.custody = 0;
        self.sweep_epoch = self
            .sweep_epoch
            .checked_add(1)
            .ok_or(ErrorCode::Overflow)?;
        Ok(())
    }

    /// Initializes a freshly allocated account for the current round.
    /// Returns `true` if the round was opened by this call.
    pub fn open_current(&self, round: &mut Round, bump: u8) -> bool {
        if round.is_opened() {
            return false;
        }
        round.open(self.current_round, bump);
        true
    }

    /// Books a paid ticket in the current round. Returns `true` when the
    /// entry filled the round, which then closes and hands over to the next.
    pub fn sell_ticket(
        &mut self,
        round: &mut Round,
        participant: Pubkey,
        ticket_number: u8,
    ) -> Result<bool> {
        let filled =
            round.record_entry(participant, ticket_number, self.ticket_price, self.sweep_epoch)?;
        self.deposit(self.ticket_price)?;
        if filled {
            self.advance_round()?;
        }
        Ok(filled)
    }

    /// Closes the current round early. Returns the id of the next round.
    pub fn close_current(&mut self, round: &mut Round) -> Result<u64> {
        round.mark_closed()?;
        self.advance_round()
    }

    /// Books a paid refund batch of `count` entries worth `total`.
    /// Returns `true` if the refund closed a round that was still open.
    pub fn settle_refund(&mut self, round: &mut Round, count: usize, total: u64) -> Result<bool> {
        self.release(total)?;
        let was_open = round.advance_refund(count);
        if was_open {
            self.advance_round()?;
        }
        Ok(was_open)
    }

    pub fn settle_prize(&mut self, round: &mut Round, amount: u64) -> Result<()> {
        self.release(amount)?;
        round.mark_prize_claimed();
        Ok(())
    }

    /// Books a withdrawal of `amount` tokens of `mint` out of the lottery.
    /// Returns `true` if the withdrawal swept the payment token custody.
    pub fn record_withdrawal(&mut self, mint: Pubkey, amount: u64) -> Result<bool> {
        if amount == 0 || mint != self.payment_mint {
            return Ok(false);
        }
        self.sweep()?;
        Ok(true)
    }

    /// View of `round_id`. `round` is `None` while the round account is
    /// not allocated, which only happens for the current round.
    pub fn summarize(&self, round_id: u64, round: Option<&Round>) -> Result<RoundSummary> {
        require!(self.is_known_round(round_id), ErrorCode::UnknownRound);
        match round {
            Some(round) => {
                require_eq!(round.round_id, round_id, ErrorCode::UnknownRound);
                Ok(round.summary())
            }
            None => {
                require_eq!(round_id, self.current_round, ErrorCode::UnknownRound);
                Ok(RoundSummary::default())
            }
        }
    }
}

#[derive(AnchorSerialize, AnchorDeserialize, Clone, Copy, Debug, Default, PartialEq, Eq, InitSpace)]
pub enum Settlement {
    #[default]
    Pending,
    /// Some entries were paid back, the rest follow in later batches.
    Refunding,
    Refunded,
    PrizeClaimed,
}

/// A purchased ticket.
#[derive(AnchorSerialize, AnchorDeserialize, Clone, Debug, PartialEq, Eq, InitSpace)]
pub struct Entry {
    pub participant: Pubkey,
    pub ticket_number: u8,
    pub paid_amount: u64,
    /// `Lottery::sweep_epoch` when the ticket was paid. The payment is
    /// gone once the epoch moved on.
    pub sweep_epoch: u32,
}

// `#[max_len]` needs a literal.
const _: () = assert!(TICKET_CAPACITY == 100);

#[account]
#[derive(InitSpace, Default)]
pub struct Round {
    /// The bump seed used for deriving the PDA address of this account.
    pub bump: u8,

    /// Zero until the account is opened; ids start at `FIRST_ROUND_ID`.
    pub round_id: u64,

    /// Set once, by the entry that fills the round or by the operator.
    pub is_closed: bool,

    /// The winning ticket number, `None` until drawn.
    pub winning_number: Option<u8>,

    /// Oracle account committed for the draw, default until committed.
    pub randomness_account: Pubkey,

    pub settlement: Settlement,

    /// Number of leading entries already refunded.
    pub refund_cursor: u8,

    /// Entries in purchase order.
    #[max_len(100)]
    pub entries: Vec<Entry>,
}

/// Read-only view of a round returned by the `rounds` instruction.
#[derive(AnchorSerialize, AnchorDeserialize, Clone, Debug, Default, PartialEq, Eq)]
pub struct RoundSummary {
    pub ticket_count: u8,
    pub is_closed: bool,
    pub winning_number: Option<u8>,
}

impl Round {
    pub fn open(&mut self, round_id: u64, bump: u8) {
        self.bump = bump;
        self.round_id = round_id;
        self.is_closed = false;
        self.winning_number = None;
        self.randomness_account = Pubkey::default();
        self.settlement = Settlement::Pending;
        self.refund_cursor = 0;
        self.entries.clear();
    }

    pub fn is_opened(&self) -> bool {
        self.round_id != 0
    }

    pub fn ticket_count(&self) -> u8 {
        // bounded by TICKET_CAPACITY
        self.entries.len() as u8
    }

    pub fn is_taken(&self, ticket_number: u8) -> bool {
        self.entries.iter().any(|e| e.ticket_number == ticket_number)
    }

    pub fn owner_of(&self, ticket_number: u8) -> Option<Pubkey> {
        self.entries
            .iter()
            .find(|e| e.ticket_number == ticket_number)
            .map(|e| e.participant)
    }

    fn unrefunded(&self) -> &[Entry] {
        &self.entries[self.refund_cursor as usize..]
    }

    /// Custody still backing this round: payments of unrefunded entries
    /// collected since the last sweep.
    pub fn held(&self, sweep_epoch: u32) -> u64 {
        match self.settlement {
            Settlement::Pending | Settlement::Refunding => self
                .unrefunded()
                .iter()
                .filter(|e| e.sweep_epoch == sweep_epoch)
                .map(|e| e.paid_amount)
                .sum(),
            Settlement::Refunded | Settlement::PrizeClaimed => 0,
        }
    }

    pub fn check_entry(&self, ticket_number: u8) -> Result<()> {
        require!(!self.is_closed, ErrorCode::RoundClosed);
        require!(
            (ticket_number as usize) < TICKET_CAPACITY,
            ErrorCode::TicketOutOfRange
        );
        require!(!self.is_taken(ticket_number), ErrorCode::TicketTaken);
        Ok(())
    }

    /// Records a paid ticket. Returns `true` when this entry filled the
    /// round and closed it.
    pub fn record_entry(
        &mut self,
        participant: Pubkey,
        ticket_number: u8,
        price: u64,
        sweep_epoch: u32,
    ) -> Result<bool> {
        self.check_entry(ticket_number)?;

        self.entries.push(Entry {
            participant,
            ticket_number,
            paid_amount: price,
            sweep_epoch,
        });

        if self.entries.len() == TICKET_CAPACITY {
            self.is_closed = true;
        }
        Ok(self.is_closed)
    }

    pub fn mark_closed(&mut self) -> Result<()> {
        require!(!self.is_closed, ErrorCode::RoundClosed);
        self.is_closed = true;
        Ok(())
    }

    pub fn require_drawable(&self) -> Result<()> {
        require!(self.is_closed, ErrorCode::RoundOpen);
        require!(
            self.winning_number.is_none(),
            ErrorCode::WinnerAlreadyChosen
        );
        require!(!self.entries.is_empty(), ErrorCode::NoEntries);
        require!(
            self.settlement == Settlement::Pending,
            ErrorCode::AlreadySettled
        );
        Ok(())
    }

    /// Binds the oracle account whose reveal decides the draw. Only the
    /// first commitment counts.
    pub fn commit_randomness(&mut self, randomness_account: Pubkey) -> Result<()> {
        self.require_drawable()?;
        require_keys_eq!(
            self.randomness_account,
            Pubkey::default(),
            ErrorCode::RandomnessAlreadyCommitted
        );
        self.randomness_account = randomness_account;
        Ok(())
    }

    /// Checks `randomness_account` is the one committed for this round.
    pub fn require_committed(&self, randomness_account: Pubkey) -> Result<()> {
        self.require_drawable()?;
        require_keys_neq!(
            self.randomness_account,
            Pubkey::default(),
            ErrorCode::RandomnessNotCommitted
        );
        require_keys_eq!(
            randomness_account,
            self.randomness_account,
            ErrorCode::IncorrectRandomnessAccount
        );
        Ok(())
    }

    /// Picks the winning ticket uniformly among the sold tickets.
    /// Returns the winning number and its holder.
    pub fn draw(
        &mut self,
        randomness_account: Pubkey,
        randomness: &[u8; 32],
    ) -> Result<(u8, Pubkey)> {
        self.require_committed(randomness_account)?;

        let mut word = [0u8; 8];
        word.copy_from_slice(&randomness[..8]);
        let index = u64::from_le_bytes(word) % self.entries.len() as u64;
        let entry = &self.entries[index as usize];

        self.winning_number = Some(entry.ticket_number);
        Ok((entry.ticket_number, entry.participant))
    }

    /// The next `len` unrefunded entries as `(participant, amount)`, in
    /// purchase order. Entries paid before the last sweep are owed nothing.
    pub fn refund_batch(&self, sweep_epoch: u32, len: usize) -> Result<Vec<(Pubkey, u64)>> {
        require!(!self.entries.is_empty(), ErrorCode::NoEntries);
        require!(
            matches!(
                self.settlement,
                Settlement::Pending | Settlement::Refunding
            ),
            ErrorCode::AlreadySettled
        );
        let pending = self.unrefunded();
        require!(
            len > 0 && len <= pending.len(),
            ErrorCode::RefundAccountsMismatch
        );

        Ok(pending[..len]
            .iter()
            .map(|e| {
                let amount = if e.sweep_epoch == sweep_epoch {
                    e.paid_amount
                } else {
                    0
                };
                (e.participant, amount)
            })
            .collect())
    }

    /// Moves the refund cursor past `count` paid entries and closes the
    /// round. Returns `true` if the round was still open.
    pub fn advance_refund(&mut self, count: usize) -> bool {
        let was_open = !self.is_closed;
        self.is_closed = true;

        let cursor = (self.refund_cursor as usize + count).min(self.entries.len());
        self.refund_cursor = cursor as u8;
        self.settlement = if cursor == self.entries.len() {
            Settlement::Refunded
        } else {
            Settlement::Refunding
        };
        was_open
    }

    /// Entries still waiting for their refund.
    pub fn refunds_left(&self) -> u8 {
        self.ticket_count() - self.refund_cursor
    }

    pub fn winner(&self) -> Option<Pubkey> {
        self.winning_number.and_then(|n| self.owner_of(n))
    }

    /// The pot owed to `claimant` if they hold the winning ticket: every
    /// payment of the round still in custody.
    pub fn prize(&self, claimant: Pubkey, sweep_epoch: u32) -> Result<u64> {
        let winner = self.winner().ok_or(ErrorCode::WinnerNotChosen)?;
        require!(
            self.settlement == Settlement::Pending,
            ErrorCode::AlreadySettled
        );
        require_keys_eq!(claimant, winner, ErrorCode::NotWinner);

        let pot = self.held(sweep_epoch);
        require!(pot > 0, ErrorCode::FundsWithdrawn);
        Ok(pot)
    }

    pub fn mark_prize_claimed(&mut self) {
        self.settlement = Settlement::PrizeClaimed;
    }

    pub fn summary(&self) -> RoundSummary {
        RoundSummary {
            ticket_count: self.ticket_count(),
            is_closed: self.is_closed,
            winning_number: self.winning_number,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use anchor_lang::error::Error;

    const PRICE: u64 = 1_000_000_000;

    fn lottery() -> Lottery {
        Lottery {
            authority: Pubkey::new_unique(),
            payment_mint: Pubkey::new_unique(),
            payout_address: Pubkey::new_unique(),
            ticket_price: PRICE,
            current_round: FIRST_ROUND_ID,
            ..Default::default()
        }
    }

    fn round(round_id: u64) -> Round {
        let mut round = Round::default();
        round.open(round_id, 255);
        round
    }

    fn fill(lottery: &mut Lottery, round: &mut Round, tickets: std::ops::Range<u8>) -> Vec<Pubkey> {
        tickets
            .map(|n| {
                let who = Pubkey::new_unique();
                lottery.sell_ticket(round, who, n).unwrap();
                who
            })
            .collect()
    }

    fn commit_and_draw(round: &mut Round, randomness: &[u8; 32]) -> (u8, Pubkey) {
        let oracle = Pubkey::new_unique();
        round.commit_randomness(oracle).unwrap();
        round.draw(oracle, randomness).unwrap()
    }

    /// Runs a whole refund, one batch of at most `batch` entries at a time.
    /// Returns the amounts paid per batch.
    fn refund_in_batches(lottery: &mut Lottery, round: &mut Round, batch: usize) -> Vec<u64> {
        let mut paid = Vec::new();
        while round.refunds_left() > 0 {
            let len = batch.min(round.refunds_left() as usize);
            let plan = round.refund_batch(lottery.sweep_epoch, len).unwrap();
            let total = plan.iter().map(|(_, amount)| amount).sum();
            lottery.settle_refund(round, plan.len(), total).unwrap();
            paid.push(total);
        }
        paid
    }

    fn held(lottery: &Lottery, rounds: &[&Round]) -> u64 {
        rounds.iter().map(|r| r.held(lottery.sweep_epoch)).sum()
    }

    #[test]
    fn first_entry_is_recorded() {
        let mut lottery = lottery();
        let mut round = round(FIRST_ROUND_ID);
        let participant = Pubkey::new_unique();

        let filled = lottery.sell_ticket(&mut round, participant, 0).unwrap();

        assert!(!filled);
        assert_eq!(
            round.summary(),
            RoundSummary {
                ticket_count: 1,
                is_closed: false,
                winning_number: None,
            }
        );
        assert_eq!(round.owner_of(0), Some(participant));
        assert_eq!(lottery.custody, PRICE);
        assert_eq!(round.held(lottery.sweep_epoch), PRICE);
    }

    #[test]
    fn duplicate_ticket_is_rejected() {
        let mut lottery = lottery();
        let mut round = round(FIRST_ROUND_ID);
        let participant = Pubkey::new_unique();

        lottery.sell_ticket(&mut round, participant, 5).unwrap();
        let err = lottery.sell_ticket(&mut round, participant, 5).unwrap_err();

        assert_eq!(err, Error::from(ErrorCode::TicketTaken));
        assert_eq!(round.ticket_count(), 1);
        assert_eq!(lottery.custody, PRICE);
    }

    #[test]
    fn out_of_range_ticket_is_rejected() {
        let mut lottery = lottery();
        let mut round = round(FIRST_ROUND_ID);

        let err = lottery
            .sell_ticket(&mut round, Pubkey::new_unique(), 100)
            .unwrap_err();

        assert_eq!(err, Error::from(ErrorCode::TicketOutOfRange));
        assert_eq!(round.ticket_count(), 0);
        assert_eq!(lottery.custody, 0);
    }

    #[test]
    fn hundredth_entry_closes_round() {
        let mut lottery = lottery();
        let mut round = round(FIRST_ROUND_ID);

        fill(&mut lottery, &mut round, 0..99);
        assert!(!round.is_closed);
        assert_eq!(lottery.current_round, FIRST_ROUND_ID);

        let filled = lottery
            .sell_ticket(&mut round, Pubkey::new_unique(), 99)
            .unwrap();
        assert!(filled);
        assert_eq!(
            round.summary(),
            RoundSummary {
                ticket_count: 100,
                is_closed: true,
                winning_number: None,
            }
        );
        assert_eq!(lottery.current_round, 2);

        let err = round
            .record_entry(Pubkey::new_unique(), 0, PRICE, 0)
            .unwrap_err();
        assert_eq!(err, Error::from(ErrorCode::RoundClosed));

        assert_eq!(
            lottery.summarize(lottery.current_round, None).unwrap(),
            RoundSummary::default()
        );
    }

    #[test]
    fn lazy_round_is_opened_once() {
        let lottery = lottery();
        let mut round = Round::default();

        assert!(lottery.open_current(&mut round, 254));
        assert_eq!(round.round_id, FIRST_ROUND_ID);
        assert_eq!(round.bump, 254);

        round.mark_closed().unwrap();
        assert!(!lottery.open_current(&mut round, 254));
        assert!(round.is_closed);
    }

    #[test]
    fn close_is_one_shot() {
        let mut lottery = lottery();
        let mut round = round(FIRST_ROUND_ID);

        assert_eq!(lottery.close_current(&mut round).unwrap(), 2);
        assert!(round.is_closed);
        assert_eq!(
            lottery.close_current(&mut round).unwrap_err(),
            Error::from(ErrorCode::RoundClosed)
        );
        assert_eq!(lottery.current_round, 2);
    }

    #[test]
    fn closing_unentered_round_allocates_and_closes_it() {
        let mut lottery = lottery();
        lottery.advance_round().unwrap();
        let mut round = Round::default();

        lottery.open_current(&mut round, 200);
        let next = lottery.close_current(&mut round).unwrap();

        assert_eq!(next, 3);
        assert_eq!(
            lottery.summarize(2, Some(&round)).unwrap(),
            RoundSummary {
                ticket_count: 0,
                is_closed: true,
                winning_number: None,
            }
        );
    }

    #[test]
    fn draw_requires_closed_round_with_entries() {
        let mut lottery = lottery();
        let mut round = round(FIRST_ROUND_ID);

        fill(&mut lottery, &mut round, 0..3);
        assert_eq!(
            round.commit_randomness(Pubkey::new_unique()).unwrap_err(),
            Error::from(ErrorCode::RoundOpen)
        );

        let mut empty = self::round(2);
        empty.mark_closed().unwrap();
        assert_eq!(
            empty.commit_randomness(Pubkey::new_unique()).unwrap_err(),
            Error::from(ErrorCode::NoEntries)
        );
    }

    #[test]
    fn draw_picks_sold_ticket_once() {
        let mut lottery = lottery();
        let mut round = round(FIRST_ROUND_ID);

        let mut players = Vec::new();
        for n in [40u8, 17, 93] {
            let who = Pubkey::new_unique();
            lottery.sell_ticket(&mut round, who, n).unwrap();
            players.push(who);
        }
        lottery.close_current(&mut round).unwrap();

        let oracle = Pubkey::new_unique();
        round.commit_randomness(oracle).unwrap();

        let mut randomness = [0u8; 32];
        randomness[0] = 4; // 4 % 3 entries -> second entry
        assert_eq!(round.draw(oracle, &randomness).unwrap(), (17, players[1]));
        assert_eq!(round.winning_number, Some(17));
        assert_eq!(round.winner(), Some(players[1]));

        let err = round.draw(oracle, &[1; 32]).unwrap_err();
        assert_eq!(err, Error::from(ErrorCode::WinnerAlreadyChosen));
        assert_eq!(round.winning_number, Some(17));
        assert_eq!(
            round.commit_randomness(Pubkey::new_unique()).unwrap_err(),
            Error::from(ErrorCode::WinnerAlreadyChosen)
        );
    }

    #[test]
    fn randomness_cannot_be_recommitted() {
        let mut lottery = lottery();
        let mut round = round(FIRST_ROUND_ID);
        fill(&mut lottery, &mut round, 0..5);
        lottery.close_current(&mut round).unwrap();

        let first = Pubkey::new_unique();
        let second = Pubkey::new_unique();
        round.commit_randomness(first).unwrap();

        assert_eq!(
            round.commit_randomness(second).unwrap_err(),
            Error::from(ErrorCode::RandomnessAlreadyCommitted)
        );
        assert_eq!(round.randomness_account, first);

        // only the committed account may resolve the round
        assert_eq!(
            round.draw(second, &[3; 32]).unwrap_err(),
            Error::from(ErrorCode::IncorrectRandomnessAccount)
        );
        assert_eq!(round.winning_number, None);
        round.draw(first, &[3; 32]).unwrap();
    }

    #[test]
    fn draw_needs_a_commitment() {
        let mut lottery = lottery();
        let mut round = round(FIRST_ROUND_ID);
        fill(&mut lottery, &mut round, 0..2);
        lottery.close_current(&mut round).unwrap();

        assert_eq!(
            round.draw(Pubkey::default(), &[0; 32]).unwrap_err(),
            Error::from(ErrorCode::RandomnessNotCommitted)
        );
    }

    #[test]
    fn full_round_resolves() {
        let mut lottery = lottery();
        let mut round = round(FIRST_ROUND_ID);
        fill(&mut lottery, &mut round, 0..100);

        let (winning, winner) = commit_and_draw(&mut round, &[0xab; 32]);

        assert!((winning as usize) < TICKET_CAPACITY);
        assert_eq!(round.summary().winning_number, Some(winning));
        assert_eq!(round.winner(), Some(winner));
    }

    #[test]
    fn refund_pays_each_entry() {
        let mut lottery = lottery();
        let mut round = round(FIRST_ROUND_ID);
        let alice = Pubkey::new_unique();
        let bob = Pubkey::new_unique();

        lottery.sell_ticket(&mut round, alice, 3).unwrap();
        lottery.sell_ticket(&mut round, bob, 4).unwrap();
        lottery.sell_ticket(&mut round, alice, 9).unwrap();

        let plan = round.refund_batch(lottery.sweep_epoch, 3).unwrap();
        assert_eq!(plan, vec![(alice, PRICE), (bob, PRICE), (alice, PRICE)]);
    }

    #[test]
    fn refund_settles_round_once() {
        let mut lottery = lottery();
        let mut round = round(FIRST_ROUND_ID);
        fill(&mut lottery, &mut round, 0..10);
        lottery.close_current(&mut round).unwrap();

        assert_eq!(refund_in_batches(&mut lottery, &mut round, 10), vec![10 * PRICE]);
        assert_eq!(round.settlement, Settlement::Refunded);
        assert_eq!(lottery.current_round, 2);

        assert_eq!(lottery.custody, 0);
        assert_eq!(round.held(lottery.sweep_epoch), 0);
        assert_eq!(
            round.refund_batch(lottery.sweep_epoch, 1).unwrap_err(),
            Error::from(ErrorCode::AlreadySettled)
        );
    }

    #[test]
    fn full_round_refunds_in_batches() {
        let mut lottery = lottery();
        let mut round = round(FIRST_ROUND_ID);
        fill(&mut lottery, &mut round, 0..100);

        let plan = round.refund_batch(lottery.sweep_epoch, 20).unwrap();
        let total = plan.iter().map(|(_, amount)| amount).sum();
        lottery.settle_refund(&mut round, plan.len(), total).unwrap();

        assert_eq!(round.settlement, Settlement::Refunding);
        assert_eq!(round.refunds_left(), 80);
        assert_eq!(round.held(lottery.sweep_epoch), 80 * PRICE);
        assert_eq!(lottery.custody, 80 * PRICE);

        // a partly refunded round can neither be drawn nor claimed
        assert_eq!(
            round.commit_randomness(Pubkey::new_unique()).unwrap_err(),
            Error::from(ErrorCode::AlreadySettled)
        );
        assert_eq!(
            round.refund_batch(lottery.sweep_epoch, 81).unwrap_err(),
            Error::from(ErrorCode::RefundAccountsMismatch)
        );

        let paid = refund_in_batches(&mut lottery, &mut round, 30);
        assert_eq!(paid, vec![30 * PRICE, 30 * PRICE, 20 * PRICE]);
        assert_eq!(round.settlement, Settlement::Refunded);
        assert_eq!(lottery.custody, 0);
        assert_eq!(lottery.current_round, 2);
    }

    #[test]
    fn empty_refund_batch_is_rejected() {
        let mut lottery = lottery();
        let mut round = round(FIRST_ROUND_ID);
        fill(&mut lottery, &mut round, 0..2);

        assert_eq!(
            round.refund_batch(lottery.sweep_epoch, 0).unwrap_err(),
            Error::from(ErrorCode::RefundAccountsMismatch)
        );
    }

    #[test]
    fn refunding_open_round_closes_it() {
        let mut lottery = lottery();
        let mut round = round(FIRST_ROUND_ID);
        fill(&mut lottery, &mut round, 0..10);

        let plan = round.refund_batch(lottery.sweep_epoch, 4).unwrap();
        let closed = lottery
            .settle_refund(&mut round, plan.len(), 4 * PRICE)
            .unwrap();
        assert!(closed);
        assert!(round.is_closed);
        assert_eq!(lottery.current_round, 2);

        let err = round
            .record_entry(Pubkey::new_unique(), 50, PRICE, lottery.sweep_epoch)
            .unwrap_err();
        assert_eq!(err, Error::from(ErrorCode::RoundClosed));

        // later batches leave the round pointer alone
        refund_in_batches(&mut lottery, &mut round, 6);
        assert_eq!(lottery.current_round, 2);
    }

    #[test]
    fn empty_round_has_nothing_to_refund() {
        let round = round(FIRST_ROUND_ID);
        assert_eq!(
            round.refund_batch(0, 1).unwrap_err(),
            Error::from(ErrorCode::NoEntries)
        );
    }

    #[test]
    fn swept_entries_are_refunded_nothing() {
        let mut lottery = lottery();
        let mut round = round(FIRST_ROUND_ID);
        let early = fill(&mut lottery, &mut round, 0..4);

        assert!(lottery.record_withdrawal(lottery.payment_mint, 4 * PRICE).unwrap());
        assert_eq!(lottery.custody, 0);
        assert_eq!(round.held(lottery.sweep_epoch), 0);

        // entries after the sweep are held, the earlier ones are gone
        let late = Pubkey::new_unique();
        lottery.sell_ticket(&mut round, late, 50).unwrap();
        assert_eq!(round.held(lottery.sweep_epoch), PRICE);
        assert_eq!(lottery.custody, PRICE);

        let plan = round.refund_batch(lottery.sweep_epoch, 5).unwrap();
        let mut expected: Vec<(Pubkey, u64)> = early.iter().map(|p| (*p, 0)).collect();
        expected.push((late, PRICE));
        assert_eq!(plan, expected);

        lottery.settle_refund(&mut round, 5, PRICE).unwrap();
        assert_eq!(round.settlement, Settlement::Refunded);
        assert_eq!(lottery.custody, 0);
    }

    #[test]
    fn prize_after_sweep_pays_what_is_held() {
        let mut lottery = lottery();
        let mut round = round(FIRST_ROUND_ID);
        fill(&mut lottery, &mut round, 0..3);
        lottery.record_withdrawal(lottery.payment_mint, 3 * PRICE).unwrap();
        fill(&mut lottery, &mut round, 3..5);
        lottery.close_current(&mut round).unwrap();

        let (_, winner) = commit_and_draw(&mut round, &[0; 32]);
        let pot = round.prize(winner, lottery.sweep_epoch).unwrap();
        assert_eq!(pot, 2 * PRICE);

        lottery.settle_prize(&mut round, pot).unwrap();
        assert_eq!(lottery.custody, 0);
    }

    #[test]
    fn fully_swept_prize_is_gone() {
        let mut lottery = lottery();
        let mut round = round(FIRST_ROUND_ID);
        fill(&mut lottery, &mut round, 0..3);
        lottery.close_current(&mut round).unwrap();
        let (_, winner) = commit_and_draw(&mut round, &[1; 32]);

        lottery.record_withdrawal(lottery.payment_mint, 3 * PRICE).unwrap();
        assert_eq!(
            round.prize(winner, lottery.sweep_epoch).unwrap_err(),
            Error::from(ErrorCode::FundsWithdrawn)
        );
    }

    #[test]
    fn prize_goes_to_winning_ticket_holder() {
        let mut lottery = lottery();
        let mut round = round(FIRST_ROUND_ID);
        let players = fill(&mut lottery, &mut round, 0..5);
        lottery.close_current(&mut round).unwrap();

        assert_eq!(
            round.prize(players[0], lottery.sweep_epoch).unwrap_err(),
            Error::from(ErrorCode::WinnerNotChosen)
        );

        let (_, winner) = commit_and_draw(&mut round, &[2; 32]);
        let loser = players.iter().copied().find(|p| *p != winner).unwrap();

        assert_eq!(
            round.prize(loser, lottery.sweep_epoch).unwrap_err(),
            Error::from(ErrorCode::NotWinner)
        );

        let pot = round.prize(winner, lottery.sweep_epoch).unwrap();
        assert_eq!(pot, 5 * PRICE);
        lottery.settle_prize(&mut round, pot).unwrap();

        assert_eq!(lottery.custody, 0);
        assert_eq!(
            round.prize(winner, lottery.sweep_epoch).unwrap_err(),
            Error::from(ErrorCode::AlreadySettled)
        );
        assert_eq!(
            round.refund_batch(lottery.sweep_epoch, 1).unwrap_err(),
            Error::from(ErrorCode::AlreadySettled)
        );
    }

    #[test]
    fn custody_matches_unsettled_rounds() {
        let mut lottery = lottery();
        let mut first = round(FIRST_ROUND_ID);
        fill(&mut lottery, &mut first, 0..100);
        let mut second = round(lottery.current_round);
        fill(&mut lottery, &mut second, 0..7);
        assert_eq!(lottery.custody, held(&lottery, &[&first, &second]));

        let plan = second.refund_batch(lottery.sweep_epoch, 3).unwrap();
        lottery.settle_refund(&mut second, 3, 3 * PRICE).unwrap();
        assert_eq!(plan.len(), 3);
        assert_eq!(lottery.custody, held(&lottery, &[&first, &second]));

        refund_in_batches(&mut lottery, &mut second, 3);
        assert_eq!(lottery.custody, held(&lottery, &[&first, &second]));
        assert_eq!(lottery.custody, 100 * PRICE);

        let (_, winner) = commit_and_draw(&mut first, &[9; 32]);
        let pot = first.prize(winner, lottery.sweep_epoch).unwrap();
        lottery.settle_prize(&mut first, pot).unwrap();
        assert_eq!(lottery.custody, held(&lottery, &[&first, &second]));
        assert_eq!(lottery.custody, 0);
    }

    #[test]
    fn release_never_exceeds_custody() {
        let mut lottery = lottery();
        lottery.deposit(PRICE).unwrap();
        assert_eq!(
            lottery.release(PRICE + 1).unwrap_err(),
            Error::from(ErrorCode::InsufficientCustody)
        );
        assert_eq!(lottery.custody, PRICE);
    }

    #[test]
    fn only_payment_token_withdrawal_sweeps() {
        let mut lottery = lottery();
        let mut round = round(FIRST_ROUND_ID);
        fill(&mut lottery, &mut round, 0..2);

        assert!(!lottery.record_withdrawal(Pubkey::new_unique(), 500).unwrap());
        assert!(!lottery.record_withdrawal(lottery.payment_mint, 0).unwrap());
        assert_eq!(lottery.custody, 2 * PRICE);
        assert_eq!(lottery.sweep_epoch, 0);

        assert!(lottery.record_withdrawal(lottery.payment_mint, 2 * PRICE).unwrap());
        assert_eq!(lottery.custody, 0);
        assert_eq!(lottery.sweep_epoch, 1);
    }

    #[test]
    fn only_operator_passes() {
        let lottery = lottery();
        lottery.require_operator(lottery.authority).unwrap();
        assert_eq!(
            lottery.require_operator(Pubkey::new_unique()).unwrap_err(),
            Error::from(ErrorCode::NotAuthorized)
        );
    }

    #[test]
    fn known_rounds_are_dense() {
        let mut lottery = lottery();
        assert!(!lottery.is_known_round(0));
        assert!(lottery.is_known_round(1));
        assert!(!lottery.is_known_round(2));
        assert_eq!(lottery.advance_round().unwrap(), 2);
        assert!(lottery.is_known_round(2));
    }

    #[test]
    fn summaries_only_exist_for_known_rounds() {
        let mut lottery = lottery();
        let mut first = round(FIRST_ROUND_ID);
        fill(&mut lottery, &mut first, 0..3);

        assert_eq!(lottery.summarize(1, Some(&first)).unwrap().ticket_count, 3);
        assert_eq!(
            lottery.summarize(2, None).unwrap_err(),
            Error::from(ErrorCode::UnknownRound)
        );
        assert_eq!(
            lottery.summarize(0, None).unwrap_err(),
            Error::from(ErrorCode::UnknownRound)
        );

        lottery.close_current(&mut first).unwrap();
        assert_eq!(lottery.summarize(2, None).unwrap(), RoundSummary::default());
        // a past round account never reads as empty
        assert_eq!(
            lottery.summarize(1, None).unwrap_err(),
            Error::from(ErrorCode::UnknownRound)
        );
    }
}

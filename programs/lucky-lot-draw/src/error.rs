use anchor_lang::prelude::*;

#[error_code]
pub enum ErrorCode {
    // input validation
    #[msg("Ticket number is outside the round capacity")]
    TicketOutOfRange,
    #[msg("Ticket number already taken in this round")]
    TicketTaken,
    #[msg("Ticket price must be greater than zero")]
    InvalidTicketPrice,

    // round lifecycle
    #[msg("Round is already closed")]
    RoundClosed,
    #[msg("Round is still open")]
    RoundOpen,
    #[msg("Round does not exist")]
    UnknownRound,
    #[msg("Round has no entries")]
    NoEntries,
    #[msg("Winning number already set for this round")]
    WinnerAlreadyChosen,
    #[msg("Winning number not set for this round")]
    WinnerNotChosen,
    #[msg("Round funds were already refunded or claimed")]
    AlreadySettled,
    #[msg("Round funds were swept by a withdrawal")]
    FundsWithdrawn,

    // authorization
    #[msg("Not authorized")]
    NotAuthorized,
    #[msg("Signer does not hold the winning ticket")]
    NotWinner,
    #[msg("Payout account does not match the configured payout address")]
    WrongPayoutAddress,
    #[msg("Mint does not match the configured payment token")]
    WrongPaymentMint,

    // custody and external accounts
    #[msg("Engine custody is lower than the requested payout")]
    InsufficientCustody,
    #[msg("Refund accounts do not match the pending round entries")]
    RefundAccountsMismatch,
    #[msg("Refund token account has the wrong owner or mint")]
    WrongRefundAccount,
    #[msg("Arithmetic overflow")]
    Overflow,

    // randomness
    #[msg("Randomness account could not be parsed")]
    InvalidRandomnessAccount,
    #[msg("Randomness already committed for this round")]
    RandomnessAlreadyCommitted,
    #[msg("No randomness committed for this round")]
    RandomnessNotCommitted,
    #[msg("Randomness already revealed")]
    RandomnessAlreadyRevealed,
    #[msg("Randomness not resolved")]
    RandomnessNotResolved,
    #[msg("Incorrect randomness account")]
    IncorrectRandomnessAccount,
}

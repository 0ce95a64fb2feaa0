use anchor_lang::prelude::*;

#[error_code]
pub enum VaultError {
    // Capability errors
    #[msg("Caller does not hold the required capability")]
    NotAuthorized = 6000,

    // Invariant / limit errors
    #[msg("Deposit is below the configured minimum")]
    BelowMinimumDeposit = 6001,

    #[msg("Caller has insufficient unlocked shares - locked positions cannot be redeemed")]
    InsufficientUnlockedShares = 6002,

    #[msg("Caller has insufficient shares")]
    InsufficientShares = 6003,

    #[msg("Reported loss exceeds the max-loss tolerance")]
    LossExceedsTolerance = 6004,

    #[msg("Divested amount differs from request by more than the slippage tolerance")]
    SlippageExceeded = 6005,

    #[msg("Fee increase exceeds the per-proposal cap")]
    FeeIncreaseTooLarge = 6006,

    #[msg("Fee rate exceeds the protocol maximum")]
    FeeTooHigh = 6007,

    #[msg("Timelock has not expired - fee change cannot be executed yet")]
    TimelockNotExpired = 6008,

    #[msg("Voter has no eligible stake at the checkpoint snapshot")]
    NoVotingPower = 6009,

    #[msg("Guardian allowance does not cover the requested shares")]
    GuardianAllowanceExceeded = 6010,

    #[msg("Depositor has reached the maximum number of concurrent positions")]
    PositionLimitReached = 6011,

    #[msg("Treasury cannot cover the requested amount")]
    InsufficientIdleBalance = 6012,

    #[msg("Nothing to claim")]
    NothingToClaim = 6013,

    #[msg("Allocation percentage must be between 0 and 100")]
    InvalidAllocation = 6014,

    #[msg("Invalid vault configuration parameter")]
    InvalidVaultConfig = 6015,

    // State-machine errors
    #[msg("Vault is paused")]
    VaultPaused = 6016,

    #[msg("Vault is not paused")]
    VaultNotPaused = 6017,

    #[msg("Grace period has ended - only emergency withdraw is available")]
    GracePeriodOver = 6018,

    #[msg("Grace period is still active - use ordinary redeem")]
    GracePeriodActive = 6019,

    #[msg("Active adapter still holds assets - divest before swapping")]
    AdapterNotDivested = 6020,

    #[msg("No active adapter configured")]
    NoActiveAdapter = 6021,

    #[msg("Adapter accounts do not match the vault's active adapter")]
    AdapterMismatch = 6022,

    #[msg("Campaign checkpoint has failed - distribution is halted")]
    CampaignHalted = 6023,

    #[msg("Campaign is not active in the registry")]
    CampaignInactive = 6024,

    #[msg("Checkpoint is not in the Voting state")]
    CheckpointNotVoting = 6025,

    #[msg("Checkpoint is not in the Scheduled state")]
    CheckpointNotScheduled = 6026,

    #[msg("Checkpoint has already been resolved")]
    CheckpointAlreadyResolved = 6027,

    #[msg("Voting window is not open")]
    VotingWindowClosed = 6028,

    #[msg("Voting window has not ended - cannot finalize yet")]
    VotingWindowNotEnded = 6029,

    #[msg("Invalid checkpoint window configuration")]
    InvalidCheckpointWindow = 6030,

    #[msg("Distribution round interval has not elapsed")]
    HarvestTooEarly = 6031,

    #[msg("A distribution round is in progress - shares are frozen until it closes")]
    RoundInProgress = 6032,

    #[msg("Depositor was already processed in this round")]
    AlreadyDistributed = 6033,

    #[msg("Invalid pagination parameters")]
    InvalidPagination = 6034,

    #[msg("Depositor account does not belong to this vault")]
    DepositorMismatch = 6037,

    #[msg("Reentrant call rejected")]
    ReentrantCall = 6035,

    // Arithmetic
    #[msg("Math overflow in vault calculations")]
    MathOverflow = 6036,
}

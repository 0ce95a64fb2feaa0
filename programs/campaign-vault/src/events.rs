use anchor_lang::prelude::*;

#[event]
pub struct VaultInitialized {
    pub vault: Pubkey,
    pub asset_mint: Pubkey,
    pub authority: Pubkey,
    pub campaign: Pubkey,
    pub fee_bps: u16,
    pub timestamp: i64,
}

#[event]
pub struct Deposited {
    pub vault: Pubkey,
    pub owner: Pubkey,
    pub assets: u64,
    pub shares: u64,
    pub unlock_ts: i64,
    pub timestamp: i64,
}

#[event]
pub struct Redeemed {
    pub vault: Pubkey,
    pub owner: Pubkey,
    pub receiver: Pubkey,
    pub shares: u64,
    pub assets: u64,
    pub by_guardian: bool,
    pub timestamp: i64,
}

#[event]
pub struct AdapterChanged {
    pub vault: Pubkey,
    pub adapter_program: Pubkey,
    pub adapter_state: Pubkey,
    pub timestamp: i64,
}

#[event]
pub struct Rebalanced {
    pub vault: Pubkey,
    pub invested: u64,
    pub divested: u64,
    pub timestamp: i64,
}

#[event]
pub struct YieldHarvested {
    pub vault: Pubkey,
    pub round: u64,
    pub profit: u64,
    pub loss: u64,
    pub protocol_fee: u64,
    pub timestamp: i64,
}

#[event]
pub struct DistributionPage {
    pub vault: Pubkey,
    pub round: u64,
    pub depositors_processed: u32,
    pub campaign_paid: u64,
    pub personal_credited: u64,
    pub timestamp: i64,
}

#[event]
pub struct RoundClosed {
    pub vault: Pubkey,
    pub round: u64,
    pub net_yield: u64,
    pub campaign_total: u64,
    pub remainder: u64,
    pub timestamp: i64,
}

#[event]
pub struct PersonalYieldClaimed {
    pub vault: Pubkey,
    pub owner: Pubkey,
    pub beneficiary: Pubkey,
    pub amount: u64,
    pub timestamp: i64,
}

#[event]
pub struct AllocationChanged {
    pub vault: Pubkey,
    pub owner: Pubkey,
    pub campaign_pct: u8,
    pub personal_beneficiary: Pubkey,
    pub timestamp: i64,
}

#[event]
pub struct GuardianAllowanceChanged {
    pub vault: Pubkey,
    pub owner: Pubkey,
    pub allowance: u64,
    pub timestamp: i64,
}

#[event]
pub struct EmergencyPaused {
    pub vault: Pubkey,
    pub divested: u64,
    pub grace_ends_at: i64,
    pub timestamp: i64,
}

#[event]
pub struct Unpaused {
    pub vault: Pubkey,
    pub timestamp: i64,
}

#[event]
pub struct EmergencyWithdrawn {
    pub vault: Pubkey,
    pub owner: Pubkey,
    pub shares: u64,
    pub assets: u64,
    pub timestamp: i64,
}

#[event]
pub struct FeeChangeProposed {
    pub vault: Pubkey,
    pub nonce: u64,
    pub fee_bps: u16,
    pub recipient: Pubkey,
    pub effective_ts: i64,
    pub applied_immediately: bool,
    pub timestamp: i64,
}

#[event]
pub struct FeeChangeExecuted {
    pub vault: Pubkey,
    pub nonce: u64,
    pub fee_bps: u16,
    pub recipient: Pubkey,
    pub timestamp: i64,
}

#[event]
pub struct FeeChangeCancelled {
    pub vault: Pubkey,
    pub nonce: u64,
    pub timestamp: i64,
}

#[event]
pub struct CheckpointScheduled {
    pub vault: Pubkey,
    pub checkpoint: u64,
    pub window_start: i64,
    pub window_end: i64,
    pub execution_deadline: i64,
    pub quorum_bps: u16,
    pub timestamp: i64,
}

#[event]
pub struct CheckpointVotingOpened {
    pub vault: Pubkey,
    pub checkpoint: u64,
    pub snapshot_ts: i64,
    pub snapshot_total_stake: u64,
    pub timestamp: i64,
}

#[event]
pub struct VoteCast {
    pub vault: Pubkey,
    pub checkpoint: u64,
    pub voter: Pubkey,
    pub weight: u64,
    pub support: bool,
    pub timestamp: i64,
}

#[event]
pub struct CheckpointFinalized {
    pub vault: Pubkey,
    pub checkpoint: u64,
    pub succeeded: bool,
    pub votes_for: u64,
    pub votes_against: u64,
    pub snapshot_total_stake: u64,
    pub timestamp: i64,
}

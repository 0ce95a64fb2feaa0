// PDA Seeds
pub const VAULT_SEED: &[u8] = b"vault";
pub const TREASURY_SEED: &[u8] = b"treasury";
pub const DEPOSITOR_SEED: &[u8] = b"depositor";
pub const ROUND_SEED: &[u8] = b"round";
pub const FEE_PROPOSAL_SEED: &[u8] = b"fee_proposal";
pub const CHECKPOINT_SEED: &[u8] = b"checkpoint";
pub const VOTE_SEED: &[u8] = b"vote";

// Time constants
pub const SECONDS_PER_HOUR: i64 = 3600;
pub const SECONDS_PER_DAY: i64 = 86400;

/// Minimum spacing between distribution rounds
pub const HARVEST_INTERVAL: i64 = SECONDS_PER_DAY;

/// Window after emergency activation during which ordinary redeem keeps working
pub const EMERGENCY_GRACE_PERIOD: i64 = SECONDS_PER_DAY;

/// Delay before a queued fee increase becomes executable
pub const FEE_TIMELOCK_DELAY: i64 = 7 * SECONDS_PER_DAY;

// Math constants
pub const BASIS_POINTS_DIVISOR: u64 = 10000;
pub const ALLOCATION_DIVISOR: u64 = 100;

// Limits
pub const MAX_PAGE_SIZE: u32 = 50; // Prevent excessive compute usage
pub const MAX_POSITIONS_PER_DEPOSITOR: usize = 32;
pub const MAX_PROTOCOL_FEE_BPS: u16 = 3000;
pub const MAX_FEE_INCREASE_BPS: u16 = 500; // Per-proposal increase cap
pub const MIN_STAKE_AGE_FLOOR: i64 = SECONDS_PER_HOUR;
pub const MIN_STAKE_AGE_CEILING: i64 = 7 * SECONDS_PER_DAY;

// Lock profile durations
pub const LOCK_DURATION_QUARTER: i64 = 90 * SECONDS_PER_DAY;
pub const LOCK_DURATION_HALF_YEAR: i64 = 180 * SECONDS_PER_DAY;
pub const LOCK_DURATION_YEAR: i64 = 365 * SECONDS_PER_DAY;

// Capabilities answered by the access registry
pub const CAP_PAUSER: u8 = 1;
pub const CAP_ADAPTER_ADMIN: u8 = 2;
pub const CAP_FEE_ADMIN: u8 = 3;
pub const CAP_CHECKPOINT_SCHEDULER: u8 = 4;
pub const CAP_GUARDIAN: u8 = 5;

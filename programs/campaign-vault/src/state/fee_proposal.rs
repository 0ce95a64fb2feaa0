use anchor_lang::prelude::*;

/// A queued fee increase. Decreases are applied on the spot and never
/// stored; only increases sit out the timelock. The account's existence is
/// the pending flag: execute and cancel both close it, so a second
/// execution fails at account resolution.
#[account]
#[derive(InitSpace)]
pub struct FeeChangeProposal {
    pub vault: Pubkey,

    pub nonce: u64,

    pub fee_bps: u16,

    pub recipient: Pubkey,

    /// Earliest unix time the proposal may be executed
    pub effective_ts: i64,

    /// Who paid for the account; refunded on execute/cancel
    pub proposer: Pubkey,

    pub bump: u8,

    pub _reserved: [u64; 2],
}

impl FeeChangeProposal {
    pub fn executable(&self, now: i64) -> bool {
        now >= self.effective_ts
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constants::FEE_TIMELOCK_DELAY;

    #[test]
    fn not_executable_before_effective_time() {
        let p = FeeChangeProposal {
            vault: Pubkey::new_unique(),
            nonce: 0,
            fee_bps: 300,
            recipient: Pubkey::new_unique(),
            effective_ts: 1_000 + FEE_TIMELOCK_DELAY,
            proposer: Pubkey::new_unique(),
            bump: 255,
            _reserved: [0; 2],
        };
        assert!(!p.executable(1_000));
        assert!(!p.executable(1_000 + FEE_TIMELOCK_DELAY - 1));
        assert!(p.executable(1_000 + FEE_TIMELOCK_DELAY));
    }
}

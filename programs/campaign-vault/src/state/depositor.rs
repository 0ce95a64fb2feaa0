use anchor_lang::prelude::*;

use crate::constants::*;
use crate::error::VaultError;

/// One deposit's worth of shares with its own unlock time. Created on
/// deposit, decremented on redeem, removed once empty. The unlock time is
/// fixed at creation and never changes.
#[derive(AnchorSerialize, AnchorDeserialize, Clone, Copy, InitSpace)]
pub struct LockedPosition {
    pub shares: u64,
    pub unlock_ts: i64,
    pub created_at: i64,
}

#[derive(AnchorSerialize, AnchorDeserialize, Clone, Copy, PartialEq, Eq, InitSpace)]
pub enum LockProfile {
    Flexible,
    Quarter,
    HalfYear,
    Year,
}

impl LockProfile {
    pub fn duration(&self) -> i64 {
        match self {
            LockProfile::Flexible => 0,
            LockProfile::Quarter => LOCK_DURATION_QUARTER,
            LockProfile::HalfYear => LOCK_DURATION_HALF_YEAR,
            LockProfile::Year => LOCK_DURATION_YEAR,
        }
    }
}

#[account]
#[derive(InitSpace)]
pub struct DepositorAccount {
    pub vault: Pubkey,

    pub owner: Pubkey,

    /// Cached sum of position shares
    pub shares: u64,

    /// Timed positions, in creation order
    #[max_len(MAX_POSITIONS_PER_DEPOSITOR)]
    pub positions: Vec<LockedPosition>,

    /// Percentage of this depositor's yield portion directed to the
    /// campaign recipient (0-100); the rest accrues to the beneficiary
    pub campaign_pct: u8,

    /// Recipient of the non-campaign part of this depositor's yield
    pub personal_beneficiary: Pubkey,

    /// Yield credited at distribution time, claimable any time
    pub pending_personal_yield: u64,

    /// Last distribution round this depositor was processed in
    pub last_distributed_round: u64,

    /// Shares a guardian may redeem on this depositor's behalf
    pub guardian_allowance: u64,

    pub bump: u8,

    pub _reserved: [u64; 4],
}

impl DepositorAccount {
    pub fn unlocked_shares(&self, now: i64) -> u64 {
        self.positions
            .iter()
            .filter(|p| p.unlock_ts <= now)
            .map(|p| p.shares)
            .sum()
    }

    pub fn locked_shares(&self, now: i64) -> u64 {
        self.positions
            .iter()
            .filter(|p| p.unlock_ts > now)
            .map(|p| p.shares)
            .sum()
    }

    /// Stake eligible to vote at a checkpoint snapshot: positions that had
    /// already aged `min_stake_age` when the snapshot was taken. Anything
    /// deposited after the snapshot can never satisfy this.
    pub fn eligible_stake_at(&self, snapshot_ts: i64, min_stake_age: i64) -> u64 {
        self.positions
            .iter()
            .filter(|p| p.created_at.saturating_add(min_stake_age) <= snapshot_ts)
            .map(|p| p.shares)
            .sum()
    }

    pub fn push_position(&mut self, shares: u64, now: i64, profile: LockProfile) -> Result<i64> {
        require!(
            self.positions.len() < MAX_POSITIONS_PER_DEPOSITOR,
            VaultError::PositionLimitReached
        );
        let unlock_ts = now
            .checked_add(profile.duration())
            .ok_or(VaultError::MathOverflow)?;
        self.positions.push(LockedPosition {
            shares,
            unlock_ts,
            created_at: now,
        });
        self.shares = self
            .shares
            .checked_add(shares)
            .ok_or(VaultError::MathOverflow)?;
        Ok(unlock_ts)
    }

    /// Burn `shares` out of unlocked positions, oldest first. Unlocked
    /// shares are fungible, so the order only affects which slots free up.
    pub fn consume_unlocked(&mut self, mut shares: u64, now: i64) -> Result<()> {
        require!(
            shares <= self.unlocked_shares(now),
            VaultError::InsufficientUnlockedShares
        );
        for position in self.positions.iter_mut() {
            if shares == 0 {
                break;
            }
            if position.unlock_ts > now {
                continue;
            }
            let take = position.shares.min(shares);
            position.shares -= take;
            shares -= take;
            self.shares = self
                .shares
                .checked_sub(take)
                .ok_or(VaultError::MathOverflow)?;
        }
        self.positions.retain(|p| p.shares > 0);
        Ok(())
    }

    /// Burn `shares` ignoring unlock times, oldest first. The lock-bypass
    /// path for emergency withdrawal and guardian redemption.
    pub fn consume_any(&mut self, mut shares: u64) -> Result<()> {
        require!(shares <= self.shares, VaultError::InsufficientShares);
        for position in self.positions.iter_mut() {
            if shares == 0 {
                break;
            }
            let take = position.shares.min(shares);
            position.shares -= take;
            shares -= take;
            self.shares = self
                .shares
                .checked_sub(take)
                .ok_or(VaultError::MathOverflow)?;
        }
        self.positions.retain(|p| p.shares > 0);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn depositor() -> DepositorAccount {
        DepositorAccount {
            vault: Pubkey::new_unique(),
            owner: Pubkey::new_unique(),
            shares: 0,
            positions: Vec::new(),
            campaign_pct: 50,
            personal_beneficiary: Pubkey::new_unique(),
            pending_personal_yield: 0,
            last_distributed_round: 0,
            guardian_allowance: 0,
            bump: 255,
            _reserved: [0; 4],
        }
    }

    #[test]
    fn locked_and_unlocked_partition_the_balance() {
        let mut d = depositor();
        d.push_position(1_000, 0, LockProfile::Quarter).unwrap();
        d.push_position(500, 45 * SECONDS_PER_DAY, LockProfile::Quarter)
            .unwrap();

        let t = 91 * SECONDS_PER_DAY;
        assert_eq!(d.unlocked_shares(t), 1_000);
        assert_eq!(d.locked_shares(t), 500);
        assert_eq!(d.unlocked_shares(t) + d.locked_shares(t), d.shares);
    }

    #[test]
    fn staggered_locks_unlock_independently() {
        // Depositor A at t=0 and B at t=45d, both 90-day locks: at t=91d
        // A redeems in full while B is still locked; at t=136d B unlocks.
        let mut a = depositor();
        let mut b = depositor();
        a.push_position(1_000, 0, LockProfile::Quarter).unwrap();
        b.push_position(500, 45 * SECONDS_PER_DAY, LockProfile::Quarter)
            .unwrap();

        let t91 = 91 * SECONDS_PER_DAY;
        assert!(a.consume_unlocked(1_000, t91).is_ok());
        assert!(b.consume_unlocked(500, t91).is_err());

        let t136 = 136 * SECONDS_PER_DAY;
        assert!(b.consume_unlocked(500, t136).is_ok());
        assert_eq!(b.shares, 0);
    }

    #[test]
    fn consume_unlocked_takes_oldest_first() {
        let mut d = depositor();
        d.push_position(100, 0, LockProfile::Flexible).unwrap();
        d.push_position(200, 10, LockProfile::Flexible).unwrap();

        d.consume_unlocked(150, 20).unwrap();
        assert_eq!(d.shares, 150);
        assert_eq!(d.positions.len(), 1);
        assert_eq!(d.positions[0].created_at, 10);
        assert_eq!(d.positions[0].shares, 150);
    }

    #[test]
    fn consume_any_bypasses_locks() {
        let mut d = depositor();
        d.push_position(1_000, 0, LockProfile::Year).unwrap();
        assert!(d.consume_unlocked(1_000, 100).is_err());
        d.consume_any(1_000).unwrap();
        assert_eq!(d.shares, 0);
        assert!(d.positions.is_empty());
    }

    #[test]
    fn snapshot_eligibility_requires_stake_age() {
        let mut d = depositor();
        d.push_position(1_000, 0, LockProfile::Quarter).unwrap();
        d.push_position(700, 5_000, LockProfile::Quarter).unwrap();

        let snapshot = 5_000 + SECONDS_PER_HOUR - 1;
        // Second position is younger than an hour at the snapshot.
        assert_eq!(d.eligible_stake_at(snapshot, SECONDS_PER_HOUR), 1_000);
        // A position created after the snapshot never counts.
        d.push_position(10_000, snapshot + 1, LockProfile::Quarter)
            .unwrap();
        assert_eq!(d.eligible_stake_at(snapshot, SECONDS_PER_HOUR), 1_000);
    }

    #[test]
    fn position_limit_is_enforced() {
        let mut d = depositor();
        for _ in 0..MAX_POSITIONS_PER_DEPOSITOR {
            d.push_position(1, 0, LockProfile::Flexible).unwrap();
        }
        assert!(d.push_position(1, 0, LockProfile::Flexible).is_err());
    }
}

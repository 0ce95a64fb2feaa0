use anchor_lang::prelude::*;

use crate::constants::HARVEST_INTERVAL;
use crate::error::VaultError;

/// Progress of the paginated yield distribution. One round per harvest:
/// the opening page pulls profit from the adapter, takes the protocol fee
/// and snapshots the share supply; subsequent pages walk depositor
/// accounts until every one has been credited, then the round closes and
/// the integer-division remainder goes to the campaign recipient.
#[account]
#[derive(InitSpace)]
pub struct DistributionRound {
    pub vault: Pubkey,

    /// Monotonic round id; doubles as the per-depositor replay guard
    pub id: u64,

    /// Unix time the current round opened
    pub started_at: i64,

    pub round_complete: bool,

    /// Share supply frozen for the round's pro-rata weighting
    pub total_shares_snapshot: u64,

    /// Gross profit pulled from the adapter this round
    pub gross_profit: u64,

    /// Protocol fee taken off the top
    pub protocol_fee: u64,

    /// Profit left for depositors after the fee
    pub net_yield: u64,

    /// Sum of depositor portions assigned so far
    pub assigned: u64,

    /// Paid to the campaign recipient so far this round
    pub campaign_paid: u64,

    /// Depositors processed so far this round
    pub processed: u32,

    // Lifetime counters
    pub total_rounds: u64,
    pub total_campaign_distributed: u64,
    pub total_personal_credited: u64,
    pub total_protocol_fees: u64,

    pub bump: u8,

    pub _reserved: [u64; 4],
}

impl DistributionRound {
    /// A new round may open once the previous one closed and the interval
    /// has elapsed.
    pub fn can_start(&self, now: i64) -> bool {
        self.round_complete && now >= self.started_at + HARVEST_INTERVAL
    }

    pub fn start(
        &mut self,
        now: i64,
        gross_profit: u64,
        protocol_fee: u64,
        total_shares: u64,
    ) -> Result<()> {
        require!(self.round_complete, VaultError::RoundInProgress);
        self.id = self.id.checked_add(1).ok_or(VaultError::MathOverflow)?;
        self.started_at = now;
        self.round_complete = false;
        self.total_shares_snapshot = total_shares;
        self.gross_profit = gross_profit;
        self.protocol_fee = protocol_fee;
        self.net_yield = gross_profit
            .checked_sub(protocol_fee)
            .ok_or(VaultError::MathOverflow)?;
        self.assigned = 0;
        self.campaign_paid = 0;
        self.processed = 0;
        self.total_protocol_fees = self
            .total_protocol_fees
            .checked_add(protocol_fee)
            .ok_or(VaultError::MathOverflow)?;
        Ok(())
    }

    /// Remainder owed to the campaign recipient when the last depositor
    /// has been processed. Never dropped.
    pub fn remainder(&self) -> Result<u64> {
        self.net_yield
            .checked_sub(self.assigned)
            .ok_or_else(|| error!(VaultError::MathOverflow))
    }

    pub fn complete(&mut self) -> Result<()> {
        require!(!self.round_complete, VaultError::RoundInProgress);
        self.round_complete = true;
        self.total_rounds = self
            .total_rounds
            .checked_add(1)
            .ok_or(VaultError::MathOverflow)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn round() -> DistributionRound {
        DistributionRound {
            vault: Pubkey::new_unique(),
            id: 0,
            started_at: 0,
            round_complete: true,
            total_shares_snapshot: 0,
            gross_profit: 0,
            protocol_fee: 0,
            net_yield: 0,
            assigned: 0,
            campaign_paid: 0,
            processed: 0,
            total_rounds: 0,
            total_campaign_distributed: 0,
            total_personal_credited: 0,
            total_protocol_fees: 0,
            bump: 255,
            _reserved: [0; 4],
        }
    }

    #[test]
    fn interval_gates_the_next_round() {
        let mut r = round();
        r.start(1_000, 500, 13, 10_000).unwrap();
        assert!(!r.can_start(1_000 + HARVEST_INTERVAL + 1)); // still open
        r.complete().unwrap();
        assert!(!r.can_start(1_000 + HARVEST_INTERVAL - 1));
        assert!(r.can_start(1_000 + HARVEST_INTERVAL));
    }

    #[test]
    fn start_rejects_open_round() {
        let mut r = round();
        r.start(1_000, 500, 13, 10_000).unwrap();
        assert!(r.start(2_000, 500, 13, 10_000).is_err());
        assert_eq!(r.id, 1);
        assert_eq!(r.net_yield, 487);
    }

    #[test]
    fn remainder_accounts_for_every_unit() {
        let mut r = round();
        r.start(1_000, 1_000, 25, 3_000).unwrap();
        // Three depositors of 1_000 shares each: floor(975 * 1000 / 3000) = 325.
        r.assigned = 975;
        assert_eq!(r.remainder().unwrap(), 0);
        r.assigned = 973;
        assert_eq!(r.remainder().unwrap(), 2);
    }
}

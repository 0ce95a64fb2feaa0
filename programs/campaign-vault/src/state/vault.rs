use anchor_lang::prelude::*;

use crate::constants::*;
use crate::error::VaultError;

#[account]
#[derive(InitSpace)]
pub struct Vault {
    /// Admin that initialized the vault
    pub authority: Pubkey,

    /// The single asset this vault pools
    pub asset_mint: Pubkey,

    /// Vault-owned token account holding the idle balance
    pub treasury: Pubkey,

    /// Access registry answering capability checks
    pub access_registry: Pubkey,

    /// Campaign this vault's yield is linked to
    pub campaign: Pubkey,

    /// Program of the active yield adapter
    pub adapter_program: Pubkey,

    /// State account of the active yield adapter (default pubkey when none)
    pub adapter_state: Pubkey,

    /// Shares outstanding across all depositors
    pub total_shares: u64,

    /// Personal-beneficiary credits owed but not yet claimed.
    /// Excluded from total_assets so share price never counts liabilities.
    pub total_pending_yield: u64,

    /// Protocol fee in basis points, taken from harvested profit
    pub fee_bps: u16,

    /// Recipient of the protocol fee
    pub fee_recipient: Pubkey,

    /// Fraction of total assets kept idle, in basis points
    pub cash_buffer_bps: u16,

    /// Tolerated divest shortfall/overage, in basis points of the request
    pub slippage_bps: u16,

    /// Largest harvest loss accepted, in basis points of total assets
    pub max_loss_bps: u16,

    /// Smallest accepted deposit
    pub min_deposit: u64,

    /// How long stake must age before it counts toward a checkpoint snapshot
    pub min_stake_age: i64,

    /// Nonce for the next fee-change proposal
    pub fee_proposal_nonce: u64,

    /// Id for the next checkpoint
    pub checkpoint_count: u64,

    /// Depositor accounts currently open against this vault
    pub depositor_count: u32,

    /// Set when the latest finalized checkpoint failed; halts distribution
    pub campaign_halted: bool,

    pub paused: bool,

    /// Unix time the emergency pause activated, 0 while normal
    pub emergency_activated_at: i64,

    /// Reentrancy latch, held across adapter CPIs
    pub entered: bool,

    pub bump: u8,

    pub created_at: i64,

    /// Reserved so future fields never move existing offsets
    pub _reserved: [u64; 8],
}

impl Vault {
    pub fn seeds<'a>(&'a self) -> [&'a [u8]; 4] {
        [
            VAULT_SEED,
            self.asset_mint.as_ref(),
            self.authority.as_ref(),
            std::slice::from_ref(&self.bump),
        ]
    }

    pub fn has_active_adapter(&self) -> bool {
        self.adapter_state != Pubkey::default()
    }

    /// Pooled assets backing the share supply. Idle treasury balance plus
    /// deployed adapter assets, minus credits already owed to personal
    /// beneficiaries.
    pub fn total_assets(&self, idle: u64, adapter_assets: u64) -> Result<u64> {
        idle.checked_add(adapter_assets)
            .and_then(|t| t.checked_sub(self.total_pending_yield))
            .ok_or_else(|| error!(VaultError::MathOverflow))
    }

    pub fn in_grace_period(&self, now: i64) -> bool {
        self.paused && now < self.emergency_activated_at + EMERGENCY_GRACE_PERIOD
    }

    pub fn grace_period_over(&self, now: i64) -> bool {
        self.paused && now >= self.emergency_activated_at + EMERGENCY_GRACE_PERIOD
    }

    /// Redeems run normally while unpaused, and keep running through the
    /// grace window after an emergency pause.
    pub fn ordinary_redeem_allowed(&self, now: i64) -> bool {
        !self.paused || self.in_grace_period(now)
    }

    pub fn take_entry_latch(&mut self) -> Result<()> {
        require!(!self.entered, VaultError::ReentrantCall);
        self.entered = true;
        Ok(())
    }

    pub fn release_entry_latch(&mut self) {
        self.entered = false;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn vault() -> Vault {
        Vault {
            authority: Pubkey::new_unique(),
            asset_mint: Pubkey::new_unique(),
            treasury: Pubkey::new_unique(),
            access_registry: Pubkey::new_unique(),
            campaign: Pubkey::new_unique(),
            adapter_program: Pubkey::default(),
            adapter_state: Pubkey::default(),
            total_shares: 0,
            total_pending_yield: 0,
            fee_bps: 250,
            fee_recipient: Pubkey::new_unique(),
            cash_buffer_bps: 1000,
            slippage_bps: 50,
            max_loss_bps: 500,
            min_deposit: 100,
            min_stake_age: SECONDS_PER_HOUR,
            fee_proposal_nonce: 0,
            checkpoint_count: 0,
            depositor_count: 0,
            campaign_halted: false,
            paused: false,
            emergency_activated_at: 0,
            entered: false,
            bump: 255,
            created_at: 0,
            _reserved: [0; 8],
        }
    }

    #[test]
    fn total_assets_excludes_pending_yield() {
        let mut v = vault();
        v.total_pending_yield = 300;
        assert_eq!(v.total_assets(1_000, 500).unwrap(), 1_200);
    }

    #[test]
    fn grace_window_gates_ordinary_redeem() {
        let mut v = vault();
        assert!(v.ordinary_redeem_allowed(10));

        v.paused = true;
        v.emergency_activated_at = 1_000;
        assert!(v.ordinary_redeem_allowed(1_000 + EMERGENCY_GRACE_PERIOD - 1));
        assert!(!v.ordinary_redeem_allowed(1_000 + EMERGENCY_GRACE_PERIOD));
        assert!(v.grace_period_over(1_000 + EMERGENCY_GRACE_PERIOD));
    }

    #[test]
    fn entry_latch_rejects_nested_entry() {
        let mut v = vault();
        v.take_entry_latch().unwrap();
        assert!(v.take_entry_latch().is_err());
        v.release_entry_latch();
        assert!(v.take_entry_latch().is_ok());
    }
}

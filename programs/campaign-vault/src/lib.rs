#![allow(deprecated)]
#![allow(unexpected_cfgs)]

use anchor_lang::prelude::*;

pub mod access_types;
pub mod adapter_types;
pub mod campaign_types;
pub mod constants;
pub mod error;
pub mod events;
pub mod instructions;
pub mod integrations;
pub mod state;
pub mod utils;

pub use constants::*;
pub use error::*;
pub use events::*;
pub use instructions::*;
pub use state::*;
pub use utils::*;

declare_id!("EfrVQXY8pMPfQFjNojMahMiRoGGdRx5QSUE6Mejr3cED");

#[program]
pub mod campaign_vault {
    use super::*;

    /// Create a vault for one asset, one campaign and one access registry
    pub fn initialize_vault(
        ctx: Context<InitializeVault>,
        params: InitializeVaultParams,
    ) -> Result<()> {
        instructions::handle_initialize_vault(ctx, params)
    }

    /// Deposit assets for shares under a lock profile
    pub fn deposit(ctx: Context<Deposit>, amount: u64, lock_profile: LockProfile) -> Result<()> {
        instructions::handle_deposit(ctx, amount, lock_profile)
    }

    /// Redeem unlocked shares for the proportional asset amount
    pub fn redeem(ctx: Context<Redeem>, shares: u64) -> Result<()> {
        instructions::handle_redeem(ctx, shares)
    }

    /// Grant a guardian the right to force-redeem up to `shares`
    pub fn approve_guardian(ctx: Context<ApproveGuardian>, shares: u64) -> Result<()> {
        instructions::handle_approve_guardian(ctx, shares)
    }

    /// Guardian redemption against an explicit allowance, bypassing locks
    pub fn guardian_redeem(ctx: Context<GuardianRedeem>, shares: u64) -> Result<()> {
        instructions::handle_guardian_redeem(ctx, shares)
    }

    /// Choose how this depositor's yield splits between campaign and
    /// personal beneficiary
    pub fn set_allocation_preference(
        ctx: Context<SetAllocationPreference>,
        campaign_pct: u8,
        personal_beneficiary: Pubkey,
    ) -> Result<()> {
        instructions::handle_set_allocation_preference(ctx, campaign_pct, personal_beneficiary)
    }

    /// Pay out accrued personal-beneficiary credit
    pub fn claim_personal_yield(ctx: Context<ClaimPersonalYield>) -> Result<()> {
        instructions::handle_claim_personal_yield(ctx)
    }

    /// Crank one page of the harvest-and-distribute round (permissionless)
    pub fn harvest<'info>(ctx: Context<'_, '_, 'info, 'info, Harvest<'info>>) -> Result<()> {
        instructions::handle_harvest(ctx)
    }

    /// Swap the active yield adapter (divest-before-swap enforced)
    pub fn set_adapter(ctx: Context<SetAdapter>) -> Result<()> {
        instructions::handle_set_adapter(ctx)
    }

    /// Re-apply the cash-buffer policy
    pub fn rebalance(ctx: Context<Rebalance>) -> Result<()> {
        instructions::handle_rebalance(ctx)
    }

    /// Pull an explicit amount back from the adapter
    pub fn divest_adapter(ctx: Context<DivestAdapter>, amount: u64) -> Result<()> {
        instructions::handle_divest_adapter(ctx, amount)
    }

    /// Halt the vault and recall adapter holdings (best-effort)
    pub fn emergency_pause(ctx: Context<EmergencyPause>) -> Result<()> {
        instructions::handle_emergency_pause(ctx)
    }

    /// Return a paused vault to normal operation
    pub fn unpause(ctx: Context<Unpause>) -> Result<()> {
        instructions::handle_unpause(ctx)
    }

    /// Lock-bypassing withdrawal, available once the grace window ends
    pub fn emergency_withdraw_user(
        ctx: Context<EmergencyWithdrawUser>,
        shares: u64,
    ) -> Result<()> {
        instructions::handle_emergency_withdraw_user(ctx, shares)
    }

    /// Apply a fee decrease immediately or queue a capped increase behind
    /// the timelock
    pub fn propose_fee_change(
        ctx: Context<ProposeFeeChange>,
        new_fee_bps: u16,
        recipient: Pubkey,
    ) -> Result<()> {
        instructions::handle_propose_fee_change(ctx, new_fee_bps, recipient)
    }

    /// Execute a matured fee proposal (permissionless)
    pub fn execute_fee_change(ctx: Context<ExecuteFeeChange>, nonce: u64) -> Result<()> {
        instructions::handle_execute_fee_change(ctx, nonce)
    }

    /// Withdraw a pending fee proposal before execution
    pub fn cancel_fee_change(ctx: Context<CancelFeeChange>, nonce: u64) -> Result<()> {
        instructions::handle_cancel_fee_change(ctx, nonce)
    }

    /// Schedule a governance checkpoint for this vault's campaign
    pub fn schedule_checkpoint(
        ctx: Context<ScheduleCheckpoint>,
        window_start: i64,
        window_end: i64,
        execution_deadline: i64,
        quorum_bps: u16,
    ) -> Result<()> {
        instructions::handle_schedule_checkpoint(
            ctx,
            window_start,
            window_end,
            execution_deadline,
            quorum_bps,
        )
    }

    /// Open voting and take the stake snapshot (permissionless)
    pub fn update_checkpoint_status(ctx: Context<UpdateCheckpointStatus>) -> Result<()> {
        instructions::handle_update_checkpoint_status(ctx)
    }

    /// Vote with snapshot-aged stake
    pub fn vote_on_checkpoint(ctx: Context<VoteOnCheckpoint>, support: bool) -> Result<()> {
        instructions::handle_vote_on_checkpoint(ctx, support)
    }

    /// Tally a checkpoint and gate distribution on the outcome
    /// (permissionless)
    pub fn finalize_checkpoint(ctx: Context<FinalizeCheckpoint>) -> Result<()> {
        instructions::handle_finalize_checkpoint(ctx)
    }
}

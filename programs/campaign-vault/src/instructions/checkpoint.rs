use anchor_lang::prelude::*;

use crate::access_types::AccessRegistry;
use crate::constants::*;
use crate::error::VaultError;
use crate::events::{CheckpointFinalized, CheckpointScheduled, CheckpointVotingOpened, VoteCast};
use crate::integrations::access::require_capability;
use crate::state::{Checkpoint, CheckpointStatus, DepositorAccount, Vault, VoteReceipt};
use crate::utils::validation::validate_checkpoint_window;

#[derive(Accounts)]
pub struct ScheduleCheckpoint<'info> {
    #[account(mut)]
    pub scheduler: Signer<'info>,

    #[account(
        mut,
        seeds = [VAULT_SEED, vault.asset_mint.as_ref(), vault.authority.as_ref()],
        bump = vault.bump
    )]
    pub vault: Box<Account<'info, Vault>>,

    #[account(address = vault.access_registry)]
    pub access_registry: Box<Account<'info, AccessRegistry>>,

    #[account(
        init,
        seeds = [
            CHECKPOINT_SEED,
            vault.key().as_ref(),
            &vault.checkpoint_count.to_le_bytes()
        ],
        bump,
        payer = scheduler,
        space = 8 + Checkpoint::INIT_SPACE
    )]
    pub checkpoint: Box<Account<'info, Checkpoint>>,

    pub system_program: Program<'info, System>,
}

pub fn handle_schedule_checkpoint(
    ctx: Context<ScheduleCheckpoint>,
    window_start: i64,
    window_end: i64,
    execution_deadline: i64,
    quorum_bps: u16,
) -> Result<()> {
    let now = Clock::get()?.unix_timestamp;

    require_capability(
        &ctx.accounts.access_registry,
        &ctx.accounts.scheduler.key(),
        CAP_CHECKPOINT_SCHEDULER,
    )?;
    validate_checkpoint_window(now, window_start, window_end, execution_deadline, quorum_bps)?;

    let vault = &mut ctx.accounts.vault;
    let id = vault.checkpoint_count;
    vault.checkpoint_count = id.checked_add(1).ok_or(VaultError::MathOverflow)?;

    let checkpoint = &mut ctx.accounts.checkpoint;
    checkpoint.vault = vault.key();
    checkpoint.id = id;
    checkpoint.window_start = window_start;
    checkpoint.window_end = window_end;
    checkpoint.execution_deadline = execution_deadline;
    checkpoint.quorum_bps = quorum_bps;
    checkpoint.status = CheckpointStatus::Scheduled;
    checkpoint.snapshot_ts = 0;
    checkpoint.snapshot_total_stake = 0;
    checkpoint.votes_for = 0;
    checkpoint.votes_against = 0;
    checkpoint.bump = ctx.bumps.checkpoint;
    checkpoint._reserved = [0; 4];

    emit!(CheckpointScheduled {
        vault: vault.key(),
        checkpoint: id,
        window_start,
        window_end,
        execution_deadline,
        quorum_bps,
        timestamp: now,
    });

    Ok(())
}

#[derive(Accounts)]
pub struct UpdateCheckpointStatus<'info> {
    /// Anyone may open voting once the window starts (permissionless)
    pub caller: Signer<'info>,

    #[account(
        seeds = [VAULT_SEED, vault.asset_mint.as_ref(), vault.authority.as_ref()],
        bump = vault.bump
    )]
    pub vault: Box<Account<'info, Vault>>,

    #[account(
        mut,
        seeds = [CHECKPOINT_SEED, vault.key().as_ref(), &checkpoint.id.to_le_bytes()],
        bump = checkpoint.bump,
        has_one = vault
    )]
    pub checkpoint: Box<Account<'info, Checkpoint>>,
}

/// Scheduled -> Voting, capturing the stake snapshot the whole vote is
/// measured against.
pub fn handle_update_checkpoint_status(ctx: Context<UpdateCheckpointStatus>) -> Result<()> {
    let now = Clock::get()?.unix_timestamp;

    let checkpoint = &mut ctx.accounts.checkpoint;
    checkpoint.open_voting(now, ctx.accounts.vault.total_shares)?;

    emit!(CheckpointVotingOpened {
        vault: ctx.accounts.vault.key(),
        checkpoint: checkpoint.id,
        snapshot_ts: checkpoint.snapshot_ts,
        snapshot_total_stake: checkpoint.snapshot_total_stake,
        timestamp: now,
    });

    Ok(())
}

#[derive(Accounts)]
pub struct VoteOnCheckpoint<'info> {
    #[account(mut)]
    pub voter: Signer<'info>,

    #[account(
        seeds = [VAULT_SEED, vault.asset_mint.as_ref(), vault.authority.as_ref()],
        bump = vault.bump
    )]
    pub vault: Box<Account<'info, Vault>>,

    #[account(
        mut,
        seeds = [CHECKPOINT_SEED, vault.key().as_ref(), &checkpoint.id.to_le_bytes()],
        bump = checkpoint.bump,
        has_one = vault
    )]
    pub checkpoint: Box<Account<'info, Checkpoint>>,

    /// The voter's stake ledger in this vault
    #[account(
        seeds = [DEPOSITOR_SEED, vault.key().as_ref(), voter.key().as_ref()],
        bump = depositor.bump
    )]
    pub depositor: Box<Account<'info, DepositorAccount>>,

    /// One receipt per voter per checkpoint; a second vote fails here
    #[account(
        init,
        seeds = [VOTE_SEED, checkpoint.key().as_ref(), voter.key().as_ref()],
        bump,
        payer = voter,
        space = 8 + VoteReceipt::INIT_SPACE
    )]
    pub receipt: Box<Account<'info, VoteReceipt>>,

    pub system_program: Program<'info, System>,
}

/// Weight is the voter's stake as of the snapshot, counting only positions
/// old enough at snapshot time. Zero weight is rejected outright, never
/// silently recorded.
pub fn handle_vote_on_checkpoint(ctx: Context<VoteOnCheckpoint>, support: bool) -> Result<()> {
    let now = Clock::get()?.unix_timestamp;

    let checkpoint = &mut ctx.accounts.checkpoint;
    let weight = ctx
        .accounts
        .depositor
        .eligible_stake_at(checkpoint.snapshot_ts, ctx.accounts.vault.min_stake_age);

    checkpoint.record_vote(weight, support, now)?;

    let receipt = &mut ctx.accounts.receipt;
    receipt.checkpoint = checkpoint.key();
    receipt.voter = ctx.accounts.voter.key();
    receipt.weight = weight;
    receipt.support = support;
    receipt.bump = ctx.bumps.receipt;

    emit!(VoteCast {
        vault: ctx.accounts.vault.key(),
        checkpoint: checkpoint.id,
        voter: ctx.accounts.voter.key(),
        weight,
        support,
        timestamp: now,
    });

    Ok(())
}

#[derive(Accounts)]
pub struct FinalizeCheckpoint<'info> {
    /// Anyone may finalize once the window has ended (permissionless)
    pub caller: Signer<'info>,

    #[account(
        mut,
        seeds = [VAULT_SEED, vault.asset_mint.as_ref(), vault.authority.as_ref()],
        bump = vault.bump
    )]
    pub vault: Box<Account<'info, Vault>>,

    #[account(
        mut,
        seeds = [CHECKPOINT_SEED, vault.key().as_ref(), &checkpoint.id.to_le_bytes()],
        bump = checkpoint.bump,
        has_one = vault
    )]
    pub checkpoint: Box<Account<'info, Checkpoint>>,
}

/// Tally against the snapshot and resolve. A failed checkpoint halts
/// distribution until a later one succeeds.
pub fn handle_finalize_checkpoint(ctx: Context<FinalizeCheckpoint>) -> Result<()> {
    let now = Clock::get()?.unix_timestamp;

    let checkpoint = &mut ctx.accounts.checkpoint;
    let succeeded = checkpoint.finalize(now)?;

    ctx.accounts.vault.campaign_halted = !succeeded;

    emit!(CheckpointFinalized {
        vault: ctx.accounts.vault.key(),
        checkpoint: checkpoint.id,
        succeeded,
        votes_for: checkpoint.votes_for,
        votes_against: checkpoint.votes_against,
        snapshot_total_stake: checkpoint.snapshot_total_stake,
        timestamp: now,
    });

    Ok(())
}

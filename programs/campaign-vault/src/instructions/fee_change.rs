use anchor_lang::prelude::*;

use crate::access_types::AccessRegistry;
use crate::constants::*;
use crate::error::VaultError;
use crate::events::{FeeChangeCancelled, FeeChangeExecuted, FeeChangeProposed};
use crate::integrations::access::require_capability;
use crate::state::{FeeChangeProposal, Vault};

#[derive(Accounts)]
pub struct ProposeFeeChange<'info> {
    #[account(mut)]
    pub proposer: Signer<'info>,

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
            FEE_PROPOSAL_SEED,
            vault.key().as_ref(),
            &vault.fee_proposal_nonce.to_le_bytes()
        ],
        bump,
        payer = proposer,
        space = 8 + FeeChangeProposal::INIT_SPACE
    )]
    pub proposal: Box<Account<'info, FeeChangeProposal>>,

    pub system_program: Program<'info, System>,
}

/// Decreases and recipient changes are never harmful to depositors and
/// apply on the spot; increases are capped per proposal and queue behind
/// the timelock, so depositing ahead of a pending increase buys nothing.
pub fn handle_propose_fee_change(
    ctx: Context<ProposeFeeChange>,
    new_fee_bps: u16,
    recipient: Pubkey,
) -> Result<()> {
    let now = Clock::get()?.unix_timestamp;

    require_capability(
        &ctx.accounts.access_registry,
        &ctx.accounts.proposer.key(),
        CAP_FEE_ADMIN,
    )?;
    require!(new_fee_bps <= MAX_PROTOCOL_FEE_BPS, VaultError::FeeTooHigh);

    let vault = &mut ctx.accounts.vault;
    let nonce = vault.fee_proposal_nonce;
    vault.fee_proposal_nonce = nonce.checked_add(1).ok_or(VaultError::MathOverflow)?;

    if new_fee_bps <= vault.fee_bps {
        vault.fee_bps = new_fee_bps;
        vault.fee_recipient = recipient;

        emit!(FeeChangeProposed {
            vault: vault.key(),
            nonce,
            fee_bps: new_fee_bps,
            recipient,
            effective_ts: now,
            applied_immediately: true,
            timestamp: now,
        });

        // No pending entry to leave behind; the account rent goes back.
        ctx.accounts
            .proposal
            .close(ctx.accounts.proposer.to_account_info())?;
        return Ok(());
    }

    require!(
        new_fee_bps - vault.fee_bps <= MAX_FEE_INCREASE_BPS,
        VaultError::FeeIncreaseTooLarge
    );

    let effective_ts = now
        .checked_add(FEE_TIMELOCK_DELAY)
        .ok_or(VaultError::MathOverflow)?;

    let proposal = &mut ctx.accounts.proposal;
    proposal.vault = vault.key();
    proposal.nonce = nonce;
    proposal.fee_bps = new_fee_bps;
    proposal.recipient = recipient;
    proposal.effective_ts = effective_ts;
    proposal.proposer = ctx.accounts.proposer.key();
    proposal.bump = ctx.bumps.proposal;
    proposal._reserved = [0; 2];

    emit!(FeeChangeProposed {
        vault: vault.key(),
        nonce,
        fee_bps: new_fee_bps,
        recipient,
        effective_ts,
        applied_immediately: false,
        timestamp: now,
    });

    Ok(())
}

#[derive(Accounts)]
#[instruction(nonce: u64)]
pub struct ExecuteFeeChange<'info> {
    /// Anyone may execute a matured proposal (permissionless, so an
    /// unavailable administrator cannot censor it)
    pub executor: Signer<'info>,

    #[account(
        mut,
        seeds = [VAULT_SEED, vault.asset_mint.as_ref(), vault.authority.as_ref()],
        bump = vault.bump
    )]
    pub vault: Box<Account<'info, Vault>>,

    #[account(
        mut,
        seeds = [FEE_PROPOSAL_SEED, vault.key().as_ref(), &nonce.to_le_bytes()],
        bump = proposal.bump,
        has_one = vault,
        has_one = proposer,
        close = proposer
    )]
    pub proposal: Box<Account<'info, FeeChangeProposal>>,

    /// CHECK: Matched against the proposal's stored proposer for the rent refund
    #[account(mut)]
    pub proposer: UncheckedAccount<'info>,
}

pub fn handle_execute_fee_change(ctx: Context<ExecuteFeeChange>, nonce: u64) -> Result<()> {
    let now = Clock::get()?.unix_timestamp;

    let proposal = &ctx.accounts.proposal;
    require!(proposal.executable(now), VaultError::TimelockNotExpired);

    let vault = &mut ctx.accounts.vault;
    vault.fee_bps = proposal.fee_bps;
    vault.fee_recipient = proposal.recipient;

    emit!(FeeChangeExecuted {
        vault: vault.key(),
        nonce,
        fee_bps: proposal.fee_bps,
        recipient: proposal.recipient,
        timestamp: now,
    });

    Ok(())
}

#[derive(Accounts)]
#[instruction(nonce: u64)]
pub struct CancelFeeChange<'info> {
    pub caller: Signer<'info>,

    #[account(
        seeds = [VAULT_SEED, vault.asset_mint.as_ref(), vault.authority.as_ref()],
        bump = vault.bump
    )]
    pub vault: Box<Account<'info, Vault>>,

    #[account(address = vault.access_registry)]
    pub access_registry: Box<Account<'info, AccessRegistry>>,

    #[account(
        mut,
        seeds = [FEE_PROPOSAL_SEED, vault.key().as_ref(), &nonce.to_le_bytes()],
        bump = proposal.bump,
        has_one = vault,
        has_one = proposer,
        close = proposer
    )]
    pub proposal: Box<Account<'info, FeeChangeProposal>>,

    /// CHECK: Matched against the proposal's stored proposer for the rent refund
    #[account(mut)]
    pub proposer: UncheckedAccount<'info>,
}

pub fn handle_cancel_fee_change(ctx: Context<CancelFeeChange>, nonce: u64) -> Result<()> {
    require_capability(
        &ctx.accounts.access_registry,
        &ctx.accounts.caller.key(),
        CAP_FEE_ADMIN,
    )?;

    emit!(FeeChangeCancelled {
        vault: ctx.accounts.vault.key(),
        nonce,
        timestamp: Clock::get()?.unix_timestamp,
    });

    Ok(())
}

use anchor_lang::prelude::*;
use anchor_spl::token_interface::{
    transfer_checked, Mint, TokenAccount, TokenInterface, TransferChecked,
};

use crate::access_types::AccessRegistry;
use crate::constants::*;
use crate::error::VaultError;
use crate::events::{EmergencyPaused, EmergencyWithdrawn, Unpaused};
use crate::integrations::access::require_capability;
use crate::integrations::adapter::{adapter_total_assets, emergency_withdraw, resolve_adapter};
use crate::state::{DepositorAccount, Vault};
use crate::utils::math::convert_to_assets;
use crate::utils::pda::vault_signer_seeds;

#[derive(Accounts)]
pub struct EmergencyPause<'info> {
    pub caller: Signer<'info>,

    #[account(
        mut,
        seeds = [VAULT_SEED, vault.asset_mint.as_ref(), vault.authority.as_ref()],
        bump = vault.bump
    )]
    pub vault: Box<Account<'info, Vault>>,

    #[account(address = vault.access_registry)]
    pub access_registry: Box<Account<'info, AccessRegistry>>,

    #[account(address = vault.asset_mint)]
    pub asset_mint: Box<InterfaceAccount<'info, Mint>>,

    #[account(
        mut,
        seeds = [TREASURY_SEED, vault.key().as_ref()],
        bump,
        token::mint = asset_mint,
        token::authority = vault
    )]
    pub treasury: Box<InterfaceAccount<'info, TokenAccount>>,

    /// CHECK: Validated against the vault's configured adapter program
    pub adapter_program: Option<UncheckedAccount<'info>>,

    /// CHECK: Validated against the vault's active adapter state
    #[account(mut)]
    pub adapter_state: Option<UncheckedAccount<'info>>,

    /// CHECK: Validated against the adapter state's custody field
    #[account(mut)]
    pub adapter_custody: Option<UncheckedAccount<'info>>,

    pub token_program: Interface<'info, TokenInterface>,
}

/// Normal -> Paused(grace). Recalls adapter holdings best-effort: the
/// pause itself commits even when the adapter accounts are left out, so an
/// unresponsive adapter can never delay the halt.
pub fn handle_emergency_pause(ctx: Context<EmergencyPause>) -> Result<()> {
    let now = Clock::get()?.unix_timestamp;

    require_capability(
        &ctx.accounts.access_registry,
        &ctx.accounts.caller.key(),
        CAP_PAUSER,
    )?;
    require!(!ctx.accounts.vault.paused, VaultError::VaultPaused);

    ctx.accounts.vault.paused = true;
    ctx.accounts.vault.emergency_activated_at = now;

    let mut divested = 0u64;
    let adapter_refs = resolve_adapter(
        &ctx.accounts.vault,
        &ctx.accounts.adapter_program,
        &ctx.accounts.adapter_state,
        &ctx.accounts.adapter_custody,
    )?;
    if let Some(refs) = &adapter_refs {
        let asset_mint_key = ctx.accounts.vault.asset_mint;
        let authority_key = ctx.accounts.vault.authority;
        let bump = [ctx.accounts.vault.bump];
        let seeds = vault_signer_seeds(&asset_mint_key, &authority_key, &bump);
        let signer_seeds = &[&seeds[..]];

        ctx.accounts.vault.take_entry_latch()?;
        ctx.accounts.vault.exit(&crate::ID)?; // latch visible before the external call
        divested = emergency_withdraw(
            &refs.program,
            &refs.state,
            &refs.custody,
            &ctx.accounts.vault.to_account_info(),
            &ctx.accounts.treasury.to_account_info(),
            &ctx.accounts.asset_mint.to_account_info(),
            &ctx.accounts.token_program.to_account_info(),
            signer_seeds,
        )?;
        ctx.accounts.vault.release_entry_latch();
    }

    msg!("Emergency pause activated, recalled {} from adapter", divested);

    emit!(EmergencyPaused {
        vault: ctx.accounts.vault.key(),
        divested,
        grace_ends_at: now + EMERGENCY_GRACE_PERIOD,
        timestamp: now,
    });

    Ok(())
}

#[derive(Accounts)]
pub struct Unpause<'info> {
    pub caller: Signer<'info>,

    #[account(
        mut,
        seeds = [VAULT_SEED, vault.asset_mint.as_ref(), vault.authority.as_ref()],
        bump = vault.bump
    )]
    pub vault: Box<Account<'info, Vault>>,

    #[account(address = vault.access_registry)]
    pub access_registry: Box<Account<'info, AccessRegistry>>,
}

/// Back to Normal. Balances are untouched; idle funds get redeployed by
/// the buffer policy on the next deposit or rebalance.
pub fn handle_unpause(ctx: Context<Unpause>) -> Result<()> {
    require_capability(
        &ctx.accounts.access_registry,
        &ctx.accounts.caller.key(),
        CAP_PAUSER,
    )?;
    require!(ctx.accounts.vault.paused, VaultError::VaultNotPaused);

    ctx.accounts.vault.paused = false;
    ctx.accounts.vault.emergency_activated_at = 0;

    emit!(Unpaused {
        vault: ctx.accounts.vault.key(),
        timestamp: Clock::get()?.unix_timestamp,
    });

    Ok(())
}

#[derive(Accounts)]
pub struct EmergencyWithdrawUser<'info> {
    pub owner: Signer<'info>,

    #[account(
        mut,
        seeds = [VAULT_SEED, vault.asset_mint.as_ref(), vault.authority.as_ref()],
        bump = vault.bump
    )]
    pub vault: Box<Account<'info, Vault>>,

    #[account(
        mut,
        seeds = [DEPOSITOR_SEED, vault.key().as_ref(), owner.key().as_ref()],
        bump = depositor.bump
    )]
    pub depositor: Box<Account<'info, DepositorAccount>>,

    #[account(address = vault.asset_mint)]
    pub asset_mint: Box<InterfaceAccount<'info, Mint>>,

    /// Destination chosen by the owner
    #[account(mut, token::mint = asset_mint)]
    pub receiver_token: Box<InterfaceAccount<'info, TokenAccount>>,

    #[account(
        mut,
        seeds = [TREASURY_SEED, vault.key().as_ref()],
        bump,
        token::mint = asset_mint,
        token::authority = vault
    )]
    pub treasury: Box<InterfaceAccount<'info, TokenAccount>>,

    /// CHECK: Validated against the vault's configured adapter program
    pub adapter_program: Option<UncheckedAccount<'info>>,

    /// CHECK: Validated against the vault's active adapter state
    #[account(mut)]
    pub adapter_state: Option<UncheckedAccount<'info>>,

    /// CHECK: Validated against the adapter state's custody field
    #[account(mut)]
    pub adapter_custody: Option<UncheckedAccount<'info>>,

    pub token_program: Interface<'info, TokenInterface>,
}

/// The sole lock-bypass path for the public: once the grace window has
/// passed, burns the given shares regardless of unlock times and pays out
/// the proportional claim. Exists so an emergency pause can never trap
/// funds. The owner must sign; guardian allowances play no part here.
pub fn handle_emergency_withdraw_user(
    ctx: Context<EmergencyWithdrawUser>,
    shares: u64,
) -> Result<()> {
    let now = Clock::get()?.unix_timestamp;

    require!(ctx.accounts.vault.paused, VaultError::VaultNotPaused);
    require!(
        ctx.accounts.vault.grace_period_over(now),
        VaultError::GracePeriodActive
    );
    require!(shares > 0, VaultError::InsufficientShares);

    let adapter_refs = resolve_adapter(
        &ctx.accounts.vault,
        &ctx.accounts.adapter_program,
        &ctx.accounts.adapter_state,
        &ctx.accounts.adapter_custody,
    )?;
    let deployed = match &adapter_refs {
        Some(refs) => adapter_total_assets(&refs.state, &ctx.accounts.vault.adapter_program)?,
        None => 0,
    };

    let idle = ctx.accounts.treasury.amount;
    let total_assets = ctx.accounts.vault.total_assets(idle, deployed)?;
    let assets = convert_to_assets(shares, total_assets, ctx.accounts.vault.total_shares)?;

    ctx.accounts.depositor.consume_any(shares)?;
    ctx.accounts.vault.total_shares = ctx
        .accounts
        .vault
        .total_shares
        .checked_sub(shares)
        .ok_or(VaultError::MathOverflow)?;

    let asset_mint_key = ctx.accounts.vault.asset_mint;
    let authority_key = ctx.accounts.vault.authority;
    let bump = [ctx.accounts.vault.bump];
    let seeds = vault_signer_seeds(&asset_mint_key, &authority_key, &bump);
    let signer_seeds = &[&seeds[..]];

    // The pause-time recall normally leaves everything idle; recover any
    // stragglers the adapter still holds.
    if idle < assets {
        let refs = adapter_refs
            .as_ref()
            .ok_or(VaultError::InsufficientIdleBalance)?;

        ctx.accounts.vault.take_entry_latch()?;
        ctx.accounts.vault.exit(&crate::ID)?; // latch visible before the external call
        emergency_withdraw(
            &refs.program,
            &refs.state,
            &refs.custody,
            &ctx.accounts.vault.to_account_info(),
            &ctx.accounts.treasury.to_account_info(),
            &ctx.accounts.asset_mint.to_account_info(),
            &ctx.accounts.token_program.to_account_info(),
            signer_seeds,
        )?;
        ctx.accounts.vault.release_entry_latch();

        ctx.accounts.treasury.reload()?;
        require!(
            ctx.accounts.treasury.amount >= assets,
            VaultError::InsufficientIdleBalance
        );
    }

    transfer_checked(
        CpiContext::new_with_signer(
            ctx.accounts.token_program.to_account_info(),
            TransferChecked {
                from: ctx.accounts.treasury.to_account_info(),
                mint: ctx.accounts.asset_mint.to_account_info(),
                to: ctx.accounts.receiver_token.to_account_info(),
                authority: ctx.accounts.vault.to_account_info(),
            },
            signer_seeds,
        ),
        assets,
        ctx.accounts.asset_mint.decimals,
    )?;

    emit!(EmergencyWithdrawn {
        vault: ctx.accounts.vault.key(),
        owner: ctx.accounts.owner.key(),
        shares,
        assets,
        timestamp: now,
    });

    Ok(())
}

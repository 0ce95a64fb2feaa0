use anchor_lang::prelude::*;
use anchor_spl::token_interface::{Mint, TokenAccount, TokenInterface};

use crate::access_types::AccessRegistry;
use crate::constants::*;
use crate::error::VaultError;
use crate::events::{AdapterChanged, Rebalanced};
use crate::integrations::access::require_capability;
use crate::integrations::adapter::{
    adapter_total_assets, divest, expect_adapter, invest, read_adapter_state,
};
use crate::state::Vault;
use crate::utils::math::{buffer_target, within_slippage};
use crate::utils::pda::vault_signer_seeds;

#[derive(Accounts)]
pub struct SetAdapter<'info> {
    pub caller: Signer<'info>,

    #[account(
        mut,
        seeds = [VAULT_SEED, vault.asset_mint.as_ref(), vault.authority.as_ref()],
        bump = vault.bump
    )]
    pub vault: Box<Account<'info, Vault>>,

    #[account(address = vault.access_registry)]
    pub access_registry: Box<Account<'info, AccessRegistry>>,

    /// CHECK: Program of the incoming adapter; must be executable
    #[account(executable)]
    pub new_adapter_program: UncheckedAccount<'info>,

    /// CHECK: State account of the incoming adapter, parsed and validated
    pub new_adapter_state: UncheckedAccount<'info>,

    /// CHECK: State of the outgoing adapter, required while one is active
    pub old_adapter_state: Option<UncheckedAccount<'info>>,
}

/// Swap the active adapter. The old adapter must be fully divested first;
/// funds are never left deployed through a hot swap.
pub fn handle_set_adapter(ctx: Context<SetAdapter>) -> Result<()> {
    require_capability(
        &ctx.accounts.access_registry,
        &ctx.accounts.caller.key(),
        CAP_ADAPTER_ADMIN,
    )?;

    let vault = &mut ctx.accounts.vault;

    if vault.has_active_adapter() {
        let old_state = ctx
            .accounts
            .old_adapter_state
            .as_ref()
            .ok_or(VaultError::AdapterMismatch)?;
        require_keys_eq!(
            old_state.key(),
            vault.adapter_state,
            VaultError::AdapterMismatch
        );
        let remaining =
            adapter_total_assets(&old_state.to_account_info(), &vault.adapter_program)?;
        require!(remaining == 0, VaultError::AdapterNotDivested);
    }

    let parsed = read_adapter_state(
        &ctx.accounts.new_adapter_state.to_account_info(),
        &ctx.accounts.new_adapter_program.key(),
    )?;
    require_keys_eq!(parsed.vault, vault.key(), VaultError::AdapterMismatch);

    vault.adapter_program = ctx.accounts.new_adapter_program.key();
    vault.adapter_state = ctx.accounts.new_adapter_state.key();

    emit!(AdapterChanged {
        vault: vault.key(),
        adapter_program: vault.adapter_program,
        adapter_state: vault.adapter_state,
        timestamp: Clock::get()?.unix_timestamp,
    });

    Ok(())
}

#[derive(Accounts)]
pub struct Rebalance<'info> {
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

/// Re-apply the cash-buffer policy in either direction. Vault-initiated by
/// construction: the adapter can neither trigger nor steer it.
pub fn handle_rebalance(ctx: Context<Rebalance>) -> Result<()> {
    require_capability(
        &ctx.accounts.access_registry,
        &ctx.accounts.caller.key(),
        CAP_ADAPTER_ADMIN,
    )?;
    require!(!ctx.accounts.vault.paused, VaultError::VaultPaused);

    let refs = expect_adapter(
        &ctx.accounts.vault,
        &ctx.accounts.adapter_program,
        &ctx.accounts.adapter_state,
        &ctx.accounts.adapter_custody,
    )?;
    let deployed = adapter_total_assets(&refs.state, &ctx.accounts.vault.adapter_program)?;

    let idle = ctx.accounts.treasury.amount;
    let total_assets = ctx.accounts.vault.total_assets(idle, deployed)?;
    let target = buffer_target(
        total_assets,
        ctx.accounts.vault.cash_buffer_bps,
        ctx.accounts.vault.total_pending_yield,
    )?;

    let asset_mint_key = ctx.accounts.vault.asset_mint;
    let authority_key = ctx.accounts.vault.authority;
    let bump = [ctx.accounts.vault.bump];
    let seeds = vault_signer_seeds(&asset_mint_key, &authority_key, &bump);
    let signer_seeds = &[&seeds[..]];

    let mut invested = 0u64;
    let mut divested = 0u64;

    if idle > target {
        invested = idle - target;

        ctx.accounts.vault.take_entry_latch()?;
        ctx.accounts.vault.exit(&crate::ID)?; // latch visible before the external call
        invest(
            invested,
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
    } else if idle < target {
        let need = (target - idle).min(deployed);
        if need > 0 {
            ctx.accounts.vault.take_entry_latch()?;
            ctx.accounts.vault.exit(&crate::ID)?; // latch visible before the external call
            divested = divest(
                need,
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

            require!(
                within_slippage(need, divested, ctx.accounts.vault.slippage_bps),
                VaultError::SlippageExceeded
            );
        }
    }

    emit!(Rebalanced {
        vault: ctx.accounts.vault.key(),
        invested,
        divested,
        timestamp: Clock::get()?.unix_timestamp,
    });

    Ok(())
}

#[derive(Accounts)]
pub struct DivestAdapter<'info> {
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

/// Explicit divest, typically to wind an adapter down to zero ahead of a
/// swap.
pub fn handle_divest_adapter(ctx: Context<DivestAdapter>, amount: u64) -> Result<()> {
    require_capability(
        &ctx.accounts.access_registry,
        &ctx.accounts.caller.key(),
        CAP_ADAPTER_ADMIN,
    )?;
    require!(amount > 0, VaultError::InvalidVaultConfig);

    let refs = expect_adapter(
        &ctx.accounts.vault,
        &ctx.accounts.adapter_program,
        &ctx.accounts.adapter_state,
        &ctx.accounts.adapter_custody,
    )?;

    let asset_mint_key = ctx.accounts.vault.asset_mint;
    let authority_key = ctx.accounts.vault.authority;
    let bump = [ctx.accounts.vault.bump];
    let seeds = vault_signer_seeds(&asset_mint_key, &authority_key, &bump);
    let signer_seeds = &[&seeds[..]];

    ctx.accounts.vault.take_entry_latch()?;
    ctx.accounts.vault.exit(&crate::ID)?; // latch visible before the external call
    let returned = divest(
        amount,
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

    require!(
        within_slippage(amount, returned, ctx.accounts.vault.slippage_bps),
        VaultError::SlippageExceeded
    );

    emit!(Rebalanced {
        vault: ctx.accounts.vault.key(),
        invested: 0,
        divested: returned,
        timestamp: Clock::get()?.unix_timestamp,
    });

    Ok(())
}

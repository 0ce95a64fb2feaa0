use anchor_lang::prelude::*;
use anchor_spl::token_interface::{
    transfer_checked, Mint, TokenAccount, TokenInterface, TransferChecked,
};

use crate::access_types::AccessRegistry;
use crate::constants::*;
use crate::error::VaultError;
use crate::events::{GuardianAllowanceChanged, Redeemed};
use crate::integrations::access::require_capability;
use crate::integrations::adapter::{adapter_total_assets, divest, expect_adapter};
use crate::state::{DepositorAccount, DistributionRound, Vault};
use crate::utils::math::{convert_to_assets, within_slippage};
use crate::utils::pda::vault_signer_seeds;

#[derive(Accounts)]
pub struct ApproveGuardian<'info> {
    pub owner: Signer<'info>,

    #[account(
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
}

/// Set (not add to) the shares a guardian may force-redeem for this owner.
pub fn handle_approve_guardian(ctx: Context<ApproveGuardian>, shares: u64) -> Result<()> {
    let depositor = &mut ctx.accounts.depositor;
    depositor.guardian_allowance = shares;

    emit!(GuardianAllowanceChanged {
        vault: ctx.accounts.vault.key(),
        owner: ctx.accounts.owner.key(),
        allowance: shares,
        timestamp: Clock::get()?.unix_timestamp,
    });

    Ok(())
}

#[derive(Accounts)]
pub struct GuardianRedeem<'info> {
    pub guardian: Signer<'info>,

    #[account(
        mut,
        seeds = [VAULT_SEED, vault.asset_mint.as_ref(), vault.authority.as_ref()],
        bump = vault.bump
    )]
    pub vault: Box<Account<'info, Vault>>,

    #[account(address = vault.access_registry)]
    pub access_registry: Box<Account<'info, AccessRegistry>>,

    /// Share changes are frozen while a distribution round is open
    #[account(
        seeds = [ROUND_SEED, vault.key().as_ref()],
        bump = round.bump
    )]
    pub round: Box<Account<'info, DistributionRound>>,

    /// Ledger of the holder being redeemed on behalf of
    #[account(
        mut,
        seeds = [DEPOSITOR_SEED, vault.key().as_ref(), depositor.owner.as_ref()],
        bump = depositor.bump
    )]
    pub depositor: Box<Account<'info, DepositorAccount>>,

    #[account(address = vault.asset_mint)]
    pub asset_mint: Box<InterfaceAccount<'info, Mint>>,

    /// Proceeds always land with the position owner, never the guardian
    #[account(mut, token::mint = asset_mint, token::authority = depositor.owner)]
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

/// Lock-bypassing redemption by a guardian, bounded by the holder's
/// explicit allowance. An abuse-mitigation path, not a routine one.
pub fn handle_guardian_redeem(ctx: Context<GuardianRedeem>, shares: u64) -> Result<()> {
    let now = Clock::get()?.unix_timestamp;

    require_capability(
        &ctx.accounts.access_registry,
        &ctx.accounts.guardian.key(),
        CAP_GUARDIAN,
    )?;
    require!(
        ctx.accounts.vault.ordinary_redeem_allowed(now),
        VaultError::GracePeriodOver
    );
    require!(
        ctx.accounts.round.round_complete,
        VaultError::RoundInProgress
    );
    require!(shares > 0, VaultError::InsufficientShares);
    require!(
        shares <= ctx.accounts.depositor.guardian_allowance,
        VaultError::GuardianAllowanceExceeded
    );

    let adapter_refs = if ctx.accounts.vault.has_active_adapter() {
        Some(expect_adapter(
            &ctx.accounts.vault,
            &ctx.accounts.adapter_program,
            &ctx.accounts.adapter_state,
            &ctx.accounts.adapter_custody,
        )?)
    } else {
        None
    };
    let deployed = match &adapter_refs {
        Some(refs) => adapter_total_assets(&refs.state, &ctx.accounts.vault.adapter_program)?,
        None => 0,
    };

    let idle = ctx.accounts.treasury.amount;
    let total_assets = ctx.accounts.vault.total_assets(idle, deployed)?;
    let assets = convert_to_assets(shares, total_assets, ctx.accounts.vault.total_shares)?;

    let depositor = &mut ctx.accounts.depositor;
    depositor.consume_any(shares)?;
    depositor.guardian_allowance = depositor
        .guardian_allowance
        .checked_sub(shares)
        .ok_or(VaultError::MathOverflow)?;
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

    if idle < assets {
        let need = assets - idle;
        let refs = adapter_refs
            .as_ref()
            .ok_or(VaultError::NoActiveAdapter)?;

        ctx.accounts.vault.take_entry_latch()?;
        ctx.accounts.vault.exit(&crate::ID)?; // latch visible before the external call
        let returned = divest(
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
            within_slippage(need, returned, ctx.accounts.vault.slippage_bps),
            VaultError::SlippageExceeded
        );
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

    emit!(Redeemed {
        vault: ctx.accounts.vault.key(),
        owner: ctx.accounts.depositor.owner,
        receiver: ctx.accounts.receiver_token.key(),
        shares,
        assets,
        by_guardian: true,
        timestamp: now,
    });

    Ok(())
}

use anchor_lang::prelude::*;
use anchor_spl::token_interface::{
    transfer_checked, Mint, TokenAccount, TokenInterface, TransferChecked,
};

use crate::constants::*;
use crate::error::VaultError;
use crate::events::{AllocationChanged, PersonalYieldClaimed};
use crate::integrations::adapter::{divest, expect_adapter};
use crate::state::{DepositorAccount, Vault};
use crate::utils::math::within_slippage;
use crate::utils::pda::vault_signer_seeds;

#[derive(Accounts)]
pub struct SetAllocationPreference<'info> {
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

/// Re-point this depositor's yield split. Read at distribution time, never
/// snapshotted, so the change applies from the next round.
pub fn handle_set_allocation_preference(
    ctx: Context<SetAllocationPreference>,
    campaign_pct: u8,
    personal_beneficiary: Pubkey,
) -> Result<()> {
    require!(
        campaign_pct as u64 <= ALLOCATION_DIVISOR,
        VaultError::InvalidAllocation
    );

    let depositor = &mut ctx.accounts.depositor;
    depositor.campaign_pct = campaign_pct;
    depositor.personal_beneficiary = personal_beneficiary;

    emit!(AllocationChanged {
        vault: ctx.accounts.vault.key(),
        owner: ctx.accounts.owner.key(),
        campaign_pct,
        personal_beneficiary,
        timestamp: Clock::get()?.unix_timestamp,
    });

    Ok(())
}

#[derive(Accounts)]
pub struct ClaimPersonalYield<'info> {
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

    /// Credits are only ever paid to the named beneficiary
    #[account(mut, token::mint = asset_mint, token::authority = depositor.personal_beneficiary)]
    pub beneficiary_token: Box<InterfaceAccount<'info, TokenAccount>>,

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

/// Pay out a depositor's accrued personal-beneficiary credit. A credit is
/// a liability already excluded from total assets, so claiming works even
/// while the vault is paused.
pub fn handle_claim_personal_yield(ctx: Context<ClaimPersonalYield>) -> Result<()> {
    let now = Clock::get()?.unix_timestamp;

    let amount = ctx.accounts.depositor.pending_personal_yield;
    require!(amount > 0, VaultError::NothingToClaim);

    ctx.accounts.depositor.pending_personal_yield = 0;
    ctx.accounts.vault.total_pending_yield = ctx
        .accounts
        .vault
        .total_pending_yield
        .checked_sub(amount)
        .ok_or(VaultError::MathOverflow)?;

    let asset_mint_key = ctx.accounts.vault.asset_mint;
    let authority_key = ctx.accounts.vault.authority;
    let bump = [ctx.accounts.vault.bump];
    let seeds = vault_signer_seeds(&asset_mint_key, &authority_key, &bump);
    let signer_seeds = &[&seeds[..]];

    // The buffer policy keeps credits idle; divest only if it has drifted.
    let idle = ctx.accounts.treasury.amount;
    if idle < amount {
        let need = amount - idle;
        let refs = expect_adapter(
            &ctx.accounts.vault,
            &ctx.accounts.adapter_program,
            &ctx.accounts.adapter_state,
            &ctx.accounts.adapter_custody,
        )?;

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
            ctx.accounts.treasury.amount >= amount,
            VaultError::InsufficientIdleBalance
        );
    }

    transfer_checked(
        CpiContext::new_with_signer(
            ctx.accounts.token_program.to_account_info(),
            TransferChecked {
                from: ctx.accounts.treasury.to_account_info(),
                mint: ctx.accounts.asset_mint.to_account_info(),
                to: ctx.accounts.beneficiary_token.to_account_info(),
                authority: ctx.accounts.vault.to_account_info(),
            },
            signer_seeds,
        ),
        amount,
        ctx.accounts.asset_mint.decimals,
    )?;

    emit!(PersonalYieldClaimed {
        vault: ctx.accounts.vault.key(),
        owner: ctx.accounts.owner.key(),
        beneficiary: ctx.accounts.depositor.personal_beneficiary,
        amount,
        timestamp: now,
    });

    Ok(())
}

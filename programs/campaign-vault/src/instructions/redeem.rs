use anchor_lang::prelude::*;
use anchor_spl::token_interface::{
    transfer_checked, Mint, TokenAccount, TokenInterface, TransferChecked,
};

use crate::constants::*;
use crate::error::VaultError;
use crate::events::Redeemed;
use crate::integrations::adapter::{adapter_total_assets, divest, expect_adapter};
use crate::state::{DepositorAccount, DistributionRound, Vault};
use crate::utils::math::{convert_to_assets, within_slippage};
use crate::utils::pda::vault_signer_seeds;

#[derive(Accounts)]
pub struct Redeem<'info> {
    pub owner: Signer<'info>,

    #[account(
        mut,
        seeds = [VAULT_SEED, vault.asset_mint.as_ref(), vault.authority.as_ref()],
        bump = vault.bump
    )]
    pub vault: Box<Account<'info, Vault>>,

    /// Share changes are frozen while a distribution round is open
    #[account(
        seeds = [ROUND_SEED, vault.key().as_ref()],
        bump = round.bump
    )]
    pub round: Box<Account<'info, DistributionRound>>,

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

pub fn handle_redeem(ctx: Context<Redeem>, shares: u64) -> Result<()> {
    let now = Clock::get()?.unix_timestamp;

    // Ordinary redemption runs while unpaused and through the emergency
    // grace window; past the window only the emergency path remains.
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
        shares <= ctx.accounts.depositor.unlocked_shares(now),
        VaultError::InsufficientUnlockedShares
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

    ctx.accounts.depositor.consume_unlocked(shares, now)?;
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

    // Idle first, adapter for the shortfall.
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
        owner: ctx.accounts.owner.key(),
        receiver: ctx.accounts.receiver_token.key(),
        shares,
        assets,
        by_guardian: false,
        timestamp: now,
    });

    Ok(())
}

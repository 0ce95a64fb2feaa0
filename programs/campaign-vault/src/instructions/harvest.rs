use anchor_lang::prelude::*;
use anchor_spl::token_interface::{
    transfer_checked, Mint, TokenAccount, TokenInterface, TransferChecked,
};

use crate::campaign_types::Campaign;
use crate::constants::*;
use crate::error::VaultError;
use crate::events::{DistributionPage, RoundClosed, YieldHarvested};
use crate::integrations::adapter::{adapter_total_assets, expect_adapter, harvest};
use crate::integrations::campaign::require_campaign_active;
use crate::state::{DepositorAccount, DistributionRound, Vault};
use crate::utils::math::{
    depositor_portion, loss_within_tolerance, protocol_fee_amount, split_by_allocation,
};
use crate::utils::pda::vault_signer_seeds;

#[derive(Accounts)]
pub struct Harvest<'info> {
    /// Anyone can crank a distribution (permissionless)
    pub cranker: Signer<'info>,

    #[account(
        mut,
        seeds = [VAULT_SEED, vault.asset_mint.as_ref(), vault.authority.as_ref()],
        bump = vault.bump
    )]
    pub vault: Box<Account<'info, Vault>>,

    #[account(
        mut,
        seeds = [ROUND_SEED, vault.key().as_ref()],
        bump = round.bump
    )]
    pub round: Box<Account<'info, DistributionRound>>,

    /// Campaign registry entry this vault is linked to
    #[account(address = vault.campaign)]
    pub campaign: Box<Account<'info, Campaign>>,

    #[account(address = vault.asset_mint)]
    pub asset_mint: Box<InterfaceAccount<'info, Mint>>,

    /// The campaign's fixed payout destination
    #[account(mut, token::mint = asset_mint, token::authority = campaign.recipient)]
    pub campaign_token: Box<InterfaceAccount<'info, TokenAccount>>,

    /// Protocol fee destination
    #[account(mut, token::mint = asset_mint, token::authority = vault.fee_recipient)]
    pub fee_token: Box<InterfaceAccount<'info, TokenAccount>>,

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
    // Remaining accounts: depositor ledgers for this page
}

/// One page of the harvest crank. The opening call pulls profit from the
/// adapter, takes the protocol fee and freezes the share supply for the
/// round; every call then walks the depositor ledgers passed as remaining
/// accounts. When the last depositor is processed the division remainder
/// goes to the campaign recipient and the round closes.
pub fn handle_harvest<'info>(ctx: Context<'_, '_, 'info, 'info, Harvest<'info>>) -> Result<()> {
    let now = Clock::get()?.unix_timestamp;

    require!(!ctx.accounts.vault.paused, VaultError::VaultPaused);
    require!(
        ctx.remaining_accounts.len() as u32 <= MAX_PAGE_SIZE,
        VaultError::InvalidPagination
    );

    let asset_mint_key = ctx.accounts.vault.asset_mint;
    let authority_key = ctx.accounts.vault.authority;
    let bump = [ctx.accounts.vault.bump];
    let seeds = vault_signer_seeds(&asset_mint_key, &authority_key, &bump);
    let signer_seeds = &[&seeds[..]];

    if ctx.accounts.round.round_complete {
        // Opening a new round.
        require!(
            ctx.accounts.round.can_start(now),
            VaultError::HarvestTooEarly
        );
        // Yield never flows to a campaign governance has rejected.
        require!(
            !ctx.accounts.vault.campaign_halted,
            VaultError::CampaignHalted
        );
        require_campaign_active(&ctx.accounts.campaign)?;

        let refs = expect_adapter(
            &ctx.accounts.vault,
            &ctx.accounts.adapter_program,
            &ctx.accounts.adapter_state,
            &ctx.accounts.adapter_custody,
        )?;
        let deployed = adapter_total_assets(&refs.state, &ctx.accounts.vault.adapter_program)?;
        let total_before = ctx
            .accounts
            .vault
            .total_assets(ctx.accounts.treasury.amount, deployed)?;

        ctx.accounts.vault.take_entry_latch()?;
        ctx.accounts.vault.exit(&crate::ID)?; // latch visible before the external call
        let (profit, loss) = harvest(
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

        // A loss past tolerance aborts the whole harvest; an in-tolerance
        // loss is absorbed through the adapter's reduced total assets.
        require!(
            loss_within_tolerance(loss, total_before, ctx.accounts.vault.max_loss_bps),
            VaultError::LossExceedsTolerance
        );

        let protocol_fee = protocol_fee_amount(profit, ctx.accounts.vault.fee_bps)?;
        if protocol_fee > 0 {
            transfer_checked(
                CpiContext::new_with_signer(
                    ctx.accounts.token_program.to_account_info(),
                    TransferChecked {
                        from: ctx.accounts.treasury.to_account_info(),
                        mint: ctx.accounts.asset_mint.to_account_info(),
                        to: ctx.accounts.fee_token.to_account_info(),
                        authority: ctx.accounts.vault.to_account_info(),
                    },
                    signer_seeds,
                ),
                protocol_fee,
                ctx.accounts.asset_mint.decimals,
            )?;
        }

        ctx.accounts
            .round
            .start(now, profit, protocol_fee, ctx.accounts.vault.total_shares)?;

        emit!(YieldHarvested {
            vault: ctx.accounts.vault.key(),
            round: ctx.accounts.round.id,
            profit,
            loss,
            protocol_fee,
            timestamp: now,
        });
    }

    // Walk this page's depositor ledgers.
    let round_id = ctx.accounts.round.id;
    let net_yield = ctx.accounts.round.net_yield;
    let shares_snapshot = ctx.accounts.round.total_shares_snapshot;
    let vault_key = ctx.accounts.vault.key();

    let mut page_campaign = 0u64;
    let mut page_personal = 0u64;
    let mut page_processed = 0u32;

    for account_info in ctx.remaining_accounts.iter() {
        let mut depositor: Account<DepositorAccount> = Account::try_from(account_info)?;
        require_keys_eq!(depositor.vault, vault_key, VaultError::DepositorMismatch);
        require!(
            depositor.last_distributed_round < round_id,
            VaultError::AlreadyDistributed
        );

        let portion = depositor_portion(net_yield, depositor.shares, shares_snapshot)?;
        let (campaign_share, personal_share) =
            split_by_allocation(portion, depositor.campaign_pct)?;

        depositor.pending_personal_yield = depositor
            .pending_personal_yield
            .checked_add(personal_share)
            .ok_or(VaultError::MathOverflow)?;
        depositor.last_distributed_round = round_id;
        depositor.exit(&crate::ID)?;

        page_campaign = page_campaign
            .checked_add(campaign_share)
            .ok_or(VaultError::MathOverflow)?;
        page_personal = page_personal
            .checked_add(personal_share)
            .ok_or(VaultError::MathOverflow)?;
        page_processed += 1;

        let round = &mut ctx.accounts.round;
        round.assigned = round
            .assigned
            .checked_add(portion)
            .ok_or(VaultError::MathOverflow)?;
        round.processed = round
            .processed
            .checked_add(1)
            .ok_or(VaultError::MathOverflow)?;
    }

    ctx.accounts.vault.total_pending_yield = ctx
        .accounts
        .vault
        .total_pending_yield
        .checked_add(page_personal)
        .ok_or(VaultError::MathOverflow)?;
    let round = &mut ctx.accounts.round;
    round.total_personal_credited = round
        .total_personal_credited
        .checked_add(page_personal)
        .ok_or(VaultError::MathOverflow)?;

    if page_campaign > 0 {
        transfer_checked(
            CpiContext::new_with_signer(
                ctx.accounts.token_program.to_account_info(),
                TransferChecked {
                    from: ctx.accounts.treasury.to_account_info(),
                    mint: ctx.accounts.asset_mint.to_account_info(),
                    to: ctx.accounts.campaign_token.to_account_info(),
                    authority: ctx.accounts.vault.to_account_info(),
                },
                signer_seeds,
            ),
            page_campaign,
            ctx.accounts.asset_mint.decimals,
        )?;
        let round = &mut ctx.accounts.round;
        round.campaign_paid = round
            .campaign_paid
            .checked_add(page_campaign)
            .ok_or(VaultError::MathOverflow)?;
        round.total_campaign_distributed = round
            .total_campaign_distributed
            .checked_add(page_campaign)
            .ok_or(VaultError::MathOverflow)?;
    }

    if page_processed > 0 {
        emit!(DistributionPage {
            vault: vault_key,
            round: round_id,
            depositors_processed: page_processed,
            campaign_paid: page_campaign,
            personal_credited: page_personal,
            timestamp: now,
        });
    }

    // Last depositor processed: sweep the remainder and close the round.
    if ctx.accounts.round.processed >= ctx.accounts.vault.depositor_count {
        let remainder = ctx.accounts.round.remainder()?;
        if remainder > 0 {
            transfer_checked(
                CpiContext::new_with_signer(
                    ctx.accounts.token_program.to_account_info(),
                    TransferChecked {
                        from: ctx.accounts.treasury.to_account_info(),
                        mint: ctx.accounts.asset_mint.to_account_info(),
                        to: ctx.accounts.campaign_token.to_account_info(),
                        authority: ctx.accounts.vault.to_account_info(),
                    },
                    signer_seeds,
                ),
                remainder,
                ctx.accounts.asset_mint.decimals,
            )?;
            let round = &mut ctx.accounts.round;
            round.campaign_paid = round
                .campaign_paid
                .checked_add(remainder)
                .ok_or(VaultError::MathOverflow)?;
            round.total_campaign_distributed = round
                .total_campaign_distributed
                .checked_add(remainder)
                .ok_or(VaultError::MathOverflow)?;
        }

        ctx.accounts.round.complete()?;

        emit!(RoundClosed {
            vault: vault_key,
            round: round_id,
            net_yield,
            campaign_total: ctx.accounts.round.campaign_paid,
            remainder,
            timestamp: now,
        });
    }

    Ok(())
}

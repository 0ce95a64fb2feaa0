use anchor_lang::prelude::*;
use anchor_spl::token_interface::{
    transfer_checked, Mint, TokenAccount, TokenInterface, TransferChecked,
};

use crate::constants::*;
use crate::error::VaultError;
use crate::events::Deposited;
use crate::integrations::adapter::{adapter_total_assets, expect_adapter, invest};
use crate::state::{DepositorAccount, DistributionRound, LockProfile, Vault};
use crate::utils::math::{buffer_target, convert_to_shares};
use crate::utils::pda::vault_signer_seeds;

#[derive(Accounts)]
pub struct Deposit<'info> {
    #[account(mut)]
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
        init_if_needed,
        seeds = [DEPOSITOR_SEED, vault.key().as_ref(), owner.key().as_ref()],
        bump,
        payer = owner,
        space = 8 + DepositorAccount::INIT_SPACE
    )]
    pub depositor: Box<Account<'info, DepositorAccount>>,

    #[account(address = vault.asset_mint)]
    pub asset_mint: Box<InterfaceAccount<'info, Mint>>,

    #[account(mut, token::mint = asset_mint, token::authority = owner)]
    pub owner_token: Box<InterfaceAccount<'info, TokenAccount>>,

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
    pub system_program: Program<'info, System>,
}

pub fn handle_deposit(ctx: Context<Deposit>, amount: u64, lock_profile: LockProfile) -> Result<()> {
    let now = Clock::get()?.unix_timestamp;

    require!(!ctx.accounts.vault.paused, VaultError::VaultPaused);
    require!(
        ctx.accounts.round.round_complete,
        VaultError::RoundInProgress
    );
    require!(
        amount >= ctx.accounts.vault.min_deposit,
        VaultError::BelowMinimumDeposit
    );

    // Adapter accounts are mandatory whenever an adapter is active: both the
    // share price and the buffer policy need its reported assets.
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
    let shares = convert_to_shares(amount, total_assets, ctx.accounts.vault.total_shares)?;
    require!(shares > 0, VaultError::BelowMinimumDeposit);

    // First deposit for this wallet opens its position ledger.
    let depositor = &mut ctx.accounts.depositor;
    if depositor.owner == Pubkey::default() {
        depositor.vault = ctx.accounts.vault.key();
        depositor.owner = ctx.accounts.owner.key();
        depositor.campaign_pct = 100;
        depositor.personal_beneficiary = ctx.accounts.owner.key();
        depositor.pending_personal_yield = 0;
        depositor.last_distributed_round = ctx.accounts.round.id;
        depositor.guardian_allowance = 0;
        depositor.bump = ctx.bumps.depositor;
        depositor._reserved = [0; 4];
        ctx.accounts.vault.depositor_count = ctx
            .accounts
            .vault
            .depositor_count
            .checked_add(1)
            .ok_or(VaultError::MathOverflow)?;
    }

    transfer_checked(
        CpiContext::new(
            ctx.accounts.token_program.to_account_info(),
            TransferChecked {
                from: ctx.accounts.owner_token.to_account_info(),
                mint: ctx.accounts.asset_mint.to_account_info(),
                to: ctx.accounts.treasury.to_account_info(),
                authority: ctx.accounts.owner.to_account_info(),
            },
        ),
        amount,
        ctx.accounts.asset_mint.decimals,
    )?;

    let unlock_ts = ctx
        .accounts
        .depositor
        .push_position(shares, now, lock_profile)?;
    ctx.accounts.vault.total_shares = ctx
        .accounts
        .vault
        .total_shares
        .checked_add(shares)
        .ok_or(VaultError::MathOverflow)?;

    // Deploy everything above the buffer target into the adapter.
    if let Some(refs) = &adapter_refs {
        ctx.accounts.treasury.reload()?;
        let idle_after = ctx.accounts.treasury.amount;
        let total_after = ctx.accounts.vault.total_assets(idle_after, deployed)?;
        let target = buffer_target(
            total_after,
            ctx.accounts.vault.cash_buffer_bps,
            ctx.accounts.vault.total_pending_yield,
        )?;
        if idle_after > target {
            let excess = idle_after - target;

            let asset_mint_key = ctx.accounts.vault.asset_mint;
            let authority_key = ctx.accounts.vault.authority;
            let bump = [ctx.accounts.vault.bump];
            let seeds = vault_signer_seeds(&asset_mint_key, &authority_key, &bump);
            let signer_seeds = &[&seeds[..]];

            ctx.accounts.vault.take_entry_latch()?;
            ctx.accounts.vault.exit(&crate::ID)?; // latch visible before the external call
            invest(
                excess,
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
    }

    emit!(Deposited {
        vault: ctx.accounts.vault.key(),
        owner: ctx.accounts.owner.key(),
        assets: amount,
        shares,
        unlock_ts,
        timestamp: now,
    });

    Ok(())
}

use anchor_lang::prelude::*;
use anchor_spl::token_interface::{Mint, TokenAccount, TokenInterface};

use crate::access_types::AccessRegistry;
use crate::campaign_types::Campaign;
use crate::constants::*;
use crate::events::VaultInitialized;
use crate::state::{DistributionRound, Vault};
use crate::utils::validation::validate_vault_params;

#[derive(AnchorSerialize, AnchorDeserialize, Clone)]
pub struct InitializeVaultParams {
    pub fee_bps: u16,
    pub fee_recipient: Pubkey,
    pub cash_buffer_bps: u16,
    pub slippage_bps: u16,
    pub max_loss_bps: u16,
    pub min_deposit: u64,
    pub min_stake_age: i64,
}

#[derive(Accounts)]
pub struct InitializeVault<'info> {
    #[account(mut)]
    pub authority: Signer<'info>,

    /// The single asset this vault pools
    pub asset_mint: Box<InterfaceAccount<'info, Mint>>,

    #[account(
        init,
        seeds = [VAULT_SEED, asset_mint.key().as_ref(), authority.key().as_ref()],
        bump,
        payer = authority,
        space = 8 + Vault::INIT_SPACE
    )]
    pub vault: Box<Account<'info, Vault>>,

    /// Vault-owned treasury holding the idle balance
    #[account(
        init,
        seeds = [TREASURY_SEED, vault.key().as_ref()],
        bump,
        payer = authority,
        token::mint = asset_mint,
        token::authority = vault,
        token::token_program = token_program
    )]
    pub treasury: Box<InterfaceAccount<'info, TokenAccount>>,

    /// Authorization oracle consulted for privileged operations
    pub access_registry: Box<Account<'info, AccessRegistry>>,

    /// Campaign this vault's yield is linked to
    pub campaign: Box<Account<'info, Campaign>>,

    /// Distribution progress tracking
    #[account(
        init,
        seeds = [ROUND_SEED, vault.key().as_ref()],
        bump,
        payer = authority,
        space = 8 + DistributionRound::INIT_SPACE
    )]
    pub round: Box<Account<'info, DistributionRound>>,

    pub token_program: Interface<'info, TokenInterface>,
    pub system_program: Program<'info, System>,
}

pub fn handle_initialize_vault(
    ctx: Context<InitializeVault>,
    params: InitializeVaultParams,
) -> Result<()> {
    validate_vault_params(&params)?;

    let now = Clock::get()?.unix_timestamp;

    let vault = &mut ctx.accounts.vault;
    vault.authority = ctx.accounts.authority.key();
    vault.asset_mint = ctx.accounts.asset_mint.key();
    vault.treasury = ctx.accounts.treasury.key();
    vault.access_registry = ctx.accounts.access_registry.key();
    vault.campaign = ctx.accounts.campaign.key();
    vault.adapter_program = Pubkey::default();
    vault.adapter_state = Pubkey::default();
    vault.total_shares = 0;
    vault.total_pending_yield = 0;
    vault.fee_bps = params.fee_bps;
    vault.fee_recipient = params.fee_recipient;
    vault.cash_buffer_bps = params.cash_buffer_bps;
    vault.slippage_bps = params.slippage_bps;
    vault.max_loss_bps = params.max_loss_bps;
    vault.min_deposit = params.min_deposit;
    vault.min_stake_age = params.min_stake_age;
    vault.fee_proposal_nonce = 0;
    vault.checkpoint_count = 0;
    vault.depositor_count = 0;
    vault.campaign_halted = false;
    vault.paused = false;
    vault.emergency_activated_at = 0;
    vault.entered = false;
    vault.bump = ctx.bumps.vault;
    vault.created_at = now;
    vault._reserved = [0; 8];

    let round = &mut ctx.accounts.round;
    round.vault = vault.key();
    round.id = 0;
    round.started_at = 0;
    round.round_complete = true; // Start closed so the first harvest can open a round
    round.total_shares_snapshot = 0;
    round.gross_profit = 0;
    round.protocol_fee = 0;
    round.net_yield = 0;
    round.assigned = 0;
    round.campaign_paid = 0;
    round.processed = 0;
    round.total_rounds = 0;
    round.total_campaign_distributed = 0;
    round.total_personal_credited = 0;
    round.total_protocol_fees = 0;
    round.bump = ctx.bumps.round;
    round._reserved = [0; 4];

    emit!(VaultInitialized {
        vault: vault.key(),
        asset_mint: vault.asset_mint,
        authority: vault.authority,
        campaign: vault.campaign,
        fee_bps: vault.fee_bps,
        timestamp: now,
    });

    Ok(())
}

use anchor_lang::prelude::*;
use anchor_lang::solana_program::{instruction::AccountMeta, program::invoke_signed};
use anchor_spl::token_interface::TokenAccount;

use crate::adapter_types::AdapterState;
use crate::error::VaultError;

/// Read the treasury balance straight from the account data so deltas
/// across a CPI are observed, not trusted.
fn token_balance(token_account: &AccountInfo) -> Result<u64> {
    let account = TokenAccount::try_deserialize(&mut token_account.try_borrow_data()?.as_ref())?;
    Ok(account.amount)
}

/// Deserialize the adapter's state account, verifying it is owned by the
/// vault's configured adapter program.
pub fn read_adapter_state(
    adapter_state: &AccountInfo,
    expected_program: &Pubkey,
) -> Result<AdapterState> {
    require_keys_eq!(
        *adapter_state.owner,
        *expected_program,
        VaultError::AdapterMismatch
    );
    let data = adapter_state.try_borrow_data()?;
    AdapterState::try_deserialize(&mut data.as_ref())
}

/// Assets the active adapter currently reports as deployed.
pub fn adapter_total_assets(
    adapter_state: &AccountInfo,
    expected_program: &Pubkey,
) -> Result<u64> {
    Ok(read_adapter_state(adapter_state, expected_program)?.total_assets)
}

/// The three accounts every adapter call needs, resolved against the
/// vault's configured adapter.
pub struct AdapterRefs<'info> {
    pub program: AccountInfo<'info>,
    pub state: AccountInfo<'info>,
    pub custody: AccountInfo<'info>,
}

/// Match optionally supplied adapter accounts against the vault's active
/// adapter. Returns None when no adapter is configured or the caller left
/// the accounts out (best-effort paths tolerate that; strict paths use
/// `expect_adapter`).
pub fn resolve_adapter<'info>(
    vault: &crate::state::Vault,
    program: &Option<UncheckedAccount<'info>>,
    state: &Option<UncheckedAccount<'info>>,
    custody: &Option<UncheckedAccount<'info>>,
) -> Result<Option<AdapterRefs<'info>>> {
    if !vault.has_active_adapter() {
        return Ok(None);
    }
    let (program, state, custody) = match (program, state, custody) {
        (Some(p), Some(s), Some(c)) => (p, s, c),
        _ => return Ok(None),
    };
    require_keys_eq!(
        program.key(),
        vault.adapter_program,
        VaultError::AdapterMismatch
    );
    require_keys_eq!(state.key(), vault.adapter_state, VaultError::AdapterMismatch);
    let parsed = read_adapter_state(&state.to_account_info(), &vault.adapter_program)?;
    require_keys_eq!(custody.key(), parsed.custody, VaultError::AdapterMismatch);
    Ok(Some(AdapterRefs {
        program: program.to_account_info(),
        state: state.to_account_info(),
        custody: custody.to_account_info(),
    }))
}

/// As `resolve_adapter`, but the adapter must be configured and the
/// accounts must be supplied.
pub fn expect_adapter<'info>(
    vault: &crate::state::Vault,
    program: &Option<UncheckedAccount<'info>>,
    state: &Option<UncheckedAccount<'info>>,
    custody: &Option<UncheckedAccount<'info>>,
) -> Result<AdapterRefs<'info>> {
    require!(vault.has_active_adapter(), VaultError::NoActiveAdapter);
    match resolve_adapter(vault, program, state, custody)? {
        Some(refs) => Ok(refs),
        None => Err(error!(VaultError::AdapterMismatch)),
    }
}

fn adapter_instruction<'info>(
    discriminator: [u8; 8],
    amount: Option<u64>,
    adapter_program: &AccountInfo<'info>,
    adapter_state: &AccountInfo<'info>,
    custody: &AccountInfo<'info>,
    vault_authority: &AccountInfo<'info>,
    treasury: &AccountInfo<'info>,
    mint: &AccountInfo<'info>,
    token_program: &AccountInfo<'info>,
    signer_seeds: &[&[&[u8]]],
) -> Result<()> {
    let mut data = discriminator.to_vec();
    if let Some(amount) = amount {
        data.extend_from_slice(&amount.to_le_bytes());
    }

    invoke_signed(
        &anchor_lang::solana_program::instruction::Instruction {
            program_id: adapter_program.key(),
            accounts: vec![
                AccountMeta::new(adapter_state.key(), false),
                AccountMeta::new_readonly(vault_authority.key(), true), // vault PDA signs
                AccountMeta::new(treasury.key(), false),
                AccountMeta::new(custody.key(), false),
                AccountMeta::new_readonly(mint.key(), false),
                AccountMeta::new_readonly(token_program.key(), false),
            ],
            data,
        },
        &[
            adapter_state.clone(),
            vault_authority.clone(),
            treasury.clone(),
            custody.clone(),
            mint.clone(),
            token_program.clone(),
        ],
        signer_seeds,
    )?;
    Ok(())
}

/// Move `amount` from the treasury into the adapter. The adapter executes
/// the transfer with the vault PDA's pass-through signature; the observed
/// treasury delta must match the request exactly.
pub fn invest<'info>(
    amount: u64,
    adapter_program: &AccountInfo<'info>,
    adapter_state: &AccountInfo<'info>,
    custody: &AccountInfo<'info>,
    vault_authority: &AccountInfo<'info>,
    treasury: &AccountInfo<'info>,
    mint: &AccountInfo<'info>,
    token_program: &AccountInfo<'info>,
    signer_seeds: &[&[&[u8]]],
) -> Result<()> {
    let before = token_balance(treasury)?;

    // Discriminator from SHA256("global:invest")[0..8]
    adapter_instruction(
        [13, 245, 180, 103, 254, 182, 121, 4],
        Some(amount),
        adapter_program,
        adapter_state,
        custody,
        vault_authority,
        treasury,
        mint,
        token_program,
        signer_seeds,
    )?;

    let after = token_balance(treasury)?;
    let moved = before.checked_sub(after).ok_or(VaultError::MathOverflow)?;
    require_eq!(moved, amount, VaultError::AdapterMismatch);
    Ok(())
}

/// Pull `amount` back from the adapter. Returns what actually arrived;
/// the caller decides whether the shortfall is tolerable.
pub fn divest<'info>(
    amount: u64,
    adapter_program: &AccountInfo<'info>,
    adapter_state: &AccountInfo<'info>,
    custody: &AccountInfo<'info>,
    vault_authority: &AccountInfo<'info>,
    treasury: &AccountInfo<'info>,
    mint: &AccountInfo<'info>,
    token_program: &AccountInfo<'info>,
    signer_seeds: &[&[&[u8]]],
) -> Result<u64> {
    let before = token_balance(treasury)?;

    // Discriminator from SHA256("global:divest")[0..8]
    adapter_instruction(
        [196, 19, 245, 104, 6, 82, 109, 77],
        Some(amount),
        adapter_program,
        adapter_state,
        custody,
        vault_authority,
        treasury,
        mint,
        token_program,
        signer_seeds,
    )?;

    let after = token_balance(treasury)?;
    after.checked_sub(before).ok_or_else(|| error!(VaultError::MathOverflow))
}

/// Ask the adapter to realize yield since the last call. Profit is the
/// observed treasury delta; the loss is whatever the adapter reports on
/// its state account after the call.
pub fn harvest<'info>(
    adapter_program: &AccountInfo<'info>,
    adapter_state: &AccountInfo<'info>,
    custody: &AccountInfo<'info>,
    vault_authority: &AccountInfo<'info>,
    treasury: &AccountInfo<'info>,
    mint: &AccountInfo<'info>,
    token_program: &AccountInfo<'info>,
    signer_seeds: &[&[&[u8]]],
) -> Result<(u64, u64)> {
    let before = token_balance(treasury)?;

    // Discriminator from SHA256("global:harvest")[0..8]
    adapter_instruction(
        [228, 241, 31, 182, 53, 169, 59, 199],
        None,
        adapter_program,
        adapter_state,
        custody,
        vault_authority,
        treasury,
        mint,
        token_program,
        signer_seeds,
    )?;

    let after = token_balance(treasury)?;
    let profit = after.checked_sub(before).ok_or(VaultError::MathOverflow)?;
    let loss = read_adapter_state(adapter_state, &adapter_program.key())?.last_loss;
    Ok((profit, loss))
}

/// Pull everything the adapter holds back into the treasury. No slippage
/// bound: in an emergency whatever comes back is better than nothing.
pub fn emergency_withdraw<'info>(
    adapter_program: &AccountInfo<'info>,
    adapter_state: &AccountInfo<'info>,
    custody: &AccountInfo<'info>,
    vault_authority: &AccountInfo<'info>,
    treasury: &AccountInfo<'info>,
    mint: &AccountInfo<'info>,
    token_program: &AccountInfo<'info>,
    signer_seeds: &[&[&[u8]]],
) -> Result<u64> {
    let before = token_balance(treasury)?;

    // Discriminator from SHA256("global:emergency_withdraw")[0..8]
    adapter_instruction(
        [239, 45, 203, 64, 150, 73, 218, 92],
        None,
        adapter_program,
        adapter_state,
        custody,
        vault_authority,
        treasury,
        mint,
        token_program,
        signer_seeds,
    )?;

    let after = token_balance(treasury)?;
    after.checked_sub(before).ok_or_else(|| error!(VaultError::MathOverflow))
}

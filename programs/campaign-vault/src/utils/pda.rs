use anchor_lang::prelude::*;

use crate::constants::*;

/// Derive the vault PDA
pub fn derive_vault_pda(
    asset_mint: &Pubkey,
    authority: &Pubkey,
    program_id: &Pubkey,
) -> (Pubkey, u8) {
    Pubkey::find_program_address(
        &[VAULT_SEED, asset_mint.as_ref(), authority.as_ref()],
        program_id,
    )
}

/// Derive the treasury token account PDA
pub fn derive_treasury_pda(vault: &Pubkey, program_id: &Pubkey) -> (Pubkey, u8) {
    Pubkey::find_program_address(&[TREASURY_SEED, vault.as_ref()], program_id)
}

/// Derive a depositor's position-ledger PDA
pub fn derive_depositor_pda(
    vault: &Pubkey,
    owner: &Pubkey,
    program_id: &Pubkey,
) -> (Pubkey, u8) {
    Pubkey::find_program_address(
        &[DEPOSITOR_SEED, vault.as_ref(), owner.as_ref()],
        program_id,
    )
}

/// Derive the distribution round PDA
pub fn derive_round_pda(vault: &Pubkey, program_id: &Pubkey) -> (Pubkey, u8) {
    Pubkey::find_program_address(&[ROUND_SEED, vault.as_ref()], program_id)
}

/// Derive a fee-change proposal PDA by nonce
pub fn derive_fee_proposal_pda(
    vault: &Pubkey,
    nonce: u64,
    program_id: &Pubkey,
) -> (Pubkey, u8) {
    Pubkey::find_program_address(
        &[FEE_PROPOSAL_SEED, vault.as_ref(), &nonce.to_le_bytes()],
        program_id,
    )
}

/// Derive a checkpoint PDA by id
pub fn derive_checkpoint_pda(vault: &Pubkey, id: u64, program_id: &Pubkey) -> (Pubkey, u8) {
    Pubkey::find_program_address(
        &[CHECKPOINT_SEED, vault.as_ref(), &id.to_le_bytes()],
        program_id,
    )
}

/// Generate signer seeds for the vault PDA
pub fn vault_signer_seeds<'a>(
    asset_mint: &'a Pubkey,
    authority: &'a Pubkey,
    bump: &'a [u8; 1],
) -> [&'a [u8]; 4] {
    [VAULT_SEED, asset_mint.as_ref(), authority.as_ref(), bump]
}

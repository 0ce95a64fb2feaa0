use anchor_lang::prelude::*;

use crate::constants::*;
use crate::error::VaultError;
use crate::instructions::InitializeVaultParams;

/// Bounds-check every configuration knob before the vault exists.
pub fn validate_vault_params(params: &InitializeVaultParams) -> Result<()> {
    require!(
        params.fee_bps <= MAX_PROTOCOL_FEE_BPS,
        VaultError::FeeTooHigh
    );
    require!(
        params.cash_buffer_bps as u64 <= BASIS_POINTS_DIVISOR,
        VaultError::InvalidVaultConfig
    );
    require!(
        params.slippage_bps as u64 <= BASIS_POINTS_DIVISOR,
        VaultError::InvalidVaultConfig
    );
    require!(
        params.max_loss_bps as u64 <= BASIS_POINTS_DIVISOR,
        VaultError::InvalidVaultConfig
    );
    require!(params.min_deposit > 0, VaultError::InvalidVaultConfig);
    require!(
        params.min_stake_age >= MIN_STAKE_AGE_FLOOR
            && params.min_stake_age <= MIN_STAKE_AGE_CEILING,
        VaultError::InvalidVaultConfig
    );
    Ok(())
}

/// Windows of a checkpoint must be ordered: start < end <= deadline, with
/// the start not already in the past at scheduling time.
pub fn validate_checkpoint_window(
    now: i64,
    window_start: i64,
    window_end: i64,
    execution_deadline: i64,
    quorum_bps: u16,
) -> Result<()> {
    require!(window_start >= now, VaultError::InvalidCheckpointWindow);
    require!(window_end > window_start, VaultError::InvalidCheckpointWindow);
    require!(
        execution_deadline >= window_end,
        VaultError::InvalidCheckpointWindow
    );
    require!(
        quorum_bps as u64 <= BASIS_POINTS_DIVISOR,
        VaultError::InvalidVaultConfig
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn checkpoint_window_ordering() {
        assert!(validate_checkpoint_window(0, 100, 200, 300, 2_000).is_ok());
        assert!(validate_checkpoint_window(0, 100, 200, 200, 2_000).is_ok());
        // start in the past
        assert!(validate_checkpoint_window(150, 100, 200, 300, 2_000).is_err());
        // end before start
        assert!(validate_checkpoint_window(0, 200, 100, 300, 2_000).is_err());
        // deadline before end
        assert!(validate_checkpoint_window(0, 100, 200, 150, 2_000).is_err());
        // quorum above 100%
        assert!(validate_checkpoint_window(0, 100, 200, 300, 10_001).is_err());
    }
}

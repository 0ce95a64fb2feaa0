use anchor_lang::prelude::*;

use crate::access_types::AccessRegistry;
use crate::error::VaultError;

/// Gate a privileged operation on the authorization oracle's answer.
pub fn require_capability(
    registry: &Account<AccessRegistry>,
    principal: &Pubkey,
    capability: u8,
) -> Result<()> {
    require!(
        registry.has_capability(principal, capability),
        VaultError::NotAuthorized
    );
    Ok(())
}

use anchor_lang::prelude::*;

use crate::campaign_types::Campaign;
use crate::error::VaultError;

/// Yield may only flow to a campaign the registry still reports as active.
pub fn require_campaign_active(campaign: &Account<Campaign>) -> Result<()> {
    require!(campaign.is_active(), VaultError::CampaignInactive);
    Ok(())
}

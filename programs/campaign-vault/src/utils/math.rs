use anchor_lang::prelude::*;

use crate::constants::*;
use crate::error::VaultError;

/// Assets -> shares at the current share price, rounding down so a deposit
/// can never mint more than its proportional entitlement. 1:1 bootstrap
/// while the supply is zero.
pub fn convert_to_shares(assets: u64, total_assets: u64, total_shares: u64) -> Result<u64> {
    if total_shares == 0 {
        return Ok(assets);
    }
    // An empty pool with outstanding shares would make deposits worthless.
    require!(total_assets > 0, VaultError::MathOverflow);

    (assets as u128)
        .checked_mul(total_shares as u128)
        .ok_or(VaultError::MathOverflow)?
        .checked_div(total_assets as u128)
        .ok_or(VaultError::MathOverflow)?
        .try_into()
        .map_err(|_| VaultError::MathOverflow.into())
}

/// Shares -> assets, rounding down in the vault's favor.
pub fn convert_to_assets(shares: u64, total_assets: u64, total_shares: u64) -> Result<u64> {
    if total_shares == 0 {
        return Ok(0);
    }

    (shares as u128)
        .checked_mul(total_assets as u128)
        .ok_or(VaultError::MathOverflow)?
        .checked_div(total_shares as u128)
        .ok_or(VaultError::MathOverflow)?
        .try_into()
        .map_err(|_| VaultError::MathOverflow.into())
}

/// Protocol fee on harvested profit: ceil(profit * fee_bps / 10000),
/// rounding in the protocol's favor.
pub fn protocol_fee_amount(profit: u64, fee_bps: u16) -> Result<u64> {
    let numerator = (profit as u128)
        .checked_mul(fee_bps as u128)
        .ok_or(VaultError::MathOverflow)?;
    let fee = numerator
        .checked_add(BASIS_POINTS_DIVISOR as u128 - 1)
        .ok_or(VaultError::MathOverflow)?
        / (BASIS_POINTS_DIVISOR as u128);
    fee.try_into().map_err(|_| VaultError::MathOverflow.into())
}

/// A depositor's slice of the round's net yield, weighted by their shares
/// against the round's supply snapshot.
pub fn depositor_portion(net_yield: u64, shares: u64, total_shares: u64) -> Result<u64> {
    if total_shares == 0 {
        return Ok(0);
    }

    (net_yield as u128)
        .checked_mul(shares as u128)
        .ok_or(VaultError::MathOverflow)?
        .checked_div(total_shares as u128)
        .ok_or(VaultError::MathOverflow)?
        .try_into()
        .map_err(|_| VaultError::MathOverflow.into())
}

/// Split a depositor's portion by their allocation preference. The campaign
/// side rounds down; the personal side absorbs the difference so nothing is
/// dropped.
pub fn split_by_allocation(portion: u64, campaign_pct: u8) -> Result<(u64, u64)> {
    require!(
        campaign_pct as u64 <= ALLOCATION_DIVISOR,
        VaultError::InvalidAllocation
    );
    let campaign = (portion as u128)
        .checked_mul(campaign_pct as u128)
        .ok_or(VaultError::MathOverflow)?
        / (ALLOCATION_DIVISOR as u128);
    let campaign: u64 = campaign.try_into().map_err(|_| VaultError::MathOverflow)?;
    let personal = portion
        .checked_sub(campaign)
        .ok_or(VaultError::MathOverflow)?;
    Ok((campaign, personal))
}

/// Idle balance the buffer policy wants on hand: the configured fraction of
/// total assets plus everything already owed to personal beneficiaries.
pub fn buffer_target(
    total_assets: u64,
    cash_buffer_bps: u16,
    pending_yield: u64,
) -> Result<u64> {
    let buffer = (total_assets as u128)
        .checked_mul(cash_buffer_bps as u128)
        .ok_or(VaultError::MathOverflow)?
        / (BASIS_POINTS_DIVISOR as u128);
    let buffer: u64 = buffer.try_into().map_err(|_| VaultError::MathOverflow)?;
    buffer
        .checked_add(pending_yield)
        .ok_or_else(|| error!(VaultError::MathOverflow))
}

/// Whether a divest came back within tolerance of the request.
pub fn within_slippage(requested: u64, returned: u64, slippage_bps: u16) -> bool {
    let diff = requested.abs_diff(returned);
    (diff as u128) * (BASIS_POINTS_DIVISOR as u128)
        <= (requested as u128) * (slippage_bps as u128)
}

/// Whether a harvest loss stays inside the max-loss tolerance, measured
/// against total assets before the harvest.
pub fn loss_within_tolerance(loss: u64, total_assets: u64, max_loss_bps: u16) -> bool {
    (loss as u128) * (BASIS_POINTS_DIVISOR as u128)
        <= (total_assets as u128) * (max_loss_bps as u128)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn share_conversion_bootstraps_one_to_one() {
        assert_eq!(convert_to_shares(1_000, 0, 0).unwrap(), 1_000);
        assert_eq!(convert_to_assets(0, 0, 0).unwrap(), 0);
    }

    #[test]
    fn share_conversion_rounds_toward_the_vault() {
        // Price 3/2: 100 assets buy floor(100 * 2 / 3) = 66 shares.
        assert_eq!(convert_to_shares(100, 3, 2).unwrap(), 66);
        // Those 66 shares redeem floor(66 * 3 / 2) = 99 assets, never 100.
        assert_eq!(convert_to_assets(66, 3, 2).unwrap(), 99);
    }

    #[test]
    fn fee_rounds_up_in_protocol_favor() {
        // ceil(1000 * 250 / 10000) = 25
        assert_eq!(protocol_fee_amount(1_000, 250).unwrap(), 25);
        // ceil(999 * 250 / 10000) = ceil(24.975) = 25
        assert_eq!(protocol_fee_amount(999, 250).unwrap(), 25);
        assert_eq!(protocol_fee_amount(0, 250).unwrap(), 0);
    }

    #[test]
    fn many_small_harvests_never_undercut_one_large_one() {
        let total: u64 = 10_000;
        let fee_bps = 250;
        let one_shot = protocol_fee_amount(total, fee_bps).unwrap();
        let dribbled: u64 = (0..100)
            .map(|_| protocol_fee_amount(total / 100, fee_bps).unwrap())
            .sum();
        assert!(dribbled >= one_shot);
    }

    #[test]
    fn allocation_split_conserves_the_portion() {
        // The worked example: 975 net, whole pool, 50% to campaign.
        let portion = depositor_portion(975, 1_000, 1_000).unwrap();
        assert_eq!(portion, 975);
        let (campaign, personal) = split_by_allocation(portion, 50).unwrap();
        assert_eq!(campaign, 487);
        assert_eq!(personal, 488);

        let (campaign, personal) = split_by_allocation(portion, 0).unwrap();
        assert_eq!((campaign, personal), (0, 975));
        let (campaign, personal) = split_by_allocation(portion, 100).unwrap();
        assert_eq!((campaign, personal), (975, 0));
        assert!(split_by_allocation(portion, 101).is_err());
    }

    #[test]
    fn pro_rata_portions_never_exceed_the_pool() {
        let net = 977;
        let shares = [333u64, 333, 334];
        let total: u64 = shares.iter().sum();
        let assigned: u64 = shares
            .iter()
            .map(|s| depositor_portion(net, *s, total).unwrap())
            .sum();
        assert!(assigned <= net);
    }

    #[test]
    fn buffer_target_includes_pending_liabilities() {
        // 10% of 10_000 plus 300 owed.
        assert_eq!(buffer_target(10_000, 1_000, 300).unwrap(), 1_300);
        assert_eq!(buffer_target(10_000, 0, 0).unwrap(), 0);
    }

    #[test]
    fn slippage_window_is_symmetric() {
        assert!(within_slippage(10_000, 10_000, 0));
        assert!(within_slippage(10_000, 9_950, 50));
        assert!(!within_slippage(10_000, 9_949, 50));
        assert!(within_slippage(10_000, 10_050, 50));
        assert!(!within_slippage(10_000, 10_051, 50));
    }

    #[test]
    fn loss_tolerance_is_checked_against_total_assets() {
        assert!(loss_within_tolerance(500, 10_000, 500));
        assert!(!loss_within_tolerance(501, 10_000, 500));
        assert!(loss_within_tolerance(0, 0, 0));
    }
}

/// Yield-adapter types matching the adapter program's state layout.
/// Mirrored locally so the vault consumes the adapter through a typed,
/// read-only view plus CPI, without importing the adapter crate.
use anchor_lang::prelude::*;

/// State account every yield adapter exposes to its owning vault.
#[derive(AnchorSerialize, AnchorDeserialize, Clone)]
pub struct AdapterState {
    /// The vault allowed to drive this adapter
    pub vault: Pubkey,
    /// Token account where the adapter holds deployed assets
    pub custody: Pubkey,
    /// Assets currently deployed, as reported by the adapter
    pub total_assets: u64,
    /// Profit realized by the most recent harvest
    pub last_profit: u64,
    /// Loss realized by the most recent harvest
    pub last_loss: u64,
    /// Unix time of the most recent harvest
    pub last_harvest_ts: i64,
    /// Lifetime counters, fixed raw block
    pub metrics: AdapterMetrics,
    /// padding for future usage
    pub padding: [u64; 8],
}

#[derive(
    AnchorSerialize, AnchorDeserialize, Clone, Copy, Default, bytemuck::Pod, bytemuck::Zeroable,
)]
#[repr(C)]
pub struct AdapterMetrics {
    pub total_invested: u64,
    pub total_divested: u64,
    pub total_profit: u64,
    pub total_loss: u64,
}

impl Default for AdapterState {
    fn default() -> Self {
        Self {
            vault: Pubkey::default(),
            custody: Pubkey::default(),
            total_assets: 0,
            last_profit: 0,
            last_loss: 0,
            last_harvest_ts: 0,
            metrics: AdapterMetrics::default(),
            padding: [0; 8],
        }
    }
}

// Reference adapter program ID
declare_id!("4fwU3TZoLVAbrSfA5FApeHtu6xbK4MH3ZxzQzjZAbTtM");

/// Program struct for CPI
pub struct YieldAdapter;

impl anchor_lang::Id for YieldAdapter {
    fn id() -> Pubkey {
        ID
    }
}

// Manual Owner implementation for the external program ID
impl anchor_lang::Owner for AdapterState {
    fn owner() -> Pubkey {
        ID
    }
}

impl anchor_lang::AccountSerialize for AdapterState {
    fn try_serialize<W: std::io::Write>(&self, writer: &mut W) -> anchor_lang::Result<()> {
        AnchorSerialize::serialize(self, writer).map_err(Into::into)
    }
}

impl anchor_lang::AccountDeserialize for AdapterState {
    fn try_deserialize(buf: &mut &[u8]) -> anchor_lang::Result<Self> {
        if buf.len() < 8 {
            return Err(ErrorCode::AccountDidNotDeserialize.into());
        }
        let mut data: &[u8] = &buf[8..];
        AdapterState::deserialize(&mut data)
            .map_err(|_| ErrorCode::AccountDidNotDeserialize.into())
    }

    fn try_deserialize_unchecked(buf: &mut &[u8]) -> anchor_lang::Result<Self> {
        let mut data: &[u8] = &buf[8..];
        AdapterState::deserialize(&mut data)
            .map_err(|_| ErrorCode::AccountDidNotDeserialize.into())
    }
}

// Discriminator from SHA256("account:AdapterState")[0..8]
impl anchor_lang::Discriminator for AdapterState {
    const DISCRIMINATOR: [u8; 8] = [88, 130, 126, 170, 183, 106, 151, 212];
}

/// Campaign-registry types. The registry resolves a vault's campaign to
/// its lifecycle status and the fixed recipient its yield share is paid to.
use anchor_lang::prelude::*;

pub const CAMPAIGN_STATUS_ACTIVE: u8 = 0;
pub const CAMPAIGN_STATUS_COMPLETED: u8 = 1;
pub const CAMPAIGN_STATUS_CANCELLED: u8 = 2;

#[derive(AnchorSerialize, AnchorDeserialize, Clone)]
pub struct Campaign {
    pub authority: Pubkey,
    /// Fixed wallet the campaign's yield share is paid to
    pub recipient: Pubkey,
    /// 0 active, 1 completed, 2 cancelled
    pub status: u8,
    pub created_at: i64,
    /// padding for future usage
    pub padding: [u8; 32],
}

impl Campaign {
    pub fn is_active(&self) -> bool {
        self.status == CAMPAIGN_STATUS_ACTIVE
    }
}

impl Default for Campaign {
    fn default() -> Self {
        Self {
            authority: Pubkey::default(),
            recipient: Pubkey::default(),
            status: CAMPAIGN_STATUS_ACTIVE,
            created_at: 0,
            padding: [0; 32],
        }
    }
}

// Campaign-registry program ID
declare_id!("B99ewMq7NvEYmj31dstyjeMUtKSg6SaJrUDJ1oJBNFox");

/// Program struct for account validation
pub struct CampaignRegistry;

impl anchor_lang::Id for CampaignRegistry {
    fn id() -> Pubkey {
        ID
    }
}

impl anchor_lang::Owner for Campaign {
    fn owner() -> Pubkey {
        ID
    }
}

impl anchor_lang::AccountSerialize for Campaign {
    fn try_serialize<W: std::io::Write>(&self, writer: &mut W) -> anchor_lang::Result<()> {
        AnchorSerialize::serialize(self, writer).map_err(Into::into)
    }
}

impl anchor_lang::AccountDeserialize for Campaign {
    fn try_deserialize(buf: &mut &[u8]) -> anchor_lang::Result<Self> {
        if buf.len() < 8 {
            return Err(ErrorCode::AccountDidNotDeserialize.into());
        }
        let mut data: &[u8] = &buf[8..];
        Campaign::deserialize(&mut data).map_err(|_| ErrorCode::AccountDidNotDeserialize.into())
    }

    fn try_deserialize_unchecked(buf: &mut &[u8]) -> anchor_lang::Result<Self> {
        let mut data: &[u8] = &buf[8..];
        Campaign::deserialize(&mut data).map_err(|_| ErrorCode::AccountDidNotDeserialize.into())
    }
}

// Discriminator from SHA256("account:Campaign")[0..8]
impl anchor_lang::Discriminator for Campaign {
    const DISCRIMINATOR: [u8; 8] = [50, 40, 49, 11, 157, 220, 229, 192];
}

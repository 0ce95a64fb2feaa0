/// Authorization-oracle types. The registry program owns a single account
/// listing which principal holds which capability; the vault only ever
/// asks "does principal P hold capability C".
use anchor_lang::prelude::*;

#[derive(AnchorSerialize, AnchorDeserialize, Clone, Copy)]
pub struct CapabilityGrant {
    pub principal: Pubkey,
    pub capability: u8,
}

#[derive(AnchorSerialize, AnchorDeserialize, Clone)]
pub struct AccessRegistry {
    pub authority: Pubkey,
    pub grants: Vec<CapabilityGrant>,
}

impl AccessRegistry {
    pub fn has_capability(&self, principal: &Pubkey, capability: u8) -> bool {
        self.grants
            .iter()
            .any(|g| g.principal == *principal && g.capability == capability)
    }
}

impl Default for AccessRegistry {
    fn default() -> Self {
        Self {
            authority: Pubkey::default(),
            grants: Vec::new(),
        }
    }
}

// Access-registry program ID
declare_id!("7rF5wtZNUAGvrFomjZw9wEACojDwvCKyRnbi5ii1vHsL");

/// Program struct for account validation
pub struct AccessOracle;

impl anchor_lang::Id for AccessOracle {
    fn id() -> Pubkey {
        ID
    }
}

impl anchor_lang::Owner for AccessRegistry {
    fn owner() -> Pubkey {
        ID
    }
}

impl anchor_lang::AccountSerialize for AccessRegistry {
    fn try_serialize<W: std::io::Write>(&self, writer: &mut W) -> anchor_lang::Result<()> {
        AnchorSerialize::serialize(self, writer).map_err(Into::into)
    }
}

impl anchor_lang::AccountDeserialize for AccessRegistry {
    fn try_deserialize(buf: &mut &[u8]) -> anchor_lang::Result<Self> {
        if buf.len() < 8 {
            return Err(ErrorCode::AccountDidNotDeserialize.into());
        }
        let mut data: &[u8] = &buf[8..];
        AccessRegistry::deserialize(&mut data)
            .map_err(|_| ErrorCode::AccountDidNotDeserialize.into())
    }

    fn try_deserialize_unchecked(buf: &mut &[u8]) -> anchor_lang::Result<Self> {
        let mut data: &[u8] = &buf[8..];
        AccessRegistry::deserialize(&mut data)
            .map_err(|_| ErrorCode::AccountDidNotDeserialize.into())
    }
}

// Discriminator from SHA256("account:AccessRegistry")[0..8]
impl anchor_lang::Discriminator for AccessRegistry {
    const DISCRIMINATOR: [u8; 8] = [238, 137, 96, 52, 107, 187, 17, 132];
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn capability_lookup_matches_principal_and_capability() {
        let pauser = Pubkey::new_unique();
        let registry = AccessRegistry {
            authority: Pubkey::new_unique(),
            grants: vec![CapabilityGrant {
                principal: pauser,
                capability: crate::constants::CAP_PAUSER,
            }],
        };
        assert!(registry.has_capability(&pauser, crate::constants::CAP_PAUSER));
        assert!(!registry.has_capability(&pauser, crate::constants::CAP_FEE_ADMIN));
        assert!(!registry.has_capability(&Pubkey::new_unique(), crate::constants::CAP_PAUSER));
    }
}

use serde::{Deserialize, Serialize};

use storeops_core::error::require_non_empty;
use storeops_core::{DomainError, DomainResult, Record};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MemberStatus {
    Active,
    Inactive,
}

/// Retail partner a member is seconded to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Reseller {
    #[serde(rename = "FNAC")]
    Fnac,
    Worten,
}

/// A seller on the store team.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TeamMember {
    pub name: String,
    pub role: String,
    pub email: String,
    #[serde(default)]
    pub phone: String,
    #[serde(default)]
    pub location: String,
    #[serde(default)]
    pub image_url: String,
    pub status: MemberStatus,
    #[serde(default)]
    pub is_champion: bool,
    #[serde(default)]
    pub reseller: Option<Reseller>,
}

impl TeamMember {
    pub fn is_active(&self) -> bool {
        self.status == MemberStatus::Active
    }
}

impl Record for TeamMember {
    const COLLECTION: &'static str = "team";

    fn validate(&self) -> DomainResult<()> {
        require_non_empty("name", &self.name)?;
        require_non_empty("role", &self.role)?;
        if !self.email.contains('@') {
            return Err(DomainError::validation(format!(
                "email '{}' is not an address",
                self.email
            )));
        }
        Ok(())
    }

    fn listing_order(a: &Self, b: &Self) -> core::cmp::Ordering {
        a.name.cmp(&b.name)
    }
}

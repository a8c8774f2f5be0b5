//! Grant categories.
//!
//! All grant types confer access identically while unexpired. The category
//! matters for display and for one policy: an administrative trail grant
//! must not clobber an equal or stronger grant.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::CoreError;

/// Category label attached to an entitlement record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GrantType {
    /// Paid access granted by an administrator.
    Premium,
    /// Self-service, time-limited access requested by the principal.
    Trial,
    /// Administrative trail access.
    Trail,
}

impl GrantType {
    /// All grant types, in declaration order.
    pub const ALL: [GrantType; 3] = [GrantType::Premium, GrantType::Trial, GrantType::Trail];

    /// Stored / displayed name.
    pub fn as_str(&self) -> &'static str {
        match self {
            GrantType::Premium => "premium",
            GrantType::Trial => "trial",
            GrantType::Trail => "trail",
        }
    }

    /// Precedence rank used by the give-trail guard.
    ///
    /// | type    | rank |
    /// |---------|------|
    /// | trial   | 0    |
    /// | trail   | 1    |
    /// | premium | 1    |
    pub fn precedence(&self) -> u8 {
        match self {
            GrantType::Trial => 0,
            GrantType::Trail | GrantType::Premium => 1,
        }
    }

    /// Whether an administrative trail grant may overwrite a record of this type.
    pub fn yields_to_trail(&self) -> bool {
        self.precedence() < GrantType::Trail.precedence()
    }
}

impl fmt::Display for GrantType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for GrantType {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "premium" => Ok(GrantType::Premium),
            "trial" => Ok(GrantType::Trial),
            "trail" => Ok(GrantType::Trail),
            other => Err(CoreError::UnknownGrantType(other.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_only_trial_yields_to_trail() {
        assert!(GrantType::Trial.yields_to_trail());
        assert!(!GrantType::Trail.yields_to_trail());
        assert!(!GrantType::Premium.yields_to_trail());
    }

    #[test]
    fn test_parse_names() {
        for grant in GrantType::ALL {
            assert_eq!(grant.as_str().parse::<GrantType>().unwrap(), grant);
        }
        assert!(matches!(
            "Premium".parse::<GrantType>(),
            Err(CoreError::UnknownGrantType(_))
        ));
    }

    #[test]
    fn test_serde_lowercase() {
        let json = serde_json::to_string(&GrantType::Trail).unwrap();
        assert_eq!(json, "\"trail\"");
    }
}

//! # Persona Catalog
//!
//! The fixed set of capability bundles an authenticated actor can switch
//! into, plus the virtual `guest` role of an unauthenticated session.
//!
//! ## Catalog Order
//!
//! `consumer, seller, landlord, agent, ambassador, admin`
//!
//! Each persona maps to its own list of navigable destinations in the host's
//! router. That mapping lives outside this crate; only the catalog itself
//! lives here.

use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::CoreError;

/// A persona an authenticated actor may hold.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Persona {
    /// Student or visitor looking for housing, goods, or a roommate.
    Consumer,
    /// Marketplace seller.
    Seller,
    /// Property owner listing housing.
    Landlord,
    /// Agent listing on behalf of landlords.
    Agent,
    /// Campus ambassador.
    Ambassador,
    /// Platform administrator.
    Admin,
}

/// Every persona, in catalog order.
pub const PERSONA_CATALOG: [Persona; 6] = [
    Persona::Consumer,
    Persona::Seller,
    Persona::Landlord,
    Persona::Agent,
    Persona::Ambassador,
    Persona::Admin,
];

impl Persona {
    /// The canonical lowercase name.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Consumer => "consumer",
            Self::Seller => "seller",
            Self::Landlord => "landlord",
            Self::Agent => "agent",
            Self::Ambassador => "ambassador",
            Self::Admin => "admin",
        }
    }
}

impl std::fmt::Display for Persona {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Persona {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        PERSONA_CATALOG
            .into_iter()
            .find(|p| p.as_str() == s)
            .ok_or_else(|| CoreError::UnknownPersona(s.to_string()))
    }
}

/// The role a session is currently acting under.
///
/// Serializes as a bare string: `"guest"` or a persona name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum ActiveRole {
    /// Unauthenticated visitor.
    Guest,
    /// Authenticated actor acting as the given persona.
    Persona(Persona),
}

impl ActiveRole {
    /// The canonical lowercase name.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Guest => "guest",
            Self::Persona(p) => p.as_str(),
        }
    }

    /// Whether this is the unauthenticated guest role.
    pub fn is_guest(&self) -> bool {
        matches!(self, Self::Guest)
    }

    /// The persona, if any.
    pub fn persona(&self) -> Option<Persona> {
        match self {
            Self::Guest => None,
            Self::Persona(p) => Some(*p),
        }
    }
}

impl From<Persona> for ActiveRole {
    fn from(p: Persona) -> Self {
        Self::Persona(p)
    }
}

impl std::fmt::Display for ActiveRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ActiveRole {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s == "guest" {
            return Ok(Self::Guest);
        }
        s.parse::<Persona>().map(Self::Persona)
    }
}

impl TryFrom<String> for ActiveRole {
    type Error = CoreError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        s.parse()
    }
}

impl From<ActiveRole> for String {
    fn from(role: ActiveRole) -> Self {
        role.as_str().to_string()
    }
}

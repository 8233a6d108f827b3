//! Explicit session context.
//!
//! RULE: Nothing reads the acting agent from ambient state.
//! Every data-service call receives the `Session` it acts under.

use crate::{error::UnknownVariant, types::AgentId};
use serde::{Deserialize, Serialize};
use std::{fmt, str::FromStr};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AgentRole {
    CsAgent,
    TransfersTeam,
    Admin,
}

impl AgentRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::CsAgent => "cs_agent",
            Self::TransfersTeam => "transfers_team",
            Self::Admin => "admin",
        }
    }
}

impl FromStr for AgentRole {
    type Err = UnknownVariant;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "cs_agent" => Ok(Self::CsAgent),
            "transfers_team" => Ok(Self::TransfersTeam),
            "admin" => Ok(Self::Admin),
            other => Err(UnknownVariant { kind: "agent role", value: other.to_string() }),
        }
    }
}

impl fmt::Display for AgentRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AgentProfile {
    pub id: AgentId,
    pub username: String,
    pub email: String,
    pub full_name: String,
    pub role: AgentRole,
    pub is_admin: bool,
    pub is_active: bool,
}

/// A bearer token plus the profile it was issued to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    pub token: String,
    pub agent: AgentProfile,
}

impl Session {
    pub fn new(token: impl Into<String>, agent: AgentProfile) -> Self {
        Self { token: token.into(), agent }
    }

    pub fn agent_id(&self) -> AgentId {
        self.agent.id
    }
}
